//! Terminal front end for Alma Learn.
//!
//! Logs in, then reads lines from stdin and feeds them to the
//! `ConversationController`, printing whatever turns each input appends.

use alma_core::{
    ConversationController, ConversationState, Input, InteractionMode, PromptTemplateSet,
    RagClient, ScenarioRetryPolicy, Turn, TurnRole, UserRole, ViewModel,
    rag::{CompletionRagClient, LightRagClient, LightRagConfig},
};
use anyhow::{Context, Result};
use async_openai::config::OpenAIConfig;
use clap::{Parser, ValueEnum};
use std::{io::Write, path::PathBuf, sync::Arc, time::Duration};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;

mod commands;

use commands::{Command, HELP, command_for, parse_line};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Provider {
    Lightrag,
    Completion,
}

#[derive(Parser, Debug)]
#[command(name = "alma")]
#[command(about = "Alma Learn - learning assistant for store staff, in the terminal")]
#[command(version)]
struct Cli {
    /// Your name. Asked interactively when omitted.
    #[arg(long)]
    name: Option<String>,

    /// Store role, e.g. "Kasir" or "Admin Sosial Media".
    #[arg(long)]
    role: Option<UserRole>,

    /// Interaction mode: "Tanya-Jawab", "Kuis Interaktif" or "Simulasi".
    #[arg(long)]
    mode: Option<InteractionMode>,

    /// Directory of instruction templates; the built-in ones are used when omitted.
    #[arg(long, env = "PROMPTS_PATH")]
    prompts_dir: Option<PathBuf>,

    #[arg(long, env = "RAG_PROVIDER", value_enum, default_value = "lightrag")]
    provider: Provider,

    #[arg(long, env = "LIGHTRAG_URL", default_value = "http://localhost:9621")]
    lightrag_url: String,

    #[arg(long, env = "LIGHTRAG_API_KEY")]
    lightrag_api_key: Option<String>,

    /// LightRAG retrieval mode.
    #[arg(long, env = "LIGHTRAG_QUERY_MODE", default_value = "hybrid")]
    query_mode: String,

    #[arg(long, env = "LLM_BINDING_API_KEY")]
    llm_api_key: Option<String>,

    #[arg(long, env = "LLM_BASE_URL", default_value = "https://openrouter.ai/api/v1")]
    llm_base_url: String,

    /// Chat model for the completion provider.
    #[arg(long, env = "CHAT_MODEL", default_value = "google/gemini-2.5-flash")]
    model: String,

    #[arg(long, env = "RAG_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Give up on scenario generation after this many failures in a row.
    #[arg(long, env = "MAX_SCENARIO_ATTEMPTS")]
    max_scenario_attempts: Option<u32>,
}

impl Cli {
    fn rag_client(&self) -> Result<Arc<dyn RagClient>> {
        match self.provider {
            Provider::Lightrag => {
                let config = LightRagConfig {
                    base_url: self.lightrag_url.clone(),
                    api_key: self.lightrag_api_key.clone(),
                    mode: self.query_mode.clone(),
                    timeout: self.timeout_secs.map(Duration::from_secs),
                };
                Ok(Arc::new(LightRagClient::new(config)?))
            }
            Provider::Completion => {
                let api_key = self
                    .llm_api_key
                    .as_ref()
                    .context("--llm-api-key (or LLM_BINDING_API_KEY) is required for the completion provider")?;
                let config = OpenAIConfig::new()
                    .with_api_key(api_key)
                    .with_api_base(&self.llm_base_url);
                Ok(Arc::new(CompletionRagClient::new(config, self.model.clone())))
            }
        }
    }

    fn templates(&self) -> Result<PromptTemplateSet> {
        match &self.prompts_dir {
            Some(dir) => PromptTemplateSet::from_dir(dir),
            None => Ok(PromptTemplateSet::default()),
        }
    }
}

/// Line-oriented access to stdin.
struct Console {
    lines: Lines<BufReader<Stdin>>,
}

impl Console {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Prints a prompt and reads one line. `None` at end of input.
    async fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        print!("{prompt}");
        std::io::stdout().flush()?;
        Ok(self.lines.next_line().await?)
    }

    /// Asks until the answer parses, or input ends.
    async fn ask_parsed<T: std::str::FromStr>(&mut self, prompt: &str) -> Result<Option<T>>
    where
        T::Err: std::fmt::Display,
    {
        loop {
            let Some(line) = self.ask(prompt).await? else {
                return Ok(None);
            };
            match line.trim().parse::<T>() {
                Ok(value) => return Ok(Some(value)),
                Err(e) => println!("{e}"),
            }
        }
    }
}

fn print_turns(turns: &[Turn]) {
    for turn in turns {
        match turn.role {
            TurnRole::Assistant => println!("\nAlma: {}\n", turn.content),
            // Already on screen as typed.
            TurnRole::User => {}
        }
    }
}

fn print_status(view: &ViewModel) {
    if let Some(scenario) = &view.scenario {
        println!("[Skenario] {scenario}");
    }
    let hints: Vec<&str> = view.actions.iter().filter_map(|a| command_for(*a)).collect();
    if !hints.is_empty() {
        println!("({})", hints.join(", "));
    }
}

/// Collects name, role and mode, using the flags for whatever they provide.
async fn login_input(
    console: &mut Console,
    name: Option<String>,
    role: Option<UserRole>,
    mode: Option<InteractionMode>,
) -> Result<Option<Input>> {
    let user_name = match name {
        Some(name) => name,
        None => match console.ask("Nama: ").await? {
            Some(name) => name,
            None => return Ok(None),
        },
    };
    let user_role = match role {
        Some(role) => role,
        None => {
            let labels: Vec<&str> = UserRole::ALL.iter().map(|r| r.label()).collect();
            let prompt = format!("Peran ({}): ", labels.join(" / "));
            match console.ask_parsed(&prompt).await? {
                Some(role) => role,
                None => return Ok(None),
            }
        }
    };
    let mode = match mode {
        Some(mode) => mode,
        None => {
            let labels: Vec<&str> = InteractionMode::ALL.iter().map(|m| m.label()).collect();
            let prompt = format!("Mode ({}): ", labels.join(" / "));
            match console.ask_parsed(&prompt).await? {
                Some(mode) => mode,
                None => return Ok(None),
            }
        }
    };
    Ok(Some(Input::Login {
        user_name,
        user_role,
        mode,
    }))
}

/// Logs in, retrying until the controller accepts. `None` at end of input.
async fn login(
    controller: &ConversationController,
    console: &mut Console,
    cli: &mut Cli,
) -> Result<Option<ConversationState>> {
    loop {
        // Flags only apply to the first attempt.
        let Some(input) =
            login_input(console, cli.name.take(), cli.role.take(), cli.mode.take()).await?
        else {
            return Ok(None);
        };
        let outcome = controller.run(ConversationState::default(), input).await;
        match outcome.rejection {
            Some(rejection) => println!("[!] {rejection}"),
            None => {
                let view = ViewModel::from(&outcome.state);
                if let Some(greeting) = &view.greeting {
                    println!("\nAlma: {greeting}\n");
                }
                return Ok(Some(outcome.state));
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let mut cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let templates = Arc::new(cli.templates().context("Failed to load instruction templates")?);
    let rag = cli.rag_client()?;
    rag.initialize()
        .await
        .context("Failed to initialize the RAG collaborator")?;
    info!(provider = ?cli.provider, "RAG collaborator is ready");

    let controller = ConversationController::new(rag, templates).with_retry_policy(
        ScenarioRetryPolicy {
            max_failed_attempts: cli.max_scenario_attempts,
        },
    );

    let mut console = Console::new();
    let Some(mut state) = login(&controller, &mut console, &mut cli).await? else {
        return Ok(());
    };
    println!("Ketik /bantuan untuk daftar perintah.");

    loop {
        let view = ViewModel::from(&state);
        print_status(&view);
        let Some(line) = console.ask(&format!("{} > ", view.placeholder)).await? else {
            break;
        };
        let input = match parse_line(&line) {
            None => continue,
            Some(Command::Exit) => break,
            Some(Command::Help) => {
                println!("{HELP}");
                continue;
            }
            Some(Command::Unknown(command)) => {
                println!("Perintah tidak dikenal: {command}. Ketik /bantuan.");
                continue;
            }
            Some(Command::Input(input)) => input,
        };

        let new_session = input == Input::NewSession;
        let outcome = controller.run(state, input).await;
        if let Some(rejection) = &outcome.rejection {
            println!("[!] {rejection}");
        }
        print_turns(&outcome.appended);
        state = outcome.state;

        if new_session && outcome.rejection.is_none() {
            match login(&controller, &mut console, &mut cli).await? {
                Some(logged_in) => state = logged_in,
                None => break,
            }
        }
    }

    println!("Sampai jumpa!");
    Ok(())
}
