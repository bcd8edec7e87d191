//! Main Entrypoint for the Alma Learn API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Loading the instruction templates.
//! 3. Building and initializing the configured `RagClient`.
//! 4. Constructing the Axum router and applying middleware.
//! 5. Starting the web server and handling graceful shutdown.

use alma_api::{
    config::{Config, Provider},
    router::create_router,
    state::AppState,
    store::SessionStore,
};
use alma_core::{
    ConversationController, PromptTemplateSet, RagClient, ScenarioRetryPolicy,
    rag::{CompletionRagClient, LightRagClient, LightRagConfig},
};
use anyhow::Context;
use async_openai::config::OpenAIConfig;
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install Ctrl+C handler: {}", e);
        return;
    }
    info!("Received shutdown signal. Shutting down gracefully...");
}

fn build_rag_client(config: &Config) -> anyhow::Result<Arc<dyn RagClient>> {
    match &config.provider {
        Provider::LightRag => {
            let base_url = config
                .lightrag_url
                .clone()
                .context("LIGHTRAG_URL must be set for 'lightrag' provider")?;
            info!(%base_url, mode = %config.lightrag_query_mode, "Using LightRAG provider.");
            let rag_config = LightRagConfig {
                base_url,
                api_key: config.lightrag_api_key.clone(),
                mode: config.lightrag_query_mode.clone(),
                timeout: config.rag_timeout,
            };
            Ok(Arc::new(LightRagClient::new(rag_config)?))
        }
        Provider::Completion => {
            let api_key = config
                .llm_api_key
                .as_ref()
                .context("LLM_BINDING_API_KEY must be set for 'completion' provider")?;
            info!(base_url = %config.llm_base_url, "Using completion provider.");
            let openai_config = OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base(&config.llm_base_url);
            Ok(Arc::new(CompletionRagClient::new(
                openai_config,
                config.chat_model.clone(),
            )))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Load Templates ---
    let templates = Arc::new(
        PromptTemplateSet::from_dir(&config.prompts_path)
            .context("Failed to load instruction templates")?,
    );
    info!(path = %config.prompts_path.display(), "Instruction templates loaded.");

    // --- 4. Initialize the RAG Collaborator ---
    let rag = build_rag_client(&config)?;
    rag.initialize()
        .await
        .context("Failed to initialize the RAG collaborator")?;
    info!("RAG collaborator is ready.");

    let controller = ConversationController::new(rag, templates).with_retry_policy(
        ScenarioRetryPolicy {
            max_failed_attempts: config.max_scenario_attempts,
        },
    );

    let app_state = Arc::new(AppState {
        controller: Arc::new(controller),
        store: Arc::new(SessionStore::new()),
    });

    // --- 5. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 6. Start Server ---
    info!(
        provider = ?config.provider,
        model = %config.chat_model,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
