//! Conversation Controller
//!
//! The finite-state core of the tutor. Each call takes the current
//! `ConversationState` and one `Input`, decides which instruction template
//! applies, queries the `RagClient` at most once, and returns the new state
//! together with the turns it appended.
//!
//! The controller never fails a turn because the collaborator failed: errors
//! become assistant turns and the state settles somewhere stable. Inputs that
//! make no sense for the current phase are refused without touching state.

use crate::{
    error::ControllerError,
    history::Turn,
    prompts::PromptTemplateSet,
    quiz::{QuizState, extract_topic},
    rag::RagClient,
    session::{InteractionMode, Session, UserRole},
    simulation::{SimulationPhase, SimulationState, parse_scenario},
    state::{ConversationState, Phase},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Shown when a quiz is abandoned for a new topic.
pub const CHANGE_TOPIC_NOTICE: &str =
    "Baik, kuis sebelumnya dibatalkan. Silakan masukkan topik baru untuk kuis di bawah ini.";
/// Shown when a scenario response could not be parsed.
pub const SCENARIO_FAILURE_NOTICE: &str = "Maaf, saya gagal membuat skenario. Coba topik lain.";
/// The query sent alongside the simulation evaluation instruction.
pub const EVALUATION_QUERY: &str = "Tolong berikan evaluasi berdasarkan transkrip.";

/// One thing the presentation layer can hand to the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Input {
    Login {
        user_name: String,
        user_role: UserRole,
        mode: InteractionMode,
    },
    /// Free text typed by the user.
    Message { text: String },
    ChangeTopic,
    FinishSimulation,
    StartNewSimulation,
    NewSession,
    SwitchMode { mode: InteractionMode },
    /// Runs a pending automatic step. Fed by the presentation layer whenever
    /// an outcome says `Next::Continue`.
    Continue,
}

impl Input {
    pub fn message(text: impl Into<String>) -> Self {
        Input::Message { text: text.into() }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Input::Login { .. } => "login",
            Input::Message { .. } => "message",
            Input::ChangeTopic => "change_topic",
            Input::FinishSimulation => "finish_simulation",
            Input::StartNewSimulation => "start_new_simulation",
            Input::NewSession => "new_session",
            Input::SwitchMode { .. } => "switch_mode",
            Input::Continue => "continue",
        }
    }
}

/// What the presentation layer should do after an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Next {
    /// Wait for the user.
    AwaitInput,
    /// Feed `Input::Continue` straight away; an automatic step is pending.
    Continue,
}

/// Result of one controller call.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub state: ConversationState,
    /// Turns added by this call, in order. After a history reset this is the
    /// whole new history.
    pub appended: Vec<Turn>,
    pub next: Next,
    pub rejection: Option<ControllerError>,
}

impl TurnOutcome {
    pub fn is_rejected(&self) -> bool {
        self.rejection.is_some()
    }
}

/// How many consecutive scenario-generation failures are tolerated before
/// further topic submissions are refused. `None` means no limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScenarioRetryPolicy {
    pub max_failed_attempts: Option<u32>,
}

/// Mutable view of the state for the duration of one call, collecting the
/// turns appended along the way.
struct Step {
    state: ConversationState,
    appended: Vec<Turn>,
}

impl Step {
    fn push_user(&mut self, content: &str) {
        let turn = Turn::user(content);
        self.state.history.push(turn.clone());
        self.appended.push(turn);
    }

    fn push_assistant(&mut self, content: impl Into<String>) {
        let turn = Turn::assistant(content);
        self.state.history.push(turn.clone());
        self.appended.push(turn);
    }

    fn session(&self) -> Result<Session, ControllerError> {
        self.state.session.clone().ok_or(ControllerError::NoSession)
    }

    fn not_available(&self, input: &'static str) -> ControllerError {
        ControllerError::NotAvailable {
            input,
            phase: self.state.phase(),
        }
    }
}

/// Drives a conversation through its modes and phases.
pub struct ConversationController {
    rag: Arc<dyn RagClient>,
    templates: Arc<PromptTemplateSet>,
    retry_policy: ScenarioRetryPolicy,
}

impl ConversationController {
    pub fn new(rag: Arc<dyn RagClient>, templates: Arc<PromptTemplateSet>) -> Self {
        Self {
            rag,
            templates,
            retry_policy: ScenarioRetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: ScenarioRetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Applies one input. Never panics and never propagates collaborator errors.
    #[instrument(name = "turn", skip_all, fields(input = input.name()))]
    pub async fn handle(&self, state: ConversationState, input: Input) -> TurnOutcome {
        let mut state = state;
        state.enforce_mode_invariants();
        let original = state.clone();

        let mut step = Step {
            state,
            appended: Vec::new(),
        };
        let result = match input {
            Input::Login {
                user_name,
                user_role,
                mode,
            } => Self::login(&mut step, &user_name, user_role, mode),
            Input::Message { text } => self.message(&mut step, &text).await,
            Input::ChangeTopic => Self::change_topic(&mut step),
            Input::FinishSimulation => Self::finish_simulation(&mut step),
            Input::StartNewSimulation => Self::start_new_simulation(&mut step),
            Input::NewSession => {
                step.state = ConversationState::default();
                info!("Session cleared");
                Ok(())
            }
            Input::SwitchMode { mode } => Self::switch_mode(&mut step, mode),
            Input::Continue => self.continue_pending(&mut step).await,
        };

        let (state, appended, rejection) = match result {
            Ok(()) => (step.state, step.appended, None),
            Err(err) => {
                info!(reason = %err, "Input rejected");
                (original, Vec::new(), Some(err))
            }
        };
        let next = match state.phase() {
            Phase::SimEvaluating => Next::Continue,
            _ => Next::AwaitInput,
        };
        TurnOutcome {
            state,
            appended,
            next,
            rejection,
        }
    }

    /// Applies an input and then every automatic step it triggers.
    pub async fn run(&self, state: ConversationState, input: Input) -> TurnOutcome {
        let mut outcome = self.handle(state, input).await;
        while outcome.next == Next::Continue && !outcome.is_rejected() {
            let TurnOutcome {
                state,
                mut appended,
                ..
            } = outcome;
            let follow = self.handle(state, Input::Continue).await;
            appended.extend(follow.appended);
            outcome = TurnOutcome {
                state: follow.state,
                appended,
                next: follow.next,
                rejection: follow.rejection,
            };
        }
        outcome
    }

    fn login(
        step: &mut Step,
        user_name: &str,
        user_role: UserRole,
        mode: InteractionMode,
    ) -> Result<(), ControllerError> {
        if step.state.session.is_some() {
            return Err(ControllerError::AlreadyLoggedIn);
        }
        let session = Session::new(user_name, user_role, mode).ok_or_else(|| {
            ControllerError::InvalidLogin("user name must not be empty".to_string())
        })?;
        info!(user = %session.user_name, role = %session.user_role, mode = %session.mode, "Session started");
        step.state = ConversationState::logged_in(session);
        Ok(())
    }

    async fn message(&self, step: &mut Step, text: &str) -> Result<(), ControllerError> {
        let session = step.session()?;
        if text.trim().is_empty() {
            return Err(ControllerError::EmptyInput);
        }
        match step.state.phase() {
            Phase::Qa => self.answer_question(step, &session, text).await,
            Phase::QuizIdle => self.generate_quiz(step, &session, text).await,
            Phase::QuizAwaitingAnswer => self.evaluate_quiz(step, &session, text).await,
            Phase::SimNone => self.generate_scenario(step, &session, text).await,
            Phase::SimActive => self.continue_roleplay(step, &session, text).await,
            Phase::Login | Phase::SimEvaluating | Phase::SimFinished => {
                Err(step.not_available("message"))
            }
        }
    }

    async fn answer_question(
        &self,
        step: &mut Step,
        session: &Session,
        text: &str,
    ) -> Result<(), ControllerError> {
        let history_text = step.state.history.transcript();
        let instruction = self
            .templates
            .qa(&session.user_name, session.user_role, &history_text);

        step.push_user(text);
        let reply = self.ask(text, &instruction).await.unwrap_or_else(|e| e);
        step.push_assistant(reply);
        Ok(())
    }

    async fn generate_quiz(
        &self,
        step: &mut Step,
        session: &Session,
        text: &str,
    ) -> Result<(), ControllerError> {
        let topic = extract_topic(text);
        if topic.is_empty() {
            return Err(ControllerError::EmptyInput);
        }
        let history_text = step.state.history.transcript();
        let instruction =
            self.templates
                .quiz_generation(&session.user_name, session.user_role, &history_text);

        step.push_user(text);
        match self.ask(&topic, &instruction).await {
            Ok(question) => {
                info!(%topic, "Quiz question posed");
                step.state.quiz = Some(QuizState::awaiting_answer(topic, question.clone()));
                step.push_assistant(question);
            }
            Err(notice) => step.push_assistant(notice),
        }
        Ok(())
    }

    async fn evaluate_quiz(
        &self,
        step: &mut Step,
        session: &Session,
        text: &str,
    ) -> Result<(), ControllerError> {
        // Cleared before dispatch: whatever the evaluation says, the quiz is over.
        let Some(quiz) = step.state.quiz.take() else {
            return Err(step.not_available("message"));
        };
        let history_text = step.state.history.transcript();
        let instruction = self.templates.quiz_evaluation(
            &session.user_name,
            session.user_role,
            &history_text,
            &quiz.question,
            text,
        );

        step.push_user(text);
        let reply = self.ask(&quiz.topic, &instruction).await.unwrap_or_else(|e| e);
        step.push_assistant(reply);
        info!(topic = %quiz.topic, "Quiz answer evaluated");
        Ok(())
    }

    async fn generate_scenario(
        &self,
        step: &mut Step,
        session: &Session,
        topic: &str,
    ) -> Result<(), ControllerError> {
        let attempts = step.state.simulation.failed_attempts;
        if let Some(max) = self.retry_policy.max_failed_attempts {
            if attempts >= max {
                return Err(ControllerError::RetryLimitReached { attempts });
            }
        }
        let instruction = self.templates.sim_generate(topic, session.user_role);

        step.push_user(topic);
        let parsed = match self.ask(topic, &instruction).await {
            Ok(response) => parse_scenario(&response).map_err(|e| {
                warn!(error = %e, "Scenario response could not be parsed");
                SCENARIO_FAILURE_NOTICE.to_string()
            }),
            Err(notice) => Err(notice),
        };
        match parsed {
            Ok(parsed) => {
                info!(%topic, "Simulation started");
                step.state.simulation = SimulationState::active(parsed.scenario);
                step.push_assistant(parsed.opening);
            }
            Err(notice) => {
                step.state.simulation.failed_attempts += 1;
                step.push_assistant(notice);
            }
        }
        Ok(())
    }

    async fn continue_roleplay(
        &self,
        step: &mut Step,
        session: &Session,
        text: &str,
    ) -> Result<(), ControllerError> {
        step.push_user(text);
        let transcript = step.state.history.transcript();
        let instruction = self.templates.sim_interaction(
            &step.state.simulation.scenario,
            &transcript,
            session.user_role,
        );

        let reply = self.ask(text, &instruction).await.unwrap_or_else(|e| e);
        step.push_assistant(reply);
        Ok(())
    }

    fn finish_simulation(step: &mut Step) -> Result<(), ControllerError> {
        step.session()?;
        if step.state.phase() != Phase::SimActive {
            return Err(step.not_available("finish_simulation"));
        }
        step.state.simulation.phase = SimulationPhase::Evaluating;
        info!("Simulation finished; evaluation pending");
        Ok(())
    }

    async fn continue_pending(&self, step: &mut Step) -> Result<(), ControllerError> {
        let session = step.session()?;
        if step.state.phase() != Phase::SimEvaluating {
            return Err(step.not_available("continue"));
        }
        let transcript = step.state.history.transcript();
        let instruction = self.templates.sim_evaluation(
            &step.state.simulation.scenario,
            &transcript,
            &session.user_name,
            session.user_role,
        );

        let evaluation = self
            .ask(EVALUATION_QUERY, &instruction)
            .await
            .unwrap_or_else(|e| e);
        step.push_assistant(evaluation);
        step.state.simulation.phase = SimulationPhase::Finished;
        info!("Simulation evaluated");
        Ok(())
    }

    fn change_topic(step: &mut Step) -> Result<(), ControllerError> {
        step.session()?;
        if step.state.phase() != Phase::QuizAwaitingAnswer {
            return Err(step.not_available("change_topic"));
        }
        step.push_assistant(CHANGE_TOPIC_NOTICE);
        step.state.quiz = None;
        Ok(())
    }

    fn start_new_simulation(step: &mut Step) -> Result<(), ControllerError> {
        let session = step.session()?;
        // Also the way out after failed scenario generations.
        let available = match step.state.phase() {
            Phase::SimFinished => true,
            Phase::SimNone => step.state.simulation.failed_attempts > 0,
            _ => false,
        };
        if !available {
            return Err(step.not_available("start_new_simulation"));
        }
        let greeting = Turn::assistant(session.new_simulation_greeting());
        step.state.quiz = None;
        step.state.simulation.reset();
        step.state.history.reset_to(greeting.clone());
        step.appended = vec![greeting];
        info!("New simulation ready");
        Ok(())
    }

    fn switch_mode(step: &mut Step, mode: InteractionMode) -> Result<(), ControllerError> {
        if !step.state.set_mode(mode) {
            return Err(ControllerError::NoSession);
        }
        info!(%mode, "Interaction mode switched");
        Ok(())
    }

    /// Queries the collaborator. An error comes back as the notice text to
    /// show in its place.
    async fn ask(&self, query: &str, instruction: &str) -> Result<String, String> {
        self.rag.query(query, instruction).await.map_err(|e| {
            warn!(error = ?e, "RAG query failed");
            format!("Terjadi kesalahan: {:#}", e)
        })
    }
}
