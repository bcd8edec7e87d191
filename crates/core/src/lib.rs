//! Alma Learn core: the conversation controller for a RAG-backed store-staff
//! tutor with question answering, interactive quizzes and role-play
//! simulations.

pub mod controller;
pub mod error;
pub mod history;
pub mod prompts;
pub mod quiz;
pub mod rag;
pub mod session;
pub mod simulation;
pub mod state;
pub mod view;

pub use controller::{ConversationController, Input, Next, ScenarioRetryPolicy, TurnOutcome};
pub use error::ControllerError;
pub use history::{ConversationHistory, Turn, TurnRole};
pub use prompts::PromptTemplateSet;
pub use rag::RagClient;
pub use session::{InteractionMode, Session, UserRole};
pub use state::{ConversationState, Phase};
pub use view::ViewModel;
