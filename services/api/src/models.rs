//! API Models
//!
//! Request and response bodies for the REST API, annotated for OpenAPI
//! documentation with `utoipa`. Core types are embedded as opaque objects.

use alma_core::{Input, InteractionMode, Turn, UserRole, ViewModel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Deserialize, ToSchema, Debug)]
pub struct CreateSessionPayload {
    #[schema(example = "Rina")]
    pub user_name: String,
    /// One of: Pramuniaga, Admin Sosial Media, Kasir, Host Live, Pemasang Senar.
    #[schema(example = "Kasir")]
    pub user_role: String,
    /// One of: Tanya-Jawab, Kuis Interaktif, Simulasi.
    #[schema(example = "Simulasi")]
    pub mode: String,
}

impl CreateSessionPayload {
    /// Parses the labels into a login input.
    pub fn into_input(self) -> Result<Input, String> {
        let user_role = self
            .user_role
            .parse::<UserRole>()
            .map_err(|e| e.to_string())?;
        let mode = self
            .mode
            .parse::<InteractionMode>()
            .map_err(|e| e.to_string())?;
        Ok(Input::Login {
            user_name: self.user_name,
            user_role,
            mode,
        })
    }
}

/// An action submitted to a running session.
#[derive(Deserialize, ToSchema, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputPayload {
    Message { text: String },
    ChangeTopic,
    FinishSimulation,
    StartNewSimulation,
    SwitchMode { mode: String },
}

impl InputPayload {
    pub fn into_input(self) -> Result<Input, String> {
        Ok(match self {
            InputPayload::Message { text } => Input::Message { text },
            InputPayload::ChangeTopic => Input::ChangeTopic,
            InputPayload::FinishSimulation => Input::FinishSimulation,
            InputPayload::StartNewSimulation => Input::StartNewSimulation,
            InputPayload::SwitchMode { mode } => Input::SwitchMode {
                mode: mode
                    .parse::<InteractionMode>()
                    .map_err(|e| e.to_string())?,
            },
        })
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct SessionResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[schema(value_type = Object)]
    pub view: ViewModel,
    #[schema(value_type = Vec<Object>)]
    pub history: Vec<Turn>,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct TurnResponse {
    #[serde(flatten)]
    pub session: SessionResponse,
    /// Turns added by this input, including any automatic follow-up step.
    #[schema(value_type = Vec<Object>)]
    pub appended: Vec<Turn>,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct ErrorResponse {
    pub message: String,
}
