//! What a presentation layer needs to render the current state: the phase,
//! the input placeholder, and which actions to offer.

use crate::state::{ConversationState, Phase};
use serde::{Deserialize, Serialize};

/// An action a presentation layer may offer to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    FreeText,
    ChangeTopic,
    FinishSimulation,
    StartNewSimulation,
    NewSession,
}

/// Session summary for the status panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub user_name: String,
    pub user_role: String,
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewModel {
    pub phase: Phase,
    pub session: Option<SessionSummary>,
    pub greeting: Option<String>,
    pub placeholder: String,
    pub input_enabled: bool,
    pub actions: Vec<Action>,
    pub quiz_topic: Option<String>,
    /// The scenario brief, once a simulation has one.
    pub scenario: Option<String>,
}

impl From<&ConversationState> for ViewModel {
    fn from(state: &ConversationState) -> Self {
        let phase = state.phase();
        let placeholder = match phase {
            Phase::Login => "Masukkan nama, peran, dan mode interaksi".to_string(),
            Phase::Qa => "Mau belajar apa hari ini?".to_string(),
            Phase::QuizIdle => "Masukkan topik kuis, misalnya (SOP Refund)".to_string(),
            Phase::QuizAwaitingAnswer => format!(
                "Ketik jawaban Anda untuk kuis topik: {}",
                state.quiz.as_ref().map(|q| q.topic.as_str()).unwrap_or_default()
            ),
            Phase::SimNone => "Masukkan topik simulasi yang Anda inginkan...".to_string(),
            Phase::SimActive => "Ketik respons Anda dalam simulasi...".to_string(),
            Phase::SimEvaluating => {
                "Simulasi selesai. Alma sedang menganalisis percakapan Anda...".to_string()
            }
            Phase::SimFinished => "Sesi simulasi ini telah berakhir.".to_string(),
        };

        let mut actions = Vec::new();
        if matches!(
            phase,
            Phase::Qa
                | Phase::QuizIdle
                | Phase::QuizAwaitingAnswer
                | Phase::SimNone
                | Phase::SimActive
        ) {
            actions.push(Action::FreeText);
        }
        match phase {
            Phase::QuizAwaitingAnswer => actions.push(Action::ChangeTopic),
            Phase::SimActive => actions.push(Action::FinishSimulation),
            Phase::SimFinished => actions.push(Action::StartNewSimulation),
            Phase::SimNone if state.simulation.failed_attempts > 0 => {
                actions.push(Action::StartNewSimulation)
            }
            _ => {}
        }
        if phase != Phase::Login {
            actions.push(Action::NewSession);
        }

        let scenario = match phase {
            Phase::SimActive | Phase::SimEvaluating | Phase::SimFinished => {
                Some(state.simulation.scenario.clone())
            }
            _ => None,
        };

        Self {
            phase,
            session: state.session.as_ref().map(|s| SessionSummary {
                user_name: s.user_name.clone(),
                user_role: s.user_role.label().to_string(),
                mode: s.mode.label().to_string(),
            }),
            greeting: state.session.as_ref().map(|s| s.greeting()),
            placeholder,
            input_enabled: actions.contains(&Action::FreeText),
            actions,
            quiz_topic: state.quiz.as_ref().map(|q| q.topic.clone()),
            scenario,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        quiz::QuizState,
        session::{InteractionMode, Session, UserRole},
        simulation::{SimulationPhase, SimulationState},
    };

    fn state_in(mode: InteractionMode) -> ConversationState {
        ConversationState::logged_in(Session::new("Rina", UserRole::Kasir, mode).unwrap())
    }

    #[test]
    fn test_login_view() {
        let view = ViewModel::from(&ConversationState::default());
        assert_eq!(view.phase, Phase::Login);
        assert!(view.session.is_none());
        assert!(view.actions.is_empty());
        assert!(!view.input_enabled);
    }

    #[test]
    fn test_quiz_awaiting_view_offers_change_topic() {
        let mut state = state_in(InteractionMode::Quiz);
        state.quiz = Some(QuizState::awaiting_answer("SOP Refund".into(), "Apa?".into()));

        let view = ViewModel::from(&state);
        assert_eq!(
            view.placeholder,
            "Ketik jawaban Anda untuk kuis topik: SOP Refund"
        );
        assert_eq!(
            view.actions,
            vec![Action::FreeText, Action::ChangeTopic, Action::NewSession]
        );
        assert_eq!(view.quiz_topic.as_deref(), Some("SOP Refund"));
    }

    #[test]
    fn test_simulation_views() {
        let mut state = state_in(InteractionMode::Simulation);
        assert_eq!(
            ViewModel::from(&state).placeholder,
            "Masukkan topik simulasi yang Anda inginkan..."
        );

        state.simulation = SimulationState::active("Pelanggan minta refund".into());
        let active = ViewModel::from(&state);
        assert!(active.actions.contains(&Action::FinishSimulation));
        assert_eq!(active.scenario.as_deref(), Some("Pelanggan minta refund"));

        state.simulation.phase = SimulationPhase::Evaluating;
        assert!(!ViewModel::from(&state).input_enabled);

        state.simulation.phase = SimulationPhase::Finished;
        let finished = ViewModel::from(&state);
        assert!(!finished.input_enabled);
        assert_eq!(
            finished.actions,
            vec![Action::StartNewSimulation, Action::NewSession]
        );
    }

    #[test]
    fn test_failed_scenario_offers_start_new_simulation() {
        let mut state = state_in(InteractionMode::Simulation);
        assert!(
            !ViewModel::from(&state)
                .actions
                .contains(&Action::StartNewSimulation)
        );

        state.simulation.failed_attempts = 1;
        let view = ViewModel::from(&state);
        assert_eq!(view.phase, Phase::SimNone);
        assert!(view.input_enabled);
        assert_eq!(
            view.actions,
            vec![
                Action::FreeText,
                Action::StartNewSimulation,
                Action::NewSession
            ]
        );
    }

    #[test]
    fn test_session_summary_uses_labels() {
        let view = ViewModel::from(&state_in(InteractionMode::Qa));
        let summary = view.session.unwrap();
        assert_eq!(summary.user_role, "Kasir");
        assert_eq!(summary.mode, "Tanya-Jawab");
        assert_eq!(view.placeholder, "Mau belajar apa hari ini?");
        assert!(view.greeting.unwrap().starts_with("Halo Rina!"));
    }
}
