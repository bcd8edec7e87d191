//! Conversation State
//!
//! Everything the controller needs between turns, in one explicit value that
//! is passed into each controller call and handed back with the result.

use crate::{
    history::ConversationHistory,
    quiz::QuizState,
    session::{InteractionMode, Session},
    simulation::{SimulationPhase, SimulationState},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The composite mode × sub-state the conversation is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Login,
    Qa,
    QuizIdle,
    QuizAwaitingAnswer,
    SimNone,
    SimActive,
    SimEvaluating,
    SimFinished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Login => "login",
            Phase::Qa => "qa",
            Phase::QuizIdle => "quiz_idle",
            Phase::QuizAwaitingAnswer => "quiz_awaiting_answer",
            Phase::SimNone => "sim_none",
            Phase::SimActive => "sim_active",
            Phase::SimEvaluating => "sim_evaluating",
            Phase::SimFinished => "sim_finished",
        };
        f.write_str(name)
    }
}

/// Session identity, history and the mode-specific sub-state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub session: Option<Session>,
    pub history: ConversationHistory,
    pub quiz: Option<QuizState>,
    pub simulation: SimulationState,
}

impl ConversationState {
    /// A freshly logged-in session with an empty history.
    pub fn logged_in(session: Session) -> Self {
        Self {
            session: Some(session),
            ..Self::default()
        }
    }

    pub fn phase(&self) -> Phase {
        let Some(session) = &self.session else {
            return Phase::Login;
        };
        match session.mode {
            InteractionMode::Qa => Phase::Qa,
            InteractionMode::Quiz => match self.quiz {
                Some(_) => Phase::QuizAwaitingAnswer,
                None => Phase::QuizIdle,
            },
            InteractionMode::Simulation => match self.simulation.phase {
                SimulationPhase::None => Phase::SimNone,
                SimulationPhase::Active => Phase::SimActive,
                SimulationPhase::Evaluating => Phase::SimEvaluating,
                SimulationPhase::Finished => Phase::SimFinished,
            },
        }
    }

    /// Drops whichever sub-state does not belong to the current mode, so at
    /// most one of quiz and simulation is ever live.
    pub fn enforce_mode_invariants(&mut self) {
        let mode = self.session.as_ref().map(|s| s.mode);
        if mode != Some(InteractionMode::Quiz) {
            self.quiz = None;
        }
        if mode != Some(InteractionMode::Simulation) {
            self.simulation.reset();
        }
    }

    /// Switches the interaction mode, clearing the other mode's sub-state.
    /// Returns `false` when there is no session to switch.
    pub fn set_mode(&mut self, mode: InteractionMode) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        session.mode = mode;
        self.enforce_mode_invariants();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::UserRole;

    fn state_in(mode: InteractionMode) -> ConversationState {
        ConversationState::logged_in(Session::new("Rina", UserRole::Kasir, mode).unwrap())
    }

    #[test]
    fn test_phase_without_session_is_login() {
        assert_eq!(ConversationState::default().phase(), Phase::Login);
    }

    #[test]
    fn test_phase_follows_sub_state() {
        let mut state = state_in(InteractionMode::Quiz);
        assert_eq!(state.phase(), Phase::QuizIdle);
        state.quiz = Some(QuizState::awaiting_answer("SOP".into(), "Apa?".into()));
        assert_eq!(state.phase(), Phase::QuizAwaitingAnswer);

        let mut state = state_in(InteractionMode::Simulation);
        assert_eq!(state.phase(), Phase::SimNone);
        state.simulation.phase = SimulationPhase::Evaluating;
        assert_eq!(state.phase(), Phase::SimEvaluating);
    }

    #[test]
    fn test_switching_to_simulation_clears_quiz() {
        let mut state = state_in(InteractionMode::Quiz);
        state.quiz = Some(QuizState::awaiting_answer("SOP".into(), "Apa?".into()));

        assert!(state.set_mode(InteractionMode::Simulation));
        assert!(state.quiz.is_none());
        assert_eq!(state.phase(), Phase::SimNone);
    }

    #[test]
    fn test_switching_to_quiz_clears_simulation() {
        let mut state = state_in(InteractionMode::Simulation);
        state.simulation = SimulationState::active("Skenario".into());

        assert!(state.set_mode(InteractionMode::Quiz));
        assert_eq!(state.simulation, SimulationState::default());
        assert_eq!(state.phase(), Phase::QuizIdle);
    }

    #[test]
    fn test_set_mode_without_session() {
        let mut state = ConversationState::default();
        assert!(!state.set_mode(InteractionMode::Quiz));
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::QuizAwaitingAnswer.to_string(), "quiz_awaiting_answer");
        assert_eq!(
            serde_json::to_string(&Phase::SimFinished).unwrap(),
            "\"sim_finished\""
        );
    }
}
