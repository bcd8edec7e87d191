//! Role-play Simulation Lifecycle
//!
//! A simulation moves through `None -> Active -> Evaluating -> Finished`.
//! The scenario is produced by the generation collaborator in a marked-up
//! format which `parse_scenario` splits into the scenario brief and the
//! customer's opening line.

use serde::{Deserialize, Serialize};

pub const SCENARIO_START: &str = "SCENARIO_START";
pub const SCENARIO_END: &str = "SCENARIO_END";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationPhase {
    #[default]
    None,
    Active,
    Evaluating,
    Finished,
}

/// Simulation sub-state of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationState {
    pub phase: SimulationPhase,
    pub scenario: String,
    /// Consecutive scenario-generation failures while in `None`.
    #[serde(default)]
    pub failed_attempts: u32,
}

impl SimulationState {
    pub fn active(scenario: String) -> Self {
        Self {
            phase: SimulationPhase::Active,
            scenario,
            failed_attempts: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A scenario response that could not be split into brief and opening line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScenarioParseError {
    #[error("response has no SCENARIO_END marker")]
    MissingEndMarker,
    #[error("scenario text between the markers is empty")]
    EmptyScenario,
    #[error("no opening line after SCENARIO_END")]
    EmptyOpening,
}

/// A successfully parsed scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedScenario {
    pub scenario: String,
    pub opening: String,
}

/// Splits a generation response on the scenario markers.
///
/// `SCENARIO_START` may be omitted; everything before `SCENARIO_END` is then
/// taken as the scenario. The opening line ends at the next `SCENARIO_END`, if any.
pub fn parse_scenario(response: &str) -> Result<ParsedScenario, ScenarioParseError> {
    let (head, opening) = response
        .split_once(SCENARIO_END)
        .ok_or(ScenarioParseError::MissingEndMarker)?;

    let scenario = match head.split_once(SCENARIO_START) {
        Some((_, body)) => body,
        None => head,
    }
    .trim();
    if scenario.is_empty() {
        return Err(ScenarioParseError::EmptyScenario);
    }

    // A repeated end marker closes the opening line.
    let opening = opening
        .split_once(SCENARIO_END)
        .map_or(opening, |(first, _)| first)
        .trim();
    if opening.is_empty() {
        return Err(ScenarioParseError::EmptyOpening);
    }

    Ok(ParsedScenario {
        scenario: scenario.to_string(),
        opening: opening.to_string(),
    })
}
