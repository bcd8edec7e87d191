use serde::{Deserialize, Serialize};
use std::fmt;

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message in the visible conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.role, self.content)
    }
}

/// Append-only log of turns. Insertion order is what the prompts see.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Turn::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Turn::assistant(content));
    }

    /// Every turn as `role: content`, joined by newlines.
    pub fn transcript(&self) -> String {
        self.turns
            .iter()
            .map(Turn::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Drops everything and starts over from a single turn.
    pub fn reset_to(&mut self, turn: Turn) {
        self.turns = vec![turn];
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_joins_role_prefixed_lines() {
        let mut history = ConversationHistory::new();
        history.push_user("Apa itu SOP Refund?");
        history.push_assistant("SOP Refund adalah prosedur pengembalian dana.");

        assert_eq!(
            history.transcript(),
            "user: Apa itu SOP Refund?\nassistant: SOP Refund adalah prosedur pengembalian dana."
        );
    }

    #[test]
    fn test_empty_transcript() {
        assert_eq!(ConversationHistory::new().transcript(), "");
    }

    #[test]
    fn test_reset_to_single_turn() {
        let mut history = ConversationHistory::new();
        history.push_user("a");
        history.push_assistant("b");
        history.reset_to(Turn::assistant("halo"));

        assert_eq!(history.len(), 1);
        assert_eq!(history.last(), Some(&Turn::assistant("halo")));
    }

    #[test]
    fn test_history_serializes_as_plain_list() {
        let mut history = ConversationHistory::new();
        history.push_user("halo");
        let json = serde_json::to_string(&history).unwrap();
        assert_eq!(json, r#"[{"role":"user","content":"halo"}]"#);
    }
}
