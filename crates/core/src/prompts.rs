//! Prompt Template Catalog
//!
//! Holds the six instruction templates the controller chooses between and
//! fills them with session and history context. Templates are plain text with
//! `{name}` placeholders, loaded from a prompts directory (one `<key>.md` file
//! per template) or taken from the copies compiled into the crate.

use crate::session::UserRole;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Identifies one of the six templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKey {
    Qa,
    QuizGeneration,
    QuizEvaluation,
    SimGenerate,
    SimInteraction,
    SimEvaluation,
}

impl TemplateKey {
    pub const ALL: [TemplateKey; 6] = [
        TemplateKey::Qa,
        TemplateKey::QuizGeneration,
        TemplateKey::QuizEvaluation,
        TemplateKey::SimGenerate,
        TemplateKey::SimInteraction,
        TemplateKey::SimEvaluation,
    ];

    /// The file stem the template is stored under.
    pub fn file_stem(&self) -> &'static str {
        match self {
            TemplateKey::Qa => "qa",
            TemplateKey::QuizGeneration => "quiz_generation",
            TemplateKey::QuizEvaluation => "quiz_evaluation",
            TemplateKey::SimGenerate => "sim_generate",
            TemplateKey::SimInteraction => "sim_interaction",
            TemplateKey::SimEvaluation => "sim_evaluation",
        }
    }

    fn builtin(&self) -> &'static str {
        match self {
            TemplateKey::Qa => include_str!("../../../prompts/qa.md"),
            TemplateKey::QuizGeneration => include_str!("../../../prompts/quiz_generation.md"),
            TemplateKey::QuizEvaluation => include_str!("../../../prompts/quiz_evaluation.md"),
            TemplateKey::SimGenerate => include_str!("../../../prompts/sim_generate.md"),
            TemplateKey::SimInteraction => include_str!("../../../prompts/sim_interaction.md"),
            TemplateKey::SimEvaluation => include_str!("../../../prompts/sim_evaluation.md"),
        }
    }
}

/// The full set of instruction templates.
#[derive(Debug, Clone)]
pub struct PromptTemplateSet {
    templates: HashMap<TemplateKey, String>,
}

impl Default for PromptTemplateSet {
    fn default() -> Self {
        let templates = TemplateKey::ALL
            .into_iter()
            .map(|key| (key, key.builtin().to_string()))
            .collect();
        Self { templates }
    }
}

impl PromptTemplateSet {
    /// Loads every template from `<dir>/<key>.md`. All six must be present.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut templates = HashMap::new();
        for key in TemplateKey::ALL {
            let path = dir.join(format!("{}.md", key.file_stem()));
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Missing prompt template: '{}'", path.display()))?;
            templates.insert(key, content);
        }
        Ok(Self { templates })
    }

    fn render(&self, key: TemplateKey, params: &[(&str, &str)]) -> String {
        let template = self
            .templates
            .get(&key)
            .map(String::as_str)
            .unwrap_or_else(|| key.builtin());
        render_template(template, params)
    }

    pub fn qa(&self, user_name: &str, user_role: UserRole, history_text: &str) -> String {
        self.render(
            TemplateKey::Qa,
            &[
                ("user_name", user_name),
                ("user_role", user_role.label()),
                ("history_text", history_text),
            ],
        )
    }

    pub fn quiz_generation(
        &self,
        user_name: &str,
        user_role: UserRole,
        history_text: &str,
    ) -> String {
        self.render(
            TemplateKey::QuizGeneration,
            &[
                ("user_name", user_name),
                ("user_role", user_role.label()),
                ("history_text", history_text),
            ],
        )
    }

    pub fn quiz_evaluation(
        &self,
        user_name: &str,
        user_role: UserRole,
        history_text: &str,
        quiz_question: &str,
        user_answer: &str,
    ) -> String {
        self.render(
            TemplateKey::QuizEvaluation,
            &[
                ("user_name", user_name),
                ("user_role", user_role.label()),
                ("history_text", history_text),
                ("quiz_question", quiz_question),
                ("user_answer", user_answer),
            ],
        )
    }

    pub fn sim_generate(&self, topic: &str, user_role: UserRole) -> String {
        self.render(
            TemplateKey::SimGenerate,
            &[("topic", topic), ("user_role", user_role.label())],
        )
    }

    pub fn sim_interaction(&self, scenario: &str, history: &str, user_role: UserRole) -> String {
        self.render(
            TemplateKey::SimInteraction,
            &[
                ("scenario", scenario),
                ("history", history),
                ("user_role", user_role.label()),
            ],
        )
    }

    pub fn sim_evaluation(
        &self,
        scenario: &str,
        history: &str,
        user_name: &str,
        user_role: UserRole,
    ) -> String {
        self.render(
            TemplateKey::SimEvaluation,
            &[
                ("scenario", scenario),
                ("history", history),
                ("user_name", user_name),
                ("user_role", user_role.label()),
            ],
        )
    }
}

/// Substitutes `{name}` placeholders in one pass. Substituted text is never
/// scanned again, and unknown placeholders are kept verbatim.
pub fn render_template(template: &str, params: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        let substituted = after_open.find('}').and_then(|close| {
            let name = &after_open[..close];
            params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match substituted {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after_open[close + 1..];
            }
            None => {
                out.push('{');
                rest = after_open;
            }
        }
    }
    out.push_str(rest);
    out
}
