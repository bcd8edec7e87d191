use serde::{Deserialize, Serialize};

/// Status of a posed quiz question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizStatus {
    AwaitingAnswer,
}

/// A quiz question that has been asked and not yet answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizState {
    pub status: QuizStatus,
    pub topic: String,
    pub question: String,
}

impl QuizState {
    pub fn awaiting_answer(topic: String, question: String) -> Self {
        Self {
            status: QuizStatus::AwaitingAnswer,
            topic,
            question,
        }
    }
}

/// Pulls the quiz topic out of a free-form request.
///
/// A colon wins over "tentang": `"kuis tentang x: y"` yields `"y"`.
pub fn extract_topic(text: &str) -> String {
    if let Some((_, after)) = text.rsplit_once(':') {
        return after.trim().to_string();
    }
    if let Some((_, after)) = text.split_once("tentang") {
        return after.trim().to_string();
    }
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_after_tentang() {
        assert_eq!(extract_topic("kuis tentang SOP Refund"), "SOP Refund");
    }

    #[test]
    fn test_topic_after_colon() {
        assert_eq!(
            extract_topic("Topik: Penanganan Komplain"),
            "Penanganan Komplain"
        );
    }

    #[test]
    fn test_topic_whole_input_trimmed() {
        assert_eq!(extract_topic("  SOP Refund  "), "SOP Refund");
    }

    #[test]
    fn test_colon_takes_precedence_over_tentang() {
        assert_eq!(
            extract_topic("kuis tentang layanan: Retur Barang"),
            "Retur Barang"
        );
    }

    #[test]
    fn test_last_colon_and_first_tentang() {
        assert_eq!(extract_topic("a: b: c"), "c");
        assert_eq!(
            extract_topic("kuis tentang cerita tentang raket"),
            "cerita tentang raket"
        );
    }
}
