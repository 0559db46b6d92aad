pub mod battle;
pub mod catalog;
pub mod draw;
pub mod error;

pub use battle::{AnswerReport, Battle, BattleSession, Outcome, Phase, Score};
pub use catalog::Catalog;
pub use draw::{RandomDraw, ScoreDraw};
pub use error::QuizError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Topic {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub category: String,
}

impl Topic {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        description: impl Into<String>,
        difficulty: Difficulty,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            difficulty,
            category: category.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Question {
    /// Unique within its topic only.
    pub id: u32,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option_index: usize,
    pub explanation: String,
}

impl Question {
    pub fn new(
        id: u32,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_option_index: usize,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            id,
            prompt: prompt.into(),
            options,
            correct_option_index,
            explanation: explanation.into(),
        }
    }

    pub fn correct_option(&self) -> Option<&str> {
        self.options
            .get(self.correct_option_index)
            .map(String::as_str)
    }

    /// Maps the text of a rendered option back to its index.
    pub fn option_index(&self, text: &str) -> Option<usize> {
        self.options.iter().position(|o| o == text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Online,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Opponent {
    pub id: u32,
    pub name: String,
    pub specialties: Vec<String>,
    /// Percentage in `0..=100`, used as the per-question chance to score.
    pub win_rate_level: u8,
    pub presence: Presence,
}

impl Opponent {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        specialties: Vec<String>,
        win_rate_level: u8,
        presence: Presence,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            specialties,
            win_rate_level,
            presence,
        }
    }

    pub fn is_online(&self) -> bool {
        self.presence == Presence::Online
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary_search_question() -> Question {
        Question::new(
            1,
            "What is the time complexity of a binary search algorithm?",
            vec![
                "O(n)".to_string(),
                "O(log n)".to_string(),
                "O(n²)".to_string(),
                "O(1)".to_string(),
            ],
            1,
            "It halves the search space in each step.",
        )
    }

    #[test]
    fn test_correct_option_text() {
        assert_eq!(binary_search_question().correct_option(), Some("O(log n)"));
    }

    #[test]
    fn test_option_index_from_text() {
        let question = binary_search_question();
        assert_eq!(question.option_index("O(1)"), Some(3));
        assert_eq!(question.option_index("O(n log n)"), None);
    }

    #[test]
    fn test_presence_serializes_lowercase() {
        let json = serde_json::to_string(&Presence::Offline).unwrap();
        assert_eq!(json, "\"offline\"");
    }
}
