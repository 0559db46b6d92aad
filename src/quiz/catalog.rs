use std::collections::{HashMap, HashSet};

use crate::quiz::error::{QuizError, Result};
use crate::quiz::{Opponent, Question, Topic};

const BUNDLED_CATALOG: &str = include_str!("../../assets/catalog.json");

/// Read-only topics, question sets and opponents for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Catalog {
    topics: Vec<Topic>,
    questions: HashMap<u32, Vec<Question>>,
    opponents: Vec<Opponent>,
}

#[derive(serde::Deserialize)]
struct CatalogFile {
    topics: Vec<TopicEntry>,
    opponents: Vec<Opponent>,
}

#[derive(serde::Deserialize)]
struct TopicEntry {
    #[serde(flatten)]
    topic: Topic,
    questions: Vec<Question>,
}

impl Catalog {
    pub fn new(
        topics: Vec<Topic>,
        questions: HashMap<u32, Vec<Question>>,
        opponents: Vec<Opponent>,
    ) -> Result<Self> {
        let mut topic_ids = HashSet::new();
        let mut topic_names = HashSet::new();
        for topic in &topics {
            if !topic_ids.insert(topic.id) {
                return Err(QuizError::InvalidArgument(format!(
                    "duplicate topic id {}",
                    topic.id
                )));
            }
            // Names double as lookup keys, see `topic_by_name`
            if !topic_names.insert(topic.name.clone()) {
                return Err(QuizError::InvalidArgument(format!(
                    "duplicate topic name {:?}",
                    topic.name
                )));
            }
            let set = questions.get(&topic.id).map(Vec::as_slice).unwrap_or(&[]);
            if set.is_empty() {
                return Err(QuizError::InvalidArgument(format!(
                    "topic {} has no questions",
                    topic.id
                )));
            }
            let mut question_ids = HashSet::new();
            for question in set {
                if !question_ids.insert(question.id) {
                    return Err(QuizError::InvalidArgument(format!(
                        "duplicate question id {} in topic {}",
                        question.id, topic.id
                    )));
                }
                if question.options.is_empty() {
                    return Err(QuizError::InvalidArgument(format!(
                        "question {} of topic {} has no options",
                        question.id, topic.id
                    )));
                }
                if question.correct_option_index >= question.options.len() {
                    return Err(QuizError::InvalidArgument(format!(
                        "question {} of topic {} marks option {} correct but has {} options",
                        question.id,
                        topic.id,
                        question.correct_option_index,
                        question.options.len()
                    )));
                }
                let mut option_texts = HashSet::new();
                if let Some(repeated) = question
                    .options
                    .iter()
                    .find(|o| !option_texts.insert(o.as_str()))
                {
                    return Err(QuizError::InvalidArgument(format!(
                        "question {} of topic {} repeats option {:?}",
                        question.id, topic.id, repeated
                    )));
                }
            }
        }
        if let Some(orphan) = questions.keys().find(|id| !topic_ids.contains(*id)) {
            return Err(QuizError::InvalidArgument(format!(
                "question set for unknown topic {}",
                orphan
            )));
        }

        let mut opponent_ids = HashSet::new();
        let mut opponent_names = HashSet::new();
        for opponent in &opponents {
            if !opponent_ids.insert(opponent.id) {
                return Err(QuizError::InvalidArgument(format!(
                    "duplicate opponent id {}",
                    opponent.id
                )));
            }
            if !opponent_names.insert(opponent.name.clone()) {
                return Err(QuizError::InvalidArgument(format!(
                    "duplicate opponent name {:?}",
                    opponent.name
                )));
            }
            if opponent.win_rate_level > 100 {
                return Err(QuizError::InvalidArgument(format!(
                    "opponent {} has win rate {} above 100",
                    opponent.id, opponent.win_rate_level
                )));
            }
        }

        Ok(Self {
            topics,
            questions,
            opponents,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let mut topics = Vec::with_capacity(file.topics.len());
        let mut questions = HashMap::with_capacity(file.topics.len());
        for entry in file.topics {
            // Duplicate topic ids are rejected by `new`.
            questions.entry(entry.topic.id).or_insert(entry.questions);
            topics.push(entry.topic);
        }
        Self::new(topics, questions, file.opponents)
    }

    /// The catalog shipped with the bot.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_CATALOG)
    }

    pub fn list_topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn list_opponents(&self) -> &[Opponent] {
        &self.opponents
    }

    pub fn questions_for(&self, topic_id: u32) -> Result<&[Question]> {
        self.questions
            .get(&topic_id)
            .map(Vec::as_slice)
            .ok_or(QuizError::NotFound {
                kind: "topic",
                id: topic_id,
            })
    }

    pub fn topic(&self, id: u32) -> Result<&Topic> {
        self.topics
            .iter()
            .find(|t| t.id == id)
            .ok_or(QuizError::NotFound { kind: "topic", id })
    }

    pub fn opponent(&self, id: u32) -> Result<&Opponent> {
        self.opponents
            .iter()
            .find(|o| o.id == id)
            .ok_or(QuizError::NotFound {
                kind: "opponent",
                id,
            })
    }

    pub fn topic_by_name(&self, name: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.name == name)
    }

    pub fn opponent_by_name(&self, name: &str) -> Option<&Opponent> {
        self.opponents.iter().find(|o| o.name == name)
    }
}
