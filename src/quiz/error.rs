use thiserror::Error;

use crate::quiz::Phase;

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("cannot {action} while {phase}")]
    InvalidTransition { action: &'static str, phase: Phase },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{kind} {id} not found in catalog")]
    NotFound { kind: &'static str, id: u32 },

    #[error("catalog data is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QuizError>;
