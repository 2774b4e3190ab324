//! Cognitive-model error type.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CognitiveError {
    #[error("configuration error: {0}")]
    Config(String),
}

pub type CognitiveResult<T> = Result<T, CognitiveError>;
