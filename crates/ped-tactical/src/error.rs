use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TacticalError {
    #[error("tactical configuration error: {0}")]
    Config(String),
}

pub type TacticalResult<T> = Result<T, TacticalError>;
