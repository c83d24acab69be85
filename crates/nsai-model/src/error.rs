use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown capability type: {0}")]
    UnknownCapabilityType(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
