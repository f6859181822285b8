use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid output tag: {0:?}")]
    InvalidTag(String),
    #[error("invalid field name: {0:?}")]
    InvalidFieldName(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
