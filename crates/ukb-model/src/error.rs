use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid option {option}: {reason}")]
    InvalidOption { option: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
