use thiserror::Error;

use crate::domain::{ParseCentsError, ValidationError};

use super::SessionId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Invalid expense: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] ParseCentsError),

    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),
}
