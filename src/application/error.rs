use thiserror::Error;

use crate::domain::ValidationError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid record: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Id prefix '{0}' matches more than one record")]
    AmbiguousId(String),

    #[error("Wipe was not confirmed")]
    WipeNotConfirmed,

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
