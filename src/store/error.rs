use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("invalid URL format")]
    InvalidUrl,
    #[error("invalid shortcode format: must be alphanumeric and 1-20 characters")]
    InvalidShortcodeFormat,
    #[error("shortcode already exists")]
    ShortcodeCollision,
    #[error("validity must be a positive integer number of minutes or \"never\"")]
    InvalidValidity,
    #[error("shortcode not found")]
    NotFound,
    #[error("short link has expired")]
    Expired,
    #[error("could not generate a unique shortcode after {attempts} attempts")]
    StoreExhausted { attempts: u32 },
}

pub type StoreResult<T> = Result<T, StoreError>;
