use store::StoreError;
use thiserror::Error;

use crate::auth::AuthKind;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("a {0} request is already in progress")]
    AuthInProgress(AuthKind),

    #[error("authentication request was cancelled")]
    AuthCancelled,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}
