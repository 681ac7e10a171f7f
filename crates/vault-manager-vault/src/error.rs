use std::error::Error;

use vault_manager_core::StoreError;

/// Errors raised by [`VaultClient`](crate::VaultClient).
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("Invalid Vault address: {0}")]
    InvalidAddress(String),

    #[error("HTTP request to Vault failed")]
    Http(#[from] reqwest::Error),

    #[error("Vault returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response from Vault: {0}")]
    InvalidResponse(String),
}

impl VaultError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Returns the HTTP status Vault answered with, if it answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<VaultError> for StoreError {
    fn from(err: VaultError) -> Self {
        match err {
            VaultError::Status { status, message } => StoreError::status(status, message),
            VaultError::InvalidResponse(message) => StoreError::invalid_response(message),
            VaultError::Http(e) => StoreError::connection(chain_message(&e)),
            VaultError::InvalidAddress(address) => {
                StoreError::connection(format!("invalid Vault address: {address}"))
            }
        }
    }
}

/// Joins an error with its causes, since `StoreError` only keeps text.
fn chain_message(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut next = err.source();
    while let Some(cause) = next {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        next = cause.source();
    }
    message
}
