//! Document-level acquisition errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AcquireError {
    #[error("Unreadable document: {0}")]
    Unreadable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF is encrypted but no password was provided")]
    PasswordRequired,

    #[error("Incorrect password for encrypted PDF")]
    IncorrectPassword,

    #[error("Failed to decrypt PDF: {0}")]
    Decryption(String),
}

impl AcquireError {
    /// True for the two password problems a user can fix by re-running
    pub fn is_password_error(&self) -> bool {
        matches!(self, AcquireError::PasswordRequired | AcquireError::IncorrectPassword)
    }
}

pub type Result<T> = std::result::Result<T, AcquireError>;
