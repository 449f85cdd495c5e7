//! Error types for the eye-clinic library.
//!
//! This module provides custom error types using `thiserror` so that every
//! failure a clinic workflow can hit carries a message fit to show the user.

use thiserror::Error;

use crate::session::Role;
use crate::validation::ValidationError;

/// Errors that can occur in the eye-clinic application.
#[derive(Error, Debug)]
pub enum ClinicError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Connection pool errors
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A form field broke one of the input rules
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// No account matched the email and password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The operation needs a session of the given role
    #[error("You must be logged in as {0} to do that")]
    NotAuthenticated(Role),

    /// A required choice (ophthalmologist, patient, appointment) is missing or not allowed
    #[error("{0}")]
    NoSelection(&'static str),

    /// A row addressed by id does not exist or is not visible to this session
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Convenience type alias for Result with `ClinicError`
pub type Result<T> = std::result::Result<T, ClinicError>;
