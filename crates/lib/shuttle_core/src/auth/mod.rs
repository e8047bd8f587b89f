//! Token-based authentication.
//!
//! Provides JWT issuing and verification shared by `shuttle_api` and the
//! server binary.

pub mod jwt;

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token error: {0}")]
    TokenError(String),
}
