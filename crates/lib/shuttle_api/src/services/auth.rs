//! Authentication service — token issuing delegating to `shuttle_core::auth`.

use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub use shuttle_core::auth::jwt::{
    ACCESS_TOKEN_EXPIRY_SECS, resolve_jwt_secret, verify_access_token,
};
pub use shuttle_core::models::auth::TokenClaims;

/// Generate a signed JWT access token (HS256) for `user_id`.
pub fn issue_access_token(
    user_id: Uuid,
    username: &str,
    ttl_secs: i64,
    secret: &[u8],
) -> AppResult<String> {
    shuttle_core::auth::jwt::generate_access_token(user_id, username, ttl_secs, secret)
        .map_err(|e| AppError::internal("Failed to issue token", e))
}
