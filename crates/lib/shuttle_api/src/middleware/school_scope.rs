//! School scope middleware — resolves the authenticated user to the one
//! school they may act on.
//!
//! Must run inside [`require_auth`](super::auth::require_auth).

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::AppState;
use crate::error::AppError;
use crate::middleware::auth::AuthenticatedUser;
use crate::services::permissions::check_permitted_school_access;

/// Axum middleware: injects the caller's `SchoolScope` into request
/// extensions, or rejects with 403.
pub async fn require_school_scope(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let AuthenticatedUser(claims) = request
        .extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("Invalid token".into()))?;

    let scope = check_permitted_school_access(state.store.as_ref(), &claims).await?;
    request.extensions_mut().insert(scope);

    Ok(next.run(request).await)
}
