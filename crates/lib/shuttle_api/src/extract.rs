//! Request extractors.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use shuttle_core::validation::RequestBody;
use tracing::debug;

use crate::error::AppError;

/// JSON body that has been deserialized, normalized, and passed its
/// `validator` rules.
///
/// Unparseable bodies reject with `"Invalid request data"`; rule failures
/// reject with the first violation in field declaration order as
/// `"<field> is <tag>"`.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + RequestBody,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            debug!(error = %e, "rejected request body");
            AppError::Validation("Invalid request data".into())
        })?;

        value.normalize_and_validate().map(ValidatedJson).map_err(|violation| {
            let message = violation
                .map(|v| v.to_string())
                .unwrap_or_else(|| "Invalid request data".into());
            AppError::Validation(message)
        })
    }
}
