//! Request extractors

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use deepresearch_common::errors::AppError;
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body that is deserialized and validated before reaching the handler.
///
/// Malformed bodies and unknown enum values (such as an unsupported research
/// mode) are rejected as [`AppError::InvalidFormat`], failed field constraints
/// as [`AppError::Validation`]; both render as `{"detail": ...}`.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::InvalidFormat {
                message: rejection.body_text(),
            })?;

        value.validate()?;
        Ok(ValidatedJson(value))
    }
}
