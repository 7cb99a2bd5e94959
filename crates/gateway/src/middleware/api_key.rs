//! API-key extractor.
//!
//! Provides an extractor for requiring the `X-API-Key` header in route
//! handlers. When no key is configured the check is disabled entirely and
//! every request passes.

use axum::{extract::FromRequestParts, http::request::Parts};
use secrecy::ExposeSecret;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the gateway API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Extractor that requires a valid gateway API key.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     _auth: RequireApiKey,
///     State(state): State<AppState>,
/// ) -> impl IntoResponse {
///     // only reached with a valid key (or no key configured)
/// }
/// ```
pub struct RequireApiKey;

impl FromRequestParts<AppState> for RequireApiKey {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config().gateway_api_key.as_ref() else {
            // No key configured: open access.
            return Ok(Self);
        };

        let presented = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok());

        if presented == Some(expected.expose_secret()) {
            Ok(Self)
        } else {
            Err(AppError::Unauthorized("Invalid API Key".to_string()))
        }
    }
}
