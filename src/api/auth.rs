use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use tracing::warn;

use super::{error::ApiError, AppState};

/// Bearer token that matched the configured allow-list.
#[derive(Debug, Clone)]
pub struct AuthorizedToken(pub String);

impl FromRequestParts<AppState> for AuthorizedToken {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Missing or non-bearer headers get the same answer as a wrong token.
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    warn!("request without bearer credentials rejected");
                    ApiError::Unauthorized
                })?;

        let token = state.allowed_tokens.verify(bearer.token()).map_err(|_| {
            warn!(allow_list_size = state.allowed_tokens.len(), "unrecognized bearer token rejected");
            ApiError::Unauthorized
        })?;

        Ok(AuthorizedToken(token.to_owned()))
    }
}
