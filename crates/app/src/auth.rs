use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use services::AuthenticatedUser;

use crate::AppState;
use crate::error::ApiError;

/// The caller identified by the `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthenticatedUser);

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::Unauthorized("Not authenticated"))?;
        let user = state.auth.authenticate(token).await.map_err(|err| {
            tracing::debug!(error = %err, "rejected bearer token");
            ApiError::from(err)
        })?;
        Ok(Self(user))
    }
}
