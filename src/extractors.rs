use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::auth::{token, Claims};
use crate::db::collection::Filter;
use crate::db::models::Role;
use crate::error::AppError;
use crate::state::AppState;

/// Caller holding a valid access token.
/// Returns 401 if the `Authorization` header is missing or the token does not verify.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let authorization = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AppError::Unauthorized)?;
        tracing::debug!("Verifying access token");

        let bearer = bearer_token(authorization);
        let claims = token::verify(bearer, &state.config.auth.token_secret).map_err(|e| {
            tracing::debug!("Rejected access token: {}", e);
            AppError::Unauthorized
        })?;

        Ok(AuthUser(claims))
    }
}

/// Caller whose token identifies a stored user with the admin role.
/// Verifies the token first (401), then re-reads the user on every request (403).
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        let email = claims.email().ok_or(AppError::Forbidden)?;

        let user = state.users().find_one(&Filter::new().eq("email", email))?;
        let is_admin = user
            .as_ref()
            .and_then(|u| u.get("role"))
            .and_then(|r| r.as_str())
            == Some(Role::Admin.as_str());

        if !is_admin {
            return Err(AppError::Forbidden);
        }
        Ok(AdminUser(claims))
    }
}

/// The token is the second space-separated part of the header value.
fn bearer_token(authorization: &str) -> &str {
    authorization.split(' ').nth(1).unwrap_or_default()
}
