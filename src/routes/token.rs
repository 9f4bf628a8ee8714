use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::auth::token;
use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/jwt", post(issue_token))
}

async fn issue_token(
    State(state): State<AppState>,
    Json(payload): Json<Map<String, Value>>,
) -> AppResult<Json<TokenResponse>> {
    let auth = &state.config.auth;
    let token = token::issue(payload, &auth.token_secret, auth.token_ttl_minutes)?;
    Ok(Json(TokenResponse { token }))
}
