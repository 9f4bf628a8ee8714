use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use serde_json::Value;

use crate::db::collection::{Document, Filter};
use crate::db::models::{AlreadyExists, DeleteResult, Role, UpdateResult};
use crate::error::AppResult;
use crate::extractors::AdminUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        // `{id}` is the email for GET and the document id for DELETE.
        .route("/users/{id}", get(user_by_email).delete(delete_user))
        .route("/user", post(create_user))
        .route("/edit/{id}", put(edit_user))
        .route("/users/admin/{id}", patch(make_admin))
        .route("/users/pro/{id}", patch(make_pro))
        .route("/users/surveyor/{id}", patch(make_surveyor))
        .route("/users/user/{id}", patch(make_user))
}

async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<Document>>> {
    Ok(Json(state.users().find(&Filter::new())?))
}

async fn user_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<Option<Document>>> {
    Ok(Json(
        state.users().find_one(&Filter::new().eq("email", email))?,
    ))
}

/// Insert unless a user with the same email already exists. The check and
/// the insert are separate store calls, so concurrent requests can both insert.
async fn create_user(
    State(state): State<AppState>,
    Json(user): Json<Document>,
) -> AppResult<Response> {
    let users = state.users();
    let email = user.get("email").cloned().unwrap_or(Value::Null);

    if users.find_one(&Filter::new().eq("email", email))?.is_some() {
        return Ok(Json(AlreadyExists::default()).into_response());
    }

    Ok(Json(users.insert_one(user)?).into_response())
}

async fn edit_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<Document>,
) -> AppResult<Json<UpdateResult>> {
    Ok(Json(state.users().update_one(&Filter::by_id(&id), update)?))
}

async fn make_admin(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<UpdateResult>> {
    set_role(&state, &id, Role::Admin)
}

async fn make_pro(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<UpdateResult>> {
    set_role(&state, &id, Role::Pro)
}

async fn make_surveyor(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<UpdateResult>> {
    set_role(&state, &id, Role::Surveyor)
}

async fn make_user(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<UpdateResult>> {
    set_role(&state, &id, Role::User)
}

fn set_role(state: &AppState, id: &str, role: Role) -> AppResult<Json<UpdateResult>> {
    let mut set = Document::new();
    set.insert("role".to_string(), Value::from(role.as_str()));
    Ok(Json(state.users().update_one(&Filter::by_id(id), set)?))
}

async fn delete_user(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteResult>> {
    Ok(Json(state.users().delete_one(&Filter::by_id(&id))?))
}
