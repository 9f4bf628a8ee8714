use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::db::collection::{Collection, CollectionName, Document, Filter};
use crate::db::models::{DeleteResult, InsertOneResult};
use crate::error::AppResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/com", get(list_comments).post(create_comment))
        // `{id}` is the survey id for GET and the comment id for DELETE.
        .route("/com/{id}", get(comments_for_survey).delete(delete_comment))
        .route("/com/email/{email}", get(comments_by_author))
}

fn comments(state: &AppState) -> Collection {
    state.collection(CollectionName::Comments)
}

async fn create_comment(
    State(state): State<AppState>,
    Json(comment): Json<Document>,
) -> AppResult<Json<InsertOneResult>> {
    Ok(Json(comments(&state).insert_one(comment)?))
}

async fn comments_for_survey(
    State(state): State<AppState>,
    Path(survey_id): Path<String>,
) -> AppResult<Json<Vec<Document>>> {
    Ok(Json(
        comments(&state).find(&Filter::new().eq("survey_id", survey_id))?,
    ))
}

async fn comments_by_author(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<Vec<Document>>> {
    Ok(Json(
        comments(&state).find(&Filter::new().eq("currentUserEmail", email))?,
    ))
}

async fn list_comments(State(state): State<AppState>) -> AppResult<Json<Vec<Document>>> {
    Ok(Json(comments(&state).find(&Filter::new())?))
}

/// Anyone may delete any comment.
async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteResult>> {
    Ok(Json(comments(&state).delete_one(&Filter::by_id(&id))?))
}
