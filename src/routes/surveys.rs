use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};

use crate::db::collection::{Collection, CollectionName, Document, Filter};
use crate::db::models::{DeleteResult, InsertOneResult, UpdateResult};
use crate::error::AppResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/surveys", get(list_surveys))
        .route("/surveys/{id}", get(survey_by_id))
        .route("/surveys/email/{email}", get(surveys_by_surveyor))
        .route("/addSurvey", post(add_survey))
        .route("/editSurvey/{id}", put(edit_survey))
        .route("/survey/{id}", delete(delete_survey))
}

fn surveys(state: &AppState) -> Collection {
    state.collection(CollectionName::Surveys)
}

async fn list_surveys(State(state): State<AppState>) -> AppResult<Json<Vec<Document>>> {
    Ok(Json(surveys(&state).find(&Filter::new())?))
}

async fn survey_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Option<Document>>> {
    Ok(Json(surveys(&state).find_one(&Filter::by_id(&id))?))
}

async fn surveys_by_surveyor(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<Vec<Document>>> {
    Ok(Json(
        surveys(&state).find(&Filter::new().eq("Surveyor_email", email))?,
    ))
}

async fn add_survey(
    State(state): State<AppState>,
    Json(survey): Json<Document>,
) -> AppResult<Json<InsertOneResult>> {
    Ok(Json(surveys(&state).insert_one(survey)?))
}

async fn edit_survey(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<Document>,
) -> AppResult<Json<UpdateResult>> {
    Ok(Json(surveys(&state).update_one(&Filter::by_id(&id), update)?))
}

/// Votes, comments and reports pointing at the survey are left in place.
async fn delete_survey(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteResult>> {
    Ok(Json(surveys(&state).delete_one(&Filter::by_id(&id))?))
}
