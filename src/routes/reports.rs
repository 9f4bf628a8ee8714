use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::db::collection::{Collection, CollectionName, Document, Filter};
use crate::db::models::InsertOneResult;
use crate::error::AppResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reports", get(list_reports).post(create_report))
        .route("/reports/{id}", get(report_by_id))
        .route("/reports/surveys/{survey_id}", get(reports_for_survey))
        .route("/reports/email/{email}", get(reports_by_reporter))
}

fn reports(state: &AppState) -> Collection {
    state.collection(CollectionName::Reports)
}

async fn create_report(
    State(state): State<AppState>,
    Json(report): Json<Document>,
) -> AppResult<Json<InsertOneResult>> {
    Ok(Json(reports(&state).insert_one(report)?))
}

async fn list_reports(State(state): State<AppState>) -> AppResult<Json<Vec<Document>>> {
    Ok(Json(reports(&state).find(&Filter::new())?))
}

async fn report_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Option<Document>>> {
    Ok(Json(reports(&state).find_one(&Filter::by_id(&id))?))
}

async fn reports_for_survey(
    State(state): State<AppState>,
    Path(survey_id): Path<String>,
) -> AppResult<Json<Vec<Document>>> {
    Ok(Json(
        reports(&state).find(&Filter::new().eq("survey_id", survey_id))?,
    ))
}

async fn reports_by_reporter(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<Vec<Document>>> {
    Ok(Json(reports(&state).find(&Filter::new().eq("reporter", email))?))
}
