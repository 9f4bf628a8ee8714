use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::db::collection::{Collection, CollectionName, Document, Filter};
use crate::db::models::{InsertOneResult, VoteChoice};
use crate::error::AppResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/vote", get(list_votes).post(cast_vote))
        .route("/vote/{email}", get(votes_by_voter))
        .route("/vote/survey/{id}", get(votes_for_survey))
        .route("/vote/survey/yes/{id}", get(yes_votes_for_survey))
        .route("/vote/survey/no/{id}", get(no_votes_for_survey))
        .route("/vote/id/{id}", get(vote_by_id))
}

fn votes(state: &AppState) -> Collection {
    state.collection(CollectionName::Votes)
}

async fn list_votes(State(state): State<AppState>) -> AppResult<Json<Vec<Document>>> {
    Ok(Json(votes(&state).find(&Filter::new())?))
}

async fn votes_by_voter(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<Vec<Document>>> {
    Ok(Json(
        votes(&state).find(&Filter::new().eq("currentUserEmail", email))?,
    ))
}

async fn votes_for_survey(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Document>>> {
    Ok(Json(votes(&state).find(&Filter::new().eq("survey_id", id))?))
}

async fn yes_votes_for_survey(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Document>>> {
    votes_with_choice(&state, id, VoteChoice::Yes)
}

async fn no_votes_for_survey(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Document>>> {
    votes_with_choice(&state, id, VoteChoice::No)
}

fn votes_with_choice(
    state: &AppState,
    survey_id: String,
    choice: VoteChoice,
) -> AppResult<Json<Vec<Document>>> {
    let filter = Filter::new()
        .eq("survey_id", survey_id)
        .eq("vote", choice.as_str());
    Ok(Json(votes(state).find(&filter)?))
}

async fn vote_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Option<Document>>> {
    Ok(Json(votes(&state).find_one(&Filter::by_id(&id))?))
}

/// Every call stores a new vote; repeat votes by the same user are kept.
async fn cast_vote(
    State(state): State<AppState>,
    Json(vote): Json<Document>,
) -> AppResult<Json<InsertOneResult>> {
    Ok(Json(votes(&state).insert_one(vote)?))
}
