use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::collection::{Collection, CollectionName, Document, Filter};
use crate::db::models::{DeleteResult, InsertOneResult};
use crate::error::AppResult;
use crate::extractors::AdminUser;
use crate::payment::{to_minor_units, PaymentError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IntentRequest {
    #[serde(default)]
    pub price: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentResponse {
    pub client_secret: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedPayment {
    pub payment_result: InsertOneResult,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-payment-intent", post(create_payment_intent))
        .route("/payments", get(list_payments).post(record_payment))
        .route("/payments/{id}", delete(delete_payment))
}

fn payments(state: &AppState) -> Collection {
    state.collection(CollectionName::Payments)
}

async fn create_payment_intent(
    State(state): State<AppState>,
    Json(request): Json<IntentRequest>,
) -> AppResult<Json<IntentResponse>> {
    // A price with no numeric value is answered here with the provider's own
    // "Invalid integer" rejection instead of being sent on as a NaN amount.
    let amount = to_minor_units(&request.price)
        .ok_or_else(|| PaymentError::Rejected(format!("Invalid integer: {}", request.price)))?;
    tracing::info!("Creating payment intent for {} minor units", amount);

    let intent = state
        .payments
        .create_intent(amount, &state.config.payments.currency)
        .await?;

    Ok(Json(IntentResponse {
        client_secret: intent.client_secret,
    }))
}

/// Stored as sent; nothing checks it against the payment provider.
async fn record_payment(
    State(state): State<AppState>,
    Json(payment): Json<Document>,
) -> AppResult<Json<RecordedPayment>> {
    let logged = Value::Object(payment.clone());
    tracing::info!("Recording payment: {}", logged);
    let payment_result = payments(&state).insert_one(payment)?;
    Ok(Json(RecordedPayment { payment_result }))
}

async fn list_payments(State(state): State<AppState>) -> AppResult<Json<Vec<Document>>> {
    Ok(Json(payments(&state).find(&Filter::new())?))
}

async fn delete_payment(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteResult>> {
    Ok(Json(payments(&state).delete_one(&Filter::by_id(&id))?))
}
