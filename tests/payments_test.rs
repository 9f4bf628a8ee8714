//! Payment intents and recorded payments

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::test_app;

#[tokio::test]
async fn intent_is_created_in_cents_and_returns_client_secret() {
    let app = test_app();

    let (status, body) = app
        .post("/create-payment-intent", json!({ "price": 12.5 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "clientSecret": "pi_1250_secret" }));

    let intents = app.gateway.intents.lock().unwrap().clone();
    assert_eq!(intents, vec![(1250, "usd".to_string())]);
}

#[tokio::test]
async fn fractional_cents_are_truncated() {
    let app = test_app();
    app.post("/create-payment-intent", json!({ "price": 0.29 }))
        .await;
    app.post("/create-payment-intent", json!({ "price": "5.559" }))
        .await;

    let amounts: Vec<i64> = app
        .gateway
        .intents
        .lock()
        .unwrap()
        .iter()
        .map(|(amount, _)| *amount)
        .collect();
    assert_eq!(amounts, vec![28, 555]);
}

#[tokio::test]
async fn provider_rejection_is_returned_to_the_client() {
    let app = test_app();

    let (status, body) = app
        .post("/create-payment-intent", json!({ "price": -3 }))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body["message"],
        "This value must be greater than or equal to 1."
    );
    assert!(app.gateway.intents.lock().unwrap().is_empty());
}

#[tokio::test]
async fn non_numeric_price_fails_without_an_intent() {
    let app = test_app();

    for body in [json!({ "price": "free" }), json!({})] {
        let (status, response) = app.post("/create-payment-intent", body).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(response["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid integer"));
    }
    assert!(app.gateway.intents.lock().unwrap().is_empty());
}

#[tokio::test]
async fn recorded_payments_are_stored_verbatim() {
    let app = test_app();
    let payment = json!({
        "email": "ann@x.io",
        "price": 19.99,
        "transactionId": "pi_1999",
        "date": "2024-05-20T10:00:00Z"
    });

    let (status, body) = app.post("/payments", payment.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["paymentResult"]["acknowledged"], true);
    let id = body["paymentResult"]["insertedId"].as_str().unwrap().to_string();

    let (_, all) = app.get("/payments").await;
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 1);

    let mut expected = payment;
    expected["_id"] = json!(id);
    assert_eq!(all[0], expected);
}

#[tokio::test]
async fn deleting_a_payment_requires_an_admin() {
    let app = test_app();
    app.seed_user("root@x.io", "admin");
    app.seed_user("ann@x.io", "pro");

    let (_, body) = app.post("/payments", json!({ "email": "ann@x.io" })).await;
    let id = body["paymentResult"]["insertedId"].as_str().unwrap().to_string();
    let uri = format!("/payments/{}", id);

    let (status, _) = app.delete(&uri).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request(Method::DELETE, &uri, None, Some(&app.token_for("ann@x.io")))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, ack) = app
        .request(Method::DELETE, &uri, None, Some(&app.token_for("root@x.io")))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["deletedCount"], 1);

    let (_, all) = app.get("/payments").await;
    assert!(all.as_array().unwrap().is_empty());
}
