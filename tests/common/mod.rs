//! Shared helpers for the HTTP-level tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Map, Value};
use tempfile::TempDir;
use tower::util::ServiceExt;

use insight_nexus::auth::token;
use insight_nexus::config::Config;
use insight_nexus::db;
use insight_nexus::db::collection::{Collection, CollectionName};
use insight_nexus::payment::{PaymentError, PaymentGateway, PaymentIntent};
use insight_nexus::routes;
use insight_nexus::state::{AppState, DbPool};

pub const SECRET: &str = "test-secret";

/// Payment provider stand-in that records every intent it is asked for and,
/// like the real one, refuses amounts below one minor unit.
#[derive(Default)]
pub struct RecordingGateway {
    pub intents: Mutex<Vec<(i64, String)>>,
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn create_intent(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        if amount < 1 {
            return Err(PaymentError::Rejected(
                "This value must be greater than or equal to 1.".to_string(),
            ));
        }
        self.intents
            .lock()
            .unwrap()
            .push((amount, currency.to_string()));
        Ok(PaymentIntent {
            id: format!("pi_{}", amount),
            client_secret: Some(format!("pi_{}_secret", amount)),
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub gateway: Arc<RecordingGateway>,
    _dir: TempDir,
}

pub fn test_app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let pool = db::create_pool(&dir.path().join("test.db"));
    db::run_migrations(&pool).expect("Failed to run migrations");
    build(pool, dir)
}

/// App whose store cannot be opened: any handler that touches it fails.
pub fn app_without_store() -> TestApp {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let pool = db::create_pool(&blocker.join("test.db"));
    build(pool, dir)
}

fn build(pool: DbPool, dir: TempDir) -> TestApp {
    let mut config = Config::default();
    config.auth.token_secret = SECRET.to_string();

    let gateway = Arc::new(RecordingGateway::default());
    let state = AppState {
        db: pool,
        config,
        payments: gateway.clone(),
    };

    TestApp {
        router: routes::create_router(state.clone()),
        state,
        gateway,
        _dir: dir,
    }
}

pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {}", other),
    }
}

impl TestApp {
    pub fn collection(&self, name: CollectionName) -> Collection {
        self.state.collection(name)
    }

    /// Insert a user directly and return its id.
    pub fn seed_user(&self, email: &str, role: &str) -> String {
        self.collection(CollectionName::Users)
            .insert_one(object(json!({ "email": email, "role": role })))
            .unwrap()
            .inserted_id
    }

    pub fn token_for(&self, email: &str) -> String {
        token::issue(object(json!({ "email": email })), SECRET, 60).unwrap()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        bearer: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body), None).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body), None).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None, None).await
    }

    /// POST and return the generated `insertedId`.
    pub async fn create(&self, uri: &str, body: Value) -> String {
        let (status, ack) = self.post(uri, body).await;
        assert_eq!(status, StatusCode::OK, "create failed: {}", ack);
        ack["insertedId"].as_str().unwrap().to_string()
    }
}
