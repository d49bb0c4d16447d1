#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde::{Deserialize, Serialize};
use taskboard_server::auth::encode_jwt;
use taskboard_server::config::Config;
use taskboard_server::user::{User, UserService};
use tower::ServiceExt;

pub const JWT_SECRET: &str = "some_secret";

/// Opens a fresh in-memory database with all migrations applied.
///
/// The pool is pinned to one connection so every query sees the same
/// in-memory database.
pub async fn setup_db() -> anyhow::Result<DatabaseConnection> {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().try_init();
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1);
    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub fn test_config() -> Config {
    Config {
        db_url: "sqlite::memory:".to_string(),
        port: 5000,
        jwt_secret: JWT_SECRET.to_string(),
    }
}

/// Registers a user directly through the service.
pub async fn create_user(db: &DatabaseConnection, username: &str) -> User {
    UserService::new(db)
        .register(username, &format!("{}@example.com", username), "password")
        .await
        .expect("Failed to register user")
}

/// Builds an `Authorization` header value for `user`.
pub async fn bearer_for(user: &User) -> String {
    let token = encode_jwt(user.id(), user.username().to_string(), JWT_SECRET)
        .await
        .expect("Failed to encode token");
    format!("Bearer {}", token)
}

/// Sends a JSON request through `app` and returns the status and raw body.
pub async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    bearer: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(bearer) = bearer {
        builder = builder.header("authorization", bearer);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

/// Error body as returned by the API.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// HTTP error response snapshot for testing endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponseSnapshot {
    pub test_context: String,
    pub status: u16,
    pub body: ErrorBody,
}

impl ErrorResponseSnapshot {
    pub fn new(body: &[u8], status: StatusCode, test_context: &str) -> Self {
        Self {
            test_context: test_context.to_string(),
            status: status.as_u16(),
            body: serde_json::from_slice(body).expect("Error body should be JSON"),
        }
    }
}
