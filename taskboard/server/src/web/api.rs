use std::sync::Arc;

use crate::{
    auth::{self, AuthState},
    card::{CardServiceError, CardState},
    user::UserServiceError,
};

use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use utoipa::{OpenApi, ToSchema};

/// JSON body for every API error.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine readable error code
    pub error: String,
    /// Human readable description
    pub message: String,
}

/// JSON body for operations that only confirm success.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Errors surfaced by the JSON API, one per HTTP failure class.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    InvalidCredentials(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    /// Persistence or other unexpected failure. The underlying message is
    /// passed through to the caller.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::InvalidCredentials(_) => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = ErrorResponse {
            error: code.to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<CardServiceError> for ApiError {
    fn from(err: CardServiceError) -> Self {
        match err {
            CardServiceError::Validation(message) => ApiError::Validation(message),
            CardServiceError::CardNotFound(_) => ApiError::NotFound(err.to_string()),
            CardServiceError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<UserServiceError> for ApiError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::Validation(message) => ApiError::Validation(message),
            UserServiceError::DuplicateUsername(_) | UserServiceError::DuplicateEmail(_) => {
                ApiError::Conflict(err.to_string())
            }
            UserServiceError::InvalidCredentials => ApiError::InvalidCredentials(err.to_string()),
            UserServiceError::PasswordHash(_) | UserServiceError::Database(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::card::api::v1::list_cards_handler,
        crate::card::api::v1::create_card_handler,
        crate::card::api::v1::get_card_handler,
        crate::card::api::v1::update_card_handler,
        crate::card::api::v1::delete_card_handler,
        crate::auth::api::v1::register_handler,
        crate::auth::api::v1::json_login_handler,
    ),
    tags(
        (name = "Cards", description = "Task cards on the board"),
        (name = "Auth", description = "Registration and login")
    )
)]
pub struct ApiDoc;

/// Handler for GET /api/openapi.json
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Creates the API routes for JSON API endpoints.
pub fn create_api_router(auth_state: Arc<AuthState>, card_state: Arc<CardState>) -> axum::Router {
    let auth_router = auth::api::v1::create_api_router(auth_state.clone());
    let cards_router = crate::card::api::v1::create_api_router(card_state);
    let protected_routes =
        cards_router.route_layer(from_fn(auth::api::v1::require_auth_middleware));
    let public_routes = auth_router.route("/openapi.json", get(openapi_handler));
    let api_routes = public_routes.merge(protected_routes);
    Router::new()
        .nest("/api", api_routes)
        .layer(ServiceBuilder::new().layer(from_fn_with_state(
            auth_state,
            auth::api::v1::auth_user_middleware,
        )))
}
