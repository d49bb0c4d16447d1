use crate::auth::{AuthState, CurrentUser, decode_jwt, encode_jwt};
use crate::user::{User, UserService};
use crate::web::api::{ApiError, ErrorResponse};
use axum::{
    Json, Router,
    extract::{Request, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// JSON request payload for registration
#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// JSON request payload for API login
#[derive(Deserialize, Debug, ToSchema)]
pub struct JsonLoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Public view of a registered user.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct UserJson {
    pub id: i32,
    pub username: String,
    pub email: String,
}

impl From<User> for UserJson {
    fn from(user: User) -> Self {
        Self {
            id: user.id(),
            username: user.username().to_string(),
            email: user.email().to_string(),
        }
    }
}

/// JSON response for successful API login
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserJson,
}

/// Creates a JSON API router for authentication endpoints.
pub fn create_api_router(state: Arc<AuthState>) -> Router<()> {
    Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(json_login_handler))
        .with_state(state)
}

/// API authentication middleware that extracts the current user from Authorization Bearer header.
/// Sets the CurrentUser extension if a valid JWT token is found in the Authorization header.
pub async fn auth_user_middleware(
    State(state): State<Arc<AuthState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(&headers) {
        match decode_jwt(token, &state.jwt_secret).await {
            Ok(claims) => {
                let current_user = CurrentUser::new(claims.sub, claims.username);
                request.extensions_mut().insert(current_user);
            }
            Err(e) => tracing::debug!("Rejected bearer token: {}", e),
        }
    }

    next.run(request).await
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Middleware that ensures the current user is authenticated.
/// Returns UNAUTHORIZED if the CurrentUser extension is not found in the request.
/// This middleware should be applied after auth_user_middleware.
pub async fn require_auth_middleware(request: Request, next: Next) -> Response {
    let is_authenticated = request.extensions().get::<CurrentUser>().is_some();

    if !is_authenticated {
        return ApiError::Unauthorized("Authentication required to access this resource".to_string())
            .into_response();
    }

    next.run(request).await
}

/// Handler for POST /api/auth/register
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = UserJson),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 409, description = "Username or email already in use", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn register_handler(
    State(state): State<Arc<AuthState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserJson>), ApiError> {
    let Json(payload) = payload?;
    let service = UserService::new(&state.db);
    let user = service
        .register(&payload.username, &payload.email, &payload.password)
        .await?;
    Ok((StatusCode::CREATED, Json(UserJson::from(user))))
}

/// Handles JSON login requests and returns a JWT token.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = JsonLoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid username or password", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn json_login_handler(
    State(state): State<Arc<AuthState>>,
    payload: Result<Json<JsonLoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(payload) = payload?;
    let service = UserService::new(&state.db);
    let user = service
        .authenticate(&payload.username, &payload.password)
        .await?;

    let token = encode_jwt(user.id(), user.username().to_string(), &state.jwt_secret)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to generate authentication token: {e}")))?;

    Ok(Json(LoginResponse {
        token,
        user: UserJson::from(user),
    }))
}
