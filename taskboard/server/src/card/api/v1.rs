use crate::auth::CurrentUser;
use crate::card::{CardService, CardState, CardUpdateInput, NewCardInput};
use crate::web::api::{ApiError, ErrorResponse, MessageResponse};
use axum::{
    Extension, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
    routing::get,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use taskboard_core::Card;
use utoipa::ToSchema;

/// JSON representation of a Card for API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CardJson {
    /// Unique identifier generated on creation
    id: i32,
    title: String,
    description: Option<String>,
    /// Due date as `YYYY-MM-DD`
    due_date: Option<NaiveDate>,
    assignee: Option<String>,
    /// Column the card belongs to: `todo`, `inProgress` or `done`
    board_id: String,
    /// `Low`, `Medium` or `High`
    priority: String,
    /// ID of the user owning the card
    owner_id: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<Card> for CardJson {
    fn from(card: Card) -> Self {
        Self {
            id: card.id,
            title: card.title,
            description: card.description,
            due_date: card.due_date,
            assignee: card.assignee,
            board_id: card.board_id,
            priority: card.priority.to_string(),
            owner_id: card.owner_id,
            created_at: card.created_at,
            updated_at: card.updated_at,
        }
    }
}

/// Request body for creating a card. Missing `title` or `boardId` is reported
/// as a validation error rather than a decoding failure.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    title: Option<String>,
    description: Option<String>,
    due_date: Option<NaiveDate>,
    assignee: Option<String>,
    board_id: Option<String>,
    priority: Option<String>,
}

impl From<CreateCardRequest> for NewCardInput {
    fn from(request: CreateCardRequest) -> Self {
        Self {
            title: request.title.unwrap_or_default(),
            description: request.description,
            due_date: request.due_date,
            assignee: request.assignee,
            board_id: request.board_id.unwrap_or_default(),
            priority: request.priority,
        }
    }
}

/// Request body for updating a card.
///
/// Fields outside this list (such as `priority`) are ignored if sent.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardRequest {
    title: Option<String>,
    description: Option<String>,
    due_date: Option<NaiveDate>,
    assignee: Option<String>,
    board_id: Option<String>,
}

impl From<UpdateCardRequest> for CardUpdateInput {
    fn from(request: UpdateCardRequest) -> Self {
        Self {
            title: request.title.unwrap_or_default(),
            description: request.description,
            due_date: request.due_date,
            assignee: request.assignee,
            board_id: request.board_id.unwrap_or_default(),
        }
    }
}

/// Card IDs arrive as path strings; anything that is not a valid ID can only
/// refer to a missing card.
fn parse_card_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>()
        .map_err(|_| ApiError::NotFound("Card not found".to_string()))
}

/// Handler for GET /api/cards - Returns all cards of the current user.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/cards",
    responses(
        (status = 200, description = "Successfully retrieved cards", body = Vec<CardJson>),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Cards"
)]
pub async fn list_cards_handler(
    State(state): State<Arc<CardState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<CardJson>>, ApiError> {
    let service = CardService::new(&state.db);
    let cards = service.get_all_cards(user.id).await?;
    Ok(Json(cards.into_iter().map(CardJson::from).collect()))
}

/// Handler for POST /api/cards
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    post,
    path = "/api/cards",
    request_body = CreateCardRequest,
    responses(
        (status = 201, description = "Card created", body = CardJson),
        (status = 400, description = "Missing title or boardId", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse)
    ),
    tag = "Cards"
)]
pub async fn create_card_handler(
    State(state): State<Arc<CardState>>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<CreateCardRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CardJson>), ApiError> {
    let Json(request) = payload?;
    let service = CardService::new(&state.db);
    let card = service.create_card(user.id, request.into()).await?;
    Ok((StatusCode::CREATED, Json(CardJson::from(card))))
}

/// Handler for GET /api/cards/{id}
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/cards/{id}",
    params(("id" = String, Path, description = "Card ID")),
    responses(
        (status = 200, description = "The card", body = CardJson),
        (status = 404, description = "Card not found", body = ErrorResponse)
    ),
    tag = "Cards"
)]
pub async fn get_card_handler(
    State(state): State<Arc<CardState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<CardJson>, ApiError> {
    let id = parse_card_id(&id)?;
    let service = CardService::new(&state.db);
    let card = service.get_card_by_id(user.id, id).await?;
    Ok(Json(CardJson::from(card)))
}

/// Handler for PUT /api/cards/{id}
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    put,
    path = "/api/cards/{id}",
    params(("id" = String, Path, description = "Card ID")),
    request_body = UpdateCardRequest,
    responses(
        (status = 200, description = "Card updated", body = CardJson),
        (status = 400, description = "Missing title or boardId", body = ErrorResponse),
        (status = 404, description = "Card not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Cards"
)]
pub async fn update_card_handler(
    State(state): State<Arc<CardState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateCardRequest>, JsonRejection>,
) -> Result<Json<CardJson>, ApiError> {
    let id = parse_card_id(&id)?;
    let Json(request) = payload?;
    let service = CardService::new(&state.db);
    let card = service.update_card_by_id(user.id, id, request.into()).await?;
    Ok(Json(CardJson::from(card)))
}

/// Handler for DELETE /api/cards/{id}
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/api/cards/{id}",
    params(("id" = String, Path, description = "Card ID")),
    responses(
        (status = 200, description = "Card deleted", body = MessageResponse),
        (status = 404, description = "Card not found", body = ErrorResponse)
    ),
    tag = "Cards"
)]
pub async fn delete_card_handler(
    State(state): State<Arc<CardState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_card_id(&id)?;
    let service = CardService::new(&state.db);
    service.delete_card_by_id(user.id, id).await?;
    Ok(Json(MessageResponse {
        message: "Card deleted".to_string(),
    }))
}

/// Creates and returns the cards API router.
pub fn create_api_router(state: Arc<CardState>) -> Router {
    Router::new()
        .route("/cards", get(list_cards_handler).post(create_card_handler))
        .route(
            "/cards/{id}",
            get(get_card_handler)
                .put(update_card_handler)
                .delete(delete_card_handler),
        )
        .with_state(state)
}
