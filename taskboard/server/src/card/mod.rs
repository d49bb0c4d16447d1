use crate::entities::*;
use chrono::{NaiveDate, Utc};
use sea_orm::*;
use std::sync::Arc;
use taskboard_core::{Card, Priority};

pub mod api;

/// Shared state for the card routes.
#[derive(Clone)]
pub struct CardState {
    pub db: Arc<sea_orm::DatabaseConnection>,
}

/// Fields accepted when creating a card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCardInput {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub assignee: Option<String>,
    pub board_id: String,
    /// Defaults to `Medium` when absent.
    pub priority: Option<String>,
}

/// Fields an update is allowed to change. Anything else on the card
/// (priority, owner, timestamps) is left as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardUpdateInput {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub assignee: Option<String>,
    pub board_id: String,
}

/// Error type for CardService operations.
#[derive(Debug, thiserror::Error)]
pub enum CardServiceError {
    /// A required field is missing or a value is out of range.
    #[error("{0}")]
    Validation(String),
    /// No card with this ID is visible to the caller.
    #[error("Card not found")]
    CardNotFound(i32),
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl From<card::Model> for Card {
    fn from(model: card::Model) -> Self {
        let priority = model.priority.parse().unwrap_or_else(|_| {
            tracing::warn!(
                "Card {} has unknown priority '{}', using default",
                model.id,
                model.priority
            );
            Priority::default()
        });
        Card {
            id: model.id,
            title: model.title,
            description: model.description,
            due_date: model.due_date,
            assignee: model.assignee,
            board_id: model.board_id,
            priority,
            owner_id: model.owner_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Card persistence scoped to a single owner.
///
/// Every lookup filters by `owner_id`, so cards of other users behave exactly
/// like missing ones.
pub struct CardService<'a> {
    db: &'a sea_orm::DatabaseConnection,
}

impl CardService<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> CardService<'_> {
        CardService { db }
    }

    /// Creates a new card owned by `owner_id`.
    ///
    /// # Arguments
    ///
    /// * `owner_id` - ID of the authenticated user creating the card.
    /// * `input` - The card fields. `title` and `board_id` must not be blank.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `Card` if successful, or a validation
    /// error without touching the database.
    #[tracing::instrument(skip(self))]
    pub async fn create_card(&self, owner_id: i32, input: NewCardInput) -> Result<Card, CardServiceError> {
        let title = required(&input.title, "title")?;
        let board_id = required(&input.board_id, "boardId")?;
        let priority = match input.priority.as_deref().map(str::trim) {
            None | Some("") => Priority::default(),
            Some(value) => value.parse::<Priority>().map_err(|_| {
                CardServiceError::Validation(format!(
                    "priority must be one of Low, Medium or High, got '{}'",
                    value
                ))
            })?,
        };

        let now = Utc::now();
        let active_model = card::ActiveModel {
            title: ActiveValue::Set(title),
            description: ActiveValue::Set(optional(input.description)),
            due_date: ActiveValue::Set(input.due_date),
            assignee: ActiveValue::Set(optional(input.assignee)),
            board_id: ActiveValue::Set(board_id),
            priority: ActiveValue::Set(priority.to_string()),
            owner_id: ActiveValue::Set(owner_id),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;
        tracing::info!("Created card {} in {}", created_model.id, created_model.board_id);
        Ok(Card::from(created_model))
    }

    /// Retrieves all cards of `owner_id`, oldest first.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_cards(&self, owner_id: i32) -> Result<Vec<Card>, CardServiceError> {
        let cards = card::Entity::find()
            .filter(card::Column::OwnerId.eq(owner_id))
            .order_by_asc(card::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(Card::from)
            .collect();
        Ok(cards)
    }

    /// Retrieves a single card by its ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_card_by_id(&self, owner_id: i32, id: i32) -> Result<Card, CardServiceError> {
        let model = self.find_owned(owner_id, id).await?;
        Ok(Card::from(model))
    }

    /// Overwrites the updatable fields of a card.
    ///
    /// Only `title`, `description`, `due_date`, `assignee` and `board_id` are
    /// written; absent optional fields are cleared. Moving a card between
    /// columns is an update of `board_id`.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `Card`, `CardNotFound` if the ID is
    /// unknown to this owner (whatever the input holds), or a validation error.
    #[tracing::instrument(skip(self))]
    pub async fn update_card_by_id(
        &self,
        owner_id: i32,
        id: i32,
        input: CardUpdateInput,
    ) -> Result<Card, CardServiceError> {
        let card_to_update = self.find_owned(owner_id, id).await?;
        let title = required(&input.title, "title")?;
        let board_id = required(&input.board_id, "boardId")?;

        let mut active_model: card::ActiveModel = card_to_update.into();
        active_model.title = ActiveValue::Set(title);
        active_model.description = ActiveValue::Set(optional(input.description));
        active_model.due_date = ActiveValue::Set(input.due_date);
        active_model.assignee = ActiveValue::Set(optional(input.assignee));
        active_model.board_id = ActiveValue::Set(board_id);
        active_model.updated_at = ActiveValue::Set(Utc::now());
        let updated_model = active_model.update(self.db).await?;

        Ok(Card::from(updated_model))
    }

    /// Permanently deletes a card by its ID.
    ///
    /// # Returns
    ///
    /// A `Result` containing the deleted `Card`, or `CardNotFound`.
    #[tracing::instrument(skip(self))]
    pub async fn delete_card_by_id(&self, owner_id: i32, id: i32) -> Result<Card, CardServiceError> {
        let card_to_delete = self.find_owned(owner_id, id).await?;

        let card_copy = Card::from(card_to_delete.clone());
        card::Entity::delete_by_id(card_to_delete.id)
            .exec(self.db)
            .await?;
        tracing::info!("Deleted card {}", id);
        Ok(card_copy)
    }

    async fn find_owned(&self, owner_id: i32, id: i32) -> Result<card::Model, CardServiceError> {
        card::Entity::find_by_id(id)
            .filter(card::Column::OwnerId.eq(owner_id))
            .one(self.db)
            .await?
            .ok_or(CardServiceError::CardNotFound(id))
    }
}

fn required(value: &str, field: &str) -> Result<String, CardServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CardServiceError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
