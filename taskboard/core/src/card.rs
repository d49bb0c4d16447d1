use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::BoardError;

/// Maximum number of characters kept in a card title while editing.
pub const TITLE_LIMIT: usize = 50;
/// Maximum number of characters kept in a card description while editing.
pub const DESCRIPTION_LIMIT: usize = 200;
/// Maximum number of characters kept in a card assignee while editing.
pub const ASSIGNEE_LIMIT: usize = 30;

/// A task on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Card {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub assignee: Option<String>,
    /// Column the card currently sits in. Any string is accepted by the store;
    /// only the three known columns are shown on the board.
    pub board_id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: Priority,
    pub owner_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// Returns the known column this card belongs to, if any.
    pub fn column(&self) -> Option<BoardColumn> {
        self.board_id.parse().ok()
    }
}

/// Card priority. Defaults to `Medium`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|priority| priority.as_str() == s)
            .ok_or_else(|| BoardError::UnknownPriority(s.to_string()))
    }
}

/// The three fixed lanes of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum BoardColumn {
    Todo,
    InProgress,
    Done,
}

impl BoardColumn {
    /// Columns in display order.
    pub const ALL: [BoardColumn; 3] = [BoardColumn::Todo, BoardColumn::InProgress, BoardColumn::Done];

    /// The `boardId` value stored on cards in this column.
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardColumn::Todo => "todo",
            BoardColumn::InProgress => "inProgress",
            BoardColumn::Done => "done",
        }
    }

    /// Human readable column heading.
    pub fn title(&self) -> &'static str {
        match self {
            BoardColumn::Todo => "To Do",
            BoardColumn::InProgress => "In Progress",
            BoardColumn::Done => "Done",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            BoardColumn::Todo => 0,
            BoardColumn::InProgress => 1,
            BoardColumn::Done => 2,
        }
    }
}

impl fmt::Display for BoardColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoardColumn {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BoardColumn::ALL
            .into_iter()
            .find(|column| column.as_str() == s)
            .ok_or_else(|| BoardError::UnknownColumn(s.to_string()))
    }
}

/// Payload for creating a card.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct NewCard {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub assignee: Option<String>,
    pub board_id: String,
    pub priority: Priority,
}

/// Payload for updating a card.
///
/// Only these fields are ever applied by an update; priority and owner are
/// fixed once the card exists.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CardUpdate {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub assignee: Option<String>,
    pub board_id: String,
}

impl From<&Card> for CardUpdate {
    fn from(card: &Card) -> Self {
        Self {
            title: card.title.clone(),
            description: card.description.clone(),
            due_date: card.due_date,
            assignee: card.assignee.clone(),
            board_id: card.board_id.clone(),
        }
    }
}

/// Locally held, not yet saved card fields.
///
/// Text fields are cut to the editor limits as they are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardDraft {
    title: String,
    description: String,
    due_date: Option<NaiveDate>,
    assignee: String,
    priority: Priority,
}

impl CardDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the editable fields of an existing card as they are. Limits only
    /// apply to text typed through the setters.
    pub fn from_card(card: &Card) -> Self {
        Self {
            title: card.title.clone(),
            description: card.description.clone().unwrap_or_default(),
            due_date: card.due_date,
            assignee: card.assignee.clone().unwrap_or_default(),
            priority: card.priority,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn assignee(&self) -> &str {
        &self.assignee
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = clip(title, TITLE_LIMIT);
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = clip(description, DESCRIPTION_LIMIT);
    }

    pub fn set_assignee(&mut self, assignee: &str) {
        self.assignee = clip(assignee, ASSIGNEE_LIMIT);
    }

    pub fn set_due_date(&mut self, due_date: Option<NaiveDate>) {
        self.due_date = due_date;
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    /// True when the title field has hit its limit.
    pub fn title_at_limit(&self) -> bool {
        self.title.chars().count() >= TITLE_LIMIT
    }

    /// Builds the create payload for a card placed in `column`.
    pub fn to_new_card(&self, column: BoardColumn) -> Result<NewCard, BoardError> {
        let title = self.checked_title()?;
        Ok(NewCard {
            title,
            description: non_empty(&self.description),
            due_date: self.due_date,
            assignee: non_empty(&self.assignee),
            board_id: column.as_str().to_string(),
            priority: self.priority,
        })
    }

    /// Applies the draft on top of `card`, leaving its column, priority and
    /// bookkeeping fields alone.
    pub fn apply_to(&self, card: &Card) -> Result<Card, BoardError> {
        let title = self.checked_title()?;
        Ok(Card {
            title,
            description: non_empty(&self.description),
            due_date: self.due_date,
            assignee: non_empty(&self.assignee),
            ..card.clone()
        })
    }

    fn checked_title(&self) -> Result<String, BoardError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(BoardError::EmptyTitle);
        }
        Ok(title.to_string())
    }
}

/// Shortens `text` to `limit` characters, marking the cut with `...`.
pub fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        format!("{}...", clip(text, limit))
    } else {
        text.to_string()
    }
}

fn clip(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
