use taskboard_core::{Board, BoardColumn, Card, CardDraft, CardUpdate, CardView};

use crate::api::{CardApi, ClientError, HttpCardApi};

/// State behind the board screen: the grouped cards and the search term.
///
/// Every mutation goes to the API first and is followed by a full re-fetch, so
/// the board only ever shows what the server returned.
pub struct BoardPage<A: CardApi> {
    api: A,
    board: Board,
    search: String,
}

impl<A: CardApi> BoardPage<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            board: Board::new(),
            search: String::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// Cards of `column` matching the current search term.
    pub fn visible(&self, column: BoardColumn) -> Vec<&Card> {
        self.board.filtered(column, &self.search)
    }

    /// Replaces the board with the server's current card list.
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let cards = self.api.list_cards().await?;
        tracing::debug!("Fetched {} cards", cards.len());
        self.board = Board::from_cards(cards);
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn add_card(
        &mut self,
        column: BoardColumn,
        draft: &CardDraft,
    ) -> Result<Card, ClientError> {
        let new_card = draft.to_new_card(column)?;
        let created = self.api.create_card(&new_card).await?;
        self.refresh().await?;
        Ok(created)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_card(&mut self, card: &Card) -> Result<Card, ClientError> {
        let updated = self
            .api
            .update_card(card.id, &CardUpdate::from(card))
            .await?;
        self.refresh().await?;
        Ok(updated)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_card(&mut self, id: i32) -> Result<(), ClientError> {
        self.api.delete_card(id).await?;
        self.refresh().await
    }

    /// Moves a card to `to`. Dropping a card on its own column sends nothing
    /// and returns `None`.
    #[tracing::instrument(skip(self))]
    pub async fn move_card(
        &mut self,
        id: i32,
        to: BoardColumn,
    ) -> Result<Option<Card>, ClientError> {
        let (from, card) = self.board.find(id).ok_or(ClientError::CardNotOnBoard(id))?;
        if from == to {
            return Ok(None);
        }
        let moved = Card {
            board_id: to.as_str().to_string(),
            ..card.clone()
        };
        self.update_card(&moved).await.map(Some)
    }

    /// Saves the draft held by `view`. On failure the view stays in edit mode.
    pub async fn save_card_view(&mut self, view: &mut CardView) -> Result<(), ClientError> {
        let submission = view.submission()?;
        let saved = self.update_card(&submission).await?;
        view.finish_save(saved);
        Ok(())
    }

    /// Forgets all cards and the search term, e.g. on logout.
    pub fn clear(&mut self) {
        self.board = Board::new();
        self.search.clear();
    }
}

impl BoardPage<HttpCardApi> {
    /// Drops the bearer token together with the board state.
    pub fn logout(&mut self) {
        self.api.logout();
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockCardApi;
    use chrono::{TimeZone, Utc};
    use mockall::Sequence;
    use taskboard_core::{BoardError, CardMode, Priority};

    fn card(id: i32, title: &str, board_id: &str) -> Card {
        let now = Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap();
        Card {
            id,
            title: title.to_string(),
            description: None,
            due_date: None,
            assignee: None,
            board_id: board_id.to_string(),
            priority: Priority::Medium,
            owner_id: 1,
            created_at: now,
            updated_at: now,
        }
    }

    fn api_error(message: &str) -> ClientError {
        ClientError::Api {
            status: 500,
            message: message.to_string(),
        }
    }

    async fn loaded_page(mut mock: MockCardApi, cards: Vec<Card>) -> BoardPage<MockCardApi> {
        mock.expect_list_cards()
            .times(1)
            .return_once(move || Ok(cards));
        let mut page = BoardPage::new(mock);
        page.refresh().await.expect("Initial load should succeed");
        page
    }

    #[tokio::test]
    async fn refresh_groups_cards_by_column() {
        let page = loaded_page(
            MockCardApi::new(),
            vec![
                card(1, "a", "todo"),
                card(2, "b", "done"),
                card(3, "c", "archive"),
            ],
        )
        .await;

        assert_eq!(page.board().count(BoardColumn::Todo), 1);
        assert_eq!(page.board().count(BoardColumn::InProgress), 0);
        assert_eq!(page.board().count(BoardColumn::Done), 1);
        assert_eq!(page.board().len(), 2);
    }

    #[tokio::test]
    async fn add_card_posts_to_column_and_refetches() {
        let mut mock = MockCardApi::new();
        let mut seq = Sequence::new();
        mock.expect_create_card()
            .withf(|new_card| new_card.title == "Plan sprint" && new_card.board_id == "inProgress")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(card(7, "Plan sprint", "inProgress")));
        mock.expect_list_cards()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![card(7, "Plan sprint", "inProgress")]));
        let mut page = BoardPage::new(mock);

        let mut draft = CardDraft::new();
        draft.set_title("Plan sprint");
        let created = page
            .add_card(BoardColumn::InProgress, &draft)
            .await
            .expect("Create should succeed");

        assert_eq!(created.id, 7);
        assert_eq!(page.board().cards(BoardColumn::InProgress), &[created]);
    }

    #[tokio::test]
    async fn add_card_with_blank_title_sends_nothing() {
        let mut page = BoardPage::new(MockCardApi::new());

        let result = page.add_card(BoardColumn::Todo, &CardDraft::new()).await;

        assert!(matches!(result, Err(ClientError::Board(BoardError::EmptyTitle))));
    }

    #[tokio::test]
    async fn moving_card_to_its_own_column_sends_no_request() {
        let mut page = loaded_page(MockCardApi::new(), vec![card(1, "a", "todo")]).await;

        let moved = page
            .move_card(1, BoardColumn::Todo)
            .await
            .expect("Same column move should succeed");

        assert_eq!(moved, None);
        assert_eq!(page.board().count(BoardColumn::Todo), 1);
    }

    #[tokio::test]
    async fn moving_card_sends_full_update_with_new_column() {
        let mut mock = MockCardApi::new();
        let mut seq = Sequence::new();
        mock.expect_list_cards()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![card(1, "a", "todo")]));
        mock.expect_update_card()
            .withf(|id, update| *id == 1 && update.board_id == "done" && update.title == "a")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id, update| Ok(card(id, &update.title, &update.board_id)));
        mock.expect_list_cards()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![card(1, "a", "done")]));
        let mut page = BoardPage::new(mock);
        page.refresh().await.unwrap();

        let moved = page.move_card(1, BoardColumn::Done).await.unwrap();

        assert_eq!(moved.map(|c| c.board_id), Some("done".to_string()));
        assert!(page.board().cards(BoardColumn::Todo).is_empty());
        assert_eq!(page.board().count(BoardColumn::Done), 1);
    }

    #[tokio::test]
    async fn moving_unknown_card_is_an_error() {
        let mut page = BoardPage::new(MockCardApi::new());

        let result = page.move_card(42, BoardColumn::Done).await;

        assert!(matches!(result, Err(ClientError::CardNotOnBoard(42))));
    }

    #[tokio::test]
    async fn failed_delete_keeps_board_and_reports_message() {
        let mut mock = MockCardApi::new();
        mock.expect_delete_card()
            .times(1)
            .returning(|_| Err(api_error("Card not found")));
        let mut page = loaded_page(mock, vec![card(1, "a", "todo")]).await;

        let result = page.delete_card(1).await;

        assert_eq!(result.unwrap_err().to_string(), "Card not found");
        assert_eq!(page.board().count(BoardColumn::Todo), 1);
    }

    #[tokio::test]
    async fn saving_card_view_returns_to_display_mode() {
        let mut mock = MockCardApi::new();
        mock.expect_update_card()
            .withf(|id, update| *id == 1 && update.title == "renamed" && update.board_id == "todo")
            .times(1)
            .returning(|id, update| Ok(card(id, &update.title, &update.board_id)));
        mock.expect_list_cards()
            .times(1)
            .returning(|| Ok(vec![card(1, "renamed", "todo")]));
        let mut page = BoardPage::new(mock);

        let mut view = CardView::new(card(1, "a", "todo"));
        view.start_edit();
        if let Some(draft) = view.draft_mut() {
            draft.set_title("renamed");
        }
        page.save_card_view(&mut view).await.expect("Save should succeed");

        assert_eq!(view.mode(), &CardMode::Display);
        assert_eq!(view.card().title, "renamed");
    }

    #[tokio::test]
    async fn failed_save_keeps_card_view_editing() {
        let mut mock = MockCardApi::new();
        mock.expect_update_card()
            .times(1)
            .returning(|_, _| Err(api_error("boom")));
        let mut page = BoardPage::new(mock);

        let mut view = CardView::new(card(1, "a", "todo"));
        view.start_edit();
        let result = page.save_card_view(&mut view).await;

        assert!(result.is_err());
        assert!(view.is_editing());
        assert_eq!(view.card().title, "a");
    }

    #[tokio::test]
    async fn search_filters_visible_cards_and_clear_resets() {
        let mut page = loaded_page(
            MockCardApi::new(),
            vec![card(1, "Fix Login", "todo"), card(2, "Write docs", "todo")],
        )
        .await;

        page.set_search("login");
        let visible: Vec<i32> = page.visible(BoardColumn::Todo).iter().map(|c| c.id).collect();
        assert_eq!(visible, vec![1]);

        page.clear();
        assert!(page.board().is_empty());
        assert_eq!(page.search(), "");
    }

    #[tokio::test]
    async fn logout_forgets_token_and_board() {
        let api = HttpCardApi::new("http://127.0.0.1:9/api").with_token("abc");
        let mut page = BoardPage::new(api);
        page.set_search("sprint");

        page.logout();

        assert!(page.board().is_empty());
        assert_eq!(page.search(), "");
        assert!(matches!(page.refresh().await, Err(ClientError::MissingToken)));
    }
}
