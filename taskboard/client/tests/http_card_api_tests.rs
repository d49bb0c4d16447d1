use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database};
use taskboard_client::{BoardPage, CardApi, ClientError, HttpCardApi, RegisterForm};
use taskboard_core::{BoardColumn, CardDraft, CardUpdate, NewCard, Priority};
use taskboard_server::config::Config;
use taskboard_server::web::create_app;

/// Serves the full application on a random local port and returns its API base URL.
async fn spawn_server() -> anyhow::Result<String> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1);
    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;
    let config = Config {
        db_url: "sqlite::memory:".to_string(),
        port: 0,
        jwt_secret: "client_test_secret".to_string(),
    };
    let app = create_app(db, &config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });
    Ok(format!("http://{}/api", address))
}

fn register_form(username: &str) -> RegisterForm {
    RegisterForm {
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password: "password".to_string(),
        confirm_password: "password".to_string(),
    }
}

async fn logged_in_api(base_url: &str, username: &str) -> HttpCardApi {
    let mut api = HttpCardApi::new(base_url);
    api.register(&register_form(username))
        .await
        .expect("Failed to register");
    api.login(username, "password")
        .await
        .expect("Failed to login");
    api
}

fn new_card(title: &str, board_id: &str) -> NewCard {
    NewCard {
        title: title.to_string(),
        description: None,
        due_date: None,
        assignee: None,
        board_id: board_id.to_string(),
        priority: Priority::High,
    }
}

#[tokio::test]
async fn can_run_card_lifecycle_against_server() {
    let base_url = spawn_server().await.expect("Failed to start server");
    let api = logged_in_api(&base_url, "alice").await;

    let created = api
        .create_card(&new_card("Plan sprint", "todo"))
        .await
        .expect("Failed to create card");
    assert_eq!(created.priority, Priority::High);
    assert_eq!(api.list_cards().await.unwrap(), vec![created.clone()]);

    let update = CardUpdate {
        board_id: "done".to_string(),
        ..CardUpdate::from(&created)
    };
    let updated = api
        .update_card(created.id, &update)
        .await
        .expect("Failed to update card");
    assert_eq!(updated.board_id, "done");
    assert_eq!(updated.priority, Priority::High);

    api.delete_card(created.id)
        .await
        .expect("Failed to delete card");
    assert!(api.list_cards().await.unwrap().is_empty());
}

#[tokio::test]
async fn maps_error_bodies_to_api_errors() {
    let base_url = spawn_server().await.expect("Failed to start server");
    let api = logged_in_api(&base_url, "alice").await;

    let missing = api.delete_card(999).await;
    assert!(matches!(
        missing,
        Err(ClientError::Api { status: 404, ref message }) if message == "Card not found"
    ));

    let blank_board = api.create_card(&new_card("Plan sprint", " ")).await;
    assert!(matches!(
        blank_board,
        Err(ClientError::Api { status: 400, ref message }) if message == "boardId is required"
    ));
}

#[tokio::test]
async fn sends_bearer_token_with_card_requests() {
    let base_url = spawn_server().await.expect("Failed to start server");

    let forged = HttpCardApi::new(&base_url).with_token("not.a.jwt");
    assert!(matches!(
        forged.list_cards().await,
        Err(ClientError::Api { status: 401, .. })
    ));

    let anonymous = HttpCardApi::new(&base_url);
    assert!(matches!(
        anonymous.list_cards().await,
        Err(ClientError::MissingToken)
    ));
}

#[tokio::test]
async fn reports_failed_login_and_duplicate_registration() {
    let base_url = spawn_server().await.expect("Failed to start server");
    let mut api = HttpCardApi::new(&base_url);
    api.register(&register_form("alice")).await.unwrap();

    let duplicate = api.register(&register_form("alice")).await;
    assert!(matches!(duplicate, Err(ClientError::Api { status: 409, .. })));

    let wrong = api.login("alice", "wrong").await;
    assert!(matches!(
        wrong,
        Err(ClientError::Api { status: 401, ref message }) if message == "Invalid username or password"
    ));
    assert_eq!(api.token(), None);
}

#[tokio::test]
async fn board_page_moves_card_through_server() {
    let base_url = spawn_server().await.expect("Failed to start server");
    let mut page = BoardPage::new(logged_in_api(&base_url, "alice").await);

    let mut draft = CardDraft::new();
    draft.set_title("Plan sprint");
    let created = page
        .add_card(BoardColumn::Todo, &draft)
        .await
        .expect("Failed to add card");
    assert_eq!(page.board().count(BoardColumn::Todo), 1);

    page.move_card(created.id, BoardColumn::InProgress)
        .await
        .expect("Failed to move card");

    assert!(page.board().cards(BoardColumn::Todo).is_empty());
    assert_eq!(page.board().cards(BoardColumn::InProgress)[0].id, created.id);

    page.logout();
    assert!(matches!(page.refresh().await, Err(ClientError::MissingToken)));
}
