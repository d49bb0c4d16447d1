pub mod api;

use axum::Router;
use axum::http::header::AUTHORIZATION;
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use std::iter::once;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

use crate::auth::AuthState;
use crate::card::CardState;
use crate::config::Config;

/// Builds the full application router on top of an already migrated database.
pub fn create_app(db: DatabaseConnection, config: &Config) -> Router {
    let db = Arc::new(db);
    let auth_state = Arc::new(AuthState::from_config(db.clone(), config));
    let card_state = Arc::new(CardState { db });

    let api_router = api::create_api_router(auth_state, card_state);

    Router::new()
        .route("/health", axum::routing::get(health_check_handler))
        .merge(api_router)
        .layer(
            ServiceBuilder::new()
                .layer(SetSensitiveRequestHeadersLayer::new(once(AUTHORIZATION)))
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    let db = Database::connect(&config.db_url).await?;
    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let app = create_app(db, &config);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}
