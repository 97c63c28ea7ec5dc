//! ShopSmart AI - shopping assistant server
//!
//! Serves the chat UI and the htmx submit endpoint. Each page load starts
//! an isolated session (cart + conversation history); the model backend is
//! Gemini via `providers::GeminiProvider`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopsmart_ai::config::Config;
use shopsmart_ai::providers::GeminiProvider;
use shopsmart_ai::routes::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shopsmart_ai=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let model = Arc::new(GeminiProvider::new(&config)?);
    let state = AppState::new(config, model);

    let app = Router::new()
        .merge(routes::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("🛍️ ShopSmart AI running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
