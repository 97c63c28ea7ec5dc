//! Web routes for the shopping assistant

mod views;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    response::{Html, Json},
    routing::{get, post},
    Form, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

use crate::config::Config;
use crate::core::Session;
use crate::providers::{ChatModel, ProviderError};

/// Sessions idle longer than this are swept on the next page load.
const SESSION_TTL: Duration = Duration::from_secs(60 * 60);
/// Hard cap on live sessions; past it the least recently used one goes.
const MAX_SESSIONS: usize = 256;

/// One live session plus the last time a handler touched it.
struct SessionSlot {
    session: Arc<Mutex<Session>>,
    touched: Instant,
}

impl SessionSlot {
    fn new(session: Session) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            touched: Instant::now(),
        }
    }
}

/// Application state shared across handlers.
///
/// Sessions are isolated per conversation: each page load creates a fresh
/// one, so no cart or history is ever shared between visitors. Each session
/// sits behind its own lock; the map lock is only held long enough to look
/// a slot up, never across a model call.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub model: Arc<dyn ChatModel>,
    sessions: Arc<Mutex<HashMap<Uuid, SessionSlot>>>,
}

impl AppState {
    pub fn new(config: Config, model: Arc<dyn ChatModel>) -> Self {
        Self {
            config,
            model,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Deserialize)]
struct SubmitForm {
    session_id: Uuid,
    prompt: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Serve the chat page. Each load starts a clean session: empty cart,
/// empty log, fresh model history. Expired and excess sessions are
/// evicted here so the map stays bounded.
async fn index(State(state): State<AppState>) -> Html<String> {
    let session_id = Uuid::new_v4();
    {
        let mut sessions = state.sessions.lock().await;
        sessions.retain(|_, slot| slot.touched.elapsed() < SESSION_TTL);
        if sessions.len() >= MAX_SESSIONS {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, slot)| slot.touched)
                .map(|(id, _)| *id);
            if let Some(id) = oldest {
                tracing::debug!("Evicting session {}", id);
                sessions.remove(&id);
            }
        }
        sessions.insert(session_id, SessionSlot::new(Session::new(state.model.clone())));
    }

    tracing::debug!("Started session {}", session_id);
    Html(views::render_page(session_id))
}

/// Process one chat turn and return the htmx fragments for the chat log,
/// cart panel, and stat counters.
async fn submit(State(state): State<AppState>, Form(form): Form<SubmitForm>) -> Html<String> {
    // Clone the slot and release the map lock before touching the model:
    // a turn in one session must not stall every other visitor.
    let slot = {
        let mut sessions = state.sessions.lock().await;
        match sessions.get_mut(&form.session_id) {
            Some(slot) => {
                slot.touched = Instant::now();
                slot.session.clone()
            }
            None => {
                return Html(views::render_error(
                    "Session expired - reload the page to start over.",
                ))
            }
        }
    };

    let mut session = slot.lock().await;
    match session.process_turn(&form.prompt).await {
        Ok(_) => Html(views::render_turn_fragments(&session)),
        Err(err) => {
            tracing::error!("Turn failed: {}", err);
            Html(views::render_error(&user_facing_error(&err)))
        }
    }
}

fn user_facing_error(err: &ProviderError) -> String {
    format!("Error: {}", err)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/", get(index))
        .route("/submit", post(submit))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use crate::conversation::Message;
    use crate::providers::ChatOutcome;

    use super::*;

    struct EchoModel;

    #[async_trait]
    impl ChatModel for EchoModel {
        async fn run(&self, messages: &[Message]) -> Result<ChatOutcome, ProviderError> {
            let reply = messages.last().unwrap().content.clone();
            Ok(ChatOutcome {
                reply: reply.clone(),
                transcript: vec![Message::assistant(reply.clone())],
            })
        }
    }

    /// Never answers; stands in for a model call stuck in retry backoff.
    struct StalledModel;

    #[async_trait]
    impl ChatModel for StalledModel {
        async fn run(&self, _messages: &[Message]) -> Result<ChatOutcome, ProviderError> {
            std::future::pending::<()>().await;
            unreachable!()
        }
    }

    fn test_config() -> Config {
        Config {
            host: "127.0.0.1".into(),
            port: 0,
            gemini_api_key: "AIzaTest".into(),
            gemini_url: "http://localhost".into(),
            model: "test".into(),
        }
    }

    #[tokio::test]
    async fn test_index_creates_isolated_sessions() {
        let state = AppState::new(test_config(), Arc::new(EchoModel));

        index(State(state.clone())).await;
        index(State(state.clone())).await;

        assert_eq!(state.sessions.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_submit_unknown_session_renders_error() {
        let state = AppState::new(test_config(), Arc::new(EchoModel));

        let Html(body) = submit(
            State(state),
            Form(SubmitForm {
                session_id: Uuid::new_v4(),
                prompt: "hello".into(),
            }),
        )
        .await;

        assert!(body.contains("Session expired"));
    }

    #[tokio::test]
    async fn test_stalled_turn_does_not_block_new_visitors() {
        let state = AppState::new(test_config(), Arc::new(StalledModel));
        index(State(state.clone())).await;
        let session_id = *state.sessions.lock().await.keys().next().unwrap();

        let stalled = tokio::spawn(submit(
            State(state.clone()),
            Form(SubmitForm {
                session_id,
                prompt: "hello".into(),
            }),
        ));
        // Let the turn reach the model call while holding its session lock.
        tokio::task::yield_now().await;

        let fresh = tokio::time::timeout(
            Duration::from_millis(200),
            index(State(state.clone())),
        )
        .await;
        assert!(
            fresh.is_ok(),
            "page load must not wait on another session's turn"
        );
        stalled.abort();
    }

    #[tokio::test]
    async fn test_session_map_is_capped() {
        let state = AppState::new(test_config(), Arc::new(EchoModel));

        for _ in 0..MAX_SESSIONS + 5 {
            index(State(state.clone())).await;
        }

        assert_eq!(state.sessions.lock().await.len(), MAX_SESSIONS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_expire() {
        let state = AppState::new(test_config(), Arc::new(EchoModel));

        index(State(state.clone())).await;
        tokio::time::advance(SESSION_TTL + Duration::from_secs(1)).await;
        index(State(state.clone())).await;

        assert_eq!(state.sessions.lock().await.len(), 1);
    }
}
