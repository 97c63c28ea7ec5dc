//! Model gateway with history threading and overload retry
//!
//! Each call sends the system prompt, the running history, and the new
//! utterance with a rendered cart-context block appended, so the model sees
//! cart state without any server-side memory of it. Transient overload is
//! retried with exponential backoff and degrades to a canned apology;
//! anything else propagates to the caller.

use std::sync::Arc;
use std::time::Duration;

use crate::conversation::Message;
use crate::providers::{ChatModel, ProviderError};

use super::cart::Cart;

/// Total attempts per user turn, the first call included.
const MAX_ATTEMPTS: u32 = 3;

/// Backoff before the second attempt; doubles each retry (2s, 4s).
const INITIAL_BACKOFF: Duration = Duration::from_secs(2);

/// Shown instead of an error when every retry was met with overload.
pub const OVERLOADED_REPLY: &str =
    "⚠️ The AI model is currently overloaded. Please try again in a moment.";

/// Fallback if the retry loop somehow falls through without resolving.
const UNREACHABLE_REPLY: &str = "⚠️ Unable to connect to AI service. Please try again later.";

pub struct ModelGateway {
    model: Arc<dyn ChatModel>,
    system_prompt: String,
    history: Vec<Message>,
}

impl ModelGateway {
    pub fn new(model: Arc<dyn ChatModel>, system_prompt: impl Into<String>) -> Self {
        Self {
            model,
            system_prompt: system_prompt.into(),
            history: Vec::new(),
        }
    }

    /// Send one user utterance and return the assistant's reply text.
    ///
    /// On success the gateway's history is replaced wholesale with the
    /// transcript the provider returned; the provider owns the canonical
    /// record of the exchange.
    pub async fn ask(&mut self, utterance: &str, cart: &Cart) -> Result<String, ProviderError> {
        let enhanced = format!("{}{}", utterance, cart_context(cart));

        let mut delay = INITIAL_BACKOFF;
        for attempt in 1..=MAX_ATTEMPTS {
            let mut messages = Vec::with_capacity(self.history.len() + 2);
            messages.push(Message::system(&self.system_prompt));
            messages.extend(self.history.iter().cloned());
            messages.push(Message::user(&enhanced));

            match self.model.run(&messages).await {
                Ok(outcome) => {
                    self.history = outcome.transcript;
                    return Ok(outcome.reply);
                }
                Err(err) if err.is_overloaded() && attempt < MAX_ATTEMPTS => {
                    tracing::warn!(
                        "Model overloaded, retrying in {}s (attempt {}/{})",
                        delay.as_secs(),
                        attempt,
                        MAX_ATTEMPTS
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(err) if err.is_overloaded() => {
                    tracing::warn!("Model overloaded, retries exhausted");
                    return Ok(OVERLOADED_REPLY.to_string());
                }
                Err(err) => return Err(err),
            }
        }

        Ok(UNREACHABLE_REPLY.to_string())
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }
}

/// Render the cart as a short textual block appended to the utterance.
fn cart_context(cart: &Cart) -> String {
    let mut block = String::from("\n\nCurrent cart contents:\n");
    if cart.is_empty() {
        block.push_str("Cart is empty");
    } else {
        for (key, item) in cart.iter() {
            block.push_str(&format!("- {}: {} item(s)\n", key, item.quantity));
        }
    }
    block
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::time::Instant;

    use crate::core::interpret::ItemRequest;
    use crate::providers::ChatOutcome;

    use super::*;

    /// Replays a fixed sequence of outcomes and records what it was sent.
    struct ScriptedModel {
        script: Mutex<VecDeque<Result<ChatOutcome, ProviderError>>>,
        calls: AtomicUsize,
        last_request: Mutex<Vec<Message>>,
    }

    impl ScriptedModel {
        fn new(script: Vec<Result<ChatOutcome, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn run(&self, messages: &[Message]) -> Result<ChatOutcome, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = messages.to_vec();
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .expect("script exhausted")
        }
    }

    fn reply(text: &str) -> Result<ChatOutcome, ProviderError> {
        Ok(ChatOutcome {
            reply: text.to_string(),
            transcript: vec![Message::user("ignored"), Message::assistant(text)],
        })
    }

    fn overloaded() -> Result<ChatOutcome, ProviderError> {
        Err(ProviderError::Overloaded("HTTP 503: overloaded".into()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_exhausted_return_apology_after_backoff() {
        let model = ScriptedModel::new(vec![overloaded(), overloaded(), overloaded()]);
        let mut gateway = ModelGateway::new(model.clone(), "system");

        let start = Instant::now();
        let answer = gateway.ask("add apples", &Cart::new()).await.unwrap();

        assert_eq!(answer, OVERLOADED_REPLY);
        assert_eq!(model.calls(), 3);
        // 2s before the second attempt, 4s before the third, none after.
        assert_eq!(start.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_one_retry() {
        let model = ScriptedModel::new(vec![overloaded(), reply("done")]);
        let mut gateway = ModelGateway::new(model.clone(), "system");

        let answer = gateway.ask("hi", &Cart::new()).await.unwrap();

        assert_eq!(answer, "done");
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_propagates_without_retry() {
        let model = ScriptedModel::new(vec![Err(ProviderError::InvalidResponse(
            "API key not valid".into(),
        ))]);
        let mut gateway = ModelGateway::new(model.clone(), "system");

        let start = Instant::now();
        let result = gateway.ask("hi", &Cart::new()).await;

        assert!(result.is_err());
        assert_eq!(model.calls(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_history_replaced_with_provider_transcript() {
        let model = ScriptedModel::new(vec![reply("hello there")]);
        let mut gateway = ModelGateway::new(model, "system");

        gateway.ask("hi", &Cart::new()).await.unwrap();

        let history = gateway.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].content, "hello there");
    }

    #[tokio::test]
    async fn test_cart_context_appended_to_utterance() {
        let mut cart = Cart::new();
        cart.apply_add(&[ItemRequest {
            name: "Apples".into(),
            quantity: 2,
            color: String::new(),
            attributes: String::new(),
            price: 3.99,
        }]);

        let model = ScriptedModel::new(vec![reply("ok")]);
        let mut gateway = ModelGateway::new(model.clone(), "system");
        gateway.ask("what's in my cart?", &cart).await.unwrap();

        let sent = model.last_request.lock().unwrap().clone();
        let user_message = sent.last().unwrap();
        assert!(user_message.content.starts_with("what's in my cart?"));
        assert!(user_message.content.contains("Current cart contents:"));
        assert!(user_message.content.contains("- Apples: 2 item(s)"));
    }

    #[tokio::test]
    async fn test_empty_cart_context() {
        let model = ScriptedModel::new(vec![reply("ok")]);
        let mut gateway = ModelGateway::new(model.clone(), "system");
        gateway.ask("hello", &Cart::new()).await.unwrap();

        let sent = model.last_request.lock().unwrap().clone();
        assert!(sent.last().unwrap().content.contains("Cart is empty"));
    }
}
