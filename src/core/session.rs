//! Per-conversation session state
//!
//! Everything a conversation owns lives here: the gateway (with its model
//! history), the cart, and the display log. Sessions are constructed per
//! conversation and never shared between them.

use std::sync::Arc;

use crate::config::prompts;
use crate::conversation::ConversationTurn;
use crate::providers::{ChatModel, ProviderError};

use super::cart::Cart;
use super::gateway::ModelGateway;
use super::interpret::{interpret, ParsedAction};

pub struct Session {
    gateway: ModelGateway,
    pub cart: Cart,
    pub log: Vec<ConversationTurn>,
}

impl Session {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            gateway: ModelGateway::new(model, prompts::SHOPPING_ASSISTANT),
            cart: Cart::new(),
            log: Vec::new(),
        }
    }

    /// Run one full turn: model call, interpretation, cart mutation, log
    /// append. Returns the chat message shown for this turn.
    pub async fn process_turn(&mut self, utterance: &str) -> Result<String, ProviderError> {
        let reply = self.gateway.ask(utterance, &self.cart).await?;

        let message = match interpret(&reply) {
            ParsedAction::Add { items } => self.cart.apply_add(&items),
            ParsedAction::Remove { name, quantity } => self.cart.apply_remove(&name, quantity),
            ParsedAction::PlainText(text) => text,
        };

        self.log.push(ConversationTurn::new(utterance, &message));
        Ok(message)
    }
}
