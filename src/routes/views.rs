//! HTML rendering for the chat page and htmx fragments
//!
//! Plain string templates; the cart panel and stat counters update through
//! htmx out-of-band swaps alongside the chat log.

use uuid::Uuid;

use crate::core::color::contrast_text;
use crate::core::Session;

/// Full chat page with empty chat/cart panels and the submit form.
pub fn render_page(session_id: Uuid) -> String {
    format!(
        r##"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>🛍️ ShopSmart AI - Your Intelligent Shopping Assistant</title>
<script src="https://unpkg.com/htmx.org@1.9.12"></script>
<style>
body {{ font-family: system-ui, sans-serif; max-width: 1100px; margin: 0 auto; padding: 20px; }}
.panels {{ display: flex; gap: 24px; }}
.panel {{ flex: 1; border: 1px solid #ddd; border-radius: 12px; padding: 16px; min-height: 300px; }}
.stats {{ display: flex; gap: 16px; margin-bottom: 16px; }}
.stat {{ flex: 1; border: 1px solid #ddd; border-radius: 8px; padding: 8px 12px; }}
.stat-value {{ font-size: 22px; font-weight: 700; }}
.user-msg {{ text-align: right; margin: 8px 0; }}
.bot-msg {{ text-align: left; margin: 8px 0; }}
.bubble {{ display: inline-block; padding: 10px 14px; border-radius: 14px; max-width: 75%; }}
.user-msg .bubble {{ background: #667eea; color: white; }}
.bot-msg .bubble {{ background: #f0f0f5; }}
.cart-entry {{ border-radius: 10px; padding: 12px 16px; margin-bottom: 10px; }}
.msg-time {{ font-size: 10px; opacity: 0.6; }}
form {{ display: flex; gap: 10px; margin-top: 20px; }}
input[name=prompt] {{ flex: 1; padding: 12px 16px; border-radius: 20px; border: 1px solid #ccc; }}
button {{ padding: 12px 24px; border-radius: 20px; border: none; background: #667eea; color: white; cursor: pointer; }}
</style>
</head>
<body>
<h1>🛍️ ShopSmart AI</h1>
<p>Your Intelligent Shopping Companion Powered by AI</p>
<div class="stats">
  <div class="stat">💬 Messages<div class="stat-value" id="msg-count">0</div></div>
  <div class="stat">🛒 Cart Items<div class="stat-value" id="cart-count">0</div></div>
  <div class="stat">💰 Total Price<div class="stat-value" id="total-price">$0.00</div></div>
</div>
<div class="panels">
  <div class="panel" id="chat-result">💭 Start chatting with ShopSmart AI! Try: "add 3 red apples" or "what's in my cart?"</div>
  <div class="panel" id="cart-result">🛍️ Your cart is empty - Add items to get started!</div>
</div>
<form hx-post="/submit" hx-target="#chat-result" hx-swap="innerHTML" hx-on::after-request="this.reset()">
  <input type="hidden" name="session_id" value="{session_id}">
  <input name="prompt" placeholder="💬 Type your message... (e.g., &quot;add 2 red apples&quot;)" required autocomplete="off">
  <button type="submit">🚀 Send</button>
</form>
</body>
</html>"##
    )
}

/// Fragments for one completed turn: the chat log, plus out-of-band swaps
/// for the cart panel and the three stat counters.
pub fn render_turn_fragments(session: &Session) -> String {
    let mut chat = String::new();
    for turn in &session.log {
        let time = turn.display_time();
        chat.push_str(&format!(
            r#"<div class="user-msg"><span class="bubble">{}<br><span class="msg-time">{}</span></span></div>"#,
            escape(&turn.user),
            time
        ));
        chat.push_str(&format!(
            r#"<div class="bot-msg"><span class="bubble">🤖 <strong>ShopSmart AI</strong><br>{}<br><span class="msg-time">{}</span></span></div>"#,
            escape(&turn.assistant),
            time
        ));
    }

    let mut cart_panel = String::new();
    if session.cart.is_empty() {
        cart_panel.push_str("🛍️ Your cart is empty - Add items to get started!");
    } else {
        cart_panel.push_str(&format!(
            r#"<div class="cart-entry" style="background:#11998e;color:white;">💰 Cart Total: <strong>${:.2}</strong></div>"#,
            session.cart.total_price()
        ));
        for (key, item) in session.cart.iter() {
            let text_color = contrast_text(&item.color);
            let line_total = item.quantity as f64 * item.price;
            cart_panel.push_str(&format!(
                r#"<div class="cart-entry" style="background:{};color:{};">🏷️ <strong>{}</strong> &mdash; Qty: {} &mdash; ${:.2}</div>"#,
                escape(&item.color),
                text_color,
                escape(key),
                item.quantity,
                line_total
            ));
        }
    }

    format!(
        r#"{chat}
<div id="cart-result" hx-swap-oob="true">{cart_panel}</div>
<div id="msg-count" hx-swap-oob="true" class="stat-value">{}</div>
<div id="cart-count" hx-swap-oob="true" class="stat-value">{}</div>
<div id="total-price" hx-swap-oob="true" class="stat-value">${:.2}</div>"#,
        session.log.len(),
        session.cart.total_items(),
        session.cart.total_price()
    )
}

pub fn render_error(message: &str) -> String {
    format!(
        r#"<div style="color: #c0392b; padding: 10px;">{}</div>"#,
        escape(message)
    )
}

/// Minimal HTML escaping for user- and model-supplied text.
fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::conversation::Message;
    use crate::providers::{ChatModel, ChatOutcome, ProviderError};

    use super::*;

    struct AddModel;

    #[async_trait]
    impl ChatModel for AddModel {
        async fn run(&self, _messages: &[Message]) -> Result<ChatOutcome, ProviderError> {
            let reply = r#"{"action": "add", "items": [{"name": "Apples", "quantity": 2, "price": 3.99}]}"#.to_string();
            Ok(ChatOutcome {
                reply: reply.clone(),
                transcript: vec![Message::assistant(reply)],
            })
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>&\"x\""), "&lt;b&gt;&amp;&quot;x&quot;");
    }

    #[test]
    fn test_page_embeds_session_id() {
        let id = Uuid::new_v4();
        let page = render_page(id);
        assert!(page.contains(&id.to_string()));
        assert!(page.contains("hx-post=\"/submit\""));
    }

    #[tokio::test]
    async fn test_fragments_carry_cart_and_stats() {
        let mut session = Session::new(Arc::new(AddModel));
        session.process_turn("add 2 apples").await.unwrap();

        let fragments = render_turn_fragments(&session);
        assert!(fragments.contains("add 2 apples"));
        assert!(fragments.contains("Apples"));
        assert!(fragments.contains("$7.98"));
        assert!(fragments.contains(r#"<div id="cart-count" hx-swap-oob="true" class="stat-value">2</div>"#));
    }

    #[test]
    fn test_error_fragment_escaped() {
        let html = render_error("bad <script>");
        assert!(html.contains("bad &lt;script&gt;"));
    }
}
