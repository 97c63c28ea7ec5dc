//! Model reply interpretation
//!
//! The model answers either with conversational text or with a JSON action
//! object, and routinely wraps the JSON in a markdown code fence. Missing
//! fields, stray fences, and non-JSON replies are all expected here, so
//! everything defaults rather than errors: anything unrecognized falls back
//! to plain text, surfaced to the user verbatim.

use serde_json::Value;

/// A model reply classified into something the cart can act on.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedAction {
    Add { items: Vec<ItemRequest> },
    Remove { name: String, quantity: i64 },
    PlainText(String),
}

/// One requested cart addition, defaults already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRequest {
    pub name: String,
    pub quantity: i64,
    /// Empty when the model gave none; resolved later by color derivation.
    pub color: String,
    pub attributes: String,
    pub price: f64,
}

/// Classify a raw model reply.
pub fn interpret(raw: &str) -> ParsedAction {
    let cleaned = strip_code_fence(raw);

    let Ok(value) = serde_json::from_str::<Value>(&cleaned) else {
        return ParsedAction::PlainText(raw.to_string());
    };

    let Some(action) = value.get("action").and_then(Value::as_str) else {
        return ParsedAction::PlainText(raw.to_string());
    };

    match action {
        "add" => ParsedAction::Add {
            items: value
                .get("items")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(parse_item).collect())
                .unwrap_or_default(),
        },
        "remove" => ParsedAction::Remove {
            name: value
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("Unknown")
                .to_string(),
            // 0 means "remove all"
            quantity: value.get("quantity").and_then(Value::as_i64).unwrap_or(0),
        },
        _ => ParsedAction::PlainText(raw.to_string()),
    }
}

fn parse_item(item: &Value) -> ItemRequest {
    ItemRequest {
        name: item
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string(),
        quantity: item.get("quantity").and_then(Value::as_i64).unwrap_or(1),
        color: item
            .get("color")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        attributes: item
            .get("attributes")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        price: item.get("price").and_then(Value::as_f64).unwrap_or(0.0),
    }
}

/// Drop a wrapping triple-backtick fence: first and last lines go, the
/// middle stays. Unfenced text passes through trimmed.
fn strip_code_fence(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let lines: Vec<&str> = trimmed.lines().collect();
    if lines.len() < 2 {
        return trimmed.to_string();
    }
    // The last line goes unconditionally, closing fence or not. An
    // unterminated fence therefore strips to nothing and the reply falls
    // back to plain text rather than a half-parsed action.
    lines[1..lines.len() - 1].join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_with_all_fields() {
        let raw = r##"{"action": "add", "items": [{"name": "Apples", "quantity": 2, "color": "#DC143C", "attributes": "", "price": 3.99}]}"##;
        let ParsedAction::Add { items } = interpret(raw) else {
            panic!("expected add");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Apples");
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].color, "#DC143C");
        assert_eq!(items[0].price, 3.99);
    }

    #[test]
    fn test_add_defaults_missing_fields() {
        let raw = r#"{"action": "add", "items": [{}]}"#;
        let ParsedAction::Add { items } = interpret(raw) else {
            panic!("expected add");
        };
        assert_eq!(items[0].name, "Unknown");
        assert_eq!(items[0].quantity, 1);
        assert_eq!(items[0].color, "");
        assert_eq!(items[0].attributes, "");
        assert_eq!(items[0].price, 0.0);
    }

    #[test]
    fn test_fenced_json_parses_same_as_bare() {
        let bare = r#"{"action": "remove", "name": "Grapes", "quantity": 0}"#;
        let fenced = format!("```json\n{}\n```", bare);
        assert_eq!(interpret(bare), interpret(&fenced));
        assert_eq!(
            interpret(&fenced),
            ParsedAction::Remove {
                name: "Grapes".to_string(),
                quantity: 0
            }
        );
    }

    #[test]
    fn test_remove_defaults() {
        let raw = r#"{"action": "remove"}"#;
        assert_eq!(
            interpret(raw),
            ParsedAction::Remove {
                name: "Unknown".to_string(),
                quantity: 0
            }
        );
    }

    #[test]
    fn test_freeform_text_passes_through_unmodified() {
        let raw = "Your cart has 3 items totalling $12.50.";
        assert_eq!(interpret(raw), ParsedAction::PlainText(raw.to_string()));
    }

    #[test]
    fn test_fenced_non_json_surfaces_original_text() {
        // The fallback must carry the original reply, fence included.
        let raw = "```\nnot json at all\n```";
        assert_eq!(interpret(raw), ParsedAction::PlainText(raw.to_string()));
    }

    #[test]
    fn test_unterminated_fence_falls_back_to_text() {
        let raw = "```json\n{\"action\": \"remove\", \"name\": \"Grapes\"}";
        assert_eq!(interpret(raw), ParsedAction::PlainText(raw.to_string()));
    }

    #[test]
    fn test_unknown_action_falls_back() {
        let raw = r#"{"action": "checkout"}"#;
        assert_eq!(interpret(raw), ParsedAction::PlainText(raw.to_string()));
    }

    #[test]
    fn test_non_object_json_falls_back() {
        assert_eq!(
            interpret("[1, 2, 3]"),
            ParsedAction::PlainText("[1, 2, 3]".to_string())
        );
    }
}
