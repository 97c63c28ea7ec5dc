//! The cart store and its reconciliation rules
//!
//! Entries are keyed by `name` or `name (attributes)` so otherwise-identical
//! products with different attribute text stay distinct. The map is
//! insertion-ordered on purpose: display order is stable, and prefix-match
//! removal always resolves to the earliest-added candidate.

use indexmap::IndexMap;

use super::color::derive_color;
use super::interpret::ItemRequest;

/// One distinct purchasable entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    pub quantity: i64,
    pub price: f64,
    pub color: String,
}

/// Insertion-ordered cart keyed by product name (plus attributes).
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: IndexMap<String, CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an add action and return the chat summary.
    ///
    /// Repeat adds to an existing key accumulate quantity only; the price
    /// and color recorded on first insert stay as they are.
    pub fn apply_add(&mut self, items: &[ItemRequest]) -> String {
        let mut added = Vec::new();

        for item in items {
            let color = if usable_color(&item.color) {
                item.color.clone()
            } else {
                derive_color(&item.name)
            };

            let key = if item.attributes.is_empty() {
                item.name.clone()
            } else {
                format!("{} ({})", item.name, item.attributes)
            };

            if let Some(existing) = self.items.get_mut(&key) {
                existing.quantity += item.quantity;
            } else {
                self.items.insert(
                    key.clone(),
                    CartItem {
                        quantity: item.quantity,
                        price: item.price,
                        color,
                    },
                );
            }

            added.push(format!("{} {}", item.quantity, key));
        }

        format!(
            "✅ Added {} to cart (Total: ${:.2})",
            added.join(", "),
            self.total_price()
        )
    }

    /// Apply a remove action and return the chat summary.
    ///
    /// Lookup is by prefix, first match in insertion order: the model often
    /// echoes the base product name without its attribute suffix, and that
    /// still has to resolve. quantity 0 (or ≥ the current count) deletes
    /// the entry outright; entries never survive at quantity ≤ 0.
    pub fn apply_remove(&mut self, name: &str, quantity: i64) -> String {
        let Some(key) = self
            .items
            .keys()
            .find(|key| key.starts_with(name))
            .cloned()
        else {
            return format!("❌ {} not found in cart", name);
        };

        let current = self.items[&key].quantity;
        if quantity == 0 || quantity >= current {
            // shift_remove keeps the remaining entries in insertion order
            self.items.shift_remove(&key);
            format!("🗑️ Removed {} from cart", key)
        } else {
            let item = self.items.get_mut(&key).expect("key just found");
            item.quantity -= quantity;
            let remaining = item.quantity;
            format!("➖ Removed {} {} (Remaining: {})", quantity, key, remaining)
        }
    }

    /// Total item count, recomputed from entries.
    pub fn total_items(&self) -> i64 {
        self.items.values().map(|item| item.quantity).sum()
    }

    /// Total price, recomputed from entries.
    pub fn total_price(&self) -> f64 {
        self.items
            .values()
            .map(|item| item.quantity as f64 * item.price)
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CartItem)> {
        self.items.iter()
    }

    pub fn get(&self, key: &str) -> Option<&CartItem> {
        self.items.get(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// A color is usable only if the model actually supplied one; empty,
/// whitespace, or a bare "#" fall back to derivation.
fn usable_color(color: &str) -> bool {
    let trimmed = color.trim();
    !trimmed.is_empty() && trimmed != "#"
}
