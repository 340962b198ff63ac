//! Warehouse and military rosters with merge-by-name insertion.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredItem {
    pub name: String,
    pub qty: u32,
    #[serde(default)]
    pub price_hint_gp: Option<i64>,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub source: String,
}

/// Append an item, merging into an existing row when the name matches
/// case-insensitively: quantities sum, distinct notes concatenate, and the
/// first non-empty price hint sticks.
pub fn append_item(
    list: &mut Vec<StoredItem>,
    name: &str,
    qty: u32,
    price_hint_gp: Option<i64>,
    note: Option<&str>,
    source: &str,
) {
    let key = name.trim().to_lowercase();
    if let Some(existing) = list.iter_mut().find(|it| it.name.trim().to_lowercase() == key) {
        existing.qty += qty;
        if existing.price_hint_gp.is_none() {
            existing.price_hint_gp = price_hint_gp;
        }
        if let Some(note) = note {
            if !existing.notes.iter().any(|n| n == note) {
                existing.notes.push(note.to_string());
            }
        }
        if existing.source.is_empty() {
            existing.source = source.to_string();
        }
        return;
    }
    list.push(StoredItem {
        name: name.trim().to_string(),
        qty,
        price_hint_gp,
        notes: note.map(|n| vec![n.to_string()]).unwrap_or_default(),
        source: source.to_string(),
    });
}
