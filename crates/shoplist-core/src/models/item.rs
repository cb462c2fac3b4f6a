//! Shopping item model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::SyncStatus;
use crate::util::now_millis;
#[cfg(test)]
use crate::util::fold_case;

/// A unique identifier for a shopping item, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Create a new unique item ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// An item on the shopping list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingItem {
    /// Unique identifier
    pub id: ItemId,
    /// Display name
    pub name: String,
    /// How many to buy (non-negative by convention)
    pub quantity: i64,
    /// Free-form note
    pub note: Option<String>,
    /// Whether the item has been bought
    pub is_bought: bool,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
}

impl ShoppingItem {
    /// Create a new, not-yet-bought item
    #[must_use]
    pub fn new(name: impl Into<String>, quantity: i64) -> Self {
        let now = now_millis();
        Self {
            id: ItemId::new(),
            name: name.into(),
            quantity,
            note: None,
            is_bought: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach a note
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

#[cfg(test)]
impl ShoppingItem {
    /// In-memory form of the store's search predicate
    pub(crate) fn matches_text(&self, needle: &str) -> bool {
        let needle = fold_case(needle);
        fold_case(&self.name).contains(&needle)
            || self
                .note
                .as_deref()
                .is_some_and(|note| fold_case(note).contains(&needle))
    }
}

/// A persisted item together with its sync bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredItem {
    /// Domain fields
    pub item: ShoppingItem,
    /// Pending remote mutation, if any
    pub sync_status: SyncStatus,
}

impl StoredItem {
    /// Domain copy with no link back to the store
    pub fn to_domain(&self) -> ShoppingItem {
        self.item.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_unique() {
        let id1 = ItemId::new();
        let id2 = ItemId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_item_id_parse() {
        let id = ItemId::new();
        let parsed: ItemId = id.as_str().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<ItemId>().is_err());
    }

    #[test]
    fn test_item_new() {
        let item = ShoppingItem::new("Milk", 2);
        assert_eq!(item.name, "Milk");
        assert_eq!(item.quantity, 2);
        assert!(!item.is_bought);
        assert!(item.note.is_none());
        assert!(item.created_at > 0);
        assert_eq!(item.created_at, item.updated_at);
    }

    #[test]
    fn test_matches_text_name_and_note() {
        let item = ShoppingItem::new("Oat Milk", 1).with_note("Barista edition");
        assert!(item.matches_text("milk"));
        assert!(item.matches_text("BARISTA"));
        assert!(!item.matches_text("bread"));

        let no_note = ShoppingItem::new("Eggs", 12);
        assert!(!no_note.matches_text("barista"));
    }
}
