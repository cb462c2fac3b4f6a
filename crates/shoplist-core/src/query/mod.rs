//! Query building for item lists
//!
//! Maps a filter, free-text search and sort order onto a single SQL statement
//! over `shopping_items`. Every predicate is composed in SQL; nothing is
//! post-filtered in memory.

use std::fmt;
use std::str::FromStr;

use libsql::Value;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::SyncStatus;
use crate::util::fold_case;

/// Columns selected for every item query, in `parse_stored_item` order
pub(crate) const ITEM_COLUMNS: &str =
    "id, name, quantity, note, is_bought, created_at, updated_at, sync_status";

/// Which items to show by bought state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemFilter {
    #[default]
    All,
    Bought,
    NotBought,
}

impl ItemFilter {
    /// Human-readable label
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Bought => "Bought",
            Self::NotBought => "Not Bought",
        }
    }

    /// Required `is_bought` value, or `None` for no constraint
    pub const fn bought_constraint(self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::Bought => Some(true),
            Self::NotBought => Some(false),
        }
    }
}

impl fmt::Display for ItemFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ItemFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "all" => Ok(Self::All),
            "bought" => Ok(Self::Bought),
            "not-bought" | "notbought" | "not bought" => Ok(Self::NotBought),
            other => Err(Error::InvalidInput(format!("unknown filter '{other}'"))),
        }
    }
}

/// Fixed set of list orderings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemSort {
    CreatedAtAsc,
    #[default]
    CreatedAtDesc,
    UpdatedAtAsc,
    UpdatedAtDesc,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    const fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl ItemSort {
    pub const ALL: [Self; 4] = [
        Self::CreatedAtAsc,
        Self::CreatedAtDesc,
        Self::UpdatedAtAsc,
        Self::UpdatedAtDesc,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::CreatedAtAsc => "Oldest First",
            Self::CreatedAtDesc => "Newest First",
            Self::UpdatedAtAsc => "Least Recently Updated",
            Self::UpdatedAtDesc => "Recently Updated",
        }
    }

    /// Column and direction this ordering sorts by
    pub const fn key(self) -> (&'static str, Direction) {
        match self {
            Self::CreatedAtAsc => ("created_at", Direction::Asc),
            Self::CreatedAtDesc => ("created_at", Direction::Desc),
            Self::UpdatedAtAsc => ("updated_at", Direction::Asc),
            Self::UpdatedAtDesc => ("updated_at", Direction::Desc),
        }
    }

    /// `ORDER BY` clause body. The id breaks ties in the same direction so
    /// ascending and descending results are exact reverses.
    pub fn order_by(self) -> String {
        let (column, direction) = self.key();
        let direction = direction.sql();
        format!("{column} {direction}, id {direction}")
    }
}

impl fmt::Display for ItemSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ItemSort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "created-asc" | "created-at-asc" | "oldest" => Ok(Self::CreatedAtAsc),
            "created-desc" | "created-at-desc" | "newest" => Ok(Self::CreatedAtDesc),
            "updated-asc" | "updated-at-asc" => Ok(Self::UpdatedAtAsc),
            "updated-desc" | "updated-at-desc" | "recent" => Ok(Self::UpdatedAtDesc),
            other => Err(Error::InvalidInput(format!("unknown sort order '{other}'"))),
        }
    }
}

/// A list query: filter, optional search text and ordering
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemQuery {
    pub filter: ItemFilter,
    pub search: Option<String>,
    pub sort: ItemSort,
}

impl ItemQuery {
    /// Build a query; empty search text means no search constraint.
    ///
    /// The text is matched as given, including surrounding whitespace.
    pub fn new(filter: ItemFilter, search_text: &str, sort: ItemSort) -> Self {
        Self {
            filter,
            search: (!search_text.is_empty()).then(|| search_text.to_string()),
            sort,
        }
    }

    /// Render to SQL and positional parameters
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut clauses = vec!["sync_status != ?".to_string()];
        let mut params = vec![Value::Integer(SyncStatus::PendingDelete.to_db())];

        if let Some(bought) = self.filter.bought_constraint() {
            clauses.push("is_bought = ?".to_string());
            params.push(Value::Integer(i64::from(bought)));
        }

        if let Some(search) = &self.search {
            clauses.push(
                "(name_folded LIKE ? ESCAPE '\\' OR note_folded LIKE ? ESCAPE '\\')".to_string(),
            );
            let pattern = format!("%{}%", escape_like(&fold_case(search)));
            params.push(Value::Text(pattern.clone()));
            params.push(Value::Text(pattern));
        }

        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM shopping_items WHERE {} ORDER BY {}",
            clauses.join(" AND "),
            self.sort.order_by()
        );
        (sql, params)
    }
}

/// Escape `LIKE` wildcards so search text matches literally
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
