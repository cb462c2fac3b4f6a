use std::env;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use shoplist_core::db::PendingSummary;
use shoplist_core::models::Lifecycle;
use shoplist_core::{ItemId, ShoppingItem, ShoppingService, SyncConfig, SyncReport};

use crate::error::CliError;

const SHORT_ID_LEN: usize = 13;

#[derive(Debug, Serialize)]
pub struct ItemListItem {
    pub id: String,
    pub name: String,
    pub quantity: i64,
    pub note: Option<String>,
    pub is_bought: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub relative_time: String,
}

#[derive(Debug, Serialize)]
pub struct PendingStatusItem {
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
    pub total: usize,
}

pub async fn open_service(
    db_path: &Path,
    config: &SyncConfig,
) -> Result<ShoppingService, CliError> {
    Ok(ShoppingService::open_path(db_path.to_path_buf(), config).await?)
}

pub fn load_sync_config() -> Result<SyncConfig, CliError> {
    Ok(SyncConfig::from_env()?)
}

/// Resolve an exact id or a unique id prefix to a live item
pub async fn resolve_item(
    item_query: &str,
    service: &ShoppingService,
) -> Result<ShoppingItem, CliError> {
    if let Ok(item_id) = item_query.parse::<ItemId>() {
        if let Some(stored) = service.get_item(&item_id).await? {
            if stored.sync_status.lifecycle() == Lifecycle::Active {
                return Ok(stored.to_domain());
            }
        }
    }

    let matching_ids = service.find_ids_by_prefix(item_query, 3).await?;

    match matching_ids.as_slice() {
        [] => Err(CliError::ItemNotFound(item_query.to_string())),
        [only] => {
            let resolved_id = only
                .parse::<ItemId>()
                .map_err(|_| CliError::ItemNotFound(item_query.to_string()))?;
            service
                .get_item(&resolved_id)
                .await?
                .map(|stored| stored.to_domain())
                .ok_or_else(|| CliError::ItemNotFound(item_query.to_string()))
        }
        _ => {
            let options = matching_ids
                .iter()
                .map(|id| short_id(id))
                .collect::<Vec<_>>()
                .join(", ");

            Err(CliError::AmbiguousItemId(format!(
                "ID prefix '{item_query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn short_id(id: &str) -> String {
    id.chars().take(SHORT_ID_LEN).collect()
}

pub fn format_item_lines(items: &[ShoppingItem]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    items
        .iter()
        .map(|item| {
            let short_id = short_id(&item.id.to_string());
            let mark = if item.is_bought { "[x]" } else { "[ ]" };
            let quantity = format!("x{}", item.quantity);
            let relative_time = format_relative_time(item.updated_at, now_ms);

            match item.note.as_deref() {
                Some(note) => format!(
                    "{short_id:<13}  {mark} {:<30}  {quantity:<5}  {relative_time:<10}  ({note})",
                    item.name
                ),
                None => format!(
                    "{short_id:<13}  {mark} {:<30}  {quantity:<5}  {relative_time}",
                    item.name
                ),
            }
        })
        .collect()
}

pub fn item_to_list_item(item: &ShoppingItem) -> ItemListItem {
    let now_ms = Utc::now().timestamp_millis();
    ItemListItem {
        id: item.id.to_string(),
        name: item.name.clone(),
        quantity: item.quantity,
        note: item.note.clone(),
        is_bought: item.is_bought,
        created_at: item.created_at,
        updated_at: item.updated_at,
        relative_time: format_relative_time(item.updated_at, now_ms),
    }
}

pub const fn pending_to_status_item(summary: PendingSummary) -> PendingStatusItem {
    PendingStatusItem {
        creates: summary.creates,
        updates: summary.updates,
        deletes: summary.deletes,
        total: summary.total(),
    }
}

pub fn format_pending_summary(summary: PendingSummary) -> String {
    if summary.total() == 0 {
        return "Everything is synced".to_string();
    }
    format!(
        "{} pending change(s): {} to create, {} to update, {} to delete",
        summary.total(),
        summary.creates,
        summary.updates,
        summary.deletes
    )
}

pub fn format_sync_report(report: &SyncReport) -> String {
    let attempts = if report.attempts == 1 {
        "1 attempt".to_string()
    } else {
        format!("{} attempts", report.attempts)
    };
    format!(
        "Sync completed in {attempts}: {} created, {} updated, {} deleted",
        report.created, report.updated, report.deleted
    )
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else {
        format!("{}w ago", diff / week)
    }
}

pub fn normalize_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn normalize_name(parts: &[String]) -> Result<String, CliError> {
    normalize_text(&parts.join(" ")).ok_or(CliError::EmptyName)
}

pub fn normalize_item_identifier(id: &str) -> Result<String, CliError> {
    normalize_text(id).ok_or(CliError::EmptyItemId)
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(path) = cli_db_path.or_else(|| env::var_os("SHOPLIST_DB_PATH").map(PathBuf::from))
    {
        return Ok(path);
    }
    default_db_path()
}

pub fn default_db_path() -> Result<PathBuf, CliError> {
    dirs::data_dir()
        .map(|dir| dir.join("shoplist").join("shoplist.db"))
        .ok_or(CliError::NoDataDir)
}
