use std::path::Path;

use shoplist_core::ShoppingItem;

use crate::commands::common::{
    load_sync_config, normalize_item_identifier, normalize_text, open_service, resolve_item,
};
use crate::error::CliError;

/// Field changes requested on the command line
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ItemEdit {
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub note: Option<String>,
    pub clear_note: bool,
}

impl ItemEdit {
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.quantity.is_none() && self.note.is_none() && !self.clear_note
    }

    /// Apply the changes to `item`; a blank note clears it
    pub fn apply(&self, item: &ShoppingItem) -> Result<ShoppingItem, CliError> {
        let mut edited = item.clone();

        if let Some(name) = self.name.as_deref() {
            edited.name = normalize_text(name).ok_or(CliError::EmptyName)?;
        }
        if let Some(quantity) = self.quantity {
            edited.quantity = quantity;
        }
        if self.clear_note {
            edited.note = None;
        } else if let Some(note) = self.note.as_deref() {
            edited.note = normalize_text(note);
        }

        Ok(edited)
    }
}

pub async fn run_edit(id: &str, edit: &ItemEdit, db_path: &Path) -> Result<(), CliError> {
    if edit.is_empty() {
        return Err(CliError::NothingToEdit);
    }

    let normalized_id = normalize_item_identifier(id)?;
    let service = open_service(db_path, &load_sync_config()?).await?;
    let item = resolve_item(&normalized_id, &service).await?;

    let edited = edit.apply(&item)?;
    if edited == item {
        println!("{}", item.id);
        return Ok(());
    }

    let updated = service.update_item(&edited).await?;
    println!("{}", updated.id);
    Ok(())
}
