use std::path::Path;

use shoplist_core::ShoppingItem;

use crate::commands::common::{
    load_sync_config, normalize_item_identifier, open_service, resolve_item,
};
use crate::error::CliError;

pub async fn run_toggle(id: &str, db_path: &Path) -> Result<ShoppingItem, CliError> {
    let normalized_id = normalize_item_identifier(id)?;
    let service = open_service(db_path, &load_sync_config()?).await?;
    let item = resolve_item(&normalized_id, &service).await?;

    let toggled = service.toggle_bought(&item.id).await?;
    let state = if toggled.is_bought { "bought" } else { "not bought" };
    println!("{} {state}", toggled.id);
    Ok(toggled)
}
