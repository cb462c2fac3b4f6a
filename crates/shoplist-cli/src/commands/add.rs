use std::path::Path;

use shoplist_core::ShoppingItem;

use crate::commands::common::{load_sync_config, normalize_name, normalize_text, open_service};
use crate::error::CliError;

pub async fn run_add(
    name_parts: &[String],
    quantity: i64,
    note: Option<&str>,
    db_path: &Path,
) -> Result<ShoppingItem, CliError> {
    let name = normalize_name(name_parts)?;
    let mut item = ShoppingItem::new(name, quantity);
    item.note = note.and_then(normalize_text);

    let service = open_service(db_path, &load_sync_config()?).await?;
    service.add_item(&item).await?;

    println!("{}", item.id);
    Ok(item)
}
