use std::path::Path;

use shoplist_core::{ItemFilter, ItemSort};

use crate::commands::common::{
    format_item_lines, item_to_list_item, load_sync_config, open_service, ItemListItem,
};
use crate::error::CliError;

pub async fn run_list(
    filter: ItemFilter,
    search: Option<&str>,
    sort: ItemSort,
    as_json: bool,
    db_path: &Path,
) -> Result<(), CliError> {
    let service = open_service(db_path, &load_sync_config()?).await?;
    let items = service
        .fetch_items(filter, search.unwrap_or_default(), sort)
        .await?;

    if as_json {
        let json_items = items
            .iter()
            .map(item_to_list_item)
            .collect::<Vec<ItemListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("No items ({}, {}).", filter.label(), sort.label());
        return Ok(());
    }

    for line in format_item_lines(&items) {
        println!("{line}");
    }
    Ok(())
}
