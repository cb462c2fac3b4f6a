use std::path::Path;

use crate::commands::common::{
    load_sync_config, normalize_item_identifier, open_service, resolve_item,
};
use crate::error::CliError;

pub async fn run_delete(id: &str, db_path: &Path) -> Result<(), CliError> {
    let normalized_id = normalize_item_identifier(id)?;
    let service = open_service(db_path, &load_sync_config()?).await?;
    let item = resolve_item(&normalized_id, &service).await?;

    service.delete_item(&item.id).await?;
    println!("{}", item.id);
    Ok(())
}
