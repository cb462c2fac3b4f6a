use std::path::Path;

use crate::commands::common::{
    format_pending_summary, load_sync_config, open_service, pending_to_status_item,
};
use crate::error::CliError;

pub async fn run_status(as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let service = open_service(db_path, &load_sync_config()?).await?;
    let summary = service.pending_changes().await?;

    if as_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&pending_to_status_item(summary))?
        );
    } else {
        println!("{}", format_pending_summary(summary));
    }
    Ok(())
}
