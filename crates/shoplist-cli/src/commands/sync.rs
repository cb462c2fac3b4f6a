use std::path::Path;

use tokio_util::sync::CancellationToken;

use crate::commands::common::{format_sync_report, load_sync_config, open_service};
use crate::error::CliError;

pub async fn run_sync(failure_rate: Option<f64>, db_path: &Path) -> Result<(), CliError> {
    let mut config = load_sync_config()?;
    if let Some(rate) = failure_rate {
        config = config.with_failure_rate(rate);
        config.validate()?;
    }

    let service = open_service(db_path, &config).await?;

    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let outcome = service.sync_with_remote(&cancel).await;
    interrupt.abort();

    // None: interrupted during backoff, pending changes stay queued
    if let Some(report) = outcome? {
        println!("{}", format_sync_report(&report));
    }
    Ok(())
}
