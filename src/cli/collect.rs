//! Collect command implementation.

use crate::cli::args::CollectArgs;
use crate::core::collector::{self, CollectRequest};
use crate::core::config::EngineConfig;
use crate::error::Result;
use crate::storage::paths::AppPaths;

/// Execute the collect command.
///
/// # Errors
/// Returns an error for invalid arguments, a broken configuration file,
/// or any failure of the collection run itself.
pub async fn execute(args: &CollectArgs) -> Result<()> {
    args.validate()?;

    let paths = AppPaths::new();

    // An explicit --config must exist; the default location is optional.
    let config_path = args.config.clone().or_else(|| {
        let default = paths.config_file();
        default.exists().then_some(default)
    });
    let config = EngineConfig::load(config_path.as_deref())?;

    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| paths.consumption_db_file());

    let request = CollectRequest {
        token: args.token.clone(),
        home_id: args.home_id.clone(),
        resolution: args.effective_resolution()?,
        since: args.effective_since()?,
        until: args.effective_until()?,
        max_records: args.max_records,
        db_path,
    };

    let summary = collector::run(&request, &config).await?;

    println!(
        "Merged {} of {} fetched record(s) over {} page(s) for home {}",
        summary.merged, summary.fetched, summary.pages, summary.home_id
    );
    println!(
        "Window: {} .. {} ({})",
        summary.since.to_rfc3339(),
        summary.until.to_rfc3339(),
        summary.stop.as_str()
    );
    println!("Store now holds {} record(s)", summary.total_stored);

    Ok(())
}
