//! Stats command implementation.

use crate::cli::args::StatsArgs;
use crate::error::Result;
use crate::storage::paths::AppPaths;
use crate::storage::store::ConsumptionStore;
use crate::util::{format_energy, format_money};

/// Execute the stats command.
///
/// # Errors
/// Returns an error when the database cannot be opened or queried.
pub fn execute(args: &StatsArgs) -> Result<()> {
    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| AppPaths::new().consumption_db_file());

    let store = ConsumptionStore::open(&db_path)?;
    let stats = store.stats()?;

    println!("Database: {}", db_path.display());
    println!("Records:  {}", stats.record_count);

    if stats.record_count == 0 {
        println!("\nThe store is empty. Run `wattvault collect` to fetch data.");
        return Ok(());
    }

    if let (Some(earliest), Some(latest)) = (stats.earliest, stats.latest) {
        println!(
            "Range:    {} .. {}",
            earliest.to_rfc3339(),
            latest.to_rfc3339()
        );
    }

    let unit = stats.consumption_unit.as_deref().unwrap_or("kWh");
    if let Some(total) = stats.total_consumption {
        println!("Consumption: {}", format_energy(total, unit));
    }
    if let (Some(cost), Some(currency)) = (stats.total_cost, stats.currency.as_deref()) {
        println!("Cost:        {}", format_money(cost, currency));
    }
    println!(
        "Aggregates:  {} daily, {} monthly",
        stats.daily_rows, stats.monthly_rows
    );

    let daily = store.daily_aggregates()?;
    if !daily.is_empty() {
        println!("\nRecent days:");
        println!("{:<12} {:>16} {:>14}", "Date", "Consumption", "Cost");
        for day in daily.iter().skip(daily.len().saturating_sub(7)) {
            let cost = match (day.total_cost, day.currency.as_deref()) {
                (Some(cost), Some(currency)) => format_money(cost, currency),
                _ => "-".to_string(),
            };
            println!(
                "{:<12} {:>16} {:>14}",
                day.date,
                format_energy(day.total_consumption, unit),
                cost
            );
        }
    }

    Ok(())
}
