//! Consumption storage layer.
//!
//! Persists hourly consumption records and maintains the derived daily and
//! monthly aggregate tables. Built on top of the consumption schema and
//! migrations.
//!
//! Records are keyed by their `(from_time, to_time)` interval. Re-merging an
//! interval replaces the stored row, so repeated collection runs converge on
//! the most recently fetched values.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, Row, params};

use crate::core::models::{ConsumptionRecord, DailyAggregate, MonthlyAggregate};
use crate::error::Result;
use crate::storage::schema::run_migrations;
use crate::util::parse_utc;

/// Summary of the store contents, used by the `stats` command.
#[derive(Debug, Clone)]
pub struct StoreStats {
    /// Number of hourly records stored.
    pub record_count: i64,
    /// Start of the earliest stored interval.
    pub earliest: Option<DateTime<Utc>>,
    /// Start of the latest stored interval.
    pub latest: Option<DateTime<Utc>>,
    /// Sum of consumption over all stored records.
    pub total_consumption: Option<f64>,
    /// Sum of cost over all stored records.
    pub total_cost: Option<f64>,
    /// Consumption unit reported by the meter.
    pub consumption_unit: Option<String>,
    /// Currency of the stored costs.
    pub currency: Option<String>,
    /// Number of daily aggregate rows.
    pub daily_rows: i64,
    /// Number of monthly aggregate rows.
    pub monthly_rows: i64,
}

/// Consumption database access layer.
pub struct ConsumptionStore {
    conn: Connection,
}

impl ConsumptionStore {
    /// Create or open a consumption database at the given path.
    ///
    /// # Errors
    /// Returns an error if the parent directory cannot be created, the database
    /// cannot be opened, or schema migrations fail.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut conn = Connection::open(path)?;

        run_migrations(&mut conn)?;

        Ok(Self { conn })
    }

    /// Open an in-memory consumption database (for testing).
    ///
    /// # Errors
    /// Returns an error if the in-memory database cannot be opened or
    /// migrations fail.
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;

        run_migrations(&mut conn)?;

        Ok(Self { conn })
    }

    /// Merge a batch of records into the store, replacing any rows that share
    /// an interval key. Returns the number of records written.
    ///
    /// An empty batch is a no-op: nothing is written and no transaction is
    /// opened.
    ///
    /// # Errors
    /// Returns an error if the transaction or any INSERT fails.
    pub fn merge(&mut self, records: &[ConsumptionRecord]) -> Result<usize> {
        if records.is_empty() {
            tracing::info!("no records to merge");
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR REPLACE INTO hourly_consumption ( \
                    from_time, to_time, consumption, consumption_unit, \
                    cost, unit_price, unit_price_vat, currency \
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;

            for record in records {
                stmt.execute(params![
                    record.from_time.to_rfc3339(),
                    record.to_time.to_rfc3339(),
                    record.consumption,
                    record.consumption_unit,
                    record.cost,
                    record.unit_price,
                    record.unit_price_vat,
                    record.currency,
                ])?;
            }
        }
        tx.commit()?;

        tracing::debug!(count = records.len(), "merged records");
        Ok(records.len())
    }

    /// Start of the latest stored interval, or `None` for an empty store.
    ///
    /// # Errors
    /// Returns an error if the query fails or a stored timestamp cannot be
    /// parsed.
    pub fn high_water_mark(&self) -> Result<Option<DateTime<Utc>>> {
        let raw: Option<String> = self.conn.query_row(
            "SELECT MAX(from_time) FROM hourly_consumption",
            [],
            |row| row.get(0),
        )?;

        raw.map(|value| parse_utc(&value)).transpose()
    }

    /// Recompute the daily and monthly aggregate tables from scratch.
    ///
    /// Both tables are cleared and rebuilt inside a single transaction, so
    /// readers never observe a partially refreshed state. Records without a
    /// consumption value are excluded from every aggregate column.
    ///
    /// # Errors
    /// Returns an error if the transaction or any statement fails.
    pub fn refresh_aggregates(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM daily_consumption", [])?;
        let daily_rows = tx.execute(
            "INSERT INTO daily_consumption ( \
                date, total_consumption, total_cost, avg_unit_price, currency \
            ) \
            SELECT \
                DATE(from_time), \
                SUM(consumption), \
                SUM(cost), \
                AVG(unit_price), \
                MAX(currency) \
            FROM hourly_consumption \
            WHERE consumption IS NOT NULL \
            GROUP BY DATE(from_time)",
            [],
        )?;

        tx.execute("DELETE FROM monthly_consumption", [])?;
        let monthly_rows = tx.execute(
            "INSERT INTO monthly_consumption ( \
                year, month, total_consumption, total_cost, avg_unit_price, currency \
            ) \
            SELECT \
                CAST(STRFTIME('%Y', from_time) AS INTEGER), \
                CAST(STRFTIME('%m', from_time) AS INTEGER), \
                SUM(consumption), \
                SUM(cost), \
                AVG(unit_price), \
                MAX(currency) \
            FROM hourly_consumption \
            WHERE consumption IS NOT NULL \
            GROUP BY STRFTIME('%Y', from_time), STRFTIME('%m', from_time)",
            [],
        )?;

        tx.commit()?;

        tracing::debug!(daily_rows, monthly_rows, "aggregates recomputed");
        Ok(())
    }

    /// Number of hourly records stored.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn record_count(&self) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM hourly_consumption",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Stored records with `from_time` inside `[from, to]`, ordered by time.
    ///
    /// # Errors
    /// Returns an error if the query fails or a stored row cannot be mapped.
    pub fn records_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ConsumptionRecord>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT from_time, to_time, consumption, consumption_unit, \
                    cost, unit_price, unit_price_vat, currency \
             FROM hourly_consumption \
             WHERE from_time >= ?1 AND from_time <= ?2 \
             ORDER BY from_time",
        )?;

        let rows = stmt.query_map(params![from.to_rfc3339(), to.to_rfc3339()], map_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// All daily aggregate rows, ordered by date.
    ///
    /// # Errors
    /// Returns an error if the query fails or a stored row cannot be mapped.
    pub fn daily_aggregates(&self) -> Result<Vec<DailyAggregate>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT date, total_consumption, total_cost, avg_unit_price, currency \
             FROM daily_consumption ORDER BY date",
        )?;

        let rows = stmt.query_map([], map_daily)?;

        let mut aggregates = Vec::new();
        for row in rows {
            aggregates.push(row?);
        }
        Ok(aggregates)
    }

    /// All monthly aggregate rows, ordered by year then month.
    ///
    /// # Errors
    /// Returns an error if the query fails or a stored row cannot be mapped.
    pub fn monthly_aggregates(&self) -> Result<Vec<MonthlyAggregate>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT year, month, total_consumption, total_cost, avg_unit_price, currency \
             FROM monthly_consumption ORDER BY year, month",
        )?;

        let rows = stmt.query_map([], map_monthly)?;

        let mut aggregates = Vec::new();
        for row in rows {
            aggregates.push(row?);
        }
        Ok(aggregates)
    }

    /// Summarize the store contents for display.
    ///
    /// # Errors
    /// Returns an error if any of the summary queries fail.
    pub fn stats(&self) -> Result<StoreStats> {
        let (record_count, earliest, latest, total_consumption, total_cost, unit, currency) =
            self.conn.query_row(
                "SELECT COUNT(*), MIN(from_time), MAX(from_time), \
                        SUM(consumption), SUM(cost), \
                        MAX(consumption_unit), MAX(currency) \
                 FROM hourly_consumption",
                [],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<f64>>(3)?,
                        row.get::<_, Option<f64>>(4)?,
                        row.get::<_, Option<String>>(5)?,
                        row.get::<_, Option<String>>(6)?,
                    ))
                },
            )?;

        let daily_rows = self.conn.query_row(
            "SELECT COUNT(*) FROM daily_consumption",
            [],
            |row| row.get(0),
        )?;
        let monthly_rows = self.conn.query_row(
            "SELECT COUNT(*) FROM monthly_consumption",
            [],
            |row| row.get(0),
        )?;

        Ok(StoreStats {
            record_count,
            earliest: earliest.map(|value| parse_utc(&value)).transpose()?,
            latest: latest.map(|value| parse_utc(&value)).transpose()?,
            total_consumption,
            total_cost,
            consumption_unit: unit,
            currency,
            daily_rows,
            monthly_rows,
        })
    }
}

fn map_record(row: &Row<'_>) -> rusqlite::Result<ConsumptionRecord> {
    Ok(ConsumptionRecord {
        from_time: stored_timestamp(&row.get::<_, String>(0)?)?,
        to_time: stored_timestamp(&row.get::<_, String>(1)?)?,
        consumption: row.get(2)?,
        consumption_unit: row.get(3)?,
        cost: row.get(4)?,
        unit_price: row.get(5)?,
        unit_price_vat: row.get(6)?,
        currency: row.get(7)?,
    })
}

fn map_daily(row: &Row<'_>) -> rusqlite::Result<DailyAggregate> {
    Ok(DailyAggregate {
        date: stored_date(&row.get::<_, String>(0)?)?,
        total_consumption: row.get(1)?,
        total_cost: row.get(2)?,
        avg_unit_price: row.get(3)?,
        currency: row.get(4)?,
    })
}

fn map_monthly(row: &Row<'_>) -> rusqlite::Result<MonthlyAggregate> {
    Ok(MonthlyAggregate {
        year: row.get(0)?,
        month: row.get(1)?,
        total_consumption: row.get(2)?,
        total_cost: row.get(3)?,
        avg_unit_price: row.get(4)?,
        currency: row.get(5)?,
    })
}

fn stored_timestamp(raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn stored_date(raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}
