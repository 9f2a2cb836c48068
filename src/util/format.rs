//! Number formatting utilities for the stats readout.

/// Format an energy quantity with its unit.
#[must_use]
pub fn format_energy(value: f64, unit: &str) -> String {
    format!("{value:.3} {unit}")
}

/// Format a monetary amount with its currency code.
#[must_use]
pub fn format_money(value: f64, currency: &str) -> String {
    format!("{value:.2} {currency}")
}
