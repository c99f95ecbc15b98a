//! Project-wide constants.

use std::path::PathBuf;

use anyhow::{Context, Result};

pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
pub const HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");
pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// DTI at or above this percentage is only conditionally approved.
pub const DTI_THRESHOLD: f64 = 43.0;

/// Query sent to the rate source when none is configured.
pub const DEFAULT_RATE_QUERY: &str = "current mortgage rates";

/// Environment variable consulted for the search API key.
pub const SEARCH_API_KEY_ENV: &str = "BRAVE_API_KEY";

/// Default settings database: `~/.prescreen/prescreen.db`.
pub fn default_db_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("cannot determine home directory")?;
    Ok(home.join(".prescreen").join("prescreen.db"))
}

/// Format a monetary amount with comma separators and two decimals
/// (e.g. `1234567.5` → `1,234,567.50`).
pub fn format_money(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (whole, cents) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
    let mut result = String::with_capacity(whole.len() + whole.len() / 3 + 4);
    if amount < 0.0 {
        result.push('-');
    }
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(c);
    }
    result.push('.');
    result.push_str(cents);
    result
}
