//! Persisted settings, backed by a SQLite key-value table.
//!
//! Command-line flags override stored values; the search API key also falls
//! back to the `BRAVE_API_KEY` environment variable.

use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use std::sync::Mutex;

use crate::consts::{DEFAULT_RATE_QUERY, DTI_THRESHOLD, SEARCH_API_KEY_ENV};

pub const KEY_SEARCH_API_KEY: &str = "search.api_key";
pub const KEY_RATE_QUERY: &str = "rate.query";
pub const KEY_DTI_THRESHOLD: &str = "dti.threshold";

/// Keys `config set` accepts.
pub const KNOWN_KEYS: &[&str] = &[KEY_SEARCH_API_KEY, KEY_RATE_QUERY, KEY_DTI_THRESHOLD];

/// Persistent key-value configuration store.
pub struct Config {
    conn: Mutex<Connection>,
}

impl Config {
    /// Open or create the config table in the given database.
    /// Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open config database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS config (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .context("failed to create config table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("config connection lock poisoned"))
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT value FROM config WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Set a known key (upsert). Values are checked before they are stored.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        if !KNOWN_KEYS.contains(&key) {
            bail!("unknown config key: {key} (known: {})", KNOWN_KEYS.join(", "));
        }
        if key == KEY_DTI_THRESHOLD {
            parse_threshold(value)?;
        }
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO config (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM config WHERE key = ?1", [key])?;
        Ok(())
    }
}

fn parse_threshold(value: &str) -> Result<f64> {
    let threshold: f64 = value
        .trim()
        .parse()
        .with_context(|| format!("dti.threshold must be a number, got {value:?}"))?;
    check_threshold(threshold)
}

/// A DTI threshold is a percentage; NaN and infinities fail the range check.
pub fn check_threshold(threshold: f64) -> Result<f64> {
    if !(0.0..=100.0).contains(&threshold) {
        bail!("dti.threshold must be between 0 and 100, got {threshold}");
    }
    Ok(threshold)
}

/// Effective settings for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub search_api_key: Option<String>,
    pub rate_query: String,
    pub threshold: f64,
}

/// Values given on the command line, which take priority over stored ones.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub rate_query: Option<String>,
    pub threshold: Option<f64>,
}

impl Settings {
    /// Resolve settings: overrides → stored config → environment → defaults.
    pub fn resolve(config: &Config, overrides: &Overrides) -> Result<Self> {
        let search_api_key = match config.get(KEY_SEARCH_API_KEY)? {
            Some(key) if !key.is_empty() => Some(key),
            _ => std::env::var(SEARCH_API_KEY_ENV).ok().filter(|k| !k.is_empty()),
        };

        let rate_query = match &overrides.rate_query {
            Some(q) => q.clone(),
            None => config
                .get(KEY_RATE_QUERY)?
                .unwrap_or_else(|| DEFAULT_RATE_QUERY.to_string()),
        };

        let threshold = match overrides.threshold {
            Some(t) => check_threshold(t)?,
            None => match config.get(KEY_DTI_THRESHOLD)? {
                Some(v) => parse_threshold(&v)?,
                None => DTI_THRESHOLD,
            },
        };

        Ok(Self {
            search_api_key,
            rate_query,
            threshold,
        })
    }
}
