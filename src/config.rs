//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `DB_MAX_CONNECTIONS` (optional): pool size, defaults to 5
/// - `SESSION_TTL_HOURS` (optional): bearer session lifetime, defaults to 12
/// - `OMR_EXCHANGE_RATE` (optional): OMR per USD, defaults to 0.385
/// - `BACKUP_DIR` (optional): where `backup` writes dumps, defaults to `backups`
/// - `PG_DUMP_BIN` (optional): pg_dump executable, defaults to `pg_dump`
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,

    #[serde(default = "default_omr_exchange_rate")]
    pub omr_exchange_rate: f64,

    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,

    #[serde(default = "default_pg_dump_bin")]
    pub pg_dump_bin: String,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    5
}

fn default_session_ttl_hours() -> i64 {
    12
}

fn default_omr_exchange_rate() -> f64 {
    0.385
}

fn default_backup_dir() -> String {
    "backups".to_string()
}

fn default_pg_dump_bin() -> String {
    "pg_dump".to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        envy::from_env::<Config>()
    }

    /// Exchange rate as integer millionths of an OMR per USD.
    ///
    /// The ledger never touches floats; the configured rate is converted once.
    pub fn omr_rate_micros(&self) -> i64 {
        (self.omr_exchange_rate * 1_000_000.0).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_apply_when_only_database_url_is_set() {
        let config: Config =
            envy::from_iter(vars(&[("DATABASE_URL", "postgres://localhost/cars")])).unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.session_ttl_hours, 12);
        assert_eq!(config.backup_dir, "backups");
        assert_eq!(config.pg_dump_bin, "pg_dump");
        assert_eq!(config.omr_rate_micros(), 385_000);
    }

    #[test]
    fn test_missing_database_url_is_an_error() {
        let result = envy::from_iter::<_, Config>(vars(&[("SERVER_PORT", "8080")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config: Config = envy::from_iter(vars(&[
            ("DATABASE_URL", "postgres://db/cars"),
            ("SERVER_PORT", "8080"),
            ("OMR_EXCHANGE_RATE", "0.3845"),
            ("BACKUP_DIR", "/var/backups/cars"),
        ]))
        .unwrap();

        assert_eq!(config.server_port, 8080);
        assert_eq!(config.omr_rate_micros(), 384_500);
        assert_eq!(config.backup_dir, "/var/backups/cars");
    }
}
