//! Centralized configuration for search-cli.
//!
//! All environment variables are loaded and validated at startup to fail fast
//! on misconfiguration rather than halfway through a command.

use std::env;
use std::fmt;
use std::path::PathBuf;

/// Default number of rows a search returns when `--limit` is not given.
const DEFAULT_LIMIT: usize = 50;

/// Log output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn from_str(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Configuration error.
#[derive(Debug)]
pub struct ConfigError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration error for {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// CLI configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database holding the `people` and `notes` tables
    pub db_path: PathBuf,
    /// Log format
    pub log_format: LogFormat,
    /// Row limit for searches without `--limit` (default: 50)
    pub search_limit: usize,
}

impl Config {
    /// Load and validate configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(get: F) -> Result<Self, ConfigError> {
        // DB path
        let db_path = get("DB_PATH")
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| ConfigError {
                field: "DB_PATH",
                message: "Required: path to the SQLite database".into(),
            })?;

        // Log format
        let log_format = LogFormat::from_str(&get("LOG_FORMAT").unwrap_or_else(|| "pretty".into()));

        // Search limit
        let search_limit = match get("SEARCH_LIMIT") {
            None => DEFAULT_LIMIT,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError {
                        field: "SEARCH_LIMIT",
                        message: format!("Expected a positive integer, got '{}'", raw),
                    })
                }
            },
        };

        Ok(Self {
            db_path,
            log_format,
            search_limit,
        })
    }

    /// Log a warning when the database file does not exist yet; SQLite would
    /// silently create an empty one.
    pub fn warn_if_missing_db(&self) {
        if !self.db_path.exists() {
            tracing::warn!(
                path = %self.db_path.display(),
                "DB_PATH does not exist: an empty database will be created and no tables will be found"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn log_format_parsing() {
        assert_eq!(LogFormat::from_str("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("json"), LogFormat::Json);
        assert_eq!(LogFormat::from_str("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from_str("anything"), LogFormat::Pretty);
    }

    #[test]
    fn db_path_is_required() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err.field, "DB_PATH");
        let err = Config::from_lookup(lookup(&[("DB_PATH", "")])).unwrap_err();
        assert_eq!(err.field, "DB_PATH");
    }

    #[test]
    fn defaults_and_overrides() {
        let cfg = Config::from_lookup(lookup(&[("DB_PATH", "./people.db")])).unwrap();
        assert_eq!(cfg.search_limit, 50);
        assert_eq!(cfg.log_format, LogFormat::Pretty);

        let cfg = Config::from_lookup(lookup(&[
            ("DB_PATH", "./people.db"),
            ("SEARCH_LIMIT", "5"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();
        assert_eq!(cfg.search_limit, 5);
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn bad_limit_fails_fast() {
        for bad in ["0", "-3", "many"] {
            let err = Config::from_lookup(lookup(&[("DB_PATH", "x.db"), ("SEARCH_LIMIT", bad)]))
                .unwrap_err();
            assert_eq!(err.field, "SEARCH_LIMIT");
        }
    }
}
