//! Runtime settings for Callsight.
//!
//! Settings are resolved once at startup from environment variables
//! (optionally loaded from a .env file) and CLI overrides, then passed
//! by reference into commands and services. There is no global
//! configuration state.

use std::path::PathBuf;

use crate::repository::DbContext;

/// Default database filename inside the data directory.
pub const DEFAULT_DB_FILE: &str = "callsight.db";

/// Default base URL of the external vector-search service.
pub const DEFAULT_SEARCH_API_URL: &str = "http://localhost:8083";

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Path (or sqlite: URL) of the database file.
    pub database_url: String,
    /// Base URL of the external vector-search service.
    pub search_api_url: String,
}

impl Settings {
    /// Resolve settings from the environment, applying an optional
    /// database override from the CLI.
    ///
    /// Resolution order for the database: `--db` flag, `CALLSIGHT_DB`
    /// environment variable, `callsight.db` in the working directory.
    pub fn load(db_override: Option<&PathBuf>) -> Self {
        let database_url = db_override
            .map(|p| p.display().to_string())
            .or_else(|| std::env::var("CALLSIGHT_DB").ok())
            .unwrap_or_else(|| DEFAULT_DB_FILE.to_string());

        let search_api_url = std::env::var("SEARCH_API_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SEARCH_API_URL.to_string());

        Self {
            database_url,
            search_api_url,
        }
    }

    /// Create a database context for these settings.
    pub fn create_db_context(&self) -> DbContext {
        DbContext::from_url(&self.database_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_override_wins() {
        let settings = Settings::load(Some(&PathBuf::from("/tmp/override.db")));
        assert_eq!(settings.database_url, "/tmp/override.db");
    }

    #[test]
    fn test_defaults() {
        // No override and (in the test environment) no CALLSIGHT_DB set
        // falls back to the working-directory default.
        if std::env::var("CALLSIGHT_DB").is_err() {
            let settings = Settings::load(None);
            assert_eq!(settings.database_url, DEFAULT_DB_FILE);
        }
    }
}
