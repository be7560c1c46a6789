//! Repository layer for database persistence.
//!
//! All database access uses Diesel ORM with compile-time query checking
//! over SQLite via diesel-async's SyncConnectionWrapper.

pub mod analysis;
pub mod analysis_view;
pub mod call;
pub mod context;
pub mod merchant;
pub mod models;
pub mod pool;
pub mod util;

pub use analysis::{BaseAnalysisRepository, IssueAnalysisRepository};
pub use analysis_view::{AnalysisFilter, AnalysisViewRepository};
pub use call::CallRepository;
pub use context::DbContext;
pub use merchant::{
    MerchantContactRepository, MerchantPersonRepository, MerchantRepository,
    MerchantTicketRepository, TicketDetailsRepository,
};
pub use pool::DieselError;

use chrono::{DateTime, Utc};

/// Parse a datetime string from the database, defaulting to Unix epoch on error.
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Parse an optional datetime string from the database.
pub fn parse_datetime_opt(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::DbContext;
    use tempfile::tempdir;

    /// Create a fresh on-disk SQLite database with the full schema.
    pub async fn setup_test_db() -> (DbContext, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let ctx = DbContext::from_url(&db_path.display().to_string());
        ctx.init_schema().await.unwrap();
        (ctx, dir)
    }
}
