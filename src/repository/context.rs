//! Database context for managing connections and repository access.
//!
//! Provides a unified entry point for database operations. Create one
//! context per command or service at startup, then use it to access
//! all repositories.

use diesel_async::SimpleAsyncConnection;

use super::analysis::{BaseAnalysisRepository, IssueAnalysisRepository};
use super::analysis_view::AnalysisViewRepository;
use super::call::CallRepository;
use super::merchant::{
    MerchantContactRepository, MerchantPersonRepository, MerchantRepository,
    MerchantTicketRepository, TicketDetailsRepository,
};
use super::pool::{AsyncSqlitePool, DieselError};

/// Database context that owns the connection pool and hands out
/// repositories.
///
/// # Example
/// ```ignore
/// let ctx = DbContext::from_url(&settings.database_url);
/// ctx.init_schema().await?;
/// let call = ctx.calls().get(call_id).await?;
/// ```
#[derive(Clone)]
pub struct DbContext {
    pool: AsyncSqlitePool,
}

impl DbContext {
    /// Create a new database context from a database path or sqlite: URL.
    pub fn from_url(database_url: &str) -> Self {
        Self {
            pool: AsyncSqlitePool::new(database_url),
        }
    }

    /// Get the underlying connection pool.
    #[allow(dead_code)]
    pub fn pool(&self) -> &AsyncSqlitePool {
        &self.pool
    }

    /// Get a call repository.
    pub fn calls(&self) -> CallRepository {
        CallRepository::new(self.pool.clone())
    }

    /// Get a base analysis repository.
    pub fn base_results(&self) -> BaseAnalysisRepository {
        BaseAnalysisRepository::new(self.pool.clone())
    }

    /// Get an issue analysis repository.
    pub fn issue_results(&self) -> IssueAnalysisRepository {
        IssueAnalysisRepository::new(self.pool.clone())
    }

    /// Get an aggregate view repository.
    pub fn analysis_view(&self) -> AnalysisViewRepository {
        AnalysisViewRepository::new(self.pool.clone())
    }

    /// Get a merchant repository.
    pub fn merchants(&self) -> MerchantRepository {
        MerchantRepository::new(self.pool.clone())
    }

    /// Get a merchant person repository.
    pub fn merchant_persons(&self) -> MerchantPersonRepository {
        MerchantPersonRepository::new(self.pool.clone())
    }

    /// Get a merchant contact repository.
    pub fn merchant_contacts(&self) -> MerchantContactRepository {
        MerchantContactRepository::new(self.pool.clone())
    }

    /// Get a merchant ticket repository.
    pub fn merchant_tickets(&self) -> MerchantTicketRepository {
        MerchantTicketRepository::new(self.pool.clone())
    }

    /// Get a ticket details repository.
    pub fn ticket_details(&self) -> TicketDetailsRepository {
        TicketDetailsRepository::new(self.pool.clone())
    }

    /// Initialize the database schema.
    ///
    /// Creates the tables and the aggregate join view if they don't
    /// exist. Safe to run repeatedly.
    pub async fn init_schema(&self) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;

        conn.batch_execute(
            r#"
            -- Calls extracted from conversation transcripts
            CREATE TABLE IF NOT EXISTS call (
                call_id TEXT PRIMARY KEY,
                agent_name TEXT NOT NULL,
                phone_number TEXT NOT NULL,
                duration REAL,
                agent_speech_rate REAL,
                customer_speech_rate REAL,
                silence_rate REAL,
                cross_talk_rate REAL,
                agent_interrupt_count INTEGER,
                created_at TEXT NOT NULL
            );

            -- Base analysis, one row per analyzed call
            CREATE TABLE IF NOT EXISTS base_analysis_result (
                call_id TEXT PRIMARY KEY,
                call_reason TEXT NOT NULL,
                call_reason_detail TEXT NOT NULL,
                follow_up_required INTEGER NOT NULL DEFAULT 0,
                organization_metadata TEXT,
                FOREIGN KEY (call_id) REFERENCES call(call_id)
            );

            -- Issue analysis, only for calls flagged as issues
            CREATE TABLE IF NOT EXISTS issue_analysis_result (
                call_id TEXT PRIMARY KEY,
                sub_category TEXT NOT NULL,
                sub_issue_type TEXT NOT NULL,
                churn_risk INTEGER NOT NULL,
                urgency_level TEXT NOT NULL,
                related_with_previous_call INTEGER NOT NULL DEFAULT 0,
                related_detail TEXT NOT NULL DEFAULT '',
                FOREIGN KEY (call_id) REFERENCES base_analysis_result(call_id)
            );

            -- Merchant tables, populated by an external CRM export
            CREATE TABLE IF NOT EXISTS merchant (
                merchant_id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                brand TEXT,
                status TEXT,
                city TEXT,
                district TEXT,
                address TEXT,
                tax_no TEXT,
                tax_office TEXT,
                sector TEXT,
                employee_count INTEGER,
                hardware TEXT,
                fiscal_no TEXT,
                service TEXT,
                ticket_summary TEXT,
                inserted_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS merchant_person (
                merchant_id INTEGER PRIMARY KEY,
                state INTEGER,
                name TEXT,
                phone TEXT,
                FOREIGN KEY (merchant_id) REFERENCES merchant(merchant_id)
            );

            CREATE TABLE IF NOT EXISTS merchant_contact (
                contact_id INTEGER PRIMARY KEY,
                merchant_id INTEGER NOT NULL,
                FOREIGN KEY (merchant_id) REFERENCES merchant(merchant_id)
            );

            CREATE TABLE IF NOT EXISTS merchant_ticket (
                ticket_id INTEGER PRIMARY KEY,
                merchant_id INTEGER NOT NULL,
                order_no INTEGER,
                type_id INTEGER,
                kind_id INTEGER,
                sub_type_id INTEGER,
                ticket_time TEXT,
                explanation TEXT,
                first_explanation TEXT,
                FOREIGN KEY (merchant_id) REFERENCES merchant(merchant_id)
            );

            CREATE TABLE IF NOT EXISTS ticket_details (
                ticket_id INTEGER PRIMARY KEY,
                detail TEXT,
                FOREIGN KEY (ticket_id) REFERENCES merchant_ticket(ticket_id)
            );

            CREATE INDEX IF NOT EXISTS idx_merchant_contact_merchant
                ON merchant_contact(merchant_id);
            CREATE INDEX IF NOT EXISTS idx_merchant_ticket_merchant
                ON merchant_ticket(merchant_id);
            CREATE INDEX IF NOT EXISTS idx_merchant_person_phone
                ON merchant_person(phone);

            -- Read-only aggregate view: call left-joined to its analysis rows.
            -- Recomputed by the database on read; never written directly.
            CREATE VIEW IF NOT EXISTS analysis_result_view AS
                SELECT
                    c.call_id,
                    c.agent_name,
                    c.phone_number,
                    c.duration,
                    c.agent_speech_rate,
                    c.customer_speech_rate,
                    c.silence_rate,
                    c.cross_talk_rate,
                    c.agent_interrupt_count,
                    c.created_at,
                    b.call_id AS base_call_id,
                    b.call_reason,
                    b.call_reason_detail,
                    b.follow_up_required,
                    b.organization_metadata,
                    i.call_id AS issue_call_id,
                    i.sub_category AS issue_sub_category,
                    i.sub_issue_type,
                    i.churn_risk,
                    i.urgency_level,
                    i.related_with_previous_call,
                    i.related_detail
                FROM call c
                LEFT JOIN base_analysis_result b ON b.call_id = c.call_id
                LEFT JOIN issue_analysis_result i ON i.call_id = c.call_id;
            "#,
        )
        .await?;

        Ok(())
    }
}
