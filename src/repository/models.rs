//! Diesel ORM records for database tables.
//!
//! These records provide compile-time type checking for database
//! operations; conversions to the domain models live next to the
//! repository that loads them.

use diesel::prelude::*;

use crate::schema;

/// Call record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::call)]
#[diesel(primary_key(call_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CallRecord {
    pub call_id: String,
    pub agent_name: String,
    pub phone_number: String,
    pub duration: Option<f64>,
    pub agent_speech_rate: Option<f64>,
    pub customer_speech_rate: Option<f64>,
    pub silence_rate: Option<f64>,
    pub cross_talk_rate: Option<f64>,
    pub agent_interrupt_count: Option<i32>,
    pub created_at: String,
}

/// Base analysis record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::base_analysis_result)]
#[diesel(primary_key(call_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BaseAnalysisRecord {
    pub call_id: String,
    pub call_reason: String,
    pub call_reason_detail: String,
    pub follow_up_required: bool,
    pub organization_metadata: Option<String>,
}

/// Issue analysis record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::issue_analysis_result)]
#[diesel(primary_key(call_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct IssueAnalysisRecord {
    pub call_id: String,
    pub sub_category: String,
    pub sub_issue_type: String,
    pub churn_risk: i32,
    pub urgency_level: String,
    pub related_with_previous_call: bool,
    pub related_detail: String,
}

/// Row loaded from the aggregate join view.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = schema::analysis_result_view)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AnalysisViewRecord {
    pub call_id: String,
    pub agent_name: String,
    pub phone_number: String,
    pub duration: Option<f64>,
    pub agent_speech_rate: Option<f64>,
    pub customer_speech_rate: Option<f64>,
    pub silence_rate: Option<f64>,
    pub cross_talk_rate: Option<f64>,
    pub agent_interrupt_count: Option<i32>,
    pub created_at: String,
    pub base_call_id: Option<String>,
    pub call_reason: Option<String>,
    pub call_reason_detail: Option<String>,
    pub follow_up_required: Option<bool>,
    pub organization_metadata: Option<String>,
    pub issue_call_id: Option<String>,
    pub issue_sub_category: Option<String>,
    pub sub_issue_type: Option<String>,
    pub churn_risk: Option<i32>,
    pub urgency_level: Option<String>,
    pub related_with_previous_call: Option<bool>,
    pub related_detail: Option<String>,
}

/// Merchant record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::merchant)]
#[diesel(primary_key(merchant_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MerchantRecord {
    pub merchant_id: i32,
    pub name: String,
    pub brand: Option<String>,
    pub status: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub address: Option<String>,
    pub tax_no: Option<String>,
    pub tax_office: Option<String>,
    pub sector: Option<String>,
    pub employee_count: Option<i32>,
    pub hardware: Option<String>,
    pub fiscal_no: Option<String>,
    pub service: Option<String>,
    pub ticket_summary: Option<String>,
    pub inserted_at: String,
}

/// Merchant person record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::merchant_person)]
#[diesel(primary_key(merchant_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MerchantPersonRecord {
    pub merchant_id: i32,
    pub state: Option<i32>,
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Merchant contact record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::merchant_contact)]
#[diesel(primary_key(contact_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MerchantContactRecord {
    pub contact_id: i32,
    pub merchant_id: i32,
}

/// Merchant ticket record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::merchant_ticket)]
#[diesel(primary_key(ticket_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MerchantTicketRecord {
    pub ticket_id: i32,
    pub merchant_id: i32,
    pub order_no: Option<i32>,
    pub type_id: Option<i32>,
    pub kind_id: Option<i32>,
    pub sub_type_id: Option<i32>,
    pub ticket_time: Option<String>,
    pub explanation: Option<String>,
    pub first_explanation: Option<String>,
}

/// Ticket details record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::ticket_details)]
#[diesel(primary_key(ticket_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TicketDetailsRecord {
    pub ticket_id: i32,
    pub detail: Option<String>,
}
