//! Merchant-side models.
//!
//! These tables are populated by an external CRM export; this system
//! only reads them to assemble the composite merchant record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A merchant (business customer) record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Merchant {
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
    pub inserted_at: DateTime<Utc>,
}

/// Contact person attached to a merchant (at most one per merchant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantPerson {
    pub merchant_id: i32,
    /// CRM state code for the person record.
    pub state: Option<i32>,
    pub name: Option<String>,
    /// Canonical local phone number (no country code, no leading zero).
    pub phone: Option<String>,
}

/// A support ticket raised by a merchant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantTicket {
    pub ticket_id: i32,
    pub merchant_id: i32,
    pub order_no: Option<i32>,
    pub type_id: Option<i32>,
    pub kind_id: Option<i32>,
    pub sub_type_id: Option<i32>,
    pub ticket_time: Option<DateTime<Utc>>,
    pub explanation: Option<String>,
    pub first_explanation: Option<String>,
}
