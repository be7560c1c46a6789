//! Merchant composition service.
//!
//! Assembles one denormalized merchant record from five tables. The
//! joins happen in application code: the ticket to ticket-details
//! relationship is fetched per ticket, and a failed detail fetch
//! degrades to a null detail rather than failing the whole lookup.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::repository::{
    DbContext, DieselError, MerchantContactRepository, MerchantPersonRepository,
    MerchantRepository, MerchantTicketRepository, TicketDetailsRepository,
};

/// Maximum number of merchant ids accepted by a batch lookup.
pub const MAX_BATCH_SIZE: usize = 100;

/// A merchant ticket with its detail text inlined.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketWithDetailsDto {
    pub ticket_id: i32,
    pub merchant_ticket_order_no: Option<i32>,
    pub merchant_ticket_type_id: Option<i32>,
    pub merchant_ticket_time: Option<DateTime<Utc>>,
    pub merchant_ticket_kind_id: Option<i32>,
    pub merchant_ticket_sub_type_id: Option<i32>,
    pub merchant_ticket_explanation: Option<String>,
    pub merchant_ticket_first_explanation: Option<String>,
    pub ticket_detail: Option<String>,
}

/// The composite merchant record.
///
/// Consuming clients rely on empty sub-collections being rendered as
/// null rather than `[]`, so `contact_ids` and `tickets` are None when
/// nothing was found.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantCompleteDto {
    pub merchant_id: i32,
    pub merchant_name: String,
    pub merchant_brand: Option<String>,
    pub merchant_status: Option<String>,
    pub merchant_city: Option<String>,
    pub merchant_district: Option<String>,
    pub merchant_address: Option<String>,
    pub merchant_tax_no: Option<String>,
    pub merchant_tax_office: Option<String>,
    pub merchant_sector: Option<String>,
    pub merchant_people: Option<i32>,
    pub merchant_hardware: Option<String>,
    pub merchant_fiscal_no: Option<String>,
    pub merchant_service: Option<String>,
    pub merchant_ticket: Option<String>,
    pub merchant_inserted_at: DateTime<Utc>,
    pub merchant_person_state: Option<i32>,
    pub merchant_person_name: Option<String>,
    pub merchant_person_phone: Option<String>,
    pub contact_ids: Option<Vec<i32>>,
    pub tickets: Option<Vec<TicketWithDetailsDto>>,
}

/// Rejections raised before any database query runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MerchantRequestError {
    #[error("phone number must contain at least 10 digits")]
    PhoneTooShort,

    #[error("merchant id list must not be empty")]
    EmptyIdList,

    #[error("at most {MAX_BATCH_SIZE} merchants can be queried at once")]
    IdListTooLarge,
}

/// Normalize a free-form phone string to the canonical local number.
///
/// Keeps digits only, requires at least 10 of them, then strips a "90"
/// country prefix (12 digits total) or a domestic leading zero (11
/// digits total).
pub fn normalize_phone(raw: &str) -> Result<String, MerchantRequestError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 10 {
        return Err(MerchantRequestError::PhoneTooShort);
    }

    let canonical = if digits.len() == 12 && digits.starts_with("90") {
        digits[2..].to_string()
    } else if digits.len() == 11 && digits.starts_with('0') {
        digits[1..].to_string()
    } else {
        digits
    };

    Ok(canonical)
}

/// Validate a batch id list before touching the store.
pub fn validate_batch_ids(ids: &[i32]) -> Result<(), MerchantRequestError> {
    if ids.is_empty() {
        return Err(MerchantRequestError::EmptyIdList);
    }
    if ids.len() > MAX_BATCH_SIZE {
        return Err(MerchantRequestError::IdListTooLarge);
    }
    Ok(())
}

/// Service assembling composite merchant records.
#[derive(Clone)]
pub struct MerchantService {
    merchants: MerchantRepository,
    persons: MerchantPersonRepository,
    contacts: MerchantContactRepository,
    tickets: MerchantTicketRepository,
    details: TicketDetailsRepository,
}

impl MerchantService {
    pub fn new(ctx: &DbContext) -> Self {
        Self {
            merchants: ctx.merchants(),
            persons: ctx.merchant_persons(),
            contacts: ctx.merchant_contacts(),
            tickets: ctx.merchant_tickets(),
            details: ctx.ticket_details(),
        }
    }

    /// Assemble the composite record for one merchant id.
    ///
    /// Returns None when the merchant row itself is absent; there are no
    /// partial objects.
    pub async fn merchant_complete(
        &self,
        merchant_id: i32,
    ) -> Result<Option<MerchantCompleteDto>, DieselError> {
        let merchant = match self.merchants.get(merchant_id).await? {
            Some(m) => m,
            None => return Ok(None),
        };

        let person = self.persons.get_by_merchant_id(merchant_id).await?;
        let contact_ids = self.contacts.get_ids_by_merchant_id(merchant_id).await?;
        let tickets = self.tickets.get_by_merchant_id(merchant_id).await?;

        let mut tickets_with_details = Vec::with_capacity(tickets.len());
        for ticket in tickets {
            let detail = match self.details.get_detail(ticket.ticket_id).await {
                Ok(detail) => detail,
                Err(e) => {
                    tracing::warn!(
                        "Detail fetch failed for ticket {}: {}",
                        ticket.ticket_id,
                        e
                    );
                    None
                }
            };
            tickets_with_details.push(TicketWithDetailsDto {
                ticket_id: ticket.ticket_id,
                merchant_ticket_order_no: ticket.order_no,
                merchant_ticket_type_id: ticket.type_id,
                merchant_ticket_time: ticket.ticket_time,
                merchant_ticket_kind_id: ticket.kind_id,
                merchant_ticket_sub_type_id: ticket.sub_type_id,
                merchant_ticket_explanation: ticket.explanation,
                merchant_ticket_first_explanation: ticket.first_explanation,
                ticket_detail: detail,
            });
        }

        Ok(Some(MerchantCompleteDto {
            merchant_id: merchant.merchant_id,
            merchant_name: merchant.name,
            merchant_brand: merchant.brand,
            merchant_status: merchant.status,
            merchant_city: merchant.city,
            merchant_district: merchant.district,
            merchant_address: merchant.address,
            merchant_tax_no: merchant.tax_no,
            merchant_tax_office: merchant.tax_office,
            merchant_sector: merchant.sector,
            merchant_people: merchant.employee_count,
            merchant_hardware: merchant.hardware,
            merchant_fiscal_no: merchant.fiscal_no,
            merchant_service: merchant.service,
            merchant_ticket: merchant.ticket_summary,
            merchant_inserted_at: merchant.inserted_at,
            merchant_person_state: person.as_ref().and_then(|p| p.state),
            merchant_person_name: person.as_ref().and_then(|p| p.name.clone()),
            merchant_person_phone: person.and_then(|p| p.phone),
            contact_ids: if contact_ids.is_empty() {
                None
            } else {
                Some(contact_ids)
            },
            tickets: if tickets_with_details.is_empty() {
                None
            } else {
                Some(tickets_with_details)
            },
        }))
    }

    /// Resolve a list of merchant ids, skipping ids with no merchant.
    ///
    /// Callers must have validated the list size already.
    pub async fn merchants_batch(
        &self,
        merchant_ids: &[i32],
    ) -> Result<Vec<MerchantCompleteDto>, DieselError> {
        let mut merchants = Vec::new();
        for &merchant_id in merchant_ids {
            if let Some(merchant) = self.merchant_complete(merchant_id).await? {
                merchants.push(merchant);
            }
        }
        Ok(merchants)
    }

    /// Look up a merchant through its person's canonical phone number.
    ///
    /// When several merchants share a phone the lowest merchant id wins;
    /// the repository orders its results accordingly.
    pub async fn merchant_by_phone(
        &self,
        canonical_phone: &str,
    ) -> Result<Option<MerchantCompleteDto>, DieselError> {
        let persons = self.persons.get_by_phone(canonical_phone).await?;
        let person = match persons.first() {
            Some(p) => p,
            None => return Ok(None),
        };

        self.merchant_complete(person.merchant_id).await
    }
}
