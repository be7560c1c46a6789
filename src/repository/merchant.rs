//! Merchant-side repositories.
//!
//! These tables are maintained by an external CRM export; this system
//! only reads them, so the repositories are finders plus the inserts
//! the tests need to seed data.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{
    MerchantContactRecord, MerchantPersonRecord, MerchantRecord, MerchantTicketRecord,
    TicketDetailsRecord,
};
use super::pool::{AsyncSqlitePool, DieselError};
use super::{parse_datetime, parse_datetime_opt};
use crate::models::{Merchant, MerchantPerson, MerchantTicket};
use crate::schema::{merchant, merchant_contact, merchant_person, merchant_ticket, ticket_details};

impl From<MerchantRecord> for Merchant {
    fn from(record: MerchantRecord) -> Self {
        Merchant {
            merchant_id: record.merchant_id,
            name: record.name,
            brand: record.brand,
            status: record.status,
            city: record.city,
            district: record.district,
            address: record.address,
            tax_no: record.tax_no,
            tax_office: record.tax_office,
            sector: record.sector,
            employee_count: record.employee_count,
            hardware: record.hardware,
            fiscal_no: record.fiscal_no,
            service: record.service,
            ticket_summary: record.ticket_summary,
            inserted_at: parse_datetime(&record.inserted_at),
        }
    }
}

impl From<MerchantPersonRecord> for MerchantPerson {
    fn from(record: MerchantPersonRecord) -> Self {
        MerchantPerson {
            merchant_id: record.merchant_id,
            state: record.state,
            name: record.name,
            phone: record.phone,
        }
    }
}

impl From<MerchantTicketRecord> for MerchantTicket {
    fn from(record: MerchantTicketRecord) -> Self {
        MerchantTicket {
            ticket_id: record.ticket_id,
            merchant_id: record.merchant_id,
            order_no: record.order_no,
            type_id: record.type_id,
            kind_id: record.kind_id,
            sub_type_id: record.sub_type_id,
            ticket_time: parse_datetime_opt(record.ticket_time),
            explanation: record.explanation,
            first_explanation: record.first_explanation,
        }
    }
}

/// Repository for merchant records.
#[derive(Clone)]
pub struct MerchantRepository {
    pool: AsyncSqlitePool,
}

impl MerchantRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Get a merchant by id.
    pub async fn get(&self, merchant_id: i32) -> Result<Option<Merchant>, DieselError> {
        let mut conn = self.pool.get().await?;

        merchant::table
            .find(merchant_id)
            .first::<MerchantRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Merchant::from))
    }

    /// Insert a merchant row.
    pub async fn insert(&self, item: &Merchant) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(merchant::table)
            .values((
                merchant::merchant_id.eq(item.merchant_id),
                merchant::name.eq(&item.name),
                merchant::brand.eq(&item.brand),
                merchant::status.eq(&item.status),
                merchant::city.eq(&item.city),
                merchant::district.eq(&item.district),
                merchant::address.eq(&item.address),
                merchant::tax_no.eq(&item.tax_no),
                merchant::tax_office.eq(&item.tax_office),
                merchant::sector.eq(&item.sector),
                merchant::employee_count.eq(item.employee_count),
                merchant::hardware.eq(&item.hardware),
                merchant::fiscal_no.eq(&item.fiscal_no),
                merchant::service.eq(&item.service),
                merchant::ticket_summary.eq(&item.ticket_summary),
                merchant::inserted_at.eq(item.inserted_at.to_rfc3339()),
            ))
            .execute(&mut conn)
            .await?;

        Ok(())
    }
}

/// Repository for merchant person records.
#[derive(Clone)]
pub struct MerchantPersonRepository {
    pool: AsyncSqlitePool,
}

impl MerchantPersonRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Get the person record for a merchant, if any.
    pub async fn get_by_merchant_id(
        &self,
        merchant_id: i32,
    ) -> Result<Option<MerchantPerson>, DieselError> {
        let mut conn = self.pool.get().await?;

        merchant_person::table
            .find(merchant_id)
            .first::<MerchantPersonRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(MerchantPerson::from))
    }

    /// Find person records by canonical phone number, ordered by
    /// merchant id so callers taking the first row get a deterministic
    /// result when several merchants share a phone.
    pub async fn get_by_phone(&self, phone: &str) -> Result<Vec<MerchantPerson>, DieselError> {
        let mut conn = self.pool.get().await?;

        merchant_person::table
            .filter(merchant_person::phone.eq(phone))
            .order(merchant_person::merchant_id.asc())
            .load::<MerchantPersonRecord>(&mut conn)
            .await
            .map(|records| records.into_iter().map(MerchantPerson::from).collect())
    }

    /// Insert a person row.
    pub async fn insert(&self, item: &MerchantPerson) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(merchant_person::table)
            .values((
                merchant_person::merchant_id.eq(item.merchant_id),
                merchant_person::state.eq(item.state),
                merchant_person::name.eq(&item.name),
                merchant_person::phone.eq(&item.phone),
            ))
            .execute(&mut conn)
            .await?;

        Ok(())
    }
}

/// Repository for merchant contact records.
#[derive(Clone)]
pub struct MerchantContactRepository {
    pool: AsyncSqlitePool,
}

impl MerchantContactRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Get the contact ids attached to a merchant.
    pub async fn get_ids_by_merchant_id(&self, merchant_id: i32) -> Result<Vec<i32>, DieselError> {
        let mut conn = self.pool.get().await?;

        let records: Vec<MerchantContactRecord> = merchant_contact::table
            .filter(merchant_contact::merchant_id.eq(merchant_id))
            .order(merchant_contact::contact_id.asc())
            .load(&mut conn)
            .await?;

        Ok(records.into_iter().map(|r| r.contact_id).collect())
    }

    /// Insert a contact row.
    pub async fn insert(&self, contact_id: i32, merchant_id: i32) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(merchant_contact::table)
            .values((
                merchant_contact::contact_id.eq(contact_id),
                merchant_contact::merchant_id.eq(merchant_id),
            ))
            .execute(&mut conn)
            .await?;

        Ok(())
    }
}

/// Repository for merchant ticket records.
#[derive(Clone)]
pub struct MerchantTicketRepository {
    pool: AsyncSqlitePool,
}

impl MerchantTicketRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Get all tickets for a merchant.
    pub async fn get_by_merchant_id(
        &self,
        merchant_id: i32,
    ) -> Result<Vec<MerchantTicket>, DieselError> {
        let mut conn = self.pool.get().await?;

        merchant_ticket::table
            .filter(merchant_ticket::merchant_id.eq(merchant_id))
            .order(merchant_ticket::ticket_id.asc())
            .load::<MerchantTicketRecord>(&mut conn)
            .await
            .map(|records| records.into_iter().map(MerchantTicket::from).collect())
    }

    /// Insert a ticket row.
    pub async fn insert(&self, item: &MerchantTicket) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;

        let ticket_time = item.ticket_time.map(|dt| dt.to_rfc3339());

        diesel::insert_into(merchant_ticket::table)
            .values((
                merchant_ticket::ticket_id.eq(item.ticket_id),
                merchant_ticket::merchant_id.eq(item.merchant_id),
                merchant_ticket::order_no.eq(item.order_no),
                merchant_ticket::type_id.eq(item.type_id),
                merchant_ticket::kind_id.eq(item.kind_id),
                merchant_ticket::sub_type_id.eq(item.sub_type_id),
                merchant_ticket::ticket_time.eq(ticket_time),
                merchant_ticket::explanation.eq(&item.explanation),
                merchant_ticket::first_explanation.eq(&item.first_explanation),
            ))
            .execute(&mut conn)
            .await?;

        Ok(())
    }
}

/// Repository for ticket details records.
#[derive(Clone)]
pub struct TicketDetailsRepository {
    pool: AsyncSqlitePool,
}

impl TicketDetailsRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Get the detail text for a ticket, if any.
    pub async fn get_detail(&self, ticket_id: i32) -> Result<Option<String>, DieselError> {
        let mut conn = self.pool.get().await?;

        let record: Option<TicketDetailsRecord> = ticket_details::table
            .find(ticket_id)
            .first::<TicketDetailsRecord>(&mut conn)
            .await
            .optional()?;

        Ok(record.and_then(|r| r.detail))
    }

    /// Insert a details row.
    pub async fn insert(&self, ticket_id: i32, detail: Option<&str>) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(ticket_details::table)
            .values((
                ticket_details::ticket_id.eq(ticket_id),
                ticket_details::detail.eq(detail),
            ))
            .execute(&mut conn)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::setup_test_db;
    use chrono::Utc;

    fn sample_merchant(id: i32) -> Merchant {
        Merchant {
            merchant_id: id,
            name: format!("Merchant {}", id),
            brand: Some("NUR TİCARET".to_string()),
            status: Some("active".to_string()),
            city: Some("İstanbul".to_string()),
            district: None,
            address: None,
            tax_no: None,
            tax_office: None,
            sector: Some("Elektrik - Elektronik".to_string()),
            employee_count: Some(4),
            hardware: None,
            fiscal_no: None,
            service: None,
            ticket_summary: None,
            inserted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_merchant_get() {
        let (ctx, _dir) = setup_test_db().await;
        let repo = ctx.merchants();

        repo.insert(&sample_merchant(301)).await.unwrap();

        let fetched = repo.get(301).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Merchant 301");
        assert_eq!(fetched.brand.as_deref(), Some("NUR TİCARET"));

        assert!(repo.get(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_person_phone_lookup_orders_by_merchant_id() {
        let (ctx, _dir) = setup_test_db().await;
        ctx.merchants().insert(&sample_merchant(20)).await.unwrap();
        ctx.merchants().insert(&sample_merchant(10)).await.unwrap();

        let repo = ctx.merchant_persons();
        for id in [20, 10] {
            repo.insert(&MerchantPerson {
                merchant_id: id,
                state: Some(1),
                name: Some("shared".to_string()),
                phone: Some("5318671534".to_string()),
            })
            .await
            .unwrap();
        }

        let found = repo.get_by_phone("5318671534").await.unwrap();
        assert_eq!(found.len(), 2);
        // Deterministic tie-break: lowest merchant id first
        assert_eq!(found[0].merchant_id, 10);
    }

    #[tokio::test]
    async fn test_contacts_tickets_details() {
        let (ctx, _dir) = setup_test_db().await;
        ctx.merchants().insert(&sample_merchant(1)).await.unwrap();

        ctx.merchant_contacts().insert(101, 1).await.unwrap();
        ctx.merchant_contacts().insert(100, 1).await.unwrap();
        assert_eq!(
            ctx.merchant_contacts()
                .get_ids_by_merchant_id(1)
                .await
                .unwrap(),
            vec![100, 101]
        );

        let ticket = MerchantTicket {
            ticket_id: 555,
            merchant_id: 1,
            order_no: Some(7),
            type_id: Some(2),
            kind_id: None,
            sub_type_id: None,
            ticket_time: None,
            explanation: Some("POS terminal not booting".to_string()),
            first_explanation: None,
        };
        ctx.merchant_tickets().insert(&ticket).await.unwrap();
        ctx.ticket_details()
            .insert(555, Some("replaced power adapter"))
            .await
            .unwrap();

        let tickets = ctx.merchant_tickets().get_by_merchant_id(1).await.unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].ticket_id, 555);

        assert_eq!(
            ctx.ticket_details().get_detail(555).await.unwrap().as_deref(),
            Some("replaced power adapter")
        );
        assert_eq!(ctx.ticket_details().get_detail(556).await.unwrap(), None);
    }
}
