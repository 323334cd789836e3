use crate::error::{query_failed, DbError};
use crate::repository::DbRepository;
use chrono::NaiveDate;
use core_types::{Customer, InvoiceStatus, Revenue};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

/// A user to seed. `password` must already be hashed.
#[derive(Debug, Clone)]
pub struct SeedUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// An invoice to seed. `amount` is in cents. The id is what makes a re-run skip it.
#[derive(Debug, Clone)]
pub struct SeedInvoice {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub amount: i32,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

/// Everything loaded by the `seed` command.
#[derive(Debug, Clone, Default)]
pub struct SeedData {
    pub users: Vec<SeedUser>,
    pub customers: Vec<Customer>,
    pub invoices: Vec<SeedInvoice>,
    pub revenue: Vec<Revenue>,
}

/// Rows actually inserted per table. Rows that already existed are skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: u64,
    pub customers: u64,
    pub invoices: u64,
    pub revenue: u64,
}

impl DbRepository {
    /// Inserts the seed data within a single transaction for atomicity.
    ///
    /// Existing rows are left untouched (`ON CONFLICT DO NOTHING`). Any failure rolls
    /// the whole load back.
    pub async fn seed(&self, data: &SeedData) -> Result<SeedReport, DbError> {
        const FAILED: &str = "Failed to seed the database.";
        let mut tx = self.pool().begin().await.map_err(query_failed(FAILED))?;

        match insert_all(&mut tx, data).await {
            Ok(report) => {
                tx.commit().await.map_err(query_failed(FAILED))?;
                tracing::info!(?report, "Database seeded successfully.");
                Ok(report)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(error = ?rollback, "Seed rollback failed.");
                }
                Err(query_failed(FAILED)(e))
            }
        }
    }
}

async fn insert_all(
    tx: &mut Transaction<'_, Postgres>,
    data: &SeedData,
) -> Result<SeedReport, sqlx::Error> {
    let mut report = SeedReport::default();

    for user in &data.users {
        report.users += sqlx::query(
            "INSERT INTO users (id, name, email, password) VALUES ($1, $2, $3, $4) ON CONFLICT DO NOTHING",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    }

    for customer in &data.customers {
        report.customers += sqlx::query(
            "INSERT INTO customers (id, name, email, image_url) VALUES ($1, $2, $3, $4) ON CONFLICT (id) DO NOTHING",
        )
        .bind(customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.image_url)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    }

    for invoice in &data.invoices {
        report.invoices += sqlx::query(
            "INSERT INTO invoices (id, customer_id, amount, status, date) VALUES ($1, $2, $3, $4, $5) ON CONFLICT (id) DO NOTHING",
        )
        .bind(invoice.id)
        .bind(invoice.customer_id)
        .bind(invoice.amount)
        .bind(invoice.status.as_str())
        .bind(invoice.date)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    }

    for rev in &data.revenue {
        report.revenue += sqlx::query(
            "INSERT INTO revenue (month, revenue) VALUES ($1, $2) ON CONFLICT (month) DO NOTHING",
        )
        .bind(&rev.month)
        .bind(rev.revenue)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    }

    Ok(report)
}
