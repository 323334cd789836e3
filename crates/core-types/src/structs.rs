use crate::enums::InvoiceStatus;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row of the `users` table. `password` holds a salted hash, never plaintext.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// A row of the `customers` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image_url: String,
}

/// A row of the `invoices` table. `amount` is in cents.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub amount: i32,
    #[sqlx(try_from = "String")]
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

/// A row of the `revenue` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Revenue {
    pub month: String,
    pub revenue: i32,
}

/// The values written by an invoice INSERT. The id is assigned by the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub customer_id: Uuid,
    pub amount_cents: i32,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

/// The values written by an invoice UPDATE. The date is left untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceChanges {
    pub customer_id: Uuid,
    pub amount_cents: i32,
    pub status: InvoiceStatus,
}

// --- Read models ---

/// One of the most recent invoices shown on the overview page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestInvoice {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
    pub email: String,
    /// Already formatted, e.g. `"$1,234.56"`.
    pub amount: String,
}

/// A row of the searchable, paginated invoices table. `amount` is in cents.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct InvoicesTableRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub date: NaiveDate,
    pub amount: i32,
    #[sqlx(try_from = "String")]
    pub status: InvoiceStatus,
}

/// An invoice loaded into the edit form, with the amount back in dollars.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceForm {
    pub id: Uuid,
    pub customer_id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub status: InvoiceStatus,
}

/// A customer option for the invoice form's select box.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct CustomerField {
    pub id: Uuid,
    pub name: String,
}

/// A row of the customers table with per-customer invoice totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomersTableRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub total_invoices: i64,
    pub total_pending: String,
    pub total_paid: String,
}

/// The summary cards at the top of the overview page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardData {
    pub number_of_invoices: i64,
    pub number_of_customers: i64,
    pub total_paid_invoices: String,
    pub total_pending_invoices: String,
}
