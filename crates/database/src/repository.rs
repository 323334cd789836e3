use crate::error::{query_failed, DbError};
use crate::pagination::{offset_for_page, search_pattern, total_pages, ITEMS_PER_PAGE};
use core_types::{
    cents_to_dollars, format_currency, CardData, CustomerField, CustomersTableRow,
    InvoiceChanges, InvoiceForm, InvoiceStatus, InvoicesTableRow, LatestInvoice, NewInvoice,
    Revenue, User,
};
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use uuid::Uuid;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

// Rows that need shaping before they leave this crate.

#[derive(FromRow)]
struct LatestInvoiceRaw {
    id: Uuid,
    name: String,
    image_url: String,
    email: String,
    amount: i32,
}

#[derive(FromRow)]
struct InvoiceFormRaw {
    id: Uuid,
    customer_id: Uuid,
    amount: i32,
    #[sqlx(try_from = "String")]
    status: InvoiceStatus,
}

#[derive(FromRow)]
struct CustomersTableRaw {
    id: Uuid,
    name: String,
    email: String,
    image_url: String,
    total_invoices: i64,
    total_pending: Option<i64>,
    total_paid: Option<i64>,
}

// The search predicate shared by the invoices table and its page count.
// `$1` is the single bound pattern, reused by all five conditions.
const INVOICE_SEARCH: &str = r#"
    FROM invoices
    JOIN customers ON invoices.customer_id = customers.id
    WHERE
        customers.name ILIKE $1 OR
        customers.email ILIKE $1 OR
        invoices.amount::text ILIKE $1 OR
        invoices.date::text ILIKE $1 OR
        invoices.status ILIKE $1
"#;

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Fetches the monthly revenue figures.
    pub async fn fetch_revenue(&self) -> Result<Vec<Revenue>, DbError> {
        const FAILED: &str = "Failed to fetch revenue data.";
        let mut conn = self.pool.acquire().await.map_err(query_failed(FAILED))?;

        let revenue = sqlx::query_as::<_, Revenue>("SELECT * FROM revenue")
            .fetch_all(&mut *conn)
            .await
            .map_err(query_failed(FAILED))?;

        Ok(revenue)
    }

    /// Fetches the five most recent invoices with their customers, amounts formatted.
    pub async fn fetch_latest_invoices(&self) -> Result<Vec<LatestInvoice>, DbError> {
        const FAILED: &str = "Failed to fetch the latest invoices.";
        let mut conn = self.pool.acquire().await.map_err(query_failed(FAILED))?;

        let rows = sqlx::query_as::<_, LatestInvoiceRaw>(
            r#"
            SELECT invoices.amount, customers.name, customers.image_url, customers.email, invoices.id
            FROM invoices
            JOIN customers ON invoices.customer_id = customers.id
            ORDER BY invoices.date DESC
            LIMIT 5
            "#,
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(query_failed(FAILED))?;

        let latest = rows
            .into_iter()
            .map(|row| LatestInvoice {
                id: row.id,
                name: row.name,
                image_url: row.image_url,
                email: row.email,
                amount: format_currency(row.amount.into()),
            })
            .collect();

        Ok(latest)
    }

    /// Fetches the overview cards. The three aggregates run concurrently, each on
    /// its own pooled connection.
    pub async fn fetch_card_data(&self) -> Result<CardData, DbError> {
        const FAILED: &str = "Failed to fetch card data.";

        let invoice_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM invoices")
            .fetch_one(&self.pool);
        let customer_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool);
        let invoice_status = sqlx::query_as::<_, (Option<i64>, Option<i64>)>(
            r#"
            SELECT
                SUM(CASE WHEN status = 'paid' THEN amount ELSE 0 END) AS paid,
                SUM(CASE WHEN status = 'pending' THEN amount ELSE 0 END) AS pending
            FROM invoices
            "#,
        )
        .fetch_one(&self.pool);

        let (number_of_invoices, number_of_customers, (paid, pending)) =
            tokio::try_join!(invoice_count, customer_count, invoice_status)
                .map_err(query_failed(FAILED))?;

        Ok(CardData {
            number_of_invoices,
            number_of_customers,
            total_paid_invoices: format_currency(paid.unwrap_or(0)),
            total_pending_invoices: format_currency(pending.unwrap_or(0)),
        })
    }

    /// Fetches one page of invoices matching `query`, newest first.
    ///
    /// The match is a case-insensitive substring test against the customer's name
    /// and email, and the invoice's amount, date and status rendered as text.
    pub async fn fetch_filtered_invoices(
        &self,
        query: &str,
        current_page: i64,
    ) -> Result<Vec<InvoicesTableRow>, DbError> {
        const FAILED: &str = "Failed to fetch invoices.";
        let mut conn = self.pool.acquire().await.map_err(query_failed(FAILED))?;

        let sql = format!(
            r#"
            SELECT
                invoices.id,
                invoices.customer_id,
                customers.name,
                customers.email,
                customers.image_url,
                invoices.date,
                invoices.amount,
                invoices.status
            {INVOICE_SEARCH}
            ORDER BY invoices.date DESC, invoices.id
            LIMIT $2 OFFSET $3
            "#
        );

        let invoices = sqlx::query_as::<_, InvoicesTableRow>(&sql)
            .bind(search_pattern(query))
            .bind(ITEMS_PER_PAGE)
            .bind(offset_for_page(current_page))
            .fetch_all(&mut *conn)
            .await
            .map_err(query_failed(FAILED))?;

        Ok(invoices)
    }

    /// Counts the pages `fetch_filtered_invoices` can return for `query`.
    pub async fn fetch_invoices_pages(&self, query: &str) -> Result<i64, DbError> {
        const FAILED: &str = "Failed to fetch total number of invoices.";
        let mut conn = self.pool.acquire().await.map_err(query_failed(FAILED))?;

        let sql = format!("SELECT COUNT(*) {INVOICE_SEARCH}");
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(search_pattern(query))
            .fetch_one(&mut *conn)
            .await
            .map_err(query_failed(FAILED))?;

        Ok(total_pages(count))
    }

    /// Fetches an invoice for the edit form, with the amount converted back to dollars.
    pub async fn fetch_invoice_by_id(&self, id: Uuid) -> Result<Option<InvoiceForm>, DbError> {
        const FAILED: &str = "Failed to fetch invoice.";
        let mut conn = self.pool.acquire().await.map_err(query_failed(FAILED))?;

        let row = sqlx::query_as::<_, InvoiceFormRaw>(
            r#"
            SELECT
                invoices.id,
                invoices.customer_id,
                invoices.amount,
                invoices.status
            FROM invoices
            WHERE invoices.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(query_failed(FAILED))?;

        Ok(row.map(|invoice| InvoiceForm {
            id: invoice.id,
            customer_id: invoice.customer_id,
            amount: cents_to_dollars(invoice.amount.into()),
            status: invoice.status,
        }))
    }

    /// Fetches every customer as a select option, ordered by name.
    pub async fn fetch_customers(&self) -> Result<Vec<CustomerField>, DbError> {
        const FAILED: &str = "Failed to fetch all customers.";
        let mut conn = self.pool.acquire().await.map_err(query_failed(FAILED))?;

        let customers = sqlx::query_as::<_, CustomerField>(
            "SELECT id, name FROM customers ORDER BY name ASC",
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(query_failed(FAILED))?;

        Ok(customers)
    }

    /// Fetches customers whose name or email matches `query`, with invoice totals.
    pub async fn fetch_filtered_customers(
        &self,
        query: &str,
    ) -> Result<Vec<CustomersTableRow>, DbError> {
        const FAILED: &str = "Failed to fetch customer table.";
        let mut conn = self.pool.acquire().await.map_err(query_failed(FAILED))?;

        let rows = sqlx::query_as::<_, CustomersTableRaw>(
            r#"
            SELECT
                customers.id,
                customers.name,
                customers.email,
                customers.image_url,
                COUNT(invoices.id) AS total_invoices,
                SUM(CASE WHEN invoices.status = 'pending' THEN invoices.amount ELSE 0 END) AS total_pending,
                SUM(CASE WHEN invoices.status = 'paid' THEN invoices.amount ELSE 0 END) AS total_paid
            FROM customers
            LEFT JOIN invoices ON customers.id = invoices.customer_id
            WHERE
                customers.name ILIKE $1 OR
                customers.email ILIKE $1
            GROUP BY customers.id, customers.name, customers.email, customers.image_url
            ORDER BY customers.name ASC
            "#,
        )
        .bind(search_pattern(query))
        .fetch_all(&mut *conn)
        .await
        .map_err(query_failed(FAILED))?;

        let customers = rows
            .into_iter()
            .map(|row| CustomersTableRow {
                id: row.id,
                name: row.name,
                email: row.email,
                image_url: row.image_url,
                total_invoices: row.total_invoices,
                total_pending: format_currency(row.total_pending.unwrap_or(0)),
                total_paid: format_currency(row.total_paid.unwrap_or(0)),
            })
            .collect();

        Ok(customers)
    }

    /// Looks a user up by exact email.
    pub async fn get_user(&self, email: &str) -> Result<Option<User>, DbError> {
        const FAILED: &str = "Failed to fetch user.";
        let mut conn = self.pool.acquire().await.map_err(query_failed(FAILED))?;

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut *conn)
            .await
            .map_err(query_failed(FAILED))?;

        tracing::debug!(found = user.is_some(), "Fetched user.");
        Ok(user)
    }

    /// Inserts an invoice and returns its database-assigned id.
    pub async fn insert_invoice(&self, invoice: &NewInvoice) -> Result<Uuid, DbError> {
        const FAILED: &str = "Failed to create invoice.";
        let mut conn = self.pool.acquire().await.map_err(query_failed(FAILED))?;

        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO invoices (customer_id, amount, status, date) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(invoice.customer_id)
        .bind(invoice.amount_cents)
        .bind(invoice.status.as_str())
        .bind(invoice.date)
        .fetch_one(&mut *conn)
        .await
        .map_err(query_failed(FAILED))?;

        Ok(id)
    }

    /// Updates an invoice in place. Returns the number of rows changed (0 or 1).
    pub async fn update_invoice(&self, id: Uuid, changes: &InvoiceChanges) -> Result<u64, DbError> {
        const FAILED: &str = "Failed to update invoice.";
        let mut conn = self.pool.acquire().await.map_err(query_failed(FAILED))?;

        let result = sqlx::query(
            "UPDATE invoices SET customer_id = $1, amount = $2, status = $3 WHERE id = $4",
        )
        .bind(changes.customer_id)
        .bind(changes.amount_cents)
        .bind(changes.status.as_str())
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(query_failed(FAILED))?;

        Ok(result.rows_affected())
    }

    /// Deletes an invoice. Returns the number of rows removed (0 or 1).
    pub async fn delete_invoice(&self, id: Uuid) -> Result<u64, DbError> {
        const FAILED: &str = "Failed to delete invoice.";
        let mut conn = self.pool.acquire().await.map_err(query_failed(FAILED))?;

        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(query_failed(FAILED))?;

        Ok(result.rows_affected())
    }
}
