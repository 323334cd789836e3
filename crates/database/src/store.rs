//! The seams the action layer is written against.
//!
//! `DbRepository` is the production implementation. Anything else that implements
//! these traits (an in-memory store in tests, for instance) can drive the same
//! action handlers.

use crate::error::DbError;
use crate::repository::DbRepository;
use core_types::{InvoiceChanges, NewInvoice, User};
use std::future::Future;
use uuid::Uuid;

/// The invoice statements issued by the write actions.
pub trait InvoiceWriter: Send + Sync {
    /// Inserts an invoice and returns its id.
    fn insert_invoice(
        &self,
        invoice: &NewInvoice,
    ) -> impl Future<Output = Result<Uuid, DbError>> + Send;

    /// Updates an invoice by id, returning the affected row count.
    fn update_invoice(
        &self,
        id: Uuid,
        changes: &InvoiceChanges,
    ) -> impl Future<Output = Result<u64, DbError>> + Send;

    /// Deletes an invoice by id, returning the affected row count.
    fn delete_invoice(&self, id: Uuid) -> impl Future<Output = Result<u64, DbError>> + Send;
}

/// The user lookup behind credential sign-in.
pub trait UserLookup: Send + Sync {
    fn get_user(&self, email: &str) -> impl Future<Output = Result<Option<User>, DbError>> + Send;
}

impl InvoiceWriter for DbRepository {
    async fn insert_invoice(&self, invoice: &NewInvoice) -> Result<Uuid, DbError> {
        DbRepository::insert_invoice(self, invoice).await
    }

    async fn update_invoice(&self, id: Uuid, changes: &InvoiceChanges) -> Result<u64, DbError> {
        DbRepository::update_invoice(self, id, changes).await
    }

    async fn delete_invoice(&self, id: Uuid) -> Result<u64, DbError> {
        DbRepository::delete_invoice(self, id).await
    }
}

impl UserLookup for DbRepository {
    async fn get_user(&self, email: &str) -> Result<Option<User>, DbError> {
        DbRepository::get_user(self, email).await
    }
}
