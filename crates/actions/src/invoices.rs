use crate::validation::{validate_invoice, FieldErrors, FormState, InvoiceFormInput, AMOUNT_TOO_LARGE};
use chrono::Utc;
use core_types::{dollars_to_cents, InvoiceChanges, NewInvoice};
use database::InvoiceWriter;
use events::{ViewEvents, INVOICES_VIEW};
use serde::Serialize;
use uuid::Uuid;

pub const CREATE_MISSING_FIELDS: &str = "Missing Fields. Failed to Create Invoice.";
pub const UPDATE_MISSING_FIELDS: &str = "Missing Fields. Failed to Update Invoice.";
pub const CREATE_FAILED: &str = "Database Error: Failed to Create Invoice.";
pub const UPDATE_FAILED: &str = "Database Error: Failed to Update Invoice.";
pub const DELETE_FAILED: &str = "Database Error: Failed to Delete Invoice.";

/// How a write action ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionOutcome {
    /// The write succeeded; navigate to `to`.
    Redirect { to: &'static str },
    /// The write succeeded and the caller stays where it is.
    Completed,
    /// The form was invalid or the write failed. Nothing was written.
    Rejected(FormState),
}

/// Create/update/delete orchestration: validate, convert, write, invalidate.
#[derive(Debug, Clone)]
pub struct InvoiceActions<S> {
    store: S,
    events: ViewEvents,
    verbose: bool,
}

impl<S: InvoiceWriter> InvoiceActions<S> {
    /// `verbose` logs database failures here as well; turn it off in production.
    pub fn new(store: S, events: ViewEvents, verbose: bool) -> Self {
        Self {
            store,
            events,
            verbose,
        }
    }

    pub async fn create_invoice(&self, input: &InvoiceFormInput) -> ActionOutcome {
        let valid = match validate_invoice(input) {
            Ok(valid) => valid,
            Err(errors) => return ActionOutcome::Rejected(FormState::invalid(errors, CREATE_MISSING_FIELDS)),
        };
        let Ok(amount_cents) = dollars_to_cents(valid.amount) else {
            return amount_too_large(CREATE_MISSING_FIELDS);
        };

        let invoice = NewInvoice {
            customer_id: valid.customer_id,
            amount_cents,
            status: valid.status,
            date: Utc::now().date_naive(),
        };

        match self.store.insert_invoice(&invoice).await {
            Ok(id) => {
                tracing::info!(%id, amount_cents, "Created invoice.");
                self.events.revalidate_path(INVOICES_VIEW);
                ActionOutcome::Redirect { to: INVOICES_VIEW }
            }
            Err(e) => {
                if self.verbose {
                    tracing::error!(error = %e, "Database Error: Failed to Create Invoice.");
                }
                ActionOutcome::Rejected(FormState::message(CREATE_FAILED))
            }
        }
    }

    /// Updates the invoice named by the route. The stored date is kept.
    pub async fn update_invoice(&self, id: Uuid, input: &InvoiceFormInput) -> ActionOutcome {
        let valid = match validate_invoice(input) {
            Ok(valid) => valid,
            Err(errors) => return ActionOutcome::Rejected(FormState::invalid(errors, UPDATE_MISSING_FIELDS)),
        };
        let Ok(amount_cents) = dollars_to_cents(valid.amount) else {
            return amount_too_large(UPDATE_MISSING_FIELDS);
        };

        let changes = InvoiceChanges {
            customer_id: valid.customer_id,
            amount_cents,
            status: valid.status,
        };

        match self.store.update_invoice(id, &changes).await {
            Ok(rows) => {
                if rows == 0 {
                    tracing::warn!(%id, "Update matched no invoice.");
                }
                self.events.revalidate_path(INVOICES_VIEW);
                ActionOutcome::Redirect { to: INVOICES_VIEW }
            }
            Err(e) => {
                if self.verbose {
                    tracing::error!(error = %e, "Database Error: Failed to Update Invoice.");
                }
                ActionOutcome::Rejected(FormState::message(UPDATE_FAILED))
            }
        }
    }

    /// Deletes an invoice. A missing id is not an error.
    pub async fn delete_invoice(&self, id: Uuid) -> ActionOutcome {
        match self.store.delete_invoice(id).await {
            Ok(rows) => {
                if rows == 0 {
                    tracing::warn!(%id, "Delete matched no invoice.");
                }
                self.events.revalidate_path(INVOICES_VIEW);
                ActionOutcome::Completed
            }
            Err(e) => {
                if self.verbose {
                    tracing::error!(error = %e, "Database Error: Failed to Delete Invoice.");
                }
                ActionOutcome::Rejected(FormState::message(DELETE_FAILED))
            }
        }
    }
}

fn amount_too_large(message: &str) -> ActionOutcome {
    let mut errors = FieldErrors::default();
    errors.add("amount", AMOUNT_TOO_LARGE);
    ActionOutcome::Rejected(FormState::invalid(errors, message))
}
