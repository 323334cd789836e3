//! # Core Types
//!
//! The shared vocabulary of the dashboard: persisted entities, the read models
//! returned by the data-access layer, and the money helpers that move amounts
//! between dollars (what people type and read) and integer cents (what is stored).
//!
//! This crate depends on no other workspace crate.

pub mod enums;
pub mod error;
pub mod money;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::InvoiceStatus;
pub use error::CoreError;
pub use money::{cents_to_dollars, dollars_to_cents, format_currency};
pub use structs::{
    CardData, Customer, CustomerField, CustomersTableRow, Invoice, InvoiceChanges, InvoiceForm,
    InvoicesTableRow, LatestInvoice, NewInvoice, Revenue, User,
};
