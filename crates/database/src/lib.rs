//! # Database Crate
//!
//! The data-access layer of the dashboard. Every SQL statement the application
//! runs lives here, behind `DbRepository`.
//!
//! ## Architectural Principles
//!
//! - **Parameterized SQL only:** user input is always bound as a `$n` parameter,
//!   never interpolated into SQL text. The search pattern `%query%` is built in
//!   Rust and bound once.
//! - **One injected pool:** `connect` is called once at start-up and the resulting
//!   `PgPool` is handed to `DbRepository::new`. Each method checks a connection out
//!   and releases it on every exit path (the guard is dropped).
//! - **Opaque failures:** any driver error is logged with its cause and replaced by
//!   a fixed, statement-specific message (`DbError::Query`).
//!
//! ## Public API
//!
//! - `connect`, `connect_lazy`, `run_migrations`, `close`: pool lifecycle.
//! - `DbRepository`: every read query and write statement.
//! - `InvoiceWriter`, `UserLookup`: the traits the action layer is written against.
//! - `SeedData`: bulk loading of initial data in one transaction.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod pagination;
pub mod repository;
pub mod seed;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{close, connect, connect_lazy, run_migrations};
pub use error::DbError;
pub use pagination::{ITEMS_PER_PAGE, offset_for_page, search_pattern, total_pages};
pub use repository::DbRepository;
pub use seed::{SeedData, SeedInvoice, SeedReport, SeedUser};
pub use store::{InvoiceWriter, UserLookup};
