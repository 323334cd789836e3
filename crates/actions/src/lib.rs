//! # Actions
//!
//! The server-side handlers a form submission lands on.
//!
//! - `InvoiceActions`: create, update and delete invoices. Each validates its typed
//!   input, converts dollars to cents, issues one statement, and on success emits
//!   the cache invalidation signal for the invoices view.
//! - `Authenticator`: credential sign-in with a constant-time hash comparison.
//!
//! Validation failures and database failures come back as data (`FormState`), so a
//! caller can re-render the form with inline messages.

pub mod auth;
pub mod error;
pub mod invoices;
pub mod password;
pub mod validation;

pub use auth::{AuthOutcome, Authenticator};
pub use error::AuthError;
pub use invoices::{ActionOutcome, InvoiceActions};
pub use password::{Argon2Hasher, PasswordHasher};
pub use validation::{
    Credentials, CredentialsInput, FieldErrors, FormState, InvoiceFormInput, ValidatedInvoice,
    validate_credentials, validate_invoice,
};
