//! # Events
//!
//! The cache invalidation signal. After a successful mutation, write actions
//! publish a [`ViewEvent`] naming the view path whose rendered output is now
//! stale. Consumers (the HTTP layer's view cache) subscribe and drop whatever
//! they computed for that path.
//!
//! This is the only cross-layer contract beyond function return values.

pub mod error;
pub mod views;

pub use error::EventsError;
pub use views::{INVOICES_VIEW, ViewEvent, ViewEvents};
