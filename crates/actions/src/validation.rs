//! Typed parsing of untyped form input.
//!
//! Each form is decoded once into an input struct whose fields are all optional
//! strings, then parsed into a typed value or a [`FieldErrors`] map. Every field
//! is checked, so a form with several problems reports all of them at once.

use core_types::{dollars_to_cents, InvoiceStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;
use validator::ValidateEmail;

pub const CUSTOMER_REQUIRED: &str = "Please select a customer.";
pub const AMOUNT_NOT_POSITIVE: &str = "Please enter an amount greater than $0.";
pub const AMOUNT_TOO_LARGE: &str = "Please enter a smaller amount.";
pub const STATUS_REQUIRED: &str = "Please select an invoice status.";
pub const EMAIL_INVALID: &str = "Please enter a valid email address.";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters.";

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Field name to the messages explaining why that field was rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<&'static str>>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: &'static str) {
        self.0.entry(field).or_default().push(message);
    }

    pub fn get(&self, field: &str) -> Option<&[&'static str]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }
}

/// What a form re-renders with after a rejected submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormState {
    #[serde(skip_serializing_if = "FieldErrors::is_empty")]
    pub errors: FieldErrors,
    pub message: Option<String>,
}

impl FormState {
    pub fn invalid(errors: FieldErrors, message: &str) -> Self {
        Self {
            errors,
            message: Some(message.to_string()),
        }
    }

    pub fn message(message: &str) -> Self {
        Self {
            errors: FieldErrors::default(),
            message: Some(message.to_string()),
        }
    }
}

/// The invoice form body, shared by create and update.
///
/// `id` and `date` are never read from the body: the id comes from the route and
/// the date is stamped by the server.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceFormInput {
    pub customer_id: Option<String>,
    pub amount: Option<String>,
    pub status: Option<String>,
}

/// A validated invoice form. `amount` is in dollars and strictly positive.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInvoice {
    pub customer_id: Uuid,
    pub amount: Decimal,
    pub status: InvoiceStatus,
}

/// The sign-in form body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Validated sign-in credentials.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub fn validate_invoice(input: &InvoiceFormInput) -> Result<ValidatedInvoice, FieldErrors> {
    let mut errors = FieldErrors::default();

    let customer_id = parse_customer_id(input.customer_id.as_deref());
    if customer_id.is_none() {
        errors.add("customerId", CUSTOMER_REQUIRED);
    }

    let amount = match parse_amount(input.amount.as_deref()) {
        Ok(amount) => Some(amount),
        Err(message) => {
            errors.add("amount", message);
            None
        }
    };

    let status = input
        .status
        .as_deref()
        .and_then(|s| InvoiceStatus::from_str(s).ok());
    if status.is_none() {
        errors.add("status", STATUS_REQUIRED);
    }

    match (customer_id, amount, status) {
        (Some(customer_id), Some(amount), Some(status)) => Ok(ValidatedInvoice {
            customer_id,
            amount,
            status,
        }),
        _ => Err(errors),
    }
}

pub fn validate_credentials(input: &CredentialsInput) -> Result<Credentials, FieldErrors> {
    let mut errors = FieldErrors::default();

    let email = input.email.as_deref().unwrap_or_default();
    if !email.validate_email() {
        errors.add("email", EMAIL_INVALID);
    }

    let password = input.password.as_deref().unwrap_or_default();
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add("password", PASSWORD_TOO_SHORT);
    }

    if errors.is_empty() {
        Ok(Credentials {
            email: email.to_string(),
            password: password.to_string(),
        })
    } else {
        Err(errors)
    }
}

fn parse_customer_id(raw: Option<&str>) -> Option<Uuid> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| Uuid::parse_str(s).ok())
}

// Blank input coerces to zero, which then fails the positivity check.
fn parse_amount(raw: Option<&str>) -> Result<Decimal, &'static str> {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    let amount = if trimmed.is_empty() {
        Decimal::ZERO
    } else if trimmed.contains('_') {
        // Digit separators are not numeric text.
        return Err(AMOUNT_NOT_POSITIVE);
    } else {
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| AMOUNT_NOT_POSITIVE)?
    };

    if amount <= Decimal::ZERO {
        return Err(AMOUNT_NOT_POSITIVE);
    }
    dollars_to_cents(amount).map_err(|_| AMOUNT_TOO_LARGE)?;
    Ok(amount)
}
