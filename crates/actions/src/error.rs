use database::DbError;
use thiserror::Error;

/// Why a sign-in attempt did not produce a user.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown email, wrong password, or malformed input. Deliberately one variant.
    #[error("Invalid credentials.")]
    CredentialsSignin,

    #[error("User lookup failed: {0}")]
    Callback(#[from] DbError),

    #[error("Password hashing failed: {0}")]
    Hasher(String),
}

impl AuthError {
    /// The message shown to the person signing in.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::CredentialsSignin => "Invalid credentials.",
            AuthError::Callback(_) | AuthError::Hasher(_) => "Something went wrong.",
        }
    }
}
