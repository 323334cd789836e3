use crate::error::AuthError;
use crate::password::{Argon2Hasher, PasswordHasher};
use crate::validation::{validate_credentials, Credentials, CredentialsInput};
use core_types::User;
use database::UserLookup;

// Verified when the email is unknown, so both failure paths cost one hash check.
const TIMING_DECOY_PASSWORD: &str = "timing-decoy-password";

/// Result of a sign-in attempt as the form sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    SignedIn(User),
    Failed(&'static str),
}

/// Credential sign-in against the `users` table.
pub struct Authenticator<S, H = Argon2Hasher> {
    store: S,
    hasher: H,
    decoy_hash: Option<String>,
    verbose: bool,
}

impl<S: UserLookup> Authenticator<S, Argon2Hasher> {
    pub fn new(store: S, verbose: bool) -> Self {
        Self::with_hasher(store, Argon2Hasher, verbose)
    }
}

impl<S, H> Authenticator<S, H>
where
    S: UserLookup,
    H: PasswordHasher + Clone + 'static,
{
    pub fn with_hasher(store: S, hasher: H, verbose: bool) -> Self {
        let decoy_hash = hasher.hash(TIMING_DECOY_PASSWORD).ok();
        Self {
            store,
            hasher,
            decoy_hash,
            verbose,
        }
    }

    /// Returns the user whose stored hash matches `credentials`, or `None`.
    ///
    /// Lookup failures and unreadable hashes are errors, not a `None`.
    pub async fn authorize(&self, credentials: &Credentials) -> Result<Option<User>, AuthError> {
        let user = self.store.get_user(&credentials.email).await?;

        let Some(user) = user else {
            if let Some(decoy) = &self.decoy_hash {
                let _ = self.verify(&credentials.password, decoy).await;
            }
            return Ok(None);
        };

        if self.verify(&credentials.password, &user.password).await? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Validates the form and authorizes it. Every way of presenting bad
    /// credentials ends in `AuthError::CredentialsSignin`.
    pub async fn sign_in(&self, input: &CredentialsInput) -> Result<User, AuthError> {
        let Ok(credentials) = validate_credentials(input) else {
            tracing::info!("Invalid credentials");
            return Err(AuthError::CredentialsSignin);
        };

        match self.authorize(&credentials).await? {
            Some(user) => Ok(user),
            None => {
                tracing::info!("Invalid credentials");
                Err(AuthError::CredentialsSignin)
            }
        }
    }

    /// The sign-in form action: a user on success, otherwise the message to show.
    pub async fn authenticate(&self, input: &CredentialsInput) -> AuthOutcome {
        if self.verbose {
            tracing::debug!(email = ?input.email, "Signing in with credentials");
        }
        match self.sign_in(input).await {
            Ok(user) => AuthOutcome::SignedIn(user),
            Err(e) => {
                if self.verbose {
                    tracing::error!(error = %e, "Failed to sign in");
                }
                AuthOutcome::Failed(e.user_message())
            }
        }
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Hasher(e.to_string()))?
    }
}
