//! Credential sign-in against an in-memory user table.

use actions::{
    Argon2Hasher, AuthError, AuthOutcome, Authenticator, CredentialsInput, PasswordHasher,
};
use core_types::User;
use database::{DbError, UserLookup};
use uuid::Uuid;

const EMAIL: &str = "user@nextmail.com";
const PASSWORD: &str = "123456";

/// Stores passwords as `plain:<password>` so tests skip the Argon2 cost.
#[derive(Debug, Clone, Copy, Default)]
struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("plain:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        hash.strip_prefix("plain:")
            .map(|stored| stored == password)
            .ok_or_else(|| AuthError::Hasher("not a plain hash".to_string()))
    }
}

enum Users {
    Present(Vec<User>),
    Unreachable,
}

impl UserLookup for Users {
    async fn get_user(&self, email: &str) -> Result<Option<User>, DbError> {
        match self {
            Users::Present(users) => Ok(users.iter().find(|u| u.email == email).cloned()),
            Users::Unreachable => Err(DbError::Query("Failed to fetch user.")),
        }
    }
}

fn user_with_hash(password_hash: String) -> User {
    User {
        id: Uuid::new_v4(),
        name: "User".to_string(),
        email: EMAIL.to_string(),
        password: password_hash,
    }
}

fn input(email: &str, password: &str) -> CredentialsInput {
    CredentialsInput {
        email: Some(email.to_string()),
        password: Some(password.to_string()),
    }
}

fn authenticator(users: Users) -> Authenticator<Users, PlainHasher> {
    Authenticator::with_hasher(users, PlainHasher, true)
}

#[tokio::test]
async fn correct_credentials_sign_in() {
    let user = user_with_hash(PlainHasher.hash(PASSWORD).unwrap());
    let auth = authenticator(Users::Present(vec![user.clone()]));

    assert_eq!(auth.authenticate(&input(EMAIL, PASSWORD)).await, AuthOutcome::SignedIn(user));
}

#[tokio::test]
async fn unknown_email_and_wrong_password_are_indistinguishable() {
    let user = user_with_hash(PlainHasher.hash(PASSWORD).unwrap());
    let auth = authenticator(Users::Present(vec![user]));

    let unknown = auth.sign_in(&input("nobody@nextmail.com", PASSWORD)).await;
    let wrong = auth.sign_in(&input(EMAIL, "654321")).await;
    assert!(matches!(unknown, Err(AuthError::CredentialsSignin)));
    assert!(matches!(wrong, Err(AuthError::CredentialsSignin)));

    let unknown = auth.authenticate(&input("nobody@nextmail.com", PASSWORD)).await;
    let wrong = auth.authenticate(&input(EMAIL, "654321")).await;
    assert_eq!(unknown, AuthOutcome::Failed("Invalid credentials."));
    assert_eq!(unknown, wrong);
}

#[tokio::test]
async fn malformed_input_is_invalid_credentials() {
    let auth = authenticator(Users::Present(vec![]));

    for (email, password) in [("not-an-email", PASSWORD), (EMAIL, "12345"), ("", "")] {
        assert_eq!(
            auth.authenticate(&input(email, password)).await,
            AuthOutcome::Failed("Invalid credentials.")
        );
    }
    assert_eq!(
        auth.authenticate(&CredentialsInput::default()).await,
        AuthOutcome::Failed("Invalid credentials.")
    );
}

#[tokio::test]
async fn lookup_failures_are_something_went_wrong() {
    let auth = authenticator(Users::Unreachable);

    let result = auth.sign_in(&input(EMAIL, PASSWORD)).await;
    assert!(matches!(result, Err(AuthError::Callback(_))));
    assert_eq!(
        auth.authenticate(&input(EMAIL, PASSWORD)).await,
        AuthOutcome::Failed("Something went wrong.")
    );
}

#[tokio::test]
async fn unreadable_stored_hash_is_something_went_wrong() {
    let auth = authenticator(Users::Present(vec![user_with_hash("garbage".to_string())]));

    assert_eq!(
        auth.authenticate(&input(EMAIL, PASSWORD)).await,
        AuthOutcome::Failed("Something went wrong.")
    );
}

#[tokio::test]
async fn argon2_hashes_round_trip_through_sign_in() {
    let user = user_with_hash(Argon2Hasher.hash(PASSWORD).unwrap());
    let auth = Authenticator::new(Users::Present(vec![user.clone()]), false);

    assert_eq!(auth.authenticate(&input(EMAIL, PASSWORD)).await, AuthOutcome::SignedIn(user));
    assert_eq!(
        auth.authenticate(&input(EMAIL, "wrong-password")).await,
        AuthOutcome::Failed("Invalid credentials.")
    );
}
