use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::password;
use crate::auth::repo::UserStore;
use crate::auth::repo_types::{NewUser, User};
use crate::clock::Clock;
use crate::error::{AppError, AppResult, FieldErrors};
use crate::validator::{self, BLANK, INVALID_EMAIL};

pub const MIN_PASSWORD_CHARS: usize = 8;

/// Credential store: registration, password verification and user lookups.
#[derive(Clone)]
pub struct Credentials {
    store: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
}

impl Credentials {
    pub fn new(store: Arc<dyn UserStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn validate_signup(name: &str, email: &str, password: &str) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check(validator::not_blank(name), "name", BLANK);
        errors.check(validator::not_blank(email), "email", BLANK);
        errors.check(validator::is_valid_email(email), "email", INVALID_EMAIL);
        errors.check(validator::not_blank(password), "password", BLANK);
        errors.check(
            validator::min_chars(password, MIN_PASSWORD_CHARS),
            "password",
            "This field must be at least 8 characters long",
        );
        errors
    }

    pub fn validate_login(email: &str, password: &str) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check(validator::not_blank(email), "email", BLANK);
        errors.check(validator::is_valid_email(email), "email", INVALID_EMAIL);
        errors.check(validator::not_blank(password), "password", BLANK);
        errors
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> AppResult<i64> {
        Self::validate_signup(name, email, password).into_result()?;

        let hashed_password = password::hash_password(password).map_err(AppError::Internal)?;
        let id = self
            .store
            .insert(NewUser {
                name: name.to_owned(),
                email: email.to_owned(),
                hashed_password,
                created: self.clock.now(),
            })
            .await
            .inspect_err(|e| {
                if matches!(e, AppError::DuplicateEmail) {
                    warn!(email, "email already registered");
                }
            })?;

        info!(user_id = id, email, "user registered");
        Ok(id)
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<i64> {
        let Some(user) = self.store.find_by_email(email).await? else {
            password::verify_against_dummy(password);
            warn!("login failed");
            return Err(AppError::InvalidCredentials);
        };

        if !password::verify_password(password, &user.hashed_password).map_err(AppError::Internal)? {
            warn!("login failed");
            return Err(AppError::InvalidCredentials);
        }

        info!(user_id = user.id, "user authenticated");
        Ok(user.id)
    }

    pub async fn exists(&self, id: i64) -> AppResult<bool> {
        self.store.exists(id).await
    }

    pub async fn get(&self, id: i64) -> AppResult<User> {
        self.store.find(id).await?.ok_or(AppError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::memory::InMemoryUserStore;
    use crate::clock::ManualClock;

    fn credentials() -> Credentials {
        Credentials::new(
            Arc::new(InMemoryUserStore::new()),
            Arc::new(ManualClock::new()),
        )
    }

    fn field_errors(err: AppError) -> FieldErrors {
        match err {
            AppError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        let creds = credentials();
        let id = creds
            .register("Alice", "alice@example.com", "password123")
            .await
            .unwrap();

        assert_eq!(
            creds.authenticate("alice@example.com", "password123").await.unwrap(),
            id
        );
        assert!(matches!(
            creds.authenticate("alice@example.com", "wrong").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_fail_identically() {
        let creds = credentials();
        creds
            .register("Alice", "alice@example.com", "password123")
            .await
            .unwrap();

        let wrong_password = creds
            .authenticate("alice@example.com", "password124")
            .await
            .unwrap_err();
        let unknown_email = creds
            .authenticate("bob@example.com", "password123")
            .await
            .unwrap_err();
        assert!(matches!(wrong_password, AppError::InvalidCredentials));
        assert!(matches!(unknown_email, AppError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn duplicate_email_keeps_original_account() {
        let creds = credentials();
        let id = creds
            .register("Alice", "alice@example.com", "password123")
            .await
            .unwrap();

        let err = creds
            .register("Mallory", "alice@example.com", "hunter2hunter2")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));

        let user = creds.get(id).await.unwrap();
        assert_eq!(user.name, "Alice");
        assert_eq!(
            creds.authenticate("alice@example.com", "password123").await.unwrap(),
            id
        );
        assert!(creds
            .authenticate("alice@example.com", "hunter2hunter2")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn email_is_case_sensitive() {
        let creds = credentials();
        let a = creds
            .register("Alice", "alice@example.com", "password123")
            .await
            .unwrap();
        let b = creds
            .register("Alice", "Alice@example.com", "password123")
            .await
            .unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn signup_validation() {
        let creds = credentials();
        let errors = field_errors(creds.register("", "not-an-email", "short").await.unwrap_err());
        assert_eq!(errors.get("name"), Some(BLANK));
        assert_eq!(errors.get("email"), Some(INVALID_EMAIL));
        assert_eq!(
            errors.get("password"),
            Some("This field must be at least 8 characters long")
        );

        let errors = field_errors(creds.register("Bob", "", "").await.unwrap_err());
        assert_eq!(errors.get("email"), Some(BLANK));
        assert_eq!(errors.get("password"), Some(BLANK));
    }

    #[tokio::test]
    async fn stored_hash_is_not_plaintext() {
        let creds = credentials();
        let id = creds
            .register("Alice", "alice@example.com", "password123")
            .await
            .unwrap();
        let user = creds.get(id).await.unwrap();
        assert_ne!(user.hashed_password, "password123");
        assert!(password::verify_password("password123", &user.hashed_password).unwrap());
        assert!(!serde_json::to_string(&user).unwrap().contains("hashed_password"));
    }

    #[tokio::test]
    async fn exists_and_get() {
        let creds = credentials();
        let id = creds
            .register("Alice", "alice@example.com", "password123")
            .await
            .unwrap();
        assert!(creds.exists(id).await.unwrap());
        assert!(!creds.exists(id + 1).await.unwrap());
        assert!(matches!(creds.get(id + 1).await, Err(AppError::NotFound)));
    }
}
