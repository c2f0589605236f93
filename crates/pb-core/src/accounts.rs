//! # Accounts
//!
//! Registration, credential checks and session identity resolution.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use crate::access::Identity;
use crate::error::{AppError, FieldError, Result};
use crate::models::{User, UserId};
use crate::traits::{AuthProvider, UserRepo};

pub const MAX_USERNAME_LEN: usize = 150;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const USERNAME_TAKEN: &str = "a user with that username already exists";
pub const BAD_CREDENTIALS: &str = "please enter a correct username and password";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationInput {
    pub username: String,
    pub password1: String,
    pub password2: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
    /// Where to go after a successful login
    pub next: Option<String>,
}

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepo>,
    auth: Arc<dyn AuthProvider>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepo>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { users, auth }
    }

    pub async fn register(&self, input: &RegistrationInput) -> Result<User> {
        self.create_account(input, false).await
    }

    /// Creates a staff account; used by the seed tool.
    pub async fn register_staff(&self, input: &RegistrationInput) -> Result<User> {
        self.create_account(input, true).await
    }

    async fn create_account(&self, input: &RegistrationInput, is_staff: bool) -> Result<User> {
        let mut errors = Vec::new();
        let username = input.username.trim();

        if username.is_empty() {
            errors.push(FieldError::new("username", "this field is required"));
        } else if username.chars().count() > MAX_USERNAME_LEN
            || !username
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '.' | '@' | '+' | '-' | '_'))
        {
            errors.push(FieldError::new(
                "username",
                "enter a valid username: letters, numbers and @/./+/-/_ only",
            ));
        } else if self.users.get_user_by_username(username).await?.is_some() {
            errors.push(FieldError::new("username", USERNAME_TAKEN));
        }

        if input.password1.chars().count() < MIN_PASSWORD_LEN {
            errors.push(FieldError::new(
                "password1",
                format!("this password is too short; it must contain at least {MIN_PASSWORD_LEN} characters"),
            ));
        }
        if input.password1 != input.password2 {
            errors.push(FieldError::new("password2", "the two password fields didn't match"));
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let user = User {
            id: UserId::random(),
            username: username.to_string(),
            password_hash: self.auth.hash_password(&input.password1)?,
            is_staff,
            joined_at: Utc::now(),
        };
        self.users
            .create_user(user.clone())
            .await
            .map_err(|e| AppError::from_write(e, USERNAME_TAKEN))?;
        tracing::info!(user_id = %user.id, username = %user.username, is_staff, "account registered");
        Ok(user)
    }

    /// Verifies credentials. Unknown users and wrong passwords look the same.
    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        let user = self.users.get_user_by_username(username.trim()).await?;
        match user {
            Some(user) if self.auth.verify_password(password, &user.password_hash) => {
                tracing::info!(user_id = %user.id, "login succeeded");
                Ok(user)
            }
            _ => {
                tracing::warn!(username, "login failed");
                Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()))
            }
        }
    }

    /// Maps a session's stored user id to an identity; stale ids become anonymous.
    pub async fn resolve(&self, session_user: Option<UserId>) -> Result<(Identity, Option<User>)> {
        let Some(id) = session_user else {
            return Ok((Identity::Anonymous, None));
        };
        match self.users.get_user(id).await? {
            Some(user) => Ok((Identity::User(user.id), Some(user))),
            None => {
                tracing::warn!(user_id = %id, "session refers to a missing user");
                Ok((Identity::Anonymous, None))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockAuthProvider, MockUserRepo};

    fn registration(username: &str, p1: &str, p2: &str) -> RegistrationInput {
        RegistrationInput {
            username: username.into(),
            password1: p1.into(),
            password2: p2.into(),
        }
    }

    #[tokio::test]
    async fn registers_with_hashed_password() {
        let mut users = MockUserRepo::new();
        users.expect_get_user_by_username().returning(|_| Ok(None));
        users.expect_create_user()
            .withf(|u| u.username == "Автор" && u.password_hash == "hashed" && !u.is_staff)
            .times(1)
            .returning(|_| Ok(()));
        let mut auth = MockAuthProvider::new();
        auth.expect_hash_password().returning(|_| Ok("hashed".to_string()));

        let svc = AccountService::new(Arc::new(users), Arc::new(auth));
        let user = svc.register(&registration("Автор", "password123", "password123")).await.unwrap();
        assert_eq!(user.username, "Автор");
    }

    #[tokio::test]
    async fn username_taken_by_a_concurrent_signup_is_a_field_error() {
        let mut users = MockUserRepo::new();
        users.expect_get_user_by_username().returning(|_| Ok(None));
        users.expect_create_user()
            .returning(|_| Err(crate::error::UniqueViolation { field: "username" }.into()));
        let mut auth = MockAuthProvider::new();
        auth.expect_hash_password().returning(|_| Ok("hashed".to_string()));
        let svc = AccountService::new(Arc::new(users), Arc::new(auth));

        let err = svc.register(&registration("reader", "password123", "password123")).await.unwrap_err();
        assert_eq!(err.field_errors(), &[FieldError::new("username", USERNAME_TAKEN)]);
    }

    #[tokio::test]
    async fn mismatched_and_short_passwords_are_reported() {
        let mut users = MockUserRepo::new();
        users.expect_get_user_by_username().returning(|_| Ok(None));
        users.expect_create_user().never();
        let svc = AccountService::new(Arc::new(users), Arc::new(MockAuthProvider::new()));

        let err = svc.register(&registration("reader", "short", "other")).await.unwrap_err();
        let fields: Vec<_> = err.field_errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["password1", "password2"]);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let mut users = MockUserRepo::new();
        users.expect_get_user_by_username().returning(|name| {
            Ok(Some(User {
                id: UserId::random(),
                username: name.to_string(),
                password_hash: "stored".into(),
                is_staff: false,
                joined_at: Utc::now(),
            }))
        });
        let mut auth = MockAuthProvider::new();
        auth.expect_verify_password().returning(|_, _| false);

        let svc = AccountService::new(Arc::new(users), Arc::new(auth));
        let err = svc.login("reader", "nope").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn stale_session_resolves_to_anonymous() {
        let mut users = MockUserRepo::new();
        users.expect_get_user().returning(|_| Ok(None));
        let svc = AccountService::new(Arc::new(users), Arc::new(MockAuthProvider::new()));

        let (identity, user) = svc.resolve(Some(UserId::random())).await.unwrap();
        assert_eq!(identity, Identity::Anonymous);
        assert!(user.is_none());
    }
}
