use crate::entities::*;
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use sea_orm::*;

#[derive(Debug, PartialEq, Clone, Eq, Hash)]
pub struct User {
    id: i32,
    username: String,
    email: String,
}

impl User {
    pub fn new(id: i32, username: String, email: String) -> Self {
        Self {
            id,
            username,
            email,
        }
    }

    /// Returns the ID of the user.
    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl From<user::Model> for User {
    fn from(model: user::Model) -> Self {
        User::new(model.id, model.username, model.email)
    }
}

/// Error type for UserService operations.
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// A required registration field was blank or malformed.
    #[error("{0}")]
    Validation(String),
    #[error("Username '{0}' is already taken")]
    DuplicateUsername(String),
    #[error("Email '{0}' is already registered")]
    DuplicateEmail(String),
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

pub struct UserService<'a> {
    db: &'a sea_orm::DatabaseConnection,
}

impl UserService<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> UserService<'_> {
        UserService { db }
    }

    /// Registers a new user with a hashed password.
    ///
    /// # Arguments
    ///
    /// * `username` - Unique login name.
    /// * `email` - Unique email address.
    /// * `password` - Plain text password, stored only as an argon2 hash.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `User`, or an error if a field is blank
    /// or the username/email is already in use.
    #[tracing::instrument(skip(self, password))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, UserServiceError> {
        let username = username.trim();
        let email = email.trim();
        if username.is_empty() {
            return Err(UserServiceError::Validation("username is required".to_string()));
        }
        if email.is_empty() {
            return Err(UserServiceError::Validation("email is required".to_string()));
        }
        if !email.contains('@') {
            return Err(UserServiceError::Validation("email is invalid".to_string()));
        }
        if password.is_empty() {
            return Err(UserServiceError::Validation("password is required".to_string()));
        }

        if self.find_by_username(username).await?.is_some() {
            return Err(UserServiceError::DuplicateUsername(username.to_string()));
        }
        let email_taken = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db)
            .await?
            .is_some();
        if email_taken {
            return Err(UserServiceError::DuplicateEmail(email.to_string()));
        }

        let created_model = self
            .insert_user(username, email, &hash_password(password)?)
            .await?;
        tracing::info!("Registered user {}", created_model.id);
        Ok(User::from(created_model))
    }

    /// Inserts the user row. A concurrent registration that got past the
    /// duplicate checks still surfaces as a duplicate, not a database error.
    async fn insert_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<user::Model, UserServiceError> {
        let active_model = user::ActiveModel {
            username: ActiveValue::Set(username.to_string()),
            email: ActiveValue::Set(email.to_string()),
            password_hash: ActiveValue::Set(password_hash.to_string()),
            created_at: ActiveValue::Set(chrono::Utc::now()),
            ..Default::default()
        };
        active_model
            .insert(self.db)
            .await
            .map_err(|e| duplicate_or_database(e, username, email))
    }

    /// Checks a username/password pair.
    ///
    /// Unknown usernames and wrong passwords both yield `InvalidCredentials`.
    #[tracing::instrument(skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, UserServiceError> {
        let model = self
            .find_by_username(username.trim())
            .await?
            .ok_or(UserServiceError::InvalidCredentials)?;

        if !verify_password(password, &model.password_hash) {
            return Err(UserServiceError::InvalidCredentials);
        }
        Ok(User::from(model))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<user::Model>, UserServiceError> {
        let model = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db)
            .await?;
        Ok(model)
    }
}

/// Unique index violations name the offending column in their message.
fn duplicate_or_database(err: DbErr, username: &str, email: &str) -> UserServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) if message.contains("email") => {
            UserServiceError::DuplicateEmail(email.to_string())
        }
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            UserServiceError::DuplicateUsername(username.to_string())
        }
        _ => UserServiceError::Database(err),
    }
}

fn hash_password(password: &str) -> Result<String, UserServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserServiceError::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::error!("Stored password hash is unreadable: {}", e);
            false
        }
    }
}
