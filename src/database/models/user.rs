use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::{debug, warn};
use validator::{Validate, ValidateEmail, ValidationErrors};

use super::reject;
use crate::auth::{hash_password, verify_password};
use crate::database::manager::DatabaseError;
use crate::database::partial_update::sql_for_partial_update;
use crate::database::query_builder::bind_all_as;
use crate::filter::SqlParam;

const COLUMNS: &str = "username, first_name, last_name, email, is_admin";

const JS_TO_SQL: &[(&str, &str)] = &[("firstName", "first_name"), ("lastName", "last_name")];

/// A user as returned by the API. The password hash is never selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

/// Body of `POST /users`; admins may create other admins
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewUser {
    #[validate(length(min = 1, max = 25))]
    pub username: String,
    #[validate(length(min = 1, max = 30))]
    pub first_name: String,
    #[validate(length(min = 1, max = 30))]
    pub last_name: String,
    #[validate(length(min = 5, max = 20))]
    pub password: String,
    #[validate(email, length(min = 6, max = 60))]
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Body of `POST /auth/register`; self-registered users are never admins
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterUser {
    #[validate(length(min = 1, max = 25))]
    pub username: String,
    #[validate(length(min = 1, max = 30))]
    pub first_name: String,
    #[validate(length(min = 1, max = 30))]
    pub last_name: String,
    #[validate(length(min = 5, max = 20))]
    pub password: String,
    #[validate(email, length(min = 6, max = 60))]
    pub email: String,
}

impl From<RegisterUser> for NewUser {
    fn from(data: RegisterUser) -> Self {
        NewUser {
            username: data.username,
            first_name: data.first_name,
            last_name: data.last_name,
            password: data.password,
            email: data.email,
            is_admin: false,
        }
    }
}

/// Body of `POST /auth/token`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    #[validate(length(min = 1, max = 25))]
    pub username: String,
    #[validate(length(min = 1, max = 20))]
    pub password: String,
}

/// Body of `PATCH /users/:username`. Neither the username nor the admin flag
/// can be changed this way.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

fn length_within(value: &str, min: usize, max: usize) -> bool {
    let len = value.chars().count();
    len >= min && len <= max
}

impl Validate for UserPatch {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if matches!(&self.first_name, Some(v) if !length_within(v, 1, 30)) {
            reject(&mut errors, "firstName", "length", "firstName must be 1-30 characters");
        }
        if matches!(&self.last_name, Some(v) if !length_within(v, 1, 30)) {
            reject(&mut errors, "lastName", "length", "lastName must be 1-30 characters");
        }
        if matches!(&self.password, Some(v) if !length_within(v, 5, 20)) {
            reject(&mut errors, "password", "length", "password must be 5-20 characters");
        }
        if let Some(email) = &self.email {
            if !email.validate_email() || !length_within(email, 6, 60) {
                reject(&mut errors, "email", "email", "email must be a valid address");
            }
        }
        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl UserPatch {
    /// Changed columns; a new password is hashed before it leaves this function
    fn into_changes(self, bcrypt_cost: u32) -> Result<Vec<(&'static str, SqlParam)>, DatabaseError> {
        let mut changes = Vec::new();
        if let Some(first_name) = self.first_name {
            changes.push(("firstName", SqlParam::from(first_name)));
        }
        if let Some(last_name) = self.last_name {
            changes.push(("lastName", SqlParam::from(last_name)));
        }
        if let Some(password) = self.password {
            changes.push(("password", SqlParam::from(hash_password(&password, bcrypt_cost)?)));
        }
        if let Some(email) = self.email {
            changes.push(("email", SqlParam::from(email)));
        }
        Ok(changes)
    }
}

#[derive(FromRow)]
struct UserWithPassword {
    #[sqlx(flatten)]
    user: User,
    password: String,
}

impl User {
    /// Check a username/password pair. Unknown users and wrong passwords
    /// produce the same error.
    pub async fn authenticate(pool: &PgPool, username: &str, password: &str) -> Result<User, DatabaseError> {
        let sql = format!("SELECT {}, password FROM users WHERE username = $1", COLUMNS);
        let row = sqlx::query_as::<_, UserWithPassword>(&sql)
            .bind(username)
            .fetch_optional(pool)
            .await?;

        if let Some(row) = row {
            if verify_password(password, &row.password)? {
                return Ok(row.user);
            }
        }

        warn!("Failed login for user: {}", username);
        Err(DatabaseError::Unauthorized("Invalid username/password".to_string()))
    }

    /// Insert a user with a hashed password; a duplicate username is a bad request
    pub async fn register(pool: &PgPool, data: NewUser, bcrypt_cost: u32) -> Result<User, DatabaseError> {
        let duplicate: Option<String> = sqlx::query_scalar("SELECT username FROM users WHERE username = $1")
            .bind(&data.username)
            .fetch_optional(pool)
            .await?;
        if duplicate.is_some() {
            return Err(DatabaseError::BadRequest(format!("Duplicate username: {}", data.username)));
        }

        let hashed = hash_password(&data.password, bcrypt_cost)?;
        let sql = format!(
            "INSERT INTO users (username, password, first_name, last_name, email, is_admin)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(data.username)
            .bind(hashed)
            .bind(data.first_name)
            .bind(data.last_name)
            .bind(data.email)
            .bind(data.is_admin)
            .fetch_one(pool)
            .await
            .map_err(DatabaseError::from_write)?;

        debug!("Registered user {} (admin: {})", user.username, user.is_admin);
        Ok(user)
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users ORDER BY username", COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(pool).await?)
    }

    pub async fn get(pool: &PgPool, username: &str) -> Result<User, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("No user: {}", username)))
    }

    pub async fn update(
        pool: &PgPool,
        username: &str,
        patch: UserPatch,
        bcrypt_cost: u32,
    ) -> Result<User, DatabaseError> {
        let update = sql_for_partial_update(patch.into_changes(bcrypt_cost)?, JS_TO_SQL)?;
        let sql = format!(
            "UPDATE users SET {} WHERE username = {} RETURNING {}",
            update.set_cols,
            update.next_placeholder(),
            COLUMNS
        );

        let user = bind_all_as(sqlx::query_as::<_, User>(&sql), &update.values)
            .bind(username)
            .fetch_optional(pool)
            .await
            .map_err(DatabaseError::from_write)?
            .ok_or_else(|| DatabaseError::NotFound(format!("No user: {}", username)))?;

        debug!("Updated user {}", username);
        Ok(user)
    }

    pub async fn remove(pool: &PgPool, username: &str) -> Result<(), DatabaseError> {
        let deleted: Option<String> =
            sqlx::query_scalar("DELETE FROM users WHERE username = $1 RETURNING username")
                .bind(username)
                .fetch_optional(pool)
                .await?;
        match deleted {
            Some(_) => {
                debug!("Removed user {}", username);
                Ok(())
            }
            None => Err(DatabaseError::NotFound(format!("No user: {}", username))),
        }
    }
}
