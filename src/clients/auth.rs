use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::Row;
use uuid::Uuid;

use crate::errors::{unique_violation, Error};
use crate::models::UserId;
use crate::types::DbConnection;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Identity collaborator contract. Account flows only ever see user ids
/// and profile fields; password handling stays behind this boundary.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn create_user(&self, conn: &mut DbConnection, new_user: NewUser) -> Result<UserRecord, Error>;
    /// `UserNotFound` for an unknown username, `WrongPassword` otherwise.
    async fn authenticate(&self, conn: &mut DbConnection, credentials: &Credentials) -> Result<UserRecord, Error>;
    async fn check_password(&self, conn: &mut DbConnection, user_id: UserId, password: &str) -> Result<bool, Error>;
    async fn get_user(&self, conn: &mut DbConnection, user_id: UserId) -> Result<Option<UserRecord>, Error>;
    async fn find_by_username(&self, conn: &mut DbConnection, username: &str) -> Result<Option<UserRecord>, Error>;
    async fn find_by_email(&self, conn: &mut DbConnection, email: &str) -> Result<Option<UserRecord>, Error>;
}

/// Reference implementation over the local users table, storing salted
/// SHA-256 digests.
#[derive(Clone, Debug, Default)]
pub struct DbAuthProvider;

fn digest(salt: &str, password: &str) -> String {
    use std::fmt::Write;

    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hasher
        .finalize()
        .iter()
        .fold(String::with_capacity(64), |mut out, b| {
            let _ = write!(out, "{:02x}", b);
            out
        })
}

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<UserRecord, sqlx::Error> {
    Ok(UserRecord {
        id: UserId(row.try_get("id")?),
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
    })
}

#[async_trait]
impl AuthProvider for DbAuthProvider {
    async fn create_user(&self, conn: &mut DbConnection, new_user: NewUser) -> Result<UserRecord, Error> {
        let salt = Uuid::new_v4().to_string();
        let row = sqlx::query(
            "INSERT INTO users (username, email, first_name, last_name, password_digest, salt) \
             VALUES (?, ?, ?, ?, ?, ?) \
             RETURNING id, username, email, first_name, last_name",
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(digest(&salt, &new_user.password))
        .bind(&salt)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| unique_violation(e, "username or email"))?;

        Ok(user_from_row(&row).map_err(Error::from)?)
    }

    async fn authenticate(&self, conn: &mut DbConnection, credentials: &Credentials) -> Result<UserRecord, Error> {
        let row = sqlx::query(
            "SELECT id, username, email, first_name, last_name, password_digest, salt \
             FROM users WHERE username = ?",
        )
        .bind(&credentials.username)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(Error::UserNotFound)?;

        let stored: String = row.try_get("password_digest").map_err(Error::from)?;
        let salt: String = row.try_get("salt").map_err(Error::from)?;
        if stored != digest(&salt, &credentials.password) {
            return Err(Error::WrongPassword);
        }

        Ok(user_from_row(&row).map_err(Error::from)?)
    }

    async fn check_password(&self, conn: &mut DbConnection, user_id: UserId, password: &str) -> Result<bool, Error> {
        let row = sqlx::query("SELECT password_digest, salt FROM users WHERE id = ?")
            .bind(user_id.0)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or(Error::UserNotFound)?;

        let stored: String = row.try_get("password_digest").map_err(Error::from)?;
        let salt: String = row.try_get("salt").map_err(Error::from)?;
        Ok(stored == digest(&salt, password))
    }

    async fn get_user(&self, conn: &mut DbConnection, user_id: UserId) -> Result<Option<UserRecord>, Error> {
        let row = sqlx::query(
            "SELECT id, username, email, first_name, last_name FROM users WHERE id = ?",
        )
        .bind(user_id.0)
        .fetch_optional(&mut *conn)
        .await?;

        row.as_ref().map(user_from_row).transpose().map_err(Error::from)
    }

    async fn find_by_username(&self, conn: &mut DbConnection, username: &str) -> Result<Option<UserRecord>, Error> {
        let row = sqlx::query(
            "SELECT id, username, email, first_name, last_name FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&mut *conn)
        .await?;

        row.as_ref().map(user_from_row).transpose().map_err(Error::from)
    }

    async fn find_by_email(&self, conn: &mut DbConnection, email: &str) -> Result<Option<UserRecord>, Error> {
        let row = sqlx::query(
            "SELECT id, username, email, first_name, last_name FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&mut *conn)
        .await?;

        row.as_ref().map(user_from_row).transpose().map_err(Error::from)
    }
}
