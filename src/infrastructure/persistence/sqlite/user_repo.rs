//! SQLite User Repository

use async_trait::async_trait;
use sqlx::FromRow;
use std::str::FromStr;

use super::DbPool;
use crate::application::ports::{RepositoryError, UserRecord, UserRepositoryPort};
use crate::domain::identity::{Credentials, Role, User};
use crate::domain::ledger::AccountNum;

/// SQLite User Repository
pub struct SqliteUserRepository {
    pool: DbPool,
}

impl SqliteUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRow {
    username: String,
    account_num: Option<i64>,
    role: String,
    password: String,
    salt: String,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let account_num = row
            .account_num
            .map(|n| {
                u32::try_from(n)
                    .map_err(|e| e.to_string())
                    .and_then(|n| AccountNum::new(n).map_err(|e| e.to_string()))
            })
            .transpose()
            .map_err(RepositoryError::SerializationError)?;
        let role = Role::from_str(&row.role)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;
        let user = User::new(row.username, account_num, role)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

        Ok(UserRecord {
            user,
            credentials: Credentials {
                password_digest: row.password,
                salt: row.salt,
            },
        })
    }
}

#[async_trait]
impl UserRepositoryPort for SqliteUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT username, account_num, role, password, salt FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(UserRecord::try_from).transpose()
    }

    async fn save(&self, record: &UserRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO users (username, account_num, role, password, salt)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(username) DO UPDATE SET
                account_num = excluded.account_num,
                role = excluded.role,
                password = excluded.password,
                salt = excluded.salt
            "#,
        )
        .bind(record.user.username())
        .bind(record.user.account_num().map(|n| i64::from(n.value())))
        .bind(record.user.role().as_str())
        .bind(&record.credentials.password_digest)
        .bind(&record.credentials.salt)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
