//! User seed file
//!
//! Users are provisioned out of band. At startup an optional TOML file is
//! upserted into the user store:
//!
//! ```toml
//! [[users]]
//! username = "jane"
//! password = "hunter2"
//! role = "CUSTOMER"
//! account_num = 123456
//! ```
//!
//! Plaintext passwords are hashed with a fresh salt on every load.

use rand::RngCore;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::application::ports::{PasswordHasherPort, RepositoryError, UserRecord, UserRepositoryPort};
use crate::domain::identity::{Credentials, Role, User};
use crate::domain::ledger::AccountNum;

const SALT_BYTES: usize = 16;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse seed file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid seed user '{username}': {reason}")]
    InvalidUser { username: String, reason: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    users: Vec<SeedUser>,
}

#[derive(Debug, Deserialize)]
struct SeedUser {
    username: String,
    password: String,
    role: Role,
    account_num: Option<u32>,
}

impl SeedUser {
    fn into_record(self, hasher: &dyn PasswordHasherPort) -> Result<UserRecord, SeedError> {
        let invalid = |reason: String| SeedError::InvalidUser {
            username: self.username.clone(),
            reason,
        };

        let account_num = self
            .account_num
            .map(AccountNum::new)
            .transpose()
            .map_err(|e| invalid(e.to_string()))?;
        if self.role == Role::Customer && account_num.is_none() {
            return Err(invalid("customers need an account_num".to_string()));
        }
        let user = User::new(self.username.clone(), account_num, self.role)
            .map_err(|e| invalid(e.to_string()))?;

        let salt = generate_salt();
        Ok(UserRecord {
            user,
            credentials: Credentials {
                password_digest: hasher.hash(&self.password, &salt),
                salt,
            },
        })
    }
}

fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Upserts every user in `path`. Returns how many were written.
pub async fn load_seed_users(
    path: impl AsRef<Path>,
    repo: &dyn UserRepositoryPort,
    hasher: &dyn PasswordHasherPort,
) -> Result<usize, SeedError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let file: SeedFile = toml::from_str(&content)?;

    let records = file
        .users
        .into_iter()
        .map(|u| u.into_record(hasher))
        .collect::<Result<Vec<_>, _>>()?;

    for record in &records {
        repo.save(record).await?;
        tracing::debug!(user = %record.user, "Seed user provisioned");
    }

    tracing::info!(
        path = %path.as_ref().display(),
        count = records.len(),
        "Seed users loaded"
    );
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::Sha256PasswordHasher;
    use crate::infrastructure::persistence::sqlite::{test_pool, SqliteUserRepository};
    use std::io::Write;

    fn seed_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_seed_users_are_hashed_and_saved() {
        let file = seed_file(
            r#"
            [[users]]
            username = "jane"
            password = "hunter2"
            role = "CUSTOMER"
            account_num = 123456

            [[users]]
            username = "teller"
            password = "s3cret"
            role = "BANKER"
            "#,
        );
        let repo = SqliteUserRepository::new(test_pool().await);
        let hasher = Sha256PasswordHasher;

        let count = load_seed_users(file.path(), &repo, &hasher).await.unwrap();
        assert_eq!(count, 2);

        let jane = repo.find_by_username("jane").await.unwrap().unwrap();
        assert_ne!(jane.credentials.password_digest, "hunter2");
        assert!(hasher.verify(
            "hunter2",
            &jane.credentials.salt,
            &jane.credentials.password_digest
        ));

        let teller = repo.find_by_username("teller").await.unwrap().unwrap();
        assert!(teller.user.is_banker());
    }

    #[tokio::test]
    async fn test_customer_without_account_is_rejected() {
        let file = seed_file(
            r#"
            [[users]]
            username = "jane"
            password = "hunter2"
            role = "CUSTOMER"
            "#,
        );
        let repo = SqliteUserRepository::new(test_pool().await);

        let result = load_seed_users(file.path(), &repo, &Sha256PasswordHasher).await;
        assert!(matches!(result, Err(SeedError::InvalidUser { .. })));
        assert!(repo.find_by_username("jane").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_role_fails_to_parse() {
        let file = seed_file(
            r#"
            [[users]]
            username = "root"
            password = "x"
            role = "ADMIN"
            "#,
        );
        let repo = SqliteUserRepository::new(test_pool().await);

        let result = load_seed_users(file.path(), &repo, &Sha256PasswordHasher).await;
        assert!(matches!(result, Err(SeedError::Parse(_))));
    }
}
