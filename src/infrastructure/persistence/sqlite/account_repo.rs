//! SQLite Account Repository

use async_trait::async_trait;
use sqlx::FromRow;
use std::str::FromStr;

use super::DbPool;
use crate::application::ports::{AccountRepositoryPort, RepositoryError};
use crate::domain::ledger::{Account, AccountNum, Balance, OwnerName};

/// SQLite Account Repository
pub struct SqliteAccountRepository {
    pool: DbPool,
}

impl SqliteAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct AccountRow {
    account_num: i64,
    owner: String,
    balance: String,
    notes: String,
}

impl TryFrom<AccountRow> for Account {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let num = u32::try_from(row.account_num)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;
        Ok(Account::restore(
            AccountNum::new(num).map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            OwnerName::new(row.owner)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            Balance::from_str(&row.balance)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            row.notes,
        ))
    }
}

#[async_trait]
impl AccountRepositoryPort for SqliteAccountRepository {
    async fn create(&self, account: &Account) -> Result<Account, RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (account_num, owner, balance, notes)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(i64::from(account.account_num().value()))
        .bind(account.owner_name().as_str())
        .bind(account.balance().to_string())
        .bind(account.notes())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Duplicate(account.account_num().to_string())
            }
            other => RepositoryError::DatabaseError(other.to_string()),
        })?;

        Ok(account.clone())
    }

    async fn find_by_num(&self, num: AccountNum) -> Result<Option<Account>, RepositoryError> {
        let row: Option<AccountRow> = sqlx::query_as(
            "SELECT account_num, owner, balance, notes FROM accounts WHERE account_num = ?",
        )
        .bind(i64::from(num.value()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(Account::try_from).transpose()
    }

    async fn update(&self, account: &Account) -> Result<Account, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET owner = ?, balance = ?, notes = ?
            WHERE account_num = ?
            "#,
        )
        .bind(account.owner_name().as_str())
        .bind(account.balance().to_string())
        .bind(account.notes())
        .bind(i64::from(account.account_num().value()))
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(account.account_num().to_string()));
        }

        // Hand back what the store actually holds.
        self.find_by_num(account.account_num())
            .await?
            .ok_or_else(|| RepositoryError::NotFound(account.account_num().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger::Amount;
    use crate::infrastructure::persistence::sqlite::test_pool;
    use rust_decimal_macros::dec;

    fn jane(num: u32) -> Account {
        Account::open(
            AccountNum::new(num).unwrap(),
            OwnerName::new("Jane Doe").unwrap(),
            Balance::new(dec!(100.0)).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = SqliteAccountRepository::new(test_pool().await);
        let account = jane(123_456);
        repo.create(&account).await.unwrap();

        let found = repo.find_by_num(account.account_num()).await.unwrap();
        assert_eq!(found, Some(account));
        assert!(repo
            .find_by_num(AccountNum::new(654_321).unwrap())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_number_is_rejected() {
        let repo = SqliteAccountRepository::new(test_pool().await);
        repo.create(&jane(123_456)).await.unwrap();

        let result = repo.create(&jane(123_456)).await;
        assert!(matches!(result, Err(RepositoryError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_update_round_trips_balance_and_notes() {
        let repo = SqliteAccountRepository::new(test_pool().await);
        let mut account = jane(123_456);
        repo.create(&account).await.unwrap();

        account
            .deposit(Amount::new(dec!(0.1)).unwrap(), "payroll")
            .unwrap();
        account
            .deposit(Amount::new(dec!(0.2)).unwrap(), "bonus")
            .unwrap();
        let persisted = repo.update(&account).await.unwrap();

        assert_eq!(persisted.balance().value(), dec!(100.3));
        assert_eq!(persisted.notes(), "payroll\n\nbonus");
        assert_eq!(persisted, account);
    }

    #[tokio::test]
    async fn test_update_missing_account_is_not_found() {
        let repo = SqliteAccountRepository::new(test_pool().await);
        let result = repo.update(&jane(123_456)).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_exists() {
        let repo = SqliteAccountRepository::new(test_pool().await);
        let account = jane(123_456);
        assert!(!repo.exists(account.account_num()).await.unwrap());
        repo.create(&account).await.unwrap();
        assert!(repo.exists(account.account_num()).await.unwrap());
    }
}
