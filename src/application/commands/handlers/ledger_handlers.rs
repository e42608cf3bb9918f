//! Ledger Command Handlers

use std::sync::Arc;

use crate::application::commands::{CreateAccount, Deposit, Withdraw};
use crate::application::error::ApplicationError;
use crate::application::ports::{AccountRepositoryPort, RepositoryError};
use crate::domain::identity::User;
use crate::domain::ledger::{Account, AccountNum, Amount, Balance, LedgerError, OwnerName};
use crate::infrastructure::memory::AccountLocks;

/// Default cap on random draws when allocating an account number.
pub const DEFAULT_MAX_ALLOCATION_ATTEMPTS: u32 = 64;

// ============================================================================
// CreateAccount
// ============================================================================

/// CreateAccount Handler
pub struct CreateAccountHandler {
    account_repo: Arc<dyn AccountRepositoryPort>,
    max_attempts: u32,
}

impl CreateAccountHandler {
    pub fn new(account_repo: Arc<dyn AccountRepositoryPort>, max_attempts: u32) -> Self {
        Self {
            account_repo,
            max_attempts,
        }
    }

    pub async fn handle(&self, cmd: CreateAccount) -> Result<Account, ApplicationError> {
        let owner_name = OwnerName::new(cmd.owner_name)?;
        let balance: Balance = cmd.balance.parse()?;

        if !cmd.actor.is_banker() {
            tracing::warn!(user = %cmd.actor, "Account creation denied");
            return Err(ApplicationError::forbidden());
        }

        for attempt in 1..=self.max_attempts {
            let account_num = draw_account_num();
            if self.account_repo.exists(account_num).await? {
                tracing::debug!(account_num = %account_num, attempt, "Account number taken, redrawing");
                continue;
            }

            let account = Account::open(account_num, owner_name.clone(), balance);
            match self.account_repo.create(&account).await {
                Ok(created) => {
                    tracing::info!(
                        account_num = %account_num,
                        banker = %cmd.actor.username(),
                        attempt,
                        "Account created"
                    );
                    return Ok(created);
                }
                // Lost a race with a concurrent creation; draw again.
                Err(RepositoryError::Duplicate(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        tracing::error!(
            max_attempts = self.max_attempts,
            "Account number allocation exhausted"
        );
        Err(ApplicationError::ResourceExhausted(
            "no free account number found, try again later".to_string(),
        ))
    }
}

fn draw_account_num() -> AccountNum {
    AccountNum::random(&mut rand::thread_rng())
}

// ============================================================================
// Deposit / Withdraw
// ============================================================================

/// Shared read-modify-write-verify cycle for balance mutations.
///
/// Holds the per-account lock for the whole cycle, so at most one mutation
/// per account is in flight.
struct BalanceMutator {
    account_repo: Arc<dyn AccountRepositoryPort>,
    locks: Arc<AccountLocks>,
}

impl BalanceMutator {
    async fn apply<F>(
        &self,
        account_num: AccountNum,
        actor: &User,
        mutate: F,
    ) -> Result<Account, ApplicationError>
    where
        F: FnOnce(&mut Account) -> Result<(), LedgerError>,
    {
        // Lock entries are never evicted, so only real, permitted targets get one.
        if !self.account_repo.exists(account_num).await? {
            return Err(ApplicationError::account_not_found(account_num));
        }
        if !actor.may_access(account_num) {
            tracing::warn!(user = %actor, account_num = %account_num, "Balance change denied");
            return Err(ApplicationError::forbidden());
        }

        let _guard = self.locks.acquire(account_num).await;

        let mut account = self
            .account_repo
            .find_by_num(account_num)
            .await?
            .ok_or_else(|| ApplicationError::account_not_found(account_num))?;

        mutate(&mut account)?;

        let persisted = self.account_repo.update(&account).await?;
        verify_persisted(&account, &persisted)?;

        Ok(account)
    }
}

/// Post-write integrity check: the store must hold exactly the balance we
/// computed in memory.
fn verify_persisted(expected: &Account, persisted: &Account) -> Result<(), ApplicationError> {
    if persisted.balance() != expected.balance() {
        tracing::error!(
            account_num = %expected.account_num(),
            expected = %expected.balance(),
            persisted = %persisted.balance(),
            "Persisted balance does not match expected balance"
        );
        return Err(ApplicationError::Integrity {
            account_num: expected.account_num(),
            expected: expected.balance().to_string(),
            persisted: persisted.balance().to_string(),
        });
    }
    Ok(())
}

/// Deposit Handler
pub struct DepositHandler {
    mutator: BalanceMutator,
}

impl DepositHandler {
    pub fn new(account_repo: Arc<dyn AccountRepositoryPort>, locks: Arc<AccountLocks>) -> Self {
        Self {
            mutator: BalanceMutator {
                account_repo,
                locks,
            },
        }
    }

    pub async fn handle(&self, cmd: Deposit) -> Result<Account, ApplicationError> {
        let amount: Amount = cmd.amount.parse()?;
        let account = self
            .mutator
            .apply(cmd.account_num, &cmd.actor, |acct| acct.deposit(amount, &cmd.notes))
            .await?;

        tracing::info!(
            account_num = %cmd.account_num,
            amount = %amount.value(),
            user = %cmd.actor.username(),
            "Deposit applied"
        );
        Ok(account)
    }
}

/// Withdraw Handler
pub struct WithdrawHandler {
    mutator: BalanceMutator,
}

impl WithdrawHandler {
    pub fn new(account_repo: Arc<dyn AccountRepositoryPort>, locks: Arc<AccountLocks>) -> Self {
        Self {
            mutator: BalanceMutator {
                account_repo,
                locks,
            },
        }
    }

    pub async fn handle(&self, cmd: Withdraw) -> Result<Account, ApplicationError> {
        let amount: Amount = cmd.amount.parse()?;
        let account = self
            .mutator
            .apply(cmd.account_num, &cmd.actor, |acct| acct.withdraw(amount, &cmd.notes))
            .await?;

        tracing::info!(
            account_num = %cmd.account_num,
            amount = %amount.value(),
            user = %cmd.actor.username(),
            "Withdrawal applied"
        );
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::Role;
    use crate::infrastructure::persistence::sqlite::{test_pool, SqliteAccountRepository};
    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    fn banker() -> User {
        User::new("teller", None, Role::Banker).unwrap()
    }

    fn customer(num: AccountNum) -> User {
        User::new("jane", Some(num), Role::Customer).unwrap()
    }

    async fn repo() -> Arc<dyn AccountRepositoryPort> {
        Arc::new(SqliteAccountRepository::new(test_pool().await))
    }

    async fn open(repo: &Arc<dyn AccountRepositoryPort>, balance: &str) -> Account {
        CreateAccountHandler::new(repo.clone(), DEFAULT_MAX_ALLOCATION_ATTEMPTS)
            .handle(CreateAccount {
                owner_name: "Jane Doe".to_string(),
                balance: balance.to_string(),
                actor: banker(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_banker_creates_account_with_fresh_number() {
        let repo = repo().await;
        let handler = CreateAccountHandler::new(repo.clone(), DEFAULT_MAX_ALLOCATION_ATTEMPTS);

        let mut seen = std::collections::HashSet::new();
        for balance in ["0", "100.0", "12345.6789"] {
            let account = handler
                .handle(CreateAccount {
                    owner_name: "Jane Doe".to_string(),
                    balance: balance.to_string(),
                    actor: banker(),
                })
                .await
                .unwrap();

            assert_eq!(account.balance(), balance.parse::<Balance>().unwrap());
            assert!((100_000..=999_999).contains(&account.account_num().value()));
            assert!(seen.insert(account.account_num()));

            let stored = repo.find_by_num(account.account_num()).await.unwrap().unwrap();
            assert_eq!(stored, account);
        }
    }

    #[tokio::test]
    async fn test_customer_cannot_create_account() {
        let repo = repo().await;
        let handler = CreateAccountHandler::new(repo, DEFAULT_MAX_ALLOCATION_ATTEMPTS);
        let result = handler
            .handle(CreateAccount {
                owner_name: "Jane Doe".to_string(),
                balance: "10".to_string(),
                actor: customer(AccountNum::new(123_456).unwrap()),
            })
            .await;

        assert!(matches!(result, Err(ApplicationError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_account_validates_fields() {
        let repo = repo().await;
        let handler = CreateAccountHandler::new(repo, DEFAULT_MAX_ALLOCATION_ATTEMPTS);

        for (name, balance) in [("Jane 2", "1"), ("", "1"), ("Jane", "-1"), ("Jane", "lots")] {
            let result = handler
                .handle(CreateAccount {
                    owner_name: name.to_string(),
                    balance: balance.to_string(),
                    actor: banker(),
                })
                .await;
            assert!(
                matches!(result, Err(ApplicationError::Validation(_))),
                "{name:?} / {balance:?}"
            );
        }
    }

    /// Every number reports as taken.
    struct FullStore;

    #[async_trait]
    impl AccountRepositoryPort for FullStore {
        async fn create(&self, account: &Account) -> Result<Account, RepositoryError> {
            Err(RepositoryError::Duplicate(account.account_num().to_string()))
        }

        async fn find_by_num(&self, num: AccountNum) -> Result<Option<Account>, RepositoryError> {
            Ok(Some(Account::open(num, OwnerName::new("X").unwrap(), Balance::ZERO)))
        }

        async fn update(&self, account: &Account) -> Result<Account, RepositoryError> {
            Ok(account.clone())
        }
    }

    #[tokio::test]
    async fn test_allocation_gives_up_after_bounded_attempts() {
        let handler = CreateAccountHandler::new(Arc::new(FullStore), 5);
        let result = handler
            .handle(CreateAccount {
                owner_name: "Jane Doe".to_string(),
                balance: "1".to_string(),
                actor: banker(),
            })
            .await;

        assert!(matches!(result, Err(ApplicationError::ResourceExhausted(_))));
    }

    #[tokio::test]
    async fn test_withdraw_then_deposit_restores_balance() {
        let repo = repo().await;
        let locks = Arc::new(AccountLocks::new());
        let account = open(&repo, "100.0").await;
        let num = account.account_num();

        let withdraw = WithdrawHandler::new(repo.clone(), locks.clone());
        let deposit = DepositHandler::new(repo.clone(), locks);

        for amt in ["0", "0.1", "33.33", "100.0"] {
            withdraw
                .handle(Withdraw {
                    account_num: num,
                    amount: amt.to_string(),
                    notes: String::new(),
                    actor: banker(),
                })
                .await
                .unwrap();
            let restored = deposit
                .handle(Deposit {
                    account_num: num,
                    amount: amt.to_string(),
                    notes: String::new(),
                    actor: customer(num),
                })
                .await
                .unwrap();
            assert_eq!(restored.balance().value(), dec!(100.0));
        }
    }

    #[tokio::test]
    async fn test_over_withdrawal_does_not_touch_store() {
        let repo = repo().await;
        let account = open(&repo, "10.0").await;
        let num = account.account_num();

        let handler = WithdrawHandler::new(repo.clone(), Arc::new(AccountLocks::new()));
        let result = handler
            .handle(Withdraw {
                account_num: num,
                amount: "10.01".to_string(),
                notes: "rent".to_string(),
                actor: banker(),
            })
            .await;

        assert!(matches!(result, Err(ApplicationError::Validation(_))));
        let stored = repo.find_by_num(num).await.unwrap().unwrap();
        assert_eq!(stored, account);
    }

    #[tokio::test]
    async fn test_deposit_rules() {
        let repo = repo().await;
        let account = open(&repo, "10.0").await;
        let num = account.account_num();
        let other = AccountNum::new(if num.value() == 100_000 { 100_001 } else { 100_000 }).unwrap();
        let handler = DepositHandler::new(repo.clone(), Arc::new(AccountLocks::new()));

        let deposit = |amount: &str, target: AccountNum, actor: User| Deposit {
            account_num: target,
            amount: amount.to_string(),
            notes: String::new(),
            actor,
        };

        let negative = handler.handle(deposit("-1", num, banker())).await;
        assert!(matches!(negative, Err(ApplicationError::Validation(_))));

        let missing = handler.handle(deposit("1", other, banker())).await;
        assert!(matches!(missing, Err(ApplicationError::NotFound { .. })));

        let stranger = handler.handle(deposit("1", num, customer(other))).await;
        assert!(matches!(stranger, Err(ApplicationError::Forbidden(_))));

        let owner = handler.handle(deposit("1", num, customer(num))).await.unwrap();
        assert_eq!(owner.balance().value(), dec!(11.0));
    }

    #[tokio::test]
    async fn test_rejected_targets_take_no_lock() {
        let repo = repo().await;
        let account = open(&repo, "10.0").await;
        let num = account.account_num();
        let other = AccountNum::new(if num.value() == 100_000 { 100_001 } else { 100_000 }).unwrap();
        let locks = Arc::new(AccountLocks::new());
        let handler = DepositHandler::new(repo.clone(), locks.clone());

        let deposit = |target: AccountNum, actor: User| Deposit {
            account_num: target,
            amount: "1".to_string(),
            notes: String::new(),
            actor,
        };

        for missing in [other, AccountNum::new(999_999).unwrap()] {
            if missing == num {
                continue;
            }
            let result = handler.handle(deposit(missing, banker())).await;
            assert!(matches!(result, Err(ApplicationError::NotFound { .. })));
        }
        let stranger = handler.handle(deposit(num, customer(other))).await;
        assert!(matches!(stranger, Err(ApplicationError::Forbidden(_))));
        assert!(locks.is_empty());

        handler.handle(deposit(num, banker())).await.unwrap();
        assert_eq!(locks.len(), 1);
    }

    /// Store that silently zeroes balances on update.
    struct CorruptingStore {
        inner: Arc<dyn AccountRepositoryPort>,
    }

    #[async_trait]
    impl AccountRepositoryPort for CorruptingStore {
        async fn create(&self, account: &Account) -> Result<Account, RepositoryError> {
            self.inner.create(account).await
        }

        async fn find_by_num(&self, num: AccountNum) -> Result<Option<Account>, RepositoryError> {
            self.inner.find_by_num(num).await
        }

        async fn update(&self, account: &Account) -> Result<Account, RepositoryError> {
            let zeroed = Account::restore(
                account.account_num(),
                account.owner_name().clone(),
                Balance::ZERO,
                account.notes().to_string(),
            );
            self.inner.update(&zeroed).await
        }
    }

    #[tokio::test]
    async fn test_integrity_failure_is_reported() {
        let inner = repo().await;
        let account = open(&inner, "10.0").await;
        let store: Arc<dyn AccountRepositoryPort> = Arc::new(CorruptingStore { inner });

        let handler = DepositHandler::new(store, Arc::new(AccountLocks::new()));
        let result = handler
            .handle(Deposit {
                account_num: account.account_num(),
                amount: "5".to_string(),
                notes: String::new(),
                actor: banker(),
            })
            .await;

        assert!(matches!(result, Err(ApplicationError::Integrity { .. })));
    }

    #[tokio::test]
    async fn test_concurrent_deposits_are_serialised() {
        let repo = repo().await;
        let account = open(&repo, "0").await;
        let num = account.account_num();
        let handler = Arc::new(DepositHandler::new(repo.clone(), Arc::new(AccountLocks::new())));

        let mut tasks = Vec::new();
        for _ in 0..20 {
            let handler = handler.clone();
            tasks.push(tokio::spawn(async move {
                handler
                    .handle(Deposit {
                        account_num: num,
                        amount: "1".to_string(),
                        notes: String::new(),
                        actor: banker(),
                    })
                    .await
                    .unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let stored = repo.find_by_num(num).await.unwrap().unwrap();
        assert_eq!(stored.balance().value(), dec!(20));
    }
}
