//! Account Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::AccountRepositoryPort;
use crate::application::queries::GetAccount;
use crate::domain::ledger::Account;

/// GetAccount Handler
pub struct GetAccountHandler {
    account_repo: Arc<dyn AccountRepositoryPort>,
}

impl GetAccountHandler {
    pub fn new(account_repo: Arc<dyn AccountRepositoryPort>) -> Self {
        Self { account_repo }
    }

    pub async fn handle(&self, query: GetAccount) -> Result<Account, ApplicationError> {
        let account = self
            .account_repo
            .find_by_num(query.account_num)
            .await?
            .ok_or_else(|| ApplicationError::account_not_found(query.account_num))?;

        if !query.actor.may_access(query.account_num) {
            tracing::warn!(
                user = %query.actor,
                account_num = %query.account_num,
                "Account lookup denied"
            );
            return Err(ApplicationError::forbidden());
        }

        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::{Role, User};
    use crate::domain::ledger::{AccountNum, Balance, OwnerName};
    use crate::infrastructure::persistence::sqlite::{test_pool, SqliteAccountRepository};

    #[tokio::test]
    async fn test_get_account_applies_access_rule() {
        let repo = Arc::new(SqliteAccountRepository::new(test_pool().await));
        let num = AccountNum::new(123_456).unwrap();
        let other = AccountNum::new(654_321).unwrap();
        let account = Account::open(num, OwnerName::new("Jane Doe").unwrap(), Balance::ZERO);
        repo.create(&account).await.unwrap();

        let handler = GetAccountHandler::new(repo);
        let query = |target: AccountNum, actor: User| GetAccount {
            account_num: target,
            actor,
        };

        let owner = User::new("jane", Some(num), Role::Customer).unwrap();
        let stranger = User::new("john", Some(other), Role::Customer).unwrap();
        let banker = User::new("teller", None, Role::Banker).unwrap();

        assert_eq!(handler.handle(query(num, owner)).await.unwrap(), account);
        assert_eq!(handler.handle(query(num, banker.clone())).await.unwrap(), account);
        assert!(matches!(
            handler.handle(query(num, stranger)).await,
            Err(ApplicationError::Forbidden(_))
        ));
        assert!(matches!(
            handler.handle(query(other, banker)).await,
            Err(ApplicationError::NotFound { .. })
        ));
    }
}
