//! Identity Context - User & Role

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::domain::ledger::AccountNum;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("username must not be empty")]
    EmptyUsername,
}

/// Closed set of roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Customer,
    Banker,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "CUSTOMER",
            Role::Banker => "BANKER",
        }
    }
}

impl FromStr for Role {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CUSTOMER" => Ok(Role::Customer),
            "BANKER" => Ok(Role::Banker),
            other => Err(IdentityError::UnknownRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated principal. Carries no credential material, so it is safe
/// to keep inside sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    username: String,
    account_num: Option<AccountNum>,
    role: Role,
}

impl User {
    pub fn new(
        username: impl Into<String>,
        account_num: Option<AccountNum>,
        role: Role,
    ) -> Result<Self, IdentityError> {
        let username = username.into();
        if username.is_empty() {
            return Err(IdentityError::EmptyUsername);
        }
        Ok(Self {
            username,
            account_num,
            role,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn account_num(&self) -> Option<AccountNum> {
        self.account_num
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_banker(&self) -> bool {
        self.role == Role::Banker
    }

    /// Bankers may operate on every account, customers only on their own.
    pub fn may_access(&self, target: AccountNum) -> bool {
        match self.role {
            Role::Banker => true,
            Role::Customer => self.account_num == Some(target),
        }
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.account_num {
            Some(num) => write!(f, "{} ({}, acct {})", self.username, self.role, num),
            None => write!(f, "{} ({})", self.username, self.role),
        }
    }
}

/// Stored password digest and salt, both hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub password_digest: String,
    pub salt: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: u32) -> AccountNum {
        AccountNum::new(n).unwrap()
    }

    #[test]
    fn test_banker_may_access_any_account() {
        let banker = User::new("teller", None, Role::Banker).unwrap();
        assert!(banker.may_access(num(123_456)));
        assert!(banker.may_access(num(999_999)));
    }

    #[test]
    fn test_customer_may_access_only_own_account() {
        let customer = User::new("jane", Some(num(123_456)), Role::Customer).unwrap();
        assert!(customer.may_access(num(123_456)));
        assert!(!customer.may_access(num(654_321)));

        let orphan = User::new("ghost", None, Role::Customer).unwrap();
        assert!(!orphan.may_access(num(123_456)));
    }

    #[test]
    fn test_role_round_trips_through_str() {
        assert_eq!("BANKER".parse::<Role>().unwrap(), Role::Banker);
        assert_eq!(Role::Customer.as_str(), "CUSTOMER");
        assert!("banker".parse::<Role>().is_err());
    }
}
