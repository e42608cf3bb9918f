//! Data Transfer Objects

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;

use super::error::sanitize;
use crate::application::Session;
use crate::domain::ledger::Account;

// ============================================================================
// Account DTOs
// ============================================================================

/// Account as sent to clients. Free text is escaped for HTML.
#[derive(Debug, Serialize)]
pub struct AccountDto {
    pub account_num: u32,
    pub owner_name: String,
    #[serde(serialize_with = "exact_number")]
    pub balance: Decimal,
    pub notes: String,
}

impl From<&Account> for AccountDto {
    fn from(account: &Account) -> Self {
        Self {
            account_num: account.account_num().value(),
            owner_name: sanitize(account.owner_name().as_str()),
            balance: account.balance().value(),
            notes: sanitize(account.notes()),
        }
    }
}

/// Writes the decimal digits as a bare JSON number, with no pass through f64.
fn exact_number<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    RawValue::from_string(value.to_string())
        .map_err(serde::ser::Error::custom)?
        .serialize(serializer)
}

// ============================================================================
// Session DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct LoginDto {
    pub username: String,
    pub role: &'static str,
    pub account_num: Option<u32>,
    pub expiration: DateTime<Utc>,
}

impl From<&Session> for LoginDto {
    fn from(session: &Session) -> Self {
        Self {
            username: sanitize(session.user.username()),
            role: session.user.role().as_str(),
            account_num: session.user.account_num().map(|n| n.value()),
            expiration: session.expiration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger::{AccountNum, Balance, OwnerName};
    use rust_decimal_macros::dec;

    #[test]
    fn test_account_dto_escapes_notes() {
        let account = Account::restore(
            AccountNum::new(123_456).unwrap(),
            OwnerName::new("Jane Doe").unwrap(),
            Balance::new(dec!(150.0)).unwrap(),
            "<img src=x>".to_string(),
        );
        let json = serde_json::to_value(AccountDto::from(&account)).unwrap();

        assert_eq!(json["account_num"], 123456);
        assert_eq!(json["owner_name"], "Jane Doe");
        assert_eq!(json["balance"], 150.0);
        assert_eq!(json["notes"], "&lt;img src=x&gt;");
    }

    #[test]
    fn test_large_balance_keeps_every_digit() {
        let account = Account::restore(
            AccountNum::new(123_456).unwrap(),
            OwnerName::new("Jane Doe").unwrap(),
            Balance::new(dec!(12345678901234567.89)).unwrap(),
            String::new(),
        );
        let text = serde_json::to_string(&AccountDto::from(&account)).unwrap();

        assert!(text.contains("\"balance\":12345678901234567.89"), "{text}");
    }
}
