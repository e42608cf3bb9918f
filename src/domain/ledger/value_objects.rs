//! Ledger Context - Value Objects

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::LedgerError;

/// Six-digit account number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct AccountNum(u32);

impl AccountNum {
    pub const MIN: u32 = 100_000;
    pub const MAX: u32 = 999_999;

    pub fn new(value: u32) -> Result<Self, LedgerError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(LedgerError::InvalidAccountNum(value.to_string()))
        }
    }

    /// Uniform draw over the whole six-digit range.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(Self::MIN..=Self::MAX))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for AccountNum {
    type Error = LedgerError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccountNum> for u32 {
    fn from(num: AccountNum) -> Self {
        num.0
    }
}

impl FromStr for AccountNum {
    type Err = LedgerError;

    /// Accepts ASCII digits only; signs and whitespace are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(LedgerError::InvalidAccountNum(s.to_string()));
        }
        let value = s
            .parse::<u32>()
            .map_err(|_| LedgerError::InvalidAccountNum(s.to_string()))?;
        Self::new(value)
    }
}

impl std::fmt::Display for AccountNum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account owner name
///
/// Invariant: 1-64 Latin letters or spaces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerName(String);

impl OwnerName {
    pub const MAX_LEN: usize = 64;

    pub fn new(name: impl Into<String>) -> Result<Self, LedgerError> {
        let name = name.into();
        let valid = !name.is_empty()
            && name.len() <= Self::MAX_LEN
            && name.chars().all(|c| c.is_ascii_alphabetic() || c == ' ');
        if !valid {
            return Err(LedgerError::InvalidOwnerName);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OwnerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-negative exact monetary value held by an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Balance(#[serde(with = "rust_decimal::serde::str")] Decimal);

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, LedgerError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(LedgerError::NegativeBalance);
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn checked_add(self, amount: Amount) -> Result<Self, LedgerError> {
        self.0
            .checked_add(amount.value())
            .map(Self)
            .ok_or(LedgerError::BalanceOverflow)
    }

    pub fn checked_sub(self, amount: Amount) -> Result<Self, LedgerError> {
        if amount.value() > self.0 {
            return Err(LedgerError::InsufficientFunds);
        }
        Ok(Self(self.0 - amount.value()))
    }
}

impl FromStr for Balance {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim()).map_err(|_| LedgerError::NotNumeric(s.to_string()))?;
        Self::new(value)
    }
}

impl std::fmt::Display for Balance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Amount moved by a deposit or withdrawal. Zero is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, LedgerError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(LedgerError::NegativeAmount);
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for Amount {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim()).map_err(|_| LedgerError::NotNumeric(s.to_string()))?;
        Self::new(value)
    }
}
