//! Ledger Context - Aggregate Root

use serde::{Deserialize, Serialize};

use super::{AccountNum, Amount, Balance, LedgerError, OwnerName};

/// Separator placed between two consecutive note entries.
pub const NOTE_SEPARATOR: &str = "\n\n";

/// Account aggregate root
///
/// Invariants:
/// - balance >= 0
/// - notes are append-only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    account_num: AccountNum,
    owner_name: OwnerName,
    balance: Balance,
    notes: String,
}

impl Account {
    /// Opens a new account with no notes.
    pub fn open(account_num: AccountNum, owner_name: OwnerName, balance: Balance) -> Self {
        Self {
            account_num,
            owner_name,
            balance,
            notes: String::new(),
        }
    }

    /// Rebuilds an account from its persisted fields.
    pub fn restore(
        account_num: AccountNum,
        owner_name: OwnerName,
        balance: Balance,
        notes: String,
    ) -> Self {
        Self {
            account_num,
            owner_name,
            balance,
            notes,
        }
    }

    pub fn deposit(&mut self, amount: Amount, note: &str) -> Result<(), LedgerError> {
        self.balance = self.balance.checked_add(amount)?;
        self.append_note(note);
        Ok(())
    }

    /// Leaves the account untouched when funds are insufficient.
    pub fn withdraw(&mut self, amount: Amount, note: &str) -> Result<(), LedgerError> {
        self.balance = self.balance.checked_sub(amount)?;
        self.append_note(note);
        Ok(())
    }

    fn append_note(&mut self, note: &str) {
        if note.is_empty() {
            return;
        }
        if !self.notes.is_empty() {
            self.notes.push_str(NOTE_SEPARATOR);
        }
        self.notes.push_str(note);
    }

    // Getters
    pub fn account_num(&self) -> AccountNum {
        self.account_num
    }

    pub fn owner_name(&self) -> &OwnerName {
        &self.owner_name
    }

    pub fn balance(&self) -> Balance {
        self.balance
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }
}
