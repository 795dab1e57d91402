//! Player profile — balance, experience, inventory and operation history
//!
//! In-memory bookkeeping around spins. Opening a case is two-step: the price
//! is debited by [`PlayerProfile::begin_opening`] before the spin starts and
//! the reward is credited by [`PlayerProfile::complete_opening`] once the
//! spin resolves.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::case::CaseDefinition;
use crate::catalog::RolledItem;
use crate::resolver::SpinOutcome;

/// Balance of a fresh profile
pub const STARTING_BALANCE: u64 = 10_000;

/// Experience needed per level
pub const EXPERIENCE_PER_LEVEL: u64 = 1_000;

/// Profile errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    #[error("Inventory entry not found: {0}")]
    UnknownInventoryItem(String),

    #[error("Receipt {0} is not pending")]
    UnknownReceipt(u64),

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Balance overflow: {balance} + {amount}")]
    BalanceOverflow { balance: u64, amount: u64 },

    #[error("Amount too large for the operation history: {0}")]
    AmountOutOfRange(u64),
}

/// Kind of balance operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Deposit,
    Withdraw,
    Purchase,
    Refund,
    Sale,
}

/// One entry of the operation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub kind: OperationKind,
    /// Signed balance change
    pub amount: i64,
    pub description: String,
    pub at: DateTime<Utc>,
}

/// An owned item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub inventory_id: u64,
    pub item: RolledItem,
    /// Case it came from
    pub case_id: String,
    pub obtained_at: DateTime<Utc>,
}

/// Proof that a case was paid for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningReceipt {
    pub receipt_id: u64,
    pub case_id: String,
    pub price: u64,
    pub balance_after: u64,
}

/// What a finished opening changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningSettlement {
    pub inventory_id: u64,
    pub item: RolledItem,
    pub experience_gained: u64,
    pub experience: u64,
    pub level: u32,
    pub leveled_up: bool,
    pub balance: u64,
}

/// Result of selling an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub item: RolledItem,
    pub price: u64,
    pub balance: u64,
}

/// One player's economy state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub balance: u64,
    pub experience: u64,
    pub level: u32,
    pub inventory: Vec<InventoryItem>,
    pub history: Vec<Operation>,
    /// Cases opened to completion
    pub cases_opened: u64,
    #[serde(default)]
    pending: BTreeSet<u64>,
    #[serde(default)]
    next_id: u64,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self::with_balance(STARTING_BALANCE)
    }
}

impl PlayerProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(balance: u64) -> Self {
        Self {
            balance,
            experience: 0,
            level: 1,
            inventory: Vec::new(),
            history: Vec::new(),
            cases_opened: 0,
            pending: BTreeSet::new(),
            next_id: 0,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // OPENING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Pay for a case
    pub fn begin_opening(&mut self, case: &CaseDefinition) -> Result<OpeningReceipt, ProfileError> {
        if self.balance < case.price {
            return Err(ProfileError::InsufficientFunds {
                needed: case.price,
                available: self.balance,
            });
        }
        let amount = signed(case.price)?;
        self.balance -= case.price;
        self.record(OperationKind::Purchase, -amount, format!("Case purchase: {}", case.name));

        let receipt_id = self.allocate_id();
        self.pending.insert(receipt_id);
        log::debug!("Case '{}' paid: {} (balance {})", case.id, case.price, self.balance);

        Ok(OpeningReceipt {
            receipt_id,
            case_id: case.id.clone(),
            price: case.price,
            balance_after: self.balance,
        })
    }

    /// Give the money back for an opening whose spin never started
    pub fn refund(&mut self, receipt: &OpeningReceipt) -> Result<u64, ProfileError> {
        if !self.pending.contains(&receipt.receipt_id) {
            return Err(ProfileError::UnknownReceipt(receipt.receipt_id));
        }
        let balance = self.credited(receipt.price)?;
        let amount = signed(receipt.price)?;
        self.pending.remove(&receipt.receipt_id);
        self.balance = balance;
        self.record(OperationKind::Refund, amount, format!("Refund: {}", receipt.case_id));
        Ok(self.balance)
    }

    /// Credit the resolved item and the experience for an opening
    pub fn complete_opening(
        &mut self,
        receipt: &OpeningReceipt,
        outcome: &SpinOutcome,
    ) -> Result<OpeningSettlement, ProfileError> {
        if !self.pending.remove(&receipt.receipt_id) {
            return Err(ProfileError::UnknownReceipt(receipt.receipt_id));
        }

        let inventory_id = self.allocate_id();
        self.inventory.push(InventoryItem {
            inventory_id,
            item: outcome.item.clone(),
            case_id: receipt.case_id.clone(),
            obtained_at: Utc::now(),
        });
        self.cases_opened += 1;

        let experience_gained = receipt.price / 10;
        self.experience = self.experience.saturating_add(experience_gained);
        let before = self.level;
        while self.experience >= u64::from(self.level) * EXPERIENCE_PER_LEVEL {
            self.level += 1;
        }
        if self.level > before {
            log::info!("Level up: {} -> {}", before, self.level);
        }

        Ok(OpeningSettlement {
            inventory_id,
            item: outcome.item.clone(),
            experience_gained,
            experience: self.experience,
            level: self.level,
            leveled_up: self.level > before,
            balance: self.balance,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INVENTORY
    // ═══════════════════════════════════════════════════════════════════════════

    /// Sell one inventory entry for its sell price
    pub fn sell(&mut self, inventory_id: u64) -> Result<Sale, ProfileError> {
        let position = self
            .inventory
            .iter()
            .position(|i| i.inventory_id == inventory_id)
            .ok_or_else(|| ProfileError::UnknownInventoryItem(inventory_id.to_string()))?;
        self.sell_at(position)
    }

    /// Sell the most recently obtained entry with this name
    pub fn sell_by_name(&mut self, name: &str) -> Result<Sale, ProfileError> {
        let position = self
            .inventory
            .iter()
            .enumerate()
            .filter(|(_, i)| i.item.name() == name)
            .max_by_key(|(_, i)| (i.obtained_at, i.inventory_id))
            .map(|(position, _)| position)
            .ok_or_else(|| ProfileError::UnknownInventoryItem(name.to_string()))?;
        self.sell_at(position)
    }

    fn sell_at(&mut self, position: usize) -> Result<Sale, ProfileError> {
        let price = self.inventory[position].item.entry.sell_value();
        let balance = self.credited(price)?;
        let amount = signed(price)?;

        let owned = self.inventory.remove(position);
        self.balance = balance;
        self.record(OperationKind::Sale, amount, format!("Item sale: {}", owned.item.name()));
        Ok(Sale {
            item: owned.item,
            price,
            balance: self.balance,
        })
    }

    /// Total sell value of the inventory
    pub fn inventory_value(&self) -> u64 {
        self.inventory
            .iter()
            .fold(0u64, |total, i| total.saturating_add(i.item.entry.sell_value()))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // BALANCE
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn deposit(&mut self, amount: u64) -> Result<u64, ProfileError> {
        if amount == 0 {
            return Err(ProfileError::InvalidAmount);
        }
        let balance = self.credited(amount)?;
        let signed_amount = signed(amount)?;
        self.balance = balance;
        self.record(OperationKind::Deposit, signed_amount, "Deposit".to_string());
        Ok(self.balance)
    }

    pub fn withdraw(&mut self, amount: u64) -> Result<u64, ProfileError> {
        if amount == 0 {
            return Err(ProfileError::InvalidAmount);
        }
        if amount > self.balance {
            return Err(ProfileError::InsufficientFunds {
                needed: amount,
                available: self.balance,
            });
        }
        let signed_amount = signed(amount)?;
        self.balance -= amount;
        self.record(OperationKind::Withdraw, -signed_amount, "Withdrawal".to_string());
        Ok(self.balance)
    }

    /// Back to a fresh profile
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Newest operations first
    pub fn recent_history(&self, limit: usize) -> Vec<&Operation> {
        self.history.iter().rev().take(limit).collect()
    }

    fn record(&mut self, kind: OperationKind, amount: i64, description: String) {
        self.history.push(Operation {
            kind,
            amount,
            description,
            at: Utc::now(),
        });
    }

    /// Balance after crediting `amount`
    fn credited(&self, amount: u64) -> Result<u64, ProfileError> {
        self.balance
            .checked_add(amount)
            .ok_or(ProfileError::BalanceOverflow {
                balance: self.balance,
                amount,
            })
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// History amounts are signed
fn signed(amount: u64) -> Result<i64, ProfileError> {
    i64::try_from(amount).map_err(|_| ProfileError::AmountOutOfRange(amount))
}
