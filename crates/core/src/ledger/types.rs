//! Domain types for the ledger: accounts, items, transactions, splits.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rentledger_shared::types::{
    AccountId, AccountTypeId, BuildingId, Cents, ItemId, PersonId, SplitId, TransactionId,
    UnitId, UserId,
};
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

// ============================================================================
// Transaction kinds and status
// ============================================================================

/// Business kind that produced a ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Customer invoice.
    Invoice,
    /// Vendor bill.
    Bill,
    /// Check written from a bank account.
    Check,
    /// Bank deposit.
    Deposit,
    /// Manual journal.
    Journal,
    /// Payment received against an invoice.
    Payment,
    /// Payment made against a bill.
    BillPayment,
    /// Customer credit memo.
    CreditMemo,
    /// Sales receipt.
    Receipt,
}

impl TransactionKind {
    /// All kinds, in a stable order.
    pub const ALL: [Self; 9] = [
        Self::Invoice,
        Self::Bill,
        Self::Check,
        Self::Deposit,
        Self::Journal,
        Self::Payment,
        Self::BillPayment,
        Self::CreditMemo,
        Self::Receipt,
    ];

    /// Stored name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::Bill => "bill",
            Self::Check => "check",
            Self::Deposit => "deposit",
            Self::Journal => "journal",
            Self::Payment => "payment",
            Self::BillPayment => "bill_payment",
            Self::CreditMemo => "credit_memo",
            Self::Receipt => "receipt",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| LedgerError::Internal(format!("unknown transaction kind {s:?}")))
    }
}

/// Lifecycle status shared by transactions, splits, and documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Counts in every balance.
    #[default]
    Active,
    /// Kept for audit, excluded from balances.
    Void,
}

impl Status {
    /// Single character stored in status columns.
    #[must_use]
    pub const fn as_flag(self) -> &'static str {
        match self {
            Self::Active => "1",
            Self::Void => "0",
        }
    }

    /// Reads a stored status flag.
    pub fn from_flag(flag: &str) -> Result<Self, LedgerError> {
        match flag.trim() {
            "1" => Ok(Self::Active),
            "0" => Ok(Self::Void),
            other => Err(LedgerError::Internal(format!("unknown status flag {other:?}"))),
        }
    }

    /// Returns true for [`Status::Active`].
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

// ============================================================================
// Accounts
// ============================================================================

/// Financial-statement category of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountNature {
    /// Things owned.
    Asset,
    /// Things owed.
    Liability,
    /// Owner's stake.
    Equity,
    /// Earnings.
    Income,
    /// Costs.
    Expense,
}

impl AccountNature {
    /// Stored name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl FromStr for AccountNature {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            "income" | "revenue" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(LedgerError::Internal(format!("unknown account nature {other:?}"))),
        }
    }
}

/// Side on which an account's balance normally grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalSide {
    /// Balance = debits - credits.
    Debit,
    /// Balance = credits - debits.
    Credit,
}

impl NormalSide {
    /// Stored name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

impl FromStr for NormalSide {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debit" => Ok(Self::Debit),
            "credit" => Ok(Self::Credit),
            other => Err(LedgerError::Internal(format!("unknown normal side {other:?}"))),
        }
    }
}

/// Chart of accounts entry, joined with its account type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account ID.
    pub id: AccountId,
    /// Building that owns the account.
    pub building_id: BuildingId,
    /// Account number, e.g. `1200`.
    pub number: String,
    /// Display name.
    pub name: String,
    /// Account type ID.
    pub type_id: AccountTypeId,
    /// Account type name, e.g. `Account Receivable`.
    pub type_name: String,
    /// Statement category.
    pub nature: AccountNature,
    /// Normal balance side.
    pub normal_side: NormalSide,
    /// Whether this is the building's default account for its type.
    pub is_default: bool,
}

// ============================================================================
// Items
// ============================================================================

/// What an item does when it appears on an invoice or receipt line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    /// Adds income to `income_account_id`.
    Service {
        /// Income account credited.
        income_account_id: AccountId,
    },
    /// Reduces income on `income_account_id`.
    Discount {
        /// Income account debited.
        income_account_id: AccountId,
    },
    /// Adds to `asset_account_id`, e.g. a pass-through deposit.
    Payment {
        /// Asset account credited.
        asset_account_id: AccountId,
    },
}

impl ItemKind {
    /// The account a line with this item lands on.
    #[must_use]
    pub const fn account_id(self) -> AccountId {
        match self {
            Self::Service { income_account_id } | Self::Discount { income_account_id } => {
                income_account_id
            }
            Self::Payment { asset_account_id } => asset_account_id,
        }
    }
}

/// Catalog item with a validated kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Item ID.
    pub id: ItemId,
    /// Building that owns the item.
    pub building_id: BuildingId,
    /// Display name.
    pub name: String,
    /// Posting behavior.
    pub kind: ItemKind,
}

/// Item as stored, before its type string is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRow {
    /// Item ID.
    pub id: ItemId,
    /// Building that owns the item.
    pub building_id: BuildingId,
    /// Display name.
    pub name: String,
    /// `service`, `discount`, or `payment`.
    pub item_type: String,
    /// Asset account for payment items.
    pub asset_account_id: Option<AccountId>,
    /// Income account for service and discount items.
    pub income_account_id: Option<AccountId>,
}

impl TryFrom<ItemRow> for Item {
    type Error = LedgerError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let missing = |field: &str| {
            LedgerError::invalid_payload(
                field,
                format!("item {} of type {} has no {field}", row.id, row.item_type),
            )
        };
        let kind = match row.item_type.as_str() {
            "service" => ItemKind::Service {
                income_account_id: row
                    .income_account_id
                    .ok_or_else(|| missing("income_account_id"))?,
            },
            "discount" => ItemKind::Discount {
                income_account_id: row
                    .income_account_id
                    .ok_or_else(|| missing("income_account_id"))?,
            },
            "payment" => ItemKind::Payment {
                asset_account_id: row
                    .asset_account_id
                    .ok_or_else(|| missing("asset_account_id"))?,
            },
            _ => {
                return Err(LedgerError::UnsupportedItemType {
                    item_id: row.id,
                    item_type: row.item_type,
                });
            }
        };
        Ok(Self {
            id: row.id,
            building_id: row.building_id,
            name: row.name,
            kind,
        })
    }
}

/// Tenant, customer, or vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Person ID.
    pub id: PersonId,
    /// Building the person is attached to.
    pub building_id: BuildingId,
    /// Display name.
    pub display_name: String,
}

// ============================================================================
// Transactions and splits
// ============================================================================

/// Header fields shared by a document and its transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionHeader {
    /// Building the transaction belongs to.
    pub building_id: BuildingId,
    /// Unit, when the whole document is about one unit.
    pub unit_id: Option<UnitId>,
    /// Accounting date.
    pub date: NaiveDate,
    /// External reference, e.g. invoice number.
    pub reference_number: String,
    /// Free text.
    pub memo: Option<String>,
}

/// Transaction to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    /// Producing document kind.
    pub kind: TransactionKind,
    /// Header fields.
    pub header: TransactionHeader,
    /// Acting user.
    pub user_id: UserId,
}

/// Stored ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction ID.
    pub id: TransactionId,
    /// Producing document kind.
    pub kind: TransactionKind,
    /// Header fields.
    #[serde(flatten)]
    pub header: TransactionHeader,
    /// User that last wrote it.
    pub user_id: UserId,
    /// Lifecycle status.
    pub status: Status,
}

/// Split to insert: exactly one of `debit` and `credit` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSplit {
    /// Owning transaction.
    pub transaction_id: TransactionId,
    /// Account hit.
    pub account_id: AccountId,
    /// Debit amount.
    pub debit: Option<Cents>,
    /// Credit amount.
    pub credit: Option<Cents>,
    /// Unit attribution.
    pub unit_id: Option<UnitId>,
    /// Person attribution.
    pub person_id: Option<PersonId>,
}

/// Stored split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    /// Split ID.
    pub id: SplitId,
    /// Owning transaction.
    pub transaction_id: TransactionId,
    /// Account hit.
    pub account_id: AccountId,
    /// Debit amount.
    pub debit: Option<Cents>,
    /// Credit amount.
    pub credit: Option<Cents>,
    /// Unit attribution.
    pub unit_id: Option<UnitId>,
    /// Person attribution.
    pub person_id: Option<PersonId>,
    /// Lifecycle status.
    pub status: Status,
}

impl Split {
    /// Debit amount, zero when this is a credit split.
    #[must_use]
    pub fn debit_or_zero(&self) -> Cents {
        self.debit.unwrap_or(Cents::ZERO)
    }

    /// Credit amount, zero when this is a debit split.
    #[must_use]
    pub fn credit_or_zero(&self) -> Cents {
        self.credit.unwrap_or(Cents::ZERO)
    }
}
