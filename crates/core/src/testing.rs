//! Shared fixtures for engine tests: a small building chart and payload builders.

use std::time::Duration;

use chrono::NaiveDate;
use rentledger_shared::types::{
    AccountId, AccountTypeId, BuildingId, Cents, ItemId, PersonId, Scaled5, UnitId, UserId,
};

use crate::context::{Principal, RequestContext};
use crate::ledger::{
    Account, AccountNature, Item, ItemRow, NormalSide, Person, Side, Split, SplitSet,
};
use crate::posting::{
    AccountLine, BillPayload, CheckPayload, CreditMemoPayload, InvoicePayload, ItemLine, Lookup,
};
use crate::store::MemoryStore;

pub const BUILDING: BuildingId = BuildingId::new(1);
pub const OTHER_BUILDING: BuildingId = BuildingId::new(2);
pub const UNIT: UnitId = UnitId::new(7);

pub const AR: AccountId = AccountId::new(10);
pub const BANK: AccountId = AccountId::new(11);
pub const INCOME: AccountId = AccountId::new(30);
pub const DEPOSITS: AccountId = AccountId::new(40);
pub const AP: AccountId = AccountId::new(50);
pub const REPAIRS: AccountId = AccountId::new(60);
pub const UTILITIES: AccountId = AccountId::new(61);
pub const EQUITY: AccountId = AccountId::new(80);
pub const FOREIGN_BANK: AccountId = AccountId::new(90);

pub const RENT_ITEM: ItemId = ItemId::new(200);
pub const DISCOUNT_ITEM: ItemId = ItemId::new(201);
pub const PASS_THROUGH_ITEM: ItemId = ItemId::new(202);
pub const BROKEN_ITEM: ItemId = ItemId::new(203);

pub const CUSTOMER: PersonId = PersonId::new(500);
pub const OTHER_CUSTOMER: PersonId = PersonId::new(501);
pub const VENDOR: PersonId = PersonId::new(600);

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn money(s: &str) -> Cents {
    Cents::parse(s).unwrap()
}

pub fn ctx() -> RequestContext {
    RequestContext::new(
        Principal {
            user_id: UserId::new(1),
        },
        Duration::from_secs(5),
    )
}

fn account(
    id: AccountId,
    building_id: BuildingId,
    number: &str,
    name: &str,
    type_name: &str,
    nature: AccountNature,
) -> Account {
    Account {
        id,
        building_id,
        number: number.to_string(),
        name: name.to_string(),
        type_id: AccountTypeId::new(nature as i64 + 1),
        type_name: type_name.to_string(),
        nature,
        normal_side: NormalSide::for_nature(nature),
        is_default: false,
    }
}

pub fn accounts() -> Vec<Account> {
    vec![
        account(AR, BUILDING, "1200", "Accounts Receivable", "Account Receivable", AccountNature::Asset),
        account(BANK, BUILDING, "1000", "Operating Bank", "Bank", AccountNature::Asset),
        account(INCOME, BUILDING, "4000", "Rental Income", "Income", AccountNature::Income),
        account(DEPOSITS, BUILDING, "2100", "Customer Deposits", "Other Current Liability", AccountNature::Liability),
        account(AP, BUILDING, "2000", "Accounts Payable", "Account Payable", AccountNature::Liability),
        account(REPAIRS, BUILDING, "6000", "Repairs", "Expense", AccountNature::Expense),
        account(UTILITIES, BUILDING, "6100", "Utilities", "Expense", AccountNature::Expense),
        account(EQUITY, BUILDING, "3000", "Owner Equity", "Equity", AccountNature::Equity),
        account(FOREIGN_BANK, OTHER_BUILDING, "1000", "Other Bank", "Bank", AccountNature::Asset),
    ]
}

fn item_row(id: ItemId, name: &str, item_type: &str) -> ItemRow {
    ItemRow {
        id,
        building_id: BUILDING,
        name: name.to_string(),
        item_type: item_type.to_string(),
        asset_account_id: Some(BANK),
        income_account_id: Some(INCOME),
    }
}

pub fn item_rows() -> Vec<ItemRow> {
    vec![
        item_row(RENT_ITEM, "Rent", "service"),
        item_row(DISCOUNT_ITEM, "Early payment discount", "discount"),
        item_row(PASS_THROUGH_ITEM, "Utility pass-through", "payment"),
        item_row(BROKEN_ITEM, "Legacy inventory", "inventory"),
    ]
}

pub fn people() -> Vec<Person> {
    [
        (CUSTOMER, "Ada Tenant"),
        (OTHER_CUSTOMER, "Bo Tenant"),
        (VENDOR, "Fixit Plumbing"),
    ]
    .into_iter()
    .map(|(id, name)| Person {
        id,
        building_id: BUILDING,
        display_name: name.to_string(),
    })
    .collect()
}

pub fn lookup() -> Lookup {
    let mut lookup = Lookup::default();
    for account in accounts() {
        lookup.insert_account(account);
    }
    for row in item_rows() {
        if let Ok(item) = Item::try_from(row) {
            lookup.insert_item(item);
        }
    }
    lookup
}

pub async fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    for account in accounts() {
        store.insert_account(account).await;
    }
    for row in item_rows() {
        store.insert_item(row).await;
    }
    for person in people() {
        store.insert_person(person).await;
    }
    store
}

pub fn item_line(item_id: ItemId, quantity: &str, rate: &str) -> ItemLine {
    ItemLine {
        item_id,
        description: None,
        quantity: Scaled5::parse_quantity(quantity).unwrap(),
        rate: Scaled5::parse_rate(rate).unwrap(),
    }
}

pub fn account_line(account_id: AccountId, amount: &str) -> AccountLine {
    AccountLine {
        account_id,
        amount: money(amount),
        description: None,
        unit_id: None,
        person_id: None,
    }
}

pub fn invoice(lines: Vec<ItemLine>) -> InvoicePayload {
    InvoicePayload {
        building_id: BUILDING,
        customer_id: CUSTOMER,
        unit_id: None,
        ar_account_id: AR,
        date: date(2025, 1, 15),
        due_date: Some(date(2025, 2, 15)),
        reference_number: "INV-1".to_string(),
        memo: None,
        lines,
    }
}

pub fn bill(lines: Vec<AccountLine>) -> BillPayload {
    BillPayload {
        building_id: BUILDING,
        vendor_id: Some(VENDOR),
        unit_id: None,
        ap_account_id: AP,
        date: date(2025, 1, 15),
        due_date: None,
        reference_number: "BL-1".to_string(),
        memo: None,
        lines,
    }
}

pub fn check(lines: Vec<AccountLine>) -> CheckPayload {
    CheckPayload {
        building_id: BUILDING,
        payee_id: Some(VENDOR),
        unit_id: None,
        bank_account_id: BANK,
        date: date(2025, 1, 20),
        reference_number: "CHK-1001".to_string(),
        memo: None,
        lines,
    }
}

pub fn credit_memo(customer_id: PersonId, amount: &str) -> CreditMemoPayload {
    CreditMemoPayload {
        building_id: BUILDING,
        customer_id,
        unit_id: None,
        liability_account_id: DEPOSITS,
        deposit_account_id: BANK,
        date: date(2025, 1, 10),
        reference_number: "CM-1".to_string(),
        memo: None,
        amount: money(amount),
    }
}

/// `(account, side, amount)` for each draft, in order.
pub fn drafts(set: &SplitSet) -> Vec<(AccountId, Side, Cents)> {
    set.drafts()
        .iter()
        .map(|d| (d.account_id, d.side, d.amount))
        .collect()
}

/// `(account, debit, credit)` for each active split, in id order.
pub fn active(splits: &[Split]) -> Vec<(AccountId, Option<Cents>, Option<Cents>)> {
    splits
        .iter()
        .filter(|s| s.status.is_active())
        .map(|s| (s.account_id, s.debit, s.credit))
        .collect()
}
