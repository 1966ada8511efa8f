//! Ledger schema: chart of accounts, catalog items, people, transactions,
//! and splits.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(LEDGER_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS splits, transactions, items, accounts, account_types, people CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const LEDGER_SQL: &str = r"
-- Status columns hold '1' (active) or '0' (void)

CREATE TABLE account_types (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(100) NOT NULL UNIQUE,
    nature VARCHAR(16) NOT NULL
        CHECK (nature IN ('asset', 'liability', 'equity', 'income', 'expense')),
    normal_side VARCHAR(6) NOT NULL CHECK (normal_side IN ('debit', 'credit'))
);

CREATE TABLE people (
    id BIGSERIAL PRIMARY KEY,
    building_id BIGINT NOT NULL,
    display_name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_people_building ON people(building_id);

CREATE TABLE accounts (
    id BIGSERIAL PRIMARY KEY,
    building_id BIGINT NOT NULL,
    number VARCHAR(20) NOT NULL,
    name VARCHAR(255) NOT NULL,
    type_id BIGINT NOT NULL REFERENCES account_types(id),
    is_default BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_accounts_number UNIQUE (building_id, number)
);

CREATE TABLE items (
    id BIGSERIAL PRIMARY KEY,
    building_id BIGINT NOT NULL,
    name VARCHAR(255) NOT NULL,
    item_type VARCHAR(20) NOT NULL,
    asset_account_id BIGINT REFERENCES accounts(id),
    income_account_id BIGINT REFERENCES accounts(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE transactions (
    id BIGSERIAL PRIMARY KEY,
    building_id BIGINT NOT NULL,
    unit_id BIGINT,
    kind VARCHAR(20) NOT NULL,
    date DATE NOT NULL,
    reference_number VARCHAR(50) NOT NULL,
    memo TEXT,
    user_id BIGINT NOT NULL,
    status CHAR(1) NOT NULL DEFAULT '1' CHECK (status IN ('0', '1')),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Report filter: building + as-of date over active transactions
CREATE INDEX idx_transactions_building_date ON transactions(building_id, date)
    WHERE status = '1';

-- Amounts are kept in integer cents; the NUMERIC columns mirror them for
-- ad-hoc SQL and are never summed by the engine
CREATE TABLE splits (
    id BIGSERIAL PRIMARY KEY,
    transaction_id BIGINT NOT NULL REFERENCES transactions(id),
    account_id BIGINT NOT NULL REFERENCES accounts(id),
    debit NUMERIC(16, 2),
    credit NUMERIC(16, 2),
    debit_cents BIGINT,
    credit_cents BIGINT,
    unit_id BIGINT,
    person_id BIGINT REFERENCES people(id),
    status CHAR(1) NOT NULL DEFAULT '1' CHECK (status IN ('0', '1')),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_splits_one_side CHECK ((debit_cents IS NULL) <> (credit_cents IS NULL)),
    CONSTRAINT chk_splits_positive CHECK (COALESCE(debit_cents, credit_cents) > 0)
);

CREATE INDEX idx_splits_transaction ON splits(transaction_id);
CREATE INDEX idx_splits_account ON splits(account_id) WHERE status = '1';
CREATE INDEX idx_splits_person ON splits(person_id) WHERE status = '1' AND person_id IS NOT NULL;

-- Standard account types. The receivable report keys on 'Account Receivable'
INSERT INTO account_types (name, nature, normal_side) VALUES
    ('Bank', 'asset', 'debit'),
    ('Account Receivable', 'asset', 'debit'),
    ('Other Current Asset', 'asset', 'debit'),
    ('Fixed Asset', 'asset', 'debit'),
    ('Account Payable', 'liability', 'credit'),
    ('Other Current Liability', 'liability', 'credit'),
    ('Long Term Liability', 'liability', 'credit'),
    ('Equity', 'equity', 'credit'),
    ('Income', 'income', 'credit'),
    ('Other Income', 'income', 'credit'),
    ('Expense', 'expense', 'debit'),
    ('Other Expense', 'expense', 'debit')
ON CONFLICT (name) DO NOTHING;
";
