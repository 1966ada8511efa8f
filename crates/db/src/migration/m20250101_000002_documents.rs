//! Business document tables. Every header row points at the transaction it
//! posted; line rows hang off their header and are replaced on update.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DOCUMENTS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            r"DROP TABLE IF EXISTS
                invoice_applied_credits, credit_memos, bill_payments, invoice_payments,
                sales_receipt_lines, sales_receipts, journal_lines, journals,
                deposit_lines, deposits, check_lines, checks, bill_lines, bills,
                invoice_lines, invoices
              CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const DOCUMENTS_SQL: &str = r"
-- ============================================================================
-- Invoices and sales receipts (item lines)
-- ============================================================================

CREATE TABLE invoices (
    id BIGSERIAL PRIMARY KEY,
    transaction_id BIGINT NOT NULL UNIQUE REFERENCES transactions(id),
    building_id BIGINT NOT NULL,
    customer_id BIGINT NOT NULL REFERENCES people(id),
    unit_id BIGINT,
    ar_account_id BIGINT NOT NULL REFERENCES accounts(id),
    date DATE NOT NULL,
    due_date DATE,
    reference_number VARCHAR(50) NOT NULL,
    memo TEXT,
    total_cents BIGINT NOT NULL,
    status CHAR(1) NOT NULL DEFAULT '1' CHECK (status IN ('0', '1')),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_invoices_building ON invoices(building_id);
CREATE INDEX idx_invoices_customer ON invoices(building_id, customer_id);

CREATE TABLE invoice_lines (
    id BIGSERIAL PRIMARY KEY,
    invoice_id BIGINT NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
    position INT NOT NULL,
    item_id BIGINT NOT NULL REFERENCES items(id),
    description TEXT,
    quantity_scaled BIGINT NOT NULL,
    rate_scaled BIGINT NOT NULL
);

CREATE INDEX idx_invoice_lines_invoice ON invoice_lines(invoice_id, position);

CREATE TABLE sales_receipts (
    id BIGSERIAL PRIMARY KEY,
    transaction_id BIGINT NOT NULL UNIQUE REFERENCES transactions(id),
    building_id BIGINT NOT NULL,
    customer_id BIGINT REFERENCES people(id),
    unit_id BIGINT,
    deposit_account_id BIGINT NOT NULL REFERENCES accounts(id),
    date DATE NOT NULL,
    reference_number VARCHAR(50) NOT NULL,
    memo TEXT,
    total_cents BIGINT NOT NULL,
    status CHAR(1) NOT NULL DEFAULT '1' CHECK (status IN ('0', '1')),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_sales_receipts_building ON sales_receipts(building_id);

CREATE TABLE sales_receipt_lines (
    id BIGSERIAL PRIMARY KEY,
    sales_receipt_id BIGINT NOT NULL REFERENCES sales_receipts(id) ON DELETE CASCADE,
    position INT NOT NULL,
    item_id BIGINT NOT NULL REFERENCES items(id),
    description TEXT,
    quantity_scaled BIGINT NOT NULL,
    rate_scaled BIGINT NOT NULL
);

CREATE INDEX idx_sales_receipt_lines_receipt ON sales_receipt_lines(sales_receipt_id, position);

-- ============================================================================
-- Bills, checks, deposits (account lines)
-- ============================================================================

CREATE TABLE bills (
    id BIGSERIAL PRIMARY KEY,
    transaction_id BIGINT NOT NULL UNIQUE REFERENCES transactions(id),
    building_id BIGINT NOT NULL,
    vendor_id BIGINT REFERENCES people(id),
    unit_id BIGINT,
    ap_account_id BIGINT NOT NULL REFERENCES accounts(id),
    date DATE NOT NULL,
    due_date DATE,
    reference_number VARCHAR(50) NOT NULL,
    memo TEXT,
    total_cents BIGINT NOT NULL,
    status CHAR(1) NOT NULL DEFAULT '1' CHECK (status IN ('0', '1')),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_bills_building ON bills(building_id);

CREATE TABLE bill_lines (
    id BIGSERIAL PRIMARY KEY,
    bill_id BIGINT NOT NULL REFERENCES bills(id) ON DELETE CASCADE,
    position INT NOT NULL,
    account_id BIGINT NOT NULL REFERENCES accounts(id),
    amount_cents BIGINT NOT NULL,
    description TEXT,
    unit_id BIGINT,
    person_id BIGINT REFERENCES people(id)
);

CREATE INDEX idx_bill_lines_bill ON bill_lines(bill_id, position);

CREATE TABLE checks (
    id BIGSERIAL PRIMARY KEY,
    transaction_id BIGINT NOT NULL UNIQUE REFERENCES transactions(id),
    building_id BIGINT NOT NULL,
    payee_id BIGINT REFERENCES people(id),
    unit_id BIGINT,
    bank_account_id BIGINT NOT NULL REFERENCES accounts(id),
    date DATE NOT NULL,
    reference_number VARCHAR(50) NOT NULL,
    memo TEXT,
    total_cents BIGINT NOT NULL,
    status CHAR(1) NOT NULL DEFAULT '1' CHECK (status IN ('0', '1')),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_checks_building ON checks(building_id);

CREATE TABLE check_lines (
    id BIGSERIAL PRIMARY KEY,
    check_id BIGINT NOT NULL REFERENCES checks(id) ON DELETE CASCADE,
    position INT NOT NULL,
    account_id BIGINT NOT NULL REFERENCES accounts(id),
    amount_cents BIGINT NOT NULL,
    description TEXT,
    unit_id BIGINT,
    person_id BIGINT REFERENCES people(id)
);

CREATE INDEX idx_check_lines_check ON check_lines(check_id, position);

CREATE TABLE deposits (
    id BIGSERIAL PRIMARY KEY,
    transaction_id BIGINT NOT NULL UNIQUE REFERENCES transactions(id),
    building_id BIGINT NOT NULL,
    unit_id BIGINT,
    bank_account_id BIGINT NOT NULL REFERENCES accounts(id),
    date DATE NOT NULL,
    reference_number VARCHAR(50) NOT NULL,
    memo TEXT,
    total_cents BIGINT NOT NULL,
    status CHAR(1) NOT NULL DEFAULT '1' CHECK (status IN ('0', '1')),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_deposits_building ON deposits(building_id);

CREATE TABLE deposit_lines (
    id BIGSERIAL PRIMARY KEY,
    deposit_id BIGINT NOT NULL REFERENCES deposits(id) ON DELETE CASCADE,
    position INT NOT NULL,
    account_id BIGINT NOT NULL REFERENCES accounts(id),
    amount_cents BIGINT NOT NULL,
    description TEXT,
    unit_id BIGINT,
    person_id BIGINT REFERENCES people(id)
);

CREATE INDEX idx_deposit_lines_deposit ON deposit_lines(deposit_id, position);

-- ============================================================================
-- Journals
-- ============================================================================

CREATE TABLE journals (
    id BIGSERIAL PRIMARY KEY,
    transaction_id BIGINT NOT NULL UNIQUE REFERENCES transactions(id),
    building_id BIGINT NOT NULL,
    unit_id BIGINT,
    date DATE NOT NULL,
    reference_number VARCHAR(50) NOT NULL,
    memo TEXT,
    total_amount_cents BIGINT NOT NULL,
    total_cents BIGINT NOT NULL,
    status CHAR(1) NOT NULL DEFAULT '1' CHECK (status IN ('0', '1')),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_journals_building ON journals(building_id);

CREATE TABLE journal_lines (
    id BIGSERIAL PRIMARY KEY,
    journal_id BIGINT NOT NULL REFERENCES journals(id) ON DELETE CASCADE,
    position INT NOT NULL,
    account_id BIGINT NOT NULL REFERENCES accounts(id),
    debit_cents BIGINT,
    credit_cents BIGINT,
    description TEXT,
    unit_id BIGINT,
    person_id BIGINT REFERENCES people(id)
);

CREATE INDEX idx_journal_lines_journal ON journal_lines(journal_id, position);

-- ============================================================================
-- Settlements and credit memos
-- ============================================================================

CREATE TABLE invoice_payments (
    id BIGSERIAL PRIMARY KEY,
    transaction_id BIGINT NOT NULL UNIQUE REFERENCES transactions(id),
    building_id BIGINT NOT NULL,
    invoice_id BIGINT NOT NULL REFERENCES invoices(id),
    asset_account_id BIGINT NOT NULL REFERENCES accounts(id),
    date DATE NOT NULL,
    reference_number VARCHAR(50) NOT NULL,
    memo TEXT,
    amount_cents BIGINT NOT NULL,
    status CHAR(1) NOT NULL DEFAULT '1' CHECK (status IN ('0', '1')),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_invoice_payments_invoice ON invoice_payments(invoice_id);

CREATE TABLE bill_payments (
    id BIGSERIAL PRIMARY KEY,
    transaction_id BIGINT NOT NULL UNIQUE REFERENCES transactions(id),
    building_id BIGINT NOT NULL,
    bill_id BIGINT NOT NULL REFERENCES bills(id),
    asset_account_id BIGINT NOT NULL REFERENCES accounts(id),
    date DATE NOT NULL,
    reference_number VARCHAR(50) NOT NULL,
    memo TEXT,
    amount_cents BIGINT NOT NULL,
    status CHAR(1) NOT NULL DEFAULT '1' CHECK (status IN ('0', '1')),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_bill_payments_bill ON bill_payments(bill_id);

CREATE TABLE credit_memos (
    id BIGSERIAL PRIMARY KEY,
    transaction_id BIGINT NOT NULL UNIQUE REFERENCES transactions(id),
    building_id BIGINT NOT NULL,
    customer_id BIGINT NOT NULL REFERENCES people(id),
    unit_id BIGINT,
    liability_account_id BIGINT NOT NULL REFERENCES accounts(id),
    deposit_account_id BIGINT NOT NULL REFERENCES accounts(id),
    date DATE NOT NULL,
    reference_number VARCHAR(50) NOT NULL,
    memo TEXT,
    amount_cents BIGINT NOT NULL,
    status CHAR(1) NOT NULL DEFAULT '1' CHECK (status IN ('0', '1')),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_credit_memos_customer ON credit_memos(building_id, customer_id);

CREATE TABLE invoice_applied_credits (
    id BIGSERIAL PRIMARY KEY,
    building_id BIGINT NOT NULL,
    invoice_id BIGINT NOT NULL REFERENCES invoices(id),
    credit_memo_id BIGINT NOT NULL REFERENCES credit_memos(id),
    amount_cents BIGINT NOT NULL CHECK (amount_cents > 0),
    date DATE NOT NULL,
    description TEXT,
    status CHAR(1) NOT NULL DEFAULT '1' CHECK (status IN ('0', '1')),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_applied_credits_invoice ON invoice_applied_credits(invoice_id);
CREATE INDEX idx_applied_credits_memo ON invoice_applied_credits(credit_memo_id) WHERE status = '1';
";
