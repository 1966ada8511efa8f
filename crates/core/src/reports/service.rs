//! Report generation service.

use chrono::NaiveDate;
use rentledger_shared::types::{BuildingId, Cents};
use tracing::debug;

use crate::context::RequestContext;
use crate::ledger::{AccountNature, LedgerResult, NormalSide};
use crate::store::{Scope, Store, with_scope};

use super::types::{
    AccountTotals, BalanceSheetReport, BalanceSheetRow, BalanceSheetSection, CustomerBalanceRow,
    CustomerBalanceSummary, CustomerTotals, TrialBalanceReport, TrialBalanceRow,
    TrialBalanceTotal,
};

/// Name of the synthetic equity row carrying net income.
pub const NET_INCOME_ROW: &str = "Net Income";

/// Builds reports from store aggregates. Pure.
pub struct ReportService;

impl ReportService {
    /// Generates a trial balance from per-account totals.
    ///
    /// Each account shows its balance on the side matching its sign; accounts
    /// with a zero balance are omitted.
    #[must_use]
    pub fn trial_balance(as_of_date: NaiveDate, accounts: Vec<AccountTotals>) -> TrialBalanceReport {
        let mut rows = Vec::with_capacity(accounts.len());
        let mut total = TrialBalanceTotal {
            debit_balance: Cents::ZERO,
            credit_balance: Cents::ZERO,
        };

        for AccountTotals { account, totals } in accounts {
            let balance = totals.balance(account.normal_side);
            if balance.is_zero() {
                continue;
            }
            let on_debit_side = match account.normal_side {
                NormalSide::Debit => balance.is_positive(),
                NormalSide::Credit => balance.is_negative(),
            };
            let (debit_balance, credit_balance) = if on_debit_side {
                (balance.abs(), Cents::ZERO)
            } else {
                (Cents::ZERO, balance.abs())
            };
            total.debit_balance += debit_balance;
            total.credit_balance += credit_balance;
            rows.push(TrialBalanceRow {
                account_id: account.id,
                number: account.number,
                name: account.name,
                nature: account.nature,
                debit_balance,
                credit_balance,
            });
        }

        TrialBalanceReport {
            as_of_date,
            rows,
            is_balanced: total.debit_balance == total.credit_balance,
            total,
        }
    }

    /// Generates a balance sheet from per-account totals.
    ///
    /// Net income (income minus expense) is folded into equity as a
    /// synthetic row when nonzero.
    #[must_use]
    pub fn balance_sheet(as_of_date: NaiveDate, accounts: Vec<AccountTotals>) -> BalanceSheetReport {
        let mut assets = BalanceSheetSection::default();
        let mut liabilities = BalanceSheetSection::default();
        let mut equity = BalanceSheetSection::default();
        let mut income = BalanceSheetSection::default();
        let mut expense = BalanceSheetSection::default();

        for AccountTotals { account, totals } in accounts {
            let balance = totals.balance(account.normal_side);
            if balance.is_zero() {
                continue;
            }
            let section = match account.nature {
                AccountNature::Asset => &mut assets,
                AccountNature::Liability => &mut liabilities,
                AccountNature::Equity => &mut equity,
                AccountNature::Income => &mut income,
                AccountNature::Expense => &mut expense,
            };
            section.push(BalanceSheetRow {
                account_id: Some(account.id),
                number: Some(account.number),
                name: account.name,
                balance,
            });
        }

        let net_income = income.total - expense.total;
        if !net_income.is_zero() {
            equity.push(BalanceSheetRow {
                account_id: None,
                number: None,
                name: NET_INCOME_ROW.to_string(),
                balance: net_income,
            });
        }

        let total_assets = assets.total;
        let total_liabilities = liabilities.total;
        let total_equity = equity.total;
        let liabilities_and_equity = total_liabilities + total_equity;

        BalanceSheetReport {
            as_of_date,
            assets,
            liabilities,
            equity,
            income,
            expense,
            net_income,
            total_assets,
            total_liabilities,
            total_equity,
            liabilities_and_equity,
            is_balanced: total_assets == liabilities_and_equity,
        }
    }

    /// Generates the customer balance summary from receivable totals.
    /// Receivables are debit-normal; customers with a zero balance are omitted.
    #[must_use]
    pub fn customer_balance_summary(
        as_of_date: NaiveDate,
        customers: Vec<CustomerTotals>,
    ) -> CustomerBalanceSummary {
        let rows: Vec<CustomerBalanceRow> = customers
            .into_iter()
            .filter_map(|c| {
                let balance = c.totals.balance(NormalSide::Debit);
                (!balance.is_zero()).then_some(CustomerBalanceRow {
                    person_id: c.person_id,
                    name: c.name,
                    balance,
                })
            })
            .collect();
        let total = rows.iter().map(|r| r.balance).sum();

        CustomerBalanceSummary {
            as_of_date,
            rows,
            total,
        }
    }
}

/// Runs report queries against a [`Store`] and shapes the results.
#[derive(Debug, Clone)]
pub struct ReportEngine<S> {
    store: S,
}

impl<S: Store> ReportEngine<S> {
    /// Wraps a store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Trial balance of a building as of a date, inclusive.
    ///
    /// # Errors
    ///
    /// Store errors only.
    pub async fn trial_balance(
        &self,
        ctx: &RequestContext,
        building_id: BuildingId,
        as_of_date: NaiveDate,
    ) -> LedgerResult<TrialBalanceReport> {
        let accounts = with_scope!(self.store, ctx, |scope| {
            scope.account_totals(building_id, as_of_date).await
        })?;
        let report = ReportService::trial_balance(as_of_date, accounts);
        debug!(
            building_id = %building_id,
            %as_of_date,
            rows = report.rows.len(),
            is_balanced = report.is_balanced,
            "trial balance generated"
        );
        Ok(report)
    }

    /// Balance sheet of a building as of a date, inclusive.
    ///
    /// # Errors
    ///
    /// Store errors only.
    pub async fn balance_sheet(
        &self,
        ctx: &RequestContext,
        building_id: BuildingId,
        as_of_date: NaiveDate,
    ) -> LedgerResult<BalanceSheetReport> {
        let accounts = with_scope!(self.store, ctx, |scope| {
            scope.account_totals(building_id, as_of_date).await
        })?;
        let report = ReportService::balance_sheet(as_of_date, accounts);
        debug!(
            building_id = %building_id,
            %as_of_date,
            net_income = %report.net_income,
            is_balanced = report.is_balanced,
            "balance sheet generated"
        );
        Ok(report)
    }

    /// Receivable balance per customer as of a date, inclusive.
    ///
    /// # Errors
    ///
    /// Store errors only.
    pub async fn customer_balance_summary(
        &self,
        ctx: &RequestContext,
        building_id: BuildingId,
        as_of_date: NaiveDate,
    ) -> LedgerResult<CustomerBalanceSummary> {
        let customers = with_scope!(self.store, ctx, |scope| {
            scope.receivable_totals(building_id, as_of_date).await
        })?;
        Ok(ReportService::customer_balance_summary(as_of_date, customers))
    }
}
