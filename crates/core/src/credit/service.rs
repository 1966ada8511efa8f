//! Credit application service.

use rentledger_shared::types::{AppliedCreditId, BuildingId, Cents, DocumentId};
use tracing::info;

use crate::context::RequestContext;
use crate::ledger::{LedgerError, LedgerResult, Status};
use crate::posting::service::load;
use crate::posting::{InvoicePoster, require_positive};
use crate::store::{Scope, Store, with_scope};

use super::applied_sum;
use super::types::{AppliedCredit, ApplyCredit, AvailableCredit, InvoiceBalance, NewAppliedCredit};

/// Applies credit memos to invoices and reports what is left.
#[derive(Debug, Clone)]
pub struct CreditService<S> {
    store: S,
}

impl<S: Store> CreditService<S> {
    /// Wraps a store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Active memos of the invoice's customer that still have credit left,
    /// oldest first.
    ///
    /// # Errors
    ///
    /// `not_found` when the invoice does not exist in `building_id`.
    pub async fn available_credits_for_invoice(
        &self,
        ctx: &RequestContext,
        building_id: BuildingId,
        invoice_id: DocumentId,
    ) -> LedgerResult<Vec<AvailableCredit>> {
        with_scope!(self.store, ctx, |scope| {
            let invoice = load::<InvoicePoster, _>(&mut scope, building_id, invoice_id).await?;
            let memos = scope
                .credit_memos_for_customer(building_id, invoice.body.customer_id)
                .await?;

            let mut available = Vec::new();
            for memo in memos.into_iter().filter(|m| m.status.is_active()) {
                let applied = applied_sum(&mut scope, memo.id).await?;
                let left = memo.body.amount - applied;
                if left.is_positive() {
                    available.push(AvailableCredit {
                        credit_memo_id: memo.id,
                        reference_number: memo.body.reference_number,
                        date: memo.body.date,
                        memo_amount: memo.body.amount,
                        applied_sum: applied,
                        available: left,
                    });
                }
            }
            available.sort_by_key(|c| (c.date, c.credit_memo_id));
            Ok(available)
        })
    }

    /// Applies part of a credit memo to an invoice.
    ///
    /// The memo row is locked for the rest of the scope so two concurrent
    /// applications cannot both see the same available amount.
    ///
    /// # Errors
    ///
    /// - `invalid_amount` if the amount is not positive
    /// - `not_found` if the invoice or memo does not exist in `building_id`
    /// - `invalid_payload` if either document is void
    /// - `customer_mismatch` if the memo belongs to another customer
    /// - `exceeds_available` if the memo has less credit left than requested
    pub async fn apply_credit(
        &self,
        ctx: &RequestContext,
        building_id: BuildingId,
        invoice_id: DocumentId,
        request: ApplyCredit,
    ) -> LedgerResult<AppliedCredit> {
        require_positive("amount", request.amount)?;

        let applied = with_scope!(self.store, ctx, |scope| {
            let invoice = load::<InvoicePoster, _>(&mut scope, building_id, invoice_id).await?;
            if !invoice.status.is_active() {
                return Err(LedgerError::invalid_payload(
                    "invoice_id",
                    format!("invoice {invoice_id} is void"),
                ));
            }

            let memo_id = request.credit_memo_id;
            let memo = scope
                .lock_credit_memo(memo_id)
                .await?
                .filter(|m| m.body.building_id == building_id)
                .ok_or_else(|| LedgerError::not_found("credit memo", memo_id))?;
            if !memo.status.is_active() {
                return Err(LedgerError::invalid_payload(
                    "credit_memo_id",
                    format!("credit memo {memo_id} is void"),
                ));
            }
            if memo.body.customer_id != invoice.body.customer_id {
                return Err(LedgerError::CustomerMismatch {
                    memo_id,
                    memo_customer: memo.body.customer_id,
                    invoice_id,
                    invoice_customer: invoice.body.customer_id,
                });
            }

            let available = memo.body.amount - applied_sum(&mut scope, memo_id).await?;
            if request.amount > available {
                return Err(LedgerError::ExceedsAvailable {
                    memo_id,
                    requested: request.amount,
                    available,
                });
            }

            scope
                .create_applied_credit(NewAppliedCredit {
                    building_id,
                    invoice_id,
                    credit_memo_id: memo_id,
                    amount: request.amount,
                    date: request.date,
                    description: request.description,
                })
                .await
        })?;

        info!(
            applied_credit_id = %applied.id,
            invoice_id = %applied.invoice_id,
            credit_memo_id = %applied.credit_memo_id,
            amount = %applied.amount,
            "credit applied"
        );
        Ok(applied)
    }

    /// Every application against an invoice, void ones included, in id order.
    ///
    /// # Errors
    ///
    /// `not_found` when the invoice does not exist in `building_id`.
    pub async fn applied_credits(
        &self,
        ctx: &RequestContext,
        building_id: BuildingId,
        invoice_id: DocumentId,
    ) -> LedgerResult<Vec<AppliedCredit>> {
        let mut credits = with_scope!(self.store, ctx, |scope| {
            load::<InvoicePoster, _>(&mut scope, building_id, invoice_id).await?;
            scope.applied_credits_for_invoice(invoice_id).await
        })?;
        credits.sort_by_key(|c| c.id);
        Ok(credits)
    }

    /// Voids an application, releasing its amount back to the memo. Voiding
    /// a void application changes nothing.
    ///
    /// # Errors
    ///
    /// `not_found` when the application does not exist in `building_id`.
    pub async fn void_applied_credit(
        &self,
        ctx: &RequestContext,
        building_id: BuildingId,
        id: AppliedCreditId,
    ) -> LedgerResult<AppliedCredit> {
        with_scope!(self.store, ctx, |scope| {
            let mut credit = scope
                .applied_credit(id)
                .await?
                .filter(|c| c.building_id == building_id)
                .ok_or_else(|| LedgerError::not_found("applied credit", id))?;
            if credit.status.is_active() {
                scope.lock_credit_memo(credit.credit_memo_id).await?;
                scope.void_applied_credit(id).await?;
                credit.status = Status::Void;
                info!(applied_credit_id = %id, amount = %credit.amount, "applied credit voided");
            }
            Ok(credit)
        })
    }

    /// Invoice total against active payments and active applied credits.
    ///
    /// # Errors
    ///
    /// `not_found` when the invoice does not exist in `building_id`.
    pub async fn invoice_balance(
        &self,
        ctx: &RequestContext,
        building_id: BuildingId,
        invoice_id: DocumentId,
    ) -> LedgerResult<InvoiceBalance> {
        with_scope!(self.store, ctx, |scope| {
            let invoice = load::<InvoicePoster, _>(&mut scope, building_id, invoice_id).await?;
            let payments: Cents = scope
                .payments_for_invoice(invoice_id)
                .await?
                .iter()
                .filter(|p| p.status.is_active())
                .map(|p| p.total)
                .sum();
            let credits: Cents = scope
                .applied_credits_for_invoice(invoice_id)
                .await?
                .iter()
                .filter(|c| c.status.is_active())
                .map(|c| c.amount)
                .sum();
            Ok(InvoiceBalance {
                invoice_id,
                total: invoice.total,
                payments,
                credits,
                outstanding: invoice.total - payments - credits,
            })
        })
    }
}
