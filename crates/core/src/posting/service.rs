//! Create, update, get, list, and void orchestration shared by every
//! document kind.
//!
//! All writes of one call happen inside a single [`with_scope!`] block:
//! header first, then splits, then the document row with its lines. Any
//! error rolls the whole scope back.

use rentledger_shared::types::{BuildingId, DocumentId, TransactionId};
use tracing::{debug, info};

use crate::context::RequestContext;
use crate::ledger::{LedgerError, LedgerResult, NewTransaction, Split, SplitSet, Status};
use crate::store::{Scope, Store, with_scope};

use super::{Document, DocumentPoster, Posted, Record, resolve};

/// Posting orchestrator over a [`Store`].
#[derive(Debug, Clone)]
pub struct PostingService<S> {
    store: S,
}

impl<S: Store> PostingService<S> {
    /// Wraps a store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Posts a new document.
    ///
    /// # Errors
    ///
    /// Returns the first validation, lookup, balance, or store error. Nothing
    /// is written when an error is returned.
    pub async fn create<P: DocumentPoster>(
        &self,
        ctx: &RequestContext,
        payload: P::Payload,
    ) -> LedgerResult<Posted<P::Payload>> {
        P::validate(&payload)?;
        let header = P::header(&payload);
        let building_id = header.building_id;
        let new_tx = NewTransaction {
            kind: P::KIND,
            header,
            user_id: ctx.principal().user_id,
        };

        let posted = with_scope!(self.store, ctx, |scope| {
            let lookup = resolve(&mut scope, building_id, P::references(&payload)).await?;
            let posting = P::generate_splits(&payload, &lookup)?;
            posting.splits.ensure_balanced()?;

            let transaction = scope.create_transaction(new_tx).await?;
            let splits = write_splits(&mut scope, &posting.splits, transaction.id).await?;

            let record = Record {
                id: DocumentId::new(0),
                transaction_id: transaction.id,
                status: Status::Active,
                total: posting.total,
                body: payload,
            };
            let stored = scope.insert_document(P::into_document(record)).await?;
            let record = unwrap_document::<P>(stored)?;
            Ok(Posted {
                record,
                transaction,
                splits,
            })
        })?;

        info!(
            kind = %P::KIND,
            document_id = %posted.record.id,
            transaction_id = %posted.transaction.id,
            total = %posted.record.total,
            splits = posted.splits.len(),
            "document posted"
        );
        Ok(posted)
    }

    /// Replaces a document's payload, voiding its prior splits and writing
    /// a fresh set.
    ///
    /// # Errors
    ///
    /// `not_found` when the document does not exist in `building_id`,
    /// `invalid_payload` when it is void, plus every error [`Self::create`]
    /// can return.
    pub async fn update<P: DocumentPoster>(
        &self,
        ctx: &RequestContext,
        building_id: BuildingId,
        id: DocumentId,
        payload: P::Payload,
    ) -> LedgerResult<Posted<P::Payload>> {
        P::validate(&payload)?;
        let header = P::header(&payload);
        if header.building_id != building_id {
            return Err(LedgerError::invalid_payload(
                "building_id",
                format!("payload building {} does not match {building_id}", header.building_id),
            ));
        }
        let new_tx = NewTransaction {
            kind: P::KIND,
            header,
            user_id: ctx.principal().user_id,
        };

        let (posted, voided) = with_scope!(self.store, ctx, |scope| {
            let previous = load::<P, _>(&mut scope, building_id, id).await?;
            if !previous.status.is_active() {
                return Err(LedgerError::invalid_payload(
                    "status",
                    format!("{} {id} is void", P::KIND),
                ));
            }
            P::before_update(&mut scope, &previous, &payload).await?;

            let lookup = resolve(&mut scope, building_id, P::references(&payload)).await?;
            let posting = P::generate_splits(&payload, &lookup)?;
            posting.splits.ensure_balanced()?;

            let transaction = scope
                .update_transaction(previous.transaction_id, new_tx)
                .await?;
            let voided = scope.void_splits(transaction.id).await?;
            write_splits(&mut scope, &posting.splits, transaction.id).await?;

            let record = Record {
                id: previous.id,
                transaction_id: transaction.id,
                status: Status::Active,
                total: posting.total,
                body: payload,
            };
            let stored = scope.update_document(P::into_document(record)).await?;
            let record = unwrap_document::<P>(stored)?;
            let splits = scope.splits(transaction.id).await?;
            Ok((
                Posted {
                    record,
                    transaction,
                    splits,
                },
                voided,
            ))
        })?;

        info!(
            kind = %P::KIND,
            document_id = %posted.record.id,
            transaction_id = %posted.transaction.id,
            total = %posted.record.total,
            voided_splits = voided,
            "document updated"
        );
        Ok(posted)
    }

    /// A document with its transaction and every split.
    ///
    /// # Errors
    ///
    /// `not_found` when the document does not exist in `building_id`.
    pub async fn get<P: DocumentPoster>(
        &self,
        ctx: &RequestContext,
        building_id: BuildingId,
        id: DocumentId,
    ) -> LedgerResult<Posted<P::Payload>> {
        with_scope!(self.store, ctx, |scope| {
            let record = load::<P, _>(&mut scope, building_id, id).await?;
            let transaction = scope
                .transaction(record.transaction_id)
                .await?
                .ok_or_else(|| LedgerError::not_found("transaction", record.transaction_id))?;
            let splits = scope.splits(record.transaction_id).await?;
            Ok(Posted {
                record,
                transaction,
                splits,
            })
        })
    }

    /// Every document of the kind in a building, in id order.
    ///
    /// # Errors
    ///
    /// Store errors only.
    pub async fn list<P: DocumentPoster>(
        &self,
        ctx: &RequestContext,
        building_id: BuildingId,
    ) -> LedgerResult<Vec<Record<P::Payload>>> {
        let documents = with_scope!(self.store, ctx, |scope| {
            scope.documents(P::KIND, building_id).await
        })?;
        let mut records: Vec<_> = documents.into_iter().filter_map(P::from_document).collect();
        records.sort_by_key(|r| r.id);
        Ok(records)
    }

    /// Voids a document: its transaction, all its splits, and its row.
    /// Voiding a void document changes nothing.
    ///
    /// # Errors
    ///
    /// `not_found` when the document does not exist in `building_id`, plus
    /// whatever the kind's void check rejects.
    pub async fn void<P: DocumentPoster>(
        &self,
        ctx: &RequestContext,
        building_id: BuildingId,
        id: DocumentId,
    ) -> LedgerResult<Record<P::Payload>> {
        let (record, voided) = with_scope!(self.store, ctx, |scope| {
            let mut record = load::<P, _>(&mut scope, building_id, id).await?;
            if !record.status.is_active() {
                return Ok((record, None));
            }
            P::before_void(&mut scope, &record).await?;

            scope.void_transaction(record.transaction_id).await?;
            let voided = scope.void_splits(record.transaction_id).await?;
            record.status = Status::Void;
            let stored = scope.update_document(P::into_document(record)).await?;
            Ok((unwrap_document::<P>(stored)?, Some(voided)))
        })?;

        match voided {
            Some(splits) => info!(
                kind = %P::KIND,
                document_id = %record.id,
                transaction_id = %record.transaction_id,
                voided_splits = splits,
                "document voided"
            ),
            None => debug!(kind = %P::KIND, document_id = %record.id, "document already void"),
        }
        Ok(record)
    }
}

/// Loads a document of kind `P` that belongs to `building_id`.
pub(crate) async fn load<P: DocumentPoster, Sc: Scope>(
    scope: &mut Sc,
    building_id: BuildingId,
    id: DocumentId,
) -> LedgerResult<Record<P::Payload>> {
    scope
        .document(P::KIND, id)
        .await?
        .filter(|doc| doc.building_id() == building_id)
        .and_then(P::from_document)
        .ok_or_else(|| LedgerError::not_found(P::KIND.as_str(), id))
}

async fn write_splits<Sc: Scope>(
    scope: &mut Sc,
    set: &SplitSet,
    transaction_id: TransactionId,
) -> LedgerResult<Vec<Split>> {
    let mut written = Vec::with_capacity(set.len());
    for split in set.bind(transaction_id) {
        written.push(scope.create_split(split).await?);
    }
    Ok(written)
}

fn unwrap_document<P: DocumentPoster>(document: Document) -> LedgerResult<Record<P::Payload>> {
    let kind = document.kind();
    P::from_document(document).ok_or_else(|| {
        LedgerError::Internal(format!("store returned a {kind} row for a {}", P::KIND))
    })
}
