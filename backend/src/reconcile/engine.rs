//! Reconcile Engine
//!
//! Applies a whole-list submission against the persisted list inside one
//! store transaction, writing only records whose fields changed.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::diff::{item_changes, list_changes, resolve_ranks, tier_changes, ItemPlacement, ListPatch};
use crate::domain::ownership::authorize;
use crate::domain::{
    Deletions, DomainError, DomainResult, EntityKind, Fields, ItemId, ListDraft, ListId, ListSubmission,
    SubmittedTier, Tier, TierId, TierItem, TierList, UserId,
};
use crate::repository::{find, insert, load_tier_list, RecordStore, RecordTransaction};

/// Server id assigned to a record the client submitted under `client_key`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAssignment<Id> {
    pub client_key: u64,
    pub id: Id,
}

/// Writes issued by one save
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteStats {
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
}

impl WriteStats {
    pub fn total(&self) -> usize {
        self.creates + self.updates + self.deletes
    }
}

impl fmt::Display for WriteStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} created, {} updated, {} deleted", self.creates, self.updates, self.deletes)
    }
}

/// Result of a successful save or create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOutcome {
    /// The list as re-read from the store
    pub list: TierList,
    pub assigned_tiers: Vec<KeyAssignment<TierId>>,
    pub assigned_items: Vec<KeyAssignment<ItemId>>,
    pub writes: WriteStats,
}

/// Store writes for one transaction, counted as they are issued
struct Writer<'t, X: ?Sized> {
    tx: &'t mut X,
    stats: WriteStats,
    assigned_tiers: Vec<KeyAssignment<TierId>>,
    assigned_items: Vec<KeyAssignment<ItemId>>,
}

impl<'t, X: RecordTransaction + ?Sized> Writer<'t, X> {
    fn new(tx: &'t mut X) -> Self {
        Self {
            tx,
            stats: WriteStats::default(),
            assigned_tiers: Vec::new(),
            assigned_items: Vec::new(),
        }
    }

    async fn update(&mut self, kind: EntityKind, id: i64, fields: Fields) -> DomainResult<()> {
        if fields.is_empty() {
            return Ok(());
        }
        self.tx.update(kind, id, fields).await?;
        self.stats.updates += 1;
        Ok(())
    }

    async fn delete(&mut self, kind: EntityKind, id: i64) -> DomainResult<()> {
        self.tx.delete(kind, id).await?;
        self.stats.deletes += 1;
        Ok(())
    }

    async fn create_tier(&mut self, tier: &Tier, client_key: Option<u64>) -> DomainResult<TierId> {
        let id = insert(&mut *self.tx, tier).await?;
        self.stats.creates += 1;
        if let Some(client_key) = client_key {
            self.assigned_tiers.push(KeyAssignment { client_key, id });
        }
        Ok(id)
    }

    async fn create_item(&mut self, item: &TierItem, client_key: Option<u64>) -> DomainResult<ItemId> {
        let id = insert(&mut *self.tx, item).await?;
        self.stats.creates += 1;
        if let Some(client_key) = client_key {
            self.assigned_items.push(KeyAssignment { client_key, id });
        }
        Ok(id)
    }

    /// Upsert tiers and their items in submission order, attaching them to `list_id`
    async fn upsert_tiers(
        &mut self,
        list_id: ListId,
        stored: Option<&TierList>,
        tiers: &[SubmittedTier],
    ) -> DomainResult<()> {
        let ranks = resolve_ranks(&tiers.iter().map(|t| t.order).collect::<Vec<_>>())?;

        for (submitted, rank) in tiers.iter().zip(ranks) {
            let persisted = submitted.id.and_then(|id| stored.and_then(|s| s.tier(id)));
            let tier_id = match persisted {
                Some(existing) => {
                    let changes = tier_changes(existing, &submitted.label, &submitted.color, rank);
                    self.update(EntityKind::Tier, existing.id.get(), changes).await?;
                    existing.id
                }
                None => {
                    let tier = Tier {
                        id: TierId(0),
                        tier_list_id: list_id,
                        label: submitted.label.clone(),
                        color: submitted.color.clone(),
                        order: rank,
                        items: Vec::new(),
                    };
                    self.create_tier(&tier, submitted.client_key).await?
                }
            };

            for (position, submitted_item) in submitted.items.iter().enumerate() {
                let placement = ItemPlacement {
                    tier_id,
                    position: position as i64,
                    name: &submitted_item.name,
                    image_ref: &submitted_item.image_ref,
                };
                let persisted = submitted_item.id.and_then(|id| stored.and_then(|s| s.item(id)));
                match persisted {
                    Some(existing) => {
                        let changes = item_changes(existing, placement);
                        self.update(EntityKind::TierItem, existing.id.get(), changes).await?;
                    }
                    None => {
                        let item = TierItem {
                            id: ItemId(0),
                            tier_id,
                            name: submitted_item.name.clone(),
                            image_ref: submitted_item.image_ref.clone(),
                            position: position as i64,
                        };
                        self.create_item(&item, submitted_item.client_key).await?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Re-read the list through the same transaction and package the result
    async fn finish(mut self, list_id: ListId) -> DomainResult<SaveOutcome> {
        let list = load_tier_list(&mut *self.tx, list_id)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::TierList, list_id))?;
        Ok(SaveOutcome {
            list,
            assigned_tiers: self.assigned_tiers,
            assigned_items: self.assigned_items,
            writes: self.stats,
        })
    }
}

/// Every persisted id the client references must belong to the stored list
fn check_references(stored: &TierList, submission: &ListSubmission, deletions: &Deletions) -> DomainResult<()> {
    let submitted_tiers = submission.tiers.iter().filter_map(|t| t.id);
    for id in submitted_tiers.chain(deletions.tier_ids.iter().copied()) {
        if stored.tier(id).is_none() {
            return Err(DomainError::not_found(EntityKind::Tier, id));
        }
    }
    let submitted_items = submission.submitted_items().filter_map(|i| i.id);
    for id in submitted_items.chain(deletions.item_ids.iter().copied()) {
        if stored.item(id).is_none() {
            return Err(DomainError::not_found(EntityKind::TierItem, id));
        }
    }
    Ok(())
}

/// Save, create and delete entry points over a record store
pub struct ReconcileEngine<'s> {
    store: &'s dyn RecordStore,
}

impl<'s> ReconcileEngine<'s> {
    pub fn new(store: &'s dyn RecordStore) -> Self {
        Self { store }
    }

    /// Reconcile an edited list against its persisted state
    pub async fn save_list(
        &self,
        actor: UserId,
        submission: &ListSubmission,
        deletions: &Deletions,
    ) -> DomainResult<SaveOutcome> {
        submission.validate(deletions)?;
        if let Err(e) = authorize(actor, submission.owner_id).into_result() {
            log::warn!("[Reconcile] user {} denied save of list {}", actor, submission.id);
            return Err(e);
        }

        let outcome = self.apply_save(actor, submission, deletions).await;
        match &outcome {
            Ok(saved) => log::info!(
                "[Reconcile] saved list {} for user {}: {}",
                saved.list.id,
                actor,
                saved.writes
            ),
            Err(e) if e.is_conflict_or_storage() => {
                log::error!("[Reconcile] save of list {} failed, nothing written: {}", submission.id, e)
            }
            Err(_) => {}
        }
        outcome
    }

    async fn apply_save(
        &self,
        actor: UserId,
        submission: &ListSubmission,
        deletions: &Deletions,
    ) -> DomainResult<SaveOutcome> {
        let mut tx = self.store.begin().await?;
        let stored = load_tier_list(&mut *tx, submission.id)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::TierList, submission.id))?;
        if let Err(e) = authorize(actor, stored.owner_id).into_result() {
            log::warn!("[Reconcile] user {} denied save of list {} owned by {}", actor, stored.id, stored.owner_id);
            return Err(e);
        }
        check_references(&stored, submission, deletions)?;

        let mut writer = Writer::new(&mut *tx);

        let patch = ListPatch {
            title: &submission.title,
            description: submission.description.as_deref(),
            visibility: submission.visibility,
        };
        writer
            .update(EntityKind::TierList, stored.id.get(), list_changes(&stored, patch))
            .await?;

        // Item deletions first, so no later placement can land next to a removed row
        for id in &deletions.item_ids {
            writer.delete(EntityKind::TierItem, id.get()).await?;
        }

        writer.upsert_tiers(stored.id, Some(&stored), &submission.tiers).await?;

        // Tier deletions last: items moved out above survive, the rest cascade
        for id in &deletions.tier_ids {
            writer.delete(EntityKind::Tier, id.get()).await?;
        }

        let outcome = writer.finish(stored.id).await?;
        tx.commit().await?;
        Ok(outcome)
    }

    /// Create a list owned by `actor` from a draft
    pub async fn create_list(&self, actor: UserId, draft: &ListDraft) -> DomainResult<SaveOutcome> {
        draft.validate()?;

        let mut tx = self.store.begin().await?;
        let list = TierList {
            id: ListId(0),
            title: draft.title.clone(),
            description: draft.description.clone(),
            visibility: draft.visibility,
            owner_id: actor,
            created_at: chrono::Utc::now().timestamp_millis(),
            tiers: Vec::new(),
        };

        let mut writer = Writer::new(&mut *tx);
        let list_id = insert(&mut *writer.tx, &list).await?;
        writer.stats.creates += 1;
        writer.upsert_tiers(list_id, None, &draft.tiers).await?;

        let outcome = writer.finish(list_id).await?;
        tx.commit().await?;

        log::info!("[Reconcile] created list {} for user {}: {}", list_id, actor, outcome.writes);
        Ok(outcome)
    }

    /// Delete a list with all its tiers and items
    pub async fn delete_list(&self, actor: UserId, id: ListId) -> DomainResult<()> {
        let mut tx = self.store.begin().await?;
        let stored: TierList = find(&mut *tx, id)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::TierList, id))?;
        if let Err(e) = authorize(actor, stored.owner_id).into_result() {
            log::warn!("[Reconcile] user {} denied delete of list {}", actor, id);
            return Err(e);
        }

        tx.delete(EntityKind::TierList, id.get()).await?;
        tx.commit().await?;
        log::info!("[Reconcile] deleted list {} for user {}", id, actor);
        Ok(())
    }
}
