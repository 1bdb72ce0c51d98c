//! List Model
//!
//! The client-side aggregate of one tier list: its tiers, the unsorted pool
//! and the cards inside them. Card membership only changes through
//! [`ListModel::move_item`] and the card/tier operations below, each of
//! which moves an owned [`Card`] between containers, so a card is always in
//! exactly one place.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tier_dragdrop::Origin;

use crate::error::{EditError, EditResult};
use crate::models::{
    Deletions, ListDraft, ListSubmission, SaveOutcome, SaveRequest, SubmittedItem, SubmittedTier, TierList,
    Visibility,
};
use crate::ordered::{Keyed, OrderedContainer};
use crate::palette::color_by_index;

/// Label given to tiers added without one
pub const DEFAULT_TIER_LABEL: &str = "Change me";

/// Tiers a brand-new list starts with
pub const DEFAULT_TIERS: [&str; 5] = ["S", "A", "B", "C", "D"];

/// Client-local card handle, stable across saves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardKey(pub u64);

/// Client-local tier handle, stable across saves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TierKey(pub u64);

/// A tier, or the unsorted pool that is never persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerId {
    Unsorted,
    Tier(TierKey),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub key: CardKey,
    /// Set once the server has stored the card
    pub server_id: Option<i64>,
    pub name: String,
    pub image_ref: String,
}

impl Keyed for Card {
    type Key = CardKey;

    fn key(&self) -> CardKey {
        self.key
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TierContainer {
    pub key: TierKey,
    pub server_id: Option<i64>,
    pub label: String,
    pub color: String,
    /// Rank among tiers; never decreases along the tier sequence
    pub order: i64,
    pub cards: OrderedContainer<Card>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierMove {
    Up,
    Down,
}

#[derive(Debug, Clone)]
pub struct ListModel {
    list_id: Option<i64>,
    owner_id: i64,
    title: String,
    description: Option<String>,
    visibility: Visibility,
    tiers: Vec<TierContainer>,
    unsorted: OrderedContainer<Card>,
    deleted_items: Vec<i64>,
    deleted_tiers: Vec<i64>,
    next_key: u64,
    revision: u64,
    saved_revision: u64,
}

impl ListModel {
    /// Unsaved list with the default tiers
    pub fn new(owner_id: i64, title: impl Into<String>) -> Self {
        let mut model = Self::empty(None, owner_id, title.into());
        for (i, label) in DEFAULT_TIERS.iter().enumerate() {
            let key = TierKey(model.alloc_key());
            model.tiers.push(TierContainer {
                key,
                server_id: None,
                label: label.to_string(),
                color: color_by_index(i).to_string(),
                order: i as i64,
                cards: OrderedContainer::new(),
            });
        }
        model
    }

    /// Model of a list as the server returned it
    pub fn from_server(list: &TierList) -> Self {
        let mut model = Self::empty(Some(list.id), list.owner_id, list.title.clone());
        model.description = list.description.clone();
        model.visibility = list.visibility;
        model.rebuild_tiers(list, &HashMap::new(), &HashMap::new());
        model
    }

    fn empty(list_id: Option<i64>, owner_id: i64, title: String) -> Self {
        Self {
            list_id,
            owner_id,
            title,
            description: None,
            visibility: Visibility::Private,
            tiers: Vec::new(),
            unsorted: OrderedContainer::new(),
            deleted_items: Vec::new(),
            deleted_tiers: Vec::new(),
            next_key: 1,
            revision: 0,
            saved_revision: 0,
        }
    }

    fn alloc_key(&mut self) -> u64 {
        let key = self.next_key;
        self.next_key += 1;
        key
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    // ========================
    // Queries
    // ========================

    pub fn list_id(&self) -> Option<i64> {
        self.list_id
    }

    pub fn owner_id(&self) -> i64 {
        self.owner_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn tiers(&self) -> &[TierContainer] {
        &self.tiers
    }

    pub fn tier(&self, key: TierKey) -> Option<&TierContainer> {
        self.tiers.iter().find(|t| t.key == key)
    }

    fn tier_index(&self, key: TierKey) -> EditResult<usize> {
        self.tiers
            .iter()
            .position(|t| t.key == key)
            .ok_or(EditError::UnknownContainer(ContainerId::Tier(key)))
    }

    pub fn unsorted(&self) -> &OrderedContainer<Card> {
        &self.unsorted
    }

    pub fn container(&self, id: ContainerId) -> Option<&OrderedContainer<Card>> {
        match id {
            ContainerId::Unsorted => Some(&self.unsorted),
            ContainerId::Tier(key) => self.tier(key).map(|t| &t.cards),
        }
    }

    fn container_mut(&mut self, id: ContainerId) -> Option<&mut OrderedContainer<Card>> {
        match id {
            ContainerId::Unsorted => Some(&mut self.unsorted),
            ContainerId::Tier(key) => self.tiers.iter_mut().find(|t| t.key == key).map(|t| &mut t.cards),
        }
    }

    fn containers(&self) -> impl Iterator<Item = (ContainerId, &OrderedContainer<Card>)> {
        std::iter::once((ContainerId::Unsorted, &self.unsorted))
            .chain(self.tiers.iter().map(|t| (ContainerId::Tier(t.key), &t.cards)))
    }

    /// Container currently holding `card`
    pub fn locate(&self, card: CardKey) -> Option<ContainerId> {
        self.containers().find(|(_, c)| c.contains(card)).map(|(id, _)| id)
    }

    pub fn card(&self, key: CardKey) -> Option<&Card> {
        self.containers().find_map(|(_, c)| c.get(key))
    }

    /// Where `card` sits, as recorded when a drag picks it up
    pub fn origin(&self, card: CardKey) -> Option<(ContainerId, Origin<CardKey>)> {
        self.containers().find_map(|(id, c)| {
            c.neighbours(card).map(|(prev, next)| (id, Origin { prev, next }))
        })
    }

    pub fn card_count(&self) -> usize {
        self.containers().map(|(_, c)| c.len()).sum()
    }

    /// Bumped by every change to the list
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Changed since it was loaded or last saved
    pub fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision || !self.deleted_items.is_empty() || !self.deleted_tiers.is_empty()
    }

    // ========================
    // List fields
    // ========================

    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        if title != self.title {
            self.title = title;
            self.touch();
        }
    }

    pub fn set_description(&mut self, description: Option<String>) {
        if description != self.description {
            self.description = description;
            self.touch();
        }
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        if visibility != self.visibility {
            self.visibility = visibility;
            self.touch();
        }
    }

    // ========================
    // Card movement
    // ========================

    /// Move `item` from `from` into `to`, next to `target` (or appended).
    ///
    /// The item is looked up in `from` only; if it is not there the call is
    /// logged and nothing changes. Moving into the unsorted pool always
    /// appends. If the insert cannot complete the item goes back to where it
    /// was.
    pub fn move_item(
        &mut self,
        item: CardKey,
        from: ContainerId,
        to: ContainerId,
        target: Option<CardKey>,
        before: bool,
    ) -> EditResult<()> {
        if target == Some(item) {
            log::debug!("[ListModel] {:?} dropped on itself", item);
            return Ok(());
        }
        if self.container(to).is_none() {
            log::warn!("[ListModel] move of {:?} into unknown {:?} ignored", item, to);
            return Err(EditError::UnknownContainer(to));
        }
        let Some(source) = self.container_mut(from) else {
            log::warn!("[ListModel] move of {:?} from unknown {:?} ignored", item, from);
            return Err(EditError::UnknownContainer(from));
        };
        let (Some(index), Some(card)) = (source.position(item), source.remove(item)) else {
            log::warn!("[ListModel] {:?} is not in {:?}, move ignored", item, from);
            return Err(EditError::UnknownItem(item));
        };

        let placed = match (to, self.container_mut(to)) {
            (ContainerId::Unsorted, Some(dest)) => {
                dest.push(card);
                Ok(())
            }
            (ContainerId::Tier(_), Some(dest)) => dest.insert(card, target, before),
            (_, None) => Err(card),
        };

        if let Err(card) = placed {
            log::warn!("[ListModel] {:?} not found in {:?}, {:?} restored", target, to, item);
            match self.container_mut(from) {
                Some(source) => source.insert_at(index, card),
                None => self.unsorted.push(card),
            }
            return Err(EditError::UnknownItem(target.unwrap_or(item)));
        }

        let unchanged = from == to && self.container(to).and_then(|c| c.position(item)) == Some(index);
        if !unchanged {
            log::debug!("[ListModel] moved {:?}: {:?} -> {:?}", item, from, to);
            self.touch();
        }
        Ok(())
    }

    // ========================
    // Card operations
    // ========================

    /// New card, placed in the unsorted pool
    pub fn add_card(&mut self, name: impl Into<String>, image_ref: impl Into<String>) -> EditResult<CardKey> {
        let image_ref = image_ref.into();
        if image_ref.trim().is_empty() {
            return Err(EditError::InvalidInput("a card needs an image".to_string()));
        }
        let key = CardKey(self.alloc_key());
        self.unsorted.push(Card {
            key,
            server_id: None,
            name: name.into(),
            image_ref,
        });
        self.touch();
        Ok(key)
    }

    pub fn rename_card(&mut self, key: CardKey, name: impl Into<String>) -> EditResult<()> {
        let container = self.locate(key).ok_or(EditError::UnknownItem(key))?;
        let card = self
            .container_mut(container)
            .and_then(|c| c.get_mut(key))
            .ok_or(EditError::UnknownItem(key))?;
        let name = name.into();
        if card.name != name {
            card.name = name;
            self.touch();
        }
        Ok(())
    }

    /// Remove a card; a persisted one is deleted on the next save
    pub fn delete_card(&mut self, key: CardKey) -> EditResult<Card> {
        let container = self.locate(key).ok_or(EditError::UnknownItem(key))?;
        let card = self
            .container_mut(container)
            .and_then(|c| c.remove(key))
            .ok_or(EditError::UnknownItem(key))?;
        if let Some(id) = card.server_id {
            self.deleted_items.push(id);
        }
        self.touch();
        Ok(card)
    }

    // ========================
    // Tier operations
    // ========================

    /// Insert a tier at `at` (appended when `None` or past the end).
    ///
    /// The new tier shares the rank of the tier it lands in front of;
    /// saving resolves the tie in sequence order.
    pub fn add_tier(&mut self, label: Option<&str>, at: Option<usize>) -> TierKey {
        let at = at.unwrap_or(self.tiers.len()).min(self.tiers.len());
        let order = match self.tiers.get(at) {
            Some(next) => next.order,
            None => self.tiers.last().map_or(0, |last| last.order.saturating_add(1)),
        };
        let key = TierKey(self.alloc_key());
        let tier = TierContainer {
            key,
            server_id: None,
            label: label.unwrap_or(DEFAULT_TIER_LABEL).to_string(),
            color: color_by_index(self.tiers.len()).to_string(),
            order,
            cards: OrderedContainer::new(),
        };
        self.tiers.insert(at, tier);
        self.touch();
        key
    }

    pub fn rename_tier(&mut self, key: TierKey, label: impl Into<String>) -> EditResult<()> {
        let i = self.tier_index(key)?;
        let label = label.into();
        if self.tiers[i].label != label {
            self.tiers[i].label = label;
            self.touch();
        }
        Ok(())
    }

    pub fn recolor_tier(&mut self, key: TierKey, color: impl Into<String>) -> EditResult<()> {
        let i = self.tier_index(key)?;
        let color = color.into();
        if self.tiers[i].color != color {
            self.tiers[i].color = color;
            self.touch();
        }
        Ok(())
    }

    /// Swap a tier with its neighbour. Returns false at either end.
    pub fn move_tier(&mut self, key: TierKey, direction: TierMove) -> EditResult<bool> {
        let i = self.tier_index(key)?;
        let j = match direction {
            TierMove::Up => i.checked_sub(1),
            TierMove::Down => Some(i + 1).filter(|j| *j < self.tiers.len()),
        };
        let Some(j) = j else {
            return Ok(false);
        };

        let (a, b) = (self.tiers[i].order, self.tiers[j].order);
        self.tiers[i].order = b;
        self.tiers[j].order = a;
        self.tiers.swap(i, j);
        self.touch();
        Ok(true)
    }

    /// Move every card of a tier to the end of the unsorted pool
    pub fn clear_tier(&mut self, key: TierKey) -> EditResult<usize> {
        let i = self.tier_index(key)?;
        let cards = self.tiers[i].cards.take_all();
        let moved = cards.len();
        self.unsorted.extend(cards);
        if moved > 0 {
            self.touch();
        }
        Ok(moved)
    }

    /// Remove a tier, sending its cards to the unsorted pool
    pub fn delete_tier(&mut self, key: TierKey) -> EditResult<()> {
        let i = self.tier_index(key)?;
        let mut tier = self.tiers.remove(i);
        self.unsorted.extend(tier.cards.take_all());
        if let Some(id) = tier.server_id {
            self.deleted_tiers.push(id);
        }
        self.touch();
        Ok(())
    }

    // ========================
    // Save round trip
    // ========================

    /// Ranks to submit: stored ranks, bumped where they tie.
    ///
    /// Ties at `i64::MAX` stay tied; the server rejects them.
    fn submitted_ranks(&self) -> Vec<i64> {
        let mut previous: Option<i64> = None;
        self.tiers
            .iter()
            .map(|t| {
                let rank = match previous {
                    Some(p) if t.order <= p => p.saturating_add(1),
                    _ => t.order,
                };
                previous = Some(rank);
                rank
            })
            .collect()
    }

    fn submitted_tiers(&self) -> Vec<SubmittedTier> {
        self.tiers
            .iter()
            .zip(self.submitted_ranks())
            .map(|(tier, order)| SubmittedTier {
                client_key: Some(tier.key.0),
                id: tier.server_id,
                label: tier.label.clone(),
                color: tier.color.clone(),
                order,
                items: tier
                    .cards
                    .iter()
                    .map(|card| SubmittedItem {
                        client_key: Some(card.key.0),
                        id: card.server_id,
                        name: card.name.clone(),
                        image_ref: card.image_ref.clone(),
                    })
                    .collect(),
            })
            .collect()
    }

    fn check_title(&self) -> EditResult<()> {
        if self.title.trim().is_empty() {
            return Err(EditError::InvalidInput("tier list must have a title".to_string()));
        }
        Ok(())
    }

    /// Whole-list save payload.
    ///
    /// Persisted cards parked in the unsorted pool are deleted by the save;
    /// unsaved ones stay on the client.
    pub fn to_save_request(&self) -> EditResult<SaveRequest> {
        let Some(id) = self.list_id else {
            return Err(EditError::InvalidInput("list has not been created yet".to_string()));
        };
        self.check_title()?;

        let mut item_ids = self.deleted_items.clone();
        item_ids.extend(self.unsorted.iter().filter_map(|c| c.server_id));

        Ok(SaveRequest {
            list: ListSubmission {
                id,
                owner_id: self.owner_id,
                title: self.title.clone(),
                description: self.description.clone(),
                visibility: self.visibility,
                tiers: self.submitted_tiers(),
            },
            deletions: Deletions {
                item_ids,
                tier_ids: self.deleted_tiers.clone(),
            },
        })
    }

    /// Creation payload for a list that was never saved
    pub fn to_draft(&self) -> EditResult<ListDraft> {
        if self.list_id.is_some() {
            return Err(EditError::InvalidInput("list already exists".to_string()));
        }
        self.check_title()?;
        if self.tiers.is_empty() {
            return Err(EditError::InvalidInput("tier list must have at least one tier".to_string()));
        }
        Ok(ListDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            visibility: self.visibility,
            tiers: self.submitted_tiers(),
        })
    }

    /// Adopt the server's answer to a save or create, keeping local keys
    pub fn apply_outcome(&mut self, outcome: &SaveOutcome) {
        let mut tier_keys: HashMap<i64, TierKey> = self
            .tiers
            .iter()
            .filter_map(|t| t.server_id.map(|id| (id, t.key)))
            .collect();
        tier_keys.extend(outcome.assigned_tiers.iter().map(|a| (a.id, TierKey(a.client_key))));

        let mut card_keys: HashMap<i64, CardKey> = self
            .tiers
            .iter()
            .flat_map(|t| t.cards.iter())
            .filter_map(|c| c.server_id.map(|id| (id, c.key)))
            .collect();
        card_keys.extend(outcome.assigned_items.iter().map(|a| (a.id, CardKey(a.client_key))));

        let list = &outcome.list;
        self.list_id = Some(list.id);
        self.owner_id = list.owner_id;
        self.title = list.title.clone();
        self.description = list.description.clone();
        self.visibility = list.visibility;
        self.rebuild_tiers(list, &tier_keys, &card_keys);

        // Persisted cards in the pool were deleted by this save
        for card in self.unsorted.iter_mut() {
            card.server_id = None;
        }
        self.deleted_items.clear();
        self.deleted_tiers.clear();
        self.saved_revision = self.revision;
    }

    fn rebuild_tiers(&mut self, list: &TierList, tier_keys: &HashMap<i64, TierKey>, card_keys: &HashMap<i64, CardKey>) {
        let highest = tier_keys
            .values()
            .map(|k| k.0)
            .chain(card_keys.values().map(|k| k.0))
            .max()
            .unwrap_or(0);
        self.next_key = self.next_key.max(highest.saturating_add(1));

        let mut tiers = Vec::with_capacity(list.tiers.len());
        for tier in &list.tiers {
            let key = match tier_keys.get(&tier.id) {
                Some(key) => *key,
                None => TierKey(self.alloc_key()),
            };
            let mut cards = OrderedContainer::new();
            for item in &tier.items {
                let key = match card_keys.get(&item.id) {
                    Some(key) => *key,
                    None => CardKey(self.alloc_key()),
                };
                cards.push(Card {
                    key,
                    server_id: Some(item.id),
                    name: item.name.clone(),
                    image_ref: item.image_ref.clone(),
                });
            }
            tiers.push(TierContainer {
                key,
                server_id: Some(tier.id),
                label: tier.label.clone(),
                color: tier.color.clone(),
                order: tier.order,
                cards,
            });
        }
        self.tiers = tiers;
    }
}
