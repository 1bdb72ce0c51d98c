//! Client Submissions
//!
//! Whole-list payloads sent by the editor. A tier or item without an `id`
//! is new; `client_key` is the editor's local handle for it, echoed back with
//! the server id assigned on save. There is no variant for the unsorted pool:
//! it never reaches the server.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

use super::entity::{DomainError, DomainResult, ItemId, ListId, TierId, UserId};
use super::tier_list::Visibility;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedItem {
    #[serde(default)]
    pub client_key: Option<u64>,
    #[serde(default)]
    pub id: Option<ItemId>,
    pub name: String,
    pub image_ref: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedTier {
    #[serde(default)]
    pub client_key: Option<u64>,
    #[serde(default)]
    pub id: Option<TierId>,
    pub label: String,
    pub color: String,
    pub order: i64,
    #[serde(default)]
    pub items: Vec<SubmittedItem>,
}

/// Edited snapshot of an existing list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSubmission {
    pub id: ListId,
    pub owner_id: UserId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    pub tiers: Vec<SubmittedTier>,
}

/// Records the editor explicitly removed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deletions {
    #[serde(default)]
    pub item_ids: Vec<ItemId>,
    #[serde(default)]
    pub tier_ids: Vec<TierId>,
}

impl Deletions {
    pub fn is_empty(&self) -> bool {
        self.item_ids.is_empty() && self.tier_ids.is_empty()
    }
}

/// Payload for creating a new list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    pub tiers: Vec<SubmittedTier>,
}

fn invalid(msg: impl Into<String>) -> DomainError {
    DomainError::InvalidInput(msg.into())
}

fn validate_title(title: &str) -> DomainResult<()> {
    if title.trim().is_empty() {
        return Err(invalid("tier list must have a title"));
    }
    Ok(())
}

fn validate_tiers(tiers: &[SubmittedTier]) -> DomainResult<()> {
    let mut tier_ids = HashSet::new();
    let mut item_ids = HashSet::new();
    let mut tier_keys = HashSet::new();
    let mut item_keys = HashSet::new();

    for tier in tiers {
        if let Some(id) = tier.id {
            if !tier_ids.insert(id) {
                return Err(invalid(format!("tier {} submitted twice", id)));
            }
        }
        if let Some(key) = tier.client_key {
            if !tier_keys.insert(key) {
                return Err(invalid(format!("tier client key {} submitted twice", key)));
            }
        }
        for item in &tier.items {
            if item.image_ref.trim().is_empty() {
                return Err(invalid(format!("item `{}` has no image", item.name)));
            }
            if let Some(id) = item.id {
                if !item_ids.insert(id) {
                    return Err(invalid(format!("item {} submitted twice", id)));
                }
            }
            if let Some(key) = item.client_key {
                if !item_keys.insert(key) {
                    return Err(invalid(format!("item client key {} submitted twice", key)));
                }
            }
        }
    }
    Ok(())
}

fn reject_repeats<T: Copy + Eq + Hash + Display>(ids: &[T], kind: &str) -> DomainResult<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(*id) {
            return Err(invalid(format!("{} {} deleted twice", kind, id)));
        }
    }
    Ok(())
}

impl ListSubmission {
    /// Shape checks that need no store access
    pub fn validate(&self, deletions: &Deletions) -> DomainResult<()> {
        validate_title(&self.title)?;
        validate_tiers(&self.tiers)?;
        reject_repeats(&deletions.item_ids, "item")?;
        reject_repeats(&deletions.tier_ids, "tier")?;

        for tier in &self.tiers {
            if let Some(id) = tier.id {
                if deletions.tier_ids.contains(&id) {
                    return Err(invalid(format!("tier {} is both submitted and deleted", id)));
                }
            }
            for item in &tier.items {
                if let Some(id) = item.id {
                    if deletions.item_ids.contains(&id) {
                        return Err(invalid(format!("item {} is both submitted and deleted", id)));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn submitted_items(&self) -> impl Iterator<Item = &SubmittedItem> {
        self.tiers.iter().flat_map(|t| t.items.iter())
    }
}

impl ListDraft {
    pub fn validate(&self) -> DomainResult<()> {
        validate_title(&self.title)?;
        if self.tiers.is_empty() {
            return Err(invalid("tier list must have at least one tier"));
        }
        validate_tiers(&self.tiers)?;
        let carries_ids = self
            .tiers
            .iter()
            .any(|t| t.id.is_some() || t.items.iter().any(|i| i.id.is_some()));
        if carries_ids {
            return Err(invalid("a new tier list cannot reference persisted tiers or items"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: Option<i64>, name: &str) -> SubmittedItem {
        SubmittedItem {
            client_key: None,
            id: id.map(ItemId),
            name: name.to_string(),
            image_ref: format!("{}.png", name),
        }
    }

    fn tier(id: Option<i64>, label: &str, order: i64, items: Vec<SubmittedItem>) -> SubmittedTier {
        SubmittedTier {
            client_key: None,
            id: id.map(TierId),
            label: label.to_string(),
            color: "#FF7F7F".to_string(),
            order,
            items,
        }
    }

    fn submission(tiers: Vec<SubmittedTier>) -> ListSubmission {
        ListSubmission {
            id: ListId(1),
            owner_id: UserId(1),
            title: "Games".to_string(),
            description: None,
            visibility: Visibility::Private,
            tiers,
        }
    }

    #[test]
    fn test_valid_submission() {
        let s = submission(vec![tier(Some(1), "S", 0, vec![item(Some(5), "a"), item(None, "b")])]);
        assert!(s.validate(&Deletions::default()).is_ok());
    }

    #[test]
    fn test_blank_title_rejected() {
        let mut s = submission(vec![]);
        s.title = "   ".to_string();
        assert!(matches!(s.validate(&Deletions::default()), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn test_duplicate_item_rejected() {
        let s = submission(vec![
            tier(Some(1), "S", 0, vec![item(Some(5), "a")]),
            tier(Some(2), "A", 1, vec![item(Some(5), "a")]),
        ]);
        assert!(matches!(s.validate(&Deletions::default()), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn test_item_both_kept_and_deleted_rejected() {
        let s = submission(vec![tier(Some(1), "S", 0, vec![item(Some(5), "a")])]);
        let deletions = Deletions { item_ids: vec![ItemId(5)], tier_ids: vec![] };
        assert!(matches!(s.validate(&deletions), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn test_repeated_deletion_rejected() {
        let s = submission(vec![tier(Some(1), "S", 0, vec![])]);
        let items = Deletions { item_ids: vec![ItemId(5), ItemId(5)], tier_ids: vec![] };
        assert!(matches!(s.validate(&items), Err(DomainError::InvalidInput(_))));
        let tiers = Deletions { item_ids: vec![], tier_ids: vec![TierId(2), TierId(2)] };
        assert!(matches!(s.validate(&tiers), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn test_tier_both_kept_and_deleted_rejected() {
        let s = submission(vec![tier(Some(1), "S", 0, vec![])]);
        let deletions = Deletions { item_ids: vec![], tier_ids: vec![TierId(1)] };
        assert!(matches!(s.validate(&deletions), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn test_draft_needs_tiers() {
        let draft = ListDraft {
            title: "Empty".to_string(),
            description: None,
            visibility: Visibility::Private,
            tiers: vec![],
        };
        assert!(matches!(draft.validate(), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn test_draft_cannot_carry_ids() {
        let draft = ListDraft {
            title: "Copy".to_string(),
            description: None,
            visibility: Visibility::Private,
            tiers: vec![tier(Some(3), "S", 0, vec![])],
        };
        assert!(matches!(draft.validate(), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn test_wire_defaults() {
        let json = r##"{"id":1,"owner_id":2,"title":"T","tiers":[{"label":"S","color":"#fff","order":0}]}"##;
        let s: ListSubmission = serde_json::from_str(json).unwrap();
        assert_eq!(s.visibility, Visibility::Private);
        assert!(s.tiers[0].id.is_none());
        assert!(s.tiers[0].items.is_empty());
    }
}
