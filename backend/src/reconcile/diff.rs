//! Minimal-Diff Helpers
//!
//! Pure comparisons between a stored record and its submitted state. Each
//! returns only the fields whose value changed; an empty map means the
//! record needs no write.

use serde_json::json;

use crate::domain::{DomainError, DomainResult, Fields, Tier, TierId, TierItem, TierList, Visibility};

/// Final ranks for tiers requested in submission order.
///
/// Tiers are stably sorted by requested rank, so equal ranks keep their
/// submission order. A rank that does not exceed its predecessor's is bumped
/// to `previous + 1`; every other rank is kept as requested. A bump past
/// `i64::MAX` is rejected.
pub fn resolve_ranks(requested: &[i64]) -> DomainResult<Vec<i64>> {
    let mut by_rank: Vec<usize> = (0..requested.len()).collect();
    by_rank.sort_by_key(|&i| requested[i]);

    let mut resolved = vec![0; requested.len()];
    let mut previous: Option<i64> = None;
    for i in by_rank {
        let rank = match previous {
            Some(p) if requested[i] <= p => p
                .checked_add(1)
                .ok_or_else(|| DomainError::InvalidInput("tier rank out of range".to_string()))?,
            _ => requested[i],
        };
        resolved[i] = rank;
        previous = Some(rank);
    }
    Ok(resolved)
}

/// Submitted list-level fields
#[derive(Debug, Clone, Copy)]
pub struct ListPatch<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub visibility: Visibility,
}

pub fn list_changes(stored: &TierList, patch: ListPatch<'_>) -> Fields {
    let mut fields = Fields::new();
    if stored.title != patch.title {
        fields.insert("title".into(), json!(patch.title));
    }
    if stored.description.as_deref() != patch.description {
        fields.insert("description".into(), json!(patch.description));
    }
    if stored.visibility != patch.visibility {
        fields.insert("visibility".into(), json!(patch.visibility.as_str()));
    }
    fields
}

pub fn tier_changes(stored: &Tier, label: &str, color: &str, rank: i64) -> Fields {
    let mut fields = Fields::new();
    if stored.label != label {
        fields.insert("label".into(), json!(label));
    }
    if stored.color != color {
        fields.insert("color".into(), json!(color));
    }
    if stored.order != rank {
        fields.insert("sort_order".into(), json!(rank));
    }
    fields
}

/// Submitted placement and content of one item
#[derive(Debug, Clone, Copy)]
pub struct ItemPlacement<'a> {
    pub tier_id: TierId,
    pub position: i64,
    pub name: &'a str,
    pub image_ref: &'a str,
}

pub fn item_changes(stored: &TierItem, placement: ItemPlacement<'_>) -> Fields {
    let mut fields = Fields::new();
    if stored.tier_id != placement.tier_id {
        fields.insert("tier_id".into(), json!(placement.tier_id));
    }
    if stored.position != placement.position {
        fields.insert("position".into(), json!(placement.position));
    }
    if stored.name != placement.name {
        fields.insert("name".into(), json!(placement.name));
    }
    if stored.image_ref != placement.image_ref {
        fields.insert("image_ref".into(), json!(placement.image_ref));
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ItemId, ListId};

    #[test]
    fn test_distinct_ranks_are_kept() {
        assert_eq!(resolve_ranks(&[0, 5, 2]).unwrap(), vec![0, 5, 2]);
        assert!(resolve_ranks(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_colliding_ranks_follow_submission_order() {
        // Two tiers inserted at the same index before saving
        assert_eq!(resolve_ranks(&[0, 1, 1, 2]).unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(resolve_ranks(&[3, 3, 0]).unwrap(), vec![3, 4, 0]);
    }

    #[test]
    fn test_bump_cascades_only_while_colliding() {
        assert_eq!(resolve_ranks(&[1, 1, 2, 10]).unwrap(), vec![1, 2, 3, 10]);
    }

    #[test]
    fn test_bump_past_max_rank_is_rejected() {
        assert_eq!(resolve_ranks(&[0, i64::MAX]).unwrap(), vec![0, i64::MAX]);
        assert!(matches!(
            resolve_ranks(&[i64::MAX, i64::MAX]),
            Err(DomainError::InvalidInput(_))
        ));
    }

    fn stored_item() -> TierItem {
        TierItem {
            id: ItemId(1),
            tier_id: TierId(10),
            name: "Eevee".to_string(),
            image_ref: "eevee.png".to_string(),
            position: 0,
        }
    }

    #[test]
    fn test_unchanged_item_has_no_changes() {
        let item = stored_item();
        let placement = ItemPlacement {
            tier_id: TierId(10),
            position: 0,
            name: "Eevee",
            image_ref: "eevee.png",
        };
        assert!(item_changes(&item, placement).is_empty());
    }

    #[test]
    fn test_moved_item_only_writes_membership() {
        let item = stored_item();
        let placement = ItemPlacement {
            tier_id: TierId(11),
            position: 2,
            name: "Eevee",
            image_ref: "eevee.png",
        };
        let changes = item_changes(&item, placement);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes["tier_id"], json!(11));
        assert_eq!(changes["position"], json!(2));
    }

    #[test]
    fn test_tier_and_list_changes() {
        let tier = Tier {
            id: TierId(10),
            tier_list_id: ListId(1),
            label: "S".to_string(),
            color: "#FF7F7F".to_string(),
            order: 0,
            items: vec![],
        };
        assert!(tier_changes(&tier, "S", "#FF7F7F", 0).is_empty());
        assert_eq!(tier_changes(&tier, "S", "#FFBF7F", 0).len(), 1);

        let list = TierList {
            id: ListId(1),
            title: "Games".to_string(),
            description: Some("best".to_string()),
            visibility: Visibility::Private,
            owner_id: crate::domain::UserId(1),
            created_at: 0,
            tiers: vec![],
        };
        let same = ListPatch { title: "Games", description: Some("best"), visibility: Visibility::Private };
        assert!(list_changes(&list, same).is_empty());
        let cleared = ListPatch { description: None, ..same };
        assert_eq!(list_changes(&list, cleared)["description"], serde_json::Value::Null);
    }
}
