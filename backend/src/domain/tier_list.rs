//! Tier List Aggregate
//!
//! A titled list owned by one user, holding its tiers in display order.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::entity::{DomainError, DomainResult, Entity, ItemId, ListId, TierId, UserId};
use super::record::{EntityKind, Fields, Record};
use super::tier::Tier;
use super::tier_item::TierItem;

/// Who may read a list besides its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Visibility {
    #[default]
    Private,
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "PRIVATE",
            Visibility::Public => "PUBLIC",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PRIVATE" => Some(Visibility::Private),
            "PUBLIC" => Some(Visibility::Public),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierList {
    pub id: ListId,
    pub title: String,
    pub description: Option<String>,
    pub visibility: Visibility,
    /// Fixed at creation
    pub owner_id: UserId,
    /// Epoch millis
    pub created_at: i64,
    /// Tiers in display order
    #[serde(default)]
    pub tiers: Vec<Tier>,
}

impl TierList {
    pub fn tier(&self, id: TierId) -> Option<&Tier> {
        self.tiers.iter().find(|t| t.id == id)
    }

    /// Locate an item anywhere in the list
    pub fn item(&self, id: ItemId) -> Option<&TierItem> {
        self.tiers.iter().find_map(|t| t.item(id))
    }

    pub fn items(&self) -> impl Iterator<Item = &TierItem> {
        self.tiers.iter().flat_map(|t| t.items.iter())
    }
}

impl Entity for TierList {
    type Id = ListId;
    const KIND: EntityKind = EntityKind::TierList;

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("title".into(), json!(self.title));
        fields.insert("description".into(), json!(self.description));
        fields.insert("visibility".into(), json!(self.visibility.as_str()));
        fields.insert("owner_id".into(), json!(self.owner_id));
        fields.insert("created_at".into(), json!(self.created_at));
        fields
    }

    fn from_record(record: &Record) -> DomainResult<Self> {
        let visibility = record.string("visibility")?;
        Ok(Self {
            id: ListId(record.id),
            title: record.string("title")?,
            description: record.opt_string("description")?,
            visibility: Visibility::parse(&visibility)
                .ok_or_else(|| DomainError::Storage(format!("unknown visibility `{}`", visibility)))?,
            owner_id: UserId(record.int("owner_id")?),
            created_at: record.int("created_at")?,
            tiers: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TierList {
        TierList {
            id: ListId(1),
            title: "Starters".to_string(),
            description: None,
            visibility: Visibility::Public,
            owner_id: UserId(7),
            created_at: 1_700_000_000_000,
            tiers: vec![Tier {
                id: TierId(10),
                tier_list_id: ListId(1),
                label: "S".to_string(),
                color: "#FF7F7F".to_string(),
                order: 0,
                items: vec![TierItem {
                    id: ItemId(100),
                    tier_id: TierId(10),
                    name: "Mudkip".to_string(),
                    image_ref: "mudkip.png".to_string(),
                    position: 0,
                }],
            }],
        }
    }

    #[test]
    fn test_visibility_wire_format() {
        assert_eq!(serde_json::to_string(&Visibility::Public).unwrap(), "\"PUBLIC\"");
        assert_eq!(Visibility::default(), Visibility::Private);
        assert_eq!(Visibility::parse("nope"), None);
    }

    #[test]
    fn test_lookup_helpers() {
        let list = sample();
        assert_eq!(list.item(ItemId(100)).map(|i| i.tier_id), Some(TierId(10)));
        assert!(list.item(ItemId(101)).is_none());
        assert_eq!(list.items().count(), 1);
    }

    #[test]
    fn test_record_drops_children() {
        let list = sample();
        let record = Record::new(1, list.to_fields());
        let back = TierList::from_record(&record).unwrap();
        assert!(back.tiers.is_empty());
        assert_eq!(back.owner_id, UserId(7));
        assert_eq!(back.visibility, Visibility::Public);
    }
}
