//! Tier Entity
//!
//! A labeled, colored row of items. `order` ranks tiers within a list.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::entity::{DomainResult, Entity, ItemId, ListId, TierId};
use super::record::{EntityKind, Fields, Record};
use super::tier_item::TierItem;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub id: TierId,
    pub tier_list_id: ListId,
    pub label: String,
    /// Hex color, e.g. "#FF7F7F"
    pub color: String,
    /// Rank among sibling tiers; ascending order is display order
    pub order: i64,
    /// Items in display order
    #[serde(default)]
    pub items: Vec<TierItem>,
}

impl Tier {
    pub fn item(&self, id: ItemId) -> Option<&TierItem> {
        self.items.iter().find(|i| i.id == id)
    }
}

impl Entity for Tier {
    type Id = TierId;
    const KIND: EntityKind = EntityKind::Tier;

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("tier_list_id".into(), json!(self.tier_list_id));
        fields.insert("label".into(), json!(self.label));
        fields.insert("color".into(), json!(self.color));
        fields.insert("sort_order".into(), json!(self.order));
        fields
    }

    fn from_record(record: &Record) -> DomainResult<Self> {
        Ok(Self {
            id: TierId(record.id),
            tier_list_id: ListId(record.int("tier_list_id")?),
            label: record.string("label")?,
            color: record.string("color")?,
            order: record.int("sort_order")?,
            items: Vec::new(),
        })
    }
}
