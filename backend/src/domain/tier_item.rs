//! Tier Item Entity
//!
//! A ranked card. Always attached to exactly one persisted tier.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::entity::{DomainResult, Entity, ItemId, TierId};
use super::record::{EntityKind, Fields, Record};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierItem {
    pub id: ItemId,
    /// Owning tier
    pub tier_id: TierId,
    /// Display name
    pub name: String,
    /// Opaque image URL or storage path, never interpreted here
    pub image_ref: String,
    /// Index within the owning tier
    pub position: i64,
}

impl Entity for TierItem {
    type Id = ItemId;
    const KIND: EntityKind = EntityKind::TierItem;

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("tier_id".into(), json!(self.tier_id));
        fields.insert("name".into(), json!(self.name));
        fields.insert("image_ref".into(), json!(self.image_ref));
        fields.insert("position".into(), json!(self.position));
        fields
    }

    fn from_record(record: &Record) -> DomainResult<Self> {
        Ok(Self {
            id: ItemId(record.id),
            tier_id: TierId(record.int("tier_id")?),
            name: record.string("name")?,
            image_ref: record.string("image_ref")?,
            position: record.int("position")?,
        })
    }
}
