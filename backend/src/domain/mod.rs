//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has NO storage dependencies (only serde for serialization).

mod entity;
mod record;
mod tier;
mod tier_item;
mod tier_list;
mod submission;
pub mod ownership;

pub use entity::{DomainError, DomainResult, Entity, ItemId, ListId, TierId, UserId};
pub use record::{EntityKind, Fields, Record, RecordId};
pub use submission::{Deletions, ListDraft, ListSubmission, SubmittedItem, SubmittedTier};
pub use tier::Tier;
pub use tier_item::TierItem;
pub use tier_list::{TierList, Visibility};
