//! Frontend Models
//!
//! Data structures matching backend entities and save payloads.

use serde::{Deserialize, Serialize};

/// Who may read a list besides its owner (matches backend)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Visibility {
    #[default]
    Private,
    Public,
}

/// Item data structure (matches backend)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierItem {
    pub id: i64,
    pub tier_id: i64,
    pub name: String,
    pub image_ref: String,
    pub position: i64,
}

/// Tier data structure (matches backend)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub id: i64,
    pub tier_list_id: i64,
    pub label: String,
    pub color: String,
    pub order: i64,
    #[serde(default)]
    pub items: Vec<TierItem>,
}

/// Tier list data structure (matches backend)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierList {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    pub owner_id: i64,
    pub created_at: i64,
    #[serde(default)]
    pub tiers: Vec<Tier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedItem {
    pub client_key: Option<u64>,
    pub id: Option<i64>,
    pub name: String,
    pub image_ref: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedTier {
    pub client_key: Option<u64>,
    pub id: Option<i64>,
    pub label: String,
    pub color: String,
    pub order: i64,
    pub items: Vec<SubmittedItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSubmission {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub visibility: Visibility,
    pub tiers: Vec<SubmittedTier>,
}

/// Payload for creating a list that has never been saved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListDraft {
    pub title: String,
    pub description: Option<String>,
    pub visibility: Visibility,
    pub tiers: Vec<SubmittedTier>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deletions {
    pub item_ids: Vec<i64>,
    pub tier_ids: Vec<i64>,
}

/// Body of a save call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRequest {
    pub list: ListSubmission,
    pub deletions: Deletions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAssignment {
    pub client_key: u64,
    pub id: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteStats {
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
}

/// Save response (matches backend)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub list: TierList,
    #[serde(default)]
    pub assigned_tiers: Vec<KeyAssignment>,
    #[serde(default)]
    pub assigned_items: Vec<KeyAssignment>,
    #[serde(default)]
    pub writes: WriteStats,
}
