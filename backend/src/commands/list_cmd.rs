//! Tier List Commands
//!
//! Boundary operations over the shared `AppState`. The acting identity is
//! supplied by the caller and treated as opaque.

use serde::{Deserialize, Serialize};

use crate::domain::ownership::authorize_read;
use crate::domain::{
    Deletions, DomainError, DomainResult, EntityKind, ListDraft, ListId, ListSubmission, TierList, UserId, Visibility,
};
use crate::reconcile::{ReconcileEngine, SaveOutcome};
use crate::repository::{load_tier_list, load_tier_lists, Filter};
use crate::AppState;

/// Save payload: the edited list plus what the editor explicitly removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRequest {
    pub list: ListSubmission,
    #[serde(default)]
    pub deletions: Deletions,
}

/// Load a list regardless of visibility
pub async fn load_list(state: &AppState, id: ListId) -> DomainResult<TierList> {
    let mut tx = state.store.begin().await?;
    let list = load_tier_list(&mut *tx, id).await?;
    list.ok_or_else(|| DomainError::not_found(EntityKind::TierList, id))
}

/// Load a list on behalf of `actor` (anonymous when `None`)
pub async fn get_list(state: &AppState, actor: Option<UserId>, id: ListId) -> DomainResult<TierList> {
    let list = load_list(state, id).await?;
    authorize_read(actor, &list).into_result()?;
    Ok(list)
}

/// Persist an edited list
pub async fn save_list(state: &AppState, actor: UserId, request: &SaveRequest) -> DomainResult<SaveOutcome> {
    ReconcileEngine::new(state.store.as_ref())
        .save_list(actor, &request.list, &request.deletions)
        .await
}

/// Create a list owned by `actor`
pub async fn create_list(state: &AppState, actor: UserId, draft: &ListDraft) -> DomainResult<SaveOutcome> {
    ReconcileEngine::new(state.store.as_ref()).create_list(actor, draft).await
}

/// Delete a list and everything in it
pub async fn delete_list(state: &AppState, actor: UserId, id: ListId) -> DomainResult<()> {
    ReconcileEngine::new(state.store.as_ref()).delete_list(actor, id).await
}

/// Lists owned by `actor`, newest first
pub async fn list_my_lists(state: &AppState, actor: UserId) -> DomainResult<Vec<TierList>> {
    let mut tx = state.store.begin().await?;
    let lists = load_tier_lists(&mut *tx, &Filter::eq("owner_id", actor)).await?;
    Ok(lists)
}

/// Every public list, newest first
pub async fn list_public(state: &AppState) -> DomainResult<Vec<TierList>> {
    let mut tx = state.store.begin().await?;
    let filter = Filter::Eq("visibility", serde_json::json!(Visibility::Public.as_str()));
    let lists = load_tier_lists(&mut *tx, &filter).await?;
    Ok(lists)
}
