//! Aggregate Loading
//!
//! Assembles whole tier lists (tiers and items in display order) from the
//! flat record store.

use super::traits::{find, find_where, Filter, Order, RecordTransaction};
use crate::domain::{DomainResult, ListId, Tier, TierItem, TierList};

async fn attach_tiers<X>(tx: &mut X, list: &mut TierList) -> DomainResult<()>
where
    X: RecordTransaction + ?Sized,
{
    let mut tiers: Vec<Tier> = find_where(tx, &Filter::eq("tier_list_id", list.id), Order::asc("sort_order")).await?;
    for tier in &mut tiers {
        tier.items = find_where::<TierItem, X>(tx, &Filter::eq("tier_id", tier.id), Order::asc("position")).await?;
    }
    list.tiers = tiers;
    Ok(())
}

/// Load one list with its tiers and items
pub async fn load_tier_list<X>(tx: &mut X, id: ListId) -> DomainResult<Option<TierList>>
where
    X: RecordTransaction + ?Sized,
{
    let Some(mut list) = find::<TierList, X>(tx, id).await? else {
        return Ok(None);
    };
    attach_tiers(tx, &mut list).await?;
    Ok(Some(list))
}

/// Load every list matching `filter`, newest first
pub async fn load_tier_lists<X>(tx: &mut X, filter: &Filter) -> DomainResult<Vec<TierList>>
where
    X: RecordTransaction + ?Sized,
{
    let mut lists: Vec<TierList> = find_where(tx, filter, Order::desc("created_at")).await?;
    for list in &mut lists {
        attach_tiers(tx, list).await?;
    }
    Ok(lists)
}
