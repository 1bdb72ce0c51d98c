//! Ownership Guard
//!
//! Pure authorization checks run before any list mutation reaches the store.

use super::entity::{DomainError, DomainResult, UserId};
use super::tier_list::{TierList, Visibility};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Allowed,
    Denied,
}

impl Authorization {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Authorization::Allowed)
    }

    pub fn into_result(self) -> DomainResult<()> {
        match self {
            Authorization::Allowed => Ok(()),
            Authorization::Denied => Err(DomainError::Denied),
        }
    }
}

/// Only the owner may mutate a list
pub fn authorize(actor: UserId, owner: UserId) -> Authorization {
    if actor == owner {
        Authorization::Allowed
    } else {
        Authorization::Denied
    }
}

/// Public lists are readable by anyone, private ones only by their owner
pub fn authorize_read(actor: Option<UserId>, list: &TierList) -> Authorization {
    match (list.visibility, actor) {
        (Visibility::Public, _) => Authorization::Allowed,
        (Visibility::Private, Some(actor)) => authorize(actor, list.owner_id),
        (Visibility::Private, None) => Authorization::Denied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ListId;

    fn list(visibility: Visibility) -> TierList {
        TierList {
            id: ListId(1),
            title: "t".to_string(),
            description: None,
            visibility,
            owner_id: UserId(1),
            created_at: 0,
            tiers: vec![],
        }
    }

    #[test]
    fn test_owner_only() {
        assert_eq!(authorize(UserId(1), UserId(1)), Authorization::Allowed);
        assert_eq!(authorize(UserId(2), UserId(1)), Authorization::Denied);
        assert_eq!(authorize(UserId(2), UserId(1)).into_result(), Err(DomainError::Denied));
    }

    #[test]
    fn test_read_access() {
        assert!(authorize_read(None, &list(Visibility::Public)).is_allowed());
        assert!(!authorize_read(None, &list(Visibility::Private)).is_allowed());
        assert!(!authorize_read(Some(UserId(2)), &list(Visibility::Private)).is_allowed());
        assert!(authorize_read(Some(UserId(1)), &list(Visibility::Private)).is_allowed());
    }
}
