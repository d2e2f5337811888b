//! Ownership-based capability check for chirp mutations.
//!
//! This is enforced at the service boundary, before any row is written:
//! every update/delete path calls [`can_mutate`] and there is no other
//! authority (no roles, no admin override).

use uuid::Uuid;

use crate::database::models::chirp::Chirp;

/// Mutating actions a requester can attempt on a chirp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Update,
    Delete,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Update => write!(f, "update"),
            Action::Delete => write!(f, "delete"),
        }
    }
}

/// A chirp is only mutable or deletable by its owner.
pub fn can_mutate(requester_id: Uuid, chirp: &Chirp, _action: Action) -> bool {
    requester_id == chirp.user_id
}
