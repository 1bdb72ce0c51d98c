//! Reconcile Layer
//!
//! Turns a client-submitted list into the minimal set of store writes.

mod diff;
mod engine;


pub use diff::{item_changes, list_changes, resolve_ranks, tier_changes, ItemPlacement, ListPatch};
pub use engine::{KeyAssignment, ReconcileEngine, SaveOutcome, WriteStats};
