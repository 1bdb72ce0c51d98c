//! Tier list editor client.
//!
//! Holds the editable state of one list, turns drag gestures into moves and
//! builds the whole-list save payload the backend reconciles.

pub mod editor;
pub mod error;
pub mod model;
pub mod models;
pub mod ordered;
pub mod palette;

pub use editor::{EditorSession, SaveState};
pub use error::{EditError, EditResult};
pub use model::{Card, CardKey, ContainerId, ListModel, TierContainer, TierKey, TierMove};
pub use tier_dragdrop::{DropOutcome, HitTarget, Point, Rect};
