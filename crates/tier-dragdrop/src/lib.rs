//! Tier DragDrop
//!
//! Drag-and-drop state for ordered containers, driven by pointer events.
//! Uses a movement threshold to distinguish click from drag.
//!
//! The session never looks at rendered output: the host reports what is
//! under the pointer as a [`HitTarget`] and every decision is a pure function
//! of that report and the state recorded at pick-up.

mod geometry;

pub use geometry::{Axis, Point, Rect};

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Movement threshold in pixels to start dragging
pub const DRAG_THRESHOLD_PX: f64 = 5.0;

/// What the host found under the pointer
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HitTarget<C, I> {
    /// Outside every container
    Nothing,
    /// Empty area of a container
    Container(C),
    /// A rendered item and its bounding box
    Item { container: C, item: I, rect: Rect },
}

/// Candidate insertion point
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropTarget<C, I> {
    /// Append at the end of a container
    Container(C),
    /// Insert next to a sibling item
    Item { container: C, item: I, before: bool },
}

impl<C: Copy, I> DropTarget<C, I> {
    pub fn container(&self) -> C {
        match self {
            DropTarget::Container(c) => *c,
            DropTarget::Item { container, .. } => *container,
        }
    }
}

/// Neighbours of the picked item at pick-up time
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Origin<I> {
    pub prev: Option<I>,
    pub next: Option<I>,
}

impl<I> Default for Origin<I> {
    fn default() -> Self {
        Self { prev: None, next: None }
    }
}

/// Drag lifecycle
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragState<C, I> {
    Idle,
    /// Pressed but not yet moved past the threshold
    Pending {
        source: C,
        item: I,
        origin: Origin<I>,
        start: Point,
    },
    Dragging {
        source: C,
        item: I,
        origin: Origin<I>,
    },
    Hovering {
        source: C,
        item: I,
        origin: Origin<I>,
        target: DropTarget<C, I>,
    },
}

/// A committed move, ready to hand to the list model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest<C, I> {
    pub item: I,
    pub from: C,
    pub to: C,
    pub target_item: Option<I>,
    pub before: bool,
}

/// Result of ending a drag
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropOutcome<C, I> {
    /// Released before the threshold was crossed
    Click(I),
    Move(MoveRequest<C, I>),
    /// Dropped where it already was
    NoOp,
    Cancelled,
    /// Nothing was in progress
    Ignored,
}

/// Compute the candidate insertion point for a pointer position.
///
/// Pure: the same `at` and `hit` always produce the same target.
pub fn candidate<C: Copy, I: Copy>(axis: Axis, at: Point, hit: &HitTarget<C, I>) -> Option<DropTarget<C, I>> {
    match hit {
        HitTarget::Nothing => None,
        HitTarget::Container(c) => Some(DropTarget::Container(*c)),
        HitTarget::Item { container, item, rect } => Some(DropTarget::Item {
            container: *container,
            item: *item,
            before: axis.is_leading_half(rect, at),
        }),
    }
}

/// Whether dropping `item` on `target` would leave the layout unchanged
pub fn is_noop<C: PartialEq, I: PartialEq>(
    item: &I,
    source: &C,
    origin: &Origin<I>,
    target: &DropTarget<C, I>,
) -> bool {
    match target {
        DropTarget::Container(c) => c == source && origin.next.is_none(),
        DropTarget::Item { container, item: sibling, before } => {
            if sibling == item {
                return true;
            }
            if container != source {
                return false;
            }
            if *before {
                origin.next.as_ref() == Some(sibling)
            } else {
                origin.prev.as_ref() == Some(sibling)
            }
        }
    }
}

/// Drag session for a single pointer
#[derive(Clone, Debug)]
pub struct DragSession<C, I> {
    state: DragState<C, I>,
    axis: Axis,
}

impl<C, I> Default for DragSession<C, I> {
    fn default() -> Self {
        Self {
            state: DragState::Idle,
            axis: Axis::default(),
        }
    }
}

impl<C, I> DragSession<C, I>
where
    C: Copy + PartialEq + Debug,
    I: Copy + PartialEq + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_axis(axis: Axis) -> Self {
        Self { state: DragState::Idle, axis }
    }

    pub fn state(&self) -> &DragState<C, I> {
        &self.state
    }

    /// True once the pointer has crossed the threshold (or after `pick_up`)
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. } | DragState::Hovering { .. })
    }

    pub fn dragging_item(&self) -> Option<I> {
        match self.state {
            DragState::Dragging { item, .. } | DragState::Hovering { item, .. } => Some(item),
            _ => None,
        }
    }

    pub fn drop_target(&self) -> Option<DropTarget<C, I>> {
        match self.state {
            DragState::Hovering { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Record a pending drag with its start position.
    ///
    /// Returns false if another interaction is already in progress.
    pub fn press(&mut self, source: C, item: I, origin: Origin<I>, at: Point) -> bool {
        if !matches!(self.state, DragState::Idle) {
            return false;
        }
        self.state = DragState::Pending { source, item, origin, start: at };
        true
    }

    /// Start dragging immediately, skipping the threshold
    pub fn pick_up(&mut self, source: C, item: I, origin: Origin<I>) -> bool {
        if !matches!(self.state, DragState::Idle) {
            return false;
        }
        log::debug!("[DND] pick up {:?} from {:?}", item, source);
        self.state = DragState::Dragging { source, item, origin };
        true
    }

    /// Feed a pointer position and whatever is under it
    pub fn pointer_moved(&mut self, at: Point, hit: HitTarget<C, I>) {
        if let DragState::Pending { source, item, origin, start } = self.state {
            if !start.moved_beyond(at, DRAG_THRESHOLD_PX) {
                return;
            }
            log::debug!("[DND] threshold crossed for {:?}", item);
            self.state = DragState::Dragging { source, item, origin };
        }

        let (source, item, origin) = match self.state {
            DragState::Dragging { source, item, origin } | DragState::Hovering { source, item, origin, .. } => {
                (source, item, origin)
            }
            _ => return,
        };

        self.state = match candidate(self.axis, at, &hit) {
            Some(target) => DragState::Hovering { source, item, origin, target },
            None => DragState::Dragging { source, item, origin },
        };
    }

    /// Release the pointer and resolve the drop
    pub fn release(&mut self) -> DropOutcome<C, I> {
        let state = std::mem::replace(&mut self.state, DragState::Idle);
        match state {
            DragState::Idle => DropOutcome::Ignored,
            DragState::Pending { item, .. } => DropOutcome::Click(item),
            DragState::Dragging { item, .. } => {
                log::debug!("[DND] {:?} released outside any container", item);
                DropOutcome::Cancelled
            }
            DragState::Hovering { source, item, origin, target } => {
                if is_noop(&item, &source, &origin, &target) {
                    log::debug!("[DND] {:?} dropped in place", item);
                    return DropOutcome::NoOp;
                }
                let (to, target_item, before) = match target {
                    DropTarget::Container(c) => (c, None, false),
                    DropTarget::Item { container, item: sibling, before } => (container, Some(sibling), before),
                };
                log::debug!("[DND] drop {:?}: {:?} -> {:?} ({:?}, before={})", item, source, to, target_item, before);
                DropOutcome::Move(MoveRequest { item, from: source, to, target_item, before })
            }
        }
    }

    /// Abort whatever is in progress
    pub fn cancel(&mut self) -> DropOutcome<C, I> {
        match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Idle => DropOutcome::Ignored,
            _ => DropOutcome::Cancelled,
        }
    }
}
