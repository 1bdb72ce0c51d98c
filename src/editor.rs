//! Editor Session
//!
//! Binds pointer gestures to the list model and gates edits on the save
//! lifecycle. One session edits one list.

use tier_dragdrop::{DragSession, DropOutcome, HitTarget, Point};

use crate::error::{EditError, EditResult};
use crate::model::{CardKey, ContainerId, ListModel};
use crate::models::{SaveOutcome, SaveRequest, TierList};

/// Where the session is in the save round trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveState {
    #[default]
    Idle,
    InFlight,
    /// Last save failed; the server state is unknown until a reload
    Stale,
}

#[derive(Debug)]
pub struct EditorSession {
    model: ListModel,
    drag: DragSession<ContainerId, CardKey>,
    save: SaveState,
}

impl EditorSession {
    pub fn new(model: ListModel) -> Self {
        Self {
            model,
            drag: DragSession::new(),
            save: SaveState::Idle,
        }
    }

    pub fn model(&self) -> &ListModel {
        &self.model
    }

    pub fn save_state(&self) -> SaveState {
        self.save
    }

    pub fn drag(&self) -> &DragSession<ContainerId, CardKey> {
        &self.drag
    }

    fn check_editable(&self) -> EditResult<()> {
        match self.save {
            SaveState::Idle => Ok(()),
            SaveState::InFlight => Err(EditError::SaveInFlight),
            SaveState::Stale => Err(EditError::StaleSnapshot),
        }
    }

    /// Run an edit against the model unless a save blocks it
    pub fn edit<T>(&mut self, f: impl FnOnce(&mut ListModel) -> EditResult<T>) -> EditResult<T> {
        self.check_editable()?;
        f(&mut self.model)
    }

    // ========================
    // Pointer gestures
    // ========================

    /// Pointer down on a card. Returns false when the press is refused.
    pub fn press(&mut self, card: CardKey, at: Point) -> bool {
        if self.check_editable().is_err() {
            return false;
        }
        match self.model.origin(card) {
            Some((source, origin)) => self.drag.press(source, card, origin, at),
            None => false,
        }
    }

    /// Start dragging a card without waiting for the threshold
    pub fn pick_up(&mut self, card: CardKey) -> bool {
        if self.check_editable().is_err() {
            return false;
        }
        match self.model.origin(card) {
            Some((source, origin)) => self.drag.pick_up(source, card, origin),
            None => false,
        }
    }

    pub fn pointer_moved(&mut self, at: Point, hit: HitTarget<ContainerId, CardKey>) {
        self.drag.pointer_moved(at, hit);
    }

    /// Pointer up: commit the move the drag resolved to, if any
    pub fn release(&mut self) -> EditResult<DropOutcome<ContainerId, CardKey>> {
        let outcome = self.drag.release();
        if let DropOutcome::Move(request) = outcome {
            self.check_editable()?;
            self.model
                .move_item(request.item, request.from, request.to, request.target_item, request.before)?;
        }
        Ok(outcome)
    }

    pub fn cancel(&mut self) -> DropOutcome<ContainerId, CardKey> {
        self.drag.cancel()
    }

    // ========================
    // Save lifecycle
    // ========================

    /// Snapshot the list for saving and block edits until it answers
    pub fn begin_save(&mut self) -> EditResult<SaveRequest> {
        self.check_editable()?;
        let request = self.model.to_save_request()?;
        if self.drag.cancel() == DropOutcome::Cancelled {
            log::debug!("[Editor] drag cancelled by save");
        }
        self.save = SaveState::InFlight;
        log::info!("[Editor] saving list {}", request.list.id);
        Ok(request)
    }

    /// Apply the answer to the pending save.
    ///
    /// A failure leaves the local edits in place but marks them stale, since
    /// the server may or may not have applied them.
    pub fn finish_save(&mut self, result: Result<SaveOutcome, String>) -> EditResult<()> {
        if self.save != SaveState::InFlight {
            log::warn!("[Editor] save answer without a pending save");
            return Err(EditError::InvalidInput("no save in flight".to_string()));
        }
        match result {
            Ok(outcome) => {
                let w = &outcome.writes;
                log::info!(
                    "[Editor] list {} saved: {} created, {} updated, {} deleted",
                    outcome.list.id,
                    w.creates,
                    w.updates,
                    w.deletes
                );
                self.model.apply_outcome(&outcome);
                self.save = SaveState::Idle;
                Ok(())
            }
            Err(e) => {
                log::error!("[Editor] save failed: {}", e);
                self.save = SaveState::Stale;
                Err(EditError::StaleSnapshot)
            }
        }
    }

    /// Replace the local state with a fresh copy from the server
    pub fn reload(&mut self, list: &TierList) {
        self.drag.cancel();
        self.model = ListModel::from_server(list);
        self.save = SaveState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Tier, TierItem, Visibility, WriteStats};
    use tier_dragdrop::Rect;

    fn list() -> TierList {
        let item = |id: i64, tier_id: i64, name: &str, position: i64| TierItem {
            id,
            tier_id,
            name: name.to_string(),
            image_ref: format!("{}.png", name),
            position,
        };
        TierList {
            id: 4,
            title: "Snacks".to_string(),
            description: None,
            visibility: Visibility::Public,
            owner_id: 2,
            created_at: 0,
            tiers: vec![
                Tier {
                    id: 10,
                    tier_list_id: 4,
                    label: "S".to_string(),
                    color: "#FF7F7F".to_string(),
                    order: 0,
                    items: vec![item(1, 10, "A", 0), item(2, 10, "B", 1)],
                },
                Tier {
                    id: 11,
                    tier_list_id: 4,
                    label: "A".to_string(),
                    color: "#FFBF7F".to_string(),
                    order: 1,
                    items: vec![],
                },
            ],
        }
    }

    fn session() -> (EditorSession, ContainerId, ContainerId) {
        let model = ListModel::from_server(&list());
        let s = ContainerId::Tier(model.tiers()[0].key);
        let a = ContainerId::Tier(model.tiers()[1].key);
        (EditorSession::new(model), s, a)
    }

    fn card(session: &EditorSession, id: i64) -> CardKey {
        session
            .model()
            .tiers()
            .iter()
            .flat_map(|t| t.cards.iter())
            .find(|c| c.server_id == Some(id))
            .map(|c| c.key)
            .unwrap()
    }

    fn names(session: &EditorSession, id: ContainerId) -> Vec<String> {
        session
            .model()
            .container(id)
            .unwrap()
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    #[test]
    fn test_drag_moves_card() {
        let (mut editor, s, a) = session();
        let b = card(&editor, 2);

        assert!(editor.press(b, Point::new(0.0, 0.0)));
        editor.pointer_moved(Point::new(40.0, 0.0), HitTarget::Container(a));
        let outcome = editor.release().unwrap();

        assert!(matches!(outcome, DropOutcome::Move(_)));
        assert_eq!(names(&editor, s), vec!["A"]);
        assert_eq!(names(&editor, a), vec!["B"]);
        assert!(editor.model().is_dirty());
    }

    #[test]
    fn test_drop_before_sibling() {
        let (mut editor, s, _) = session();
        let (a, b) = (card(&editor, 1), card(&editor, 2));

        assert!(editor.pick_up(b));
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        editor.pointer_moved(Point::new(10.0, 50.0), HitTarget::Item { container: s, item: a, rect });
        editor.release().unwrap();
        assert_eq!(names(&editor, s), vec!["B", "A"]);
    }

    #[test]
    fn test_drop_in_place_is_noop() {
        let (mut editor, s, _) = session();
        let b = card(&editor, 2);

        editor.pick_up(b);
        editor.pointer_moved(Point::new(10.0, 10.0), HitTarget::Container(s));
        assert_eq!(editor.release().unwrap(), DropOutcome::NoOp);
        assert!(!editor.model().is_dirty());
    }

    #[test]
    fn test_save_blocks_edits_until_answered() {
        let (mut editor, s, a) = session();
        let b = card(&editor, 2);
        editor.pick_up(b);
        editor.pointer_moved(Point::new(0.0, 0.0), HitTarget::Container(a));

        let request = editor.begin_save().unwrap();
        assert_eq!(request.list.id, 4);
        assert_eq!(editor.drag().dragging_item(), None);
        assert_eq!(editor.release().unwrap(), DropOutcome::Ignored);

        assert!(!editor.press(b, Point::default()));
        assert_eq!(editor.edit(|m| m.add_card("X", "x.png")), Err(EditError::SaveInFlight));
        assert_eq!(editor.begin_save(), Err(EditError::SaveInFlight));

        let outcome = SaveOutcome {
            list: list(),
            assigned_tiers: vec![],
            assigned_items: vec![],
            writes: WriteStats::default(),
        };
        editor.finish_save(Ok(outcome)).unwrap();
        assert_eq!(editor.save_state(), SaveState::Idle);
        assert_eq!(names(&editor, s), vec!["A", "B"]);
        assert!(editor.edit(|m| m.add_card("X", "x.png")).is_ok());
    }

    #[test]
    fn test_failed_save_goes_stale_until_reload() {
        let (mut editor, _, _) = session();
        editor.edit(|m| m.add_card("X", "x.png")).unwrap();
        editor.begin_save().unwrap();

        assert_eq!(editor.finish_save(Err("disk full".to_string())), Err(EditError::StaleSnapshot));
        assert_eq!(editor.save_state(), SaveState::Stale);
        assert_eq!(editor.begin_save(), Err(EditError::StaleSnapshot));
        assert!(editor.model().is_dirty());

        editor.reload(&list());
        assert_eq!(editor.save_state(), SaveState::Idle);
        assert!(!editor.model().is_dirty());
        assert!(editor.begin_save().is_ok());
    }

    #[test]
    fn test_answer_without_save_is_rejected() {
        let (mut editor, _, _) = session();
        assert!(matches!(editor.finish_save(Err("late".to_string())), Err(EditError::InvalidInput(_))));
        assert_eq!(editor.save_state(), SaveState::Idle);
    }
}
