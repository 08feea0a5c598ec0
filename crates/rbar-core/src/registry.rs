#![forbid(unsafe_code)]

//! In-memory state of every registered bar plus the single drag session.
//!
//! The registry is an owned value: hosts create one per page and pass it by
//! reference to the renderer and the controller.

use core::fmt;

use rustc_hash::FxHashMap;

use crate::model::{BarId, BarPosition, BarState};

/// Current state of one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarRecord {
    pub position: BarPosition,
    pub state: BarState,
    /// Width in pixels; `None` renders at the configured maximum width.
    pub width: Option<u32>,
}

/// Partial update applied by [`StateRegistry::update_fields`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BarPatch {
    pub state: Option<BarState>,
    pub width: Option<u32>,
}

impl BarPatch {
    #[must_use]
    pub const fn state(state: BarState) -> Self {
        Self {
            state: Some(state),
            width: None,
        }
    }

    #[must_use]
    pub const fn width(width: u32) -> Self {
        Self {
            state: None,
            width: Some(width),
        }
    }
}

/// The in-progress resize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    pub id: BarId,
    /// Pointer page x at drag start.
    pub anchor_page_x: i32,
    /// Rendered width of the bar at drag start.
    pub anchor_width: u32,
}

/// Rejected registry operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The id has never been registered.
    UnknownBar(BarId),
    /// A drag session is already active.
    DragInProgress { active: BarId },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownBar(id) => write!(f, "bar {id:?} is not registered"),
            Self::DragInProgress { active } => {
                write!(f, "a drag of bar {active:?} is already in progress")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Registry of bar records keyed by id, plus the process-wide drag slot.
#[derive(Debug, Clone, Default)]
pub struct StateRegistry {
    bars: FxHashMap<BarId, BarRecord>,
    order: Vec<BarId>,
    drag: Option<DragSession>,
}

impl StateRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or fully replace the record of `id`.
    pub fn set_bar(&mut self, id: BarId, record: BarRecord) {
        if self.bars.insert(id.clone(), record).is_none() {
            self.order.push(id);
        }
    }

    /// Merge `patch` into an existing record.
    ///
    /// # Panics
    ///
    /// Panics if `id` was never registered: partial state for an unknown bar
    /// is a wiring bug.
    #[track_caller]
    pub fn update_fields(&mut self, id: &str, patch: BarPatch) {
        let Some(record) = self.bars.get_mut(id) else {
            panic!("update_fields(): bar {id:?} is not registered");
        };
        if let Some(state) = patch.state {
            record.state = state;
        }
        if let Some(width) = patch.width.filter(|w| *w > 0) {
            record.width = Some(width);
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&BarRecord> {
        self.bars.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.bars.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Registered records in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&BarId, &BarRecord)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.bars.get_key_value(id.as_str()))
    }

    /// Start a drag of `id`, snapshotting the live rendered width.
    pub fn begin_drag(
        &mut self,
        id: &str,
        page_x: i32,
        live_width: u32,
    ) -> Result<&DragSession, RegistryError> {
        if let Some(active) = &self.drag {
            return Err(RegistryError::DragInProgress {
                active: active.id.clone(),
            });
        }
        let Some((key, record)) = self.bars.get_key_value(id) else {
            return Err(RegistryError::UnknownBar(BarId::new(id)));
        };
        let key = key.clone();
        let anchored = (live_width > 0).then_some(live_width).or(record.width);
        if let Some(record) = self.bars.get_mut(id) {
            record.width = anchored;
        }
        Ok(&*self.drag.insert(DragSession {
            id: key,
            anchor_page_x: page_x,
            anchor_width: anchored.unwrap_or(0),
        }))
    }

    /// Clear the drag session. Safe to call with no active session.
    pub fn end_drag(&mut self) -> Option<DragSession> {
        self.drag.take()
    }

    #[must_use]
    pub fn drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn open_left(width: Option<u32>) -> BarRecord {
        BarRecord {
            position: BarPosition::Left,
            state: BarState::Open,
            width,
        }
    }

    #[test]
    fn update_merges_only_given_fields() {
        let mut registry = StateRegistry::new();
        registry.set_bar(BarId::new("toc"), open_left(Some(300)));
        registry.update_fields("toc", BarPatch::state(BarState::Closed));

        assert_eq!(
            registry.get("toc"),
            Some(&BarRecord {
                position: BarPosition::Left,
                state: BarState::Closed,
                width: Some(300),
            })
        );
    }

    #[test]
    #[should_panic(expected = "is not registered")]
    fn update_of_unknown_bar_panics() {
        let mut registry = StateRegistry::new();
        registry.update_fields("ghost", BarPatch::width(10));
    }

    #[test]
    fn set_bar_twice_keeps_one_record() {
        let mut registry = StateRegistry::new();
        registry.set_bar(BarId::new("toc"), open_left(None));
        registry.set_bar(BarId::new("nav"), open_left(None));
        registry.set_bar(BarId::new("toc"), open_left(Some(5)));

        assert_eq!(registry.len(), 2);
        let ids: Vec<&str> = registry.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["toc", "nav"]);
    }

    #[test]
    fn begin_drag_snapshots_live_width() {
        let mut registry = StateRegistry::new();
        registry.set_bar(BarId::new("toc"), open_left(Some(180)));
        let session = registry.begin_drag("toc", 400, 256).unwrap().clone();

        assert_eq!(
            session,
            DragSession {
                id: BarId::new("toc"),
                anchor_page_x: 400,
                anchor_width: 256,
            }
        );
        assert_eq!(registry.get("toc").unwrap().width, Some(256));
    }

    #[test]
    fn second_drag_is_rejected() {
        let mut registry = StateRegistry::new();
        registry.set_bar(BarId::new("toc"), open_left(None));
        registry.set_bar(BarId::new("nav"), open_left(None));
        registry.begin_drag("toc", 0, 100).unwrap();

        assert_eq!(
            registry.begin_drag("nav", 0, 100).unwrap_err(),
            RegistryError::DragInProgress {
                active: BarId::new("toc")
            }
        );
        assert_eq!(
            registry.end_drag().map(|s| s.id),
            Some(BarId::new("toc"))
        );
    }

    #[test]
    fn begin_drag_of_unknown_bar_is_rejected() {
        let mut registry = StateRegistry::new();
        assert_eq!(
            registry.begin_drag("ghost", 0, 10).unwrap_err(),
            RegistryError::UnknownBar(BarId::new("ghost"))
        );
        assert!(!registry.is_dragging());
    }

    #[test]
    fn end_drag_is_idempotent() {
        let mut registry = StateRegistry::new();
        registry.set_bar(BarId::new("toc"), open_left(None));
        registry.begin_drag("toc", 10, 200).unwrap();

        assert!(registry.end_drag().is_some());
        assert_eq!(registry.end_drag(), None);
        assert!(registry.drag().is_none());
    }
}
