#![forbid(unsafe_code)]

//! Interaction state machine for bar toggling and drag resizing.
//!
//! The controller is independent of how input is delivered. Hosts translate
//! their events into calls to [`BarController::on_toggle`],
//! [`BarController::on_drag_start`], [`BarController::on_drag_move`] and
//! [`BarController::on_drag_end`], and act on the returned
//! [`ControllerDispatch`]:
//!
//! - `listener_command` tells the host to attach or detach its document-wide
//!   move/release listeners;
//! - `request_frame` tells the host to schedule an animation frame that calls
//!   [`BarController::on_animation_frame`].
//!
//! ```text
//!            border press                 release
//!   Idle ───────────────────▶ Dragging ───────────▶ Idle
//!    │                          │  move: w = anchor + Δx
//!    │ button press             │  w <  gravity && open   → closed
//!    ▼                          │  w >= gravity && closed → open
//!  toggle (open ⇄ closed)       ▼
//! ```

use crate::coalescer::MoveCoalescer;
use crate::model::{BarId, BarState, PointerButton};
use crate::registry::{BarPatch, BarRecord, StateRegistry};
use crate::storage::{FieldValue, PersistenceStore, SessionStorage};

/// Host-side view of the rendered bars.
pub trait BarSurface {
    /// Width the bar currently occupies on screen, in pixels.
    fn rendered_width(&self, id: &str) -> Option<u32>;

    /// Write a transient width to the bar's inline style without touching
    /// the registry.
    fn set_live_width(&mut self, id: &str, width: i64);

    /// Copy `record` onto the bar element (width, position, state).
    fn sync_bar(&mut self, id: &str, record: &BarRecord);
}

/// Mutable collaborators borrowed for one dispatch.
pub struct BarContext<'a, S, H: ?Sized> {
    pub registry: &'a mut StateRegistry,
    pub store: &'a mut PersistenceStore<S>,
    pub surface: &'a mut H,
}

/// Command for the host's document-wide move/release listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerCommand {
    Attach,
    Detach,
}

/// Input kind handled by one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    Toggle,
    DragStart,
    DragMove,
    AnimationFrame,
    DragEnd,
}

/// Why an input was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    ButtonNotPrimary,
    DragInProgress,
    NoActiveDrag,
    UnknownBar,
    NothingPending,
}

/// Outcome category for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Applied,
    /// A move was buffered for the next animation frame.
    Queued,
    Ignored(IgnoredReason),
}

/// Open/closed change caused by a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    pub id: BarId,
    pub from: BarState,
    pub to: BarState,
}

/// Result of one controller call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerDispatch {
    pub phase: ControllerPhase,
    pub sequence: u64,
    pub id: Option<BarId>,
    pub outcome: DispatchOutcome,
    pub transition: Option<StateTransition>,
    pub listener_command: Option<ListenerCommand>,
    pub request_frame: bool,
    /// Candidate width written to the live element, for moves.
    pub live_width: Option<i64>,
}

impl ControllerDispatch {
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self.outcome, DispatchOutcome::Applied)
    }
}

/// Drag/toggle state machine shared by all bars of a page.
#[derive(Debug, Clone)]
pub struct BarController {
    gravity: u32,
    moves: MoveCoalescer,
    listeners_attached: bool,
    next_sequence: u64,
}

impl BarController {
    #[must_use]
    pub const fn new(gravity: u32) -> Self {
        Self {
            gravity,
            moves: MoveCoalescer::new(),
            listeners_attached: false,
            next_sequence: 0,
        }
    }

    #[must_use]
    pub const fn gravity(&self) -> u32 {
        self.gravity
    }

    /// Whether the host should currently have document-wide listeners attached.
    #[must_use]
    pub const fn listeners_attached(&self) -> bool {
        self.listeners_attached
    }

    #[must_use]
    pub const fn has_pending_move(&self) -> bool {
        self.moves.is_pending()
    }

    /// Toggle button press.
    pub fn on_toggle<S: SessionStorage, H: BarSurface + ?Sized>(
        &mut self,
        cx: BarContext<'_, S, H>,
        id: &str,
        button: PointerButton,
    ) -> ControllerDispatch {
        let mut dispatch = self.dispatch(ControllerPhase::Toggle, Some(id));
        if !button.is_primary() {
            return dispatch.ignore(IgnoredReason::ButtonNotPrimary);
        }
        if cx.registry.is_dragging() {
            tracing::debug!(bar = id, "toggle ignored during drag");
            return dispatch.ignore(IgnoredReason::DragInProgress);
        }
        let Some(record) = cx.registry.get(id) else {
            return dispatch.ignore(IgnoredReason::UnknownBar);
        };
        let to = record.state.toggled();
        dispatch.transition = Some(commit_state(cx, id, to));
        dispatch
    }

    /// Border press: begin a drag anchored at the bar's rendered width.
    pub fn on_drag_start<S: SessionStorage, H: BarSurface + ?Sized>(
        &mut self,
        cx: BarContext<'_, S, H>,
        id: &str,
        button: PointerButton,
        page_x: i32,
    ) -> ControllerDispatch {
        let dispatch = self.dispatch(ControllerPhase::DragStart, Some(id));
        if !button.is_primary() {
            return dispatch.ignore(IgnoredReason::ButtonNotPrimary);
        }
        if cx.registry.is_dragging() {
            return dispatch.ignore(IgnoredReason::DragInProgress);
        }
        if !cx.registry.contains(id) {
            return dispatch.ignore(IgnoredReason::UnknownBar);
        }
        let live_width = cx.surface.rendered_width(id).unwrap_or(0);
        match cx.registry.begin_drag(id, page_x, live_width) {
            Ok(session) => {
                tracing::debug!(
                    bar = id,
                    page_x,
                    anchor_width = session.anchor_width,
                    "bar drag started"
                );
            }
            Err(err) => {
                tracing::debug!(bar = id, error = %err, "bar drag rejected");
                return dispatch.ignore(IgnoredReason::DragInProgress);
            }
        }
        self.moves.clear();
        self.listeners_attached = true;
        ControllerDispatch {
            listener_command: Some(ListenerCommand::Attach),
            ..dispatch
        }
    }

    /// Buffer a pointer move until the next animation frame.
    pub fn queue_drag_move(&mut self, registry: &StateRegistry, page_x: i32) -> ControllerDispatch {
        let id = registry.drag().map(|session| session.id.as_str());
        let mut dispatch = self.dispatch(ControllerPhase::DragMove, id);
        if id.is_none() {
            return dispatch.ignore(IgnoredReason::NoActiveDrag);
        }
        dispatch.request_frame = self.moves.push(page_x);
        dispatch.outcome = DispatchOutcome::Queued;
        dispatch
    }

    /// Apply the buffered move, if any.
    pub fn on_animation_frame<S: SessionStorage, H: BarSurface + ?Sized>(
        &mut self,
        cx: BarContext<'_, S, H>,
    ) -> ControllerDispatch {
        let Some(page_x) = self.moves.take() else {
            let id = cx.registry.drag().map(|session| session.id.as_str());
            return self
                .dispatch(ControllerPhase::AnimationFrame, id)
                .ignore(IgnoredReason::NothingPending);
        };
        let mut dispatch = self.on_drag_move(cx, page_x);
        dispatch.phase = ControllerPhase::AnimationFrame;
        dispatch
    }

    /// Pointer move while dragging: track the pointer and apply the gravity rule.
    pub fn on_drag_move<S: SessionStorage, H: BarSurface + ?Sized>(
        &mut self,
        cx: BarContext<'_, S, H>,
        page_x: i32,
    ) -> ControllerDispatch {
        let BarContext {
            registry,
            store,
            surface,
        } = cx;
        let Some(session) = registry.drag().cloned() else {
            return self
                .dispatch(ControllerPhase::DragMove, None)
                .ignore(IgnoredReason::NoActiveDrag);
        };
        let id = session.id.as_str();
        let mut dispatch = self.dispatch(ControllerPhase::DragMove, Some(id));
        let Some(record) = registry.get(id).copied() else {
            return dispatch.ignore(IgnoredReason::UnknownBar);
        };

        let delta = i64::from(page_x) - i64::from(session.anchor_page_x);
        let width = i64::from(session.anchor_width) + record.position.width_sign() * delta;
        let gravity = i64::from(self.gravity);
        let crossing = match record.state {
            BarState::Open if width < gravity => Some(BarState::Closed),
            BarState::Closed if width >= gravity => Some(BarState::Open),
            _ => None,
        };

        if let Some(to) = crossing {
            tracing::debug!(bar = id, width, gravity, to = %to, "bar crossed gravity threshold");
            dispatch.transition = Some(commit_state(
                BarContext {
                    registry: &mut *registry,
                    store: &mut *store,
                    surface: &mut *surface,
                },
                id,
                to,
            ));
        }
        // Must run after any resync, which writes the stored width.
        surface.set_live_width(id, width);
        dispatch.live_width = Some(width);
        dispatch
    }

    /// Pointer release: flush the pending move, commit the rendered width and
    /// return to idle.
    pub fn on_drag_end<S: SessionStorage, H: BarSurface + ?Sized>(
        &mut self,
        cx: BarContext<'_, S, H>,
    ) -> ControllerDispatch {
        let BarContext {
            registry,
            store,
            surface,
        } = cx;

        let mut flushed = None;
        if let Some(page_x) = self.moves.take() {
            flushed = self
                .on_drag_move(
                    BarContext {
                        registry: &mut *registry,
                        store: &mut *store,
                        surface: &mut *surface,
                    },
                    page_x,
                )
                .transition;
        }

        let listener_command = self
            .listeners_attached
            .then_some(ListenerCommand::Detach);
        self.listeners_attached = false;

        let Some(session) = registry.drag().cloned() else {
            registry.end_drag();
            let dispatch = self.dispatch(ControllerPhase::DragEnd, None);
            return ControllerDispatch {
                listener_command,
                ..dispatch.ignore(IgnoredReason::NoActiveDrag)
            };
        };
        let id = session.id.as_str();
        let mut dispatch = self.dispatch(ControllerPhase::DragEnd, Some(id));
        dispatch.listener_command = listener_command;
        dispatch.transition = flushed;

        if registry.contains(id) {
            let final_width = surface
                .rendered_width(id)
                .filter(|width| *width > 0);
            if let Some(width) = final_width {
                registry.update_fields(id, BarPatch::width(width));
                store.set(id, FieldValue::Width(width));
            }
            if let Some(record) = registry.get(id) {
                surface.sync_bar(id, record);
            }
            tracing::debug!(bar = id, width = ?final_width, "bar drag ended");
        } else {
            dispatch.outcome = DispatchOutcome::Ignored(IgnoredReason::UnknownBar);
        }
        registry.end_drag();
        dispatch
    }

    fn dispatch(&mut self, phase: ControllerPhase, id: Option<&str>) -> ControllerDispatch {
        self.next_sequence = self.next_sequence.saturating_add(1);
        ControllerDispatch {
            phase,
            sequence: self.next_sequence,
            id: id.map(BarId::new),
            outcome: DispatchOutcome::Applied,
            transition: None,
            listener_command: None,
            request_frame: false,
            live_width: None,
        }
    }
}

impl ControllerDispatch {
    fn ignore(mut self, reason: IgnoredReason) -> Self {
        tracing::trace!(phase = ?self.phase, ?reason, "bar input ignored");
        self.outcome = DispatchOutcome::Ignored(reason);
        self
    }
}

/// Set the state of a registered bar, persist it and resync the element.
fn commit_state<S: SessionStorage, H: BarSurface + ?Sized>(
    cx: BarContext<'_, S, H>,
    id: &str,
    to: BarState,
) -> StateTransition {
    let from = cx.registry.get(id).map_or(to, |record| record.state);
    cx.registry.update_fields(id, BarPatch::state(to));
    cx.store.set(id, FieldValue::State(to));
    if let Some(record) = cx.registry.get(id) {
        cx.surface.sync_bar(id, record);
    }
    StateTransition {
        id: BarId::new(id),
        from,
        to,
    }
}
