#![forbid(unsafe_code)]

//! Host-side interpretation of controller dispatches.

use std::collections::VecDeque;

use rbar_core::{
    ControllerDispatch, ControllerPhase, DispatchOutcome, IgnoredReason, ListenerCommand,
};

/// What the browser host must do after one dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostEffects {
    /// Attach or detach the window `mousemove`/`mouseup` listeners.
    pub listeners: Option<ListenerCommand>,
    /// Schedule one `requestAnimationFrame` callback.
    pub request_frame: bool,
    /// Call `preventDefault` on the triggering event.
    pub prevent_default: bool,
}

impl HostEffects {
    #[must_use]
    pub fn of(dispatch: &ControllerDispatch) -> Self {
        Self {
            listeners: dispatch.listener_command,
            request_frame: dispatch.request_frame,
            // Keeps the press from starting a text selection.
            prevent_default: dispatch.phase == ControllerPhase::DragStart
                && dispatch.is_applied(),
        }
    }
}

/// Bounded buffer of formatted dispatch lines, drained by the host.
#[derive(Debug, Clone)]
pub struct DispatchLog {
    lines: VecDeque<String>,
    capacity: usize,
}

impl Default for DispatchLog {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

impl DispatchLog {
    pub const DEFAULT_CAPACITY: usize = 256;

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record `dispatch`, evicting the oldest line when full.
    pub fn push(&mut self, dispatch: &ControllerDispatch) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(format_dispatch(dispatch));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn take(&mut self) -> Vec<String> {
        self.lines.drain(..).collect()
    }
}

fn format_phase(phase: ControllerPhase) -> &'static str {
    match phase {
        ControllerPhase::Toggle => "toggle",
        ControllerPhase::DragStart => "drag_start",
        ControllerPhase::DragMove => "drag_move",
        ControllerPhase::AnimationFrame => "animation_frame",
        ControllerPhase::DragEnd => "drag_end",
    }
}

fn format_ignored_reason(reason: IgnoredReason) -> &'static str {
    match reason {
        IgnoredReason::ButtonNotPrimary => "button_not_primary",
        IgnoredReason::DragInProgress => "drag_in_progress",
        IgnoredReason::NoActiveDrag => "no_active_drag",
        IgnoredReason::UnknownBar => "unknown_bar",
        IgnoredReason::NothingPending => "nothing_pending",
    }
}

fn format_listener_command(command: Option<ListenerCommand>) -> &'static str {
    match command {
        Some(ListenerCommand::Attach) => "attach",
        Some(ListenerCommand::Detach) => "detach",
        None => "-",
    }
}

/// One-line `key=value` summary of a dispatch.
#[must_use]
pub fn format_dispatch(dispatch: &ControllerDispatch) -> String {
    let phase = format_phase(dispatch.phase);
    let sequence = dispatch.sequence;
    let bar = dispatch.id.as_ref().map_or("-", |id| id.as_str());
    let width = dispatch
        .live_width
        .map_or_else(|| "-".to_owned(), |w| w.to_string());
    let transition = dispatch.transition.as_ref().map_or_else(
        || "-".to_owned(),
        |t| format!("{}->{}", t.from.as_str(), t.to.as_str()),
    );
    let listeners = format_listener_command(dispatch.listener_command);
    let outcome = match dispatch.outcome {
        DispatchOutcome::Applied => "applied".to_owned(),
        DispatchOutcome::Queued => "queued".to_owned(),
        DispatchOutcome::Ignored(reason) => format!("ignored:{}", format_ignored_reason(reason)),
    };
    format!(
        "resizable_bar phase={phase} seq={sequence} bar={bar} width={width} transition={transition} listeners={listeners} outcome={outcome}"
    )
}
