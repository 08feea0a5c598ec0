#![forbid(unsafe_code)]

//! `rbar-core` holds the host-independent half of resizable side bars.
//!
//! - [`storage`]: session-scoped `{state, width}` persistence.
//! - [`registry`]: in-memory bar records and the single drag session.
//! - [`style`]: pre-hydration, interactive and preloader stylesheets.
//! - [`controller`]: the toggle / drag-to-threshold state machine.
//!
//! Nothing here touches a real document. The DOM side lives in `rbar-dom`,
//! which implements [`controller::BarSurface`] for any document backend.

pub mod coalescer;
pub mod config;
pub mod controller;
pub mod model;
pub mod registry;
pub mod storage;
pub mod style;

pub use config::{BarColors, BarConfig, ConfigError};
pub use controller::{
    BarContext, BarController, BarSurface, ControllerDispatch, ControllerPhase, DispatchOutcome,
    IgnoredReason, ListenerCommand, StateTransition,
};
pub use model::{BarId, BarPosition, BarState, ControlRole, ParseVariantError, PointerButton};
pub use registry::{BarPatch, BarRecord, DragSession, RegistryError, StateRegistry};
pub use storage::{
    BarField, FieldValue, MemoryStorage, PersistedRecord, PersistenceStore, SessionStorage,
    StorageError,
};
pub use style::{StyleGenerator, StyleKind, toggle_glyph};
