#![forbid(unsafe_code)]

//! `rbar-dom` binds the `rbar-core` state machine to a document.
//!
//! The [`Document`] trait is the only seam to the host: `rbar-web` implements
//! it over `web-sys`, and [`MemoryDocument`] implements it in memory for tests
//! and non-browser hosts.

pub mod app;
pub mod document;
pub mod memory;
pub mod renderer;

pub use app::{Lifecycle, ResizableBar};
pub use document::{Document, DomError};
pub use memory::{MemoryDocument, NodeId};
pub use renderer::{BarControls, BarRenderer, DocumentSurface};

pub use rbar_core;
