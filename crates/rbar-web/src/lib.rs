#![forbid(unsafe_code)]

//! Browser host for resizable bars.
//!
//! On `wasm32` this crate exports `installResizableBar`, which wires a
//! [`rbar_dom::ResizableBar`] to the live document and `sessionStorage`:
//! pre-hydration styles are inserted immediately, bars are rendered once the
//! page has loaded, and mouse input is routed through the controller.
//!
//! The translation from controller dispatches to host effects lives in
//! [`host`] so it can be tested natively.

pub mod host;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use dom::{WebDocument, WebSessionStorage};
#[cfg(target_arch = "wasm32")]
pub use wasm::{ResizableBarHandle, install_resizable_bar};
