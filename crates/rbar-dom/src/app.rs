#![forbid(unsafe_code)]

//! Lifecycle facade wiring store, registry, renderer and controller to one
//! document.
//!
//! Hosts call [`ResizableBar::init`] as early as possible (before bar markup is
//! painted) and [`ResizableBar::render`] once the document has loaded. Input is
//! forwarded through [`ResizableBar::press`], [`ResizableBar::pointer_move`],
//! [`ResizableBar::animation_frame`] and [`ResizableBar::release`]; each returns
//! the controller's [`ControllerDispatch`] so the host can attach or detach its
//! document-wide listeners and schedule frames.

use rbar_core::{
    BarConfig, BarContext, BarController, BarId, ConfigError, ControlRole, ControllerDispatch,
    PersistenceStore, PointerButton, SessionStorage, StateRegistry, StyleGenerator, StyleKind,
};

use crate::document::Document;
use crate::renderer::{BarRenderer, DocumentSurface};

/// Run `$body` with the controller and a [`BarContext`] over this document.
macro_rules! with_context {
    ($this:ident, |$controller:ident, $cx:ident| $body:expr) => {{
        let mut surface = DocumentSurface {
            doc: &mut $this.document,
            renderer: &$this.renderer,
        };
        let $cx = BarContext {
            registry: &mut $this.registry,
            store: &mut $this.store,
            surface: &mut surface,
        };
        let $controller = &mut $this.controller;
        $body
    }};
}

/// Lifecycle point reached so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Lifecycle {
    Created,
    Initialized,
    Rendered,
}

/// Resizable bars of one document.
#[derive(Debug)]
pub struct ResizableBar<D: Document, S> {
    document: D,
    registry: StateRegistry,
    store: PersistenceStore<S>,
    renderer: BarRenderer<D::Node>,
    controller: BarController,
    lifecycle: Lifecycle,
}

impl<D: Document, S: SessionStorage> ResizableBar<D, S> {
    pub fn new(config: BarConfig, document: D, storage: S) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            document,
            registry: StateRegistry::new(),
            store: PersistenceStore::new(storage, config.storage_key.clone()),
            controller: BarController::new(config.gravity),
            renderer: BarRenderer::new(config),
            lifecycle: Lifecycle::Created,
        })
    }

    #[must_use]
    pub fn config(&self) -> &BarConfig {
        self.renderer.config()
    }

    #[must_use]
    pub const fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    #[must_use]
    pub const fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    #[must_use]
    pub const fn registry(&self) -> &StateRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn store(&self) -> &PersistenceStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PersistenceStore<S> {
        &mut self.store
    }

    #[must_use]
    pub const fn renderer(&self) -> &BarRenderer<D::Node> {
        &self.renderer
    }

    #[must_use]
    pub const fn controller(&self) -> &BarController {
        &self.controller
    }

    /// Insert the pre-hydration width and preloader stylesheets.
    pub fn init(&mut self) {
        let records = self.store.records();
        let generator = StyleGenerator::new(self.renderer.config());
        for kind in [StyleKind::InitialBar, StyleKind::InitialPreloader] {
            let css = generator.generate(kind, &records);
            if let Err(err) = self.renderer.insert_style(&mut self.document, kind, &css) {
                tracing::warn!(kind = kind.marker_suffix(), error = %err, "stylesheet not inserted");
            }
        }
        self.lifecycle = self.lifecycle.max(Lifecycle::Initialized);
    }

    /// Discover and wire bars, then insert the interactive stylesheets.
    ///
    /// Runs [`Self::init`] first if it has not run yet. Calling it again only
    /// picks up bars added since the previous call.
    pub fn render(&mut self) -> Vec<BarId> {
        let span = tracing::debug_span!("rbar.render", attribute = %self.renderer.config().attribute);
        let _guard = span.enter();
        if self.lifecycle < Lifecycle::Initialized {
            self.init();
        }
        let discovered = self
            .renderer
            .discover(&mut self.document, &mut self.registry, &self.store);

        let generator = StyleGenerator::new(self.renderer.config());
        for kind in [StyleKind::Bar, StyleKind::Preloader] {
            let css = generator.generate(kind, &[]);
            if let Err(err) = self.renderer.insert_style(&mut self.document, kind, &css) {
                tracing::warn!(kind = kind.marker_suffix(), error = %err, "stylesheet not inserted");
            }
        }
        self.lifecycle = Lifecycle::Rendered;
        tracing::debug!(count = discovered.len(), "bars rendered");
        discovered
    }

    /// Re-synchronize the element of `id` from the registry.
    pub fn update_bar(&mut self, id: &str) {
        self.renderer
            .update_bar(&mut self.document, &self.registry, id);
    }

    /// Press on any node: routed to drag start (border) or toggle (button).
    ///
    /// Returns `None` when the target is not a bar control.
    pub fn press(
        &mut self,
        target: &D::Node,
        button: PointerButton,
        page_x: i32,
    ) -> Option<ControllerDispatch> {
        let (id, role) = self.renderer.control_at(&self.document, target)?;
        match role {
            ControlRole::Border => Some(self.drag_start(id.as_str(), button, page_x)),
            ControlRole::Button => Some(self.toggle(id.as_str(), button)),
            ControlRole::Bar | ControlRole::Scroll | ControlRole::Handler => None,
        }
    }

    pub fn toggle(&mut self, id: &str, button: PointerButton) -> ControllerDispatch {
        with_context!(self, |controller, cx| controller.on_toggle(cx, id, button))
    }

    pub fn drag_start(&mut self, id: &str, button: PointerButton, page_x: i32) -> ControllerDispatch {
        with_context!(self, |controller, cx| controller.on_drag_start(cx, id, button, page_x))
    }

    /// Apply a drag move immediately.
    pub fn drag_move(&mut self, page_x: i32) -> ControllerDispatch {
        with_context!(self, |controller, cx| controller.on_drag_move(cx, page_x))
    }

    /// Buffer a drag move for the next animation frame.
    pub fn pointer_move(&mut self, page_x: i32) -> ControllerDispatch {
        self.controller.queue_drag_move(&self.registry, page_x)
    }

    pub fn animation_frame(&mut self) -> ControllerDispatch {
        with_context!(self, |controller, cx| controller.on_animation_frame(cx))
    }

    pub fn release(&mut self) -> ControllerDispatch {
        with_context!(self, |controller, cx| controller.on_drag_end(cx))
    }
}
