#![forbid(unsafe_code)]

//! Discovery, wrapping and attribute synchronization of bar elements.

use rustc_hash::FxHashMap;

use rbar_core::{
    BarConfig, BarId, BarPosition, BarRecord, BarState, BarSurface, ControlRole, PersistenceStore,
    SessionStorage, StateRegistry, StyleKind,
};

use crate::document::{Document, DomError};

/// Control elements generated inside one bar.
#[derive(Debug, Clone, PartialEq)]
pub struct BarControls<N> {
    pub scroll: N,
    pub handler: N,
    pub border: N,
    pub button: N,
}

/// Owns the id → element mapping and writes bar state into the document.
#[derive(Debug, Clone)]
pub struct BarRenderer<N> {
    config: BarConfig,
    bars: FxHashMap<BarId, N>,
    controls: FxHashMap<BarId, BarControls<N>>,
}

impl<N: Clone + PartialEq + core::fmt::Debug> BarRenderer<N> {
    #[must_use]
    pub fn new(config: BarConfig) -> Self {
        Self {
            config,
            bars: FxHashMap::default(),
            controls: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &BarConfig {
        &self.config
    }

    #[must_use]
    pub fn controls(&self, id: &str) -> Option<&BarControls<N>> {
        self.controls.get(id)
    }

    #[must_use]
    pub fn bar_element(&self, id: &str) -> Option<&N> {
        self.bars.get(id)
    }

    /// Find, register and wire every marked element not seen before.
    ///
    /// Returns the ids registered by this call, in document order. A bar whose
    /// controls cannot be built stays registered and synchronized but has no
    /// controls.
    pub fn discover<D, S>(
        &mut self,
        doc: &mut D,
        registry: &mut StateRegistry,
        store: &PersistenceStore<S>,
    ) -> Vec<BarId>
    where
        D: Document<Node = N>,
        S: SessionStorage,
    {
        let attr = self.config.attribute.clone();
        let mut discovered = Vec::new();
        for bar in doc.query_all_with_attribute(&attr) {
            let Some(raw_id) = doc.attribute(&bar, &attr) else {
                continue;
            };
            if raw_id.trim().is_empty() {
                tracing::warn!(attribute = %attr, "bar element without id skipped");
                continue;
            }
            let raw_id = raw_id.as_str();
            let id = BarId::new(raw_id);
            if let Some(known) = self.bars.get(raw_id) {
                if *known != bar {
                    tracing::warn!(bar = %id, "duplicate bar id skipped");
                }
                continue;
            }

            let position = read_position(doc, &bar, &id);
            let persisted = store.record(raw_id);
            let record = BarRecord {
                position,
                state: persisted.state.unwrap_or(BarState::Open),
                width: persisted.width,
            };
            registry.set_bar(id.clone(), record);
            self.write_bar(doc, &bar, &record);
            self.bars.insert(id.clone(), bar.clone());

            match self.build_controls(doc, &bar, &id, position) {
                Ok(controls) => {
                    self.controls.insert(id.clone(), controls);
                }
                Err(err) => {
                    tracing::warn!(bar = %id, error = %err, "bar controls not built");
                }
            }
            doc.set_attribute(&bar, "data-testid", &ControlRole::Bar.test_id(&id));
            tracing::debug!(bar = %id, %position, state = %record.state, width = ?record.width, "bar discovered");
            discovered.push(id);
        }
        discovered
    }

    /// Copy the registry record of `id` onto its element. Unknown ids are ignored.
    pub fn update_bar<D: Document<Node = N>>(&self, doc: &mut D, registry: &StateRegistry, id: &str) {
        let (Some(bar), Some(record)) = (self.bars.get(id), registry.get(id)) else {
            return;
        };
        self.write_bar(doc, bar, record);
    }

    fn write_bar<D: Document<Node = N>>(&self, doc: &mut D, bar: &N, record: &BarRecord) {
        let width = record
            .width
            .map_or_else(|| self.config.max_width.clone(), |w| format!("{w}px"));
        doc.set_style_property(bar, "width", &width);
        doc.set_attribute(bar, "data-position", record.position.as_str());
        doc.set_attribute(bar, "data-state", record.state.as_str());
    }

    fn build_controls<D: Document<Node = N>>(
        &self,
        doc: &mut D,
        bar: &N,
        id: &BarId,
        position: BarPosition,
    ) -> Result<BarControls<N>, DomError> {
        let scroll = self.create_control(doc, id, ControlRole::Scroll)?;
        doc.set_attribute(&scroll, &self.config.sub_attribute("scroll"), "y");
        for child in doc.child_nodes(bar) {
            doc.append_child(&scroll, &child)?;
        }
        doc.append_child(bar, &scroll)?;

        let handler = self.create_control(doc, id, ControlRole::Handler)?;
        doc.set_style_property(&handler, position.as_str(), "unset");

        let border = self.create_control(doc, id, ControlRole::Border)?;
        doc.set_attribute(&border, "title", &format!("Resize {id}"));
        doc.set_attribute(&border, "data-testid", &ControlRole::Border.test_id(id));

        let button = self.create_control(doc, id, ControlRole::Button)?;
        doc.set_attribute(&button, "title", &format!("Toggle {id}"));
        doc.set_attribute(&button, "data-testid", &ControlRole::Button.test_id(id));

        doc.append_child(&handler, &border)?;
        doc.append_child(&handler, &button)?;
        doc.append_child(bar, &handler)?;

        Ok(BarControls {
            scroll,
            handler,
            border,
            button,
        })
    }

    fn create_control<D: Document<Node = N>>(
        &self,
        doc: &mut D,
        id: &BarId,
        role: ControlRole,
    ) -> Result<N, DomError> {
        let node = doc.create_element("div")?;
        if let Some(suffix) = role.attribute_suffix() {
            doc.set_attribute(&node, &self.config.sub_attribute(suffix), "");
        }
        doc.set_attribute(&node, "data-content", id.as_str());
        Ok(node)
    }

    /// Resolve an event target to the bar control it belongs to.
    ///
    /// Walks up from `node` to the nearest generated control, stopping at the
    /// bar element itself.
    pub fn control_at<D: Document<Node = N>>(
        &self,
        doc: &D,
        node: &N,
    ) -> Option<(BarId, ControlRole)> {
        const ROLES: [ControlRole; 4] = [
            ControlRole::Border,
            ControlRole::Button,
            ControlRole::Handler,
            ControlRole::Scroll,
        ];
        let mut cursor = Some(node.clone());
        while let Some(current) = cursor {
            if doc.attribute(&current, &self.config.attribute).is_some() {
                return None;
            }
            let role = ROLES.into_iter().find(|role| {
                role.attribute_suffix().is_some_and(|suffix| {
                    doc.attribute(&current, &self.config.sub_attribute(suffix))
                        .is_some()
                })
            });
            if let (Some(role), Some(id)) = (role, doc.attribute(&current, "data-content")) {
                if self.controls.contains_key(id.as_str()) {
                    return Some((BarId::new(id), role));
                }
            }
            cursor = doc.parent(&current);
        }
        None
    }

    /// Insert or replace the `<style>` element of `kind`.
    pub fn insert_style<D: Document<Node = N>>(
        &self,
        doc: &mut D,
        kind: StyleKind,
        css: &str,
    ) -> Result<(), DomError> {
        let marker = self.config.sub_attribute(kind.marker_suffix());
        if let Some(existing) = doc.query_all_with_attribute(&marker).into_iter().next() {
            doc.set_text_content(&existing, css);
            return Ok(());
        }
        let style = doc.create_element("style")?;
        doc.set_attribute(&style, &marker, "");
        doc.set_text_content(&style, css);
        doc.append_to_head(&style)
    }
}

fn read_position<D: Document>(doc: &D, bar: &D::Node, id: &BarId) -> BarPosition {
    match doc.attribute(bar, "data-position") {
        Some(raw) => raw.parse().unwrap_or_else(|err| {
            tracing::warn!(bar = %id, error = %err, "falling back to left position");
            BarPosition::Left
        }),
        None => BarPosition::Left,
    }
}

/// [`BarSurface`] over a document and the renderer's element map.
pub struct DocumentSurface<'a, D: Document> {
    pub doc: &'a mut D,
    pub renderer: &'a BarRenderer<D::Node>,
}

impl<D: Document> BarSurface for DocumentSurface<'_, D> {
    fn rendered_width(&self, id: &str) -> Option<u32> {
        let bar = self.renderer.bar_element(id)?;
        self.doc.offset_width(bar)
    }

    fn set_live_width(&mut self, id: &str, width: i64) {
        if let Some(bar) = self.renderer.bar_element(id) {
            self.doc.set_style_property(bar, "width", &format!("{width}px"));
        }
    }

    fn sync_bar(&mut self, id: &str, record: &BarRecord) {
        if let Some(bar) = self.renderer.bar_element(id) {
            self.renderer.write_bar(self.doc, bar, record);
        }
    }
}
