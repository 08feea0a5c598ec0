#![forbid(unsafe_code)]

//! Arena-backed [`Document`] for tests and non-browser hosts.
//!
//! There is no layout engine: the rendered width of an element is derived from
//! its inline `width` style (`px` or `vw`), unless a test pins it with
//! [`MemoryDocument::set_rendered_width`].

use core::fmt::Write as _;

use crate::document::{Document, DomError};

/// Handle to a node of a [`MemoryDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        style: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    rendered_width: Option<u32>,
}

/// In-memory document tree: `<html><head/><body/></html>`.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<NodeData>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    viewport_width: u32,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;

    #[must_use]
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
            viewport_width: Self::DEFAULT_VIEWPORT_WIDTH,
        };
        doc.root = doc.alloc_element("html");
        doc.head = doc.alloc_element("head");
        doc.body = doc.alloc_element("body");
        doc.attach(doc.root, doc.head);
        doc.attach(doc.root, doc.body);
        doc
    }

    #[must_use]
    pub const fn head(&self) -> NodeId {
        self.head
    }

    #[must_use]
    pub const fn body(&self) -> NodeId {
        self.body
    }

    pub fn set_viewport_width(&mut self, width: u32) {
        self.viewport_width = width;
    }

    /// Create an element with attributes and append it to `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        let node = self.alloc_element(tag);
        if let NodeKind::Element { attributes: attrs, .. } = &mut self.nodes[node.0].kind {
            attrs.extend(
                attributes
                    .iter()
                    .map(|(name, value)| ((*name).to_owned(), (*value).to_owned())),
            );
        }
        self.attach(parent, node);
        node
    }

    /// Create a text node and append it to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let node = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind: NodeKind::Text(text.to_owned()),
            parent: None,
            children: Vec::new(),
            rendered_width: None,
        });
        self.attach(parent, node);
        node
    }

    /// Pin the rendered width of `node`, overriding its inline style.
    pub fn set_rendered_width(&mut self, node: NodeId, width: Option<u32>) {
        if let Some(data) = self.nodes.get_mut(node.0) {
            data.rendered_width = width;
        }
    }

    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    /// Concatenated text of `node` and its descendants.
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    /// Compact HTML serialization of `node`, for assertions and debugging.
    #[must_use]
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn alloc_element(&mut self, tag: &str) -> NodeId {
        let node = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind: NodeKind::Element {
                tag: tag.to_owned(),
                attributes: Vec::new(),
                style: Vec::new(),
            },
            parent: None,
            children: Vec::new(),
            rendered_width: None,
        });
        node
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(old) = self.nodes[child.0].parent.take() {
            self.nodes[old.0].children.retain(|c| *c != child);
        }
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.nodes[current.0].parent;
        }
        false
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(node.0) else {
            return;
        };
        if let NodeKind::Text(text) = &data.kind {
            out.push_str(text);
        }
        for child in &data.children {
            self.collect_text(*child, out);
        }
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(node.0) else {
            return;
        };
        match &data.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element {
                tag,
                attributes,
                style,
            } => {
                let _ = write!(out, "<{tag}");
                for (name, value) in attributes {
                    if value.is_empty() {
                        let _ = write!(out, " {name}");
                    } else {
                        let _ = write!(out, " {name}=\"{value}\"");
                    }
                }
                if !style.is_empty() {
                    let inline: Vec<String> =
                        style.iter().map(|(p, v)| format!("{p}: {v}")).collect();
                    let _ = write!(out, " style=\"{}\"", inline.join("; "));
                }
                out.push('>');
                for child in &data.children {
                    self.write_html(*child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }

    fn walk(&self, node: NodeId, visit: &mut impl FnMut(NodeId)) {
        visit(node);
        for child in &self.nodes[node.0].children {
            self.walk(*child, visit);
        }
    }

    fn element_parts(&self, node: NodeId) -> Option<(&[(String, String)], &[(String, String)])> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element {
                attributes, style, ..
            } => Some((attributes, style)),
            NodeKind::Text(_) => None,
        }
    }

    fn parse_width(&self, value: &str) -> Option<u32> {
        let value = value.trim();
        let (number, scale) = if let Some(px) = value.strip_suffix("px") {
            (px, 1.0)
        } else if let Some(vw) = value.strip_suffix("vw") {
            (vw, f64::from(self.viewport_width) / 100.0)
        } else {
            return None;
        };
        let parsed: f64 = number.trim().parse().ok()?;
        if !parsed.is_finite() {
            return None;
        }
        Some((parsed * scale).round().clamp(0.0, f64::from(u32::MAX)) as u32)
    }
}

fn upsert(list: &mut Vec<(String, String)>, name: &str, value: &str) {
    if let Some(entry) = list.iter_mut().find(|(n, _)| n == name) {
        entry.1 = value.to_owned();
    } else {
        list.push((name.to_owned(), value.to_owned()));
    }
}

impl Document for MemoryDocument {
    type Node = NodeId;

    fn query_all_with_attribute(&self, name: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.walk(self.root, &mut |node| {
            let marked = self
                .element_parts(node)
                .is_some_and(|(attributes, _)| attributes.iter().any(|(n, _)| n == name));
            if marked {
                found.push(node);
            }
        });
        found
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        let (attributes, _) = self.element_parts(*node)?;
        attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        if let Some(NodeData {
            kind: NodeKind::Element { attributes, .. },
            ..
        }) = self.nodes.get_mut(node.0)
        {
            upsert(attributes, name, value);
        }
    }

    fn style_property(&self, node: &NodeId, property: &str) -> Option<String> {
        let (_, style) = self.element_parts(*node)?;
        style
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.clone())
    }

    fn set_style_property(&mut self, node: &NodeId, property: &str, value: &str) {
        if let Some(NodeData {
            kind: NodeKind::Element { style, .. },
            ..
        }) = self.nodes.get_mut(node.0)
        {
            upsert(style, property, value);
        }
    }

    fn create_element(&mut self, tag: &str) -> Result<NodeId, DomError> {
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(DomError::CreateElement {
                tag: tag.to_owned(),
                reason: "invalid tag name".to_owned(),
            });
        }
        Ok(self.alloc_element(tag))
    }

    fn child_nodes(&self, node: &NodeId) -> Vec<NodeId> {
        self.nodes
            .get(node.0)
            .map(|data| data.children.clone())
            .unwrap_or_default()
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), DomError> {
        if parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() {
            return Err(DomError::Insert("unknown node".to_owned()));
        }
        if matches!(self.nodes[parent.0].kind, NodeKind::Text(_)) {
            return Err(DomError::Insert("text nodes have no children".to_owned()));
        }
        if self.is_ancestor(*child, *parent) {
            return Err(DomError::Insert("node would contain itself".to_owned()));
        }
        self.attach(*parent, *child);
        Ok(())
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    fn set_text_content(&mut self, node: &NodeId, text: &str) {
        if node.0 >= self.nodes.len() {
            return;
        }
        let old = std::mem::take(&mut self.nodes[node.0].children);
        for child in old {
            self.nodes[child.0].parent = None;
        }
        if let NodeKind::Text(existing) = &mut self.nodes[node.0].kind {
            *existing = text.to_owned();
        } else if !text.is_empty() {
            self.append_text(*node, text);
        }
    }

    fn append_to_head(&mut self, node: &NodeId) -> Result<(), DomError> {
        let head = self.head;
        self.append_child(&head, node)
    }

    fn offset_width(&self, node: &NodeId) -> Option<u32> {
        let data = self.nodes.get(node.0)?;
        if let Some(width) = data.rendered_width {
            return Some(width);
        }
        let width = self.style_property(node, "width")?;
        self.parse_width(&width)
    }
}
