#![forbid(unsafe_code)]

//! Document abstraction consumed by the renderer.
//!
//! Nodes are cheap handles owned by the document; the renderer only keeps
//! clones of them for attribute and style mutation.

use core::fmt;

/// Failure of a structural document operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The backend refused to create an element.
    CreateElement { tag: String, reason: String },
    /// The backend refused to move or insert a node.
    Insert(String),
    /// The document has no `<head>` to hold style elements.
    MissingHead,
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateElement { tag, reason } => {
                write!(f, "cannot create <{tag}> element: {reason}")
            }
            Self::Insert(reason) => write!(f, "cannot insert node: {reason}"),
            Self::MissingHead => f.write_str("document has no head element"),
        }
    }
}

impl std::error::Error for DomError {}

/// The subset of a DOM the bars need.
pub trait Document {
    type Node: Clone + PartialEq + fmt::Debug;

    /// Every element carrying attribute `name`, in document order.
    fn query_all_with_attribute(&self, name: &str) -> Vec<Self::Node>;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);

    fn style_property(&self, node: &Self::Node, property: &str) -> Option<String>;

    fn set_style_property(&mut self, node: &Self::Node, property: &str, value: &str);

    fn create_element(&mut self, tag: &str) -> Result<Self::Node, DomError>;

    /// Child nodes of `node`, text nodes included.
    fn child_nodes(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Append `child` to `parent`, detaching it from its previous parent.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), DomError>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    fn set_text_content(&mut self, node: &Self::Node, text: &str);

    fn append_to_head(&mut self, node: &Self::Node) -> Result<(), DomError>;

    /// Rendered width of `node` in pixels (`offsetWidth`).
    fn offset_width(&self, node: &Self::Node) -> Option<u32>;
}
