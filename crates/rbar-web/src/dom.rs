#![forbid(unsafe_code)]

//! `web-sys` implementations of the document and storage seams.
//!
//! Only compiled on `wasm32` targets.

use rbar_core::{SessionStorage, StorageError};
use rbar_dom::{Document, DomError};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlElement, Node, Storage};

fn js_reason(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| String::from(err.message()))
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// The live browser document.
#[derive(Debug, Clone)]
pub struct WebDocument {
    document: web_sys::Document,
}

impl WebDocument {
    #[must_use]
    pub fn new(document: web_sys::Document) -> Self {
        Self { document }
    }
}

impl Document for WebDocument {
    type Node = Node;

    fn query_all_with_attribute(&self, name: &str) -> Vec<Node> {
        let list = match self.document.query_selector_all(&format!("[{name}]")) {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!(attribute = name, error = %js_reason(&err), "attribute query failed");
                return Vec::new();
            }
        };
        (0..list.length()).filter_map(|i| list.item(i)).collect()
    }

    fn attribute(&self, node: &Node, name: &str) -> Option<String> {
        node.dyn_ref::<Element>()?.get_attribute(name)
    }

    fn set_attribute(&mut self, node: &Node, name: &str, value: &str) {
        let Some(element) = node.dyn_ref::<Element>() else {
            return;
        };
        if let Err(err) = element.set_attribute(name, value) {
            tracing::warn!(attribute = name, error = %js_reason(&err), "setAttribute failed");
        }
    }

    fn style_property(&self, node: &Node, property: &str) -> Option<String> {
        let value = node
            .dyn_ref::<HtmlElement>()?
            .style()
            .get_property_value(property)
            .ok()?;
        (!value.is_empty()).then_some(value)
    }

    fn set_style_property(&mut self, node: &Node, property: &str, value: &str) {
        let Some(element) = node.dyn_ref::<HtmlElement>() else {
            return;
        };
        if let Err(err) = element.style().set_property(property, value) {
            tracing::warn!(property, error = %js_reason(&err), "style update failed");
        }
    }

    fn create_element(&mut self, tag: &str) -> Result<Node, DomError> {
        self.document
            .create_element(tag)
            .map(Node::from)
            .map_err(|err| DomError::CreateElement {
                tag: tag.to_owned(),
                reason: js_reason(&err),
            })
    }

    fn child_nodes(&self, node: &Node) -> Vec<Node> {
        let list = node.child_nodes();
        (0..list.length()).filter_map(|i| list.item(i)).collect()
    }

    fn append_child(&mut self, parent: &Node, child: &Node) -> Result<(), DomError> {
        parent
            .append_child(child)
            .map(drop)
            .map_err(|err| DomError::Insert(js_reason(&err)))
    }

    fn parent(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn set_text_content(&mut self, node: &Node, text: &str) {
        node.set_text_content(Some(text));
    }

    fn append_to_head(&mut self, node: &Node) -> Result<(), DomError> {
        let head = self.document.head().ok_or(DomError::MissingHead)?;
        head.append_child(node)
            .map(drop)
            .map_err(|err| DomError::Insert(js_reason(&err)))
    }

    fn offset_width(&self, node: &Node) -> Option<u32> {
        let width = node.dyn_ref::<HtmlElement>()?.offset_width();
        u32::try_from(width).ok()
    }
}

/// `window.sessionStorage`, or nothing when the browser denies it.
#[derive(Debug, Clone, Default)]
pub struct WebSessionStorage {
    storage: Option<Storage>,
}

impl WebSessionStorage {
    #[must_use]
    pub fn from_window(window: &web_sys::Window) -> Self {
        let storage = match window.session_storage() {
            Ok(storage) => storage,
            Err(err) => {
                tracing::warn!(error = %js_reason(&err), "sessionStorage unavailable");
                None
            }
        };
        Self { storage }
    }

    fn backend(&self) -> Result<&Storage, StorageError> {
        self.storage
            .as_ref()
            .ok_or_else(|| StorageError::Unavailable("sessionStorage is not accessible".to_owned()))
    }
}

impl SessionStorage for WebSessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.backend()?
            .get_item(key)
            .map_err(|err| StorageError::Unavailable(js_reason(&err)))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.backend()?
            .set_item(key, value)
            .map_err(|err| StorageError::WriteRejected(js_reason(&err)))
    }
}
