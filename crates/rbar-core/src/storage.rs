#![forbid(unsafe_code)]

//! Session-scoped persistence of per-bar `{state, width}` records.
//!
//! All records live in one JSON object stored under a single key:
//!
//! ```json
//! { "toc": { "state": "closed", "width": 150 }, "nav": { "state": "open" } }
//! ```
//!
//! Reads never fail: a missing key, a missing field, an unreadable backend or a
//! corrupt blob all resolve to "absent". Writes are read-merge-write and keep
//! every other id and every other field, including fields this crate does not
//! interpret. A failed write is logged and skipped.

use core::fmt;
use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::model::{BarId, BarState};

/// Failure reported by a [`SessionStorage`] backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Storage is not available in this environment (disabled, sandboxed, ...).
    Unavailable(String),
    /// The backend rejected a write, e.g. quota exceeded.
    WriteRejected(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "session storage unavailable: {msg}"),
            Self::WriteRejected(msg) => write!(f, "session storage write rejected: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {}

/// Minimal string key/value API of a session-scoped store.
pub trait SessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory [`SessionStorage`] with failure injection, for tests and
/// non-browser hosts.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
    fail_reads: bool,
    fail_writes: bool,
    writes: usize,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with one raw item.
    #[must_use]
    pub fn with_item(key: &str, value: &str) -> Self {
        let mut storage = Self::default();
        storage.items.insert(key.to_owned(), value.to_owned());
        storage
    }

    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Number of successful writes so far.
    #[must_use]
    pub const fn writes(&self) -> usize {
        self.writes
    }

    #[must_use]
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads {
            return Err(StorageError::Unavailable("reads disabled".to_owned()));
        }
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::WriteRejected("quota exceeded".to_owned()));
        }
        self.items.insert(key.to_owned(), value.to_owned());
        self.writes += 1;
        Ok(())
    }
}

/// Field of a persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarField {
    State,
    Width,
}

impl BarField {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::State => "state",
            Self::Width => "width",
        }
    }
}

/// Typed value of one persisted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue {
    State(BarState),
    Width(u32),
}

impl FieldValue {
    #[must_use]
    pub const fn field(self) -> BarField {
        match self {
            Self::State(_) => BarField::State,
            Self::Width(_) => BarField::Width,
        }
    }

    fn to_json(self) -> Value {
        match self {
            Self::State(state) => Value::from(state.as_str()),
            Self::Width(width) => Value::from(width),
        }
    }

    fn from_json(field: BarField, value: &Value) -> Option<Self> {
        match field {
            BarField::State => value.as_str()?.parse().ok().map(Self::State),
            BarField::Width => parse_width(value).map(Self::Width),
        }
    }
}

fn parse_width(value: &Value) -> Option<u32> {
    if let Some(int) = value.as_u64() {
        return u32::try_from(int).ok().filter(|w| *w > 0);
    }
    let float = value.as_f64()?;
    if float.is_finite() && float >= 1.0 && float <= f64::from(u32::MAX) {
        Some(float.round() as u32)
    } else {
        None
    }
}

/// Decoded `{state, width}` pair for one bar. Either field may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistedRecord {
    pub state: Option<BarState>,
    pub width: Option<u32>,
}

/// Namespaced persistence layer over a [`SessionStorage`] backend.
#[derive(Debug, Clone)]
pub struct PersistenceStore<S> {
    storage: S,
    key: String,
}

impl<S: SessionStorage> PersistenceStore<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Read one field; absent on any missing data or backend failure.
    #[must_use]
    pub fn get(&self, id: &str, field: BarField) -> Option<FieldValue> {
        let root = self.load();
        let value = root.get(id)?.as_object()?.get(field.key())?;
        FieldValue::from_json(field, value)
    }

    #[must_use]
    pub fn state(&self, id: &str) -> Option<BarState> {
        match self.get(id, BarField::State)? {
            FieldValue::State(state) => Some(state),
            FieldValue::Width(_) => None,
        }
    }

    #[must_use]
    pub fn width(&self, id: &str) -> Option<u32> {
        match self.get(id, BarField::Width)? {
            FieldValue::Width(width) => Some(width),
            FieldValue::State(_) => None,
        }
    }

    /// Both fields of one record, decoded from a single read.
    #[must_use]
    pub fn record(&self, id: &str) -> PersistedRecord {
        let root = self.load();
        root.get(id)
            .and_then(Value::as_object)
            .map(decode_record)
            .unwrap_or_default()
    }

    /// Every stored record in key order. Entries that are not objects are skipped.
    #[must_use]
    pub fn records(&self) -> Vec<(BarId, PersistedRecord)> {
        self.load()
            .iter()
            .filter_map(|(id, entry)| {
                entry
                    .as_object()
                    .map(|fields| (BarId::new(id.as_str()), decode_record(fields)))
            })
            .collect()
    }

    /// Merge one field into the record of `id`, preserving everything else.
    ///
    /// Returns whether the write reached the backend. Failures are logged and
    /// otherwise ignored.
    pub fn set(&mut self, id: &str, value: FieldValue) -> bool {
        let mut root = self.load();
        let entry = root
            .entry(id.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(fields) = entry {
            fields.insert(value.field().key().to_owned(), value.to_json());
        }

        let serialized = Value::Object(root).to_string();
        match self.storage.set_item(&self.key, &serialized) {
            Ok(()) => {
                tracing::trace!(bar = id, ?value, "persisted bar field");
                true
            }
            Err(err) => {
                tracing::warn!(bar = id, error = %err, "skipping bar persistence write");
                false
            }
        }
    }

    fn load(&self) -> Map<String, Value> {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Map::new(),
            Err(err) => {
                tracing::debug!(key = %self.key, error = %err, "bar storage unreadable");
                return Map::new();
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(root)) => root,
            Ok(Value::Null) => Map::new(),
            Ok(other) => {
                tracing::debug!(key = %self.key, kind = json_kind(&other), "discarding non-object bar storage");
                Map::new()
            }
            Err(err) => {
                tracing::debug!(key = %self.key, error = %err, "discarding corrupt bar storage");
                Map::new()
            }
        }
    }
}

fn decode_record(fields: &Map<String, Value>) -> PersistedRecord {
    let state = fields
        .get(BarField::State.key())
        .and_then(|value| FieldValue::from_json(BarField::State, value));
    let width = fields
        .get(BarField::Width.key())
        .and_then(|value| FieldValue::from_json(BarField::Width, value));
    PersistedRecord {
        state: match state {
            Some(FieldValue::State(state)) => Some(state),
            _ => None,
        },
        width: match width {
            Some(FieldValue::Width(width)) => Some(width),
            _ => None,
        },
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
