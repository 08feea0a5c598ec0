#![forbid(unsafe_code)]

//! Core value types shared by the registry, store, styles and controller.

use core::fmt;
use core::str::FromStr;
use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

/// Stable identifier of one managed bar, taken from the marker attribute value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BarId(String);

impl BarId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for BarId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BarId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for BarId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Edge of the viewer a bar is anchored to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarPosition {
    #[default]
    Left,
    Right,
}

impl BarPosition {
    pub const ALL: [Self; 2] = [Self::Left, Self::Right];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Sign applied to a horizontal pointer delta to obtain a width delta.
    ///
    /// A left bar grows when the pointer moves right; a right bar grows when
    /// the pointer moves left.
    #[must_use]
    pub const fn width_sign(self) -> i64 {
        match self {
            Self::Left => 1,
            Self::Right => -1,
        }
    }
}

impl fmt::Display for BarPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an attribute value names no known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVariantError {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for ParseVariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown bar {}: {:?}", self.kind, self.value)
    }
}

impl std::error::Error for ParseVariantError {}

impl FromStr for BarPosition {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(ParseVariantError {
                kind: "position",
                value: other.to_owned(),
            }),
        }
    }
}

/// Open/closed state of a bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarState {
    #[default]
    Open,
    Closed,
}

impl BarState {
    pub const ALL: [Self; 2] = [Self::Open, Self::Closed];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Open => Self::Closed,
            Self::Closed => Self::Open,
        }
    }
}

impl fmt::Display for BarState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BarState {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            other => Err(ParseVariantError {
                kind: "state",
                value: other.to_owned(),
            }),
        }
    }
}

/// Mouse button reported by the host for a press event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Auxiliary,
    Secondary,
    Other(i16),
}

impl PointerButton {
    /// Map a DOM `MouseEvent.button` code.
    #[must_use]
    pub const fn from_dom(code: i16) -> Self {
        match code {
            0 => Self::Primary,
            1 => Self::Auxiliary,
            2 => Self::Secondary,
            other => Self::Other(other),
        }
    }

    #[must_use]
    pub const fn is_primary(self) -> bool {
        matches!(self, Self::Primary)
    }
}

/// Role of a generated control element inside a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlRole {
    /// The bar container itself.
    Bar,
    /// Scrollable content wrapper.
    Scroll,
    /// Handler container holding the border and the button.
    Handler,
    /// Draggable resize border.
    Border,
    /// Toggle button.
    Button,
}

impl ControlRole {
    /// Suffix appended to the marker attribute for generated elements.
    #[must_use]
    pub const fn attribute_suffix(self) -> Option<&'static str> {
        match self {
            Self::Bar => None,
            Self::Scroll => Some("scroll"),
            Self::Handler => Some("handler"),
            Self::Border => Some("border"),
            Self::Button => Some("button"),
        }
    }

    /// Role component of the `{id}-{role}` test identifier.
    #[must_use]
    pub const fn test_suffix(self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Scroll => "scroll",
            Self::Handler => "handler",
            Self::Border => "handler-border",
            Self::Button => "handler-button",
        }
    }

    /// Derived test identifier for a control of bar `id`.
    #[must_use]
    pub fn test_id(self, id: &BarId) -> String {
        format!("{id}-{}", self.test_suffix())
    }
}
