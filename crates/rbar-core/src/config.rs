#![forbid(unsafe_code)]

//! Construction-time configuration for resizable bars.
//!
//! Every field is optional on input: [`BarConfig`] deserializes with
//! `#[serde(default)]` and camelCase keys, so a host options object such as
//! `{"gravity": 120, "closedWidth": 16}` maps directly onto it.

use core::fmt;

use serde::Deserialize;

/// Color tokens used by the generated stylesheets.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BarColors {
    /// Foreground of the toggle button on hover.
    pub main: String,
    /// Background of the toggle button and the preloader cover.
    pub background: String,
    /// Accent used for the hovered border and the button glyph.
    pub active: String,
    /// One-pixel border line.
    pub border: String,
    pub scrollbar_track: String,
    pub scrollbar_thumb: String,
}

impl Default for BarColors {
    fn default() -> Self {
        Self {
            main: "var(--color-fg-main, Black)".to_owned(),
            background: "var(--color-bg-main, White)".to_owned(),
            active: "var(--color-fg-accent, currentColor)".to_owned(),
            border: "var(--color-border, rgba(0,0,0,0.1))".to_owned(),
            scrollbar_track: "var(--scrollbarBG, transparent)".to_owned(),
            scrollbar_thumb: "var(--thumbBG, rgba(0,0,0,.05))".to_owned(),
        }
    }
}

/// Resizable bar configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BarConfig {
    /// Marker attribute identifying bar containers; its value is the bar id.
    pub attribute: String,
    /// Session storage key holding the JSON object of persisted records.
    pub storage_key: String,
    /// CSS length used as the default and maximum open width.
    pub max_width: String,
    /// Width in pixels below which a dragged bar closes.
    pub gravity: u32,
    /// CSS padding of the scroll wrapper.
    pub padding: String,
    pub padding_bottom: String,
    /// Minimum width of an open bar, in pixels.
    pub min_width: u32,
    /// Width of a closed bar, in pixels.
    pub closed_width: u32,
    /// Width of the drag handle, in pixels.
    pub handler_width: u32,
    pub colors: BarColors,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            attribute: "js-resizable_bar".to_owned(),
            storage_key: "resizableBarStorage".to_owned(),
            max_width: "20vw".to_owned(),
            gravity: 100,
            padding: "calc(var(--base-rhythm, 8px)*2)".to_owned(),
            padding_bottom: "calc(var(--base-rhythm, 8px)*8)".to_owned(),
            min_width: 100,
            closed_width: 12,
            handler_width: 8,
            colors: BarColors::default(),
        }
    }
}

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A string field that must not be blank was blank.
    Empty(&'static str),
    /// A pixel field that must be positive was zero.
    Zero(&'static str),
    /// The attribute name contains characters that cannot appear in a selector.
    InvalidAttribute(String),
    /// The options payload was not valid JSON for this struct.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty(field) => write!(f, "config field `{field}` must not be empty"),
            Self::Zero(field) => write!(f, "config field `{field}` must be positive"),
            Self::InvalidAttribute(name) => write!(f, "invalid marker attribute name {name:?}"),
            Self::Parse(msg) => write!(f, "invalid bar options: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl BarConfig {
    /// Parse a JSON options object, filling defaults for absent fields.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let trimmed = json.trim();
        let config: Self = if trimmed.is_empty() {
            Self::default()
        } else {
            serde_json::from_str(trimmed).map_err(|err| ConfigError::Parse(err.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.attribute.is_empty() {
            return Err(ConfigError::Empty("attribute"));
        }
        if !self
            .attribute
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
        {
            return Err(ConfigError::InvalidAttribute(self.attribute.clone()));
        }
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::Empty("storageKey"));
        }
        if self.max_width.trim().is_empty() {
            return Err(ConfigError::Empty("maxWidth"));
        }
        if self.closed_width == 0 {
            return Err(ConfigError::Zero("closedWidth"));
        }
        if self.handler_width == 0 {
            return Err(ConfigError::Zero("handlerWidth"));
        }
        Ok(())
    }

    /// Attribute name for a generated sub-element, e.g. `js-resizable_bar-border`.
    #[must_use]
    pub fn sub_attribute(&self, suffix: &str) -> String {
        format!("{}-{suffix}", self.attribute)
    }
}
