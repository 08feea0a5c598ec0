#![forbid(unsafe_code)]

//! Stylesheet generation.
//!
//! Four stylesheets exist, each inserted once at a fixed lifecycle point:
//!
//! | Kind                 | Inserted by | Depends on          |
//! |----------------------|-------------|---------------------|
//! | `InitialBar`         | `init()`    | persisted records   |
//! | `InitialPreloader`   | `init()`    | config              |
//! | `Bar`                | `render()`  | config              |
//! | `Preloader`          | `render()`  | config              |
//!
//! Output is a pure function of its inputs.

use core::fmt::Write as _;

use crate::config::BarConfig;
use crate::model::{BarId, BarPosition, BarState};
use crate::storage::PersistedRecord;

/// Which generated stylesheet a `<style>` element carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleKind {
    InitialBar,
    InitialPreloader,
    Bar,
    Preloader,
}

impl StyleKind {
    pub const ALL: [Self; 4] = [
        Self::InitialBar,
        Self::InitialPreloader,
        Self::Bar,
        Self::Preloader,
    ];

    /// Suffix of the marker attribute placed on the `<style>` element.
    #[must_use]
    pub const fn marker_suffix(self) -> &'static str {
        match self {
            Self::InitialBar => "initial-style",
            Self::InitialPreloader => "initial-preloader-style",
            Self::Bar => "style",
            Self::Preloader => "preloader-style",
        }
    }
}

/// Chevron shown on the toggle button; points toward the collapsing direction.
#[must_use]
pub const fn toggle_glyph(state: BarState, position: BarPosition) -> char {
    match (state, position) {
        (BarState::Open, BarPosition::Left) => '❮',
        (BarState::Open, BarPosition::Right) => '❯',
        (BarState::Closed, BarPosition::Left) => '❯',
        (BarState::Closed, BarPosition::Right) => '❮',
    }
}

/// Escape a value for use inside a double-quoted CSS attribute selector.
#[must_use]
pub fn escape_attribute_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '"' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            '\n' => out.push_str("\\a "),
            _ => out.push(ch),
        }
    }
    out
}

fn px(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}px", value as i64)
    } else {
        format!("{value}px")
    }
}

/// Builds stylesheet text from a [`BarConfig`].
#[derive(Debug, Clone, Copy)]
pub struct StyleGenerator<'a> {
    config: &'a BarConfig,
}

impl<'a> StyleGenerator<'a> {
    #[must_use]
    pub const fn new(config: &'a BarConfig) -> Self {
        Self { config }
    }

    /// Generate the stylesheet for `kind`. `records` is only read by
    /// [`StyleKind::InitialBar`].
    #[must_use]
    pub fn generate(&self, kind: StyleKind, records: &[(BarId, PersistedRecord)]) -> String {
        match kind {
            StyleKind::InitialBar => self.initial_bar_style(records),
            StyleKind::InitialPreloader => self.initial_preloader_style(),
            StyleKind::Bar => self.bar_style(),
            StyleKind::Preloader => self.preloader_style(),
        }
    }

    /// Pre-hydration widths: the default for every bar plus one override per
    /// persisted record that has something to say.
    #[must_use]
    pub fn initial_bar_style(&self, records: &[(BarId, PersistedRecord)]) -> String {
        let attr = &self.config.attribute;
        let mut css = format!("[{attr}]{{width:{}}}", self.config.max_width);
        for (id, record) in records {
            if let Some(width) = self.initial_width(record) {
                let _ = write!(
                    css,
                    "[{attr}=\"{}\"]{{width:{width}px}}",
                    escape_attribute_value(id.as_str())
                );
            }
        }
        css
    }

    /// Width the pre-hydration stylesheet pins a persisted bar to, if any.
    #[must_use]
    pub fn initial_width(&self, record: &PersistedRecord) -> Option<u32> {
        match record.state {
            Some(BarState::Closed) => Some(self.config.closed_width),
            _ => record.width,
        }
    }

    #[must_use]
    pub fn initial_preloader_style(&self) -> String {
        let attr = &self.config.attribute;
        let background = &self.config.colors.background;
        format!(
            "
aside {{
  position: relative;
}}
[{attr}]::after {{
  display: flex;
  align-items: center;
  justify-content: center;
  content: '';
  position: absolute;
  left: 0; right: 0; top: 0; bottom: 0;
  z-index: 2;
  background-color: {background};
}}
"
        )
    }

    #[must_use]
    pub fn preloader_style(&self) -> String {
        let attr = &self.config.attribute;
        format!(
            "
[{attr}]::after {{
  opacity: 0;
  transition: .3s;
  pointer-events: none;
}}
"
        )
    }

    /// Interactive stylesheet. Contains no per-bar rules.
    #[must_use]
    pub fn bar_style(&self) -> String {
        let mut css = String::with_capacity(6 * 1024);
        self.push_container_rules(&mut css);
        self.push_handler_rules(&mut css);
        self.push_button_rules(&mut css);
        self.push_glyph_rules(&mut css);
        self.push_scroll_rules(&mut css);
        css
    }

    fn push_container_rules(&self, css: &mut String) {
        let attr = &self.config.attribute;
        let max_width = &self.config.max_width;
        let min_width = self.config.min_width;
        let closed = self.config.closed_width;
        let _ = write!(
            css,
            "
[{attr}] {{
  position: relative;
  height: 100%;
  max-width: {max_width};
}}
[{attr}]:hover,
[{attr}]:focus-within {{
  z-index: 22;
}}
[{attr}][data-state=\"open\"] {{
  min-width: {min_width}px;
  pointer-events: auto;
}}
[{attr}][data-state=\"closed\"] {{
  max-width: {closed}px;
  min-width: {closed}px;
  pointer-events: none;
  transition: .5s;
}}
[{attr}][data-position=\"left\"] {{
  border-left: none;
}}
[{attr}][data-position=\"right\"] {{
  border-right: none;
}}
"
        );
    }

    fn push_handler_rules(&self, css: &mut String) {
        let attr = &self.config.attribute;
        let width = f64::from(self.config.handler_width);
        let handler_width = px(width);
        let half = px(0.5 * width);
        let quarter_out = px(-0.25 * width);
        let colors = &self.config.colors;
        let _ = write!(
            css,
            "
[{attr}-handler] {{
  pointer-events: auto;
  position: absolute;
  top: 0;
  bottom: 0;
  left: 0;
  right: 0;
  z-index: 10;
  width: {handler_width};
  color: {active};
}}
[{attr}-border] {{
  pointer-events: auto;
  position: absolute;
  top: 0;
  bottom: 0;
  left: 0;
  right: 0;
  width: {handler_width};
  background: transparent;
  transition: .3s;
  cursor: col-resize;
}}
[{attr}][data-state=\"closed\"] [{attr}-border] {{
  cursor: e-resize;
}}
[{attr}-border]::before {{
  content: '';
  position: absolute;
  top: 0;
  bottom: 0;
  left: 0;
  right: 0;
  width: 1px;
  background: {border};
  transition: .3s;
}}
[{attr}-border]::after {{
  content: '';
  position: absolute;
  top: 0;
  bottom: 0;
  left: 0;
  right: 0;
  width: {half};
  background: transparent;
  transition: .3s;
}}
[{attr}][data-position=\"left\"] [{attr}-border]::before {{
  right: 0;
  left: unset;
}}
[{attr}][data-position=\"left\"] [{attr}-border]::after {{
  right: {quarter_out};
  left: unset;
}}
[{attr}][data-position=\"right\"] [{attr}-border]::before {{
  right: unset;
  left: 0;
}}
[{attr}][data-position=\"right\"] [{attr}-border]::after {{
  right: unset;
  left: {quarter_out};
}}
[{attr}-border]:hover::after {{
  background: {active};
}}
",
            active = colors.active,
            border = colors.border,
        );
    }

    fn push_button_rules(&self, css: &mut String) {
        let attr = &self.config.attribute;
        let width = f64::from(self.config.handler_width);
        let offset = px(-width);
        let size = px(2.0 * width);
        let font_size = px(1.5 * width);
        let colors = &self.config.colors;
        let _ = write!(
            css,
            "
[{attr}-button] {{
  cursor: pointer;
  position: absolute;
  z-index: 2;
  left: 0;
  right: 0;
  top: {offset};
  box-sizing: border-box;
  width: {size};
  height: {size};
  font-size: {font_size};
  font-weight: bold;
  border-radius: 50%;
  border-width: 1px;
  border-style: solid;
  border-color: {background};
  background: {background};
  color: {active};
  transition: .3s;
}}
[data-position=\"right\"] [{attr}-button] {{
  right: 0;
  left: unset;
}}
[data-position=\"left\"] [{attr}-button] {{
  left: 0;
  right: unset;
}}
[{attr}-button]:hover,
[{attr}-button]:focus {{
  color: {main};
  border-color: {main};
}}
[{attr}-button]::after {{
  position: absolute;
  display: flex;
  align-items: center;
  justify-content: center;
  left: 0;
  right: 0;
  top: {offset};
  bottom: {offset};
}}
",
            background = colors.background,
            active = colors.active,
            main = colors.main,
        );
    }

    fn push_glyph_rules(&self, css: &mut String) {
        let attr = &self.config.attribute;
        for state in BarState::ALL {
            for position in BarPosition::ALL {
                let glyph = toggle_glyph(state, position);
                let _ = write!(
                    css,
                    "[{attr}][data-state=\"{state}\"][data-position=\"{position}\"] [{attr}-button]::after {{\n  content: '{glyph}';\n}}\n"
                );
            }
        }
    }

    fn push_scroll_rules(&self, css: &mut String) {
        let attr = &self.config.attribute;
        let padding = &self.config.padding;
        let padding_bottom = &self.config.padding_bottom;
        let track = &self.config.colors.scrollbar_track;
        let thumb = &self.config.colors.scrollbar_thumb;
        let _ = write!(
            css,
            "
[{attr}-scroll] {{
  height: 100%;
  overflow-x: hidden;
  overflow-y: scroll;
  padding: {padding};
  padding-bottom: {padding_bottom};
  scrollbar-color: {track} {track};
}}
[{attr}-scroll='y'] {{
  overflow-x: hidden;
  overflow-y: scroll;
}}
[{attr}-scroll]:hover {{
  scrollbar-color: {thumb} {track};
}}
[{attr}-scroll]::-webkit-scrollbar-thumb {{
  background-color: {track};
}}
[{attr}-scroll]:hover::-webkit-scrollbar-thumb {{
  background-color: {thumb};
}}
[data-state=\"closed\"] [{attr}-scroll] {{
  display: none;
}}
"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(state: Option<BarState>, width: Option<u32>) -> PersistedRecord {
        PersistedRecord { state, width }
    }

    #[test]
    fn glyph_table() {
        assert_eq!(toggle_glyph(BarState::Open, BarPosition::Left), '❮');
        assert_eq!(toggle_glyph(BarState::Open, BarPosition::Right), '❯');
        assert_eq!(toggle_glyph(BarState::Closed, BarPosition::Left), '❯');
        assert_eq!(toggle_glyph(BarState::Closed, BarPosition::Right), '❮');
    }

    #[test]
    fn initial_style_without_records_has_only_default_rule() {
        let config = BarConfig::default();
        let css = StyleGenerator::new(&config).initial_bar_style(&[]);
        assert_eq!(css, "[js-resizable_bar]{width:20vw}");
    }

    #[test]
    fn initial_style_overrides_per_record() {
        let config = BarConfig::default();
        let records = vec![
            (BarId::new("nav"), record(Some(BarState::Open), None)),
            (BarId::new("toc"), record(Some(BarState::Closed), Some(150))),
            (BarId::new("tree"), record(None, Some(240))),
        ];
        let css = StyleGenerator::new(&config).initial_bar_style(&records);
        assert_eq!(
            css,
            "[js-resizable_bar]{width:20vw}\
             [js-resizable_bar=\"toc\"]{width:12px}\
             [js-resizable_bar=\"tree\"]{width:240px}"
        );
    }

    #[test]
    fn ids_are_escaped_in_selectors() {
        let config = BarConfig::default();
        let records = vec![(BarId::new("a\"b"), record(None, Some(10)))];
        let css = StyleGenerator::new(&config).initial_bar_style(&records);
        assert!(css.ends_with("[js-resizable_bar=\"a\\\"b\"]{width:10px}"));
    }

    #[test]
    fn interactive_style_is_deterministic_and_static() {
        let config = BarConfig::default();
        let generator = StyleGenerator::new(&config);
        let first = generator.generate(StyleKind::Bar, &[]);
        let second = generator.generate(
            StyleKind::Bar,
            &[(BarId::new("toc"), record(Some(BarState::Closed), None))],
        );
        assert_eq!(first, second);
        assert!(!first.contains("toc"));
    }

    #[test]
    fn interactive_style_uses_config_geometry() {
        let config = BarConfig {
            handler_width: 10,
            closed_width: 16,
            min_width: 120,
            ..BarConfig::default()
        };
        let css = StyleGenerator::new(&config).bar_style();
        assert!(css.contains("width: 10px;"));
        assert!(css.contains("width: 5px;"));
        assert!(css.contains("right: -2.5px;"));
        assert!(css.contains("width: 20px;\n  height: 20px;"));
        assert!(css.contains("font-size: 15px;"));
        assert!(css.contains("max-width: 16px;\n  min-width: 16px;"));
        assert!(css.contains("min-width: 120px;"));
    }

    #[test]
    fn each_glyph_combination_has_explicit_rule() {
        let config = BarConfig::default();
        let css = StyleGenerator::new(&config).bar_style();
        for state in BarState::ALL {
            for position in BarPosition::ALL {
                let rule = format!(
                    "[js-resizable_bar][data-state=\"{state}\"][data-position=\"{position}\"] \
                     [js-resizable_bar-button]::after {{\n  content: '{}';\n}}",
                    toggle_glyph(state, position)
                );
                assert!(css.contains(&rule), "missing rule for {state}/{position}");
            }
        }
    }

    #[test]
    fn preloader_pair_targets_marker() {
        let config = BarConfig::default();
        let generator = StyleGenerator::new(&config);
        assert!(
            generator
                .initial_preloader_style()
                .contains("background-color: var(--color-bg-main, White);")
        );
        assert!(generator.preloader_style().contains("opacity: 0;"));
    }

    #[test]
    fn marker_suffixes_are_distinct() {
        let mut seen: Vec<&str> = StyleKind::ALL.iter().map(|k| k.marker_suffix()).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), StyleKind::ALL.len());
    }
}
