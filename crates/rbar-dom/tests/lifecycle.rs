//! End-to-end lifecycle of resizable bars over an in-memory document:
//! init → render → pointer input → reload.

use pretty_assertions::assert_eq;
use rbar_core::{
    BarConfig, BarId, BarPosition, BarState, ControllerPhase, DispatchOutcome, IgnoredReason,
    ListenerCommand, MemoryStorage, PointerButton,
};
use rbar_dom::{Document, Lifecycle, MemoryDocument, NodeId, ResizableBar};

const KEY: &str = "resizableBarStorage";

struct Page {
    bars: ResizableBar<MemoryDocument, MemoryStorage>,
    toc: NodeId,
    nav: NodeId,
}

fn page_with(storage: MemoryStorage, config: BarConfig) -> Page {
    let mut doc = MemoryDocument::new();
    let body = doc.body();
    let toc = doc.append_element(
        body,
        "aside",
        &[("js-resizable_bar", "toc"), ("data-position", "left")],
    );
    doc.append_element(toc, "nav", &[("class", "toc-tree")]);
    let nav = doc.append_element(
        body,
        "aside",
        &[("js-resizable_bar", "nav"), ("data-position", "left")],
    );
    doc.append_text(nav, "Navigation");
    doc.append_element(body, "main", &[]);

    Page {
        bars: ResizableBar::new(config, doc, storage).unwrap(),
        toc,
        nav,
    }
}

fn page(storage: MemoryStorage) -> Page {
    page_with(storage, BarConfig::default())
}

fn style_text(bars: &ResizableBar<MemoryDocument, MemoryStorage>, marker: &str) -> Option<String> {
    let doc = bars.document();
    doc.query_all_with_attribute(marker)
        .first()
        .map(|node| doc.text_content(*node))
}

fn border(bars: &ResizableBar<MemoryDocument, MemoryStorage>, id: &str) -> NodeId {
    bars.renderer().controls(id).unwrap().border
}

fn button(bars: &ResizableBar<MemoryDocument, MemoryStorage>, id: &str) -> NodeId {
    bars.renderer().controls(id).unwrap().button
}

#[test]
fn fresh_session_uses_defaults_and_no_override_rule() {
    let mut page = page(MemoryStorage::new());
    page.bars.init();
    assert_eq!(page.bars.lifecycle(), Lifecycle::Initialized);
    assert_eq!(
        style_text(&page.bars, "js-resizable_bar-initial-style").as_deref(),
        Some("[js-resizable_bar]{width:20vw}")
    );

    let ids = page.bars.render();
    assert_eq!(ids, vec![BarId::new("toc"), BarId::new("nav")]);

    let record = page.bars.registry().get("nav").unwrap();
    assert_eq!(record.state, BarState::Open);
    assert_eq!(record.width, None);
    let doc = page.bars.document();
    assert_eq!(doc.style_property(&page.nav, "width").as_deref(), Some("20vw"));
}

#[test]
fn attributes_match_registry_after_discovery() {
    let storage = MemoryStorage::with_item(KEY, r#"{"toc":{"state":"closed","width":150}}"#);
    let mut page = page(storage);
    page.bars.init();
    page.bars.render();

    assert_eq!(page.bars.registry().len(), 2);
    for (id, node) in [("toc", page.toc), ("nav", page.nav)] {
        let record = *page.bars.registry().get(id).unwrap();
        let doc = page.bars.document();
        assert_eq!(
            doc.attribute(&node, "data-state").as_deref(),
            Some(record.state.as_str())
        );
        assert_eq!(
            doc.attribute(&node, "data-position").as_deref(),
            Some(record.position.as_str())
        );
        let expected_width = record
            .width
            .map_or_else(|| "20vw".to_owned(), |w| format!("{w}px"));
        assert_eq!(doc.style_property(&node, "width"), Some(expected_width));
    }
    assert_eq!(
        style_text(&page.bars, "js-resizable_bar-initial-style").as_deref(),
        Some("[js-resizable_bar]{width:20vw}[js-resizable_bar=\"toc\"]{width:12px}")
    );
}

#[test]
fn render_inserts_every_stylesheet_once() {
    let mut page = page(MemoryStorage::new());
    page.bars.init();
    page.bars.render();
    page.bars.init();
    page.bars.render();

    for marker in [
        "js-resizable_bar-initial-style",
        "js-resizable_bar-initial-preloader-style",
        "js-resizable_bar-style",
        "js-resizable_bar-preloader-style",
    ] {
        assert_eq!(
            page.bars.document().query_all_with_attribute(marker).len(),
            1,
            "{marker}"
        );
    }
    let head = page.bars.document().head();
    assert_eq!(page.bars.document().child_nodes(&head).len(), 4);
    assert_eq!(page.bars.registry().len(), 2);
}

#[test]
fn render_without_init_initializes_first() {
    let mut page = page(MemoryStorage::new());
    page.bars.render();
    assert_eq!(page.bars.lifecycle(), Lifecycle::Rendered);
    assert!(style_text(&page.bars, "js-resizable_bar-initial-style").is_some());
}

#[test]
fn toggle_button_twice_round_trips() {
    let mut page = page(MemoryStorage::new());
    page.bars.render();
    let target = button(&page.bars, "toc");

    let first = page.bars.press(&target, PointerButton::Primary, 0).unwrap();
    assert_eq!(first.phase, ControllerPhase::Toggle);
    assert_eq!(
        page.bars.document().attribute(&page.toc, "data-state").as_deref(),
        Some("closed")
    );
    assert_eq!(page.bars.store().state("toc"), Some(BarState::Closed));

    page.bars.press(&target, PointerButton::Primary, 0).unwrap();
    assert_eq!(page.bars.store().state("toc"), Some(BarState::Open));
    assert_eq!(page.bars.store().storage().writes(), 2);
    assert_eq!(
        page.bars.document().attribute(&page.toc, "data-state").as_deref(),
        Some("open")
    );
}

#[test]
fn drag_below_gravity_closes_and_release_persists_width() {
    let mut page = page(MemoryStorage::new());
    page.bars.render();
    page.bars
        .document_mut()
        .set_style_property(&page.toc, "width", "300px");
    let target = border(&page.bars, "toc");

    let start = page.bars.press(&target, PointerButton::Primary, 600).unwrap();
    assert_eq!(start.listener_command, Some(ListenerCommand::Attach));

    let moved = page.bars.drag_move(350);
    assert_eq!(moved.transition.map(|t| t.to), Some(BarState::Closed));
    assert_eq!(page.bars.store().state("toc"), Some(BarState::Closed));
    assert_eq!(page.bars.store().width("toc"), None);
    let doc = page.bars.document();
    assert_eq!(doc.style_property(&page.toc, "width").as_deref(), Some("50px"));
    assert_eq!(doc.attribute(&page.toc, "data-state").as_deref(), Some("closed"));

    page.bars.drag_move(340);
    let end = page.bars.release();
    assert_eq!(end.listener_command, Some(ListenerCommand::Detach));
    assert_eq!(page.bars.store().width("toc"), Some(40));
    assert_eq!(page.bars.store().state("toc"), Some(BarState::Closed));
    assert!(page.bars.registry().drag().is_none());
    assert_eq!(
        page.bars.document().style_property(&page.toc, "width").as_deref(),
        Some("40px")
    );
}

#[test]
fn drag_anchors_on_rendered_width_not_stored_width() {
    let storage = MemoryStorage::with_item(KEY, r#"{"nav":{"state":"open","width":500}}"#);
    let mut page = page(storage);
    page.bars.render();
    page.bars
        .document_mut()
        .set_rendered_width(page.nav, Some(256));

    page.bars.drag_start("nav", PointerButton::Primary, 100);
    assert_eq!(page.bars.registry().drag().unwrap().anchor_width, 256);
    page.bars
        .document_mut()
        .set_rendered_width(page.nav, None);
    let moved = page.bars.drag_move(120);
    assert_eq!(moved.live_width, Some(276));
    page.bars.release();
    assert_eq!(page.bars.store().width("nav"), Some(276));
}

#[test]
fn coalesced_moves_flush_before_release() {
    let mut page = page(MemoryStorage::new());
    page.bars.render();
    page.bars
        .document_mut()
        .set_style_property(&page.toc, "width", "300px");
    page.bars.drag_start("toc", PointerButton::Primary, 0);

    assert!(page.bars.pointer_move(-10).request_frame);
    assert!(!page.bars.pointer_move(-20).request_frame);
    assert_eq!(page.bars.animation_frame().live_width, Some(280));
    page.bars.pointer_move(-60);
    page.bars.release();
    assert_eq!(page.bars.store().width("toc"), Some(240));
}

#[test]
fn toggle_during_drag_is_ignored() {
    let mut page = page(MemoryStorage::new());
    page.bars.render();
    page.bars
        .document_mut()
        .set_style_property(&page.toc, "width", "300px");
    page.bars.drag_start("toc", PointerButton::Primary, 0);

    let target = button(&page.bars, "toc");
    let toggle = page.bars.press(&target, PointerButton::Primary, 0).unwrap();
    assert_eq!(
        toggle.outcome,
        DispatchOutcome::Ignored(IgnoredReason::DragInProgress)
    );
    assert_eq!(page.bars.registry().get("toc").unwrap().state, BarState::Open);
}

#[test]
fn presses_outside_controls_are_not_dispatched() {
    let mut page = page(MemoryStorage::new());
    page.bars.render();
    let content = page.bars.document().query_all_with_attribute("class")[0];
    assert_eq!(page.bars.press(&content, PointerButton::Primary, 0), None);
    assert_eq!(page.bars.press(&page.toc, PointerButton::Primary, 0), None);

    let target = border(&page.bars, "toc");
    let ignored = page.bars.press(&target, PointerButton::Secondary, 0).unwrap();
    assert_eq!(
        ignored.outcome,
        DispatchOutcome::Ignored(IgnoredReason::ButtonNotPrimary)
    );
    assert!(!page.bars.controller().listeners_attached());
}

#[test]
fn reload_restores_state_and_width() {
    let mut first = page(MemoryStorage::new());
    first.bars.render();
    first
        .bars
        .document_mut()
        .set_style_property(&first.nav, "width", "260px");
    first.bars.drag_start("nav", PointerButton::Primary, 0);
    first.bars.drag_move(-40);
    first.bars.release();
    first.bars.toggle("toc", PointerButton::Primary);
    let storage = first.bars.store().storage().clone();

    let mut second = page(storage);
    second.bars.init();
    assert_eq!(
        style_text(&second.bars, "js-resizable_bar-initial-style").as_deref(),
        Some(
            "[js-resizable_bar]{width:20vw}\
             [js-resizable_bar=\"nav\"]{width:220px}\
             [js-resizable_bar=\"toc\"]{width:12px}"
        )
    );
    second.bars.render();
    let nav = *second.bars.registry().get("nav").unwrap();
    assert_eq!(nav.width, Some(220));
    assert_eq!(nav.state, BarState::Open);
    assert_eq!(nav.position, BarPosition::Left);
    assert_eq!(
        second.bars.registry().get("toc").unwrap().state,
        BarState::Closed
    );
}

#[test]
fn unavailable_storage_degrades_to_defaults() {
    let mut storage = MemoryStorage::new();
    storage.set_fail_reads(true);
    storage.set_fail_writes(true);
    let mut page = page(storage);
    page.bars.init();
    page.bars.render();
    page.bars.toggle("toc", PointerButton::Primary);
    assert_eq!(page.bars.registry().get("toc").unwrap().state, BarState::Closed);
    assert_eq!(page.bars.store().storage().writes(), 0);
}

#[test]
fn corrupt_blob_reads_as_empty_and_is_replaced() {
    let mut page = page(MemoryStorage::with_item(KEY, "{not json"));
    page.bars.init();
    assert_eq!(
        style_text(&page.bars, "js-resizable_bar-initial-style").as_deref(),
        Some("[js-resizable_bar]{width:20vw}")
    );
    page.bars.render();
    assert_eq!(page.bars.registry().get("toc").unwrap().state, BarState::Open);

    page.bars.toggle("toc", PointerButton::Primary);
    assert_eq!(
        page.bars.store().storage().raw(KEY),
        Some(r#"{"toc":{"state":"closed"}}"#)
    );
}

#[test]
fn gravity_from_json_config() {
    let config = BarConfig::from_json(r#"{"gravity": 200}"#).unwrap();
    let mut page = page_with(MemoryStorage::new(), config);
    assert_eq!(page.bars.controller().gravity(), 200);
    page.bars.render();
    page.bars
        .document_mut()
        .set_style_property(&page.toc, "width", "300px");
    page.bars.drag_start("toc", PointerButton::Primary, 0);
    let moved = page.bars.drag_move(-150);
    assert_eq!(moved.transition.map(|t| t.to), Some(BarState::Closed));
    page.bars.release();
    assert_eq!(page.bars.store().width("toc"), Some(150));
}

#[test]
fn invalid_config_is_rejected() {
    let config = BarConfig {
        attribute: "bad attr".to_owned(),
        ..BarConfig::default()
    };
    assert!(ResizableBar::new(config, MemoryDocument::new(), MemoryStorage::new()).is_err());
}
