//! Integration tests for the editor crate

use pagecraft_editor::{
    DocumentSurface, EditorConfig, EditorSession, EventOutcome, HistoryOutcome, NodeId, Point,
    RebindCause, RebindOutcome, SurfaceGeometry, ToolMode, DEFAULT_DOCUMENT,
};

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Landing</title></head>
<body>
<h1>Welcome</h1>
<p>First paragraph</p>
<div class="hero"><img src="hero.png" alt="Hero"></div>
<button class="cta">Sign up</button>
</body>
</html>"#;

fn load(markup: &str) -> EditorSession {
    let mut session = EditorSession::headless(EditorConfig::default());
    session.load_document(markup).unwrap();
    session
}

fn first(session: &EditorSession, tag: &str) -> NodeId {
    session.surface().dom().unwrap().elements_by_tag(tag)[0]
}

fn body(session: &EditorSession) -> NodeId {
    session.surface().dom().unwrap().body()
}

#[test]
fn test_insert_text_then_undo_redo() {
    let mut session = load(DEFAULT_DOCUMENT);
    assert_eq!(session.history().len(), 1);

    session.toggle_tool(ToolMode::TextInsert).unwrap();
    let target = body(&session);
    let outcome = session.click(target, Point::new(50.0, 50.0)).unwrap();
    let EventOutcome::Inserted(block) = outcome else {
        panic!("expected an insertion, got {:?}", outcome);
    };

    // Single-shot insert switches the tool off
    assert_eq!(session.tool(), ToolMode::None);
    assert_eq!(session.focused(), Some(block));
    assert_eq!(session.history().len(), 2);
    assert_eq!(session.history().cursor(), Some(1));

    let inserted = session.surface().read_body().unwrap();
    assert!(inserted.contains("left: 50px"));
    assert!(inserted.contains("top: 50px"));
    assert!(inserted.contains(">Type here...</div>"));

    assert_eq!(session.undo().unwrap(), HistoryOutcome::Applied);
    assert_eq!(session.surface().read_body().unwrap(), "");

    assert_eq!(session.redo().unwrap(), HistoryOutcome::Applied);
    assert_eq!(session.surface().read_body().unwrap(), inserted);
}

#[test]
fn test_insert_uses_surface_local_coordinates() {
    let mut session = load(DEFAULT_DOCUMENT);
    session.surface_mut().set_geometry(SurfaceGeometry {
        origin: Point::new(200.0, 100.0),
        scroll: Point::new(0.0, 300.0),
        zoom: 1.0,
    });

    session.toggle_tool(ToolMode::TextInsert).unwrap();
    let target = body(&session);
    session.click(target, Point::new(250.0, 150.0)).unwrap();

    let markup = session.surface().read_body().unwrap();
    assert!(markup.contains("left: 50px; top: 350px"), "{}", markup);
}

#[test]
fn test_multi_shot_insert_keeps_tool() {
    let config = EditorConfig {
        single_shot_insert: false,
        ..EditorConfig::default()
    };
    let mut session = EditorSession::headless(config);
    session.load_document(DEFAULT_DOCUMENT).unwrap();
    session.toggle_tool(ToolMode::TextInsert).unwrap();

    let target = body(&session);
    session.click(target, Point::new(10.0, 10.0)).unwrap();
    session.click(target, Point::new(10.0, 40.0)).unwrap();

    assert_eq!(session.tool(), ToolMode::TextInsert);
    assert_eq!(session.history().len(), 3);
}

#[test]
fn test_select_color_and_blur_commit_counts() {
    let mut session = load(PAGE);
    session.toggle_tool(ToolMode::Select).unwrap();
    let p = first(&session, "p");

    session.click(p, Point::default()).unwrap();
    assert_eq!(session.history().len(), 1);

    assert!(session.apply_color("#336699").unwrap());
    assert_eq!(session.history().len(), 2);

    // Nothing typed: focus loss records nothing
    assert_eq!(session.focus_out(p).unwrap(), EventOutcome::Ignored);
    assert_eq!(session.history().len(), 2);

    let current = session.history().current().unwrap();
    assert!(current.contains(r#"<p style="color: #336699">First paragraph</p>"#));
    assert!(!current.contains("contenteditable"));
}

#[test]
fn test_typed_text_commits_on_blur() {
    let mut session = load(PAGE);
    session.toggle_tool(ToolMode::Select).unwrap();
    let p = first(&session, "p");

    session.click(p, Point::default()).unwrap();
    session.apply_color("#336699").unwrap();
    assert!(session.input_text(p, "Edited <text>").unwrap());
    assert_eq!(session.history().len(), 2);

    assert_eq!(session.focus_out(p).unwrap(), EventOutcome::Committed);
    assert_eq!(session.history().len(), 3);
    assert!(session
        .history()
        .current()
        .unwrap()
        .contains("Edited &lt;text&gt;"));

    // The handle survives the text replacement
    assert_eq!(session.selected(), Some(p));
    let dom = session.surface().dom().unwrap();
    assert_eq!(dom.children(p).len(), 2);
}

#[test]
fn test_typing_then_selecting_elsewhere_commits() {
    let mut session = load(PAGE);
    session.toggle_tool(ToolMode::Select).unwrap();
    let h1 = first(&session, "h1");
    let button = first(&session, "button");

    session.click(h1, Point::default()).unwrap();
    session.input_text(h1, "Hello").unwrap();
    session.click(button, Point::default()).unwrap();

    assert_eq!(session.history().len(), 2);
    assert!(session.history().current().unwrap().contains("<h1>Hello</h1>"));
    assert_eq!(session.selected(), Some(button));
}

#[test]
fn test_input_on_plain_element_is_ignored() {
    let mut session = load(PAGE);
    let p = first(&session, "p");
    assert!(!session.input_text(p, "nope").unwrap());
    assert!(session.surface().read_body().unwrap().contains("First paragraph"));
}

#[test]
fn test_rebind_is_idempotent() {
    let mut session = load(PAGE);
    assert_eq!(
        session.rebind(RebindCause::History).unwrap(),
        RebindOutcome::AlreadyBound(session.surface().generation())
    );
    session.rebind(RebindCause::History).unwrap();

    session.toggle_tool(ToolMode::Select).unwrap();
    let p = first(&session, "p");
    session.click(p, Point::default()).unwrap();

    assert_eq!(session.dispatch_stats().editor_clicks, 1);
    assert_eq!(session.history().len(), 1);
}

#[test]
fn test_one_click_handler_after_each_replacement() {
    let mut session = load(PAGE);
    session.toggle_tool(ToolMode::Select).unwrap();
    let p = first(&session, "p");
    session.click(p, Point::default()).unwrap();
    session.apply_class("lead").unwrap();

    for _ in 0..3 {
        session.undo().unwrap();
        session.redo().unwrap();
    }

    let before = session.dispatch_stats().editor_clicks;
    let target = body(&session);
    session.click(target, Point::default()).unwrap();
    assert_eq!(session.dispatch_stats().editor_clicks, before + 1);
}

#[test]
fn test_selection_does_not_survive_replacement() {
    let mut session = load(PAGE);
    session.toggle_tool(ToolMode::Select).unwrap();
    let p = first(&session, "p");
    session.click(p, Point::default()).unwrap();
    session.apply_class("lead").unwrap();
    assert_eq!(session.selected(), Some(p));

    session.undo().unwrap();

    assert_eq!(session.selected(), None);
    assert!(!session.apply_color("red").unwrap());
    assert!(!session.apply_class("x").unwrap());
    assert!(!session.delete_selected().unwrap());
    assert_eq!(session.history().len(), 2);
    assert_eq!(session.history().cursor(), Some(0));
}

#[test]
fn test_stale_listeners_do_not_fire_after_replacement() {
    let mut session = load(PAGE);
    session.toggle_tool(ToolMode::Select).unwrap();
    let p = first(&session, "p");
    session.click(p, Point::default()).unwrap();
    session.apply_class("lead").unwrap();
    session.undo().unwrap();

    let checks = session.dispatch_stats().blur_checks;
    assert_eq!(session.focus_out(p).unwrap(), EventOutcome::Ignored);
    assert_eq!(session.dispatch_stats().blur_checks, checks);
}

#[test]
fn test_undo_redo_at_bounds() {
    let mut session = load(PAGE);
    assert_eq!(session.undo().unwrap(), HistoryOutcome::AtOldest);
    assert_eq!(session.redo().unwrap(), HistoryOutcome::AtNewest);
}

#[test]
fn test_image_and_button_selection() {
    let mut session = load(PAGE);
    session.toggle_tool(ToolMode::Select).unwrap();

    let img = first(&session, "img");
    assert_eq!(
        session.click(img, Point::default()).unwrap(),
        EventOutcome::Selected(img)
    );
    assert_eq!(session.focused(), None);
    session.apply_color("#eeeeee").unwrap();

    let button = first(&session, "button");
    session.click(button, Point::default()).unwrap();
    session.apply_class("btn-primary").unwrap();

    let current = session.history().current().unwrap();
    assert!(current.contains(r#"<img src="hero.png" alt="Hero" style="background-color: #eeeeee">"#));
    assert!(current.contains(r#"<button class="cta btn-primary">Sign up</button>"#));
}

#[test]
fn test_clicking_resize_handle_keeps_selection() {
    let mut session = load(PAGE);
    session.toggle_tool(ToolMode::Select).unwrap();
    let hero = first(&session, "div");
    session.click(hero, Point::default()).unwrap();

    let handle = {
        let dom = session.surface().dom().unwrap();
        *dom.children(hero).last().unwrap()
    };
    assert_eq!(
        session.click(handle, Point::default()).unwrap(),
        EventOutcome::Ignored
    );
    assert_eq!(session.selected(), Some(hero));
}

#[test]
fn test_replacement_mid_drag_returns_to_idle() {
    let mut session = load(PAGE);
    session.toggle_tool(ToolMode::Select).unwrap();
    let hero = first(&session, "div");
    session.click(hero, Point::default()).unwrap();
    session.apply_class("wide").unwrap();

    let handle = {
        let dom = session.surface().dom().unwrap();
        *dom.children(hero).last().unwrap()
    };
    session.pointer_down(handle, Point::new(0.0, 0.0)).unwrap();
    assert!(session.is_dragging());

    session.undo().unwrap();

    assert!(!session.is_dragging());
    assert_eq!(
        session.pointer_move(Point::new(40.0, 40.0)).unwrap(),
        EventOutcome::Ignored
    );
    assert_eq!(session.history().cursor(), Some(0));
}
