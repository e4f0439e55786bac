//! Scripted editing sessions.
//!
//! A script is a JSON list of steps mirroring what a user does in the
//! editor UI:
//!
//! ```json
//! { "steps": [
//!     { "tool": "select" },
//!     { "click": { "tag": "p" } },
//!     { "type": { "tag": "p", "text": "Hello" } },
//!     { "blur": { "tag": "p" } },
//!     { "color": "#ff0000" },
//!     "undo",
//!     "save"
//! ] }
//! ```

use anyhow::{anyhow, Context, Result};
use pagecraft_editor::{
    DocumentSurface, EditorSession, EventOutcome, HistoryOutcome, NodeId, PageKey, PageStore,
    Point, ToolMode, RESIZE_HANDLE_CLASS,
};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read script {}", path.display()))?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// The `index`-th element with `tag`, in document order
#[derive(Debug, Clone, Deserialize)]
pub struct Target {
    pub tag: String,
    #[serde(default)]
    pub index: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClickStep {
    #[serde(flatten)]
    pub target: Target,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeStep {
    #[serde(flatten)]
    pub target: Target,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StyleStep {
    pub property: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResizeStep {
    pub dx: f64,
    pub dy: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    Tool(ToolMode),
    Click(ClickStep),
    Type(TypeStep),
    Blur(Target),
    Class(String),
    RemoveClass(String),
    Color(String),
    Style(StyleStep),
    /// Drag the selected element's resize handle by a delta
    Resize(ResizeStep),
    Delete,
    Undo,
    Redo,
    Save,
}

/// Per-step report line
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub step: usize,
    pub summary: String,
}

/// Where `save` steps go
pub struct Destination<'a, P: PageStore + ?Sized> {
    pub store: &'a P,
    pub key: &'a PageKey,
}

fn resolve<S: DocumentSurface>(session: &EditorSession<S>, target: &Target) -> Result<NodeId> {
    let dom = session.surface().dom()?;
    if target.tag == "body" {
        return Ok(dom.body());
    }
    dom.elements_by_tag(&target.tag)
        .get(target.index)
        .copied()
        .ok_or_else(|| anyhow!("No <{}> at index {}", target.tag, target.index))
}

fn selected_handle<S: DocumentSurface>(session: &EditorSession<S>) -> Result<NodeId> {
    let dom = session.surface().dom()?;
    let selected = session
        .selected()
        .ok_or_else(|| anyhow!("Resize needs a selected element"))?;
    let parent = dom.parent(selected).unwrap_or(selected);
    [selected, parent]
        .iter()
        .flat_map(|n| dom.children(*n).iter().copied())
        .find(|n| dom.has_class(*n, RESIZE_HANDLE_CLASS))
        .ok_or_else(|| anyhow!("Selected element has no resize handle"))
}

fn describe_event(outcome: EventOutcome) -> String {
    match outcome {
        EventOutcome::Ignored => "no effect".to_string(),
        EventOutcome::Inserted(node) => format!("inserted text block #{}", node.index()),
        EventOutcome::Selected(node) => format!("selected #{}", node.index()),
        EventOutcome::SelectionCleared => "selection cleared".to_string(),
        EventOutcome::Committed => "edit committed".to_string(),
        EventOutcome::ResizeStarted => "resize started".to_string(),
        EventOutcome::Resized => "resized".to_string(),
        EventOutcome::ResizeEnded { committed } => {
            format!("resize ended ({})", if committed { "committed" } else { "unchanged" })
        }
    }
}

fn describe_history(outcome: HistoryOutcome) -> String {
    match outcome {
        HistoryOutcome::Applied => "applied".to_string(),
        HistoryOutcome::AtOldest => "nothing to undo".to_string(),
        HistoryOutcome::AtNewest => "nothing to redo".to_string(),
        HistoryOutcome::Unavailable => "surface unavailable".to_string(),
    }
}

fn changed(changed: bool) -> String {
    if changed { "changed" } else { "unchanged" }.to_string()
}

/// Run every step, saving to `destination` on `save` steps and whenever
/// the session asks for an autosave
pub async fn run<S, P>(
    session: &mut EditorSession<S>,
    script: &Script,
    destination: Option<Destination<'_, P>>,
) -> Result<Vec<StepReport>>
where
    S: DocumentSurface,
    P: PageStore + ?Sized,
{
    let mut reports = Vec::with_capacity(script.steps.len());

    for (step, action) in script.steps.iter().enumerate() {
        debug!(step, ?action, "Running step");
        let summary = match action {
            Step::Tool(tool) => {
                let transition = session.toggle_tool(*tool)?;
                format!("tool {} -> {}", transition.previous, transition.current)
            }
            Step::Click(click) => {
                let node = resolve(session, &click.target)?;
                describe_event(session.click(node, Point::new(click.x, click.y))?)
            }
            Step::Type(typed) => {
                let node = resolve(session, &typed.target)?;
                changed(session.input_text(node, &typed.text)?)
            }
            Step::Blur(target) => {
                let node = resolve(session, target)?;
                describe_event(session.focus_out(node)?)
            }
            Step::Class(class) => changed(session.apply_class(class)?),
            Step::RemoveClass(class) => changed(session.remove_class(class)?),
            Step::Color(color) => changed(session.apply_color(color)?),
            Step::Style(style) => changed(session.apply_style(&style.property, &style.value)?),
            Step::Resize(resize) => {
                let handle = selected_handle(session)?;
                session.pointer_down(handle, Point::default())?;
                session.pointer_move(Point::new(resize.dx, resize.dy))?;
                describe_event(session.pointer_up(Point::new(resize.dx, resize.dy))?)
            }
            Step::Delete => changed(session.delete_selected()?),
            Step::Undo => describe_history(session.undo()?),
            Step::Redo => describe_history(session.redo()?),
            Step::Save => match &destination {
                Some(dest) => {
                    session.save_page(dest.store, dest.key).await?;
                    format!("saved {}", dest.key)
                }
                None => "save skipped (no page server)".to_string(),
            },
        };

        if let Some(dest) = &destination {
            if session.should_autosave() {
                session.save_page(dest.store, dest.key).await?;
            }
        }

        reports.push(StepReport { step, summary });
    }

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_editor::EditorConfig;
    use pagecraft_store::MemoryPageStore;

    const PAGE: &str = r#"<!DOCTYPE html><html><head><title>x</title></head><body><h1>Title</h1><p>Body text</p></body></html>"#;

    fn script(json: &str) -> Script {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_script() {
        let parsed = script(
            r#"{ "steps": [
                { "tool": "select" },
                { "click": { "tag": "p", "x": 3 } },
                { "type": { "tag": "p", "text": "Hi" } },
                { "style": { "property": "margin", "value": "0" } },
                { "resize": { "dx": 10, "dy": 5 } },
                "delete", "undo", "redo", "save"
            ] }"#,
        );
        assert_eq!(parsed.steps.len(), 9);
        assert!(matches!(parsed.steps[0], Step::Tool(ToolMode::Select)));
        assert!(matches!(&parsed.steps[1], Step::Click(c) if c.target.index == 0 && c.x == 3.0));
        assert!(matches!(parsed.steps[8], Step::Save));
    }

    #[tokio::test]
    async fn test_run_script_and_save() {
        let store = MemoryPageStore::new();
        let key = PageKey::new("home.html").unwrap();
        let mut session = EditorSession::headless(EditorConfig::default());
        session.load_document(PAGE).unwrap();

        let steps = script(
            r##"{ "steps": [
                { "tool": "select" },
                { "click": { "tag": "h1" } },
                { "type": { "tag": "h1", "text": "New title" } },
                { "blur": { "tag": "h1" } },
                { "color": "#123456" },
                "save"
            ] }"##,
        );
        let reports = run(
            &mut session,
            &steps,
            Some(Destination {
                store: &store,
                key: &key,
            }),
        )
        .await
        .unwrap();

        assert_eq!(reports[3].summary, "edit committed");
        assert_eq!(reports[5].summary, "saved home.html");
        let saved = store.load(&key).await.unwrap();
        assert!(saved.contains(r#"<h1 style="color: #123456">New title</h1>"#));
    }

    #[tokio::test]
    async fn test_resize_step() {
        let mut session = EditorSession::headless(EditorConfig::default());
        session
            .load_document(r#"<body><div style="width: 100px; height: 20px">box</div></body>"#)
            .unwrap();

        let steps = script(
            r#"{ "steps": [
                { "tool": "select" },
                { "click": { "tag": "div" } },
                { "resize": { "dx": 50, "dy": -30 } }
            ] }"#,
        );
        let reports = run::<_, MemoryPageStore>(&mut session, &steps, None)
            .await
            .unwrap();

        assert_eq!(reports[2].summary, "resize ended (committed)");
        let body = session.history().current().unwrap();
        assert!(body.contains("width: 150px; height: 10px"), "{}", body);
    }

    #[tokio::test]
    async fn test_unknown_target_is_error() {
        let mut session = EditorSession::headless(EditorConfig::default());
        session.load_document(PAGE).unwrap();
        let steps = script(r#"{ "steps": [ { "click": { "tag": "table" } } ] }"#);

        let err = run::<_, MemoryPageStore>(&mut session, &steps, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No <table>"));
    }
}
