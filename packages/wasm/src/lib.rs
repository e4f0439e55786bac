use pagecraft_editor::{
    DocumentSurface, EditorConfig, EditorSession, EventOutcome, HistoryOutcome, LoadSource,
    NodeId, Panel, Point, SurfaceGeometry, ToolMode,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Parse a bare camelCase name ("textInsert", "style") into a serde enum
fn parse_name<T: DeserializeOwned>(name: &str, what: &str) -> Result<T, JsValue> {
    serde_json::from_value(serde_json::Value::String(name.to_string()))
        .map_err(|_| JsValue::from_str(&format!("Unknown {}: {}", what, name)))
}

fn outcome_json(outcome: EventOutcome) -> String {
    let value = match outcome {
        EventOutcome::Ignored => json!({ "type": "ignored" }),
        EventOutcome::Inserted(node) => json!({ "type": "inserted", "node": node.index() }),
        EventOutcome::Selected(node) => json!({ "type": "selected", "node": node.index() }),
        EventOutcome::SelectionCleared => json!({ "type": "selectionCleared" }),
        EventOutcome::Committed => json!({ "type": "committed" }),
        EventOutcome::ResizeStarted => json!({ "type": "resizeStarted" }),
        EventOutcome::Resized => json!({ "type": "resized" }),
        EventOutcome::ResizeEnded { committed } => {
            json!({ "type": "resizeEnded", "committed": committed })
        }
    };
    value.to_string()
}

fn history_applied(outcome: HistoryOutcome) -> bool {
    matches!(outcome, HistoryOutcome::Applied)
}

/// Editor session driven by a browser host.
///
/// The host mirrors `liveBodyHtml()` into its preview frame after every
/// call and addresses elements by the node ids this class hands out.
/// Ids are only valid until the next `loadDocument`, `undo` or `redo`.
#[wasm_bindgen]
pub struct Editor {
    session: EditorSession,
}

#[wasm_bindgen]
impl Editor {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<Editor, JsValue> {
        let config = match config_json {
            Some(json) => serde_json::from_str::<EditorConfig>(&json)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?,
            None => EditorConfig::default(),
        };
        Ok(Editor {
            session: EditorSession::headless(config),
        })
    }

    /// Install a document. Returns false when it could not be parsed and
    /// the blank page was installed instead.
    #[wasm_bindgen(js_name = loadDocument)]
    pub fn load_document(&mut self, markup: &str) -> Result<bool, JsValue> {
        let source = self.session.load_document(markup).map_err(js_error)?;
        Ok(source == LoadSource::Requested)
    }

    #[wasm_bindgen(js_name = setGeometry)]
    pub fn set_geometry(&mut self, origin_x: f64, origin_y: f64, scroll_x: f64, scroll_y: f64, zoom: f64) {
        self.session.surface_mut().set_geometry(SurfaceGeometry {
            origin: Point::new(origin_x, origin_y),
            scroll: Point::new(scroll_x, scroll_y),
            zoom,
        });
    }

    /// Toggle a tool ("textInsert" or "select") and return the active one
    #[wasm_bindgen(js_name = toggleTool)]
    pub fn toggle_tool(&mut self, tool: &str) -> Result<String, JsValue> {
        let tool: ToolMode = parse_name(tool, "tool")?;
        let transition = self.session.toggle_tool(tool).map_err(js_error)?;
        Ok(transition.current.to_string())
    }

    #[wasm_bindgen(getter)]
    pub fn tool(&self) -> String {
        self.session.tool().to_string()
    }

    pub fn click(&mut self, node: u32, x: f64, y: f64) -> Result<String, JsValue> {
        let outcome = self
            .session
            .click(NodeId::from_index(node as usize), Point::new(x, y))
            .map_err(js_error)?;
        Ok(outcome_json(outcome))
    }

    #[wasm_bindgen(js_name = focusOut)]
    pub fn focus_out(&mut self, node: u32) -> Result<String, JsValue> {
        let outcome = self
            .session
            .focus_out(NodeId::from_index(node as usize))
            .map_err(js_error)?;
        Ok(outcome_json(outcome))
    }

    #[wasm_bindgen(js_name = inputText)]
    pub fn input_text(&mut self, node: u32, text: &str) -> Result<bool, JsValue> {
        self.session
            .input_text(NodeId::from_index(node as usize), text)
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, node: u32, x: f64, y: f64) -> Result<String, JsValue> {
        let outcome = self
            .session
            .pointer_down(NodeId::from_index(node as usize), Point::new(x, y))
            .map_err(js_error)?;
        Ok(outcome_json(outcome))
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<String, JsValue> {
        let outcome = self.session.pointer_move(Point::new(x, y)).map_err(js_error)?;
        Ok(outcome_json(outcome))
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f64, y: f64) -> Result<String, JsValue> {
        let outcome = self.session.pointer_up(Point::new(x, y)).map_err(js_error)?;
        Ok(outcome_json(outcome))
    }

    #[wasm_bindgen(js_name = applyClass)]
    pub fn apply_class(&mut self, class: &str) -> Result<bool, JsValue> {
        self.session.apply_class(class).map_err(js_error)
    }

    #[wasm_bindgen(js_name = removeClass)]
    pub fn remove_class(&mut self, class: &str) -> Result<bool, JsValue> {
        self.session.remove_class(class).map_err(js_error)
    }

    #[wasm_bindgen(js_name = applyColor)]
    pub fn apply_color(&mut self, color: &str) -> Result<bool, JsValue> {
        self.session.apply_color(color).map_err(js_error)
    }

    #[wasm_bindgen(js_name = applyStyle)]
    pub fn apply_style(&mut self, property: &str, value: &str) -> Result<bool, JsValue> {
        self.session.apply_style(property, value).map_err(js_error)
    }

    #[wasm_bindgen(js_name = deleteSelected)]
    pub fn delete_selected(&mut self) -> Result<bool, JsValue> {
        self.session.delete_selected().map_err(js_error)
    }

    pub fn undo(&mut self) -> Result<bool, JsValue> {
        self.session.undo().map(history_applied).map_err(js_error)
    }

    pub fn redo(&mut self) -> Result<bool, JsValue> {
        self.session.redo().map(history_applied).map_err(js_error)
    }

    #[wasm_bindgen(js_name = openPanel)]
    pub fn open_panel(&mut self, panel: &str) -> Result<(), JsValue> {
        let panel: Panel = parse_name(panel, "panel")?;
        self.session.open_panel(panel);
        Ok(())
    }

    #[wasm_bindgen(js_name = closePanel)]
    pub fn close_panel(&mut self) {
        self.session.close_panel();
    }

    #[wasm_bindgen(getter)]
    pub fn panel(&self) -> Option<String> {
        self.session.panel().map(|panel| match panel {
            Panel::Style => "style".to_string(),
            Panel::Button => "button".to_string(),
        })
    }

    #[wasm_bindgen(getter)]
    pub fn selected(&self) -> Option<u32> {
        self.session.selected().map(|node| node.index() as u32)
    }

    #[wasm_bindgen(getter)]
    pub fn focused(&self) -> Option<u32> {
        self.session.focused().map(|node| node.index() as u32)
    }

    /// Body markup without editor chrome
    pub fn snapshot(&self) -> Result<String, JsValue> {
        self.session.snapshot().map_err(js_error)
    }

    /// Full document as it should be persisted
    #[wasm_bindgen(js_name = documentMarkup)]
    pub fn document_markup(&self) -> Result<String, JsValue> {
        self.session.document_markup().map_err(js_error)
    }

    /// Body markup including selection chrome, for rendering
    #[wasm_bindgen(js_name = liveBodyHtml)]
    pub fn live_body_html(&self) -> Result<String, JsValue> {
        let dom = self.session.surface().dom().map_err(js_error)?;
        Ok(dom.body_html())
    }

    #[wasm_bindgen(js_name = bodyNode)]
    pub fn body_node(&self) -> Result<u32, JsValue> {
        let dom = self.session.surface().dom().map_err(js_error)?;
        Ok(dom.body().index() as u32)
    }

    /// Node ids of attached elements with `tag`, in document order
    #[wasm_bindgen(js_name = elementsByTag)]
    pub fn elements_by_tag(&self, tag: &str) -> Result<Vec<u32>, JsValue> {
        let dom = self.session.surface().dom().map_err(js_error)?;
        Ok(dom
            .elements_by_tag(tag)
            .into_iter()
            .map(|node| node.index() as u32)
            .collect())
    }

    #[wasm_bindgen(getter)]
    pub fn generation(&self) -> f64 {
        self.session.surface().generation().0 as f64
    }

    #[wasm_bindgen(js_name = historyLength)]
    pub fn history_length(&self) -> u32 {
        self.session.history().len() as u32
    }

    #[wasm_bindgen(js_name = historyCursor)]
    pub fn history_cursor(&self) -> Option<u32> {
        self.session.history().cursor().map(|cursor| cursor as u32)
    }

    #[wasm_bindgen(js_name = hasUnsavedChanges)]
    pub fn has_unsaved_changes(&self) -> bool {
        self.session.has_unsaved_changes()
    }

    #[wasm_bindgen(js_name = shouldAutosave)]
    pub fn should_autosave(&self) -> bool {
        self.session.should_autosave()
    }

    /// Call after the host's own save request succeeded
    #[wasm_bindgen(js_name = markSaved)]
    pub fn mark_saved(&mut self, page: &str) {
        self.session.mark_saved(page);
    }

    #[wasm_bindgen(js_name = markSaveFailed)]
    pub fn mark_save_failed(&mut self, reason: &str) {
        self.session.mark_save_failed(reason);
    }

    /// Pending status message, cleared once read
    #[wasm_bindgen(js_name = takeNotice)]
    pub fn take_notice(&mut self) -> Option<String> {
        self.session.take_notice().map(|notice| notice.to_string())
    }
}
