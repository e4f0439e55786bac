//! Loading and saving pages through a PageStore

use async_trait::async_trait;
use pagecraft_editor::{
    DocumentSurface, EditorConfig, EditorError, EditorSession, LoadSource, Notice, PageKey,
    PageStore, Point, ToolMode,
};
use pagecraft_store::{MemoryPageStore, StoreError};

const PAGE: &str = r#"<!DOCTYPE html><html><head><title>About</title><style>p { margin: 0 }</style></head><body><h2>About us</h2><p>We bake.</p></body></html>"#;

/// Store whose every call fails
struct BrokenStore;

#[async_trait]
impl PageStore for BrokenStore {
    async fn load(&self, _key: &PageKey) -> Result<String, StoreError> {
        Err(StoreError::Transport("connection refused".to_string()))
    }

    async fn save(&self, _key: &PageKey, _content: &str) -> Result<(), StoreError> {
        Err(StoreError::Status(503))
    }

    async fn reset(&self) -> Result<(), StoreError> {
        Err(StoreError::Status(503))
    }
}

fn key() -> PageKey {
    PageKey::new("about.html").unwrap()
}

#[tokio::test]
async fn test_save_then_load_round_trip() {
    let store = MemoryPageStore::with_pages([(key(), PAGE.to_string())]);

    let mut session = EditorSession::headless(EditorConfig::default());
    assert_eq!(
        session.load_page(&store, &key()).await.unwrap(),
        LoadSource::Requested
    );

    session.toggle_tool(ToolMode::Select).unwrap();
    let h2 = session.surface().dom().unwrap().elements_by_tag("h2")[0];
    session.click(h2, Point::default()).unwrap();
    session.apply_color("#aa3300").unwrap();
    assert!(session.has_unsaved_changes());

    session.save_page(&store, &key()).await.unwrap();
    assert!(!session.has_unsaved_changes());
    let saved = session.document_markup().unwrap();

    let mut reopened = EditorSession::headless(EditorConfig::default());
    reopened.load_page(&store, &key()).await.unwrap();

    assert_eq!(reopened.document_markup().unwrap(), saved);
    assert_eq!(reopened.history().len(), 1);
    assert!(saved.contains("<style>p { margin: 0 }</style>"));
    assert!(saved.contains(r#"<h2 style="color: #aa3300">About us</h2>"#));
    assert!(!saved.contains("contenteditable"));
    assert!(!saved.contains("pagecraft-resize-handle"));
}

#[tokio::test]
async fn test_missing_page_loads_default_document() {
    let store = MemoryPageStore::new();
    let mut session = EditorSession::headless(EditorConfig::default());

    let source = session.load_page(&store, &key()).await.unwrap();

    assert_eq!(source, LoadSource::Fallback);
    assert_eq!(session.surface().read_body().unwrap(), "");
    assert_eq!(session.history().len(), 1);
    assert!(matches!(
        session.take_notice(),
        Some(Notice::LoadFailed { .. })
    ));
}

#[tokio::test]
async fn test_unreachable_store_loads_default_document() {
    let mut session = EditorSession::headless(EditorConfig::default());
    let source = session.load_page(&BrokenStore, &key()).await.unwrap();
    assert_eq!(source, LoadSource::Fallback);

    // The editor still works on the fallback
    session.toggle_tool(ToolMode::TextInsert).unwrap();
    let body = session.surface().dom().unwrap().body();
    session.click(body, Point::new(1.0, 2.0)).unwrap();
    assert_eq!(session.history().len(), 2);
}

#[tokio::test]
async fn test_failed_save_reports_and_keeps_history() {
    let store = MemoryPageStore::with_pages([(key(), PAGE.to_string())]);
    let mut session = EditorSession::headless(EditorConfig::default());
    session.load_page(&store, &key()).await.unwrap();

    session.toggle_tool(ToolMode::Select).unwrap();
    let p = session.surface().dom().unwrap().elements_by_tag("p")[0];
    session.click(p, Point::default()).unwrap();
    session.apply_class("intro").unwrap();
    let entries = session.history().entries().to_vec();

    let err = session.save_page(&BrokenStore, &key()).await.unwrap_err();

    assert!(matches!(err, EditorError::Store(StoreError::Status(503))));
    assert_eq!(session.history().entries(), entries.as_slice());
    assert!(session.has_unsaved_changes());
    assert_eq!(
        session.notice().map(|n| n.to_string()),
        Some("Save failed: Server responded with status 503".to_string())
    );
}

#[tokio::test]
async fn test_saving_twice_overwrites() {
    let store = MemoryPageStore::new();
    let mut session = EditorSession::headless(EditorConfig::default());
    session.load_document(PAGE).unwrap();

    session.save_page(&store, &key()).await.unwrap();
    session.save_page(&store, &key()).await.unwrap();

    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_undo_marks_unsaved() {
    let store = MemoryPageStore::new();
    let config = EditorConfig {
        save_on_commit: true,
        ..EditorConfig::default()
    };
    let mut session = EditorSession::headless(config);
    session.load_document(PAGE).unwrap();
    assert!(!session.should_autosave());

    session.toggle_tool(ToolMode::Select).unwrap();
    let p = session.surface().dom().unwrap().elements_by_tag("p")[0];
    session.click(p, Point::default()).unwrap();
    session.apply_class("intro").unwrap();
    assert!(session.should_autosave());

    session.save_page(&store, &key()).await.unwrap();
    assert!(!session.should_autosave());

    session.undo().unwrap();
    assert!(session.should_autosave());
}

#[tokio::test]
async fn test_undo_then_redo_back_to_saved_content_is_clean() {
    let store = MemoryPageStore::new();
    let config = EditorConfig {
        save_on_commit: true,
        ..EditorConfig::default()
    };
    let mut session = EditorSession::headless(config);
    session.load_document(PAGE).unwrap();

    session.toggle_tool(ToolMode::Select).unwrap();
    let p = session.surface().dom().unwrap().elements_by_tag("p")[0];
    session.click(p, Point::default()).unwrap();
    session.apply_class("intro").unwrap();
    session.save_page(&store, &key()).await.unwrap();

    session.undo().unwrap();
    assert!(session.has_unsaved_changes());
    session.redo().unwrap();
    assert!(!session.has_unsaved_changes());
    assert!(!session.should_autosave());

    // Back at the loaded baseline, which differs from what was saved
    session.undo().unwrap();
    assert!(session.should_autosave());
}
