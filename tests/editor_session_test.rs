// End-to-end editing session: build a page, reorder, use the clipboard
// across documents, and walk history through its bound.

use serde_json::{json, Map, Value};

use pagebuilder_engine::store::{ManualClock, PageStore};
use pagebuilder_engine::{MemoryStore, PageDocument};

fn content(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn new_store() -> PageStore {
    let clock = ManualClock::new(
        chrono::DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
    );
    PageStore::new(Box::new(MemoryStore::new()), Box::new(std::rc::Rc::new(clock)))
}

fn assert_orders_sequential(store: &PageStore) {
    for (i, block) in store.blocks().iter().enumerate() {
        assert_eq!(block.order, i, "order broken at index {}", i);
    }
}

#[test]
fn test_build_page_from_scratch() {
    let mut store = new_store();
    assert!(!store.can_undo());
    assert_eq!(store.title(), "Untitled Page");

    let hero = store.add_block("hero", content(&[("headline", json!("Welcome"))]), None);
    store.add_block("paragraph", content(&[("text", json!("Body"))]), None);
    store.add_block("button", content(&[("text", json!("Go"))]), None);
    store.set_title("Landing");

    assert_eq!(store.blocks().len(), 3);
    assert_eq!(store.blocks()[0].id, hero);
    assert_eq!(store.title(), "Landing");
    assert!(store.has_unsaved_changes());
    assert_orders_sequential(&store);
}

#[test]
fn test_reorder_then_undo_restores_previous_order() {
    let mut store = new_store();
    store.add_block("hero", Map::new(), None);
    store.add_block("paragraph", Map::new(), None);
    store.add_block("image", Map::new(), None);
    let original: Vec<String> = store.blocks().iter().map(|b| b.id.clone()).collect();

    store.move_block(2, 0).unwrap();
    assert_eq!(store.blocks()[0].id, original[2]);
    assert_orders_sequential(&store);

    store.undo().unwrap();
    let restored: Vec<String> = store.blocks().iter().map(|b| b.id.clone()).collect();
    assert_eq!(restored, original);
    assert_orders_sequential(&store);
}

#[test]
fn test_history_is_bounded() {
    let mut store = new_store();
    for i in 0..60 {
        store.add_block("paragraph", content(&[("n", json!(i))]), None);
    }
    let mut undone = 0;
    while store.can_undo() {
        store.undo().unwrap();
        undone += 1;
    }
    // 50 snapshots means 49 undo steps from the newest.
    assert_eq!(undone, 49);
    // The oldest reachable state is the 11th commit.
    assert_eq!(store.blocks().len(), 11);
}

#[test]
fn test_new_commit_discards_redo_branch() {
    let mut store = new_store();
    store.add_block("hero", Map::new(), None);
    store.add_block("paragraph", Map::new(), None);
    store.undo().unwrap();
    assert!(store.can_redo());

    store.add_block("image", Map::new(), None);
    assert!(!store.can_redo());
    assert!(store.redo().is_err());
}

#[test]
fn test_clipboard_survives_page_switch() {
    let mut store = new_store();
    let hero = store.add_block("hero", content(&[("headline", json!("Hi"))]), None);
    store.click_block(&hero);
    assert_eq!(store.copy_selection(), 1);

    // Switch to a fresh page; the clipboard deliberately survives.
    store.reset_for_new_page();
    assert!(store.blocks().is_empty());
    assert_eq!(store.paste_at(None), 1);
    assert_eq!(store.blocks().len(), 1);
    assert_eq!(store.blocks()[0].kind, "hero");
    assert_ne!(store.blocks()[0].id, hero);
    assert_eq!(store.blocks()[0].content.get("headline"), Some(&json!("Hi")));
}

#[test]
fn test_multi_select_cut_and_repeated_paste() {
    let mut store = new_store();
    let a = store.add_block("hero", Map::new(), None);
    let b = store.add_block("paragraph", Map::new(), None);
    store.add_block("image", Map::new(), None);

    store.click_block(&a);
    store.ctrl_click_block(&b);
    assert_eq!(store.cut_selection(), 2);
    assert_eq!(store.blocks().len(), 1);
    assert!(store.clipboard().is_cut());

    // Paste twice; the clipboard is never consumed.
    assert_eq!(store.paste_at(None), 2);
    assert_eq!(store.paste_at(None), 2);
    assert_eq!(store.blocks().len(), 5);
    assert_eq!(store.clipboard().count(), 2);
    assert_orders_sequential(&store);
}

#[test]
fn test_existing_document_undoes_back_to_loaded_state() {
    let clock = ManualClock::new(
        chrono::DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
    );
    let mut document = PageDocument::new();
    document.id = Some("42".to_string());
    document.title = "About".to_string();
    document
        .set_blocks(vec![pagebuilder_engine::Block::new("hero", Map::new(), 0)]);
    let mut store = PageStore::with_document(
        document,
        Box::new(MemoryStore::new()),
        Box::new(std::rc::Rc::new(clock)),
    );

    store.add_block("paragraph", Map::new(), None);
    store.add_block("image", Map::new(), None);
    store.undo().unwrap();
    store.undo().unwrap();

    // Back to the loaded snapshot, not an empty page.
    assert_eq!(store.blocks().len(), 1);
    assert_eq!(store.blocks()[0].kind, "hero");
    assert!(!store.can_undo());
}
