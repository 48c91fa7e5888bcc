//! Shared helpers for integration tests

use dyntype::{RawArena, RawHandle};

/// Parse a JSON document into a fresh arena.
pub fn arena_from_json(doc: &str) -> (RawArena, RawHandle) {
    let json: serde_json::Value = serde_json::from_str(doc).expect("test JSON must parse");
    let mut arena = RawArena::new();
    let root = arena.json(&json);
    (arena, root)
}
