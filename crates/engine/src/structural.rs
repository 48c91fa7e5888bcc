//! Structural cache keys for raw host data
//!
//! Inference memoizes per structure, not per object: two raw containers
//! with equal contents must collide on the same cache key even when
//! they are distinct arena slots. Keys are therefore built from values,
//! never from slot identity, except for payloads that have no
//! inspectable structure (capsules) and the documented no-cache
//! fallback.
//!
//! Traversal is iterative. A work stack drives visits, a post-order
//! pass finalizes containers from their children's keys, and a
//! placeholder inserted pre-order under the container's handle breaks
//! cycles: a child that refers back to an in-progress ancestor picks up
//! the ancestor's placeholder instead of recursing forever.

use std::hash::{Hash, Hasher};

use dyntype_core::raw::{RawArena, RawHandle, RawNode};
use rustc_hash::FxHasher;

use crate::cache::KeyCache;

// ============================================================================
// Fast-path thresholds
// ============================================================================

// Small all-primitive containers skip the work stack and build their
// key in one pass. Tuned independently per collection kind.

/// Maximum entry count for the map fast path.
pub const MAP_VALUE_KEY_MAX_LEN: usize = 5;

/// Maximum element count for the list/tuple fast path.
pub const SEQ_VALUE_KEY_MAX_LEN: usize = 100;

/// Maximum element count for the set fast path.
pub const SET_VALUE_KEY_MAX_LEN: usize = 100;

// ============================================================================
// Keys
// ============================================================================

/// A value-based description of a raw node's structure.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShapeKey {
    Null,
    Bool(bool),
    Int(i64),
    /// Float bit pattern; distinct from `Int` even at equal magnitude
    Float(u64),
    Str(String),
    Bytes(Vec<u8>),
    /// Embedded already-typed value, keyed by its type rendering
    Typed(String),
    /// Opaque host payload, keyed by payload identity
    Capsule(u64),
    /// Slot identity; cycle placeholders and the no-cache fallback
    Slot(u32),
    /// Ordered children
    List(Vec<ShapeKey>),
    /// Positional children
    Tuple(Vec<ShapeKey>),
    /// Children in sorted order
    Set(Vec<ShapeKey>),
    /// Entries sorted by key shape
    Map(Vec<(ShapeKey, ShapeKey)>),
}

/// A shape key scoped to the computing thread.
///
/// Thread identity buys isolation only: two threads never share cache
/// entries, so a shared cache needs no cross-thread coordination beyond
/// its own map. It provides no ordering or mutual exclusion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructuralKey {
    thread: u64,
    shape: ShapeKey,
}

impl StructuralKey {
    /// Scope `shape` to the current thread.
    pub fn scoped(shape: ShapeKey) -> Self {
        StructuralKey {
            thread: thread_token(),
            shape,
        }
    }

    pub fn shape(&self) -> &ShapeKey {
        &self.shape
    }
}

fn thread_token() -> u64 {
    let mut hasher = FxHasher::default();
    std::thread::current().id().hash(&mut hasher);
    hasher.finish()
}

// ============================================================================
// Key computation
// ============================================================================

/// Compute the thread-scoped structural key for `handle`.
///
/// Without a key cache there is nowhere to hold per-container
/// intermediate results, so the key degrades to slot identity. That
/// key is still safe (never aliases a different structure) but
/// equal-content containers in different slots no longer collide, so
/// memoization misses where it could have hit.
pub fn structural_key(
    arena: &RawArena,
    handle: RawHandle,
    cache: Option<&mut KeyCache>,
) -> StructuralKey {
    match cache {
        Some(cache) => StructuralKey::scoped(shape_key(arena, handle, cache)),
        None => StructuralKey::scoped(ShapeKey::Slot(handle.index() as u32)),
    }
}

enum Task {
    Visit(RawHandle),
    Finalize(RawHandle),
}

/// Compute the value-based shape key for `handle`, memoizing every
/// visited node in `cache`.
pub fn shape_key(arena: &RawArena, handle: RawHandle, cache: &mut KeyCache) -> ShapeKey {
    if let Some(key) = cache.keys.get(&handle) {
        return key.clone();
    }

    let mut stack = vec![Task::Visit(handle)];
    while let Some(task) = stack.pop() {
        match task {
            Task::Visit(h) => {
                if cache.keys.contains_key(&h) {
                    continue;
                }
                let node = arena.get(h);
                if let Some(leaf) = leaf_key(node) {
                    cache.keys.insert(h, leaf);
                    continue;
                }
                if let Some(fast) = fast_path_key(arena, node) {
                    cache.keys.insert(h, fast);
                    continue;
                }
                // Placeholder first: children reaching back to this
                // container resolve to it instead of looping.
                cache.keys.insert(h, ShapeKey::Slot(h.index() as u32));
                stack.push(Task::Finalize(h));
                match arena.get(h) {
                    RawNode::List(children)
                    | RawNode::Tuple(children)
                    | RawNode::Set(children) => {
                        for &child in children {
                            stack.push(Task::Visit(child));
                        }
                    }
                    RawNode::Map(entries) => {
                        for &(k, v) in entries {
                            stack.push(Task::Visit(k));
                            stack.push(Task::Visit(v));
                        }
                    }
                    _ => unreachable!("leaf nodes are handled above"),
                }
            }
            Task::Finalize(h) => {
                let canonical = finalize(arena, h, cache);
                cache.keys.insert(h, canonical);
            }
        }
    }

    cache.keys[&handle].clone()
}

/// Value-based key for nodes without children.
fn leaf_key(node: &RawNode) -> Option<ShapeKey> {
    Some(match node {
        RawNode::Null => ShapeKey::Null,
        RawNode::Bool(b) => ShapeKey::Bool(*b),
        RawNode::Int(i) => ShapeKey::Int(*i),
        RawNode::Float(f) => ShapeKey::Float(f.to_bits()),
        RawNode::String(s) => ShapeKey::Str(s.clone()),
        RawNode::Bytes(b) => ShapeKey::Bytes(b.clone()),
        RawNode::Value(v) => ShapeKey::Typed(v.ty().to_string()),
        RawNode::Capsule(h) => ShapeKey::Capsule(h.identity_hash()),
        RawNode::List(_) | RawNode::Tuple(_) | RawNode::Set(_) | RawNode::Map(_) => {
            return None;
        }
    })
}

/// One-pass key for small containers whose children are all leaves.
fn fast_path_key(arena: &RawArena, node: &RawNode) -> Option<ShapeKey> {
    match node {
        RawNode::List(children) if children.len() <= SEQ_VALUE_KEY_MAX_LEN => {
            let keys = leaf_children(arena, children)?;
            Some(ShapeKey::List(keys))
        }
        RawNode::Tuple(children) if children.len() <= SEQ_VALUE_KEY_MAX_LEN => {
            let keys = leaf_children(arena, children)?;
            Some(ShapeKey::Tuple(keys))
        }
        RawNode::Set(children) if children.len() <= SET_VALUE_KEY_MAX_LEN => {
            let mut keys = leaf_children(arena, children)?;
            keys.sort();
            Some(ShapeKey::Set(keys))
        }
        RawNode::Map(entries) if entries.len() <= MAP_VALUE_KEY_MAX_LEN => {
            let mut keys = Vec::with_capacity(entries.len());
            for &(k, v) in entries {
                let k = leaf_key(arena.get(k))?;
                let v = leaf_key(arena.get(v))?;
                keys.push((k, v));
            }
            keys.sort();
            Some(ShapeKey::Map(keys))
        }
        _ => None,
    }
}

fn leaf_children(arena: &RawArena, children: &[RawHandle]) -> Option<Vec<ShapeKey>> {
    children
        .iter()
        .map(|&c| leaf_key(arena.get(c)))
        .collect()
}

/// Build the canonical container key from already-computed child keys.
fn finalize(arena: &RawArena, handle: RawHandle, cache: &KeyCache) -> ShapeKey {
    let child = |h: RawHandle| cache.keys[&h].clone();
    match arena.get(handle) {
        RawNode::List(children) => {
            ShapeKey::List(children.iter().map(|&c| child(c)).collect())
        }
        RawNode::Tuple(children) => {
            ShapeKey::Tuple(children.iter().map(|&c| child(c)).collect())
        }
        RawNode::Set(children) => {
            let mut keys: Vec<ShapeKey> = children.iter().map(|&c| child(c)).collect();
            keys.sort();
            ShapeKey::Set(keys)
        }
        RawNode::Map(entries) => {
            let mut keys: Vec<(ShapeKey, ShapeKey)> = entries
                .iter()
                .map(|&(k, v)| (child(k), child(v)))
                .collect();
            keys.sort();
            ShapeKey::Map(keys)
        }
        _ => unreachable!("only containers are finalized"),
    }
}
