//! Type inference over raw host data
//!
//! Given an arena handle, inference discovers the most specific type
//! the raw data supports:
//!
//! - Mappings whose keys are all strings become objects with one typed
//!   attribute per key; any non-string key demotes the mapping to
//!   `Map(unify(values))`.
//! - Sequences unify their element types; disagreement widens to
//!   `Dynamic`.
//! - Leaves map onto the primitives; capsules and nulls are `Dynamic`.
//! - An embedded already-typed value short-circuits to its own type.
//!
//! The traversal is iterative (host data can nest past any recursion
//! limit) and memoized through structural keys, so shared subtrees and
//! repeated shapes are typed once per pass.

use std::collections::BTreeMap;

use dyntype_core::raw::{string_entries, RawArena, RawHandle, RawNode};
use dyntype_core::types::{unify, ObjectType, Type};
use rustc_hash::{FxHashMap, FxHashSet};
use unicode_normalization::UnicodeNormalization;

use crate::adapter::RecordAdapter;
use crate::cache::{InferenceCache, SharedSchemaCache};
use crate::structural::structural_key;

/// Optional collaborators for an inference pass.
#[derive(Default)]
pub struct InferOptions<'a> {
    /// Flattens foreign structured records before typing them.
    pub adapter: Option<&'a dyn RecordAdapter>,
    /// Cross-pass schema cache; keys are thread-scoped.
    pub shared: Option<&'a SharedSchemaCache>,
}

/// Infer the type of `root` with a fresh per-pass cache and no
/// adapter.
pub fn infer_simple(arena: &mut RawArena, root: RawHandle) -> Type {
    let mut cache = InferenceCache::new();
    infer(arena, root, &mut cache, &InferOptions::default())
}

enum Step {
    Enter(RawHandle),
    Exit(RawHandle),
    /// Copy the result inferred for the second handle onto the first.
    Alias(RawHandle, RawHandle),
}

/// Infer the type of the raw data at `root`.
pub fn infer(
    arena: &mut RawArena,
    root: RawHandle,
    cache: &mut InferenceCache,
    opts: &InferOptions<'_>,
) -> Type {
    let mut results: FxHashMap<RawHandle, Type> = FxHashMap::default();
    let mut processing: FxHashSet<RawHandle> = FxHashSet::default();
    let mut stack = vec![Step::Enter(root)];

    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(h) => {
                if results.contains_key(&h) {
                    continue;
                }
                if processing.contains(&h) {
                    // Back-reference into an unfinished container. The
                    // provisional Dynamic is what the inner container
                    // sees; the ancestor's own exit overwrites it.
                    results.insert(h, Type::Dynamic);
                    continue;
                }
                match arena.get(h) {
                    RawNode::Null => {
                        results.insert(h, Type::Dynamic);
                    }
                    RawNode::Value(v) => {
                        let ty = v.ty().clone();
                        results.insert(h, ty);
                    }
                    RawNode::Bool(_) => {
                        results.insert(h, Type::Bool);
                    }
                    RawNode::Int(_) | RawNode::Float(_) => {
                        results.insert(h, Type::Number);
                    }
                    RawNode::String(_) | RawNode::Bytes(_) => {
                        results.insert(h, Type::String);
                    }
                    RawNode::Capsule(payload) => {
                        let payload = payload.clone();
                        let adapted = match opts.adapter {
                            Some(adapter) if adapter.is_record(&payload) => {
                                match adapter.flatten(&payload, arena) {
                                    Ok(flat) => Some(flat),
                                    Err(err) => {
                                        tracing::debug!(
                                            kind = payload.kind().name(),
                                            error = %err,
                                            "record flatten failed, typing as dynamic"
                                        );
                                        None
                                    }
                                }
                            }
                            _ => None,
                        };
                        match adapted {
                            Some(flat) => {
                                stack.push(Step::Alias(h, flat));
                                stack.push(Step::Enter(flat));
                            }
                            None => {
                                results.insert(h, Type::Dynamic);
                            }
                        }
                    }
                    RawNode::List(children)
                    | RawNode::Tuple(children)
                    | RawNode::Set(children) => {
                        let children = children.clone();
                        if let Some(ty) = cached_type(arena, h, cache, opts) {
                            results.insert(h, ty);
                            continue;
                        }
                        processing.insert(h);
                        stack.push(Step::Exit(h));
                        for child in children {
                            stack.push(Step::Enter(child));
                        }
                    }
                    RawNode::Map(entries) => {
                        let entries = entries.clone();
                        if let Some(ty) = cached_type(arena, h, cache, opts) {
                            results.insert(h, ty);
                            continue;
                        }
                        processing.insert(h);
                        stack.push(Step::Exit(h));
                        for (_, v) in entries {
                            stack.push(Step::Enter(v));
                        }
                    }
                }
            }
            Step::Exit(h) => {
                let ty = finish_container(arena, h, &results);
                processing.remove(&h);
                results.insert(h, ty.clone());
                let key = structural_key(arena, h, Some(&mut cache.keys));
                if let Some(shared) = opts.shared {
                    shared.insert(key.clone(), ty.clone());
                }
                cache.store(key, ty);
            }
            Step::Alias(h, flat) => {
                let ty = results
                    .get(&flat)
                    .cloned()
                    .unwrap_or(Type::Dynamic);
                results.insert(h, ty);
            }
        }
    }

    results.remove(&root).unwrap_or(Type::Dynamic)
}

/// Memo lookup for a container, per-pass first, then the shared cache.
fn cached_type(
    arena: &RawArena,
    h: RawHandle,
    cache: &mut InferenceCache,
    opts: &InferOptions<'_>,
) -> Option<Type> {
    let key = structural_key(arena, h, Some(&mut cache.keys));
    if let Some(ty) = cache.lookup(&key) {
        return Some(ty.clone());
    }
    if let Some(shared) = opts.shared {
        if let Some(ty) = shared.get(&key) {
            cache.store(key, ty.clone());
            return Some(ty);
        }
    }
    None
}

fn finish_container(
    arena: &RawArena,
    h: RawHandle,
    results: &FxHashMap<RawHandle, Type>,
) -> Type {
    let child = |c: RawHandle| results.get(&c).cloned().unwrap_or(Type::Dynamic);
    match arena.get(h) {
        RawNode::List(children) => {
            let elems: Vec<Type> = children.iter().map(|&c| child(c)).collect();
            Type::list(unify(&elems))
        }
        RawNode::Set(children) => {
            let elems: Vec<Type> = children.iter().map(|&c| child(c)).collect();
            Type::set(unify(&elems))
        }
        RawNode::Tuple(children) => {
            Type::Tuple(children.iter().map(|&c| child(c)).collect())
        }
        RawNode::Map(entries) => match string_entries(arena, entries) {
            Some(by_name) => object_of(by_name, &child),
            None => {
                let values: Vec<Type> = entries.iter().map(|&(_, v)| child(v)).collect();
                Type::map(unify(&values))
            }
        },
        _ => unreachable!("only containers take the exit path"),
    }
}

/// Build an object type from string-keyed entries. Attribute names are
/// NFC-normalized; names that collide after normalization collapse to
/// one attribute. An unusable name (empty string) demotes the whole
/// mapping to a map type.
fn object_of(by_name: BTreeMap<String, RawHandle>, child: &dyn Fn(RawHandle) -> Type) -> Type {
    let mut attrs: BTreeMap<String, Type> = BTreeMap::new();
    for (name, v) in &by_name {
        let name: String = name.nfc().collect();
        attrs.insert(name, child(*v));
    }
    match ObjectType::new(attrs, []) {
        Ok(obj) => Type::Object(obj),
        Err(_) => {
            let values: Vec<Type> = by_name.values().map(|&v| child(v)).collect();
            Type::map(unify(&values))
        }
    }
}
