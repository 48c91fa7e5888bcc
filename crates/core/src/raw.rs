//! Raw host value arena
//!
//! Inference and validation consume untyped host data. Host graphs may
//! share subtrees or contain cycles, so raw values live in an arena and
//! refer to each other through stable slot handles instead of owned
//! nesting. Handles give the traversal engines a cheap identity for
//! visited-set and cache bookkeeping.

use std::collections::BTreeMap;

use crate::capsule::HostValue;
use crate::value::Value;

/// Stable identity of a slot in a [`RawArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawHandle(u32);

impl RawHandle {
    /// Slot index.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// One untyped host value.
#[derive(Debug, Clone)]
pub enum RawNode {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Ordered children
    List(Vec<RawHandle>),
    /// Positional children
    Tuple(Vec<RawHandle>),
    /// Unordered distinct children
    Set(Vec<RawHandle>),
    /// Entries with arbitrary raw keys
    Map(Vec<(RawHandle, RawHandle)>),
    /// Opaque host payload
    Capsule(HostValue),
    /// An already-validated value embedded in raw data
    Value(Value),
}

/// Slot-indexed storage for raw host values.
///
/// `reserve` + `fill` let callers build cyclic graphs: reserve the
/// container's handle first, then fill it with children that may refer
/// back to it.
#[derive(Debug, Default)]
pub struct RawArena {
    nodes: Vec<RawNode>,
}

impl RawArena {
    pub fn new() -> Self {
        RawArena { nodes: Vec::new() }
    }

    /// Store a node and return its handle.
    pub fn alloc(&mut self, node: RawNode) -> RawHandle {
        let handle = RawHandle(self.nodes.len() as u32);
        self.nodes.push(node);
        handle
    }

    /// Reserve a slot to be filled later. Until filled the slot reads
    /// as `Null`.
    pub fn reserve(&mut self) -> RawHandle {
        self.alloc(RawNode::Null)
    }

    /// Fill a reserved slot.
    pub fn fill(&mut self, handle: RawHandle, node: RawNode) {
        self.nodes[handle.index()] = node;
    }

    pub fn get(&self, handle: RawHandle) -> &RawNode {
        &self.nodes[handle.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ------------------------------------------------------------------
    // Builder helpers
    // ------------------------------------------------------------------

    pub fn null(&mut self) -> RawHandle {
        self.alloc(RawNode::Null)
    }

    pub fn bool(&mut self, b: bool) -> RawHandle {
        self.alloc(RawNode::Bool(b))
    }

    pub fn int(&mut self, i: i64) -> RawHandle {
        self.alloc(RawNode::Int(i))
    }

    pub fn float(&mut self, f: f64) -> RawHandle {
        self.alloc(RawNode::Float(f))
    }

    pub fn string(&mut self, s: impl Into<String>) -> RawHandle {
        self.alloc(RawNode::String(s.into()))
    }

    pub fn bytes(&mut self, b: impl Into<Vec<u8>>) -> RawHandle {
        self.alloc(RawNode::Bytes(b.into()))
    }

    pub fn list(&mut self, children: impl IntoIterator<Item = RawHandle>) -> RawHandle {
        let children = children.into_iter().collect();
        self.alloc(RawNode::List(children))
    }

    pub fn tuple(&mut self, children: impl IntoIterator<Item = RawHandle>) -> RawHandle {
        let children = children.into_iter().collect();
        self.alloc(RawNode::Tuple(children))
    }

    pub fn set(&mut self, children: impl IntoIterator<Item = RawHandle>) -> RawHandle {
        let children = children.into_iter().collect();
        self.alloc(RawNode::Set(children))
    }

    pub fn map(
        &mut self,
        entries: impl IntoIterator<Item = (RawHandle, RawHandle)>,
    ) -> RawHandle {
        let entries = entries.into_iter().collect();
        self.alloc(RawNode::Map(entries))
    }

    /// Map with string keys, the common case.
    pub fn string_map<K, I>(&mut self, entries: I) -> RawHandle
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, RawHandle)>,
    {
        let entries: Vec<(RawHandle, RawHandle)> = entries
            .into_iter()
            .map(|(k, v)| (self.string(k.into()), v))
            .collect();
        self.alloc(RawNode::Map(entries))
    }

    pub fn capsule(&mut self, payload: HostValue) -> RawHandle {
        self.alloc(RawNode::Capsule(payload))
    }

    pub fn value(&mut self, value: Value) -> RawHandle {
        self.alloc(RawNode::Value(value))
    }

    /// Ingest a JSON document as raw data.
    pub fn json(&mut self, json: &serde_json::Value) -> RawHandle {
        match json {
            serde_json::Value::Null => self.null(),
            serde_json::Value::Bool(b) => self.bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    self.int(i)
                } else {
                    self.float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => self.string(s.clone()),
            serde_json::Value::Array(items) => {
                let children: Vec<RawHandle> =
                    items.iter().map(|item| self.json(item)).collect();
                self.alloc(RawNode::List(children))
            }
            serde_json::Value::Object(fields) => {
                let entries: Vec<(RawHandle, RawHandle)> = fields
                    .iter()
                    .map(|(k, v)| {
                        let key = self.string(k.clone());
                        let val = self.json(v);
                        (key, val)
                    })
                    .collect();
                self.alloc(RawNode::Map(entries))
            }
        }
    }
}

/// Collect a string-keyed map node into a name-ordered view, or `None`
/// if any key is not a string.
pub fn string_entries(
    arena: &RawArena,
    entries: &[(RawHandle, RawHandle)],
) -> Option<BTreeMap<String, RawHandle>> {
    let mut out = BTreeMap::new();
    for (k, v) in entries {
        match arena.get(*k) {
            RawNode::String(s) => {
                out.insert(s.clone(), *v);
            }
            _ => return None,
        }
    }
    Some(out)
}
