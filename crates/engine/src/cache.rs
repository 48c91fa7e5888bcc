//! Inference caches
//!
//! Caching is dependency-injected: engines never reach for hidden
//! global state. A [`KeyCache`] and [`InferenceCache`] are cheap
//! per-pass values owned by the caller; the [`SharedSchemaCache`] is a
//! process-wide concurrent map whose keys embed thread identity, so
//! threads observe only their own entries.
//!
//! Entries are idempotent per key (a structural key always maps to the
//! same inferred type), so concurrent equal-key writes race safely.

use std::sync::Arc;

use dashmap::DashMap;
use dyntype_core::raw::RawHandle;
use dyntype_core::types::Type;
use rustc_hash::FxHashMap;

use crate::structural::{ShapeKey, StructuralKey};

/// Per-pass memo of shape keys by arena handle.
///
/// FxHashMap: small integer-like keys, hot lookups, no DoS exposure
/// from untrusted keys.
#[derive(Debug, Default)]
pub struct KeyCache {
    pub(crate) keys: FxHashMap<RawHandle, ShapeKey>,
}

impl KeyCache {
    pub fn new() -> Self {
        KeyCache::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Per-pass inference state: shape keys plus the types inferred for
/// them. One cache per inference pass; shared subtrees within the pass
/// are served from here.
#[derive(Debug, Default)]
pub struct InferenceCache {
    pub(crate) keys: KeyCache,
    types: FxHashMap<StructuralKey, Type>,
}

impl InferenceCache {
    pub fn new() -> Self {
        InferenceCache::default()
    }

    pub fn lookup(&self, key: &StructuralKey) -> Option<&Type> {
        self.types.get(key)
    }

    pub fn store(&mut self, key: StructuralKey, ty: Type) {
        self.types.insert(key, ty);
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Process-wide schema cache shared across inference passes.
///
/// Keys are thread-scoped structural keys, so entries written by one
/// thread are invisible to every other. DashMap's shard locking is the
/// only synchronization; there is no cross-entry consistency to keep.
#[derive(Debug, Clone, Default)]
pub struct SharedSchemaCache {
    inner: Arc<DashMap<StructuralKey, Type>>,
}

impl SharedSchemaCache {
    pub fn new() -> Self {
        SharedSchemaCache::default()
    }

    pub fn get(&self, key: &StructuralKey) -> Option<Type> {
        self.inner.get(key).map(|entry| entry.value().clone())
    }

    pub fn insert(&self, key: StructuralKey, ty: Type) {
        self.inner.insert(key, ty);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inference_cache_round_trip() {
        let mut cache = InferenceCache::new();
        let key = StructuralKey::scoped(ShapeKey::Int(1));
        assert!(cache.lookup(&key).is_none());
        cache.store(key.clone(), Type::Number);
        assert_eq!(cache.lookup(&key), Some(&Type::Number));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_shared_cache_clones_share_entries() {
        let cache = SharedSchemaCache::new();
        let clone = cache.clone();
        let key = StructuralKey::scoped(ShapeKey::Str("a".into()));
        cache.insert(key.clone(), Type::String);
        assert_eq!(clone.get(&key), Some(Type::String));
    }

    #[test]
    fn test_shared_cache_keys_are_thread_scoped() {
        let cache = SharedSchemaCache::new();
        cache.insert(StructuralKey::scoped(ShapeKey::Bool(true)), Type::Bool);
        let cache2 = cache.clone();
        let seen = std::thread::spawn(move || {
            cache2.get(&StructuralKey::scoped(ShapeKey::Bool(true)))
        })
        .join()
        .unwrap();
        assert_eq!(seen, None);
    }
}
