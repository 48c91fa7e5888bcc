//! Capsule types: opaque host objects in the type system
//!
//! A capsule type wraps a host-defined kind that the runtime cannot look
//! inside. Two capsule values of the same capsule type compare by host
//! identity unless the type carries custom operations; conversion to any
//! other type is only possible through a custom `convert` hook.
//!
//! ## Contract
//!
//! - Two capsule *types* are equal only if they wrap the same host kind
//!   and share the same ops identity (or both have none). A capsule
//!   without ops never equals one with ops.
//! - A consistent `equal`/`hash` pair is the implementor's
//!   responsibility; the runtime does not cross-check them.

use crate::types::Type;
use crate::value::Value;
use std::any::{Any, TypeId};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identity of a host-defined kind: its `TypeId` plus a stable name for
/// diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostKind {
    id: TypeId,
    name: &'static str,
}

impl HostKind {
    pub fn of<T: Any>() -> Self {
        HostKind {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// A reference-counted, type-erased host object carried by a capsule
/// value. Clones share the payload.
#[derive(Clone)]
pub struct HostValue {
    kind: HostKind,
    payload: Arc<dyn Any + Send + Sync>,
}

impl HostValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        HostValue {
            kind: HostKind::of::<T>(),
            payload: Arc::new(value),
        }
    }

    pub fn kind(&self) -> HostKind {
        self.kind
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// Pointer identity of the payload. This is the default equality for
    /// capsule values without custom ops.
    pub fn ptr_eq(&self, other: &HostValue) -> bool {
        Arc::ptr_eq(&self.payload, &other.payload)
    }

    /// Identity-based hash matching [`HostValue::ptr_eq`].
    pub fn identity_hash(&self) -> u64 {
        let mut h = DefaultHasher::new();
        (Arc::as_ptr(&self.payload) as *const () as usize).hash(&mut h);
        h.finish()
    }
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostValue({})", self.kind.name)
    }
}

/// Custom behavior for a capsule type.
///
/// The default methods implement host-identity semantics and decline
/// conversion, so implementors override only what they need.
pub trait CapsuleOps: Send + Sync {
    /// Custom equality between two payloads of this capsule kind.
    fn equal(&self, a: &HostValue, b: &HostValue) -> bool {
        a.ptr_eq(b)
    }

    /// Custom hash for a payload. Must agree with [`CapsuleOps::equal`].
    fn hash(&self, v: &HostValue) -> u64 {
        v.identity_hash()
    }

    /// Convert a capsule value to `target`. Returning `None` declines
    /// the conversion.
    fn convert(&self, value: &Value, target: &Type) -> Option<Value> {
        let _ = (value, target);
        None
    }
}

/// A capsule type: named wrapper around a host kind, with optional
/// custom ops.
#[derive(Clone)]
pub struct CapsuleType {
    name: String,
    kind: HostKind,
    ops: Option<Arc<dyn CapsuleOps>>,
}

impl CapsuleType {
    pub fn new<T: Any>(name: impl Into<String>) -> Self {
        CapsuleType {
            name: name.into(),
            kind: HostKind::of::<T>(),
            ops: None,
        }
    }

    pub fn with_ops<T: Any>(name: impl Into<String>, ops: Arc<dyn CapsuleOps>) -> Self {
        CapsuleType {
            name: name.into(),
            kind: HostKind::of::<T>(),
            ops: Some(ops),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> HostKind {
        self.kind
    }

    pub fn ops(&self) -> Option<&Arc<dyn CapsuleOps>> {
        self.ops.as_ref()
    }

    /// Structural equality: same name, same host kind, same ops
    /// identity (or both without ops).
    pub fn equal(&self, other: &CapsuleType) -> bool {
        if self.name != other.name || self.kind != other.kind {
            return false;
        }
        match (&self.ops, &other.ops) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub(crate) fn hash_into<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.kind.hash(state);
        if let Some(ops) = &self.ops {
            (Arc::as_ptr(ops) as *const () as usize).hash(state);
        }
    }
}

impl fmt::Debug for CapsuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapsuleType")
            .field("name", &self.name)
            .field("kind", &self.kind.name)
            .field("ops", &self.ops.is_some())
            .finish()
    }
}
