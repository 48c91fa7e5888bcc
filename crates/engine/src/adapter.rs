//! Foreign record adaptation
//!
//! Hosts often carry structured records (ORM rows, config objects)
//! that inference could type field-wise if it could see inside them.
//! A [`RecordAdapter`] is the seam: it recognizes such payloads and
//! flattens them into plain raw mappings before inference looks at
//! them. Adaptation failures never abort a pass; the subtree degrades
//! to `Dynamic`.

use dyntype_core::capsule::HostValue;
use dyntype_core::error::AdapterError;
use dyntype_core::raw::{RawArena, RawHandle};

/// Converts foreign structured records into plain raw mappings.
pub trait RecordAdapter: Send + Sync {
    /// Whether `payload` is a record this adapter can flatten.
    fn is_record(&self, payload: &HostValue) -> bool;

    /// Flatten `payload` into `arena`, returning the handle of the
    /// resulting raw mapping.
    fn flatten(
        &self,
        payload: &HostValue,
        arena: &mut RawArena,
    ) -> Result<RawHandle, AdapterError>;
}

/// The null adapter: recognizes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRecords;

impl RecordAdapter for NoRecords {
    fn is_record(&self, _payload: &HostValue) -> bool {
        false
    }

    fn flatten(
        &self,
        _payload: &HostValue,
        _arena: &mut RawArena,
    ) -> Result<RawHandle, AdapterError> {
        Err(AdapterError("no record adapter configured".into()))
    }
}
