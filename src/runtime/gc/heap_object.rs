use std::fmt;

use serde::Serialize;

use crate::runtime::gc::gc_handle::GcHandle;

/// Objects that live on the GC-managed heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapObject {
    /// Integer leaf.
    Int(i64),
    /// Two-child composite. Children are graph edges, not owned storage.
    Pair { head: GcHandle, tail: GcHandle },
}

impl HeapObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            HeapObject::Int(_) => ObjectKind::Int,
            HeapObject::Pair { .. } => ObjectKind::Pair,
        }
    }

    /// Returns `(head, tail)` for pairs, `None` for leaves.
    pub fn children(&self) -> Option<(GcHandle, GcHandle)> {
        match *self {
            HeapObject::Int(_) => None,
            HeapObject::Pair { head, tail } => Some((head, tail)),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match *self {
            HeapObject::Int(value) => Some(value),
            HeapObject::Pair { .. } => None,
        }
    }
}

/// Classification of heap object variants, used for telemetry bucketing and
/// transcripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ObjectKind {
    Int = 0,
    Pair = 1,
}

impl ObjectKind {
    pub fn label(self) -> &'static str {
        match self {
            ObjectKind::Int => "Int",
            ObjectKind::Pair => "Pair",
        }
    }

    /// All variants for iteration.
    pub const ALL: [ObjectKind; 2] = [ObjectKind::Int, ObjectKind::Pair];
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
