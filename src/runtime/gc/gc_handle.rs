use serde::Serialize;

/// handle into the GC heap.
///
/// A `GcHandle` is a lightweight, copyable reference to a heap slot. Besides
/// the slot index it records the slot's generation at allocation time: when the
/// slot is swept the generation moves on, so a handle that outlived its object
/// stops resolving instead of aliasing whatever is allocated there next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GcHandle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl GcHandle {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Returns the raw heap slot index backing this handle.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Returns the slot generation this handle was issued for.
    pub fn generation(self) -> u32 {
        self.generation
    }

    #[cfg(test)]
    pub fn new_for_test(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl std::fmt::Display for GcHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}@{}", self.index, self.generation)
    }
}
