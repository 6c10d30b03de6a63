/// Errors produced by the VM and its heap.
///
/// Every variant aborts the operation that raised it before any state is
/// changed: no object is allocated and no root-stack entry is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VmError {
    /// A push was attempted while the root stack was full.
    #[error("stack overflow: root stack is at its capacity of {capacity}")]
    StackOverflow { capacity: usize },

    /// A pop or pair construction found too few root-stack entries.
    #[error("stack underflow: needed {needed} root stack entries, found {found}")]
    StackUnderflow { needed: usize, found: usize },

    /// A handle was used after its slot was reclaimed (or it never named a live
    /// object).
    #[error("invalid handle: slot {index} generation {generation} is not live")]
    InvalidHandle { index: u32, generation: u32 },

    /// A pair operation was applied to a non-pair object.
    #[error("object in slot {index} is not a pair")]
    NotAPair { index: u32 },

    /// Rendering descended past the printer's depth budget. Usually a cycle.
    #[error("render depth exceeded {limit} levels (is the graph cyclic?)")]
    RenderDepthExceeded { limit: usize },

    /// Heap storage could not be grown.
    #[error("out of memory")]
    OutOfMemory,
}

impl VmError {
    /// Stable diagnostic code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            VmError::StackOverflow { .. } => "E2001",
            VmError::StackUnderflow { .. } => "E2002",
            VmError::InvalidHandle { .. } => "E2003",
            VmError::NotAPair { .. } => "E2004",
            VmError::RenderDepthExceeded { .. } => "E2005",
            VmError::OutOfMemory => "E2006",
        }
    }
}
