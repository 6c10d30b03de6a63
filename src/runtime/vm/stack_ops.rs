use tracing::trace;

use crate::runtime::{
    gc::{GcHandle, HeapObject},
    vm_error::VmError,
};

use super::VM;

impl VM {
    /// Allocates an integer and pushes it onto the root stack.
    pub fn push_int(&mut self, value: i64) -> Result<GcHandle, VmError> {
        self.ensure_room()?;
        let handle = self.gc_alloc(HeapObject::Int(value))?;
        self.stack.push(handle);
        trace!(value, depth = self.stack.len(), "push int");
        Ok(handle)
    }

    /// Replaces the top two root-stack entries with a pair of them.
    ///
    /// The top entry becomes the `head`, the one below it the `tail`. Both stay
    /// rooted until the pair exists, so a collection triggered by this
    /// allocation cannot reclaim them.
    pub fn push_pair(&mut self) -> Result<GcHandle, VmError> {
        let len = self.stack.len();
        if len < 2 {
            return Err(VmError::StackUnderflow {
                needed: 2,
                found: len,
            });
        }
        let head = self.stack[len - 1];
        let tail = self.stack[len - 2];

        let handle = self.gc_alloc(HeapObject::Pair { head, tail })?;
        self.stack.truncate(len - 2);
        self.stack.push(handle);
        trace!(slot = handle.index(), depth = self.stack.len(), "push pair");
        Ok(handle)
    }

    /// Removes and returns the top root-stack entry.
    pub fn pop(&mut self) -> Result<GcHandle, VmError> {
        let handle = self
            .stack
            .pop()
            .ok_or(VmError::StackUnderflow {
                needed: 1,
                found: 0,
            })?;
        trace!(slot = handle.index(), depth = self.stack.len(), "pop");
        Ok(handle)
    }

    /// Returns the top root-stack entry without removing it.
    pub fn peek(&self) -> Result<GcHandle, VmError> {
        self.stack.last().copied().ok_or(VmError::StackUnderflow {
            needed: 1,
            found: 0,
        })
    }

    pub fn stack(&self) -> &[GcHandle] {
        &self.stack
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    pub fn stack_capacity(&self) -> usize {
        self.stack_capacity
    }

    fn ensure_room(&self) -> Result<(), VmError> {
        if self.stack.len() >= self.stack_capacity {
            return Err(VmError::StackOverflow {
                capacity: self.stack_capacity,
            });
        }
        Ok(())
    }
}
