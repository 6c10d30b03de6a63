use crate::runtime::{
    gc::{GcHandle, HeapObject},
    vm_error::VmError,
};

use super::VM;

impl VM {
    /// Points `pair`'s head at `value`. The old head is only unlinked, not freed.
    pub fn set_head(&mut self, pair: GcHandle, value: GcHandle) -> Result<(), VmError> {
        self.gc_heap.check_live(value)?;
        match self.gc_heap.get_mut(pair)? {
            HeapObject::Pair { head, .. } => {
                *head = value;
                Ok(())
            }
            HeapObject::Int(_) => Err(VmError::NotAPair {
                index: pair.index(),
            }),
        }
    }

    /// Points `pair`'s tail at `value`. The old tail is only unlinked, not freed.
    pub fn set_tail(&mut self, pair: GcHandle, value: GcHandle) -> Result<(), VmError> {
        self.gc_heap.check_live(value)?;
        match self.gc_heap.get_mut(pair)? {
            HeapObject::Pair { tail, .. } => {
                *tail = value;
                Ok(())
            }
            HeapObject::Int(_) => Err(VmError::NotAPair {
                index: pair.index(),
            }),
        }
    }
}
