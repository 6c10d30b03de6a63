use crate::runtime::gc::heap_object::HeapObject;

pub(crate) struct HeapEntry {
    pub(crate) object: HeapObject,
    pub(crate) marked: bool,
}

/// One arena slot. `entry` is `None` while the slot sits on the free-list.
pub(crate) struct Slot {
    pub(crate) generation: u32,
    pub(crate) entry: Option<HeapEntry>,
}

impl Slot {
    pub(crate) fn occupied(&self, generation: u32) -> Option<&HeapEntry> {
        if self.generation == generation {
            self.entry.as_ref()
        } else {
            None
        }
    }

    pub(crate) fn occupied_mut(&mut self, generation: u32) -> Option<&mut HeapEntry> {
        if self.generation == generation {
            self.entry.as_mut()
        } else {
            None
        }
    }
}
