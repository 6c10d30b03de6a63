use tracing::debug;

use crate::runtime::{
    config::GcConfig,
    gc::{CollectStats, GcHandle, GcHeap, HeapObject},
    printer,
    vm_error::VmError,
};

mod mutation;
mod stack_ops;

/// A stack machine whose root stack is the GC root set.
///
/// The root stack holds handles the mutator is using directly. Everything the
/// collector keeps alive is reachable from it through pair edges. Dropping the
/// VM empties the stack and runs a final collection.
pub struct VM {
    stack: Vec<GcHandle>,
    stack_capacity: usize,
    gc_heap: GcHeap,
}

impl Default for VM {
    fn default() -> Self {
        Self::new()
    }
}

impl VM {
    pub fn new() -> Self {
        Self::with_config(GcConfig::default())
    }

    pub fn with_config(config: GcConfig) -> Self {
        let stack_capacity = config.stack_capacity.max(1);
        Self {
            stack: Vec::with_capacity(stack_capacity.min(1024)),
            stack_capacity,
            gc_heap: GcHeap::with_config(&config),
        }
    }

    pub fn set_gc_enabled(&mut self, enabled: bool) {
        self.gc_heap.set_enabled(enabled);
    }

    pub fn set_min_threshold(&mut self, min_threshold: usize) {
        self.gc_heap.set_min_threshold(min_threshold);
    }

    pub fn heap(&self) -> &GcHeap {
        &self.gc_heap
    }

    /// Number of live heap objects.
    pub fn live_count(&self) -> usize {
        self.gc_heap.live_count()
    }

    pub fn get(&self, handle: GcHandle) -> Result<&HeapObject, VmError> {
        self.gc_heap.get(handle)
    }

    pub fn is_live(&self, handle: GcHandle) -> bool {
        self.gc_heap.is_live(handle)
    }

    /// Renders an acyclic object graph as text, e.g. `((1, 2), 3)`.
    pub fn render(&self, handle: GcHandle) -> Result<String, VmError> {
        printer::render(&self.gc_heap, handle)
    }

    /// Returns the GC telemetry report, if compiled with the `gc-telemetry` feature.
    #[cfg(feature = "gc-telemetry")]
    pub fn gc_telemetry_report(&self) -> String {
        self.gc_heap.telemetry_report()
    }

    /// Runs a full collection with the current root stack as the root set.
    pub fn collect(&mut self) -> CollectStats {
        self.gc_heap.collect_live_roots(&self.stack)
    }

    /// Empties the root stack and reclaims every object.
    pub fn teardown(&mut self) -> CollectStats {
        self.stack.clear();
        let stats = self.collect();
        debug!(reclaimed = stats.collected, "vm teardown");
        stats
    }

    /// Allocates a heap object, triggering GC if the threshold is reached.
    ///
    /// Anything `object` references must still be on the root stack (or
    /// reachable from it) so the collection triggered here keeps it alive.
    pub(crate) fn gc_alloc(&mut self, object: HeapObject) -> Result<GcHandle, VmError> {
        if self.gc_heap.should_collect() {
            self.collect();
        }
        self.gc_heap.alloc(object)
    }
}

impl Drop for VM {
    fn drop(&mut self) {
        if self.gc_heap.live_count() > 0 {
            self.teardown();
        }
    }
}
