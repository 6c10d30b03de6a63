use serde::Serialize;
use tracing::{debug, trace};

#[cfg(feature = "gc-telemetry")]
use crate::runtime::gc::telemetry::{GcTelemetry, HeapSnapshot, KindCounts};
use crate::runtime::{
    config::GcConfig,
    gc::{
        gc_handle::GcHandle,
        heap_entry::{HeapEntry, Slot},
        heap_object::HeapObject,
    },
    vm_error::VmError,
};

/// Outcome of one collection cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollectStats {
    pub live_before: usize,
    pub live_after: usize,
    pub collected: usize,
    /// Threshold in force after the cycle.
    pub threshold: usize,
}

/// Stop-the-world mark-and-sweep garbage collector heap.
///
/// Objects live in a `Vec` of slots; freed slots go on a free-list and are
/// reused before the vector grows. Each slot carries a generation that is
/// bumped when the slot is reclaimed, which is what lets [`GcHandle`] detect
/// use after free.
///
/// The owner (the VM) triggers collection when [`Self::should_collect`]
/// reports that the live count reached the threshold. After every cycle the
/// threshold becomes `max(2 * live, min_threshold)`.
pub struct GcHeap {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    live_count: usize,
    gc_threshold: usize,
    min_threshold: usize,
    gc_enabled: bool,
    total_collections: usize,
    total_allocations: usize,
    #[cfg(feature = "gc-telemetry")]
    telemetry: GcTelemetry,
}

impl Default for GcHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl GcHeap {
    /// Creates a new GC heap with default collection settings.
    ///
    /// Defaults:
    /// - threshold: `8` live objects
    /// - GC enabled: `true`
    pub fn new() -> Self {
        Self::with_config(&GcConfig::default())
    }

    pub fn with_config(config: &GcConfig) -> Self {
        let min_threshold = config.min_threshold.max(1);
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live_count: 0,
            gc_threshold: min_threshold,
            min_threshold,
            gc_enabled: config.gc_enabled,
            total_collections: 0,
            total_allocations: 0,
            #[cfg(feature = "gc-telemetry")]
            telemetry: GcTelemetry::new(),
        }
    }

    /// Enables or disables automatic collection checks.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.gc_enabled = enabled
    }

    pub fn is_enabled(&self) -> bool {
        self.gc_enabled
    }

    /// Sets the threshold floor and re-derives the current threshold from it.
    ///
    /// Values below 1 are clamped upward.
    pub fn set_min_threshold(&mut self, min_threshold: usize) {
        self.min_threshold = min_threshold.max(1);
        self.gc_threshold = self.live_count.saturating_mul(2).max(self.min_threshold);
    }

    /// Live count at which the next allocation collects first.
    pub fn threshold(&self) -> usize {
        self.gc_threshold
    }

    pub fn min_threshold(&self) -> usize {
        self.min_threshold
    }

    /// Returns `true` when GC is enabled and the threshold was reached.
    pub fn should_collect(&self) -> bool {
        self.gc_enabled && self.live_count >= self.gc_threshold
    }

    /// Allocates a new heap object and returns a handle to it.
    ///
    /// A pair's children must be live. Freed slots are reused through the
    /// internal free-list before growing the storage vector.
    pub fn alloc(&mut self, object: HeapObject) -> Result<GcHandle, VmError> {
        if let Some((head, tail)) = object.children() {
            self.check_live(head)?;
            self.check_live(tail)?;
        }

        let kind = object.kind();
        let entry = HeapEntry {
            object,
            marked: false,
        };

        let handle = if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.entry = Some(entry);
            GcHandle::new(idx, slot.generation)
        } else {
            let idx = u32::try_from(self.slots.len()).map_err(|_| VmError::OutOfMemory)?;
            self.slots
                .try_reserve(1)
                .map_err(|_| VmError::OutOfMemory)?;
            self.slots.push(Slot {
                generation: 0,
                entry: Some(entry),
            });
            GcHandle::new(idx, 0)
        };

        self.live_count += 1;
        self.total_allocations += 1;
        #[cfg(feature = "gc-telemetry")]
        self.telemetry.record_alloc(kind);
        trace!(slot = handle.index(), %kind, live = self.live_count, "alloc");

        Ok(handle)
    }

    /// Returns the object behind `handle`.
    pub fn get(&self, handle: GcHandle) -> Result<&HeapObject, VmError> {
        self.slots
            .get(handle.index() as usize)
            .and_then(|slot| slot.occupied(handle.generation()))
            .map(|entry| &entry.object)
            .ok_or_else(|| invalid(handle))
    }

    pub(crate) fn get_mut(&mut self, handle: GcHandle) -> Result<&mut HeapObject, VmError> {
        self.slots
            .get_mut(handle.index() as usize)
            .and_then(|slot| slot.occupied_mut(handle.generation()))
            .map(|entry| &mut entry.object)
            .ok_or_else(|| invalid(handle))
    }

    pub fn is_live(&self, handle: GcHandle) -> bool {
        self.get(handle).is_ok()
    }

    pub fn check_live(&self, handle: GcHandle) -> Result<(), VmError> {
        self.get(handle).map(|_| ())
    }

    /// Returns the number of currently live heap objects.
    pub fn live_count(&self) -> usize {
        self.live_count
    }

    /// Number of slots ever created, occupied or not.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn free_list_len(&self) -> usize {
        self.free_list.len()
    }

    /// Iterates over every live object in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (GcHandle, &HeapObject)> + '_ {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            slot.entry
                .as_ref()
                .map(|entry| (GcHandle::new(idx as u32, slot.generation), &entry.object))
        })
    }

    /// Returns the total number of allocations performed by this heap.
    pub fn total_allocations(&self) -> usize {
        self.total_allocations
    }

    /// Returns the total number of completed GC cycles.
    pub fn total_collections(&self) -> usize {
        self.total_collections
    }

    /// Runs a full stop-the-world mark-and-sweep collection.
    ///
    /// Everything not reachable from `roots` through pair edges is reclaimed.
    /// A dead root is rejected with [`VmError::InvalidHandle`] before anything
    /// is marked.
    pub fn collect(&mut self, roots: &[GcHandle]) -> Result<CollectStats, VmError> {
        for &root in roots {
            self.check_live(root)?;
        }
        Ok(self.collect_live_roots(roots))
    }

    /// [`Self::collect`] for callers whose roots are live by construction,
    /// such as the VM's root stack.
    pub(crate) fn collect_live_roots(&mut self, roots: &[GcHandle]) -> CollectStats {
        let live_before = self.live_count;
        #[cfg(feature = "gc-telemetry")]
        self.telemetry.begin_cycle(roots.len(), self.gc_threshold);

        self.mark_roots(roots);
        self.sweep();
        self.adapt_threshold();
        self.total_collections += 1;

        let stats = CollectStats {
            live_before,
            live_after: self.live_count,
            collected: live_before - self.live_count,
            threshold: self.gc_threshold,
        };

        #[cfg(feature = "gc-telemetry")]
        self.telemetry.end_cycle(stats.threshold, self.free_list.len());

        debug!(
            collected = stats.collected,
            remaining = stats.live_after,
            threshold = stats.threshold,
            "gc cycle complete"
        );
        stats
    }

    fn mark_roots(&mut self, roots: &[GcHandle]) {
        let mut worklist = Vec::with_capacity(16);
        for &root in roots {
            debug_assert!(self.is_live(root), "root {root} is not live");
            worklist.push(root);
            while let Some(handle) = worklist.pop() {
                self.mark_handle(handle, &mut worklist);
            }
        }
    }

    fn mark_handle(&mut self, handle: GcHandle, worklist: &mut Vec<GcHandle>) {
        let Some(entry) = self
            .slots
            .get_mut(handle.index() as usize)
            .and_then(|slot| slot.occupied_mut(handle.generation()))
        else {
            debug_assert!(self.is_live(handle), "mark reached dangling handle {handle}");
            return;
        };

        // Marking before enqueueing children keeps cycles and shared nodes to one visit.
        if entry.marked {
            return;
        }
        entry.marked = true;

        if let Some((head, tail)) = entry.object.children() {
            // LIFO: push tail first so head is traced first.
            worklist.push(tail);
            worklist.push(head);
        }

        #[cfg(feature = "gc-telemetry")]
        self.telemetry.record_marked(worklist.len());
    }

    fn sweep(&mut self) {
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            let Some(entry) = slot.entry.as_mut() else {
                continue;
            };
            if entry.marked {
                entry.marked = false;
                #[cfg(feature = "gc-telemetry")]
                self.telemetry.record_survivor(entry.object.kind());
            } else {
                #[cfg(feature = "gc-telemetry")]
                self.telemetry.record_reclaimed(entry.object.kind());
                slot.entry = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free_list.push(idx as u32);
                self.live_count -= 1;
            }
        }

        #[cfg(debug_assertions)]
        self.debug_assert_heap_is_consistent();
    }

    fn adapt_threshold(&mut self) {
        self.gc_threshold = self.live_count.saturating_mul(2).max(self.min_threshold);
    }

    #[cfg(debug_assertions)]
    fn debug_assert_heap_is_consistent(&self) {
        let occupied = self.slots.iter().filter(|slot| slot.entry.is_some()).count();
        debug_assert_eq!(
            self.live_count, occupied,
            "GcHeap::live_count mismatch: live_count={}, occupied={}",
            self.live_count, occupied
        );
        debug_assert!(
            self.slots
                .iter()
                .filter_map(|slot| slot.entry.as_ref())
                .all(|entry| !entry.marked),
            "mark bits must be clear outside a collection"
        );
    }

    /// Returns the telemetry collector.
    #[cfg(feature = "gc-telemetry")]
    pub fn telemetry(&self) -> &GcTelemetry {
        &self.telemetry
    }

    /// Point-in-time summary of slot usage.
    #[cfg(feature = "gc-telemetry")]
    pub fn snapshot(&self) -> HeapSnapshot {
        let mut live = KindCounts::default();
        for (_, object) in self.iter() {
            live.bump(object.kind());
        }
        let generations = self.slots.iter().map(|slot| slot.generation);
        HeapSnapshot {
            capacity: self.slots.len(),
            live,
            free_slots: self.free_list.len(),
            recycled_slots: generations.clone().filter(|&generation| generation > 0).count(),
            max_generation: generations.max().unwrap_or(0),
        }
    }

    /// Full telemetry report: per-kind totals, cycle history, heap snapshot.
    #[cfg(feature = "gc-telemetry")]
    pub fn telemetry_report(&self) -> String {
        self.telemetry.report_full(&self.snapshot())
    }
}

fn invalid(handle: GcHandle) -> VmError {
    VmError::InvalidHandle {
        index: handle.index(),
        generation: handle.generation(),
    }
}
