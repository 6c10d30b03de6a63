//! Collector telemetry: what each cycle marked, kept and reclaimed.
//!
//! Compiled only with the `gc-telemetry` feature. The heap feeds it from
//! `alloc`, the mark loop and the sweep loop.

use std::time::{Duration, Instant};

use serde::Serialize;

use super::heap_object::ObjectKind;

/// Object counts split by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindCounts {
    pub ints: usize,
    pub pairs: usize,
}

impl KindCounts {
    pub fn bump(&mut self, kind: ObjectKind) {
        match kind {
            ObjectKind::Int => self.ints += 1,
            ObjectKind::Pair => self.pairs += 1,
        }
    }

    pub fn get(&self, kind: ObjectKind) -> usize {
        match kind {
            ObjectKind::Int => self.ints,
            ObjectKind::Pair => self.pairs,
        }
    }

    pub fn total(&self) -> usize {
        self.ints + self.pairs
    }
}

/// One finished collection.
#[derive(Debug, Clone, Serialize)]
pub struct CycleRecord {
    pub index: usize,
    pub duration: Duration,
    /// Root entries handed to the mark phase, duplicates included.
    pub roots: usize,
    /// Objects whose mark bit was set this cycle.
    pub marked: usize,
    /// Deepest the mark work-list got.
    pub peak_worklist: usize,
    pub survivors: KindCounts,
    pub reclaimed: KindCounts,
    pub threshold_before: usize,
    pub threshold_after: usize,
    /// Free-list length once the sweep finished.
    pub free_slots: usize,
}

impl CycleRecord {
    /// Fraction of the objects present at cycle start that survived.
    pub fn survival_rate(&self) -> f64 {
        let before = self.survivors.total() + self.reclaimed.total();
        if before == 0 {
            return 1.0;
        }
        self.survivors.total() as f64 / before as f64
    }
}

/// Slot-level view of the heap at one moment.
#[derive(Debug, Clone, Serialize)]
pub struct HeapSnapshot {
    pub capacity: usize,
    pub live: KindCounts,
    pub free_slots: usize,
    /// Slots that have been reclaimed at least once.
    pub recycled_slots: usize,
    /// Highest slot generation, i.e. the most times one slot was reused.
    pub max_generation: u32,
}

impl HeapSnapshot {
    pub fn occupancy(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.live.total() as f64 / self.capacity as f64
    }
}

struct OpenCycle {
    started: Instant,
    roots: usize,
    threshold_before: usize,
    marked: usize,
    peak_worklist: usize,
    survivors: KindCounts,
    reclaimed: KindCounts,
}

#[derive(Default, Serialize)]
pub struct GcTelemetry {
    allocated: KindCounts,
    survived: KindCounts,
    reclaimed: KindCounts,
    cycles: Vec<CycleRecord>,
    #[serde(skip)]
    open: Option<OpenCycle>,
}

impl GcTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_alloc(&mut self, kind: ObjectKind) {
        self.allocated.bump(kind);
    }

    pub fn begin_cycle(&mut self, roots: usize, threshold: usize) {
        self.open = Some(OpenCycle {
            started: Instant::now(),
            roots,
            threshold_before: threshold,
            marked: 0,
            peak_worklist: 0,
            survivors: KindCounts::default(),
            reclaimed: KindCounts::default(),
        });
    }

    /// One object marked; `worklist_len` is the work-list depth right after.
    #[inline]
    pub fn record_marked(&mut self, worklist_len: usize) {
        if let Some(cycle) = self.open.as_mut() {
            cycle.marked += 1;
            cycle.peak_worklist = cycle.peak_worklist.max(worklist_len);
        }
    }

    #[inline]
    pub fn record_survivor(&mut self, kind: ObjectKind) {
        self.survived.bump(kind);
        if let Some(cycle) = self.open.as_mut() {
            cycle.survivors.bump(kind);
        }
    }

    #[inline]
    pub fn record_reclaimed(&mut self, kind: ObjectKind) {
        self.reclaimed.bump(kind);
        if let Some(cycle) = self.open.as_mut() {
            cycle.reclaimed.bump(kind);
        }
    }

    /// Closes the cycle opened by [`Self::begin_cycle`]. No-op without one.
    pub fn end_cycle(&mut self, threshold_after: usize, free_slots: usize) {
        let Some(cycle) = self.open.take() else {
            return;
        };
        self.cycles.push(CycleRecord {
            index: self.cycles.len(),
            duration: cycle.started.elapsed(),
            roots: cycle.roots,
            marked: cycle.marked,
            peak_worklist: cycle.peak_worklist,
            survivors: cycle.survivors,
            reclaimed: cycle.reclaimed,
            threshold_before: cycle.threshold_before,
            threshold_after,
            free_slots,
        });
    }

    pub fn allocated(&self) -> KindCounts {
        self.allocated
    }

    /// Survivals summed over all cycles. An object kept by three cycles
    /// counts three times.
    pub fn survived(&self) -> KindCounts {
        self.survived
    }

    pub fn reclaimed(&self) -> KindCounts {
        self.reclaimed
    }

    pub fn cycles(&self) -> &[CycleRecord] {
        &self.cycles
    }

    pub fn report_kinds(&self) -> String {
        let mut out = String::from("=== Objects by kind ===\n");
        out.push_str(&format!(
            "{:<6} {:>10} {:>10} {:>10}\n",
            "Kind", "Allocated", "Survived", "Reclaimed"
        ));
        for kind in ObjectKind::ALL {
            out.push_str(&format!(
                "{:<6} {:>10} {:>10} {:>10}\n",
                kind.label(),
                self.allocated.get(kind),
                self.survived.get(kind),
                self.reclaimed.get(kind),
            ));
        }
        out
    }

    pub fn report_cycles(&self) -> String {
        let mut out = String::from("=== Collections ===\n");
        if self.cycles.is_empty() {
            out.push_str("none\n");
            return out;
        }
        out.push_str(&format!(
            "{:>4} {:>8} {:>6} {:>7} {:>6} {:>11} {:>11} {:>9}\n",
            "#", "Time", "Roots", "Marked", "Peak", "Kept I/P", "Freed I/P", "Threshold"
        ));
        for c in &self.cycles {
            out.push_str(&format!(
                "{:>4} {:>6}us {:>6} {:>7} {:>6} {:>11} {:>11} {:>4} -> {}\n",
                c.index,
                c.duration.as_micros(),
                c.roots,
                c.marked,
                c.peak_worklist,
                format!("{}/{}", c.survivors.ints, c.survivors.pairs),
                format!("{}/{}", c.reclaimed.ints, c.reclaimed.pairs),
                c.threshold_before,
                c.threshold_after,
            ));
        }
        out
    }

    pub fn report_full(&self, snapshot: &HeapSnapshot) -> String {
        let mut out = self.report_kinds();
        out.push('\n');
        out.push_str(&self.report_cycles());
        out.push('\n');
        out.push_str(&format_heap_snapshot(snapshot));
        out
    }

    /// Telemetry and snapshot as one JSON document.
    pub fn report_json(&self, snapshot: &HeapSnapshot) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&serde_json::json!({
            "telemetry": self,
            "snapshot": snapshot,
        }))
    }
}

pub fn format_heap_snapshot(snap: &HeapSnapshot) -> String {
    format!(
        "=== Heap ===\n\
         slots:          {}\n\
         live ints:      {}\n\
         live pairs:     {}\n\
         free slots:     {}\n\
         occupancy:      {:.1}%\n\
         recycled slots: {}\n\
         max generation: {}\n",
        snap.capacity,
        snap.live.ints,
        snap.live.pairs,
        snap.free_slots,
        snap.occupancy() * 100.0,
        snap.recycled_slots,
        snap.max_generation,
    )
}
