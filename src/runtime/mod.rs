//! Runtime core: the GC heap, the VM that roots it, and helpers around them.
//!
//! # Cycles
//! Pair edges may form arbitrary cycles, including a pair that reaches itself.
//! Reclamation is driven purely by reachability from the VM's root stack, so
//! a cycle is kept exactly as long as some root reaches it. Only the printer
//! assumes acyclic input.

pub mod config;
pub mod gc;
pub mod printer;
pub mod vm;
pub mod vm_error;
pub mod workload;

pub use config::GcConfig;
pub use gc::{CollectStats, GcHandle, GcHeap, HeapObject};
pub use vm::VM;
pub use vm_error::VmError;
