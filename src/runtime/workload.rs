//! Canned mutator workloads shared by the CLI, the stress command and the
//! benches.

use crate::runtime::{gc::GcHandle, vm::VM, vm_error::VmError};

/// Pushes `batch` integers and pops them again, `rounds` times. Every object
/// becomes garbage right after its round.
pub fn churn(vm: &mut VM, rounds: usize, batch: usize) -> Result<(), VmError> {
    for round in 0..rounds {
        for _ in 0..batch {
            vm.push_int(round as i64)?;
        }
        for _ in 0..batch {
            vm.pop()?;
        }
    }
    Ok(())
}

/// Builds a cons-style list of `len` pairs: each pair's head is a fresh
/// integer and its tail the list built so far, ending in the integer `0`.
///
/// Leaves the list head on top of the root stack. Allocates `2 * len + 1`
/// objects.
pub fn cons_list(vm: &mut VM, len: usize) -> Result<GcHandle, VmError> {
    let mut top = vm.push_int(0)?;
    for i in 1..=len {
        vm.push_int(i as i64)?;
        top = vm.push_pair()?;
    }
    Ok(top)
}
