use rayon::prelude::*;

use gcvm::runtime::{GcConfig, VM, workload};

#[test]
fn test_churn_keeps_heap_bounded() {
    let mut vm = VM::new();
    workload::churn(&mut vm, 10_000, 10).unwrap();

    assert_eq!(vm.heap().total_allocations(), 100_000);
    // Garbage is reclaimed as it goes, so slots get recycled.
    assert!(vm.heap().capacity() <= 32, "capacity {}", vm.heap().capacity());
    assert!(vm.live_count() <= vm.heap().threshold());
}

#[test]
fn test_churn_with_rooted_list_preserves_it() {
    let mut vm = VM::with_config(GcConfig::default().with_min_threshold(4));
    let list = workload::cons_list(&mut vm, 20).unwrap();
    workload::churn(&mut vm, 2_000, 8).unwrap();

    assert_eq!(vm.stack(), &[list]);
    vm.collect();
    assert_eq!(vm.live_count(), 41);
    assert!(vm.render(list).unwrap().starts_with("(20, (19, "));
}

#[test]
fn test_independent_vms_in_parallel() {
    let results: Vec<(usize, usize)> = (0..8usize)
        .into_par_iter()
        .map(|id| {
            let config = GcConfig::default().with_min_threshold(4 + id);
            let mut vm = VM::with_config(config);
            workload::cons_list(&mut vm, id).unwrap();
            workload::churn(&mut vm, 1_000, 16).unwrap();
            let stats = vm.collect();
            (stats.live_after, vm.heap().total_allocations())
        })
        .collect();

    for (id, (live, allocations)) in results.into_iter().enumerate() {
        assert_eq!(live, 2 * id + 1, "vm {id}");
        assert_eq!(allocations, 2 * id + 1 + 16_000, "vm {id}");
    }
}
