use gcvm::runtime::{GcConfig, HeapObject, VM, VmError};

#[test]
fn test_scenario_a_rooted_ints_survive() {
    let mut vm = VM::new();
    vm.push_int(1).unwrap();
    vm.push_int(2).unwrap();

    vm.collect();
    assert_eq!(vm.live_count(), 2);
}

#[test]
fn test_scenario_b_popped_ints_are_collected() {
    let mut vm = VM::new();
    vm.push_int(1).unwrap();
    vm.push_int(2).unwrap();
    vm.pop().unwrap();
    vm.pop().unwrap();

    vm.collect();
    assert_eq!(vm.live_count(), 0);
    assert_eq!(vm.stack_len(), 0);
}

#[test]
fn test_scenario_c_nested_pairs_reach_everything() {
    let mut vm = VM::new();
    vm.push_int(1).unwrap();
    vm.push_int(2).unwrap();
    vm.push_pair().unwrap();
    vm.push_int(3).unwrap();
    vm.push_int(4).unwrap();
    vm.push_pair().unwrap();
    let root = vm.push_pair().unwrap();

    assert_eq!(vm.stack(), &[root]);
    vm.collect();
    assert_eq!(vm.live_count(), 7);
    assert_eq!(vm.render(root).unwrap(), "((4, 3), (2, 1))");
}

#[test]
fn test_scenario_d_cycle_drops_overwritten_tails() {
    let mut vm = VM::new();
    vm.push_int(1).unwrap();
    let two = vm.push_int(2).unwrap();
    let a = vm.push_pair().unwrap();
    vm.push_int(3).unwrap();
    let four = vm.push_int(4).unwrap();
    let b = vm.push_pair().unwrap();

    vm.set_tail(a, b).unwrap();
    vm.set_tail(b, a).unwrap();

    vm.collect();
    assert_eq!(vm.live_count(), 4);
    for handle in [a, b, two, four] {
        assert!(vm.is_live(handle), "{handle} should survive");
    }
}

#[test]
fn test_push_pair_takes_head_from_top() {
    let mut vm = VM::new();
    let tail = vm.push_int(10).unwrap();
    let head = vm.push_int(20).unwrap();
    let pair = vm.push_pair().unwrap();
    assert_eq!(vm.get(pair).unwrap(), &HeapObject::Pair { head, tail });
}

#[test]
fn test_overflow_at_capacity() {
    let mut vm = VM::with_config(GcConfig::default().with_stack_capacity(3));
    for i in 0..3 {
        vm.push_int(i).unwrap();
    }
    let allocations = vm.heap().total_allocations();

    assert_eq!(vm.push_int(3), Err(VmError::StackOverflow { capacity: 3 }));
    assert_eq!(vm.heap().total_allocations(), allocations);
    assert_eq!(vm.stack_len(), 3);
}

#[test]
fn test_pair_at_full_stack_still_succeeds() {
    let mut vm = VM::with_config(GcConfig::default().with_stack_capacity(2));
    vm.push_int(1).unwrap();
    vm.push_int(2).unwrap();
    vm.push_pair().unwrap();
    assert_eq!(vm.stack_len(), 1);
}

#[test]
fn test_underflow_errors() {
    let mut vm = VM::new();
    assert_eq!(
        vm.pop(),
        Err(VmError::StackUnderflow {
            needed: 1,
            found: 0
        })
    );
    vm.push_int(1).unwrap();
    assert_eq!(
        vm.push_pair(),
        Err(VmError::StackUnderflow {
            needed: 2,
            found: 1
        })
    );
    assert_eq!(vm.stack_len(), 1);
    assert_eq!(vm.live_count(), 1);
}

#[test]
fn test_default_stack_capacity_is_256() {
    let mut vm = VM::new();
    assert_eq!(vm.stack_capacity(), 256);
    for i in 0..256 {
        vm.push_int(i).unwrap();
    }
    assert!(matches!(
        vm.push_int(256),
        Err(VmError::StackOverflow { capacity: 256 })
    ));
}

#[test]
fn test_set_head_on_int_is_rejected() {
    let mut vm = VM::new();
    let one = vm.push_int(1).unwrap();
    let two = vm.push_int(2).unwrap();
    assert_eq!(
        vm.set_head(one, two),
        Err(VmError::NotAPair {
            index: one.index()
        })
    );
}

#[test]
fn test_stale_handle_is_reported_not_dereferenced() {
    let mut vm = VM::new();
    let gone = vm.push_int(1).unwrap();
    vm.pop().unwrap();
    vm.collect();

    assert!(!vm.is_live(gone));
    assert!(matches!(vm.get(gone), Err(VmError::InvalidHandle { .. })));
    assert!(matches!(vm.render(gone), Err(VmError::InvalidHandle { .. })));

    vm.push_int(2).unwrap();
    let pair_tail = vm.push_int(3).unwrap();
    let pair = vm.push_pair().unwrap();
    assert!(matches!(
        vm.set_tail(pair, gone),
        Err(VmError::InvalidHandle { .. })
    ));
    assert!(vm.is_live(pair_tail));
}

#[test]
fn test_teardown_and_drop_release_the_heap() {
    let mut vm = VM::new();
    gcvm::runtime::workload::cons_list(&mut vm, 10).unwrap();
    assert_eq!(vm.live_count(), 21);

    let stats = vm.teardown();
    assert_eq!(stats.collected, 21);
    assert_eq!(vm.live_count(), 0);
    assert_eq!(vm.stack_len(), 0);

    // The VM stays usable after teardown.
    vm.push_int(1).unwrap();
    drop(vm);
}
