//! Randomized mutator runs checked against an independent reachability walk.

use std::collections::HashSet;

use gcvm::runtime::{GcConfig, GcHandle, HeapObject, VM};

/// Deterministic xorshift64 so failures replay from the printed seed.
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }
}

fn reachable_from(vm: &VM, roots: &[GcHandle]) -> HashSet<GcHandle> {
    let mut seen = HashSet::new();
    let mut pending: Vec<GcHandle> = roots.to_vec();
    while let Some(handle) = pending.pop() {
        if !seen.insert(handle) {
            continue;
        }
        if let HeapObject::Pair { head, tail } = *vm.get(handle).unwrap() {
            pending.push(head);
            pending.push(tail);
        }
    }
    seen
}

/// Runs a random mix of pushes, pairs, pops and tail rewrites.
fn random_mutator(vm: &mut VM, rng: &mut XorShift, steps: usize) -> Vec<GcHandle> {
    let mut allocated = Vec::new();
    for step in 0..steps {
        match rng.below(10) {
            0..=3 if vm.stack_len() < vm.stack_capacity() => {
                allocated.push(vm.push_int(step as i64).unwrap());
            }
            4..=5 if vm.stack_len() >= 2 => {
                allocated.push(vm.push_pair().unwrap());
            }
            6..=7 if vm.stack_len() > 0 => {
                vm.pop().unwrap();
            }
            8 if vm.stack_len() >= 2 => {
                let stack = vm.stack();
                let pair = stack[rng.below(stack.len())];
                let value = stack[rng.below(stack.len())];
                if matches!(vm.get(pair), Ok(HeapObject::Pair { .. })) {
                    vm.set_tail(pair, value).unwrap();
                }
            }
            _ => {}
        }
    }
    allocated
}

#[test]
fn test_collect_frees_exactly_the_unreachable_objects() {
    for seed in 1..=40u64 {
        let mut rng = XorShift(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1);
        let mut vm = VM::with_config(GcConfig::default().with_gc_enabled(false));
        let allocated = random_mutator(&mut vm, &mut rng, 400);

        let expected = reachable_from(&vm, vm.stack());
        let stats = vm.collect();

        assert_eq!(stats.live_after, expected.len(), "seed {seed}");
        for handle in &allocated {
            assert_eq!(
                vm.is_live(*handle),
                expected.contains(handle),
                "seed {seed}: wrong liveness for {handle}"
            );
        }
    }
}

#[test]
fn test_automatic_collections_never_free_rooted_objects() {
    for seed in 1..=40u64 {
        let mut rng = XorShift(seed.wrapping_mul(0xD1B5_4A32_D192_ED03) | 1);
        let mut vm = VM::with_config(GcConfig::default().with_min_threshold(4));
        random_mutator(&mut vm, &mut rng, 600);

        // Every object reachable right now must still resolve.
        let reachable = reachable_from(&vm, vm.stack());
        assert!(vm.live_count() >= reachable.len(), "seed {seed}");

        let stats = vm.collect();
        assert_eq!(stats.live_after, reachable.len(), "seed {seed}");
    }
}

#[test]
fn test_collect_is_idempotent_on_random_graphs() {
    for seed in 1..=20u64 {
        let mut rng = XorShift(seed | 1);
        let mut vm = VM::new();
        random_mutator(&mut vm, &mut rng, 300);

        let first = vm.collect();
        let survivors: Vec<GcHandle> = vm.heap().iter().map(|(handle, _)| handle).collect();
        let second = vm.collect();
        let survivors_again: Vec<GcHandle> =
            vm.heap().iter().map(|(handle, _)| handle).collect();

        assert_eq!(second.collected, 0, "seed {seed}");
        assert_eq!(second.live_after, first.live_after, "seed {seed}");
        assert_eq!(survivors_again, survivors, "seed {seed}");
    }
}
