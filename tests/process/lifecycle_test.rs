/*!
 * Process Lifecycle Tests
 * State transitions driven through the process manager
 */

use os_sim::process::Process;
use os_sim::scheduler::OutcomeTable;
use os_sim::{
    ContentionMode, DispatchDecision, Outcome, Probabilities, ProcessManager, ProcessState,
    RecoverySelection, SimConfig, SimError,
};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn single_resource(contention: ContentionMode, probabilities: Probabilities) -> ProcessManager {
    let config = SimConfig {
        resource_count: 1,
        contention,
        probabilities,
        ..SimConfig::default()
    };
    ProcessManager::builder()
        .with_config(config)
        .with_seed(42)
        .build()
        .unwrap()
}

fn always_block() -> Probabilities {
    Probabilities {
        block_first: 1.0,
        block_repeat: 1.0,
        swap: 0.0,
        swap_to_blocked: 0.0,
    }
}

#[test]
fn test_busy_resource_blocks_until_released() {
    let manager = single_resource(ContentionMode::Resource, always_block());
    let a = manager.create_process(100).unwrap();
    let b = manager.create_process(100).unwrap();
    manager.admit_new();

    assert_eq!(manager.dispatch_next(), Some(DispatchDecision::Running(a)));
    assert_eq!(manager.complete_running(a).unwrap(), Outcome::Block);
    assert_eq!(manager.dispatch_next(), Some(DispatchDecision::Blocked(b)));
    assert_eq!(manager.take_advisory().unwrap(), format!(
        "Process {} blocked: resource R0 is held by process {}",
        b, a
    ));
    manager.verify_invariants().unwrap();

    // Only the holder can be promoted while R0 is taken
    assert_eq!(manager.recover_blocked(RecoverySelection::ResourceAvailable), vec![a]);
    assert_eq!(manager.snapshot().resources[0].owner, None);
    assert_eq!(manager.recover_blocked(RecoverySelection::ResourceAvailable), vec![b]);

    let ready: Vec<_> = manager
        .snapshot()
        .processes(ProcessState::Ready)
        .iter()
        .map(|p| p.pid)
        .collect();
    assert_eq!(ready, vec![a, b]);
    manager.verify_invariants().unwrap();
}

#[test]
fn test_requeue_rotates_ready() {
    let manager = single_resource(ContentionMode::Requeue, always_block());
    let a = manager.create_process(50).unwrap();
    let b = manager.create_process(50).unwrap();
    let c = manager.create_process(50).unwrap();
    manager.admit_new();

    manager.dispatch_next();
    manager.complete_running(a).unwrap();
    assert_eq!(manager.dispatch_next(), Some(DispatchDecision::Requeued(b)));

    let ready: Vec<_> = manager
        .snapshot()
        .processes(ProcessState::Ready)
        .iter()
        .map(|p| p.pid)
        .collect();
    assert_eq!(ready, vec![c, b]);
    assert_eq!(manager.stats().requeues, 1);
    manager.verify_invariants().unwrap();
}

#[test]
fn test_swap_area_is_bounded() {
    let config = SimConfig {
        max_swapped: 1,
        probabilities: Probabilities {
            block_first: 0.0,
            block_repeat: 0.0,
            swap: 1.0,
            swap_to_blocked: 0.0,
        },
        ..SimConfig::default()
    };
    let manager = ProcessManager::builder()
        .with_config(config)
        .with_seed(1)
        .build()
        .unwrap();

    let a = manager.create_process(100).unwrap();
    let b = manager.create_process(100).unwrap();
    manager.admit_new();

    for (pid, expected) in [(a, Outcome::Swap), (b, Outcome::Terminate)] {
        let decision = manager.dispatch_next();
        assert_eq!(decision, Some(DispatchDecision::Running(pid)));
        assert_eq!(manager.complete_running(pid).unwrap(), expected);
    }
    assert_eq!(manager.used_memory(), 0);
    manager.verify_invariants().unwrap();
}

#[test]
fn test_swapped_process_waits_for_room() {
    let config = SimConfig {
        probabilities: Probabilities {
            block_first: 0.0,
            block_repeat: 0.0,
            swap: 1.0,
            swap_to_blocked: 0.0,
        },
        ..SimConfig::default()
    };
    let manager = ProcessManager::builder()
        .with_config(config)
        .with_seed(2)
        .build()
        .unwrap();

    let big = manager.create_process(600).unwrap();
    manager.admit_new();
    manager.dispatch_next();
    assert_eq!(manager.complete_running(big).unwrap(), Outcome::Swap);

    let filler = manager.create_process(500).unwrap();
    assert_eq!(manager.admit_new(), vec![filler]);
    assert!(manager.review_swapped().is_empty());
    assert_eq!(manager.process(big).unwrap().state, ProcessState::Swapped);
    manager.verify_invariants().unwrap();
}

#[test]
fn test_terminated_process_is_final() {
    let manager = single_resource(
        ContentionMode::Resource,
        Probabilities {
            block_first: 0.0,
            block_repeat: 0.0,
            swap: 0.0,
            swap_to_blocked: 0.0,
        },
    );
    let pid = manager.create_process(50).unwrap();
    manager.admit_new();
    manager.dispatch_next();
    manager.complete_running(pid).unwrap();

    assert_eq!(manager.complete_running(pid), Err(SimError::NotRunning(pid)));
    assert!(manager.recover_blocked(RecoverySelection::ResourceAvailable).is_empty());
    assert_eq!(manager.process(pid).unwrap().state, ProcessState::Terminated);
}

#[test]
fn test_block_rate_adapts_after_first_block() {
    let outcomes = OutcomeTable::new(&Probabilities::default());
    let mut rng = StdRng::seed_from_u64(2024);
    let trials = 10_000;

    let rate = |process: &Process, rng: &mut StdRng| {
        let blocks = (0..trials)
            .filter(|_| outcomes.sample(rng, process, true) == Outcome::Block)
            .count();
        blocks as f64 / trials as f64
    };

    let mut process = Process::new(1, 100, 0);
    let first = rate(&process, &mut rng);
    process.blocked_count = 1;
    let repeat = rate(&process, &mut rng);

    assert!((first - 0.5).abs() < 0.03, "first-block rate {}", first);
    assert!((repeat - 0.1).abs() < 0.03, "repeat-block rate {}", repeat);
}

#[test]
fn test_random_operations_keep_invariants() {
    for seed in 0..8u64 {
        let manager = ProcessManager::builder().with_seed(seed).build().unwrap();
        let mut rng = StdRng::seed_from_u64(seed + 100);

        for _ in 0..400 {
            match rng.gen_range(0..9) {
                0 => {
                    manager.spawn_random_process();
                }
                1 => {
                    let _ = manager.create_process(rng.gen_range(1..=400));
                }
                2 => {
                    manager.admit_new();
                }
                3 => {
                    manager.dispatch_next();
                }
                4 => {
                    if let Some(running) = manager.snapshot().running {
                        manager.complete_running(running.pid).unwrap();
                    }
                }
                5 => {
                    let selection = match rng.gen_range(0..3) {
                        0 => RecoverySelection::SmallestMemory,
                        1 => RecoverySelection::LargestMemory,
                        _ => RecoverySelection::ResourceAvailable,
                    };
                    manager.recover_blocked(selection);
                }
                6 => {
                    manager.review_swapped();
                }
                7 => {
                    manager.compact();
                }
                _ => {
                    if rng.gen_bool(0.05) {
                        manager.reset();
                    }
                }
            }
            manager.verify_invariants().unwrap();

            let snapshot = manager.snapshot();
            assert!(snapshot.used_memory <= snapshot.total_memory);
            assert!(snapshot.count(ProcessState::Swapped) <= manager.config().max_swapped);
            assert!(snapshot.count(ProcessState::Running) <= 1);
        }
    }
}
