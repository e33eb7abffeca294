/*!
 * Page Table Tests
 * Allocation, release and compaction of fixed-size frames
 */

use os_sim::memory::{MemoryPressure, PageTable};
use os_sim::process::Process;
use os_sim::{ProcessManager, ProcessState, SimConfig};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn owned_frames(table: &PageTable) -> usize {
    table.slots().iter().filter(|s| !s.is_free()).count()
}

#[test]
fn test_default_geometry() {
    let table = PageTable::new(1000, 50);
    assert_eq!(table.page_count(), 20);
    assert_eq!(table.free_slots(), 20);
    assert_eq!(table.pages_needed(120), 3);
    assert_eq!(table.pages_needed(50), 1);
    assert_eq!(table.pages_needed(51), 2);
}

#[test]
fn test_freed_frames_are_reused_lowest_first() {
    let mut table = PageTable::new(1000, 50);
    let mut a = Process::new(1, 100, 0);
    let mut b = Process::new(2, 100, 0);
    let mut c = Process::new(3, 150, 0);

    assert!(table.allocate(&mut a));
    assert!(table.allocate(&mut b));
    assert_eq!(table.free(&mut a), 2);

    assert!(table.allocate(&mut c));
    assert_eq!(c.pages, vec![0, 1, 4]);
    assert_eq!(table.used_memory(), 250);
}

#[test]
fn test_failed_allocation_changes_nothing() {
    let mut table = PageTable::new(200, 50);
    let mut a = Process::new(1, 150, 0);
    let mut b = Process::new(2, 100, 0);

    assert!(table.allocate(&mut a));
    let before: Vec<_> = table.views();
    assert!(!table.allocate(&mut b));
    assert!(b.pages.is_empty());
    assert_eq!(table.views(), before);
    assert_eq!(table.used_pages(), 3);
}

#[test]
fn test_free_ignores_frames_owned_by_others() {
    let mut table = PageTable::new(1000, 50);
    let mut a = Process::new(1, 50, 0);
    assert!(table.allocate(&mut a));

    let mut impostor = Process::new(2, 50, 0);
    impostor.pages = a.pages.clone();
    assert_eq!(table.free(&mut impostor), 0);
    assert_eq!(table.used_pages(), 1);
    assert_eq!(table.free(&mut a), 1);
    assert_eq!(table.free(&mut a), 0);
}

#[test]
fn test_allocate_then_free_restores_table() {
    let mut table = PageTable::new(1000, 50);
    let mut resident = Process::new(1, 130, 0);
    assert!(table.allocate(&mut resident));
    let before = table.views();

    // One MB over a page boundary costs a whole extra frame
    let mut p = Process::new(2, 201, 0);
    assert!(table.allocate(&mut p));
    assert_eq!(p.pages.len(), 5);
    assert_eq!(p.pages, vec![3, 4, 5, 6, 7]);
    assert_eq!(table.used_memory(), 400);

    assert_eq!(table.free(&mut p), 5);
    assert_eq!(table.views(), before);
    assert_eq!(table.free(&mut p), 0);
    assert_eq!(table.views(), before);
    assert_eq!(table.used_pages(), 3);

    let mut exact = Process::new(3, 200, 0);
    assert!(table.allocate(&mut exact));
    assert_eq!(exact.pages.len(), 4);
}

#[test]
fn test_pressure_levels() {
    let mut table = PageTable::new(1000, 50);
    assert_eq!(table.stats().memory_pressure(), MemoryPressure::Low);

    let mut big = Process::new(1, 850, 0);
    assert!(table.allocate(&mut big));
    let stats = table.stats();
    assert_eq!(stats.used_memory, 850);
    assert_eq!(stats.available_memory, 150);
    assert_eq!(stats.memory_pressure(), MemoryPressure::High);
}

#[test]
fn test_admission_defers_what_does_not_fit() {
    let manager = ProcessManager::builder()
        .with_config(SimConfig::default())
        .with_seed(3)
        .build()
        .unwrap();

    let a = manager.create_process(200).unwrap();
    let b = manager.create_process(200).unwrap();
    let c = manager.create_process(700).unwrap();

    assert_eq!(manager.admit_new(), vec![a, b]);
    let snapshot = manager.snapshot();
    assert_eq!(snapshot.used_memory, 400);
    assert_eq!(snapshot.used_pages(), 8);
    assert_eq!(snapshot.processes(ProcessState::New)[0].pid, c);

    let advisory = manager.take_advisory().unwrap();
    assert!(advisory.contains(&format!("Process {}", c)));
    assert!(advisory.contains("14 pages"));
    manager.verify_invariants().unwrap();
}

#[test]
fn test_compaction_packs_holes() {
    let mut table = PageTable::new(1000, 50);
    let mut procs: Vec<Process> = (1..=4).map(|pid| Process::new(pid, 100, 0)).collect();
    for p in procs.iter_mut() {
        assert!(table.allocate(p));
    }
    table.free(&mut procs[0]);
    table.free(&mut procs[2]);

    let moved = table.compact(procs.iter_mut());
    assert_eq!(moved, 4);
    assert_eq!(procs[1].pages, vec![0, 1]);
    assert_eq!(procs[3].pages, vec![2, 3]);
    assert_eq!(owned_frames(&table), 4);
    assert_eq!(table.free_slots(), 16);
}

proptest! {
    #[test]
    fn prop_frames_stay_disjoint(ops in prop::collection::vec((0usize..6, 1u32..400), 1..60)) {
        let mut table = PageTable::new(1000, 50);
        let mut procs: Vec<Process> = (1..=6)
            .map(|pid| Process::new(pid, 0, 0))
            .collect();

        for (slot, mb) in ops {
            let process = &mut procs[slot];
            if process.pages.is_empty() {
                process.memory_mb = mb;
                let free_before = table.free_slots();
                let ok = table.allocate(process);
                prop_assert_eq!(ok, free_before >= table.pages_needed(mb));
            } else {
                table.free(process);
            }

            let listed: usize = procs.iter().map(|p| p.pages.len()).sum();
            prop_assert_eq!(owned_frames(&table), listed);
            prop_assert_eq!(table.used_pages(), listed);
            prop_assert_eq!(table.used_memory(), listed as u32 * 50);
            for p in &procs {
                for &index in &p.pages {
                    prop_assert_eq!(table.slots()[index].owner(), Some(p.pid));
                }
            }
        }
    }
}
