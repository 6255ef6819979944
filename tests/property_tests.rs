//! Property-based tests for the memory manager.
//!
//! Random scripted workloads, always inside the pid/page contract, run with
//! zero delays.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use paging_sim::{AccessType, Command, CounterSnapshot, Event, MemoryManager, RunConfig, Script};
use proptest::prelude::*;

// ============================================================================
// Workload Strategies
// ============================================================================

/// 1-4 processes with 1-5 pages each, 1-30 in-bounds commands
fn workload() -> impl Strategy<Value = Script> {
    prop::collection::vec(1usize..=5, 1..=4).prop_flat_map(|sizes| {
        let n = sizes.len();
        let commands = prop::collection::vec((0..n, any::<prop::sample::Index>(), any::<bool>()), 1..30);
        (Just(sizes), commands).prop_map(|(sizes, raw)| {
            let commands = raw
                .into_iter()
                .map(|(pid, page, write)| {
                    let page = page.index(sizes[pid]);
                    if write { Command::write(pid, page) } else { Command::read(pid, page) }
                })
                .collect();
            Script::new(sizes, commands)
        })
    })
}

fn run(script: &Script, frames: usize) -> MemoryManager {
    let mut os = MemoryManager::new(RunConfig::default().with_frames(frames).instant());
    os.start_run(&mut script.clone()).unwrap();
    os
}

// ============================================================================
// Run Tracing And Reference Model
// ============================================================================

/// Resident set and counters observed as each command finished
struct Step {
    resident: HashSet<(usize, usize)>,
    counters: CounterSnapshot,
}

#[derive(Default)]
struct Trace {
    frames: HashMap<usize, (usize, usize)>,
    counters: CounterSnapshot,
    steps: Vec<Step>,
}

impl Trace {
    fn observer(trace: &Rc<RefCell<Trace>>) -> impl FnMut(&Event) + 'static {
        let trace = Rc::clone(trace);
        move |e: &Event| {
            let mut t = trace.borrow_mut();
            match e {
                Event::FrameChanged(f) => match (f.owner_pid, f.page_index) {
                    (Some(pid), Some(page)) => {
                        t.frames.insert(f.frame_index, (pid, page));
                    }
                    _ => {
                        t.frames.remove(&f.frame_index);
                    }
                },
                Event::CountersChanged(c) => t.counters = *c,
                Event::CommandFinished { .. } => {
                    let step = Step {
                        resident: t.frames.values().copied().collect(),
                        counters: t.counters,
                    };
                    t.steps.push(step);
                }
                Event::StateChanged(_) => {}
            }
        }
    }
}

/// Straight-line global LRU: scan everything, evict the oldest access, ties
/// broken by pid then page index
struct LruModel {
    frames: usize,
    // (pid, page, last access, dirty)
    resident: Vec<(usize, usize, u64, bool)>,
    clock: u64,
    faults: u64,
    swaps: u64,
    disk: u64,
}

impl LruModel {
    fn new(frames: usize) -> Self {
        LruModel { frames, resident: Vec::new(), clock: 0, faults: 0, swaps: 0, disk: 0 }
    }

    fn access(&mut self, cmd: &Command) {
        self.clock += 1;
        let hit = self
            .resident
            .iter()
            .position(|&(pid, page, _, _)| pid == cmd.pid && page == cmd.page_index);

        let slot = match hit {
            Some(slot) => slot,
            None => {
                self.faults += 1;
                self.disk += 1;
                if self.resident.len() == self.frames {
                    let victim = (0..self.resident.len())
                        .min_by_key(|&i| {
                            let (pid, page, last, _) = self.resident[i];
                            (last, pid, page)
                        })
                        .unwrap();
                    if self.resident[victim].3 {
                        self.disk += 1;
                    }
                    self.swaps += 1;
                    self.resident.remove(victim);
                }
                self.resident.push((cmd.pid, cmd.page_index, self.clock, false));
                self.resident.len() - 1
            }
        };

        if cmd.access_type == AccessType::Write {
            if self.resident[slot].3 {
                self.disk += 1;
            }
            self.resident[slot].3 = true;
        }
        self.resident[slot].2 = self.clock;
    }

    fn resident_set(&self) -> HashSet<(usize, usize)> {
        self.resident.iter().map(|&(pid, page, _, _)| (pid, page)).collect()
    }
}

// ============================================================================
// Residency Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_valid_pages_match_frames(script in workload(), frames in 1usize..5) {
        let os = run(&script, frames);

        prop_assert!(os.valid_page_count() <= frames);
        prop_assert_eq!(os.valid_page_count(), os.frames().occupied());

        let mut seen = HashSet::new();
        for frame in os.frames().frames() {
            if let (Some(pid), Some(page)) = (frame.owner_pid, frame.page_index) {
                prop_assert!(seen.insert((pid, page)), "two frames map pid {} page {}", pid, page);
                prop_assert!(os.page(pid, page).unwrap().is_valid);
            }
        }

        for process in os.processes() {
            for page in process.page_table.pages() {
                prop_assert_eq!(page.is_valid, os.frames().find(process.pid, page.index).is_some());
                prop_assert!(!page.is_dirty || page.is_valid);
                prop_assert_eq!(page.requested_by, None);
            }
        }
    }

    #[test]
    fn prop_mapping_injective_at_every_bind(script in workload(), frames in 1usize..5) {
        let mut os = MemoryManager::new(RunConfig::default().with_frames(frames).instant());
        let violations = Rc::new(RefCell::new(0usize));
        let table: Rc<RefCell<HashMap<usize, (usize, usize)>>> = Rc::default();

        let (sink, map) = (Rc::clone(&violations), Rc::clone(&table));
        os.subscribe(move |e: &Event| {
            if let Event::FrameChanged(f) = e {
                let mut map = map.borrow_mut();
                if let (Some(pid), Some(page)) = (f.owner_pid, f.page_index) {
                    map.insert(f.frame_index, (pid, page));
                }
                let distinct: HashSet<_> = map.values().collect();
                if distinct.len() != map.len() || map.len() > frames {
                    *sink.borrow_mut() += 1;
                }
            }
        });

        os.start_run(&mut script.clone()).unwrap();
        prop_assert_eq!(*violations.borrow(), 0);
    }

    // ========================================================================
    // Accounting Properties
    // ========================================================================

    #[test]
    fn prop_counter_accounting(script in workload(), frames in 1usize..5) {
        let os = run(&script, frames);
        let c = os.counters();

        prop_assert_eq!(c.ram_accesses, 2 * script.commands.len() as u64);
        // frames fill in order and are never released, so only the first
        // `frames` faults find a free one
        prop_assert_eq!(c.page_swaps, c.page_faults.saturating_sub(frames as u64));

        let touched: HashSet<(usize, usize)> =
            script.commands.iter().map(|c| (c.pid, c.page_index)).collect();
        prop_assert!(c.page_faults >= touched.len() as u64);
        prop_assert!(c.disk_accesses >= c.page_faults);

        let total_pages: usize = script.page_table_sizes.iter().sum();
        if frames >= total_pages {
            prop_assert_eq!(c.page_faults, touched.len() as u64);
            prop_assert_eq!(c.page_swaps, 0);
        }
    }

    #[test]
    fn prop_fault_only_on_invalid_access(script in workload(), frames in 1usize..5) {
        let mut os = MemoryManager::new(RunConfig::default().with_frames(frames).instant());
        let trace = Rc::new(RefCell::new(Trace::default()));
        os.subscribe(Trace::observer(&trace));
        os.start_run(&mut script.clone()).unwrap();

        let trace = trace.borrow();
        prop_assert_eq!(trace.steps.len(), script.commands.len());

        let mut resident_before: HashSet<(usize, usize)> = HashSet::new();
        let mut faults_before = 0;
        for (cmd, step) in script.commands.iter().zip(&trace.steps) {
            let missing = !resident_before.contains(&(cmd.pid, cmd.page_index));
            let delta = step.counters.page_faults - faults_before;
            prop_assert_eq!(delta, missing as u64, "command {}", cmd);
            prop_assert!(step.resident.contains(&(cmd.pid, cmd.page_index)));

            resident_before = step.resident.clone();
            faults_before = step.counters.page_faults;
        }
    }

    #[test]
    fn prop_eviction_matches_global_lru_model(script in workload(), frames in 1usize..5) {
        let mut os = MemoryManager::new(RunConfig::default().with_frames(frames).instant());
        let trace = Rc::new(RefCell::new(Trace::default()));
        os.subscribe(Trace::observer(&trace));
        os.start_run(&mut script.clone()).unwrap();

        let mut model = LruModel::new(frames);
        let trace = trace.borrow();
        for (i, (cmd, step)) in script.commands.iter().zip(&trace.steps).enumerate() {
            model.access(cmd);
            prop_assert_eq!(&step.resident, &model.resident_set(), "after command {}", i);
            prop_assert_eq!(
                (step.counters.page_faults, step.counters.page_swaps, step.counters.disk_accesses),
                (model.faults, model.swaps, model.disk),
                "after command {}", i
            );
        }
    }

    // ========================================================================
    // Determinism
    // ========================================================================

    #[test]
    fn prop_replay_is_idempotent(script in workload(), frames in 1usize..5) {
        let a = run(&script, frames);
        let b = run(&script, frames);

        prop_assert_eq!(a.counters(), b.counters());
        prop_assert_eq!(a.frames(), b.frames());
        prop_assert_eq!(a.processes(), b.processes());
        prop_assert_eq!(a.commands(), b.commands());
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn scenario_same_page_twice() {
    let os = run(&Script::new(vec![2], vec![Command::read(0, 0), Command::read(0, 0)]), 1);
    let c = os.counters();
    assert_eq!((c.page_faults, c.disk_accesses, c.page_swaps), (1, 1, 0));
}

#[test]
fn scenario_second_page_swaps_first_out() {
    let os = run(&Script::new(vec![2], vec![Command::read(0, 0), Command::read(0, 1)]), 1);
    let c = os.counters();
    assert_eq!((c.page_faults, c.page_swaps), (2, 1));
    assert!(!os.page(0, 0).unwrap().is_valid);
    assert!(os.page(0, 1).unwrap().is_valid);
}

#[test]
fn scenario_rewrite_dirty_page() {
    let once = run(&Script::new(vec![1], vec![Command::write(0, 0)]), 1);
    let twice = run(&Script::new(vec![1], vec![Command::write(0, 0), Command::write(0, 0)]), 1);
    assert_eq!(twice.counters().disk_accesses, once.counters().disk_accesses + 1);
    assert!(twice.page(0, 0).unwrap().is_dirty);
}

#[test]
fn scenario_generated_run_completes() {
    let config = RunConfig::default().with_seed(2024).instant();
    let mut os = MemoryManager::new(config.clone());
    let report = os.start_run(&mut paging_sim::Generator::from_config(&config)).unwrap();
    assert_eq!(report.commands_completed, config.command_count);
    assert!(report.frames_in_use <= config.frame_count);
    assert_eq!(report.counters.ram_accesses, 2 * config.command_count as u64);
}
