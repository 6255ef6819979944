//! Memory manager: owns the frame pool and the processes of a run, resolves
//! page faults and writes dirty pages back.
//!
//! Eviction is global LRU. When no frame is free, every resident page of every
//! process is a candidate and the one with the oldest `last_access` loses its
//! frame. Ties go to the first page met scanning process order, then page order.

use log::{debug, error, info, trace, warn};

use crate::clock::{Clock, Timestamp, simulate_delay};
use crate::config::RunConfig;
use crate::counter::{CounterSnapshot, Counters};
use crate::error::{Result, SimError};
use crate::events::{Event, EventBus, Observer};
use crate::memory::{FrameTable, Page, Process};
use crate::mmu::Mmu;
use crate::workload::{Command, Workload};

/// Coarse activity of the memory manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// No run in progress
    Free,
    /// Run active, no simulated I/O in flight
    Idle,
    /// Simulated I/O in flight
    Busy,
}

/// Outcome of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub counters: CounterSnapshot,
    pub commands_completed: usize,
    pub frames_in_use: usize,
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} commands, {} frames in use, {}",
            self.commands_completed, self.frames_in_use, self.counters
        )
    }
}

#[derive(Debug)]
pub struct MemoryManager {
    config: RunConfig,
    processes: Vec<Process>,
    frames: FrameTable,
    commands: Vec<Command>,
    counters: Counters,
    clock: Clock,
    state: RunState,
    events: EventBus,
}

impl MemoryManager {
    pub fn new(config: RunConfig) -> Self {
        MemoryManager {
            frames: FrameTable::new(config.frame_count),
            config,
            processes: Vec::new(),
            commands: Vec::new(),
            counters: Counters::new(),
            clock: Clock::new(),
            state: RunState::Free,
            events: EventBus::new(),
        }
    }

    pub fn subscribe<O: Observer + 'static>(&mut self, observer: O) {
        self.events.subscribe(observer);
    }

    /// Run a whole workload to completion.
    ///
    /// State from any previous run is discarded first. A contract violation
    /// aborts the run: the manager goes back to `Free` and the error is
    /// returned, with the commands dispatched so far left marked completed.
    pub fn start_run<W: Workload + ?Sized>(&mut self, workload: &mut W) -> Result<RunReport> {
        workload.check(&self.config)?;

        self.set_state(RunState::Idle);
        self.counters.reset();
        self.events.emit(Event::CountersChanged(self.counters.snapshot()));
        self.clock.reset();

        self.processes = workload.processes(&self.config);
        self.frames = FrameTable::new(self.config.frame_count);
        self.commands = workload.commands(&self.config, &self.processes);

        info!(
            "run started: {} processes, {} commands, {} frames",
            self.processes.len(),
            self.commands.len(),
            self.frames.capacity()
        );

        let mmu = Mmu::new(self.config.inter_op_delay);
        let mut commands = std::mem::take(&mut self.commands);
        let outcome = mmu.run(&mut commands, self);
        self.commands = commands;

        self.set_state(RunState::Free);

        match outcome {
            Ok(()) => {
                let report = self.report();
                info!("run finished: {}", report);
                Ok(report)
            }
            Err(e) => {
                error!("run aborted: {}", e);
                Err(e)
            }
        }
    }

    /// Bring a non-resident page into a frame, evicting if the pool is full
    pub fn load_page(&mut self, pid: usize, page_index: usize) -> Result<()> {
        if self.page(pid, page_index)?.is_valid {
            warn!("pid {} page {} is already resident", pid, page_index);
            return Ok(());
        }

        let (frame_index, swapped) = match self.frames.first_free() {
            Some(free) => (free, false),
            None => (self.evict()?, true),
        };

        let now = self.clock.tick();
        let page = self.page_mut(pid, page_index)?;
        page.is_valid = true;
        page.last_access = now;
        let frame = self.frames.bind(frame_index, pid, page_index, now).clone();
        debug!(
            "fault: pid {} page {} -> frame {}{}",
            pid,
            page_index,
            frame_index,
            if swapped { " (swap)" } else { "" }
        );
        self.events.emit(Event::FrameChanged(frame));

        if swapped {
            self.bump(Counters::bump_swap);
        }
        self.bump(Counters::bump_fault);
        self.bump(Counters::bump_disk);
        self.simulate_handling();
        Ok(())
    }

    /// Flush a dirty page to disk. Returns whether anything was written.
    pub fn save_if_dirty(&mut self, pid: usize, page_index: usize) -> Result<bool> {
        let page = self.page_mut(pid, page_index)?;
        if !page.is_dirty {
            return Ok(false);
        }
        page.is_dirty = false;
        debug!("write-back: pid {} page {}", pid, page_index);
        self.bump(Counters::bump_disk);
        self.simulate_handling();
        Ok(true)
    }

    /// The resident page with the oldest access, as `(pid, page_index)`
    pub fn select_victim(&self) -> Option<(usize, usize)> {
        let mut victim: Option<(usize, usize, Timestamp)> = None;
        for process in &self.processes {
            for page in process.page_table.pages().iter().filter(|p| p.is_valid) {
                // strict comparison keeps the first page seen on ties
                if victim.is_none_or(|(_, _, oldest)| page.last_access < oldest) {
                    victim = Some((process.pid, page.index, page.last_access));
                }
            }
        }
        victim.map(|(pid, index, _)| (pid, index))
    }

    /// Free a frame by pushing out the LRU page. Returns the freed frame.
    fn evict(&mut self) -> Result<usize> {
        let (pid, page_index) = self
            .select_victim()
            .ok_or_else(|| SimError::FrameTableCorrupt("no resident page to evict".into()))?;
        debug!("evicting pid {} page {}", pid, page_index);

        self.save_if_dirty(pid, page_index)?;
        self.page_mut(pid, page_index)?.is_valid = false;

        self.frames.find(pid, page_index).ok_or_else(|| {
            SimError::FrameTableCorrupt(format!(
                "resident pid {} page {} has no frame",
                pid, page_index
            ))
        })
    }

    /// One simulated I/O operation: Busy for the handling delay, then Idle
    pub fn simulate_handling(&mut self) {
        self.set_state(RunState::Busy);
        simulate_delay(self.config.handling_delay);
        self.set_state(RunState::Idle);
    }

    pub(crate) fn record_ram_access(&mut self) {
        self.bump(Counters::bump_ram);
    }

    /// Stamp a resident page and its frame with a fresh access time
    pub(crate) fn touch(&mut self, pid: usize, page_index: usize) -> Result<()> {
        let now = self.clock.tick();
        self.page_mut(pid, page_index)?.last_access = now;
        let frame = self.frames.touch(pid, page_index, now).cloned().ok_or_else(|| {
            SimError::FrameTableCorrupt(format!(
                "resident pid {} page {} has no frame",
                pid, page_index
            ))
        })?;
        self.events.emit(Event::FrameChanged(frame));
        Ok(())
    }

    pub(crate) fn command_finished(&mut self, index: usize, command: &Command) {
        trace!("command {} finished: {}", index, command);
        self.events.emit(Event::CommandFinished { index, command: command.clone() });
    }

    /// Resolve `(pid, page_index)`; failure means the workload broke its contract
    pub(crate) fn page_mut(&mut self, pid: usize, page_index: usize) -> Result<&mut Page> {
        let process = self
            .processes
            .get_mut(pid)
            .ok_or(SimError::UnknownProcess { pid })?;
        let size = process.page_table.len();
        process
            .page_table
            .lookup_mut(page_index)
            .ok_or(SimError::PageOutOfRange { pid, page: page_index, size })
    }

    pub fn page(&self, pid: usize, page_index: usize) -> Result<&Page> {
        let process = self.processes.get(pid).ok_or(SimError::UnknownProcess { pid })?;
        process.page_table.lookup(page_index).ok_or(SimError::PageOutOfRange {
            pid,
            page: page_index,
            size: process.page_table.len(),
        })
    }

    fn bump(&mut self, counter: fn(&mut Counters)) {
        counter(&mut self.counters);
        self.events.emit(Event::CountersChanged(self.counters.snapshot()));
    }

    fn set_state(&mut self, state: RunState) {
        if self.state != state {
            trace!("state {:?} -> {:?}", self.state, state);
            self.state = state;
            self.events.emit(Event::StateChanged(state));
        }
    }

    fn report(&self) -> RunReport {
        RunReport {
            counters: self.counters.snapshot(),
            commands_completed: self.commands.iter().filter(|c| c.completed).count(),
            frames_in_use: self.frames.occupied(),
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn frames(&self) -> &FrameTable {
        &self.frames
    }

    pub fn counters(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn valid_page_count(&self) -> usize {
        self.processes.iter().map(|p| p.page_table.valid_count()).sum()
    }
}
