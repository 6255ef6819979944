//! Where processes and commands come from.
//!
//! The memory manager only relies on the shape contract: every command names an
//! existing pid and a page inside that pid's table, and the first
//! `process_count` commands hit pids `0..process_count` in order.

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::RunConfig;
use crate::error::{Result, SimError};
use crate::memory::Process;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessType {
    Read,
    Write,
}

impl std::fmt::Display for AccessType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessType::Read => write!(f, "read"),
            AccessType::Write => write!(f, "write"),
        }
    }
}

/// One page access issued by a process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub page_index: usize,
    pub pid: usize,
    pub access_type: AccessType,
    pub completed: bool,
}

impl Command {
    pub fn new(pid: usize, page_index: usize, access_type: AccessType) -> Self {
        Command { page_index, pid, access_type, completed: false }
    }

    pub fn read(pid: usize, page_index: usize) -> Self {
        Self::new(pid, page_index, AccessType::Read)
    }

    pub fn write(pid: usize, page_index: usize) -> Self {
        Self::new(pid, page_index, AccessType::Write)
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pid {} {} page {}", self.pid, self.access_type, self.page_index)
    }
}

pub trait Workload {
    /// Reject a config this workload cannot run under, before anything starts
    fn check(&self, config: &RunConfig) -> Result<()> {
        config.validate()
    }

    fn processes(&mut self, config: &RunConfig) -> Vec<Process>;

    fn commands(&mut self, config: &RunConfig, processes: &[Process]) -> Vec<Command>;
}

/// Random workload, reproducible from its seed
pub struct Generator {
    rng: StdRng,
    seed: u64,
}

impl Generator {
    pub fn new(seed: u64) -> Self {
        Generator { rng: StdRng::seed_from_u64(seed), seed }
    }

    /// Seeded from the config, or from the thread RNG when no seed is set.
    pub fn from_config(config: &RunConfig) -> Self {
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        info!("workload seed {}", seed);
        Self::new(seed)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn command_for(&mut self, pid: usize, processes: &[Process]) -> Command {
        let access_type = if self.rng.random_bool(0.5) {
            AccessType::Write
        } else {
            AccessType::Read
        };
        // page tables are never empty, sizes start at 1
        let page_index = self.rng.random_range(0..processes[pid].page_table_size());
        Command::new(pid, page_index, access_type)
    }
}

impl Workload for Generator {
    fn processes(&mut self, config: &RunConfig) -> Vec<Process> {
        (0..config.process_count)
            .map(|pid| {
                let size = self.rng.random_range(1..=config.max_pages_per_process);
                Process::new(pid, size)
            })
            .collect()
    }

    fn commands(&mut self, config: &RunConfig, processes: &[Process]) -> Vec<Command> {
        let mut commands = Vec::with_capacity(config.command_count);

        // one guaranteed command per process
        for pid in 0..processes.len() {
            commands.push(self.command_for(pid, processes));
        }

        for _ in processes.len()..config.command_count {
            let pid = self.rng.random_range(0..processes.len());
            commands.push(self.command_for(pid, processes));
        }

        commands
    }
}

/// A fixed workload: page-table sizes per pid plus a command list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    pub page_table_sizes: Vec<usize>,
    pub commands: Vec<Command>,
}

impl Script {
    pub fn new(page_table_sizes: Vec<usize>, commands: Vec<Command>) -> Self {
        Script { page_table_sizes, commands }
    }

    /// Draw one workload from a generator and freeze it
    pub fn capture<W: Workload>(workload: &mut W, config: &RunConfig) -> Self {
        let processes = workload.processes(config);
        let commands = workload.commands(config, &processes);
        Script {
            page_table_sizes: processes.iter().map(Process::page_table_size).collect(),
            commands,
        }
    }
}

impl Workload for Script {
    /// Process and command counts come from the script, not the config
    fn check(&self, config: &RunConfig) -> Result<()> {
        config.validate_frames()?;
        if self.page_table_sizes.is_empty() {
            return Err(SimError::InvalidConfig("script declares no processes".into()));
        }
        if let Some(pid) = self.page_table_sizes.iter().position(|&size| size == 0) {
            return Err(SimError::InvalidConfig(format!("process {} has an empty page table", pid)));
        }
        Ok(())
    }

    fn processes(&mut self, _config: &RunConfig) -> Vec<Process> {
        self.page_table_sizes
            .iter()
            .enumerate()
            .map(|(pid, &size)| Process::new(pid, size))
            .collect()
    }

    fn commands(&mut self, _config: &RunConfig, _processes: &[Process]) -> Vec<Command> {
        self.commands
            .iter()
            .map(|c| Command::new(c.pid, c.page_index, c.access_type))
            .collect()
    }
}
