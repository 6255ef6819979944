use std::time::Duration;

use crate::constants::*;
use crate::error::{Result, SimError};

/// Parameters of one simulation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub process_count: usize,
    pub command_count: usize,
    pub frame_count: usize,
    pub max_pages_per_process: usize,
    /// Time spent in every simulated I/O operation (load, flush, write)
    pub handling_delay: Duration,
    /// Pause between two commands
    pub inter_op_delay: Duration,
    /// Seed for workload generation; drawn at random when unset
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            process_count: DEFAULT_PROCESS_COUNT,
            command_count: DEFAULT_COMMAND_COUNT,
            frame_count: DEFAULT_FRAME_COUNT,
            max_pages_per_process: DEFAULT_MAX_PAGES_PER_PROCESS,
            handling_delay: Duration::from_millis(DEFAULT_HANDLING_DELAY_MS),
            inter_op_delay: Duration::from_millis(DEFAULT_INTER_OP_DELAY_MS),
            seed: None,
        }
    }
}

impl RunConfig {
    pub fn with_processes(mut self, count: usize) -> Self {
        self.process_count = count;
        self
    }

    pub fn with_commands(mut self, count: usize) -> Self {
        self.command_count = count;
        self
    }

    pub fn with_frames(mut self, count: usize) -> Self {
        self.frame_count = count;
        self
    }

    pub fn with_max_pages(mut self, count: usize) -> Self {
        self.max_pages_per_process = count;
        self
    }

    pub fn with_delays(mut self, handling: Duration, inter_op: Duration) -> Self {
        self.handling_delay = handling;
        self.inter_op_delay = inter_op;
        self
    }

    /// Both delays set to zero, for tests and batch replays
    pub fn instant(self) -> Self {
        self.with_delays(Duration::ZERO, Duration::ZERO)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The frame allocator needs at least one frame to evict into
    pub fn validate_frames(&self) -> Result<()> {
        if self.frame_count == 0 {
            return Err(SimError::InvalidConfig("frame count must be at least 1".into()));
        }
        Ok(())
    }

    /// Reject shapes the generator and frame allocator cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.process_count == 0 {
            return Err(SimError::InvalidConfig("process count must be at least 1".into()));
        }
        self.validate_frames()?;
        if self.max_pages_per_process == 0 {
            return Err(SimError::InvalidConfig(
                "max pages per process must be at least 1".into(),
            ));
        }
        if self.command_count < self.process_count {
            return Err(SimError::InvalidConfig(format!(
                "command count {} is below process count {}; every process needs one command",
                self.command_count, self.process_count
            )));
        }
        Ok(())
    }
}
