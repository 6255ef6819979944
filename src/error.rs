//! Error types for the paging simulator.
//!
//! Page faults, write-backs and evictions are normal control flow and never
//! show up here. What does show up is either a broken contract between the
//! workload and the dispatcher (fatal for the run), a rejected configuration,
//! or a problem reading a workload script.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Error, Debug)]
pub enum SimError {
    /// A command named a pid that is not in the process list
    #[error("contract violation: unknown process id {pid}")]
    UnknownProcess { pid: usize },

    /// A command addressed a page outside its process's page table
    #[error("contract violation: page {page} out of range for process {pid} ({size} pages)")]
    PageOutOfRange { pid: usize, page: usize, size: usize },

    /// Frame bookkeeping disagrees with the page tables
    #[error("frame table corrupt: {0}")]
    FrameTableCorrupt(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// True for errors that abort a run because an invariant was broken,
    /// as opposed to errors raised before the run started.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            SimError::UnknownProcess { .. }
                | SimError::PageOutOfRange { .. }
                | SimError::FrameTableCorrupt(_)
        )
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        SimError::Parse { line, message: message.into() }
    }
}
