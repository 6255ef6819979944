pub mod clock;
pub mod config;
pub mod constants;
pub mod counter;
pub mod error;
pub mod events;
pub mod io;
pub mod logging;
pub mod memory;
pub mod mmu;
pub mod os;
pub mod workload;

// Re-export commonly used items for convenience
pub use config::RunConfig;
pub use counter::CounterSnapshot;
pub use error::{Result, SimError};
pub use events::{Event, Observer};
pub use os::{MemoryManager, RunReport, RunState};
pub use workload::{AccessType, Command, Generator, Script, Workload};
