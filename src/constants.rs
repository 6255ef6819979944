// default shape of a run
pub const DEFAULT_PROCESS_COUNT: usize = 8;
pub const DEFAULT_COMMAND_COUNT: usize = 16;
pub const DEFAULT_FRAME_COUNT: usize = 8;
pub const DEFAULT_MAX_PAGES_PER_PROCESS: usize = 8;

// simulated timing, in milliseconds
pub const DEFAULT_HANDLING_DELAY_MS: u64 = 1;
pub const DEFAULT_INTER_OP_DELAY_MS: u64 = 1;

// workload script tokens
pub const SCRIPT_COMMENT: char = '#';
pub const SCRIPT_PAGES_KEYWORD: &str = "pages";
pub const SCRIPT_READ: &str = "R";
pub const SCRIPT_WRITE: &str = "W";
