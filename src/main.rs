//! paging-sim - demand paging simulator
//!
//! Usage:
//!   paging-sim run      [SHAPE] [TIMING] [--seed S] [--save FILE]
//!   paging-sim replay   FILE [--frames N] [TIMING]
//!   paging-sim generate -o FILE [SHAPE] [--seed S]
//!
//! Global options:
//!   -v, --verbose  Print one line per finished command (-vv for trace logs)
//!   -q, --quiet    Only log warnings and errors

use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use paging_sim::constants::*;
use paging_sim::logging;
use paging_sim::{Event, Generator, MemoryManager, RunConfig, Script, SimError};

#[derive(Parser)]
#[command(name = "paging-sim")]
#[command(about = "Demand-paged virtual memory simulator with global LRU eviction")]
#[command(version)]
struct Cli {
    /// Print finished commands; repeat for more log detail
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a workload and run it
    Run {
        #[command(flatten)]
        shape: ShapeArgs,

        #[command(flatten)]
        timing: TimingArgs,

        /// Random seed for the workload
        #[arg(long)]
        seed: Option<u64>,

        /// Also save the generated workload to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Run a workload script
    Replay {
        /// Workload file
        file: PathBuf,

        /// Number of physical frames
        #[arg(short, long, default_value_t = DEFAULT_FRAME_COUNT)]
        frames: usize,

        #[command(flatten)]
        timing: TimingArgs,
    },

    /// Write a generated workload without running it
    Generate {
        /// Output workload file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        shape: ShapeArgs,

        /// Random seed for the workload
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Args)]
struct ShapeArgs {
    /// Number of processes
    #[arg(short, long, default_value_t = DEFAULT_PROCESS_COUNT)]
    processes: usize,

    /// Number of commands
    #[arg(short, long, default_value_t = DEFAULT_COMMAND_COUNT)]
    commands: usize,

    /// Number of physical frames
    #[arg(short, long, default_value_t = DEFAULT_FRAME_COUNT)]
    frames: usize,

    /// Upper bound of a process's page-table size
    #[arg(short, long, default_value_t = DEFAULT_MAX_PAGES_PER_PROCESS)]
    max_pages: usize,
}

#[derive(Args)]
struct TimingArgs {
    /// Milliseconds spent in each simulated I/O operation
    #[arg(long, default_value_t = DEFAULT_HANDLING_DELAY_MS)]
    handling_delay_ms: u64,

    /// Milliseconds between two commands
    #[arg(long, default_value_t = DEFAULT_INTER_OP_DELAY_MS)]
    inter_op_delay_ms: u64,
}

impl ShapeArgs {
    fn config(&self) -> RunConfig {
        RunConfig::default()
            .with_processes(self.processes)
            .with_commands(self.commands)
            .with_frames(self.frames)
            .with_max_pages(self.max_pages)
    }
}

impl TimingArgs {
    fn apply(&self, config: RunConfig) -> RunConfig {
        config.with_delays(
            Duration::from_millis(self.handling_delay_ms),
            Duration::from_millis(self.inter_op_delay_ms),
        )
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(logging::level_for(cli.verbose, cli.quiet)) {
        eprintln!("Error initializing logger: {}", e);
    }

    let verbose = cli.verbose > 0;
    let result = match cli.command {
        Commands::Run { shape, timing, seed, save } => {
            let mut config = timing.apply(shape.config());
            config.seed = seed;
            cmd_run(config, save.as_deref(), verbose)
        }
        Commands::Replay { file, frames, timing } => {
            cmd_replay(&file, timing.apply(RunConfig::default().with_frames(frames)), verbose)
        }
        Commands::Generate { output, shape, seed } => {
            let mut config = shape.config();
            config.seed = seed;
            cmd_generate(&output, config)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn cmd_run(config: RunConfig, save: Option<&Path>, verbose: bool) -> Result<(), SimError> {
    config.validate()?;
    let script = Script::capture(&mut Generator::from_config(&config), &config);
    if let Some(path) = save {
        script.write_to(path)?;
        eprintln!("Workload written to: {}", path.display());
    }
    simulate(config, script, verbose)
}

fn cmd_replay(file: &Path, config: RunConfig, verbose: bool) -> Result<(), SimError> {
    let script = Script::from_file(file)?;
    simulate(config, script, verbose)
}

fn cmd_generate(output: &Path, config: RunConfig) -> Result<(), SimError> {
    config.validate()?;
    let script = Script::capture(&mut Generator::from_config(&config), &config);
    script.write_to(output)?;
    println!(
        "Wrote {} processes and {} commands to {}",
        script.page_table_sizes.len(),
        script.commands.len(),
        output.display()
    );
    Ok(())
}

fn simulate(config: RunConfig, mut script: Script, verbose: bool) -> Result<(), SimError> {
    let mut os = MemoryManager::new(config);

    if verbose {
        os.subscribe(|e: &Event| {
            if let Event::CommandFinished { index, command } = e {
                eprintln!("#{:<4} {}", index, command);
            }
        });
    }

    let report = os.start_run(&mut script)?;

    println!("=== Summary ===");
    println!("Commands completed: {}", report.commands_completed);
    println!("RAM accesses:       {}", report.counters.ram_accesses);
    println!("Disk accesses:      {}", report.counters.disk_accesses);
    println!("Page faults:        {}", report.counters.page_faults);
    println!("Page swaps:         {}", report.counters.page_swaps);
    println!();
    println!("=== Frames ({}/{} in use) ===", report.frames_in_use, os.frames().capacity());
    for frame in os.frames().frames() {
        println!("  {}", frame);
    }
    Ok(())
}
