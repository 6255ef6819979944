use std::time::Duration;

use log::trace;

use crate::clock::simulate_delay;
use crate::error::Result;
use crate::os::MemoryManager;
use crate::workload::{AccessType, Command};

/// Command dispatcher. Feeds commands to the memory manager one at a time, in
/// list order; a command's effects are committed before the next one starts.
#[derive(Debug, Clone, Copy)]
pub struct Mmu {
    inter_op_delay: Duration,
}

impl Mmu {
    pub fn new(inter_op_delay: Duration) -> Self {
        Mmu { inter_op_delay }
    }

    /// Execute every command. Stops at the first contract violation, leaving
    /// the remaining commands incomplete.
    pub fn run(&self, commands: &mut [Command], os: &mut MemoryManager) -> Result<()> {
        for (index, command) in commands.iter_mut().enumerate() {
            trace!("command {}: {}", index, command);
            self.access_page(command, os)?;
            command.completed = true;
            os.command_finished(index, command);
            simulate_delay(self.inter_op_delay);
        }
        Ok(())
    }

    fn access_page(&self, command: &Command, os: &mut MemoryManager) -> Result<()> {
        let (pid, index) = (command.pid, command.page_index);

        // resolving the entry is itself a memory access
        let resident = os.page(pid, index)?.is_valid;
        os.record_ram_access();

        if !resident {
            os.page_mut(pid, index)?.requested_by = Some(pid);
            // load_page stamps the page and its new frame
            os.load_page(pid, index)?;
            let page = os.page_mut(pid, index)?;
            page.requested_by = None;
            page.is_valid = true;
        }

        if command.access_type == AccessType::Write {
            if os.page(pid, index)?.is_dirty {
                os.save_if_dirty(pid, index)?;
            }
            os.page_mut(pid, index)?.is_dirty = true;
            os.simulate_handling();
        }

        os.touch(pid, index)?;
        os.record_ram_access();
        Ok(())
    }
}
