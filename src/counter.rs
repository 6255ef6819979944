/// Totals at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CounterSnapshot {
    pub ram_accesses: u64,
    pub disk_accesses: u64,
    pub page_faults: u64,
    pub page_swaps: u64,
}

impl std::fmt::Display for CounterSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ram={} disk={} faults={} swaps={}",
            self.ram_accesses, self.disk_accesses, self.page_faults, self.page_swaps
        )
    }
}

/// Run telemetry. Only ever counts up between resets.
#[derive(Debug, Default)]
pub struct Counters {
    totals: CounterSnapshot,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bump_ram(&mut self) {
        self.totals.ram_accesses += 1;
    }

    pub fn bump_disk(&mut self) {
        self.totals.disk_accesses += 1;
    }

    pub fn bump_fault(&mut self) {
        self.totals.page_faults += 1;
    }

    pub fn bump_swap(&mut self) {
        self.totals.page_swaps += 1;
    }

    pub fn reset(&mut self) {
        self.totals = CounterSnapshot::default();
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        self.totals
    }
}
