use compass::{FrameReport, SkipReason};
use std::collections::HashMap;

// One entry per counter below plus one per skip reason
const INITIAL_STATISTICS_CAPACITY: usize = 16;

type StatisticsMap = HashMap<&'static str, u64>;

fn skip_event(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::NotRegistered => "skip_not_registered",
        SkipReason::NoKinds => "skip_no_kinds",
        SkipReason::NoRow => "skip_no_row",
        SkipReason::NoArt => "skip_no_art",
        SkipReason::NoFreeSlot => "skip_no_free_slot",
    }
}

/// Event counters aggregated over a run
#[derive(Debug, Clone)]
pub struct SimStatistics {
    counts: StatisticsMap,
}

impl Default for SimStatistics {
    fn default() -> Self {
        Self {
            counts: HashMap::with_capacity(INITIAL_STATISTICS_CAPACITY),
        }
    }
}

impl SimStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, event: &'static str, n: u64) {
        if n > 0 {
            *self.counts.entry(event).or_insert(0) += n;
        }
    }

    pub fn record(&mut self, report: &FrameReport) {
        self.add("frames", 1);
        self.add("heading_writes", report.heading_emitted as u64);
        self.add("syncs", report.synced as u64);
        self.add("bound", report.bound as u64);
        self.add("deactivated", report.deactivated as u64);
        self.add("evicted", report.evicted as u64);
        self.add("positions_pushed", report.positions_pushed as u64);
        self.add("displaced", report.displaced as u64);
        self.add("restored", report.restored as u64);
        for (&reason, &n) in &report.skipped {
            self.add(skip_event(reason), n as u64);
        }
    }

    pub fn get(&self, event: &str) -> u64 {
        self.counts.get(event).copied().unwrap_or(0)
    }

    /// Events sorted by count (descending), then name
    pub fn sorted(&self) -> Vec<(&'static str, u64)> {
        let mut rows: Vec<(&'static str, u64)> =
            self.counts.iter().map(|(&k, &v)| (k, v)).collect();
        rows.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        rows
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
