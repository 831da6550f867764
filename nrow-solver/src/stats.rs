//! Search counters, progress logging and the end-of-run summary.

use std::time::{Duration, Instant};

use tracing::info;

use crate::oracle::Outcome;

/// Resident set size of this process, from `/proc/self/status`.
#[cfg(target_os = "linux")]
pub fn resident_memory() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    let kb: u64 = status
        .lines()
        .find_map(|line| line.strip_prefix("VmRSS:"))?
        .split_whitespace()
        .next()?
        .parse()
        .ok()?;
    Some(kb * 1024)
}

#[cfg(not(target_os = "linux"))]
pub fn resident_memory() -> Option<u64> {
    None
}

/// Byte count with a binary unit, one decimal above 1 KB.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Counters collected by a [`Solver`](crate::Solver) over its lifetime.
#[derive(Debug)]
pub struct SolverStats {
    /// Positions whose outcome was computed (not answered by the cache)
    pub positions_evaluated: u64,

    /// Cache hits (position or one of its images already solved)
    pub cache_hits: u64,

    /// Terminal positions (line completed or board full)
    pub terminal_positions: u64,
    pub wins: u64,
    pub draws: u64,

    /// Deepest recursion reached below a root query
    pub max_depth: u64,

    /// Moves returned by the move selector
    pub moves_chosen: u64,

    started: Instant,
    last_log: Instant,
    positions_at_last_log: u64,
}

impl Default for SolverStats {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverStats {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            positions_evaluated: 0,
            cache_hits: 0,
            terminal_positions: 0,
            wins: 0,
            draws: 0,
            max_depth: 0,
            moves_chosen: 0,
            started: now,
            last_log: now,
            positions_at_last_log: 0,
        }
    }

    pub fn record_terminal(&mut self, outcome: Outcome) {
        self.terminal_positions += 1;
        match outcome {
            Outcome::Winning => self.wins += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Losing => {}
        }
    }

    #[inline]
    pub fn record_depth(&mut self, depth: u64) {
        self.max_depth = self.max_depth.max(depth);
    }

    /// Share of lookups answered by the cache, in percent
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.cache_hits + self.positions_evaluated;
        if lookups == 0 {
            return 0.0;
        }
        100.0 * self.cache_hits as f64 / lookups as f64
    }

    /// Whether `interval_secs` have passed since the last progress line.
    pub fn should_log(&self, interval_secs: u64) -> bool {
        self.last_log.elapsed() >= Duration::from_secs(interval_secs)
    }

    /// Emit one progress line; the rate covers the span since the previous one.
    pub fn log_progress(&mut self, table_size: usize) {
        let now = Instant::now();
        let span = now.duration_since(self.last_log).as_secs_f64();
        let delta = self.positions_evaluated - self.positions_at_last_log;
        let rate = if span > 0.0 { delta as f64 / span } else { 0.0 };

        info!(
            elapsed_secs = self.started.elapsed().as_secs(),
            positions = self.positions_evaluated,
            cached = table_size,
            cache_hits = self.cache_hits,
            rate = rate.round() as u64,
            depth = self.max_depth,
            mem = %resident_memory().map(format_bytes).unwrap_or_default(),
            "solving"
        );

        self.last_log = now;
        self.positions_at_last_log = self.positions_evaluated;
    }

    pub fn print_summary(&self, table_size: usize) {
        let secs = self.started.elapsed().as_secs_f64();
        println!("Positions evaluated: {}", self.positions_evaluated);
        println!("Cache hits: {} ({:.1}%)", self.cache_hits, self.hit_rate());
        println!("Cached entries: {}", table_size);
        println!(
            "Terminal positions: {} ({} won, {} drawn)",
            self.terminal_positions, self.wins, self.draws
        );
        println!("Max depth: {}", self.max_depth);
        println!("Moves chosen: {}", self.moves_chosen);
        if let Some(rss) = resident_memory() {
            println!("Memory: {}", format_bytes(rss));
        }
        if secs > 0.0 {
            println!("Rate: {:.0} positions/sec", self.positions_evaluated as f64 / secs);
        }
    }
}
