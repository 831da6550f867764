//! Move selection on top of the outcome oracle.
//!
//! 3x3 positions are searched directly; the tree is small enough. 4x4
//! positions go through the outcome cache, where every solved position is
//! stored under all of its symmetry images.

use std::time::Instant;

use rand::Rng;
use tracing::debug;

use nrow_core::{Dim, Error, Geometry, MoveSet, Position, Result};

use crate::cache::OutcomeCache;
use crate::oracle::{self, Outcome};
use crate::stats::SolverStats;

/// Evaluations between two checks of the progress-log timer.
const PROGRESS_CHECK_EVERY: u64 = 1 << 16;

/// Exhaustive solver for one board dimension.
///
/// The cache lives as long as the solver; keep one solver per dimension to
/// reuse results across games.
pub struct Solver {
    geometry: Geometry,
    /// Solved 4x4 positions (unused for 3x3)
    cache: OutcomeCache,
    /// Solver statistics
    pub stats: SolverStats,
    log_interval_secs: u64,
}

impl Solver {
    pub fn new(dim: Dim) -> Self {
        Self::with_cache(dim, OutcomeCache::new())
    }

    /// Validate `dim` and create a solver for it.
    pub fn for_dim(dim: usize) -> Result<Self> {
        Ok(Self::new(Dim::new(dim)?))
    }

    /// Create a solver around an existing cache of the same dimension.
    pub fn with_cache(dim: Dim, cache: OutcomeCache) -> Self {
        Self {
            geometry: Geometry::new(dim),
            cache,
            stats: SolverStats::new(),
            log_interval_secs: 5,
        }
    }

    #[inline]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    #[inline]
    pub fn cache(&self) -> &OutcomeCache {
        &self.cache
    }

    /// Hand the cache back, e.g. to seed another solver.
    pub fn into_cache(self) -> OutcomeCache {
        self.cache
    }

    /// Seconds between progress log lines during long searches.
    pub fn set_log_interval(&mut self, secs: u64) {
        self.log_interval_secs = secs;
    }

    /// Whether this dimension searches through the cache.
    #[inline]
    pub fn uses_cache(&self) -> bool {
        self.geometry.dim() == Dim::FOUR
    }

    /// Outcome of `position` for its low-half player.
    pub fn outcome(&mut self, position: Position) -> Outcome {
        let all = position.occupied(&self.geometry);
        if self.uses_cache() {
            self.check_config_memo(position, all)
        } else {
            self.search_direct(position, all, 0)
        }
    }

    /// Memoized oracle. Only valid for 4x4 positions, since the cache stores
    /// every result under the 4x4 symmetry images.
    pub fn check_config_memo(&mut self, position: Position, all: MoveSet) -> Outcome {
        debug_assert!(self.uses_cache(), "symmetry images assume a 4x4 board");
        self.search_memo(position, all, 0)
    }

    fn search_memo(&mut self, position: Position, all: MoveSet, depth: u64) -> Outcome {
        if let Some(outcome) = self.cache.get(position) {
            self.stats.cache_hits += 1;
            return outcome;
        }

        let geometry = self.geometry;
        let terminal = oracle::is_terminal(&geometry, position, all);
        let result = oracle::step(&geometry, position, all, |child, child_all| {
            self.search_memo(child, child_all, depth + 1)
        });

        if terminal {
            self.stats.record_terminal(result);
        }
        self.stats.positions_evaluated += 1;
        self.stats.record_depth(depth);
        self.cache.record(position, result);

        if self.stats.positions_evaluated % PROGRESS_CHECK_EVERY == 0
            && self.stats.should_log(self.log_interval_secs)
        {
            self.stats.log_progress(self.cache.len());
        }
        result
    }

    fn search_direct(&mut self, position: Position, all: MoveSet, depth: u64) -> Outcome {
        let geometry = self.geometry;
        let terminal = oracle::is_terminal(&geometry, position, all);
        let result = oracle::step(&geometry, position, all, |child, child_all| {
            self.search_direct(child, child_all, depth + 1)
        });

        if terminal {
            self.stats.record_terminal(result);
        }
        self.stats.positions_evaluated += 1;
        self.stats.record_depth(depth);
        result
    }

    /// Pick a cell for the player owning `turn`, with `opponent` to reply.
    pub fn choose_move(&mut self, turn: MoveSet, opponent: MoveSet) -> Result<usize> {
        self.choose_move_with_rng(turn, opponent, &mut rand::rng())
    }

    /// Pick a cell, drawing the opening corner from `rng`.
    ///
    /// Empty cells are scanned in increasing order: the first winning cell is
    /// returned at once, otherwise the last drawing cell, otherwise the first
    /// empty cell. On an empty 3x3 board a random corner is played without
    /// searching.
    pub fn choose_move_with_rng<R: Rng>(
        &mut self,
        turn: MoveSet,
        opponent: MoveSet,
        rng: &mut R,
    ) -> Result<usize> {
        let geometry = self.geometry;
        let all = turn | opponent;
        if geometry.is_winning(turn) || geometry.is_winning(opponent) || geometry.is_full(all) {
            return Err(Error::GameOver);
        }

        if all == 0 && geometry.dim() == Dim::THREE {
            let corners = geometry.corners();
            let cell = corners[rng.random_range(0..corners.len())];
            self.stats.moves_chosen += 1;
            debug!(cell, "opening corner");
            return Ok(cell);
        }

        let start = Instant::now();
        let base = Position::pack(&geometry, turn, opponent);
        let mut chosen = None;
        let mut fallback = None;
        for cell in geometry.empty_cells(all) {
            match self.outcome(base.with_low_cell(cell)) {
                Outcome::Winning => {
                    chosen = Some((cell, Outcome::Winning));
                    break;
                }
                Outcome::Draw => fallback = Some(cell),
                Outcome::Losing => {}
            }
        }

        let (cell, outcome) = match (chosen, fallback) {
            (Some(found), _) => found,
            (None, Some(cell)) => (cell, Outcome::Draw),
            (None, None) => {
                let cell = geometry.empty_cells(all).next().ok_or(Error::GameOver)?;
                (cell, Outcome::Losing)
            }
        };

        self.stats.moves_chosen += 1;
        debug!(
            cell,
            outcome = %outcome,
            elapsed_ms = start.elapsed().as_millis() as u64,
            cached = self.cache.len(),
            "move chosen"
        );
        Ok(cell)
    }

    /// Outcome of every empty cell for the player owning `turn`.
    pub fn evaluate_moves(&mut self, turn: MoveSet, opponent: MoveSet) -> Vec<(usize, Outcome)> {
        let geometry = self.geometry;
        let base = Position::pack(&geometry, turn, opponent);
        geometry
            .empty_cells(turn | opponent)
            .map(|cell| (cell, self.outcome(base.with_low_cell(cell))))
            .collect()
    }
}
