//! Exhaustive minimax solver for 3x3 and 4x4 N-in-a-row.
//!
//! - [`oracle`]: outcome of a packed position under optimal play
//! - [`symmetry`]: dihedral images of 4x4 positions
//! - [`cache`]: outcome table shared by every search of a dimension
//! - [`solver`]: move selection and the memoized search

pub mod cache;
pub mod oracle;
pub mod solver;
pub mod stats;
pub mod symmetry;

pub use cache::OutcomeCache;
pub use oracle::{check_config, Outcome};
pub use solver::Solver;
pub use stats::SolverStats;
