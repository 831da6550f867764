//! N-in-a-row game logic with bit-based board representation.
//!
//! # Board Layout
//!
//! ```text
//! Cell indices (row-major order):
//!
//!   3x3:          4x4:
//!   0 1 2          0  1  2  3
//!   3 4 5          4  5  6  7
//!   6 7 8          8  9 10 11
//!                 12 13 14 15
//! ```
//!
//! # Move Set Encoding (16-bit)
//!
//! ```text
//! Bit i set: the player owns cell i
//! Bits N-15: unused (zero), where N = dim * dim
//! ```
//!
//! # Packed Position Encoding (32-bit)
//!
//! ```text
//! Bits 0..N:   marks of the player the position is evaluated for
//! Bits N..2N:  marks of the opponent
//! Bits 2N-31:  unused (zero)
//! ```
//!
//! Exchanging the two halves hands the position to the other side, so a
//! single integer carries both the marks and whose point of view applies.

pub mod config;
pub mod error;
pub mod game;
pub mod geometry;
pub mod position;

use std::fmt;

pub use config::GameConfig;
pub use error::{Error, Result};
pub use game::{Game, Status};
pub use geometry::Geometry;
pub use position::Position;

/// Bit set over the cells of a board (bit i = cell i).
pub type MoveSet = u16;

/// Smallest supported board dimension.
pub const MIN_DIM: usize = 3;
/// Largest supported board dimension (two 16-cell halves fill a `u32`).
pub const MAX_DIM: usize = 4;
/// Number of players.
pub const NUM_PLAYERS: usize = 2;
/// Winning lines on the largest board: rows, columns and both diagonals.
pub const MAX_LINES: usize = 2 * MAX_DIM + 2;

/// Player identifier.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[repr(u8)]
pub enum Player {
    One = 1,
    Two = 2,
}

impl Player {
    /// Get the opponent player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Convert from u8 (1 or 2) to Player.
    #[inline]
    pub fn from_bits(bits: u8) -> Option<Player> {
        match bits {
            1 => Some(Player::One),
            2 => Some(Player::Two),
            _ => None,
        }
    }

    /// Zero-based index for per-player arrays.
    #[inline]
    pub fn index(self) -> usize {
        self as usize - 1
    }

    /// Both players, in turn order.
    pub fn all() -> impl Iterator<Item = Player> {
        [Player::One, Player::Two].into_iter()
    }
}

/// Validated board dimension (side length of the square board).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Dim(u8);

impl Dim {
    pub const THREE: Dim = Dim(3);
    pub const FOUR: Dim = Dim(4);

    /// Validate a board dimension.
    ///
    /// Anything outside `MIN_DIM..=MAX_DIM` is rejected: smaller boards are not
    /// games, larger ones do not fit two move sets into a packed position.
    pub fn new(dim: usize) -> Result<Dim> {
        if (MIN_DIM..=MAX_DIM).contains(&dim) {
            Ok(Dim(dim as u8))
        } else {
            Err(Error::InvalidDimension { dim })
        }
    }

    /// Side length.
    #[inline]
    pub fn get(self) -> usize {
        self.0 as usize
    }

    /// Number of cells (dim²).
    #[inline]
    pub fn cells(self) -> usize {
        self.get() * self.get()
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.0, self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_opponent() {
        assert_eq!(Player::One.opponent(), Player::Two);
        assert_eq!(Player::Two.opponent(), Player::One);
    }

    #[test]
    fn test_player_index() {
        assert_eq!(Player::One.index(), 0);
        assert_eq!(Player::Two.index(), 1);
        assert_eq!(Player::from_bits(2), Some(Player::Two));
        assert_eq!(Player::from_bits(0), None);
    }

    #[test]
    fn test_dim_validation() {
        assert!(Dim::new(3).is_ok());
        assert!(Dim::new(4).is_ok());
        for bad in [0, 1, 2, 5, 8] {
            assert!(matches!(
                Dim::new(bad),
                Err(Error::InvalidDimension { dim }) if dim == bad
            ));
        }
        assert_eq!(Dim::FOUR.cells(), 16);
        assert_eq!(Dim::THREE.to_string(), "3x3");
    }
}
