//! Both players' move sets packed into one integer.
//!
//! See the crate documentation for the bit layout.

use crate::{Geometry, MoveSet};

/// Both players' move sets packed into one integer.
///
/// See module documentation for the encoding. The low half belongs to the
/// player the position is evaluated for.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Position(pub u32);

impl Position {
    /// Pack two disjoint move sets.
    #[inline]
    pub fn pack(geometry: &Geometry, low: MoveSet, high: MoveSet) -> Position {
        debug_assert_eq!(low & high, 0, "a cell cannot belong to both players");
        Position(low as u32 | ((high as u32) << geometry.cells()))
    }

    /// Create a position from a raw u32 encoding.
    #[inline]
    pub fn from_u32(bits: u32) -> Position {
        Position(bits)
    }

    /// Get the raw u32 encoding.
    #[inline]
    pub fn to_u32(self) -> u32 {
        self.0
    }

    /// Marks of the player the position is evaluated for.
    #[inline]
    pub fn low(self, geometry: &Geometry) -> MoveSet {
        (self.0 & geometry.all() as u32) as MoveSet
    }

    /// Marks of the opponent.
    #[inline]
    pub fn high(self, geometry: &Geometry) -> MoveSet {
        (self.0 >> geometry.cells()) as MoveSet
    }

    /// Union of both halves.
    #[inline]
    pub fn occupied(self, geometry: &Geometry) -> MoveSet {
        self.low(geometry) | self.high(geometry)
    }

    /// Exchange the halves: the opponent becomes the low-half player.
    #[inline]
    pub fn swap_halves(self, geometry: &Geometry) -> Position {
        let n = geometry.cells() as u32;
        Position(((self.0 & geometry.all() as u32) << n) | (self.0 >> n))
    }

    /// Add a mark for the low-half player.
    #[inline]
    pub fn with_low_cell(self, cell: usize) -> Position {
        Position(self.0 | (1 << cell))
    }
}
