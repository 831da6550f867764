//! Memoization table for solved 4x4 positions.

use std::collections::HashMap;

use nrow_core::Position;

use crate::oracle::Outcome;
use crate::symmetry;

/// Packed position -> outcome for the low-half player.
///
/// Outcomes are facts about a position, not about a game, so a table can be
/// kept for the lifetime of the process and shared by every game of the same
/// dimension. Entries are never invalidated.
#[derive(Debug, Default, Clone)]
pub struct OutcomeCache {
    table: HashMap<u32, Outcome>,
}

impl OutcomeCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, position: Position) -> Option<Outcome> {
        self.table.get(&position.to_u32()).copied()
    }

    /// Insert one entry. Re-inserting a key always carries the same outcome.
    #[inline]
    pub fn insert(&mut self, position: Position, outcome: Outcome) {
        let previous = self.table.insert(position.to_u32(), outcome);
        debug_assert!(
            previous.map_or(true, |p| p == outcome),
            "conflicting outcomes for {:#010x}",
            position.to_u32()
        );
    }

    /// Store `outcome` under all 8 symmetry images of a 4x4 position.
    pub fn record(&mut self, position: Position, outcome: Outcome) {
        for image in symmetry::images(position.to_u32()) {
            self.insert(Position::from_u32(image), outcome);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Iterate over all entries.
    pub fn iter(&self) -> impl Iterator<Item = (Position, Outcome)> + '_ {
        self.table
            .iter()
            .map(|(&bits, &outcome)| (Position::from_u32(bits), outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_insert() {
        let mut cache = OutcomeCache::new();
        assert!(cache.is_empty());
        cache.insert(Position(0b101), Outcome::Draw);
        assert_eq!(cache.get(Position(0b101)), Some(Outcome::Draw));
        assert_eq!(cache.get(Position(0b100)), None);
        cache.insert(Position(0b101), Outcome::Draw);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_record_covers_every_image() {
        let mut cache = OutcomeCache::new();
        // Asymmetric: cells 1 and 6 for the low half, cell 8 for the opponent.
        let position = Position((1 << 1) | (1 << 6) | (1 << (16 + 8)));
        cache.record(position, Outcome::Losing);
        assert_eq!(cache.len(), 8);
        for image in symmetry::images(position.to_u32()) {
            assert_eq!(cache.get(Position(image)), Some(Outcome::Losing));
        }
    }

    #[test]
    fn test_record_symmetric_position_dedups() {
        let mut cache = OutcomeCache::new();
        // Centre block of the low half is fixed by every symmetry.
        let position = Position((1 << 5) | (1 << 6) | (1 << 9) | (1 << 10));
        cache.record(position, Outcome::Winning);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.iter().next(), Some((position, Outcome::Winning)));
    }
}
