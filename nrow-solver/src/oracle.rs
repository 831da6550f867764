//! Outcome oracle: exhaustive adversarial search over a packed position.
//!
//! A position is always judged for the player owning its low half, who has
//! just placed a mark. One ply deeper the halves are exchanged and the
//! opponent tries every empty cell.

use nrow_core::{Geometry, MoveSet, Position};

/// Game-theoretic value of a position for the low-half player, assuming
/// optimal play from both sides.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Outcome {
    Winning,
    Losing,
    Draw,
}

impl Outcome {
    /// Lower-case name, as reported by the CLI and the API.
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Winning => "winning",
            Outcome::Losing => "losing",
            Outcome::Draw => "draw",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check whether the position is terminal (line completed or board full).
#[inline]
pub fn is_terminal(geometry: &Geometry, position: Position, all: MoveSet) -> bool {
    geometry.is_winning(position.low(geometry)) || geometry.is_full(all)
}

/// Evaluate one ply, delegating every child position to `child`.
///
/// The win test on the low half must come before the full-board test: the
/// last mark on a full board can complete a line.
pub fn step<F>(geometry: &Geometry, position: Position, all: MoveSet, mut child: F) -> Outcome
where
    F: FnMut(Position, MoveSet) -> Outcome,
{
    if geometry.is_winning(position.low(geometry)) {
        return Outcome::Winning;
    }
    if geometry.is_full(all) {
        return Outcome::Draw;
    }

    let swapped = position.swap_halves(geometry);
    let mut result = Outcome::Winning;
    for cell in geometry.empty_cells(all) {
        match child(swapped.with_low_cell(cell), all | Geometry::bit(cell)) {
            // The opponent has a winning reply.
            Outcome::Winning => return Outcome::Losing,
            Outcome::Draw => result = Outcome::Draw,
            Outcome::Losing => {}
        }
    }
    result
}

/// Plain recursive oracle without memoization.
///
/// `all` must equal `position.occupied(geometry)`. Depth is bounded by the
/// number of empty cells.
pub fn check_config(geometry: &Geometry, position: Position, all: MoveSet) -> Outcome {
    step(geometry, position, all, |child, child_all| {
        check_config(geometry, child, child_all)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nrow_core::Dim;

    fn g3() -> Geometry {
        Geometry::new(Dim::THREE)
    }

    fn eval(g: &Geometry, low: MoveSet, high: MoveSet) -> Outcome {
        check_config(g, Position::pack(g, low, high), low | high)
    }

    #[test]
    fn test_completed_line_is_winning() {
        let g = g3();
        assert_eq!(eval(&g, 0b000_000_111, 0b000_011_000), Outcome::Winning);
    }

    #[test]
    fn test_winning_on_full_board_beats_draw() {
        let g = g3();
        // X O X / O X O / O X X: low half completes the main diagonal on the last cell.
        let x = 0b110_010_101;
        let o = 0b001_101_010;
        assert_eq!(x | o, g.all());
        assert_eq!(eval(&g, x, o), Outcome::Winning);
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        let g = g3();
        // X O X / X O O / O X X
        let x = 0b110_001_101;
        let o = 0b001_110_010;
        assert_eq!(eval(&g, x, o), Outcome::Draw);
    }

    #[test]
    fn test_opponent_immediate_win_is_losing() {
        let g = g3();
        // Low half just played 8; opponent owns 0 and 1 and completes row 0 at 2.
        assert_eq!(eval(&g, 0b100_010_000, 0b000_000_011), Outcome::Losing);
    }

    #[test]
    fn test_double_threat_is_winning() {
        let g = g3();
        // Low half owns 0, 2, 4: threatens 6 and 8, the opponent can block one.
        assert_eq!(eval(&g, 0b000_010_101, 0b000_000_010), Outcome::Winning);
    }

    #[test]
    fn test_every_first_move_draws() {
        let g = g3();
        for cell in 0..9 {
            let bit = Geometry::bit(cell);
            assert_eq!(eval(&g, bit, 0), Outcome::Draw, "first move {}", cell);
        }
    }

    #[test]
    fn test_step_short_circuits_on_opponent_win() {
        let g = g3();
        let position = Position::pack(&g, 0b000_010_000, 0b000_000_001);
        let mut calls = 0;
        let result = step(&g, position, position.occupied(&g), |_, _| {
            calls += 1;
            Outcome::Winning
        });
        assert_eq!(result, Outcome::Losing);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_step_all_losing_children_is_winning() {
        let g = g3();
        let position = Position::pack(&g, 0b000_010_000, 0b000_000_001);
        let mut children = 0;
        let result = step(&g, position, position.occupied(&g), |child, child_all| {
            children += 1;
            assert_eq!(child.high(&g), 0b000_010_000);
            assert_eq!(child.occupied(&g), child_all);
            Outcome::Losing
        });
        assert_eq!(result, Outcome::Winning);
        assert_eq!(children, 7);
    }

    #[test]
    fn test_is_terminal() {
        let g = g3();
        let won = Position::pack(&g, 0b001_001_001, 0b000_010_010);
        assert!(is_terminal(&g, won, won.occupied(&g)));
        let open = Position::pack(&g, 0b000_010_000, 0);
        assert!(!is_terminal(&g, open, open.occupied(&g)));
    }
}
