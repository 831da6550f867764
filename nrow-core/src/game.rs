//! Game state: whose turn it is, the marks on the board, clocks and result.
//!
//! The solver only reads this state (the two move sets and the turn); every
//! mutation goes through [`Game::make_move`] and [`Game::update_elapsed`].

use std::time::{Duration, Instant};

use tracing::info;

use crate::{Dim, Error, GameConfig, Geometry, MoveSet, Player, Result, NUM_PLAYERS};

/// Game lifecycle.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Status {
    /// Moves are being made.
    Running,
    /// Someone completed a line, or the board filled up.
    Ended,
    /// The player on turn ran out of time.
    Timeout,
}

impl Status {
    #[inline]
    pub fn is_over(self) -> bool {
        self != Status::Running
    }
}

/// A single game between two players.
#[derive(Clone, Debug)]
pub struct Game {
    geometry: Geometry,
    /// Marks placed so far, indexed by `Player::index`
    done: [MoveSet; NUM_PLAYERS],
    turn: Player,
    winner: Option<Player>,
    status: Status,
    time_allowed: Duration,
    /// When the current player's clock last started running
    turn_started: Instant,
    elapsed: [Duration; NUM_PLAYERS],
}

impl Game {
    /// Start a game with `first` to move.
    pub fn new(config: &GameConfig, first: Player) -> Result<Game> {
        config.validate()?;
        let geometry = Geometry::new(Dim::new(config.board_dim)?);
        info!(dim = %geometry.dim(), first = ?first, "new game");
        Ok(Game {
            geometry,
            done: [0; NUM_PLAYERS],
            turn: first,
            winner: None,
            status: Status::Running,
            time_allowed: config.time_allowed(),
            turn_started: Instant::now(),
            elapsed: [Duration::ZERO; NUM_PLAYERS],
        })
    }

    /// Start a game with a randomly chosen first player.
    pub fn with_random_turn(config: &GameConfig) -> Result<Game> {
        let first = if rand::random::<bool>() {
            Player::One
        } else {
            Player::Two
        };
        Self::new(config, first)
    }

    #[inline]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    #[inline]
    pub fn dim(&self) -> Dim {
        self.geometry.dim()
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.status
    }

    /// Player to move, or None once the game is over.
    #[inline]
    pub fn turn(&self) -> Option<Player> {
        if self.status.is_over() {
            None
        } else {
            Some(self.turn)
        }
    }

    /// Winner, if any. None while running and after a draw.
    #[inline]
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// Marks placed by a player.
    #[inline]
    pub fn moves(&self, player: Player) -> MoveSet {
        self.done[player.index()]
    }

    /// All occupied cells.
    #[inline]
    pub fn occupied(&self) -> MoveSet {
        self.done[0] | self.done[1]
    }

    /// Owner of a cell, or None if empty or off the board.
    pub fn cell_player(&self, cell: usize) -> Option<Player> {
        if !self.geometry.contains(cell) {
            return None;
        }
        let bit = Geometry::bit(cell);
        Player::all().find(|p| self.done[p.index()] & bit != 0)
    }

    /// Check if a move is allowed: game running, cell on the board and empty.
    pub fn is_allowed_move(&self, cell: usize) -> bool {
        self.status == Status::Running
            && self.geometry.contains(cell)
            && self.occupied() & Geometry::bit(cell) == 0
    }

    /// Place the current player's mark on `cell`.
    pub fn make_move(&mut self, cell: usize) -> Result<()> {
        self.make_move_at(cell, Instant::now())
    }

    /// Place a mark, charging the thinking time up to `now` to the mover.
    pub fn make_move_at(&mut self, cell: usize, now: Instant) -> Result<()> {
        self.update_elapsed_at(now);
        if self.status.is_over() {
            return Err(Error::GameOver);
        }
        if !self.geometry.contains(cell) {
            return Err(Error::CellOutOfRange {
                cell,
                cells: self.geometry.cells(),
            });
        }
        let bit = Geometry::bit(cell);
        if self.occupied() & bit != 0 {
            return Err(Error::CellOccupied { cell });
        }

        let current = self.turn;
        self.done[current.index()] |= bit;
        if self.geometry.is_winning(self.done[current.index()]) {
            self.winner = Some(current);
            self.status = Status::Ended;
            info!(winner = ?current, "game won");
        } else if self.geometry.is_full(self.occupied()) {
            self.status = Status::Ended;
            info!("game drawn");
        } else {
            self.turn = current.opponent();
        }
        Ok(())
    }

    /// The completed line of the winner, if the game was won on the board.
    pub fn winning_line(&self) -> Option<MoveSet> {
        let winner = self.winner?;
        self.geometry.winning_line(self.moves(winner))
    }

    /// Time allowance per player.
    #[inline]
    pub fn time_allowed(&self) -> Duration {
        self.time_allowed
    }

    /// Time used by a player so far, never more than the allowance.
    pub fn elapsed(&self, player: Player) -> Duration {
        self.elapsed_at(player, Instant::now())
    }

    /// Time used by a player as of `now`.
    pub fn elapsed_at(&self, player: Player, now: Instant) -> Duration {
        let used = self.elapsed[player.index()];
        if self.status == Status::Running && self.turn == player {
            (used + now.saturating_duration_since(self.turn_started)).min(self.time_allowed)
        } else {
            used
        }
    }

    /// Charge the running clock to the player on turn.
    pub fn update_elapsed(&mut self) {
        self.update_elapsed_at(Instant::now());
    }

    /// Charge the running clock up to `now`; ends the game when the player on
    /// turn exceeds the allowance, awarding it to the opponent.
    pub fn update_elapsed_at(&mut self, now: Instant) {
        if self.status != Status::Running {
            return;
        }
        let current = self.turn;
        self.elapsed[current.index()] += now.saturating_duration_since(self.turn_started);
        self.turn_started = now;
        if self.elapsed[current.index()] >= self.time_allowed {
            self.elapsed[current.index()] = self.time_allowed;
            self.status = Status::Timeout;
            self.winner = Some(current.opponent());
            info!(loser = ?current, "time allowance exhausted");
        }
    }
}
