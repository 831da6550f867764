//! N-in-a-row solver CLI.
//!
//! Evaluates one position and prints the move the computer would play,
//! or classifies every opening move of an empty board.

use std::collections::HashSet;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use nrow_core::{Dim, Geometry, MoveSet};
use nrow_solver::{symmetry, Solver};

#[derive(Parser, Debug)]
#[command(name = "nrow-solver", about = "Solve 3x3 and 4x4 N-in-a-row positions")]
struct Args {
    /// Board dimension (3 or 4)
    #[arg(long, default_value_t = 3)]
    dim: usize,

    /// Cells owned by the player to move, e.g. `0,4`
    #[arg(long, value_delimiter = ',')]
    turn: Vec<usize>,

    /// Cells owned by the opponent
    #[arg(long, value_delimiter = ',')]
    opponent: Vec<usize>,

    /// Classify every first move on the empty board instead
    #[arg(long)]
    all_first_moves: bool,

    /// Seconds between progress lines during long searches
    #[arg(long, default_value_t = 5)]
    log_interval: u64,
}

fn to_move_set(geometry: &Geometry, cells: &[usize], who: &str) -> Result<MoveSet> {
    let mut moves: MoveSet = 0;
    for &cell in cells {
        if !geometry.contains(cell) {
            bail!("{} cell {} is outside the {} board", who, cell, geometry.dim());
        }
        moves |= Geometry::bit(cell);
    }
    Ok(moves)
}

fn render(geometry: &Geometry, turn: MoveSet, opponent: MoveSet) -> String {
    let dim = geometry.dim().get();
    let mut out = String::new();
    for row in 0..dim {
        for col in 0..dim {
            let bit = Geometry::bit(geometry.from_row_col(row, col));
            out.push(if turn & bit != 0 {
                'X'
            } else if opponent & bit != 0 {
                'O'
            } else {
                '.'
            });
        }
        out.push('\n');
    }
    out
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let dim = Dim::new(args.dim)?;
    let mut solver = Solver::new(dim);
    solver.set_log_interval(args.log_interval);
    let geometry = *solver.geometry();

    println!("N-in-a-row Solver");
    println!("=================");
    println!("Board: {}", dim);
    println!();

    let start = Instant::now();

    if args.all_first_moves {
        for (cell, outcome) in solver.evaluate_moves(0, 0) {
            println!(
                "  ({}, {}) -> {}",
                geometry.row(cell),
                geometry.col(cell),
                outcome
            );
        }
    } else {
        let turn = to_move_set(&geometry, &args.turn, "turn")?;
        let opponent = to_move_set(&geometry, &args.opponent, "opponent")?;
        if turn & opponent != 0 {
            bail!("turn and opponent share cells: {:?}", geometry.cells_of(turn & opponent));
        }

        print!("{}", render(&geometry, turn, opponent));
        println!();

        let cell = solver
            .choose_move(turn, opponent)
            .context("no move to choose")?;
        println!(
            "Chosen move: cell {} (row {}, col {})",
            cell,
            geometry.row(cell),
            geometry.col(cell)
        );
        println!();
        println!("Candidates:");
        for (cell, outcome) in solver.evaluate_moves(turn, opponent) {
            println!("  cell {:>2}: {}", cell, outcome);
        }
    }

    let elapsed = start.elapsed();

    println!();
    println!("=================");
    println!("Time: {:.3}s", elapsed.as_secs_f64());
    solver.stats.print_summary(solver.cache().len());
    if solver.uses_cache() {
        let classes: HashSet<u32> = solver
            .cache()
            .iter()
            .map(|(position, _)| symmetry::canonical(position.to_u32()))
            .collect();
        println!("Distinct positions up to symmetry: {}", classes.len());
    }

    Ok(())
}
