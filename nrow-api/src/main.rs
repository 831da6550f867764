//! N-in-a-row Web API
//!
//! Serves one game session over REST and lets the computer play either side.
//! One solver per board dimension lives for the whole process, so positions
//! solved in one game are reused by every later game of the same size.

use std::collections::HashMap;
use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nrow_core::{Dim, Game, GameConfig, Player, Status, MAX_DIM, MIN_DIM};
use nrow_solver::{Outcome, Solver};

// =============================================================================
// Session State
// =============================================================================

/// The game being played
struct GameSession {
    game: Game,
    /// Cells played so far, in order
    history: Vec<usize>,
    /// Bumped on every change; a computer move computed against an older
    /// generation is discarded
    generation: u64,
}

impl GameSession {
    fn new(game: Game) -> Self {
        Self {
            game,
            history: Vec::new(),
            generation: 0,
        }
    }

    fn reset(&mut self, game: Game) {
        self.game = game;
        self.history.clear();
        self.generation += 1;
    }

    fn play(&mut self, cell: usize) -> nrow_core::Result<()> {
        self.game.make_move(cell)?;
        self.history.push(cell);
        self.generation += 1;
        Ok(())
    }
}

type SharedSolver = Arc<Mutex<Solver>>;

/// Shared application state
struct AppStateInner {
    session: Mutex<GameSession>,
    /// One solver per supported dimension, keyed by side length
    solvers: HashMap<usize, SharedSolver>,
    /// Defaults for new games
    config: GameConfig,
}

impl AppStateInner {
    fn new(config: GameConfig) -> nrow_core::Result<Self> {
        let game = Game::with_random_turn(&config)?;
        let solvers = (MIN_DIM..=MAX_DIM)
            .map(|dim| -> nrow_core::Result<(usize, SharedSolver)> {
                Ok((dim, Arc::new(Mutex::new(Solver::for_dim(dim)?))))
            })
            .collect::<nrow_core::Result<HashMap<_, _>>>()?;
        Ok(Self {
            session: Mutex::new(GameSession::new(game)),
            solvers,
            config,
        })
    }
}

type AppState = Arc<AppStateInner>;

/// Lock a mutex, recovering the data if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// =============================================================================
// JSON Models
// =============================================================================

#[derive(Serialize, Debug)]
struct GameStateModel {
    dim: usize,
    /// Rows of cells: 0 = empty, 1/2 = owning player
    board: Vec<Vec<u8>>,
    /// None once the game is over
    current_player: Option<u8>,
    status: String,
    result: String,
    /// Cells of the completed line, if the game was won on the board
    #[serde(skip_serializing_if = "Option::is_none")]
    winning_line: Option<Vec<(usize, usize)>>,
    /// Seconds used by player 1 and player 2
    elapsed_secs: [f64; 2],
    time_allowed_secs: f64,
    move_count: usize,
}

#[derive(Serialize, Debug)]
struct LegalMoveModel {
    row: usize,
    col: usize,
    /// Outcome for the player to move: "winning", "losing" or "draw"
    #[serde(skip_serializing_if = "Option::is_none")]
    evaluation: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct MovesQuery {
    #[serde(default)]
    evaluate: bool,
}

#[derive(Deserialize, Debug)]
struct MoveRequest {
    row: usize,
    col: usize,
}

#[derive(Serialize, Debug)]
struct ComputerMoveModel {
    row: usize,
    col: usize,
    game: GameStateModel,
}

#[derive(Deserialize, Debug, Default)]
struct ResetRequest {
    /// Board dimension; the configured default when absent
    #[serde(default)]
    dim: Option<usize>,
    /// Player to move first (1 or 2); random when absent
    #[serde(default)]
    first: Option<u8>,
}

#[derive(Serialize, Debug)]
struct HealthModel {
    status: String,
}

#[derive(Serialize, Debug)]
struct ErrorModel {
    detail: String,
}

type ApiError = (StatusCode, Json<ErrorModel>);

fn error(status: StatusCode, detail: impl Display) -> ApiError {
    (
        status,
        Json(ErrorModel {
            detail: detail.to_string(),
        }),
    )
}

fn bad_request(detail: impl Display) -> ApiError {
    error(StatusCode::BAD_REQUEST, detail)
}

// =============================================================================
// Conversion Functions
// =============================================================================

/// Convert the session to a JSON-serializable GameStateModel
fn game_to_model(session: &GameSession) -> GameStateModel {
    let game = &session.game;
    let geometry = game.geometry();
    let dim = geometry.dim().get();

    let board = (0..dim)
        .map(|row| {
            (0..dim)
                .map(|col| {
                    game.cell_player(geometry.from_row_col(row, col))
                        .map_or(0, |p| p as u8)
                })
                .collect()
        })
        .collect();

    let result = match (game.status(), game.winner()) {
        (Status::Running, _) => "ongoing",
        (_, Some(Player::One)) => "player_one_wins",
        (_, Some(Player::Two)) => "player_two_wins",
        (_, None) => "draw",
    };

    let status = match game.status() {
        Status::Running => "running",
        Status::Ended => "ended",
        Status::Timeout => "timeout",
    };

    let winning_line = game.winning_line().map(|line| {
        geometry
            .cells_of(line)
            .into_iter()
            .map(|cell| (geometry.row(cell), geometry.col(cell)))
            .collect()
    });

    GameStateModel {
        dim,
        board,
        current_player: game.turn().map(|p| p as u8),
        status: status.to_string(),
        result: result.to_string(),
        winning_line,
        elapsed_secs: [
            game.elapsed(Player::One).as_secs_f64(),
            game.elapsed(Player::Two).as_secs_f64(),
        ],
        time_allowed_secs: game.time_allowed().as_secs_f64(),
        move_count: session.history.len(),
    }
}

fn solver_for(state: &AppStateInner, dim: Dim) -> Result<SharedSolver, ApiError> {
    state.solvers.get(&dim.get()).cloned().ok_or_else(|| {
        error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("no solver for {} boards", dim),
        )
    })
}

/// Run a search off the async runtime.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("solver task failed: {}", e),
        )
    })
}

// =============================================================================
// API Endpoints
// =============================================================================

async fn get_game(State(state): State<AppState>) -> Json<GameStateModel> {
    let mut session = lock(&state.session);
    session.game.update_elapsed();
    Json(game_to_model(&session))
}

async fn get_moves(
    State(state): State<AppState>,
    Query(query): Query<MovesQuery>,
) -> Result<Json<Vec<LegalMoveModel>>, ApiError> {
    let (geometry, turn, opponent) = {
        let mut session = lock(&state.session);
        session.game.update_elapsed();
        let game = &session.game;
        let Some(player) = game.turn() else {
            return Ok(Json(Vec::new()));
        };
        (*game.geometry(), game.moves(player), game.moves(player.opponent()))
    };

    let evaluations: HashMap<usize, Outcome> = if query.evaluate {
        let solver = solver_for(&state, geometry.dim())?;
        run_blocking(move || lock(&solver).evaluate_moves(turn, opponent))
            .await?
            .into_iter()
            .collect()
    } else {
        HashMap::new()
    };

    let moves = geometry
        .empty_cells(turn | opponent)
        .map(|cell| LegalMoveModel {
            row: geometry.row(cell),
            col: geometry.col(cell),
            evaluation: evaluations.get(&cell).map(|o| o.as_str().to_string()),
        })
        .collect();

    Ok(Json(moves))
}

async fn make_move(
    State(state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<GameStateModel>, ApiError> {
    let mut session = lock(&state.session);
    let dim = session.game.dim();
    if req.row >= dim.get() || req.col >= dim.get() {
        return Err(bad_request(format!(
            "({}, {}) is outside the {} board",
            req.row, req.col, dim
        )));
    }

    let cell = session.game.geometry().from_row_col(req.row, req.col);
    session.play(cell).map_err(bad_request)?;
    Ok(Json(game_to_model(&session)))
}

async fn computer_move(
    State(state): State<AppState>,
) -> Result<Json<ComputerMoveModel>, ApiError> {
    let (dim, turn, opponent, generation) = {
        let mut session = lock(&state.session);
        session.game.update_elapsed();
        let game = &session.game;
        let player = game
            .turn()
            .ok_or_else(|| bad_request(nrow_core::Error::GameOver))?;
        (
            game.dim(),
            game.moves(player),
            game.moves(player.opponent()),
            session.generation,
        )
    };

    let solver = solver_for(&state, dim)?;
    let cell = run_blocking(move || lock(&solver).choose_move(turn, opponent))
        .await?
        .map_err(bad_request)?;

    let mut session = lock(&state.session);
    if session.generation != generation {
        warn!(cell, "game changed during search, discarding computer move");
        return Err(error(
            StatusCode::CONFLICT,
            "game changed while the computer was thinking",
        ));
    }
    session.play(cell).map_err(bad_request)?;
    info!(cell, "computer move");

    let geometry = *session.game.geometry();
    Ok(Json(ComputerMoveModel {
        row: geometry.row(cell),
        col: geometry.col(cell),
        game: game_to_model(&session),
    }))
}

/// Start a new game. The body is optional: `{}` or empty keeps the configured
/// dimension and picks the first player at random.
async fn reset_game(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GameStateModel>, ApiError> {
    let req: ResetRequest = if body.is_empty() {
        ResetRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(bad_request)?
    };

    let mut config = state.config.clone();
    if let Some(dim) = req.dim {
        config.board_dim = dim;
    }
    let game = match req.first {
        None => Game::with_random_turn(&config),
        Some(bits) => {
            let first = Player::from_bits(bits)
                .ok_or_else(|| bad_request(format!("unknown player {}", bits)))?;
            Game::new(&config, first)
        }
    }
    .map_err(bad_request)?;

    let mut session = lock(&state.session);
    session.reset(game);
    Ok(Json(game_to_model(&session)))
}

async fn health() -> Json<HealthModel> {
    Json(HealthModel {
        status: "ok".to_string(),
    })
}

// =============================================================================
// Main
// =============================================================================

#[derive(Parser, Debug)]
#[command(name = "nrow-api", about = "Play N-in-a-row against the solver over HTTP")]
struct Args {
    /// TOML game configuration; defaults are used when absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8000")]
    bind: SocketAddr,
}

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/game", get(get_game))
        .route("/moves", get(get_moves))
        .route("/move", post(make_move))
        .route("/computer-move", post(computer_move))
        .route("/reset", post(reset_game))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => GameConfig::load_or_default(path)?,
        None => GameConfig::default(),
    };
    info!(
        dim = config.board_dim,
        time_allowed_secs = config.time_allowed_secs,
        "configuration loaded"
    );

    let state: AppState = Arc::new(AppStateInner::new(config)?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    info!(addr = %args.bind, "N-in-a-row API running");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fresh state with player 1 (the human in these tests) to move.
    fn test_state() -> AppState {
        let state = AppStateInner::new(GameConfig::default()).unwrap();
        let game = Game::new(&state.config, Player::One).unwrap();
        lock(&state.session).reset(game);
        Arc::new(state)
    }

    async fn play(state: &AppState, row: usize, col: usize) -> Result<GameStateModel, ApiError> {
        make_move(State(state.clone()), Json(MoveRequest { row, col }))
            .await
            .map(|json| json.0)
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(health().await.0.status, "ok");
    }

    #[tokio::test]
    async fn test_new_game_state() {
        let state = test_state();
        let model = get_game(State(state)).await.0;
        assert_eq!(model.dim, 3);
        assert_eq!(model.board, vec![vec![0; 3]; 3]);
        assert_eq!(model.current_player, Some(1));
        assert_eq!(model.status, "running");
        assert_eq!(model.result, "ongoing");
        assert_eq!(model.move_count, 0);
        assert_eq!(model.time_allowed_secs, 100.0);
        assert!(model.winning_line.is_none());
    }

    #[tokio::test]
    async fn test_make_move_and_reject_occupied() {
        let state = test_state();
        let model = play(&state, 1, 1).await.unwrap();
        assert_eq!(model.board[1][1], 1);
        assert_eq!(model.current_player, Some(2));

        let (status, _) = play(&state, 1, 1).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = play(&state, 3, 0).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_win_reports_line() {
        let state = test_state();
        for (row, col) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            play(&state, row, col).await.unwrap();
        }
        let model = play(&state, 0, 2).await.unwrap();
        assert_eq!(model.status, "ended");
        assert_eq!(model.result, "player_one_wins");
        assert_eq!(model.current_player, None);
        assert_eq!(model.winning_line, Some(vec![(0, 0), (0, 1), (0, 2)]));

        let (status, _) = play(&state, 2, 2).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = computer_move(State(state.clone())).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_moves_with_evaluation() {
        let state = test_state();
        play(&state, 0, 0).await.unwrap();

        let plain = get_moves(State(state.clone()), Query(MovesQuery::default()))
            .await
            .unwrap()
            .0;
        assert_eq!(plain.len(), 8);
        assert!(plain.iter().all(|m| m.evaluation.is_none()));

        // Against a corner opening only the centre holds the draw.
        let evaluated = get_moves(State(state.clone()), Query(MovesQuery { evaluate: true }))
            .await
            .unwrap()
            .0;
        for m in &evaluated {
            let expected = if (m.row, m.col) == (1, 1) { "draw" } else { "losing" };
            assert_eq!(m.evaluation.as_deref(), Some(expected), "({}, {})", m.row, m.col);
        }
    }

    #[tokio::test]
    async fn test_computer_defends() {
        let state = test_state();
        play(&state, 0, 0).await.unwrap();
        let reply = computer_move(State(state.clone())).await.unwrap().0;
        assert_eq!((reply.row, reply.col), (1, 1));

        play(&state, 0, 1).await.unwrap();
        let reply = computer_move(State(state.clone())).await.unwrap().0;
        assert_eq!((reply.row, reply.col), (0, 2));
        assert_eq!(reply.game.board[0], vec![1, 1, 2]);
        assert_eq!(reply.game.move_count, 4);
        assert_eq!(reply.game.current_player, Some(1));
    }

    #[tokio::test]
    async fn test_computer_opens_in_a_corner() {
        let state = test_state();
        let reply = computer_move(State(state)).await.unwrap().0;
        assert!([(0, 0), (0, 2), (2, 0), (2, 2)].contains(&(reply.row, reply.col)));
    }

    #[tokio::test]
    async fn test_reset_with_dimension() {
        let state = test_state();
        play(&state, 0, 0).await.unwrap();

        let body = Bytes::from_static(br#"{"dim": 4, "first": 2}"#);
        let model = reset_game(State(state.clone()), body).await.unwrap().0;
        assert_eq!(model.dim, 4);
        assert_eq!(model.board.len(), 4);
        assert_eq!(model.current_player, Some(2));
        assert_eq!(model.move_count, 0);

        let model = reset_game(State(state.clone()), Bytes::new()).await.unwrap().0;
        assert_eq!(model.dim, 3);
    }

    #[tokio::test]
    async fn test_reset_rejects_bad_input() {
        let state = test_state();
        for body in [r#"{"dim": 5}"#, r#"{"first": 3}"#, "not json"] {
            let (status, _) = reset_game(State(state.clone()), Bytes::from(body))
                .await
                .unwrap_err();
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        }
    }

    #[test]
    fn test_one_solver_per_dimension() {
        let state = AppStateInner::new(GameConfig::default()).unwrap();
        assert_eq!(state.solvers.len(), 2);
        assert!(solver_for(&state, Dim::THREE).is_ok());
        assert!(solver_for(&state, Dim::FOUR).is_ok());
    }
}
