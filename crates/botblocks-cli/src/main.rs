//! botblocks command-line player.
//!
//! Provides the `botblocks` binary:
//! - `levels` prints the level catalog as JSON.
//! - `run` assembles a text program for a level, runs it to completion and
//!   prints a JSON summary.
//!
//! Reads configuration from environment variables:
//! - `BOTBLOCKS_STEP_MS`: base pause between blocks (default: 1000)
//! - `BOTBLOCKS_MAX_STEPS`: step limit per run (default: 10000)
//! - `BOTBLOCKS_DB_PATH`: SQLite score database (default: scores kept in memory)

mod script;

use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;

use botblocks_core::{Position, Rect};
use botblocks_run::{RunOutcome, RunnerConfig, Session, TraceEntry};
use botblocks_storage::{GameSpeed, InMemoryScores, ScoreStore, SqliteScores, StorageError};
use botblocks_world::{Actor, Coord, Difficulty, Direction, LevelCatalog};

const DEFAULT_MAX_STEPS: u64 = 10_000;

/// Program a robot out of a grid with snap-together blocks.
#[derive(Parser)]
#[command(name = "botblocks", about = "Program a robot out of a grid with snap-together blocks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the levels with their difficulty and best score.
    Levels {
        /// Path to the score database (overrides BOTBLOCKS_DB_PATH).
        #[arg(long)]
        db: Option<String>,
    },

    /// Run a program on a level.
    Run {
        /// Level ID.
        #[arg(short, long)]
        level: u32,

        /// The program, e.g. "move move right until-exit { move }".
        #[arg(short, long)]
        program: String,

        /// Game speed: slow, normal or fast. Saved for later runs.
        #[arg(short, long)]
        speed: Option<GameSpeed>,

        /// Include the execution trace in the summary.
        #[arg(long)]
        trace: bool,

        /// Seed for speech selection.
        #[arg(long)]
        seed: Option<u64>,

        /// Path to the score database (overrides BOTBLOCKS_DB_PATH).
        #[arg(long)]
        db: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let exit_code = match cli.command {
        Commands::Levels { db } => match db_path(db) {
            Some(path) => match SqliteScores::new(&path) {
                Ok(store) => list_levels(&store),
                Err(e) => storage_failure(&path, e),
            },
            None => list_levels(&InMemoryScores::new()),
        },
        Commands::Run {
            level,
            program,
            speed,
            trace,
            seed,
            db,
        } => {
            let options = RunOptions {
                level,
                program,
                speed,
                trace,
                seed,
            };
            match db_path(db) {
                Some(path) => match SqliteScores::new(&path) {
                    Ok(store) => run_level(store, options).await,
                    Err(e) => storage_failure(&path, e),
                },
                None => run_level(InMemoryScores::new(), options).await,
            }
        }
    };
    process::exit(exit_code);
}

fn db_path(flag: Option<String>) -> Option<String> {
    flag.or_else(|| std::env::var("BOTBLOCKS_DB_PATH").ok())
}

fn storage_failure(path: &str, e: StorageError) -> i32 {
    eprintln!("Error: failed to open score database '{}': {}", path, e);
    3
}

/// Reads an environment override, warning about values that do not parse.
fn env_override<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(name, raw, "ignoring unparsable environment override");
            None
        }
    }
}

fn runner_config(speed: GameSpeed, trace: bool, seed: Option<u64>) -> RunnerConfig {
    let defaults = RunnerConfig::default();
    RunnerConfig {
        step_delay: env_override("BOTBLOCKS_STEP_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.step_delay),
        max_steps: Some(env_override("BOTBLOCKS_MAX_STEPS").unwrap_or(DEFAULT_MAX_STEPS)),
        trace_enabled: trace,
        speed,
        speech_seed: seed,
        ..defaults
    }
}

fn print_json<T: Serialize>(value: &T) {
    let json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize result: {}\"}}", e));
    println!("{}", json);
}

#[derive(Serialize)]
struct LevelListing {
    id: u32,
    name: String,
    complexity: f32,
    difficulty: Difficulty,
    blocks: Vec<String>,
    best_score: Option<u32>,
}

/// Execute the levels subcommand. Returns 0, or 3 on a storage failure.
fn list_levels(store: &dyn ScoreStore) -> i32 {
    let mut listing = Vec::new();
    for level in LevelCatalog::seeded().iter() {
        let best_score = match store.best_score(level.id) {
            Ok(best) => best,
            Err(e) => {
                eprintln!("Error: failed to read scores: {}", e);
                return 3;
            }
        };
        listing.push(LevelListing {
            id: level.id,
            name: level.name.clone(),
            complexity: level.complexity(),
            difficulty: level.difficulty(),
            blocks: level.blocks.iter().map(|kind| kind.to_string()).collect(),
            best_score,
        });
    }
    print_json(&listing);
    0
}

struct RunOptions {
    level: u32,
    program: String,
    speed: Option<GameSpeed>,
    trace: bool,
    seed: Option<u64>,
}

#[derive(Serialize)]
struct RunSummary {
    level: u32,
    name: String,
    #[serde(flatten)]
    outcome: RunOutcome,
    blocks: usize,
    moves: u32,
    turns: u32,
    position: Coord,
    facing: Direction,
    spoken: Vec<String>,
    pressed: Vec<Coord>,
    best_score: Option<u32>,
    outline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<Vec<TraceEntry>>,
}

/// Execute the run subcommand.
///
/// Returns exit code: 0 = won, 1 = finished without winning,
/// 2 = bad input, 3 = storage failure.
async fn run_level<S: ScoreStore>(store: S, options: RunOptions) -> i32 {
    let catalog = LevelCatalog::seeded();
    let Some(level) = catalog.get(options.level).cloned() else {
        eprintln!("Error: no level with id {}", options.level);
        return 2;
    };

    let speed = match options.speed {
        Some(speed) => speed,
        None => match store.game_speed() {
            Ok(speed) => speed,
            Err(e) => {
                eprintln!("Error: failed to read settings: {}", e);
                return 3;
            }
        },
    };

    let stmts = match script::parse(&options.program) {
        Ok(stmts) => stmts,
        Err(e) => {
            eprintln!("Error: invalid program: {}", e);
            return 2;
        }
    };

    let board = Rect::around(Position::new(0.0, 0.0), 50.0, 50.0);
    let config = runner_config(speed, options.trace, options.seed);
    let mut session = match Session::new(level, board, Position::new(0.0, 45.0), store, config) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 2;
        }
    };
    if options.speed.is_some() {
        if let Err(e) = session.set_game_speed(speed) {
            eprintln!("Error: failed to save settings: {}", e);
            return 3;
        }
    }

    session.toggle_mode();
    if let Err(e) = script::assemble(&mut session, &stmts) {
        eprintln!("Error: {}", e);
        return 2;
    }
    session.toggle_mode();

    if let Err(e) = session.start_run() {
        eprintln!("Error: {}", e);
        return 2;
    }
    let outcome = match session.next_outcome().await {
        Ok(Some(outcome)) => outcome,
        Ok(None) => {
            eprintln!("Error: the run ended without reporting an outcome");
            return 1;
        }
        Err(e) => {
            eprintln!("Error: failed to record score: {}", e);
            return 3;
        }
    };

    // A win resets the robot; report it as the run left it.
    let robot = session.final_robot().cloned().unwrap_or_else(|| session.robot());
    let best_score = match session.best_score() {
        Ok(best) => best,
        Err(e) => {
            eprintln!("Error: failed to read scores: {}", e);
            return 3;
        }
    };

    let exit_code = if matches!(outcome, RunOutcome::Won { .. }) { 0 } else { 1 };
    let trace = options.trace.then(|| session.last_trace().to_vec());
    let summary = RunSummary {
        level: session.level().id,
        name: session.level().name.clone(),
        outcome,
        blocks: session.program().node_count(),
        moves: robot.moves(),
        turns: robot.turns(),
        position: robot.position(),
        facing: robot.facing(),
        spoken: robot.spoken().to_vec(),
        pressed: robot.pressed().to_vec(),
        best_score,
        outline: session.program().outline(),
        trace,
    };
    session.stop_run();
    print_json(&summary);
    exit_code
}
