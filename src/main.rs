use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use shunting_sim::simulation::{
    apply_move, occupancy_by_vehicle, sample_history, sample_puzzle, sample_solution, verify,
    Move, MoveRecord, PuzzleSnapshot, PuzzleState, PuzzleStateSnapshot, ShuntingPuzzle,
    Solution, SolutionHistorySnapshot, SolutionSnapshot, VerifiedPuzzle,
};

#[derive(Parser)]
#[command(name = "shunting_sim")]
#[command(about = "Railway shunting puzzle simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay the reference solution of the built-in sample puzzle
    Demo {
        /// Stop after this many moves
        #[arg(long)]
        steps: Option<usize>,
    },
    /// Write the sample puzzle, with its verified solution history, as JSON
    ExportSample {
        #[arg(long)]
        out: PathBuf,
    },
    /// Check that a solution solves a puzzle
    Verify {
        #[arg(long)]
        puzzle: PathBuf,
        /// Solution file (`{"moves": [...]}`); defaults to the puzzle's
        /// embedded verified solution
        #[arg(long)]
        solution: Option<PathBuf>,
    },
    /// Apply one move and print the resulting state
    Apply {
        #[arg(long)]
        puzzle: PathBuf,
        /// State file; defaults to the puzzle's initial state
        #[arg(long)]
        state: Option<PathBuf>,
        /// Move record, e.g. `{"kind":"MoveEngine","engineId":1,"engineDirection":"Forward"}`
        #[arg(long = "move")]
        mv: String,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Demo { steps } => run_demo(steps),
        Command::ExportSample { out } => export_sample(&out),
        Command::Verify { puzzle, solution } => run_verify(&puzzle, solution.as_deref()),
        Command::Apply { puzzle, state, mv } => run_apply(&puzzle, state.as_deref(), &mv),
    }
}

/// Step through the sample solution, logging each move
fn run_demo(steps: Option<usize>) -> Result<()> {
    let puzzle = sample_puzzle().context("building sample puzzle")?;
    let solution = sample_solution();
    let limit = steps.unwrap_or(solution.moves.len());

    info!("Initial state:");
    log_summary(&puzzle, puzzle.initial_state());

    let mut state = puzzle.initial_state().clone();
    for (index, mv) in solution.moves.iter().take(limit).enumerate() {
        state = apply_move(&puzzle, &state, mv)
            .with_context(|| format!("move {} ({mv}) was rejected", index + 1))?;
        info!("--- After move {}: {mv} ---", index + 1);
        log_summary(&puzzle, &state);
    }

    info!("=== DEMO COMPLETE ===");
    info!("Goal satisfied: {}", puzzle.is_solved(&state));
    Ok(())
}

fn log_summary(puzzle: &ShuntingPuzzle, state: &PuzzleState) {
    for (vehicle, segments) in occupancy_by_vehicle(state) {
        let kind = match puzzle.rolling_stock(vehicle) {
            Some(spec) if spec.is_engine() => "engine",
            _ => "car",
        };
        info!("  {kind} {vehicle}: {}", segments.join(", "));
    }
    for (switch, index) in &state.switch_states {
        info!("  switch at {switch}: option {index}");
    }
}

fn export_sample(out: &Path) -> Result<()> {
    let puzzle = sample_puzzle().context("building sample puzzle")?;
    let history = SolutionHistorySnapshot::from_history(&sample_history());
    let verified = VerifiedPuzzle::try_create(&puzzle, &history)
        .context("sample solution does not verify")?;

    let snapshot = PuzzleSnapshot::from_puzzle(
        verified.puzzle(),
        Some(verified.solution_history().clone()),
    );
    fs::write(out, snapshot.to_json()?)
        .with_context(|| format!("writing {}", out.display()))?;
    info!("Sample puzzle written to {}", out.display());
    Ok(())
}

fn load_puzzle(path: &Path) -> Result<(ShuntingPuzzle, PuzzleSnapshot)> {
    let json =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let snapshot = PuzzleSnapshot::from_json(&json)
        .with_context(|| format!("parsing puzzle {}", path.display()))?;
    let puzzle = snapshot
        .to_puzzle()
        .with_context(|| format!("loading puzzle {}", path.display()))?;
    Ok((puzzle, snapshot))
}

fn run_verify(puzzle_path: &Path, solution_path: Option<&Path>) -> Result<()> {
    let (puzzle, snapshot) = load_puzzle(puzzle_path)?;

    let solution: Solution = match solution_path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            SolutionSnapshot::from_json(&json)
                .with_context(|| format!("parsing solution {}", path.display()))?
                .to_solution()
        }
        None => match &snapshot.verified_solution_history {
            Some(history) => history.to_history()?.current_solution().clone(),
            None => bail!("puzzle has no verified solution history; pass --solution"),
        },
    };

    let result = verify(&puzzle, &solution);
    if !result.is_valid {
        bail!(
            "move {} failed: {}: {}",
            result.failed_move_index.unwrap_or_default(),
            result.error.map(|e| e.to_string()).unwrap_or_default(),
            result.message.unwrap_or_default()
        );
    }
    if !result.is_solved {
        bail!("all {} moves applied but the goal is not satisfied", result.applied_move_count);
    }

    info!("Solution verified: {} moves, goal satisfied", result.applied_move_count);
    Ok(())
}

fn run_apply(puzzle_path: &Path, state_path: Option<&Path>, move_json: &str) -> Result<()> {
    let (puzzle, _) = load_puzzle(puzzle_path)?;

    let state = match state_path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            PuzzleStateSnapshot::from_json(&json)
                .with_context(|| format!("parsing state {}", path.display()))?
                .to_state()?
        }
        None => puzzle.initial_state().clone(),
    };

    let record = MoveRecord::from_json(move_json).context("parsing move")?;
    let mv = Move::from(&record);
    let next = apply_move(&puzzle, &state, &mv).with_context(|| format!("{mv} was rejected"))?;

    println!("{}", PuzzleStateSnapshot::from_state(&next).to_json()?);
    info!("Applied {mv}; goal satisfied: {}", puzzle.is_solved(&next));
    Ok(())
}
