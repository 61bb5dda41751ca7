//! Headless trivia game: random players, seeded dice, optional question file.

use anyhow::{Context, Result};
use clap::Parser;
use rand::seq::IndexedRandom;
use rand::Rng;
use rand_pcg::Pcg32;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use trivia_core::{
    seeded_rng, DeckBank, DiceOracle, Driver, DuelCandidate, EngineConfig, GameEvent,
    PumpStatus, Question, QuestionBank, QuestionDeck, QuestionError, Presentation, Responder,
    RngDice, Session, TurnMachine,
};
use trivia_rules::{
    BoardDefinition, BoardGraph, Category, CategoryAssignment, Difficulty, NodeId, PlayerIndex,
    WedgeChange, WedgeColor,
};

const DEMO_BOARD: &str = include_str!("../../boards/demo.toml");
const DEFAULT_CATEGORIES: [&str; 6] = [
    "Science",
    "Arts",
    "History",
    "Nature",
    "Sports",
    "Geography",
];

#[derive(Parser, Debug)]
#[command(name = "trivia-sim", about = "Play a headless trivia board game")]
struct Args {
    /// Board file (TOML). The built-in demo board is used otherwise.
    #[arg(long)]
    board: Option<PathBuf>,

    /// Engine configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Question file (JSON). Without it answers are coin flips.
    #[arg(long)]
    questions: Option<PathBuf>,

    /// Overrides the configured seed
    #[arg(long)]
    seed: Option<u64>,

    /// Overrides the configured player count
    #[arg(long)]
    players: Option<usize>,

    /// Maximum number of rolls before giving up
    #[arg(long, default_value_t = 500)]
    max_turns: usize,

    /// Probability that a simulated player answers correctly
    #[arg(long, default_value_t = 0.6, value_parser = parse_accuracy)]
    accuracy: f64,

    /// Write the final state as a JSON save
    #[arg(long)]
    save: Option<PathBuf>,
}

/// A probability: finite and within `0.0..=1.0`.
fn parse_accuracy(value: &str) -> Result<f64, String> {
    let accuracy: f64 = value
        .parse()
        .map_err(|e| format!("`{value}` is not a number: {e}"))?;
    if accuracy.is_finite() && (0.0..=1.0).contains(&accuracy) {
        Ok(accuracy)
    } else {
        Err(format!("`{value}` is not a probability between 0 and 1"))
    }
}

/// Random players: pick destinations and duel targets, answer questions.
struct SimulatedPlayers {
    rng: Pcg32,
    accuracy: f64,
}

impl SimulatedPlayers {
    fn new(seed: Option<u64>, accuracy: f64) -> Self {
        Self {
            rng: seeded_rng(seed),
            accuracy,
        }
    }

    fn knows_answer(&mut self) -> bool {
        self.rng.random_bool(self.accuracy)
    }
}

impl Presentation for SimulatedPlayers {
    fn prompt_selection(&mut self, _player: PlayerIndex, candidates: &[NodeId]) -> Option<NodeId> {
        candidates.choose(&mut self.rng).cloned()
    }

    fn prompt_duel_target(
        &mut self,
        _attacker: PlayerIndex,
        candidates: &[DuelCandidate],
    ) -> Option<(PlayerIndex, WedgeColor)> {
        let target = candidates.choose(&mut self.rng)?;
        let color = target.colors.choose(&mut self.rng)?;
        Some((target.player, *color))
    }

    fn wedge_changed(&mut self, change: &WedgeChange) {
        match change {
            WedgeChange::Granted { player, color } => info!(%player, %color, "wedge won"),
            WedgeChange::Transferred { from, to, color } => {
                info!(%from, %to, %color, "wedge stolen")
            }
        }
    }

    fn on_event(&mut self, event: &GameEvent) {
        debug!(?event, "event");
    }
}

/// Answers for simulated players.
struct Guesser {
    rng: Pcg32,
    accuracy: f64,
}

impl Responder for Guesser {
    fn respond(&mut self, _player: PlayerIndex, question: &Question) -> usize {
        if self.rng.random_bool(self.accuracy) || question.options.len() < 2 {
            question.correct_index
        } else {
            (question.correct_index + 1) % question.options.len()
        }
    }
}

/// Stands in for a question file.
struct CoinFlipBank(SimulatedPlayers);

impl QuestionBank for CoinFlipBank {
    fn ask(
        &mut self,
        _player: PlayerIndex,
        _category: &Category,
        _difficulty: Difficulty,
    ) -> Result<bool, QuestionError> {
        Ok(self.0.knows_answer())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            EngineConfig::from_toml_str(&source)?
        }
        None => EngineConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.rng_seed = Some(seed);
    }
    if let Some(players) = args.players {
        config.player_count = players;
    }
    config.validate()?;

    let board_source = match &args.board {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading board {}", path.display()))?,
        None => DEMO_BOARD.to_string(),
    };
    let board = BoardGraph::from_definition(BoardDefinition::from_toml_str(&board_source)?)?;
    info!(nodes = board.node_count(), players = config.player_count, "board ready");

    let seed = config.rng_seed;
    let dice = RngDice::new(seed.map(|s| s.wrapping_add(1)));
    let players = SimulatedPlayers::new(seed.map(|s| s.wrapping_add(2)), args.accuracy);

    match &args.questions {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("reading questions {}", path.display()))?;
            let deck = QuestionDeck::from_json_str(&source, seed.map(|s| s.wrapping_add(3)))?;
            let names: Vec<Category> = deck.categories().into_iter().collect();
            let categories = assign_categories(&names)?;
            let guesser = Guesser {
                rng: seeded_rng(seed.map(|s| s.wrapping_add(4))),
                accuracy: args.accuracy,
            };
            let machine = new_machine(config, board, categories)?;
            run(Driver::new(machine, dice, DeckBank::new(deck, guesser), players), &args)
        }
        None => {
            let names: Vec<Category> = DEFAULT_CATEGORIES.iter().map(|n| Category::new(*n)).collect();
            let categories = assign_categories(&names)?;
            let bank = CoinFlipBank(SimulatedPlayers::new(
                seed.map(|s| s.wrapping_add(3)),
                args.accuracy,
            ));
            let machine = new_machine(config, board, categories)?;
            run(Driver::new(machine, dice, bank, players), &args)
        }
    }
}

/// Bind the first six categories to the six colors.
fn assign_categories(names: &[Category]) -> Result<CategoryAssignment> {
    if names.len() < WedgeColor::ALL.len() {
        anyhow::bail!(
            "need {} categories, found {}",
            WedgeColor::ALL.len(),
            names.len()
        );
    }
    let pairs = WedgeColor::ALL.into_iter().zip(names.iter().cloned());
    Ok(CategoryAssignment::new(pairs)?)
}

fn new_machine(
    config: EngineConfig,
    board: BoardGraph,
    categories: CategoryAssignment,
) -> Result<TurnMachine> {
    let mut session = Session::new(config, board, categories)?;
    session.register_all()?;
    Ok(TurnMachine::new(session))
}

fn run<D, Q>(mut driver: Driver<D, Q, SimulatedPlayers>, args: &Args) -> Result<()>
where
    D: DiceOracle,
    Q: QuestionBank,
{
    let status = driver.play(args.max_turns)?;
    match status {
        PumpStatus::GameOver { winner } => println!("Player {winner} collected every wedge"),
        PumpStatus::AwaitingRoll => println!("No winner after {} rolls", args.max_turns),
        PumpStatus::Stalled => println!("Game stalled waiting for a choice"),
    }

    let state = driver.machine().session().state();
    for player in state.players() {
        let owned: Vec<String> = state
            .owned_colors(player)?
            .iter()
            .map(WedgeColor::to_string)
            .collect();
        println!("  player {player}: {} wedges [{}]", owned.len(), owned.join(", "));
    }

    if let Some(path) = &args.save {
        let json = driver.save()?.to_json()?;
        fs::write(path, json).with_context(|| format!("writing save {}", path.display()))?;
        info!(path = %path.display(), "game saved");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_must_be_a_probability() {
        assert_eq!(parse_accuracy("0.6"), Ok(0.6));
        assert_eq!(parse_accuracy("1"), Ok(1.0));
        assert!(parse_accuracy("NaN").is_err());
        assert!(parse_accuracy("inf").is_err());
        assert!(parse_accuracy("1.5").is_err());
        assert!(parse_accuracy("-0.1").is_err());
        assert!(parse_accuracy("often").is_err());
    }

    #[test]
    fn test_nan_accuracy_rejected_on_the_command_line() {
        assert!(Args::try_parse_from(["trivia-sim", "--accuracy", "NaN"]).is_err());
        let args = Args::try_parse_from(["trivia-sim", "--accuracy", "0.25"]).unwrap();
        assert_eq!(args.accuracy, 0.25);
    }
}
