//! Seams to the outside world: dice, questions and presentation.

use rand::Rng;
use rand_pcg::Pcg32;
use tracing::debug;
use trivia_rules::{Category, Difficulty, NodeId, PlayerIndex, WedgeChange, WedgeColor};

use crate::config::seeded_rng;
use crate::duel::DuelCandidate;
use crate::error::{OracleError, QuestionError};
use crate::events::GameEvent;
use crate::movement::{TraversalPlan, MAX_ROLL, MIN_ROLL};
use crate::questions::{Question, QuestionDeck, QuestionHistory};

/// Produces dice results. Retries are the oracle's own business.
pub trait DiceOracle {
    fn roll(&mut self) -> Result<u8, OracleError>;
}

/// Asks a question and reports whether it was answered correctly.
pub trait QuestionBank {
    fn ask(
        &mut self,
        player: PlayerIndex,
        category: &Category,
        difficulty: Difficulty,
    ) -> Result<bool, QuestionError>;

    /// Used-question history, for saving.
    fn history(&self) -> QuestionHistory {
        QuestionHistory::default()
    }

    fn restore_history(&mut self, _history: QuestionHistory) {}
}

/// Rendering and player input. Every method has a do-nothing default.
pub trait Presentation {
    fn highlight(&mut self, _player: PlayerIndex, _nodes: &[NodeId]) {}

    fn unhighlight(&mut self, _nodes: &[NodeId]) {}

    /// Returns once all step, jump and landing visuals are done.
    fn animate_move(&mut self, _plan: &TraversalPlan) {}

    /// Pick a destination or branch. `None` leaves the choice pending.
    fn prompt_selection(&mut self, _player: PlayerIndex, _candidates: &[NodeId]) -> Option<NodeId> {
        None
    }

    fn prompt_duel_target(
        &mut self,
        _attacker: PlayerIndex,
        _candidates: &[DuelCandidate],
    ) -> Option<(PlayerIndex, WedgeColor)> {
        None
    }

    fn wedge_changed(&mut self, _change: &WedgeChange) {}

    /// Sees every event, after the specific hooks.
    fn on_event(&mut self, _event: &GameEvent) {}
}

/// Fair six-sided dice.
#[derive(Debug, Clone)]
pub struct RngDice {
    rng: Pcg32,
}

impl RngDice {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: seeded_rng(seed),
        }
    }
}

impl DiceOracle for RngDice {
    fn roll(&mut self) -> Result<u8, OracleError> {
        let value = self.rng.random_range(MIN_ROLL..=MAX_ROLL);
        debug!(value, "dice rolled");
        Ok(value)
    }
}

/// Picks an option for a question on behalf of a player.
pub trait Responder {
    fn respond(&mut self, player: PlayerIndex, question: &Question) -> usize;
}

/// A `QuestionBank` backed by an in-memory deck.
#[derive(Debug, Clone)]
pub struct DeckBank<R> {
    deck: QuestionDeck,
    responder: R,
}

impl<R: Responder> DeckBank<R> {
    pub fn new(deck: QuestionDeck, responder: R) -> Self {
        Self { deck, responder }
    }

    pub fn deck(&self) -> &QuestionDeck {
        &self.deck
    }
}

impl<R: Responder> QuestionBank for DeckBank<R> {
    fn ask(
        &mut self,
        player: PlayerIndex,
        category: &Category,
        difficulty: Difficulty,
    ) -> Result<bool, QuestionError> {
        let question = self.deck.draw(category, difficulty)?;
        let choice = self.responder.respond(player, question);
        let correct = question.is_correct(choice);
        debug!(%player, prompt = %question.prompt, choice, correct, "question answered");
        Ok(correct)
    }

    fn history(&self) -> QuestionHistory {
        self.deck.history().clone()
    }

    fn restore_history(&mut self, history: QuestionHistory) {
        self.deck.restore_history(history);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysFirst;

    impl Responder for AlwaysFirst {
        fn respond(&mut self, _player: PlayerIndex, _question: &Question) -> usize {
            0
        }
    }

    fn deck() -> QuestionDeck {
        QuestionDeck::new(
            [0, 1].map(|correct_index| Question {
                category: Category::new("Science"),
                difficulty: Difficulty::Easy,
                prompt: format!("q{correct_index}"),
                options: vec!["a".to_string(), "b".to_string()],
                correct_index,
            }),
            Some(11),
        )
    }

    #[test]
    fn test_rng_dice_stay_in_range() {
        let mut dice = RngDice::new(Some(8));
        for _ in 0..500 {
            let value = dice.roll().unwrap();
            assert!((MIN_ROLL..=MAX_ROLL).contains(&value));
        }
    }

    #[test]
    fn test_deck_bank_scores_answers() {
        let mut bank = DeckBank::new(deck(), AlwaysFirst);
        let science = Category::new("Science");

        let first = bank.ask(PlayerIndex(0), &science, Difficulty::Easy).unwrap();
        let second = bank.ask(PlayerIndex(0), &science, Difficulty::Easy).unwrap();
        // One question has index 0 correct, the other index 1
        assert_ne!(first, second);
        assert!(!bank.history().is_empty());
    }

    #[test]
    fn test_deck_bank_missing_pool() {
        let mut bank = DeckBank::new(deck(), AlwaysFirst);
        let result = bank.ask(PlayerIndex(0), &Category::new("Arts"), Difficulty::Hard);
        assert!(matches!(result, Err(QuestionError::EmptyPool { .. })));
    }

    #[test]
    fn test_history_round_trips_through_bank() {
        let mut bank = DeckBank::new(deck(), AlwaysFirst);
        bank.ask(PlayerIndex(1), &Category::new("Science"), Difficulty::Easy)
            .unwrap();
        let saved = bank.history();

        let mut fresh = DeckBank::new(deck(), AlwaysFirst);
        fresh.restore_history(saved.clone());
        assert_eq!(fresh.history(), saved);
    }
}
