//! Turn state - whose turn it is, who owns which wedge, and whether the
//! game is over.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use crate::entities::PlayerIndex;
use crate::error::RulesError;
use crate::mechanics::{Category, WedgeColor, WEDGE_COLOR_COUNT};

/// Category bound to each wedge color, fixed for the whole game.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryAssignment {
    categories: BTreeMap<WedgeColor, Category>,
}

impl CategoryAssignment {
    /// Build an assignment. Two colors may not share a category.
    pub fn new<I>(pairs: I) -> Result<Self, RulesError>
    where
        I: IntoIterator<Item = (WedgeColor, Category)>,
    {
        let mut categories: BTreeMap<WedgeColor, Category> = BTreeMap::new();
        for (color, category) in pairs {
            if let Some((&first, _)) = categories
                .iter()
                .find(|(c, existing)| **c != color && **existing == category)
            {
                return Err(RulesError::DuplicateCategory {
                    category,
                    first,
                    second: color,
                });
            }
            categories.insert(color, category);
        }
        Ok(Self { categories })
    }

    /// Category for a color. Unmapped colors are a configuration error.
    pub fn category_for(&self, color: WedgeColor) -> Result<&Category, RulesError> {
        self.categories
            .get(&color)
            .ok_or(RulesError::UnmappedColor(color))
    }

    /// Whether all six colors have a category.
    pub fn is_complete(&self) -> bool {
        self.categories.len() == WEDGE_COLOR_COUNT
    }

    pub fn iter(&self) -> impl Iterator<Item = (&WedgeColor, &Category)> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// A change in wedge ownership, reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WedgeChange {
    Granted {
        player: PlayerIndex,
        color: WedgeColor,
    },
    Transferred {
        from: PlayerIndex,
        to: PlayerIndex,
        color: WedgeColor,
    },
}

/// Process-wide turn state of one game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTurnState {
    current_player: PlayerIndex,

    /// Owned colors, indexed by player.
    wedges: Vec<BTreeSet<WedgeColor>>,

    /// Monotonic: once set, never cleared.
    game_ended: bool,

    categories: CategoryAssignment,
}

impl GameTurnState {
    /// Create the state for a new game. Player 0 starts.
    pub fn new(player_count: usize, categories: CategoryAssignment) -> Result<Self, RulesError> {
        if player_count == 0 {
            return Err(RulesError::InvalidPlayerCount(player_count));
        }
        Ok(Self {
            current_player: PlayerIndex(0),
            wedges: vec![BTreeSet::new(); player_count],
            game_ended: false,
            categories,
        })
    }

    pub fn player_count(&self) -> usize {
        self.wedges.len()
    }

    pub fn players(&self) -> impl Iterator<Item = PlayerIndex> {
        (0..self.wedges.len()).map(PlayerIndex)
    }

    pub fn current_player(&self) -> PlayerIndex {
        self.current_player
    }

    pub fn game_ended(&self) -> bool {
        self.game_ended
    }

    pub fn categories(&self) -> &CategoryAssignment {
        &self.categories
    }

    /// Colors owned by `player`.
    pub fn owned_colors(&self, player: PlayerIndex) -> Result<&BTreeSet<WedgeColor>, RulesError> {
        self.wedges
            .get(player.index())
            .ok_or(RulesError::UnknownPlayer(player))
    }

    /// Always equal to the size of the owned-color set.
    pub fn wedge_count(&self, player: PlayerIndex) -> usize {
        self.wedges.get(player.index()).map(BTreeSet::len).unwrap_or(0)
    }

    pub fn owns(&self, player: PlayerIndex, color: WedgeColor) -> bool {
        self.wedges
            .get(player.index())
            .is_some_and(|owned| owned.contains(&color))
    }

    /// The player owning all six colors, if any.
    pub fn winner(&self) -> Option<PlayerIndex> {
        self.players()
            .find(|p| self.wedge_count(*p) >= WEDGE_COLOR_COUNT)
    }

    /// The player holding `color`, if anyone does.
    pub fn holder_of(&self, color: WedgeColor) -> Option<PlayerIndex> {
        self.players().find(|p| self.owns(*p, color))
    }

    /// Players other than `player` that own at least one wedge.
    pub fn opponents_with_wedges(&self, player: PlayerIndex) -> Vec<PlayerIndex> {
        self.players()
            .filter(|p| *p != player && self.wedge_count(*p) > 0)
            .collect()
    }

    /// Grant a wedge.
    ///
    /// A color has at most one holder. Re-granting an owned color, or one
    /// held by another player, is a no-op and returns `None`. Completing the
    /// set ends the game.
    pub fn grant_wedge(
        &mut self,
        player: PlayerIndex,
        color: WedgeColor,
    ) -> Result<Option<WedgeChange>, RulesError> {
        self.ensure_running()?;
        if player.index() >= self.wedges.len() {
            return Err(RulesError::UnknownPlayer(player));
        }
        if let Some(holder) = self.holder_of(color).filter(|holder| *holder != player) {
            debug!(%player, %color, %holder, "wedge held by another player");
            return Ok(None);
        }
        let owned = self
            .wedges
            .get_mut(player.index())
            .ok_or(RulesError::UnknownPlayer(player))?;

        if !owned.insert(color) {
            debug!(%player, %color, "wedge already owned");
            return Ok(None);
        }

        info!(%player, %color, wedges = owned.len(), "wedge granted");
        self.check_victory(player);
        Ok(Some(WedgeChange::Granted { player, color }))
    }

    /// Move a wedge from one player to another in a single step.
    ///
    /// The receiver's victory is re-checked afterwards.
    pub fn transfer_wedge(
        &mut self,
        from: PlayerIndex,
        to: PlayerIndex,
        color: WedgeColor,
    ) -> Result<WedgeChange, RulesError> {
        self.ensure_running()?;
        if from == to {
            return Err(RulesError::SelfTransfer);
        }
        if to.index() >= self.wedges.len() {
            return Err(RulesError::UnknownPlayer(to));
        }
        if !self.owned_colors(from)?.contains(&color) {
            return Err(RulesError::WedgeNotOwned {
                player: from,
                color,
            });
        }

        self.wedges[from.index()].remove(&color);
        self.wedges[to.index()].insert(color);

        info!(%from, %to, %color, "wedge transferred");
        self.check_victory(to);
        Ok(WedgeChange::Transferred { from, to, color })
    }

    /// Pass the turn to the next player.
    pub fn advance(&mut self) -> Result<PlayerIndex, RulesError> {
        self.ensure_running()?;
        self.current_player = self.current_player.next(self.player_count());
        debug!(player = %self.current_player, "turn advanced");
        Ok(self.current_player)
    }

    /// Set the current player directly (used when restoring a save).
    pub fn set_current_player(&mut self, player: PlayerIndex) -> Result<(), RulesError> {
        if player.index() >= self.player_count() {
            return Err(RulesError::UnknownPlayer(player));
        }
        self.current_player = player;
        Ok(())
    }

    /// Replace all wedge ownership (used when restoring a save).
    pub fn restore_wedges(
        &mut self,
        wedges: &BTreeMap<PlayerIndex, BTreeSet<WedgeColor>>,
    ) -> Result<(), RulesError> {
        if let Some(player) = wedges.keys().find(|p| p.index() >= self.player_count()) {
            return Err(RulesError::UnknownPlayer(*player));
        }
        let mut holders: BTreeMap<WedgeColor, PlayerIndex> = BTreeMap::new();
        for (player, owned) in wedges {
            for color in owned {
                if let Some(first) = holders.insert(*color, *player) {
                    return Err(RulesError::SharedWedge {
                        color: *color,
                        first,
                        second: *player,
                    });
                }
            }
        }
        for (i, owned) in self.wedges.iter_mut().enumerate() {
            *owned = wedges.get(&PlayerIndex(i)).cloned().unwrap_or_default();
        }
        if let Some(winner) = self.winner() {
            info!(player = %winner, "restored state already has a winner");
            self.game_ended = true;
        }
        Ok(())
    }

    /// Ownership keyed by player, for saving.
    pub fn wedges_by_player(&self) -> BTreeMap<PlayerIndex, BTreeSet<WedgeColor>> {
        self.players()
            .zip(self.wedges.iter().cloned())
            .collect()
    }

    fn check_victory(&mut self, player: PlayerIndex) {
        if self.wedge_count(player) >= WEDGE_COLOR_COUNT {
            info!(%player, "all wedges collected, game over");
            self.game_ended = true;
        }
    }

    fn ensure_running(&self) -> Result<(), RulesError> {
        if self.game_ended {
            Err(RulesError::GameEnded)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_assignment() -> CategoryAssignment {
        CategoryAssignment::new(
            WedgeColor::ALL
                .iter()
                .enumerate()
                .map(|(i, color)| (*color, Category::new(format!("cat-{i}")))),
        )
        .unwrap()
    }

    #[test]
    fn test_category_assignment() {
        let assignment = full_assignment();
        assert!(assignment.is_complete());
        assert_eq!(
            assignment.category_for(WedgeColor::Blue).unwrap(),
            &Category::new("cat-0")
        );
    }

    #[test]
    fn test_unmapped_color() {
        let assignment =
            CategoryAssignment::new([(WedgeColor::Blue, Category::new("History"))]).unwrap();
        assert!(!assignment.is_complete());
        assert_eq!(
            assignment.category_for(WedgeColor::Green).unwrap_err(),
            RulesError::UnmappedColor(WedgeColor::Green)
        );
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let result = CategoryAssignment::new([
            (WedgeColor::Blue, Category::new("History")),
            (WedgeColor::Pink, Category::new("History")),
        ]);
        assert!(matches!(result, Err(RulesError::DuplicateCategory { .. })));
    }

    #[test]
    fn test_grant_is_idempotent() {
        let mut state = GameTurnState::new(2, full_assignment()).unwrap();

        let first = state.grant_wedge(PlayerIndex(0), WedgeColor::Blue).unwrap();
        assert!(first.is_some());
        let second = state.grant_wedge(PlayerIndex(0), WedgeColor::Blue).unwrap();
        assert!(second.is_none());

        assert_eq!(state.wedge_count(PlayerIndex(0)), 1);
        assert_eq!(state.owned_colors(PlayerIndex(0)).unwrap().len(), 1);
    }

    #[test]
    fn test_grant_skips_color_held_elsewhere() {
        let mut state = GameTurnState::new(3, full_assignment()).unwrap();
        state.grant_wedge(PlayerIndex(1), WedgeColor::Pink).unwrap();

        assert_eq!(state.grant_wedge(PlayerIndex(0), WedgeColor::Pink).unwrap(), None);
        assert!(!state.owns(PlayerIndex(0), WedgeColor::Pink));
        assert_eq!(state.holder_of(WedgeColor::Pink), Some(PlayerIndex(1)));
        assert_eq!(state.holder_of(WedgeColor::Blue), None);
        assert_eq!(
            state.grant_wedge(PlayerIndex(4), WedgeColor::Blue).unwrap_err(),
            RulesError::UnknownPlayer(PlayerIndex(4))
        );
    }

    #[test]
    fn test_six_wedges_win() {
        let mut state = GameTurnState::new(2, full_assignment()).unwrap();

        for color in WedgeColor::ALL {
            assert!(!state.game_ended());
            state.grant_wedge(PlayerIndex(1), color).unwrap();
        }

        assert!(state.game_ended());
        assert_eq!(state.winner(), Some(PlayerIndex(1)));
        assert_eq!(state.advance().unwrap_err(), RulesError::GameEnded);
        assert_eq!(
            state.grant_wedge(PlayerIndex(0), WedgeColor::Blue).unwrap_err(),
            RulesError::GameEnded
        );
    }

    #[test]
    fn test_transfer_moves_color() {
        let mut state = GameTurnState::new(3, full_assignment()).unwrap();
        state.grant_wedge(PlayerIndex(2), WedgeColor::Orange).unwrap();

        let change = state
            .transfer_wedge(PlayerIndex(2), PlayerIndex(0), WedgeColor::Orange)
            .unwrap();

        assert_eq!(
            change,
            WedgeChange::Transferred {
                from: PlayerIndex(2),
                to: PlayerIndex(0),
                color: WedgeColor::Orange
            }
        );
        assert!(!state.owns(PlayerIndex(2), WedgeColor::Orange));
        assert!(state.owns(PlayerIndex(0), WedgeColor::Orange));
        assert_eq!(state.wedge_count(PlayerIndex(2)), 0);
    }

    #[test]
    fn test_transfer_requires_ownership() {
        let mut state = GameTurnState::new(2, full_assignment()).unwrap();
        assert!(matches!(
            state.transfer_wedge(PlayerIndex(1), PlayerIndex(0), WedgeColor::Pink),
            Err(RulesError::WedgeNotOwned { .. })
        ));
        assert_eq!(
            state
                .transfer_wedge(PlayerIndex(1), PlayerIndex(1), WedgeColor::Pink)
                .unwrap_err(),
            RulesError::SelfTransfer
        );
    }

    #[test]
    fn test_transfer_can_win() {
        let mut state = GameTurnState::new(2, full_assignment()).unwrap();
        for color in &WedgeColor::ALL[..5] {
            state.grant_wedge(PlayerIndex(0), *color).unwrap();
        }
        state.grant_wedge(PlayerIndex(1), WedgeColor::Purple).unwrap();

        state
            .transfer_wedge(PlayerIndex(1), PlayerIndex(0), WedgeColor::Purple)
            .unwrap();
        assert!(state.game_ended());
        assert_eq!(state.winner(), Some(PlayerIndex(0)));
    }

    #[test]
    fn test_advance_wraps() {
        let mut state = GameTurnState::new(3, full_assignment()).unwrap();
        assert_eq!(state.advance().unwrap(), PlayerIndex(1));
        assert_eq!(state.advance().unwrap(), PlayerIndex(2));
        assert_eq!(state.advance().unwrap(), PlayerIndex(0));
    }

    #[test]
    fn test_opponents_with_wedges() {
        let mut state = GameTurnState::new(4, full_assignment()).unwrap();
        state.grant_wedge(PlayerIndex(0), WedgeColor::Blue).unwrap();
        state.grant_wedge(PlayerIndex(2), WedgeColor::Green).unwrap();

        assert_eq!(state.opponents_with_wedges(PlayerIndex(0)), vec![PlayerIndex(2)]);
        assert_eq!(
            state.opponents_with_wedges(PlayerIndex(1)),
            vec![PlayerIndex(0), PlayerIndex(2)]
        );
    }

    #[test]
    fn test_restore_wedges() {
        let mut state = GameTurnState::new(2, full_assignment()).unwrap();
        let mut saved = BTreeMap::new();
        saved.insert(PlayerIndex(1), BTreeSet::from([WedgeColor::Yellow, WedgeColor::Pink]));

        state.restore_wedges(&saved).unwrap();
        assert_eq!(state.wedge_count(PlayerIndex(1)), 2);
        assert_eq!(state.wedge_count(PlayerIndex(0)), 0);

        saved.insert(PlayerIndex(0), BTreeSet::from([WedgeColor::Pink]));
        assert_eq!(
            state.restore_wedges(&saved).unwrap_err(),
            RulesError::SharedWedge {
                color: WedgeColor::Pink,
                first: PlayerIndex(0),
                second: PlayerIndex(1),
            }
        );
        assert_eq!(state.wedge_count(PlayerIndex(1)), 2);

        saved.remove(&PlayerIndex(0));
        saved.insert(PlayerIndex(5), BTreeSet::new());
        assert_eq!(
            state.restore_wedges(&saved).unwrap_err(),
            RulesError::UnknownPlayer(PlayerIndex(5))
        );
    }
}
