//! The session context: one board, one wedge registry, one piece per
//! player, and the session's random source.

use rand_pcg::Pcg32;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};
use trivia_rules::{
    BoardGraph, CategoryAssignment, Difficulty, DifficultyProfile, GameTurnState, NodeId,
    PlayerIndex, PlayerPiece,
};

use crate::config::EngineConfig;
use crate::error::{SaveError, SessionError};
use crate::movement::SlotGeometry;
use crate::questions::QuestionHistory;
use crate::save::SaveData;

#[derive(Debug, Clone)]
pub struct Session {
    config: EngineConfig,
    board: BoardGraph,
    state: GameTurnState,
    pieces: BTreeMap<PlayerIndex, PlayerPiece>,

    /// Restored positions waiting for their piece to register.
    pending_positions: BTreeMap<PlayerIndex, NodeId>,

    rng: Pcg32,
}

impl Session {
    pub fn new(
        config: EngineConfig,
        board: BoardGraph,
        categories: CategoryAssignment,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let state = GameTurnState::new(config.player_count, categories)?;
        let rng = config.rng();
        Ok(Self {
            config,
            board,
            state,
            pieces: BTreeMap::new(),
            pending_positions: BTreeMap::new(),
            rng,
        })
    }

    /// Rebuild a session from a save.
    ///
    /// Turn index, wedges and categories apply immediately. Positions are
    /// held until each piece registers. The question history is handed back
    /// for the question bank.
    pub fn restore(
        config: EngineConfig,
        board: BoardGraph,
        save: SaveData,
    ) -> Result<(Self, QuestionHistory), SaveError> {
        if save.player_count != config.player_count {
            return Err(SaveError::PlayerCount {
                expected: config.player_count,
                found: save.player_count,
            });
        }
        if let Some(player) = save
            .player_positions
            .keys()
            .find(|p| p.index() >= save.player_count)
        {
            return Err(SessionError::UnknownPlayer(*player).into());
        }
        if let Some((player, node)) = save
            .player_positions
            .iter()
            .find(|(_, node)| !board.contains(node))
        {
            return Err(SaveError::UnknownNode {
                player: *player,
                node: node.clone(),
            });
        }

        let mut session = Self::new(config, board, save.category_assignment)?;
        session.state.set_current_player(save.current_player)?;
        session.state.restore_wedges(&save.wedges_by_player)?;
        session.pending_positions = save.player_positions;

        info!(
            player = %save.current_player,
            pending = session.pending_positions.len(),
            "session restored"
        );
        Ok((session, save.question_history))
    }

    /// Spawn a piece for `player`: on its restored node if one is pending,
    /// on the start node otherwise.
    #[instrument(level = "debug", skip(self))]
    pub fn register_piece(&mut self, player: PlayerIndex) -> Result<&PlayerPiece, SessionError> {
        if player.index() >= self.state.player_count() {
            return Err(SessionError::UnknownPlayer(player));
        }
        if self.pieces.contains_key(&player) {
            return Err(SessionError::AlreadyRegistered(player));
        }

        let node = self
            .pending_positions
            .remove(&player)
            .unwrap_or_else(|| self.board.start_node().clone());
        self.board.occupy(&node, player)?;
        debug!(%player, %node, "piece registered");

        Ok(self
            .pieces
            .entry(player)
            .or_insert_with(|| PlayerPiece::new(player, node)))
    }

    /// Register every player that has no piece yet.
    pub fn register_all(&mut self) -> Result<(), SessionError> {
        let missing: Vec<PlayerIndex> = self
            .state
            .players()
            .filter(|p| !self.pieces.contains_key(p))
            .collect();
        for player in missing {
            self.register_piece(player)?;
        }
        Ok(())
    }

    pub fn snapshot(&self, question_history: QuestionHistory) -> SaveData {
        let mut player_positions = self.pending_positions.clone();
        player_positions.extend(
            self.pieces
                .iter()
                .map(|(player, piece)| (*player, piece.node().clone())),
        );

        SaveData {
            player_count: self.state.player_count(),
            current_player: self.state.current_player(),
            wedges_by_player: self.state.wedges_by_player(),
            player_positions,
            category_assignment: self.state.categories().clone(),
            question_history,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn board(&self) -> &BoardGraph {
        &self.board
    }

    pub fn state(&self) -> &GameTurnState {
        &self.state
    }

    pub fn piece(&self, player: PlayerIndex) -> Option<&PlayerPiece> {
        self.pieces.get(&player)
    }

    pub fn pieces(&self) -> impl Iterator<Item = &PlayerPiece> {
        self.pieces.values()
    }

    pub fn pending_position(&self, player: PlayerIndex) -> Option<&NodeId> {
        self.pending_positions.get(&player)
    }

    pub fn geometry(&self) -> SlotGeometry {
        SlotGeometry::from_config(&self.config)
    }

    pub(crate) fn sample_difficulty(&mut self, profile: DifficultyProfile) -> Difficulty {
        profile.sample(&mut self.rng)
    }

    pub(crate) fn state_mut(&mut self) -> &mut GameTurnState {
        &mut self.state
    }

    /// Board and piece together, for committing a move.
    pub(crate) fn board_and_piece(
        &mut self,
        player: PlayerIndex,
    ) -> Option<(&mut BoardGraph, &mut PlayerPiece)> {
        let piece = self.pieces.get_mut(&player)?;
        Some((&mut self.board, piece))
    }
}
