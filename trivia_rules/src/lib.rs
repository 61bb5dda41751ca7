//! # Trivia Rules
//!
//! The rules crate for the trivia board game - node kinds, wedge colors,
//! categories, the board graph with its occupancy bookkeeping, and the
//! per-session wedge registry.
//! This crate is the single source of truth for board and wedge state and
//! does not contain any turn sequencing or collaborator logic.

pub mod board;
pub mod entities;
pub mod error;
pub mod mechanics;
pub mod turn_state;

pub use board::*;
pub use entities::*;
pub use error::*;
pub use mechanics::*;
pub use turn_state::*;
