//! # Trivia Core
//!
//! The turn engine for the trivia board game. It resolves dice rolls into
//! moves over a [`trivia_rules::BoardGraph`], plans jumps and piece slots,
//! sequences turns, questions and steal duels, and snapshots sessions.
//!
//! The engine never blocks. A [`TurnMachine`] names the one input it is
//! waiting for in its [`Phase`]; the embedding application (or the bundled
//! [`Driver`]) supplies dice results, selections, animation completion and
//! answers through the machine's input methods.

pub mod collaborators;
pub mod config;
pub mod driver;
pub mod duel;
pub mod error;
pub mod events;
pub mod movement;
pub mod questions;
pub mod save;
pub mod session;
pub mod turn;

#[cfg(test)]
mod fixtures;

pub use collaborators::*;
pub use config::*;
pub use driver::*;
pub use duel::*;
pub use error::*;
pub use events::*;
pub use movement::*;
pub use questions::*;
pub use save::*;
pub use session::*;
pub use turn::*;
