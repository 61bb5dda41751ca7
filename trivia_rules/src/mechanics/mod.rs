//! Game mechanics: node kinds, wedge colors, categories and difficulty.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of distinct wedge colors. Owning all of them wins the game.
pub const WEDGE_COLOR_COUNT: usize = 6;

/// What happens when a piece lands on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Ask a question in the node's category.
    Normal,
    /// Ask a harder question; a correct answer grants the node's wedge.
    Wedge,
    /// Roll again, no question.
    Reroll,
    /// Entry point of the steal duel.
    Start,
}

impl NodeKind {
    /// Whether nodes of this kind must carry a category color.
    pub fn requires_color(&self) -> bool {
        matches!(self, NodeKind::Normal | NodeKind::Wedge)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NodeKind::Normal => "normal",
            NodeKind::Wedge => "wedge",
            NodeKind::Reroll => "reroll",
            NodeKind::Start => "start",
        };
        write!(f, "{name}")
    }
}

/// The six wedge colors. Each color is bound to one category per game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WedgeColor {
    Blue,
    Pink,
    Yellow,
    Green,
    Orange,
    Purple,
}

impl WedgeColor {
    pub const ALL: [WedgeColor; WEDGE_COLOR_COUNT] = [
        WedgeColor::Blue,
        WedgeColor::Pink,
        WedgeColor::Yellow,
        WedgeColor::Green,
        WedgeColor::Orange,
        WedgeColor::Purple,
    ];
}

impl std::fmt::Display for WedgeColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WedgeColor::Blue => "blue",
            WedgeColor::Pink => "pink",
            WedgeColor::Yellow => "yellow",
            WedgeColor::Green => "green",
            WedgeColor::Orange => "orange",
            WedgeColor::Purple => "purple",
        };
        write!(f, "{name}")
    }
}

/// A subject domain questions are drawn from (e.g. "History").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(pub String);

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Question difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        write!(f, "{name}")
    }
}

/// Relative weights used to pick a difficulty for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

impl DifficultyProfile {
    /// 50% easy, 40% medium, 10% hard.
    pub const NORMAL: DifficultyProfile = DifficultyProfile {
        easy: 50,
        medium: 40,
        hard: 10,
    };

    /// 70% hard, 30% medium. Used for wedge nodes and steal duels.
    pub const HARD_BIASED: DifficultyProfile = DifficultyProfile {
        easy: 0,
        medium: 30,
        hard: 70,
    };

    pub fn new(easy: u32, medium: u32, hard: u32) -> Self {
        Self { easy, medium, hard }
    }

    /// Sum of all weights.
    pub fn total(&self) -> u32 {
        self.easy + self.medium + self.hard
    }

    /// A profile with no weight at all cannot be sampled.
    pub fn is_valid(&self) -> bool {
        self.total() > 0
    }

    /// Pick a difficulty with probability proportional to its weight.
    ///
    /// An invalid (all-zero) profile always yields `Medium`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Difficulty {
        let total = self.total();
        if total == 0 {
            return Difficulty::Medium;
        }

        let roll = rng.random_range(0..total);
        if roll < self.easy {
            Difficulty::Easy
        } else if roll < self.easy + self.medium {
            Difficulty::Medium
        } else {
            Difficulty::Hard
        }
    }
}
