//! Save snapshots.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use trivia_rules::{CategoryAssignment, NodeId, PlayerIndex, WedgeColor};

use crate::error::SaveError;
use crate::questions::QuestionHistory;

/// Everything needed to resume a game between turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveData {
    pub player_count: usize,
    pub current_player: PlayerIndex,
    pub wedges_by_player: BTreeMap<PlayerIndex, BTreeSet<WedgeColor>>,
    pub player_positions: BTreeMap<PlayerIndex, NodeId>,
    pub category_assignment: CategoryAssignment,
    #[serde(default)]
    pub question_history: QuestionHistory,
}

impl SaveData {
    pub fn to_json(&self) -> Result<String, SaveError> {
        serde_json::to_string_pretty(self).map_err(|e| SaveError::Serialize(e.to_string()))
    }

    pub fn from_json(source: &str) -> Result<Self, SaveError> {
        serde_json::from_str(source).map_err(|e| SaveError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::categories;

    #[test]
    fn test_json_shape() {
        let save = SaveData {
            player_count: 2,
            current_player: PlayerIndex(1),
            wedges_by_player: BTreeMap::from([
                (PlayerIndex(0), BTreeSet::from([WedgeColor::Blue])),
                (PlayerIndex(1), BTreeSet::new()),
            ]),
            player_positions: BTreeMap::from([
                (PlayerIndex(0), NodeId::new("n3")),
                (PlayerIndex(1), NodeId::new("s")),
            ]),
            category_assignment: categories(),
            question_history: QuestionHistory::default(),
        };

        let json = save.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["current_player"], 1);
        assert_eq!(value["wedges_by_player"]["0"][0], "blue");
        assert_eq!(value["player_positions"]["0"], "n3");
        assert_eq!(value["category_assignment"]["pink"], "Arts");

        assert_eq!(SaveData::from_json(&json).unwrap(), save);
    }

    #[test]
    fn test_missing_history_defaults() {
        let json = r#"{
            "player_count": 2,
            "current_player": 0,
            "wedges_by_player": {},
            "player_positions": {},
            "category_assignment": {"blue": "Science"}
        }"#;
        let save = SaveData::from_json(json).unwrap();
        assert!(save.question_history.is_empty());
    }

    #[test]
    fn test_malformed_save() {
        assert!(matches!(SaveData::from_json("{"), Err(SaveError::Parse(_))));
    }
}
