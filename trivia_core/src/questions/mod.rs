//! Question bank: questions grouped into pools by category and difficulty,
//! drawn without repetition until a pool runs dry.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};
use trivia_rules::{Category, Difficulty};

use crate::config::seeded_rng;
use crate::error::QuestionError;

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub category: Category,
    pub difficulty: Difficulty,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: usize,
}

impl Question {
    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.correct_index
    }

    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_index).map(String::as_str)
    }
}

/// Pool a question belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PoolKey {
    pub category: Category,
    pub difficulty: Difficulty,
}

impl PoolKey {
    pub fn new(category: Category, difficulty: Difficulty) -> Self {
        Self {
            category,
            difficulty,
        }
    }
}

/// Serialized form of one pool's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRecord {
    #[serde(flatten)]
    pub key: PoolKey,
    pub used: BTreeSet<usize>,
}

/// Which questions of each pool have been asked. Indices are positions
/// within the pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PoolRecord>", into = "Vec<PoolRecord>")]
pub struct QuestionHistory {
    pools: BTreeMap<PoolKey, BTreeSet<usize>>,
}

impl QuestionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn used(&self, key: &PoolKey) -> Option<&BTreeSet<usize>> {
        self.pools.get(key)
    }

    pub fn used_count(&self, key: &PoolKey) -> usize {
        self.pools.get(key).map(BTreeSet::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.pools.values().all(BTreeSet::is_empty)
    }

    fn mark(&mut self, key: &PoolKey, index: usize) {
        self.pools.entry(key.clone()).or_default().insert(index);
    }

    fn reset(&mut self, key: &PoolKey) {
        self.pools.remove(key);
    }
}

impl From<Vec<PoolRecord>> for QuestionHistory {
    fn from(records: Vec<PoolRecord>) -> Self {
        let mut history = Self::new();
        for record in records {
            history
                .pools
                .entry(record.key)
                .or_default()
                .extend(record.used);
        }
        history
    }
}

impl From<QuestionHistory> for Vec<PoolRecord> {
    fn from(history: QuestionHistory) -> Self {
        history
            .pools
            .into_iter()
            .map(|(key, used)| PoolRecord { key, used })
            .collect()
    }
}

#[derive(Deserialize)]
struct QuestionFile {
    questions: Vec<Question>,
}

/// All loaded questions plus the draw history.
#[derive(Debug, Clone)]
pub struct QuestionDeck {
    pools: BTreeMap<PoolKey, Vec<Question>>,
    history: QuestionHistory,
    rng: Pcg32,
}

impl QuestionDeck {
    pub fn new(questions: impl IntoIterator<Item = Question>, seed: Option<u64>) -> Self {
        let mut pools: BTreeMap<PoolKey, Vec<Question>> = BTreeMap::new();
        for question in questions {
            let key = PoolKey::new(question.category.clone(), question.difficulty);
            pools.entry(key).or_default().push(question);
        }
        Self {
            pools,
            history: QuestionHistory::new(),
            rng: seeded_rng(seed),
        }
    }

    /// Load `{"questions": [...]}`.
    pub fn from_json_str(source: &str, seed: Option<u64>) -> Result<Self, QuestionError> {
        let file: QuestionFile =
            serde_json::from_str(source).map_err(|e| QuestionError::Parse(e.to_string()))?;
        for question in &file.questions {
            if question.correct_option().is_none() {
                warn!(prompt = %question.prompt, "correct answer index out of range");
            }
        }
        Ok(Self::new(file.questions, seed))
    }

    /// Every category with at least one question.
    pub fn categories(&self) -> BTreeSet<Category> {
        self.pools.keys().map(|k| k.category.clone()).collect()
    }

    pub fn pool_size(&self, category: &Category, difficulty: Difficulty) -> usize {
        self.pools
            .get(&PoolKey::new(category.clone(), difficulty))
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.pools.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn history(&self) -> &QuestionHistory {
        &self.history
    }

    pub fn restore_history(&mut self, history: QuestionHistory) {
        self.history = history;
    }

    /// Draw an unused question at random. An exhausted pool starts over.
    pub fn draw(
        &mut self,
        category: &Category,
        difficulty: Difficulty,
    ) -> Result<&Question, QuestionError> {
        let key = PoolKey::new(category.clone(), difficulty);
        let pool = match self.pools.get(&key) {
            Some(pool) if !pool.is_empty() => pool,
            _ => {
                return Err(QuestionError::EmptyPool {
                    category: category.clone(),
                    difficulty,
                })
            }
        };

        let unused = |history: &QuestionHistory| -> Vec<usize> {
            (0..pool.len())
                .filter(|i| !history.used(&key).is_some_and(|used| used.contains(i)))
                .collect()
        };

        let mut candidates = unused(&self.history);
        if candidates.is_empty() {
            debug!(%category, %difficulty, "pool exhausted, starting over");
            self.history.reset(&key);
            candidates = unused(&self.history);
        }

        let index = candidates[self.rng.random_range(0..candidates.len())];
        self.history.mark(&key, index);
        Ok(&pool[index])
    }
}
