use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;

use super::*;

/// Neighborhood pattern around a cell: each of the 8 neighbors is hidden,
/// revealed, or off the board, packed in base 3.
pub type PatternKey = u16;

const HIDDEN: PatternKey = 0;
const REVEALED: PatternKey = 1;
const OFF_BOARD: PatternKey = 2;

const OFFSETS: [(i16, i16); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

pub fn pattern_key(revealed: &RevealState, (row, col): Coord2) -> PatternKey {
    let (rows, cols) = revealed.size();
    OFFSETS.iter().fold(0, |key, &(d_row, d_col)| {
        let r = i16::from(row) + d_row;
        let c = i16::from(col) + d_col;
        let digit = if r < 0 || c < 0 || r >= i16::from(rows) || c >= i16::from(cols) {
            OFF_BOARD
        } else if revealed.is_revealed((r as Coord, c as Coord)) {
            REVEALED
        } else {
            HIDDEN
        };
        key * 3 + digit
    })
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternAgentConfig {
    pub learning_rate: f64,
    /// Starting exploration rate.
    pub epsilon: f64,
    /// Multiplied into epsilon after every update.
    pub epsilon_decay: f64,
    pub min_epsilon: f64,
    pub seed: u64,
}

impl Default for PatternAgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            epsilon: 1.0,
            epsilon_decay: 0.9995,
            min_epsilon: 0.05,
            seed: 0,
        }
    }
}

impl PatternAgentConfig {
    /// Every rate must lie within `0..=1`. NaN is rejected.
    pub fn validate(&self) -> AgentResult<()> {
        let check = |name, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(AgentError::InvalidSetting {
                    name,
                    value,
                    min: 0.0,
                    max: 1.0,
                })
            }
        };
        check("learning_rate", self.learning_rate)?;
        check("epsilon", self.epsilon)?;
        check("epsilon_decay", self.epsilon_decay)?;
        check("min_epsilon", self.min_epsilon)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternValue {
    pub value: f64,
    pub visits: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedPatternModel {
    pub version: u32,
    pub board: Coord2,
    pub epsilon: f64,
    pub updates: u64,
    pub saved_at: DateTime<Utc>,
    pub values: HashMap<PatternKey, PatternValue>,
}

impl SavedPatternModel {
    pub const VERSION: u32 = 1;
}

/// Tabular learner valuing a hidden cell by the revealed pattern around it.
///
/// Values are running averages of the reward each pattern earned, moves are
/// epsilon-greedy over the hidden cells.
#[derive(Clone, Debug)]
pub struct PatternAgent {
    config: PatternAgentConfig,
    board: Coord2,
    model_path: Option<PathBuf>,
    values: HashMap<PatternKey, PatternValue>,
    epsilon: f64,
    updates: u64,
    rng: SmallRng,
}

impl PatternAgent {
    pub fn new(board: Coord2, config: PatternAgentConfig) -> Self {
        Self {
            config,
            board,
            model_path: None,
            values: HashMap::new(),
            epsilon: config.epsilon,
            updates: 0,
            rng: SmallRng::seed_from_u64(config.seed),
        }
    }

    /// Persists to and restores from `path` in `save_model`/`load_model`.
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = Some(path.into());
        self
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn value_of(&self, key: PatternKey) -> Option<PatternValue> {
        self.values.get(&key).copied()
    }

    pub fn known_patterns(&self) -> usize {
        self.values.len()
    }

    pub fn export_model(&self) -> SavedPatternModel {
        SavedPatternModel {
            version: SavedPatternModel::VERSION,
            board: self.board,
            epsilon: self.epsilon,
            updates: self.updates,
            saved_at: Utc::now(),
            values: self.values.clone(),
        }
    }

    pub fn import_model(&mut self, model: SavedPatternModel) -> AgentResult<()> {
        if model.version != SavedPatternModel::VERSION {
            return Err(AgentError::UnsupportedVersion {
                found: model.version,
                expected: SavedPatternModel::VERSION,
            });
        }
        if model.board != self.board {
            return Err(AgentError::BoardMismatch {
                trained: model.board,
                current: self.board,
            });
        }

        self.epsilon = model.epsilon;
        self.updates = model.updates;
        self.values = model.values;
        Ok(())
    }

    fn estimate(&self, revealed: &RevealState, coords: Coord2) -> f64 {
        self.values
            .get(&pattern_key(revealed, coords))
            .map_or(0.0, |entry| entry.value)
    }

    fn read_model(path: &Path) -> AgentResult<SavedPatternModel> {
        let file = File::open(path).map_err(|source| AgentError::Io {
            operation: format!("open model {}", path.display()),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    fn write_model(&self, path: &Path) -> AgentResult<()> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| AgentError::Io {
                operation: format!("create directory {}", parent.display()),
                source,
            })?;
        }

        let file = File::create(path).map_err(|source| AgentError::Io {
            operation: format!("create model {}", path.display()),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.export_model())?;
        writer.flush().map_err(|source| AgentError::Io {
            operation: format!("write model {}", path.display()),
            source,
        })
    }
}

impl Agent for PatternAgent {
    fn name(&self) -> &str {
        "pattern"
    }

    fn load_model(&mut self) -> AgentResult<()> {
        let Some(path) = self.model_path.clone() else {
            return Ok(());
        };
        if !path.exists() {
            log::info!("No model at {}, starting fresh", path.display());
            return Ok(());
        }

        let model = Self::read_model(&path)?;
        self.import_model(model)?;
        log::info!(
            "Loaded model from {} ({} patterns, {} updates)",
            path.display(),
            self.values.len(),
            self.updates
        );
        Ok(())
    }

    fn choose_move(&mut self, revealed: &RevealState) -> Option<Move> {
        let hidden: Vec<_> = revealed.iter_hidden().collect();
        if hidden.is_empty() {
            return None;
        }

        if self.rng.random_bool(self.epsilon.clamp(0.0, 1.0)) {
            return hidden.choose(&mut self.rng).copied();
        }

        let mut best: SmallVec<[Move; 8]> = SmallVec::new();
        let mut best_value = f64::NEG_INFINITY;
        for &coords in &hidden {
            let value = self.estimate(revealed, coords);
            if value > best_value {
                best_value = value;
                best.clear();
                best.push(coords);
            } else if value == best_value {
                best.push(coords);
            }
        }
        best.choose(&mut self.rng).copied()
    }

    fn update(&mut self, transition: &Transition) -> AgentResult<()> {
        let key = pattern_key(&transition.before, transition.action);
        let entry = self.values.entry(key).or_default();
        entry.visits = entry.visits.saturating_add(1);
        entry.value += self.config.learning_rate * (transition.reward as f64 - entry.value);

        self.updates += 1;
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.min_epsilon);
        log::trace!(
            "Pattern {:#06x} now {:.3} after reward {}",
            key,
            entry.value,
            transition.reward
        );
        Ok(())
    }

    fn save_model(&self) -> AgentResult<()> {
        let Some(path) = &self.model_path else {
            return Ok(());
        };
        self.write_model(path)?;
        log::info!(
            "Saved model to {} ({} patterns)",
            path.display(),
            self.values.len()
        );
        Ok(())
    }
}
