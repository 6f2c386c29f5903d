//! Settings file and command-line overrides.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use minebot_core::{CellCount, Coord, GameConfig, PatternAgentConfig, RewardPolicy};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// 8x8 with 10 mines, the board the agent trains on
    Standard,
    Beginner,
    Intermediate,
    Expert,
}

impl Preset {
    pub const fn game_config(self) -> GameConfig {
        match self {
            Self::Standard => GameConfig::new_unchecked(8, 8, 10),
            Self::Beginner => GameConfig::beginner(),
            Self::Intermediate => GameConfig::intermediate(),
            Self::Expert => GameConfig::expert(),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSettings {
    pub preset: Option<Preset>,
    pub rows: Option<Coord>,
    pub cols: Option<Coord>,
    pub mines: Option<CellCount>,
    pub seed: Option<u64>,
}

/// Everything a settings file may contain, every section optional.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub board: BoardSettings,
    pub reward: RewardPolicy,
    pub agent: PatternAgentConfig,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid settings in {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text)?;
        settings.agent.validate()?;
        Ok(settings)
    }

    /// Layers command-line board flags over the file values.
    pub fn apply(&mut self, args: &BoardArgs) {
        let board = &mut self.board;
        if args.preset.is_some() {
            board.preset = args.preset;
            board.rows = None;
            board.cols = None;
            board.mines = None;
        }
        board.rows = args.rows.or(board.rows);
        board.cols = args.cols.or(board.cols);
        board.mines = args.mines.or(board.mines);
        board.seed = args.seed.or(board.seed);
    }

    /// Resolves the board, validating `0 < mines < rows * cols`.
    pub fn game_config(&self) -> Result<GameConfig> {
        let base = self.board.preset.unwrap_or(Preset::Standard).game_config();
        let config = GameConfig::new_unchecked(
            self.board.rows.unwrap_or(base.rows),
            self.board.cols.unwrap_or(base.cols),
            self.board.mines.unwrap_or(base.mines),
        );
        config
            .validate()
            .with_context(|| format!("invalid board {config:?}"))?;
        Ok(config)
    }
}

/// Board flags shared by every command.
#[derive(Args, Clone, Debug, Default)]
pub struct BoardArgs {
    /// Start from a named board size
    #[arg(long, value_enum)]
    pub preset: Option<Preset>,

    #[arg(long)]
    pub rows: Option<Coord>,

    #[arg(long)]
    pub cols: Option<Coord>,

    #[arg(long)]
    pub mines: Option<CellCount>,

    /// Seed for board generation, random when omitted
    #[arg(long)]
    pub seed: Option<u64>,
}
