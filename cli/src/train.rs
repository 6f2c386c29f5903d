use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use minebot_core::{
    Agent, BoardGenerator, EpisodeController, GameConfig, PatternAgent, PlayVariant,
    RandomAgent, RandomBoardGenerator, TrainingLoop, TrainingStats,
};

use crate::config::{BoardArgs, Settings};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum AgentKind {
    /// Learns values for local reveal patterns
    #[default]
    Pattern,
    /// Uniformly random hidden cells, never learns
    Random,
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Number of episodes to play
    #[arg(short, long, default_value_t = 1_000)]
    pub episodes: u64,

    #[arg(long, value_enum, default_value_t)]
    pub agent: AgentKind,

    /// Model file, loaded when present and written back at the end
    #[arg(short, long, default_value = "minebot-model.json")]
    pub model: PathBuf,

    /// Log a progress line every N episodes
    #[arg(long, default_value_t = 100)]
    pub report_every: u64,

    #[command(flatten)]
    pub board: BoardArgs,
}

fn build_agent(args: &TrainArgs, settings: &Settings, config: GameConfig) -> Box<dyn Agent> {
    match args.agent {
        AgentKind::Pattern => Box::new(
            PatternAgent::new(config.size(), settings.agent).with_model_path(&args.model),
        ),
        AgentKind::Random => Box::new(RandomAgent::new(settings.agent.seed)),
    }
}

pub fn run(args: &TrainArgs, settings: &Settings) -> Result<TrainingStats> {
    let config = settings.game_config()?;
    let generator = match settings.board.seed {
        Some(seed) => RandomBoardGenerator::new(seed),
        None => RandomBoardGenerator::from_entropy(),
    };
    log::info!(
        "Training {:?} agent on {}x{} with {} mines, board seed {}",
        args.agent,
        config.rows,
        config.cols,
        config.mines,
        generator.seed()
    );

    let controller = EpisodeController::new(config, generator, PlayVariant::Autonomous)?;
    let agent = build_agent(args, settings, config);
    let mut training = TrainingLoop::new(controller, agent, settings.reward);
    training
        .load_model()
        .with_context(|| format!("failed to load model {}", args.model.display()))?;

    train_and_save(&mut training, args)?;
    Ok(training.stats())
}

/// Saves the model even when the run stopped on an error, then reports the
/// run error first.
fn train_and_save<A, G>(training: &mut TrainingLoop<A, G>, args: &TrainArgs) -> Result<()>
where
    A: Agent,
    G: BoardGenerator,
{
    let outcome = run_batches(training, args);
    let saved = training
        .save_model()
        .with_context(|| format!("failed to save model {}", args.model.display()));
    outcome?;
    saved
}

fn run_batches<A, G>(training: &mut TrainingLoop<A, G>, args: &TrainArgs) -> Result<()>
where
    A: Agent,
    G: BoardGenerator,
{
    let batch = args.report_every.max(1);
    let mut remaining = args.episodes;
    while remaining > 0 {
        let before = training.stats().episodes;
        let stats = training.run_episodes(remaining.min(batch))?;
        let finished = stats.episodes - before;
        remaining -= finished.min(remaining);

        log::info!(
            "{} episodes, win rate {:.1}%, total reward {}",
            stats.episodes,
            stats.win_rate() * 100.0,
            stats.total_reward
        );
        if finished == 0 {
            log::warn!("Agent stopped playing with {} episodes left", remaining);
            break;
        }
    }
    Ok(())
}
