use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use minebot_core::{EpisodeController, PlayVariant, RandomBoardGenerator};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

mod config;
mod play;
mod render;
mod train;

use config::Settings;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// What log level to use
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    /// Settings file with [board], [reward] and [agent] tables
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Let an agent play episodes and learn from the shaped reward
    Train(train::TrainArgs),
    /// Play in the terminal
    Play(play::PlayArgs),
}

fn init_logging(verbose: &Verbosity<InfoLevel>) {
    let level = match verbose.log_level_filter() {
        log::LevelFilter::Off => LevelFilter::OFF,
        log::LevelFilter::Error => LevelFilter::ERROR,
        log::LevelFilter::Warn => LevelFilter::WARN,
        log::LevelFilter::Info => LevelFilter::INFO,
        log::LevelFilter::Debug => LevelFilter::DEBUG,
        log::LevelFilter::Trace => LevelFilter::TRACE,
    };
    // RUST_LOG directives still win over the flag
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.verbose);

    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    log::debug!("settings: {:?}", settings);

    match cli.command {
        Command::Train(args) => {
            settings.apply(&args.board);
            let stats = train::run(&args, &settings)?;
            println!(
                "episodes: {}, wins: {}, losses: {}, win rate: {:.1}%",
                stats.episodes,
                stats.wins,
                stats.losses,
                stats.win_rate() * 100.0
            );
            println!(
                "moves: {}, total reward: {}, longest episode: {}",
                stats.moves, stats.total_reward, stats.longest_episode
            );
        }
        Command::Play(args) => {
            settings.apply(&args.board);
            let config = settings.game_config()?;
            let generator = match settings.board.seed {
                Some(seed) => RandomBoardGenerator::new(seed),
                None => RandomBoardGenerator::from_entropy(),
            };
            log::debug!("seed: {}", generator.seed());
            let mut controller = EpisodeController::new(config, generator, PlayVariant::Manual)?;
            play::run(&mut controller, io::stdin().lock(), io::stdout().lock())?;
        }
    }
    Ok(())
}
