use serde::{Deserialize, Serialize};

use crate::*;

/// How reveals behave, see [`MineReveal`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayVariant {
    /// Agent play: flags are never used and a hit only exposes the triggered mine.
    Autonomous,
    /// Human play: flags block reveals and a hit exposes every mine.
    Manual,
}

impl PlayVariant {
    const fn mine_reveal(self) -> MineReveal {
        match self {
            Self::Autonomous => MineReveal::Triggered,
            Self::Manual => MineReveal::All,
        }
    }
}

/// Everything that belongs to one episode. Replaced wholesale on reset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    grid: Grid,
    revealed: RevealState,
    flags: FlagState,
    outcome: EpisodeOutcome,
    last_move: Option<Move>,
    episode: u64,
}

impl Session {
    pub fn new(grid: Grid, episode: u64) -> Self {
        let size = grid.size();
        Self {
            grid,
            revealed: RevealState::new(size),
            flags: FlagState::new(size),
            outcome: EpisodeOutcome::Playing,
            last_move: None,
            episode,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn revealed(&self) -> &RevealState {
        &self.revealed
    }

    pub fn flags(&self) -> &FlagState {
        &self.flags
    }

    pub fn outcome(&self) -> EpisodeOutcome {
        self.outcome
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome.is_terminal()
    }

    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    /// 1-based number of this episode within the controller's run.
    pub fn episode(&self) -> u64 {
        self.episode
    }

    pub fn size(&self) -> Coord2 {
        self.grid.size()
    }

    pub fn cell_view(&self, coords: Coord2) -> CellView {
        let lost = matches!(self.outcome, EpisodeOutcome::GameOver);
        if self.grid.is_mine(coords) && (lost || self.revealed.is_revealed(coords)) {
            return if self.last_move == Some(coords) {
                CellView::TriggeredMine
            } else {
                CellView::Mine
            };
        }

        if self.revealed.is_revealed(coords) {
            CellView::Revealed(self.grid[coords] as u8)
        } else if self.flags.is_flagged(coords) {
            CellView::Flagged
        } else {
            CellView::Hidden
        }
    }
}

/// Owns the current session and regenerates it whenever an episode ends.
#[derive(Clone, Debug)]
pub struct EpisodeController<G> {
    config: GameConfig,
    generator: G,
    variant: PlayVariant,
    session: Session,
}

impl<G: BoardGenerator> EpisodeController<G> {
    pub fn new(config: GameConfig, mut generator: G, variant: PlayVariant) -> Result<Self> {
        config.validate()?;
        let session = Session::new(generator.generate(config), 1);
        Ok(Self {
            config,
            generator,
            variant,
            session,
        })
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn variant(&self) -> PlayVariant {
        self.variant
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn grid(&self) -> &Grid {
        self.session.grid()
    }

    pub fn revealed(&self) -> &RevealState {
        self.session.revealed()
    }

    pub fn flags(&self) -> &FlagState {
        self.session.flags()
    }

    pub fn outcome(&self) -> EpisodeOutcome {
        self.session.outcome()
    }

    pub fn is_terminal(&self) -> bool {
        self.session.is_terminal()
    }

    /// Starts a new episode on a freshly generated grid.
    pub fn reset(&mut self) -> &Session {
        let episode = self.session.episode + 1;
        let grid = self.generator.generate(self.config);
        self.session = Session::new(grid, episode);
        log::debug!("Episode {} started", episode);
        &self.session
    }

    /// Called before any consumer asks for a decision. Resets when the last
    /// cycle ended the episode and returns whether it did.
    pub fn begin_cycle(&mut self) -> bool {
        if self.session.is_terminal() {
            self.reset();
            true
        } else {
            false
        }
    }

    pub fn apply_reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        self.check_not_finished()?;

        let session = &mut self.session;
        let flags = match self.variant {
            PlayVariant::Autonomous => None,
            PlayVariant::Manual => Some(&session.flags),
        };
        let outcome = reveal_with_flags(
            &session.grid,
            &mut session.revealed,
            flags,
            coords,
            self.variant.mine_reveal(),
        )?;

        if outcome.has_update() {
            session.last_move = Some(coords);
        }
        if outcome == RevealOutcome::MineHit && self.variant.mine_reveal() == MineReveal::All {
            // every mine is now revealed, and a revealed cell carries no flag
            for mine in session.grid.iter_mines() {
                session.flags.clear(mine);
            }
        }
        session.outcome = outcome.episode_outcome();
        if session.outcome.is_terminal() {
            log::debug!(
                "Episode {} ended with {:?} at {:?}",
                session.episode,
                session.outcome,
                coords
            );
        }
        Ok(outcome)
    }

    /// Manual play only, autonomous sessions never carry flags.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let coords = self.session.grid.validate_coords(coords)?;
        self.check_not_finished()?;

        if matches!(self.variant, PlayVariant::Autonomous) {
            return Ok(MarkOutcome::NoChange);
        }

        let session = &mut self.session;
        Ok(session.flags.toggle(&session.revealed, coords))
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.session.is_terminal() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}
