use serde::{Deserialize, Serialize};

use crate::*;
pub use pattern::*;
pub use random::*;
pub use scripted::*;

mod pattern;
mod random;
mod scripted;

/// One applied move as seen by a learner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub before: RevealState,
    pub action: Move,
    pub reward: Reward,
    pub after: RevealState,
    /// Whether `action` ended the episode.
    pub terminal: bool,
}

/// Policy driving autonomous play.
///
/// An agent only ever observes the reveal state, never the grid, so it sees
/// exactly what a human player would.
pub trait Agent {
    fn name(&self) -> &str;

    /// Called once before the first decision.
    fn load_model(&mut self) -> AgentResult<()> {
        Ok(())
    }

    /// `None` declines to act this cycle.
    fn choose_move(&mut self, revealed: &RevealState) -> Option<Move>;

    /// Called exactly once per applied move, before the next `choose_move`.
    fn update(&mut self, transition: &Transition) -> AgentResult<()>;

    /// Called once when the run shuts down.
    fn save_model(&self) -> AgentResult<()> {
        Ok(())
    }
}

impl<A: Agent + ?Sized> Agent for Box<A> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn load_model(&mut self) -> AgentResult<()> {
        (**self).load_model()
    }

    fn choose_move(&mut self, revealed: &RevealState) -> Option<Move> {
        (**self).choose_move(revealed)
    }

    fn update(&mut self, transition: &Transition) -> AgentResult<()> {
        (**self).update(transition)
    }

    fn save_model(&self) -> AgentResult<()> {
        (**self).save_model()
    }
}
