use serde::{Deserialize, Serialize};

use crate::*;

/// Reward signal handed to the agent after every applied move.
pub type Reward = i64;

/// Per-move reward shaping.
///
/// `moves` is always the move counter *before* the move being scored. The
/// default table is the one the bundled learner was tuned on; treat the
/// coefficients as policy, changing them changes what the agent learns.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardPolicy {
    /// Reward for a mine on the first move of an episode.
    pub first_move_loss: Reward,
    /// Multiplied by the move counter for any later mine.
    pub loss_per_move: Reward,
    /// Multiplied by the move counter for a safe reveal.
    pub safe_per_move: Reward,
    pub win: Reward,
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self {
            first_move_loss: 1,
            loss_per_move: -2,
            safe_per_move: 2,
            win: 500,
        }
    }
}

impl RewardPolicy {
    pub fn reward(&self, outcome: EpisodeOutcome, moves: u32) -> Reward {
        let moves = Reward::from(moves);
        match outcome {
            EpisodeOutcome::GameOver if moves == 0 => self.first_move_loss,
            EpisodeOutcome::GameOver => self.loss_per_move * moves,
            EpisodeOutcome::Playing => self.safe_per_move * moves,
            EpisodeOutcome::Win => self.win,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table() {
        let policy = RewardPolicy::default();

        assert_eq!(policy.reward(EpisodeOutcome::GameOver, 0), 1);
        assert_eq!(policy.reward(EpisodeOutcome::GameOver, 1), -2);
        assert_eq!(policy.reward(EpisodeOutcome::GameOver, 3), -6);
        assert_eq!(policy.reward(EpisodeOutcome::Playing, 0), 0);
        assert_eq!(policy.reward(EpisodeOutcome::Playing, 4), 8);
        assert_eq!(policy.reward(EpisodeOutcome::Win, 0), 500);
        assert_eq!(policy.reward(EpisodeOutcome::Win, 37), 500);
    }

    #[test]
    fn custom_coefficients() {
        let policy = RewardPolicy {
            first_move_loss: 0,
            loss_per_move: -1,
            safe_per_move: 1,
            win: 10,
        };

        assert_eq!(policy.reward(EpisodeOutcome::GameOver, 0), 0);
        assert_eq!(policy.reward(EpisodeOutcome::GameOver, 5), -5);
        assert_eq!(policy.reward(EpisodeOutcome::Playing, 5), 5);
        assert_eq!(policy.reward(EpisodeOutcome::Win, 5), 10);
    }

    #[test]
    fn partial_override_keeps_defaults() {
        let policy: RewardPolicy = serde_json::from_str(r#"{"win": 100}"#).unwrap();
        assert_eq!(policy.win, 100);
        assert_eq!(policy.loss_per_move, -2);
    }
}
