use serde::{Deserialize, Serialize};

use crate::*;

/// A move that reached the controller during one cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AppliedMove {
    pub action: Move,
    pub reveal: RevealOutcome,
    pub outcome: EpisodeOutcome,
    pub reward: Reward,
    /// Move counter value the reward was computed from.
    pub move_index: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cycle {
    /// The agent returned no move, nothing changed.
    Declined,
    Applied(AppliedMove),
}

/// Summary of one finished episode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode: u64,
    pub outcome: EpisodeOutcome,
    pub moves: u32,
    pub reward: Reward,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingStats {
    pub episodes: u64,
    pub wins: u64,
    pub losses: u64,
    pub moves: u64,
    pub declined: u64,
    pub total_reward: Reward,
    pub longest_episode: u32,
}

impl TrainingStats {
    pub fn win_rate(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.wins as f64 / self.episodes as f64
        }
    }

    fn record(&mut self, summary: &EpisodeSummary) {
        self.episodes += 1;
        match summary.outcome {
            EpisodeOutcome::Win => self.wins += 1,
            EpisodeOutcome::GameOver => self.losses += 1,
            EpisodeOutcome::Playing => {}
        }
        self.longest_episode = self.longest_episode.max(summary.moves);
    }
}

/// Consecutive declined cycles after which `run_episodes` gives up.
pub const DEFAULT_MAX_IDLE_CYCLES: u32 = 1_000;

/// Drives an agent against an episode controller, shaping a reward for every
/// applied move and forwarding the transition to the agent.
#[derive(Debug)]
pub struct TrainingLoop<A, G> {
    controller: EpisodeController<G>,
    agent: A,
    policy: RewardPolicy,
    moves: u32,
    episode_reward: Reward,
    stats: TrainingStats,
    last_episode: Option<EpisodeSummary>,
    max_idle_cycles: u32,
}

impl<A: Agent, G: BoardGenerator> TrainingLoop<A, G> {
    pub fn new(controller: EpisodeController<G>, agent: A, policy: RewardPolicy) -> Self {
        Self {
            controller,
            agent,
            policy,
            moves: 0,
            episode_reward: 0,
            stats: TrainingStats::default(),
            last_episode: None,
            max_idle_cycles: DEFAULT_MAX_IDLE_CYCLES,
        }
    }

    pub fn with_max_idle_cycles(mut self, max_idle_cycles: u32) -> Self {
        self.max_idle_cycles = max_idle_cycles;
        self
    }

    pub fn controller(&self) -> &EpisodeController<G> {
        &self.controller
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    pub fn policy(&self) -> RewardPolicy {
        self.policy
    }

    /// Move counter of the running episode.
    pub fn move_counter(&self) -> u32 {
        self.moves
    }

    pub fn stats(&self) -> TrainingStats {
        self.stats
    }

    pub fn last_episode(&self) -> Option<EpisodeSummary> {
        self.last_episode
    }

    pub fn into_agent(self) -> A {
        self.agent
    }

    pub fn load_model(&mut self) -> AgentResult<()> {
        self.agent.load_model()
    }

    pub fn save_model(&self) -> AgentResult<()> {
        self.agent.save_model()
    }

    /// Runs one cycle: resets a finished episode, asks the agent for a move,
    /// applies it, scores it and hands the transition to the agent.
    pub fn step(&mut self) -> core::result::Result<Cycle, TrainingError> {
        self.controller.begin_cycle();

        let before = self.controller.revealed().clone();
        let Some(action) = self.agent.choose_move(&before) else {
            self.stats.declined += 1;
            log::trace!("Agent {} declined to move", self.agent.name());
            return Ok(Cycle::Declined);
        };

        let reveal = self.controller.apply_reveal(action)?;
        let outcome = reveal.episode_outcome();
        let move_index = self.moves;
        let reward = self.policy.reward(outcome, move_index);

        let transition = Transition {
            before,
            action,
            reward,
            after: self.controller.revealed().clone(),
            terminal: outcome.is_terminal(),
        };
        self.agent.update(&transition)?;

        self.moves += 1;
        self.episode_reward += reward;
        self.stats.moves += 1;
        self.stats.total_reward += reward;

        if outcome.is_terminal() {
            self.finish_episode(outcome);
        }

        Ok(Cycle::Applied(AppliedMove {
            action,
            reveal,
            outcome,
            reward,
            move_index,
        }))
    }

    /// Steps until `episodes` more episodes have finished, or the agent has
    /// declined `max_idle_cycles` times in a row.
    pub fn run_episodes(
        &mut self,
        episodes: u64,
    ) -> core::result::Result<TrainingStats, TrainingError> {
        let target = self.stats.episodes + episodes;
        let mut idle = 0;

        while self.stats.episodes < target {
            match self.step()? {
                Cycle::Declined => {
                    idle += 1;
                    if idle >= self.max_idle_cycles {
                        log::warn!(
                            "Agent {} declined {} cycles in a row, stopping",
                            self.agent.name(),
                            idle
                        );
                        break;
                    }
                }
                Cycle::Applied(_) => idle = 0,
            }
        }

        Ok(self.stats)
    }

    fn finish_episode(&mut self, outcome: EpisodeOutcome) {
        let summary = EpisodeSummary {
            episode: self.controller.session().episode(),
            outcome,
            moves: self.moves,
            reward: self.episode_reward,
        };
        self.stats.record(&summary);
        log::info!(
            "Episode {} {:?} after {} moves, reward {}",
            summary.episode,
            summary.outcome,
            summary.moves,
            summary.reward
        );

        self.last_episode = Some(summary);
        self.moves = 0;
        self.episode_reward = 0;
    }
}
