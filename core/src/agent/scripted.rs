use std::collections::VecDeque;

use super::*;

/// Plays a fixed move list and records every transition it is handed.
/// Declines once the list is exhausted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScriptedAgent {
    moves: VecDeque<Option<Move>>,
    transitions: Vec<Transition>,
    loaded: bool,
}

impl ScriptedAgent {
    pub fn new(moves: impl IntoIterator<Item = Move>) -> Self {
        Self::with_declines(moves.into_iter().map(Some))
    }

    /// `None` entries make the agent decline for that cycle.
    pub fn with_declines(moves: impl IntoIterator<Item = Option<Move>>) -> Self {
        Self {
            moves: moves.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn remaining(&self) -> usize {
        self.moves.len()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

impl Agent for ScriptedAgent {
    fn name(&self) -> &str {
        "scripted"
    }

    fn load_model(&mut self) -> AgentResult<()> {
        self.loaded = true;
        Ok(())
    }

    fn choose_move(&mut self, _revealed: &RevealState) -> Option<Move> {
        self.moves.pop_front().flatten()
    }

    fn update(&mut self, transition: &Transition) -> AgentResult<()> {
        self.transitions.push(transition.clone());
        Ok(())
    }
}
