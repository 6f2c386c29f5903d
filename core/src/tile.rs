use serde::{Deserialize, Serialize};

/// What a presentation shell draws for one cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Hidden,
    Flagged,
    Revealed(u8),
    /// Mine shown after the episode was lost.
    Mine,
    /// The mine whose reveal ended the episode.
    TriggeredMine,
}

impl CellView {
    pub const fn is_unrevealed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged)
    }

    pub const fn symbol(self) -> char {
        match self {
            Self::Hidden => '#',
            Self::Flagged => 'F',
            Self::Revealed(0) => '.',
            Self::Revealed(count) => (b'0' + count) as char,
            Self::Mine => '*',
            Self::TriggeredMine => 'X',
        }
    }
}

impl Default for CellView {
    fn default() -> Self {
        Self::Hidden
    }
}
