use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use agent::*;
pub use episode::*;
pub use error::*;
pub use generator::*;
pub use reveal::*;
pub use reward::*;
pub use tile::*;
pub use training::*;
pub use types::*;

mod agent;
mod episode;
mod error;
mod generator;
mod reveal;
mod reward;
mod tile;
mod training;
mod types;

/// Grid value marking a mine; every other cell holds its neighbor mine count.
pub const MINE: i8 = -1;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub rows: Coord,
    pub cols: Coord,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(rows: Coord, cols: Coord, mines: CellCount) -> Self {
        Self { rows, cols, mines }
    }

    /// Validated constructor, requires `0 < mines < rows * cols`.
    pub fn new(rows: Coord, cols: Coord, mines: CellCount) -> Result<Self> {
        let config = Self::new_unchecked(rows, cols, mines);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GameError::EmptyBoard);
        }
        if self.mines == 0 {
            return Err(GameError::NoMines);
        }
        if self.mines >= self.total_cells() {
            return Err(GameError::TooManyMines);
        }
        Ok(())
    }

    pub const fn size(&self) -> Coord2 {
        (self.rows, self.cols)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.rows, self.cols)
    }

    pub const fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mines
    }

    pub const fn beginner() -> Self {
        Self::new_unchecked(9, 9, 10)
    }

    pub const fn intermediate() -> Self {
        Self::new_unchecked(16, 16, 40)
    }

    pub const fn expert() -> Self {
        Self::new_unchecked(16, 30, 99)
    }
}

impl Default for GameConfig {
    /// The board the autonomous agent trains on.
    fn default() -> Self {
        Self::new_unchecked(8, 8, 10)
    }
}

/// Mine positions plus the adjacency count of every safe cell.
///
/// Values are [`MINE`] for mines and `0..=8` otherwise. A grid never changes
/// after it has been built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    values: Array2<i8>,
    mine_count: CellCount,
}

impl Grid {
    pub fn from_mine_mask(mine_mask: &Array2<bool>) -> Self {
        let mut values: Array2<i8> = Array2::zeros(mine_mask.dim());
        let mut mine_count: CellCount = 0;

        for ((row, col), &is_mine) in mine_mask.indexed_iter() {
            if is_mine {
                values[[row, col]] = MINE;
                mine_count += 1;
            }
        }

        for ((row, col), &is_mine) in mine_mask.indexed_iter() {
            if is_mine {
                continue;
            }
            let coords = (row as Coord, col as Coord);
            let count = mine_mask
                .iter_neighbors(coords)
                .filter(|&pos| mine_mask[pos.to_nd_index()])
                .count();
            values[[row, col]] = count as i8;
        }

        Self { values, mine_count }
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Ok(Self::from_mine_mask(&mine_mask))
    }

    pub fn game_config(&self) -> GameConfig {
        let (rows, cols) = self.size();
        GameConfig::new_unchecked(rows, cols, self.mine_count)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.values.dim();
        (rows as Coord, cols as Coord)
    }

    pub fn values(&self) -> &Array2<i8> {
        &self.values
    }

    pub fn total_cells(&self) -> CellCount {
        self.values.len() as CellCount
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn is_mine(&self, coords: Coord2) -> bool {
        self[coords] == MINE
    }

    /// Neighbor mine count of a safe cell, `None` for a mine.
    pub fn adjacent_mine_count(&self, coords: Coord2) -> Option<u8> {
        match self[coords] {
            MINE => None,
            count => Some(count as u8),
        }
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.values.iter_neighbors(coords)
    }

    pub fn iter_mines(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.values
            .indexed_iter()
            .filter(|&(_, &value)| value == MINE)
            .map(|((row, col), _)| (row as Coord, col as Coord))
    }
}

impl Index<Coord2> for Grid {
    type Output = i8;

    fn index(&self, (row, col): Coord2) -> &Self::Output {
        &self.values[(row as usize, col as usize)]
    }
}

/// Episode classification derived from the grid and the reveal state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeOutcome {
    Playing,
    Win,
    GameOver,
}

impl EpisodeOutcome {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Win | Self::GameOver)
    }
}

impl Default for EpisodeOutcome {
    fn default() -> Self {
        Self::Playing
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

/// Result of a single reveal action.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Target was already revealed or flagged, nothing changed.
    AlreadyRevealed,
    MineHit,
    RevealedRegion {
        newly_revealed: CellCount,
        won: bool,
    },
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::AlreadyRevealed)
    }

    pub const fn episode_outcome(self) -> EpisodeOutcome {
        use RevealOutcome::*;
        match self {
            AlreadyRevealed => EpisodeOutcome::Playing,
            MineHit => EpisodeOutcome::GameOver,
            RevealedRegion { won: true, .. } => EpisodeOutcome::Win,
            RevealedRegion { won: false, .. } => EpisodeOutcome::Playing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_full_and_empty_boards() {
        assert_eq!(GameConfig::new(2, 2, 4), Err(GameError::TooManyMines));
        assert_eq!(GameConfig::new(2, 2, 0), Err(GameError::NoMines));
        assert_eq!(GameConfig::new(0, 2, 1), Err(GameError::EmptyBoard));
        assert!(GameConfig::new(2, 2, 3).is_ok());
        assert!(GameConfig::default().validate().is_ok());
        assert!(GameConfig::expert().validate().is_ok());
    }

    #[test]
    fn grid_counts_diagonal_and_orthogonal_mines() {
        // * . .
        // . . .
        // . . *
        let grid = Grid::from_mine_coords((3, 3), &[(0, 0), (2, 2)]).unwrap();

        assert_eq!(grid.mine_count(), 2);
        assert_eq!(grid[(0, 0)], MINE);
        assert_eq!(grid[(1, 1)], 2);
        assert_eq!(grid[(0, 1)], 1);
        assert_eq!(grid[(0, 2)], 0);
        assert_eq!(grid[(2, 0)], 0);
        assert_eq!(grid.adjacent_mine_count((2, 2)), None);
        assert_eq!(grid.iter_mines().collect::<Vec<_>>(), vec![(0, 0), (2, 2)]);
    }

    #[test]
    fn grid_rejects_out_of_bounds_mines() {
        assert_eq!(
            Grid::from_mine_coords((2, 2), &[(2, 0)]),
            Err(GameError::InvalidCoords)
        );
    }

    #[test]
    fn non_square_grid_keeps_row_col_orientation() {
        let grid = Grid::from_mine_coords((2, 4), &[(1, 3)]).unwrap();

        assert_eq!(grid.size(), (2, 4));
        assert_eq!(grid[(0, 2)], 1);
        assert_eq!(grid[(0, 0)], 0);
        assert_eq!(grid.validate_coords((1, 3)), Ok((1, 3)));
        assert_eq!(grid.validate_coords((3, 1)), Err(GameError::InvalidCoords));
    }

    #[test]
    fn reveal_outcome_maps_to_episode_outcome() {
        use RevealOutcome::*;
        assert_eq!(AlreadyRevealed.episode_outcome(), EpisodeOutcome::Playing);
        assert_eq!(MineHit.episode_outcome(), EpisodeOutcome::GameOver);
        let won = RevealedRegion {
            newly_revealed: 3,
            won: true,
        };
        assert_eq!(won.episode_outcome(), EpisodeOutcome::Win);
        assert!(!AlreadyRevealed.has_update());
    }
}
