use super::*;

/// Replays a fixed list of grids, cycling back to the first one when the list
/// runs out. Used for scripted runs and replays of a known board.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedBoardGenerator {
    grids: Vec<Grid>,
    next: usize,
}

impl FixedBoardGenerator {
    pub fn new(grids: Vec<Grid>) -> Result<Self> {
        if grids.is_empty() {
            return Err(GameError::InvalidBoardShape);
        }
        Ok(Self { grids, next: 0 })
    }

    pub fn single(grid: Grid) -> Self {
        Self {
            grids: vec![grid],
            next: 0,
        }
    }
}

impl BoardGenerator for FixedBoardGenerator {
    fn generate(&mut self, config: GameConfig) -> Grid {
        let grid = self.grids[self.next].clone();
        self.next = (self.next + 1) % self.grids.len();

        if grid.game_config() != config {
            log::warn!(
                "Fixed grid {:?} does not match requested config {:?}",
                grid.game_config(),
                config
            );
        }
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_through_grids() {
        let a = Grid::from_mine_coords((2, 2), &[(0, 0)]).unwrap();
        let b = Grid::from_mine_coords((2, 2), &[(1, 1)]).unwrap();
        let mut generator = FixedBoardGenerator::new(vec![a.clone(), b.clone()]).unwrap();
        let config = GameConfig::new_unchecked(2, 2, 1);

        assert_eq!(generator.generate(config), a);
        assert_eq!(generator.generate(config), b);
        assert_eq!(generator.generate(config), a);
    }

    #[test]
    fn empty_list_is_rejected() {
        assert!(FixedBoardGenerator::new(Vec::new()).is_err());
    }
}
