use core::ops::Index;
use std::collections::VecDeque;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Which mines become visible when one is hit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MineReveal {
    /// Only the mine that was hit, the agent sees exactly what it caused.
    Triggered,
    /// Every mine on the board, for the end-of-game display.
    All,
}

/// Per-cell revealed flags. Cells only ever go from hidden to revealed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealState {
    cells: Array2<bool>,
    revealed_count: CellCount,
}

impl RevealState {
    pub fn new(size: Coord2) -> Self {
        Self {
            cells: Array2::default(size.to_nd_index()),
            revealed_count: 0,
        }
    }

    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.cells.dim();
        (rows as Coord, cols as Coord)
    }

    pub fn cells(&self) -> &Array2<bool> {
        &self.cells
    }

    pub fn is_revealed(&self, coords: Coord2) -> bool {
        self[coords]
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub fn iter_hidden(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.cells
            .indexed_iter()
            .filter(|&(_, &revealed)| !revealed)
            .map(|((row, col), _)| (row as Coord, col as Coord))
    }

    /// Whether every cell revealed here is also revealed in `later`.
    pub fn is_subset_of(&self, later: &RevealState) -> bool {
        self.cells.dim() == later.cells.dim()
            && self
                .cells
                .iter()
                .zip(later.cells.iter())
                .all(|(&before, &after)| !before || after)
    }

    /// Marks a cell revealed, returns `false` when it already was.
    fn mark(&mut self, coords: Coord2) -> bool {
        let cell = &mut self.cells[coords.to_nd_index()];
        if *cell {
            return false;
        }
        *cell = true;
        self.revealed_count += 1;
        true
    }
}

impl Index<Coord2> for RevealState {
    type Output = bool;

    fn index(&self, (row, col): Coord2) -> &Self::Output {
        &self.cells[(row as usize, col as usize)]
    }
}

/// Player-suspected mines, manual play only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagState {
    cells: Array2<bool>,
    flagged_count: CellCount,
}

impl FlagState {
    pub fn new(size: Coord2) -> Self {
        Self {
            cells: Array2::default(size.to_nd_index()),
            flagged_count: 0,
        }
    }

    pub fn cells(&self) -> &Array2<bool> {
        &self.cells
    }

    pub fn is_flagged(&self, coords: Coord2) -> bool {
        self[coords]
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    /// Flips the flag of a hidden cell, revealed cells cannot carry one.
    pub fn toggle(&mut self, revealed: &RevealState, coords: Coord2) -> MarkOutcome {
        if revealed.is_revealed(coords) {
            return MarkOutcome::NoChange;
        }

        let cell = &mut self.cells[coords.to_nd_index()];
        *cell = !*cell;
        if *cell {
            self.flagged_count += 1;
        } else {
            self.flagged_count -= 1;
        }
        MarkOutcome::Changed
    }

    /// Drops the flag on a cell that is about to be shown, returns whether
    /// there was one.
    pub fn clear(&mut self, coords: Coord2) -> bool {
        let cell = &mut self.cells[coords.to_nd_index()];
        if !*cell {
            return false;
        }
        *cell = false;
        self.flagged_count -= 1;
        true
    }
}

impl Index<Coord2> for FlagState {
    type Output = bool;

    fn index(&self, (row, col): Coord2) -> &Self::Output {
        &self.cells[(row as usize, col as usize)]
    }
}

/// Reveals one cell the way the autonomous agent plays: no flags, and a hit
/// only exposes the triggered mine.
pub fn reveal(grid: &Grid, revealed: &mut RevealState, coords: Coord2) -> Result<RevealOutcome> {
    reveal_with_flags(grid, revealed, None, coords, MineReveal::Triggered)
}

/// Reveals one cell, expanding zero regions, and classifies the result.
///
/// Flagged cells are treated like revealed ones: the target is a no-op and the
/// flood fill does not cross them.
pub fn reveal_with_flags(
    grid: &Grid,
    revealed: &mut RevealState,
    flags: Option<&FlagState>,
    coords: Coord2,
    mine_reveal: MineReveal,
) -> Result<RevealOutcome> {
    let coords = grid.validate_coords(coords)?;
    if revealed.size() != grid.size() {
        return Err(GameError::InvalidBoardShape);
    }

    let is_flagged = |pos: Coord2| flags.is_some_and(|flags| flags.is_flagged(pos));

    if revealed.is_revealed(coords) || is_flagged(coords) {
        return Ok(RevealOutcome::AlreadyRevealed);
    }

    if grid.is_mine(coords) {
        log::debug!("Mine hit at {:?}", coords);
        match mine_reveal {
            MineReveal::Triggered => {
                revealed.mark(coords);
            }
            MineReveal::All => {
                for mine in grid.iter_mines() {
                    revealed.mark(mine);
                }
            }
        }
        return Ok(RevealOutcome::MineHit);
    }

    let newly_revealed = flood_fill(grid, revealed, is_flagged, coords);
    let won = is_win(grid, revealed);
    log::debug!(
        "Revealed {:?}, value: {}, newly revealed: {}",
        coords,
        grid[coords],
        newly_revealed
    );

    Ok(RevealOutcome::RevealedRegion {
        newly_revealed,
        won,
    })
}

/// Opens `start` and the closure of zero cells reachable from it, including
/// the numbered cells bordering that region. Returns how many cells opened.
fn flood_fill(
    grid: &Grid,
    revealed: &mut RevealState,
    is_flagged: impl Fn(Coord2) -> bool,
    start: Coord2,
) -> CellCount {
    let mut opened = 0;
    if !revealed.mark(start) {
        return opened;
    }
    opened += 1;

    if grid[start] != 0 {
        return opened;
    }

    let mut to_visit = VecDeque::from([start]);
    log::trace!("Starting flood-fill from {:?}", start);

    while let Some(visit_coords) = to_visit.pop_front() {
        for pos in grid.iter_neighbors(visit_coords) {
            if grid.is_mine(pos) || is_flagged(pos) {
                continue;
            }
            if !revealed.mark(pos) {
                continue;
            }
            opened += 1;
            log::trace!("Flood opened cell at {:?}, mine count: {}", pos, grid[pos]);

            if grid[pos] == 0 {
                to_visit.push_back(pos);
            }
        }
    }

    opened
}

/// Win iff every cell is either a mine or revealed.
pub fn is_win(grid: &Grid, revealed: &RevealState) -> bool {
    grid.values()
        .iter()
        .zip(revealed.cells().iter())
        .all(|(&value, &open)| value == MINE || open)
}

/// Derives the episode classification from scratch.
pub fn classify(grid: &Grid, revealed: &RevealState) -> EpisodeOutcome {
    if grid.iter_mines().any(|mine| revealed.is_revealed(mine)) {
        EpisodeOutcome::GameOver
    } else if is_win(grid, revealed) {
        EpisodeOutcome::Win
    } else {
        EpisodeOutcome::Playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(size: Coord2, mines: &[Coord2]) -> Grid {
        Grid::from_mine_coords(size, mines).unwrap()
    }

    #[test]
    fn zero_cell_opens_region_and_border_only() {
        // . . . 1 *
        // . . . 1 1
        // 1 1 . . .
        // * 1 . . .
        let grid = grid((4, 5), &[(0, 4), (3, 0)]);
        let mut revealed = RevealState::new(grid.size());

        let outcome = reveal(&grid, &mut revealed, (0, 0)).unwrap();

        assert_eq!(
            outcome,
            RevealOutcome::RevealedRegion {
                newly_revealed: 18,
                won: true
            }
        );
        assert!(!revealed.is_revealed((0, 4)));
        assert!(!revealed.is_revealed((3, 0)));
        assert_eq!(classify(&grid, &revealed), EpisodeOutcome::Win);
    }

    #[test]
    fn flood_fill_stops_at_numbered_wall() {
        // . 2 * 2 .
        // . 3 * 3 .
        // . 2 * 2 .
        let grid = grid((3, 5), &[(0, 2), (1, 2), (2, 2)]);
        let mut revealed = RevealState::new(grid.size());

        let outcome = reveal(&grid, &mut revealed, (1, 0)).unwrap();

        assert_eq!(
            outcome,
            RevealOutcome::RevealedRegion {
                newly_revealed: 6,
                won: false
            }
        );
        for row in 0..3 {
            assert!(revealed.is_revealed((row, 0)));
            assert!(revealed.is_revealed((row, 1)));
            assert!(!revealed.is_revealed((row, 3)));
            assert!(!revealed.is_revealed((row, 4)));
        }
    }

    #[test]
    fn numbered_cell_reveals_only_itself() {
        let grid = grid((3, 3), &[(0, 0)]);
        let mut revealed = RevealState::new(grid.size());

        let outcome = reveal(&grid, &mut revealed, (1, 1)).unwrap();

        assert_eq!(
            outcome,
            RevealOutcome::RevealedRegion {
                newly_revealed: 1,
                won: false
            }
        );
        assert_eq!(revealed.revealed_count(), 1);
    }

    #[test]
    fn revealing_twice_is_a_no_op() {
        let grid = grid((3, 3), &[(0, 0)]);
        let mut revealed = RevealState::new(grid.size());
        reveal(&grid, &mut revealed, (1, 1)).unwrap();
        let before = revealed.clone();

        let outcome = reveal(&grid, &mut revealed, (1, 1)).unwrap();

        assert_eq!(outcome, RevealOutcome::AlreadyRevealed);
        assert_eq!(outcome.episode_outcome(), EpisodeOutcome::Playing);
        assert_eq!(revealed, before);
    }

    #[test]
    fn mine_hit_reveals_only_triggered_mine() {
        let grid = grid((3, 3), &[(0, 0), (2, 2)]);
        let mut revealed = RevealState::new(grid.size());

        let outcome = reveal(&grid, &mut revealed, (0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::MineHit);
        assert!(revealed.is_revealed((0, 0)));
        assert!(!revealed.is_revealed((2, 2)));
        assert_eq!(classify(&grid, &revealed), EpisodeOutcome::GameOver);
    }

    #[test]
    fn mine_hit_can_reveal_all_mines() {
        let grid = grid((3, 3), &[(0, 0), (2, 2)]);
        let mut revealed = RevealState::new(grid.size());

        let outcome =
            reveal_with_flags(&grid, &mut revealed, None, (2, 2), MineReveal::All).unwrap();

        assert_eq!(outcome, RevealOutcome::MineHit);
        assert!(revealed.is_revealed((0, 0)));
        assert!(revealed.is_revealed((2, 2)));
        assert_eq!(revealed.revealed_count(), 2);
    }

    #[test]
    fn flags_block_target_and_flood_fill() {
        let grid = grid((3, 3), &[(2, 2)]);
        let mut revealed = RevealState::new(grid.size());
        let mut flags = FlagState::new(grid.size());
        flags.toggle(&revealed, (0, 2));

        let outcome = reveal_with_flags(
            &grid,
            &mut revealed,
            Some(&flags),
            (0, 2),
            MineReveal::All,
        )
        .unwrap();
        assert_eq!(outcome, RevealOutcome::AlreadyRevealed);

        let outcome = reveal_with_flags(
            &grid,
            &mut revealed,
            Some(&flags),
            (0, 0),
            MineReveal::All,
        )
        .unwrap();
        assert_eq!(
            outcome,
            RevealOutcome::RevealedRegion {
                newly_revealed: 7,
                won: false
            }
        );
        assert!(!revealed.is_revealed((0, 2)));
    }

    #[test]
    fn flag_toggle_ignores_revealed_cells() {
        let grid = grid((2, 2), &[(0, 0)]);
        let mut revealed = RevealState::new(grid.size());
        let mut flags = FlagState::new(grid.size());
        reveal(&grid, &mut revealed, (1, 1)).unwrap();

        assert_eq!(flags.toggle(&revealed, (1, 1)), MarkOutcome::NoChange);
        assert_eq!(flags.toggle(&revealed, (0, 0)), MarkOutcome::Changed);
        assert_eq!(flags.flagged_count(), 1);
        assert_eq!(flags.toggle(&revealed, (0, 0)), MarkOutcome::Changed);
        assert_eq!(flags.flagged_count(), 0);
        assert!(!flags.is_flagged((0, 0)));
    }

    #[test]
    fn win_requires_every_safe_cell() {
        let grid = grid((1, 3), &[(0, 0)]);
        let mut revealed = RevealState::new(grid.size());

        let first = reveal(&grid, &mut revealed, (0, 1)).unwrap();
        assert_eq!(first.episode_outcome(), EpisodeOutcome::Playing);
        assert!(!is_win(&grid, &revealed));

        let second = reveal(&grid, &mut revealed, (0, 2)).unwrap();
        assert_eq!(second.episode_outcome(), EpisodeOutcome::Win);
        assert!(is_win(&grid, &revealed));
    }

    #[test]
    fn out_of_bounds_move_is_rejected() {
        let grid = grid((2, 2), &[(0, 0)]);
        let mut revealed = RevealState::new(grid.size());

        assert_eq!(
            reveal(&grid, &mut revealed, (2, 0)),
            Err(GameError::InvalidCoords)
        );
        assert_eq!(
            reveal(&grid, &mut revealed, (0, 5)),
            Err(GameError::InvalidCoords)
        );
    }

    #[test]
    fn reveal_state_subset_tracks_monotonicity() {
        let grid = grid((3, 3), &[(0, 0)]);
        let mut revealed = RevealState::new(grid.size());
        let empty = revealed.clone();
        reveal(&grid, &mut revealed, (2, 2)).unwrap();

        assert!(empty.is_subset_of(&revealed));
        assert!(!revealed.is_subset_of(&empty));
        assert_eq!(revealed.iter_hidden().collect::<Vec<_>>(), vec![(0, 0)]);
    }
}
