use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Rows closest to the surface never receive bombs.
pub const SAFE_ROWS: Coord = 3;

/// Square map of cells. Queries return nothing until a size is configured, so hosts can poll
/// it optimistically.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapGrid {
    cells: Option<Array2<Cell>>,
    populated: bool,
}

impl MapGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty, unpopulated grid of the given size.
    pub fn with_size(size: Coord) -> Self {
        let mut grid = Self::new();
        grid.cells = Some(Array2::default((size, size).to_nd_index()));
        grid
    }

    /// Populated grid from an explicit cell matrix indexed by `[x, y]`.
    pub fn from_cells(cells: Array2<Cell>) -> Result<Self> {
        let (width, height) = cells.dim();
        if width != height || Coord::try_from(width).is_err() {
            return Err(GameError::GridSizeMismatch);
        }
        Ok(Self {
            cells: Some(cells),
            populated: true,
        })
    }

    /// Populated grid holding only the listed entities.
    pub fn from_layout(size: Coord, layout: &[(Coord2, Cell)]) -> Result<Self> {
        let mut cells: Array2<Cell> = Array2::default((size, size).to_nd_index());
        for &(coords, cell) in layout {
            if coords.0 >= size || coords.1 >= size {
                return Err(GameError::InvalidCoords);
            }
            cells[coords.to_nd_index()] = cell;
        }
        Self::from_cells(cells)
    }

    pub fn is_configured(&self) -> bool {
        self.cells.is_some()
    }

    pub fn is_populated(&self) -> bool {
        self.populated
    }

    pub fn size(&self) -> Option<Coord> {
        self.cells
            .as_ref()
            .and_then(|cells| Coord::try_from(cells.dim().0).ok())
    }

    /// Fills every cell using the difficulty odds. Runs once per grid.
    pub fn populate<R: Rng>(&mut self, difficulty: Difficulty, rng: &mut R) -> Result<()> {
        if self.populated {
            log::warn!("Map already populated, ignoring second population");
            return Err(GameError::AlreadyPopulated);
        }
        let cells = self.cells.as_mut().ok_or(GameError::NotConfigured)?;
        let (size, _) = cells.dim();
        let map_size = Coord::try_from(size).map_err(|_| GameError::GridSizeMismatch)?;
        let odds = difficulty.odds();

        for ((x, y), cell) in cells.indexed_iter_mut() {
            let draw: f64 = rng.gen_range(0.0..1.0);
            // y < size <= Coord::MAX
            let depth = y as Coord;
            *cell = if draw < odds.bomb {
                if depth >= SAFE_ROWS {
                    Cell::Bomb
                } else {
                    Cell::Empty
                }
            } else if draw < odds.bomb + odds.treasure {
                Cell::Treasure(Treasure::new(depth, map_size))
            } else {
                Cell::Empty
            };
            log::trace!("Cell ({x}, {y}) populated with {cell:?}");
        }
        self.populated = true;

        log::debug!(
            "Populated {map_size}x{map_size} map on {difficulty:?}: {} bombs, {} treasures",
            self.count(EntityKind::Bomb),
            self.count(EntityKind::Treasure),
        );
        Ok(())
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        self.size()
            .is_some_and(|size| coords.0 < size && coords.1 < size)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.contains(coords) {
            Ok(coords)
        } else {
            log::error!("Coordinates {coords:?} are outside the map");
            Err(GameError::InvalidCoords)
        }
    }

    /// Cell at `coords`, or nothing before configuration or outside the map.
    pub fn cell_at(&self, coords: Coord2) -> Option<Cell> {
        self.cells
            .as_ref()
            .and_then(|cells| cells.get(coords.to_nd_index()).copied())
    }

    /// Non-empty cell at `coords`.
    pub fn entity_at(&self, coords: Coord2) -> Option<Cell> {
        self.cell_at(coords).filter(|cell| !cell.is_empty())
    }

    pub fn has_entity_at(&self, coords: Coord2, kind: EntityKind) -> bool {
        self.cell_at(coords)
            .and_then(Cell::kind)
            .is_some_and(|found| found == kind)
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.cells.as_ref().map_or(0, |cells| {
            cells.iter().filter(|cell| cell.kind() == Some(kind)).count()
        })
    }

    pub fn iter_entities(&self) -> impl Iterator<Item = (Coord2, Cell)> + '_ {
        self.cells.iter().flat_map(|cells| {
            cells
                .indexed_iter()
                .filter(|(_, cell)| !cell.is_empty())
                // indices are bounded by the map size
                .map(|((x, y), &cell)| ((x as Coord, y as Coord), cell))
        })
    }

    /// Removes whatever is at `coords`, leaving the cell empty.
    pub(crate) fn take(&mut self, coords: Coord2) -> Option<Cell> {
        let cell = self.cells.as_mut()?.get_mut(coords.to_nd_index())?;
        let taken = core::mem::take(cell);
        (!taken.is_empty()).then_some(taken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn queries_are_silent_before_configuration() {
        let grid = MapGrid::new();

        assert_eq!(grid.size(), None);
        assert_eq!(grid.cell_at((0, 0)), None);
        assert_eq!(grid.entity_at((0, 0)), None);
        assert!(!grid.has_entity_at((0, 0), EntityKind::Bomb));
        assert_eq!(grid.count(EntityKind::Treasure), 0);
    }

    #[test]
    fn populate_requires_configuration() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut grid = MapGrid::new();

        assert_eq!(
            grid.populate(Difficulty::Easy, &mut rng),
            Err(GameError::NotConfigured)
        );
    }

    #[test]
    fn populate_runs_only_once() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut grid = MapGrid::with_size(15);

        grid.populate(Difficulty::Medium, &mut rng).unwrap();
        let first = grid.clone();

        assert_eq!(
            grid.populate(Difficulty::Medium, &mut rng),
            Err(GameError::AlreadyPopulated)
        );
        assert_eq!(grid, first);
    }

    #[test]
    fn populate_keeps_surface_rows_free_of_bombs() {
        for seed in 0..20 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut grid = MapGrid::with_size(30);
            grid.populate(Difficulty::Hard, &mut rng).unwrap();

            for ((_, y), cell) in grid.iter_entities() {
                if y < SAFE_ROWS {
                    assert_ne!(cell, Cell::Bomb, "bomb at depth {y} with seed {seed}");
                }
            }
            assert!(grid.count(EntityKind::Bomb) > 0);
        }
    }

    #[test]
    fn populate_is_deterministic_per_seed() {
        let build = |seed| {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut grid = MapGrid::with_size(20);
            grid.populate(Difficulty::Hard, &mut rng).unwrap();
            grid
        };

        assert_eq!(build(42), build(42));
        assert_ne!(build(42), build(43));
    }

    #[test]
    fn treasures_take_their_depth_from_the_row() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut grid = MapGrid::with_size(15);
        grid.populate(Difficulty::Easy, &mut rng).unwrap();

        for ((_, y), cell) in grid.iter_entities() {
            if let Cell::Treasure(treasure) = cell {
                assert_eq!(treasure.depth(), y);
                assert_eq!(treasure.weight(), Treasure::new(y, 15).weight());
            }
        }
    }

    #[test]
    fn take_empties_the_cell() {
        let mut grid = MapGrid::from_layout(15, &[((3, 4), Cell::Bomb)]).unwrap();

        assert!(grid.has_entity_at((3, 4), EntityKind::Bomb));
        assert_eq!(grid.take((3, 4)), Some(Cell::Bomb));
        assert_eq!(grid.cell_at((3, 4)), Some(Cell::Empty));
        assert_eq!(grid.take((3, 4)), None);
    }

    #[test]
    fn layout_rejects_cells_outside_the_map() {
        assert_eq!(
            MapGrid::from_layout(15, &[((15, 0), Cell::Bomb)]),
            Err(GameError::InvalidCoords)
        );
        assert_eq!(MapGrid::with_size(15).cell_at((20, 20)), None);
    }
}
