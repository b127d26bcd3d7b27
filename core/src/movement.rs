//! Reachable tiles for a dice roll.
//!
//! Each direction is walked independently from the origin. A tile holding a player is hopped
//! over without spending the roll, but two players in a row block the way.

use alloc::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Tiles reachable in one direction, nearest first.
pub type StepList = SmallVec<[Coord2; 4]>;

/// Reachable tiles keyed by direction, iterated in `Direction` order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PossibleSteps {
    by_direction: BTreeMap<Direction, StepList>,
}

impl PossibleSteps {
    pub fn get(&self, direction: Direction) -> Option<&[Coord2]> {
        self.by_direction.get(&direction).map(|steps| steps.as_slice())
    }

    pub fn directions(&self) -> impl Iterator<Item = Direction> + '_ {
        self.by_direction.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Direction, &[Coord2])> + '_ {
        self.by_direction
            .iter()
            .map(|(&direction, steps)| (direction, steps.as_slice()))
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        self.direction_of(coords).is_some()
    }

    pub fn direction_of(&self, coords: Coord2) -> Option<Direction> {
        self.iter()
            .find(|(_, steps)| steps.contains(&coords))
            .map(|(direction, _)| direction)
    }

    /// Whether no tile at all can be reached.
    pub fn is_empty(&self) -> bool {
        self.by_direction.values().all(|steps| steps.is_empty())
    }

    /// First bomb met while travelling to `destination`, the destination itself included.
    pub fn first_bomb_along(&self, destination: Coord2, grid: &MapGrid) -> Option<Coord2> {
        let direction = self.direction_of(destination)?;
        for &coords in self.get(direction)? {
            if grid.has_entity_at(coords, EntityKind::Bomb) {
                return Some(coords);
            }
            if coords == destination {
                break;
            }
        }
        None
    }
}

/// Computes the tiles a player at `origin` may reach with `budget` steps.
///
/// From the submarine only `Down` can be searched, starting right above the middle column.
/// Directions not listed in `directions`, or blocked by the map edge at the origin, are left out
/// of the result entirely.
pub fn compute_steps<F>(
    size: Coord,
    origin: Position,
    budget: u8,
    directions: &[Direction],
    is_occupied: F,
) -> PossibleSteps
where
    F: Fn(Coord2) -> bool,
{
    let max = i16::from(size) - 1;
    let start = match origin {
        Position::Submarine => (i16::from(size / 2), -1),
        Position::Map((x, y)) => (i16::from(x), i16::from(y)),
    };

    let mut by_direction = BTreeMap::new();
    for &direction in directions {
        if origin.is_on_submarine() && direction != Direction::Down {
            continue;
        }
        if direction.is_at_boundary(start, max) {
            log::trace!("Skipping {direction:?}, {start:?} is already at the edge");
            continue;
        }
        let steps = walk(start, direction, budget, max, &is_occupied);
        log::trace!("{direction:?} from {start:?} with {budget} steps: {steps:?}");
        by_direction.insert(direction, steps);
    }

    PossibleSteps { by_direction }
}

fn walk<F>(start: (i16, i16), direction: Direction, budget: u8, max: i16, is_occupied: &F) -> StepList
where
    F: Fn(Coord2) -> bool,
{
    let (dx, dy) = direction.delta();
    let mut steps = StepList::new();
    let mut remaining = budget;
    let mut reach = i16::from(budget);
    let mut previous_occupied = false;
    let mut distance = 1;

    while distance <= reach {
        let x = (start.0 + dx * distance).clamp(0, max);
        let y = (start.1 + dy * distance).clamp(0, max);
        // clamped to 0..=max, which fits in a Coord
        let coords = (x as Coord, y as Coord);

        if is_occupied(coords) {
            if previous_occupied {
                break;
            }
            previous_occupied = true;
            reach += 1;
        } else {
            steps.push(coords);
            remaining -= 1;
            previous_occupied = false;
        }

        if direction.is_at_boundary((x, y), max) || remaining == 0 {
            break;
        }
        distance += 1;
    }

    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn free(_: Coord2) -> bool {
        false
    }

    fn steps_in(steps: &PossibleSteps, direction: Direction) -> Vec<Coord2> {
        steps.get(direction).unwrap().to_vec()
    }

    #[test]
    fn walks_every_direction_up_to_the_budget() {
        let steps = compute_steps(15, Position::Map((7, 7)), 3, &Direction::ALL, free);

        assert_eq!(steps_in(&steps, Direction::Up), [(7, 6), (7, 5), (7, 4)]);
        assert_eq!(steps_in(&steps, Direction::Down), [(7, 8), (7, 9), (7, 10)]);
        assert_eq!(steps_in(&steps, Direction::Left), [(6, 7), (5, 7), (4, 7)]);
        assert_eq!(steps_in(&steps, Direction::Right), [(8, 7), (9, 7), (10, 7)]);
    }

    #[test]
    fn skips_directions_blocked_by_the_edge() {
        let steps = compute_steps(15, Position::Map((0, 0)), 2, &Direction::ALL, free);

        assert_eq!(steps.get(Direction::Up), None);
        assert_eq!(steps.get(Direction::Left), None);
        assert_eq!(steps_in(&steps, Direction::Down), [(0, 1), (0, 2)]);
        assert_eq!(steps_in(&steps, Direction::Right), [(1, 0), (2, 0)]);
    }

    #[test]
    fn stops_at_the_edge() {
        let steps = compute_steps(15, Position::Map((13, 13)), 3, &Direction::ALL, free);

        assert_eq!(steps_in(&steps, Direction::Right), [(14, 13)]);
        assert_eq!(steps_in(&steps, Direction::Down), [(13, 14)]);
    }

    #[test]
    fn directions_come_out_in_a_stable_order() {
        let expected = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];
        for _ in 0..200 {
            let steps = compute_steps(15, Position::Map((7, 7)), 2, &Direction::ALL, free);
            assert_eq!(steps.directions().collect::<Vec<_>>(), expected);
            let from_iter: Vec<_> = steps.iter().map(|(direction, _)| direction).collect();
            assert_eq!(from_iter, expected);
        }

        let reversed = [Direction::Right, Direction::Left, Direction::Down, Direction::Up];
        let steps = compute_steps(15, Position::Map((7, 7)), 2, &reversed, free);
        assert_eq!(steps.directions().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn zero_budget_keeps_directions_without_steps() {
        let steps = compute_steps(15, Position::Map((7, 7)), 0, &Direction::ALL, free);

        assert_eq!(steps.directions().count(), 4);
        assert!(steps.is_empty());
    }

    #[test]
    fn hops_over_a_single_player_without_spending_steps() {
        let occupied = |coords: Coord2| coords == (7, 8);
        let steps = compute_steps(15, Position::Map((7, 7)), 2, &[Direction::Down], occupied);

        assert_eq!(steps_in(&steps, Direction::Down), [(7, 9), (7, 10)]);
    }

    #[test]
    fn two_players_in_a_row_block_the_way() {
        let occupied = |coords: Coord2| coords == (7, 9) || coords == (7, 10);
        let steps = compute_steps(15, Position::Map((7, 7)), 3, &[Direction::Down], occupied);

        assert_eq!(steps_in(&steps, Direction::Down), [(7, 8)]);
    }

    #[test]
    fn separated_players_can_both_be_hopped() {
        let occupied = |coords: Coord2| coords == (6, 7) || coords == (4, 7);
        let steps = compute_steps(15, Position::Map((7, 7)), 2, &[Direction::Left], occupied);

        assert_eq!(steps_in(&steps, Direction::Left), [(5, 7), (3, 7)]);
    }

    #[test]
    fn submarine_only_searches_down_from_the_middle_column() {
        let steps = compute_steps(15, Position::Submarine, 3, &Direction::ALL, free);

        assert_eq!(steps.directions().collect::<Vec<_>>(), [Direction::Down]);
        assert_eq!(steps_in(&steps, Direction::Down), [(7, 0), (7, 1), (7, 2)]);
    }

    #[test]
    fn results_stay_on_the_line_and_off_occupied_tiles() {
        let occupied = |(x, y): Coord2| (x + y) % 3 == 0;
        for x in 0..15 {
            for y in 0..15 {
                for budget in 0..=3 {
                    let steps =
                        compute_steps(15, Position::Map((x, y)), budget, &Direction::ALL, occupied);
                    for (direction, list) in steps.iter() {
                        assert!(list.len() <= usize::from(budget));
                        for &coords in list {
                            assert_ne!(coords, (x, y));
                            assert!(coords.0 < 15 && coords.1 < 15);
                            assert!(!occupied(coords));
                            match direction {
                                Direction::Up => assert!(coords.0 == x && coords.1 < y),
                                Direction::Down => assert!(coords.0 == x && coords.1 > y),
                                Direction::Left => assert!(coords.1 == y && coords.0 < x),
                                Direction::Right => assert!(coords.1 == y && coords.0 > x),
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn finds_a_bomb_passed_on_the_way() {
        let grid = MapGrid::from_layout(15, &[((7, 9), Cell::Bomb)]).unwrap();
        let steps = compute_steps(15, Position::Map((7, 7)), 3, &Direction::ALL, free);

        assert_eq!(steps.first_bomb_along((7, 10), &grid), Some((7, 9)));
        assert_eq!(steps.first_bomb_along((7, 9), &grid), Some((7, 9)));
        assert_eq!(steps.first_bomb_along((7, 8), &grid), None);
        assert_eq!(steps.first_bomb_along((8, 7), &grid), None);
        assert_eq!(steps.first_bomb_along((0, 0), &grid), None);
    }
}
