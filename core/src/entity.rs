use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Treasure weight in kilograms.
pub type Weight = u32;

/// Player identity, starting at 1.
pub type PlayerId = u8;

pub const MAX_PLAYERS: u8 = 4;

/// Maximum weight a diver can carry before storing treasures on the submarine.
pub const WEIGHT_CAP: Weight = 15;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Treasure {
    depth: Coord,
    weight: Weight,
}

impl Treasure {
    /// Weight doubles every third of the map: `2^floor(3 * depth / map_size)`.
    pub fn new(depth: Coord, map_size: Coord) -> Self {
        debug_assert!(depth < map_size, "treasure depth {depth} outside map {map_size}");
        let exponent = (3 * u32::from(depth)) / u32::from(map_size.max(1));
        Self {
            depth,
            weight: 1 << exponent.min(2),
        }
    }

    pub const fn depth(&self) -> Coord {
        self.depth
    }

    pub const fn weight(&self) -> Weight {
        self.weight
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Bomb,
    Treasure,
}

/// Contents of a single map tile. Consumed cells are replaced by `Empty`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Bomb,
    Treasure(Treasure),
}

impl Cell {
    pub const fn kind(self) -> Option<EntityKind> {
        match self {
            Self::Empty => None,
            Self::Bomb => Some(EntityKind::Bomb),
            Self::Treasure(_) => Some(EntityKind::Treasure),
        }
    }

    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    pub const fn treasure(self) -> Option<Treasure> {
        match self {
            Self::Treasure(treasure) => Some(treasure),
            _ => None,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::Empty
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    id: PlayerId,
    position: Position,
    playing: bool,
    disqualified: bool,
    has_left_submarine: bool,
    treasures: Vec<Treasure>,
    stored_treasures: Vec<Treasure>,
}

impl Player {
    fn new(id: PlayerId) -> Self {
        Self {
            id,
            position: Position::Submarine,
            playing: true,
            disqualified: false,
            has_left_submarine: false,
            treasures: Vec::new(),
            stored_treasures: Vec::new(),
        }
    }

    pub const fn id(&self) -> PlayerId {
        self.id
    }

    pub const fn position(&self) -> Position {
        self.position
    }

    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    pub const fn is_disqualified(&self) -> bool {
        self.disqualified
    }

    pub const fn has_left_submarine(&self) -> bool {
        self.has_left_submarine
    }

    pub const fn is_on_submarine(&self) -> bool {
        self.position.is_on_submarine()
    }

    /// A diver leaves the submarine only once, returning ends their run.
    pub const fn can_leave_submarine(&self) -> bool {
        !self.has_left_submarine && self.is_on_submarine()
    }

    /// 0 while aboard, row + 1 otherwise.
    pub fn depth(&self) -> Weight {
        match self.position {
            Position::Submarine => 0,
            Position::Map((_, y)) => Weight::from(y) + 1,
        }
    }

    pub fn treasures(&self) -> &[Treasure] {
        &self.treasures
    }

    pub fn stored_treasures(&self) -> &[Treasure] {
        &self.stored_treasures
    }

    pub fn treasure_count(&self) -> usize {
        self.treasures.len()
    }

    pub fn stored_treasure_count(&self) -> usize {
        self.stored_treasures.len()
    }

    pub fn total_treasure_count(&self) -> usize {
        self.treasure_count() + self.stored_treasure_count()
    }

    pub fn carried_weight(&self) -> Weight {
        self.treasures.iter().map(Treasure::weight).sum()
    }

    pub fn stored_weight(&self) -> Weight {
        self.stored_treasures.iter().map(Treasure::weight).sum()
    }

    pub fn total_weight(&self) -> Weight {
        self.carried_weight() + self.stored_weight()
    }

    pub fn can_carry(&self, treasure: &Treasure) -> bool {
        self.carried_weight() + treasure.weight() <= WEIGHT_CAP
    }

    pub(crate) fn move_to(&mut self, coords: Coord2) {
        self.position = Position::Map(coords);
        self.has_left_submarine = true;
    }

    /// Sends the player back aboard for the rest of the game.
    pub(crate) fn board(&mut self) {
        self.position = Position::Submarine;
        self.playing = false;
    }

    pub(crate) fn disqualify(&mut self) {
        self.board();
        self.disqualified = true;
    }

    pub(crate) fn carry(&mut self, treasure: Treasure) -> Result<()> {
        if !self.can_carry(&treasure) {
            return Err(GameError::OverweightRejected {
                carried: self.carried_weight(),
                offered: treasure.weight(),
                cap: WEIGHT_CAP,
            });
        }
        self.treasures.push(treasure);
        Ok(())
    }

    /// Moves every carried treasure to the stored list, returns how many were moved.
    pub(crate) fn store_treasures(&mut self) -> usize {
        let count = self.treasures.len();
        self.stored_treasures.append(&mut self.treasures);
        count
    }
}

/// Hands out sequential player identities up to a fixed capacity.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerFactory {
    next_id: PlayerId,
    capacity: u8,
}

impl PlayerFactory {
    pub fn new(capacity: u8) -> Self {
        Self {
            next_id: 1,
            capacity: capacity.min(MAX_PLAYERS),
        }
    }

    pub fn create(&mut self) -> Result<Player> {
        if self.next_id > self.capacity {
            return Err(GameError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        let player = Player::new(self.next_id);
        self.next_id += 1;
        Ok(player)
    }

    pub fn create_many(&mut self, count: u8) -> Result<Vec<Player>> {
        (0..count).map(|_| self.create()).collect()
    }
}

impl Default for PlayerFactory {
    fn default() -> Self {
        Self::new(MAX_PLAYERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn treasure_weight_grows_with_depth() {
        assert_eq!(Treasure::new(0, 15).weight(), 1);
        assert_eq!(Treasure::new(4, 15).weight(), 1);
        assert_eq!(Treasure::new(5, 15).weight(), 2);
        assert_eq!(Treasure::new(9, 15).weight(), 2);
        assert_eq!(Treasure::new(10, 15).weight(), 4);
        assert_eq!(Treasure::new(14, 15).weight(), 4);
    }

    #[test]
    fn treasure_weight_is_always_a_known_tier() {
        for map_size in 15..=30 {
            for depth in 0..map_size {
                let weight = Treasure::new(depth, map_size).weight();
                assert!(
                    matches!(weight, 1 | 2 | 4),
                    "depth {depth} in {map_size} weighs {weight}"
                );
            }
        }
    }

    #[test]
    fn factory_assigns_sequential_ids_until_capacity() {
        let mut factory = PlayerFactory::default();
        let players = factory.create_many(4).unwrap();

        let ids: Vec<_> = players.iter().map(Player::id).collect();
        assert_eq!(ids, [1, 2, 3, 4]);
        assert_eq!(
            factory.create(),
            Err(GameError::CapacityExceeded { capacity: 4 })
        );
    }

    #[test]
    fn depth_counts_from_the_surface() {
        let mut player = PlayerFactory::default().create().unwrap();
        assert_eq!(player.depth(), 0);
        assert!(player.can_leave_submarine());

        player.move_to((7, 2));
        assert_eq!(player.depth(), 3);
        assert!(player.has_left_submarine());

        player.board();
        assert!(player.is_on_submarine());
        assert!(!player.can_leave_submarine());
        assert!(!player.is_playing());
    }

    #[test]
    fn carrying_respects_weight_cap() {
        let mut player = PlayerFactory::default().create().unwrap();
        for _ in 0..3 {
            player.carry(Treasure::new(14, 15)).unwrap();
        }
        player.carry(Treasure::new(7, 15)).unwrap();
        assert_eq!(player.carried_weight(), 14);

        let err = player.carry(Treasure::new(5, 15)).unwrap_err();
        assert_eq!(
            err,
            GameError::OverweightRejected {
                carried: 14,
                offered: 2,
                cap: WEIGHT_CAP
            }
        );
        player.carry(Treasure::new(0, 15)).unwrap();
        assert_eq!(player.carried_weight(), WEIGHT_CAP);
    }

    #[test]
    fn storing_moves_carried_treasures() {
        let mut player = PlayerFactory::default().create().unwrap();
        player.carry(Treasure::new(10, 15)).unwrap();
        player.carry(Treasure::new(0, 15)).unwrap();

        assert_eq!(player.store_treasures(), 2);
        assert_eq!(player.carried_weight(), 0);
        assert_eq!(player.stored_weight(), 5);
        assert_eq!(player.total_weight(), 5);
        assert_eq!(player.total_treasure_count(), 2);
    }

    #[test]
    fn disqualified_player_is_sent_aboard() {
        let mut player = PlayerFactory::default().create().unwrap();
        player.move_to((1, 4));
        player.disqualify();

        assert!(player.is_disqualified());
        assert!(!player.is_playing());
        assert_eq!(player.position(), Position::Submarine);
    }
}
