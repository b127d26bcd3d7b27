use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub position: Position,
    pub depth: Weight,
    pub playing: bool,
    pub disqualified: bool,
    pub treasure_count: usize,
    pub stored_treasure_count: usize,
    pub carried_weight: Weight,
    pub stored_weight: Weight,
}

impl From<&Player> for PlayerSummary {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id(),
            position: player.position(),
            depth: player.depth(),
            playing: player.is_playing(),
            disqualified: player.is_disqualified(),
            treasure_count: player.treasure_count(),
            stored_treasure_count: player.stored_treasure_count(),
            carried_weight: player.carried_weight(),
            stored_weight: player.stored_weight(),
        }
    }
}

/// Everything a renderer needs for one frame, detached from the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub phase: Phase,
    pub turn: u32,
    pub player_of_turn: Option<PlayerId>,
    pub sorted_dice_number: u8,
    pub oxygen_remaining: i64,
    pub possible_steps: Option<PossibleSteps>,
    pub treasure_being_taken: Option<Treasure>,
    pub end_condition: Option<EndCondition>,
    pub winner: Option<PlayerId>,
    pub players: Vec<PlayerSummary>,
}

impl GameSnapshot {
    pub fn from_game<R: rand::Rng>(game: &Game<R>) -> Self {
        Self {
            phase: game.phase(),
            turn: game.turn(),
            player_of_turn: game.player_of_turn(),
            sorted_dice_number: game.sorted_dice_number(),
            oxygen_remaining: game.oxygen_remaining(),
            possible_steps: game.current_possible_steps().cloned(),
            treasure_being_taken: game.treasure_being_taken(),
            end_condition: game.end_condition(),
            winner: game.game_has_ended().then(|| game.winner()).flatten(),
            players: game.players().iter().map(PlayerSummary::from).collect(),
        }
    }
}
