use serde::{Deserialize, Serialize};

use crate::*;

/// Why a game ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndCondition {
    /// Every diver went out and is back aboard for good.
    AllReturned,
    /// All but one diver were disqualified by bombs.
    LastDiverStanding,
    /// The oxygen supply ran out.
    OxygenDepleted,
}

/// Checks the end conditions in order, the first match wins.
pub fn evaluate(players: &[Player], oxygen: &OxygenLedger) -> Option<EndCondition> {
    let everybody_returned = !players.is_empty()
        && players
            .iter()
            .all(|player| player.is_on_submarine() && !player.can_leave_submarine());
    if everybody_returned {
        return Some(EndCondition::AllReturned);
    }

    let disqualified = players
        .iter()
        .filter(|player| player.is_on_submarine() && player.is_disqualified())
        .count();
    if !players.is_empty() && disqualified == players.len() - 1 {
        return Some(EndCondition::LastDiverStanding);
    }

    if oxygen.is_depleted() {
        return Some(EndCondition::OxygenDepleted);
    }

    None
}

/// The non-disqualified player holding the most treasure weight, the lowest id on ties.
pub fn winner(players: &[Player]) -> Option<PlayerId> {
    players
        .iter()
        .filter(|player| !player.is_disqualified())
        .min_by_key(|player| (core::cmp::Reverse(player.total_weight()), player.id()))
        .map(Player::id)
}
