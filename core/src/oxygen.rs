use serde::{Deserialize, Serialize};

use crate::*;

/// Shared oxygen supply, drained once per turn by every diver out in the water.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OxygenLedger {
    remaining: i64,
}

impl OxygenLedger {
    pub const fn new(initial: i64) -> Self {
        Self { remaining: initial }
    }

    pub const fn remaining(&self) -> i64 {
        self.remaining
    }

    pub const fn is_depleted(&self) -> bool {
        self.remaining <= 0
    }

    /// `(depth + 1) * total_weight + 1` for each player not aboard the submarine.
    pub fn consumption<'a>(players: impl IntoIterator<Item = &'a Player>) -> i64 {
        players
            .into_iter()
            .filter(|player| !player.is_on_submarine())
            .map(|player| i64::from(player.depth() + 1) * i64::from(player.total_weight()) + 1)
            .sum()
    }

    /// Drains the supply for one elapsed turn, returns the amount consumed.
    pub fn consume<'a>(&mut self, players: impl IntoIterator<Item = &'a Player>) -> i64 {
        let consumed = Self::consumption(players);
        self.remaining -= consumed;
        log::debug!(
            "Consumed {consumed} oxygen, {} remaining",
            self.remaining
        );
        consumed
    }
}
