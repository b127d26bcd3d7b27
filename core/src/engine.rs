use alloc::vec::Vec;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::*;

/// Highest face of the movement dice, the lowest being 0.
pub const DICE_MAX: u8 = 3;

/// Valid transitions:
/// - Unconfigured -> AwaitingFirstPlayerSort
/// - AwaitingFirstPlayerSort -> AwaitingDiceSort
/// - AwaitingDiceSort -> AwaitingPlayerActivation (or the next turn on a zero roll)
/// - AwaitingPlayerActivation -> AwaitingPlayerAction | AwaitingSubmarineOption
/// - AwaitingPlayerAction -> AwaitingPlayerDecision (or the next turn)
/// - AwaitingSubmarineOption -> AwaitingPlayerActivation (or the next turn)
/// - any turn advance -> AwaitingDiceSort | Ended
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Unconfigured,
    AwaitingFirstPlayerSort,
    AwaitingDiceSort,
    AwaitingPlayerActivation,
    AwaitingPlayerAction,
    AwaitingPlayerDecision,
    AwaitingSubmarineOption,
    Ended,
}

impl Phase {
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Ended)
    }
}

impl Default for Phase {
    fn default() -> Self {
        Self::Unconfigured
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmarineOption {
    /// Move every carried treasure to safety, the turn is not spent.
    StoreTreasures,
    /// Climb aboard and stop exploring for the rest of the game.
    Board,
    /// Close the options without changes.
    Cancel,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    NoChange,
    Advanced { player: PlayerId, turn: u32 },
    Ended(EndCondition),
}

impl TurnOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DiceOutcome {
    /// The player must now activate their token.
    Rolled(u8),
    /// A zero roll passes the turn straight away.
    Passed(TurnOutcome),
}

impl DiceOutcome {
    /// A roll always changes the gate, either to activation or to the next turn.
    pub const fn has_update(self) -> bool {
        true
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActivationOutcome {
    NoChange,
    StepsComputed,
    SubmarineOptionsOpened,
}

impl ActivationOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    NoChange,
    Passed(TurnOutcome),
    Moved(TurnOutcome),
    TreasureFound(Treasure),
    Detonated { bomb: Coord2, turn: TurnOutcome },
}

impl ActionOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DecisionOutcome {
    Taken(TurnOutcome),
    Declined(TurnOutcome),
}

impl DecisionOutcome {
    pub const fn has_update(self) -> bool {
        true
    }

    pub const fn turn(self) -> TurnOutcome {
        match self {
            Self::Taken(turn) | Self::Declined(turn) => turn,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SubmarineOutcome {
    Stored(usize),
    Boarded(TurnOutcome),
    Cancelled,
}

impl SubmarineOutcome {
    /// Cancelling only closes the options, nothing else moves.
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

/// Owns the whole game truth: map, players, turn gates and oxygen.
#[derive(Clone, Debug)]
pub struct Game<R = SmallRng> {
    rng: R,
    config: Option<GameConfig>,
    grid: MapGrid,
    players: Vec<Player>,
    phase: Phase,
    turn: u32,
    player_of_turn: Option<PlayerId>,
    sorted_dice_number: u8,
    current_possible_steps: Option<PossibleSteps>,
    treasure_being_taken: Option<Coord2>,
    oxygen: OxygenLedger,
    end_condition: Option<EndCondition>,
}

impl Game<SmallRng> {
    pub fn new(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Game<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            config: None,
            grid: MapGrid::new(),
            players: Vec::new(),
            phase: Phase::Unconfigured,
            turn: 1,
            player_of_turn: None,
            sorted_dice_number: 0,
            current_possible_steps: None,
            treasure_being_taken: None,
            oxygen: OxygenLedger::new(0),
            end_condition: None,
        }
    }

    // Queries

    pub fn config(&self) -> Option<&GameConfig> {
        self.config.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn first_player_sorted(&self) -> bool {
        self.player_of_turn.is_some()
    }

    pub fn need_dice_sort(&self) -> bool {
        self.phase == Phase::AwaitingDiceSort
    }

    pub fn need_player_activation(&self) -> bool {
        self.phase == Phase::AwaitingPlayerActivation
    }

    pub fn need_player_action(&self) -> bool {
        self.phase == Phase::AwaitingPlayerAction
    }

    pub fn need_player_decision(&self) -> bool {
        self.phase == Phase::AwaitingPlayerDecision
    }

    pub fn need_submarine_option(&self) -> bool {
        self.phase == Phase::AwaitingSubmarineOption
    }

    pub fn game_has_ended(&self) -> bool {
        self.phase.is_final()
    }

    pub fn end_condition(&self) -> Option<EndCondition> {
        self.end_condition
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn player_of_turn(&self) -> Option<PlayerId> {
        self.player_of_turn
    }

    pub fn sorted_dice_number(&self) -> u8 {
        self.sorted_dice_number
    }

    pub fn current_possible_steps(&self) -> Option<&PossibleSteps> {
        self.current_possible_steps.as_ref()
    }

    pub fn is_in_current_possible_steps(&self, coords: Coord2) -> bool {
        self.current_possible_steps
            .as_ref()
            .is_some_and(|steps| steps.contains(coords))
    }

    pub fn treasure_being_taken(&self) -> Option<Treasure> {
        self.treasure_being_taken
            .and_then(|coords| self.grid.cell_at(coords))
            .and_then(Cell::treasure)
    }

    pub fn oxygen_remaining(&self) -> i64 {
        self.oxygen.remaining()
    }

    pub fn grid(&self) -> &MapGrid {
        &self.grid
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player> {
        id.checked_sub(1)
            .and_then(|index| self.players.get(usize::from(index)))
            .ok_or(GameError::UnknownPlayer(id))
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.player_of_turn.and_then(|id| self.player(id).ok())
    }

    pub fn player_at(&self, coords: Coord2) -> Option<&Player> {
        self.players
            .iter()
            .find(|player| player.position() == Position::Map(coords))
    }

    pub fn has_player_at(&self, coords: Coord2) -> bool {
        self.player_at(coords).is_some()
    }

    pub fn is_player_at(&self, id: PlayerId, coords: Coord2) -> bool {
        self.player_at(coords).is_some_and(|player| player.id() == id)
    }

    pub fn winner(&self) -> Option<PlayerId> {
        victory::winner(&self.players)
    }

    /// Uniform movement roll in `0..=DICE_MAX`.
    pub fn dice(&mut self) -> u8 {
        self.rng.gen_range(0..=DICE_MAX)
    }

    // Setup

    pub fn configure(&mut self, config: GameConfig) -> Result<()> {
        if self.config.is_some() {
            return Err(GameError::AlreadyConfigured);
        }

        let players = PlayerFactory::new(MAX_PLAYERS).create_many(config.player_count())?;
        self.grid = MapGrid::with_size(config.map_size());
        self.players = players;
        self.oxygen = OxygenLedger::new(config.oxygen());
        self.turn = 1;
        self.player_of_turn = None;
        self.phase = Phase::AwaitingFirstPlayerSort;
        self.config = Some(config);

        log::debug!("Configured game: {config:?}");
        Ok(())
    }

    pub fn populate(&mut self) -> Result<()> {
        let config = self.config.ok_or(GameError::NotConfigured)?;
        self.grid.populate(config.difficulty(), &mut self.rng)
    }

    /// Uses an already populated grid instead of a random one.
    pub fn populate_from(&mut self, grid: MapGrid) -> Result<()> {
        let config = self.config.ok_or(GameError::NotConfigured)?;
        if self.grid.is_populated() {
            return Err(GameError::AlreadyPopulated);
        }
        if !grid.is_populated() {
            return Err(GameError::NotPopulated);
        }
        if grid.size() != Some(config.map_size()) {
            return Err(GameError::GridSizeMismatch);
        }
        self.grid = grid;
        Ok(())
    }

    pub fn sort_first_player(&mut self) -> Result<PlayerId> {
        self.check_first_player_sort()?;
        let count = PlayerId::try_from(self.players.len()).map_err(|_| GameError::NotConfigured)?;
        let id = self.rng.gen_range(1..=count);
        self.set_first_player(id)?;
        Ok(id)
    }

    pub fn set_first_player(&mut self, id: PlayerId) -> Result<()> {
        self.check_first_player_sort()?;
        self.player(id)?;

        self.player_of_turn = Some(id);
        self.set_phase(Phase::AwaitingDiceSort);
        log::debug!("Player {id} plays first");
        Ok(())
    }

    fn check_first_player_sort(&self) -> Result<()> {
        if !self.grid.is_populated() {
            return Err(GameError::NotPopulated);
        }
        self.check_phase("sort_first_player", Phase::AwaitingFirstPlayerSort)
    }

    // Turn commands

    pub fn roll_dice(&mut self) -> Result<DiceOutcome> {
        self.check_phase("roll_dice", Phase::AwaitingDiceSort)?;
        let number = self.dice();
        self.set_dice_number(number)
    }

    /// Applies a roll made by the host, a zero passes the turn.
    pub fn set_dice_number(&mut self, number: u8) -> Result<DiceOutcome> {
        self.check_phase("set_dice_number", Phase::AwaitingDiceSort)?;
        if number > DICE_MAX {
            log::error!("Dice number {number} is above {DICE_MAX}");
            return Err(GameError::InvalidDiceNumber(number));
        }

        self.sorted_dice_number = number;
        log::debug!("Turn {} rolled {number}", self.turn);
        if number == 0 {
            return Ok(DiceOutcome::Passed(self.next_turn()));
        }
        self.set_phase(Phase::AwaitingPlayerActivation);
        Ok(DiceOutcome::Rolled(number))
    }

    /// The current player clicks their own token, or the submarine.
    pub fn activate_at(&mut self, target: Target) -> Result<ActivationOutcome> {
        use ActivationOutcome::*;

        self.check_phase("activate_at", Phase::AwaitingPlayerActivation)?;
        let player = self.current_player_checked()?;
        let (id, position, can_leave) =
            (player.id(), player.position(), player.can_leave_submarine());

        Ok(match (target, position) {
            (Target::Submarine, Position::Submarine) if can_leave => {
                self.open_steps(Position::Submarine, &[Direction::Down]);
                StepsComputed
            }
            (Target::Submarine, Position::Map((_, 0))) => {
                self.set_phase(Phase::AwaitingSubmarineOption);
                log::debug!("Player {id} opened the submarine options");
                SubmarineOptionsOpened
            }
            (Target::Cell(coords), Position::Map(own)) if coords == own => {
                self.open_steps(position, &Direction::ALL);
                StepsComputed
            }
            (Target::Cell(coords), _) => {
                self.grid.validate_coords(coords)?;
                NoChange
            }
            (Target::Submarine, _) => NoChange,
        })
    }

    /// The current player clicks themselves to pass, or one of the highlighted tiles.
    pub fn act_at(&mut self, target: Target) -> Result<ActionOutcome> {
        self.check_phase("act_at", Phase::AwaitingPlayerAction)?;
        let player = self.current_player_checked()?;
        let (id, position) = (player.id(), player.position());

        let destination = match (target, position) {
            (Target::Submarine, Position::Submarine) => return Ok(self.pass_turn(id)),
            (Target::Cell(coords), Position::Map(own)) if coords == own => {
                return Ok(self.pass_turn(id));
            }
            (Target::Submarine, _) => return Ok(ActionOutcome::NoChange),
            (Target::Cell(coords), _) => self.grid.validate_coords(coords)?,
        };

        let Some(steps) = self
            .current_possible_steps
            .as_ref()
            .filter(|steps| steps.contains(destination))
        else {
            return Ok(ActionOutcome::NoChange);
        };
        let bomb = steps.first_bomb_along(destination, &self.grid);
        self.current_possible_steps = None;

        let index = self.player_index(id)?;
        self.players[index].move_to(destination);
        log::debug!("Player {id} moved to {destination:?}");

        if let Some(bomb) = bomb {
            self.grid.take(bomb);
            self.players[index].disqualify();
            log::debug!("Player {id} hit the bomb at {bomb:?} and is disqualified");
            let turn = self.next_turn();
            return Ok(ActionOutcome::Detonated { bomb, turn });
        }

        match self.grid.cell_at(destination).and_then(Cell::treasure) {
            Some(treasure) => {
                self.treasure_being_taken = Some(destination);
                self.set_phase(Phase::AwaitingPlayerDecision);
                Ok(ActionOutcome::TreasureFound(treasure))
            }
            None => Ok(ActionOutcome::Moved(self.next_turn())),
        }
    }

    /// Whether the current player picks up the treasure under them.
    pub fn decide(&mut self, take: bool) -> Result<DecisionOutcome> {
        self.check_phase("decide", Phase::AwaitingPlayerDecision)?;
        let id = self.current_player_checked()?.id();
        let index = self.player_index(id)?;

        if !take {
            self.treasure_being_taken = None;
            log::debug!("Player {id} left the treasure behind");
            return Ok(DecisionOutcome::Declined(self.next_turn()));
        }

        let coords = self
            .treasure_being_taken
            .ok_or(GameError::IllegalTransition {
                command: "decide",
                phase: self.phase,
            })?;
        let Some(treasure) = self.grid.cell_at(coords).and_then(Cell::treasure) else {
            return Err(GameError::IllegalTransition {
                command: "decide",
                phase: self.phase,
            });
        };

        if let Err(err) = self.players[index].carry(treasure) {
            log::warn!("Player {id} can not take the treasure: {err}");
            return Err(err);
        }
        self.grid.take(coords);
        self.treasure_being_taken = None;
        log::debug!(
            "Player {id} took a {}kg treasure, carrying {}kg",
            treasure.weight(),
            self.players[index].carried_weight()
        );
        Ok(DecisionOutcome::Taken(self.next_turn()))
    }

    pub fn choose_submarine_option(&mut self, option: SubmarineOption) -> Result<SubmarineOutcome> {
        self.check_phase("choose_submarine_option", Phase::AwaitingSubmarineOption)?;
        let id = self.current_player_checked()?.id();
        let index = self.player_index(id)?;

        Ok(match option {
            SubmarineOption::StoreTreasures => {
                let stored = self.players[index].store_treasures();
                self.set_phase(Phase::AwaitingPlayerActivation);
                log::debug!("Player {id} stored {stored} treasures");
                SubmarineOutcome::Stored(stored)
            }
            SubmarineOption::Board => {
                self.players[index].board();
                log::debug!("Player {id} is back aboard");
                SubmarineOutcome::Boarded(self.next_turn())
            }
            SubmarineOption::Cancel => {
                self.set_phase(Phase::AwaitingPlayerActivation);
                SubmarineOutcome::Cancelled
            }
        })
    }

    /// Passes the turn to the next player still playing, after checking whether the game is over.
    pub fn next_turn(&mut self) -> TurnOutcome {
        if self.phase.is_final() {
            return TurnOutcome::NoChange;
        }
        let Some(current) = self.player_of_turn else {
            return TurnOutcome::NoChange;
        };

        if let Some(condition) = victory::evaluate(&self.players, &self.oxygen) {
            return self.end_game(condition);
        }

        let count = self.players.len();
        let mut candidate = usize::from(current);
        let mut next = None;
        for _ in 0..count {
            candidate = candidate % count + 1;
            let player = &self.players[candidate - 1];
            if player.is_playing() {
                next = Some(player.id());
                break;
            }
            log::trace!("Skipping player {}, no longer playing", player.id());
        }
        let Some(next) = next else {
            // nobody is playing, so everybody is back aboard
            return self.end_game(EndCondition::AllReturned);
        };

        self.player_of_turn = Some(next);
        self.turn += 1;
        self.current_possible_steps = None;
        self.treasure_being_taken = None;
        self.set_phase(Phase::AwaitingDiceSort);
        self.oxygen.consume(&self.players);
        log::debug!("Turn {} goes to player {next}", self.turn);

        TurnOutcome::Advanced {
            player: next,
            turn: self.turn,
        }
    }

    fn pass_turn(&mut self, id: PlayerId) -> ActionOutcome {
        self.current_possible_steps = None;
        log::debug!("Player {id} passed");
        ActionOutcome::Passed(self.next_turn())
    }

    fn open_steps(&mut self, origin: Position, directions: &[Direction]) {
        let size = self.grid.size().unwrap_or_default();
        let players = &self.players;
        let steps = compute_steps(size, origin, self.sorted_dice_number, directions, |coords| {
            players
                .iter()
                .any(|player| player.position() == Position::Map(coords))
        });
        self.current_possible_steps = Some(steps);
        self.set_phase(Phase::AwaitingPlayerAction);
    }

    fn end_game(&mut self, condition: EndCondition) -> TurnOutcome {
        self.end_condition = Some(condition);
        self.current_possible_steps = None;
        self.treasure_being_taken = None;
        self.set_phase(Phase::Ended);
        log::debug!(
            "Game ended on turn {} ({condition:?}), winner: {:?}",
            self.turn,
            self.winner()
        );
        TurnOutcome::Ended(condition)
    }

    fn set_phase(&mut self, phase: Phase) {
        log::trace!("Phase {:?} -> {phase:?}", self.phase);
        self.phase = phase;
    }

    fn check_phase(&self, command: &'static str, expected: Phase) -> Result<()> {
        match self.phase {
            phase if phase == expected => Ok(()),
            Phase::Ended => Err(GameError::AlreadyEnded),
            Phase::Unconfigured => Err(GameError::NotConfigured),
            phase => Err(GameError::IllegalTransition { command, phase }),
        }
    }

    fn current_player_checked(&self) -> Result<&Player> {
        let id = self.player_of_turn.ok_or(GameError::IllegalTransition {
            command: "current_player",
            phase: self.phase,
        })?;
        self.player(id)
    }

    fn player_index(&self, id: PlayerId) -> Result<usize> {
        self.player(id).map(|_| usize::from(id - 1))
    }
}
