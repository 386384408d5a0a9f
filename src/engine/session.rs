use rand::{SeedableRng, rngs::StdRng};

use super::{
    hooks::{GameEvent, GameHooks},
    power_up::{self, Inventory, PowerUp},
    resolve::{Resolution, resolve},
    swap::{SwapOutcome, attempt_swap},
};
use crate::{
    board::{Grid, Position, generator::Generator},
    rules::{Rules, RulesError},
};

const WELCOME: &str = "Match 3 or more identical blocks to clear them!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    Paused,
    LevelComplete,
    GameOver,
}

/// What one clear (swap or power-up) achieved, cascade included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub cleared: usize,
    pub points: u32,
    pub rounds: usize,
}

impl From<&Resolution> for Summary {
    fn from(resolution: &Resolution) -> Self {
        Self {
            cleared: resolution.cleared(),
            points: resolution.score(),
            rounds: resolution.depth(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// Not playing, or the position is off the board.
    Ignored,
    Selected(Position),
    Deselected,
    /// The swap or power-up target did nothing. Costs nothing.
    Rejected,
    Resolved(Summary),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivateOutcome {
    /// Not playing, or none of that kind left.
    Ignored,
    Armed(PowerUp),
    Disarmed(PowerUp),
    Shuffled,
}

/// One player's game: board, score, level progress and power-ups.
///
/// Every input runs to completion, cascades included, before the method
/// returns. Hooks are told about an event only after the state reflects it.
pub struct Session<H: GameHooks = ()> {
    rules: Rules,
    rng: StdRng,
    hooks: H,

    grid: Grid,
    score: u32,
    level: u32,
    moves: u32,
    target: u32,
    inventory: Inventory,
    active: Option<PowerUp>,
    selected: Option<Position>,
    state: GameState,
    hint: String,
    last_resolution: Option<Resolution>,
}

impl Session {
    pub fn new(rules: Rules, seed: u64) -> Result<Self, RulesError> {
        Self::with_hooks(rules, seed, ())
    }
}

impl<H: GameHooks> Session<H> {
    pub fn with_hooks(rules: Rules, seed: u64, hooks: H) -> Result<Self, RulesError> {
        rules.validate()?;

        let mut rng = StdRng::seed_from_u64(seed);
        let grid = Generator::from(&rules).generate(&mut rng);

        Ok(Self {
            score: 0,
            level: 1,
            moves: rules.base_moves,
            target: rules.target_for(1),
            inventory: rules.inventory,
            active: None,
            selected: None,
            state: GameState::Playing,
            hint: WELCOME.to_string(),
            last_resolution: None,
            grid,
            rules,
            rng,
            hooks,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn inventory(&self) -> Inventory {
        self.inventory
    }

    pub fn active_power_up(&self) -> Option<PowerUp> {
        self.active
    }

    pub fn selected(&self) -> Option<Position> {
        self.selected
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn hint(&self) -> &str {
        &self.hint
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Rounds of the most recent clear, for replaying as animation frames.
    pub fn last_resolution(&self) -> Option<&Resolution> {
        self.last_resolution.as_ref()
    }

    /// `score / target`, capped at 1.
    pub fn progress(&self) -> f64 {
        (self.score as f64 / self.target as f64).min(1.0)
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn into_hooks(self) -> H {
        self.hooks
    }

    /// Player tapped `pos`: fires an armed power-up, or drives the
    /// select-then-swap interaction.
    pub fn tap_cell(&mut self, pos: Position) -> TapOutcome {
        if self.state != GameState::Playing || !self.grid.contains(pos) {
            return TapOutcome::Ignored;
        }

        if let Some(kind) = self.active {
            return self.use_power_up(kind, pos);
        }

        match self.selected {
            Some(selected) if selected == pos => {
                self.selected = None;
                self.hint = "Selection cleared".to_string();
                TapOutcome::Deselected
            }
            Some(selected) if selected.is_adjacent(pos) => {
                self.selected = None;
                self.swap(selected, pos)
            }
            _ => {
                self.selected = Some(pos);
                self.hint = format!("Selected {pos}, pick a neighbour to swap with");
                self.emit(GameEvent::Selected(pos));
                TapOutcome::Selected(pos)
            }
        }
    }

    /// Direct swap request. Costs a move only when it produces a match.
    pub fn swap(&mut self, a: Position, b: Position) -> TapOutcome {
        if self.state != GameState::Playing {
            return TapOutcome::Ignored;
        }

        match attempt_swap(&mut self.grid, a, b, self.rules.kinds, &mut self.rng) {
            SwapOutcome::Invalid | SwapOutcome::NoMatch => {
                self.hint = "No match there, try another swap!".to_string();
                self.emit(GameEvent::InvalidMove);
                TapOutcome::Rejected
            }
            SwapOutcome::Matched(resolution) => {
                self.moves = self.moves.saturating_sub(1);
                self.emit(GameEvent::Swapped);

                let summary = Summary::from(&resolution);
                let combo = match summary.rounds {
                    0 | 1 => String::new(),
                    n => format!(" {n}x combo!"),
                };
                self.hint = format!(
                    "Cleared {} blocks, +{} points!{combo}",
                    summary.cleared, summary.points
                );

                self.finish_clear(resolution)
            }
        }
    }

    /// Arms a targeted power-up, disarms it if already armed, or fires a
    /// shuffle straight away. Power-ups are paid for when they take effect.
    pub fn activate_power_up(&mut self, kind: PowerUp) -> ActivateOutcome {
        if self.state != GameState::Playing || self.inventory.get(kind) == 0 {
            return ActivateOutcome::Ignored;
        }

        if self.active == Some(kind) {
            self.active = None;
            self.hint = "Power-up cancelled".to_string();
            self.emit(GameEvent::Disarmed(kind));
            return ActivateOutcome::Disarmed(kind);
        }

        self.selected = None;
        if let Some(armed) = self.active.take() {
            self.emit(GameEvent::Disarmed(armed));
        }

        if kind.needs_target() {
            self.active = Some(kind);
            self.hint = format!("Pick a target for the {}", kind.description());
            self.emit(GameEvent::Armed(kind));
            return ActivateOutcome::Armed(kind);
        }

        self.inventory.take(kind);
        power_up::shuffle(&mut self.grid, &mut self.rng);
        log::debug!("Shuffled board:\n{:?}", self.grid);

        self.hint = "Board shuffled, look for new matches!".to_string();
        self.emit(GameEvent::Shuffled);
        ActivateOutcome::Shuffled
    }

    /// Toggles between playing and paused. Other states are left alone.
    pub fn pause(&mut self) -> GameState {
        match self.state {
            GameState::Playing => {
                self.state = GameState::Paused;
                self.hint = "Paused".to_string();
                self.emit(GameEvent::Paused);
            }
            GameState::Paused => {
                self.state = GameState::Playing;
                self.hint = WELCOME.to_string();
                self.emit(GameEvent::Resumed);
            }
            GameState::LevelComplete | GameState::GameOver => {}
        }

        self.state
    }

    /// Back to level one with the starting inventory and a fresh board.
    pub fn restart(&mut self) {
        self.score = 0;
        self.level = 1;
        self.moves = self.rules.base_moves;
        self.target = self.rules.target_for(1);
        self.inventory = self.rules.inventory;
        self.reset_board();
        self.hint = WELCOME.to_string();

        log::info!("Restarted, target {}", self.target);
        self.emit(GameEvent::Restarted);
    }

    /// Moves on from a completed level. Returns `false` in any other state.
    ///
    /// Score starts from zero on every level; the target still rises.
    pub fn next_level(&mut self) -> bool {
        if self.state != GameState::LevelComplete {
            return false;
        }

        self.level += 1;
        self.target = self.rules.target_for(self.level);
        self.moves = self.rules.base_moves;
        self.score = 0;
        self.inventory.grant_level_bonus(self.level);
        self.reset_board();
        self.hint = format!(
            "Welcome to level {}! Target: {} points",
            self.level, self.target
        );

        log::info!(
            "Level {} started, target {}, inventory {}",
            self.level,
            self.target,
            self.inventory
        );
        self.emit(GameEvent::LevelStarted(self.level));
        true
    }

    fn use_power_up(&mut self, kind: PowerUp, target: Position) -> TapOutcome {
        let affected = power_up::affected_positions(&self.grid, kind, target).unwrap_or_default();
        if affected.is_empty() {
            self.hint = format!("Pick a block to use the {kind} on");
            return TapOutcome::Rejected;
        }

        if !self.inventory.take(kind) {
            self.active = None;
            return TapOutcome::Ignored;
        }

        self.active = None;

        let event = match kind {
            PowerUp::Bomb => Some(GameEvent::Bomb(target)),
            PowerUp::Rainbow => self.grid[target].map(GameEvent::Rainbow),
            PowerUp::Shuffle => None,
        };

        let resolution = resolve(&mut self.grid, affected, self.rules.kinds, &mut self.rng);
        let summary = Summary::from(&resolution);
        log::debug!(
            "{kind} at {target} cleared {} in {} rounds for {}",
            summary.cleared,
            summary.rounds,
            summary.points
        );

        self.hint = match event {
            Some(GameEvent::Bomb(_)) => format!(
                "Boom! Cleared {} blocks, +{} points!",
                summary.cleared, summary.points
            ),
            Some(GameEvent::Rainbow(block)) => format!(
                "Rainbow! Every {} block is gone, +{} points!",
                block.name(),
                summary.points
            ),
            _ => format!(
                "Cleared {} blocks, +{} points!",
                summary.cleared, summary.points
            ),
        };

        if let Some(event) = event {
            self.emit(event);
        }

        self.finish_clear(resolution)
    }

    fn finish_clear(&mut self, resolution: Resolution) -> TapOutcome {
        let summary = Summary::from(&resolution);
        self.score += summary.points;
        self.last_resolution = Some(resolution);

        self.emit(GameEvent::Matched {
            cleared: summary.cleared,
            points: summary.points,
            rounds: summary.rounds,
        });

        self.check_progress();
        TapOutcome::Resolved(summary)
    }

    fn check_progress(&mut self) {
        if self.score >= self.target {
            self.state = GameState::LevelComplete;
            self.hint = "Level complete!".to_string();
            log::info!("Level {} complete with {} points", self.level, self.score);
            self.emit(GameEvent::LevelComplete);
        } else if self.moves == 0 {
            self.state = GameState::GameOver;
            self.hint = "Game over, try again!".to_string();
            log::info!(
                "Game over on level {} with {} points",
                self.level,
                self.score
            );
            self.emit(GameEvent::GameOver);
        }
    }

    fn reset_board(&mut self) {
        self.grid = Generator::from(&self.rules).generate(&mut self.rng);
        self.state = GameState::Playing;
        self.selected = None;
        self.active = None;
        self.last_resolution = None;
    }

    fn emit(&mut self, event: GameEvent) {
        self.hooks.on_event(&event);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::board::{BlockType, matches::find_matches, test_utils};

    /// Match-free board; swapping (0,2) with (1,2) completes four reds in
    /// the top row, swapping (7,6) with (7,7) matches nothing.
    fn fixture() -> Grid {
        test_utils::grid(
            "RRPRYPRY BGRBGOBG YPRYPRYP GOBGOBGO PRYPRYPR OBGOBGOB RYPRYPRY BGOBGOBG",
        )
    }

    fn session(rules: Rules) -> Session<Vec<GameEvent>> {
        let mut session = Session::with_hooks(rules, 17, Vec::new()).unwrap();
        session.grid = fixture();
        session
    }

    const GOOD: (Position, Position) = (Position::new(0, 2), Position::new(1, 2));
    const BAD: (Position, Position) = (Position::new(7, 6), Position::new(7, 7));

    #[test]
    fn test_fixture_is_stable() {
        assert!(find_matches(&fixture()).is_empty());
    }

    #[test]
    fn test_new_session() {
        let session = Session::new(Rules::default(), 1).unwrap();
        assert!(find_matches(session.grid()).is_empty());
        assert_eq!(session.grid().size(), 8);
        assert_eq!(session.score(), 0);
        assert_eq!(session.level(), 1);
        assert_eq!(session.moves(), 30);
        assert_eq!(session.target(), 1000);
        assert_eq!(session.inventory(), Inventory::new(3, 2, 1));
        assert_eq!(session.state(), GameState::Playing);
        assert_eq!(session.active_power_up(), None);
        assert_eq!(session.selected(), None);
        assert_eq!(session.hint(), WELCOME);
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let rules = Rules {
            kinds: 1,
            ..Rules::default()
        };
        assert!(matches!(
            Session::new(rules, 0),
            Err(RulesError::BadKinds(1))
        ));
    }

    #[test]
    fn test_moves_accounting() {
        let mut session = session(Rules::default());

        assert_eq!(session.swap(BAD.0, BAD.1), TapOutcome::Rejected);
        assert_eq!(session.moves(), 30);
        assert_eq!(session.grid(), &fixture());

        assert_eq!(
            session.swap(Position::new(0, 0), Position::new(2, 2)),
            TapOutcome::Rejected
        );
        assert_eq!(session.moves(), 30);

        let TapOutcome::Resolved(summary) = session.swap(GOOD.0, GOOD.1) else {
            panic!("swap should match");
        };
        assert_eq!(session.moves(), 29);
        assert!(summary.cleared >= 4);
        assert_eq!(session.score(), summary.points);
        assert!(find_matches(session.grid()).is_empty());

        session.activate_power_up(PowerUp::Bomb);
        session.tap_cell(Position::new(4, 4));
        session.activate_power_up(PowerUp::Shuffle);
        assert_eq!(session.moves(), 29);
    }

    #[test]
    fn test_tap_flow() {
        let mut session = session(Rules::default());

        assert_eq!(session.tap_cell(GOOD.0), TapOutcome::Selected(GOOD.0));
        assert_eq!(session.tap_cell(GOOD.0), TapOutcome::Deselected);
        assert_eq!(session.selected(), None);

        session.tap_cell(GOOD.0);
        let far = Position::new(5, 5);
        assert_eq!(session.tap_cell(far), TapOutcome::Selected(far));

        assert_eq!(session.tap_cell(Position::new(5, 6)), TapOutcome::Rejected);
        assert_eq!(session.selected(), None);
        assert_eq!(session.moves(), 30);

        assert_eq!(session.tap_cell(Position::new(8, 0)), TapOutcome::Ignored);

        session.tap_cell(GOOD.0);
        assert!(matches!(session.tap_cell(GOOD.1), TapOutcome::Resolved(_)));
        assert_eq!(session.moves(), 29);
        assert_eq!(session.selected(), None);
    }

    #[test]
    fn test_bomb_in_corner() {
        let mut session = session(Rules::default());

        assert_eq!(
            session.activate_power_up(PowerUp::Bomb),
            ActivateOutcome::Armed(PowerUp::Bomb)
        );
        // Paid on use, not on arming.
        assert_eq!(session.inventory().get(PowerUp::Bomb), 3);

        let outcome = session.tap_cell(Position::new(7, 0));
        assert!(matches!(outcome, TapOutcome::Resolved(_)));

        let first = &session.last_resolution().unwrap().rounds[0];
        assert_eq!(
            first.cleared.sorted(),
            [
                Position::new(6, 0),
                Position::new(6, 1),
                Position::new(7, 0),
                Position::new(7, 1)
            ]
        );
        assert!(session.score() >= 80);
        let bomb = GameEvent::Bomb(Position::new(7, 0));
        assert!(session.hooks().contains(&bomb));
        assert!(session.hint().starts_with("Boom!"));
        assert_eq!(session.inventory().get(PowerUp::Bomb), 2);
        assert_eq!(session.active_power_up(), None);
        assert_eq!(session.moves(), 30);
    }

    #[test]
    fn test_rainbow_clears_one_colour() {
        let mut session = session(Rules::default());
        let greens = fixture().count(BlockType::Green);

        session.activate_power_up(PowerUp::Rainbow);
        session.tap_cell(Position::new(3, 0));

        let first = &session.last_resolution().unwrap().rounds[0];
        assert_eq!(first.cleared.len(), greens);
        for pos in first.cleared.iter() {
            assert_eq!(fixture()[*pos], Some(BlockType::Green));
        }

        assert_eq!(session.inventory().get(PowerUp::Rainbow), 1);
        let rainbow = GameEvent::Rainbow(BlockType::Green);
        assert!(session.hooks().contains(&rainbow));
    }

    #[test]
    fn test_shuffle_fires_immediately() {
        let mut session = session(Rules::default());
        let counts = BlockType::ALL.map(|b| fixture().count(b));

        assert_eq!(
            session.activate_power_up(PowerUp::Shuffle),
            ActivateOutcome::Shuffled
        );
        assert_eq!(session.inventory().get(PowerUp::Shuffle), 0);
        assert_eq!(BlockType::ALL.map(|b| session.grid().count(b)), counts);
        assert_eq!(session.score(), 0);
        assert_eq!(session.active_power_up(), None);

        assert_eq!(
            session.activate_power_up(PowerUp::Shuffle),
            ActivateOutcome::Ignored
        );
    }

    #[test]
    fn test_shuffle_disarms_armed_power_up() {
        let mut session = session(Rules::default());

        session.activate_power_up(PowerUp::Bomb);
        assert_eq!(
            session.activate_power_up(PowerUp::Shuffle),
            ActivateOutcome::Shuffled
        );
        assert_eq!(session.active_power_up(), None);
        assert_eq!(session.inventory().get(PowerUp::Bomb), 3);

        let events = session.hooks();
        assert_eq!(
            events[events.len() - 2..],
            [GameEvent::Disarmed(PowerUp::Bomb), GameEvent::Shuffled]
        );
    }

    #[test]
    fn test_switching_power_ups_disarms_the_first() {
        let mut session = session(Rules::default());

        session.activate_power_up(PowerUp::Bomb);
        assert_eq!(
            session.activate_power_up(PowerUp::Rainbow),
            ActivateOutcome::Armed(PowerUp::Rainbow)
        );
        assert_eq!(
            session.hooks()[..],
            [
                GameEvent::Armed(PowerUp::Bomb),
                GameEvent::Disarmed(PowerUp::Bomb),
                GameEvent::Armed(PowerUp::Rainbow)
            ]
        );
    }

    #[test]
    fn test_selection_updates_hint() {
        let mut session = session(Rules::default());

        session.tap_cell(GOOD.0);
        assert_ne!(session.hint(), WELCOME);
        assert!(session.hint().contains(&GOOD.0.to_string()));

        let selected = session.hint().to_string();
        session.tap_cell(GOOD.0);
        assert_ne!(session.hint(), selected);
        assert_eq!(session.selected(), None);
    }

    #[test]
    fn test_disarm_and_empty_inventory() {
        let rules = Rules {
            inventory: Inventory::new(1, 0, 0),
            ..Rules::default()
        };
        let mut session = session(rules);

        assert_eq!(
            session.activate_power_up(PowerUp::Rainbow),
            ActivateOutcome::Ignored
        );
        assert_eq!(session.active_power_up(), None);

        session.activate_power_up(PowerUp::Bomb);
        assert_eq!(
            session.activate_power_up(PowerUp::Bomb),
            ActivateOutcome::Disarmed(PowerUp::Bomb)
        );
        assert_eq!(session.active_power_up(), None);
        assert_eq!(session.inventory().get(PowerUp::Bomb), 1);

        // Without an armed power-up the tap is a plain selection again.
        assert_eq!(
            session.tap_cell(Position::new(0, 0)),
            TapOutcome::Selected(Position::new(0, 0))
        );
    }

    #[test]
    fn test_paused_ignores_input() {
        let mut session = session(Rules::default());

        assert_eq!(session.pause(), GameState::Paused);
        assert_eq!(session.tap_cell(GOOD.0), TapOutcome::Ignored);
        assert_eq!(session.swap(GOOD.0, GOOD.1), TapOutcome::Ignored);
        assert_eq!(
            session.activate_power_up(PowerUp::Bomb),
            ActivateOutcome::Ignored
        );
        assert_eq!(session.grid(), &fixture());

        assert_eq!(session.pause(), GameState::Playing);
        let outcome = session.swap(GOOD.0, GOOD.1);
        assert!(matches!(outcome, TapOutcome::Resolved(_)));
    }

    #[test]
    fn test_level_progression() {
        let rules = Rules {
            base_target: 10,
            target_step: 40,
            ..Rules::default()
        };
        let mut session = session(rules);

        assert!(!session.next_level());
        session.swap(GOOD.0, GOOD.1);
        assert_eq!(session.state(), GameState::LevelComplete);
        assert_eq!(session.progress(), 1.0);
        assert_eq!(session.tap_cell(GOOD.0), TapOutcome::Ignored);
        assert_eq!(session.pause(), GameState::LevelComplete);

        let target = session.target();
        assert!(session.next_level());
        assert_eq!(session.level(), 2);
        assert!(session.target() > target);
        assert_eq!(session.target(), 50);
        assert_eq!(session.moves(), 30);
        assert_eq!(session.score(), 0);
        assert_eq!(session.state(), GameState::Playing);
        assert_eq!(session.inventory(), Inventory::new(4, 2, 1));
        assert!(find_matches(session.grid()).is_empty());
        assert!(session.hooks().contains(&GameEvent::LevelStarted(2)));
    }

    #[test]
    fn test_game_over_and_restart() {
        let rules = Rules {
            base_moves: 1,
            base_target: 1_000_000,
            ..Rules::default()
        };
        let mut session = session(rules);

        session.activate_power_up(PowerUp::Bomb);
        session.tap_cell(Position::new(4, 4));
        assert_eq!(session.state(), GameState::Playing);

        session.grid = fixture();
        session.swap(GOOD.0, GOOD.1);
        assert_eq!(session.moves(), 0);
        assert_eq!(session.state(), GameState::GameOver);
        assert!(!session.next_level());
        assert_eq!(session.swap(GOOD.0, GOOD.1), TapOutcome::Ignored);

        session.restart();
        assert_eq!(session.state(), GameState::Playing);
        assert_eq!(session.score(), 0);
        assert_eq!(session.level(), 1);
        assert_eq!(session.moves(), 1);
        assert_eq!(session.target(), 1_000_000);
        assert_eq!(session.inventory(), Inventory::new(3, 2, 1));
        assert!(session.last_resolution().is_none());
    }

    #[test]
    fn test_events_follow_state() {
        let mut session = session(Rules::default());

        session.tap_cell(BAD.0);
        session.tap_cell(BAD.1);
        session.tap_cell(GOOD.0);
        session.tap_cell(GOOD.1);

        let events = session.hooks();
        assert_eq!(events[0], GameEvent::Selected(BAD.0));
        assert_eq!(events[1], GameEvent::InvalidMove);
        assert_eq!(events[2], GameEvent::Selected(GOOD.0));
        assert_eq!(events[3], GameEvent::Swapped);
        assert!(matches!(events[4], GameEvent::Matched { .. }));
    }
}
