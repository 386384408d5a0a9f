use crate::board::{BlockType, Position};

use super::power_up::PowerUp;

/// Something a presentation layer may want to react to, usually with a sound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Selected(Position),
    Swapped,
    InvalidMove,
    Matched {
        cleared: usize,
        points: u32,
        rounds: usize,
    },
    Bomb(Position),
    Rainbow(BlockType),
    Shuffled,
    Armed(PowerUp),
    Disarmed(PowerUp),
    Paused,
    Resumed,
    LevelComplete,
    GameOver,
    LevelStarted(u32),
    Restarted,
}

/// Observer injected into a session. Called after each state change is done.
pub trait GameHooks {
    fn on_event(&mut self, event: &GameEvent);
}

impl GameHooks for () {
    fn on_event(&mut self, _event: &GameEvent) {}
}

/// Records events in order.
impl GameHooks for Vec<GameEvent> {
    fn on_event(&mut self, event: &GameEvent) {
        self.push(event.clone());
    }
}

impl<H: GameHooks + ?Sized> GameHooks for &mut H {
    fn on_event(&mut self, event: &GameEvent) {
        (**self).on_event(event)
    }
}
