use std::str::FromStr;

use thiserror::Error;

use crate::{
    board::Position,
    engine::{GameHooks, PowerUp, Session},
};

/// One line of the scripted play protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Tap(Position),
    PowerUp(PowerUp),
    Pause,
    Restart,
    Next,
    Show,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command {0:?}")]
    Unknown(String),

    #[error("`tap` takes a row and a column, e.g. `tap 3 4`")]
    TapArgs,

    #[error("{0:?} is not a board coordinate")]
    Coordinate(String),

    #[error("`{0}` takes no arguments")]
    Trailing(&'static str),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let word = words.next().ok_or(CommandError::Empty)?;

        let command = match word.to_ascii_lowercase().as_str() {
            "tap" | "t" => {
                let mut coordinate = || -> Result<usize, CommandError> {
                    let word = words.next().ok_or(CommandError::TapArgs)?;
                    word.parse::<usize>()
                        .map_err(|_| CommandError::Coordinate(word.to_string()))
                };

                let row = coordinate()?;
                let col = coordinate()?;
                Command::Tap(Position::new(row, col))
            }
            "bomb" | "b" => Command::PowerUp(PowerUp::Bomb),
            "rainbow" | "r" => Command::PowerUp(PowerUp::Rainbow),
            "shuffle" | "s" => Command::PowerUp(PowerUp::Shuffle),
            "pause" | "p" => Command::Pause,
            "restart" => Command::Restart,
            "next" | "n" => Command::Next,
            "show" => Command::Show,
            "quit" | "q" | "exit" => Command::Quit,
            _ => return Err(CommandError::Unknown(word.to_string())),
        };

        if words.next().is_some() {
            return Err(match command {
                Command::Tap(_) => CommandError::TapArgs,
                _ => CommandError::Trailing(command.name()),
            });
        }

        Ok(command)
    }
}

impl Command {
    pub fn name(self) -> &'static str {
        match self {
            Command::Tap(_) => "tap",
            Command::PowerUp(kind) => kind.name(),
            Command::Pause => "pause",
            Command::Restart => "restart",
            Command::Next => "next",
            Command::Show => "show",
            Command::Quit => "quit",
        }
    }

    /// Runs the command against `session`. `Show` and `Quit` are left to the
    /// caller and do nothing here.
    pub fn apply<H: GameHooks>(self, session: &mut Session<H>) {
        match self {
            Command::Tap(pos) => {
                let outcome = session.tap_cell(pos);
                log::debug!("tap {pos}: {outcome:?}");
            }
            Command::PowerUp(kind) => {
                let outcome = session.activate_power_up(kind);
                log::debug!("{kind}: {outcome:?}");
            }
            Command::Pause => {
                session.pause();
            }
            Command::Restart => session.restart(),
            Command::Next => {
                session.next_level();
            }
            Command::Show | Command::Quit => {}
        }
    }
}
