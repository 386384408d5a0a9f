use std::io::{self, Write};

use crossterm::{
    QueueableCommand,
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};

use crate::{
    board::{BlockType, Position},
    engine::{GameHooks, GameState, PowerUp, Session},
};

/// Interactive terminal game. Returns when the player quits.
///
/// Arrows move the cursor, enter or space taps, `b` `r` `s` pick a power-up,
/// `p` pauses, `n` starts the next level, `x` restarts and `q` quits.
pub fn play<H: GameHooks>(session: &mut Session<H>) -> io::Result<()> {
    let mut screen = Screen::new(io::stdout());
    screen.enter()?;

    run(&mut screen.out, session)
}

/// Raw mode plus the alternate screen. Whatever was entered is undone on drop,
/// including after an error halfway through [`Screen::enter`].
struct Screen<W: Write> {
    out: W,
    raw: bool,
    alternate: bool,
}

impl<W: Write> Screen<W> {
    fn new(out: W) -> Self {
        Self {
            out,
            raw: false,
            alternate: false,
        }
    }

    fn enter(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        self.raw = true;
        self.enter_alternate()
    }

    fn enter_alternate(&mut self) -> io::Result<()> {
        self.alternate = true;
        execute!(self.out, EnterAlternateScreen, Hide)
    }
}

impl<W: Write> Drop for Screen<W> {
    fn drop(&mut self) {
        if self.alternate {
            let _ = execute!(self.out, LeaveAlternateScreen, Show);
        }

        if self.raw {
            let _ = disable_raw_mode();
        }
    }
}

fn run<W: Write, H: GameHooks>(out: &mut W, session: &mut Session<H>) -> io::Result<()> {
    let mut cursor = Position::new(0, 0);

    loop {
        draw(out, session, cursor)?;

        let event = event::read()?;
        let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            continue;
        };

        let size = session.grid().size();
        match code {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Enter | KeyCode::Char(' ') => {
                let outcome = session.tap_cell(cursor);
                log::debug!("tap {cursor}: {outcome:?}");
            }
            KeyCode::Char('b') => {
                session.activate_power_up(PowerUp::Bomb);
            }
            KeyCode::Char('r') => {
                session.activate_power_up(PowerUp::Rainbow);
            }
            KeyCode::Char('s') => {
                session.activate_power_up(PowerUp::Shuffle);
            }
            KeyCode::Char('p') => {
                session.pause();
            }
            KeyCode::Char('n') => {
                session.next_level();
            }
            KeyCode::Char('x') => session.restart(),
            KeyCode::Up => cursor = move_cursor(cursor, -1, 0, size),
            KeyCode::Down => cursor = move_cursor(cursor, 1, 0, size),
            KeyCode::Left => cursor = move_cursor(cursor, 0, -1, size),
            KeyCode::Right => cursor = move_cursor(cursor, 0, 1, size),
            _ => {}
        }
    }

    Ok(())
}

fn draw<W: Write, H: GameHooks>(
    stdout: &mut W,
    session: &Session<H>,
    cursor: Position,
) -> io::Result<()> {
    stdout.queue(Clear(ClearType::All))?;
    stdout.queue(MoveTo(0, 0))?;

    stdout.queue(Print(format!(
        "Level {}  Score {}/{} ({:.0}%)  Moves {}\r\n\r\n",
        session.level(),
        session.score(),
        session.target(),
        session.progress() * 100.0,
        session.moves(),
    )))?;

    let grid = session.grid();
    for row in 0..grid.size() {
        for col in 0..grid.size() {
            let pos = Position::new(row, col);

            let background = if pos == cursor {
                Color::DarkGrey
            } else if session.selected() == Some(pos) {
                Color::White
            } else {
                Color::Reset
            };

            let (symbol, color) = match grid[pos] {
                Some(block) => (block.symbol(), block_color(block)),
                None => ('.', Color::DarkGrey),
            };

            stdout
                .queue(SetBackgroundColor(background))?
                .queue(SetForegroundColor(color))?
                .queue(Print(symbol))?
                .queue(SetBackgroundColor(Color::Reset))?
                .queue(Print(' '))?
                .queue(ResetColor)?;
        }

        stdout.queue(Print("\r\n"))?;
    }

    let armed = match session.active_power_up() {
        Some(kind) => format!("  [{kind} armed]"),
        None => String::new(),
    };

    stdout.queue(Print(format!(
        "\r\n{}{armed}\r\n{}\r\n",
        session.inventory(),
        session.hint()
    )))?;

    let footer = match session.state() {
        GameState::Playing => "arrows move, enter taps, b/r/s power-ups, p pause, q quit",
        GameState::Paused => "paused, p to resume",
        GameState::LevelComplete => "n for the next level, x to restart",
        GameState::GameOver => "x to restart, q to quit",
    };
    stdout
        .queue(SetForegroundColor(Color::DarkGrey))?
        .queue(Print(footer))?
        .queue(ResetColor)?;

    stdout.flush()
}

fn move_cursor(cursor: Position, dr: isize, dc: isize, size: usize) -> Position {
    cursor.offset(dr, dc, size).unwrap_or(cursor)
}

fn block_color(block: BlockType) -> Color {
    match block {
        BlockType::Red => Color::Red,
        BlockType::Blue => Color::Blue,
        BlockType::Yellow => Color::Yellow,
        BlockType::Green => Color::Green,
        BlockType::Purple => Color::Magenta,
        BlockType::Orange => Color::DarkYellow,
    }
}
