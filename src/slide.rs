//! The 2048 slide-and-merge game.

use std::fmt::{self, Write};

use rand::{Rng, seq::IndexedRandom as _};

pub const SIZE: usize = 4;

/// Exponent of the 2048 tile.
pub const WINNING_EXPONENT: u8 = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Cells of line `i`, starting from the edge tiles move toward.
    fn line(self, i: usize) -> [(usize, usize); SIZE] {
        std::array::from_fn(|j| match self {
            Direction::Left => (i, j),
            Direction::Right => (i, SIZE - 1 - j),
            Direction::Up => (j, i),
            Direction::Down => (SIZE - 1 - j, i),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlideOutcome {
    pub moved: bool,
    pub score_gained: u32,
    /// Cells now holding a tile produced by a merge.
    pub merged: Vec<(usize, usize)>,
}

/// 4x4 board of tile exponents: `0` is empty, `k` is the tile `2^k`.
#[derive(Clone, PartialEq, Eq)]
pub struct SlideGame {
    cells: [[u8; SIZE]; SIZE],
    score: u32,
    reached_goal: bool,
    keep_playing: bool,
}

impl SlideGame {
    /// Fresh game with two random tiles.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut game = Self::from_array([[0; SIZE]; SIZE]);
        game.spawn(rng);
        game.spawn(rng);
        game
    }

    pub fn from_array(cells: [[u8; SIZE]; SIZE]) -> Self {
        let reached_goal = cells.as_flattened().iter().any(|&c| c >= WINNING_EXPONENT);

        Self {
            cells,
            score: 0,
            reached_goal,
            keep_playing: false,
        }
    }

    pub fn to_array(&self) -> [[u8; SIZE]; SIZE] {
        self.cells
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        *self = Self::new(rng);
    }

    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        (0..SIZE)
            .flat_map(|r| (0..SIZE).map(move |c| (r, c)))
            .filter(|&(r, c)| self.cells[r][c] == 0)
            .collect()
    }

    /// Drops a 2 (90%) or a 4 into a random empty cell. `false` if full.
    pub fn spawn<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let Some(&(r, c)) = self.empty_cells().choose(rng) else {
            return false;
        };

        self.cells[r][c] = if rng.random_bool(0.9) { 1 } else { 2 };
        true
    }

    /// Moves every tile toward `direction` without spawning.
    pub fn slide(&mut self, direction: Direction) -> SlideOutcome {
        let mut outcome = SlideOutcome::default();

        for i in 0..SIZE {
            let line = direction.line(i);
            let mut values = line.map(|(r, c)| self.cells[r][c]);
            let before = values;

            let (points, merged) = crate::swipe_left(&mut values);
            outcome.score_gained += points;
            outcome.moved |= values != before;

            for (j, &(r, c)) in line.iter().enumerate() {
                self.cells[r][c] = values[j];
                if merged & (1 << j) != 0 {
                    outcome.merged.push((r, c));
                }
            }
        }

        self.score += outcome.score_gained;
        if !self.reached_goal && self.max_exponent() >= WINNING_EXPONENT {
            log::info!("Reached 2048 with score {}", self.score);
            self.reached_goal = true;
        }

        outcome
    }

    /// A full turn: slide, then spawn a tile if anything moved.
    pub fn play<R: Rng + ?Sized>(&mut self, direction: Direction, rng: &mut R) -> SlideOutcome {
        let outcome = self.slide(direction);
        if outcome.moved {
            self.spawn(rng);
        }

        log::trace!("{direction:?} -> +{}\n{self:?}", outcome.score_gained);
        outcome
    }

    /// An empty cell or two equal neighbours exist.
    pub fn has_moves(&self) -> bool {
        (0..SIZE).any(|r| {
            (0..SIZE).any(|c| {
                let v = self.cells[r][c];
                v == 0
                    || (c + 1 < SIZE && self.cells[r][c + 1] == v)
                    || (r + 1 < SIZE && self.cells[r + 1][c] == v)
            })
        })
    }

    /// True once a 2048 tile exists, until [`Self::keep_playing`] is called.
    pub fn won(&self) -> bool {
        self.reached_goal && !self.keep_playing
    }

    pub fn keep_playing(&mut self) {
        self.keep_playing = true;
    }

    pub fn max_exponent(&self) -> u8 {
        self.cells.as_flattened().iter().copied().max().unwrap_or(0)
    }
}

impl fmt::Debug for SlideGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rows = self.cells.iter();

        if let Some(row) = rows.next() {
            row.iter().try_for_each(|c| write!(f, "{c:2x}"))?
        }

        for row in rows {
            f.write_char('\n')?;
            row.iter().try_for_each(|c| write!(f, "{c:2x}"))?
        }

        Ok(())
    }
}
