use rand::Rng;

use crate::board::{
    BlockType, Grid, compact,
    matches::{MatchSet, find_matches},
};

/// Points for clearing `cleared` cells in one round.
///
/// `10 * n * max(1, n - 2)`: a four-match is worth more than a three-match and
/// a single big clear beats the same cells cleared in small pieces.
pub fn score_for(cleared: usize) -> u32 {
    let n = cleared as u32;
    10 * n * n.saturating_sub(2).max(1)
}

/// One clear, gravity, refill step of a cascade.
#[derive(Debug, Clone)]
pub struct Round {
    pub cleared: MatchSet,
    pub points: u32,
    /// Board after gravity and refill, before the next detection.
    pub grid: Grid,
}

/// Every round triggered by one initiating clear, in order.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub rounds: Vec<Round>,
}

impl Resolution {
    pub fn score(&self) -> u32 {
        self.rounds.iter().map(|r| r.points).sum()
    }

    pub fn cleared(&self) -> usize {
        self.rounds.iter().map(|r| r.cleared.len()).sum()
    }

    /// Number of rounds; 1 means no chain reaction.
    pub fn depth(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }
}

/// Empties every listed cell and returns how many were occupied.
pub fn clear(grid: &mut Grid, positions: &MatchSet) -> usize {
    let mut count = 0;
    for &pos in positions {
        if grid.get(pos).flatten().is_some() {
            grid[pos] = None;
            count += 1;
        }
    }

    count
}

/// Drops blocks down each column; empties end up on top.
pub fn apply_gravity(grid: &mut Grid) {
    for col in 0..grid.size() {
        let mut column = grid.column(col);
        column.reverse();
        compact(&mut column);
        column.reverse();
        grid.set_column(col, &column);
    }
}

/// Fills every empty cell with a random block. Matches are allowed here.
pub fn refill<R: Rng + ?Sized>(grid: &mut Grid, kinds: u8, rng: &mut R) {
    for cell in grid.cells_mut().iter_mut().filter(|c| c.is_none()) {
        *cell = Some(BlockType::random(rng, kinds));
    }
}

/// Clears `initial`, then keeps settling and clearing whatever new matches
/// appear until the board is stable. The board is mutated in place.
///
/// An empty `initial` set skips straight to detection, which still resolves
/// matches already sitting on the board.
pub fn resolve<R: Rng + ?Sized>(
    grid: &mut Grid,
    initial: MatchSet,
    kinds: u8,
    rng: &mut R,
) -> Resolution {
    #[derive(Debug)]
    enum State {
        Clear(MatchSet),
        Settle(MatchSet, u32),
        Detect,
    }

    let mut resolution = Resolution::default();
    let mut state = if initial.is_empty() {
        State::Detect
    } else {
        State::Clear(initial)
    };

    loop {
        state = match state {
            State::Clear(matches) => {
                let points = score_for(clear(grid, &matches));
                State::Settle(matches, points)
            }

            State::Settle(cleared, points) => {
                apply_gravity(grid);
                refill(grid, kinds, rng);

                log::trace!(
                    "Round {}: cleared {} for {points}\n{grid:?}",
                    resolution.depth() + 1,
                    cleared.len()
                );

                resolution.rounds.push(Round {
                    cleared,
                    points,
                    grid: grid.clone(),
                });
                State::Detect
            }

            State::Detect => {
                let matches = find_matches(grid);
                if matches.is_empty() {
                    return resolution;
                }

                State::Clear(matches)
            }
        };
    }
}
