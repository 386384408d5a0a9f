use rand::Rng;

use super::{BlockType, Grid, Position};
use crate::rules::Rules;

/// Builds fresh boards that start without any match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generator {
    pub size: usize,
    pub kinds: u8,
    pub max_retries: u32,
}

impl Generator {
    pub fn new(size: usize, kinds: u8, max_retries: u32) -> Self {
        Self {
            size,
            kinds,
            max_retries,
        }
    }

    /// Fills the board in row-major order, resampling a cell while it would
    /// finish a run of three with the two cells to its left or above it.
    ///
    /// With fewer than three kinds a cell can have no legal value at all. After
    /// `max_retries` rejected samples the last candidate is kept anyway, so the
    /// board may then contain a match.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Grid {
        let mut grid = Grid::empty(self.size);
        let mut fallbacks = 0;

        for pos in grid.positions() {
            let mut block = BlockType::random(rng, self.kinds);
            let mut retries = 0;

            while completes_run(&grid, pos, block) {
                if retries == self.max_retries {
                    fallbacks += 1;
                    break;
                }

                block = BlockType::random(rng, self.kinds);
                retries += 1;
            }

            grid[pos] = Some(block);
        }

        if fallbacks > 0 {
            log::warn!(
                "generator accepted {fallbacks} cells with a match after {} retries each",
                self.max_retries
            );
        }

        log::trace!("Generated board:\n{grid:?}");
        grid
    }
}

impl From<&Rules> for Generator {
    fn from(rules: &Rules) -> Self {
        Self::new(rules.size, rules.kinds, rules.max_retries)
    }
}

fn completes_run(grid: &Grid, pos: Position, block: BlockType) -> bool {
    let same = |dr, dc| {
        pos.offset(dr, dc, grid.size())
            .is_some_and(|p| grid[p] == Some(block))
    };

    (same(0, -1) && same(0, -2)) || (same(-1, 0) && same(-2, 0))
}
