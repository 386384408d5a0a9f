use rand::Rng;

use super::resolve::{Resolution, resolve};
use crate::board::{Grid, Position, matches::find_matches};

#[derive(Debug, Clone)]
pub enum SwapOutcome {
    /// Out of bounds or not neighbours. Nothing was touched.
    Invalid,
    /// The exchange formed no match and was undone.
    NoMatch,
    /// The exchange stuck and its cascade ran to completion.
    Matched(Resolution),
}

impl SwapOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SwapOutcome::Matched(_))
    }
}

/// Exchanges two neighbouring cells if that creates a match, then resolves
/// the cascade. A swap that creates no match leaves the board as it was.
pub fn attempt_swap<R: Rng + ?Sized>(
    grid: &mut Grid,
    a: Position,
    b: Position,
    kinds: u8,
    rng: &mut R,
) -> SwapOutcome {
    if !grid.contains(a) || !grid.contains(b) || !a.is_adjacent(b) {
        log::debug!("Rejected swap {a} <-> {b}: not adjacent cells");
        return SwapOutcome::Invalid;
    }

    grid.swap(a, b);

    let matches = find_matches(grid);
    if matches.is_empty() {
        grid.swap(a, b);
        log::debug!("Rejected swap {a} <-> {b}: no match");
        return SwapOutcome::NoMatch;
    }

    let resolution = resolve(grid, matches, kinds, rng);
    log::debug!(
        "Swap {a} <-> {b} cleared {} in {} rounds for {}",
        resolution.cleared(),
        resolution.depth(),
        resolution.score()
    );

    SwapOutcome::Matched(resolution)
}
