use std::collections::hash_set;

use fxhash::FxHashSet;
use itertools::Itertools as _;

use super::{Grid, Position};

/// Shortest run that counts as a match.
pub const MIN_RUN: usize = 3;

/// Positions found by one detection pass (or one forced clear).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet(FxHashSet<Position>);

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.0.contains(&pos)
    }

    pub fn insert(&mut self, pos: Position) -> bool {
        self.0.insert(pos)
    }

    pub fn iter(&self) -> hash_set::Iter<'_, Position> {
        self.0.iter()
    }

    /// Row-major order, handy for logs and assertions.
    pub fn sorted(&self) -> Vec<Position> {
        self.0.iter().copied().sorted().collect()
    }
}

impl Extend<Position> for MatchSet {
    fn extend<T: IntoIterator<Item = Position>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}

impl FromIterator<Position> for MatchSet {
    fn from_iter<T: IntoIterator<Item = Position>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a MatchSet {
    type Item = &'a Position;
    type IntoIter = hash_set::Iter<'a, Position>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Every cell that sits in a horizontal or vertical run of at least
/// [`MIN_RUN`] equal, non-empty cells. Runs are reported whole.
pub fn find_matches(grid: &Grid) -> MatchSet {
    let size = grid.size();
    let mut matches = MatchSet::new();

    for i in 0..size {
        let across = (0..size).map(|col| Position::new(i, col));
        let down = (0..size).map(|row| Position::new(row, i));
        collect_runs(grid, across, &mut matches);
        collect_runs(grid, down, &mut matches);
    }

    matches
}

fn collect_runs(grid: &Grid, line: impl Iterator<Item = Position>, matches: &mut MatchSet) {
    for (cell, run) in &line.chunk_by(|&pos| grid[pos]) {
        if cell.is_none() {
            continue;
        }

        let run = run.collect_vec();
        if run.len() >= MIN_RUN {
            matches.extend(run);
        }
    }
}
