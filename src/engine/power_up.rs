use std::fmt;

use rand::{Rng, seq::SliceRandom as _};

use crate::board::{Grid, Position, matches::MatchSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerUp {
    /// Clears the 3x3 block around the target.
    Bomb,
    /// Clears every block with the target's colour.
    Rainbow,
    /// Rearranges the board. Needs no target.
    Shuffle,
}

impl PowerUp {
    pub const ALL: [PowerUp; 3] = [PowerUp::Bomb, PowerUp::Rainbow, PowerUp::Shuffle];

    pub fn needs_target(self) -> bool {
        !matches!(self, PowerUp::Shuffle)
    }

    pub fn name(self) -> &'static str {
        match self {
            PowerUp::Bomb => "bomb",
            PowerUp::Rainbow => "rainbow",
            PowerUp::Shuffle => "shuffle",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PowerUp::Bomb => "bomb (clears the surrounding blocks)",
            PowerUp::Rainbow => "rainbow (clears every block of one colour)",
            PowerUp::Shuffle => "shuffle (rearranges the board)",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for PowerUp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Remaining uses of each power-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inventory([u32; 3]);

impl Inventory {
    pub const fn new(bomb: u32, rainbow: u32, shuffle: u32) -> Self {
        Self([bomb, rainbow, shuffle])
    }

    pub fn get(&self, kind: PowerUp) -> u32 {
        self.0[kind.index()]
    }

    pub fn add(&mut self, kind: PowerUp, amount: u32) {
        self.0[kind.index()] += amount;
    }

    /// Spends one unit. `false` (and no change) when none are left.
    pub fn take(&mut self, kind: PowerUp) -> bool {
        let count = &mut self.0[kind.index()];
        if *count == 0 {
            return false;
        }

        *count -= 1;
        true
    }

    /// Reward for reaching `level`: a bomb every level, a rainbow every third
    /// level and a shuffle every fifth.
    pub fn grant_level_bonus(&mut self, level: u32) {
        self.add(PowerUp::Bomb, 1);

        if level % 3 == 0 {
            self.add(PowerUp::Rainbow, 1);
        }

        if level % 5 == 0 {
            self.add(PowerUp::Shuffle, 1);
        }
    }
}

impl fmt::Display for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds = PowerUp::ALL.into_iter();

        if let Some(kind) = kinds.next() {
            write!(f, "{kind}: {}", self.get(kind))?
        }

        for kind in kinds {
            write!(f, "  {kind}: {}", self.get(kind))?
        }

        Ok(())
    }
}

/// All in-bounds cells of the 3x3 block centred on `center`.
pub fn area(grid: &Grid, center: Position) -> MatchSet {
    if !grid.contains(center) {
        return MatchSet::new();
    }

    (-1..=1)
        .flat_map(|dr| (-1..=1).map(move |dc| (dr, dc)))
        .filter_map(|(dr, dc)| center.offset(dr, dc, grid.size()))
        .collect()
}

/// Every cell holding the same block as `target`. Empty when the target is
/// empty or off the board.
pub fn same_color(grid: &Grid, target: Position) -> MatchSet {
    let Some(Some(block)) = grid.get(target) else {
        return MatchSet::new();
    };

    grid.positions()
        .filter(|&pos| grid[pos] == Some(block))
        .collect()
}

/// The forced clear a targeted power-up performs, or `None` for shuffle.
pub fn affected_positions(grid: &Grid, kind: PowerUp, target: Position) -> Option<MatchSet> {
    match kind {
        PowerUp::Bomb => Some(area(grid, target)),
        PowerUp::Rainbow => Some(same_color(grid, target)),
        PowerUp::Shuffle => None,
    }
}

/// Randomly permutes the cell contents in place. The board is not checked
/// for matches afterwards.
pub fn shuffle<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) {
    grid.cells_mut().shuffle(rng);
}
