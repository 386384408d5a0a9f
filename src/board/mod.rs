use std::{
    fmt::{self, Write},
    ops::{Index, IndexMut},
    str::FromStr,
};

use rand::Rng;
use thiserror::Error;

pub mod generator;
pub mod matches;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BlockType {
    Red,
    Blue,
    Yellow,
    Green,
    Purple,
    Orange,
}

impl BlockType {
    pub const ALL: [BlockType; 6] = [
        BlockType::Red,
        BlockType::Blue,
        BlockType::Yellow,
        BlockType::Green,
        BlockType::Purple,
        BlockType::Orange,
    ];

    /// Uniformly picks one of the first `kinds` block types.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, kinds: u8) -> Self {
        let kinds = (kinds as usize).clamp(1, Self::ALL.len());
        Self::ALL[rng.random_range(0..kinds)]
    }

    pub fn symbol(self) -> char {
        match self {
            BlockType::Red => 'R',
            BlockType::Blue => 'B',
            BlockType::Yellow => 'Y',
            BlockType::Green => 'G',
            BlockType::Purple => 'P',
            BlockType::Orange => 'O',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BlockType::Red => "red",
            BlockType::Blue => "blue",
            BlockType::Yellow => "yellow",
            BlockType::Green => "green",
            BlockType::Purple => "purple",
            BlockType::Orange => "orange",
        }
    }

    pub fn from_symbol(c: char) -> Result<Self, GridError> {
        Self::ALL
            .into_iter()
            .find(|b| b.symbol() == c.to_ascii_uppercase())
            .ok_or(GridError::UnknownSymbol(c))
    }
}

/// `None` is an empty cell. Empties only exist in the middle of a cascade.
pub type Cell = Option<BlockType>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// 4-directional adjacency, no diagonals.
    pub fn is_adjacent(self, other: Position) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }

    /// Moves by `(dr, dc)`, or `None` when that leaves the `size`×`size` board.
    pub fn offset(self, dr: isize, dc: isize, size: usize) -> Option<Position> {
        let row = self.row.checked_add_signed(dr).filter(|&r| r < size)?;
        let col = self.col.checked_add_signed(dc).filter(|&c| c < size)?;
        Some(Position::new(row, col))
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Position::new(row, col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid must be square: row {row} has {len} cells, expected {size}")]
    NotSquare { row: usize, len: usize, size: usize },

    #[error("grid has no rows")]
    Empty,

    #[error("unknown block symbol {0:?}")]
    UnknownSymbol(char),
}

/// Square board stored row-major.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn empty(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, GridError> {
        let size = rows.len();
        if size == 0 {
            return Err(GridError::Empty);
        }

        let mut cells = Vec::with_capacity(size * size);
        for (row, line) in rows.into_iter().enumerate() {
            if line.len() != size {
                return Err(GridError::NotSquare {
                    row,
                    len: line.len(),
                    size,
                });
            }

            cells.extend(line);
        }

        Ok(Self { size, cells })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.size && pos.col < self.size
    }

    /// Bounds-checked lookup.
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.contains(pos)
            .then(|| self.cells[pos.row * self.size + pos.col])
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + use<> {
        let size = self.size;
        (0..size).flat_map(move |row| (0..size).map(move |col| Position::new(row, col)))
    }

    /// Cells in row-major scan order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn swap(&mut self, a: Position, b: Position) {
        let (a, b) = (self.flat(a), self.flat(b));
        self.cells.swap(a, b);
    }

    pub fn count(&self, block: BlockType) -> usize {
        self.cells.iter().filter(|&&c| c == Some(block)).count()
    }

    pub fn num_empty(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    /// Copies column `col` out, top to bottom.
    pub fn column(&self, col: usize) -> Vec<Cell> {
        (0..self.size).map(|row| self[(row, col)]).collect()
    }

    pub fn set_column(&mut self, col: usize, column: &[Cell]) {
        debug_assert_eq!(column.len(), self.size);
        for (row, &cell) in column.iter().enumerate() {
            self[(row, col)] = cell;
        }
    }

    fn flat(&self, pos: Position) -> usize {
        assert!(
            self.contains(pos),
            "{pos} is outside a {0}x{0} grid",
            self.size
        );
        pos.row * self.size + pos.col
    }
}

impl Index<Position> for Grid {
    type Output = Cell;

    fn index(&self, pos: Position) -> &Cell {
        &self.cells[self.flat(pos)]
    }
}

impl IndexMut<Position> for Grid {
    fn index_mut(&mut self, pos: Position) -> &mut Cell {
        let idx = self.flat(pos);
        &mut self.cells[idx]
    }
}

impl Index<(usize, usize)> for Grid {
    type Output = Cell;

    fn index(&self, pos: (usize, usize)) -> &Cell {
        &self[Position::from(pos)]
    }
}

impl IndexMut<(usize, usize)> for Grid {
    fn index_mut(&mut self, pos: (usize, usize)) -> &mut Cell {
        &mut self[Position::from(pos)]
    }
}

/// Whitespace separated rows of block symbols, `.` for an empty cell.
///
/// ```
/// let grid: tile_match::board::Grid = "RRB RBB BRR".parse().unwrap();
/// assert_eq!(grid.size(), 3);
/// ```
impl FromStr for Grid {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows = s
            .split_whitespace()
            .map(|row| {
                row.chars()
                    .map(|c| match c {
                        '.' => Ok(None),
                        c => BlockType::from_symbol(c).map(Some),
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_rows(rows)
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_row(f: &mut fmt::Formatter<'_>, row: &[Cell]) -> fmt::Result {
            row.iter()
                .try_for_each(|c| f.write_char(c.map_or('.', BlockType::symbol)))
        }

        let mut rows = self.cells.chunks(self.size.max(1));

        if let Some(row) = rows.next() {
            write_row(f, row)?
        }

        for row in rows {
            f.write_char('\n')?;
            write_row(f, row)?
        }

        Ok(())
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Moves every occupied cell toward index 0, keeping their order.
pub fn compact(cells: &mut [Cell]) {
    let mut last = 0; // Write ptr
    for current in 0..cells.len() {
        if cells[current].is_some() {
            cells.swap(last, current);
            last += 1;
        }
    }
}

pub mod test_utils {
    use rand::Rng;

    use super::{BlockType, Grid};

    /// Fills every cell at random, matches allowed.
    pub fn random_grid<R: Rng + ?Sized>(rng: &mut R, size: usize, kinds: u8) -> Grid {
        let mut grid = Grid::empty(size);
        for cell in grid.cells_mut() {
            *cell = Some(BlockType::random(rng, kinds));
        }

        grid
    }

    /// Panics on malformed input; meant for literals in tests and benches.
    pub fn grid(rows: &str) -> Grid {
        rows.parse().unwrap()
    }
}
