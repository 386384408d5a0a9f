pub mod board;
pub mod command;
pub mod engine;
pub mod rules;
pub mod slide;
pub mod tui;

/// Slides 2048 tile exponents toward index 0, merging equal neighbours at
/// most once per tile. `0` is an empty cell, `k` is the tile `2^k`.
///
/// Returns the points scored (sum of the merged tile values) and a bitmask of
/// the output slots that hold a merged tile.
pub fn swipe_left(cells: &mut [u8]) -> (u32, u16) {
    debug_assert!(cells.len() <= 16);

    // Find first non empty cell
    let Some(current) = cells.iter().position(|&c| c != 0) else {
        return (0, 0);
    };

    let mut points = 0u32;
    let mut merged = 0u16;

    let mut last = 0; // Write ptr
    cells.swap(last, current);

    for current in current + 1..cells.len() {
        if cells[current] == 0 {
            continue;
        } else if cells[current] == cells[last] {
            cells[last] += 1;
            cells[current] = 0;
            points += 1u32 << cells[last];
            merged |= 1u16 << last;
            last += 1;
        } else {
            (cells[last] != 0).then(|| last += 1);
            cells.swap(last, current);
        }
    }

    (points, merged)
}
