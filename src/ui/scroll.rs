//! Scrolling item window.
//!
//! Shows the highlighted item with its wrapped neighbours: previous,
//! current (marked), next, and in four-line mode the one after that.

use super::CharDisplay;
use crate::config::{DISPLAY_COLS, SELECTION_MARKER};

/// Normalise any signed position into `0..len` by wraparound.
pub fn wrap_index(position: i64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    position.rem_euclid(len as i64) as usize
}

/// Move a highlight by `delta` steps around a list of `len` items.
pub fn step_highlight(current: usize, delta: i32, len: usize) -> usize {
    wrap_index(current as i64 + delta as i64, len)
}

/// Item indices shown on each window row, top to bottom.
pub fn window_indices(current: usize, len: usize, lines: u8) -> impl Iterator<Item = usize> {
    (0..lines as i64).map(move |line| wrap_index(current as i64 + line - 1, len))
}

/// Draw a `lines`-row window whose top-left corner is `(row, col)`.
///
/// Each row is blanked from `col` to the right edge before printing, so
/// leftovers from a longer label never show.
pub fn render_scroll<D, L>(display: &mut D, items: &[L], current: usize, row: u8, col: u8, lines: u8)
where
    D: CharDisplay + ?Sized,
    L: AsRef<str>,
{
    if items.is_empty() {
        return;
    }
    let current = wrap_index(current as i64, items.len());
    for (line, index) in window_indices(current, items.len(), lines).enumerate() {
        let r = row + line as u8;
        blank_span(display, r, col);
        display.goto(r, col);
        display.print(if line == 1 { SELECTION_MARKER } else { "  " });
        display.print(items[index].as_ref());
    }
}

fn blank_span<D: CharDisplay + ?Sized>(display: &mut D, row: u8, col: u8) {
    const BLANK: &str = "                    ";
    display.goto(row, col);
    let width = DISPLAY_COLS.saturating_sub(col) as usize;
    display.print(&BLANK[..width.min(BLANK.len())]);
}
