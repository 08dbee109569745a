//! In-memory character grid.
//!
//! Used as the back buffer of the OLED surface and directly by host tests.

use super::CharDisplay;

/// `W` columns × `H` rows of ASCII cells with a cursor.
#[derive(Clone)]
pub struct TextGrid<const W: usize, const H: usize> {
    cells: [[u8; W]; H],
    row: usize,
    col: usize,
    flushes: u32,
}

impl<const W: usize, const H: usize> TextGrid<W, H> {
    pub const fn new() -> Self {
        Self {
            cells: [[b' '; W]; H],
            row: 0,
            col: 0,
            flushes: 0,
        }
    }

    /// Contents of one row, padded with spaces. Empty for rows off the grid.
    pub fn row(&self, row: usize) -> &str {
        match self.cells.get(row) {
            // cells only ever hold printable ASCII
            Some(cells) => core::str::from_utf8(cells).unwrap_or(""),
            None => "",
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &str> {
        (0..H).map(move |r| self.row(r))
    }

    /// True if any single row contains `text`.
    pub fn contains(&self, text: &str) -> bool {
        self.rows().any(|r| r.contains(text))
    }

    /// Number of completed render passes.
    pub fn flushes(&self) -> u32 {
        self.flushes
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }
}

impl<const W: usize, const H: usize> Default for TextGrid<W, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const W: usize, const H: usize> CharDisplay for TextGrid<W, H> {
    fn clear(&mut self) {
        self.cells = [[b' '; W]; H];
        self.row = 0;
        self.col = 0;
    }

    fn clear_row(&mut self, row: u8) {
        if let Some(cells) = self.cells.get_mut(row as usize) {
            *cells = [b' '; W];
        }
        self.goto(row, 0);
    }

    fn goto(&mut self, row: u8, col: u8) {
        self.row = row as usize;
        self.col = col as usize;
    }

    fn print(&mut self, text: &str) {
        let Some(cells) = self.cells.get_mut(self.row) else {
            return;
        };
        for byte in text.bytes() {
            if self.col >= W {
                break;
            }
            cells[self.col] = if byte.is_ascii_graphic() || byte == b' ' {
                byte
            } else {
                b'?'
            };
            self.col += 1;
        }
    }

    fn flush(&mut self) -> Result<(), crate::error::Error> {
        self.flushes = self.flushes.wrapping_add(1);
        Ok(())
    }
}
