//! SSD1306 OLED display as a character surface.
//!
//! Text goes into a `TextGrid` back buffer; `flush` redraws the panel
//! from it with a 6×10 font (21 columns × 6 rows on 128×64).

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;

use super::grid::TextGrid;
use super::CharDisplay;
use crate::error::Error;

/// Character columns on the panel.
pub const TEXT_COLS: usize = 21;
/// Character rows on the panel.
pub const TEXT_ROWS: usize = 6;

const ROW_HEIGHT: i32 = 10;

/// Type alias for the concrete display driver.
///
/// Generic over the I²C implementation so callers pass in their HAL's
/// I²C peripheral.
pub type Display<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

/// The OLED with a character back buffer.
pub struct OledText<I2C> {
    display: Display<I2C>,
    grid: TextGrid<TEXT_COLS, TEXT_ROWS>,
}

impl<I2C> OledText<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    /// Initialise the SSD1306 and blank it.
    pub fn new(i2c: I2C) -> Result<Self, Error> {
        let interface = I2CDisplayInterface::new(i2c);
        let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        display.init().map_err(|_| Error::Display)?;
        display.clear_buffer();
        display.flush().map_err(|_| Error::Display)?;
        Ok(Self {
            display,
            grid: TextGrid::new(),
        })
    }
}

fn text_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(BinaryColor::On)
        .build()
}

impl<I2C> CharDisplay for OledText<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    fn clear(&mut self) {
        self.grid.clear();
    }

    fn clear_row(&mut self, row: u8) {
        self.grid.clear_row(row);
    }

    fn goto(&mut self, row: u8, col: u8) {
        self.grid.goto(row, col);
    }

    fn print(&mut self, text: &str) {
        self.grid.print(text);
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.display.clear_buffer();
        let style = text_style();
        for (row, line) in self.grid.rows().enumerate() {
            let origin = Point::new(0, row as i32 * ROW_HEIGHT);
            let _ = Text::with_baseline(line, origin, style, Baseline::Top).draw(&mut self.display);
        }
        self.display.flush().map_err(|_| Error::Display)
    }
}
