//! User interface subsystem - character display + rotary encoder.
//!
//! The menu engine draws on a cursor-addressed character surface and
//! reads a single push button plus a quadrature encoder.
//!
//! ## Components
//!
//! - **CharDisplay**: the character-surface primitives every producer uses
//! - **RenderGate**: scoped exclusive access to the shared display
//! - **Input logic**: short/long push classification, coarse/fine steps
//! - **Display** (embedded): SSD1306 128×64 OLED via I²C as a text surface
//! - **Buttons** (embedded): push-button pin and QDEC encoder task

#[cfg(feature = "embedded")]
pub mod buttons;
#[cfg(feature = "embedded")]
pub mod display;
pub mod grid;
pub mod input_logic;
pub mod scroll;

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::error::Error;

/// Cursor-addressed character surface.
///
/// Rows and columns are zero-based. Text printed past the right edge is
/// dropped.
pub trait CharDisplay {
    /// Blank the whole surface and home the cursor.
    fn clear(&mut self);
    /// Blank one row and put the cursor at its start.
    fn clear_row(&mut self, row: u8);
    /// Move the cursor.
    fn goto(&mut self, row: u8, col: u8);
    /// Print at the cursor and advance it.
    fn print(&mut self, text: &str);
    /// Push buffered content to the panel, if the surface buffers.
    fn flush(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

impl<T: CharDisplay + ?Sized> CharDisplay for &mut T {
    fn clear(&mut self) {
        T::clear(self)
    }

    fn clear_row(&mut self, row: u8) {
        T::clear_row(self, row)
    }

    fn goto(&mut self, row: u8, col: u8) {
        T::goto(self, row, col)
    }

    fn print(&mut self, text: &str) {
        T::print(self, text)
    }

    fn flush(&mut self) -> Result<(), Error> {
        T::flush(self)
    }
}

/// Exclusive access to the shared display.
///
/// Every producer goes through [`RenderGate::with_display_lock`]; the lock
/// is held only for the duration of the closure, so it is released on
/// every return path. The gate also carries the menu-ownership flag that
/// non-menu producers must respect.
pub struct RenderGate<M: RawMutex, D> {
    display: Mutex<M, RefCell<D>>,
    menu_owned: AtomicBool,
}

impl<M: RawMutex, D: CharDisplay> RenderGate<M, D> {
    pub fn new(display: D) -> Self {
        Self {
            display: Mutex::new(RefCell::new(display)),
            menu_owned: AtomicBool::new(false),
        }
    }

    /// Run `body` with exclusive access to the display, then flush.
    ///
    /// Must not be nested.
    pub fn with_display_lock<R>(&self, body: impl FnOnce(&mut D) -> R) -> R {
        self.display.lock(|cell| {
            let mut display = cell.borrow_mut();
            let out = body(&mut display);
            if let Err(e) = display.flush() {
                warn!("display flush failed: {:?}", e);
            }
            out
        })
    }

    /// Like [`with_display_lock`](Self::with_display_lock), but only for
    /// producers outside the menu: returns `None` without touching the
    /// display while the menu owns it.
    pub fn with_display_if_free<R>(&self, body: impl FnOnce(&mut D) -> R) -> Option<R> {
        if self.menu_owned() {
            return None;
        }
        Some(self.with_display_lock(body))
    }

    pub fn menu_owned(&self) -> bool {
        self.menu_owned.load(Ordering::Acquire)
    }

    pub fn set_menu_owned(&self, owned: bool) {
        self.menu_owned.store(owned, Ordering::Release);
    }
}
