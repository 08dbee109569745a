//! Application-wide constants and compile-time configuration.
//!
//! All timing parameters, display geometry and storage constants live
//! here so they can be tuned in one place.

// Scheduler

/// Period of the cooperative scheduler loop (ms).
pub const SCHEDULER_TICK_MS: u64 = 5;

/// The menu handlers run once every this many scheduler ticks
/// (21 × 5 ms ≈ 105 ms) to bound display churn.
pub const MENU_TICK_DIVISOR: u8 = 21;

// Push button

/// Minimum button-down time for a short push (ms). Anything shorter is
/// contact bounce and classifies as no push at all.
pub const SHORT_PRESS_MIN_MS: u32 = 30;

/// Button-down time at which a long push fires (ms). Must exceed
/// `SHORT_PRESS_MIN_MS`.
pub const LONG_PRESS_MIN_MS: u32 = 600;

/// Timestamp source resolution. The firmware feeds milliseconds.
pub const TIMER_TICKS_PER_MS: u32 = 1;

/// Largest value the free-running timestamp counter reaches before it
/// wraps back to zero.
pub const TIMER_COUNTER_MAX: u32 = u32::MAX;

// Rotary encoder

/// Raw quadrature counts per coarse step (menu navigation).
pub const ENCODER_COARSE_DIVISOR: i32 = 4;

/// Raw quadrature counts per fine step (value editing).
pub const ENCODER_FINE_DIVISOR: i32 = 1;

// Character display
//
// The SSD1306 (128×64, FONT_6X10) gives a 21×6 character surface; the
// menu uses the top-left 20×4 region so it lays out like a 20×4 LCD.

/// Usable display columns.
pub const DISPLAY_COLS: u8 = 20;

/// Usable display rows.
pub const DISPLAY_ROWS: u8 = 4;

/// Number of item rows in a scrolling menu window (3 or 4).
pub const MENU_WINDOW_LINES: u8 = 3;

/// Prefix printed in front of the highlighted item.
pub const SELECTION_MARKER: &str = "->";

// Transient message dwell times

/// "New Value Saved" and similar short confirmations (ms).
pub const DWELL_CONFIRM_MS: u32 = 500;

/// "Nothing Changed" and failure notices (ms).
pub const DWELL_NOTICE_MS: u32 = 1000;

/// Leaving the menu, placeholders, slot saved (ms).
pub const DWELL_EXIT_MS: u32 = 2000;

/// Restart warning shown before the watchdog fires (ms).
pub const DWELL_RESTART_MS: u32 = 2000;

// Restart

/// Watchdog timeout armed by the restart path (ms).
pub const WATCHDOG_TIMEOUT_MS: u32 = 100;

// Settings storage

/// Number of quick-access frequency memories cycled by short pushes.
pub const MEMORY_SLOTS: u8 = 9;

/// Value of the init marker once the store holds a complete settings set.
pub const INIT_MAGIC: i32 = 0x5A;

/// Marker value that forces a restore of all defaults on the next boot.
pub const FACTORY_RESET_MARKER: i32 = 0xFF;

/// Flash page index where settings storage starts (4 KB per page on nRF52840).
pub const STORAGE_FLASH_PAGE_START: u32 = 240;

/// Number of flash pages reserved for settings storage.
pub const STORAGE_FLASH_PAGE_COUNT: u32 = 4;
