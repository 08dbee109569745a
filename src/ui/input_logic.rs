//! Push-button classification and encoder step accounting.
//!
//! The button line is sampled once per scheduler tick and turned into
//! discrete pushes; the encoder driver deposits raw quadrature counts
//! which are handed out as coarse (navigation) and fine (editing) steps.

use core::sync::atomic::{AtomicI32, Ordering};

use crate::config::{
    LONG_PRESS_MIN_MS, SHORT_PRESS_MIN_MS, TIMER_COUNTER_MAX, TIMER_TICKS_PER_MS,
};

/// Result of one classification pass over the push button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputEvent {
    None,
    ShortPush,
    LongPush,
}

/// Press thresholds and timestamp counter geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PressTiming {
    /// Shortest hold that counts as a push (ms).
    pub short_min_ms: u32,
    /// Hold time at which a long push fires (ms).
    pub long_min_ms: u32,
    /// Timestamp counts per millisecond.
    pub ticks_per_ms: u32,
    /// Largest timestamp value before the counter wraps to zero.
    pub counter_max: u32,
}

impl Default for PressTiming {
    fn default() -> Self {
        Self {
            short_min_ms: SHORT_PRESS_MIN_MS,
            long_min_ms: LONG_PRESS_MIN_MS,
            ticks_per_ms: TIMER_TICKS_PER_MS,
            counter_max: TIMER_COUNTER_MAX,
        }
    }
}

/// Counts elapsed between two readings of a counter that runs
/// `0..=counter_max` and then wraps.
pub fn elapsed_ticks(start: u32, now: u32, counter_max: u32) -> u32 {
    if now >= start {
        now - start
    } else {
        counter_max.saturating_sub(start).wrapping_add(now).wrapping_add(1)
    }
}

/// Hardware-facing input collaborator.
///
/// Implemented by the firmware's GPIO/QDEC glue and by host test doubles.
pub trait InputSource {
    /// Current value of the free-running timestamp counter.
    fn now(&mut self) -> u32;
    /// Debounced button level, `true` while held down.
    fn button_down(&mut self) -> bool;
    /// Coarse steps since the last call; resets the counter.
    fn take_coarse(&mut self) -> i32;
    /// Fine steps since the last call; resets the counter.
    fn take_fine(&mut self) -> i32;
}

impl<T: InputSource + ?Sized> InputSource for &mut T {
    fn now(&mut self) -> u32 {
        T::now(self)
    }

    fn button_down(&mut self) -> bool {
        T::button_down(self)
    }

    fn take_coarse(&mut self) -> i32 {
        T::take_coarse(self)
    }

    fn take_fine(&mut self) -> i32 {
        T::take_fine(self)
    }
}

/// Short/long push state machine.
#[derive(Clone, Debug)]
pub struct ButtonClassifier {
    timing: PressTiming,
    pressed: bool,
    long_signaled: bool,
    press_start: u32,
}

impl ButtonClassifier {
    pub const fn new(timing: PressTiming) -> Self {
        Self {
            timing,
            pressed: false,
            long_signaled: false,
            press_start: 0,
        }
    }

    /// Feed one sample of the button line taken at timestamp `now`.
    pub fn update(&mut self, down: bool, now: u32) -> InputEvent {
        if down {
            if self.long_signaled {
                // Already fired for this push; wait for release.
                return InputEvent::None;
            }
            if !self.pressed {
                self.pressed = true;
                self.press_start = now;
                return InputEvent::None;
            }
            if self.held_ms(now) >= self.timing.long_min_ms {
                self.long_signaled = true;
                return InputEvent::LongPush;
            }
            return InputEvent::None;
        }

        if !self.pressed {
            return InputEvent::None;
        }
        self.pressed = false;

        if self.long_signaled {
            self.long_signaled = false;
            return InputEvent::None;
        }

        let held = self.held_ms(now);
        if held >= self.timing.long_min_ms {
            // Released before any sample saw the threshold pass.
            InputEvent::LongPush
        } else if held >= self.timing.short_min_ms {
            InputEvent::ShortPush
        } else {
            InputEvent::None
        }
    }

    /// True while the button is held.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    fn held_ms(&self, now: u32) -> u32 {
        elapsed_ticks(self.press_start, now, self.timing.counter_max)
            / self.timing.ticks_per_ms.max(1)
    }
}

/// The Input Classifier: the only reader of raw input state.
pub struct Input<I> {
    source: I,
    button: ButtonClassifier,
}

impl<I: InputSource> Input<I> {
    pub fn new(source: I, timing: PressTiming) -> Self {
        Self {
            source,
            button: ButtonClassifier::new(timing),
        }
    }

    /// Sample the button once; call exactly once per scheduler tick.
    pub fn poll(&mut self) -> InputEvent {
        let down = self.source.button_down();
        let now = self.source.now();
        self.button.update(down, now)
    }

    pub fn take_coarse(&mut self) -> i32 {
        self.source.take_coarse()
    }

    pub fn take_fine(&mut self) -> i32 {
        self.source.take_fine()
    }

    /// Drop any steps accumulated at either granularity.
    pub fn discard_steps(&mut self) {
        let _ = self.source.take_coarse();
        let _ = self.source.take_fine();
    }
}

/// Raw encoder counts shared between the quadrature driver and the UI.
///
/// The driver adds raw counts from its own task or interrupt; each
/// granularity keeps its own accumulator so taking coarse steps never
/// consumes fine ones and vice versa. Counts that do not yet make up a
/// whole step stay in the accumulator.
pub struct EncoderCounters {
    coarse: AtomicI32,
    fine: AtomicI32,
    coarse_divisor: i32,
    fine_divisor: i32,
}

impl EncoderCounters {
    pub const fn new(coarse_divisor: i32, fine_divisor: i32) -> Self {
        Self {
            coarse: AtomicI32::new(0),
            fine: AtomicI32::new(0),
            coarse_divisor,
            fine_divisor,
        }
    }

    /// Deposit raw quadrature counts (signed, clockwise positive).
    pub fn add_raw(&self, counts: i32) {
        self.coarse.fetch_add(counts, Ordering::Relaxed);
        self.fine.fetch_add(counts, Ordering::Relaxed);
    }

    pub fn take_coarse(&self) -> i32 {
        Self::take(&self.coarse, self.coarse_divisor)
    }

    pub fn take_fine(&self) -> i32 {
        Self::take(&self.fine, self.fine_divisor)
    }

    fn take(acc: &AtomicI32, divisor: i32) -> i32 {
        let divisor = divisor.max(1);
        let steps = acc.load(Ordering::Relaxed) / divisor;
        if steps != 0 {
            acc.fetch_sub(steps * divisor, Ordering::Relaxed);
        }
        steps
    }
}
