//! Host doubles for driving `MenuSystem` tick by tick.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embedded_hal::delay::DelayNs;

use rotary_menu::config::{MENU_TICK_DIVISOR, SCHEDULER_TICK_MS};
use rotary_menu::ui::grid::TextGrid;
use rotary_menu::{
    CharDisplay, Error, Input, InputSource, MenuSystem, PressTiming, RamStore, RenderGate,
    Restart, Settings,
};

/// A 20×4 grid that also keeps every string printed on it.
#[derive(Default)]
pub struct RecordingDisplay {
    pub grid: TextGrid<20, 4>,
    pub printed: Vec<String>,
}

impl CharDisplay for RecordingDisplay {
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
        self.printed.push(text.to_string());
        self.grid.print(text);
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.grid.flush()
    }
}

pub type Gate = RenderGate<NoopRawMutex, RecordingDisplay>;

pub fn gate() -> Gate {
    RenderGate::new(RecordingDisplay::default())
}

#[derive(Default)]
pub struct RawInput {
    pub now: u32,
    pub down: bool,
    pub coarse: i32,
    pub fine: i32,
}

/// Input source whose state the test sets directly.
#[derive(Clone, Default)]
pub struct ScriptedInput(pub Rc<RefCell<RawInput>>);

impl ScriptedInput {
    pub fn starting_at(now: u32) -> Self {
        let input = Self::default();
        input.0.borrow_mut().now = now;
        input
    }

    pub fn advance(&self, ms: u32) {
        let mut raw = self.0.borrow_mut();
        raw.now = raw.now.wrapping_add(ms);
    }

    pub fn set_down(&self, down: bool) {
        self.0.borrow_mut().down = down;
    }

    pub fn turn_coarse(&self, steps: i32) {
        self.0.borrow_mut().coarse += steps;
    }

    pub fn turn_fine(&self, steps: i32) {
        self.0.borrow_mut().fine += steps;
    }

    pub fn now(&self) -> u32 {
        self.0.borrow().now
    }
}

impl InputSource for ScriptedInput {
    fn now(&mut self) -> u32 {
        self.0.borrow().now
    }

    fn button_down(&mut self) -> bool {
        self.0.borrow().down
    }

    fn take_coarse(&mut self) -> i32 {
        std::mem::take(&mut self.0.borrow_mut().coarse)
    }

    fn take_fine(&mut self) -> i32 {
        std::mem::take(&mut self.0.borrow_mut().fine)
    }
}

/// Records every dwell in milliseconds instead of sleeping.
#[derive(Clone, Default)]
pub struct RecordingDelay(pub Rc<RefCell<Vec<u32>>>);

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().push(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.borrow_mut().push(ms);
    }
}

/// Records the watchdog arm; halting unwinds so the test can observe it.
#[derive(Clone, Default)]
pub struct RecordingRestart {
    pub armed: Rc<Cell<Option<u32>>>,
    pub halted: Rc<Cell<bool>>,
}

impl Restart for RecordingRestart {
    fn arm_watchdog(&mut self, timeout_ms: u32) {
        self.armed.set(Some(timeout_ms));
    }

    fn halt(&mut self) -> ! {
        self.halted.set(true);
        panic!("device halted for restart");
    }
}

pub type System<'g> =
    MenuSystem<'g, NoopRawMutex, RecordingDisplay, ScriptedInput, RamStore, RecordingRestart, RecordingDelay>;

/// Menu system plus handles on all of its doubles.
pub struct Harness<'g> {
    pub gate: &'g Gate,
    pub sys: System<'g>,
    pub input: ScriptedInput,
    pub delay: RecordingDelay,
    pub restart: RecordingRestart,
}

/// Timestamp close enough to the counter maximum that most runs wrap.
pub const NEAR_WRAP: u32 = u32::MAX - 3_000;

impl<'g> Harness<'g> {
    /// Fresh device: blank store filled with defaults at load.
    pub fn new(gate: &'g Gate) -> Self {
        Self::with_store(gate, RamStore::new())
    }

    pub fn with_store(gate: &'g Gate, mut store: RamStore) -> Self {
        let settings = Settings::load(&mut store).expect("ram store loads");
        let input = ScriptedInput::starting_at(NEAR_WRAP);
        let delay = RecordingDelay::default();
        let restart = RecordingRestart::default();
        let sys = MenuSystem::new(
            gate,
            Input::new(input.clone(), PressTiming::default()),
            store,
            restart.clone(),
            delay.clone(),
            settings,
        );
        Self {
            gate,
            sys,
            input,
            delay,
            restart,
        }
    }

    /// Advance the clock one scheduler period and run the scheduler.
    pub fn tick(&mut self) {
        self.input.advance(SCHEDULER_TICK_MS as u32);
        self.sys.scheduler_tick();
    }

    pub fn ticks(&mut self, n: u32) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// Two menu passes: one to act on whatever was latched, one to draw
    /// any level it moved to.
    pub fn settle(&mut self) {
        self.ticks(2 * MENU_TICK_DIVISOR as u32);
    }

    /// Hold the button for `held_ms` (sampled every tick), then release.
    pub fn press(&mut self, held_ms: u32) {
        self.input.set_down(true);
        self.ticks(held_ms / SCHEDULER_TICK_MS as u32 + 1);
        self.input.set_down(false);
        self.tick();
    }

    pub fn short_push(&mut self) {
        self.press(100);
        self.settle();
    }

    pub fn long_push(&mut self) {
        self.press(1_000);
        self.settle();
    }

    pub fn turn(&mut self, steps: i32) {
        self.input.turn_coarse(steps);
        self.settle();
    }

    pub fn turn_fine(&mut self, steps: i32) {
        self.input.turn_fine(steps);
        self.settle();
    }

    /// Everything printed since the last call.
    pub fn take_printed(&self) -> Vec<String> {
        self.gate
            .with_display_lock(|d| std::mem::take(&mut d.printed))
    }

    pub fn printed_contains(&self, text: &str) -> bool {
        self.take_printed().iter().any(|s| s.contains(text))
    }

    pub fn screen_contains(&self, text: &str) -> bool {
        self.gate.with_display_lock(|d| d.grid.contains(text))
    }

    pub fn dwells(&self) -> Vec<u32> {
        self.delay.0.borrow().clone()
    }
}
