//! Value edit engine.
//!
//! One generic editor for every settable value: it holds a working copy,
//! applies encoder steps with clamping (ranges) or wraparound (choice
//! tables), and renders the edit screen. Persisting the result is the
//! commit protocol's job.

use core::fmt::Write;

use heapless::String;

use crate::config::DISPLAY_COLS;
use crate::menu::LevelId;
use crate::settings::{Field, SettingKey};
use crate::ui::scroll::wrap_index;
use crate::ui::CharDisplay;

/// Rendered value text; never wider than the display.
pub type ValueText = String<20>;

/// How a raw value is shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueFormat {
    /// Decimal integer right-aligned in `width` columns.
    Plain { width: u8, suffix: &'static str },
    /// Unsigned fixed point with `frac_bits` fractional bits, rounded to
    /// `decimals` places.
    Fixed {
        frac_bits: u8,
        decimals: u8,
        suffix: &'static str,
    },
    /// Index into a list of names.
    Named(&'static [&'static str]),
}

pub fn format_value(format: ValueFormat, value: i32) -> ValueText {
    let mut out = ValueText::new();
    // Overflow truncates; every format in use fits 20 columns.
    let _ = match format {
        ValueFormat::Plain { width, suffix } => {
            write!(out, "{:>w$}{}", value, suffix, w = width as usize)
        }
        ValueFormat::Fixed {
            frac_bits,
            decimals,
            suffix,
        } => {
            let raw = value.max(0) as u64;
            let scale = 10u64.pow(decimals as u32);
            let mut whole = raw >> frac_bits;
            let frac = raw & ((1u64 << frac_bits) - 1);
            let mut frac = (frac * scale + (1u64 << frac_bits) / 2) >> frac_bits;
            if frac >= scale {
                whole += 1;
                frac -= scale;
            }
            write!(out, "{}.{:0d$}{}", whole, frac, suffix, d = decimals as usize)
        }
        ValueFormat::Named(names) => {
            let name = usize::try_from(value)
                .ok()
                .and_then(|i| names.get(i))
                .copied()
                .unwrap_or("?");
            out.push_str(name).map_err(|_| core::fmt::Error)
        }
    };
    out
}

/// What values the editor can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditKind {
    /// Any integer in `min..=max`; steps saturate at the bounds.
    Range { min: i32, max: i32 },
    /// One of a fixed table; steps wrap around the table.
    Choice(&'static [i32]),
}

/// Which encoder counter drives the edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resolution {
    Coarse,
    Fine,
}

/// Static description of one edit screen.
#[derive(Debug)]
pub struct EditScreen {
    pub field: Field,
    pub title: &'static str,
    /// Second line; indexed fields pick `labels[index]`, the last label
    /// covers any higher index.
    pub labels: &'static [&'static str],
    pub kind: EditKind,
    pub resolution: Resolution,
    /// Level shown after the value is committed.
    pub return_to: LevelId,
}

impl EditScreen {
    pub fn label(&self, index: u8) -> &'static str {
        match self.labels.len() {
            0 => "",
            n => self.labels[(index as usize).min(n - 1)],
        }
    }
}

/// Live edit of one setting.
#[derive(Clone, Copy, Debug)]
pub struct EditState {
    screen: &'static EditScreen,
    key: SettingKey,
    working: i32,
    dirty: bool,
    fault: bool,
}

impl EditState {
    /// Start editing `index` of the screen's field from `current`.
    ///
    /// A range value is clamped up front. A choice value that is not in
    /// the table is kept as is until the first step moves it onto the
    /// table, so a push without turning commits nothing new.
    pub fn begin(screen: &'static EditScreen, index: u8, current: i32) -> Self {
        let working = match screen.kind {
            EditKind::Range { min, max } => screen.field.clamp(current.clamp(min, max)),
            EditKind::Choice(_) => current,
        };
        Self {
            screen,
            key: SettingKey::new(screen.field, index),
            working,
            dirty: true,
            fault: false,
        }
    }

    /// Apply encoder steps. Returns `true` if the working value changed.
    pub fn apply_delta(&mut self, delta: i32) -> bool {
        if delta == 0 {
            return false;
        }
        let next = match self.screen.kind {
            EditKind::Range { min, max } => {
                self.screen.field.clamp(self.working.saturating_add(delta).clamp(min, max))
            }
            EditKind::Choice(table) if table.is_empty() => self.working,
            EditKind::Choice(table) => {
                let pos = match table.iter().position(|v| *v == self.working) {
                    Some(pos) => pos as i64 + delta as i64,
                    // Off-table: the first step lands on the neighbour in the
                    // turning direction. Tables are ascending.
                    None => {
                        let below = table.iter().filter(|v| **v < self.working).count() as i64;
                        if delta > 0 {
                            below + delta as i64 - 1
                        } else {
                            below + delta as i64
                        }
                    }
                };
                table[wrap_index(pos, table.len())]
            }
        };
        // Moving the value acknowledges a failed commit.
        self.fault = false;
        self.dirty = true;
        let changed = next != self.working;
        self.working = next;
        changed
    }

    pub fn screen(&self) -> &'static EditScreen {
        self.screen
    }

    pub fn key(&self) -> SettingKey {
        self.key
    }

    pub fn working(&self) -> i32 {
        self.working
    }

    pub fn is_faulted(&self) -> bool {
        self.fault
    }

    /// Flag a failed commit; the screen keeps showing it until the user
    /// pushes again or moves the value.
    pub fn set_fault(&mut self) {
        self.fault = true;
        self.dirty = true;
    }

    /// True once per change that still needs drawing.
    pub fn take_dirty(&mut self) -> bool {
        core::mem::take(&mut self.dirty)
    }

    /// Draw the whole edit screen.
    pub fn render<D: CharDisplay + ?Sized>(&self, display: &mut D) {
        let value = format_value(self.screen.field.format(), self.working);

        display.clear();
        display.goto(0, 0);
        display.print(self.screen.title);
        display.goto(1, 0);
        display.print(self.screen.label(self.key.index));
        display.goto(2, 0);
        display.print(if self.fault { "Write Failed" } else { "Rotate to Adjust" });

        let prompt = if self.fault {
            pick_prompt(&["Push to Retry->", "Retry->"], value.len())
        } else {
            pick_prompt(&["Push to Save->", "Push->"], value.len())
        };
        display.goto(3, 0);
        display.print(prompt);
        let col = (DISPLAY_COLS as usize).saturating_sub(value.len());
        display.goto(3, col as u8);
        display.print(&value);
    }
}

/// Longest prompt that still leaves room for the value on the same row.
fn pick_prompt(candidates: &[&'static str], value_len: usize) -> &'static str {
    let room = (DISPLAY_COLS as usize).saturating_sub(value_len);
    candidates
        .iter()
        .copied()
        .find(|p| p.len() <= room)
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::grid::TextGrid;

    static TEMP: EditScreen = EditScreen {
        field: Field::PaAlarmTemp,
        title: "Shutdown temperature",
        labels: &["of Power Amplifier:"],
        kind: EditKind::Range { min: 0, max: 127 },
        resolution: Resolution::Fine,
        return_to: LevelId::Temperature,
    };

    static STEPS: EditScreen = EditScreen {
        field: Field::VfoResolution,
        title: "VFO Resolution:",
        labels: &[],
        kind: EditKind::Choice(&[1, 2, 5, 10, 50, 100]),
        resolution: Resolution::Coarse,
        return_to: LevelId::Top,
    };

    static POINTS: EditScreen = EditScreen {
        field: Field::BpfCrossover,
        title: "Set Filter",
        labels: &["Point 1", "Point 2", "Point n"],
        kind: EditKind::Range { min: 0, max: 6912 },
        resolution: Resolution::Fine,
        return_to: LevelId::BpfPoints,
    };

    #[test]
    fn range_clamps_at_both_ends() {
        let mut e = EditState::begin(&TEMP, 0, 40);
        e.apply_delta(-200);
        assert_eq!(e.working(), 0);
        e.apply_delta(1_000);
        assert_eq!(e.working(), 127);
        e.apply_delta(i32::MAX);
        assert_eq!(e.working(), 127);
    }

    #[test]
    fn begin_clamps_range_but_keeps_off_table_choice() {
        assert_eq!(EditState::begin(&TEMP, 0, 300).working(), 127);
        assert_eq!(EditState::begin(&STEPS, 0, 7).working(), 7);
    }

    #[test]
    fn off_table_choice_steps_to_its_neighbours() {
        let mut up = EditState::begin(&STEPS, 0, 7);
        up.apply_delta(1);
        assert_eq!(up.working(), 10);

        let mut down = EditState::begin(&STEPS, 0, 7);
        down.apply_delta(-1);
        assert_eq!(down.working(), 5);

        let mut past_end = EditState::begin(&STEPS, 0, 500);
        past_end.apply_delta(1);
        assert_eq!(past_end.working(), 1);
        let mut below_start = EditState::begin(&STEPS, 0, 0);
        below_start.apply_delta(-1);
        assert_eq!(below_start.working(), 100);
    }

    #[test]
    fn choice_wraps_around_table() {
        let mut e = EditState::begin(&STEPS, 0, 10);
        e.apply_delta(2);
        assert_eq!(e.working(), 100);
        e.apply_delta(1);
        assert_eq!(e.working(), 1);
        e.apply_delta(-1);
        assert_eq!(e.working(), 100);
        e.apply_delta(6);
        assert_eq!(e.working(), 100);
    }

    #[test]
    fn dirty_is_one_shot() {
        let mut e = EditState::begin(&TEMP, 0, 40);
        assert!(e.take_dirty());
        assert!(!e.take_dirty());
        assert!(!e.apply_delta(0));
        assert!(!e.take_dirty());
        assert!(e.apply_delta(1));
        assert!(e.take_dirty());
    }

    #[test]
    fn index_picks_label_not_value() {
        let e = EditState::begin(&POINTS, 5, 1856);
        assert_eq!(e.key(), SettingKey::new(Field::BpfCrossover, 5));
        assert_eq!(e.working(), 1856);
        assert_eq!(e.screen().label(5), "Point n");
        assert_eq!(e.screen().label(1), "Point 2");
    }

    #[test]
    fn fixed_point_rounds_and_carries() {
        let bpf = Field::BpfCrossover.format();
        assert_eq!(format_value(bpf, 256).as_str(), "2.000 MHz");
        assert_eq!(format_value(bpf, 1856).as_str(), "14.500 MHz");
        // 2 - 1/128 stays below 2 at two places and carries at one
        let two_places = ValueFormat::Fixed { frac_bits: 7, decimals: 2, suffix: "" };
        assert_eq!(format_value(two_places, 255).as_str(), "1.99");
        assert_eq!(format_value(ValueFormat::Fixed { frac_bits: 7, decimals: 1, suffix: "" }, 255).as_str(), "2.0");
    }

    #[test]
    fn plain_and_named_formats() {
        assert_eq!(format_value(Field::PaAlarmTemp.format(), 55).as_str(), "  55C");
        assert_eq!(format_value(Field::RxOffset.format(), -5).as_str(), " -5 kHz");
        assert_eq!(format_value(Field::AudioMode.format(), 1).as_str(), "UAC2");
        assert_eq!(format_value(Field::AudioMode.format(), 7).as_str(), "?");
    }

    #[test]
    fn render_right_aligns_value_under_prompt() {
        let mut g: TextGrid<20, 4> = TextGrid::new();
        let e = EditState::begin(&TEMP, 0, 55);
        e.render(&mut g);
        assert_eq!(g.row(0), "Shutdown temperature");
        assert_eq!(g.row(2).trim_end(), "Rotate to Adjust");
        assert_eq!(g.row(3), "Push to Save->   55C");
    }

    #[test]
    fn long_value_uses_short_prompt() {
        static FREQ: EditScreen = EditScreen {
            field: Field::XtalCalibration,
            title: "Si570 Calibration:",
            labels: &[],
            kind: EditKind::Range { min: 0, max: i32::MAX },
            resolution: Resolution::Fine,
            return_to: LevelId::Top,
        };
        let mut g: TextGrid<20, 4> = TextGrid::new();
        EditState::begin(&FREQ, 0, 1_917_384_131).render(&mut g);
        assert_eq!(g.row(3), "Push->114.285000 MHz");
    }

    #[test]
    fn fault_is_shown_and_cleared_by_turning() {
        let mut g: TextGrid<20, 4> = TextGrid::new();
        let mut e = EditState::begin(&TEMP, 0, 55);
        e.take_dirty();
        e.set_fault();
        assert!(e.take_dirty());
        e.render(&mut g);
        assert!(g.contains("Write Failed"));
        assert!(g.row(3).starts_with("Push to Retry->"));

        e.apply_delta(1);
        assert!(!e.is_faulted());
    }
}
