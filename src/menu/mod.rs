//! Menu navigation engine.
//!
//! The configuration menu is a static tree of levels (`tree`), walked by
//! a single owned `NavigationState` and driven from the scheduler loop by
//! `MenuSystem` (`engine`).

pub mod engine;
pub mod tree;

pub use engine::{MenuState, MenuSystem, SubMode};

use crate::edit::EditScreen;
use crate::settings::{SettingKey, Settings};
use crate::ui::scroll::{step_highlight, wrap_index};

/// Menu levels.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LevelId {
    Top = 0,
    SaveSlot,
    Temperature,
    Filters,
    BpfPoints,
    LpfPoints,
    I2c,
    AudioMode,
    FactoryReset,
}

impl LevelId {
    pub const COUNT: usize = 9;

    pub const ALL: [LevelId; Self::COUNT] = [
        LevelId::Top,
        LevelId::SaveSlot,
        LevelId::Temperature,
        LevelId::Filters,
        LevelId::BpfPoints,
        LevelId::LpfPoints,
        LevelId::I2c,
        LevelId::AudioMode,
        LevelId::FactoryReset,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// What a short push on an item does.
#[derive(Clone, Copy, Debug)]
pub enum Action {
    /// Enter a sub-level.
    Descend(LevelId),
    /// Edit element `index` of the screen's field.
    Edit { screen: &'static EditScreen, index: u8 },
    /// Store the running frequency into quick memory `n` and leave the menu.
    SaveSlot(u8),
    /// Commit a fixed value.
    Assign { key: SettingKey, value: i32 },
    /// Placeholder screen with no effect.
    NotImplemented,
    /// Return to the parent level.
    Back,
    /// Leave the menu.
    Exit,
}

#[derive(Clone, Copy, Debug)]
pub struct Item {
    pub label: &'static str,
    pub action: Action,
    /// Setting shown in the level's preview panel while highlighted.
    pub preview: Option<SettingKey>,
}

impl Item {
    pub const fn new(label: &'static str, action: Action) -> Self {
        Self {
            label,
            action,
            preview: None,
        }
    }

    pub const fn previewing(mut self, key: SettingKey) -> Self {
        self.preview = Some(key);
        self
    }
}

impl AsRef<str> for Item {
    fn as_ref(&self) -> &str {
        self.label
    }
}

/// Placement of the scrolling item window.
#[derive(Clone, Copy, Debug)]
pub struct Window {
    pub row: u8,
    pub col: u8,
    /// 3 or 4.
    pub lines: u8,
}

/// A setting value printed at a fixed position on every redraw.
#[derive(Clone, Copy, Debug)]
pub struct Banner {
    pub key: SettingKey,
    pub row: u8,
    pub col: u8,
}

/// Heading plus the highlighted item's current value, beside the window.
#[derive(Clone, Copy, Debug)]
pub struct Preview {
    pub heading: &'static str,
    /// Shown for items with nothing to preview.
    pub empty: &'static str,
    pub row: u8,
    pub col: u8,
}

/// Initial highlight derived from a setting on first entry per session.
#[derive(Clone, Copy, Debug)]
pub struct Seed {
    pub key: SettingKey,
    pub offset: i32,
}

/// Transient text shown when a level is left through Back or Exit.
#[derive(Clone, Copy, Debug)]
pub enum Notice {
    Text(&'static str),
    /// The formatted value of `key` followed by `suffix`.
    Unchanged { key: SettingKey, suffix: &'static str },
}

/// One level of the menu tree. Static; never mutated.
#[derive(Debug)]
pub struct MenuNode {
    pub level: LevelId,
    pub title: &'static str,
    pub parent: Option<LevelId>,
    /// Never empty.
    pub items: &'static [Item],
    pub window: Window,
    pub banner: Option<Banner>,
    pub preview: Option<Preview>,
    pub seed: Option<Seed>,
    /// Shown when leaving this level through Back or Exit.
    pub done_notice: Option<Notice>,
}

/// Active level and per-level highlight memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationState {
    active: LevelId,
    highlight: [usize; LevelId::COUNT],
    seeded: [bool; LevelId::COUNT],
    redraw: bool,
}

impl NavigationState {
    pub const fn new() -> Self {
        Self {
            active: LevelId::Top,
            highlight: [0; LevelId::COUNT],
            seeded: [false; LevelId::COUNT],
            redraw: true,
        }
    }

    /// Forget every highlight and return to the top level.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn active(&self) -> LevelId {
        self.active
    }

    pub fn highlighted(&self) -> usize {
        self.highlight[self.active.index()]
    }

    pub fn highlight_of(&self, level: LevelId) -> usize {
        self.highlight[level.index()]
    }

    pub fn current_item(&self) -> &'static Item {
        let items = tree::node(self.active).items;
        &items[wrap_index(self.highlighted() as i64, items.len())]
    }

    /// Move the highlight by `delta` with wraparound. Returns `true` if a
    /// redraw was scheduled.
    pub fn navigate(&mut self, delta: i32) -> bool {
        if delta == 0 {
            return false;
        }
        let len = tree::node(self.active).items.len();
        let slot = &mut self.highlight[self.active.index()];
        *slot = step_highlight(*slot, delta, len);
        self.redraw = true;
        true
    }

    /// Make `level` active, keeping its remembered highlight. A level with
    /// a seed takes its initial highlight from the settings the first time
    /// it is entered.
    pub fn enter(&mut self, level: LevelId, settings: &Settings) {
        let node = tree::node(level);
        let i = level.index();
        if !self.seeded[i] {
            if let Some(seed) = node.seed {
                let pos = settings.get(seed.key) as i64 + seed.offset as i64;
                self.highlight[i] = wrap_index(pos, node.items.len());
            }
            self.seeded[i] = true;
        }
        self.active = level;
        self.redraw = true;
    }

    pub fn mark_redraw(&mut self) {
        self.redraw = true;
    }

    pub fn take_redraw(&mut self) -> bool {
        core::mem::take(&mut self.redraw)
    }
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Field;
    use proptest::prelude::*;

    #[test]
    fn sixteen_steps_on_fifteen_items_lands_on_second() {
        let mut nav = NavigationState::new();
        assert_eq!(tree::node(LevelId::Top).items.len(), 15);
        nav.navigate(16);
        assert_eq!(nav.highlighted(), 1);
    }

    #[test]
    fn sub_level_highlight_survives_re_entry() {
        let settings = Settings::defaults();
        let mut nav = NavigationState::new();
        nav.enter(LevelId::Temperature, &settings);
        nav.navigate(2);
        nav.enter(LevelId::Top, &settings);
        nav.navigate(-1);
        nav.enter(LevelId::Temperature, &settings);
        assert_eq!(nav.highlighted(), 2);
    }

    #[test]
    fn seeded_level_starts_on_active_memory_once() {
        let mut settings = Settings::defaults();
        settings.set(SettingKey::scalar(Field::ActiveSlot), 4);
        let mut nav = NavigationState::new();
        nav.enter(LevelId::SaveSlot, &settings);
        assert_eq!(nav.current_item().label, "CH4");

        nav.navigate(1);
        nav.enter(LevelId::Top, &settings);
        nav.enter(LevelId::SaveSlot, &settings);
        assert_eq!(nav.current_item().label, "CH5");

        nav.reset();
        settings.set(SettingKey::scalar(Field::ActiveSlot), 9);
        nav.enter(LevelId::SaveSlot, &settings);
        assert_eq!(nav.current_item().label, "CH9");
    }

    #[test]
    fn reset_clears_memory() {
        let settings = Settings::defaults();
        let mut nav = NavigationState::new();
        nav.enter(LevelId::I2c, &settings);
        nav.navigate(3);
        nav.reset();
        assert_eq!(nav.active(), LevelId::Top);
        assert_eq!(nav.highlight_of(LevelId::I2c), 0);
    }

    #[test]
    fn redraw_is_one_shot() {
        let mut nav = NavigationState::new();
        assert!(nav.take_redraw());
        assert!(!nav.take_redraw());
        assert!(!nav.navigate(0));
        assert!(!nav.take_redraw());
        assert!(nav.navigate(-1));
        assert!(nav.take_redraw());
    }

    #[test]
    fn stale_highlight_wraps_instead_of_clamping() {
        let mut nav = NavigationState::new();
        nav.highlight[LevelId::Top.index()] = 16;
        assert_eq!(nav.current_item().label, tree::node(LevelId::Top).items[1].label);
    }

    proptest! {
        #[test]
        fn highlight_stays_in_bounds_on_every_level(
            level in 0usize..LevelId::COUNT,
            deltas in proptest::collection::vec(-64i32..64, 0..40),
        ) {
            let level = LevelId::ALL[level];
            let len = tree::node(level).items.len();
            let mut nav = NavigationState::new();
            nav.enter(level, &Settings::defaults());
            for d in deltas {
                nav.navigate(d);
                prop_assert!(nav.highlighted() < len);
            }
        }

        #[test]
        fn one_revolution_is_identity(level in 0usize..LevelId::COUNT, start in -50i32..50) {
            let level = LevelId::ALL[level];
            let len = tree::node(level).items.len() as i32;
            let mut nav = NavigationState::new();
            nav.enter(level, &Settings::defaults());
            nav.navigate(start);
            let before = nav.highlighted();
            nav.navigate(len);
            prop_assert_eq!(nav.highlighted(), before);
        }
    }
}
