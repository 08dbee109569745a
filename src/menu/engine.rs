//! Menu engine: top-level short/long dispatch, the navigation and edit
//! passes, and the transient notices between them.
//!
//! `MenuSystem` owns every piece of menu state and all collaborators
//! except the display, which it reaches only through the `RenderGate`.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::delay::DelayNs;

use super::{tree, Action, LevelId, MenuNode, NavigationState, Notice};
use crate::commit::{commit, restart_device, CommitOutcome, Restart};
use crate::config::{DWELL_CONFIRM_MS, DWELL_EXIT_MS, DWELL_NOTICE_MS, MENU_TICK_DIVISOR};
use crate::edit::{format_value, EditState, Resolution, ValueText};
use crate::error::Error;
use crate::settings::{Field, SettingKey, Settings};
use crate::storage::DurableStore;
use crate::ui::input_logic::{Input, InputEvent, InputSource};
use crate::ui::scroll::{render_scroll, wrap_index};
use crate::ui::{CharDisplay, RenderGate};

/// Which engine handles the next menu pass.
#[derive(Clone, Copy, Debug)]
pub enum SubMode {
    Navigate,
    Edit(EditState),
}

/// Menu state owned by the scheduler task.
#[derive(Clone, Debug)]
pub struct MenuState {
    mode_active: bool,
    nav: NavigationState,
    sub: SubMode,
    /// Short push latched between menu passes.
    pending: InputEvent,
    ticks: u8,
    refresh: bool,
    /// The menu let go of the display.
    released: bool,
    /// A value was committed during this menu session.
    changed: bool,
}

impl MenuState {
    pub const fn new() -> Self {
        Self {
            mode_active: false,
            nav: NavigationState::new(),
            sub: SubMode::Navigate,
            pending: InputEvent::None,
            ticks: 0,
            refresh: false,
            released: false,
            changed: false,
        }
    }

    pub fn mode_active(&self) -> bool {
        self.mode_active
    }

    pub fn nav(&self) -> &NavigationState {
        &self.nav
    }

    pub fn sub(&self) -> &SubMode {
        &self.sub
    }
}

impl Default for MenuState {
    fn default() -> Self {
        Self::new()
    }
}

/// The settings menu and its collaborators.
pub struct MenuSystem<'g, M, D, I, S, R, T>
where
    M: RawMutex,
    D: CharDisplay,
{
    gate: &'g RenderGate<M, D>,
    input: Input<I>,
    store: S,
    restart: R,
    delay: T,
    settings: Settings,
    state: MenuState,
}

impl<'g, M, D, I, S, R, T> MenuSystem<'g, M, D, I, S, R, T>
where
    M: RawMutex,
    D: CharDisplay,
    I: InputSource,
    S: DurableStore,
    R: Restart,
    T: DelayNs,
{
    pub fn new(
        gate: &'g RenderGate<M, D>,
        input: Input<I>,
        store: S,
        restart: R,
        delay: T,
        settings: Settings,
    ) -> Self {
        Self {
            gate,
            input,
            store,
            restart,
            delay,
            settings,
            state: MenuState::new(),
        }
    }

    pub fn mode_active(&self) -> bool {
        self.state.mode_active
    }

    /// One-shot: true once after the menu was left with committed
    /// changes, or after a quick-memory switch.
    pub fn take_refresh_request(&mut self) -> bool {
        core::mem::take(&mut self.state.refresh)
    }

    /// One-shot: true once after every menu exit, committed or not. The
    /// display is blank at that point and free for other drawers.
    pub fn take_display_released(&mut self) -> bool {
        core::mem::take(&mut self.state.released)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &MenuState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Call once per scheduler tick.
    pub fn scheduler_tick(&mut self) {
        let event = self.input.poll();

        if !self.state.mode_active {
            match event {
                InputEvent::ShortPush => {
                    let slot = self.settings.cycle_memory();
                    debug!("quick memory {}", slot);
                    self.state.refresh = true;
                }
                InputEvent::LongPush => self.enter_menu_mode(),
                InputEvent::None => {}
            }
            return;
        }

        if event == InputEvent::ShortPush {
            self.state.pending = InputEvent::ShortPush;
        }
        self.state.ticks += 1;
        if self.state.ticks >= MENU_TICK_DIVISOR {
            self.state.ticks = 0;
            self.tick();
        }
    }

    /// Take over the display and start at the top level with fresh
    /// highlights.
    pub fn enter_menu_mode(&mut self) {
        if self.state.mode_active {
            return;
        }
        info!("entering menu");
        self.state.mode_active = true;
        self.state.nav.reset();
        self.state.sub = SubMode::Navigate;
        self.state.pending = InputEvent::None;
        self.state.ticks = 0;
        self.state.changed = false;
        self.state.released = false;
        self.input.discard_steps();
        self.gate.set_menu_owned(true);
    }

    /// One menu pass: handle the latched push and encoder steps for
    /// whichever engine is active.
    pub fn tick(&mut self) {
        if !self.state.mode_active {
            return;
        }
        let event = core::mem::replace(&mut self.state.pending, InputEvent::None);
        let sub = self.state.sub;
        match sub {
            SubMode::Navigate => self.navigate_pass(event),
            SubMode::Edit(edit) => self.edit_pass(edit, event),
        }
    }

    fn navigate_pass(&mut self, event: InputEvent) {
        let delta = self.input.take_coarse();
        let _ = self.input.take_fine();
        self.state.nav.navigate(delta);

        if self.state.nav.take_redraw() {
            self.draw_level();
        }
        if event == InputEvent::ShortPush {
            self.activate();
        }
    }

    fn activate(&mut self) {
        let node = tree::node(self.state.nav.active());
        let item = self.state.nav.current_item();
        debug!("select '{}' on {:?}", item.label, node.level);

        match item.action {
            Action::Descend(level) => {
                info!("menu level {:?}", level);
                self.state.nav.enter(level, &self.settings);
            }
            Action::Edit { screen, index } => {
                let key = SettingKey::new(screen.field, index);
                let mut edit = EditState::begin(screen, index, self.settings.get(key));
                debug!("editing {:?} from {}", key, edit.working());
                self.input.discard_steps();
                edit.take_dirty();
                self.render_edit(&edit);
                self.state.sub = SubMode::Edit(edit);
            }
            Action::SaveSlot(slot) => self.save_slot(slot),
            Action::Assign { key, value } => self.assign(node, key, value),
            Action::NotImplemented => {
                self.message("Not Implemented yet", DWELL_EXIT_MS);
                self.state.nav.mark_redraw();
            }
            Action::Back => {
                if let Some(notice) = node.done_notice {
                    let text = self.notice_text(notice);
                    self.message(&text, DWELL_CONFIRM_MS);
                }
                let parent = node.parent.unwrap_or(LevelId::Top);
                self.state.nav.enter(parent, &self.settings);
            }
            Action::Exit => {
                let notice = node.done_notice.unwrap_or(Notice::Text("Return from Menu"));
                let text = self.notice_text(notice);
                self.message(&text, DWELL_EXIT_MS);
                self.exit_menu();
            }
        }
    }

    fn edit_pass(&mut self, mut edit: EditState, event: InputEvent) {
        let delta = match edit.screen().resolution {
            Resolution::Coarse => {
                let _ = self.input.take_fine();
                self.input.take_coarse()
            }
            Resolution::Fine => {
                let _ = self.input.take_coarse();
                self.input.take_fine()
            }
        };
        if edit.apply_delta(delta) {
            self.settings.set(edit.key(), edit.working());
        }
        if edit.take_dirty() {
            self.render_edit(&edit);
        }
        self.state.sub = SubMode::Edit(edit);

        if event != InputEvent::ShortPush {
            return;
        }

        match commit(&mut self.store, &mut self.settings, edit.key(), edit.working()) {
            Ok(CommitOutcome::Unchanged) => {
                self.message("Nothing Changed", DWELL_NOTICE_MS);
                self.leave_edit(&edit);
            }
            Ok(CommitOutcome::Written) => {
                self.state.changed = true;
                self.message("New Value Saved", DWELL_CONFIRM_MS);
                self.leave_edit(&edit);
            }
            Ok(CommitOutcome::WrittenRequiresRestart) => self.restart(edit.key().field),
            Err(e) => {
                warn!("commit of {:?} failed: {:?}", edit.key(), e);
                edit.set_fault();
                edit.take_dirty();
                self.render_edit(&edit);
                self.state.sub = SubMode::Edit(edit);
            }
        }
    }

    fn leave_edit(&mut self, edit: &EditState) {
        self.input.discard_steps();
        self.state.sub = SubMode::Navigate;
        self.state.nav.enter(edit.screen().return_to, &self.settings);
    }

    fn save_slot(&mut self, slot: u8) {
        let running = self.settings.running_frequency();
        let saved = self.commit_all(&[
            (SettingKey::new(Field::Frequency, slot), running),
            (SettingKey::scalar(Field::ActiveSlot), slot as i32),
        ]);
        match saved {
            Ok(()) => {
                info!("running frequency saved to memory {}", slot);
                self.state.changed = true;
                self.message("New Frequency Saved", DWELL_EXIT_MS);
                self.exit_menu();
            }
            Err(e) => self.write_failed(e),
        }
    }

    fn assign(&mut self, node: &MenuNode, key: SettingKey, value: i32) {
        match commit(&mut self.store, &mut self.settings, key, value) {
            Ok(CommitOutcome::Unchanged) => {
                self.message("Nothing Changed", DWELL_NOTICE_MS);
                self.state.nav.enter(node.parent.unwrap_or(LevelId::Top), &self.settings);
            }
            Ok(CommitOutcome::Written) => {
                self.state.changed = true;
                self.message("New Value Saved", DWELL_CONFIRM_MS);
                self.state.nav.enter(node.parent.unwrap_or(LevelId::Top), &self.settings);
            }
            Ok(CommitOutcome::WrittenRequiresRestart) => self.restart(key.field),
            Err(e) => self.write_failed(e),
        }
    }

    fn commit_all(&mut self, values: &[(SettingKey, i32)]) -> Result<(), Error> {
        for (key, value) in values {
            commit(&mut self.store, &mut self.settings, *key, *value)?;
        }
        Ok(())
    }

    /// Failure outside an edit: the notice stays up and the level is
    /// redrawn only once the user acts on it again.
    fn write_failed(&mut self, e: Error) {
        warn!("store write failed: {:?}", e);
        self.gate.with_display_lock(|d| {
            d.clear();
            d.goto(1, 0);
            d.print("Write Failed");
            d.goto(3, 0);
            d.print("Push to Retry->");
        });
    }

    fn restart(&mut self, field: Field) -> ! {
        let notice = field
            .restart_notice()
            .unwrap_or(["Settings changed", "", "Device will be", " RESET"]);
        restart_device(self.gate, &mut self.restart, &mut self.delay, &notice)
    }

    fn exit_menu(&mut self) {
        info!("leaving menu");
        self.state.mode_active = false;
        self.state.sub = SubMode::Navigate;
        self.state.pending = InputEvent::None;
        if core::mem::take(&mut self.state.changed) {
            self.state.refresh = true;
        }
        self.gate.with_display_lock(|d| d.clear());
        self.gate.set_menu_owned(false);
        self.state.released = true;
    }

    fn notice_text(&self, notice: Notice) -> ValueText {
        match notice {
            Notice::Text(text) => {
                let mut out = ValueText::new();
                let _ = out.push_str(text);
                out
            }
            Notice::Unchanged { key, suffix } => {
                let mut out = format_value(key.field.format(), self.settings.get(key));
                let _ = out.push_str(suffix);
                out
            }
        }
    }

    /// Single-line transient notice, held for `dwell_ms`.
    fn message(&mut self, text: &str, dwell_ms: u32) {
        self.gate.with_display_lock(|d| {
            d.clear();
            d.goto(1, 0);
            d.print(text);
        });
        self.delay.delay_ms(dwell_ms);
    }

    fn render_edit(&self, edit: &EditState) {
        self.gate.with_display_lock(|d| edit.render(d));
    }

    fn draw_level(&self) {
        let nav = &self.state.nav;
        let node = tree::node(nav.active());
        let highlight = wrap_index(nav.highlighted() as i64, node.items.len());
        let settings = &self.settings;

        self.gate.with_display_lock(|d| {
            d.clear();
            d.goto(0, 0);
            d.print(node.title);

            if let Some(banner) = node.banner {
                d.goto(banner.row, banner.col);
                d.print(&format_value(banner.key.field.format(), settings.get(banner.key)));
            }

            let w = node.window;
            render_scroll(d, node.items, highlight, w.row, w.col, w.lines);

            if let Some(preview) = node.preview {
                d.goto(preview.row, preview.col);
                d.print(preview.heading);
                d.goto(preview.row + 1, preview.col);
                match node.items[highlight].preview {
                    Some(key) => d.print(&format_value(key.field.format(), settings.get(key))),
                    None => d.print(preview.empty),
                }
            }
        });
    }
}
