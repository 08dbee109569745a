//! Rotary-encoder settings menu.
//!
//! A push button and a quadrature encoder drive a configuration menu on
//! a character display; confirmed changes are committed to flash only
//! when they differ from what is stored.
//!
//! The pure logic (input classification, navigation, editing, commit)
//! builds on the host for `cargo test`; the `embedded` feature adds the
//! nRF52840 adapters used by `main.rs`.
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main].

#![cfg_attr(not(test), no_std)]

// Must come first: the logging macros are textually scoped.
#[macro_use]
mod fmt;

pub mod commit;
pub mod config;
pub mod edit;
pub mod error;
pub mod menu;
pub mod settings;
pub mod storage;
pub mod ui;

pub use commit::{commit, CommitOutcome, Restart};
pub use error::{Error, StoreError};
pub use menu::{LevelId, MenuSystem};
pub use settings::{Field, SettingKey, Settings};
pub use storage::{DurableStore, RamStore};
pub use ui::input_logic::{EncoderCounters, Input, InputEvent, InputSource, PressTiming};
pub use ui::{CharDisplay, RenderGate};
