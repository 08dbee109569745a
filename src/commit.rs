//! Commit protocol: persist a setting only when it differs from what the
//! durable store already holds, and run the restart path for settings
//! that only take effect after a reset.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::delay::DelayNs;

use crate::config::{DWELL_RESTART_MS, WATCHDOG_TIMEOUT_MS};
use crate::error::Error;
use crate::settings::{SettingKey, Settings};
use crate::storage::DurableStore;
use crate::ui::{CharDisplay, RenderGate};

/// Result of a successful commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommitOutcome {
    /// The store already held this value; nothing was written.
    Unchanged,
    Written,
    /// Written, and the device must reset for it to take effect.
    WrittenRequiresRestart,
}

/// Clamp `value`, mirror it into `settings`, and write it to `store` if
/// the stored value differs.
///
/// Committing the same value twice yields `Unchanged` the second time.
/// A failed write leaves the mirror updated and the store untouched, so
/// the caller can retry.
pub fn commit<S: DurableStore>(
    store: &mut S,
    settings: &mut Settings,
    key: SettingKey,
    value: i32,
) -> Result<CommitOutcome, Error> {
    let value = settings.set(key, value);

    if store.read(key)? == Some(value) {
        debug!("commit {:?}: unchanged ({})", key, value);
        return Ok(CommitOutcome::Unchanged);
    }

    store.write(key, value)?;

    if key.field.requires_restart() {
        info!("commit {:?} = {} (restart required)", key, value);
        Ok(CommitOutcome::WrittenRequiresRestart)
    } else {
        info!("commit {:?} = {}", key, value);
        Ok(CommitOutcome::Written)
    }
}

/// Hardware reset primitive.
pub trait Restart {
    /// Start a watchdog that resets the device after `timeout_ms`.
    fn arm_watchdog(&mut self, timeout_ms: u32);
    /// Wait forever for the watchdog.
    fn halt(&mut self) -> !;
}

impl<T: Restart + ?Sized> Restart for &mut T {
    fn arm_watchdog(&mut self, timeout_ms: u32) {
        T::arm_watchdog(self, timeout_ms)
    }

    fn halt(&mut self) -> ! {
        T::halt(self)
    }
}

/// Show `notice`, leave it up for the restart dwell, then reset.
///
/// The display lock is released before the dwell, so nothing is held
/// when the device halts.
pub fn restart_device<M, D, R, T>(
    gate: &RenderGate<M, D>,
    restart: &mut R,
    delay: &mut T,
    notice: &[&str],
) -> !
where
    M: RawMutex,
    D: CharDisplay,
    R: Restart + ?Sized,
    T: DelayNs + ?Sized,
{
    gate.with_display_lock(|d| {
        d.clear();
        for (row, line) in notice.iter().enumerate() {
            d.goto(row as u8, 0);
            d.print(line);
        }
    });

    delay.delay_ms(DWELL_RESTART_MS);
    warn!("restarting via watchdog ({} ms)", WATCHDOG_TIMEOUT_MS);
    restart.arm_watchdog(WATCHDOG_TIMEOUT_MS);
    restart.halt()
}
