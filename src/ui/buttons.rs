//! Push button and rotary encoder hardware.
//!
//! The button is an active-low switch with the internal pull-up, sampled
//! by the scheduler loop. The encoder is decoded by the QDEC peripheral;
//! an async task moves its counts into the shared `EncoderCounters`.

use embassy_nrf::gpio::{AnyPin, Input as Pin, Pull};
use embassy_nrf::peripherals::QDEC;
use embassy_nrf::qdec::Qdec;
use embassy_time::Instant;

use super::input_logic::{EncoderCounters, InputSource};

/// Forward raw encoder counts forever.
#[embassy_executor::task]
pub async fn encoder_task(mut qdec: Qdec<'static, QDEC>, counters: &'static EncoderCounters) -> ! {
    loop {
        let counts = qdec.read().await;
        if counts != 0 {
            counters.add_raw(counts as i32);
        }
    }
}

/// Button pin, encoder counters and the uptime clock as an `InputSource`.
pub struct HardwareInput {
    button: Pin<'static>,
    counters: &'static EncoderCounters,
}

impl HardwareInput {
    pub fn new(pin: AnyPin, counters: &'static EncoderCounters) -> Self {
        Self {
            button: Pin::new(pin, Pull::Up),
            counters,
        }
    }
}

impl InputSource for HardwareInput {
    /// Uptime in milliseconds, wrapping at `u32::MAX`.
    fn now(&mut self) -> u32 {
        Instant::now().as_millis() as u32
    }

    fn button_down(&mut self) -> bool {
        self.button.is_low()
    }

    fn take_coarse(&mut self) -> i32 {
        self.counters.take_coarse()
    }

    fn take_fine(&mut self) -> i32 {
        self.counters.take_fine()
    }
}
