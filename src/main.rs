//! rotary-menu firmware for nRF52840.
//!
//! Pin assignment:
//!   - P0.11  push button (active low, internal pull-up)
//!   - P0.31  encoder A, P0.30 encoder B (QDEC)
//!   - P0.26  SDA, P0.27 SCL (SSD1306 at 0x3C)

#![no_std]
#![no_main]

use defmt::{error, info, warn};
use embassy_embedded_hal::adapter::BlockingAsync;
use embassy_executor::Spawner;
use embassy_nrf::gpio::Pin as _;
use embassy_nrf::nvmc::Nvmc;
use embassy_nrf::peripherals::{QDEC, TWISPI0, WDT};
use embassy_nrf::twim::{self, Twim};
use embassy_nrf::wdt::{self, Watchdog};
use embassy_nrf::{bind_interrupts, qdec};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Delay, Duration, Ticker};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use rotary_menu::config::{ENCODER_COARSE_DIVISOR, ENCODER_FINE_DIVISOR, SCHEDULER_TICK_MS};
use rotary_menu::edit::format_value;
use rotary_menu::storage::FlashStore;
use rotary_menu::ui::buttons::{encoder_task, HardwareInput};
use rotary_menu::ui::display::OledText;
use rotary_menu::{
    CharDisplay, DurableStore, EncoderCounters, Error, Field, Input, MenuSystem, PressTiming,
    RamStore, RenderGate, Restart, SettingKey, Settings,
};

bind_interrupts!(struct Irqs {
    QDEC => qdec::InterruptHandler<QDEC>;
    TWISPI0 => twim::InterruptHandler<TWISPI0>;
});

type Oled = OledText<Twim<'static, TWISPI0>>;

static ENCODER: EncoderCounters = EncoderCounters::new(ENCODER_COARSE_DIVISOR, ENCODER_FINE_DIVISOR);
static GATE: StaticCell<RenderGate<CriticalSectionRawMutex, Oled>> = StaticCell::new();

/// Flash when it works, RAM when it does not.
enum SettingsStore {
    Flash(FlashStore<BlockingAsync<Nvmc<'static>>>),
    Ram(RamStore),
}

impl DurableStore for SettingsStore {
    fn read(&mut self, key: SettingKey) -> Result<Option<i32>, Error> {
        match self {
            SettingsStore::Flash(s) => s.read(key),
            SettingsStore::Ram(s) => s.read(key),
        }
    }

    fn write(&mut self, key: SettingKey, value: i32) -> Result<(), Error> {
        match self {
            SettingsStore::Flash(s) => s.write(key, value),
            SettingsStore::Ram(s) => s.write(key, value),
        }
    }
}

/// Reset by starting the watchdog and never feeding it.
struct WatchdogRestart {
    wdt: Option<WDT>,
}

impl Restart for WatchdogRestart {
    fn arm_watchdog(&mut self, timeout_ms: u32) {
        let Some(wdt) = self.wdt.take() else {
            return;
        };
        let mut config = wdt::Config::default();
        // WDT runs from the 32.768 kHz LFCLK
        config.timeout_ticks = 32_768 * timeout_ms / 1000;
        if Watchdog::try_new::<1>(wdt, config).is_err() {
            warn!("watchdog already running with its old timeout");
        }
    }

    fn halt(&mut self) -> ! {
        loop {
            cortex_m::asm::wfe();
        }
    }
}

fn draw_status<D: CharDisplay>(display: &mut D, settings: &Settings) {
    let freq = format_value(Field::Frequency.format(), settings.running_frequency());
    display.clear();
    display.print("Frequency:");
    display.goto(1, 0);
    display.print(&freq);
    display.goto(3, 0);
    display.print("Memory ");
    let slot = settings.get(SettingKey::scalar(Field::ActiveSlot));
    let mut digit = [0u8; 1];
    display.print(char::from(b'0' + slot as u8).encode_utf8(&mut digit));
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(Default::default());
    info!("rotary-menu starting");

    // Display
    let twim = Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim::Config::default());
    let oled = match OledText::new(twim) {
        Ok(oled) => oled,
        Err(e) => {
            error!("display init failed: {:?}", e);
            return;
        }
    };
    let gate = GATE.init(RenderGate::new(oled));

    // Encoder
    let qdec = qdec::Qdec::new(p.QDEC, Irqs, p.P0_31, p.P0_30, qdec::Config::default());
    if let Err(e) = spawner.spawn(encoder_task(qdec, &ENCODER)) {
        error!("encoder task spawn failed: {:?}", e);
    }

    // Settings
    let mut store = SettingsStore::Flash(FlashStore::new(BlockingAsync::new(Nvmc::new(p.NVMC))));
    let settings = match Settings::load(&mut store) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("flash unavailable ({:?}) - settings will not persist", e);
            store = SettingsStore::Ram(RamStore::new());
            Settings::defaults()
        }
    };
    info!("settings loaded, memory {}", settings.active_slot());

    let input = Input::new(HardwareInput::new(p.P0_11.degrade(), &ENCODER), PressTiming::default());
    let restart = WatchdogRestart { wdt: Some(p.WDT) };
    let mut menu = MenuSystem::new(gate, input, store, restart, Delay, settings);

    gate.with_display_if_free(|d| draw_status(d, menu.settings()));

    let mut ticker = Ticker::every(Duration::from_millis(SCHEDULER_TICK_MS));
    loop {
        menu.scheduler_tick();
        let refresh = menu.take_refresh_request();
        if menu.take_display_released() || refresh {
            gate.with_display_if_free(|d| draw_status(d, menu.settings()));
        }
        ticker.next().await;
    }
}
