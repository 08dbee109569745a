//! Settings model: every user-settable value, its storage width, bounds
//! and default, plus the volatile mirror the running system reads.
//!
//! Storage layout:
//!   - Each value is keyed by `SettingKey::storage_key()` = field << 8 | index.
//!   - Values occupy 1, 2 or 4 bytes according to their field's `Width`.
//!   - An init marker tells a populated store from a blank (or factory
//!     reset) one; a blank store is filled with defaults at boot.

use crate::config::{FACTORY_RESET_MARKER, INIT_MAGIC, MEMORY_SLOTS};
use crate::edit::ValueFormat;
use crate::error::Error;
use crate::storage::DurableStore;

/// Durable storage width of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Width {
    U8,
    I8,
    U16,
    U32,
}

impl Width {
    pub const fn bytes(self) -> usize {
        match self {
            Width::U8 | Width::I8 => 1,
            Width::U16 => 2,
            Width::U32 => 4,
        }
    }

    /// True if `value` is representable at this width.
    pub fn fits(self, value: i32) -> bool {
        match self {
            Width::U8 => (0..=u8::MAX as i32).contains(&value),
            Width::I8 => (i8::MIN as i32..=i8::MAX as i32).contains(&value),
            Width::U16 => (0..=u16::MAX as i32).contains(&value),
            Width::U32 => value >= 0,
        }
    }

    /// Little-endian encoding into `buf`; returns the used prefix.
    pub fn encode(self, value: i32, buf: &mut [u8; 4]) -> Option<&[u8]> {
        if !self.fits(value) {
            return None;
        }
        *buf = value.to_le_bytes();
        Some(&buf[..self.bytes()])
    }

    pub fn decode(self, bytes: &[u8]) -> Option<i32> {
        match (self, bytes) {
            (Width::U8, [b]) => Some(*b as i32),
            (Width::I8, [b]) => Some(*b as i8 as i32),
            (Width::U16, [a, b]) => Some(u16::from_le_bytes([*a, *b]) as i32),
            (Width::U32, [a, b, c, d]) => {
                let v = u32::from_le_bytes([*a, *b, *c, *d]);
                i32::try_from(v).ok()
            }
            _ => None,
        }
    }
}

/// Settable fields.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    /// Written last when a complete default set is in the store.
    InitMarker = 0,
    /// Index 0 is the running frequency, 1..=9 the quick memories.
    /// Fixed point, 23 fractional bits, MHz.
    Frequency = 1,
    /// Quick memory most recently selected (1..=9).
    ActiveSlot = 2,
    VfoResolution = 3,
    PaAlarmTemp = 4,
    FanOnTemp = 5,
    FanOffTemp = 6,
    /// Band-pass crossover points. Fixed point, 7 fractional bits, MHz.
    BpfCrossover = 7,
    /// Low-pass crossover points. Fixed point, 7 fractional bits, MHz.
    LpfCrossover = 8,
    RxOffset = 9,
    I2cAddress = 10,
    /// Oscillator crystal frequency. Fixed point, 24 fractional bits, MHz.
    XtalCalibration = 11,
    EncoderResolution = 12,
    AudioMode = 13,
}

const FREQ_DEFAULTS: [i32; 10] = [
    59_139_686, 15_267_267, 29_527_900, 58_888_028, 84_892_713, 117_608_284, 151_749_919,
    176_328_540, 208_960_225, 235_048_796,
];
const BPF_DEFAULTS: [i32; 7] = [256, 512, 1024, 1408, 1856, 2304, 2688];
const LPF_DEFAULTS: [i32; 5] = [269, 525, 960, 1856, 2752];
const I2C_DEFAULTS: [i32; 8] = [0x55, 0x3f, 0x38, 0x39, 0x3a, 0x4e, 0x0c, 0x28];

const AUDIO_MODES: &[&str] = &["UAC1", "UAC2"];

impl Field {
    pub const ALL: [Field; 14] = [
        Field::InitMarker,
        Field::Frequency,
        Field::ActiveSlot,
        Field::VfoResolution,
        Field::PaAlarmTemp,
        Field::FanOnTemp,
        Field::FanOffTemp,
        Field::BpfCrossover,
        Field::LpfCrossover,
        Field::RxOffset,
        Field::I2cAddress,
        Field::XtalCalibration,
        Field::EncoderResolution,
        Field::AudioMode,
    ];

    pub const fn width(self) -> Width {
        match self {
            Field::InitMarker
            | Field::ActiveSlot
            | Field::PaAlarmTemp
            | Field::FanOnTemp
            | Field::FanOffTemp
            | Field::I2cAddress
            | Field::AudioMode => Width::U8,
            Field::RxOffset => Width::I8,
            Field::VfoResolution
            | Field::BpfCrossover
            | Field::LpfCrossover
            | Field::EncoderResolution => Width::U16,
            Field::Frequency | Field::XtalCalibration => Width::U32,
        }
    }

    /// Inclusive bounds.
    pub const fn bounds(self) -> (i32, i32) {
        match self {
            Field::InitMarker => (0, 255),
            Field::Frequency | Field::XtalCalibration => (0, i32::MAX),
            Field::ActiveSlot => (1, MEMORY_SLOTS as i32),
            Field::VfoResolution => (1, 100),
            Field::PaAlarmTemp | Field::FanOnTemp | Field::FanOffTemp => (0, 127),
            // 54 MHz in 7-bit fixed point
            Field::BpfCrossover | Field::LpfCrossover => (0, 6912),
            Field::RxOffset => (-32, 31),
            Field::I2cAddress => (0, 127),
            Field::EncoderResolution => (16, 8192),
            Field::AudioMode => (0, 1),
        }
    }

    /// Number of indexed elements (1 for scalars).
    pub const fn count(self) -> usize {
        match self {
            Field::Frequency => FREQ_DEFAULTS.len(),
            Field::BpfCrossover => BPF_DEFAULTS.len(),
            Field::LpfCrossover => LPF_DEFAULTS.len(),
            Field::I2cAddress => I2C_DEFAULTS.len(),
            _ => 1,
        }
    }

    pub const fn default_for(self, index: u8) -> i32 {
        let i = index as usize;
        match self {
            Field::InitMarker => INIT_MAGIC,
            Field::Frequency => FREQ_DEFAULTS[clamp_index(i, FREQ_DEFAULTS.len())],
            Field::ActiveSlot => 1,
            Field::VfoResolution => 10,
            Field::PaAlarmTemp => 55,
            Field::FanOnTemp => 45,
            Field::FanOffTemp => 40,
            Field::BpfCrossover => BPF_DEFAULTS[clamp_index(i, BPF_DEFAULTS.len())],
            Field::LpfCrossover => LPF_DEFAULTS[clamp_index(i, LPF_DEFAULTS.len())],
            Field::RxOffset => 9,
            Field::I2cAddress => I2C_DEFAULTS[clamp_index(i, I2C_DEFAULTS.len())],
            Field::XtalCalibration => 1_917_384_131,
            Field::EncoderResolution => 1024,
            Field::AudioMode => 0,
        }
    }

    /// Fields that change hardware addressing or enumeration take effect
    /// only after a reset.
    pub const fn requires_restart(self) -> bool {
        matches!(self, Field::InitMarker | Field::I2cAddress | Field::AudioMode)
    }

    pub fn clamp(self, value: i32) -> i32 {
        let (min, max) = self.bounds();
        value.clamp(min, max)
    }

    pub const fn format(self) -> ValueFormat {
        match self {
            Field::Frequency => ValueFormat::Fixed { frac_bits: 23, decimals: 6, suffix: " MHz" },
            Field::XtalCalibration => ValueFormat::Fixed { frac_bits: 24, decimals: 6, suffix: " MHz" },
            Field::BpfCrossover | Field::LpfCrossover => {
                ValueFormat::Fixed { frac_bits: 7, decimals: 3, suffix: " MHz" }
            }
            Field::VfoResolution | Field::I2cAddress => ValueFormat::Plain { width: 3, suffix: "" },
            Field::PaAlarmTemp | Field::FanOnTemp | Field::FanOffTemp => {
                ValueFormat::Plain { width: 4, suffix: "C" }
            }
            Field::RxOffset => ValueFormat::Plain { width: 3, suffix: " kHz" },
            Field::EncoderResolution => ValueFormat::Plain { width: 4, suffix: "" },
            Field::AudioMode => ValueFormat::Named(AUDIO_MODES),
            Field::InitMarker | Field::ActiveSlot => ValueFormat::Plain { width: 0, suffix: "" },
        }
    }

    /// Four-line warning shown before a restart-class change resets the device.
    pub const fn restart_notice(self) -> Option<[&'static str; 4]> {
        match self {
            Field::I2cAddress => Some([
                "I2C Address Modified",
                "",
                "Device will be",
                " RESET into new mode",
            ]),
            Field::AudioMode => Some([
                "Audio Mode Selected",
                "",
                "Device will be",
                " RESET into new mode",
            ]),
            Field::InitMarker => Some([
                "Factory Reset was",
                "selected.",
                "All settings reset",
                "to default values.",
            ]),
            _ => None,
        }
    }

    /// Position of this field's first element in the flat mirror.
    const fn offset(self) -> usize {
        let mut offset = 0;
        let mut i = 0;
        while i < Self::ALL.len() {
            if Self::ALL[i] as u8 == self as u8 {
                return offset;
            }
            offset += Self::ALL[i].count();
            i += 1;
        }
        offset
    }
}

const fn clamp_index(index: usize, len: usize) -> usize {
    if index < len {
        index
    } else {
        len - 1
    }
}

/// Total number of stored values across all fields.
pub const SETTING_COUNT: usize = {
    let mut total = 0;
    let mut i = 0;
    while i < Field::ALL.len() {
        total += Field::ALL[i].count();
        i += 1;
    }
    total
};

/// Stable identity of one stored value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SettingKey {
    pub field: Field,
    /// Secondary index for array fields, 0 for scalars.
    pub index: u8,
}

impl SettingKey {
    pub const fn new(field: Field, index: u8) -> Self {
        Self { field, index }
    }

    pub const fn scalar(field: Field) -> Self {
        Self::new(field, 0)
    }

    /// Key used by the durable store.
    pub const fn storage_key(self) -> u16 {
        ((self.field as u16) << 8) | self.index as u16
    }

    /// Position in the flat mirror. Out-of-range indices map to the
    /// field's last element.
    pub const fn slot(self) -> usize {
        self.field.offset() + clamp_index(self.index as usize, self.field.count())
    }

    pub const fn default_value(self) -> i32 {
        self.field.default_for(self.index)
    }

    /// Every key in storage order, init marker first.
    pub fn all() -> impl Iterator<Item = SettingKey> {
        Field::ALL
            .into_iter()
            .flat_map(|f| (0..f.count() as u8).map(move |i| SettingKey::new(f, i)))
    }
}

/// Volatile mirror of every setting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    values: [i32; SETTING_COUNT],
}

impl Settings {
    pub fn defaults() -> Self {
        let mut values = [0; SETTING_COUNT];
        for key in SettingKey::all() {
            values[key.slot()] = key.default_value();
        }
        Self { values }
    }

    pub fn get(&self, key: SettingKey) -> i32 {
        self.values[key.slot()]
    }

    /// Store `value` clamped to the field's bounds; returns what was stored.
    pub fn set(&mut self, key: SettingKey, value: i32) -> i32 {
        let value = key.field.clamp(value);
        self.values[key.slot()] = value;
        value
    }

    pub fn running_frequency(&self) -> i32 {
        self.get(SettingKey::new(Field::Frequency, 0))
    }

    pub fn active_slot(&self) -> u8 {
        self.get(SettingKey::scalar(Field::ActiveSlot)) as u8
    }

    /// Read every setting from the durable store.
    ///
    /// A store whose init marker is missing or not `INIT_MAGIC` is blank
    /// or was factory reset: every default is written back and the marker
    /// goes in last. Values that are missing or out of bounds fall back to
    /// their defaults.
    pub fn load<S: DurableStore>(store: &mut S) -> Result<Self, Error> {
        let marker_key = SettingKey::scalar(Field::InitMarker);
        let marker = store.read(marker_key)?;
        let mut settings = Self::defaults();

        if marker != Some(INIT_MAGIC) {
            if marker == Some(FACTORY_RESET_MARKER) {
                info!("factory reset requested - restoring defaults");
            } else {
                info!("settings store not initialised - writing defaults");
            }
            for key in SettingKey::all().filter(|k| *k != marker_key) {
                store.write(key, key.default_value())?;
            }
            store.write(marker_key, INIT_MAGIC)?;
            return Ok(settings);
        }

        for key in SettingKey::all() {
            match store.read(key) {
                Ok(Some(v)) if key.field.clamp(v) == v => {
                    settings.values[key.slot()] = v;
                }
                Ok(Some(v)) => {
                    warn!("stored value {} out of bounds for {:?}", v, key);
                }
                Ok(None) => {
                    debug!("no stored value for {:?}, using default", key);
                }
                Err(e) => {
                    warn!("read failed for {:?}: {:?}", key, e);
                }
            }
        }
        Ok(settings)
    }

    /// Quick-memory rotation: park the running frequency in the active
    /// memory, advance to the next memory (wrapping 9 → 1) and make its
    /// frequency the running one. Volatile only.
    pub fn cycle_memory(&mut self) -> u8 {
        let slot = self.active_slot().clamp(1, MEMORY_SLOTS);
        let running = self.running_frequency();
        self.set(SettingKey::new(Field::Frequency, slot), running);

        let next = if slot >= MEMORY_SLOTS { 1 } else { slot + 1 };
        self.set(SettingKey::scalar(Field::ActiveSlot), next as i32);
        let recalled = self.get(SettingKey::new(Field::Frequency, next));
        self.set(SettingKey::new(Field::Frequency, 0), recalled);
        next
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RamStore;

    #[test]
    fn setting_count_matches_field_counts() {
        assert_eq!(SETTING_COUNT, 40);
        assert_eq!(SettingKey::all().count(), SETTING_COUNT);
    }

    #[test]
    fn slots_are_unique_and_dense() {
        let mut seen = [false; SETTING_COUNT];
        for key in SettingKey::all() {
            assert!(!seen[key.slot()], "{:?} collides", key);
            seen[key.slot()] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn defaults_are_within_bounds_and_width() {
        for key in SettingKey::all() {
            let v = key.default_value();
            assert_eq!(key.field.clamp(v), v, "{:?}", key);
            assert!(key.field.width().fits(v), "{:?}", key);
        }
    }

    #[test]
    fn width_rejects_unrepresentable_values() {
        assert!(!Width::U8.fits(256));
        assert!(!Width::I8.fits(-129));
        assert!(Width::I8.fits(-32));
        assert!(!Width::U16.fits(-1));
        let mut buf = [0; 4];
        assert_eq!(Width::I8.encode(-5, &mut buf), Some(&[0xFB][..]));
        assert_eq!(Width::I8.decode(&[0xFB]), Some(-5));
        assert_eq!(Width::U16.decode(&[1]), None);
    }

    #[test]
    fn blank_store_is_filled_with_defaults_marker_last() {
        let mut store = RamStore::new();
        let settings = Settings::load(&mut store).unwrap();
        assert_eq!(settings, Settings::defaults());
        assert_eq!(store.writes(), SETTING_COUNT as u32);
        assert_eq!(store.last_written(), Some(SettingKey::scalar(Field::InitMarker)));
        assert_eq!(store.peek(SettingKey::new(Field::I2cAddress, 3)), Some(0x39));
    }

    #[test]
    fn initialised_store_is_read_back() {
        let mut store = RamStore::new();
        Settings::load(&mut store).unwrap();
        let key = SettingKey::scalar(Field::FanOnTemp);
        store.write(key, 50).unwrap();
        let before = store.writes();

        let settings = Settings::load(&mut store).unwrap();
        assert_eq!(settings.get(key), 50);
        assert_eq!(store.writes(), before);
    }

    #[test]
    fn factory_reset_marker_restores_defaults() {
        let mut store = RamStore::new();
        Settings::load(&mut store).unwrap();
        store.write(SettingKey::scalar(Field::FanOnTemp), 50).unwrap();
        store
            .write(SettingKey::scalar(Field::InitMarker), FACTORY_RESET_MARKER)
            .unwrap();

        let settings = Settings::load(&mut store).unwrap();
        assert_eq!(settings.get(SettingKey::scalar(Field::FanOnTemp)), 45);
        assert_eq!(store.peek(SettingKey::scalar(Field::FanOnTemp)), Some(45));
        assert_eq!(store.peek(SettingKey::scalar(Field::InitMarker)), Some(INIT_MAGIC));
    }

    #[test]
    fn out_of_bounds_stored_value_falls_back_to_default() {
        let mut store = RamStore::new();
        Settings::load(&mut store).unwrap();
        store.write(SettingKey::scalar(Field::VfoResolution), 500).unwrap();
        let settings = Settings::load(&mut store).unwrap();
        assert_eq!(settings.get(SettingKey::scalar(Field::VfoResolution)), 10);
    }

    #[test]
    fn memory_cycle_wraps_after_last_slot() {
        let mut s = Settings::defaults();
        let running = s.running_frequency();
        assert_eq!(s.cycle_memory(), 2);
        assert_eq!(s.get(SettingKey::new(Field::Frequency, 1)), running);
        assert_eq!(s.running_frequency(), FREQ_DEFAULTS[2]);

        for _ in 0..7 {
            s.cycle_memory();
        }
        assert_eq!(s.active_slot(), 9);
        assert_eq!(s.cycle_memory(), 1);
        assert_eq!(s.running_frequency(), running);
    }

    #[test]
    fn set_clamps_to_bounds() {
        let mut s = Settings::defaults();
        let key = SettingKey::scalar(Field::RxOffset);
        assert_eq!(s.set(key, -100), -32);
        assert_eq!(s.get(key), -32);
    }
}
