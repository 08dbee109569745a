//! The configuration menu tree.
//!
//! Every level, its items and their actions are static data; `node` is
//! the transition table from level id to level.

use super::{Action, Banner, Item, LevelId, MenuNode, Notice, Preview, Seed, Window};
use crate::config::{FACTORY_RESET_MARKER, MENU_WINDOW_LINES};
use crate::edit::{EditKind, EditScreen, Resolution};
use crate::settings::{Field, SettingKey};

const fn window(col: u8) -> Window {
    Window {
        row: 1,
        col,
        lines: MENU_WINDOW_LINES,
    }
}

const fn key(field: Field, index: u8) -> SettingKey {
    SettingKey::new(field, index)
}

const fn edit(screen: &'static EditScreen, index: u8) -> Action {
    Action::Edit { screen, index }
}

// Edit screens

const VFO_STEPS: &[i32] = &[1, 2, 5, 10, 50, 100];
const ENCODER_STEPS: &[i32] = &[
    16, 20, 24, 32, 36, 48, 64, 72, 96, 128, 256, 512, 1024, 2048, 4096, 8192,
];

pub static VFO_RESOLUTION: EditScreen = EditScreen {
    field: Field::VfoResolution,
    title: "VFO Resolution:",
    labels: &["Steps per revolution"],
    kind: EditKind::Choice(VFO_STEPS),
    resolution: Resolution::Coarse,
    return_to: LevelId::Top,
};

pub static RX_OFFSET: EditScreen = EditScreen {
    field: Field::RxOffset,
    title: "PowerSDR-IQ Receive",
    labels: &["   Frequency Offset:"],
    kind: EditKind::Range { min: -32, max: 31 },
    resolution: Resolution::Coarse,
    return_to: LevelId::Top,
};

pub static XTAL_CALIBRATION: EditScreen = EditScreen {
    field: Field::XtalCalibration,
    title: "Si570 Calibration:",
    labels: &["Crystal frequency"],
    kind: EditKind::Range { min: 0, max: i32::MAX },
    resolution: Resolution::Fine,
    return_to: LevelId::Top,
};

pub static ENCODER_RESOLUTION: EditScreen = EditScreen {
    field: Field::EncoderResolution,
    title: "Rotary Encoder",
    labels: &["         Resolution:"],
    kind: EditKind::Choice(ENCODER_STEPS),
    resolution: Resolution::Coarse,
    return_to: LevelId::Top,
};

pub static PA_ALARM: EditScreen = EditScreen {
    field: Field::PaAlarmTemp,
    title: "Shutdown temperature",
    labels: &["of Power Amplifier:"],
    kind: EditKind::Range { min: 0, max: 127 },
    resolution: Resolution::Fine,
    return_to: LevelId::Temperature,
};

pub static FAN_ON: EditScreen = EditScreen {
    field: Field::FanOnTemp,
    title: "Fan On temperature",
    labels: &["of Power Amplifier:"],
    kind: EditKind::Range { min: 0, max: 127 },
    resolution: Resolution::Fine,
    return_to: LevelId::Temperature,
};

pub static FAN_OFF: EditScreen = EditScreen {
    field: Field::FanOffTemp,
    title: "Fan Off temperature",
    labels: &["of Power Amplifier:"],
    kind: EditKind::Range { min: 0, max: 127 },
    resolution: Resolution::Fine,
    return_to: LevelId::Temperature,
};

pub static BPF_POINT: EditScreen = EditScreen {
    field: Field::BpfCrossover,
    title: "Set BPF Filter",
    labels: &[
        "  Crossover Point 1:",
        "  Crossover Point 2:",
        "  Crossover Point 3:",
        "  Crossover Point 4:",
        "  Crossover Point 5:",
        "  Crossover Point 6:",
        "  Crossover Point 7:",
    ],
    kind: EditKind::Range { min: 0, max: 6912 },
    resolution: Resolution::Fine,
    return_to: LevelId::BpfPoints,
};

pub static LPF_POINT: EditScreen = EditScreen {
    field: Field::LpfCrossover,
    title: "Set LPF Filter",
    labels: &[
        "  Crossover Point 1:",
        "  Crossover Point 2:",
        "  Crossover Point 3:",
        "  Crossover Point 4:",
        "  Crossover Point 5:",
    ],
    kind: EditKind::Range { min: 0, max: 6912 },
    resolution: Resolution::Fine,
    return_to: LevelId::LpfPoints,
};

pub static I2C_ADDRESS: EditScreen = EditScreen {
    field: Field::I2cAddress,
    title: "I2C Address for",
    labels: &[
        "Si570 VCXO:",
        "PCF8574 Mobo:",
        "PCF8574 LPF1:",
        "PCF8574 LPF2:",
        "PCF8574 FAN:",
        "TMP100/101:",
        "AD5301 DAC:",
        "AD7991 ADC:",
    ],
    kind: EditKind::Range { min: 0, max: 127 },
    resolution: Resolution::Coarse,
    return_to: LevelId::I2c,
};

// Levels

static TOP_ITEMS: [Item; 15] = [
    Item::new("1-Save Frequency", Action::Descend(LevelId::SaveSlot)),
    Item::new("2-VFO Resolution", edit(&VFO_RESOLUTION, 0)),
    Item::new("3-PCF8574 Control", Action::NotImplemented),
    Item::new("4-Power and SWR", Action::NotImplemented),
    Item::new("5-Bias Settings", Action::NotImplemented),
    Item::new("6-PA Temperature", Action::Descend(LevelId::Temperature)),
    Item::new("7-Manage Filters", Action::Descend(LevelId::Filters)),
    Item::new("8-PSDR-IQ RX offs", edit(&RX_OFFSET, 0)),
    Item::new("9-I2C Addresses", Action::Descend(LevelId::I2c)),
    Item::new("10-Si570 Calibrate", edit(&XTAL_CALIBRATION, 0)),
    Item::new("11-Frq Add/Sub/Mul", Action::NotImplemented),
    Item::new("12-Encoder Steps", edit(&ENCODER_RESOLUTION, 0)),
    Item::new("13-UAC1/UAC2 Audio", Action::Descend(LevelId::AudioMode)),
    Item::new("14-Factory Reset", Action::Descend(LevelId::FactoryReset)),
    Item::new("15-Exit", Action::Exit),
];

static TOP: MenuNode = MenuNode {
    level: LevelId::Top,
    title: "Configuration Menu:",
    parent: None,
    items: &TOP_ITEMS,
    window: window(0),
    banner: None,
    preview: None,
    seed: None,
    done_notice: None,
};

static SAVE_SLOT_ITEMS: [Item; 11] = [
    Item::new("CH1", Action::SaveSlot(1)).previewing(key(Field::Frequency, 1)),
    Item::new("CH2", Action::SaveSlot(2)).previewing(key(Field::Frequency, 2)),
    Item::new("CH3", Action::SaveSlot(3)).previewing(key(Field::Frequency, 3)),
    Item::new("CH4", Action::SaveSlot(4)).previewing(key(Field::Frequency, 4)),
    Item::new("CH5", Action::SaveSlot(5)).previewing(key(Field::Frequency, 5)),
    Item::new("CH6", Action::SaveSlot(6)).previewing(key(Field::Frequency, 6)),
    Item::new("CH7", Action::SaveSlot(7)).previewing(key(Field::Frequency, 7)),
    Item::new("CH8", Action::SaveSlot(8)).previewing(key(Field::Frequency, 8)),
    Item::new("CH9", Action::SaveSlot(9)).previewing(key(Field::Frequency, 9)),
    Item::new("Back", Action::Back),
    Item::new("Exit", Action::Exit),
];

static SAVE_SLOT: MenuNode = MenuNode {
    level: LevelId::SaveSlot,
    title: "Frequency to Save:",
    parent: Some(LevelId::Top),
    items: &SAVE_SLOT_ITEMS,
    window: window(14),
    banner: Some(Banner {
        key: key(Field::Frequency, 0),
        row: 1,
        col: 0,
    }),
    preview: Some(Preview {
        heading: "Current Memory",
        empty: "Exit w/o save",
        row: 2,
        col: 0,
    }),
    seed: Some(Seed {
        key: key(Field::ActiveSlot, 0),
        offset: -1,
    }),
    done_notice: None,
};

static TEMPERATURE_ITEMS: [Item; 5] = [
    Item::new("1-Tmp Alarm", edit(&PA_ALARM, 0)).previewing(key(Field::PaAlarmTemp, 0)),
    Item::new("2-Fan ON", edit(&FAN_ON, 0)).previewing(key(Field::FanOnTemp, 0)),
    Item::new("3-Fan Off", edit(&FAN_OFF, 0)).previewing(key(Field::FanOffTemp, 0)),
    Item::new("4-Go Back", Action::Back),
    Item::new("5-Exit", Action::Exit),
];

static TEMPERATURE: MenuNode = MenuNode {
    level: LevelId::Temperature,
    title: "Temperature Mngmnt:",
    parent: Some(LevelId::Top),
    items: &TEMPERATURE_ITEMS,
    window: window(7),
    banner: None,
    preview: Some(Preview {
        heading: "Cur Val",
        empty: "   --",
        row: 1,
        col: 0,
    }),
    seed: None,
    done_notice: Some(Notice::Text("Done w. Temperature")),
};

static FILTERS_ITEMS: [Item; 6] = [
    Item::new("1-BPF Crossover", Action::Descend(LevelId::BpfPoints)),
    Item::new("2-BPF Order", Action::NotImplemented),
    Item::new("3-LPF Crossover", Action::Descend(LevelId::LpfPoints)),
    Item::new("4-LPF Order", Action::NotImplemented),
    Item::new("5-Go Back", Action::Back),
    Item::new("6-Exit", Action::Exit),
];

static FILTERS: MenuNode = MenuNode {
    level: LevelId::Filters,
    title: "Filters Menu:",
    parent: Some(LevelId::Top),
    items: &FILTERS_ITEMS,
    window: window(1),
    banner: None,
    preview: None,
    seed: None,
    done_notice: None,
};

static BPF_POINT_ITEMS: [Item; 9] = [
    Item::new("CP-1", edit(&BPF_POINT, 0)).previewing(key(Field::BpfCrossover, 0)),
    Item::new("CP-2", edit(&BPF_POINT, 1)).previewing(key(Field::BpfCrossover, 1)),
    Item::new("CP-3", edit(&BPF_POINT, 2)).previewing(key(Field::BpfCrossover, 2)),
    Item::new("CP-4", edit(&BPF_POINT, 3)).previewing(key(Field::BpfCrossover, 3)),
    Item::new("CP-5", edit(&BPF_POINT, 4)).previewing(key(Field::BpfCrossover, 4)),
    Item::new("CP-6", edit(&BPF_POINT, 5)).previewing(key(Field::BpfCrossover, 5)),
    Item::new("CP-7", edit(&BPF_POINT, 6)).previewing(key(Field::BpfCrossover, 6)),
    Item::new("Back", Action::Back),
    Item::new("Exit", Action::Exit),
];

static BPF_POINTS: MenuNode = MenuNode {
    level: LevelId::BpfPoints,
    title: "BandPass Filter",
    parent: Some(LevelId::Filters),
    items: &BPF_POINT_ITEMS,
    window: window(14),
    banner: None,
    preview: Some(Preview {
        heading: "Crossover:",
        empty: "",
        row: 1,
        col: 0,
    }),
    seed: None,
    done_notice: None,
};

static LPF_POINT_ITEMS: [Item; 7] = [
    Item::new("CP-1", edit(&LPF_POINT, 0)).previewing(key(Field::LpfCrossover, 0)),
    Item::new("CP-2", edit(&LPF_POINT, 1)).previewing(key(Field::LpfCrossover, 1)),
    Item::new("CP-3", edit(&LPF_POINT, 2)).previewing(key(Field::LpfCrossover, 2)),
    Item::new("CP-4", edit(&LPF_POINT, 3)).previewing(key(Field::LpfCrossover, 3)),
    Item::new("CP-5", edit(&LPF_POINT, 4)).previewing(key(Field::LpfCrossover, 4)),
    Item::new("Back", Action::Back),
    Item::new("Exit", Action::Exit),
];

static LPF_POINTS: MenuNode = MenuNode {
    level: LevelId::LpfPoints,
    title: "LowPass Filter",
    parent: Some(LevelId::Filters),
    items: &LPF_POINT_ITEMS,
    window: window(14),
    banner: None,
    preview: Some(Preview {
        heading: "Crossover:",
        empty: "",
        row: 1,
        col: 0,
    }),
    seed: None,
    done_notice: None,
};

static I2C_ITEMS: [Item; 10] = [
    Item::new("Si570 VCXO", edit(&I2C_ADDRESS, 0)).previewing(key(Field::I2cAddress, 0)),
    Item::new("PCF8574 Mobo", edit(&I2C_ADDRESS, 1)).previewing(key(Field::I2cAddress, 1)),
    Item::new("PCF8574 LPF1", edit(&I2C_ADDRESS, 2)).previewing(key(Field::I2cAddress, 2)),
    Item::new("PCF8574 LPF2", edit(&I2C_ADDRESS, 3)).previewing(key(Field::I2cAddress, 3)),
    Item::new("PCF8574 FAN", edit(&I2C_ADDRESS, 4)).previewing(key(Field::I2cAddress, 4)),
    Item::new("TMP100/101", edit(&I2C_ADDRESS, 5)).previewing(key(Field::I2cAddress, 5)),
    Item::new("AD5301 DAC", edit(&I2C_ADDRESS, 6)).previewing(key(Field::I2cAddress, 6)),
    Item::new("AD7991 ADC", edit(&I2C_ADDRESS, 7)).previewing(key(Field::I2cAddress, 7)),
    Item::new("Go Back", Action::Back),
    Item::new("Exit", Action::Exit),
];

static I2C: MenuNode = MenuNode {
    level: LevelId::I2c,
    title: "I2C Addresses:",
    parent: Some(LevelId::Top),
    items: &I2C_ITEMS,
    window: window(6),
    banner: None,
    preview: Some(Preview {
        heading: "Addr:",
        empty: "",
        row: 1,
        col: 0,
    }),
    seed: None,
    done_notice: None,
};

static AUDIO_MODE_ITEMS: [Item; 3] = [
    Item::new(
        "Select UAC1 Audio",
        Action::Assign {
            key: key(Field::AudioMode, 0),
            value: 0,
        },
    ),
    Item::new(
        "Select UAC2 Audio",
        Action::Assign {
            key: key(Field::AudioMode, 0),
            value: 1,
        },
    ),
    Item::new("Exit w/o change", Action::Exit),
];

static AUDIO_MODE: MenuNode = MenuNode {
    level: LevelId::AudioMode,
    title: "Current sel:",
    parent: Some(LevelId::Top),
    items: &AUDIO_MODE_ITEMS,
    window: window(1),
    banner: Some(Banner {
        key: key(Field::AudioMode, 0),
        row: 0,
        col: 13,
    }),
    preview: None,
    seed: None,
    done_notice: Some(Notice::Unchanged {
        key: key(Field::AudioMode, 0),
        suffix: " mode unchanged",
    }),
};

static FACTORY_RESET_ITEMS: [Item; 3] = [
    Item::new(
        "1-Yes  Reset",
        Action::Assign {
            key: key(Field::InitMarker, 0),
            value: FACTORY_RESET_MARKER,
        },
    ),
    Item::new("2-No - Go back", Action::Back),
    Item::new("3-No - Exit", Action::Exit),
];

static FACTORY_RESET: MenuNode = MenuNode {
    level: LevelId::FactoryReset,
    title: "Set all to default:",
    parent: Some(LevelId::Top),
    items: &FACTORY_RESET_ITEMS,
    window: window(3),
    banner: None,
    preview: None,
    seed: None,
    done_notice: Some(Notice::Text("Nothing Changed")),
};

/// Level id → level.
pub fn node(level: LevelId) -> &'static MenuNode {
    match level {
        LevelId::Top => &TOP,
        LevelId::SaveSlot => &SAVE_SLOT,
        LevelId::Temperature => &TEMPERATURE,
        LevelId::Filters => &FILTERS,
        LevelId::BpfPoints => &BPF_POINTS,
        LevelId::LpfPoints => &LPF_POINTS,
        LevelId::I2c => &I2C,
        LevelId::AudioMode => &AUDIO_MODE,
        LevelId::FactoryReset => &FACTORY_RESET,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DISPLAY_COLS;

    #[test]
    fn node_ids_match_table() {
        for level in LevelId::ALL {
            assert_eq!(node(level).level, level);
        }
    }

    #[test]
    fn choice_tables_ascend() {
        for table in [VFO_STEPS, ENCODER_STEPS] {
            assert!(table.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn every_level_can_show_a_full_window() {
        for level in LevelId::ALL {
            let n = node(level);
            assert!(n.items.len() >= n.window.lines as usize, "{:?}", level);
        }
    }

    #[test]
    fn labels_fit_beside_the_marker() {
        for level in LevelId::ALL {
            let n = node(level);
            assert!(n.title.len() <= DISPLAY_COLS as usize, "{:?}", level);
            for item in n.items {
                assert!(
                    n.window.col as usize + 2 + item.label.len() <= DISPLAY_COLS as usize,
                    "{:?}: {}",
                    level,
                    item.label
                );
            }
        }
    }

    #[test]
    fn descents_point_back_to_their_parent() {
        for level in LevelId::ALL {
            for item in node(level).items {
                if let Action::Descend(child) = item.action {
                    assert_eq!(node(child).parent, Some(level), "{:?}", child);
                }
            }
        }
    }

    #[test]
    fn edit_indices_are_in_range() {
        for level in LevelId::ALL {
            for item in node(level).items {
                if let Action::Edit { screen, index } = item.action {
                    assert!((index as usize) < screen.field.count(), "{}", item.label);
                    assert_eq!(item.preview.map(|k| k.index).unwrap_or(index), index);
                }
            }
        }
    }

    #[test]
    fn every_level_has_a_way_out() {
        for level in LevelId::ALL {
            assert!(
                node(level).items.iter().any(|i| matches!(i.action, Action::Exit)),
                "{:?}",
                level
            );
        }
    }
}
