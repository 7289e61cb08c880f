//! Mk.2 dump geometry and per-revision offset tables.
//!
//! Every offset is literal. Custom functions occupy four bytes each; bank 0
//! (CF00–CF31) starts at 128, bank 1 is split between 1.60 (CF32–CF47 at
//! 384) and 1.80 (CF48–CF63 at 448).

use crate::protocols::field::FieldEntry;

pub const DOWNLOAD_SIZE: usize = 65_802;

pub const CF_BANK0_OFFSET: usize = 128;
pub const DECO_MODE_OFFSET: usize = 256;
pub const DEEP_STOP_OFFSET: usize = 258;
pub const CF_BANK1A_OFFSET: usize = 384;
pub const CF_BANK1B_OFFSET: usize = 448;

pub const DECO_MODES: &[i32] = &[0, 1, 2, 3];
pub const DECO_MODE_LABELS: &[&str] = &["open circuit", "closed circuit", "gauge", "apnoe"];
pub const DECO_MODES_1_80: &[i32] = &[0, 1, 2, 3, 4];
pub const DECO_MODE_LABELS_1_80: &[&str] = &[
    "open circuit",
    "closed circuit",
    "gauge",
    "apnoe",
    "gradient factors",
];

pub const DEEP_STOP_MODES: &[i32] = &[0, 1];
pub const DEEP_STOP_LABELS: &[&str] = &["shallow stop", "deep stop"];

pub const FIELDS_1_00: &[FieldEntry] = &[
    FieldEntry::fifteen_bit(128, "CF00", 100), // dive start depth, cm
    FieldEntry::fifteen_bit(132, "CF01", 30),  // dive end depth, cm
    FieldEntry::eight_bit(136, "CF02", 240),   // end dive delay, s
    FieldEntry::eight_bit(140, "CF03", 120),
    FieldEntry::eight_bit(144, "CF04", 5),
    FieldEntry::eight_bit(148, "CF05", 5),
    FieldEntry::fifteen_bit(152, "CF06", 1100),
    FieldEntry::fifteen_bit(156, "CF07", 1100),
    FieldEntry::eight_bit(160, "CF08", 20),
    FieldEntry::eight_bit(164, "CF09", 60),
    FieldEntry::eight_bit(168, "CF10", 10),
    FieldEntry::eight_bit(172, "CF11", 18),
    FieldEntry::eight_bit(176, "CF12", 2),
    FieldEntry::eight_bit(180, "CF13", 12),
    FieldEntry::eight_bit(184, "CF14", 3),
    FieldEntry::eight_bit(188, "CF15", 30),
    FieldEntry::eight_bit(192, "CF16", 5),
    FieldEntry::eight_bit(196, "CF17", 1),
    FieldEntry::eight_bit(200, "CF18", 1),
    FieldEntry::eight_bit(204, "CF19", 0),
    FieldEntry::eight_bit(208, "CF20", 100),
    FieldEntry::eight_bit(212, "CF21", 20),
    FieldEntry::fifteen_bit(216, "CF22", 1000),
    FieldEntry::eight_bit(220, "CF23", 0),
    FieldEntry::eight_bit(224, "CF24", 14),
    FieldEntry::eight_bit(228, "CF25", 0),
    FieldEntry::eight_bit(232, "CF26", 90),
    FieldEntry::eight_bit(236, "CF27", 25),
    FieldEntry::eight_bit(240, "CF28", 0),
    FieldEntry::eight_bit(244, "CF29", 3),
    FieldEntry::eight_bit(248, "CF30", 0),
    FieldEntry::eight_bit(252, "CF31", 0),
    FieldEntry::selection(DECO_MODE_OFFSET, "DECO_MODE", DECO_MODES, DECO_MODE_LABELS, 0),
];

pub const FIELDS_1_60: &[FieldEntry] = &[
    FieldEntry::eight_bit(384, "CF32", 30),
    FieldEntry::eight_bit(388, "CF33", 90),
    FieldEntry::eight_bit(392, "CF34", 40),
    FieldEntry::eight_bit(396, "CF35", 60),
    FieldEntry::eight_bit(400, "CF36", 100),
    FieldEntry::eight_bit(404, "CF37", 30),
    FieldEntry::eight_bit(408, "CF38", 0),
    FieldEntry::eight_bit(412, "CF39", 0),
    FieldEntry::eight_bit(416, "CF40", 0),
    FieldEntry::eight_bit(420, "CF41", 10),
    FieldEntry::fifteen_bit(424, "CF42", 300),
    FieldEntry::eight_bit(428, "CF43", 1),
    FieldEntry::eight_bit(432, "CF44", 0),
    FieldEntry::eight_bit(436, "CF45", 0),
    FieldEntry::eight_bit(440, "CF46", 1),
    FieldEntry::eight_bit(444, "CF47", 0),
];

pub const FIELDS_1_80: &[FieldEntry] = &[
    FieldEntry::eight_bit(448, "CF48", 0),
    FieldEntry::eight_bit(452, "CF49", 0),
    FieldEntry::eight_bit(456, "CF50", 0),
    FieldEntry::eight_bit(460, "CF51", 60),
    FieldEntry::eight_bit(464, "CF52", 1),
    FieldEntry::fifteen_bit(468, "CF53", 1000),
    FieldEntry::eight_bit(472, "CF54", 0),
    FieldEntry::eight_bit(476, "CF55", 0),
    FieldEntry::eight_bit(480, "CF56", 0),
    FieldEntry::eight_bit(484, "CF57", 0),
    FieldEntry::eight_bit(488, "CF58", 0),
    FieldEntry::eight_bit(492, "CF59", 2),
    FieldEntry::eight_bit(496, "CF60", 0),
    FieldEntry::eight_bit(500, "CF61", 0),
    FieldEntry::eight_bit(504, "CF62", 0),
    FieldEntry::eight_bit(508, "CF63", 0),
    FieldEntry::selection(
        DECO_MODE_OFFSET,
        "DECO_MODE",
        DECO_MODES_1_80,
        DECO_MODE_LABELS_1_80,
        0,
    ),
];

pub const FIELDS_1_91: &[FieldEntry] = &[
    FieldEntry::fifteen_bit(136, "CF02", 240),
    FieldEntry::selection(
        DEEP_STOP_OFFSET,
        "DEEP_STOP",
        DEEP_STOP_MODES,
        DEEP_STOP_LABELS,
        0,
    ),
];
