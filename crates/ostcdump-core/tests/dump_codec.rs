use ostcdump_core::protocols::mk2;
use ostcdump_core::{
    BoundedInt, CodecError, DumpCodec, FeatureKey, NormalizationReason, ProtocolError, Settings,
    Value, make_settings_document,
};

const DOWNLOAD_SIZE: usize = 65_802;

fn codec() -> DumpCodec {
    DumpCodec::mk2().expect("mk2 registry")
}

fn blank_dump(major: u8, minor: u8) -> Vec<u8> {
    let mut dump = vec![0u8; DOWNLOAD_SIZE];
    dump[264] = major;
    dump[265] = minor;
    dump
}

#[test]
fn cf02_scenario_on_1_91() {
    let codec = codec();
    let mut dump = blank_dump(1, 91);
    dump[136..140].copy_from_slice(&[0x05, 0x00, 0x03, 0x00]);

    let decoded = codec.decode(&dump).expect("decode");
    assert_eq!(decoded.revision.name(), mk2::REVISION_1_91);
    let cf02 = decoded
        .settings
        .get("CF02")
        .and_then(Value::as_bounded_int)
        .expect("CF02");
    assert_eq!(cf02.default_value(), 5);
    assert_eq!(cf02.current(), 3);
    assert_eq!(cf02.bits(), 15);

    let encoded = codec
        .encode(&decoded.settings, &decoded.revision, Some(&dump))
        .expect("encode");
    assert_eq!(&encoded[136..140], &[0x05, 0x80, 0x03, 0x00]);
}

#[test]
fn cf02_is_eight_bit_before_1_91() {
    let codec = codec();
    let mut dump = blank_dump(1, 90);
    dump[136..140].copy_from_slice(&[0x05, 0x00, 0x03, 0x00]);

    let decoded = codec.decode(&dump).expect("decode");
    assert_eq!(decoded.revision.name(), mk2::REVISION_1_80);
    let encoded = codec
        .encode(&decoded.settings, &decoded.revision, Some(&dump))
        .expect("encode");
    assert_eq!(&encoded[136..140], &[0x05, 0x00, 0x03, 0x00]);
    // CF00 is 15-bit in every revision and gains its flag.
    assert_eq!(&encoded[128..132], &[0x00, 0x80, 0x00, 0x00]);
}

#[test]
fn newest_revision_wins_for_1_91() {
    let codec = codec();
    let selected = codec.registry().select_for(&blank_dump(1, 91)).expect("select");
    assert_eq!(selected.name(), mk2::REVISION_1_91);
    let selected = codec.registry().select_for(&blank_dump(3, 2)).expect("select");
    assert_eq!(selected.name(), mk2::REVISION_1_91);
}

#[test]
fn unsupported_firmware_is_reported() {
    let err = codec().decode(&blank_dump(0, 42)).unwrap_err();
    assert!(matches!(
        err,
        CodecError::Protocol(ProtocolError::NoMatchingProtocol { version: 42 })
    ));
}

#[test]
fn truncated_dump_is_reported() {
    let dump = blank_dump(1, 91);
    let err = codec().decode(&dump[..DOWNLOAD_SIZE - 1]).unwrap_err();
    assert!(matches!(
        err,
        CodecError::Protocol(ProtocolError::TruncatedDump {
            needed: DOWNLOAD_SIZE,
            ..
        })
    ));
}

#[test]
fn corrupted_values_decode_to_fallbacks() {
    let codec = codec();
    let mut dump = blank_dump(1, 91);
    // CF03 current 300 does not fit 8 bits; DEEP_STOP code 7 is unknown.
    dump[140..144].copy_from_slice(&[120, 0x00, 0x2C, 0x01]);
    dump[258] = 7;

    let decoded = codec.decode(&dump).expect("decode");
    let cf03 = decoded.settings["CF03"].as_bounded_int().expect("CF03");
    assert_eq!((cf03.default_value(), cf03.current()), (120, 120));
    let deep_stop = decoded.settings["DEEP_STOP"].as_selection().expect("DEEP_STOP");
    assert_eq!(deep_stop.selected_value(), 0);

    let keys: Vec<_> = decoded.normalized.iter().map(|n| n.key.as_str()).collect();
    assert_eq!(keys, ["CF03", "DEEP_STOP"]);
    assert_eq!(
        decoded.normalized[0].reason,
        NormalizationReason::OutOfRange {
            bits: 8,
            default: 120,
            current: 300
        }
    );
}

#[test]
fn absent_keys_leave_bytes_untouched() {
    let codec = codec();
    let mut dump = blank_dump(1, 91);
    dump[136..140].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
    let revision = codec.registry().by_name(mk2::REVISION_1_91).expect("rev");

    let mut settings = Settings::new();
    settings.insert(
        FeatureKey::bounded_int("CF00"),
        Value::BoundedInt(BoundedInt::new(150, 120, 15).expect("cf")),
    );
    let encoded = codec
        .encode(&settings, &revision, Some(&dump))
        .expect("encode");
    assert_eq!(&encoded[128..132], &[150, 0x80, 120, 0x00]);
    assert_eq!(&encoded[136..140], &[0xDE, 0xAD, 0xBE, 0xEF]);
}

#[test]
fn encode_does_not_mutate_settings() {
    let codec = codec();
    let dump = blank_dump(1, 60);
    let decoded = codec.decode(&dump).expect("decode");
    let before = decoded.settings.clone();
    codec
        .encode(&decoded.settings, &decoded.revision, Some(&dump))
        .expect("encode");
    assert_eq!(decoded.settings, before);
}

#[test]
fn child_revisions_keep_every_parent_feature() {
    let codec = codec();
    let dump = blank_dump(1, 91);
    for revision in codec.registry().revisions() {
        let Some(parent) = revision.parent() else {
            continue;
        };
        let child_view = revision.decode(&dump).expect("child decode");
        let parent_view = parent.decode(&dump).expect("parent decode");
        for (key, value) in &parent_view {
            let overridden = revision
                .own_fields()
                .iter()
                .any(|field| field.name() == key.name());
            let child_value = child_view.get(key.name()).expect("inherited key");
            if !overridden {
                assert_eq!(child_value, value, "{} in {}", key, revision.name());
            }
        }
    }
}

#[test]
fn edited_document_encodes_back() {
    let codec = codec();
    let dump = blank_dump(1, 91);
    let decoded = codec.decode(&dump).expect("decode");

    let mut document = make_settings_document(&decoded);
    let deep = document.settings["DEEP_STOP"]
        .as_selection()
        .expect("DEEP_STOP")
        .with_selected(1)
        .expect("deep stop");
    document
        .settings
        .insert("DEEP_STOP".to_string(), Value::Selection(deep));
    let settings = document.to_settings(&decoded.revision).expect("settings");

    let encoded = codec
        .encode(&settings, &decoded.revision, Some(&dump))
        .expect("encode");
    assert_eq!(encoded[258], 1);
    let redecoded = codec.decode(&encoded).expect("redecode");
    assert_eq!(
        redecoded.settings["DEEP_STOP"]
            .as_selection()
            .and_then(|s| s.selected_label()),
        Some("deep stop")
    );
}
