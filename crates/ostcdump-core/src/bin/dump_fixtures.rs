use std::fs;
use std::path::{Path, PathBuf};

use ostcdump_core::protocols::mk2::{self, layout};
use ostcdump_core::{DumpCodec, FieldCodec, ProtocolRevision, Settings};

const CF02_OFFSET: usize = 136;
const CF03_OFFSET: usize = 140;

fn main() -> Result<(), String> {
    let root = PathBuf::from("fixtures");
    let codec = DumpCodec::mk2().map_err(|err| format!("registry: {err}"))?;

    for revision in codec.registry().revisions() {
        let dump = build_dump(&codec, revision, FixtureSpec::clean())?;
        write_dump(&root.join(format!("{}.bin", revision.name())), &dump)?;
    }

    let newest = codec
        .registry()
        .by_name(mk2::REVISION_1_91)
        .map_err(|err| err.to_string())?;
    let dump = build_dump(&codec, &newest, FixtureSpec::corrupted())?;
    write_dump(&root.join("mk2-1.91-corrupted.bin"), &dump)?;
    Ok(())
}

struct FixtureSpec {
    /// Raw CF02 slot bytes; the 15-bit flag is added where CF02 is 15-bit.
    cf02: [u8; 4],
    /// Raw CF03 slot bytes.
    cf03: [u8; 4],
    deep_stop: u8,
}

impl FixtureSpec {
    fn clean() -> Self {
        Self {
            cf02: [0x05, 0x00, 0x03, 0x00],
            cf03: [120, 0x00, 90, 0x00],
            deep_stop: 1,
        }
    }

    /// CF03 current exceeds 8 bits and DEEP_STOP holds an unknown code.
    fn corrupted() -> Self {
        Self {
            cf03: [120, 0x00, 0x2C, 0x01],
            deep_stop: 7,
            ..Self::clean()
        }
    }
}

fn build_dump(
    codec: &DumpCodec,
    revision: &ProtocolRevision,
    spec: FixtureSpec,
) -> Result<Vec<u8>, String> {
    let mut dump = codec
        .encode(&Settings::new(), revision, None)
        .map_err(|err| format!("{}: {err}", revision.name()))?;
    let mut cf02 = spec.cf02;
    let fifteen_bit = revision.effective_fields().iter().any(|field| {
        field.name() == "CF02" && matches!(field.codec, FieldCodec::FifteenBit { .. })
    });
    if fifteen_bit {
        cf02[1] |= 0x80;
    }
    dump[CF02_OFFSET..CF02_OFFSET + 4].copy_from_slice(&cf02);
    dump[CF03_OFFSET..CF03_OFFSET + 4].copy_from_slice(&spec.cf03);
    if revision.feature("DEEP_STOP").is_some() {
        dump[layout::DEEP_STOP_OFFSET] = spec.deep_stop;
    }
    Ok(dump)
}

fn write_dump(path: &Path, dump: &[u8]) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| format!("failed to create {}: {}", parent.display(), err))?;
    }
    fs::write(path, dump).map_err(|err| format!("failed to write {}: {}", path.display(), err))
}
