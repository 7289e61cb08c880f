use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use ostcdump_core::{
    CodecError, DumpCodec, DumpFileSource, DumpSource, Settings, SourceError, decode_dump_file,
};

fn temp_path(name: &str) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("ostcdump_{name}_{unique}.bin"))
}

#[test]
fn file_source_reads_whole_dump() {
    let codec = DumpCodec::mk2().unwrap();
    let revision = codec.registry().by_name("mk2-1.80").unwrap();
    let dump = codec.encode(&Settings::new(), &revision, None).unwrap();
    let path = temp_path("roundtrip");
    fs::write(&path, &dump).unwrap();

    let mut source = DumpFileSource::open(&path).unwrap();
    let read = source.read_dump().unwrap();
    let decoded = decode_dump_file(&codec, &path, None);
    let _ = fs::remove_file(&path);

    assert_eq!(read, dump);
    assert_eq!(decoded.unwrap().revision.name(), "mk2-1.80");
}

#[test]
fn empty_file_is_rejected() {
    let path = temp_path("empty");
    fs::write(&path, b"").unwrap();
    let result = DumpFileSource::open(&path).and_then(|mut source| source.read_dump());
    let _ = fs::remove_file(&path);

    assert!(matches!(result, Err(SourceError::Empty { .. })));
}

#[test]
fn missing_file_is_an_io_error() {
    let codec = DumpCodec::mk2().unwrap();
    let err = decode_dump_file(&codec, &temp_path("missing"), None).unwrap_err();
    assert!(matches!(err, CodecError::Source(SourceError::Io(_))));
}
