use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::ZlibEncoder;
use flate2::Compression;
use limbo_common::{crc, HashList};
use limbo_pkg::resolve::{unknown_name, UNKNOWN_DIR};
use limbo_pkg::{
    EntryOutcome, Error, ExtractOptions, Extractor, PackageBuilder, PackageFile, ProjectContext,
    WriteMode,
};
use tempfile::TempDir;

const UNKNOWN_HASH: u32 = 0x0BADF00D;

fn compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn known_data(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 7) as u8 + b'a').collect()
}

fn context(names: &[&str]) -> ProjectContext {
    ProjectContext::from_names(names.iter().copied().collect::<HashList>())
}

fn rel(path: &str) -> PathBuf {
    path.split('/').collect()
}

fn extract(data: &[u8], context: &ProjectContext, options: &ExtractOptions) -> (TempDir, limbo_pkg::ExtractReport) {
    let dir = tempfile::tempdir().unwrap();
    let extractor = Extractor::new(data, context).unwrap();
    let report = extractor.extract(dir.path(), options).unwrap();
    (dir, report)
}

fn files_under(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                out.push(path.strip_prefix(root).unwrap().to_path_buf());
            }
        }
    }
    out.sort();
    out
}

#[test]
fn unknown_entry_is_bucketed() {
    let payload = b"raw unknown payload".to_vec();
    let mut builder = PackageBuilder::new();
    builder.add(UNKNOWN_HASH, payload.clone());
    let data = builder.to_bytes().unwrap();

    let (dir, report) = extract(&data, &context(&[]), &ExtractOptions::default());

    let path = dir.path().join(UNKNOWN_DIR).join("0BADF00D");
    assert_eq!(fs::read(path).unwrap(), payload);
    assert_eq!(report.written, 1);
}

#[test]
fn unknown_entry_is_skipped() {
    let mut builder = PackageBuilder::new();
    builder.add(UNKNOWN_HASH, b"raw".to_vec());
    let data = builder.to_bytes().unwrap();

    let options = ExtractOptions::default().extract_unknowns(false);
    let (dir, report) = extract(&data, &context(&[]), &options);

    assert!(files_under(dir.path()).is_empty());
    assert_eq!(report.skipped_unknown, 1);
}

#[test]
fn container_is_decompressed() {
    let plain = known_data(1000);
    let mut builder = PackageBuilder::new();
    builder.add_compressed("a/b/c.ext", &plain).unwrap();
    let data = builder.to_bytes().unwrap();

    let (dir, report) = extract(&data, &context(&["a/b/c.ext.d"]), &ExtractOptions::default());

    assert_eq!(fs::read(dir.path().join(rel("a/b/c.ext"))).unwrap(), plain);
    assert!(!dir.path().join(rel("a/b/c.ext.d")).exists());
    assert_eq!(report.decompressed, 1);
}

#[test]
fn corrupt_container_falls_back_to_raw() {
    let corrupt = b"\x00\x01 this is not zlib data at all".to_vec();
    let mut builder = PackageBuilder::new();
    builder
        .add_named("a/b/c.ext.d", corrupt.clone())
        .add_named("after/ok.txt", b"still here".to_vec());
    let data = builder.to_bytes().unwrap();

    let (dir, report) = extract(
        &data,
        &context(&["a/b/c.ext.d", "after/ok.txt"]),
        &ExtractOptions::default(),
    );

    assert_eq!(fs::read(dir.path().join(rel("a/b/c.ext.d"))).unwrap(), corrupt);
    assert!(!dir.path().join(rel("a/b/c.ext")).exists());
    assert_eq!(
        fs::read(dir.path().join(rel("after/ok.txt"))).unwrap(),
        b"still here"
    );
    assert_eq!(report.fallbacks, 1);
    assert_eq!(report.written, 2);
}

#[test]
fn existing_file_is_untouched() {
    let mut builder = PackageBuilder::new();
    builder
        .add_named("keep.txt", b"new contents".to_vec())
        .add_compressed("packed.bin", b"new packed contents")
        .unwrap();
    let data = builder.to_bytes().unwrap();
    let context = context(&["keep.txt", "packed.bin.d"]);

    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("keep.txt"), b"original").unwrap();
    fs::write(dir.path().join("packed.bin"), b"original packed").unwrap();

    let extractor = Extractor::new(data.as_slice(), &context).unwrap();
    let report = extractor
        .extract(dir.path(), &ExtractOptions::default())
        .unwrap();

    assert_eq!(fs::read(dir.path().join("keep.txt")).unwrap(), b"original");
    assert_eq!(
        fs::read(dir.path().join("packed.bin")).unwrap(),
        b"original packed"
    );
    assert_eq!(report.skipped_existing, 2);
    assert_eq!(report.written, 0);
}

#[test]
fn existing_file_skipped_without_reading_payload() {
    // The entry's window lies past the end of the package; skipping on the
    // existence check must happen before the payload is touched.
    let package = PackageFile::new(vec![limbo_pkg::Entry::new(
        crc::hash_path("big.bin.d"),
        0,
        1_000_000,
    )]);
    let data = package.to_bytes().unwrap();
    let context = context(&["big.bin.d"]);

    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("big.bin"), b"original").unwrap();

    let extractor = Extractor::new(data.as_slice(), &context).unwrap();
    let (_, outcome) = extractor
        .extract_entry(&package.entries()[0], dir.path(), &ExtractOptions::default())
        .unwrap();

    assert_eq!(outcome, EntryOutcome::SkippedExists(dir.path().join("big.bin")));
}

#[test]
fn overwrite_replaces_existing() {
    let mut builder = PackageBuilder::new();
    builder.add_named("keep.txt", b"new contents".to_vec());
    let data = builder.to_bytes().unwrap();
    let context = context(&["keep.txt"]);

    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("keep.txt"), b"original").unwrap();

    let extractor = Extractor::new(data.as_slice(), &context).unwrap();
    let options = ExtractOptions::default().overwrite_existing(true);
    let report = extractor.extract(dir.path(), &options).unwrap();

    assert_eq!(fs::read(dir.path().join("keep.txt")).unwrap(), b"new contents");
    assert_eq!(report.written, 1);
}

#[test]
fn leading_separator_is_stripped() {
    let mut builder = PackageBuilder::new();
    builder.add_named("/rooted/file.txt", b"x".to_vec());
    let data = builder.to_bytes().unwrap();

    let (dir, _) = extract(&data, &context(&["/rooted/file.txt"]), &ExtractOptions::default());

    assert_eq!(files_under(dir.path()), vec![rel("rooted/file.txt")]);
}

#[test]
fn truncated_index_is_fatal() {
    let mut data = 5u32.to_le_bytes().to_vec();
    data.extend_from_slice(&[0u8; 12 * 4]);
    let context = context(&[]);

    match Extractor::new(data.as_slice(), &context) {
        Err(Error::Format { count, .. }) => assert_eq!(count, 5),
        Err(e) => panic!("expected format error, got {}", e),
        Ok(_) => panic!("expected format error"),
    }
}

#[test]
fn end_to_end_two_entries() {
    let raw_a = known_data(50);
    let plain_b = known_data(200);
    let compressed_b = compress(&plain_b);

    let mut builder = PackageBuilder::new();
    builder
        .add(UNKNOWN_HASH, raw_a.clone())
        .add_named("textures/foo.png.d", compressed_b);
    let data = builder.to_bytes().unwrap();

    let (dir, report) = extract(
        &data,
        &context(&["textures/foo.png.d"]),
        &ExtractOptions::default(),
    );

    let unknown = PathBuf::from(unknown_name(UNKNOWN_HASH));
    assert_eq!(
        files_under(dir.path()),
        vec![unknown.clone(), rel("textures/foo.png")]
    );
    assert_eq!(fs::read(dir.path().join(&unknown)).unwrap(), raw_a);
    assert_eq!(
        fs::read(dir.path().join(rel("textures/foo.png"))).unwrap(),
        plain_b
    );
    assert_eq!(
        report,
        limbo_pkg::ExtractReport {
            written: 2,
            decompressed: 1,
            ..Default::default()
        }
    );
}

#[test]
fn outcome_modes() {
    let mut builder = PackageBuilder::new();
    builder
        .add_named("plain.txt", b"plain".to_vec())
        .add_compressed("packed.txt", b"packed")
        .unwrap();
    let data = builder.to_bytes().unwrap();
    let context = context(&["plain.txt", "packed.txt.d"]);

    let dir = tempfile::tempdir().unwrap();
    let extractor = Extractor::new(data.as_slice(), &context).unwrap();
    let entries = extractor.package().entries().to_vec();
    let options = ExtractOptions::default();

    let (name, outcome) = extractor.extract_entry(&entries[0], dir.path(), &options).unwrap();
    assert_eq!(name.as_deref(), Some("plain.txt"));
    assert!(matches!(outcome, EntryOutcome::Written { mode: WriteMode::Raw, .. }));

    let (name, outcome) = extractor.extract_entry(&entries[1], dir.path(), &options).unwrap();
    assert_eq!(name.as_deref(), Some("packed.txt"));
    assert!(matches!(
        outcome,
        EntryOutcome::Written { mode: WriteMode::Decompressed, .. }
    ));
}

#[test]
fn truncated_container_falls_back_to_raw() {
    let mut state = 0x1234_5678u32;
    let plain: Vec<u8> = (0..8192)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        })
        .collect();
    let compressed = compress(&plain);
    let truncated = compressed[..compressed.len() / 2].to_vec();

    let mut builder = PackageBuilder::new();
    builder.add_named("a/b/c.ext.d", truncated.clone());
    let data = builder.to_bytes().unwrap();

    let (dir, report) = extract(&data, &context(&["a/b/c.ext.d"]), &ExtractOptions::default());

    assert_eq!(fs::read(dir.path().join(rel("a/b/c.ext.d"))).unwrap(), truncated);
    assert!(!dir.path().join(rel("a/b/c.ext")).exists());
    assert_eq!(report.fallbacks, 1);
}

#[test]
fn names_never_escape_output_root() {
    let outer = tempfile::tempdir().unwrap();
    let root = outer.path().join("out");

    let escaping = ["//rooted/escape.txt", "../sibling.txt", "a/../../up.txt"];
    let mut builder = PackageBuilder::new();
    for name in escaping {
        builder.add_named(name, b"escaped".to_vec());
    }
    builder.add_named("inside/ok.txt", b"ok".to_vec());
    let data = builder.to_bytes().unwrap();

    let mut names = escaping.to_vec();
    names.push("inside/ok.txt");
    let context = context(&names);

    let extractor = Extractor::new(data.as_slice(), &context).unwrap();
    let report = extractor
        .extract(&root, &ExtractOptions::default())
        .unwrap();

    assert_eq!(report.rejected, 3);
    assert_eq!(report.written, 1);
    assert_eq!(files_under(outer.path()), vec![rel("out/inside/ok.txt")]);
    assert!(!Path::new("/rooted/escape.txt").exists());

    for entry in extractor.package() {
        let (_, outcome) = extractor
            .extract_entry(entry, &root, &ExtractOptions::default().overwrite_existing(true))
            .unwrap();
        if let EntryOutcome::Written { path, .. } = outcome {
            assert!(path.starts_with(&root));
        }
    }
}
