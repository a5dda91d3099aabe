//! Feeds a gzip-compressed input through the sort use case with a
//! gzip-suffixed output path, confirming compression detection
//! (by filename extension) and the compressed-stream plumbing compose with
//! `ExternalSort` end to end, not just in each module's own unit tests.

use sluice::infrastructure::storage::compression::encoding_writer;
use sluice_domain::value_objects::CompressionKind;
use std::io::Write;

#[test]
fn sorts_a_gzip_input_into_a_gzip_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.txt.gz");
    let output = dir.path().join("out.txt.gz");

    let file = std::fs::File::create(&input).unwrap();
    let mut writer = encoding_writer(Box::new(file), CompressionKind::Gzip, CompressionKind::Gzip.default_level()).unwrap();
    writer.write_all(b"banana\napple\ncherry\n").unwrap();
    writer.finish().unwrap();

    sluice::application::use_cases::sort_file::SortFileUseCase::new()
        .execute(sluice::application::use_cases::sort_file::SortFileConfig {
            inputs: vec![input],
            output: output.clone(),
            memory_limit_mb: 4,
            unique: false,
            reverse: false,
        })
        .unwrap();

    let compressed = std::fs::read(&output).unwrap();
    let mut decoder = flate2::read::GzDecoder::new(compressed.as_slice());
    let mut decompressed = String::new();
    std::io::Read::read_to_string(&mut decoder, &mut decompressed).unwrap();
    assert_eq!(decompressed.lines().collect::<Vec<_>>(), vec!["apple", "banana", "cherry"]);
}
