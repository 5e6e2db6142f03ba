// Tests for digest module
// Known-answer vectors and file streaming

use std::fs;

use digest_tool::hash::digest::to_hex;
use digest_tool::hash::{Algorithm, BatchBuilder, DigestEngine, DigestToolError};

fn hex_of(algorithm: Algorithm, data: &[u8]) -> String {
    to_hex(&DigestEngine::new(algorithm).digest(data))
}

#[test]
fn test_known_vectors() {
    assert_eq!(hex_of(Algorithm::Md5, b"abc"), "900150983CD24FB0D6963F7D28E17F72");
    assert_eq!(hex_of(Algorithm::Md5, b""), "D41D8CD98F00B204E9800998ECF8427E");
    assert_eq!(hex_of(Algorithm::Sha1, b"abc"), "A9993E364706816ABA3E25717850C26C9CD0D89D");
    assert_eq!(hex_of(Algorithm::Sha1, b""), "DA39A3EE5E6B4B0D3255BFEF95601890AFD80709");
    assert_eq!(
        hex_of(Algorithm::Sha256, b"hello world"),
        "B94D27B9934D3E08A52E52D7DA7DABFAC484EFE37A5380EE9088F7ACE2EFCDE9"
    );
    assert_eq!(
        hex_of(Algorithm::Sha3_256, b"abc"),
        "3A985DA74FE225B2045C172D6BD390BD855F086E3E9D525B46BFE24511431532"
    );
    assert_eq!(
        hex_of(Algorithm::Blake3, b""),
        "AF1349B9F5F9A1A6A0404DEA36DCC9499BCB25C9ADC112B7CC9A93CAE41F3262"
    );
}

#[test]
fn test_digest_lengths() {
    for algorithm in Algorithm::ALL {
        let engine = DigestEngine::new(algorithm);
        let info_bits = Algorithm::list()
            .into_iter()
            .find(|i| i.name == algorithm.label())
            .unwrap()
            .output_bits;
        assert_eq!(engine.digest(b"x").len() * 8, info_bits, "{}", algorithm);
    }
}

#[test]
fn test_streaming_matches_in_memory_digest() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("large.bin");
    let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    fs::write(&path, &data).unwrap();

    // buffer smaller than the file forces several reads
    let engine = DigestEngine::with_buffer_size(Algorithm::Sha256, 4096);
    assert_eq!(engine.digest_file(&path).unwrap(), engine.digest(&data));
}

#[test]
fn test_unsupported_algorithm() {
    let err = "CRC32".parse::<Algorithm>().unwrap_err();
    assert!(matches!(err, DigestToolError::UnsupportedAlgorithm { ref algorithm } if algorithm == "CRC32"));
}

#[test]
fn test_missing_file_is_reported_with_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.txt");
    let err = DigestEngine::new(Algorithm::Md5).digest_file(&path).unwrap_err();
    match err {
        DigestToolError::FileNotFound { path: p } => assert_eq!(p, path),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_batch_keeps_input_order_in_parallel() {
    let dir = tempfile::tempdir().unwrap();
    let paths: Vec<_> = (0..16)
        .map(|i| {
            let path = dir.path().join(format!("f{:02}.txt", i));
            fs::write(&path, format!("content {}", i)).unwrap();
            path
        })
        .collect();

    let engine = DigestEngine::new(Algorithm::Sha1);
    let parallel = BatchBuilder::new(engine.clone()).build(&paths).unwrap();
    let sequential = BatchBuilder::new(engine).with_parallel(false).build(&paths).unwrap();

    assert_eq!(parallel, sequential);
    let names: Vec<String> = parallel.iter().map(|f| f.name.clone()).collect();
    let expected: Vec<String> = (0..16).map(|i| format!("f{:02}.txt", i)).collect();
    assert_eq!(names, expected);
    assert!(parallel.iter().enumerate().all(|(i, f)| f.index == i));
}

#[test]
fn test_batch_rejects_names_with_whitespace_before_reading() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("with space.txt");
    fs::write(&path, b"x").unwrap();

    let err = BatchBuilder::new(DigestEngine::new(Algorithm::Md5))
        .build(&[path])
        .unwrap_err();
    assert!(matches!(err, DigestToolError::InvalidArguments { .. }));
}
