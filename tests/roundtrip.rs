//! End-to-end tests over the full bytes -> video -> bytes pipeline.
//!
//! These exercise the real muxer and codec; the carrier produced in memory
//! is a playable MP4. Payload sizes are chosen around the chunk boundary so
//! frame counts are predictable.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use qrvid::config::{chunk_count, CHUNK_SIZE};
use qrvid::video::{decode_frames, VideoSource};
use qrvid::{decode_bytes, decode_file, encode_bytes, encode_file, roundtrip, NoopHook};

/// A stable text fixture; any in-repo source file works, the tests only need
/// its first 512 bytes to never change between runs of the same build.
const TEXT_FIXTURE: &[u8] = include_bytes!("../src/video/encoder.rs");

fn video_frame_count(carrier: Vec<u8>) -> u64 {
    let mut source = VideoSource::bytes(carrier).unwrap();
    decode_frames(&mut source, |_, _, _| Ok(())).unwrap()
}

#[test]
fn test_text_fixture_roundtrip() {
    let payload = &TEXT_FIXTURE[..512];
    let carrier = encode_bytes(payload).unwrap();
    assert!(carrier.len() > 1);
    let recovered = decode_bytes(carrier).unwrap();
    assert_eq!(recovered, payload);
}

#[test]
fn test_ten_thousand_ones_is_one_hundred_frames() {
    let payload = vec![b'1'; 10_000];
    assert_eq!(chunk_count(payload.len()), 100);
    let carrier = encode_bytes(&payload).unwrap();
    assert_eq!(video_frame_count(carrier.clone()), 100);
    assert_eq!(decode_bytes(carrier).unwrap(), payload);
}

#[test]
fn test_one_past_the_boundary_adds_a_frame() {
    let payload = vec![b'1'; 10_001];
    assert_eq!(chunk_count(payload.len()), 101);
    let carrier = encode_bytes(&payload).unwrap();
    assert_eq!(video_frame_count(carrier.clone()), 101);
    assert_eq!(decode_bytes(carrier).unwrap(), payload);
}

#[test]
fn test_empty_payload_roundtrip() {
    let carrier = encode_bytes(&[]).unwrap();
    assert!(carrier.len() > 1, "empty payload still yields a valid container");
    assert_eq!(video_frame_count(carrier.clone()), 0);
    assert_eq!(decode_bytes(carrier).unwrap(), Vec::<u8>::new());
}

#[test]
fn test_one_byte_payload_is_one_frame() {
    let payload = [0x31u8];
    let carrier = encode_bytes(&payload).unwrap();
    assert_eq!(video_frame_count(carrier.clone()), 1);
    assert_eq!(decode_bytes(carrier).unwrap(), payload);
}

#[test]
fn test_exact_chunk_boundary_has_no_trailing_frame() {
    let payload = vec![0xA5u8; 3 * CHUNK_SIZE];
    let carrier = encode_bytes(&payload).unwrap();
    assert_eq!(video_frame_count(carrier.clone()), 3);
    assert_eq!(decode_bytes(carrier).unwrap(), payload);
}

#[test]
fn test_file_and_memory_carriers_are_identical() {
    let payload = &TEXT_FIXTURE[..512];
    let dir = std::env::temp_dir().join("qrvid_test_fidelity");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("out.mp4");

    encode_file(&path, payload).unwrap();
    let from_file = std::fs::read(&path).unwrap();
    let from_memory = encode_bytes(payload).unwrap();
    assert_eq!(from_file, from_memory);

    assert_eq!(decode_file(&path).unwrap(), payload);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_seeded_random_chunk_roundtrip() {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let payload: Vec<u8> = (0..CHUNK_SIZE).map(|_| rng.gen()).collect();
    let carrier = encode_bytes(&payload).unwrap();
    assert_eq!(video_frame_count(carrier.clone()), 1);
    assert_eq!(decode_bytes(carrier).unwrap(), payload);
}

#[test]
fn test_roundtrip_helper_reports_matching_hashes() {
    let payload = vec![0x42u8; 2 * CHUNK_SIZE + 7];
    let result = roundtrip(&payload, &NoopHook).unwrap();
    assert!(
        result.matched,
        "round trip failed: {} != {}",
        result.original_hash, result.decoded_hash
    );
}

#[test]
fn test_decoding_garbage_is_a_container_error() {
    let garbage = vec![0xFFu8; 4096];
    assert!(decode_bytes(garbage).is_err());
}

#[test]
#[ignore = "encodes ~10500 frames; run with --ignored"]
fn test_one_mebibyte_roundtrip() {
    let mut rng = StdRng::seed_from_u64(1);
    let payload: Vec<u8> = (0..1024 * 1024).map(|_| rng.gen()).collect();
    let carrier = encode_bytes(&payload).unwrap();
    assert_eq!(video_frame_count(carrier.clone()), chunk_count(payload.len()) as u64);
    assert_eq!(decode_bytes(carrier).unwrap(), payload);
}
