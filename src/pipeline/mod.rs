pub mod decode;
pub mod encode;
pub mod hook;

use sha2::{Digest, Sha256};

use crate::error::Result;
use hook::CarrierHook;

/// Result of a full encode -> hook -> decode roundtrip.
pub struct RoundtripResult {
    /// SHA-256 hex digest of the original payload.
    pub original_hash: String,
    /// SHA-256 hex digest of the recovered payload.
    pub decoded_hash: String,
    /// `true` if the hashes match (lossless round trip).
    pub matched: bool,
}

/// Run a full encode -> hook -> decode roundtrip over an in-memory payload.
///
/// Steps:
/// 1. SHA-256 hashes `payload`.
/// 2. Encodes it into carrier bytes.
/// 3. Calls `hook.after_encode(bytes)` — an external carrier trip happens
///    here, if anywhere.
/// 4. Decodes whatever the hook returned.
/// 5. Hashes the recovered payload and compares.
pub fn roundtrip<H: CarrierHook>(payload: &[u8], hook: &H) -> Result<RoundtripResult> {
    let original_hash = sha256_hex(payload);

    let encoded = encode::encode_bytes(payload)?;
    let carried = hook.after_encode(encoded)?;
    let decoded = decode::decode_bytes(carried)?;

    let decoded_hash = sha256_hex(&decoded);
    let matched = original_hash == decoded_hash;

    Ok(RoundtripResult {
        original_hash,
        decoded_hash,
        matched,
    })
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
