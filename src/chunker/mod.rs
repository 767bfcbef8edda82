use std::slice;

use crate::config::CHUNK_SIZE;

/// Split a payload into QR-sized chunks, lazily and in payload order.
/// Only the final chunk may be short; an empty payload yields no chunks.
pub fn chunk_payload(payload: &[u8]) -> slice::Chunks<'_, u8> {
    payload.chunks(CHUNK_SIZE)
}
