use crate::error::Result;

/// A hook invoked between encoding and decoding in a
/// [`roundtrip`](super::roundtrip).
///
/// Implement this trait to inject a real carrier trip between the two
/// halves — for example, uploading the encoded video to a hosting service
/// and downloading the (possibly re-muxed) copy before decoding.
pub trait CarrierHook {
    /// Called with the freshly encoded carrier bytes. Return the bytes the
    /// decoder should read — the same buffer, or whatever came back from the
    /// external trip.
    fn after_encode(&self, encoded: Vec<u8>) -> Result<Vec<u8>>;
}

/// A no-op hook that passes the carrier bytes through unchanged.
pub struct NoopHook;

impl CarrierHook for NoopHook {
    fn after_encode(&self, encoded: Vec<u8>) -> Result<Vec<u8>> {
        Ok(encoded)
    }
}
