//! JSON encoding of the persisted index
//!
//! The index is a JSON array of releases, pretty-printed with two-space
//! indentation and a trailing newline. `<`, `>` and `&` are written as-is.
//! Decoding is strict: unknown fields anywhere are an error.

use crate::index::release::Release;

pub fn decode_index(raw: &[u8]) -> Result<Vec<Release>, serde_json::Error> {
    serde_json::from_slice(raw)
}

pub fn encode_index(releases: &[Release]) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::with_capacity(1 << 10);
    serde_json::to_writer_pretty(&mut out, releases)?;
    out.push(b'\n');
    Ok(out)
}
