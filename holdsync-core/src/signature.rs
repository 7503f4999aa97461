//! Content signature over a desired hold set.
//!
//! The polling driver hashes each mapping's desired set every cycle and
//! only replans when the signature changes, so unchanged sources cost
//! nothing beyond the listing call.

use sha2::{Digest, Sha256};

use crate::hold::DesiredHold;

/// Hex SHA-256 over the keys and hold events, independent of input
/// order.
pub fn signature(desired: &[DesiredHold]) -> String {
    let mut entries: Vec<(String, &DesiredHold)> =
        desired.iter().map(|hold| (hold.key(), hold)).collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut hasher = Sha256::new();
    for (key, hold) in entries {
        hasher.update(key.as_bytes());
        hasher.update(b"\n");
        // Hold events are plain data; serialization cannot fail.
        hasher.update(serde_json::to_vec(&hold.event).expect("hold event serializes to JSON"));
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}
