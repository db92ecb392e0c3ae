//! Hash policy
//!
//! SHA-256, hex-encoded. The source hash covers `title ∥ body` and decides
//! whether an upsert is a no-op; the content hash drives the chunk diff.

use sha2::{Digest, Sha256};

/// Hash of a document's identity-relevant content
pub fn source_hash(title: &str, body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(body.as_bytes());
    hex(&hasher.finalize())
}

/// Hash of one chunk's content
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex(&hasher.finalize())
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
