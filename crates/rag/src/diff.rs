//! Order-preserving chunk diff
//!
//! Compares a version's chunks against the previous version by content
//! hash using an LCS match, then walks both sequences emitting exactly one
//! event per position: `unchanged` for matched pairs, `updated` when a
//! position changed in place, `added`/`deleted` for insertions and
//! removals. Event order follows the walk, ordinals ascending.

use newsflow_core::{ChunkEventType, RagChunk, RagChunkEvent};

use crate::hash::content_hash;

/// Diff old chunks against new chunks, producing the event log for
/// `version_id` (the new version).
pub fn diff_chunks(
    version_id: &str,
    old: &[RagChunk],
    new: &[RagChunk],
) -> Vec<RagChunkEvent> {
    let old_hashes: Vec<String> = old.iter().map(|c| content_hash(&c.content)).collect();
    let new_hashes: Vec<String> = new.iter().map(|c| content_hash(&c.content)).collect();

    let (matched_old, matched_new) = lcs_match(&old_hashes, &new_hashes);

    let mut events = Vec::new();
    let mut i = 0;
    let mut j = 0;

    while i < old.len() || j < new.len() {
        if i < old.len() && j < new.len() && matched_old[i] == Some(j) {
            events.push(event(version_id, ChunkEventType::Unchanged, j as u32, Some(&new[j].id)));
            i += 1;
            j += 1;
        } else if i < old.len()
            && j < new.len()
            && matched_old[i].is_none()
            && matched_new[j].is_none()
        {
            // In-place change at the same walk position
            events.push(event(version_id, ChunkEventType::Updated, j as u32, Some(&new[j].id)));
            i += 1;
            j += 1;
        } else if j < new.len() && matched_new[j].is_none() {
            events.push(event(version_id, ChunkEventType::Added, j as u32, Some(&new[j].id)));
            j += 1;
        } else if i < old.len() && matched_old[i].is_none() {
            // Back-reference to the removed chunk
            events.push(event(version_id, ChunkEventType::Deleted, i as u32, Some(&old[i].id)));
            i += 1;
        } else if i < old.len() {
            // Matched pair whose counterpart is further along; consume the
            // deletions/additions in ordinal order first.
            events.push(event(version_id, ChunkEventType::Deleted, i as u32, Some(&old[i].id)));
            i += 1;
        } else {
            events.push(event(version_id, ChunkEventType::Added, j as u32, Some(&new[j].id)));
            j += 1;
        }
    }

    events
}

/// All-added events for a first version
pub fn added_events(version_id: &str, chunks: &[RagChunk]) -> Vec<RagChunkEvent> {
    chunks
        .iter()
        .map(|chunk| event(version_id, ChunkEventType::Added, chunk.ordinal, Some(&chunk.id)))
        .collect()
}

/// All-deleted events for a tombstone
pub fn deleted_events(version_id: &str, old_chunks: &[RagChunk]) -> Vec<RagChunkEvent> {
    old_chunks
        .iter()
        .map(|chunk| event(version_id, ChunkEventType::Deleted, chunk.ordinal, Some(&chunk.id)))
        .collect()
}

fn event(
    version_id: &str,
    event_type: ChunkEventType,
    ordinal: u32,
    chunk_id: Option<&str>,
) -> RagChunkEvent {
    RagChunkEvent {
        version_id: version_id.to_string(),
        chunk_id: chunk_id.map(String::from),
        ordinal,
        event_type,
    }
}

/// Non-crossing LCS match: `matched_old[i] = Some(j)` pairs old[i] with
/// new[j], and symmetrically.
fn lcs_match(old: &[String], new: &[String]) -> (Vec<Option<usize>>, Vec<Option<usize>>) {
    let n = old.len();
    let m = new.len();
    let mut table = vec![vec![0usize; m + 1]; n + 1];

    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i][j] = if old[i] == new[j] {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }

    let mut matched_old = vec![None; n];
    let mut matched_new = vec![None; m];
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            matched_old[i] = Some(j);
            matched_new[j] = Some(i);
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }

    (matched_old, matched_new)
}
