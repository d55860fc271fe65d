//! Hash-join + histogram-of-offsets voting over the index store (spec §4.5).

use std::collections::HashMap;

use crate::error::CoreError;
use crate::fingerprint::HashRecord;
use crate::store::Store;

/// A ranked result for one candidate song.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCandidate {
    pub song_id: i64,
    pub votes: u32,
    pub best_offset: i64,
    pub total_hits: u32,
}

/// Joins `query_hashes` against `store` and ranks candidates by their offset-histogram peak.
///
/// A flattened `(song_id, delta)` accumulator is used instead of a nested `song_id ->
/// histogram` map: one hash lookup, one arithmetic `delta`, one increment, no intermediate
/// per-song allocation until the final reduction.
pub fn identify(
    store: &mut Store,
    query_hashes: &[HashRecord],
    topk: usize,
) -> Result<Vec<MatchCandidate>, CoreError> {
    if query_hashes.is_empty() {
        return Ok(Vec::new());
    }

    let mut by_hash: HashMap<[u8; 16], Vec<i64>> = HashMap::new();
    for record in query_hashes {
        by_hash.entry(record.hash_key).or_default().push(record.t_anchor);
    }

    let keys: Vec<[u8; 16]> = by_hash.keys().copied().collect();
    let postings = store.lookup_many(&keys)?;

    let mut votes: HashMap<(i64, i64), u32> = HashMap::new();
    for (hash_key, t_queries) in &by_hash {
        let Some(hits) = postings.get(hash_key) else {
            continue;
        };
        for &(song_id, t_song) in hits {
            for &t_query in t_queries {
                let delta = t_song - t_query;
                *votes.entry((song_id, delta)).or_insert(0) += 1;
            }
        }
    }

    if votes.is_empty() {
        return Ok(Vec::new());
    }

    struct Accumulated {
        best_delta: i64,
        best_count: u32,
        total_hits: u32,
    }
    let mut by_song: HashMap<i64, Accumulated> = HashMap::new();
    for (&(song_id, delta), &count) in &votes {
        let entry = by_song.entry(song_id).or_insert(Accumulated {
            best_delta: delta,
            best_count: count,
            total_hits: 0,
        });
        entry.total_hits += count;
        if count > entry.best_count || (count == entry.best_count && delta < entry.best_delta) {
            entry.best_count = count;
            entry.best_delta = delta;
        }
    }

    let mut candidates: Vec<MatchCandidate> = by_song
        .into_iter()
        .map(|(song_id, acc)| MatchCandidate {
            song_id,
            votes: acc.best_count,
            best_offset: acc.best_delta,
            total_hits: acc.total_hits,
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.votes
            .cmp(&a.votes)
            .then(b.total_hits.cmp(&a.total_hits))
            .then(a.song_id.cmp(&b.song_id))
    });
    candidates.truncate(topk);

    Ok(candidates)
}
