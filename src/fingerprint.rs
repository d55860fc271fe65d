//! Landmark-pair hashing: combinatorial pairing inside a target zone, MD5-keyed (spec §4.3).

use md5::{Digest, Md5};

use crate::config::Config;
use crate::peaks::Peak;

/// A 128-bit opaque bucketing key. Not a MAC — collision resistance is "accidental
/// collisions are rare", not cryptographic authenticity (spec §1).
pub type HashKey = [u8; 16];

/// One emitted landmark pair: its hash key and the anchor's time frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashRecord {
    pub hash_key: HashKey,
    pub t_anchor: i64,
}

/// Derives the stable hash for an (anchor_bin, target_bin, delta) triple: MD5 of the ASCII
/// string `"{f1}|{f2}|{dt}"`, matching the reference implementation's digest exactly.
pub fn hash_pair(anchor_bin: usize, target_bin: usize, dt: i64) -> HashKey {
    let raw = format!("{anchor_bin}|{target_bin}|{dt}");
    let digest = Md5::digest(raw.as_bytes());
    digest.into()
}

/// Pairs each anchor peak with later peaks inside the target zone, capped at
/// `config.hash_fanout` pairs per anchor, and derives a hash for each pair.
///
/// `peaks` must already be sorted by `time_frame` ascending (the extractor's contract).
pub fn make_hashes(peaks: &[Peak], config: &Config) -> Vec<HashRecord> {
    let (min_dt, max_dt) = config.target_zone_t_frames;
    let mut hashes = Vec::new();

    for (i, anchor) in peaks.iter().enumerate() {
        let mut emitted = 0usize;
        for target in &peaks[i + 1..] {
            let dt = target.time_frame as i64 - anchor.time_frame as i64;
            if dt > max_dt {
                break;
            }
            if dt < min_dt {
                continue;
            }
            let df = (target.freq_bin as i64 - anchor.freq_bin as i64).abs();
            if df > config.target_zone_f_bins {
                continue;
            }

            let hash_key = hash_pair(anchor.freq_bin, target.freq_bin, dt);
            hashes.push(HashRecord {
                hash_key,
                t_anchor: anchor.time_frame as i64,
            });

            emitted += 1;
            if emitted >= config.hash_fanout {
                break;
            }
        }
    }

    hashes
}
