//! Index builder: orchestrates the front-end, extractor, and hasher over a library (spec §4.6).

use tracing::warn;

use crate::audio::decode_file;
use crate::config::Config;
use crate::error::CoreError;
use crate::fingerprint::make_hashes;
use crate::manifest::ManifestEntry;
use crate::peaks::local_maxima;
use crate::spectrogram::spectrogram;
use crate::store::Store;

/// Tallies from a `build` run. Per-item failures are swallowed into `failed`/`skipped`, never
/// propagated, so a caller's build never aborts over one bad file (spec §4.6/§7).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub stored: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Builds `entries` into `store`, skipping songs that already exist unless `force` is set.
///
/// A store-level failure (opening the wrong schema, an I/O error) is not possible here since
/// `store` is already open; this only ever returns `Ok`, recording per-item outcomes in the
/// report. Callers that want a fatal store-open error propagate it from [`Store::init`] before
/// calling this function.
pub fn build(
    store: &mut Store,
    config: &Config,
    entries: &[ManifestEntry],
    force: bool,
) -> Result<BuildReport, CoreError> {
    let mut report = BuildReport::default();

    for entry in entries {
        if store.song_exists(entry.song_id)? {
            if force {
                store.delete_song(entry.song_id)?;
            } else {
                warn!(song_id = entry.song_id, "SKIP: already indexed");
                report.skipped += 1;
                continue;
            }
        }

        let samples = match decode_file(&entry.source) {
            Ok(samples) => samples,
            Err(e) => {
                warn!(song_id = entry.song_id, error = %e, "FAILED: acquisition");
                report.failed += 1;
                continue;
            }
        };

        let (spec, _) = spectrogram(&samples.data, samples.channels, samples.sample_rate, config);
        let peaks = local_maxima(&spec, config);
        if peaks.is_empty() {
            warn!(song_id = entry.song_id, "SKIP: no peaks extracted");
            report.skipped += 1;
            continue;
        }

        let hashes = make_hashes(&peaks, config);
        if hashes.is_empty() {
            warn!(song_id = entry.song_id, "SKIP: no hashes derived");
            report.skipped += 1;
            continue;
        }

        let hash_count = hashes.len();
        store.add_song(entry.song_id, &entry.artist, &entry.title)?;
        store.add_hashes(entry.song_id, &hashes)?;
        tracing::info!(song_id = entry.song_id, hash_count, "STORED");
        report.stored += 1;
    }

    Ok(report)
}
