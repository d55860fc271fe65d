//! End-to-end scenario tests driving the full pipeline (spectrogram -> local_maxima ->
//! make_hashes -> Store -> matcher::identify) over synthesized audio, per the documented
//! recognition scenarios: self-identification, clipped-snippet offset recovery, distractor
//! rejection, empty-query handling, and force-rebuild idempotence.

use soundmark::{build, identify, local_maxima, make_hashes, spectrogram, BuildReport};
use soundmark::{Config, ManifestEntry, Store};

fn chirp(duration_secs: f32, sample_rate: u32) -> Vec<f32> {
    let n = (duration_secs * sample_rate as f32) as usize;
    let (f0, f1) = (200.0f32, 2000.0f32);
    (0..n)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let freq = f0 + (f1 - f0) * t / duration_secs;
            (2.0 * std::f32::consts::PI * freq * t).sin()
        })
        .collect()
}

fn white_noise(duration_secs: f32, sample_rate: u32, seed: u64) -> Vec<f32> {
    let n = (duration_secs * sample_rate as f32) as usize;
    // Deterministic xorshift generator: no external RNG crate, no CLI-observable surface to
    // drive — reproducibility matters more than distribution quality here.
    let mut state = seed | 1;
    (0..n)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            ((state % 2000) as f32 / 1000.0) - 1.0
        })
        .collect()
}

fn hashes_for(samples: &[f32], config: &Config) -> Vec<soundmark::HashRecord> {
    let (spec, _) = spectrogram(samples, 1, config.sample_rate, config);
    let peaks = local_maxima(&spec, config);
    make_hashes(&peaks, config)
}

#[test]
fn self_identification_ranks_first_with_zero_offset() {
    let config = Config::default();
    let track = chirp(30.0, config.sample_rate);

    let dir = tempfile::tempdir().unwrap();
    let mut store = Store::init(dir.path().join("index.sqlite"), &config).unwrap();
    store.add_song(1, "Test Artist", "Chirp").unwrap();
    let reference_hashes = hashes_for(&track, &config);
    store.add_hashes(1, &reference_hashes).unwrap();

    let query_hashes = hashes_for(&track, &config);
    let results = identify(&mut store, &query_hashes, 5).unwrap();

    assert_eq!(results[0].song_id, 1);
    assert_eq!(results[0].best_offset, 0);
    assert!(results[0].votes >= 100, "expected >=100 votes, got {}", results[0].votes);
}

#[test]
fn clipped_snippet_recovers_expected_offset() {
    let config = Config::default();
    let track = chirp(30.0, config.sample_rate);

    let dir = tempfile::tempdir().unwrap();
    let mut store = Store::init(dir.path().join("index.sqlite"), &config).unwrap();
    store.add_song(1, "Test Artist", "Chirp").unwrap();
    store.add_hashes(1, &hashes_for(&track, &config)).unwrap();

    let sr = config.sample_rate as usize;
    let snippet = &track[10 * sr..15 * sr];
    let query_hashes = hashes_for(snippet, &config);
    let results = identify(&mut store, &query_hashes, 5).unwrap();

    assert_eq!(results[0].song_id, 1);
    let expected_offset = (10.0 * config.sample_rate as f64 / config.hop_size as f64).round() as i64;
    assert!(
        (results[0].best_offset - expected_offset).abs() <= 1,
        "expected offset near {expected_offset}, got {}",
        results[0].best_offset
    );
}

#[test]
fn distractor_track_is_outvoted_by_the_true_match() {
    let config = Config::default();
    let track = chirp(30.0, config.sample_rate);
    let noise = white_noise(30.0, config.sample_rate, 42);

    let dir = tempfile::tempdir().unwrap();
    let mut store = Store::init(dir.path().join("index.sqlite"), &config).unwrap();
    store.add_song(1, "Chirp Artist", "Chirp").unwrap();
    store.add_hashes(1, &hashes_for(&track, &config)).unwrap();
    store.add_song(2, "Noise Artist", "Noise").unwrap();
    store.add_hashes(2, &hashes_for(&noise, &config)).unwrap();

    let query_hashes = hashes_for(&track, &config);
    let results = identify(&mut store, &query_hashes, 5).unwrap();

    assert_eq!(results[0].song_id, 1);
    if let Some(noise_result) = results.iter().find(|c| c.song_id == 2) {
        assert!(noise_result.votes < results[0].votes);
    }
}

#[test]
fn empty_query_yields_no_results() {
    let config = Config::default();
    let track = chirp(30.0, config.sample_rate);

    let dir = tempfile::tempdir().unwrap();
    let mut store = Store::init(dir.path().join("index.sqlite"), &config).unwrap();
    store.add_song(1, "Test Artist", "Chirp").unwrap();
    store.add_hashes(1, &hashes_for(&track, &config)).unwrap();

    let silence = vec![0.0f32; (0.1 * config.sample_rate as f32) as usize];
    let query_hashes = hashes_for(&silence, &config);
    let results = identify(&mut store, &query_hashes, 5).unwrap();

    assert!(results.is_empty());
}

fn write_wav(path: &std::path::Path, samples: &[f32], sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn force_rebuild_reproduces_identical_index_state() {
    let config = Config::default();
    let dir = tempfile::tempdir().unwrap();
    let wav_path = dir.path().join("track.wav");
    write_wav(&wav_path, &chirp(10.0, config.sample_rate), config.sample_rate);

    let entries = vec![ManifestEntry {
        song_id: 7,
        artist: "Artist".into(),
        title: "Title".into(),
        source: wav_path,
    }];

    let mut store = Store::init(dir.path().join("index.sqlite"), &config).unwrap();
    let first: BuildReport = build(&mut store, &config, &entries, false).unwrap();
    assert_eq!(first.stored, 1);
    assert!(store.song_exists(7).unwrap());

    let rebuilt = build(&mut store, &config, &entries, true).unwrap();
    assert_eq!(rebuilt.stored, 1);
    assert!(store.song_exists(7).unwrap());

    let meta = store.load_meta().unwrap();
    assert_eq!(meta.len(), 1);
    assert_eq!(meta[&7], ("Artist".to_string(), "Title".to_string()));
}
