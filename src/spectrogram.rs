//! Signal front-end: mono-downmix, resample, windowed STFT, dB scaling (spec §4.1).

use crate::audio::{downmix_to_mono, resample_linear};
use crate::config::Config;
use crate::fft::CooleyTukeyEngine;

/// A dense dB-scaled spectrogram, row-major over (freq_bin, time_frame).
#[derive(Debug, Clone)]
pub struct Spectrogram {
    data: Vec<f32>,
    freq_bins: usize,
    time_frames: usize,
}

impl Spectrogram {
    pub fn freq_bins(&self) -> usize {
        self.freq_bins
    }

    pub fn time_frames(&self) -> usize {
        self.time_frames
    }

    #[inline]
    pub fn get(&self, freq_bin: usize, time_frame: usize) -> f32 {
        if freq_bin >= self.freq_bins || time_frame >= self.time_frames {
            return f32::NEG_INFINITY;
        }
        self.data[time_frame * self.freq_bins + freq_bin]
    }

    #[inline]
    fn set(&mut self, freq_bin: usize, time_frame: usize, value: f32) {
        self.data[time_frame * self.freq_bins + freq_bin] = value;
    }

    fn empty(freq_bins: usize) -> Self {
        Self {
            data: Vec::new(),
            freq_bins,
            time_frames: 0,
        }
    }
}

/// Computes the dB-scaled STFT magnitude spectrogram of `data` (interleaved, `channels`
/// channels, at `sample_rate` Hz), resampling to `config.sample_rate` if necessary.
///
/// Returns the spectrogram together with the working sample rate (always
/// `config.sample_rate`), mirroring the reference `spectrogram(audio, sr) -> (S, sr')`.
pub fn spectrogram(
    data: &[f32],
    channels: u16,
    sample_rate: u32,
    config: &Config,
) -> (Spectrogram, u32) {
    let mono = downmix_to_mono(data, channels);
    let mono = resample_linear(&mono, sample_rate, config.sample_rate);

    let freq_bins = config.freq_bins();
    if mono.is_empty() {
        return (Spectrogram::empty(freq_bins), config.sample_rate);
    }

    let pad = config.fft_size / 2;
    let padded = reflect_pad(&mono, pad);

    let time_frames = (padded.len() - config.fft_size) / config.hop_size + 1;
    let mut spec = Spectrogram {
        data: vec![f32::NEG_INFINITY; freq_bins * time_frames],
        freq_bins,
        time_frames,
    };

    let window = hann_window(config.fft_size);
    let engine = CooleyTukeyEngine::new(config.fft_size);

    let mut magnitudes = vec![0.0f32; freq_bins * time_frames];
    let mut global_max = 0.0f32;

    for frame_idx in 0..time_frames {
        let start = frame_idx * config.hop_size;
        let windowed: Vec<f32> = padded[start..start + config.fft_size]
            .iter()
            .zip(window.iter())
            .map(|(&s, &w)| s * w)
            .collect();

        let spectrum = engine.transform(&windowed);
        for bin in 0..freq_bins {
            let magnitude = spectrum[bin].norm();
            magnitudes[frame_idx * freq_bins + bin] = magnitude;
            if magnitude > global_max {
                global_max = magnitude;
            }
        }
    }

    for frame_idx in 0..time_frames {
        for bin in 0..freq_bins {
            let magnitude = magnitudes[frame_idx * freq_bins + bin];
            let db = if global_max > 0.0 && magnitude > 0.0 {
                20.0 * (magnitude / global_max).log10()
            } else {
                f32::NEG_INFINITY
            };
            spec.set(bin, frame_idx, db);
        }
    }

    (spec, config.sample_rate)
}

fn hann_window(size: usize) -> Vec<f32> {
    if size <= 1 {
        return vec![1.0; size];
    }
    (0..size)
        .map(|i| {
            let theta = 2.0 * std::f32::consts::PI * i as f32 / (size as f32 - 1.0);
            0.5 * (1.0 - theta.cos())
        })
        .collect()
}

/// numpy-style `reflect` padding: mirrors samples without repeating the edge sample, and
/// bounces indefinitely so it stays well-defined even when `pad` exceeds the buffer length
/// (short-audio edge case).
fn reflect_pad(samples: &[f32], pad: usize) -> Vec<f32> {
    let len = samples.len();
    if len == 0 {
        return Vec::new();
    }
    if len == 1 {
        return vec![samples[0]; len + 2 * pad];
    }

    let mut out = Vec::with_capacity(len + 2 * pad);
    for offset in (1..=pad).rev() {
        out.push(samples[reflect_index(-(offset as isize), len)]);
    }
    out.extend_from_slice(samples);
    for offset in 0..pad {
        out.push(samples[reflect_index((len + offset) as isize, len)]);
    }
    out
}

fn reflect_index(i: isize, len: usize) -> usize {
    let period = 2 * (len as isize - 1);
    let mut m = i % period;
    if m < 0 {
        m += period;
    }
    if m < len as isize {
        m as usize
    } else {
        (period - m) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_audio_yields_empty_spectrogram() {
        let (spec, sr) = spectrogram(&[], 1, 8000, &Config::default());
        assert_eq!(spec.time_frames(), 0);
        assert_eq!(sr, 8000);
    }

    #[test]
    fn db_values_never_exceed_zero() {
        let config = Config::default();
        let samples: Vec<f32> = (0..8000)
            .map(|i| (i as f32 * 0.05).sin())
            .collect();
        let (spec, _) = spectrogram(&samples, 1, config.sample_rate, &config);
        for t in 0..spec.time_frames() {
            for f in 0..spec.freq_bins() {
                let db = spec.get(f, t);
                assert!(db.is_infinite() || db <= 1e-4, "db={db} should be <= 0");
            }
        }
    }

    #[test]
    fn silent_audio_is_entirely_negative_infinity() {
        let config = Config::default();
        let samples = vec![0.0f32; 8000];
        let (spec, _) = spectrogram(&samples, 1, config.sample_rate, &config);
        for t in 0..spec.time_frames() {
            for f in 0..spec.freq_bins() {
                assert!(spec.get(f, t).is_infinite());
            }
        }
    }

    #[test]
    fn stereo_is_downmixed_before_transform() {
        let config = Config::default();
        let mono: Vec<f32> = (0..8000).map(|i| (i as f32 * 0.05).sin()).collect();
        let stereo: Vec<f32> = mono.iter().flat_map(|&s| [s, s]).collect();
        let (mono_spec, _) = spectrogram(&mono, 1, config.sample_rate, &config);
        let (stereo_spec, _) = spectrogram(&stereo, 2, config.sample_rate, &config);
        assert_eq!(mono_spec.time_frames(), stereo_spec.time_frames());
        assert_eq!(mono_spec.get(10, 2), stereo_spec.get(10, 2));
    }

    #[test]
    fn reflect_pad_mirrors_without_repeating_edge() {
        let samples = vec![1.0, 2.0, 3.0, 4.0];
        let padded = reflect_pad(&samples, 2);
        assert_eq!(padded, vec![3.0, 2.0, 1.0, 2.0, 3.0, 4.0, 3.0, 2.0]);
    }
}
