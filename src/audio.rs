//! Thin audio-acquisition collaborator: decodes a local file to interleaved PCM.
//!
//! Fetching audio from remote sources and transcoding formats the underlying codec doesn't
//! support natively are out of scope (spec §1); this module is the minimal local-file
//! collaborator the CLI needs to hand raw samples to [`crate::spectrogram`].

use std::path::{Path, PathBuf};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::CoreError;

/// Interleaved PCM samples plus the metadata needed to downmix and resample them.
#[derive(Debug, Clone)]
pub struct Samples {
    pub data: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

/// Decodes a local audio file to interleaved `f32` PCM using symphonia's format probing.
pub fn decode_file(path: impl AsRef<Path>) -> Result<Samples, CoreError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| CoreError::Acquisition {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    decode_reader(file, path.to_path_buf())
}

fn decode_reader(file: std::fs::File, path: PathBuf) -> Result<Samples, CoreError> {
    let stream = MediaSourceStream::new(Box::new(file), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| CoreError::Decode {
            path: path.clone(),
            message: format!("unrecognized container: {e}"),
        })?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .first()
        .ok_or_else(|| CoreError::Decode {
            path: path.clone(),
            message: "no decodable track found".into(),
        })?
        .clone();

    let sample_rate = track.codec_params.sample_rate.ok_or_else(|| CoreError::Decode {
        path: path.clone(),
        message: "track has no known sample rate".into(),
    })?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| CoreError::Decode {
            path: path.clone(),
            message: format!("no decoder for codec: {e}"),
        })?;

    let mut data = Vec::new();
    let mut channels = 1u16;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(_)) => break,
            Err(e) => {
                return Err(CoreError::Decode {
                    path: path.clone(),
                    message: e.to_string(),
                });
            }
        };

        let decoded = decoder.decode(&packet).map_err(|e| CoreError::Decode {
            path: path.clone(),
            message: e.to_string(),
        })?;

        channels = decoded.spec().channels.count() as u16;

        let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
        sample_buf.copy_interleaved_ref(decoded);
        data.extend_from_slice(sample_buf.samples());
    }

    Ok(Samples {
        data,
        channels: channels.max(1),
        sample_rate,
    })
}

/// Linear-interpolation resampler: deterministic, and `round(len * to/from)` in output length
/// within one sample, which is all the front-end contract (spec §4.1) requires.
pub fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let new_len = ((samples.len() as f64) / ratio).round() as usize;
    let mut resampled = Vec::with_capacity(new_len);

    for i in 0..new_len {
        let src_pos = i as f64 * ratio;
        let idx = src_pos.floor() as usize;
        let frac = (src_pos - idx as f64) as f32;

        let sample = if idx + 1 < samples.len() {
            samples[idx] + frac * (samples[idx + 1] - samples[idx])
        } else if idx < samples.len() {
            samples[idx]
        } else {
            *samples.last().unwrap()
        };
        resampled.push(sample);
    }

    resampled
}

/// Arithmetic-average downmix of interleaved multi-channel audio to mono.
pub fn downmix_to_mono(data: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return data.to_vec();
    }
    let channels = channels as usize;
    data.chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resample_identity_when_rates_match() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(resample_linear(&samples, 8000, 8000), samples);
    }

    #[test]
    fn resample_halves_length_for_half_rate() {
        let samples: Vec<f32> = (0..1000).map(|i| i as f32).collect();
        let out = resample_linear(&samples, 16000, 8000);
        assert!((out.len() as i64 - 500).abs() <= 1);
    }

    #[test]
    fn downmix_averages_stereo_channels() {
        let interleaved = vec![1.0, 3.0, 2.0, 4.0];
        let mono = downmix_to_mono(&interleaved, 2);
        assert_eq!(mono, vec![2.0, 3.0]);
    }

    #[test]
    fn downmix_is_noop_for_mono() {
        let data = vec![0.5, -0.5];
        assert_eq!(downmix_to_mono(&data, 1), data);
    }
}
