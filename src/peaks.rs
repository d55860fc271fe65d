//! Peak extraction: 2-D local-maximum filtering with background suppression (spec §4.2).

use crate::config::Config;
use crate::spectrogram::Spectrogram;

/// A robust spectral peak: a (freq_bin, time_frame) cell that locally dominates its
/// neighborhood and isn't part of an interior silent region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Peak {
    pub freq_bin: usize,
    pub time_frame: usize,
}

/// Runs the extractor end to end: max-filter candidate mask, background erosion, per-frame
/// top-K thinning. Returns peaks sorted by `time_frame` ascending (ties broken by `freq_bin`
/// ascending, for determinism — the spec leaves in-frame order unspecified).
pub fn local_maxima(spec: &Spectrogram, config: &Config) -> Vec<Peak> {
    let freq_bins = spec.freq_bins();
    let time_frames = spec.time_frames();
    if freq_bins == 0 || time_frames == 0 {
        return Vec::new();
    }

    let max_filtered = max_filter(spec, config.peak_neighborhood);
    let eroded_background = erode_background(spec);

    let mut by_frame: Vec<Vec<(usize, f32)>> = vec![Vec::new(); time_frames];
    for t in 0..time_frames {
        for f in 0..freq_bins {
            let value = spec.get(f, t);
            let is_candidate = value == max_filtered[t * freq_bins + f];
            if is_candidate && !eroded_background[t * freq_bins + f] {
                by_frame[t].push((f, value));
            }
        }
    }

    let mut peaks = Vec::new();
    for (t, mut frame_peaks) in by_frame.into_iter().enumerate() {
        frame_peaks.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        frame_peaks.truncate(config.top_peaks_per_frame);
        frame_peaks.sort_by_key(|&(f, _)| f);
        for (f, _) in frame_peaks {
            peaks.push(Peak {
                freq_bin: f,
                time_frame: t,
            });
        }
    }

    peaks
}

/// Separable rectangular max filter: a max over a `(freq, time)` window equals a max over
/// time-windows of a max over freq-windows, which turns an O(rows*cols*w*h) brute force into
/// two O(rows*cols*(w+h)) passes. Out-of-bounds cells read as `-inf`, matching `Spectrogram`'s
/// own out-of-range behavior.
fn max_filter(spec: &Spectrogram, neighborhood: (usize, usize)) -> Vec<f32> {
    let freq_bins = spec.freq_bins();
    let time_frames = spec.time_frames();
    let (nf, nt) = neighborhood;
    let f_before = (nf / 2) as isize;
    let f_after = (nf - nf / 2 - 1) as isize;
    let t_before = (nt / 2) as isize;
    let t_after = (nt - nt / 2 - 1) as isize;

    // Pass 1: max along the time axis.
    let mut along_time = vec![f32::NEG_INFINITY; freq_bins * time_frames];
    for f in 0..freq_bins {
        for t in 0..time_frames {
            let mut m = f32::NEG_INFINITY;
            let lo = t as isize - t_before;
            let hi = t as isize + t_after;
            for tt in lo..=hi {
                if tt >= 0 && (tt as usize) < time_frames {
                    m = m.max(spec.get(f, tt as usize));
                }
            }
            along_time[t * freq_bins + f] = m;
        }
    }

    // Pass 2: max along the freq axis, over the time-axis result.
    let mut out = vec![f32::NEG_INFINITY; freq_bins * time_frames];
    for t in 0..time_frames {
        for f in 0..freq_bins {
            let mut m = f32::NEG_INFINITY;
            let lo = f as isize - f_before;
            let hi = f as isize + f_after;
            for ff in lo..=hi {
                if ff >= 0 && (ff as usize) < freq_bins {
                    m = m.max(along_time[t * freq_bins + ff as usize]);
                }
            }
            out[t * freq_bins + f] = m;
        }
    }

    out
}

/// Binary erosion of the `S == -inf` background mask with a 4-connected structuring element
/// and `border_value = 1` (out-of-bounds counts as background).
fn erode_background(spec: &Spectrogram) -> Vec<bool> {
    let freq_bins = spec.freq_bins();
    let time_frames = spec.time_frames();

    let is_background = |f: isize, t: isize| -> bool {
        if f < 0 || t < 0 || f as usize >= freq_bins || t as usize >= time_frames {
            true
        } else {
            spec.get(f as usize, t as usize) == f32::NEG_INFINITY
        }
    };

    let mut eroded = vec![false; freq_bins * time_frames];
    for t in 0..time_frames {
        for f in 0..freq_bins {
            let (fi, ti) = (f as isize, t as isize);
            eroded[t * freq_bins + f] = is_background(fi, ti)
                && is_background(fi - 1, ti)
                && is_background(fi + 1, ti)
                && is_background(fi, ti - 1)
                && is_background(fi, ti + 1);
        }
    }
    eroded
}
