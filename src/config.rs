use serde::{Deserialize, Serialize};

/// Immutable snapshot of the eight tunable constants that govern fingerprinting.
///
/// Threaded explicitly through `spectrogram`, `local_maxima` and `make_hashes` rather than
/// read from module-level constants, so two configurations can coexist (tests do this). A
/// store embeds the `Config` it was built with and refuses to reopen under a different one
/// (see [`crate::store`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub sample_rate: u32,
    pub fft_size: usize,
    pub hop_size: usize,
    /// (freq_bins, time_frames) footprint of the 2-D max filter.
    pub peak_neighborhood: (usize, usize),
    pub top_peaks_per_frame: usize,
    /// (min frames ahead, max frames ahead) for landmark pairing.
    pub target_zone_t_frames: (i64, i64),
    pub target_zone_f_bins: i64,
    pub hash_fanout: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_rate: 8000,
            fft_size: 2048,
            hop_size: 512,
            peak_neighborhood: (16, 16),
            top_peaks_per_frame: 16,
            target_zone_t_frames: (2, 64),
            target_zone_f_bins: 48,
            hash_fanout: 8,
        }
    }
}

impl Config {
    pub fn freq_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_reference_constants() {
        let c = Config::default();
        assert_eq!(c.sample_rate, 8000);
        assert_eq!(c.fft_size, 2048);
        assert_eq!(c.hop_size, 512);
        assert_eq!(c.peak_neighborhood, (16, 16));
        assert_eq!(c.top_peaks_per_frame, 16);
        assert_eq!(c.target_zone_t_frames, (2, 64));
        assert_eq!(c.target_zone_f_bins, 48);
        assert_eq!(c.hash_fanout, 8);
        assert_eq!(c.freq_bins(), 1025);
    }
}
