//! Audio fingerprint index and matcher in the style of landmark-pair acoustic hashing.
//!
//! Data flow: PCM -> [`spectrogram::spectrogram`] -> [`peaks::local_maxima`] ->
//! [`fingerprint::make_hashes`] -> (on build) [`store::Store`]; on query, hashes -> join ->
//! vote histogram ([`matcher::identify`]) -> ranked results.

pub mod audio;
pub mod builder;
pub mod config;
pub mod error;
pub mod fft;
pub mod fingerprint;
pub mod manifest;
pub mod matcher;
pub mod peaks;
pub mod spectrogram;
pub mod store;

pub use builder::{build, BuildReport};
pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use fingerprint::{make_hashes, HashKey, HashRecord};
pub use manifest::{load_manifest, ManifestEntry};
pub use matcher::{identify, MatchCandidate};
pub use peaks::{local_maxima, Peak};
pub use spectrogram::{spectrogram, Spectrogram};
pub use store::Store;
