use diesel::prelude::*;

use crate::config::Config;

#[derive(Queryable, Selectable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::store::schema::songs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Song {
    pub song_id: i64,
    pub artist: String,
    pub title: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::store::schema::songs)]
pub struct NewSong<'a> {
    pub song_id: i64,
    pub artist: &'a str,
    pub title: &'a str,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::store::schema::hashes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct HashRow {
    pub rowid: i64,
    pub hash_key: Vec<u8>,
    pub song_id: i64,
    pub t_song: i64,
}

#[derive(Insertable)]
#[diesel(table_name = crate::store::schema::hashes)]
pub struct NewHashRow<'a> {
    pub hash_key: &'a [u8],
    pub song_id: i64,
    pub t_song: i64,
}

/// Row form of [`Config`], persisted once at `init()` so a reopened store can detect that it
/// was built under a different parameter set (spec's parameter-fingerprint open question).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::store::schema::params)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ParamsRow {
    pub id: i64,
    pub sample_rate: i64,
    pub fft_size: i64,
    pub hop_size: i64,
    pub peak_neighborhood_f: i64,
    pub peak_neighborhood_t: i64,
    pub top_peaks_per_frame: i64,
    pub target_zone_t_min: i64,
    pub target_zone_t_max: i64,
    pub target_zone_f_bins: i64,
    pub hash_fanout: i64,
}

#[derive(Insertable)]
#[diesel(table_name = crate::store::schema::params)]
pub struct NewParamsRow {
    pub id: i64,
    pub sample_rate: i64,
    pub fft_size: i64,
    pub hop_size: i64,
    pub peak_neighborhood_f: i64,
    pub peak_neighborhood_t: i64,
    pub top_peaks_per_frame: i64,
    pub target_zone_t_min: i64,
    pub target_zone_t_max: i64,
    pub target_zone_f_bins: i64,
    pub hash_fanout: i64,
}

impl From<&Config> for NewParamsRow {
    fn from(c: &Config) -> Self {
        Self {
            id: 1,
            sample_rate: c.sample_rate as i64,
            fft_size: c.fft_size as i64,
            hop_size: c.hop_size as i64,
            peak_neighborhood_f: c.peak_neighborhood.0 as i64,
            peak_neighborhood_t: c.peak_neighborhood.1 as i64,
            top_peaks_per_frame: c.top_peaks_per_frame as i64,
            target_zone_t_min: c.target_zone_t_frames.0,
            target_zone_t_max: c.target_zone_t_frames.1,
            target_zone_f_bins: c.target_zone_f_bins,
            hash_fanout: c.hash_fanout as i64,
        }
    }
}

impl From<ParamsRow> for Config {
    fn from(r: ParamsRow) -> Self {
        Self {
            sample_rate: r.sample_rate as u32,
            fft_size: r.fft_size as usize,
            hop_size: r.hop_size as usize,
            peak_neighborhood: (r.peak_neighborhood_f as usize, r.peak_neighborhood_t as usize),
            top_peaks_per_frame: r.top_peaks_per_frame as usize,
            target_zone_t_frames: (r.target_zone_t_min, r.target_zone_t_max),
            target_zone_f_bins: r.target_zone_f_bins,
            hash_fanout: r.hash_fanout as usize,
        }
    }
}
