// Hand-written to mirror the DDL `Store::init` issues (spec §4.4); kept in the teacher's
// `diesel::table!` style rather than generated by `diesel print-schema` since there is no
// separate migrations directory.

diesel::table! {
    songs (song_id) {
        song_id -> BigInt,
        artist -> Text,
        title -> Text,
    }
}

diesel::table! {
    hashes (rowid) {
        rowid -> BigInt,
        hash_key -> Binary,
        song_id -> BigInt,
        t_song -> BigInt,
    }
}

diesel::table! {
    params (id) {
        id -> BigInt,
        sample_rate -> BigInt,
        fft_size -> BigInt,
        hop_size -> BigInt,
        peak_neighborhood_f -> BigInt,
        peak_neighborhood_t -> BigInt,
        top_peaks_per_frame -> BigInt,
        target_zone_t_min -> BigInt,
        target_zone_t_max -> BigInt,
        target_zone_f_bins -> BigInt,
        hash_fanout -> BigInt,
    }
}

diesel::joinable!(hashes -> songs (song_id));
diesel::allow_tables_to_appear_in_same_query!(hashes, songs, params);
