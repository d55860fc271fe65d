//! Persistent hash-keyed index store (spec §4.4): a single SQLite file holding songs, their
//! landmark hashes, and the parameter set they were built under.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::config::Config;
use crate::error::CoreError;
use crate::fingerprint::HashRecord;
use crate::store::models::{HashRow, NewHashRow, NewParamsRow, NewSong, ParamsRow, Song};
use crate::store::schema::{hashes, params, songs};

/// A single open connection to the on-disk index. Not `Sync`; callers needing concurrent
/// access open one `Store` per thread, same as a plain `SqliteConnection`.
pub struct Store {
    conn: SqliteConnection,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

impl Store {
    /// Opens (creating if absent) the SQLite file at `path`, applies the schema DDL, and
    /// reconciles the embedded parameter fingerprint against `config`.
    ///
    /// A fresh database adopts `config` as its permanent fingerprint. A pre-existing one whose
    /// stored fingerprint disagrees with `config` fails closed with
    /// [`CoreError::SchemaMismatch`] rather than silently mixing incompatible hash spaces.
    pub fn init(path: impl AsRef<Path>, config: &Config) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let mut conn = SqliteConnection::establish(&path.to_string_lossy()).map_err(|e| {
            CoreError::StoreConnection {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;

        conn.batch_execute("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")
            .map_err(|e| CoreError::StoreConnection {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        conn.batch_execute(
            "CREATE TABLE IF NOT EXISTS songs (
                song_id BIGINT PRIMARY KEY,
                artist TEXT NOT NULL,
                title TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS hashes (
                rowid INTEGER PRIMARY KEY,
                hash_key BLOB NOT NULL,
                song_id BIGINT NOT NULL REFERENCES songs(song_id),
                t_song BIGINT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_hashes_hash_key ON hashes(hash_key);
            CREATE TABLE IF NOT EXISTS params (
                id BIGINT PRIMARY KEY,
                sample_rate BIGINT NOT NULL,
                fft_size BIGINT NOT NULL,
                hop_size BIGINT NOT NULL,
                peak_neighborhood_f BIGINT NOT NULL,
                peak_neighborhood_t BIGINT NOT NULL,
                top_peaks_per_frame BIGINT NOT NULL,
                target_zone_t_min BIGINT NOT NULL,
                target_zone_t_max BIGINT NOT NULL,
                target_zone_f_bins BIGINT NOT NULL,
                hash_fanout BIGINT NOT NULL
            );",
        )
        .map_err(|e| CoreError::StoreConnection {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let existing: Option<ParamsRow> = params::table
            .find(1i64)
            .first(&mut conn)
            .optional()
            .map_err(CoreError::StoreIo)?;

        match existing {
            Some(row) => {
                let stored: Config = row.into();
                if &stored != config {
                    return Err(CoreError::SchemaMismatch {
                        stored: Box::new(stored),
                        requested: Box::new(*config),
                    });
                }
            }
            None => {
                diesel::insert_into(params::table)
                    .values(NewParamsRow::from(config))
                    .execute(&mut conn)
                    .map_err(CoreError::StoreIo)?;
            }
        }

        Ok(Self { conn })
    }

    /// Opens an index store for testing purposes backed by a plain file path, bypassing any
    /// parameter reconciliation. Kept private; tests go through [`Store::init`].
    #[cfg(test)]
    fn path_for_test(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        dir.path().join(name)
    }

    /// Upserts by `song_id` (spec §4.4): calling this twice for the same id replaces the
    /// artist/title rather than failing on the unique-key conflict.
    pub fn add_song(&mut self, song_id: i64, artist: &str, title: &str) -> Result<(), CoreError> {
        diesel::replace_into(songs::table)
            .values(NewSong {
                song_id,
                artist,
                title,
            })
            .execute(&mut self.conn)
            .map_err(CoreError::StoreIo)?;
        Ok(())
    }

    pub fn song_exists(&mut self, song_id: i64) -> Result<bool, CoreError> {
        let count: i64 = songs::table
            .filter(songs::song_id.eq(song_id))
            .count()
            .get_result(&mut self.conn)
            .map_err(CoreError::StoreIo)?;
        Ok(count > 0)
    }

    /// Deletes a song and all of its hashes atomically.
    pub fn delete_song(&mut self, song_id: i64) -> Result<(), CoreError> {
        self.conn
            .transaction(|conn| {
                diesel::delete(hashes::table.filter(hashes::song_id.eq(song_id))).execute(conn)?;
                diesel::delete(songs::table.filter(songs::song_id.eq(song_id))).execute(conn)?;
                Ok::<_, diesel::result::Error>(())
            })
            .map_err(CoreError::StoreIo)
    }

    /// Bulk-inserts landmark hashes for `song_id` in a single transaction.
    pub fn add_hashes(&mut self, song_id: i64, records: &[HashRecord]) -> Result<(), CoreError> {
        if records.is_empty() {
            return Ok(());
        }
        const BATCH_SIZE: usize = 5_000;
        self.conn
            .transaction(|conn| {
                for batch in records.chunks(BATCH_SIZE) {
                    let rows: Vec<NewHashRow> = batch
                        .iter()
                        .map(|r| NewHashRow {
                            hash_key: &r.hash_key,
                            song_id,
                            t_song: r.t_anchor,
                        })
                        .collect();
                    diesel::insert_into(hashes::table)
                        .values(&rows)
                        .execute(conn)?;
                }
                Ok::<_, diesel::result::Error>(())
            })
            .map_err(CoreError::StoreIo)
    }

    /// Looks up every stored `(song_id, t_song)` pair for a single hash key.
    pub fn lookup(&mut self, hash_key: &[u8]) -> Result<Vec<(i64, i64)>, CoreError> {
        let rows: Vec<HashRow> = hashes::table
            .filter(hashes::hash_key.eq(hash_key))
            .select(HashRow::as_select())
            .load(&mut self.conn)
            .map_err(CoreError::StoreIo)?;
        Ok(rows.into_iter().map(|r| (r.song_id, r.t_song)).collect())
    }

    /// Batched form of [`Store::lookup`]: one round trip for every hash key a query produced,
    /// keyed back by the exact bytes so the matcher can recover each hash's `t_query` anchors.
    pub fn lookup_many(
        &mut self,
        hash_keys: &[[u8; 16]],
    ) -> Result<HashMap<[u8; 16], Vec<(i64, i64)>>, CoreError> {
        let mut out: HashMap<[u8; 16], Vec<(i64, i64)>> = HashMap::new();
        if hash_keys.is_empty() {
            return Ok(out);
        }

        const BATCH_SIZE: usize = 500;
        for batch in hash_keys.chunks(BATCH_SIZE) {
            let keys: Vec<&[u8]> = batch.iter().map(|k| k.as_slice()).collect();
            let rows: Vec<HashRow> = hashes::table
                .filter(hashes::hash_key.eq_any(keys))
                .select(HashRow::as_select())
                .load(&mut self.conn)
                .map_err(CoreError::StoreIo)?;
            for row in rows {
                let mut key = [0u8; 16];
                key.copy_from_slice(&row.hash_key);
                out.entry(key).or_default().push((row.song_id, row.t_song));
            }
        }

        Ok(out)
    }

    pub fn song(&mut self, song_id: i64) -> Result<Option<Song>, CoreError> {
        songs::table
            .filter(songs::song_id.eq(song_id))
            .select(Song::as_select())
            .first(&mut self.conn)
            .optional()
            .map_err(CoreError::StoreIo)
    }

    pub fn song_count(&mut self) -> Result<i64, CoreError> {
        songs::table
            .count()
            .get_result(&mut self.conn)
            .map_err(CoreError::StoreIo)
    }

    /// Loads every song's `(artist, title)`, keyed by `song_id` — the batched metadata fetch
    /// callers use to annotate a `match` result set with one query instead of one per
    /// candidate (spec §4.4).
    pub fn load_meta(&mut self) -> Result<HashMap<i64, (String, String)>, CoreError> {
        let rows: Vec<Song> = songs::table
            .select(Song::as_select())
            .load(&mut self.conn)
            .map_err(CoreError::StoreIo)?;
        Ok(rows
            .into_iter()
            .map(|s| (s.song_id, (s.artist, s.title)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::hash_pair;

    fn temp_store(dir: &tempfile::TempDir, config: &Config) -> Store {
        let path = Store::path_for_test(dir, "index.sqlite");
        Store::init(path, config).expect("store should open")
    }

    #[test]
    fn reopening_with_same_config_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        {
            let _store = temp_store(&dir, &config);
        }
        let path = Store::path_for_test(&dir, "index.sqlite");
        assert!(Store::init(path, &config).is_ok());
    }

    #[test]
    fn reopening_with_different_config_fails_closed() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        {
            let _store = temp_store(&dir, &config);
        }
        let mut other = config;
        other.hash_fanout += 1;
        let path = Store::path_for_test(&dir, "index.sqlite");
        match Store::init(path, &other) {
            Err(CoreError::SchemaMismatch { .. }) => {}
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn add_and_lookup_roundtrips_hashes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let mut store = temp_store(&dir, &config);

        store.add_song(1, "artist", "title").unwrap();
        let key = hash_pair(10, 20, 5);
        store
            .add_hashes(1, &[HashRecord { hash_key: key, t_anchor: 7 }])
            .unwrap();

        let hits = store.lookup(&key).unwrap();
        assert_eq!(hits, vec![(1, 7)]);
        assert!(store.song_exists(1).unwrap());
    }

    #[test]
    fn add_song_upserts_by_song_id() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let mut store = temp_store(&dir, &config);

        store.add_song(1, "first artist", "first title").unwrap();
        store.add_song(1, "second artist", "second title").unwrap();

        assert_eq!(store.song_count().unwrap(), 1);
        let song = store.song(1).unwrap().unwrap();
        assert_eq!(song.artist, "second artist");
        assert_eq!(song.title, "second title");
    }

    #[test]
    fn load_meta_maps_every_song_id_to_artist_and_title() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let mut store = temp_store(&dir, &config);

        store.add_song(1, "artist one", "title one").unwrap();
        store.add_song(2, "artist two", "title two").unwrap();

        let meta = store.load_meta().unwrap();
        assert_eq!(meta.len(), 2);
        assert_eq!(meta[&1], ("artist one".to_string(), "title one".to_string()));
        assert_eq!(meta[&2], ("artist two".to_string(), "title two".to_string()));
    }

    #[test]
    fn lookup_many_batches_multiple_keys() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let mut store = temp_store(&dir, &config);

        store.add_song(1, "artist", "title").unwrap();
        let key_a = hash_pair(1, 2, 3);
        let key_b = hash_pair(4, 5, 6);
        store
            .add_hashes(
                1,
                &[
                    HashRecord { hash_key: key_a, t_anchor: 1 },
                    HashRecord { hash_key: key_b, t_anchor: 2 },
                ],
            )
            .unwrap();

        let results = store.lookup_many(&[key_a, key_b]).unwrap();
        assert_eq!(results.get(&key_a).unwrap(), &vec![(1, 1)]);
        assert_eq!(results.get(&key_b).unwrap(), &vec![(1, 2)]);
    }

    #[test]
    fn delete_song_removes_its_hashes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let mut store = temp_store(&dir, &config);

        store.add_song(1, "artist", "title").unwrap();
        let key = hash_pair(1, 2, 3);
        store
            .add_hashes(1, &[HashRecord { hash_key: key, t_anchor: 0 }])
            .unwrap();

        store.delete_song(1).unwrap();
        assert!(!store.song_exists(1).unwrap());
        assert!(store.lookup(&key).unwrap().is_empty());
    }
}
