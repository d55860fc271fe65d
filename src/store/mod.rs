//! Persistent hash-keyed index store (spec §4.4).

pub mod connector;
pub mod models;
pub mod schema;

pub use connector::Store;
pub use models::Song;
