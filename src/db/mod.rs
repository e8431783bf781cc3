/// SQLite-backed reference store.
///
/// Implements the batched `find_many` contract the loader depends on, plus
/// seeding and the visibility/membership snapshots the policy engine loads.
mod connection;
mod queries;

pub use connection::Database;
