//! Tunables for the eager-fetch policy.

/// Number of elements fetched per chunk when paging container children.
pub const CHUNK_SIZE: usize = 50;

/// Default number of chunks worth of elements a value may hold and still be
/// fetched eagerly.
pub const DEFAULT_CHUNK_PREFETCH: usize = 10;
