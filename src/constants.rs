//! Compile-time bounds (`§6`). Violating these is a programming error, not
//! a runtime one: the engine asserts rather than returning `Result`.

/// Upper bound on `k` for any of the three query entry points.
pub const MAX_K: usize = 100;

/// Upper bound on the number of whitespace-separated tokens in a query.
pub const MAX_NUM_TERMS_PER_QUERY: usize = 16;

/// Upper bound on the number of terms a single *corpus* completion may
/// contain. Independent of `MAX_NUM_TERMS_PER_QUERY`, which only bounds the
/// typed query: a completion reconstructed from the corpus can be longer
/// than anything a query could spell out term-for-term. Sized at twice the
/// query bound, matching the original's scratch-row sizing.
pub const MAX_TERMS_PER_COMPLETION: usize = 2 * MAX_NUM_TERMS_PER_QUERY;

/// Upper bound on the byte length of a raw query string.
pub const MAX_NUM_CHARS_PER_QUERY: usize = 256;

/// Upper bound on the byte length of a single dictionary term, used to size
/// the scratch pool's per-term space.
pub const MAX_TERM_BYTES: usize = 64;

/// Byte capacity of the `ScoredStringPool`: enough for `MAX_K` completions,
/// each up to `MAX_TERMS_PER_COMPLETION` terms of `MAX_TERM_BYTES` plus a
/// joining space.
pub const POOL_BYTE_CAPACITY: usize =
    MAX_K * MAX_TERMS_PER_COMPLETION * (MAX_TERM_BYTES + 1);
