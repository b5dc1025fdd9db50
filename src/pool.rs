//! Output materialization (`§4.6`) and per-query scratch state (`§5`).
//!
//! `ScoredStringPool` is a bump-allocated byte arena: each accepted result
//! appends its space-joined completion text and records the end offset, so
//! the returned iterator can slice `[offset_{i-1}, offset_i)` without any
//! further allocation. `CompletionSet` is the scratch area the engine
//! reconstructs term-id sequences into before dictionary-extracting them to
//! text. Neither type is `Sync`/shared across queries; `§5` requires one
//! instance per concurrent query.

use crate::ids::{DocId, TermId};

#[derive(Debug, Clone)]
pub struct ScoredStringPool {
    bytes: Vec<u8>,
    offsets: Vec<usize>,
    scores: Vec<DocId>,
}

impl ScoredStringPool {
    pub fn with_capacity(byte_capacity: usize, max_results: usize) -> Self {
        ScoredStringPool {
            bytes: Vec::with_capacity(byte_capacity),
            offsets: Vec::with_capacity(max_results + 1),
            scores: Vec::with_capacity(max_results),
        }
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
        self.offsets.clear();
        self.scores.clear();
        self.offsets.push(0);
    }

    /// Scratch slots for the up-to-k doc ids a `topk` call writes into
    /// before completions are reconstructed from them.
    pub fn scores_scratch(&mut self, capacity: usize) -> &mut Vec<DocId> {
        self.scores.clear();
        self.scores.resize(capacity, 0);
        &mut self.scores
    }

    pub fn scores(&self) -> &[DocId] {
        &self.scores
    }

    /// Mutable view of the buffer handed out by `scores_scratch`, for
    /// writers that fill it incrementally rather than all at once.
    pub fn scores_mut(&mut self) -> &mut [DocId] {
        &mut self.scores
    }

    /// Appends one result's text (terms already resolved to byte slices,
    /// joined with single spaces) and records its end offset.
    pub fn push_result(&mut self, terms: &[&[u8]], score: DocId) {
        for (i, term) in terms.iter().enumerate() {
            if i != 0 {
                self.bytes.push(b' ');
            }
            self.bytes.extend_from_slice(term);
        }
        self.offsets.push(self.bytes.len());
        self.scores.push(score);
    }

    pub fn len(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> PoolIter<'_> {
        PoolIter { pool: self, i: 0 }
    }
}

pub struct ScoredCompletion<'a> {
    pub text: &'a str,
    pub score: DocId,
}

pub struct PoolIter<'a> {
    pool: &'a ScoredStringPool,
    i: usize,
}

impl<'a> Iterator for PoolIter<'a> {
    type Item = ScoredCompletion<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.i >= self.pool.len() {
            return None;
        }
        let start = self.pool.offsets[self.i];
        let end = self.pool.offsets[self.i + 1];
        let score = self.pool.scores[self.i];
        self.i += 1;
        let text = std::str::from_utf8(&self.pool.bytes[start..end])
            .expect("completion text is always valid UTF-8");
        Some(ScoredCompletion { text, score })
    }
}

/// Scratch area for reconstructed term-id sequences, one per candidate
/// result, reused across queries (`§5`).
#[derive(Debug, Clone)]
pub struct CompletionSet {
    completions: Vec<Vec<TermId>>,
    sizes: Vec<usize>,
}

impl CompletionSet {
    pub fn with_capacity(max_results: usize, max_terms_per_completion: usize) -> Self {
        CompletionSet {
            completions: vec![vec![0; max_terms_per_completion]; max_results],
            sizes: vec![0; max_results],
        }
    }

    pub fn completion_mut(&mut self, i: usize) -> &mut Vec<TermId> {
        &mut self.completions[i]
    }

    pub fn completion(&self, i: usize) -> &[TermId] {
        &self.completions[i][..self.sizes[i]]
    }

    pub fn set_size(&mut self, i: usize, size: usize) {
        self.sizes[i] = size;
    }
}
