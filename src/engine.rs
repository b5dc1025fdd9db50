//! Top-k engine (`§4.5`): orchestrates the prefix and conjunctive pipelines
//! over the four component traits, and materializes results.
//!
//! All four component types share one `TermId` numbering end to end
//! (`§3`: `0` is the sentinel, real terms are `[1, T]`): the dictionary,
//! the completions trie, the inverted index, and the minimal-doc-ids list
//! all index by that same id. This is a deliberate simplification over the
//! distilled algorithm's source, which juggled two parallel numberings (a
//! 0-based dictionary array index and a sentinel-shifted trie index) as a
//! memory-layout artifact; collapsing them to one loses nothing
//! observable and removes a class of off-by-one bugs (see `DESIGN.md`).

use std::time::{Duration, Instant};

use crate::completions::CompletionsStore;
use crate::constants::{
    MAX_K, MAX_NUM_CHARS_PER_QUERY, MAX_NUM_TERMS_PER_QUERY, MAX_TERMS_PER_COMPLETION,
    MAX_TERM_BYTES, POOL_BYTE_CAPACITY,
};
use crate::dictionary::TermDictionary;
use crate::ids::{DocId, IdRange, TermId};
use crate::inverted_index::{DocIdIterator, InvertedIndex};
use crate::pool::{CompletionSet, PoolIter, ScoredStringPool};
use crate::rmq::RangeMinimumQuery;
use crate::seq::IntSequence;
use crate::unsorted_list::UnsortedList;

/// The frozen, shareable index (`§4.9`/`§6`): built once by the `Builder`,
/// loaded once at process start, then read-only for the rest of the
/// process's life. Safe to share across threads behind an `Arc`; each
/// thread should own its own `TopKEngine` scratch state over it.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct IndexArtifact<C, S, R, D> {
    pub(crate) completions: C,
    pub(crate) unsorted_docs_list: UnsortedList<S, R>,
    pub(crate) unsorted_minimal_docs_list: UnsortedList<S, R>,
    pub(crate) dictionary: D,
    pub(crate) inverted_index: InvertedIndex,
    pub(crate) docid_to_lexid: crate::compact_vector::CompactVector,
}

impl<C: CompletionsStore, S: IntSequence, R: RangeMinimumQuery, D: TermDictionary>
    IndexArtifact<C, S, R, D>
{
    pub fn num_completions(&self) -> usize {
        self.completions.len()
    }

    pub fn bytes(&self) -> usize {
        self.completions.bytes()
            + self.unsorted_docs_list.bytes()
            + self.unsorted_minimal_docs_list.bytes()
            + self.dictionary.bytes()
            + self.inverted_index.bytes()
            + self.docid_to_lexid.bytes()
    }
}

/// Per-stage duration breakdown for one query (`§4.7`).
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryTimings {
    pub parse: Duration,
    pub lex_range_lookup: Duration,
    pub topk_retrieval: Duration,
    pub materialize: Duration,
}

/// One query's worth of mutable scratch state plus a read-only handle onto
/// the shared index. Not `Sync`; each concurrent query needs its own.
pub struct TopKEngine<'i, C, S, R, D> {
    artifact: &'i IndexArtifact<C, S, R, D>,
    pool: ScoredStringPool,
    completion_set: CompletionSet,
    /// Segment boundaries of the minimal-doc-ids list, indexed by 0-based
    /// dictionary term position: term `t`'s posting list occupies
    /// `[term_offsets[t], term_offsets[t + 1])` of
    /// `unsorted_minimal_docs_list`. Derived once from
    /// `InvertedIndex::posting_lens` rather than stored in the artifact;
    /// it's a cumulative sum over data the artifact already carries.
    term_offsets: Vec<u32>,
}

impl<'i, C: CompletionsStore, S: IntSequence, R: RangeMinimumQuery, D: TermDictionary>
    TopKEngine<'i, C, S, R, D>
{
    pub fn new(artifact: &'i IndexArtifact<C, S, R, D>) -> Self {
        let mut term_offsets = Vec::with_capacity(artifact.inverted_index.num_terms() + 1);
        let mut offset = 0u32;
        term_offsets.push(0);
        for len in artifact.inverted_index.posting_lens() {
            offset += len as u32;
            term_offsets.push(offset);
        }
        TopKEngine {
            artifact,
            pool: ScoredStringPool::with_capacity(POOL_BYTE_CAPACITY, MAX_K),
            completion_set: CompletionSet::with_capacity(MAX_K, MAX_TERMS_PER_COMPLETION),
            term_offsets,
        }
    }

    fn check_preconditions(query: &str, k: usize) {
        assert!(k <= MAX_K, "k={k} exceeds MAX_K={MAX_K}");
        assert!(
            query.len() <= MAX_NUM_CHARS_PER_QUERY,
            "query exceeds MAX_NUM_CHARS_PER_QUERY"
        );
    }

    /// Splits `query` on ASCII whitespace, keeping a trailing empty token
    /// when the query is empty or ends in whitespace (`§4.5.4`), and
    /// resolves every non-final token to its `TermId`. Returns `None` if
    /// any non-final token is unknown; callers treat that as "no
    /// results" rather than an error (`§7`, `UnknownTerm`).
    fn parse<'q>(&self, query: &'q str) -> Option<(Vec<TermId>, &'q [u8])> {
        let tokens = split_ascii_whitespace_keep_trailing_empty(query);
        debug_assert!(tokens.len() <= MAX_NUM_TERMS_PER_QUERY);
        let (suffix, prefix_tokens) = tokens.split_last().expect("always at least one token");

        let mut prefix = Vec::with_capacity(prefix_tokens.len());
        for token in prefix_tokens {
            match self.artifact.dictionary.term_id(token.as_bytes()) {
                Some(id) => prefix.push(id),
                None => return None,
            }
        }
        Some((prefix, suffix.as_bytes()))
    }

    /// `§4.5.1`: completions ranked purely by following `prefix` then
    /// matching `suffix` as a text prefix of the next term.
    pub fn prefix_topk(&mut self, query: &str, k: usize) -> PoolIter<'_> {
        Self::check_preconditions(query, k);
        let span = tracing::debug_span!("prefix_topk", query, k);
        let _enter = span.enter();
        self.pool.clear();

        let Some((prefix, suffix)) = self.parse(query) else {
            tracing::trace!("unknown non-final term");
            return self.pool.iter();
        };
        let suffix_lex_range = self.artifact.dictionary.locate_prefix(suffix);
        if suffix_lex_range.is_invalid() {
            tracing::trace!("empty suffix lex range");
            return self.pool.iter();
        }
        let r = self.artifact.completions.locate_prefix(&prefix, suffix_lex_range);
        if r.is_invalid() {
            tracing::trace!("empty completions range");
            return self.pool.iter();
        }

        let n = self.run_unsorted_topk(r, k, false);
        self.extract_completions(n);
        self.extract_strings(n);
        self.pool.iter()
    }

    /// `§4.5.2`.
    pub fn conjunctive_topk(&mut self, query: &str, k: usize) -> PoolIter<'_> {
        Self::check_preconditions(query, k);
        let span = tracing::debug_span!("conjunctive_topk", query, k);
        let _enter = span.enter();
        self.pool.clear();

        let Some((prefix, suffix)) = self.parse(query) else {
            return self.pool.iter();
        };
        let suffix_lex_range = self.artifact.dictionary.locate_prefix(suffix);
        if suffix_lex_range.is_invalid() {
            return self.pool.iter();
        }

        let n = if prefix.is_empty() {
            let n = self.minimal_docs_topk(suffix_lex_range, k);
            self.extract_completions(n);
            n
        } else {
            // conjunctive_general populates completion_set and pool scores
            // directly as it visits candidates.
            self.conjunctive_general(&prefix, suffix_lex_range, k)
        };
        self.extract_strings(n);
        self.pool.iter()
    }

    /// `§4.5.3`: prefix path first; if it yields fewer than `k`, the
    /// conjunctive path *replaces* (not augments) the result. This mirrors
    /// the source's unconditional-replacement semantics rather than a
    /// union/merge (see `DESIGN.md`, Open Questions).
    pub fn topk(&mut self, query: &str, k: usize) -> PoolIter<'_> {
        Self::check_preconditions(query, k);
        let span = tracing::debug_span!("topk", query, k);
        let _enter = span.enter();
        self.pool.clear();

        let Some((prefix, suffix)) = self.parse(query) else {
            return self.pool.iter();
        };
        let suffix_lex_range = self.artifact.dictionary.locate_prefix(suffix);
        if suffix_lex_range.is_invalid() {
            return self.pool.iter();
        }

        let prefix_range = self.artifact.completions.locate_prefix(&prefix, suffix_lex_range);
        let mut n = 0u32;
        if prefix_range.is_valid() {
            n = self.run_unsorted_topk(prefix_range, k, false);
        }

        if (n as usize) < k {
            if prefix.is_empty() {
                n = self.minimal_docs_topk(suffix_lex_range, k);
                self.extract_completions(n);
            } else {
                // conjunctive_general already populates completion_set as
                // it visits candidates.
                n = self.conjunctive_general(&prefix, suffix_lex_range, k);
            }
        } else {
            self.extract_completions(n);
        }
        self.extract_strings(n);
        self.pool.iter()
    }

    /// Same control flow as `topk`, additionally reporting the four-stage
    /// duration breakdown described in `§4.7`.
    pub fn topk_timed(&mut self, query: &str, k: usize) -> (PoolIter<'_>, QueryTimings) {
        Self::check_preconditions(query, k);
        self.pool.clear();
        let mut timings = QueryTimings::default();

        let t0 = Instant::now();
        let parsed = self.parse(query);
        timings.parse = t0.elapsed();

        let Some((prefix, suffix)) = parsed else {
            return (self.pool.iter(), timings);
        };

        let t1 = Instant::now();
        let suffix_lex_range = self.artifact.dictionary.locate_prefix(suffix);
        let prefix_range = if suffix_lex_range.is_valid() {
            self.artifact.completions.locate_prefix(&prefix, suffix_lex_range)
        } else {
            IdRange::INVALID
        };
        timings.lex_range_lookup = t1.elapsed();

        if suffix_lex_range.is_invalid() {
            return (self.pool.iter(), timings);
        }

        let t2 = Instant::now();
        let mut n = 0u32;
        if prefix_range.is_valid() {
            n = self.run_unsorted_topk(prefix_range, k, false);
        }
        let used_prefix_path = n as usize >= k;
        if !used_prefix_path {
            if prefix.is_empty() {
                n = self.minimal_docs_topk(suffix_lex_range, k);
            } else {
                n = self.conjunctive_general(&prefix, suffix_lex_range, k);
            }
        }
        timings.topk_retrieval = t2.elapsed();

        let t3 = Instant::now();
        if used_prefix_path {
            self.extract_completions(n);
        } else if prefix.is_empty() {
            self.extract_completions(n);
        }
        self.extract_strings(n);
        timings.materialize = t3.elapsed();

        (self.pool.iter(), timings)
    }

    fn run_unsorted_topk(&mut self, r: IdRange, k: usize, unique: bool) -> u32 {
        let scores = self.pool.scores_scratch(k);
        self.artifact.unsorted_docs_list.topk(r, k as u32, scores, unique)
    }

    /// Single-term special case (`§4.5.2` step 3): the minimal-doc-ids list
    /// is every term's posting list concatenated in dictionary order, so a
    /// suffix term range maps to the contiguous flat-array slice spanning
    /// those terms' segments (`term_offsets`, computed once in `new`).
    /// Querying that slice with RMQ top-k (unique, ascending) yields the
    /// best completions touching any term in the range.
    fn minimal_docs_topk(&mut self, suffix_lex_range: IdRange, k: usize) -> u32 {
        let array_range = IdRange::new(
            self.term_offsets[(suffix_lex_range.lo - 1) as usize],
            self.term_offsets[(suffix_lex_range.hi - 1) as usize],
        );
        let scores = self.pool.scores_scratch(k);
        self.artifact
            .unsorted_minimal_docs_list
            .topk(array_range, k as u32, scores, true)
    }

    /// General conjunctive case (`§4.5.2` step 4). Populates
    /// `completion_set`/pool scores directly (doc ids are not necessarily
    /// contiguous lex ids, so there's no separate "extract" step; the
    /// completion is reconstructed as each candidate is visited).
    fn conjunctive_general(&mut self, prefix: &[TermId], suffix_range: IdRange, k: usize) -> u32 {
        let mut dedup = prefix.to_vec();
        dedup.sort_unstable();
        dedup.dedup();

        if dedup.len() == 1 {
            let it = self.artifact.inverted_index.iterator(dedup[0]);
            self.conjunctive_scan(it, suffix_range, k)
        } else {
            let it = self.artifact.inverted_index.intersection_iterator(&dedup);
            self.conjunctive_scan(it, suffix_range, k)
        }
    }

    fn conjunctive_scan<It: DocIdIterator>(&mut self, mut it: It, r: IdRange, k: usize) -> u32 {
        self.pool.scores_scratch(k);
        let mut i = 0usize;
        let mut term_buf = [0u32; MAX_TERMS_PER_COMPLETION];
        while it.has_next() && i < k {
            let doc_id = it.current();
            let lex_id = self.artifact.docid_to_lexid.get(doc_id as usize);
            let size = self.artifact.completions.extract(lex_id, &mut term_buf);
            if term_buf[..size].iter().any(|&t| r.contains(t)) {
                self.completion_set.completion_mut(i)[..size].copy_from_slice(&term_buf[..size]);
                self.completion_set.set_size(i, size);
                self.pool.scores_mut()[i] = doc_id;
                i += 1;
            }
            it.advance();
        }
        i as u32
    }

    /// Reconstructs the term-id sequence for each of the first `n` scores
    /// (prefix-path / single-term-path results, which are doc ids whose
    /// completion hasn't been materialized into `completion_set` yet).
    fn extract_completions(&mut self, n: u32) {
        for i in 0..n as usize {
            let doc_id = self.pool.scores()[i];
            let lex_id = self.artifact.docid_to_lexid.get(doc_id as usize);
            let buf = self.completion_set.completion_mut(i);
            let size = self.artifact.completions.extract(lex_id, buf);
            self.completion_set.set_size(i, size);
        }
    }

    fn extract_strings(&mut self, n: u32) {
        let mut term_bytes = [0u8; MAX_TERM_BYTES];
        let scores: Vec<DocId> = self.pool.scores()[..n as usize].to_vec();
        self.pool.clear();
        for (i, &score) in scores.iter().enumerate() {
            let seq = self.completion_set.completion(i).to_vec();
            let mut parts: Vec<Vec<u8>> = Vec::with_capacity(seq.len());
            for &term_id in &seq {
                let len = self.artifact.dictionary.extract(term_id, &mut term_bytes);
                parts.push(term_bytes[..len].to_vec());
            }
            let refs: Vec<&[u8]> = parts.iter().map(|p| p.as_slice()).collect();
            self.pool.push_result(&refs, score);
        }
    }

}

fn split_ascii_whitespace_keep_trailing_empty(query: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start: Option<usize> = None;
    for (i, b) in query.bytes().enumerate() {
        if b.is_ascii_whitespace() {
            if let Some(s) = start.take() {
                parts.push(&query[s..i]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    match start {
        Some(s) => parts.push(&query[s..]),
        None => parts.push(""),
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::split_ascii_whitespace_keep_trailing_empty as split;

    #[test]
    fn keeps_trailing_empty_suffix_on_trailing_whitespace() {
        assert_eq!(split("the cat "), vec!["the", "cat", ""]);
    }

    #[test]
    fn empty_query_is_a_single_empty_token() {
        assert_eq!(split(""), vec![""]);
    }

    #[test]
    fn collapses_runs_of_whitespace() {
        assert_eq!(split("the   cat"), vec!["the", "cat"]);
    }

    #[test]
    fn single_token_has_no_prefix() {
        assert_eq!(split("dog"), vec!["dog"]);
    }
}
