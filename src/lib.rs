//! Top-k query autocompletion over a frozen, scored completion corpus.
//!
//! Given a user's partially typed query, zero or more completed terms
//! followed by a possibly-incomplete final term, this crate answers
//! "what are the `k` highest-scored completions consistent with what's
//! typed so far" with sub-millisecond latency on corpora of tens of
//! millions of completions, by reducing "top-k by score" to "top-k
//! smallest integer in a contiguous array range" ([`unsorted_list`]) over
//! indexes built once, offline, from a frozen corpus.
//!
//! # Layout
//!
//! - [`seq`] / [`rmq`] / [`unsorted_list`]: the RMQ-driven top-k primitive.
//! - [`dictionary`]: term text ↔ term id.
//! - [`completions`]: the trie over term-id sequences.
//! - [`inverted_index`]: per-term posting lists and intersection iteration.
//! - [`compact_vector`]: the bit-packed docid→lexid permutation.
//! - [`engine`]: [`engine::TopKEngine`], which orchestrates all of the
//!   above into the three query entry points.
//! - [`builder`]: offline corpus ingestion into an [`engine::IndexArtifact`].
//! - [`artifact`]: the artifact's binary (de)serialization.
//!
//! # Example
//!
//! ```
//! use autocomplete_topk::{Builder, DefaultArtifact, TopKEngine};
//!
//! let artifact: DefaultArtifact = Builder::from_lines(
//!     ["0 the cat sat", "1 the cat ran", "2 the dog"].into_iter(),
//! )
//! .unwrap();
//! let mut engine = TopKEngine::new(&artifact);
//! let results: Vec<_> = engine.prefix_topk("the c", 2).map(|r| r.text.to_string()).collect();
//! assert_eq!(results, vec!["the cat ran", "the cat sat"]);
//! ```

pub mod artifact;
pub mod builder;
pub mod compact_vector;
pub mod completions;
pub mod constants;
pub mod dictionary;
pub mod engine;
pub mod error;
pub mod ids;
pub mod inverted_index;
pub mod pool;
pub mod rmq;
pub mod seq;
pub mod unsorted_list;

pub use builder::Builder;
pub use engine::{IndexArtifact, TopKEngine};
pub use error::AutocompleteError;

/// The concrete `IndexArtifact` instantiation this crate ships: a plain
/// `Vec<u32>` integer sequence, a sparse-table RMQ, a trie-backed
/// completions store, and a sorted-array dictionary. The four component
/// traits (`§9`, "Generic component slots") stay swappable for an embedder
/// that wants a compressed encoding; this alias is what `build`/`query` in
/// the CLI and the benches use.
pub type DefaultArtifact = IndexArtifact<
    completions::CompletionsTrie,
    seq::PlainSequence,
    rmq::SparseTableRmq,
    dictionary::Dictionary,
>;

/// The engine type over [`DefaultArtifact`].
pub type DefaultEngine<'i> = TopKEngine<
    'i,
    completions::CompletionsTrie,
    seq::PlainSequence,
    rmq::SparseTableRmq,
    dictionary::Dictionary,
>;

#[cfg(test)]
mod tests {
    use super::*;

    const TOY_CORPUS: [&str; 5] = [
        "0 the cat sat",
        "1 the cat ran",
        "2 the dog",
        "3 the dog ran fast",
        "4 cat food",
    ];

    fn toy() -> DefaultArtifact {
        Builder::from_lines(TOY_CORPUS.into_iter()).unwrap()
    }

    #[test]
    fn prefix_topk_the_c() {
        let artifact = toy();
        let mut engine = TopKEngine::new(&artifact);
        let got: Vec<String> = engine.prefix_topk("the c", 2).map(|r| r.text.to_string()).collect();
        assert_eq!(got, vec!["the cat ran", "the cat sat"]);
    }

    #[test]
    fn prefix_topk_the() {
        let artifact = toy();
        let mut engine = TopKEngine::new(&artifact);
        let got: Vec<String> = engine.prefix_topk("the", 3).map(|r| r.text.to_string()).collect();
        assert_eq!(got, vec!["the cat sat", "the cat ran", "the dog"]);
    }

    #[test]
    fn conjunctive_topk_ran_the() {
        let artifact = toy();
        let mut engine = TopKEngine::new(&artifact);
        let got: Vec<String> = engine
            .conjunctive_topk("ran the", 2)
            .map(|r| r.text.to_string())
            .collect();
        assert_eq!(got, vec!["the cat ran", "the dog ran fast"]);
    }

    #[test]
    fn conjunctive_topk_single_term_dog() {
        let artifact = toy();
        let mut engine = TopKEngine::new(&artifact);
        let got: Vec<String> = engine
            .conjunctive_topk("dog", 5)
            .map(|r| r.text.to_string())
            .collect();
        assert_eq!(got, vec!["the dog", "the dog ran fast"]);
    }

    #[test]
    fn topk_unknown_final_term_is_empty() {
        let artifact = toy();
        let mut engine = TopKEngine::new(&artifact);
        let got: Vec<String> = engine.topk("the x", 2).map(|r| r.text.to_string()).collect();
        assert!(got.is_empty());
    }

    #[test]
    fn prefix_topk_empty_query_returns_everything_ascending() {
        let artifact = toy();
        let mut engine = TopKEngine::new(&artifact);
        let got: Vec<u32> = engine.prefix_topk("", 10).map(|r| r.score).collect();
        assert_eq!(got, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn topk_falls_back_to_conjunctive_when_prefix_path_is_short() {
        let artifact = toy();
        let mut engine = TopKEngine::new(&artifact);
        // "ran" alone as a final (incomplete) term: prefix path has no
        // completed terms before it, so it's really a suffix-only prefix
        // lookup; exercise the fallback path with a query guaranteed to
        // need the conjunctive general case to fill out results.
        let got: Vec<String> = engine.topk("dog ran", 5).map(|r| r.text.to_string()).collect();
        assert_eq!(got, vec!["the dog ran fast"]);
    }

    #[test]
    fn unknown_non_final_term_yields_empty_result() {
        let artifact = toy();
        let mut engine = TopKEngine::new(&artifact);
        let got: Vec<String> = engine
            .prefix_topk("nope cat", 3)
            .map(|r| r.text.to_string())
            .collect();
        assert!(got.is_empty());
    }
}
