//! Offline builder (`§4.8`).
//!
//! Turns `<score> <completion text>` lines, pre-sorted by ascending score,
//! into a frozen `IndexArtifact`. Doc ids are assigned as input order;
//! the builder only validates that order, it never re-sorts by score
//! (`§3`: score is implicit in doc_id).

use std::collections::BTreeSet;

use crate::compact_vector::CompactVector;
use crate::completions::CompletionsStore;
use crate::dictionary::TermDictionary;
use crate::engine::IndexArtifact;
use crate::error::AutocompleteError;
use crate::ids::TermId;
use crate::rmq::RangeMinimumQuery;
use crate::seq::IntSequence;
use crate::unsorted_list::UnsortedList;

/// Builds an `IndexArtifact<C, S, R, D>` from corpus lines. Generic over
/// the same four component slots as the engine (`§9`, "Generic component
/// slots") so an embedder building against a custom `CompletionsStore` or
/// `TermDictionary` gets the same builder for free.
pub struct Builder;

impl Builder {
    /// `lines` are `<score> <completion text>`, ascending by score.
    /// Tokenization is ASCII-whitespace, same as query parsing (`§4.5.4`).
    pub fn from_lines<'a, C, S, R, D>(
        lines: impl Iterator<Item = &'a str>,
    ) -> Result<IndexArtifact<C, S, R, D>, AutocompleteError>
    where
        C: CompletionsStore,
        S: IntSequence,
        R: RangeMinimumQuery,
        D: TermDictionary,
    {
        let mut completions: Vec<Vec<&'a str>> = Vec::new();
        let mut previous_score: Option<u64> = None;

        for (line_no, line) in lines.enumerate() {
            let line = line.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                continue;
            }
            let (score_str, text) = line.split_once(char::is_whitespace).ok_or_else(|| {
                AutocompleteError::MalformedLine {
                    line_no,
                    reason: "expected `<score> <completion text>`".to_string(),
                }
            })?;
            let score: u64 = score_str
                .parse()
                .map_err(|_| AutocompleteError::MalformedLine {
                    line_no,
                    reason: format!("`{score_str}` is not a valid score"),
                })?;
            if let Some(previous) = previous_score {
                if score < previous {
                    return Err(AutocompleteError::UnsortedInput {
                        line_no,
                        score,
                        previous,
                    });
                }
            }
            previous_score = Some(score);

            let terms: Vec<&str> = text.split_ascii_whitespace().collect();
            if terms.is_empty() {
                return Err(AutocompleteError::MalformedLine {
                    line_no,
                    reason: "completion text has no terms".to_string(),
                });
            }
            completions.push(terms);
        }

        let n = completions.len();

        // 1. Distinct term strings, sorted; term_id 1..=T in that order.
        let mut distinct_terms: BTreeSet<&str> = BTreeSet::new();
        for terms in &completions {
            distinct_terms.extend(terms.iter().copied());
        }
        let sorted_terms: Vec<String> = distinct_terms.into_iter().map(str::to_string).collect();
        let dictionary = D::build(&sorted_terms);

        // 2. Map every completion (doc_id = input order) to its term-id
        // sequence.
        let doc_sequences: Vec<Vec<TermId>> = completions
            .iter()
            .map(|terms| {
                terms
                    .iter()
                    .map(|t| dictionary.term_id(t.as_bytes()).expect("term was just inserted"))
                    .collect()
            })
            .collect();

        // 3. lex_id permutation: doc_ids sorted by term-id sequence.
        let mut doc_ids_by_lex: Vec<u32> = (0..n as u32).collect();
        doc_ids_by_lex.sort_by(|&a, &b| doc_sequences[a as usize].cmp(&doc_sequences[b as usize]));
        let mut docid_to_lexid_raw = vec![0u32; n];
        for (lex_id, &doc_id) in doc_ids_by_lex.iter().enumerate() {
            docid_to_lexid_raw[doc_id as usize] = lex_id as u32;
        }
        let bits_per_entry = CompactVector::bit_width(n as u32);
        let docid_to_lexid = CompactVector::build(&docid_to_lexid_raw, bits_per_entry);

        // 4. Completions trie over the lex-sorted sequences.
        let lex_sequences: Vec<Vec<TermId>> = doc_ids_by_lex
            .iter()
            .map(|&doc_id| doc_sequences[doc_id as usize].clone())
            .collect();
        let completions_store = C::build(&lex_sequences);

        // 6. One posting list per term id.
        let num_terms = sorted_terms.len();
        let mut postings: Vec<Vec<u32>> = vec![Vec::new(); num_terms];
        for (doc_id, seq) in doc_sequences.iter().enumerate() {
            let doc_id = doc_id as u32;
            let mut seen: Vec<TermId> = seq.clone();
            seen.sort_unstable();
            seen.dedup();
            for term_id in seen {
                postings[term_id as usize - 1].push(doc_id);
            }
        }
        // The minimal-doc-ids list is every term's posting list (already
        // ascending doc_id, i.e. best-score-first) concatenated in
        // dictionary order. A suffix term range therefore maps to a
        // contiguous slice of this array, the concatenation of those
        // terms' posting lists, so an RMQ top-k over it, with `unique`
        // set, yields the best completions touching *any* term in the
        // range (`§4.5.2`'s single-term special case; `TopKEngine`
        // recomputes the per-term segment boundaries from
        // `InvertedIndex::posting_lens` at construction).
        let minimal_docs: Vec<u32> = postings.iter().flatten().copied().collect();
        let inverted_index = crate::inverted_index::InvertedIndex::build(postings);

        // 7. The two UnsortedLists: one over lexid->docid (so a lex range
        // query returns doc ids, the score-rank values), one over the
        // concatenated per-term posting lists above.
        let unsorted_docs_list = UnsortedList::<S, R>::build(&doc_ids_by_lex);
        let unsorted_minimal_docs_list = UnsortedList::<S, R>::build(&minimal_docs);

        Ok(IndexArtifact {
            completions: completions_store,
            unsorted_docs_list,
            unsorted_minimal_docs_list,
            dictionary,
            inverted_index,
            docid_to_lexid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DefaultArtifact;

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
    fn builds_expected_completion_count() {
        assert_eq!(toy().num_completions(), 5);
    }

    #[test]
    fn docid_to_lexid_is_a_permutation() {
        let artifact = toy();
        let n = artifact.num_completions();
        let mut seen = vec![false; n];
        for doc_id in 0..n {
            let lex_id = artifact.docid_to_lexid.get(doc_id);
            assert!(!seen[lex_id as usize], "lex_id {lex_id} seen twice");
            seen[lex_id as usize] = true;
        }
    }

    #[test]
    fn rejects_out_of_order_scores() {
        let lines = ["1 the cat", "0 the dog"];
        let err =
            Builder::from_lines::<crate::completions::CompletionsTrie, crate::seq::PlainSequence, crate::rmq::SparseTableRmq, crate::dictionary::Dictionary>(
                lines.into_iter(),
            )
            .unwrap_err();
        assert!(matches!(err, AutocompleteError::UnsortedInput { .. }));
    }

    #[test]
    fn rejects_malformed_line() {
        let lines = ["not-a-score cat dog"];
        let err =
            Builder::from_lines::<crate::completions::CompletionsTrie, crate::seq::PlainSequence, crate::rmq::SparseTableRmq, crate::dictionary::Dictionary>(
                lines.into_iter(),
            )
            .unwrap_err();
        assert!(matches!(err, AutocompleteError::MalformedLine { .. }));
    }
}
