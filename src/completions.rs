//! Completions trie (`§4.3`).
//!
//! Stores the N completions as term-id sequences sorted lexicographically
//! (lex_id = index). A trie over term ids, not characters, indexes this
//! array for `locate_prefix`; the array itself remains the storage of
//! record, so `extract` is a direct index.
//!
//! Node layout mirrors a standard descendant-range trie: each node records
//! the pre-order range of its whole subtree (`descendant_range`), so direct
//! children can be walked one subtree-width jump at a time without a
//! separate child list per node. Because the edge label here is an
//! integer `term_id` rather than a `char`, finding the boundary of a run of
//! siblings sharing a label is a single `partition_point`; no
//! successor-character bookkeeping is needed, since `term_id + 1` is always
//! the next possible label.

use crate::ids::{IdRange, TermId};

pub trait CompletionsStore {
    /// Builds the store from `sequences`, which must already be sorted
    /// lexicographically (as `Vec<TermId>`); this *is* the lex_id order.
    fn build(sequences: &[Vec<TermId>]) -> Self;

    /// Completions whose first `prefix.len()` term ids equal `prefix` and
    /// whose next term id falls in `suffix_term_range`. `prefix` empty
    /// matches everything on the prefix test. `IdRange::INVALID` if no
    /// completion matches.
    fn locate_prefix(&self, prefix: &[TermId], suffix_term_range: IdRange) -> IdRange;

    /// Writes the term-id sequence for `lex_id` into `out`, returning its
    /// length.
    fn extract(&self, lex_id: u32, out: &mut [TermId]) -> usize;

    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn bytes(&self) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
struct Node {
    /// Edge label from the parent; 0 on the (unused) root.
    term_id: TermId,
    /// Number of terms consumed to reach this node.
    depth: u8,
    /// Pre-order range of this node's whole subtree, `nodes[id+1..end]`.
    descendant_range: std::ops::Range<u32>,
    /// Range of lex_ids of completions whose path passes through this node.
    lex_range: std::ops::Range<u32>,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct CompletionsTrie {
    nodes: Vec<Node>,
    sequences: Vec<Vec<TermId>>,
}

/// Key used to sort/partition sequences at a given depth: a completion that
/// has already ended by `depth` sorts as if its next term were `0`, which
/// matches `Vec<TermId>`'s own `Ord` (a prefix sorts before any extension).
#[inline]
fn key_at(seq: &[TermId], depth: u8) -> TermId {
    seq.get(depth as usize).copied().unwrap_or(0)
}

impl CompletionsTrie {
    fn init_nodes(
        nodes: &mut Vec<Node>,
        sequences: &[Vec<TermId>],
        node_id: &mut u32,
        depth: u8,
        term_id: TermId,
        lex_start: u32,
        lex_end: u32,
    ) {
        let current_id = *node_id;
        nodes.push(Node {
            term_id,
            depth,
            descendant_range: 0..0,
            lex_range: lex_start..lex_end,
        });
        *node_id += 1;

        let mut child_start = lex_start;
        while child_start != lex_end {
            let label = key_at(&sequences[child_start as usize], depth);
            let run = sequences[child_start as usize..lex_end as usize]
                .partition_point(|s| key_at(s, depth) <= label);
            let child_end = child_start + run as u32;
            Self::init_nodes(nodes, sequences, node_id, depth + 1, label, child_start, child_end);
            child_start = child_end;
        }

        nodes[current_id as usize].descendant_range = current_id + 1..*node_id;
    }

    /// Iterates the direct children of `node`, each one subtree-width jump
    /// apart, sorted ascending by `term_id` (the construction order).
    fn children(&self, node: &Node) -> impl Iterator<Item = &Node> + '_ {
        let end = node.descendant_range.end;
        let mut id = node.descendant_range.start;
        std::iter::from_fn(move || {
            if id >= end {
                return None;
            }
            let n = &self.nodes[id as usize];
            id = n.descendant_range.end;
            Some(n)
        })
    }

    fn find_child(&self, node: &Node, term_id: TermId) -> Option<&Node> {
        for child in self.children(node) {
            if child.term_id == term_id {
                return Some(child);
            }
            if child.term_id > term_id {
                break;
            }
        }
        None
    }
}

impl CompletionsStore for CompletionsTrie {
    fn build(sequences: &[Vec<TermId>]) -> Self {
        debug_assert!(
            sequences.windows(2).all(|w| w[0] <= w[1]),
            "completions must be sorted lexicographically by term-id sequence"
        );
        let mut nodes = Vec::with_capacity(sequences.len() * 2 + 1);
        let mut node_id = 0u32;
        Self::init_nodes(&mut nodes, sequences, &mut node_id, 0, 0, 0, sequences.len() as u32);
        CompletionsTrie {
            nodes,
            sequences: sequences.to_vec(),
        }
    }

    fn locate_prefix(&self, prefix: &[TermId], suffix_term_range: IdRange) -> IdRange {
        if self.nodes.is_empty() {
            return IdRange::INVALID;
        }
        let mut node = &self.nodes[0];
        for &term_id in prefix {
            match self.find_child(node, term_id) {
                Some(child) => node = child,
                None => return IdRange::INVALID,
            }
        }

        let mut lo = None;
        let mut hi = None;
        for child in self.children(node) {
            if suffix_term_range.contains(child.term_id) {
                if lo.is_none() {
                    lo = Some(child.lex_range.start);
                }
                hi = Some(child.lex_range.end);
            } else if hi.is_some() {
                // children are ordered ascending by term_id, so once we've
                // left the matching run we're done.
                break;
            }
        }

        match (lo, hi) {
            (Some(lo), Some(hi)) if lo < hi => IdRange::new(lo, hi),
            _ => IdRange::INVALID,
        }
    }

    fn extract(&self, lex_id: u32, out: &mut [TermId]) -> usize {
        let seq = &self.sequences[lex_id as usize];
        out[..seq.len()].copy_from_slice(seq);
        seq.len()
    }

    fn len(&self) -> usize {
        self.sequences.len()
    }

    fn bytes(&self) -> usize {
        self.nodes.len() * std::mem::size_of::<Node>()
            + self
                .sequences
                .iter()
                .map(|s| s.len() * std::mem::size_of::<TermId>())
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Toy corpus from the spec, term ids: cat=1 dog=2 fast=3 food=4 ran=5 sat=6 the=7
    // doc_id : completion
    // 0 : the cat sat   -> [7,1,6]
    // 1 : the cat ran   -> [7,1,5]
    // 2 : the dog       -> [7,2]
    // 3 : the dog ran fast -> [7,2,5,3]
    // 4 : cat food      -> [1,4]
    fn toy_trie() -> (CompletionsTrie, Vec<Vec<TermId>>) {
        let mut sequences = vec![
            vec![7, 1, 6],
            vec![7, 1, 5],
            vec![7, 2],
            vec![7, 2, 5, 3],
            vec![1, 4],
        ];
        sequences.sort();
        let trie = CompletionsTrie::build(&sequences);
        (trie, sequences)
    }

    #[test]
    fn locate_prefix_the_c_matches_cat_branch() {
        let (trie, sequences) = toy_trie();
        // prefix = [the=7], suffix range = terms starting with "c" = [cat=1,cat=1] -> [1,2)
        let r = trie.locate_prefix(&[7], IdRange::new(1, 2));
        assert!(r.is_valid());
        for lex in r.lo..r.hi {
            assert_eq!(sequences[lex as usize][0], 7);
            assert_eq!(sequences[lex as usize][1], 1);
        }
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn locate_prefix_the_matches_all_the_rows() {
        let (trie, sequences) = toy_trie();
        // prefix = [], suffix range = terms starting with "the" = [the=7,the=7] -> [7,8)
        let r = trie.locate_prefix(&[], IdRange::new(7, 8));
        assert!(r.is_valid());
        assert_eq!(r.len(), 4);
        for lex in r.lo..r.hi {
            assert_eq!(sequences[lex as usize][0], 7);
        }
    }

    #[test]
    fn unmatched_prefix_is_invalid() {
        let (trie, _) = toy_trie();
        assert!(trie.locate_prefix(&[4], IdRange::new(1, 8)).is_invalid());
    }

    #[test]
    fn extract_returns_full_sequence() {
        let (trie, sequences) = toy_trie();
        let mut out = vec![0u32; 8];
        for (lex, seq) in sequences.iter().enumerate() {
            let n = trie.extract(lex as u32, &mut out);
            assert_eq!(&out[..n], seq.as_slice());
        }
    }
}
