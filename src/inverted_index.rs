//! Inverted index (`§4.4`).
//!
//! Per term id, an ascending, duplicate-free posting list of doc ids.
//! `iterator` is a plain scan; `intersection_iterator` merges several
//! lists with the shortest-list-leads gallop strategy, probing each other
//! list with exponential-then-binary search for every leader candidate.

use crate::ids::{DocId, TermId};

pub trait DocIdIterator {
    fn has_next(&self) -> bool;
    fn current(&self) -> DocId;
    fn advance(&mut self);
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct InvertedIndex {
    // indexed by term_id - 1
    postings: Vec<Vec<DocId>>,
}

impl InvertedIndex {
    /// `postings[i]` is the ascending, duplicate-free posting list for
    /// `term_id = i + 1`.
    pub fn build(postings: Vec<Vec<DocId>>) -> Self {
        debug_assert!(postings
            .iter()
            .all(|list| list.windows(2).all(|w| w[0] < w[1])));
        InvertedIndex { postings }
    }

    pub fn num_terms(&self) -> usize {
        self.postings.len()
    }

    /// Length of the posting list for each term id, in dictionary order
    /// (`term_id = i + 1`). Used to lay out the minimal-doc-ids flat array
    /// (`§4.5.2`'s single-term special case): that array is the
    /// concatenation of every term's posting list in this same order, so
    /// its term-indexed segment boundaries are the prefix sums of these
    /// lengths.
    pub fn posting_lens(&self) -> impl Iterator<Item = usize> + '_ {
        self.postings.iter().map(|l| l.len())
    }

    pub fn bytes(&self) -> usize {
        self.postings
            .iter()
            .map(|l| l.len() * std::mem::size_of::<DocId>())
            .sum()
    }

    fn posting_list(&self, term_id: TermId) -> &[DocId] {
        &self.postings[term_id as usize - 1]
    }

    pub fn iterator(&self, term_id: TermId) -> PostingListIterator<'_> {
        PostingListIterator {
            list: self.posting_list(term_id),
            pos: 0,
        }
    }

    /// `term_ids` is deduplicated internally (`§4.4`).
    pub fn intersection_iterator(&self, term_ids: &[TermId]) -> IntersectionIterator<'_> {
        let mut dedup: Vec<TermId> = term_ids.to_vec();
        dedup.sort_unstable();
        dedup.dedup();

        let mut lists: Vec<&[DocId]> = dedup.iter().map(|&t| self.posting_list(t)).collect();
        lists.sort_by_key(|l| l.len());

        let mut it = IntersectionIterator {
            leader: lists[0],
            leader_pos: 0,
            others: lists[1..].to_vec(),
            exhausted: lists[0].is_empty(),
        };
        it.seek_to_match();
        it
    }
}

pub struct PostingListIterator<'a> {
    list: &'a [DocId],
    pos: usize,
}

impl DocIdIterator for PostingListIterator<'_> {
    fn has_next(&self) -> bool {
        self.pos < self.list.len()
    }
    fn current(&self) -> DocId {
        self.list[self.pos]
    }
    fn advance(&mut self) {
        self.pos += 1;
    }
}

pub struct IntersectionIterator<'a> {
    leader: &'a [DocId],
    leader_pos: usize,
    others: Vec<&'a [DocId]>,
    exhausted: bool,
}

/// Exponential search followed by binary search for `target` in `list`,
/// starting from `from`. Returns the index of `target` if present, else the
/// index of the first element greater than `target`.
fn gallop_search(list: &[DocId], from: usize, target: DocId) -> usize {
    if from >= list.len() || list[from] >= target {
        return from;
    }
    let mut bound = 1;
    let mut prev = from;
    while from + bound < list.len() && list[from + bound] < target {
        prev = from + bound;
        bound *= 2;
    }
    let lo = prev;
    let hi = (from + bound).min(list.len());
    lo + list[lo..hi].partition_point(|&v| v < target)
}

impl<'a> IntersectionIterator<'a> {
    /// Advances `leader_pos` until every `others` list agrees on the same
    /// doc id, or the leader is exhausted.
    fn seek_to_match(&mut self) {
        'outer: loop {
            if self.leader_pos >= self.leader.len() {
                self.exhausted = true;
                return;
            }
            let candidate = self.leader[self.leader_pos];
            for other in &mut self.others {
                let pos = gallop_search(other, 0, candidate);
                if pos >= other.len() || other[pos] != candidate {
                    *other = &other[pos.min(other.len())..];
                    self.leader_pos += 1;
                    continue 'outer;
                }
                *other = &other[pos..];
            }
            return;
        }
    }
}

impl DocIdIterator for IntersectionIterator<'_> {
    fn has_next(&self) -> bool {
        !self.exhausted && self.leader_pos < self.leader.len()
    }

    fn current(&self) -> DocId {
        self.leader[self.leader_pos]
    }

    fn advance(&mut self) {
        self.leader_pos += 1;
        self.seek_to_match();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> InvertedIndex {
        // term ids: cat=1 dog=2 fast=3 food=4 ran=5 sat=6 the=7
        InvertedIndex::build(vec![
            vec![0, 1, 4], // cat
            vec![2, 3],    // dog
            vec![3],       // fast
            vec![4],       // food
            vec![1, 3],    // ran
            vec![0],       // sat
            vec![0, 1, 2, 3], // the
        ])
    }

    fn collect<I: DocIdIterator>(mut it: I) -> Vec<DocId> {
        let mut out = Vec::new();
        while it.has_next() {
            out.push(it.current());
            it.advance();
        }
        out
    }

    #[test]
    fn iterator_scans_single_posting_list() {
        let idx = index();
        assert_eq!(collect(idx.iterator(1)), vec![0, 1, 4]);
    }

    #[test]
    fn intersection_matches_ran_and_the() {
        let idx = index();
        // ran=5, the=7 -> {1,3} ∩ {0,1,2,3} = {1,3}
        let got = collect(idx.intersection_iterator(&[5, 7]));
        assert_eq!(got, vec![1, 3]);
    }

    #[test]
    fn intersection_with_duplicated_term_ids_dedupes() {
        let idx = index();
        let got = collect(idx.intersection_iterator(&[1, 1, 1]));
        assert_eq!(got, vec![0, 1, 4]);
    }

    #[test]
    fn intersection_of_disjoint_lists_is_empty() {
        let idx = index();
        // sat=6, food=4 -> {0} ∩ {4} = {}
        assert_eq!(collect(idx.intersection_iterator(&[6, 4])), Vec::<DocId>::new());
    }

    #[test]
    fn three_way_intersection() {
        let idx = index();
        // cat=1 {0,1,4}, the=7 {0,1,2,3}, dog=2 {2,3} -> {} since cat doesn't share with dog
        assert_eq!(
            collect(idx.intersection_iterator(&[1, 7, 2])),
            Vec::<DocId>::new()
        );
    }
}
