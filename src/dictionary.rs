//! Dictionary (`§4.2`): term text ↔ term id.
//!
//! Terms are stored rank-indexed: `term_id t` (`t >= 1`) lives at array
//! index `t - 1`. Because term ids are assigned in lexicographic order of
//! term text (`§3`), "all terms beginning with this byte prefix" is always
//! a contiguous range, recoverable with two binary searches.

use crate::ids::IdRange;

pub trait TermDictionary {
    /// Builds the dictionary from `terms`, which must already be sorted and
    /// deduplicated; `terms[i]` is assigned `term_id i + 1`.
    fn build(terms: &[String]) -> Self;

    /// Range of term ids (inclusive) whose text begins with `prefix`.
    /// `IdRange::INVALID` if nothing matches. An empty `prefix` locates the
    /// full dictionary range.
    fn locate_prefix(&self, prefix: &[u8]) -> IdRange;

    /// The id of the term whose text is exactly `text`, if any. Used to
    /// resolve a query's non-final, whole-word tokens.
    fn term_id(&self, text: &[u8]) -> Option<u32>;

    /// Writes the text of `term_id` into `out`, returning the number of
    /// bytes written. `term_id` must be in `[1, num_terms()]`.
    fn extract(&self, term_id: u32, out: &mut [u8]) -> usize;

    fn num_terms(&self) -> usize;

    fn bytes(&self) -> usize;
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Dictionary {
    // rank-sorted term text; terms[i] is term_id i+1.
    terms: Vec<String>,
}

impl Dictionary {
    /// The lexicographically-next byte string after `prefix`, used as the
    /// exclusive upper bound for the prefix range. `None` if `prefix` is
    /// the all-0xFF string (no successor), which locates everything from
    /// the lower bound to the end of the dictionary.
    fn successor(prefix: &[u8]) -> Option<Vec<u8>> {
        let mut succ = prefix.to_vec();
        while let Some(&last) = succ.last() {
            if last == 0xFF {
                succ.pop();
            } else {
                *succ.last_mut().unwrap() += 1;
                return Some(succ);
            }
        }
        None
    }
}

impl TermDictionary for Dictionary {
    fn build(terms: &[String]) -> Self {
        debug_assert!(
            terms.windows(2).all(|w| w[0] < w[1]),
            "dictionary terms must be sorted and deduplicated"
        );
        Dictionary {
            terms: terms.to_vec(),
        }
    }

    fn locate_prefix(&self, prefix: &[u8]) -> IdRange {
        // 0-based [lo, hi) over `self.terms`; shifting by 1 turns it into
        // the term-id half-open range, since term_id i+1 lives at index i.
        let lo = self.terms.partition_point(|t| t.as_bytes() < prefix);
        let hi = match Self::successor(prefix) {
            Some(succ) => self.terms.partition_point(|t| t.as_bytes() < succ.as_slice()),
            None => self.terms.len(),
        };
        if lo >= hi {
            IdRange::INVALID
        } else {
            IdRange::new(lo as u32 + 1, hi as u32 + 1)
        }
    }

    fn term_id(&self, text: &[u8]) -> Option<u32> {
        self.terms
            .binary_search_by(|t| t.as_bytes().cmp(text))
            .ok()
            .map(|idx| idx as u32 + 1)
    }

    fn extract(&self, term_id: u32, out: &mut [u8]) -> usize {
        let bytes = self.terms[term_id as usize - 1].as_bytes();
        out[..bytes.len()].copy_from_slice(bytes);
        bytes.len()
    }

    fn num_terms(&self) -> usize {
        self.terms.len()
    }

    fn bytes(&self) -> usize {
        self.terms.iter().map(|t| t.len()).sum::<usize>()
            + self.terms.len() * std::mem::size_of::<String>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict() -> Dictionary {
        Dictionary::build(&[
            "cat".to_string(),
            "dog".to_string(),
            "fast".to_string(),
            "food".to_string(),
            "ran".to_string(),
            "sat".to_string(),
            "the".to_string(),
        ])
    }

    #[test]
    fn locates_exact_prefix_range() {
        let d = dict();
        // term ids: cat=1 dog=2 fast=3 food=4 ran=5 sat=6 the=7
        assert_eq!(d.locate_prefix(b"fa"), IdRange::new(3, 4));
        assert_eq!(d.locate_prefix(b"f"), IdRange::new(3, 5));
        assert_eq!(d.locate_prefix(b"the"), IdRange::new(7, 8));
        assert_eq!(d.locate_prefix(b""), IdRange::new(1, 8));
    }

    #[test]
    fn unknown_prefix_is_invalid() {
        let d = dict();
        assert!(d.locate_prefix(b"zzz").is_invalid());
    }

    #[test]
    fn term_id_resolves_exact_matches_only() {
        let d = dict();
        assert_eq!(d.term_id(b"food"), Some(4));
        assert_eq!(d.term_id(b"fo"), None);
        assert_eq!(d.term_id(b"foodie"), None);
    }

    #[test]
    fn extract_round_trips() {
        let d = dict();
        let mut buf = [0u8; 16];
        let n = d.extract(4, &mut buf);
        assert_eq!(&buf[..n], b"food");
    }
}
