//! Range-minimum query (`§4.1`).
//!
//! Answers "position of the smallest value in `L[l..=r]`" in O(1) after an
//! O(n log n) preprocessing pass, using the classic sparse table over
//! overlapping power-of-two blocks. Ties are broken toward the leftmost
//! position, which is what `less<id_type>` meant in the distilled spec:
//! ids (doc ids / scores) are unique in practice, so the tie-break never
//! actually matters for correctness, but fixing it makes `rmq` deterministic.

/// A structure answering range-minimum queries over a fixed `Vec<u32>`.
///
/// Implementations are expected to be built once, at load, and never
/// mutated afterward; see the `UnsortedList` invariant in `§3`.
pub trait RangeMinimumQuery {
    /// Builds the structure over `values`, ready to answer `rmq` calls.
    fn build(values: &[u32]) -> Self;

    /// Returns the index of the minimum value in `values[lo..=hi]`.
    ///
    /// `lo <= hi` and both are valid indices into the array this was built
    /// over; callers (the `UnsortedList` traversal) never query an empty
    /// range.
    fn rmq(&self, lo: u32, hi: u32) -> u32;

    fn bytes(&self) -> usize;
}

/// Sparse-table RMQ: `table[k][i]` holds the position of the minimum of the
/// length-`2^k` block starting at `i`.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct SparseTableRmq {
    values: Vec<u32>,
    // table[k] has length values.len() - 2^k + 1
    table: Vec<Vec<u32>>,
}

impl SparseTableRmq {
    fn log2_floor(n: u32) -> u32 {
        31 - n.leading_zeros()
    }

    #[inline]
    fn better(&self, a: u32, b: u32) -> u32 {
        if self.values[b as usize] < self.values[a as usize] {
            b
        } else {
            a
        }
    }
}

impl RangeMinimumQuery for SparseTableRmq {
    fn build(values: &[u32]) -> Self {
        let n = values.len();
        let mut rmq = SparseTableRmq {
            values: values.to_vec(),
            table: Vec::new(),
        };
        if n == 0 {
            return rmq;
        }
        let levels = Self::log2_floor(n as u32) as usize + 1;
        rmq.table.reserve(levels);
        // level 0: the minimum of a length-1 block is itself
        rmq.table.push((0..n as u32).collect());
        for k in 1..levels {
            let half = 1u32 << (k - 1);
            let len = n - (1 << k) + 1;
            let mut level = Vec::with_capacity(len);
            for i in 0..len as u32 {
                let left = rmq.table[k - 1][i as usize];
                let right = rmq.table[k - 1][(i + half) as usize];
                level.push(rmq.better(left, right));
            }
            rmq.table.push(level);
        }
        rmq
    }

    fn rmq(&self, lo: u32, hi: u32) -> u32 {
        debug_assert!(lo <= hi);
        debug_assert!((hi as usize) < self.values.len());
        let len = hi - lo + 1;
        let k = Self::log2_floor(len) as usize;
        let half = 1u32 << k;
        let left = self.table[k][lo as usize];
        let right = self.table[k][(hi + 1 - half) as usize];
        self.better(left, right)
    }

    fn bytes(&self) -> usize {
        self.values.len() * std::mem::size_of::<u32>()
            + self
                .table
                .iter()
                .map(|level| level.len() * std::mem::size_of::<u32>())
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force_rmq(values: &[u32], lo: u32, hi: u32) -> u32 {
        let mut best = lo;
        for i in lo..=hi {
            if values[i as usize] < values[best as usize] {
                best = i;
            }
        }
        best
    }

    #[test]
    fn matches_brute_force_over_all_ranges() {
        let values: Vec<u32> = vec![5, 2, 8, 1, 9, 3, 7, 0, 4, 6];
        let rmq = SparseTableRmq::build(&values);
        for lo in 0..values.len() as u32 {
            for hi in lo..values.len() as u32 {
                let expected = brute_force_rmq(&values, lo, hi);
                let got = rmq.rmq(lo, hi);
                assert_eq!(
                    values[got as usize], values[expected as usize],
                    "lo={lo} hi={hi}"
                );
            }
        }
    }

    #[test]
    fn single_element_range() {
        let values = vec![42u32];
        let rmq = SparseTableRmq::build(&values);
        assert_eq!(rmq.rmq(0, 0), 0);
    }
}
