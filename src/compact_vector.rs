//! Fixed-width compact array (`§3`, "docid→lexid").
//!
//! `docid_to_lexid` is a permutation of `[0, N)`, so every entry fits in
//! `ceil(log2(N+1))` bits rather than a full `u32`. This is a small
//! bit-packed vector over `u64` words, matching the width the distilled
//! spec calls out explicitly rather than leaving the packing implicit.

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct CompactVector {
    bits_per_entry: u32,
    len: usize,
    words: Vec<u64>,
}

impl CompactVector {
    /// Smallest bit width that can hold `max_value` (inclusive).
    pub fn bit_width(max_value: u32) -> u32 {
        if max_value == 0 {
            1
        } else {
            32 - max_value.leading_zeros()
        }
    }

    /// Builds a compact array holding `values`, each of which must fit in
    /// `bits_per_entry` bits.
    pub fn build(values: &[u32], bits_per_entry: u32) -> Self {
        assert!(bits_per_entry > 0 && bits_per_entry <= 32);
        let total_bits = values.len() as u64 * bits_per_entry as u64;
        let num_words = total_bits.div_ceil(64) as usize;
        let mut words = vec![0u64; num_words];
        for (i, &v) in values.iter().enumerate() {
            debug_assert!(
                bits_per_entry == 32 || v < (1u32 << bits_per_entry),
                "value {v} does not fit in {bits_per_entry} bits"
            );
            Self::set(&mut words, bits_per_entry, i, v);
        }
        CompactVector {
            bits_per_entry,
            len: values.len(),
            words,
        }
    }

    fn set(words: &mut [u64], bits_per_entry: u32, index: usize, value: u32) {
        let bit_offset = index as u64 * bits_per_entry as u64;
        let word_index = (bit_offset / 64) as usize;
        let bit_in_word = (bit_offset % 64) as u32;
        let value = value as u64;

        words[word_index] |= value << bit_in_word;
        let bits_written_in_first_word = 64 - bit_in_word;
        if bits_written_in_first_word < bits_per_entry {
            words[word_index + 1] |= value >> bits_written_in_first_word;
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> u32 {
        debug_assert!(index < self.len);
        let bit_offset = index as u64 * self.bits_per_entry as u64;
        let word_index = (bit_offset / 64) as usize;
        let bit_in_word = (bit_offset % 64) as u32;
        let mask: u64 = if self.bits_per_entry == 64 {
            u64::MAX
        } else {
            (1u64 << self.bits_per_entry) - 1
        };

        let mut value = (self.words[word_index] >> bit_in_word) & mask;
        let bits_read_from_first_word = 64 - bit_in_word;
        if bits_read_from_first_word < self.bits_per_entry {
            let remaining_mask = mask >> bits_read_from_first_word;
            value |= (self.words[word_index + 1] & remaining_mask) << bits_read_from_first_word;
        }
        value as u32
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bytes(&self) -> usize {
        self.words.len() * std::mem::size_of::<u64>()
    }

    pub fn to_vec(&self) -> Vec<u32> {
        (0..self.len).map(|i| self.get(i)).collect()
    }
}
