//! Integer-sequence store (`§2`, "Integer-sequence store").
//!
//! Random-access read of a frozen sequence of ids. The distilled spec treats
//! any compressed-integer encoding (e.g. Elias-Fano) as an external,
//! substitutable `ListType`; this crate ships the plain array implementation
//! and keeps the trait so a compressed one can be swapped in without
//! touching `UnsortedList` or the engine.

/// A fixed, randomly-accessible sequence of `u32`s.
pub trait IntSequence {
    fn build(values: &[u32]) -> Self;
    fn access(&self, i: u32) -> u32;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn bytes(&self) -> usize;
}

/// Plain, uncompressed `Vec<u32>` backing. This is the "unsorted list" of
/// `§4.1` in its simplest form: values in original (not lex or doc) order.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct PlainSequence {
    values: Vec<u32>,
}

impl IntSequence for PlainSequence {
    fn build(values: &[u32]) -> Self {
        PlainSequence {
            values: values.to_vec(),
        }
    }

    #[inline]
    fn access(&self, i: u32) -> u32 {
        self.values[i as usize]
    }

    #[inline]
    fn len(&self) -> usize {
        self.values.len()
    }

    fn bytes(&self) -> usize {
        self.values.len() * std::mem::size_of::<u32>()
    }
}
