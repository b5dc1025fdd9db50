//! Artifact (de)serialization (`§4.9`, `§6`).
//!
//! The on-disk format is a 4-byte magic, a 1-byte version, then the six
//! components in the declared visitor order: completions, the two
//! `UnsortedList`s (full, then minimal), dictionary, inverted index,
//! docid->lexid, each `bincode`-encoded back to back. Encoding the whole
//! `IndexArtifact` in one `bincode::serialize` call already produces
//! exactly this layout, since `bincode` writes `struct` fields in
//! declaration order with no padding; `save`/`load` only add the header
//! that lets a loader reject a foreign or stale file before touching the
//! payload.

use std::io::{Read, Write};

use serde::{de::DeserializeOwned, Serialize};

use crate::completions::CompletionsStore;
use crate::dictionary::TermDictionary;
use crate::engine::IndexArtifact;
use crate::error::AutocompleteError;
use crate::rmq::RangeMinimumQuery;
use crate::seq::IntSequence;

const MAGIC: [u8; 4] = *b"TAC1";
const FORMAT_VERSION: u8 = 1;

impl<C, S, R, D> IndexArtifact<C, S, R, D>
where
    C: CompletionsStore + Serialize + DeserializeOwned,
    S: IntSequence + Serialize + DeserializeOwned,
    R: RangeMinimumQuery + Serialize + DeserializeOwned,
    D: TermDictionary + Serialize + DeserializeOwned,
{
    /// Writes the magic, version, then the bincode-encoded artifact.
    pub fn save<W: Write>(&self, mut w: W) -> Result<(), AutocompleteError> {
        w.write_all(&MAGIC)?;
        w.write_all(&[FORMAT_VERSION])?;
        bincode::serialize_into(w, self)?;
        Ok(())
    }

    /// Validates the header, then decodes the payload. A bad magic or an
    /// unsupported version is rejected before any `bincode` decoding is
    /// attempted; a truncated or malformed payload surfaces as
    /// `CorruptArtifact` from the `bincode` call itself (`§7`). Both are
    /// fatal; there is no partially-usable `IndexArtifact`.
    pub fn load<Rd: Read>(mut r: Rd) -> Result<Self, AutocompleteError> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(AutocompleteError::BadMagic {
                expected: MAGIC,
                found: magic,
            });
        }

        let mut version = [0u8; 1];
        r.read_exact(&mut version)?;
        if version[0] != FORMAT_VERSION {
            return Err(AutocompleteError::UnsupportedVersion {
                expected: FORMAT_VERSION,
                found: version[0],
            });
        }

        let artifact = bincode::deserialize_from(r)?;
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;
    use crate::DefaultArtifact;

    fn toy_artifact() -> DefaultArtifact {
        Builder::from_lines(
            [
                "0 the cat sat",
                "1 the cat ran",
                "2 the dog",
                "3 the dog ran fast",
                "4 cat food",
            ]
            .into_iter(),
        )
        .unwrap()
    }

    #[test]
    fn round_trips_through_bytes() {
        let artifact = toy_artifact();
        let mut buf = Vec::new();
        artifact.save(&mut buf).unwrap();
        let loaded = DefaultArtifact::load(buf.as_slice()).unwrap();
        assert_eq!(loaded.num_completions(), artifact.num_completions());
    }

    #[test]
    fn rejects_bad_magic() {
        let mut buf = Vec::new();
        toy_artifact().save(&mut buf).unwrap();
        buf[0] = b'X';
        let err = DefaultArtifact::load(buf.as_slice()).unwrap_err();
        assert!(matches!(err, AutocompleteError::BadMagic { .. }));
    }

    #[test]
    fn rejects_unsupported_version() {
        let mut buf = Vec::new();
        toy_artifact().save(&mut buf).unwrap();
        buf[4] = 99;
        let err = DefaultArtifact::load(buf.as_slice()).unwrap_err();
        assert!(matches!(err, AutocompleteError::UnsupportedVersion { .. }));
    }

    #[test]
    fn rejects_truncated_payload() {
        let mut buf = Vec::new();
        toy_artifact().save(&mut buf).unwrap();
        buf.truncate(buf.len() / 2);
        assert!(DefaultArtifact::load(buf.as_slice()).is_err());
    }
}
