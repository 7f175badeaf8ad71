//! # Witness Vectors
//!
//! The proof system consumes an ordered vector of field elements indexed
//! `0..n` in canonical attribute order. A [`WitnessVector`] is that vector
//! plus the names it came from, kept only on the caller's side so that
//! "reveal `credentialSubject.age`" can be turned into "reveal index 3".

use std::collections::BTreeSet;

use credschema_core::{FieldElement, FIELD_ELEMENT_BYTES};
use credschema_schema::EncodedCredential;
use serde::Serialize;
use thiserror::Error;

/// Encoded attributes in canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WitnessVector {
    names: Vec<String>,
    elements: Vec<FieldElement>,
}

/// A witness split into revealed and hidden parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionedWitness {
    /// Indices of the revealed attributes, ascending.
    pub revealed: Vec<usize>,
    /// Revealed elements concatenated in index order.
    pub public_inputs: Vec<u8>,
    /// Hidden elements concatenated in index order.
    pub private_inputs: Vec<u8>,
}

/// Error while selecting attributes from a witness.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WitnessError {
    /// The name is not an attribute of the witness.
    #[error("unknown attribute '{name}'")]
    UnknownAttribute { name: String },
}

impl From<EncodedCredential> for WitnessVector {
    fn from(encoded: EncodedCredential) -> Self {
        Self {
            names: encoded.names,
            elements: encoded.values,
        }
    }
}

impl WitnessVector {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn elements(&self) -> &[FieldElement] {
        &self.elements
    }

    /// Index of `name` in canonical order.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names
            .binary_search_by(|candidate| candidate.as_str().cmp(name))
            .ok()
    }

    /// All elements concatenated, 32 bytes each.
    pub fn to_bytes(&self) -> Vec<u8> {
        concat(self.elements.iter())
    }

    /// Split by index. Out-of-range indices are ignored.
    pub fn partition(&self, revealed: &BTreeSet<usize>) -> PartitionedWitness {
        let revealed: Vec<usize> = revealed
            .iter()
            .copied()
            .filter(|i| *i < self.elements.len())
            .collect();
        let public_inputs = concat(revealed.iter().map(|i| &self.elements[*i]));
        let private_inputs = concat(
            self.elements
                .iter()
                .enumerate()
                .filter(|(i, _)| revealed.binary_search(i).is_err())
                .map(|(_, e)| e),
        );
        PartitionedWitness {
            revealed,
            public_inputs,
            private_inputs,
        }
    }

    /// Split by attribute name.
    ///
    /// # Errors
    ///
    /// `WitnessError::UnknownAttribute` for the first name that is not an
    /// attribute of this witness.
    pub fn partition_by_name<'a, I>(&self, revealed: I) -> Result<PartitionedWitness, WitnessError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut indices = BTreeSet::new();
        for name in revealed {
            let index = self
                .index_of(name)
                .ok_or_else(|| WitnessError::UnknownAttribute {
                    name: name.to_string(),
                })?;
            indices.insert(index);
        }
        Ok(self.partition(&indices))
    }
}

fn concat<'a>(elements: impl Iterator<Item = &'a FieldElement>) -> Vec<u8> {
    let mut out = Vec::new();
    for e in elements {
        out.extend_from_slice(e.as_bytes());
    }
    debug_assert_eq!(out.len() % FIELD_ELEMENT_BYTES, 0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use credschema_core::FieldConfig;

    fn witness() -> WitnessVector {
        let cfg = FieldConfig::default();
        EncodedCredential {
            names: vec!["a".into(), "b".into(), "c".into()],
            values: (1..=3u128)
                .map(|v| FieldElement::from_u128(v, &cfg).unwrap())
                .collect(),
        }
        .into()
    }

    #[test]
    fn test_to_bytes_length() {
        let w = witness();
        assert_eq!(w.len(), 3);
        assert_eq!(w.to_bytes().len(), 3 * FIELD_ELEMENT_BYTES);
    }

    #[test]
    fn test_partition_by_index() {
        let w = witness();
        let p = w.partition(&BTreeSet::from([1, 7]));
        assert_eq!(p.revealed, vec![1]);
        assert_eq!(p.public_inputs.len(), FIELD_ELEMENT_BYTES);
        assert_eq!(p.public_inputs[0], 2);
        assert_eq!(p.private_inputs.len(), 2 * FIELD_ELEMENT_BYTES);
        assert_eq!(p.private_inputs[0], 1);
        assert_eq!(p.private_inputs[FIELD_ELEMENT_BYTES], 3);
    }

    #[test]
    fn test_partition_by_name() {
        let w = witness();
        let p = w.partition_by_name(["c", "a"]).unwrap();
        assert_eq!(p.revealed, vec![0, 2]);
        assert_eq!(
            w.partition_by_name(["a", "zz", "yy"]),
            Err(WitnessError::UnknownAttribute { name: "zz".into() })
        );
    }

    proptest::proptest! {
        #[test]
        fn partition_keeps_every_element(
            revealed in proptest::collection::btree_set(0usize..5, 0..5)
        ) {
            let w = witness();
            let p = w.partition(&revealed);
            proptest::prop_assert_eq!(
                p.public_inputs.len() + p.private_inputs.len(),
                w.to_bytes().len()
            );
            proptest::prop_assert!(p.revealed.iter().all(|i| *i < w.len()));
        }
    }
}
