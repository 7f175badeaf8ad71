//! # Field Elements
//!
//! The proof system consumes attribute values as elements of its scalar
//! field. The field modulus belongs to that system, so this module never
//! reduces modulo a prime: it only builds values strictly below
//! `2^(modulus_bits - 1)`, which is below any modulus of `modulus_bits`
//! bits. The default of 255 bits matches the BLS12-381 scalar field.
//!
//! Elements are 32 little-endian bytes.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::FieldError;

/// Size of an encoded field element in bytes.
pub const FIELD_ELEMENT_BYTES: usize = 32;

/// Modulus size of the BLS12-381 scalar field.
pub const DEFAULT_MODULUS_BITS: u32 = 255;

/// Size of the proof system's scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawFieldConfig")]
pub struct FieldConfig {
    modulus_bits: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFieldConfig {
    modulus_bits: u32,
}

impl TryFrom<RawFieldConfig> for FieldConfig {
    type Error = FieldError;

    fn try_from(raw: RawFieldConfig) -> Result<Self, Self::Error> {
        FieldConfig::new(raw.modulus_bits)
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            modulus_bits: DEFAULT_MODULUS_BITS,
        }
    }
}

impl FieldConfig {
    /// # Errors
    ///
    /// `FieldError::UnsupportedModulus` unless `9 <= modulus_bits <= 256`.
    pub fn new(modulus_bits: u32) -> Result<Self, FieldError> {
        if !(9..=256).contains(&modulus_bits) {
            return Err(FieldError::UnsupportedModulus(modulus_bits));
        }
        Ok(Self { modulus_bits })
    }

    pub fn modulus_bits(&self) -> u32 {
        self.modulus_bits
    }

    /// Bits every element is guaranteed to fit in.
    pub fn capacity_bits(&self) -> u32 {
        self.modulus_bits - 1
    }

    /// Whole bytes that fit in [`FieldConfig::capacity_bits`].
    pub fn capacity_bytes(&self) -> usize {
        (self.capacity_bits() / 8) as usize
    }
}

/// An attribute value encoded for the proof system.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldElement([u8; FIELD_ELEMENT_BYTES]);

impl FieldElement {
    /// The zero element.
    pub const ZERO: FieldElement = FieldElement([0u8; FIELD_ELEMENT_BYTES]);

    /// Embed a non-negative integer.
    ///
    /// # Errors
    ///
    /// `FieldError::Overflow` if `value >= 2^capacity_bits`.
    pub fn from_u128(value: u128, config: &FieldConfig) -> Result<Self, FieldError> {
        let needed = 128 - value.leading_zeros();
        if needed > config.capacity_bits() {
            return Err(FieldError::Overflow {
                needed,
                capacity: config.capacity_bits(),
            });
        }
        let mut bytes = [0u8; FIELD_ELEMENT_BYTES];
        bytes[..16].copy_from_slice(&value.to_le_bytes());
        Ok(Self(bytes))
    }

    /// Lay out `data` little-endian. Trailing zero bytes are not
    /// recoverable, so callers that need [`FieldElement::to_le_bytes_trimmed`]
    /// must not end their data with `0x00`.
    ///
    /// # Errors
    ///
    /// `FieldError::TooManyBytes` if `data` is longer than
    /// [`FieldConfig::capacity_bytes`].
    pub fn from_le_bytes(data: &[u8], config: &FieldConfig) -> Result<Self, FieldError> {
        let max = config.capacity_bytes();
        if data.len() > max {
            return Err(FieldError::TooManyBytes {
                len: data.len(),
                max,
            });
        }
        let mut bytes = [0u8; FIELD_ELEMENT_BYTES];
        bytes[..data.len()].copy_from_slice(data);
        Ok(Self(bytes))
    }

    /// SHA-256 of `data`, read little-endian, truncated to the field capacity.
    pub fn hash_to_field(data: &[u8], config: &FieldConfig) -> Self {
        let hash = Sha256::digest(data);
        let mut bytes = [0u8; FIELD_ELEMENT_BYTES];
        bytes.copy_from_slice(&hash);
        clear_bits_from(&mut bytes, config.capacity_bits());
        Self(bytes)
    }

    /// The integer value, if it fits in 128 bits.
    pub fn to_u128(&self) -> Option<u128> {
        if self.0[16..].iter().any(|b| *b != 0) {
            return None;
        }
        let mut low = [0u8; 16];
        low.copy_from_slice(&self.0[..16]);
        Some(u128::from_le_bytes(low))
    }

    /// The bytes with trailing zeros removed.
    pub fn to_le_bytes_trimmed(&self) -> Vec<u8> {
        let end = self
            .0
            .iter()
            .rposition(|b| *b != 0)
            .map(|i| i + 1)
            .unwrap_or(0);
        self.0[..end].to_vec()
    }

    pub fn as_bytes(&self) -> &[u8; FIELD_ELEMENT_BYTES] {
        &self.0
    }

    /// Lowercase hex of the little-endian bytes.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Inverse of [`FieldElement::to_hex`].
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != FIELD_ELEMENT_BYTES * 2 || !hex.is_ascii() {
            return None;
        }
        let mut bytes = [0u8; FIELD_ELEMENT_BYTES];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
        }
        Some(Self(bytes))
    }
}

/// Zero every bit at position `bit` and above (little-endian numbering).
fn clear_bits_from(bytes: &mut [u8; FIELD_ELEMENT_BYTES], bit: u32) {
    let full = (bit / 8) as usize;
    let partial = bit % 8;
    if full >= FIELD_ELEMENT_BYTES {
        return;
    }
    bytes[full] &= (1u8 << partial) - 1;
    for b in bytes.iter_mut().skip(full + 1) {
        *b = 0;
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement({})", self.to_hex())
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for FieldElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        FieldElement::from_hex(&hex)
            .ok_or_else(|| serde::de::Error::custom("expected 64 hex characters"))
    }
}
