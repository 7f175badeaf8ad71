//! # Encoder Registry
//!
//! Binds every flattened attribute path to a pure function from a JSON
//! value to a [`FieldElement`]. The registry is keyed by path, not by type,
//! so two attributes of the same type still own distinct encoders.
//!
//! ## Encodings
//!
//! - `String`: SHA-256 of the UTF-8 bytes, truncated to the field capacity.
//! - `StringReversible`: the UTF-8 bytes laid out little-endian, or packed
//!   7 bits per ASCII character when compressed. Both decode.
//! - numeric types: `(value - minimum) * 10^decimal_places` as a
//!   non-negative little-endian integer. Decodes.
//!
//! Encoding never clamps. A value outside the representable range is an
//! [`EncodingError`] for the caller to handle before signing.

use std::collections::BTreeMap;

use credschema_core::{Decimal, DecimalError, FieldConfig, FieldElement, FieldError};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::EncodingError;
use crate::types::{FlattenedSchema, SemanticType};

const COMPRESSED_CHAR_BITS: usize = 7;

/// Encoder for one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoder {
    path: String,
    ty: SemanticType,
    field: FieldConfig,
}

impl Encoder {
    /// Bind `ty` at `path` to the field described by `field`.
    pub fn for_type(path: impl Into<String>, ty: SemanticType, field: FieldConfig) -> Self {
        Self {
            path: path.into(),
            ty,
            field,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn semantic_type(&self) -> &SemanticType {
        &self.ty
    }

    /// True if [`Encoder::decode`] can recover the value.
    pub fn is_reversible(&self) -> bool {
        !matches!(self.ty, SemanticType::String)
    }

    /// Encode `value`.
    pub fn encode(&self, value: &Value) -> Result<FieldElement, EncodingError> {
        match &self.ty {
            SemanticType::String => {
                let s = self.expect_str(value)?;
                Ok(FieldElement::hash_to_field(s.as_bytes(), &self.field))
            }
            SemanticType::StringReversible { compress: false } => {
                let s = self.expect_str(value)?;
                self.encode_utf8(s)
            }
            SemanticType::StringReversible { compress: true } => {
                let s = self.expect_str(value)?;
                self.encode_compressed(s)
            }
            numeric => match numeric.numeric_transform() {
                Some((minimum, places)) => self.encode_numeric(value, minimum, places),
                None => Err(self.value_type("a supported value")),
            },
        }
    }

    /// Recover the value from its encoding.
    pub fn decode(&self, element: &FieldElement) -> Result<Value, EncodingError> {
        if !self.is_reversible() {
            return Err(EncodingError::Irreversible {
                path: self.path.clone(),
            });
        }
        match &self.ty {
            SemanticType::StringReversible { compress: false } => {
                let bytes = element.to_le_bytes_trimmed();
                String::from_utf8(bytes)
                    .map(Value::String)
                    .map_err(|_| self.value_type("a UTF-8 encoding"))
            }
            SemanticType::StringReversible { compress: true } => {
                Ok(Value::String(unpack_7bit(element.as_bytes())))
            }
            numeric => match numeric.numeric_transform() {
                Some((minimum, places)) => self.decode_numeric(element, minimum, places),
                None => Err(self.value_type("a supported value")),
            },
        }
    }

    fn expect_str<'v>(&self, value: &'v Value) -> Result<&'v str, EncodingError> {
        value.as_str().ok_or_else(|| self.value_type("a string"))
    }

    fn value_type(&self, expected: &'static str) -> EncodingError {
        EncodingError::ValueType {
            path: self.path.clone(),
            expected,
        }
    }

    fn out_of_bounds(&self, reason: String) -> EncodingError {
        EncodingError::OutOfBounds {
            path: self.path.clone(),
            reason,
        }
    }

    fn encode_utf8(&self, s: &str) -> Result<FieldElement, EncodingError> {
        if s.contains('\0') {
            return Err(self.value_type("a string without NUL characters"));
        }
        let max = self.field.capacity_bytes();
        FieldElement::from_le_bytes(s.as_bytes(), &self.field).map_err(|_| {
            EncodingError::StringTooLong {
                path: self.path.clone(),
                len: s.len(),
                max,
            }
        })
    }

    fn encode_compressed(&self, s: &str) -> Result<FieldElement, EncodingError> {
        if !s.is_ascii() {
            return Err(EncodingError::NonAsciiForCompression {
                path: self.path.clone(),
            });
        }
        if s.contains('\0') {
            return Err(self.value_type("a string without NUL characters"));
        }
        let max = self.field.capacity_bytes() * 8 / COMPRESSED_CHAR_BITS;
        if s.len() > max {
            return Err(EncodingError::StringTooLong {
                path: self.path.clone(),
                len: s.len(),
                max,
            });
        }
        let packed = pack_7bit(s.as_bytes());
        FieldElement::from_le_bytes(&packed, &self.field).map_err(|_| {
            EncodingError::StringTooLong {
                path: self.path.clone(),
                len: s.len(),
                max,
            }
        })
    }

    fn encode_numeric(
        &self,
        value: &Value,
        minimum: Decimal,
        places: u32,
    ) -> Result<FieldElement, EncodingError> {
        let number = match value {
            Value::Number(n) => n,
            _ => return Err(self.value_type("a number")),
        };
        let value = Decimal::from_json_number(number).map_err(|source| self.decimal(source))?;
        let shifted = value
            .checked_sub(&minimum)
            .map_err(|e| self.out_of_bounds(e.to_string()))?;
        if shifted.is_negative() {
            return Err(self.out_of_bounds(format!("{value} is below the minimum {minimum}")));
        }
        let scaled = shifted.scaled_integer(places).map_err(|e| match e {
            DecimalError::NotIntegral { .. } => EncodingError::NotIntegral {
                path: self.path.clone(),
                value: value.to_string(),
                places,
            },
            other => self.out_of_bounds(other.to_string()),
        })?;
        let scaled = u128::try_from(scaled)
            .map_err(|_| self.out_of_bounds(format!("{value} is below the minimum {minimum}")))?;
        FieldElement::from_u128(scaled, &self.field).map_err(|e| match e {
            FieldError::Overflow { capacity, .. } => self.out_of_bounds(format!(
                "{value} does not fit in {capacity} bits after scaling"
            )),
            other => self.out_of_bounds(other.to_string()),
        })
    }

    fn decode_numeric(
        &self,
        element: &FieldElement,
        minimum: Decimal,
        places: u32,
    ) -> Result<Value, EncodingError> {
        let scaled = element
            .to_u128()
            .and_then(|v| i128::try_from(v).ok())
            .ok_or_else(|| self.out_of_bounds("encoding exceeds 127 bits".to_string()))?;
        let value = Decimal::from_scaled(scaled, places)
            .and_then(|shifted| shifted.checked_add(&minimum))
            .map_err(|source| self.decimal(source))?;
        value
            .to_json_number()
            .map(Value::Number)
            .ok_or_else(|| self.out_of_bounds(format!("{value} is not a finite JSON number")))
    }

    fn decimal(&self, source: DecimalError) -> EncodingError {
        EncodingError::Decimal {
            path: self.path.clone(),
            source,
        }
    }
}

fn pack_7bit(chars: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; (chars.len() * COMPRESSED_CHAR_BITS).div_ceil(8)];
    for (i, c) in chars.iter().enumerate() {
        for bit in 0..COMPRESSED_CHAR_BITS {
            if (c >> bit) & 1 == 1 {
                let pos = i * COMPRESSED_CHAR_BITS + bit;
                out[pos / 8] |= 1 << (pos % 8);
            }
        }
    }
    out
}

fn unpack_7bit(bytes: &[u8]) -> String {
    let total_bits = bytes.len() * 8;
    let mut out = String::new();
    let mut pos = 0;
    while pos + COMPRESSED_CHAR_BITS <= total_bits {
        let mut c = 0u8;
        for bit in 0..COMPRESSED_CHAR_BITS {
            let p = pos + bit;
            if (bytes[p / 8] >> (p % 8)) & 1 == 1 {
                c |= 1 << bit;
            }
        }
        if c == 0 {
            break;
        }
        out.push(char::from(c));
        pos += COMPRESSED_CHAR_BITS;
    }
    out
}

/// Encoders for every attribute of a schema, keyed by flattened path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncoderRegistry {
    encoders: BTreeMap<String, Encoder>,
}

impl EncoderRegistry {
    /// Build one encoder per flattened attribute.
    pub fn build(flattened: &FlattenedSchema, field: &FieldConfig) -> Self {
        let encoders: BTreeMap<String, Encoder> = flattened
            .iter()
            .map(|(path, ty)| (path.to_string(), Encoder::for_type(path, ty.clone(), *field)))
            .collect();
        debug!(
            encoders = encoders.len(),
            modulus_bits = field.modulus_bits(),
            "built encoder registry"
        );
        Self { encoders }
    }

    pub fn get(&self, path: &str) -> Option<&Encoder> {
        self.encoders.get(path)
    }

    /// Paths in canonical order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.encoders.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Encoder)> {
        self.encoders.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }

    /// Encode one attribute value.
    pub fn encode(&self, path: &str, value: &Value) -> Result<FieldElement, EncodingError> {
        self.get(path)
            .ok_or_else(|| EncodingError::UnknownAttribute {
                path: path.to_string(),
            })?
            .encode(value)
    }
}

/// A credential's attribute values encoded in canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedCredential {
    pub names: Vec<String>,
    pub values: Vec<FieldElement>,
}

impl EncodedCredential {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The encoded value of `name`.
    pub fn get(&self, name: &str) -> Option<&FieldElement> {
        self.names
            .binary_search_by(|candidate| candidate.as_str().cmp(name))
            .ok()
            .map(|i| &self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldElement)> {
        self.names.iter().map(String::as_str).zip(self.values.iter())
    }
}
