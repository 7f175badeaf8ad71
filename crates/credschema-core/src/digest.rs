//! Schema fingerprints.
//!
//! A `ContentDigest` is the SHA-256 of a value's canonical JSON bytes. It
//! can only be built from [`CanonicalBytes`], so two parties holding the
//! same logical document always compute the same fingerprint regardless of
//! key order or whitespace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::DigestParseError;

const PREFIX: &str = "sha256:";

/// SHA-256 over canonical JSON bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex, without the algorithm prefix.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Fingerprint `data`.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    ContentDigest(Sha256::digest(data.as_bytes()).into())
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}", self.to_hex())
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({self})")
    }
}

impl FromStr for ContentDigest {
    type Err = DigestParseError;

    /// Parse `sha256:<64 hex digits>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix(PREFIX)
            .ok_or_else(|| DigestParseError::MissingPrefix(s.to_string()))?;
        let invalid = || DigestParseError::InvalidHex(hex.to_string());
        if hex.len() != 64 || !hex.is_ascii() {
            return Err(invalid());
        }
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
        }
        Ok(Self(bytes))
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContentDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn digest(v: serde_json::Value) -> ContentDigest {
        sha256_digest(&CanonicalBytes::new(&v).unwrap())
    }

    #[test]
    fn test_empty_object_vector() {
        assert_eq!(
            digest(json!({})).to_hex(),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }

    #[test]
    fn test_key_order_irrelevant() {
        let a: serde_json::Value = serde_json::from_str(r#"{"a":1,"b":2}"#).unwrap();
        let b: serde_json::Value = serde_json::from_str(r#"{ "b": 2, "a": 1 }"#).unwrap();
        assert_eq!(digest(a), digest(b));
    }

    #[test]
    fn test_display_and_parse() {
        let d = digest(json!({"a": 1}));
        let s = d.to_string();
        assert!(s.starts_with("sha256:"));
        assert_eq!(s.len(), 7 + 64);
        assert_eq!(s.parse::<ContentDigest>().unwrap(), d);
        assert_eq!(
            "md5:00".parse::<ContentDigest>(),
            Err(DigestParseError::MissingPrefix("md5:00".into()))
        );
        assert_eq!(
            "sha256:zz".parse::<ContentDigest>(),
            Err(DigestParseError::InvalidHex("zz".into()))
        );
        let bad_digit = format!("sha256:{}", "g".repeat(64));
        assert!(matches!(
            bad_digit.parse::<ContentDigest>(),
            Err(DigestParseError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_serde_as_prefixed_string() {
        let d = digest(json!([1, 2, 3]));
        let v = serde_json::to_value(d).unwrap();
        assert_eq!(v, json!(d.to_string()));
        assert_eq!(serde_json::from_value::<ContentDigest>(v).unwrap(), d);
    }
}
