//! # Type Inference
//!
//! Maps a [`ResolvedLeaf`] to its [`SemanticType`].
//!
//! Numeric leaves must carry enough metadata for both parties to rebuild
//! the transform `scaled = (value - minimum) * 10^decimal_places`:
//!
//! - integers need a `minimum`, unless they come from the positive-only
//!   built-in;
//! - numbers need a `multipleOf`, whose fractional digit count is the
//!   decimal places, and a `minimum` unless positive-only.
//!
//! A `minimum` of exactly zero yields the positive variant for both
//! integers and numbers.
//!
//! With [`ParsingOptions::use_defaults`] missing metadata is filled in from
//! the options instead of failing.

use credschema_core::decimal::MAX_SCALE;
use credschema_core::Decimal;

use crate::config::ParsingOptions;
use crate::definitions::BuiltinRole;
use crate::error::SchemaError;
use crate::node::{Primitive, ResolvedLeaf};
use crate::types::SemanticType;

/// Infer the semantic type of `leaf`.
pub fn infer(leaf: &ResolvedLeaf, options: &ParsingOptions) -> Result<SemanticType, SchemaError> {
    match leaf.primitive {
        Primitive::String => Ok(infer_string(leaf)),
        Primitive::Integer => infer_integer(leaf, options),
        Primitive::Number => infer_number(leaf, options),
    }
}

fn infer_string(leaf: &ResolvedLeaf) -> SemanticType {
    if leaf.has_role(BuiltinRole::EncryptableCompString) {
        SemanticType::StringReversible { compress: true }
    } else if leaf.has_role(BuiltinRole::EncryptableString) {
        SemanticType::StringReversible { compress: false }
    } else {
        SemanticType::String
    }
}

fn infer_integer(leaf: &ResolvedLeaf, options: &ParsingOptions) -> Result<SemanticType, SchemaError> {
    if leaf.is_positive_only() {
        reject_negative_minimum(leaf)?;
        return Ok(SemanticType::PositiveInteger);
    }
    let minimum = match leaf.minimum {
        Some(minimum) => minimum,
        None if options.use_defaults => Decimal::from_i128(options.default_minimum_integer.into()),
        None => return Err(inconsistent(leaf, "integer without 'minimum'".to_string())),
    };
    if !minimum.is_integral() {
        return Err(inconsistent(
            leaf,
            format!("integer minimum {minimum} is not integral"),
        ));
    }
    if minimum.is_zero() {
        Ok(SemanticType::PositiveInteger)
    } else {
        Ok(SemanticType::Integer { minimum })
    }
}

fn infer_number(leaf: &ResolvedLeaf, options: &ParsingOptions) -> Result<SemanticType, SchemaError> {
    let decimal_places = match &leaf.multiple_of {
        Some(step) => step.scale(),
        None if options.use_defaults => {
            if options.default_decimal_places > MAX_SCALE {
                return Err(inconsistent(
                    leaf,
                    format!(
                        "default decimal places {} exceed {MAX_SCALE}",
                        options.default_decimal_places
                    ),
                ));
            }
            options.default_decimal_places
        }
        None => return Err(inconsistent(leaf, "number without 'multipleOf'".to_string())),
    };

    let positive = |decimal_places: u32| {
        if decimal_places > 0 {
            SemanticType::PositiveDecimalNumber { decimal_places }
        } else {
            SemanticType::PositiveNumber { decimal_places }
        }
    };

    if leaf.is_positive_only() {
        reject_negative_minimum(leaf)?;
        return Ok(positive(decimal_places));
    }

    let minimum = match leaf.minimum {
        Some(minimum) => minimum,
        None if options.use_defaults => Decimal::from_i128(options.default_minimum_integer.into()),
        None => return Err(inconsistent(leaf, "number without 'minimum'".to_string())),
    };
    if minimum.scale() > decimal_places {
        return Err(inconsistent(
            leaf,
            format!("minimum {minimum} has more than {decimal_places} decimal places"),
        ));
    }
    // A zero minimum shifts nothing, as for integers.
    if minimum.is_zero() {
        return Ok(positive(decimal_places));
    }
    Ok(if decimal_places > 0 {
        SemanticType::DecimalNumber {
            minimum,
            decimal_places,
        }
    } else {
        SemanticType::Number {
            minimum,
            decimal_places,
        }
    })
}

fn reject_negative_minimum(leaf: &ResolvedLeaf) -> Result<(), SchemaError> {
    match &leaf.minimum {
        Some(minimum) if minimum.is_negative() => Err(inconsistent(
            leaf,
            format!("negative minimum {minimum} on a non-negative definition"),
        )),
        _ => Ok(()),
    }
}

fn inconsistent(leaf: &ResolvedLeaf, reason: String) -> SchemaError {
    SchemaError::InconsistentNumericConstraint {
        path: leaf.path.clone(),
        reason,
    }
}
