//! Flexible scalar decoding.
//!
//! Some Store API payloads carry numbers as strings or booleans as `0`/`1`.
//! Each target type decodes as its declared JSON type first and then tries
//! the fallbacks listed in its table, in order. The tables are plain data so
//! they can be inspected and tested.
//!
//! | target  | rules, in order                                  |
//! |---------|--------------------------------------------------|
//! | integer | [`Native`], [`IntegralFloat`], [`NumericString`] |
//! | boolean | [`Native`], [`BooleanString`], [`Integer`]       |
//!
//! [`Native`]: Coercion::Native
//! [`IntegralFloat`]: Coercion::IntegralFloat
//! [`NumericString`]: Coercion::NumericString
//! [`BooleanString`]: Coercion::BooleanString
//! [`Integer`]: Coercion::Integer

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use super::dynamic::Dynamic;

/// One conversion rule from a JSON value to a scalar target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coercion {
    /// The value already has the declared JSON type.
    Native,
    /// A float with no fractional part, e.g. `12.0`.
    IntegralFloat,
    /// A string holding a base-10 integer, e.g. `"12"`.
    NumericString,
    /// `"true"`/`"1"` or `"false"`/`"0"`, ASCII case-insensitive.
    BooleanString,
    /// An integer, where any non-zero value is `true`.
    Integer,
}

/// Fallback order for integer targets.
pub const INTEGER_RULES: &[Coercion] = &[
    Coercion::Native,
    Coercion::IntegralFloat,
    Coercion::NumericString,
];

/// Fallback order for boolean targets.
pub const BOOLEAN_RULES: &[Coercion] = &[
    Coercion::Native,
    Coercion::BooleanString,
    Coercion::Integer,
];

fn apply_integer(rule: Coercion, value: &Dynamic) -> Option<i64> {
    match (rule, value) {
        (Coercion::Native, Dynamic::Int(i)) => Some(*i),
        (Coercion::Native, Dynamic::UInt(u)) => i64::try_from(*u).ok(),
        (Coercion::IntegralFloat, Dynamic::Float(f))
            if f.is_finite() && f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 =>
        {
            Some(*f as i64)
        }
        (Coercion::NumericString, Dynamic::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

fn apply_boolean(rule: Coercion, value: &Dynamic) -> Option<bool> {
    match (rule, value) {
        (Coercion::Native, Dynamic::Bool(b)) => Some(*b),
        (Coercion::BooleanString, Dynamic::String(s)) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("true") || s == "1" {
                Some(true)
            } else if s.eq_ignore_ascii_case("false") || s == "0" {
                Some(false)
            } else {
                None
            }
        }
        (Coercion::Integer, Dynamic::Int(i)) => Some(*i != 0),
        (Coercion::Integer, Dynamic::UInt(u)) => Some(*u != 0),
        _ => None,
    }
}

/// Run the integer table against a value.
pub fn coerce_integer(value: &Dynamic) -> Option<i64> {
    INTEGER_RULES
        .iter()
        .find_map(|rule| apply_integer(*rule, value))
}

/// Run the boolean table against a value.
pub fn coerce_boolean(value: &Dynamic) -> Option<bool> {
    BOOLEAN_RULES
        .iter()
        .find_map(|rule| apply_boolean(*rule, value))
}

/// Strict monetary amount: absent or `null` is `0`, anything no integer
/// rule accepts is a decode error.
///
/// Use with `#[serde(default, deserialize_with = "coerce::amount")]`.
pub fn amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match Option::<Dynamic>::deserialize(deserializer)? {
        None | Some(Dynamic::Null) => Ok(0),
        Some(value) => coerce_integer(&value).ok_or_else(|| {
            D::Error::custom(format!(
                "expected an integer amount in minor units, found {}",
                value.type_name()
            ))
        }),
    }
}

/// Strict optional integer: `null` stays `None`, an unconvertible value is
/// a decode error.
pub fn strict_integer<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<i64>, D::Error> {
    match Option::<Dynamic>::deserialize(deserializer)? {
        None | Some(Dynamic::Null) => Ok(None),
        Some(value) => coerce_integer(&value).map(Some).ok_or_else(|| {
            D::Error::custom(format!("expected an integer, found {}", value.type_name()))
        }),
    }
}

/// Lenient optional integer: an unconvertible value becomes `None`.
pub fn lenient_integer<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<i64>, D::Error> {
    Ok(Option::<Dynamic>::deserialize(deserializer)?
        .as_ref()
        .and_then(coerce_integer))
}

/// Lenient optional boolean: an unconvertible value becomes `None`.
pub fn lenient_boolean<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<bool>, D::Error> {
    Ok(Option::<Dynamic>::deserialize(deserializer)?
        .as_ref()
        .and_then(coerce_boolean))
}

/// Boolean with a `false` default for absent, `null` or unconvertible input.
pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(lenient_boolean(deserializer)?.unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "amount")]
        total: i64,
        #[serde(default, deserialize_with = "lenient_integer")]
        weight: Option<i64>,
        #[serde(default, deserialize_with = "lenient_boolean")]
        manage_inventory: Option<bool>,
    }

    #[test]
    fn test_table_order_is_declared() {
        assert_eq!(INTEGER_RULES.first(), Some(&Coercion::Native));
        assert_eq!(BOOLEAN_RULES.last(), Some(&Coercion::Integer));
    }

    #[test]
    fn test_integer_rules() {
        assert_eq!(coerce_integer(&Dynamic::Int(5)), Some(5));
        assert_eq!(coerce_integer(&Dynamic::Float(5.0)), Some(5));
        assert_eq!(coerce_integer(&Dynamic::Float(5.5)), None);
        assert_eq!(coerce_integer(&Dynamic::String(" 42 ".into())), Some(42));
        assert_eq!(coerce_integer(&Dynamic::String("4.2".into())), None);
        assert_eq!(coerce_integer(&Dynamic::Bool(true)), None);
        assert_eq!(coerce_integer(&Dynamic::UInt(u64::MAX)), None);
    }

    #[test]
    fn test_boolean_rules() {
        assert_eq!(coerce_boolean(&Dynamic::Bool(false)), Some(false));
        assert_eq!(coerce_boolean(&Dynamic::String("TRUE".into())), Some(true));
        assert_eq!(coerce_boolean(&Dynamic::String("0".into())), Some(false));
        assert_eq!(coerce_boolean(&Dynamic::String("yes".into())), None);
        assert_eq!(coerce_boolean(&Dynamic::Int(2)), Some(true));
        assert_eq!(coerce_boolean(&Dynamic::Int(0)), Some(false));
        assert_eq!(coerce_boolean(&Dynamic::UInt(u64::MAX)), Some(true));
    }

    #[test]
    fn test_missing_amount_defaults_to_zero() {
        let sample: Sample = serde_json::from_value(json!({})).unwrap();
        assert_eq!(sample.total, 0);
        assert_eq!(sample.weight, None);

        let sample: Sample = serde_json::from_value(json!({ "total": null })).unwrap();
        assert_eq!(sample.total, 0);
    }

    #[test]
    fn test_string_amount_is_accepted() {
        let sample: Sample =
            serde_json::from_value(json!({ "total": "1999", "weight": "300" })).unwrap();
        assert_eq!(sample.total, 1999);
        assert_eq!(sample.weight, Some(300));
    }

    #[test]
    fn test_fractional_amount_is_rejected() {
        let err = serde_json::from_value::<Sample>(json!({ "total": 19.99 })).unwrap_err();
        assert!(err.to_string().contains("minor units"));
    }

    #[test]
    fn test_lenient_fields_swallow_garbage() {
        let sample: Sample =
            serde_json::from_value(json!({ "weight": "heavy", "manage_inventory": "1" }))
                .unwrap();
        assert_eq!(sample.weight, None);
        assert_eq!(sample.manage_inventory, Some(true));
    }
}
