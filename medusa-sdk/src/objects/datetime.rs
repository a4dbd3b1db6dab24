//! Timestamp decoding for the layouts the Store API is known to emit.
//!
//! Layouts are tried in the order of [`LAYOUTS`]. Naive layouts (no offset)
//! are read as UTC. A string none of them accepts is a decode error; there is
//! no fallback to "now".

use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serializer};
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// A timestamp layout.
#[derive(Debug, Clone, Copy)]
pub enum Layout {
    /// RFC 3339, with or without fractional seconds, `Z` or `±hh:mm`.
    Rfc3339,
    /// Layout carrying its own UTC offset.
    WithOffset(&'static [BorrowedFormatItem<'static>]),
    /// Layout without an offset, interpreted as UTC.
    Naive(&'static [BorrowedFormatItem<'static>]),
}

pub const LAYOUTS: &[Layout] = &[
    Layout::Rfc3339,
    Layout::WithOffset(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory][offset_minute]"
    )),
    Layout::WithOffset(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory][offset_minute]"
    )),
    Layout::Naive(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"
    )),
    Layout::Naive(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second]"
    )),
    Layout::Naive(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"
    )),
    Layout::Naive(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    )),
];

impl Layout {
    fn parse(&self, input: &str) -> Option<OffsetDateTime> {
        match self {
            Layout::Rfc3339 => OffsetDateTime::parse(input, &Rfc3339).ok(),
            Layout::WithOffset(items) => OffsetDateTime::parse(input, *items).ok(),
            Layout::Naive(items) => PrimitiveDateTime::parse(input, *items)
                .ok()
                .map(PrimitiveDateTime::assume_utc),
        }
    }
}

/// The input matched none of [`LAYOUTS`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised timestamp {0:?}")]
pub struct UnrecognisedTimestamp(pub String);

/// Parse a timestamp by trying every known layout in order.
pub fn parse_timestamp(input: &str) -> Result<OffsetDateTime, UnrecognisedTimestamp> {
    let trimmed = input.trim();
    LAYOUTS
        .iter()
        .find_map(|layout| layout.parse(trimmed))
        .ok_or_else(|| UnrecognisedTimestamp(input.to_owned()))
}

fn format_rfc3339<S: Serializer>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    let text = value
        .format(&Rfc3339)
        .map_err(S::Error::custom)?;
    serializer.serialize_str(&text)
}

/// Serde adapter for a required timestamp.
pub mod flexible {
    use super::*;
    use serde::de::Error as _;

    pub fn serialize<S: Serializer>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        format_rfc3339(value, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OffsetDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_timestamp(&text).map_err(D::Error::custom)
    }

    /// Serde adapter for an optional timestamp; `null` and absent map to `None`.
    pub mod option {
        use super::super::*;
        use serde::de::Error as _;

        pub fn serialize<S: Serializer>(
            value: &Option<OffsetDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => format_rfc3339(value, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<OffsetDateTime>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(text) => parse_timestamp(&text).map(Some).map_err(D::Error::custom),
                None => Ok(None),
            }
        }
    }
}
