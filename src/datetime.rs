//! Purpose: Fixed date/time text format shared by parse and stringify paths.
//! Exports: `FORMAT`, `format`, `parse`, serde adapter fns, `option` submodule.
//! Role: Interop seam for the upstream API's non-RFC3339 timestamp layout.
//! Invariants: Everything serialized here parses back to the same instant (round-trip symmetry).
//! Invariants: Fractional seconds are 1-7 digits, omitted entirely for whole
//! seconds on both input and output; offsets are numeric.
//! Notes: Apply per field via `#[serde(with = "snap_json::datetime")]`; callers wanting a
//! different layout use the `time` crate directly.

use std::sync::OnceLock;

use serde::{Deserialize, Deserializer, Serializer, de};
use time::OffsetDateTime;
use time::format_description::{self, OwnedFormatItem};

use crate::error::{Error, ErrorKind, Result};

/// The upstream-compatible pattern: `2023-04-01 12:30:45.1234567+08:00`.
/// A space separates date and time (no `T`), and whole-second values carry
/// no fractional part at all.
pub const FORMAT: &str = "[year]-[month]-[day] [hour]:[minute]:[second]\
[optional [.[subsecond digits:1+]]][offset_hour sign:mandatory]:[offset_minute]";

const WHOLE_SECOND_FORMAT: &str = "[year]-[month]-[day] [hour]:[minute]:[second]\
[offset_hour sign:mandatory]:[offset_minute]";

fn description() -> &'static OwnedFormatItem {
    static DESCRIPTION: OnceLock<OwnedFormatItem> = OnceLock::new();
    DESCRIPTION.get_or_init(|| {
        format_description::parse_owned::<2>(FORMAT).expect("datetime FORMAT is well-formed")
    })
}

fn whole_second_description() -> &'static OwnedFormatItem {
    static DESCRIPTION: OnceLock<OwnedFormatItem> = OnceLock::new();
    DESCRIPTION.get_or_init(|| {
        format_description::parse_owned::<2>(WHOLE_SECOND_FORMAT)
            .expect("datetime WHOLE_SECOND_FORMAT is well-formed")
    })
}

// The upstream pattern trims the fraction entirely on whole seconds, so
// rendering picks the description by subsecond content.
fn render(value: &OffsetDateTime) -> std::result::Result<String, time::error::Format> {
    if value.nanosecond() == 0 {
        value.format(whole_second_description())
    } else {
        value.format(description())
    }
}

/// Renders a timestamp in the fixed format.
pub fn format(value: &OffsetDateTime) -> Result<String> {
    render(value).map_err(|err| {
        Error::new(ErrorKind::Serialize)
            .with_message("failed to format datetime")
            .with_source(err)
    })
}

/// Parses a timestamp in the fixed format.
pub fn parse(text: &str) -> Result<OffsetDateTime> {
    OffsetDateTime::parse(text, description()).map_err(|err| {
        Error::new(ErrorKind::Parse)
            .with_message(format!("invalid datetime text {text:?}"))
            .with_source(err)
    })
}

pub fn serialize<S>(value: &OffsetDateTime, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let text = render(value).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&text)
}

pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<OffsetDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    OffsetDateTime::parse(&text, description()).map_err(de::Error::custom)
}

/// Adapter for `Option<OffsetDateTime>` fields (`#[serde(with = "snap_json::datetime::option")]`).
pub mod option {
    use serde::{Deserialize, Deserializer, Serializer, de};
    use time::OffsetDateTime;

    use super::{description, render};

    pub fn serialize<S>(
        value: &Option<OffsetDateTime>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => {
                let text = render(value).map_err(serde::ser::Error::custom)?;
                serializer.serialize_some(&text)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> std::result::Result<Option<OffsetDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = Option::<String>::deserialize(deserializer)?;
        match text {
            Some(text) => OffsetDateTime::parse(&text, description())
                .map(Some)
                .map_err(de::Error::custom),
            None => Ok(None),
        }
    }
}
