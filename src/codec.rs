//! Purpose: Typed JSON text decode/encode entrypoints for the facade.
//! Exports: `parse`, `parse_or_default`, `stringify`.
//! Role: Codec boundary that centralizes serde_json usage and error mapping.
//! Invariants: Literal JSON `null` decodes to `None`; it is never an error.
//! Invariants: Malformed or shape-mismatched text is a `Parse` error, never a default.
//! Notes: The offending text is echoed at debug level alongside a propagated error.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, ErrorKind, Result};

/// Decodes JSON text into `T`. A literal `null` document yields `Ok(None)`.
pub fn parse<T: DeserializeOwned>(text: &str) -> Result<Option<T>> {
    serde_json::from_str::<Option<T>>(text).map_err(|err| {
        tracing::debug!(text, error = %err, "failed to parse json text");
        Error::new(ErrorKind::Parse)
            .with_message("invalid json text")
            .with_source(err)
    })
}

/// Decodes JSON text into `T`, substituting `T::default()` for a literal `null`.
///
/// Parse failures still propagate; only the null document is replaced.
pub fn parse_or_default<T: DeserializeOwned + Default>(text: &str) -> Result<T> {
    Ok(parse(text)?.unwrap_or_default())
}

/// Encodes `value` as JSON text, multi-line indented when `indented` is set,
/// single-line compact otherwise.
pub fn stringify<T: Serialize>(value: &T, indented: bool) -> Result<String> {
    let result = if indented {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    result.map_err(|err| {
        Error::new(ErrorKind::Serialize)
            .with_message("failed to encode value as json")
            .with_source(err)
    })
}
