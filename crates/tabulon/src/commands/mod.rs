//! Subcommand handlers.
//!
//! Each handler returns the full text to print. Structured modes serialize
//! the handler's report type; text mode renders it for people.

use serde::Serialize;

use crate::output::OutputMode;
use crate::serialize::{serialize_structured, SerializeError};

pub mod access;
pub mod fields;
pub mod view;

/// Serializes `data` in structured modes, or renders it with `text`.
pub(crate) fn emit<T, F>(mode: OutputMode, data: &T, text: F) -> Result<String, SerializeError>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    if mode.is_structured() {
        serialize_structured(data, mode)
    } else {
        Ok(text(data))
    }
}
