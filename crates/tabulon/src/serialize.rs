//! Structured data serialization.
//!
//! JSON and YAML serialize a command's data as-is. CSV flattens it to rows:
//! an array of objects becomes one row per object, a single object becomes
//! `key,value` pairs.

use serde::Serialize;
use thiserror::Error;

use crate::output::OutputMode;

/// Errors that can occur during serialization.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(String),

    #[error("Not a structured output mode")]
    NotStructured,
}

impl From<csv::Error> for SerializeError {
    fn from(err: csv::Error) -> Self {
        SerializeError::Csv(err.to_string())
    }
}

/// Serializes data to the specified structured format.
pub fn serialize_structured<T: Serialize>(
    data: &T,
    mode: OutputMode,
) -> Result<String, SerializeError> {
    match mode {
        OutputMode::Json => Ok(serde_json::to_string_pretty(data)?),
        OutputMode::Yaml => Ok(serde_yaml::to_string(data)?),
        OutputMode::Csv => serialize_csv(data),
        _ => Err(SerializeError::NotStructured),
    }
}

/// Serializes data to CSV, inferring headers from the first object.
pub fn serialize_csv<T: Serialize>(data: &T) -> Result<String, SerializeError> {
    let json_value = serde_json::to_value(data)?;
    flatten_json_to_csv(&json_value)
}

/// Writes rows under explicit headers.
pub fn write_csv<H, R>(headers: &[H], rows: R) -> Result<String, SerializeError>
where
    H: AsRef<str>,
    R: IntoIterator<Item = Vec<String>>,
{
    let mut wtr = csv::Writer::from_writer(vec![]);
    let headers: Vec<&str> = headers.iter().map(|h| h.as_ref()).collect();
    wtr.write_record(&headers)?;
    for row in rows {
        wtr.write_record(&row)?;
    }
    finish(wtr)
}

fn flatten_json_to_csv(value: &serde_json::Value) -> Result<String, SerializeError> {
    use serde_json::Value;

    let mut wtr = csv::Writer::from_writer(vec![]);

    match value {
        Value::Array(arr) if !arr.is_empty() => {
            if let Some(Value::Object(first)) = arr.first() {
                let headers: Vec<&str> = first.keys().map(|s| s.as_str()).collect();
                wtr.write_record(&headers)?;
                for item in arr {
                    if let Value::Object(obj) = item {
                        let row: Vec<String> = headers
                            .iter()
                            .map(|h| obj.get(*h).map(value_to_string).unwrap_or_default())
                            .collect();
                        wtr.write_record(&row)?;
                    }
                }
            } else {
                wtr.write_record(["value"])?;
                for item in arr {
                    wtr.write_record(&[value_to_string(item)])?;
                }
            }
        }
        Value::Object(obj) => {
            wtr.write_record(["key", "value"])?;
            for (k, v) in obj {
                wtr.write_record([k.as_str(), &value_to_string(v)])?;
            }
        }
        _ => {
            wtr.write_record(["value"])?;
            wtr.write_record(&[value_to_string(value)])?;
        }
    }

    finish(wtr)
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String, SerializeError> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| SerializeError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| SerializeError::Csv(e.to_string()))
}

/// Converts a JSON value to a string for CSV output.
fn value_to_string(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
