use std::collections::HashMap;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use super::normalize::normalize_name;
use super::MndError;

/// Turns a raw MND response body into a typed value.
pub trait MndParser {
    type Output;

    fn parse(&self, body: &str) -> Result<Self::Output, MndError>;
}

/// Reads `list_total_count` from the response envelope.
pub struct TotalCountParser;

impl MndParser for TotalCountParser {
    type Output = u32;

    fn parse(&self, body: &str) -> Result<u32, MndError> {
        let envelope = envelope(body)?;
        let count = &envelope["list_total_count"];
        count
            .as_u64()
            .or_else(|| count.as_str().and_then(|s| s.trim().parse::<u64>().ok()))
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| {
                MndError::UpstreamFormat(format!("list_total_count is not a count: {}", count))
            })
    }
}

/// One upstream row with its serving date resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct MndRow {
    pub date: NaiveDate,
    pub record: HashMap<String, String>,
}

/// Parses the `row` array. The API only fills `dates` on the first row of a
/// day, so undated rows inherit the date of the row before them.
pub struct MndRowsParser;

impl MndParser for MndRowsParser {
    type Output = Vec<MndRow>;

    fn parse(&self, body: &str) -> Result<Vec<MndRow>, MndError> {
        let envelope = envelope(body)?;
        let rows = match envelope.get("row") {
            Some(Value::Array(rows)) => rows,
            Some(other) => {
                return Err(MndError::UpstreamFormat(format!(
                    "row is not an array: {}",
                    other
                )))
            }
            None => return Ok(Vec::new()),
        };

        let mut current: Option<NaiveDate> = None;
        let mut parsed = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let Some(object) = row.as_object() else {
                tracing::warn!("Skipping row {}: not an object", index);
                continue;
            };
            let record = flatten(object);

            let raw_date = record.get("dates").map(|d| normalize_name(d)).unwrap_or_default();
            if !raw_date.is_empty() {
                current = match NaiveDate::parse_from_str(&raw_date, "%Y-%m-%d") {
                    Ok(date) => Some(date),
                    Err(e) => {
                        tracing::warn!("Skipping rows dated {:?}: {}", raw_date, e);
                        None
                    }
                };
            }

            match current {
                Some(date) => parsed.push(MndRow { date, record }),
                None => tracing::warn!("Skipping row {}: no serving date", index),
            }
        }

        Ok(parsed)
    }
}

fn envelope(body: &str) -> Result<Map<String, Value>, MndError> {
    let root: Value = serde_json::from_str(body)
        .map_err(|e| MndError::UpstreamFormat(format!("invalid JSON: {}", e)))?;
    let Value::Object(root) = root else {
        return Err(MndError::UpstreamFormat("root is not an object".to_string()));
    };

    // The envelope sits under the service name, which differs per unit.
    root.into_iter()
        .find_map(|(_, value)| match value {
            Value::Object(inner) if inner.contains_key("list_total_count") => Some(inner),
            _ => None,
        })
        .ok_or_else(|| MndError::UpstreamFormat("list_total_count is missing".to_string()))
}

fn flatten(object: &Map<String, Value>) -> HashMap<String, String> {
    object
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((key.clone(), value))
        })
        .collect()
}
