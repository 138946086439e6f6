//! Decoding of a whole budget snapshot.

use serde_json::Value;

use super::BudgetRecord;
use crate::error::AlertError;

/// Decode a snapshot into records.
///
/// Accepts a bare array, `{"budgets": [...]}`, or the Budget Status envelope
/// `{"success": true, "data": {"budgets": [...]}}`. Anything that is not a
/// sequence of record-like objects is reported as [`AlertError::InvalidInput`];
/// an empty array is a valid, empty snapshot.
///
/// A record object without a usable `budget_id` is skipped with a warning.
/// The other records still come through.
pub fn parse_snapshot(value: &Value) -> Result<Vec<BudgetRecord>, AlertError> {
    let items = records_array(value).ok_or_else(|| {
        AlertError::InvalidInput(format!(
            "expected an array of budget records, got {}",
            kind_of(value)
        ))
    })?;

    if let Some((index, item)) = items.iter().enumerate().find(|(_, item)| !item.is_object()) {
        return Err(AlertError::InvalidInput(format!(
            "record {} is {}, not an object",
            index,
            kind_of(item)
        )));
    }

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match serde_json::from_value::<BudgetRecord>(item.clone()) {
            Ok(record) => {
                if !record.period.is_known() {
                    tracing::debug!(
                        index,
                        period = record.period.as_str(),
                        "Unknown budget period, treating as monthly"
                    );
                }
                records.push(record);
            }
            Err(e) => tracing::warn!(index, "Skipping budget record: {}", e),
        }
    }
    Ok(records)
}

fn records_array(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => map
            .get("budgets")
            .or_else(|| map.get("data").and_then(|data| data.get("budgets")))
            .and_then(Value::as_array),
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
