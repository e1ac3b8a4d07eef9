//! Close custom-field type to JSON-schema mapping

use serde_json::{json, Value};

/// Map a Close custom-field type to a nullable JSON-schema fragment.
///
/// `date`/`datetime` become date-time strings, `number` becomes a number,
/// anything else (including a missing type and types Close adds later) is a
/// plain string.
pub fn json_type_for(field_type: Option<&str>) -> Value {
    match field_type {
        Some("date" | "datetime") => json!({ "type": ["null", "string"], "format": "date-time" }),
        Some("number") => json!({ "type": ["null", "number"] }),
        _ => json!({ "type": ["null", "string"] }),
    }
}
