//! Lead custom-field metadata

use serde::{Deserialize, Serialize};

/// Entry from /custom_fields/lead/
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomField {
    pub name: String,
    /// Absent or `null` for fields Close reports without a type
    #[serde(rename = "type", default)]
    pub field_type: Option<String>,
}
