//! Shapes shared by every Close list endpoint

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a paginated list response (`/lead/`, `/activity/`, `/custom_fields/lead/`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub data: Vec<Value>,
    #[serde(default)]
    pub has_more: Option<bool>,
}

impl ListResponse {
    /// Absent and `null` both mean "no more pages"
    pub fn has_more(&self) -> bool {
        self.has_more.unwrap_or(false)
    }
}

/// One batch of raw records and the offsets that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub records: Vec<Value>,
    /// Offset this page was requested at
    pub skip: u64,
    /// Offset of the following page: `skip + records.len()`
    pub next_skip: u64,
    pub has_more: bool,
}

impl Page {
    pub fn new(records: Vec<Value>, skip: u64, has_more: bool) -> Self {
        let next_skip = skip + records.len() as u64;
        Self {
            records,
            skip,
            next_skip,
            has_more,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_has_more_defaults_to_false() {
        let body: ListResponse = serde_json::from_value(json!({ "data": [] })).unwrap();
        assert!(!body.has_more());

        let body: ListResponse =
            serde_json::from_value(json!({ "data": [], "has_more": null })).unwrap();
        assert!(!body.has_more());

        let body: ListResponse =
            serde_json::from_value(json!({ "data": [{"id": "a"}], "has_more": true })).unwrap();
        assert!(body.has_more());
    }

    #[test]
    fn test_missing_data_is_rejected() {
        let result: std::result::Result<ListResponse, _> =
            serde_json::from_value(json!({ "has_more": false }));
        assert!(result.is_err());
    }

    #[test]
    fn test_next_skip_counts_returned_records() {
        let page = Page::new(vec![json!({}), json!({}), json!({})], 100, false);
        assert_eq!(page.next_skip, 103);
        assert_eq!(page.len(), 3);
    }
}
