//! REST API endpoints for Close

use serde::Serialize;

use crate::models::Stream;

/// Records requested per page
pub const PER_PAGE: u32 = 100;

/// API endpoint paths, relative to the API root
pub mod paths {
    pub const LEADS: &str = "/lead/";
    pub const ACTIVITIES: &str = "/activity/";
    pub const LEAD_CUSTOM_FIELDS: &str = "/custom_fields/lead/";
}

/// Build URL for a single contact, escaping the id as one path segment
pub fn contact_by_id(contact_id: &str) -> String {
    format!("/contact/{}/", urlencoding::encode(contact_id))
}

/// List endpoint for a stream
pub fn stream_path(stream: Stream) -> &'static str {
    match stream {
        Stream::Leads => paths::LEADS,
        Stream::Activities => paths::ACTIVITIES,
    }
}

/// List query parameters
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct ListParams {
    #[serde(rename = "_limit", skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(rename = "_skip", skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    /// Close search query, used for the leads filter and sort
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(rename = "date_created__gt", skip_serializing_if = "Option::is_none")]
    pub date_created_gt: Option<String>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter for a stream's incremental query starting at `watermark`.
    ///
    /// Leads are inclusive (`>=`) and sorted by `date_updated`; activities
    /// are strictly after the watermark.
    pub fn for_stream(stream: Stream, watermark: &str) -> Self {
        match stream {
            Stream::Leads => Self::new().query(format!(
                "date_updated >= {} sort:date_updated",
                watermark
            )),
            Stream::Activities => Self::new().date_created_after(watermark),
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn query(mut self, query: String) -> Self {
        self.query = Some(query);
        self
    }

    pub fn date_created_after(mut self, watermark: &str) -> Self {
        self.date_created_gt = Some(watermark.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leads_filter() {
        let params = ListParams::for_stream(Stream::Leads, "2021-01-01T00:00:00+00:00");
        assert_eq!(
            params.query.as_deref(),
            Some("date_updated >= 2021-01-01T00:00:00+00:00 sort:date_updated")
        );
        assert!(params.date_created_gt.is_none());
    }

    #[test]
    fn test_activities_filter() {
        let params = ListParams::for_stream(Stream::Activities, "2021-01-01T00:00:00Z");
        assert_eq!(params.date_created_gt.as_deref(), Some("2021-01-01T00:00:00Z"));
        assert!(params.query.is_none());
    }

    #[test]
    fn test_unset_params_are_not_serialized() {
        let value = serde_json::to_value(ListParams::new().limit(PER_PAGE).skip(200)).unwrap();
        assert_eq!(value, serde_json::json!({ "_limit": 100, "_skip": 200 }));
    }

    #[test]
    fn test_contact_path() {
        assert_eq!(contact_by_id("cont_abc"), "/contact/cont_abc/");
    }

    #[test]
    fn test_contact_path_escapes_reserved_chars() {
        assert_eq!(contact_by_id("a/b?c#d"), "/contact/a%2Fb%3Fc%23d/");
        assert_eq!(contact_by_id("x y"), "/contact/x%20y/");
    }
}
