//! Skip/limit pagination over Close list endpoints

use futures::stream::{self, Stream};

use super::client::CloseClient;
use super::endpoints::{ListParams, PER_PAGE};
use crate::error::{ApiError, ApiResult};
use crate::models::Page;

/// Lazily walks a list endpoint one page at a time.
///
/// Each request carries `_limit=100` and the current `_skip`. The walk ends
/// when a response has no records or `has_more` is absent/false. Skip
/// advances by the number of records actually returned.
pub struct Paginator<'a> {
    client: &'a CloseClient,
    /// Stream label for request metrics
    stream: &'a str,
    path: &'a str,
    params: ListParams,
    skip: u64,
    done: bool,
}

impl<'a> Paginator<'a> {
    pub fn new(client: &'a CloseClient, stream: &'a str, path: &'a str, params: ListParams) -> Self {
        Self {
            client,
            stream,
            path,
            params,
            skip: 0,
            done: false,
        }
    }

    /// Restart the walk from `skip`
    pub fn starting_at(mut self, skip: u64) -> Self {
        self.skip = skip;
        self.done = false;
        self
    }

    /// Offset the next request will use
    pub fn skip(&self) -> u64 {
        self.skip
    }

    /// Fetch the next page, or `None` once the endpoint is exhausted
    pub async fn next_page(&mut self) -> ApiResult<Option<Page>> {
        if self.done {
            return Ok(None);
        }

        let params = self.params.clone().limit(PER_PAGE).skip(self.skip);
        tracing::debug!(
            "Fetching {} with offset {} and limit {}",
            self.path,
            self.skip,
            PER_PAGE
        );

        let response = match self.client.get_list(self.stream, self.path, &params).await {
            Ok(response) => response,
            Err(e) => {
                self.done = true;
                return Err(e);
            }
        };

        let has_more = response.has_more();
        let page = Page::new(response.data, self.skip, has_more);
        if page.is_empty() {
            self.done = true;
            return Ok(None);
        }

        self.skip = page.next_skip;
        if !has_more {
            self.done = true;
        }

        Ok(Some(page))
    }

    /// Expose the walk as a `Stream` of pages
    pub fn into_stream(self) -> impl Stream<Item = ApiResult<Page>> + 'a {
        stream::try_unfold(self, |mut paginator| async move {
            let page = paginator.next_page().await?;
            Ok::<_, ApiError>(page.map(|page| (page, paginator)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::tests::test_client;
    use crate::api::endpoints::paths;
    use futures::TryStreamExt;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn records(count: usize, offset: usize) -> Vec<Value> {
        (0..count)
            .map(|i| json!({ "id": format!("lead_{}", i + offset) }))
            .collect()
    }

    async fn mount_page(server: &MockServer, skip: u64, body: Value) {
        Mock::given(method("GET"))
            .and(path("/lead/"))
            .and(query_param("_limit", "100"))
            .and(query_param("_skip", skip.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn walks_until_empty_page() {
        let server = MockServer::start().await;
        mount_page(&server, 0, json!({ "data": records(100, 0), "has_more": true })).await;
        mount_page(&server, 100, json!({ "data": records(3, 100), "has_more": true })).await;
        mount_page(&server, 103, json!({ "data": [], "has_more": false })).await;

        let client = test_client(&server);
        let mut paginator = Paginator::new(&client, "leads", paths::LEADS, ListParams::new());

        let first = paginator.next_page().await.unwrap().unwrap();
        assert_eq!((first.skip, first.next_skip, first.len()), (0, 100, 100));

        let second = paginator.next_page().await.unwrap().unwrap();
        assert_eq!((second.skip, second.next_skip, second.len()), (100, 103, 3));

        assert!(paginator.next_page().await.unwrap().is_none());
        // Exhausted paginators stay exhausted without further requests
        assert!(paginator.next_page().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stops_when_has_more_is_absent() {
        let server = MockServer::start().await;
        mount_page(&server, 0, json!({ "data": records(100, 0) })).await;

        let client = test_client(&server);
        let pages: Vec<Page> = Paginator::new(&client, "leads", paths::LEADS, ListParams::new())
            .into_stream()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(pages.len(), 1);
        assert!(!pages[0].has_more);
    }

    #[tokio::test]
    async fn advances_by_records_returned_not_limit() {
        let server = MockServer::start().await;
        mount_page(&server, 0, json!({ "data": records(40, 0), "has_more": true })).await;
        mount_page(&server, 40, json!({ "data": records(2, 40), "has_more": false })).await;

        let client = test_client(&server);
        let pages: Vec<Page> = Paginator::new(&client, "leads", paths::LEADS, ListParams::new())
            .into_stream()
            .try_collect()
            .await
            .unwrap();

        let total: usize = pages.iter().map(Page::len).sum();
        assert_eq!(total, 42);
        for page in &pages {
            assert_eq!(page.next_skip, page.skip + page.len() as u64);
        }
    }

    #[tokio::test]
    async fn restarts_from_offset() {
        let server = MockServer::start().await;
        mount_page(&server, 250, json!({ "data": records(1, 250), "has_more": false })).await;

        let client = test_client(&server);
        let mut paginator =
            Paginator::new(&client, "leads", paths::LEADS, ListParams::new()).starting_at(250);

        let page = paginator.next_page().await.unwrap().unwrap();
        assert_eq!(page.skip, 250);
        assert_eq!(page.records[0]["id"], "lead_250");
        assert_eq!(paginator.skip(), 251);
    }

    #[tokio::test]
    async fn keeps_stream_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/activity/"))
            .and(query_param("date_created__gt", "2021-01-01T00:00:00Z"))
            .and(query_param("_skip", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let params = ListParams::new().date_created_after("2021-01-01T00:00:00Z");
        let mut paginator = Paginator::new(&client, "activities", paths::ACTIVITIES, params);
        assert!(paginator.next_page().await.unwrap().is_none());
    }
}
