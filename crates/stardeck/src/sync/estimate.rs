//! Count estimation pre-pass.
//!
//! Walks every page of the starred list once, cheaply, so the expensive
//! detail-collection phase starts with a known denominator for progress
//! percentages.

use crate::github::{GitHubClient, GitHubError, PAGE_SIZE};

/// Count the user's starred repositories by walking all pages.
///
/// Terminates on the first page shorter than [`PAGE_SIZE`]. A collection
/// whose size is an exact multiple of the page size therefore costs one
/// extra request that returns zero items; a full page alone never ends the
/// walk. Returns the first hard error unchanged.
pub async fn count_starred(client: &GitHubClient) -> Result<usize, GitHubError> {
    let mut total = 0usize;
    let mut page = 1usize;

    loop {
        let repos = client.list_starred_page(page).await?;
        total += repos.len();

        if repos.len() < PAGE_SIZE {
            break;
        }
        page += 1;
    }

    tracing::debug!(total, pages = page, "estimated starred repository count");
    Ok(total)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::fetch::RetryPolicy;
    use crate::http::{HttpMethod, MockTransport};

    const BASE: &str = "https://github.test";

    fn client(transport: &MockTransport) -> GitHubClient {
        GitHubClient::new(Arc::new(transport.clone()), "tok")
            .with_base_url(BASE)
            .with_retry_policy(RetryPolicy::immediate(3))
    }

    fn page_url(page: usize) -> String {
        format!("{BASE}/user/starred?page={page}&per_page=100")
    }

    /// JSON array of `count` minimal repo objects.
    fn page_body(count: usize, offset: usize) -> String {
        let items: Vec<String> = (0..count)
            .map(|i| {
                let id = offset + i;
                format!(r#"{{"id":{id},"name":"r{id}","html_url":"https://github.com/o/r{id}"}}"#)
            })
            .collect();
        format!("[{}]", items.join(","))
    }

    #[tokio::test]
    async fn empty_collection_yields_zero() {
        let transport = MockTransport::new();
        transport.push_json(HttpMethod::Get, page_url(1), "[]");

        let total = count_starred(&client(&transport)).await.unwrap();
        assert_eq!(total, 0);
        assert_eq!(transport.request_count(&page_url(1)), 1);
    }

    #[tokio::test]
    async fn short_first_page_terminates_immediately() {
        let transport = MockTransport::new();
        transport.push_json(HttpMethod::Get, page_url(1), &page_body(42, 0));

        let total = count_starred(&client(&transport)).await.unwrap();
        assert_eq!(total, 42);
    }

    #[tokio::test]
    async fn accumulates_across_multiple_pages() {
        let transport = MockTransport::new();
        transport.push_json(HttpMethod::Get, page_url(1), &page_body(100, 0));
        transport.push_json(HttpMethod::Get, page_url(2), &page_body(100, 100));
        transport.push_json(HttpMethod::Get, page_url(3), &page_body(17, 200));

        let total = count_starred(&client(&transport)).await.unwrap();
        assert_eq!(total, 217);
    }

    #[tokio::test]
    async fn exact_page_multiple_requires_confirming_empty_page() {
        let transport = MockTransport::new();
        transport.push_json(HttpMethod::Get, page_url(1), &page_body(100, 0));
        // A full page is not mistaken for the last: page 2 must be fetched
        // and come back empty before the walk stops.
        transport.push_json(HttpMethod::Get, page_url(2), "[]");

        let total = count_starred(&client(&transport)).await.unwrap();
        assert_eq!(total, 100);
        assert_eq!(transport.request_count(&page_url(2)), 1);
    }

    #[tokio::test]
    async fn hard_error_aborts_the_walk() {
        let transport = MockTransport::new();
        transport.push_json(HttpMethod::Get, page_url(1), &page_body(100, 0));
        transport.push_status(HttpMethod::Get, page_url(2), 500);

        let err = count_starred(&client(&transport))
            .await
            .expect_err("page failure should abort");
        assert!(matches!(err, GitHubError::Status { code: 500 }));
    }

    #[tokio::test]
    async fn transient_transport_failures_are_retried_within_a_page() {
        let transport = MockTransport::new();
        transport.push_transport_error(HttpMethod::Get, page_url(1), "timeout");
        transport.push_json(HttpMethod::Get, page_url(1), &page_body(3, 0));

        let total = count_starred(&client(&transport)).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(transport.request_count(&page_url(1)), 2);
    }
}
