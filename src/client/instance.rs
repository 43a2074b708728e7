//! Client for a single backend instance.
//!
//! # Responsibilities
//! - Own the connection pool and static headers for one endpoint
//! - Turn an [`InstanceQuery`] into exactly one HTTP GET
//! - Buffer the whole body before classifying status and decoding
//!
//! # Design Decisions
//! - No retries and no caching; a failed call is final for the request
//! - Per-call timeout is the tighter of the instance timeout and the time left on the context
//! - 404 is reported as `NotFound`; the caller decides whether that is an answer

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use url::Url;

use crate::client::error::InstanceError;
use crate::client::query::InstanceQuery;
use crate::config::InstanceConfig;
use crate::context::QueryContext;

/// Tenant header understood by multi-tenant tracing backends.
pub const TENANT_HEADER: &str = "x-scope-orgid";

/// Request ID header forwarded to instances.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest error body kept in an [`InstanceError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// A single federated instance.
#[derive(Debug, Clone)]
pub struct InstanceClient {
    name: String,
    endpoint: Url,
    timeout: Duration,
    http: reqwest::Client,
}

impl InstanceClient {
    /// Build a client from validated instance configuration.
    pub fn new(config: &InstanceConfig) -> Result<Self, InstanceError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| InstanceError::InvalidEndpoint(format!("{}: {}", config.endpoint, e)))?;
        if endpoint.cannot_be_a_base() {
            return Err(InstanceError::InvalidEndpoint(config.endpoint.clone()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(tenant) = &config.tenant_id {
            let value = HeaderValue::from_str(tenant)
                .map_err(|_| InstanceError::InvalidHeader(TENANT_HEADER.to_string()))?;
            headers.insert(TENANT_HEADER, value);
        }
        for (key, value) in &config.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| InstanceError::InvalidHeader(key.clone()))?;
            let value =
                HeaderValue::from_str(value).map_err(|_| InstanceError::InvalidHeader(key.clone()))?;
            headers.insert(name, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(InstanceError::Client)?;

        Ok(Self {
            name: config.name.clone(),
            endpoint,
            timeout: config.timeout(),
            http,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Full URL for `query` on this instance, keeping any endpoint path prefix.
    pub fn url_for<Q: InstanceQuery>(&self, query: &Q) -> Result<Url, InstanceError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| InstanceError::InvalidEndpoint(self.endpoint.to_string()))?
            .pop_if_empty()
            .extend(query.path_segments());
        url.set_query(query.raw_query().filter(|q| !q.is_empty()));
        Ok(url)
    }

    /// Issue `query` against this instance.
    pub async fn call<Q: InstanceQuery>(
        &self,
        ctx: &QueryContext,
        query: &Q,
    ) -> Result<Q::Response, InstanceError> {
        let url = self.url_for(query)?;
        let timeout = self.timeout.min(ctx.remaining());
        if timeout.is_zero() {
            return Err(InstanceError::DeadlineExceeded);
        }

        tracing::debug!(instance = %self.name, kind = %query.kind(), url = %url, "Querying instance");

        let mut request = self.http.get(url).timeout(timeout);
        if let Some(request_id) = ctx.request_id() {
            request = request.header(REQUEST_ID_HEADER, request_id);
        }

        let response = request.send().await.map_err(InstanceError::Transport)?;
        let status = response.status();
        let body = response.bytes().await.map_err(InstanceError::Transport)?;

        if status == StatusCode::NOT_FOUND {
            return Err(InstanceError::NotFound);
        }
        if !status.is_success() {
            return Err(InstanceError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(query.decode(&body)?)
    }
}

fn truncate_body(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    match text.char_indices().nth(MAX_ERROR_BODY) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::query::{SearchQuery, TagValuesV2Query, TraceByIdQuery};

    fn client(endpoint: &str) -> InstanceClient {
        InstanceClient::new(&InstanceConfig::new("test", endpoint)).unwrap()
    }

    #[test]
    fn test_url_keeps_endpoint_prefix() {
        let url = client("http://tempo:3200/tempo/")
            .url_for(&TraceByIdQuery::new("abc123", None))
            .unwrap();
        assert_eq!(url.as_str(), "http://tempo:3200/tempo/api/traces/abc123");
    }

    #[test]
    fn test_url_forwards_query_verbatim() {
        let url = client("http://tempo:3200")
            .url_for(&SearchQuery::search(Some("tags=service.name%3Dapi&limit=5".into())))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://tempo:3200/api/search?tags=service.name%3Dapi&limit=5"
        );
    }

    #[test]
    fn test_url_encodes_tag_name() {
        let url = client("http://tempo:3200")
            .url_for(&TagValuesV2Query::tag_values_v2("span.http/route", None))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://tempo:3200/api/v2/search/tag/span.http%2Froute/values"
        );
    }

    #[test]
    fn test_rejects_bad_header() {
        let mut config = InstanceConfig::new("test", "http://tempo:3200");
        config.headers.insert("bad header".into(), "x".into());
        assert!(matches!(
            InstanceClient::new(&config),
            Err(InstanceError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(MAX_ERROR_BODY + 10);
        let truncated = truncate_body(long.as_bytes());
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.len(), MAX_ERROR_BODY + 3);
        assert_eq!(truncate_body(b" oops \n"), "oops");
    }

    #[tokio::test]
    async fn test_expired_context_short_circuits() {
        let ctx = QueryContext::with_timeout(Duration::ZERO);
        let err = client("http://127.0.0.1:9")
            .call(&ctx, &TraceByIdQuery::new("abc", None))
            .await
            .unwrap_err();
        assert!(matches!(err, InstanceError::DeadlineExceeded));
    }
}
