/*
[INPUT]:  HTTP configuration (base URL, timeouts, credentials)
[OUTPUT]: Configured reqwest client ready for API calls
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
[UPDATE]: 2026-09-20 Keep base URL path prefix when joining endpoints
[UPDATE]: 2026-10-16 Build paths from encoded segments so ids cannot escape their route
*/

use reqwest::header::{HeaderValue, RETRY_AFTER};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::http::{Result, SearchwatchError};
use crate::types::ErrorResponse;

/// Default API root used when no base URL is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_ERROR_BODY_CHARS: usize = 300;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Credentials for authenticated requests
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Bearer token or API key issued by the backend
    pub api_key: String,
}

/// Main HTTP client for the task API
#[derive(Debug, Clone)]
pub struct SearchwatchClient {
    http_client: Client,
    base_url: Url,
    config: ClientConfig,
    credentials: Option<Credentials>,
}

impl SearchwatchClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::with_config_and_base_url(config, DEFAULT_BASE_URL)
    }

    /// Create a new client against an explicit API root
    pub fn with_config_and_base_url(config: ClientConfig, base_url: &str) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: normalize_base_url(base_url)?,
            config,
            credentials: None,
        })
    }

    /// Set credentials for authenticated requests
    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    /// Builder-style variant of [`set_credentials`](Self::set_credentials)
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Get credentials if set
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build full URL under the API root; each segment is percent-encoded
    fn url(&self, segments: &[&str]) -> Result<Url> {
        if let Some(bad) = segments
            .iter()
            .find(|segment| matches!(segment.trim(), "" | "." | ".."))
        {
            return Err(SearchwatchError::Config(format!("invalid path segment '{bad}'")));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                SearchwatchError::Config(format!("base URL '{}' cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Build request builder for endpoints that need no credentials
    pub(crate) fn public_request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.url(segments)?;
        Ok(self
            .http_client
            .request(method, url)
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string()))
    }

    /// Build request builder carrying the bearer credentials
    pub(crate) fn authed_request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            SearchwatchError::Authentication {
                message: "no API key configured".to_string(),
            }
        })?;
        let builder = self.public_request(method, segments)?;
        Ok(builder.bearer_auth(&credentials.api_key))
    }

    /// Send a request and decode the JSON body
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await.map_err(|err| self.map_transport(err))?;
        serde_json::from_slice(&bytes).map_err(SearchwatchError::from)
    }

    /// Send a request whose response body is ignored
    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> Result<()> {
        self.send(builder).await?;
        Ok(())
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let request = builder.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        debug!(%method, %path, "sending request");

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|err| self.map_transport(err))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        warn!(%method, %path, status = status.as_u16(), "request rejected");
        Err(error_from_response(response).await)
    }

    fn map_transport(&self, err: reqwest::Error) -> SearchwatchError {
        if err.is_timeout() {
            SearchwatchError::Timeout {
                duration: self.config.timeout.as_secs(),
            }
        } else {
            SearchwatchError::Http(err)
        }
    }
}

fn normalize_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SearchwatchError::Config("base URL must not be empty".to_string()));
    }
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(SearchwatchError::Config(format!(
            "base URL must use http or https, got '{}'",
            url.scheme()
        )));
    }
    Ok(url)
}

async fn error_from_response(response: Response) -> SearchwatchError {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(parse_retry_after);
    let body = response.text().await.unwrap_or_default();
    let message = error_message(status, &body);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SearchwatchError::Authentication { message }
        }
        StatusCode::TOO_MANY_REQUESTS => SearchwatchError::RateLimit {
            retry_after: retry_after.unwrap_or(1),
        },
        _ => SearchwatchError::api_error(status, message),
    }
}

fn parse_retry_after(value: &HeaderValue) -> Option<u64> {
    value.to_str().ok()?.trim().parse().ok()
}

fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
        return parsed.message();
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string();
    }
    trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_keeps_path_prefix() {
        let client =
            SearchwatchClient::with_config_and_base_url(ClientConfig::default(), "http://host/api/v1")
                .expect("client init");
        let url = client.url(&["tasks", "abc", "executions"]).expect("join");
        assert_eq!(url.as_str(), "http://host/api/v1/tasks/abc/executions");
    }

    #[test]
    fn task_id_stays_inside_its_segment() {
        let client =
            SearchwatchClient::with_config_and_base_url(ClientConfig::default(), "http://host/api/v1/")
                .expect("client init");
        let url = client.url(&["tasks", "../public/stats?x=1"]).expect("join");
        assert_eq!(url.as_str(), "http://host/api/v1/tasks/..%2Fpublic%2Fstats%3Fx=1");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn dot_or_blank_task_id_is_rejected() {
        let client = SearchwatchClient::new().expect("client init");
        for id in ["", "..", " . "] {
            let err = client.url(&["tasks", id]).expect_err("segment should be rejected");
            assert!(matches!(err, SearchwatchError::Config(_)));
        }
    }

    #[test]
    fn base_url_rejects_other_schemes() {
        let err = SearchwatchClient::with_config_and_base_url(ClientConfig::default(), "ftp://host")
            .expect_err("ftp should be rejected");
        assert!(matches!(err, SearchwatchError::Config(_)));
    }

    #[test]
    fn authed_request_requires_credentials() {
        let client = SearchwatchClient::new().expect("client init");
        let err = client
            .authed_request(Method::GET, &["tasks"])
            .expect_err("missing credentials");
        assert!(err.is_auth_error());
    }

    #[test]
    fn error_message_prefers_detail_then_body_then_reason() {
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, r#"{"detail":"Task not found"}"#),
            "Task not found"
        );
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, "upstream down"), "upstream down");
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, ""), "Bad Gateway");
    }
}
