use std::sync::Arc;

use async_trait::async_trait;
use lazylist::{FetchError, PageFetcher, PageRequest};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;

/// Supplies the bearer token for each request. `None` (or an empty string) sends no
/// `Authorization` header.
pub type TokenProvider = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// A [`PageFetcher`] that issues `GET request.url` and parses the JSON body.
///
/// Every request carries `Content-Type: application/json`. A token provider, when set, is
/// consulted per request so rotated tokens are picked up without rebuilding the fetcher.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    token: Option<TokenProvider>,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Reuses an existing client (connection pool, timeouts, proxies).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            token: None,
        }
    }

    /// Sends a fixed bearer token.
    pub fn with_bearer(self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.with_token_provider(move || Some(token.clone()))
    }

    pub fn with_token_provider(
        mut self,
        provider: impl Fn() -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.token = Some(Arc::new(provider));
        self
    }

    pub(crate) fn token(&self) -> Option<String> {
        self.token
            .as_ref()
            .and_then(|provider| provider())
            .filter(|token| !token.trim().is_empty())
    }
}

impl core::fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("token", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, request: PageRequest) -> Result<Value, FetchError> {
        let Some(url) = request.url.as_deref() else {
            return Err(FetchError::Unknown(
                "no request URL: configure an endpoint or a URL builder".to_owned(),
            ));
        };

        let mut builder = self
            .client
            .get(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let Some(token) = self.token() {
            builder = builder.bearer_auth(token);
        }

        adebug!(url, page = request.page, "GET");
        let response = builder.send().await.map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            awarn!(url, status = status.as_u16(), "page request rejected");
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: status_message(status, &body),
            });
        }

        let body = response.bytes().await.map_err(request_error)?;
        serde_json::from_slice(&body).map_err(FetchError::from)
    }
}

fn request_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Transport("request timed out".to_owned())
    } else if err.is_connect() || err.is_request() || err.is_body() {
        FetchError::Transport(err.to_string())
    } else {
        FetchError::Unknown(err.to_string())
    }
}

/// Prefers a `message`/`error` field from a JSON error body, then the raw body, then the
/// status's reason phrase.
pub(crate) fn status_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        let field = ["message", "error"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str));
        if let Some(message) = field.filter(|m| !m.is_empty()) {
            return message.to_owned();
        }
    }
    if !body.is_empty() {
        return body.to_owned();
    }
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_owned()
}
