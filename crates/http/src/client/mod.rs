//! SCM portal HTTP client
//!
//! Every request goes through [`ScmClient::request`], which rewrites the path
//! under the configured prefix and attaches the bearer token, and every
//! response through [`ScmClient::execute`], which turns error statuses into
//! [`ClientError`]s and ends the session on a 401.

pub mod admin;
pub mod dashboard;
pub mod error;
pub mod items;
pub mod projects;
pub mod rfx;
pub mod supplier_evaluations;

use crate::session::{MemoryTokenStore, Navigator, NoopNavigator, TokenStore};
use error::{ClientError, extract_message};
use reqwest::{Client, ClientBuilder, Response, StatusCode, header};
use scm_core::settings::{DEFAULT_LOGIN_ROUTE, DEFAULT_TIMEOUT_SECS};
use scm_core::{BaseConfiguration, join_origin};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const USER_AGENT: &str = concat!("scm-client/", env!("CARGO_PKG_VERSION"));

/// SCM API client
#[derive(Clone)]
pub struct ScmClient {
    client: Client,
    base: Arc<BaseConfiguration>,
    origin: Arc<str>,
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    login_route: Arc<str>,
}

impl ScmClient {
    /// Create a client for `base` with default capabilities
    pub fn new(base: BaseConfiguration) -> Result<Self, ClientError> {
        Self::builder().base(base).build()
    }

    /// Create a new client builder
    pub fn builder() -> ScmClientBuilder {
        ScmClientBuilder::default()
    }

    /// Resolved base configuration
    pub fn base(&self) -> &BaseConfiguration {
        &self.base
    }

    /// Origin every relative request is sent to
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Token store backing this client
    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Full URL for a request path after prefix rewriting
    pub fn url(&self, path: &str) -> String {
        join_origin(&self.origin, &self.base.rewrite_path(path))
    }

    /// Create a request builder with the path prefix and authentication applied
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = self.url(path);
        tracing::trace!(%method, %url, "Preparing request");

        let mut request = self.client.request(method, url);
        if let Some(token) = self.tokens.token() {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        request
    }

    /// Execute a request and decode its JSON body.
    ///
    /// An empty body decodes as JSON `null`, so `Option<T>` and
    /// `serde_json::Value` accept bodiless success responses.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        let body = response.bytes().await?;
        let body: &[u8] = if body.is_empty() { b"null" } else { &body };
        Ok(serde_json::from_slice(body)?)
    }

    /// Execute a request whose response body is not needed
    pub async fn execute_empty(&self, request: reqwest::RequestBuilder) -> Result<(), ClientError> {
        self.send(request).await.map(drop)
    }

    /// Execute a request and return the raw body with its content type
    pub async fn execute_bytes(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<(String, bytes::Bytes), ClientError> {
        let response = self.send(request).await?;
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        Ok((content_type, response.bytes().await?))
    }

    /// Execute a request that is abandoned as soon as `cancel` fires.
    ///
    /// Cancellation is not a failure of the session: the token is kept and no
    /// navigation happens.
    pub async fn execute_cancellable<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        cancel: &CancellationToken,
    ) -> Result<T, ClientError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!("Request canceled");
                Err(ClientError::Canceled)
            }
            result = self.execute(request) => result,
        }
    }

    /// Send a request and map error statuses
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, ClientError> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(
                    error = %err,
                    timeout = err.is_timeout(),
                    "Network or server error"
                );
                return Err(err.into());
            }
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_message(status, &body);

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(%message, "Unauthorized, token may be expired");
            self.tokens.clear_token();
            self.navigator.navigate(&self.login_route);
        } else {
            tracing::error!(status = status.as_u16(), %message, "Request failed");
        }

        Err(ClientError::from_status(status, message))
    }
}

/// Builder for ScmClient
pub struct ScmClientBuilder {
    base: Option<BaseConfiguration>,
    tokens: Option<Arc<dyn TokenStore>>,
    navigator: Option<Arc<dyn Navigator>>,
    login_route: String,
    timeout: Duration,
    user_agent: Option<String>,
}

impl Default for ScmClientBuilder {
    fn default() -> Self {
        Self {
            base: None,
            tokens: None,
            navigator: None,
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: None,
        }
    }
}

impl ScmClientBuilder {
    /// Set the resolved base configuration
    pub fn base(mut self, base: BaseConfiguration) -> Self {
        self.base = Some(base);
        self
    }

    /// Set where the bearer token is read from and cleared
    pub fn token_store(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Set what happens when the session expires
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Set the route navigated to on a 401
    pub fn login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ScmClient, ClientError> {
        let base = self
            .base
            .ok_or_else(|| ClientError::Configuration("base configuration is required".into()))?;
        let origin: Arc<str> = base
            .origin()
            .ok_or_else(|| {
                ClientError::Configuration(
                    "no API origin: set SCM_API_BASE or provide a page location".into(),
                )
            })?
            .into();

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let mut client_builder = ClientBuilder::new()
            .default_headers(default_headers)
            .user_agent(self.user_agent.unwrap_or_else(|| USER_AGENT.to_string()));

        #[cfg(not(target_arch = "wasm32"))]
        {
            client_builder = client_builder.timeout(self.timeout);
        }

        #[cfg(target_arch = "wasm32")]
        let _ = self.timeout; // Timeouts not supported on WASM

        let client = client_builder.build()?;

        Ok(ScmClient {
            client,
            base: Arc::new(base),
            origin,
            tokens: self
                .tokens
                .unwrap_or_else(|| Arc::new(MemoryTokenStore::new())),
            navigator: self.navigator.unwrap_or_else(|| Arc::new(NoopNavigator)),
            login_route: self.login_route.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MockTokenStore;
    use scm_core::ResolveOptions;

    fn base(configured: &str) -> BaseConfiguration {
        BaseConfiguration::resolve(Some(configured), None, ResolveOptions::default())
    }

    #[test]
    fn builder_requires_an_origin() {
        let unresolved =
            BaseConfiguration::resolve(Some("/api-gateway"), None, ResolveOptions::default());
        let result = ScmClient::builder().base(unresolved).build();
        assert!(matches!(result, Err(ClientError::Configuration(_))));

        let result = ScmClient::builder().build();
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }

    #[test]
    fn urls_are_rewritten_under_prefix() {
        let client = ScmClient::new(base("https://gateway.acme.com/scm/v2/")).unwrap();
        assert_eq!(client.origin(), "https://gateway.acme.com");
        assert_eq!(
            client.url("/api/users"),
            "https://gateway.acme.com/scm/v2/api/users"
        );
        assert_eq!(
            client.url("/scm/v2/api/users"),
            "https://gateway.acme.com/scm/v2/api/users"
        );
        assert_eq!(client.url("https://cdn.acme.com/f.pdf"), "https://cdn.acme.com/f.pdf");
    }

    #[test]
    fn bearer_token_is_attached_when_present() {
        let mut tokens = MockTokenStore::new();
        tokens.expect_token().times(1).returning(|| Some("jwt".into()));

        let client = ScmClient::builder()
            .base(base("https://backend.acme.com"))
            .token_store(Arc::new(tokens))
            .build()
            .unwrap();

        let request = client
            .request(reqwest::Method::GET, "/api/users")
            .build()
            .unwrap();
        assert_eq!(request.url().as_str(), "https://backend.acme.com/api/users");
        assert_eq!(
            request.headers().get(header::AUTHORIZATION).unwrap(),
            "Bearer jwt"
        );
    }

    #[test]
    fn no_header_without_token() {
        let mut tokens = MockTokenStore::new();
        tokens.expect_token().returning(|| None);

        let client = ScmClient::builder()
            .base(base("https://backend.acme.com"))
            .token_store(Arc::new(tokens))
            .build()
            .unwrap();

        let request = client
            .request(reqwest::Method::GET, "api/users")
            .build()
            .unwrap();
        assert!(request.headers().get(header::AUTHORIZATION).is_none());
        assert_eq!(request.url().path(), "/api/users");
    }
}
