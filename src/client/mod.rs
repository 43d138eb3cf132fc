//! Base client: API root, verb helpers, and the status/decode plumbing every
//! resource wrapper goes through.

pub mod query;
pub mod transport;

use reqwest::header::HeaderMap;
use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::api::{
    Acl, Adhoc, ClusterScheduler, Executions, Jobs, KeyStorage, LogStorage, Projects, System,
    Tokens, Users,
};
use crate::config::Config;
use crate::error::{ApiError, Result, RundeckError};

pub use query::{Query, ToQuery};
pub use transport::{AUTH_TOKEN_HEADER, Transport};

/// Client for a single Rundeck server.
#[derive(Debug, Clone)]
pub struct Client {
    config: Config,
    api_root: Url,
    transport: Transport,
}

impl Client {
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Self::with_http_client(config, http)
    }

    /// Uses a caller-built HTTP client, e.g. one with timeouts configured.
    pub fn with_http_client(config: Config, http: reqwest::Client) -> Result<Self> {
        let api_root = api_root(&config)?;
        let transport = Transport::new(http, &config.auth_token)?;
        Ok(Self {
            config,
            api_root,
            transport,
        })
    }

    /// Client configured from the `RUNDECK_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env()?)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// `<server url>/api/<version>`.
    pub fn api_root(&self) -> &str {
        self.api_root.as_str()
    }

    /// Replaces the auth token used by subsequent calls.
    pub fn set_api_token(&mut self, token: impl Into<String>) -> Result<()> {
        let token = token.into();
        self.transport.set_token(&token)?;
        self.config.auth_token = token;
        Ok(())
    }

    pub fn projects(&self) -> Projects<'_> {
        Projects::new(self)
    }

    pub fn jobs(&self) -> Jobs<'_> {
        Jobs::new(self)
    }

    pub fn executions(&self) -> Executions<'_> {
        Executions::new(self)
    }

    pub fn tokens(&self) -> Tokens<'_> {
        Tokens::new(self)
    }

    pub fn acl(&self) -> Acl<'_> {
        Acl::new(self)
    }

    pub fn users(&self) -> Users<'_> {
        Users::new(self)
    }

    pub fn system(&self) -> System<'_> {
        System::new(self)
    }

    pub fn key_storage(&self) -> KeyStorage<'_> {
        KeyStorage::new(self)
    }

    pub fn log_storage(&self) -> LogStorage<'_> {
        LogStorage::new(self)
    }

    pub fn scheduler(&self) -> ClusterScheduler<'_> {
        ClusterScheduler::new(self)
    }

    pub fn adhoc(&self) -> Adhoc<'_> {
        Adhoc::new(self)
    }

    /// API root joined with percent-encoded path segments.
    pub fn endpoint<I, S>(&self, segments: I) -> Result<Url>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = self.api_root.clone();
        url.path_segments_mut()
            .map_err(|_| cannot_be_base(&self.config.server_url))?
            .extend(segments);
        Ok(url)
    }

    /// Like [`endpoint`](Self::endpoint) but with a trailing `/`.
    pub fn endpoint_dir<I, S>(&self, segments: I) -> Result<Url>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = self.endpoint(segments)?;
        url.path_segments_mut()
            .map_err(|_| cannot_be_base(&self.config.server_url))?
            .push("");
        Ok(url)
    }

    /// Same as [`endpoint`](Self::endpoint) with a query appended.
    pub fn endpoint_with_query<I, S>(&self, segments: I, query: &Query) -> Result<Url>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = self.endpoint(segments)?;
        query.apply(&mut url);
        Ok(url)
    }

    pub async fn get(&self, url: Url) -> Result<Response> {
        self.send(Method::GET, url, HeaderMap::new(), None).await
    }

    pub async fn get_with_headers(&self, url: Url, headers: HeaderMap) -> Result<Response> {
        self.send(Method::GET, url, headers, None).await
    }

    pub async fn post(&self, url: Url, body: Option<Vec<u8>>) -> Result<Response> {
        self.send(Method::POST, url, HeaderMap::new(), body).await
    }

    pub async fn post_with_headers(
        &self,
        url: Url,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> Result<Response> {
        self.send(Method::POST, url, headers, body).await
    }

    pub async fn put(&self, url: Url, body: Option<Vec<u8>>) -> Result<Response> {
        self.send(Method::PUT, url, HeaderMap::new(), body).await
    }

    pub async fn put_with_headers(
        &self,
        url: Url,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> Result<Response> {
        self.send(Method::PUT, url, headers, body).await
    }

    pub async fn delete(&self, url: Url, body: Option<Vec<u8>>) -> Result<Response> {
        self.send(Method::DELETE, url, HeaderMap::new(), body).await
    }

    pub async fn delete_with_headers(
        &self,
        url: Url,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> Result<Response> {
        self.send(Method::DELETE, url, headers, body).await
    }

    /// Issues one request through the transport. Caller headers are set
    /// before decoration, so they take precedence over the JSON defaults.
    #[instrument(level = "debug", skip_all, fields(method = %method, url = %url))]
    async fn send(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> Result<Response> {
        let mut builder = self.transport.http().request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        let request = builder.build()?;

        let response = self.transport.execute(request).await?;
        debug!(status = %response.status(), "response received");
        Ok(response)
    }

    /// Passes the response through if it has the expected status, otherwise
    /// reads the body into a normalized [`ApiError`].
    pub async fn expect_status(
        &self,
        response: Response,
        expected: StatusCode,
    ) -> Result<Response> {
        let status = response.status();
        if status == expected {
            return Ok(response);
        }

        let url = response.url().clone();
        let body = response.bytes().await?;
        let error = ApiError::from_body(status, &body);
        warn!(
            url = %url,
            status = status.as_u16(),
            expected = expected.as_u16(),
            error_code = %error.error_code,
            "unexpected response status"
        );
        Err(RundeckError::Api {
            status: status.as_u16(),
            error,
        })
    }

    pub async fn expect_ok(&self, response: Response) -> Result<Response> {
        self.expect_status(response, StatusCode::OK).await
    }

    pub async fn expect_created(&self, response: Response) -> Result<Response> {
        self.expect_status(response, StatusCode::CREATED).await
    }

    pub async fn expect_no_content(&self, response: Response) -> Result<()> {
        self.expect_status(response, StatusCode::NO_CONTENT).await?;
        Ok(())
    }

    /// JSON-decodes the response body.
    pub async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Raw response body.
    pub async fn bytes(&self, response: Response) -> Result<Vec<u8>> {
        Ok(response.bytes().await?.to_vec())
    }

    /// Serializes a request payload.
    pub fn json_body<B: Serialize + ?Sized>(&self, body: &B) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(body)?)
    }
}

fn api_root(config: &Config) -> Result<Url> {
    let raw = format!(
        "{}/api/{}",
        query::sanitize_addr(config.server_url.trim()),
        config.api_version
    );
    let url = Url::parse(&raw)?;
    if url.cannot_be_a_base() {
        return Err(cannot_be_base(&config.server_url));
    }
    Ok(url)
}

fn cannot_be_base(server_url: &str) -> RundeckError {
    RundeckError::Config(format!("server URL cannot be used as a base: {server_url}"))
}
