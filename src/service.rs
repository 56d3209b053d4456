/// Emit a diagnostic event: `info` when the client runs in debug mode, `trace` otherwise
macro_rules! diagnostic {
    ($debug:expr, $($arg:tt)+) => {
        if $debug {
            tracing::info!($($arg)+)
        } else {
            tracing::trace!($($arg)+)
        }
    };
}

#[cfg(feature = "inpaint")]
pub mod inpaint;

#[cfg(feature = "segment")]
pub mod segment;

use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::Serialize;
use url::Url;

use crate::{
    auth::{Auth, BearerAuth},
    error::{Error, Result},
    utils,
};

pub const DEFAULT_BASE_URL: &str = "https://api.runpod.ai/v2/";
pub const DEFAULT_INPAINT_ENDPOINT_ID: &str = "906cbtg1541h5c";
pub const DEFAULT_SEGMENT_ENDPOINT_ID: &str = "your_default_segmentation_endpoint_id_here";

pub const API_KEY_ENV: &str = "RUNPOD_API_KEY";
pub const BASE_URL_ENV: &str = "RUNPOD_BASE_URL";
pub const INPAINT_ENDPOINT_ENV: &str = "RUNPOD_INPAINT_ENDPOINT_ID";
pub const SEGMENT_ENDPOINT_ENV: &str = "RUNPOD_SEGMENT_ENDPOINT_ID";

/// service config
#[derive(Debug, Clone)]
pub struct Config {
    auth: Option<BearerAuth>,
    base_url: Url,
    inpaint_endpoint: String,
    segment_endpoint: String,
    debug: bool,
}

impl Config {
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn inpaint_endpoint(&self) -> &str {
        &self.inpaint_endpoint
    }

    pub fn segment_endpoint(&self) -> &str {
        &self.segment_endpoint
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Fails with [`Error::MissingCredential`] when no token is configured
    pub fn auth(&self) -> Result<&BearerAuth> {
        self.auth.as_ref().ok_or(Error::MissingCredential)
    }

    fn create_header(&self) -> Result<HeaderMap> {
        let auth = self.auth()?;
        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_str(&utils::UserAgent::Bot.value()).map_err(Error::decode)?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        let mut value = HeaderValue::from_str(&auth.create_header())
            .map_err(|_| Error::InvalidCredential)?;
        value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, value);
        Ok(headers)
    }

    /// `{base_url}{endpoint_id}/runsync`. The id is always a single, percent-encoded path segment.
    pub fn runsync_url(&self, endpoint_id: &str) -> Result<Url> {
        if matches!(endpoint_id.trim(), "" | "." | "..") {
            return Err(Error::InvalidEndpoint(endpoint_id.to_string()));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidEndpoint(endpoint_id.to_string()))?
            .pop_if_empty()
            .push(endpoint_id)
            .push("runsync");
        Ok(url)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    auth: Option<BearerAuth>,
    base_url: Url,
    inpaint_endpoint: String,
    segment_endpoint: String,
    debug: bool,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    /// Create a new ConfigBuilder with the compiled-in defaults and no credential
    pub fn new() -> Self {
        Self {
            auth: None,
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            inpaint_endpoint: DEFAULT_INPAINT_ENDPOINT_ID.to_string(),
            segment_endpoint: DEFAULT_SEGMENT_ENDPOINT_ID.to_string(),
            debug: false,
        }
    }

    /// Create a new ConfigBuilder from the process environment
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::new();
        if let Ok(token) = std::env::var(API_KEY_ENV) {
            builder.auth = BearerAuth::non_empty(&token);
        }
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            builder = builder.base_url(Url::parse(&base_url)?);
        }
        if let Ok(endpoint) = std::env::var(INPAINT_ENDPOINT_ENV) {
            builder = builder.inpaint_endpoint(&endpoint);
        }
        if let Ok(endpoint) = std::env::var(SEGMENT_ENDPOINT_ENV) {
            builder = builder.segment_endpoint(&endpoint);
        }
        Ok(builder)
    }

    /// Set the bearer token. An empty token leaves the credential unset.
    pub fn api_key(self, token: &str) -> Self {
        Self {
            auth: BearerAuth::non_empty(token),
            ..self
        }
    }

    pub fn base_url(self, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { base_url, ..self }
    }

    pub fn inpaint_endpoint(self, endpoint_id: &str) -> Self {
        Self {
            inpaint_endpoint: endpoint_id.to_string(),
            ..self
        }
    }

    pub fn segment_endpoint(self, endpoint_id: &str) -> Self {
        Self {
            segment_endpoint: endpoint_id.to_string(),
            ..self
        }
    }

    pub fn debug(self, debug: bool) -> Self {
        Self { debug, ..self }
    }

    pub fn build(&self) -> Config {
        Config {
            auth: self.auth.clone(),
            base_url: self.base_url.clone(),
            inpaint_endpoint: self.inpaint_endpoint.clone(),
            segment_endpoint: self.segment_endpoint.clone(),
            debug: self.debug,
        }
    }
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    input: &'a T,
}

/// RunPod serverless client
#[derive(Debug, Clone)]
pub struct Client {
    client: reqwest::Client,
    config: Config,
}

impl Client {
    pub fn new(config: Config) -> Self {
        let client = reqwest::Client::new();
        Self { client, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// POST `{"input": input}` to the endpoint's `runsync` route and return the body text.
    ///
    /// Non-2xx responses become [`Error::Http`] carrying the status and body.
    pub(crate) async fn run_sync<T: Serialize>(&self, endpoint_id: &str, input: &T) -> Result<String> {
        let debug = self.config.debug;
        let headers = self.config.create_header()?;
        let url = self.config.runsync_url(endpoint_id)?;

        let payload = serde_json::to_value(input)?;
        diagnostic!(debug, url = %url, "POST");
        diagnostic!(debug, payload = %utils::summarize_payload(&payload), "Payload");

        let res = self
            .client
            .post(url)
            .headers(headers)
            .json(&Envelope { input: &payload })
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        diagnostic!(debug, status = status.as_u16(), "Response Status Code");
        diagnostic!(debug, length = body.len(), "Response Body");

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}


#[cfg(test)]
mod test {
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    fn config(server: &MockServer) -> Config {
        ConfigBuilder::new()
            .api_key("token")
            .base_url(Url::parse(&server.uri()).unwrap())
            .build()
    }

    #[test]
    fn test_default_urls() -> Result<()> {
        let config = ConfigBuilder::new().build();
        assert_eq!(
            config.runsync_url(config.inpaint_endpoint())?.as_str(),
            "https://api.runpod.ai/v2/906cbtg1541h5c/runsync"
        );
        Ok(())
    }

    #[test]
    fn test_base_url_without_trailing_slash() -> Result<()> {
        let config = ConfigBuilder::new()
            .base_url(Url::parse("http://localhost:8000/v2")?)
            .build();
        assert_eq!(
            config.runsync_url("abc")?.as_str(),
            "http://localhost:8000/v2/abc/runsync"
        );
        Ok(())
    }

    #[test]
    fn test_endpoint_id_stays_in_path() -> Result<()> {
        let config = ConfigBuilder::new().build();

        for endpoint_id in ["/escape", "../v1/x", "abc:def", "http://evil.example/x"] {
            let url = config.runsync_url(endpoint_id)?;
            assert_eq!(url.scheme(), "https");
            assert_eq!(url.host_str(), Some("api.runpod.ai"));
            assert!(url.path().starts_with("/v2/"), "{}", url);
            assert!(url.path().ends_with("/runsync"), "{}", url);
            assert_eq!(url.path_segments().map(|s| s.count()), Some(3), "{}", url);
        }
        assert_eq!(
            config.runsync_url("a/b")?.as_str(),
            "https://api.runpod.ai/v2/a%2Fb/runsync"
        );
        Ok(())
    }

    #[test]
    fn test_blank_endpoint_id_rejected() {
        let config = ConfigBuilder::new().build();
        for endpoint_id in ["", "  ", ".", ".."] {
            assert!(matches!(
                config.runsync_url(endpoint_id),
                Err(Error::InvalidEndpoint(_))
            ));
        }
    }

    #[test]
    fn test_invalid_token_is_not_missing() {
        let config = ConfigBuilder::new().api_key("bad\ntoken").build();
        assert!(matches!(config.create_header(), Err(Error::InvalidCredential)));
    }

    #[test]
    fn test_missing_credential() {
        let config = ConfigBuilder::new().api_key("").build();
        assert!(matches!(config.auth(), Err(Error::MissingCredential)));
    }

    #[tokio::test]
    async fn test_run_sync_request_shape() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ep/runsync"))
            .and(header("authorization", "Bearer token"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({"input": {"a": 1}})))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"ok\":true}"))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new(config(&server));
        let body = client.run_sync("ep", &serde_json::json!({"a": 1})).await?;
        assert_eq!(body, "{\"ok\":true}");
        Ok(())
    }

    #[tokio::test]
    async fn test_run_sync_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let client = Client::new(config(&server));
        let err = client
            .run_sync("ep", &serde_json::json!({}))
            .await
            .unwrap_err();
        match err {
            Error::Http { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "unavailable");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
