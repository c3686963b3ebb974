use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use tracing::{debug, warn};

use crate::errors::FileClientError;
use super::config::WebDAVConfig;
use super::url_management::WebDAVUrlManager;

/// An HTTP client bound to one user's collection. The bearer header is fixed
/// when the connection is built and sent with every request.
#[derive(Debug, Clone)]
pub struct WebDAVConnection {
    client: Client,
    config: WebDAVConfig,
    urls: WebDAVUrlManager,
}

impl WebDAVConnection {
    pub fn new(config: WebDAVConfig) -> Result<Self, FileClientError> {
        config
            .validate()
            .map_err(|e| FileClientError::configuration(e.to_string()))?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| FileClientError::configuration("Bearer token contains invalid characters"))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        let urls = WebDAVUrlManager::new(&config);

        Ok(Self {
            client,
            config,
            urls,
        })
    }

    pub fn config(&self) -> &WebDAVConfig {
        &self.config
    }

    pub fn urls(&self) -> &WebDAVUrlManager {
        &self.urls
    }

    /// Starts a request against a path relative to the collection root
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.urls.relative_path_to_url(path);
        debug!("{} {}", method, url);
        self.client.request(method, url)
    }

    /// Starts a PROPFIND with `Depth: 1` and the given XML body
    pub fn propfind(&self, path: &str, body: &'static str) -> Result<RequestBuilder, FileClientError> {
        let method = Method::from_bytes(b"PROPFIND")
            .map_err(|e| FileClientError::configuration(e.to_string()))?;

        Ok(self
            .request(method, path)
            .header("Depth", "1")
            .header(CONTENT_TYPE, "application/xml; charset=utf-8")
            .body(body))
    }

    /// Starts a request against an absolute URL on the API server
    pub fn api_request(&self, method: Method, url: &str) -> RequestBuilder {
        debug!("{} {}", method, url);
        self.client.request(method, url)
    }

    /// Sends the request once and maps non-success statuses to errors
    pub async fn send(&self, path: &str, request: RequestBuilder) -> Result<Response, FileClientError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        warn!("Request for '{}' failed with status: {}", path, status);
        Err(FileClientError::from_status(path, status, message))
    }
}
