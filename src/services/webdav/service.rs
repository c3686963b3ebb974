use reqwest::header::{CONTENT_TYPE, IF_NONE_MATCH};
use reqwest::Method;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::auth::SessionProvider;
use crate::errors::FileClientError;
use crate::models::{AnnotatedEntry, FileEntry, UserDetails};
use crate::services::save_target::SaveTarget;
use crate::utils::annotate;
use crate::webdav_xml_parser::{parse_propfind_response, PROPFIND_BODY};

use super::config::{LogoutPolicy, WebDAVConfig};
use super::connection::WebDAVConnection;

/// File operations on the signed-in user's collection.
///
/// The connection and its bearer header are built once; a rotated token needs
/// a new client.
pub struct FileClient {
    connection: WebDAVConnection,
    sessions: Arc<dyn SessionProvider>,
    logout_policy: LogoutPolicy,
}

impl FileClient {
    /// Creates a client for the provider's current session
    pub fn for_current_user(
        server_url: &str,
        sessions: Arc<dyn SessionProvider>,
    ) -> Result<Self, FileClientError> {
        let session = sessions
            .current_session()
            .ok_or_else(|| FileClientError::configuration("No signed-in session"))?;

        Self::configure(WebDAVConfig::for_session(server_url, &session), sessions)
    }

    pub fn configure(
        config: WebDAVConfig,
        sessions: Arc<dyn SessionProvider>,
    ) -> Result<Self, FileClientError> {
        let logout_policy = config.logout_policy;
        let connection = WebDAVConnection::new(config)?;
        info!("📁 File client configured for {}", connection.urls().base_url());

        Ok(Self {
            connection,
            sessions,
            logout_policy,
        })
    }

    pub fn base_url(&self) -> &str {
        self.connection.urls().base_url()
    }

    /// Lists the collection root with display fields added.
    ///
    /// Returns `None` when the listing fails. Under the default policy every
    /// failure also logs the user out, transient network errors included.
    pub async fn list(&self) -> Option<Vec<AnnotatedEntry>> {
        match self.try_list().await {
            Ok(entries) => Some(entries.into_iter().map(annotate).collect()),
            Err(e) => {
                if self.logout_policy.should_logout(&e) {
                    error!("❌ Listing failed, ending session: {}", e);
                    self.sessions.logout().await;
                } else {
                    warn!("Listing failed: {}", e);
                }
                None
            }
        }
    }

    /// Lists the collection root without side effects on the session.
    pub async fn try_list(&self) -> Result<Vec<FileEntry>, FileClientError> {
        let request = self.connection.propfind("/", PROPFIND_BODY)?;
        let response = self.connection.send("/", request).await?;
        let body = response.text().await?;

        let urls = self.connection.urls();
        let entries: Vec<FileEntry> = parse_propfind_response(&body)?
            .into_iter()
            .filter(|entry| !urls.is_collection_root(&entry.path))
            .map(|mut entry| {
                entry.path = urls.href_to_relative_path(&entry.path);
                entry
            })
            .collect();

        debug!("Listed {} entries", entries.len());
        Ok(entries)
    }

    /// Stores `bytes` at `name`. With `overwrite` off an existing resource is
    /// left alone and the server answers 412.
    ///
    /// A stored upload yields `Ok(true)`; every failure is an `Err`.
    pub async fn upload(
        &self,
        name: &str,
        bytes: Vec<u8>,
        overwrite: bool,
    ) -> Result<bool, FileClientError> {
        debug!("⬆️ Uploading {} bytes to {}", bytes.len(), name);

        let mime = mime_guess::from_path(name).first_or_octet_stream();
        let mut request = self
            .connection
            .request(Method::PUT, name)
            .header(CONTENT_TYPE, mime.essence_str())
            .body(bytes);

        if !overwrite {
            request = request.header(IF_NONE_MATCH, "*");
        }

        self.connection.send(name, request).await?;
        info!("✅ Uploaded {}", name);
        Ok(true)
    }

    /// Fetches `name` and hands the bytes to `target`.
    pub async fn download(&self, name: &str, target: &dyn SaveTarget) -> Result<(), FileClientError> {
        debug!("⬇️ Downloading file: {}", name);

        let request = self.connection.request(Method::GET, name);
        let response = self.connection.send(name, request).await?;
        let content = response.bytes().await?;

        debug!("✅ Downloaded {} bytes for file: {}", content.len(), name);
        target.save(name, &content).await
    }

    pub async fn delete(&self, name: &str) -> Result<(), FileClientError> {
        let request = self.connection.request(Method::DELETE, name);
        self.connection.send(name, request).await?;
        info!("🗑️ Deleted {}", name);
        Ok(())
    }

    /// Posts user details to the account registration endpoint.
    pub async fn register_details(
        &self,
        user: &UserDetails,
    ) -> Result<serde_json::Value, FileClientError> {
        let url = self.connection.config().register_url();
        let request = self.connection.api_request(Method::POST, &url).json(user);
        let response = self.connection.send("/users/register", request).await?;

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| FileClientError::InvalidResponse {
            details: format!("register reply is not JSON: {}", e),
        })
    }
}
