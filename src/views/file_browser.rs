use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::SessionProvider;
use crate::errors::FileClientError;
use crate::models::{AnnotatedEntry, UploadBuffer};
use crate::services::{FileClient, SaveTarget};

use super::Route;

pub const UPLOAD_SUCCESS_TEXT: &str = "Uploaded successful";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Loading,
    Listed,
    LoggedOut,
}

/// View-model of the file browser screen.
///
/// Every successful mutation is followed by a full re-list; the listing is
/// never patched locally. Handler failures are logged and kept in
/// `last_error`, they are not returned.
pub struct FileBrowserView {
    client: Arc<FileClient>,
    sessions: Arc<dyn SessionProvider>,
    state: ViewState,
    route: Route,
    entries: Vec<AnnotatedEntry>,
    label_text: String,
    pending_upload: Option<UploadBuffer>,
    last_error: Option<FileClientError>,
}

impl FileBrowserView {
    pub fn new(client: Arc<FileClient>, sessions: Arc<dyn SessionProvider>) -> Self {
        Self {
            client,
            sessions,
            state: ViewState::Idle,
            route: Route::Home,
            entries: Vec::new(),
            label_text: String::new(),
            pending_upload: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn entries(&self) -> &[AnnotatedEntry] {
        &self.entries
    }

    pub fn label_text(&self) -> &str {
        &self.label_text
    }

    pub fn pending_upload(&self) -> Option<&UploadBuffer> {
        self.pending_upload.as_ref()
    }

    pub fn last_error(&self) -> Option<&FileClientError> {
        self.last_error.as_ref()
    }

    pub async fn init(&mut self) {
        self.refresh().await;
    }

    /// Re-fetches the whole listing. A listing failure that ended the session
    /// moves the view to the login route.
    pub async fn refresh(&mut self) {
        self.state = ViewState::Loading;

        let listing = self.client.list().await;
        match listing {
            Some(entries) => {
                info!("📂 Listed {} entries", entries.len());
                self.entries = entries;
                self.state = ViewState::Listed;
            }
            None => {
                self.entries.clear();

                if self.sessions.current_session().is_none() {
                    warn!("Session ended while listing, redirecting to {}", Route::Login.path());
                    self.sessions.logout().await;
                    self.state = ViewState::LoggedOut;
                    self.route = Route::Login;
                } else {
                    warn!("Listing unavailable, keeping the session");
                    self.state = ViewState::Listed;
                }
            }
        }
    }

    /// Reads the first selected file into memory. All selected names are
    /// shown in the label.
    pub async fn on_file_selected(&mut self, files: &[PathBuf]) {
        self.label_text = files
            .iter()
            .map(|f| display_name(f))
            .collect::<Vec<_>>()
            .join(", ");
        self.pending_upload = None;

        let Some(first) = files.first() else {
            return;
        };

        match tokio::fs::read(first).await {
            Ok(bytes) => {
                self.pending_upload = Some(UploadBuffer {
                    name: display_name(first),
                    bytes,
                });
            }
            Err(source) => self.record(FileClientError::ClientSideRead {
                path: first.display().to_string(),
                source,
            }),
        }
    }

    pub async fn submit_upload(&mut self) {
        self.submit_upload_with(true).await;
    }

    pub async fn submit_upload_with(&mut self, overwrite: bool) {
        let Some(buffer) = self.pending_upload.as_ref() else {
            self.record(FileClientError::EmptySelection);
            return;
        };

        let result = self
            .client
            .upload(&buffer.name, buffer.bytes.clone(), overwrite)
            .await;

        match result {
            Ok(_) => {
                self.label_text = UPLOAD_SUCCESS_TEXT.to_string();
                self.refresh().await;
            }
            Err(e) => self.record(e),
        }
    }

    pub async fn request_download(&mut self, name: &str, target: &dyn SaveTarget) {
        let result = self.client.download(name, target).await;
        if let Err(e) = result {
            self.record(e);
        }
    }

    pub async fn request_delete(&mut self, name: &str) {
        let result = self.client.delete(name).await;
        match result {
            Ok(()) => self.refresh().await,
            Err(e) => self.record(e),
        }
    }

    fn record(&mut self, error: FileClientError) {
        warn!("{}", error);
        self.last_error = Some(error);
    }
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
