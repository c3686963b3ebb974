use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{info, warn};

use crate::errors::FileClientError;
use crate::models::Session;

/// Source of the signed-in user's session.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    fn current_session(&self) -> Option<Session>;

    /// Ends the session. Safe to call when already logged out.
    async fn logout(&self);
}

/// Session held in memory, optionally persisted as a JSON file so the CLI
/// keeps the user signed in between runs.
#[derive(Debug, Default)]
pub struct SessionStore {
    session: RwLock<Option<Session>>,
    file: Option<PathBuf>,
}

impl SessionStore {
    pub fn new(session: Option<Session>) -> Self {
        Self {
            session: RwLock::new(session),
            file: None,
        }
    }

    /// Loads a session file. A missing file yields a signed-out store bound
    /// to that path.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, FileClientError> {
        let path = path.as_ref().to_path_buf();

        let session = match tokio::fs::read(&path).await {
            Ok(content) => Some(serde_json::from_slice::<Session>(&content).map_err(|e| {
                FileClientError::configuration(format!(
                    "Session file '{}' is not valid: {}",
                    path.display(),
                    e
                ))
            })?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(FileClientError::ClientSideRead {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        };

        Ok(Self {
            session: RwLock::new(session),
            file: Some(path),
        })
    }

    /// Replaces the session and writes it to the session file, if any.
    pub async fn sign_in(&self, session: Session) -> Result<(), FileClientError> {
        if let Some(ref path) = self.file {
            let content = serde_json::to_vec_pretty(&session)
                .map_err(|e| FileClientError::configuration(e.to_string()))?;
            tokio::fs::write(path, content)
                .await
                .map_err(|e| FileClientError::Save {
                    name: path.display().to_string(),
                    source: e,
                })?;
        }

        info!("Signed in as {}", session.user_id);
        *self.session.write().unwrap_or_else(|e| e.into_inner()) = Some(session);
        Ok(())
    }

    pub fn is_signed_in(&self) -> bool {
        self.session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

#[async_trait]
impl SessionProvider for SessionStore {
    fn current_session(&self) -> Option<Session> {
        self.session.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    async fn logout(&self) {
        let previous = self
            .session
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .take();

        if let Some(ref path) = self.file {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove session file '{}': {}", path.display(), e),
            }
        }

        if let Some(session) = previous {
            info!("🔒 Logged out {}", session.user_id);
        }
    }
}
