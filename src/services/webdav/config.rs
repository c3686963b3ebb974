use std::str::FromStr;

use crate::errors::FileClientError;
use crate::models::Session;

/// WebDAV connection configuration for one signed-in user
#[derive(Debug, Clone)]
pub struct WebDAVConfig {
    pub server_url: String,
    pub user_id: String,
    pub token: String,
    pub timeout_seconds: u64,
    pub logout_policy: LogoutPolicy,
}

/// Which listing failures end the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogoutPolicy {
    /// Any failed listing (network, server, auth) logs the user out
    #[default]
    AnyFailure,
    /// Only 401/403 answers log the user out
    AuthOnly,
}

impl LogoutPolicy {
    pub fn should_logout(&self, error: &FileClientError) -> bool {
        match self {
            LogoutPolicy::AnyFailure => error.is_session_failure(),
            LogoutPolicy::AuthOnly => error.is_unauthorized(),
        }
    }
}

impl FromStr for LogoutPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "any" | "any-failure" | "any_failure" => Ok(LogoutPolicy::AnyFailure),
            "auth" | "auth-only" | "auth_only" => Ok(LogoutPolicy::AuthOnly),
            other => Err(anyhow::anyhow!(
                "Unknown logout policy '{}'. Valid values are: any-failure, auth-only",
                other
            )),
        }
    }
}

impl WebDAVConfig {
    /// Creates a configuration for the given session with default timeout and policy
    pub fn for_session(server_url: &str, session: &Session) -> Self {
        Self {
            server_url: server_url.to_string(),
            user_id: session.user_id.clone(),
            token: session.token.clone(),
            timeout_seconds: 30,
            logout_policy: LogoutPolicy::default(),
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server_url.is_empty() {
            return Err(anyhow::anyhow!("Server URL cannot be empty"));
        }

        if self.user_id.is_empty() {
            return Err(anyhow::anyhow!("User id cannot be empty"));
        }

        if self.token.is_empty() {
            return Err(anyhow::anyhow!("Bearer token cannot be empty"));
        }

        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            return Err(anyhow::anyhow!("Server URL must start with http:// or https://"));
        }

        Ok(())
    }

    /// Returns the base URL of the user's file collection,
    /// e.g. "https://cloud.example.com/remote.php/dav/files/alice"
    pub fn webdav_url(&self) -> String {
        let mut url = self.server_url.trim_end_matches('/').to_string();

        if !url.contains("/remote.php/dav/files/") {
            url.push_str(&format!(
                "/remote.php/dav/files/{}",
                urlencoding::encode(&self.user_id)
            ));
        }

        url
    }

    /// Returns the account registration endpoint on the API server
    pub fn register_url(&self) -> String {
        format!("{}/users/register", self.server_url.trim_end_matches('/'))
    }

    /// Gets the timeout duration
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_seconds)
    }
}
