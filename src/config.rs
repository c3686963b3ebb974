use anyhow::Result;
use std::env;
use std::path::PathBuf;

use crate::services::webdav::{LogoutPolicy, WebDAVConfig};
use crate::models::Session;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub user_id: Option<String>,
    pub token: Option<String>,
    pub session_file: Option<PathBuf>,
    pub timeout_seconds: u64,
    pub download_dir: PathBuf,
    pub logout_policy: LogoutPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            api_url: env::var("API_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            user_id: non_empty_var("DAV_USER_ID"),
            token: non_empty_var("DAV_TOKEN"),
            session_file: non_empty_var("DAV_SESSION_FILE").map(PathBuf::from),
            timeout_seconds: env::var("DAV_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            download_dir: env::var("DOWNLOAD_DIR")
                .unwrap_or_else(|_| ".".to_string())
                .into(),
            logout_policy: match non_empty_var("DAV_LOGOUT_POLICY") {
                Some(value) => value.parse()?,
                None => LogoutPolicy::default(),
            },
        })
    }

    /// Session described by `DAV_TOKEN`/`DAV_USER_ID`. Without an explicit
    /// user id the token's claims are read.
    pub fn env_session(&self) -> Result<Option<Session>> {
        let Some(ref token) = self.token else {
            return Ok(None);
        };

        let session = match self.user_id {
            Some(ref user_id) => Session::new(user_id.clone(), token.clone()),
            None => Session::from_token(token)?,
        };

        Ok(Some(session))
    }

    pub fn webdav_config(&self, session: &Session) -> WebDAVConfig {
        let mut config = WebDAVConfig::for_session(&self.api_url, session);
        config.timeout_seconds = self.timeout_seconds;
        config.logout_policy = self.logout_policy;
        config
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            api_url: "https://cloud.example.com".to_string(),
            user_id: None,
            token: None,
            session_file: None,
            timeout_seconds: 5,
            download_dir: PathBuf::from("."),
            logout_policy: LogoutPolicy::AuthOnly,
        }
    }

    #[test]
    fn test_env_session_absent_without_token() {
        assert!(config().env_session().unwrap().is_none());
    }

    #[test]
    fn test_env_session_with_explicit_user() {
        let mut config = config();
        config.token = Some("opaque".to_string());
        config.user_id = Some("alice".to_string());

        let session = config.env_session().unwrap().unwrap();
        assert_eq!(session, Session::new("alice", "opaque"));
    }

    #[test]
    fn test_opaque_token_needs_user_id() {
        let mut config = config();
        config.token = Some("opaque".to_string());
        assert!(config.env_session().is_err());
    }

    #[test]
    fn test_webdav_config_carries_settings() {
        let dav = config().webdav_config(&Session::new("alice", "tok"));
        assert_eq!(dav.timeout_seconds, 5);
        assert_eq!(dav.logout_policy, LogoutPolicy::AuthOnly);
        assert_eq!(dav.webdav_url(), "https://cloud.example.com/remote.php/dav/files/alice");
    }
}
