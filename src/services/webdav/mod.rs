// WebDAV client modules organized by functionality

pub mod config;
pub mod connection;
pub mod service;
pub mod url_management;

pub use config::{LogoutPolicy, WebDAVConfig};
pub use connection::WebDAVConnection;
pub use service::FileClient;
pub use url_management::WebDAVUrlManager;
