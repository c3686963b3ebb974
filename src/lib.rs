pub mod auth;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod utils;
pub mod views;
pub mod webdav_xml_parser;

pub use auth::{SessionProvider, SessionStore};
pub use errors::{AppError, FileClientError};
pub use services::FileClient;
pub use views::{FileBrowserView, Route, ViewState};
