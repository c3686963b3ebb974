// Re-export all model types for ease of use

pub mod file;
pub mod user;

pub use file::*;
pub use user::*;
