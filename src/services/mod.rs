pub mod save_target;
pub mod webdav;

pub use save_target::{DirectoryTarget, MemoryTarget, SaveTarget};
pub use webdav::FileClient;
