pub mod format;

pub use format::{annotate, format_bytes, format_date, icon_class_for};
