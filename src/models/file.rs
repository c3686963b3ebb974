use chrono::{DateTime, Utc};
use serde::Serialize;

/// One resource reported by a PROPFIND listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileEntry {
    /// Path relative to the user's collection root, always starting with `/`
    pub path: String,
    pub name: String,
    pub is_directory: bool,
    pub mime_type: Option<String>,
    /// Raw `getcontentlength`; zero for collections
    pub size_bytes: u64,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: Option<String>,
    pub file_id: Option<String>,
    /// ownCloud permission letters, e.g. `RGDNVW`
    pub permissions: Option<String>,
    /// `oc:size`, the recursive size the server reports for collections
    pub aggregate_size: Option<u64>,
    pub favorite: bool,
    pub comments_unread: Option<u32>,
    pub owner_display_name: Option<String>,
    pub share_types: Vec<u32>,
}

impl FileEntry {
    pub fn new(path: impl Into<String>, name: impl Into<String>, is_directory: bool) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            is_directory,
            mime_type: None,
            size_bytes: 0,
            last_modified: None,
            etag: None,
            file_id: None,
            permissions: None,
            aggregate_size: None,
            favorite: false,
            comments_unread: None,
            owner_display_name: None,
            share_types: Vec::new(),
        }
    }
}

/// A listing entry with the fields the browser renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedEntry {
    #[serde(flatten)]
    pub entry: FileEntry,
    pub display_size: String,
    pub icon_class: &'static str,
    pub display_date: String,
}

impl AnnotatedEntry {
    pub fn name(&self) -> &str {
        &self.entry.name
    }
}

/// Bytes of a locally selected file, held between selection and submit.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadBuffer {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadBuffer")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}
