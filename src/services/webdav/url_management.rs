use super::config::WebDAVConfig;

/// URL and path conversion between the user's collection root and the
/// hrefs the server reports.
#[derive(Debug, Clone)]
pub struct WebDAVUrlManager {
    base_url: String,
    base_path: String,
}

impl WebDAVUrlManager {
    pub fn new(config: &WebDAVConfig) -> Self {
        let base_url = config.webdav_url();
        let base_path = url::Url::parse(&base_url)
            .map(|u| u.path().to_string())
            .unwrap_or_default();
        let base_path = decode(base_path.trim_end_matches('/'));

        Self {
            base_url,
            base_path,
        }
    }

    /// Get the base WebDAV URL, e.g. "https://cloud.example.com/remote.php/dav/files/alice"
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Convert a (possibly absolute-URL) href from a PROPFIND response to a
    /// decoded path relative to the collection root.
    ///
    /// Input:  "/remote.php/dav/files/alice/Photos/My%20image.jpg"
    /// Output: "/Photos/My image.jpg"
    pub fn href_to_relative_path(&self, href: &str) -> String {
        let path = match url::Url::parse(href) {
            Ok(url) => url.path().to_string(),
            Err(_) => href.to_string(),
        };
        let path = decode(path.trim_end_matches('/'));

        // Only strip at a segment boundary so ".../alice2/x" stays intact
        let relative = path
            .strip_prefix(&self.base_path)
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
            .unwrap_or(&path);
        if relative.is_empty() {
            "/".to_string()
        } else if relative.starts_with('/') {
            relative.to_string()
        } else {
            format!("/{}", relative)
        }
    }

    /// True when the href names the collection root itself
    pub fn is_collection_root(&self, href: &str) -> bool {
        self.href_to_relative_path(href) == "/"
    }

    /// Convert a relative path to a full request URL, percent-encoding each segment
    ///
    /// Input:  "/Photos/My image.jpg"
    /// Output: "https://cloud.example.com/remote.php/dav/files/alice/Photos/My%20image.jpg"
    pub fn relative_path_to_url(&self, relative_path: &str) -> String {
        let encoded: Vec<String> = relative_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();

        if encoded.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url.trim_end_matches('/'), encoded.join("/"))
        }
    }
}

fn decode(value: &str) -> String {
    urlencoding::decode(value)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| value.to_string())
}
