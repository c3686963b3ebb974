use chrono::{DateTime, Utc};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::reader::Reader;
use std::str;

use crate::errors::FileClientError;
use crate::models::FileEntry;

/// Body of the listing request. Asks for the DAV basics plus the ownCloud
/// extension properties the browser shows.
pub const PROPFIND_BODY: &str = r#"<?xml version="1.0"?>
<d:propfind xmlns:d="DAV:" xmlns:oc="http://owncloud.org/ns" xmlns:nc="http://nextcloud.org/ns">
  <d:prop>
    <d:getlastmodified/>
    <d:getetag/>
    <d:resourcetype/>
    <d:getcontenttype/>
    <oc:fileid/>
    <oc:permissions/>
    <oc:size/>
    <oc:favorite/>
    <oc:comments-unread/>
    <oc:owner-display-name/>
    <oc:share-types/>
    <d:getcontentlength/>
  </d:prop>
</d:propfind>
"#;

#[derive(Debug, Default)]
struct PropFindResponse {
    href: String,
    displayname: String,
    content_length: Option<u64>,
    last_modified: Option<String>,
    content_type: Option<String>,
    etag: Option<String>,
    file_id: Option<String>,
    permissions: Option<String>,
    aggregate_size: Option<u64>,
    favorite: bool,
    comments_unread: Option<u32>,
    owner_display_name: Option<String>,
    share_types: Vec<u32>,
    is_collection: bool,
}

impl PropFindResponse {
    /// Records one property value read inside a `propstat`.
    fn apply(&mut self, element: &str, text: &str) {
        match element {
            "displayname" => self.displayname = text.to_string(),
            "getcontentlength" => self.content_length = text.parse().ok(),
            "getlastmodified" => self.last_modified = Some(text.to_string()),
            "getcontenttype" => {
                // Drop parameters such as "; charset=utf-8"
                let mime = text.split(';').next().unwrap_or(text).trim();
                self.content_type = Some(mime.to_string());
            }
            "getetag" => self.etag = Some(text.trim_matches('"').to_string()),
            "fileid" => self.file_id = Some(text.to_string()),
            "permissions" => self.permissions = Some(text.to_string()),
            "size" => self.aggregate_size = text.parse().ok(),
            "favorite" => self.favorite = text == "1",
            "comments-unread" => self.comments_unread = text.parse().ok(),
            "owner-display-name" => self.owner_display_name = Some(text.to_string()),
            "share-type" => {
                if let Ok(share_type) = text.parse() {
                    self.share_types.push(share_type);
                }
            }
            _ => {}
        }
    }

    /// Takes over the properties of a successful propstat.
    fn absorb(&mut self, props: PropFindResponse) {
        if !props.displayname.is_empty() {
            self.displayname = props.displayname;
        }
        self.content_length = props.content_length.or(self.content_length);
        self.last_modified = props.last_modified.or(self.last_modified.take());
        self.content_type = props.content_type.or(self.content_type.take());
        self.etag = props.etag.or(self.etag.take());
        self.file_id = props.file_id.or(self.file_id.take());
        self.permissions = props.permissions.or(self.permissions.take());
        self.aggregate_size = props.aggregate_size.or(self.aggregate_size);
        self.favorite |= props.favorite;
        self.comments_unread = props.comments_unread.or(self.comments_unread);
        self.owner_display_name = props
            .owner_display_name
            .or(self.owner_display_name.take());
        self.share_types.extend(props.share_types);
        self.is_collection |= props.is_collection;
    }

    fn into_entry(self) -> FileEntry {
        let name = if self.displayname.is_empty() {
            let last = self
                .href
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or("")
                .to_string();
            let decoded = urlencoding::decode(&last).map(|d| d.into_owned()).ok();
            decoded.unwrap_or(last)
        } else {
            self.displayname
        };

        FileEntry {
            path: self.href,
            name,
            is_directory: self.is_collection,
            mime_type: self.content_type,
            size_bytes: self.content_length.unwrap_or(0),
            last_modified: self.last_modified.as_deref().and_then(parse_http_date),
            etag: self.etag,
            file_id: self.file_id,
            permissions: self.permissions,
            aggregate_size: self.aggregate_size,
            favorite: self.favorite,
            comments_unread: self.comments_unread,
            owner_display_name: self.owner_display_name,
            share_types: self.share_types,
        }
    }
}

/// Parses a `207 Multi-Status` body into entries in server order.
///
/// Directories are kept, including the entry for the requested collection
/// itself; `path` holds the raw href so the caller can relativize it.
/// Properties are only taken from `200` propstats, and responses without
/// one are skipped.
pub fn parse_propfind_response(xml_text: &str) -> Result<Vec<FileEntry>, FileClientError> {
    let mut reader = Reader::from_str(xml_text);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current_response: Option<PropFindResponse> = None;
    // Properties of the propstat being read; merged only if its status is 200
    let mut current_propstat: Option<PropFindResponse> = None;
    let mut current_element = String::new();
    let mut seen_multistatus = false;
    let mut in_resourcetype = false;
    let mut propstat_ok = false;
    let mut status_ok = false;

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = get_local_name(&e)?;

                match name.as_str() {
                    "multistatus" => seen_multistatus = true,
                    "response" => {
                        current_response = Some(PropFindResponse::default());
                        status_ok = false;
                    }
                    "propstat" => {
                        current_propstat = Some(PropFindResponse::default());
                        propstat_ok = false;
                    }
                    "resourcetype" => in_resourcetype = true,
                    "collection" if in_resourcetype => {
                        if let Some(ref mut props) = current_propstat {
                            props.is_collection = true;
                        }
                    }
                    _ => current_element = name,
                }
            }
            Ok(Event::Empty(e)) => {
                let name = get_local_name(&e)?;

                match name.as_str() {
                    "multistatus" => seen_multistatus = true,
                    "collection" if in_resourcetype => {
                        if let Some(ref mut props) = current_propstat {
                            props.is_collection = true;
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(invalid)?;
                let text = text.trim();

                if let Some(props) = current_propstat.as_mut().filter(|_| !text.is_empty()) {
                    if current_element == "status" {
                        propstat_ok = text.contains(" 200 ") || text.ends_with(" 200");
                    } else {
                        props.apply(&current_element, text);
                    }
                } else if current_element == "href" && !text.is_empty() {
                    if let Some(resp) = current_response.as_mut() {
                        resp.href = text.to_string();
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = get_local_name_from_end(&e)?;

                match name.as_str() {
                    "response" => {
                        if let Some(resp) = current_response.take() {
                            if status_ok && !resp.href.is_empty() {
                                entries.push(resp.into_entry());
                            }
                        }
                        status_ok = false;
                    }
                    "propstat" => {
                        if let Some(props) = current_propstat.take() {
                            if propstat_ok {
                                status_ok = true;
                                if let Some(resp) = current_response.as_mut() {
                                    resp.absorb(props);
                                }
                            }
                        }
                        propstat_ok = false;
                    }
                    "resourcetype" => in_resourcetype = false,
                    _ => {}
                }

                current_element.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(invalid(format!("XML parsing error: {}", e))),
            _ => {}
        }

        buf.clear();
    }

    if !seen_multistatus {
        return Err(invalid("response has no multistatus element"));
    }

    Ok(entries)
}

fn invalid(details: impl ToString) -> FileClientError {
    FileClientError::InvalidResponse {
        details: details.to_string(),
    }
}

fn get_local_name(e: &BytesStart) -> Result<String, FileClientError> {
    let qname = e.name();
    let local = qname.local_name();
    let name = str::from_utf8(local.as_ref())
        .map_err(|e| invalid(format!("Invalid UTF-8 in element name: {}", e)))?;
    Ok(name.to_string())
}

fn get_local_name_from_end(e: &BytesEnd) -> Result<String, FileClientError> {
    let qname = e.name();
    let local = qname.local_name();
    let name = str::from_utf8(local.as_ref())
        .map_err(|e| invalid(format!("Invalid UTF-8 in element name: {}", e)))?;
    Ok(name.to_string())
}

pub fn parse_http_date(date_str: &str) -> Option<DateTime<Utc>> {
    if date_str.is_empty() {
        return None;
    }

    // RFC 2822 is what getlastmodified uses
    DateTime::parse_from_rfc2822(date_str)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            DateTime::parse_from_rfc3339(date_str)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(date_str, "%a, %d %b %Y %H:%M:%S GMT")
                .ok()
                .map(|ndt| DateTime::from_naive_utc_and_offset(ndt, Utc))
        })
}
