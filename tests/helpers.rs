#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{header, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use davdrive::auth::SessionProvider;
use davdrive::models::Session;
use davdrive::services::webdav::{LogoutPolicy, WebDAVConfig};
use davdrive::FileClient;

pub const USER: &str = "alice";
pub const TOKEN: &str = "test-token";

/// Session provider that counts logouts.
#[derive(Debug)]
pub struct RecordingSessions {
    session: Mutex<Option<Session>>,
    logouts: AtomicUsize,
}

impl RecordingSessions {
    pub fn signed_in() -> Arc<Self> {
        Arc::new(Self {
            session: Mutex::new(Some(Session::new(USER, TOKEN))),
            logouts: AtomicUsize::new(0),
        })
    }

    pub fn signed_out() -> Arc<Self> {
        Arc::new(Self {
            session: Mutex::new(None),
            logouts: AtomicUsize::new(0),
        })
    }

    pub fn logouts(&self) -> usize {
        self.logouts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionProvider for RecordingSessions {
    fn current_session(&self) -> Option<Session> {
        self.session.lock().unwrap().clone()
    }

    async fn logout(&self) {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        self.session.lock().unwrap().take();
    }
}

/// In-memory WebDAV collection answering PROPFIND, PUT, GET and DELETE
/// for one user.
#[derive(Clone, Default)]
pub struct FakeDav {
    files: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
    dirs: Arc<Mutex<BTreeMap<String, u64>>>,
}

impl FakeDav {
    pub fn with_file(self, name: &str, content: &[u8]) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(name.to_string(), content.to_vec());
        self
    }

    pub fn with_dir(self, name: &str, aggregate_size: u64) -> Self {
        self.dirs
            .lock()
            .unwrap()
            .insert(name.to_string(), aggregate_size);
        self
    }

    pub fn file(&self, name: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(name).cloned()
    }

    fn prefix() -> String {
        format!("/remote.php/dav/files/{}", USER)
    }

    fn listing(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0"?>
<d:multistatus xmlns:d="DAV:" xmlns:oc="http://owncloud.org/ns" xmlns:nc="http://nextcloud.org/ns">"#,
        );

        xml.push_str(&format!(
            r#"<d:response><d:href>{}/</d:href><d:propstat><d:prop>
<d:getlastmodified>Sun, 05 Mar 2023 10:00:00 GMT</d:getlastmodified>
<d:resourcetype><d:collection/></d:resourcetype></d:prop>
<d:status>HTTP/1.1 200 OK</d:status></d:propstat></d:response>"#,
            Self::prefix()
        ));

        for (name, size) in self.dirs.lock().unwrap().iter() {
            xml.push_str(&format!(
                r#"<d:response><d:href>{}/{}/</d:href><d:propstat><d:prop>
<d:getlastmodified>Sun, 05 Mar 2023 10:00:00 GMT</d:getlastmodified>
<d:resourcetype><d:collection/></d:resourcetype>
<oc:size>{}</oc:size><oc:permissions>RGDNVCK</oc:permissions></d:prop>
<d:status>HTTP/1.1 200 OK</d:status></d:propstat></d:response>"#,
                Self::prefix(),
                urlencoding::encode(name),
                size
            ));
        }

        for (name, content) in self.files.lock().unwrap().iter() {
            let mime = mime_guess::from_path(name).first_or_octet_stream();
            xml.push_str(&format!(
                r#"<d:response><d:href>{}/{}</d:href><d:propstat><d:prop>
<d:getlastmodified>Sun, 05 Mar 2023 10:00:00 GMT</d:getlastmodified>
<d:getetag>"{}-etag"</d:getetag>
<d:resourcetype/>
<d:getcontenttype>{}</d:getcontenttype>
<d:getcontentlength>{}</d:getcontentlength></d:prop>
<d:status>HTTP/1.1 200 OK</d:status></d:propstat></d:response>"#,
                Self::prefix(),
                urlencoding::encode(name),
                content.len(),
                mime.essence_str(),
                content.len()
            ));
        }

        xml.push_str("</d:multistatus>");
        xml
    }
}

impl Respond for FakeDav {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let raw = request
            .url
            .path()
            .strip_prefix(&Self::prefix())
            .unwrap_or("")
            .trim_matches('/')
            .to_string();
        let decoded = urlencoding::decode(&raw).map(|d| d.into_owned()).ok();
        let name = decoded.unwrap_or(raw);

        match request.method.as_str() {
            "PROPFIND" => ResponseTemplate::new(207)
                .insert_header("Content-Type", "application/xml; charset=utf-8")
                .set_body_string(self.listing()),
            "PUT" => {
                let mut files = self.files.lock().unwrap();
                let keep_existing = request
                    .headers
                    .get("If-None-Match")
                    .map(|value| value.as_bytes() == b"*")
                    .unwrap_or(false);

                if keep_existing && files.contains_key(&name) {
                    return ResponseTemplate::new(412);
                }
                let status = if files.contains_key(&name) { 204 } else { 201 };
                files.insert(name, request.body.clone());
                ResponseTemplate::new(status)
            }
            "GET" => match self.files.lock().unwrap().get(&name) {
                Some(content) => ResponseTemplate::new(200).set_body_bytes(content.clone()),
                None => ResponseTemplate::new(404),
            },
            "DELETE" => match self.files.lock().unwrap().remove(&name) {
                Some(_) => ResponseTemplate::new(204),
                None => ResponseTemplate::new(404),
            },
            _ => ResponseTemplate::new(405),
        }
    }
}

/// Mounts the fake collection; requests without the bearer header fall
/// through to wiremock's 404.
pub async fn mount_fake_dav(server: &MockServer, dav: &FakeDav) {
    Mock::given(path_regex(format!("^/remote.php/dav/files/{}", USER)))
        .and(header("Authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(dav.clone())
        .mount(server)
        .await;
}

pub fn client_for(
    server: &MockServer,
    sessions: Arc<dyn SessionProvider>,
    policy: LogoutPolicy,
) -> FileClient {
    let session = Session::new(USER, TOKEN);
    let mut config = WebDAVConfig::for_session(&server.uri(), &session);
    config.timeout_seconds = 5;
    config.logout_policy = policy;
    FileClient::configure(config, sessions).expect("Failed to configure file client")
}

/// True when `date` looks like `05-Mar-2023`.
pub fn is_display_date(date: &str) -> bool {
    let parts: Vec<&str> = date.split('-').collect();
    parts.len() == 3
        && parts[0].len() == 2
        && parts[0].chars().all(|c| c.is_ascii_digit())
        && parts[1].len() == 3
        && parts[1].chars().all(|c| c.is_ascii_alphabetic())
        && parts[2].len() == 4
        && parts[2].chars().all(|c| c.is_ascii_digit())
}
