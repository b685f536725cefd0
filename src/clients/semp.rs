//! SEMP v1 client: password changes for broker CLI users.
//!
//! The element names follow the SEMP v1 `rpc` schema as far as it is
//! documented for `username/change-password`. Validate against a real broker
//! before relying on them.

use async_trait::async_trait;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use reqwest::{Client, Response, header};
use serde::Deserialize;
use std::fmt::Write;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::SempConfig;
use crate::constants::semp::{ENDPOINT_PATH, SUCCESS_CODE};
use crate::models::Target;

/// Failure of a single password-change call.
///
/// The `Display` output may contain text sent by the broker. Log it, but do
/// not hand it back to API callers.
#[derive(Debug, Error)]
pub enum SempError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Invalid SEMP URL {url}: {detail}")]
    InvalidUrl { url: String, detail: String },

    #[error("SEMP request to {url} failed: {detail}")]
    Transport { url: String, detail: String },

    #[error("SEMP endpoint {url} answered with a redirect (HTTP {status}); not following")]
    Redirect { url: String, status: u16 },

    #[error("SEMP returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("SEMP reply exceeds {limit} bytes")]
    ResponseTooLarge { limit: usize },

    #[error("Failed to parse SEMP reply: {0}")]
    MalformedReply(String),

    #[error("SEMP command failed: {message}")]
    Rejected {
        code: Option<String>,
        message: String,
    },
}

impl SempError {
    /// True when the broker could not be reached or talked to at the HTTP
    /// level, as opposed to answering with something unacceptable.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Client(_)
                | Self::InvalidUrl { .. }
                | Self::Transport { .. }
                | Self::Redirect { .. }
        )
    }
}

/// Sets a new password for a CLI user on a target.
#[async_trait]
pub trait PasswordChanger: Send + Sync {
    async fn change_password(
        &self,
        target: &Target,
        username: &str,
        new_password: &str,
    ) -> Result<(), SempError>;
}

#[derive(Debug, Deserialize)]
struct RpcReply {
    #[serde(rename = "execute-result")]
    execute_result: Option<ExecuteResult>,

    #[serde(rename = "parse-error")]
    parse_error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExecuteResult {
    #[serde(rename = "@code")]
    code: Option<String>,
}

#[must_use]
pub fn build_change_password_xml(
    semp_version: Option<&str>,
    username: &str,
    password: &str,
) -> String {
    let mut xml = String::with_capacity(160 + username.len() + password.len());

    match semp_version.filter(|v| !v.is_empty()) {
        Some(version) => {
            let _ = write!(xml, r#"<rpc semp-version="{}">"#, escape(version));
        }
        None => xml.push_str("<rpc>"),
    }

    let _ = write!(
        xml,
        "<username><name>{}</name><change-password><password>{}</password></change-password></username>",
        escape(username),
        escape(password)
    );
    xml.push_str("</rpc>");

    xml
}

fn root_element_name(xml: &str) -> Result<String, SempError> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader
            .read_event()
            .map_err(|e| SempError::MalformedReply(e.to_string()))?
        {
            Event::Start(e) | Event::Empty(e) => {
                return Ok(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Event::Eof => return Err(SempError::MalformedReply("empty reply".to_string())),
            _ => {}
        }
    }
}

/// Classifies a 2xx reply body. Only `execute-result code="ok"` is success.
pub fn parse_reply(body: &str) -> Result<(), SempError> {
    let root = root_element_name(body)?;
    if root != "rpc-reply" {
        return Err(SempError::MalformedReply(format!(
            "expected <rpc-reply>, got <{root}>"
        )));
    }

    let reply: RpcReply =
        quick_xml::de::from_str(body).map_err(|e| SempError::MalformedReply(e.to_string()))?;

    let code = reply.execute_result.and_then(|r| r.code);
    if code.as_deref() == Some(SUCCESS_CODE) {
        return Ok(());
    }

    let message = reply
        .parse_error
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| match &code {
            Some(code) => format!("execute-result code={code:?}"),
            None => "reply has no execute-result".to_string(),
        });

    Err(SempError::Rejected { code, message })
}

#[derive(Debug, Clone)]
pub struct SempClient {
    timeout: Duration,
    max_response_bytes: usize,
    user_agent: String,
}

impl SempClient {
    #[must_use]
    pub fn new(config: &SempConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.request_timeout_seconds),
            max_response_bytes: config.max_response_bytes,
            user_agent: config.user_agent.clone(),
        }
    }

    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(&SempConfig::default())
    }

    /// Built per call: certificate checks are only relaxed for targets that
    /// ask for it.
    fn http_client(&self, target: &Target) -> Result<Client, SempError> {
        let mut builder = Client::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(self.user_agent.as_str());

        if target.tls_skip_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder
            .build()
            .map_err(|e| SempError::Client(e.to_string()))
    }

    /// Appends the SEMP path to the target URL, dropping any query or fragment.
    fn endpoint(target: &Target) -> Result<String, SempError> {
        let mut url = Url::parse(target.semp_url.trim()).map_err(|e| SempError::InvalidUrl {
            url: target.semp_url.clone(),
            detail: e.to_string(),
        })?;
        let path = format!("{}{ENDPOINT_PATH}", url.path().trim_end_matches('/'));
        url.set_path(&path);
        url.set_query(None);
        url.set_fragment(None);
        Ok(url.into())
    }

    async fn read_capped(&self, mut response: Response, url: &str) -> Result<Vec<u8>, SempError> {
        let limit = self.max_response_bytes;
        if response
            .content_length()
            .is_some_and(|len| len > u64::try_from(limit).unwrap_or(u64::MAX))
        {
            return Err(SempError::ResponseTooLarge { limit });
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| SempError::Transport {
            url: url.to_string(),
            detail: e.to_string(),
        })? {
            if body.len() + chunk.len() > limit {
                return Err(SempError::ResponseTooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }
}

#[async_trait]
impl PasswordChanger for SempClient {
    async fn change_password(
        &self,
        target: &Target,
        username: &str,
        new_password: &str,
    ) -> Result<(), SempError> {
        let client = self.http_client(target)?;
        let url = Self::endpoint(target)?;
        let body = build_change_password_xml(target.semp_version.as_deref(), username, new_password);

        let response = client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/xml")
            .basic_auth(&target.admin_username, Some(&target.admin_password))
            .body(body)
            .send()
            .await
            .map_err(|e| SempError::Transport {
                url: url.clone(),
                detail: e.to_string(),
            })?;

        let status = response.status();
        if status.is_redirection() {
            return Err(SempError::Redirect {
                url,
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            let body = match self.read_capped(response, &url).await {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => format!("<unreadable body: {e}>"),
            };
            return Err(SempError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = self.read_capped(response, &url).await?;
        let text = String::from_utf8(bytes)
            .map_err(|_| SempError::MalformedReply("reply is not valid UTF-8".to_string()))?;

        parse_reply(&text)?;

        debug!(
            event = "semp_password_changed",
            url = %url,
            status = status.as_u16(),
            "SEMP password change accepted"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::post,
    };
    use std::sync::{Arc, Mutex};

    const OK_REPLY: &str = r#"<rpc-reply semp-version="soltr/10_4"><execute-result code="ok"/></rpc-reply>"#;

    // base64("admin:adminpass")
    const BASIC_AUTH: &str = "Basic YWRtaW46YWRtaW5wYXNz";

    type Seen = Arc<Mutex<Vec<(Option<String>, Option<String>, String)>>>;

    async fn spawn_server(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn target(url: &str) -> Target {
        Target {
            semp_url: url.to_string(),
            admin_username: "admin".to_string(),
            admin_password: "adminpass".to_string(),
            semp_version: Some("soltr/10_4".to_string()),
            tls_skip_verify: false,
        }
    }

    fn replying(status: StatusCode, reply: &'static str) -> (Router, Seen) {
        let seen: Seen = Arc::default();
        let seen_in = Arc::clone(&seen);
        let app = Router::new().route(
            "/SEMP",
            post(move |headers: HeaderMap, body: String| {
                let seen = Arc::clone(&seen_in);
                async move {
                    let get = |name: header::HeaderName| {
                        headers
                            .get(name)
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string)
                    };
                    seen.lock().unwrap().push((
                        get(header::AUTHORIZATION),
                        get(header::CONTENT_TYPE),
                        body,
                    ));
                    (status, [(header::CONTENT_TYPE, "application/xml")], reply)
                }
            }),
        );
        (app, seen)
    }

    fn element_names(xml: &str) -> Vec<String> {
        let mut reader = Reader::from_str(xml);
        let mut names = Vec::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) | Event::Empty(e) => {
                    names.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                }
                Event::Eof => break,
                _ => {}
            }
        }
        names
    }

    #[test]
    fn test_endpoint_path() {
        let cases = [
            ("http://127.0.0.1:8080", "http://127.0.0.1:8080/SEMP"),
            ("https://broker:943/", "https://broker:943/SEMP"),
            ("https://broker/mgmt/", "https://broker/mgmt/SEMP"),
            ("https://broker/mgmt?a=1#top", "https://broker/mgmt/SEMP"),
        ];
        for (base, expected) in cases {
            assert_eq!(SempClient::endpoint(&target(base)).unwrap(), expected);
        }

        let err = SempClient::endpoint(&target("not a url")).unwrap_err();
        assert!(matches!(err, SempError::InvalidUrl { .. }));
        assert!(err.is_transport());
    }

    #[test]
    fn test_build_xml_with_and_without_version() {
        assert_eq!(
            build_change_password_xml(Some("soltr/10_4"), "monitor", "pw"),
            r#"<rpc semp-version="soltr/10_4"><username><name>monitor</name><change-password><password>pw</password></change-password></username></rpc>"#
        );
        assert_eq!(
            build_change_password_xml(None, "monitor", "pw"),
            "<rpc><username><name>monitor</name><change-password><password>pw</password></change-password></username></rpc>"
        );
        assert!(build_change_password_xml(Some(""), "u", "p").starts_with("<rpc><username>"));
    }

    #[test]
    fn test_injection_stays_character_data() {
        let xml = build_change_password_xml(Some(r#"1"><x a=""#), "</name><inject>", "p&<>'\"");

        assert!(xml.contains("&lt;/name&gt;&lt;inject&gt;"));
        assert_eq!(
            element_names(&xml),
            vec!["rpc", "username", "name", "change-password", "password"]
        );

        let name = quick_xml::de::from_str::<InjectedName>(&xml).unwrap();
        assert_eq!(name.username.name, "</name><inject>");
        assert_eq!(name.username.change_password.password, "p&<>'\"");
        assert_eq!(name.version.as_deref(), Some(r#"1"><x a=""#));
    }

    #[derive(Deserialize)]
    struct InjectedName {
        #[serde(rename = "@semp-version")]
        version: Option<String>,
        username: InjectedUser,
    }

    #[derive(Deserialize)]
    struct InjectedUser {
        name: String,
        #[serde(rename = "change-password")]
        change_password: InjectedPassword,
    }

    #[derive(Deserialize)]
    struct InjectedPassword {
        password: String,
    }

    #[test]
    fn test_parse_reply_classification() {
        assert!(parse_reply(OK_REPLY).is_ok());
        assert!(parse_reply("<rpc-reply>\n  <execute-result code=\"ok\"/>\n</rpc-reply>").is_ok());

        let err = parse_reply(
            r#"<rpc-reply><execute-result code="fail"/><parse-error>Invalid username</parse-error></rpc-reply>"#,
        )
        .unwrap_err();
        match err {
            SempError::Rejected { code, message } => {
                assert_eq!(code.as_deref(), Some("fail"));
                assert_eq!(message, "Invalid username");
            }
            other => panic!("unexpected {other:?}"),
        }

        let err = parse_reply(r#"<rpc-reply><execute-result code="fail"/></rpc-reply>"#).unwrap_err();
        assert!(err.to_string().contains("code=\"fail\""));

        assert!(matches!(
            parse_reply("<rpc-reply></rpc-reply>"),
            Err(SempError::Rejected { code: None, .. })
        ));
        assert!(matches!(
            parse_reply(r#"<html><execute-result code="ok"/></html>"#),
            Err(SempError::MalformedReply(_))
        ));
        assert!(matches!(parse_reply(""), Err(SempError::MalformedReply(_))));
        assert!(matches!(
            parse_reply("not xml at all"),
            Err(SempError::MalformedReply(_))
        ));
    }

    #[tokio::test]
    async fn test_change_password_success() {
        let (app, seen) = replying(StatusCode::OK, OK_REPLY);
        let url = spawn_server(app).await;

        SempClient::with_defaults()
            .change_password(&target(&format!("{url}/")), "testuser", "newpassword")
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (auth, content_type, body) = &seen[0];
        assert_eq!(auth.as_deref(), Some(BASIC_AUTH));
        assert_eq!(content_type.as_deref(), Some("application/xml"));
        assert!(body.contains("<name>testuser</name>"));
        assert!(body.contains("<password>newpassword</password>"));
        assert!(body.starts_with(r#"<rpc semp-version="soltr/10_4">"#));
    }

    #[tokio::test]
    async fn test_change_password_rejected_on_2xx() {
        let (app, _) = replying(
            StatusCode::OK,
            r#"<rpc-reply><execute-result code="fail"/><parse-error>Invalid username</parse-error></rpc-reply>"#,
        );
        let url = spawn_server(app).await;

        let err = SempClient::with_defaults()
            .change_password(&target(&url), "nobody", "newpassword")
            .await
            .unwrap_err();

        assert!(!err.is_transport());
        assert!(err.to_string().contains("Invalid username"));
    }

    #[tokio::test]
    async fn test_change_password_http_error_keeps_body() {
        let (app, _) = replying(StatusCode::UNAUTHORIZED, "bad admin credentials");
        let url = spawn_server(app).await;

        let err = SempClient::with_defaults()
            .change_password(&target(&url), "monitor", "newpassword")
            .await
            .unwrap_err();

        match err {
            SempError::HttpStatus { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad admin credentials");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_redirect_is_not_followed() {
        let hits = Arc::new(Mutex::new(0_u32));
        let hits_in = Arc::clone(&hits);
        let app = Router::new()
            .route(
                "/SEMP",
                post(|| async {
                    (
                        StatusCode::TEMPORARY_REDIRECT,
                        [(header::LOCATION, "/elsewhere")],
                    )
                        .into_response()
                }),
            )
            .route(
                "/elsewhere",
                post(move || {
                    let hits = Arc::clone(&hits_in);
                    async move {
                        *hits.lock().unwrap() += 1;
                        OK_REPLY
                    }
                }),
            );
        let url = spawn_server(app).await;

        let err = SempClient::with_defaults()
            .change_password(&target(&url), "monitor", "newpassword")
            .await
            .unwrap_err();

        assert!(matches!(err, SempError::Redirect { status: 307, .. }));
        assert!(err.is_transport());
        assert_eq!(*hits.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_oversized_reply_rejected() {
        static BIG: &str = concat!(
            "<rpc-reply><execute-result code=\"ok\"/>",
            "<padding>xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx</padding>",
            "</rpc-reply>"
        );
        let (app, _) = replying(StatusCode::OK, BIG);
        let url = spawn_server(app).await;

        let client = SempClient::new(&SempConfig {
            max_response_bytes: 64,
            ..SempConfig::default()
        });
        let err = client
            .change_password(&target(&url), "monitor", "newpassword")
            .await
            .unwrap_err();

        assert!(matches!(err, SempError::ResponseTooLarge { limit: 64 }));
    }

    #[tokio::test]
    async fn test_unreachable_target_is_transport_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = SempClient::with_defaults()
            .change_password(&target(&format!("http://{addr}")), "monitor", "newpassword")
            .await
            .unwrap_err();

        assert!(matches!(err, SempError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_slow_target_times_out() {
        let app = Router::new().route(
            "/SEMP",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                OK_REPLY
            }),
        );
        let url = spawn_server(app).await;

        let client = SempClient::new(&SempConfig {
            request_timeout_seconds: 1,
            ..SempConfig::default()
        });
        let err = client
            .change_password(&target(&url), "monitor", "newpassword")
            .await
            .unwrap_err();

        assert!(matches!(err, SempError::Transport { .. }));
    }
}
