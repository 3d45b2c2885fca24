//! 最小化的CalDAV客户端
//!
//! 通过 `PROPFIND` 发现用户的日历主目录，列出日历集合，并用 `PUT` 创建事件

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url, header};
use roxmltree::{Document, Node};

use crate::{
    CalendarEvent, Credentials, Error, IcsOptions, RemoteCalendar, Result,
    ics::IcsGenerator,
    sync::{CalendarConnector, CalendarStore},
};

const DAV_NS: &str = "DAV:";
const CALDAV_NS: &str = "urn:ietf:params:xml:ns:caldav";

const PRINCIPAL_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:">
  <d:prop>
    <d:current-user-principal/>
  </d:prop>
</d:propfind>"#;

const CALENDAR_HOME_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav">
  <d:prop>
    <c:calendar-home-set/>
  </d:prop>
</d:propfind>"#;

const CALENDARS_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav">
  <d:prop>
    <d:displayname/>
    <d:resourcetype/>
  </d:prop>
</d:propfind>"#;

/// CalDAV服务器连接配置
#[derive(Debug, Clone)]
pub struct CalDavConnector {
    pub server_url: String,
    pub credentials: Credentials,
    pub timeout: Option<u64>,
    pub ics_options: IcsOptions,
}

impl CalDavConnector {
    pub fn new(server_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            server_url: server_url.into(),
            credentials,
            timeout: None,
            ics_options: IcsOptions::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<u64>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_ics_options(mut self, ics_options: IcsOptions) -> Self {
        self.ics_options = ics_options;
        self
    }
}

#[async_trait]
impl CalendarConnector for CalDavConnector {
    type Store = CalDavClient;

    async fn connect(&self) -> Result<CalDavClient> {
        CalDavClient::connect(self).await
    }
}

/// 已认证的会话，绑定到一个用户的日历主目录
pub struct CalDavClient {
    client: Client,
    credentials: Credentials,
    calendar_home: Url,
    generator: IcsGenerator,
}

impl CalDavClient {
    pub async fn connect(connector: &CalDavConnector) -> Result<Self> {
        let server_url = Url::parse(&connector.server_url).map_err(|e| {
            Error::Config(format!("Invalid CalDAV URL '{}': {}", connector.server_url, e))
        })?;

        let mut builder = Client::builder()
            .user_agent(concat!("galtocaldav/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(10));
        if let Some(timeout_secs) = connector.timeout {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }

        let mut client = Self {
            client: builder.build()?,
            credentials: connector.credentials.clone(),
            calendar_home: server_url.clone(),
            generator: IcsGenerator::new(connector.ics_options.clone()),
        };

        tracing::debug!("Connecting to CalDAV server {}", server_url);
        let principal = client
            .find_href(&server_url, PRINCIPAL_BODY, DAV_NS, "current-user-principal")
            .await?
            .unwrap_or(server_url);
        client.calendar_home = client
            .find_href(&principal, CALENDAR_HOME_BODY, CALDAV_NS, "calendar-home-set")
            .await?
            .unwrap_or(principal);
        tracing::debug!("Calendar home is {}", client.calendar_home);

        Ok(client)
    }

    async fn propfind(&self, url: &Url, depth: &str, body: &'static str) -> Result<String> {
        let method = Method::from_bytes(b"PROPFIND")
            .map_err(|e| Error::Config(format!("Invalid HTTP method: {}", e)))?;

        let response = self
            .client
            .request(method, url.clone())
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header(header::CONTENT_TYPE, "application/xml; charset=utf-8")
            .header("Depth", depth)
            .body(body)
            .send()
            .await
            .map_err(Error::from_request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::caldav(
                Some(status),
                format!("PROPFIND {} failed", url),
            ));
        }

        response.text().await.map_err(Error::from_request)
    }

    /// 解析只含一个href的属性（`current-user-principal`、`calendar-home-set`）
    async fn find_href(
        &self,
        url: &Url,
        body: &'static str,
        namespace: &str,
        property: &str,
    ) -> Result<Option<Url>> {
        let xml = self.propfind(url, "0", body).await?;
        match parse_href_property(&xml, namespace, property)? {
            Some(href) => resolve(url, &href).map(Some),
            None => {
                tracing::debug!("{} has no {} property", url, property);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl CalendarStore for CalDavClient {
    async fn calendars(&self) -> Result<Vec<RemoteCalendar>> {
        let xml = self.propfind(&self.calendar_home, "1", CALENDARS_BODY).await?;
        parse_calendar_list(&xml)?
            .into_iter()
            .map(|(href, name)| {
                Ok(RemoteCalendar {
                    url: resolve(&self.calendar_home, &href)?,
                    name,
                })
            })
            .collect()
    }

    async fn create_event(&self, calendar: &RemoteCalendar, event: &CalendarEvent) -> Result<()> {
        let url = event_url(&calendar.url, &event.uid)?;
        let ics_content = self.generator.generate(event);

        let response = self
            .client
            .put(url.clone())
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header(header::CONTENT_TYPE, "text/calendar; charset=utf-8")
            .header(header::IF_NONE_MATCH, "*")
            .body(ics_content)
            .send()
            .await
            .map_err(Error::from_request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::caldav(Some(status), format!("PUT {} failed", url)));
        }
        if status != StatusCode::CREATED {
            tracing::debug!("PUT {} answered {}", url, status);
        }
        Ok(())
    }
}

/// 构建事件资源的URL: `<calendar>/<uid>.ics`
pub fn event_url(calendar_url: &Url, uid: &str) -> Result<Url> {
    let mut base = calendar_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    resolve(&base, &format!("{}.ics", uid))
}

fn resolve(base: &Url, href: &str) -> Result<Url> {
    base.join(href)
        .map_err(|e| Error::Config(format!("Invalid href '{}' relative to {}: {}", href, base, e)))
}

fn is_dav(node: &Node<'_, '_>, name: &str) -> bool {
    node.has_tag_name((DAV_NS, name))
}

/// 在 multistatus 响应中查找 `<property><href>…</href></property>`
pub fn parse_href_property(xml: &str, namespace: &str, property: &str) -> Result<Option<String>> {
    let doc = Document::parse(xml)?;
    let href = doc
        .descendants()
        .filter(|n| n.has_tag_name((namespace, property)))
        .flat_map(|prop| prop.children().filter(|n| is_dav(n, "href")))
        .find_map(|n| n.text())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    Ok(href)
}

/// 从 Depth 1 的 multistatus 响应中解析日历集合
///
/// 按文档顺序返回 `(href, displayname)`，资源类型不是CalDAV日历的条目被跳过
pub fn parse_calendar_list(xml: &str) -> Result<Vec<(String, Option<String>)>> {
    let doc = Document::parse(xml)?;
    let mut calendars = Vec::new();

    for response in doc.descendants().filter(|n| is_dav(n, "response")) {
        let Some(href) = response
            .children()
            .find(|n| is_dav(n, "href"))
            .and_then(|n| n.text())
            .map(|s| s.trim().to_string())
        else {
            continue;
        };

        let is_calendar = response
            .descendants()
            .filter(|n| is_dav(n, "resourcetype"))
            .any(|rt| rt.children().any(|n| n.has_tag_name((CALDAV_NS, "calendar"))));
        if !is_calendar {
            continue;
        }

        let name = response
            .descendants()
            .find(|n| is_dav(n, "displayname"))
            .and_then(|n| n.text())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        calendars.push((href, name));
    }

    Ok(calendars)
}
