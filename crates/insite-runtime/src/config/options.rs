//! The options object that decides which subsystems a site builds.
//!
//! Keys are camelCase to match the JSON files operators already write.

use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use super::Section;
use crate::ports::Middleware;

/// Free-form settings passed through to a collaborator untouched.
pub type Settings = Map<String, Value>;

/// Key → default value map for the configuration store.
pub type ConfigSchema = Map<String, Value>;

/// Top-level site options. Every section is independently optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteOptions {
    pub database: Option<DatabaseOptions>,

    /// Requires `database`.
    pub config_store: Option<ConfigSchema>,

    /// Shared host/port/TLS for realtime and http.
    pub network: Option<NetworkOptions>,

    pub realtime: Option<RealtimeOptions>,

    /// Requires `database`.
    pub users: Option<UsersOptions>,

    pub cookie: Section<CookieOptions>,

    /// `true` builds with defaults; `false` is the same as absent.
    #[serde(deserialize_with = "deserialize_http")]
    pub http: Option<HttpOptions>,

    /// Forwarded to the networked users server.
    pub public: bool,

    /// Log every real-time connection at info level.
    pub verbose_connection_logs: bool,
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseOptions {
    pub url: String,
    pub name: String,
    #[serde(default)]
    pub collections: Vec<String>,
    #[serde(flatten)]
    pub extra: Settings,
}

impl DatabaseOptions {
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            collections: Vec::new(),
            extra: Settings::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TlsOptions {
    pub cert: String,
    pub key: String,
}

/// Shared listening settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkOptions {
    pub host: Option<String>,
    #[serde(deserialize_with = "deserialize_port")]
    pub port: Option<u16>,
    pub tls: Option<TlsOptions>,
}

/// Real-time server settings plus its dependent toggles.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RealtimeOptions {
    #[serde(deserialize_with = "deserialize_port")]
    pub port: Option<u16>,
    pub path: Option<String>,
    pub tls: Option<TlsOptions>,

    /// Dispatcher built unless `null` or `false`.
    pub subscriptions: Section<bool>,

    /// `null` suppresses; a value requests it explicitly.
    pub incoming_transport: Section<IncomingTransport>,

    /// Built only for `true`.
    pub outgoing_transport: Section<bool>,

    #[serde(flatten)]
    pub extra: Settings,
}

/// `incomingTransport` accepts a flag or a full options object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IncomingTransport {
    Flag(bool),
    Options(IncomingTransportOptions),
}

impl IncomingTransport {
    /// Whether the value asks for the transport by itself.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        match self {
            Self::Flag(flag) => *flag,
            Self::Options(_) => true,
        }
    }

    /// Options handed to the factory; flags become empty options.
    #[must_use]
    pub fn options(&self) -> IncomingTransportOptions {
        match self {
            Self::Flag(_) => IncomingTransportOptions::default(),
            Self::Options(options) => options.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IncomingTransportOptions {
    #[serde(flatten)]
    pub settings: Settings,
}

/// Users layer settings. `server` upgrades it to the networked variant.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UsersOptions {
    pub name: Option<String>,
    pub server: Option<UsersServerOptions>,
    #[serde(flatten)]
    pub extra: Settings,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UsersServerOptions {
    #[serde(flatten)]
    pub settings: Settings,
}

/// Cookie middleware settings plus the cookie setter's own settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CookieOptions {
    pub middleware: Settings,
    #[serde(flatten)]
    pub setter: Settings,
}

/// HTTP server settings and its middleware pipeline.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpOptions {
    #[serde(deserialize_with = "deserialize_port")]
    pub port: Option<u16>,
    pub host: Option<String>,
    pub tls: Option<TlsOptions>,

    #[serde(rename = "static")]
    pub static_files: Section<Settings>,

    pub template: Section<Settings>,

    /// Appended after the built-ins. Programmatic only.
    #[serde(skip)]
    pub middlewares: Vec<Arc<dyn Middleware>>,

    #[serde(flatten)]
    pub extra: Settings,
}

impl HttpOptions {
    /// Append a caller-supplied middleware.
    #[must_use]
    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }
}

fn deserialize_http<'de, D>(deserializer: D) -> Result<Option<HttpOptions>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Flag(bool),
        Options(Box<HttpOptions>),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Flag(true)) => Some(HttpOptions::default()),
        Some(Raw::Options(options)) => Some(*options),
        Some(Raw::Flag(false)) | None => None,
    })
}

/// Ports arrive as numbers or numeric strings.
fn deserialize_port<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u16),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(port)) => Ok(Some(port)),
        Some(Raw::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid port {text:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_builds_nothing() {
        let options: SiteOptions = serde_json::from_str("{}").unwrap();
        assert!(options.database.is_none());
        assert!(options.realtime.is_none());
        assert!(options.http.is_none());
        assert_eq!(options.cookie, Section::Absent);
        assert!(!options.public);
    }

    #[test]
    fn test_http_flag_forms() {
        let on: SiteOptions = serde_json::from_str(r#"{"http": true}"#).unwrap();
        let off: SiteOptions = serde_json::from_str(r#"{"http": false}"#).unwrap();
        let obj: SiteOptions =
            serde_json::from_str(r#"{"http": {"port": 8080, "static": null}}"#).unwrap();

        assert!(on.http.is_some());
        assert!(off.http.is_none());

        let http = obj.http.unwrap();
        assert_eq!(http.port, Some(8080));
        assert!(http.static_files.is_disabled());
        assert!(http.template.is_absent());
    }

    #[test]
    fn test_port_accepts_numeric_string() {
        let options: SiteOptions =
            serde_json::from_str(r#"{"network": {"port": "4000"}}"#).unwrap();
        assert_eq!(options.network.unwrap().port, Some(4000));

        let bad = serde_json::from_str::<SiteOptions>(r#"{"network": {"port": "http"}}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_realtime_toggles() {
        let options: SiteOptions = serde_json::from_str(
            r#"{"realtime": {
                "path": "/ws",
                "subscriptions": null,
                "incomingTransport": {"maxChunk": 1024},
                "outgoingTransport": true,
                "heartbeat": 30
            }}"#,
        )
        .unwrap();

        let realtime = options.realtime.unwrap();
        assert_eq!(realtime.path.as_deref(), Some("/ws"));
        assert!(realtime.subscriptions.is_disabled());
        assert!(realtime
            .incoming_transport
            .enabled()
            .is_some_and(IncomingTransport::is_requested));
        assert_eq!(realtime.outgoing_transport, Section::Enabled(true));
        assert_eq!(realtime.extra.get("heartbeat"), Some(&Value::from(30)));
    }

    #[test]
    fn test_users_server_and_cookie() {
        let options: SiteOptions = serde_json::from_str(
            r#"{
                "users": {"name": "U", "server": {}},
                "cookie": {"middleware": {"secure": true}, "domain": "example.org"}
            }"#,
        )
        .unwrap();

        let users = options.users.unwrap();
        assert_eq!(users.name.as_deref(), Some("U"));
        assert!(users.server.is_some());

        let cookie = options.cookie.enabled().unwrap();
        assert_eq!(cookie.middleware.get("secure"), Some(&Value::Bool(true)));
        assert_eq!(
            cookie.setter.get("domain"),
            Some(&Value::from("example.org"))
        );
    }

    #[test]
    fn test_explicit_null_cookie() {
        let options: SiteOptions = serde_json::from_str(r#"{"cookie": null}"#).unwrap();
        assert!(options.cookie.is_disabled());
    }
}
