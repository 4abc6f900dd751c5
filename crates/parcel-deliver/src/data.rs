use std::fmt;
use std::io::{Cursor, Read};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Declared transport of a delivery destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Http,
    Https,
    Ftp,
    Email,
    Physical,
}

impl Transport {
    /// URL scheme for transports this crate can push over.
    pub fn scheme(self) -> Option<&'static str> {
        match self {
            Self::Http => Some("http"),
            Self::Https => Some("https"),
            Self::Ftp | Self::Email | Self::Physical => None,
        }
    }

    pub fn supports_push(self) -> bool { self.scheme().is_some() }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Http => "http",
            Self::Https => "https",
            Self::Ftp => "ftp",
            Self::Email => "email",
            Self::Physical => "physical",
        };
        f.write_str(name)
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One push target of an order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub transport:   Transport,
    pub host:        String,
    pub port:        u16,
    /// Path prefix under which files are placed.
    #[serde(default)]
    pub path:        String,
    #[serde(default)]
    pub credentials: Option<Credentials>,
    /// File name suggested by the requester, used when the order names no package.
    #[serde(default)]
    pub file_name:   Option<String>,
}

impl Destination {
    pub fn new(transport: Transport, host: impl Into<String>, port: u16) -> Self {
        Self {
            transport,
            host: host.into(),
            port,
            path: String::new(),
            credentials: None,
            file_name: None,
        }
    }

    pub fn http(host: impl Into<String>, port: u16) -> Self {
        Self::new(Transport::Http, host, port)
    }

    pub fn https(host: impl Into<String>, port: u16) -> Self {
        Self::new(Transport::Https, host, port)
    }

    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(username, password));
        self
    }

    #[must_use]
    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// `host:port`, the scope credentials apply to.
    pub fn authority(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// A sized request body. The reader is dropped once the push returns.
pub struct Payload {
    reader: Box<dyn Read + Send>,
    len:    u64,
}

impl Payload {
    pub fn new(reader: impl Read + Send + 'static, len: u64) -> Self {
        Self {
            reader: Box::new(reader),
            len,
        }
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let len = bytes.len() as u64;
        Self::new(Cursor::new(bytes), len)
    }

    pub fn len(&self) -> u64 { self.len }

    pub fn is_empty(&self) -> bool { self.len == 0 }

    pub fn into_parts(self) -> (Box<dyn Read + Send>, u64) { (self.reader, self.len) }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("reader", &"{ ... }")
            .field("len", &self.len)
            .finish()
    }
}

const DEFAULT_USER_AGENT: &str = concat!("parcel-deliver/", env!("CARGO_PKG_VERSION"));

/// Configuration for push delivery.
///
/// Responses are not inspected unless `require_success` is set: a push counts
/// as sent once the request completes without a transport error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushOptions {
    /// Whole-request timeout in milliseconds. `None` waits indefinitely.
    pub timeout_ms:      Option<u64>,
    pub user_agent:      String,
    /// Treat non-2xx responses as delivery failures.
    pub require_success: bool,
}

impl Default for PushOptions {
    fn default() -> Self {
        Self {
            timeout_ms:      None,
            user_agent:      DEFAULT_USER_AGENT.to_string(),
            require_success: false,
        }
    }
}

impl PushOptions {
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn require_success(mut self, require_success: bool) -> Self {
        self.require_success = require_success;
        self
    }

    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
