//! Shared HTTP plumbing for provider clients.

use std::time::Duration;

use serde_json::Value;
use tracing::warn;

use crate::error::{NotifyError, NotifyResult};

/// Outbound proxy protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProxyKind {
    /// HTTP or HTTPS `CONNECT` proxy.
    #[default]
    Http,
    /// SOCKS5 proxy.
    Socks5,
}

impl ProxyKind {
    /// Parses the configured proxy type. Anything but `socks5` means HTTP.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("socks5") {
            Self::Socks5
        } else {
            Self::Http
        }
    }

    const fn scheme(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Socks5 => "socks5",
        }
    }
}

/// Outbound proxy settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Proxy address, with or without a scheme.
    pub url: String,
    /// Proxy protocol.
    pub kind: ProxyKind,
    /// Username for proxy authentication.
    pub username: Option<String>,
    /// Password for proxy authentication.
    pub password: Option<String>,
}

impl ProxyConfig {
    /// Creates proxy settings without credentials.
    pub fn new(url: impl Into<String>, kind: ProxyKind) -> Self {
        Self {
            url: url.into(),
            kind,
            username: None,
            password: None,
        }
    }

    /// Sets proxy credentials.
    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Proxy URL with the scheme implied by [`ProxyKind`] when none is given.
    #[must_use]
    pub fn normalized_url(&self) -> String {
        if self.url.contains("://") {
            self.url.clone()
        } else {
            format!("{}://{}", self.kind.scheme(), self.url)
        }
    }

    fn to_reqwest(&self) -> NotifyResult<reqwest::Proxy> {
        let proxy = reqwest::Proxy::all(self.normalized_url())
            .map_err(|e| NotifyError::Config(format!("invalid proxy URL: {e}")))?;
        Ok(match &self.username {
            Some(user) => proxy.basic_auth(user, self.password.as_deref().unwrap_or_default()),
            None => proxy,
        })
    }
}

pub(crate) fn build_client(
    timeout: Duration,
    proxy: Option<&ProxyConfig>,
) -> NotifyResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder().timeout(timeout);
    if let Some(proxy) = proxy {
        builder = builder.proxy(proxy.to_reqwest()?);
    }
    builder
        .build()
        .map_err(|e| NotifyError::Config(format!("failed to build HTTP client: {e}")))
}

/// Reads a JSON response, turning non-success statuses into [`NotifyError::Api`].
pub(crate) async fn read_json(provider: &str, response: reqwest::Response) -> NotifyResult<Value> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        warn!(provider, status = status.as_u16(), body = %body, "provider request failed");
        return Err(NotifyError::Api {
            status: status.as_u16(),
            body,
        });
    }

    Ok(serde_json::from_str(&body)?)
}
