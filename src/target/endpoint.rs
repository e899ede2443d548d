use std::fmt;

use http::HeaderValue;
use url::Url;

use crate::error::{AppError, AppResult, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

/// The single target of a run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    scheme: Scheme,
    hostname: String,
    port: u16,
    path_and_query: String,
    host_override: Option<String>,
}

impl Endpoint {
    /// Parses a target URL plus an optional `Host` header override.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL is malformed, has no host, uses a scheme
    /// other than http/https, or the override is not a valid header value.
    pub fn parse(raw_url: &str, host_override: Option<&str>) -> AppResult<Self> {
        let url = Url::parse(raw_url).map_err(|source| {
            AppError::validation(ValidationError::InvalidUrl {
                url: raw_url.to_owned(),
                source,
            })
        })?;

        let scheme = match url.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            other => {
                return Err(AppError::validation(ValidationError::UnsupportedScheme {
                    scheme: other.to_owned(),
                }));
            }
        };

        let hostname = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| AppError::validation(ValidationError::UrlMissingHost))?;
        // IPv6 literals come back bracketed; the resolver wants them bare.
        let hostname = hostname
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_owned();
        let port = url.port().unwrap_or_else(|| scheme.default_port());

        let mut path_and_query = url.path().to_owned();
        if path_and_query.is_empty() {
            path_and_query.push('/');
        }
        if let Some(query) = url.query() {
            path_and_query.push('?');
            path_and_query.push_str(query);
        }

        let host_override = match host_override.map(str::trim) {
            None => None,
            Some("") => return Err(AppError::validation(ValidationError::HostOverrideEmpty)),
            Some(host) => {
                HeaderValue::from_str(host).map_err(|source| {
                    AppError::validation(ValidationError::InvalidHeaderValue {
                        header: "Host".to_owned(),
                        source,
                    })
                })?;
                Some(host.to_owned())
            }
        };

        Ok(Self {
            scheme,
            hostname,
            port,
            path_and_query,
            host_override,
        })
    }

    #[must_use]
    pub const fn scheme(&self) -> Scheme {
        self.scheme
    }

    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    #[must_use]
    pub fn path_and_query(&self) -> &str {
        &self.path_and_query
    }

    #[must_use]
    pub fn host_override(&self) -> Option<&str> {
        self.host_override.as_deref()
    }

    #[must_use]
    pub const fn is_tls(&self) -> bool {
        matches!(self.scheme, Scheme::Https)
    }

    /// Value of the `Host` header: the override if set, otherwise the URL
    /// authority (port omitted when it is the scheme default).
    #[must_use]
    pub fn host_header(&self) -> String {
        if let Some(host) = self.host_override.as_ref() {
            return host.clone();
        }
        let host = if self.hostname.contains(':') {
            format!("[{}]", self.hostname)
        } else {
            self.hostname.clone()
        };
        if self.port == self.scheme.default_port() {
            host
        } else {
            format!("{}:{}", host, self.port)
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let host = if self.hostname.contains(':') {
            format!("[{}]", self.hostname)
        } else {
            self.hostname.clone()
        };
        write!(
            f,
            "{}://{}:{}{}",
            self.scheme.as_str(),
            host,
            self.port,
            self.path_and_query
        )
    }
}
