use http::{HeaderName, HeaderValue};
use tracing::warn;

use crate::args::HttpMethod;
use crate::error::{AppError, AppResult, ValidationError};
use crate::target::{AddressSet, Endpoint};

/// Produces the bytes of one request. Called once per worker iteration.
pub trait RequestSynthesizer: Send + Sync {
    fn synthesize(&self, endpoint: &Endpoint, addresses: &AddressSet) -> Vec<u8>;
}

/// Header names whose values are owned by the synthesizer itself.
const MANAGED_HEADERS: [&str; 3] = ["connection", "content-length", "transfer-encoding"];

/// Plain HTTP/1.1 request: request line, `Host`, optional `User-Agent`,
/// `Accept: */*`, `Connection: close`, user headers and an optional body.
#[derive(Debug, Clone)]
pub struct PlainSynthesizer {
    method: HttpMethod,
    user_agent: Option<String>,
    headers: Vec<(String, String)>,
    body: String,
}

impl PlainSynthesizer {
    /// # Errors
    ///
    /// Returns an error when a header name or value is not valid HTTP.
    pub fn new(
        method: HttpMethod,
        user_agent: Option<&str>,
        headers: &[(String, String)],
        body: &str,
    ) -> AppResult<Self> {
        let mut kept = Vec::with_capacity(headers.len());
        for (key, value) in headers {
            HeaderName::from_bytes(key.as_bytes()).map_err(|source| {
                AppError::validation(ValidationError::InvalidHeaderName {
                    header: key.clone(),
                    source,
                })
            })?;
            HeaderValue::from_str(value).map_err(|source| {
                AppError::validation(ValidationError::InvalidHeaderValue {
                    header: key.clone(),
                    source,
                })
            })?;
            if MANAGED_HEADERS
                .iter()
                .any(|managed| key.eq_ignore_ascii_case(managed))
            {
                warn!("Ignoring header '{}': it is set per request.", key);
                continue;
            }
            kept.push((key.clone(), value.clone()));
        }

        Ok(Self {
            method,
            user_agent: user_agent.map(str::to_owned),
            headers: kept,
            body: body.to_owned(),
        })
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers
            .iter()
            .any(|(key, _)| key.eq_ignore_ascii_case(name))
    }
}

impl RequestSynthesizer for PlainSynthesizer {
    fn synthesize(&self, endpoint: &Endpoint, _addresses: &AddressSet) -> Vec<u8> {
        let mut head = format!(
            "{} {} HTTP/1.1\r\n",
            self.method.as_str(),
            endpoint.path_and_query()
        );
        if !self.has_header("host") {
            head.push_str("Host: ");
            head.push_str(&endpoint.host_header());
            head.push_str("\r\n");
        }
        if let Some(agent) = self.user_agent.as_ref()
            && !self.has_header("user-agent")
        {
            head.push_str("User-Agent: ");
            head.push_str(agent);
            head.push_str("\r\n");
        }
        if !self.has_header("accept") {
            head.push_str("Accept: */*\r\n");
        }
        for (key, value) in &self.headers {
            head.push_str(key);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        if !self.body.is_empty() {
            head.push_str("Content-Length: ");
            head.push_str(&self.body.len().to_string());
            head.push_str("\r\n");
        }
        head.push_str("Connection: close\r\n\r\n");

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(self.body.as_bytes());
        bytes
    }
}
