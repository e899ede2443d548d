use std::time::Duration;

use serde::Deserialize;

use crate::args::{HttpMethod, parse_duration_arg};
use crate::error::AppResult;

/// On-disk run configuration. Every field is optional; CLI flags win.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub workers: Option<usize>,
    pub duration: Option<DurationValue>,
    pub host: Option<String>,
    pub method: Option<HttpMethod>,
    pub headers: Option<Vec<String>>,
    pub data: Option<String>,
    pub timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    pub refresh_interval: Option<DurationValue>,
    pub read_limit: Option<usize>,
    pub ipv4: Option<bool>,
    pub ipv6: Option<bool>,
    pub insecure: Option<bool>,
    pub no_ua: Option<bool>,
    pub authorized: Option<bool>,
    pub verbose: Option<bool>,
    pub no_color: Option<bool>,
    pub no_banner: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> AppResult<Duration> {
        match self {
            DurationValue::Seconds(secs) => parse_duration_arg(&secs.to_string()),
            DurationValue::Text(text) => parse_duration_arg(text),
        }
    }
}
