use std::time::Duration;

use serde::Deserialize;

use crate::args::parsers::parse_duration_arg;
use crate::error::ValidationError;

/// File form of the CLI options. Every field is optional; values given on
/// the command line win.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub requests: Option<u64>,
    pub concurrency: Option<usize>,
    pub time_limit: Option<u64>,
    pub head: Option<bool>,
    pub post_file: Option<String>,
    pub put_file: Option<String>,
    pub content_type: Option<String>,
    pub headers: Option<Vec<String>>,
    pub cookies: Option<Vec<String>>,
    pub basic_auth: Option<String>,
    pub keep_alive: Option<bool>,
    pub gzip: Option<bool>,
    #[serde(alias = "proxy")]
    pub proxy_url: Option<String>,
    pub rate: Option<u64>,
    pub verbosity: Option<u8>,
    pub continue_on_error: Option<bool>,
    pub skip_first: Option<bool>,
    pub timeout: Option<DurationValue>,
    pub sequence_param: Option<String>,
    pub export_json: Option<String>,
    pub diagnostics_repeat: Option<u64>,
    pub no_color: Option<bool>,
}

/// Either whole seconds or a `<number>[ms|s|m|h]` string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(0) => Err(ValidationError::DurationZero),
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => parse_duration_arg(text),
        }
    }
}
