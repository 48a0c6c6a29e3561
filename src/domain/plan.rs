use std::time::Duration;

use url::Url;

use crate::error::ValidationError;

/// Per-request ceiling applied when no `--timeout` is given.
pub const DEFAULT_EXECUTION_TIMEOUT: Duration = Duration::from_secs(30);
/// Request count used when a time limit is set without an explicit count.
pub const TIME_LIMIT_MAX_REQUESTS: u64 = 50_000;

/// The benchmarked endpoint, as shown in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub url: Url,
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl Target {
    /// Parses an absolute `http`/`https` URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL is malformed, uses another scheme, or
    /// has no host.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let url = Url::parse(raw).map_err(|source| ValidationError::InvalidUrl {
            url: raw.to_owned(),
            source,
        })?;
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ValidationError::UnsupportedScheme {
                    scheme: other.to_owned(),
                });
            }
        }
        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| ValidationError::MissingHost {
                url: raw.to_owned(),
            })?
            .to_owned();
        let port = url
            .port_or_known_default()
            .ok_or_else(|| ValidationError::MissingPort {
                url: raw.to_owned(),
            })?;
        let path = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_owned(),
        };

        Ok(Self {
            url,
            host,
            port,
            path,
        })
    }
}

/// The user-facing knobs that determine how many jobs run and how wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadShape {
    pub requests: Option<u64>,
    pub concurrency: usize,
    pub time_limit: Option<Duration>,
}

/// Immutable description of one load campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadPlan {
    pub target: Target,
    pub requests: u64,
    pub concurrency: usize,
    pub time_limit: Option<Duration>,
    pub execution_timeout: Duration,
    pub skip_first: bool,
    pub continue_on_error: bool,
    pub rate_limit: Option<u64>,
}

impl LoadPlan {
    /// Validates `shape` and fills in defaults.
    ///
    /// A zero time limit means no time limit. Without an explicit request
    /// count a time-limited campaign is capped at
    /// [`TIME_LIMIT_MAX_REQUESTS`], otherwise one request is sent.
    ///
    /// # Errors
    ///
    /// Returns an error when the request count or concurrency is zero, or
    /// when concurrency exceeds an explicit request count.
    pub fn resolve(target: Target, shape: LoadShape) -> Result<Self, ValidationError> {
        if shape.concurrency == 0 {
            return Err(ValidationError::ValueTooSmall { min: 1 });
        }
        let time_limit = shape.time_limit.filter(|limit| !limit.is_zero());
        let (requests, auto_raised) = match (shape.requests, time_limit) {
            (Some(0), _) => return Err(ValidationError::ValueTooSmall { min: 1 }),
            (Some(requests), _) => (requests, false),
            (None, Some(_)) => (TIME_LIMIT_MAX_REQUESTS, true),
            (None, None) => (1, false),
        };
        let concurrency_u64 = u64::try_from(shape.concurrency).unwrap_or(u64::MAX);
        if !auto_raised && concurrency_u64 > requests {
            return Err(ValidationError::ConcurrencyExceedsRequests {
                concurrency: shape.concurrency,
                requests,
            });
        }

        Ok(Self {
            target,
            requests,
            concurrency: shape.concurrency,
            time_limit,
            execution_timeout: DEFAULT_EXECUTION_TIMEOUT,
            skip_first: false,
            continue_on_error: false,
            rate_limit: None,
        })
    }

    #[must_use]
    pub const fn with_execution_timeout(mut self, timeout: Duration) -> Self {
        self.execution_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_skip_first(mut self, skip_first: bool) -> Self {
        self.skip_first = skip_first;
        self
    }

    #[must_use]
    pub const fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    #[must_use]
    pub const fn with_rate_limit(mut self, rate_limit: Option<u64>) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Number of jobs the dispatcher enqueues. Skip-first pads the queue by
    /// one warm-up job per worker so that `requests` outcomes still arrive.
    #[must_use]
    pub fn job_count(&self) -> u64 {
        if self.skip_first {
            let workers = u64::try_from(self.concurrency).unwrap_or(u64::MAX);
            self.requests.saturating_add(workers)
        } else {
            self.requests
        }
    }
}
