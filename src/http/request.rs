use std::path::Path;
use std::time::Duration;

use reqwest::header::{CONNECTION, CONTENT_TYPE, COOKIE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Proxy, Request, Url};

use crate::args::BenchArgs;
use crate::domain::Target;
use crate::error::{AppError, AppResult, HttpError, ValidationError};

pub const USER_AGENT: &str = concat!("barrage/", env!("CARGO_PKG_VERSION"));
/// Idle keep-alive connections kept per host, per worker.
const IDLE_CONNECTIONS_PER_WORKER: usize = 2;

/// Everything needed to build the base request of a campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub cookies: Vec<(String, String)>,
    pub basic_auth: Option<(String, String)>,
    pub content_type: String,
    pub body: Option<Vec<u8>>,
    pub keep_alive: bool,
}

impl RequestSpec {
    /// # Errors
    ///
    /// Returns an error when conflicting method flags are set or the body
    /// file cannot be read.
    pub fn from_args(args: &BenchArgs, target: &Target) -> AppResult<Self> {
        let (method, body_path) = match (args.head, &args.post_file, &args.put_file) {
            (_, Some(_), Some(_)) => {
                return Err(AppError::validation(ValidationError::ConflictingBodies));
            }
            (true, Some(_), None) | (true, None, Some(_)) => {
                return Err(AppError::validation(ValidationError::HeadWithBody));
            }
            (true, None, None) => (Method::HEAD, None),
            (false, Some(path), None) => (Method::POST, Some(path)),
            (false, None, Some(path)) => (Method::PUT, Some(path)),
            (false, None, None) => (Method::GET, None),
        };
        let body = body_path.map(|path| read_body_file(path)).transpose()?;

        Ok(Self {
            method,
            url: target.url.clone(),
            headers: args.headers.clone(),
            cookies: args.cookies.clone(),
            basic_auth: args.basic_auth.clone(),
            content_type: args.content_type.clone(),
            body,
            keep_alive: args.keep_alive,
        })
    }

    /// # Errors
    ///
    /// Returns an error when a header name/value is invalid or reqwest
    /// rejects the request.
    pub fn build(&self, client: &Client) -> AppResult<Request> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|source| {
                AppError::http(HttpError::InvalidHeaderName {
                    name: name.clone(),
                    source,
                })
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|source| {
                AppError::http(HttpError::InvalidHeaderValue {
                    name: name.clone(),
                    source,
                })
            })?;
            headers.append(header_name, header_value);
        }

        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; ");
            headers.insert(COOKIE, header_value(COOKIE.as_str(), &cookie)?);
        }

        if !self.keep_alive && !headers.contains_key(CONNECTION) {
            headers.insert(CONNECTION, HeaderValue::from_static("close"));
        }

        let mut builder = client.request(self.method.clone(), self.url.clone());
        if let Some(body) = self.body.as_ref() {
            if !headers.contains_key(CONTENT_TYPE) {
                headers.insert(
                    CONTENT_TYPE,
                    header_value(CONTENT_TYPE.as_str(), &self.content_type)?,
                );
            }
            builder = builder.body(body.clone());
        }
        builder = builder.headers(headers);

        if let Some((username, password)) = self.basic_auth.as_ref() {
            builder = builder.basic_auth(username, Some(password));
        }

        builder
            .build()
            .map_err(|source| AppError::http(HttpError::BuildRequestFailed { source }))
    }
}

fn header_value(name: &str, value: &str) -> AppResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|source| {
        AppError::http(HttpError::InvalidHeaderValue {
            name: name.to_owned(),
            source,
        })
    })
}

fn read_body_file(path: &Path) -> AppResult<Vec<u8>> {
    std::fs::read(path).map_err(|source| {
        AppError::http(HttpError::ReadBodyFile {
            path: path.to_path_buf(),
            source,
        })
    })
}

/// Transport-level knobs of the shared client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub concurrency: usize,
    pub keep_alive: bool,
    pub gzip: bool,
    pub proxy_url: Option<String>,
    pub timeout: Duration,
}

impl ClientOptions {
    #[must_use]
    pub fn from_args(args: &BenchArgs) -> Self {
        Self {
            concurrency: args.concurrency.get(),
            keep_alive: args.keep_alive,
            gzip: args.gzip,
            proxy_url: args.proxy_url.clone(),
            timeout: args.execution_timeout,
        }
    }
}

/// Builds the client shared by the probe and every worker. Certificates are
/// not verified.
///
/// # Errors
///
/// Returns an error when the proxy URL is invalid or the client cannot be
/// built.
pub fn build_client(options: &ClientOptions) -> AppResult<Client> {
    let mut client_builder = Client::builder()
        .danger_accept_invalid_certs(true)
        .user_agent(USER_AGENT)
        .timeout(options.timeout);

    client_builder = if options.keep_alive {
        client_builder.pool_max_idle_per_host(
            options
                .concurrency
                .saturating_mul(IDLE_CONNECTIONS_PER_WORKER),
        )
    } else {
        client_builder
            .pool_max_idle_per_host(0)
            .pool_idle_timeout(Some(Duration::from_secs(0)))
    };

    if !options.gzip {
        client_builder = client_builder.no_gzip();
    }

    if let Some(proxy_url) = options.proxy_url.as_ref() {
        let proxy = Proxy::all(proxy_url).map_err(|source| {
            AppError::http(HttpError::InvalidProxy {
                url: proxy_url.clone(),
                source,
            })
        })?;
        client_builder = client_builder.proxy(proxy);
    }

    client_builder
        .build()
        .map_err(|source| AppError::http(HttpError::BuildClientFailed { source }))
}
