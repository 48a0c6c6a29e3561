use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing URL (set it via CLI or config).")]
    MissingUrl,
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Unsupported URL scheme '{scheme}'. Use http or https.")]
    UnsupportedScheme { scheme: String },
    #[error("URL '{url}' has no host.")]
    MissingHost { url: String },
    #[error("URL '{url}' has no known port.")]
    MissingPort { url: String },
    #[error("Invalid header format: '{value}'. Expected 'Key: Value'")]
    InvalidHeaderFormat { value: String },
    #[error("Invalid cookie format: '{value}'. Expected 'name=value'")]
    InvalidCookieFormat { value: String },
    #[error("Invalid basic auth '{value}'. Expected 'username:password'")]
    InvalidBasicAuth { value: String },
    #[error("Only one of POST (-p) and PUT (-u) bodies may be given.")]
    ConflictingBodies,
    #[error("HEAD (-i) cannot be combined with a request body.")]
    HeadWithBody,
    #[error("Concurrency ({concurrency}) cannot exceed the number of requests ({requests}).")]
    ConcurrencyExceedsRequests { concurrency: usize, requests: u64 },
    #[error("Sequence parameter name must not be empty.")]
    EmptySequenceParam,
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Invalid value: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
