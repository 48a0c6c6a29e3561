mod app;
mod config;
mod http;
mod request;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use http::HttpError;
pub use request::{FailureKind, RequestError, SendError};
pub use validation::ValidationError;
