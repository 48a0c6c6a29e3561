//! Request construction, the worker pool and its transport seam.
mod dispatcher;
mod probe;
mod rate;
mod request;
mod strategy;
mod transport;
mod worker;

#[cfg(test)]
pub(crate) mod test_support;
#[cfg(test)]
mod tests;

pub use dispatcher::{Benchmark, JobSource};
pub use probe::detect_host;
pub use rate::RateLimiter;
pub use request::{ClientOptions, RequestSpec, USER_AGENT, build_client};
pub use strategy::{CloneStrategy, RequestStrategy, SequenceStrategy, drain_body};
pub use transport::{ReqwestTransport, Transport};
pub use worker::{MAX_SCRATCH_SIZE, MAX_SEND_ATTEMPTS, MIN_SCRATCH_SIZE, scratch_len};
