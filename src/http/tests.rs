use std::time::Duration;

use reqwest::header::{CONNECTION, CONTENT_TYPE, COOKIE, HeaderValue};
use reqwest::{Method, Request, Response};

use super::test_support::{
    ScriptedTransport, Step, TEST_URL, get_request, run_async_test, run_paused_test, test_plan,
};
use super::*;
use crate::error::{AppError, AppResult, HttpError, RequestError};

mod probe;
mod rate;
