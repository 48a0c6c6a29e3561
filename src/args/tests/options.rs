use super::*;

#[test]
fn parse_args_defaults() -> AppResult<()> {
    let args = parse_test_args(["barrage", "http://localhost/"])?;
    if args.url.as_deref() != Some("http://localhost/") {
        return Err(AppError::validation("Unexpected url"));
    }
    if args.requests.is_some() || args.concurrency.get() != 1 || args.time_limit.is_some() {
        return Err(AppError::validation("Unexpected load shape defaults"));
    }
    if args.execution_timeout != Duration::from_secs(30) {
        return Err(AppError::validation("Unexpected default timeout"));
    }
    if args.content_type != "text/plain" || args.diagnostics_repeat != 1 {
        return Err(AppError::validation("Unexpected defaults"));
    }
    if args.keep_alive || args.gzip || args.continue_on_error || args.skip_first {
        return Err(AppError::validation("Toggles should default to off"));
    }
    Ok(())
}

#[test]
fn parse_args_short_flags() -> AppResult<()> {
    let args = parse_test_args([
        "barrage",
        "-n",
        "100",
        "-c",
        "10",
        "-t",
        "5",
        "-k",
        "-z",
        "-r",
        "-vv",
        "-H",
        "X-Trace: 1",
        "-C",
        "sid=42",
        "-A",
        "user:pass",
        "-x",
        "http://127.0.0.1:3128",
        "http://localhost:8080/api",
    ])?;
    if args.requests.map(|value| value.get()) != Some(100) || args.concurrency.get() != 10 {
        return Err(AppError::validation("Unexpected -n/-c"));
    }
    if args.time_limit != Some(5) {
        return Err(AppError::validation("Unexpected -t"));
    }
    if !(args.keep_alive && args.gzip && args.continue_on_error) {
        return Err(AppError::validation("Expected -k -z -r to be set"));
    }
    if args.verbosity != 2 {
        return Err(AppError::validation(format!(
            "Unexpected verbosity: {}",
            args.verbosity
        )));
    }
    if args.headers != [("X-Trace".to_owned(), "1".to_owned())]
        || args.cookies != [("sid".to_owned(), "42".to_owned())]
    {
        return Err(AppError::validation("Unexpected headers/cookies"));
    }
    if args.basic_auth != Some(("user".to_owned(), "pass".to_owned())) {
        return Err(AppError::validation("Unexpected basic auth"));
    }
    if args.proxy_url.as_deref() != Some("http://127.0.0.1:3128") {
        return Err(AppError::validation("Unexpected proxy"));
    }
    Ok(())
}

#[test]
fn parse_args_rejects_zero_concurrency() -> AppResult<()> {
    if parse_test_args(["barrage", "-c", "0", "http://localhost/"]).is_ok() {
        return Err(AppError::validation("Expected -c 0 to be rejected"));
    }
    Ok(())
}

#[test]
fn parse_args_post_and_put_conflict() -> AppResult<()> {
    let result = parse_test_args([
        "barrage",
        "-p",
        "body.json",
        "-u",
        "body.json",
        "http://localhost/",
    ]);
    if result.is_ok() {
        return Err(AppError::validation("Expected -p/-u conflict"));
    }
    Ok(())
}

#[test]
fn parse_args_timeout_and_sequence() -> AppResult<()> {
    let args = parse_test_args([
        "barrage",
        "--timeout",
        "750ms",
        "--sequence-param",
        "id",
        "--rate",
        "20",
        "--skip-first",
        "http://localhost/",
    ])?;
    if args.execution_timeout != Duration::from_millis(750) {
        return Err(AppError::validation("Unexpected --timeout"));
    }
    if args.sequence_param.as_deref() != Some("id") {
        return Err(AppError::validation("Unexpected --sequence-param"));
    }
    if args.rate_limit.map(|value| value.get()) != Some(20) || !args.skip_first {
        return Err(AppError::validation("Unexpected --rate/--skip-first"));
    }
    Ok(())
}
