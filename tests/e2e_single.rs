
use std::fs;
use std::process::Output;

use tempfile::tempdir;

use support_single::{BODY, SERVER_NAME, run_barrage, spawn_http_server_or_skip};

const OK: &str = "200 OK";

fn describe(output: &Output) -> String {
    format!(
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

fn expect_success(output: &Output) -> Result<String, String> {
    if !output.status.success() {
        return Err(describe(output));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn expect_line(stdout: &str, line: &str) -> Result<(), String> {
    if stdout.lines().any(|candidate| candidate == line) {
        Ok(())
    } else {
        Err(format!("Missing '{}' in:\n{}", line, stdout))
    }
}

#[test]
fn e2e_single_fixed_count() -> Result<(), String> {
    let Some((url, _server)) = spawn_http_server_or_skip(OK)? else {
        return Ok(());
    };
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;

    let output = run_barrage(dir.path(), ["-n", "20", "-c", "4", url.as_str()])?;
    let stdout = expect_success(&output)?;

    expect_line(&stdout, &format!("Server Software:        {}", SERVER_NAME))?;
    expect_line(&stdout, &format!("Document Length:        {} bytes", BODY.len()))?;
    expect_line(&stdout, "Concurrency Level:      4")?;
    expect_line(&stdout, "Complete requests:      20")?;
    expect_line(&stdout, "Failed requests:        0")?;
    expect_line(
        &stdout,
        &format!("HTML transferred:       {} bytes", BODY.len().saturating_mul(20)),
    )?;
    if !stdout.contains("(longest request)") {
        return Err(format!("Missing percentile table:\n{}", stdout));
    }
    Ok(())
}

#[test]
fn e2e_single_export_json() -> Result<(), String> {
    let Some((url, _server)) = spawn_http_server_or_skip(OK)? else {
        return Ok(());
    };
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let export = dir.path().join("report.json");
    let export_arg = export.to_string_lossy().into_owned();

    let output = run_barrage(
        dir.path(),
        [
            "-n",
            "10",
            "-c",
            "2",
            "--sequence-param",
            "seq",
            "--export-json",
            export_arg.as_str(),
            url.as_str(),
        ],
    )?;
    expect_success(&output)?;

    let content =
        fs::read_to_string(&export).map_err(|err| format!("read export failed: {}", err))?;
    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|err| format!("parse export failed: {}", err))?;
    let field = |name: &str| value.get(name).cloned().unwrap_or_default();
    if field("complete_requests") != 10 || field("success_requests") != 10 {
        return Err(format!("Unexpected export totals: {}", content));
    }
    if field("stop_reason") != "completed" {
        return Err(format!("Unexpected stop reason: {}", field("stop_reason")));
    }
    Ok(())
}

#[test]
fn e2e_single_fail_fast_on_server_error() -> Result<(), String> {
    let Some((url, _server)) = spawn_http_server_or_skip("500 Internal Server Error")? else {
        return Ok(());
    };
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;

    let output = run_barrage(dir.path(), ["-n", "5", url.as_str()])?;
    let stdout = expect_success(&output)?;

    if !stdout.contains("Non-2xx responses:") {
        return Err(format!("Missing non-2xx count:\n{}", stdout));
    }
    expect_line(&stdout, "Stop reason:            failed")?;
    Ok(())
}

#[test]
fn e2e_single_reads_config_file() -> Result<(), String> {
    let Some((url, _server)) = spawn_http_server_or_skip(OK)? else {
        return Ok(());
    };
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let config = format!("url = \"{}\"\nrequests = 3\nconcurrency = 3\n", url);
    fs::write(dir.path().join("barrage.toml"), config)
        .map_err(|err| format!("write config failed: {}", err))?;

    let output = run_barrage(dir.path(), ["-v"])?;
    let stdout = expect_success(&output)?;

    expect_line(&stdout, "Concurrency Level:      3")?;
    expect_line(&stdout, "Complete requests:      3")?;
    Ok(())
}

#[test]
fn e2e_single_missing_url_fails() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;

    let output = run_barrage(dir.path(), ["-n", "1"])?;
    if output.status.success() {
        return Err(format!("Expected failure without a URL: {}", describe(&output)));
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.contains("Missing") {
        return Err(describe(&output));
    }
    Ok(())
}

#[test]
fn e2e_single_rejects_concurrency_above_requests() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;

    let output = run_barrage(dir.path(), ["-n", "2", "-c", "5", "http://127.0.0.1:9/"])?;
    if output.status.success() {
        return Err(format!("Expected a validation failure: {}", describe(&output)));
    }
    Ok(())
}
