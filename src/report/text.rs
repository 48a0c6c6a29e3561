use std::time::Duration;

use crate::error::FailureKind;

use super::Report;

const MICROS_PER_SEC: u128 = 1_000_000;
const MICROS_PER_MILLI: u128 = 1_000;
const NANOS_PER_HUNDREDTH_MS: u128 = 10_000;
const HUNDREDTHS: u128 = 100;

/// Renders the human-readable report, one line per entry. Empty strings
/// separate sections.
#[must_use]
pub fn report_lines(report: &Report) -> Vec<String> {
    let stats = &report.stats;
    let mut lines = Vec::new();

    lines.push(format!(
        "Server Software:        {}",
        report.probe.server_name.as_deref().unwrap_or("")
    ));
    lines.push(format!("Server Hostname:        {}", report.host));
    lines.push(format!("Server Port:            {}", report.port));
    lines.push(String::new());
    lines.push(format!("Document Path:          {}", report.path));
    lines.push(format!(
        "Document Length:        {} bytes",
        report.probe.content_size.unwrap_or(0)
    ));
    lines.push(String::new());
    lines.push(format!("Concurrency Level:      {}", report.concurrency));
    lines.push(format!(
        "Time taken for tests:   {} seconds",
        format_secs(stats.total_execution_time)
    ));
    lines.push(format!(
        "Time taken in millis:   {} ms",
        stats.total_response_time.as_millis()
    ));
    lines.push(format!("Complete requests:      {}", stats.total_requests));
    lines.push(format!("Success requests:       {}", stats.total_success));
    lines.push(format!("Failed requests:        {}", stats.total_failed));
    if stats.total_failed > 0 {
        lines.extend(failure_lines(report));
    }
    if report.non_2xx() > 0 {
        lines.push(format!("Non-2xx responses:      {}", report.non_2xx()));
    }
    lines.push(format!(
        "HTML transferred:       {} bytes",
        stats.total_received
    ));
    lines.push(format!("Stop reason:            {}", report.stop_reason.as_str()));

    if report.latency.count > 0 {
        lines.extend(latency_lines(report));
    }

    lines
}

fn failure_lines(report: &Report) -> Vec<String> {
    let mut lines = vec!["Failed types and avg times (ms)".to_owned()];
    lines.push(format!(
        "  {:<18}{:>8}  {:>10}",
        "Success",
        report.stats.total_success,
        format_ms_2(report.latency.mean)
    ));
    for kind in FailureKind::ALL {
        let tally = report.stats.failures.get(&kind).copied().unwrap_or_default();
        lines.push(format!(
            "  {:<18}{:>8}  {:>10}",
            kind.label(),
            tally.count,
            format_ms_2(tally.average())
        ));
    }
    lines
}

fn latency_lines(report: &Report) -> Vec<String> {
    let latency = &report.latency;
    let mut lines = Vec::new();
    lines.push(format!(
        "Requests per second:    {} [#/sec] (mean)",
        format_x100(report.requests_per_sec_x100())
    ));
    lines.push(format!(
        "Time per request:       {} [ms] (mean)",
        format_ms_3(report.time_per_request())
    ));
    lines.push(format!(
        "Time per request:       {} [ms] (mean, across all concurrent requests)",
        format_ms_3(report.time_per_request_all())
    ));
    lines.push(format!(
        "HTML Transfer rate:     {} [Kbytes/sec] received",
        format_x100(report.transfer_rate_kb_x100())
    ));
    lines.push(String::new());
    lines.push("Connection Times (ms)".to_owned());
    lines.push("              min  mean[+/-sd]  median   max".to_owned());
    lines.push(format!(
        "Total:        {}  {} +/-{}  {}  {}",
        latency.min.as_millis(),
        latency.mean.as_millis(),
        format_ms_2(latency.std_dev),
        latency.median.as_millis(),
        latency.max.as_millis()
    ));
    lines.push(String::new());
    lines.push("Percentage of the requests served within a certain time (ms)".to_owned());
    for value in &latency.percentiles {
        let suffix = if value.percentile == 100 {
            " (longest request)"
        } else {
            ""
        };
        lines.push(format!(
            " {:>3}%  {}{}",
            value.percentile,
            value.latency.as_millis(),
            suffix
        ));
    }
    lines
}

fn format_x100(value: u128) -> String {
    format!(
        "{}.{:02}",
        value.checked_div(HUNDREDTHS).unwrap_or(0),
        value.checked_rem(HUNDREDTHS).unwrap_or(0)
    )
}

fn format_secs(duration: Duration) -> String {
    let micros = duration.as_micros();
    format!(
        "{}.{:06}",
        micros.checked_div(MICROS_PER_SEC).unwrap_or(0),
        micros.checked_rem(MICROS_PER_SEC).unwrap_or(0)
    )
}

fn format_ms_3(duration: Duration) -> String {
    let micros = duration.as_micros();
    format!(
        "{}.{:03}",
        micros.checked_div(MICROS_PER_MILLI).unwrap_or(0),
        micros.checked_rem(MICROS_PER_MILLI).unwrap_or(0)
    )
}

fn format_ms_2(duration: Duration) -> String {
    format_x100(
        duration
            .as_nanos()
            .checked_div(NANOS_PER_HUNDREDTH_MS)
            .unwrap_or(0),
    )
}
