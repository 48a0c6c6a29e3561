use tokio::io::{AsyncWriteExt, BufWriter};

use crate::error::FailureKind;

use super::{Report, duration_micros};

/// Writes the report as pretty-printed JSON. Latencies are in microseconds.
///
/// # Errors
///
/// Returns an error when the file cannot be created or written.
pub async fn export_json(path: &str, report: &Report) -> Result<(), std::io::Error> {
    let payload = report_json(report);
    let file = tokio::fs::File::create(path).await?;
    let mut writer = BufWriter::new(file);
    let json = serde_json::to_vec_pretty(&payload).map_err(std::io::Error::other)?;
    writer.write_all(&json).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

pub(super) fn report_json(report: &Report) -> serde_json::Value {
    let stats = &report.stats;
    let latency = &report.latency;

    let failures: serde_json::Map<String, serde_json::Value> = FailureKind::ALL
        .iter()
        .map(|kind| {
            let tally = stats.failures.get(kind).copied().unwrap_or_default();
            (
                kind.as_str().to_owned(),
                serde_json::json!({
                    "count": tally.count,
                    "avg_latency_us": duration_micros(tally.average()),
                }),
            )
        })
        .collect();

    let percentiles: Vec<serde_json::Value> = latency
        .percentiles
        .iter()
        .map(|value| {
            serde_json::json!({
                "percentile": value.percentile,
                "latency_us": duration_micros(value.latency),
            })
        })
        .collect();

    serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "target": {
            "url": report.url,
            "host": report.host,
            "port": report.port,
            "path": report.path,
        },
        "probe": report.probe,
        "concurrency": report.concurrency,
        "planned_requests": report.planned_requests,
        "stop_reason": report.stop_reason,
        "time_taken_us": duration_micros(stats.total_execution_time),
        "complete_requests": stats.total_requests,
        "success_requests": stats.total_success,
        "failed_requests": stats.total_failed,
        "non_2xx_responses": report.non_2xx(),
        "failures": failures,
        "bytes_received": stats.total_received,
        "requests_per_sec_x100": u64::try_from(report.requests_per_sec_x100()).unwrap_or(u64::MAX),
        "bytes_per_sec": u64::try_from(report.bytes_per_sec()).unwrap_or(u64::MAX),
        "time_per_request_us": duration_micros(report.time_per_request()),
        "time_per_request_all_us": duration_micros(report.time_per_request_all()),
        "latency": {
            "count": latency.count,
            "min_us": duration_micros(latency.min),
            "mean_us": duration_micros(latency.mean),
            "std_dev_us": duration_micros(latency.std_dev),
            "median_us": duration_micros(latency.median),
            "max_us": duration_micros(latency.max),
            "percentiles": percentiles,
        },
    })
}
