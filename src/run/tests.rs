use std::sync::Arc;
use std::time::Duration;

use super::{Campaign, MonitorReport, RunContext, StopReason};
use crate::diagnostics::Diagnostics;
use crate::domain::LoadPlan;
use crate::error::{AppError, AppResult, FailureKind};
use crate::http::{JobSource, Transport};
use crate::http::test_support::{
    ScriptedTransport, Step, TEST_URL, get_request, run_paused_test, test_plan,
};
use crate::shutdown_handlers::shutdown_channel;

mod context;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

async fn run_campaign(
    plan: LoadPlan,
    transport: &Arc<ScriptedTransport>,
    diagnostics: &Arc<Diagnostics>,
    source: JobSource,
) -> AppResult<MonitorReport> {
    let (_shutdown_tx, interrupt_rx) = shutdown_channel();
    let transport: Arc<dyn Transport> = Arc::clone(transport) as Arc<dyn Transport>;
    let campaign = Campaign::new(plan, transport, Arc::clone(diagnostics));
    campaign.execute(source, interrupt_rx).await
}

async fn run_cloned(plan: LoadPlan, transport: &Arc<ScriptedTransport>) -> AppResult<MonitorReport> {
    let diagnostics = Arc::new(Diagnostics::default());
    run_campaign(
        plan,
        transport,
        &diagnostics,
        JobSource::Cloned(get_request(TEST_URL)?),
    )
    .await
}

fn expect_reason(report: &MonitorReport, expected: StopReason) -> AppResult<()> {
    if report.stop_reason == expected {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Expected {:?}, got {:?} after {} requests",
            expected, report.stop_reason, report.stats.total_requests
        )))
    }
}
