use super::*;
use crate::run::{FIELD_CONTENT_SIZE, FIELD_SERVER_NAME, ProbeFacts};
use tokio::time::timeout;

#[test]
fn barrier_waits_for_every_party() -> AppResult<()> {
    run_paused_test(async {
        let context = RunContext::new(2);
        context.report_ready();
        context.report_ready();
        if timeout(ms(10), context.await_ready()).await.is_ok() {
            return Err(AppError::validation("Barrier released before the dispatcher"));
        }
        context.report_ready();
        if timeout(ms(10), context.await_ready()).await.is_err() {
            return Err(AppError::validation("Barrier should release after C + 1"));
        }
        Ok(())
    })
}

#[test]
fn begin_gate_releases_waiters() -> AppResult<()> {
    run_paused_test(async {
        let context = Arc::new(RunContext::new(1));
        let waiter = {
            let context = Arc::clone(&context);
            tokio::spawn(async move { context.await_start().await })
        };
        tokio::task::yield_now().await;
        if waiter.is_finished() {
            return Err(AppError::validation("Waiter passed a closed gate"));
        }
        context.release_start();
        timeout(ms(10), waiter)
            .await
            .map_err(|_err| AppError::validation("Waiter was not released"))??;
        // late arrivals pass straight through
        timeout(ms(10), context.await_start())
            .await
            .map_err(|_err| AppError::validation("Late waiter blocked"))?;
        Ok(())
    })
}

#[test]
fn signal_stop_is_idempotent() -> AppResult<()> {
    run_paused_test(async {
        let context = RunContext::new(1);
        if context.is_stopped() {
            return Err(AppError::validation("New context should not be stopped"));
        }
        if !context.signal_stop() {
            return Err(AppError::validation("First stop should report true"));
        }
        if context.signal_stop() || context.signal_stop() {
            return Err(AppError::validation("Repeated stops should report false"));
        }
        if !context.is_stopped() {
            return Err(AppError::validation("Context should be stopped"));
        }
        timeout(ms(10), context.stopped())
            .await
            .map_err(|_err| AppError::validation("stopped() should resolve"))?;
        Ok(())
    })
}

#[test]
fn probe_store_reads_missing_keys_as_none() -> AppResult<()> {
    let context = RunContext::new(1);
    if context.text(FIELD_SERVER_NAME).is_some() || context.int(FIELD_CONTENT_SIZE).is_some() {
        return Err(AppError::validation("Empty store should read None"));
    }

    context.set_text(FIELD_SERVER_NAME, "Apache");
    context.set_int(FIELD_CONTENT_SIZE, 512);
    if context.int(FIELD_SERVER_NAME).is_some() {
        return Err(AppError::validation("Text key should not read as int"));
    }

    let facts = context.probe_facts();
    let expected = ProbeFacts {
        server_name: Some("Apache".to_owned()),
        content_size: Some(512),
    };
    if facts != expected {
        return Err(AppError::validation(format!("Unexpected facts: {:?}", facts)));
    }
    Ok(())
}
