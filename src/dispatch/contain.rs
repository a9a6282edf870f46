//! # Failure containment wrapper.
//!
//! [`run_contained`] executes one worker instance on behalf of a dispatch
//! loop. The loops that call it are process-lifetime singletons per binding
//! and must survive arbitrarily many worker failures, so the wrapper
//! guarantees nothing escapes:
//!
//! ## Rules
//! - **Success** → no observable effect beyond the worker's own.
//! - **Failure** (`WorkerError::Fail` or a panic) → normalized into exactly
//!   one [`Fault`], delivered to the [`ErrorSink`], then the optional catch
//!   callback runs with the same fault. Never re-raised.
//! - **Cancellation** (token fires, or the worker returns
//!   `WorkerError::Canceled`) → a diagnostic trace only; cancellation is not
//!   a failure. When the token wins the race, the worker's future is dropped
//!   and its scoped resources unwind through `Drop`.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::{Fault, WorkerError};
use crate::events::{ErrorSink, Event};
use crate::workers::WorkerRef;

/// Per-binding recovery callback, invoked once per caught failure with the
/// already-reported fault.
pub type CatchFn = Arc<dyn Fn(&Fault) + Send + Sync>;

/// Runs one worker instance, converting any failure into a reported fault.
///
/// The owning dispatch loop can always `await` this without risk: it never
/// returns an error and never panics on a worker's behalf.
pub async fn run_contained<E: Event>(
    worker: &WorkerRef<E>,
    event: E,
    token: CancellationToken,
    sink: &Arc<dyn ErrorSink>,
    catch: Option<&CatchFn>,
) {
    let execution = AssertUnwindSafe(worker.run(event, token.clone())).catch_unwind();

    // Cancellation takes priority: a token cancelled before the first poll
    // (a preempted instance that never started) must not run the worker.
    tokio::select! {
        biased;
        _ = token.cancelled() => {
            trace!(worker = worker.name(), "dispatch cancelled");
        }
        outcome = execution => match outcome {
            Ok(Ok(())) => {}
            Ok(Err(WorkerError::Canceled)) => {
                trace!(worker = worker.name(), "worker observed cancellation");
            }
            Ok(Err(err)) => {
                report(worker.name(), Fault::from(&err), sink, catch);
            }
            Err(panic_payload) => {
                report(worker.name(), Fault::from_panic(panic_payload), sink, catch);
            }
        }
    }
}

fn report(worker: &str, fault: Fault, sink: &Arc<dyn ErrorSink>, catch: Option<&CatchFn>) {
    debug!(worker, label = fault.label, "worker failure contained: {}", fault.message);
    sink.report(fault.clone());
    if let Some(catch) = catch {
        catch(&fault);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::error::WorkerError;
    use crate::workers::WorkerFn;

    #[derive(Clone, Debug)]
    struct Ping;

    impl Event for Ping {
        fn tag(&self) -> &str {
            "ping"
        }
    }

    #[derive(Default)]
    struct CapturingSink {
        faults: Mutex<Vec<Fault>>,
    }

    impl ErrorSink for CapturingSink {
        fn report(&self, fault: Fault) {
            self.faults.lock().unwrap().push(fault);
        }
    }

    fn capturing_sink() -> (Arc<CapturingSink>, Arc<dyn ErrorSink>) {
        let sink = Arc::new(CapturingSink::default());
        (Arc::clone(&sink), sink.clone() as Arc<dyn ErrorSink>)
    }

    #[tokio::test]
    async fn test_success_reports_nothing() {
        let (capture, sink) = capturing_sink();
        let worker: WorkerRef<Ping> =
            WorkerFn::arc("ok", |_ev: Ping, _ctx: CancellationToken| async {
                Ok::<_, WorkerError>(())
            });

        run_contained(&worker, Ping, CancellationToken::new(), &sink, None).await;
        assert!(capture.faults.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_reports_exactly_one_fault() {
        let (capture, sink) = capturing_sink();
        let worker: WorkerRef<Ping> =
            WorkerFn::arc("boom", |_ev: Ping, _ctx: CancellationToken| async {
                Err::<(), _>(WorkerError::fail("boom"))
            });

        run_contained(&worker, Ping, CancellationToken::new(), &sink, None).await;

        let faults = capture.faults.lock().unwrap();
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].label, "worker_failed");
    }

    #[tokio::test]
    async fn test_panic_is_caught_and_normalized() {
        let (capture, sink) = capturing_sink();
        let worker: WorkerRef<Ping> =
            WorkerFn::arc("panicky", |_ev: Ping, _ctx: CancellationToken| async {
                if true {
                    panic!("kaput");
                }
                Ok::<(), WorkerError>(())
            });

        run_contained(&worker, Ping, CancellationToken::new(), &sink, None).await;

        let faults = capture.faults.lock().unwrap();
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].label, "worker_panicked");
        assert_eq!(faults[0].message, "kaput");
    }

    #[tokio::test]
    async fn test_cancellation_reports_nothing() {
        let (capture, sink) = capturing_sink();
        let worker: WorkerRef<Ping> = WorkerFn::arc("slow", |_ev: Ping, ctx: CancellationToken| async move {
            ctx.cancelled().await;
            Err(WorkerError::Canceled)
        });

        let token = CancellationToken::new();
        let run = run_contained(&worker, Ping, token.clone(), &sink, None);
        tokio::pin!(run);

        tokio::select! {
            _ = &mut run => panic!("should not finish before cancel"),
            _ = tokio::task::yield_now() => {}
        }
        token.cancel();
        run.await;

        assert!(capture.faults.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_never_runs_worker() {
        let (capture, sink) = capturing_sink();
        let ran = Arc::new(Mutex::new(false));
        let ran2 = Arc::clone(&ran);
        let worker: WorkerRef<Ping> =
            WorkerFn::arc("skipped", move |_ev: Ping, _ctx: CancellationToken| {
                let ran = Arc::clone(&ran2);
                async move {
                    *ran.lock().unwrap() = true;
                    Ok::<_, WorkerError>(())
                }
            });

        let token = CancellationToken::new();
        token.cancel();
        run_contained(&worker, Ping, token, &sink, None).await;

        assert!(!*ran.lock().unwrap());
        assert!(capture.faults.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_catch_runs_after_report_with_same_fault() {
        let (capture, sink) = capturing_sink();
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let seen2 = Arc::clone(&seen);
        let catch: CatchFn = Arc::new(move |fault: &Fault| {
            seen2.lock().unwrap().push(fault.message.clone());
        });

        let worker: WorkerRef<Ping> =
            WorkerFn::arc("boom", |_ev: Ping, _ctx: CancellationToken| async {
                Err::<(), _>(WorkerError::fail("boom"))
            });
        run_contained(&worker, Ping, CancellationToken::new(), &sink, Some(&catch)).await;

        assert_eq!(capture.faults.lock().unwrap().len(), 1);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("boom"));
    }
}
