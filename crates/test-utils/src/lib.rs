//! Shared helpers for the `pipedag` integration tests: manifest and
//! descriptor builders, recording tasks and executors, log capture and a
//! deadline for pipeline runs.

pub mod builders;
pub mod recording;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use pipedag::logging::LOG_ENV;
use tracing_subscriber::{EnvFilter, fmt};

/// Longest a single pipeline run may take inside a test.
pub const RUN_DEADLINE: Duration = Duration::from_secs(5);

static INIT: Once = Once::new();

/// Capture scheduler and pool logs for the current test binary.
///
/// Reads the same `PIPEDAG_LOG` directives as the binary and defaults to
/// `pipedag=debug` so layer dispatch and task faults show up when a test
/// fails. Thread names are kept because pool tasks log from blocking
/// worker threads.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new("warn,pipedag=debug"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_thread_names(true)
            .try_init()
            .ok();
    });
}

/// Await a pipeline run, failing the test if it outlives [`RUN_DEADLINE`].
///
/// A hung layer barrier or a leaked worker slot shows up as this panic
/// instead of a stuck test binary.
pub async fn with_timeout<F, T>(run: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(RUN_DEADLINE, run).await {
        Ok(out) => out,
        Err(_) => panic!("pipeline run did not finish within {RUN_DEADLINE:?}"),
    }
}
