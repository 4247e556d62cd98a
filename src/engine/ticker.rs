//! Elapsed-time status ticks for an active run.

use crate::engine::lifecycle::RunLifecycle;
use std::sync::Arc;
use std::time::Duration;

/// Emit a status tick once per `period` while the run is `Running`, starting
/// immediately at 0s. Stops within one period of the run terminating; the
/// select arm on the state watch usually ends it sooner.
pub(crate) async fn run_ticker(lifecycle: Arc<RunLifecycle>, period: Duration) {
    let mut state_rx = lifecycle.watch();
    let mut ticks = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = ticks.tick() => {
                if !lifecycle.emit_tick() {
                    break;
                }
            }
            _ = state_rx.wait_for(|state| !state.is_running()) => break,
        }
    }
}
