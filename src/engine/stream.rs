//! Line-oriented output pump for one process pipe.

use crate::engine::lifecycle::RunLifecycle;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Read decoded lines from `reader` and emit each the instant it arrives.
///
/// Stops on end-of-input, on a read error (treated as end of stream, not
/// surfaced), or as soon as the run leaves `Running`. A blocked read never
/// delays shutdown: the select arm on the state watch wakes immediately when
/// the run terminates.
pub(crate) async fn pump_lines<R>(reader: R, lifecycle: Arc<RunLifecycle>)
where
    R: AsyncRead + Unpin,
{
    let mut state_rx = lifecycle.watch();
    let mut lines = BufReader::new(reader).lines();
    loop {
        tokio::select! {
            next = lines.next_line() => match next {
                Ok(Some(text)) => {
                    if !lifecycle.emit_line(text) {
                        break;
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    tracing::debug!(run = %lifecycle.id(), %err, "output stream read failed, treating as end of stream");
                    break;
                }
            },
            _ = state_rx.wait_for(|state| !state.is_running()) => break,
        }
    }
}
