//! Round-trip latency probe.
//!
//! There is no echo operation on the wire, so the probe times a full `ls`
//! exchange instead. The result is an approximation that includes server
//! listing work — and, when the server is silent, the timeout itself.

use std::time::{Duration, Instant};

use udrop_channel::Channel;

use crate::exchange;

/// Measures the wall-clock duration of one listing exchange.
///
/// Never fails: an error or timeout still yields the elapsed time, which is
/// exactly what a caller probing a dead server wants to see.
pub(crate) async fn probe<C: Channel>(channel: &C) -> Duration {
    let start = Instant::now();
    let _ = exchange::list(channel).await;
    start.elapsed()
}
