//! Datagram transport channel.
//!
//! A [`Channel`] is a thin wrapper over one bound socket talking to one
//! fixed remote endpoint: fire a datagram, or wait (bounded) for whatever
//! datagram arrives next. The channel does not demultiplex by content —
//! callers must keep exactly one protocol exchange in flight at a time.
//!
//! [`UdpChannel`] is the real implementation; [`testing::ScriptedChannel`]
//! replays canned replies for deterministic protocol tests.

pub mod testing;
pub mod udp;

pub use udp::UdpChannel;

use std::time::Duration;

/// Errors produced by a transport channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("timed out waiting for a datagram")]
    TimedOut,
}

/// One datagram socket bound to one remote endpoint.
///
/// `send` either hands the datagram to the OS or fails immediately; there
/// is no retransmission at this layer. `recv_timeout` resolves with the
/// next inbound datagram or [`ChannelError::TimedOut`] — it never blocks
/// indefinitely. At most one receive may be outstanding at a time.
#[allow(async_fn_in_trait)]
pub trait Channel {
    async fn send(&self, datagram: &[u8]) -> Result<(), ChannelError>;

    async fn recv_timeout(&self, timeout: Duration) -> Result<Vec<u8>, ChannelError>;
}
