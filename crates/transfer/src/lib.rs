//! Protocol engine for the udrop UDP file-transfer client.
//!
//! The server speaks a fixed-format datagram protocol with no transport
//! reliability, so everything that makes a transfer dependable lives here:
//! the one-shot command exchanges, the stop-and-wait GET and PUT state
//! machines with bounded retry budgets, and the progress-event stream that
//! external observers consume.
//!
//! One [`Session`] owns one socket. Operations take `&mut self`, so the
//! borrow checker enforces the protocol's one-exchange-in-flight rule.

mod checksum;
mod exchange;
mod get;
mod progress;
mod put;
mod rtt;
mod session;

pub use checksum::{checksum_bytes, file_checksum};
pub use progress::{DEFAULT_EVENT_CAPACITY, ProgressEmitter};
pub use session::Session;

use std::time::Duration;

use udrop_channel::ChannelError;
use udrop_protocol::ProtocolError;

/// Deadline for control-plane replies: command responses, the total-frame
/// negotiation, and per-frame acks during PUT.
pub const CONTROL_TIMEOUT: Duration = Duration::from_millis(2000);

/// Deadline for an inbound data frame during GET.
pub const FRAME_TIMEOUT: Duration = Duration::from_millis(5000);

/// Resend budget for the total-frame negotiation during PUT.
///
/// Tunable independently of [`FRAME_RETRY_LIMIT`]; a failed session start
/// gives up much sooner than a frame lost mid-stream.
pub const TOTAL_RETRY_LIMIT: u32 = 20;

/// Per-frame resend budget during PUT streaming.
pub const FRAME_RETRY_LIMIT: u32 = 200;

/// Errors surfaced by session operations.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("no reply from the server within the deadline")]
    Timeout,

    #[error("server did not answer the fetch request")]
    ServerUnresponsive,

    #[error("file is empty or does not exist on the server")]
    FileEmptyOrNotFound,

    #[error("server rejected the file name")]
    InvalidFilename,

    #[error("server denied permission")]
    PermissionDenied,

    #[error("no acknowledgment for the frame count")]
    NoAckForTotal,

    #[error("frame-count acknowledgment never matched after {TOTAL_RETRY_LIMIT} resends")]
    AckMismatch,

    #[error("frame {0} was not acknowledged after {FRAME_RETRY_LIMIT} attempts")]
    FrameSendFailed(i32),
}

impl From<ChannelError> for TransferError {
    fn from(err: ChannelError) -> Self {
        match err {
            ChannelError::Io(e) => TransferError::Io(e),
            ChannelError::TimedOut => TransferError::Timeout,
        }
    }
}
