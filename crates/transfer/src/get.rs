//! GET state machine: negotiate the frame count, then receive frames with
//! stop-and-wait acknowledgment.
//!
//! The receiver acknowledges **every** datagram it gets, matching or not.
//! Echoing an unexpected id back is what tells the server to retransmit the
//! frame the receiver is actually waiting for, so the client needs no retry
//! timer of its own on this path.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use udrop_channel::{Channel, ChannelError};
use udrop_protocol::{Command, ProgressEvent, decode_frame, decode_i32, encode_i32};

use crate::progress::ProgressEmitter;
use crate::{CONTROL_TIMEOUT, FRAME_TIMEOUT, TransferError};

/// Sends `get <name>` and resolves the total frame count.
///
/// Returns before any destination is opened: a missing or empty file fails
/// here with [`TransferError::FileEmptyOrNotFound`], and a silent server
/// with [`TransferError::ServerUnresponsive`]. On success the count has
/// already been echoed back (single best-effort send, no retry).
pub(crate) async fn negotiate<C: Channel>(channel: &C, name: &str) -> Result<i32, TransferError> {
    channel.send(&Command::Get(name.to_owned()).encode()?).await?;

    let reply = match channel.recv_timeout(CONTROL_TIMEOUT).await {
        Ok(reply) => reply,
        Err(ChannelError::TimedOut) => return Err(TransferError::ServerUnresponsive),
        Err(e) => return Err(e.into()),
    };
    let total = decode_i32(&reply)?;
    if total <= 0 {
        return Err(TransferError::FileEmptyOrNotFound);
    }

    channel.send(&encode_i32(total)).await?;
    debug!(name, total, "fetch negotiated");
    Ok(total)
}

/// Receives `total` frames into `dest`, acking every datagram and writing
/// only the frame currently expected.
///
/// A frame-wait timeout aborts the session and propagates as
/// [`TransferError::Timeout`]; whatever was already written stays in `dest`
/// and the caller must treat it as invalid.
pub(crate) async fn stream<C, W>(
    channel: &C,
    progress: &ProgressEmitter,
    total: i32,
    dest: &mut W,
) -> Result<u64, TransferError>
where
    C: Channel,
    W: AsyncWrite + Unpin,
{
    let mut expected: i32 = 1;
    let mut bytes: u64 = 0;

    while expected <= total {
        let datagram = channel.recv_timeout(FRAME_TIMEOUT).await?;
        let frame = decode_frame(&datagram)?;

        // Ack the received id unconditionally, even for duplicates.
        channel.send(&encode_i32(frame.id)).await?;

        if frame.id == expected {
            dest.write_all(frame.payload).await?;
            bytes += frame.payload.len() as u64;
            progress.emit(ProgressEvent::frame_get(
                frame.id,
                total,
                frame.payload.len() as i32,
                bytes,
            ));
            expected += 1;
        } else {
            debug!(id = frame.id, expected, "discarding out-of-order frame");
        }
    }

    dest.flush().await?;
    info!(total, bytes, "fetch complete");
    progress.emit(ProgressEvent::get_done(total, bytes));
    Ok(bytes)
}
