//! One-shot command/response exchanges: `ls`, `delete`, `exit`.

use tracing::debug;

use udrop_channel::Channel;
use udrop_protocol::{Command, decode_i32};

use crate::{CONTROL_TIMEOUT, TransferError};

/// Requests the server listing and parses it into file names.
pub(crate) async fn list<C: Channel>(channel: &C) -> Result<Vec<String>, TransferError> {
    channel.send(&Command::List.encode()?).await?;
    let reply = channel.recv_timeout(CONTROL_TIMEOUT).await?;

    let entries: Vec<String> = text_before_nul(&reply)
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect();
    debug!(count = entries.len(), "listing received");
    Ok(entries)
}

/// Asks the server to delete `name` and interprets the status code.
pub(crate) async fn delete<C: Channel>(channel: &C, name: &str) -> Result<(), TransferError> {
    channel.send(&Command::Delete(name.to_owned()).encode()?).await?;
    let reply = channel.recv_timeout(CONTROL_TIMEOUT).await?;

    let code = decode_i32(&reply)?;
    debug!(name, code, "delete status");
    if code > 0 {
        Ok(())
    } else if code < 0 {
        Err(TransferError::InvalidFilename)
    } else {
        Err(TransferError::PermissionDenied)
    }
}

/// Sends `exit` without waiting for confirmation.
///
/// Best effort: the datagram may be lost and the server's receipt is never
/// confirmed. Local success only means the send left this host.
pub(crate) async fn terminate<C: Channel>(channel: &C) -> Result<(), TransferError> {
    channel.send(&Command::Exit.encode()?).await?;
    debug!("exit sent");
    Ok(())
}

/// The server answers `ls` from a fixed C buffer, so the datagram may carry
/// trailing NULs that are not part of the listing.
fn text_before_nul(reply: &[u8]) -> String {
    let end = reply.iter().position(|&b| b == 0).unwrap_or(reply.len());
    String::from_utf8_lossy(&reply[..end]).into_owned()
}
