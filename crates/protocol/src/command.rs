//! Command datagram encoding.
//!
//! Commands are plain ASCII text zero-padded into a fixed 50-byte slot. The
//! server parses `<verb> <name>` out of the slot, so the text before padding
//! must fit entirely — [`encode_command`] rejects oversized text instead of
//! corrupting a long filename. [`encode_command_lossy`] keeps the historical
//! truncating behavior for callers that explicitly want it.

use crate::{COMMAND_LEN, ProtocolError};

/// One of the five protocol commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `ls` — request the newline-delimited server listing.
    List,
    /// `delete <name>` — remove a file; answered by a status code.
    Delete(String),
    /// `get <name>` — begin a chunked fetch.
    Get(String),
    /// `put <name>` — announce a chunked store.
    Put(String),
    /// `exit` — ask the server to shut this session down; no reply.
    Exit,
}

impl Command {
    /// The command text as it appears on the wire, before padding.
    pub fn text(&self) -> String {
        match self {
            Command::List => "ls".to_string(),
            Command::Delete(name) => format!("delete {name}"),
            Command::Get(name) => format!("get {name}"),
            Command::Put(name) => format!("put {name}"),
            Command::Exit => "exit".to_string(),
        }
    }

    /// Encodes into the fixed 50-byte slot.
    pub fn encode(&self) -> Result<[u8; COMMAND_LEN], ProtocolError> {
        encode_command(&self.text())
    }
}

/// Encodes command text into the fixed 50-byte slot, zero-padded.
///
/// Fails with [`ProtocolError::CommandTooLong`] when the text does not fit;
/// a truncated command would silently address the wrong file.
pub fn encode_command(text: &str) -> Result<[u8; COMMAND_LEN], ProtocolError> {
    let bytes = text.as_bytes();
    if bytes.len() > COMMAND_LEN {
        return Err(ProtocolError::CommandTooLong { len: bytes.len() });
    }
    let mut buf = [0u8; COMMAND_LEN];
    buf[..bytes.len()].copy_from_slice(bytes);
    Ok(buf)
}

/// Encodes command text, truncating anything past 50 bytes.
///
/// Matches the original client's overflow behavior. The engine never calls
/// this; it exists for callers that knowingly accept the truncation.
pub fn encode_command_lossy(text: &str) -> [u8; COMMAND_LEN] {
    let bytes = text.as_bytes();
    let take = bytes.len().min(COMMAND_LEN);
    let mut buf = [0u8; COMMAND_LEN];
    buf[..take].copy_from_slice(&bytes[..take]);
    buf
}
