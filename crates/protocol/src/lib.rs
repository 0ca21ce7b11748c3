//! Wire protocol codec for the udrop file-transfer protocol.
//!
//! Everything on the wire is one of three fixed-format datagrams, with all
//! integers as signed 32-bit little-endian:
//!
//! ```text
//! COMMAND:    [50 bytes: ASCII text, zero-padded]
//!             "ls" | "delete <name>" | "get <name>" | "put <name>" | "exit"
//!
//! ACK/TOTAL:  [4 bytes LE: i32]
//!             meaning depends on phase: delete status code, total-frame
//!             echo during negotiation, or frame-id echo during streaming
//!
//! DATA FRAME: [4 bytes LE: id] [4 bytes LE: length] [2048 bytes: payload]
//!             always 2056 bytes on the wire; only the first `length`
//!             payload bytes are meaningful, the rest is padding
//! ```
//!
//! This crate is pure encode/decode — no sockets, no I/O. The [`event`]
//! module carries the progress-event types shared between the transfer
//! engine and whatever consumer observes it.

pub mod command;
pub mod event;
pub mod frame;

pub use command::{Command, encode_command, encode_command_lossy};
pub use event::{ProgressEvent, ProgressKind};
pub use frame::{FrameRef, decode_frame, decode_i32, encode_frame, encode_i32};

/// Fixed size of a command datagram.
pub const COMMAND_LEN: usize = 50;

/// Size of an ack/total datagram (one i32).
pub const ACK_LEN: usize = 4;

/// Maximum meaningful payload bytes per data frame.
pub const FRAME_PAYLOAD: usize = 2048;

/// Fixed wire size of a data frame: id(4) + length(4) + payload slot(2048).
pub const FRAME_LEN: usize = 8 + FRAME_PAYLOAD;

/// Errors produced while encoding or decoding wire datagrams.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("command text is {len} bytes, exceeds the {COMMAND_LEN}-byte slot")]
    CommandTooLong { len: usize },

    #[error("frame payload is {len} bytes, exceeds {FRAME_PAYLOAD}")]
    PayloadTooLarge { len: usize },

    #[error("datagram too short: expected at least {expected} bytes, got {got}")]
    ShortDatagram { expected: usize, got: usize },

    #[error("frame length field out of range: {0}")]
    InvalidLength(i32),
}
