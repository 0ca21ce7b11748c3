//! Scripted in-memory channel for protocol tests.
//!
//! Real networks drop, reorder, and duplicate datagrams; the engine's
//! reliability machinery has to be exercised against all of that without a
//! network. [`ScriptedChannel`] records every datagram the engine sends and
//! serves replies from a pre-loaded script, where each entry is either a
//! datagram or a forced timeout. An exhausted script answers every further
//! receive with a timeout, which is what a dead server looks like.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::{Channel, ChannelError};

/// One scripted receive outcome.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Deliver this datagram.
    Datagram(Vec<u8>),
    /// Simulate a lost reply: the receive times out.
    Timeout,
}

/// A [`Channel`] that replays a script instead of touching a socket.
#[derive(Debug, Default)]
pub struct ScriptedChannel {
    replies: Mutex<VecDeque<Reply>>,
    sent: Mutex<Vec<Vec<u8>>>,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a datagram to be delivered by a future receive.
    pub fn push_datagram(&self, datagram: impl Into<Vec<u8>>) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Datagram(datagram.into()));
    }

    /// Queues a forced timeout (one lost reply).
    pub fn push_timeout(&self) {
        self.replies.lock().unwrap().push_back(Reply::Timeout);
    }

    /// Every datagram sent so far, in order.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of datagrams sent so far.
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Channel for ScriptedChannel {
    async fn send(&self, datagram: &[u8]) -> Result<(), ChannelError> {
        self.sent.lock().unwrap().push(datagram.to_vec());
        Ok(())
    }

    async fn recv_timeout(&self, _timeout: Duration) -> Result<Vec<u8>, ChannelError> {
        match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Datagram(datagram)) => Ok(datagram),
            Some(Reply::Timeout) | None => Err(ChannelError::TimedOut),
        }
    }
}
