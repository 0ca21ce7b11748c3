//! Session facade: one socket, one operation at a time.

use std::io;
use std::path::Path;
use std::time::Duration;

use tokio::fs::File;
use tokio::sync::mpsc;
use tracing::info;

use udrop_channel::{Channel, UdpChannel};
use udrop_protocol::ProgressEvent;

use crate::progress::ProgressEmitter;
use crate::{TransferError, exchange, get, put, rtt};

/// One client-to-server connection and the operations it supports.
///
/// The session owns the socket exclusively; every operation takes
/// `&mut self`, so two exchanges can never interleave on the shared channel
/// and steal each other's replies. Dropping the session closes the socket,
/// which is also the only way to abandon an in-progress transfer.
pub struct Session<C = UdpChannel> {
    channel: C,
    progress: ProgressEmitter,
}

impl Session<UdpChannel> {
    /// Binds a local socket and fixes `host:port` as the remote endpoint.
    pub async fn connect(host: &str, port: u16) -> Result<Self, TransferError> {
        let channel = UdpChannel::connect((host, port)).await?;
        info!(peer = %channel.peer(), "session connected");
        Ok(Self::with_channel(channel))
    }
}

impl<C: Channel> Session<C> {
    /// Wraps an existing channel (any transport, including fakes).
    pub fn with_channel(channel: C) -> Self {
        Self {
            channel,
            progress: ProgressEmitter::new(),
        }
    }

    /// Attaches a progress observer, replacing any previous one.
    pub fn subscribe_progress(&mut self) -> mpsc::Receiver<ProgressEvent> {
        self.progress.subscribe()
    }

    /// Returns the server's file listing.
    pub async fn list(&mut self) -> Result<Vec<String>, TransferError> {
        exchange::list(&self.channel).await
    }

    /// Deletes `name` on the server.
    pub async fn delete(&mut self, name: &str) -> Result<(), TransferError> {
        exchange::delete(&self.channel, name).await
    }

    /// Fetches `name` into the file at `destination`; returns bytes written.
    ///
    /// The destination is created only after the server confirms the file
    /// exists and is non-empty. On a failure mid-stream the destination is
    /// left holding a partial prefix and must be treated as invalid.
    pub async fn get(
        &mut self,
        name: &str,
        destination: impl AsRef<Path>,
    ) -> Result<u64, TransferError> {
        let total = get::negotiate(&self.channel, name).await?;
        let mut dest = File::create(destination.as_ref()).await?;
        get::stream(&self.channel, &self.progress, total, &mut dest).await
    }

    /// Stores the local file at `source` under its base name; returns bytes
    /// sent.
    pub async fn put(&mut self, source: impl AsRef<Path>) -> Result<u64, TransferError> {
        let path = source.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                TransferError::Io(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "source path has no usable file name",
                ))
            })?
            .to_owned();

        let mut file = File::open(path).await?;
        let file_size = file.metadata().await?.len();
        put::store(&self.channel, &self.progress, &name, &mut file, file_size).await
    }

    /// Asks the server to shut this session down.
    ///
    /// Best effort: success means the datagram was handed to the OS, not
    /// that the server received it.
    pub async fn terminate(&mut self) -> Result<(), TransferError> {
        exchange::terminate(&self.channel).await
    }

    /// Approximate round-trip time, measured over one listing exchange.
    pub async fn ping(&mut self) -> Duration {
        rtt::probe(&self.channel).await
    }
}
