//! UDP implementation of [`Channel`].

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{ToSocketAddrs, UdpSocket};
use tracing::debug;

use udrop_protocol::FRAME_LEN;

use crate::{Channel, ChannelError};

/// An ephemeral UDP socket connected to the server endpoint.
///
/// Connecting the socket fixes the remote address for the session and lets
/// the OS discard datagrams from anyone else.
pub struct UdpChannel {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl UdpChannel {
    /// Binds an ephemeral local port and connects it to `peer`.
    pub async fn connect(peer: impl ToSocketAddrs) -> Result<Self, ChannelError> {
        let socket = UdpSocket::bind(("0.0.0.0", 0)).await?;
        socket.connect(peer).await?;
        let peer = socket.peer_addr()?;
        debug!(%peer, local = %socket.local_addr()?, "udp channel connected");
        Ok(Self { socket, peer })
    }

    /// The fixed remote endpoint.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// The local address the socket is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ChannelError> {
        Ok(self.socket.local_addr()?)
    }
}

impl Channel for UdpChannel {
    async fn send(&self, datagram: &[u8]) -> Result<(), ChannelError> {
        let sent = self.socket.send(datagram).await?;
        if sent != datagram.len() {
            return Err(ChannelError::Io(io::Error::other(format!(
                "short datagram send: {sent} of {} bytes",
                datagram.len()
            ))));
        }
        Ok(())
    }

    async fn recv_timeout(&self, timeout: Duration) -> Result<Vec<u8>, ChannelError> {
        // Largest protocol datagram is one data frame.
        let mut buf = vec![0u8; FRAME_LEN];
        match tokio::time::timeout(timeout, self.socket.recv(&mut buf)).await {
            Ok(Ok(n)) => {
                buf.truncate(n);
                Ok(buf)
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(ChannelError::TimedOut),
        }
    }
}
