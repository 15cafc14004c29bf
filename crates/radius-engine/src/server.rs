//! UDP server façade.
//!
//! A [`RadiusServer`] binds one UDP endpoint, reads datagrams of up to 1500
//! bytes into a fresh buffer each, and hands every datagram to its own task
//! which resolves the shared secret, decodes the packet and publishes it on
//! a bounded channel. Decoding runs concurrently with subsequent reads, so
//! packets are not guaranteed to appear in arrival order; the identifier
//! field disambiguates. A full channel blocks the decoding worker, not the
//! socket reader.

use crate::secret::SecretProvider;
use radius_codec::{Codec, PacketError, RadiusPacket};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, Notify};
use tracing::{debug, error, info, warn};

/// Largest datagram the receive loop accepts.
pub const MAX_DATAGRAM_SIZE: usize = 1500;

/// Default bound on the decoded-packet stream.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 10_000;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("socket read failed: {0}")]
    Read(std::io::Error),
    #[error("socket write failed: {0}")]
    Write(std::io::Error),
    #[error("packet error: {0}")]
    Packet(#[from] PacketError),
    #[error("reply has no origin address")]
    NoOrigin,
}

/// One bound RADIUS endpoint and its receive loop.
pub struct RadiusServer {
    codec: Arc<Codec>,
    socket: Arc<UdpSocket>,
    shutdown: Arc<Notify>,
}

impl RadiusServer {
    /// Bind a UDP endpoint and start the receive loop. Returns the server
    /// handle and the stream of decoded packets.
    pub async fn start(
        bind_addr: SocketAddr,
        codec: Arc<Codec>,
        secrets: Arc<dyn SecretProvider>,
        channel_capacity: usize,
    ) -> Result<(Self, mpsc::Receiver<RadiusPacket>), ServerError> {
        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: bind_addr,
                source,
            })?;
        let socket = Arc::new(socket);
        match socket.local_addr() {
            Ok(local) => info!("RADIUS server listening on {}", local),
            Err(_) => info!("RADIUS server listening on {}", bind_addr),
        }

        let (tx, rx) = mpsc::channel(channel_capacity);
        let shutdown = Arc::new(Notify::new());

        let server = RadiusServer {
            codec: Arc::clone(&codec),
            socket: Arc::clone(&socket),
            shutdown: Arc::clone(&shutdown),
        };

        tokio::spawn(Self::receive_loop(socket, codec, secrets, tx, shutdown));

        Ok((server, rx))
    }

    async fn receive_loop(
        socket: Arc<UdpSocket>,
        codec: Arc<Codec>,
        secrets: Arc<dyn SecretProvider>,
        tx: mpsc::Sender<RadiusPacket>,
        shutdown: Arc<Notify>,
    ) {
        loop {
            let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
            let (len, addr) = tokio::select! {
                _ = shutdown.notified() => {
                    debug!("receive loop stopping");
                    return;
                }
                result = socket.recv_from(&mut buf) => match result {
                    Ok(read) => read,
                    Err(e) => {
                        error!("socket read failed: {}", e);
                        continue;
                    }
                },
            };
            buf.truncate(len);
            debug!(bytes = len, peer = %addr, "read datagram");

            let codec = Arc::clone(&codec);
            let secrets = Arc::clone(&secrets);
            let tx = tx.clone();
            tokio::spawn(async move {
                let secret = secrets.shared_secret(&addr.ip().to_string());
                match codec.decode(addr, &buf, &secret) {
                    Ok(packet) => {
                        debug!(avps = packet.avps.len(), "decoded {}", packet);
                        if tx.send(packet).await.is_err() {
                            debug!("packet stream closed, dropping packet");
                        }
                    }
                    Err(e) => warn!(peer = %addr, "dropping malformed datagram: {}", e),
                }
            });
        }
    }

    /// Local address of the bound socket; useful when binding to port 0.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.socket.local_addr().map_err(ServerError::Read)
    }

    /// Encode a reply and send it to the packet's origin.
    pub async fn send(&self, packet: &RadiusPacket) -> Result<(), ServerError> {
        let dest = packet.origin.ok_or(ServerError::NoOrigin)?;
        let bytes = self.codec.encode(packet)?;
        self.send_raw(&bytes, dest).await?;
        debug!(bytes = bytes.len(), peer = %dest, "sent {}", packet);
        Ok(())
    }

    /// Send pre-encoded bytes to a destination.
    pub async fn send_raw(&self, data: &[u8], dest: SocketAddr) -> Result<(), ServerError> {
        self.socket
            .send_to(data, dest)
            .await
            .map_err(ServerError::Write)?;
        Ok(())
    }

    /// Stop the receive loop. In-flight decode tasks finish or observe the
    /// closed stream and exit; the packet stream closes once they drain.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }
}
