//! RADIUS protocol engine.
//!
//! Binds the `radius-codec` packet codec to UDP endpoints: inbound datagrams
//! are decoded concurrently and published on a bounded stream, and reply
//! packets are serialized (authenticator included) and sent back to their
//! origin. Policy — whether to accept, reject or challenge — belongs to the
//! application consuming the stream.
//!
//! # Example
//!
//! ```rust,no_run
//! use radius_codec::{Code, Codec};
//! use radius_engine::{RadiusServer, StaticSecret, DEFAULT_CHANNEL_CAPACITY};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let codec = Arc::new(Codec::with_defaults());
//!     let secrets = Arc::new(StaticSecret("testing123".to_string()));
//!
//!     let (server, mut packets) =
//!         RadiusServer::start("0.0.0.0:1812".parse()?, codec, secrets, DEFAULT_CHANNEL_CAPACITY)
//!             .await?;
//!
//!     while let Some(packet) = packets.recv().await {
//!         if packet.code == Code::AccessRequest {
//!             server.send(&packet.reply(Code::AccessAccept)).await?;
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dictfile;
pub mod secret;
pub mod server;

pub use config::{Client, Config, ConfigError};
pub use secret::{SecretFn, SecretProvider, StaticSecret};
pub use server::{RadiusServer, ServerError, DEFAULT_CHANNEL_CAPACITY, MAX_DATAGRAM_SIZE};
