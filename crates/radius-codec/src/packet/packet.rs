use super::Code;
use crate::auth;
use crate::avp::Avp;
use std::fmt;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PacketError {
    #[error("datagram too short: {0} bytes")]
    Runt(usize),
    #[error("length field says {declared} bytes but datagram has {actual}")]
    LengthMismatch { declared: u16, actual: usize },
    #[error("attribute at offset {offset} declares length {length}, minimum is 2")]
    InvalidAvpLength { offset: usize, length: u8 },
    #[error("attribute at offset {offset} overruns the datagram")]
    TruncatedAvp { offset: usize },
    #[error("encoded packet would be {0} bytes, maximum is 4096")]
    PacketTooLarge(usize),
}

/// RADIUS packet as defined in RFC 2865 Section 3.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     Code      |  Identifier   |            Length             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// |                         Authenticator                         |
/// |                                                               |
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  Attributes ...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-
/// ```
///
/// Decoded packets carry the original datagram in `raw` so the accounting
/// authenticator can be verified over the exact received bytes.
#[derive(Debug, Clone)]
pub struct RadiusPacket {
    /// Packet code (1 byte)
    pub code: Code,
    /// Packet identifier for matching requests and responses (1 byte)
    pub identifier: u8,
    /// `Some` for decoded packets and replies (the request authenticator);
    /// `None` for a request built from scratch, filled with 16 random bytes
    /// at encode time.
    pub authenticator: Option<[u8; 16]>,
    /// AVPs in wire order.
    pub avps: Vec<Avp>,
    /// Shared secret for this packet's peer, resolved from the origin IP.
    pub shared_secret: String,
    /// Where the datagram came from, and where a reply goes.
    pub origin: Option<SocketAddr>,
    /// The original datagram; empty for packets built from scratch.
    pub raw: Vec<u8>,
}

impl RadiusPacket {
    /// Minimum RADIUS packet size (1 code + 1 id + 2 length + 16 authenticator)
    pub const MIN_PACKET_SIZE: usize = 20;
    /// Maximum RADIUS packet size per RFC 2865
    pub const MAX_PACKET_SIZE: usize = 4096;

    /// A packet built from scratch, e.g. a request about to be sent.
    pub fn new(code: Code, identifier: u8, shared_secret: impl Into<String>) -> Self {
        RadiusPacket {
            code,
            identifier,
            authenticator: None,
            avps: Vec::new(),
            shared_secret: shared_secret.into(),
            origin: None,
            raw: Vec::new(),
        }
    }

    pub fn add_avp(&mut self, avp: Avp) {
        self.avps.push(avp);
    }

    /// A reply template: same identifier, origin and secret; the request
    /// authenticator seeds the Response Authenticator at encode time.
    pub fn reply(&self, code: Code) -> RadiusPacket {
        RadiusPacket {
            code,
            identifier: self.identifier,
            authenticator: self.authenticator,
            avps: Vec::new(),
            shared_secret: self.shared_secret.clone(),
            origin: self.origin,
            raw: Vec::new(),
        }
    }

    /// Semantic packet-type name derived from the code.
    pub fn packet_type(&self) -> &'static str {
        self.code.name()
    }

    /// First AVP with the given dictionary name.
    pub fn find_avp(&self, name: &str) -> Option<&Avp> {
        self.avps.iter().find(|avp| avp.name == name)
    }

    /// All AVPs with the given dictionary name.
    pub fn find_all_avps(&self, name: &str) -> Vec<&Avp> {
        self.avps.iter().filter(|avp| avp.name == name).collect()
    }

    /// Check the authenticator of a received Accounting-Request or response
    /// packet against the shared secret. Always false for packets built from
    /// scratch, which carry no raw datagram.
    pub fn verify_authenticator(&self) -> bool {
        auth::verify_authenticator(&self.raw, self.shared_secret.as_bytes())
    }
}

impl fmt::Display for RadiusPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Radius Packet {} ({}) ID: {} - {} AVPs",
            self.code.name(),
            self.code.as_u8(),
            self.identifier,
            self.avps.len()
        )
    }
}
