//! RADIUS packet codec (RFC 2865 and RFC 2866).
//!
//! This crate implements the byte-exact RADIUS framing: dictionary-driven
//! AVP decoding (including vendor-specific nested TLVs and obfuscated user
//! passwords) and the MD5-based authenticator computation.
//!
//! # Structure
//!
//! - A [`Dictionary`] maps attribute codes to names and content types, and
//!   vendor IDs to nested sub-attribute tables.
//! - A [`CodecTable`] maps content types to decode and encode functions; the
//!   built-in types are a fixed enum, custom codecs are registered on
//!   [`CodecTableBuilder`] before anything runs.
//! - A [`Codec`] ties the two together and turns datagrams into
//!   [`RadiusPacket`] records and back.
//!
//! # Example
//!
//! ```rust
//! use radius_codec::{Avp, Code, Codec, RadiusPacket};
//!
//! let codec = Codec::with_defaults();
//!
//! let mut packet = RadiusPacket::new(Code::AccessRequest, 1, "testing123");
//! packet.add_avp(Avp::text("User-Name", "alice"));
//! packet.add_avp(Avp::password("secret"));
//!
//! let bytes = codec.encode(&packet).unwrap();
//! assert_eq!(bytes.len(), 20 + 7 + 18);
//! ```

pub mod auth;
pub mod avp;
pub mod codec;
pub mod content;
pub mod defaults;
pub mod dictionary;
pub mod packet;
pub mod value;

pub use avp::Avp;
pub use codec::Codec;
pub use content::{
    CodecTable, CodecTableBuilder, ContentType, DecodeContext, DecodeFn, EncodeContext, EncodeFn,
    RegistryError,
};
pub use dictionary::{AttributeDef, Dictionary, DictionaryError, TlvDef, VendorDef};
pub use packet::{Code, PacketError, RadiusPacket};
pub use value::{AcctStatus, Value, VendorSub};
