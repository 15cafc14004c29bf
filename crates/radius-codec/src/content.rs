//! Content codec registry.
//!
//! Every dictionary entry names a content type; the content type selects the
//! decoder applied to an AVP's value bytes and the encoder used to serialize
//! it. The built-in types form a fixed enum, dispatched without any string
//! lookup on the packet path. Custom codecs are registered by name on
//! [`CodecTableBuilder`] before the codec is constructed; the resulting
//! [`CodecTable`] is immutable.

use crate::avp::Avp;
use crate::value::{AcctStatus, Value};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use thiserror::Error;
use tracing::debug;

/// A content type known to the codec table.
///
/// The nine built-in variants cover the stock dictionary; `Custom` entries
/// are allocated by the builder for registered codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// `uint16` - two bytes, big-endian
    Uint16,
    /// `uint32` - four bytes, big-endian
    Uint32,
    /// `uvarint` - big-endian accumulator over at most eight bytes
    Uvarint,
    /// `string` - UTF-8 text
    Text,
    /// `IP` - four octets, rendered dotted-quad
    Ipv4,
    /// `Acct-Status-Type` - accounting status enumeration
    AcctStatusType,
    /// `userpassword` - obfuscated password (RFC 2865 Section 5.2)
    UserPassword,
    /// `VSA` - vendor-specific attribute with a nested TLV
    Vsa,
    /// `fallback` - raw bytes, used for unknown attributes
    Fallback,
    /// A codec registered on the builder
    Custom(u16),
}

impl ContentType {
    fn builtin_from_name(name: &str) -> Option<ContentType> {
        Some(match name {
            "uint16" => ContentType::Uint16,
            "uint32" => ContentType::Uint32,
            "uvarint" => ContentType::Uvarint,
            "string" => ContentType::Text,
            "IP" => ContentType::Ipv4,
            "Acct-Status-Type" => ContentType::AcctStatusType,
            "userpassword" => ContentType::UserPassword,
            "VSA" => ContentType::Vsa,
            "fallback" => ContentType::Fallback,
            _ => return None,
        })
    }

    fn builtin_name(self) -> Option<&'static str> {
        Some(match self {
            ContentType::Uint16 => "uint16",
            ContentType::Uint32 => "uint32",
            ContentType::Uvarint => "uvarint",
            ContentType::Text => "string",
            ContentType::Ipv4 => "IP",
            ContentType::AcctStatusType => "Acct-Status-Type",
            ContentType::UserPassword => "userpassword",
            ContentType::Vsa => "VSA",
            ContentType::Fallback => "fallback",
            ContentType::Custom(_) => return None,
        })
    }
}

/// Packet-level context handed to decoders. The user-password codec needs the
/// request authenticator and the shared secret of the packet being decoded.
pub struct DecodeContext<'a> {
    pub authenticator: &'a [u8; 16],
    pub shared_secret: &'a str,
}

/// Packet-level context handed to encoders. `authenticator` is the request
/// authenticator the serialized packet will carry.
pub struct EncodeContext<'a> {
    pub authenticator: &'a [u8; 16],
    pub shared_secret: &'a str,
}

/// A custom decoder: value bytes in, decoded value out. Returning `None`
/// leaves the AVP without a value.
pub type DecodeFn =
    Box<dyn for<'a> Fn(&'a [u8], &'a DecodeContext<'a>) -> Option<Value> + Send + Sync>;

/// A custom encoder: produces the AVP's value bytes (the two-byte header is
/// written by the packet codec, which resolves the attribute code from the
/// dictionary). Returning `None` skips the AVP.
pub type EncodeFn =
    Box<dyn for<'a> Fn(&'a Avp, &'a EncodeContext<'a>) -> Option<Vec<u8>> + Send + Sync>;

/// Registration-time errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("a codec named {0:?} is already registered")]
    DuplicateParser(String),
    #[error("content-type name cannot be empty")]
    EmptyName,
}

struct CustomEntry {
    name: String,
    decoder: Option<DecodeFn>,
    encoder: Option<EncodeFn>,
}

/// Builder for the content codec table. Registration happens here, before
/// any server starts; `build` freezes the table.
#[derive(Default)]
pub struct CodecTableBuilder {
    custom: Vec<CustomEntry>,
}

impl CodecTableBuilder {
    pub fn new() -> Self {
        CodecTableBuilder { custom: Vec::new() }
    }

    /// Register a decoder under a new content-type name. Built-in names are
    /// reserved, and a name may carry at most one decoder.
    pub fn register_decoder(
        &mut self,
        name: impl Into<String>,
        decoder: DecodeFn,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        self.check_name(&name, |entry| entry.decoder.is_some())?;
        match self.custom.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => entry.decoder = Some(decoder),
            None => self.custom.push(CustomEntry {
                name,
                decoder: Some(decoder),
                encoder: None,
            }),
        }
        Ok(())
    }

    /// Register an encoder under a content-type name; the decoder and encoder
    /// registries are parallel, so a name may carry one of each.
    pub fn register_encoder(
        &mut self,
        name: impl Into<String>,
        encoder: EncodeFn,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        self.check_name(&name, |entry| entry.encoder.is_some())?;
        match self.custom.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => entry.encoder = Some(encoder),
            None => self.custom.push(CustomEntry {
                name,
                decoder: None,
                encoder: Some(encoder),
            }),
        }
        Ok(())
    }

    fn check_name(
        &self,
        name: &str,
        occupied: impl Fn(&CustomEntry) -> bool,
    ) -> Result<(), RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if ContentType::builtin_from_name(name).is_some() {
            return Err(RegistryError::DuplicateParser(name.to_string()));
        }
        if self.custom.iter().any(|entry| entry.name == name && occupied(entry)) {
            return Err(RegistryError::DuplicateParser(name.to_string()));
        }
        Ok(())
    }

    pub fn build(self) -> CodecTable {
        let by_name = self
            .custom
            .iter()
            .enumerate()
            .map(|(id, entry)| (entry.name.clone(), id as u16))
            .collect();
        CodecTable {
            custom: self.custom,
            by_name,
        }
    }
}

/// The frozen content codec table: built-in types plus registered customs.
pub struct CodecTable {
    custom: Vec<CustomEntry>,
    by_name: HashMap<String, u16>,
}

impl CodecTable {
    /// Resolve a content-type name. Used once, while the dictionary is being
    /// resolved; the packet path dispatches on [`ContentType`] directly.
    pub fn resolve(&self, name: &str) -> Option<ContentType> {
        ContentType::builtin_from_name(name)
            .or_else(|| self.by_name.get(name).map(|id| ContentType::Custom(*id)))
    }

    /// The registered name of a content type.
    pub fn name_of(&self, content: ContentType) -> &str {
        match content {
            ContentType::Custom(id) => self
                .custom
                .get(id as usize)
                .map(|entry| entry.name.as_str())
                .unwrap_or("unknown"),
            builtin => builtin.builtin_name().unwrap_or("unknown"),
        }
    }

    pub(crate) fn custom_decoder(&self, id: u16) -> Option<&DecodeFn> {
        self.custom.get(id as usize).and_then(|entry| entry.decoder.as_ref())
    }

    pub(crate) fn custom_encoder(&self, id: u16) -> Option<&EncodeFn> {
        self.custom.get(id as usize).and_then(|entry| entry.encoder.as_ref())
    }
}

// Built-in decoders. Fixed-width types decline wrong-length content rather
// than indexing past the end of the slice.

pub(crate) fn decode_uint16(raw: &[u8]) -> Option<Value> {
    if raw.len() != 2 {
        debug!(len = raw.len(), "uint16 content has wrong length");
        return None;
    }
    Some(Value::U16(u16::from_be_bytes([raw[0], raw[1]])))
}

pub(crate) fn decode_uint32(raw: &[u8]) -> Option<Value> {
    if raw.len() != 4 {
        debug!(len = raw.len(), "uint32 content has wrong length");
        return None;
    }
    Some(Value::U32(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]])))
}

pub(crate) fn decode_uvarint(raw: &[u8]) -> Option<Value> {
    let mut accumulator = 0u64;
    for (index, byte) in raw.iter().enumerate() {
        accumulator = (accumulator << 8) | u64::from(*byte);
        if index == 7 {
            break;
        }
    }
    Some(Value::U64(accumulator))
}

pub(crate) fn decode_text(raw: &[u8]) -> Option<Value> {
    Some(Value::Text(String::from_utf8_lossy(raw).into_owned()))
}

pub(crate) fn decode_ipv4(raw: &[u8]) -> Option<Value> {
    if raw.len() != 4 {
        debug!(len = raw.len(), "IP content has wrong length");
        return None;
    }
    Some(Value::Ipv4(Ipv4Addr::new(raw[0], raw[1], raw[2], raw[3])))
}

pub(crate) fn decode_acct_status(raw: &[u8]) -> Option<Value> {
    if raw.len() != 4 {
        debug!(len = raw.len(), "Acct-Status-Type content has wrong length");
        return None;
    }
    let status = u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]);
    Some(Value::AcctStatus(AcctStatus::from_u32(status)))
}

pub(crate) fn decode_fallback(raw: &[u8]) -> Option<Value> {
    Some(Value::Bytes(raw.to_vec()))
}

// Built-in encoders: value bytes only. An encoder declines a value that does
// not fit its content type.

pub(crate) fn encode_text(value: &Value) -> Option<Vec<u8>> {
    match value {
        Value::Text(s) => Some(s.as_bytes().to_vec()),
        _ => None,
    }
}

pub(crate) fn encode_uint16(value: &Value) -> Option<Vec<u8>> {
    match value {
        Value::U16(v) => Some(v.to_be_bytes().to_vec()),
        _ => None,
    }
}

pub(crate) fn encode_uint32(value: &Value) -> Option<Vec<u8>> {
    match value {
        Value::U32(v) => Some(v.to_be_bytes().to_vec()),
        _ => None,
    }
}

pub(crate) fn encode_ipv4(value: &Value) -> Option<Vec<u8>> {
    match value {
        Value::Ipv4(ip) => Some(ip.octets().to_vec()),
        _ => None,
    }
}

pub(crate) fn encode_acct_status(value: &Value) -> Option<Vec<u8>> {
    match value {
        Value::AcctStatus(status) => Some(status.as_u32().to_be_bytes().to_vec()),
        _ => None,
    }
}

pub(crate) fn encode_fallback(value: &Value) -> Option<Vec<u8>> {
    match value {
        Value::Bytes(bytes) => Some(bytes.clone()),
        _ => None,
    }
}
