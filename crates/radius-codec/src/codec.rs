//! The packet codec: dictionary-driven decode and encode.
//!
//! A [`Codec`] owns the resolved dictionaries and the frozen content codec
//! table. It is built once at startup and shared read-only between
//! concurrent decoders; nothing here mutates after construction.

use crate::auth;
use crate::avp::Avp;
use crate::content::{
    self, CodecTable, CodecTableBuilder, ContentType, DecodeContext, EncodeContext,
};
use crate::dictionary::{AttributeDef, Dictionary, DictionaryError, VendorDef};
use crate::packet::{Code, PacketError, RadiusPacket};
use crate::value::{Value, VendorSub};
use std::net::SocketAddr;
use tracing::{debug, warn};

pub struct Codec {
    dictionary: Dictionary,
    table: CodecTable,
}

impl Codec {
    /// Resolve the dictionary tables against a built codec table.
    pub fn new(
        attributes: Vec<AttributeDef>,
        vendors: Vec<VendorDef>,
        table: CodecTable,
    ) -> Result<Self, DictionaryError> {
        let dictionary = Dictionary::resolve(attributes, vendors, &table)?;
        Ok(Codec { dictionary, table })
    }

    /// A codec over the stock RFC 2865/2866 dictionary with no custom codecs.
    pub fn with_defaults() -> Self {
        let table = CodecTableBuilder::new().build();
        Self::new(
            crate::defaults::rfc_attributes(),
            crate::defaults::known_vendors(),
            table,
        )
        .expect("stock dictionary is well-formed")
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn table(&self) -> &CodecTable {
        &self.table
    }

    /// Decode a datagram into a packet record.
    ///
    /// The whole datagram must match the header length field exactly, and
    /// every AVP must fit inside it; a violation drops the packet with a
    /// typed error, never a partial AVP list.
    pub fn decode(
        &self,
        origin: SocketAddr,
        data: &[u8],
        shared_secret: &str,
    ) -> Result<RadiusPacket, PacketError> {
        if data.len() < RadiusPacket::MIN_PACKET_SIZE {
            return Err(PacketError::Runt(data.len()));
        }

        let code = Code::from_u8(data[0]);
        let identifier = data[1];
        let declared = u16::from_be_bytes([data[2], data[3]]);
        if declared as usize != data.len() {
            return Err(PacketError::LengthMismatch {
                declared,
                actual: data.len(),
            });
        }

        let mut authenticator = [0u8; 16];
        authenticator.copy_from_slice(&data[4..20]);

        let ctx = DecodeContext {
            authenticator: &authenticator,
            shared_secret,
        };

        let mut avps = Vec::new();
        let mut cursor = RadiusPacket::MIN_PACKET_SIZE;
        while cursor < data.len() {
            if cursor + 2 > data.len() {
                return Err(PacketError::TruncatedAvp { offset: cursor });
            }
            let avp_type = data[cursor];
            let avp_length = data[cursor + 1];
            if avp_length < 2 {
                return Err(PacketError::InvalidAvpLength {
                    offset: cursor,
                    length: avp_length,
                });
            }
            let end = cursor + avp_length as usize;
            if end > data.len() {
                return Err(PacketError::TruncatedAvp { offset: cursor });
            }
            let value_bytes = &data[cursor + 2..end];

            let avp = match self.dictionary.attribute(avp_type) {
                Some(entry) => {
                    debug!(
                        attribute = %entry.name,
                        code = avp_type,
                        length = avp_length,
                        "decoding AVP"
                    );
                    Avp {
                        name: entry.name.clone(),
                        content_type: entry.content,
                        length: avp_length,
                        value: self.decode_value(entry.content, value_bytes, &ctx),
                    }
                }
                None => {
                    debug!(code = avp_type, length = avp_length, "unknown attribute");
                    Avp {
                        name: "unknown".to_string(),
                        content_type: ContentType::Fallback,
                        length: avp_length,
                        value: content::decode_fallback(value_bytes),
                    }
                }
            };
            avps.push(avp);
            cursor = end;
        }

        Ok(RadiusPacket {
            code,
            identifier,
            authenticator: Some(authenticator),
            avps,
            shared_secret: shared_secret.to_string(),
            origin: Some(origin),
            raw: data.to_vec(),
        })
    }

    fn decode_value(
        &self,
        content: ContentType,
        raw: &[u8],
        ctx: &DecodeContext<'_>,
    ) -> Option<Value> {
        match content {
            ContentType::Uint16 => content::decode_uint16(raw),
            ContentType::Uint32 => content::decode_uint32(raw),
            ContentType::Uvarint => content::decode_uvarint(raw),
            ContentType::Text => content::decode_text(raw),
            ContentType::Ipv4 => content::decode_ipv4(raw),
            ContentType::AcctStatusType => content::decode_acct_status(raw),
            ContentType::UserPassword => {
                auth::reveal_user_password(raw, ctx.shared_secret.as_bytes(), ctx.authenticator)
                    .map(Value::Password)
            }
            ContentType::Vsa => Some(Value::Vendor(self.decode_vendor(raw, ctx))),
            ContentType::Fallback => content::decode_fallback(raw),
            ContentType::Custom(id) => {
                self.table.custom_decoder(id).and_then(|decode| decode(raw, ctx))
            }
        }
    }

    /// Vendor-specific attribute value:
    /// `[vendor_id: u32][sub_type: u8][sub_length: u8][sub_value]`.
    /// An unknown vendor or sub-type yields an empty VSA value.
    fn decode_vendor(&self, raw: &[u8], ctx: &DecodeContext<'_>) -> Option<VendorSub> {
        if raw.len() < 6 {
            debug!(len = raw.len(), "vendor-specific content too short");
            return None;
        }
        let vendor_id = u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]);
        let vendor = match self.dictionary.vendor(vendor_id) {
            Some(vendor) => vendor,
            None => {
                debug!(vendor_id, "unknown vendor");
                return None;
            }
        };
        let sub_type = raw[4];
        let sub_length = raw[5];
        let tlv = match vendor.tlv(sub_type) {
            Some(tlv) => tlv,
            None => {
                debug!(vendor = %vendor.name, sub_type, "unknown vendor sub-type");
                return None;
            }
        };
        debug!(
            vendor = %vendor.name,
            attribute = %tlv.name,
            sub_type,
            sub_length,
            "decoding vendor sub-attribute"
        );
        let value = self.decode_value(tlv.content, &raw[6..], ctx)?;
        Some(VendorSub {
            name: tlv.name.clone(),
            value: Box::new(value),
        })
    }

    /// Serialize a packet.
    ///
    /// A missing authenticator marks a request built from scratch and is
    /// filled with 16 random bytes; a present authenticator is treated as
    /// the request authenticator and replaced by the Response Authenticator
    /// digest in the output. AVPs without an encoder are skipped.
    pub fn encode(&self, packet: &RadiusPacket) -> Result<Vec<u8>, PacketError> {
        let request_authenticator = packet
            .authenticator
            .unwrap_or_else(auth::generate_request_authenticator);
        let ctx = EncodeContext {
            authenticator: &request_authenticator,
            shared_secret: &packet.shared_secret,
        };

        let mut avp_bytes = Vec::new();
        for avp in &packet.avps {
            match self.encode_avp(avp, &ctx) {
                Some(bytes) => avp_bytes.extend_from_slice(&bytes),
                None => debug!(attribute = %avp.name, "no encoder for AVP, skipping"),
            }
        }

        let total = RadiusPacket::MIN_PACKET_SIZE + avp_bytes.len();
        if total > RadiusPacket::MAX_PACKET_SIZE {
            return Err(PacketError::PacketTooLarge(total));
        }
        let length = total as u16;

        let authenticator = match packet.authenticator {
            Some(ref request) => auth::response_authenticator(
                packet.code.as_u8(),
                packet.identifier,
                length,
                request,
                &avp_bytes,
                packet.shared_secret.as_bytes(),
            ),
            None => request_authenticator,
        };

        let mut out = Vec::with_capacity(total);
        out.push(packet.code.as_u8());
        out.push(packet.identifier);
        out.extend_from_slice(&length.to_be_bytes());
        out.extend_from_slice(&authenticator);
        out.extend_from_slice(&avp_bytes);
        Ok(out)
    }

    /// Encode one AVP: the attribute code comes from the dictionary by name,
    /// the encoder from the content type. `None` when either lookup fails or
    /// the value does not fit the content type.
    fn encode_avp(&self, avp: &Avp, ctx: &EncodeContext<'_>) -> Option<Vec<u8>> {
        let (code, content) = match self.dictionary.code_of(&avp.name) {
            Some(found) => found,
            None => {
                debug!(attribute = %avp.name, "attribute not in dictionary");
                return None;
            }
        };
        let value = avp.value.as_ref()?;
        let body = match content {
            ContentType::Text => content::encode_text(value),
            ContentType::Uint16 => content::encode_uint16(value),
            ContentType::Uint32 => content::encode_uint32(value),
            ContentType::Ipv4 => content::encode_ipv4(value),
            ContentType::AcctStatusType => content::encode_acct_status(value),
            ContentType::Fallback => content::encode_fallback(value),
            ContentType::UserPassword => match value {
                Value::Password(plaintext) => Some(auth::obscure_user_password(
                    plaintext,
                    ctx.shared_secret.as_bytes(),
                    ctx.authenticator,
                )),
                _ => None,
            },
            ContentType::Uvarint | ContentType::Vsa => None,
            ContentType::Custom(id) => {
                self.table.custom_encoder(id).and_then(|encode| encode(avp, ctx))
            }
        }?;
        if body.len() > 253 {
            warn!(attribute = %avp.name, len = body.len(), "encoded AVP exceeds 253 bytes, skipping");
            return None;
        }
        let mut out = Vec::with_capacity(2 + body.len());
        out.push(code);
        out.push((body.len() + 2) as u8);
        out.extend_from_slice(&body);
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::AttributeDef;
    use std::net::Ipv4Addr;

    const SECRET: &str = "testing123";

    fn origin() -> SocketAddr {
        "192.0.2.10:49152".parse().unwrap()
    }

    fn datagram(code: u8, identifier: u8, authenticator: &[u8; 16], avps: &[u8]) -> Vec<u8> {
        let length = (20 + avps.len()) as u16;
        let mut data = vec![code, identifier];
        data.extend_from_slice(&length.to_be_bytes());
        data.extend_from_slice(authenticator);
        data.extend_from_slice(avps);
        data
    }

    #[test]
    fn test_decode_access_request_with_password() {
        let codec = Codec::with_defaults();
        let authenticator = [0u8; 16];
        let obscured = auth::obscure_user_password("pass", SECRET.as_bytes(), &authenticator);

        let mut avps = vec![1u8, 6];
        avps.extend_from_slice(b"user");
        avps.push(2);
        avps.push(18);
        avps.extend_from_slice(&obscured);

        let data = datagram(1, 127, &authenticator, &avps);
        let packet = codec.decode(origin(), &data, SECRET).unwrap();

        assert_eq!(packet.code, Code::AccessRequest);
        assert_eq!(packet.packet_type(), "Access-Request");
        assert_eq!(packet.identifier, 127);
        assert_eq!(packet.avps.len(), 2);
        assert_eq!(packet.avps[0].name, "User-Name");
        assert_eq!(packet.avps[0].value, Some(Value::Text("user".to_string())));
        assert_eq!(packet.avps[1].name, "User-Password");
        assert_eq!(packet.avps[1].value, Some(Value::Password("pass".to_string())));
    }

    #[test]
    fn test_decoded_avp_lengths_add_up_to_datagram() {
        let codec = Codec::with_defaults();
        let mut avps = vec![1u8, 7];
        avps.extend_from_slice(b"alice");
        avps.extend_from_slice(&[5, 6, 0, 0, 0, 42]);
        let data = datagram(1, 3, &[0u8; 16], &avps);

        let packet = codec.decode(origin(), &data, SECRET).unwrap();
        let total: usize = packet.avps.iter().map(|avp| avp.length as usize).sum();
        assert_eq!(20 + total, packet.raw.len());
    }

    #[test]
    fn test_unknown_attribute_falls_back_to_raw_bytes() {
        let codec = Codec::with_defaults();
        let avps = [250u8, 5, 0xca, 0xfe, 0xba];
        let data = datagram(1, 1, &[0u8; 16], &avps);

        let packet = codec.decode(origin(), &data, SECRET).unwrap();
        assert_eq!(packet.avps.len(), 1);
        assert_eq!(packet.avps[0].name, "unknown");
        assert_eq!(packet.avps[0].content_type, ContentType::Fallback);
        assert_eq!(
            packet.avps[0].value,
            Some(Value::Bytes(vec![0xca, 0xfe, 0xba]))
        );
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let codec = Codec::with_defaults();
        let mut data = datagram(1, 1, &[0u8; 16], &[0u8; 20]);
        // Header claims 50 bytes, datagram has 40.
        data.truncate(40);
        data[2] = 0;
        data[3] = 50;

        let err = codec.decode(origin(), &data, SECRET).unwrap_err();
        assert!(matches!(
            err,
            PacketError::LengthMismatch {
                declared: 50,
                actual: 40
            }
        ));
    }

    #[test]
    fn test_runt_datagram_rejected() {
        let codec = Codec::with_defaults();
        let err = codec.decode(origin(), &[1u8; 10], SECRET).unwrap_err();
        assert!(matches!(err, PacketError::Runt(10)));
    }

    #[test]
    fn test_truncated_avp_rejected() {
        let codec = Codec::with_defaults();
        // AVP declares 10 bytes but only 6 remain.
        let avps = [1u8, 10, b'a', b'b', b'c', b'd'];
        let data = datagram(1, 1, &[0u8; 16], &avps);

        let err = codec.decode(origin(), &data, SECRET).unwrap_err();
        assert!(matches!(err, PacketError::TruncatedAvp { offset: 20 }));
    }

    #[test]
    fn test_undersized_avp_length_rejected() {
        let codec = Codec::with_defaults();
        let avps = [1u8, 1];
        let data = datagram(1, 1, &[0u8; 16], &avps);

        let err = codec.decode(origin(), &data, SECRET).unwrap_err();
        assert!(matches!(
            err,
            PacketError::InvalidAvpLength { offset: 20, length: 1 }
        ));
    }

    #[test]
    fn test_invalid_password_block_leaves_value_empty() {
        let codec = Codec::with_defaults();
        // 8-byte User-Password content violates the 16-byte minimum.
        let avps = [2u8, 10, 1, 2, 3, 4, 5, 6, 7, 8];
        let data = datagram(1, 1, &[0u8; 16], &avps);

        let packet = codec.decode(origin(), &data, SECRET).unwrap();
        assert_eq!(packet.avps.len(), 1);
        assert_eq!(packet.avps[0].name, "User-Password");
        assert_eq!(packet.avps[0].value, None);
    }

    #[test]
    fn test_decode_vendor_specific() {
        let codec = Codec::with_defaults();
        // Cisco (9), sub-type 1, string "test".
        let mut avps = vec![26u8, 12, 0, 0, 0, 9, 1, 6];
        avps.extend_from_slice(b"test");
        let data = datagram(1, 1, &[0u8; 16], &avps);

        let packet = codec.decode(origin(), &data, SECRET).unwrap();
        assert_eq!(packet.avps[0].name, "Vendor-Specific");
        assert_eq!(
            packet.avps[0].value,
            Some(Value::Vendor(Some(VendorSub {
                name: "Cisco-AVPair".to_string(),
                value: Box::new(Value::Text("test".to_string())),
            })))
        );
    }

    #[test]
    fn test_unknown_vendor_yields_empty_vsa() {
        let codec = Codec::with_defaults();
        let mut avps = vec![26u8, 12, 0, 0, 0, 99, 1, 6];
        avps.extend_from_slice(b"test");
        let data = datagram(1, 1, &[0u8; 16], &avps);

        let packet = codec.decode(origin(), &data, SECRET).unwrap();
        assert_eq!(packet.avps[0].value, Some(Value::Vendor(None)));
    }

    #[test]
    fn test_encode_access_accept_response_authenticator() {
        let codec = Codec::with_defaults();
        let request_authenticator = [7u8; 16];
        let mut packet = RadiusPacket::new(Code::AccessAccept, 42, SECRET);
        packet.authenticator = Some(request_authenticator);

        let bytes = codec.encode(&packet).unwrap();
        assert_eq!(bytes.len(), 20);
        assert_eq!(&bytes[0..4], &[2, 42, 0, 20]);
        let expected = auth::response_authenticator(
            2,
            42,
            20,
            &request_authenticator,
            &[],
            SECRET.as_bytes(),
        );
        assert_eq!(&bytes[4..20], &expected);
    }

    #[test]
    fn test_fresh_request_gets_random_authenticator() {
        let codec = Codec::with_defaults();
        let packet = RadiusPacket::new(Code::AccessRequest, 1, SECRET);

        let first = codec.encode(&packet).unwrap();
        let second = codec.encode(&packet).unwrap();
        assert_eq!(first.len(), 20);
        assert_ne!(&first[4..20], &second[4..20]);
    }

    #[test]
    fn test_round_trip_of_encodable_avps() {
        let codec = Codec::with_defaults();
        let mut packet = RadiusPacket::new(Code::AccessRequest, 5, SECRET);
        packet.add_avp(Avp::text("User-Name", "bob"));
        packet.add_avp(Avp::password("hunter2"));
        packet.add_avp(Avp::uint32("NAS-Port", 7));
        packet.add_avp(Avp::ipv4("NAS-IP-Address", Ipv4Addr::new(10, 0, 0, 1)));

        let wire = codec.encode(&packet).unwrap();
        let decoded = codec.decode(origin(), &wire, SECRET).unwrap();
        assert_eq!(decoded.avps, packet.avps);
    }

    #[test]
    fn test_encode_skips_avps_without_dictionary_entry() {
        let codec = Codec::with_defaults();
        let mut packet = RadiusPacket::new(Code::AccessAccept, 9, SECRET);
        packet.authenticator = Some([1u8; 16]);
        packet.add_avp(Avp::text("Not-In-Dictionary", "x"));

        let bytes = codec.encode(&packet).unwrap();
        assert_eq!(bytes.len(), 20);
    }

    #[test]
    fn test_custom_decoder_dispatch() {
        let mut builder = CodecTableBuilder::new();
        builder
            .register_decoder(
                "bytelen",
                Box::new(|raw, _ctx| Some(Value::U32(raw.len() as u32))),
            )
            .unwrap();
        let attrs = vec![AttributeDef {
            code: 200,
            name: "X-Length".to_string(),
            content_type: "bytelen".to_string(),
        }];
        let codec = Codec::new(attrs, Vec::new(), builder.build()).unwrap();

        let avps = [200u8, 7, 1, 2, 3, 4, 5];
        let data = datagram(1, 1, &[0u8; 16], &avps);
        let packet = codec.decode(origin(), &data, SECRET).unwrap();
        assert_eq!(packet.avps[0].name, "X-Length");
        assert_eq!(packet.avps[0].value, Some(Value::U32(5)));
    }
}
