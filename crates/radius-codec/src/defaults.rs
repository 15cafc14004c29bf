//! Stock dictionary tables.
//!
//! The RFC 2865/2866 attribute set, used when the operator supplies no
//! dictionary files. Content-type names refer to the built-in codec table.

use crate::dictionary::{AttributeDef, TlvDef, VendorDef};

fn attr(code: u8, name: &str, content_type: &str) -> AttributeDef {
    AttributeDef {
        code,
        name: name.to_string(),
        content_type: content_type.to_string(),
    }
}

/// The RFC 2865/2866 attribute table.
pub fn rfc_attributes() -> Vec<AttributeDef> {
    vec![
        attr(1, "User-Name", "string"),
        attr(2, "User-Password", "userpassword"),
        attr(3, "CHAP-Password", "fallback"),
        attr(4, "NAS-IP-Address", "IP"),
        attr(5, "NAS-Port", "uint32"),
        attr(6, "Service-Type", "uint32"),
        attr(7, "Framed-Protocol", "uint32"),
        attr(8, "Framed-IP-Address", "IP"),
        attr(9, "Framed-IP-Netmask", "IP"),
        attr(10, "Framed-Routing", "uint32"),
        attr(11, "Filter-Id", "string"),
        attr(12, "Framed-MTU", "uint32"),
        attr(13, "Framed-Compression", "uint32"),
        attr(14, "Login-IP-Host", "IP"),
        attr(15, "Login-Service", "uint32"),
        attr(16, "Login-TCP-Port", "uint16"),
        attr(18, "Reply-Message", "string"),
        attr(19, "Callback-Number", "string"),
        attr(20, "Callback-Id", "string"),
        attr(22, "Framed-Route", "string"),
        attr(23, "Framed-IPX-Network", "uint32"),
        attr(24, "State", "fallback"),
        attr(25, "Class", "fallback"),
        attr(26, "Vendor-Specific", "VSA"),
        attr(27, "Session-Timeout", "uint32"),
        attr(28, "Idle-Timeout", "uint32"),
        attr(29, "Termination-Action", "uint32"),
        attr(30, "Called-Station-Id", "string"),
        attr(31, "Calling-Station-Id", "string"),
        attr(32, "NAS-Identifier", "string"),
        attr(33, "Proxy-State", "fallback"),
        attr(40, "Acct-Status-Type", "Acct-Status-Type"),
        attr(41, "Acct-Delay-Time", "uint32"),
        attr(42, "Acct-Input-Octets", "uint32"),
        attr(43, "Acct-Output-Octets", "uint32"),
        attr(44, "Acct-Session-Id", "string"),
        attr(45, "Acct-Authentic", "uint32"),
        attr(46, "Acct-Session-Time", "uint32"),
        attr(47, "Acct-Input-Packets", "uint32"),
        attr(48, "Acct-Output-Packets", "uint32"),
        attr(49, "Acct-Terminate-Cause", "uint32"),
        attr(50, "Acct-Multi-Session-Id", "string"),
        attr(51, "Acct-Link-Count", "uint32"),
        attr(52, "Acct-Input-Gigawords", "uvarint"),
        attr(53, "Acct-Output-Gigawords", "uvarint"),
        attr(61, "NAS-Port-Type", "uint32"),
        attr(62, "Port-Limit", "uint32"),
    ]
}

/// The stock vendor table.
pub fn known_vendors() -> Vec<VendorDef> {
    vec![VendorDef {
        vendor_id: 9,
        name: "Cisco".to_string(),
        tlvs: vec![TlvDef {
            sub_type: 1,
            name: "Cisco-AVPair".to_string(),
            content_type: "string".to_string(),
        }],
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Codec;
    use crate::content::ContentType;

    #[test]
    fn test_stock_tables_resolve() {
        let codec = Codec::with_defaults();
        let dictionary = codec.dictionary();

        let user_name = dictionary.attribute(1).unwrap();
        assert_eq!(user_name.name, "User-Name");
        assert_eq!(user_name.content, ContentType::Text);

        let password = dictionary.attribute(2).unwrap();
        assert_eq!(password.content, ContentType::UserPassword);

        let vsa = dictionary.attribute(26).unwrap();
        assert_eq!(vsa.content, ContentType::Vsa);

        let status = dictionary.attribute(40).unwrap();
        assert_eq!(status.content, ContentType::AcctStatusType);

        let cisco = dictionary.vendor(9).unwrap();
        assert_eq!(cisco.tlv(1).unwrap().name, "Cisco-AVPair");
    }

    #[test]
    fn test_stock_codes_are_unique() {
        let attributes = rfc_attributes();
        let mut codes: Vec<u8> = attributes.iter().map(|def| def.code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), attributes.len());
    }
}
