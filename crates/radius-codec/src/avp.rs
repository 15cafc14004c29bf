use crate::content::ContentType;
use crate::value::Value;
use std::net::Ipv4Addr;

/// Attribute-Value Pair.
///
/// `length` is the on-wire length of the full AVP including its two-byte
/// header, as observed on decode or to be emitted on encode. `value` is
/// `None` when a decoder declined the content (for example a User-Password
/// block violating the length rules).
#[derive(Debug, Clone, PartialEq)]
pub struct Avp {
    pub name: String,
    pub content_type: ContentType,
    pub length: u8,
    pub value: Option<Value>,
}

impl Avp {
    /// A text attribute, e.g. `User-Name` or `Reply-Message`.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Avp {
            name: name.into(),
            content_type: ContentType::Text,
            length: wire_length(value.len()),
            value: Some(Value::Text(value)),
        }
    }

    /// A 16-bit integer attribute.
    pub fn uint16(name: impl Into<String>, value: u16) -> Self {
        Avp {
            name: name.into(),
            content_type: ContentType::Uint16,
            length: 4,
            value: Some(Value::U16(value)),
        }
    }

    /// A 32-bit integer attribute.
    pub fn uint32(name: impl Into<String>, value: u32) -> Self {
        Avp {
            name: name.into(),
            content_type: ContentType::Uint32,
            length: 6,
            value: Some(Value::U32(value)),
        }
    }

    /// An IPv4 address attribute.
    pub fn ipv4(name: impl Into<String>, value: Ipv4Addr) -> Self {
        Avp {
            name: name.into(),
            content_type: ContentType::Ipv4,
            length: 6,
            value: Some(Value::Ipv4(value)),
        }
    }

    /// A User-Password attribute holding the plaintext; it is obscured with
    /// the packet's authenticator and secret at encode time.
    pub fn password(plaintext: impl Into<String>) -> Self {
        let plaintext = plaintext.into();
        let padded = plaintext.len().div_ceil(16).max(1) * 16;
        Avp {
            name: "User-Password".to_string(),
            content_type: ContentType::UserPassword,
            length: wire_length(padded),
            value: Some(Value::Password(plaintext)),
        }
    }

    /// A raw-bytes attribute.
    pub fn bytes(name: impl Into<String>, value: Vec<u8>) -> Self {
        Avp {
            name: name.into(),
            content_type: ContentType::Fallback,
            length: wire_length(value.len()),
            value: Some(Value::Bytes(value)),
        }
    }
}

fn wire_length(content_len: usize) -> u8 {
    (content_len + 2).min(255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_avp() {
        let avp = Avp::text("User-Name", "alice");
        assert_eq!(avp.length, 7);
        assert_eq!(avp.content_type, ContentType::Text);
        assert_eq!(avp.value, Some(Value::Text("alice".to_string())));
    }

    #[test]
    fn test_integer_avps() {
        assert_eq!(Avp::uint16("Login-TCP-Port", 23).length, 4);
        assert_eq!(Avp::uint32("NAS-Port", 7).length, 6);
        assert_eq!(Avp::ipv4("NAS-IP-Address", Ipv4Addr::new(10, 0, 0, 1)).length, 6);
    }

    #[test]
    fn test_password_avp_length_counts_padding() {
        assert_eq!(Avp::password("").length, 18);
        assert_eq!(Avp::password("hunter2").length, 18);
        assert_eq!(Avp::password("exactly sixteen!").length, 18);
        assert_eq!(Avp::password("seventeen chars!!").length, 34);
    }
}
