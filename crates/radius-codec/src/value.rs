//! Decoded AVP content.
//!
//! RADIUS attribute values come from a closed set of content shapes; the
//! dictionary decides which shape a given attribute code carries.

use std::fmt;
use std::net::Ipv4Addr;

/// A decoded attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// UTF-8 text (`string` content).
    Text(String),
    /// 16-bit big-endian integer (`uint16` content).
    U16(u16),
    /// 32-bit big-endian integer (`uint32` content).
    U32(u32),
    /// Big-endian accumulator of up to eight bytes (`uvarint` content).
    U64(u64),
    /// IPv4 address (`IP` content).
    Ipv4(Ipv4Addr),
    /// Revealed User-Password plaintext (`userpassword` content).
    Password(String),
    /// Vendor-specific sub-attribute (`VSA` content). `None` when the vendor
    /// or its sub-type is not in the dictionary.
    Vendor(Option<VendorSub>),
    /// Accounting status (`Acct-Status-Type` content).
    AcctStatus(AcctStatus),
    /// Raw bytes (`fallback` content).
    Bytes(Vec<u8>),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_password(&self) -> Option<&str> {
        match self {
            Value::Password(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            Value::U16(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::Ipv4(ip) => write!(f, "{}", ip),
            Value::Password(_) => write!(f, "<hidden>"),
            Value::Vendor(Some(sub)) => write!(f, "{}={}", sub.name, sub.value),
            Value::Vendor(None) => write!(f, "<unknown vendor data>"),
            Value::AcctStatus(status) => write!(f, "{}", status),
            Value::Bytes(bytes) => {
                for byte in bytes {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
        }
    }
}

/// A decoded vendor-specific sub-attribute: the sub-attribute name from the
/// vendor's TLV table and its inner value, decoded recursively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorSub {
    pub name: String,
    pub value: Box<Value>,
}

/// Acct-Status-Type values (RFC 2866 Section 5.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcctStatus {
    /// Start (1) - session has begun
    Start,
    /// Stop (2) - session has ended
    Stop,
    /// Interim-Update (3) - periodic update during session
    InterimUpdate,
    /// Accounting-On (4) - NAS is ready
    AccountingOn,
    /// Accounting-Off (5) - NAS is shutting down
    AccountingOff,
    /// Any other value
    Unknown(u32),
}

impl AcctStatus {
    pub fn from_u32(value: u32) -> Self {
        match value {
            1 => AcctStatus::Start,
            2 => AcctStatus::Stop,
            3 => AcctStatus::InterimUpdate,
            4 => AcctStatus::AccountingOn,
            5 => AcctStatus::AccountingOff,
            other => AcctStatus::Unknown(other),
        }
    }

    pub fn as_u32(self) -> u32 {
        match self {
            AcctStatus::Start => 1,
            AcctStatus::Stop => 2,
            AcctStatus::InterimUpdate => 3,
            AcctStatus::AccountingOn => 4,
            AcctStatus::AccountingOff => 5,
            AcctStatus::Unknown(other) => other,
        }
    }

    fn label(self) -> &'static str {
        match self {
            AcctStatus::Start => "Start",
            AcctStatus::Stop => "Stop",
            AcctStatus::InterimUpdate => "Interim-Update",
            AcctStatus::AccountingOn => "Accounting-On",
            AcctStatus::AccountingOff => "Accounting-Off",
            AcctStatus::Unknown(_) => "Unknown",
        }
    }
}

impl fmt::Display for AcctStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.label(), self.as_u32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acct_status_conversion() {
        assert_eq!(AcctStatus::from_u32(1), AcctStatus::Start);
        assert_eq!(AcctStatus::from_u32(2), AcctStatus::Stop);
        assert_eq!(AcctStatus::from_u32(3), AcctStatus::InterimUpdate);
        assert_eq!(AcctStatus::from_u32(4), AcctStatus::AccountingOn);
        assert_eq!(AcctStatus::from_u32(5), AcctStatus::AccountingOff);
        assert_eq!(AcctStatus::from_u32(99), AcctStatus::Unknown(99));
        assert_eq!(AcctStatus::Unknown(99).as_u32(), 99);
    }

    #[test]
    fn test_acct_status_display() {
        assert_eq!(AcctStatus::Start.to_string(), "Start(1)");
        assert_eq!(AcctStatus::InterimUpdate.to_string(), "Interim-Update(3)");
        assert_eq!(AcctStatus::Unknown(42).to_string(), "Unknown(42)");
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Text("alice".to_string()).to_string(), "alice");
        assert_eq!(
            Value::Ipv4(Ipv4Addr::new(192, 168, 0, 1)).to_string(),
            "192.168.0.1"
        );
        assert_eq!(Value::Bytes(vec![0xde, 0xad]).to_string(), "dead");
        assert_eq!(Value::Password("secret".to_string()).to_string(), "<hidden>");
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Text("a".to_string()).as_text(), Some("a"));
        assert_eq!(Value::U32(7).as_text(), None);
        assert_eq!(Value::Password("pw".to_string()).as_password(), Some("pw"));
        assert_eq!(Value::Text("a".to_string()).as_password(), None);
    }
}
