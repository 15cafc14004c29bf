use std::fmt;

/// RADIUS packet codes with the RFC 2865/2866 name table.
///
/// Codes 28 and 255 are reserved; anything outside the table decodes as
/// `Unknown` and keeps its numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    /// Access-Request (1)
    AccessRequest,
    /// Access-Accept (2)
    AccessAccept,
    /// Access-Reject (3)
    AccessReject,
    /// Accounting-Request (4) - RFC 2866
    AccountingRequest,
    /// Accounting-Response (5) - RFC 2866
    AccountingResponse,
    /// Accounting-Status (6)
    AccountingStatus,
    /// Password-Request (7)
    PasswordRequest,
    /// Password-Ack (8)
    PasswordAck,
    /// Password-Reject (9)
    PasswordReject,
    /// Accounting-Message (10)
    AccountingMessage,
    /// Access-Challenge (11)
    AccessChallenge,
    /// Status-Server (12)
    StatusServer,
    /// Status-Client (13)
    StatusClient,
    /// Next-Passcode (29)
    NextPasscode,
    /// New-Pin (30)
    NewPin,
    /// Reserved (28, 255)
    Reserved(u8),
    /// Any unassigned code
    Unknown(u8),
}

impl Code {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Code::AccessRequest,
            2 => Code::AccessAccept,
            3 => Code::AccessReject,
            4 => Code::AccountingRequest,
            5 => Code::AccountingResponse,
            6 => Code::AccountingStatus,
            7 => Code::PasswordRequest,
            8 => Code::PasswordAck,
            9 => Code::PasswordReject,
            10 => Code::AccountingMessage,
            11 => Code::AccessChallenge,
            12 => Code::StatusServer,
            13 => Code::StatusClient,
            28 | 255 => Code::Reserved(value),
            29 => Code::NextPasscode,
            30 => Code::NewPin,
            other => Code::Unknown(other),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Code::AccessRequest => 1,
            Code::AccessAccept => 2,
            Code::AccessReject => 3,
            Code::AccountingRequest => 4,
            Code::AccountingResponse => 5,
            Code::AccountingStatus => 6,
            Code::PasswordRequest => 7,
            Code::PasswordAck => 8,
            Code::PasswordReject => 9,
            Code::AccountingMessage => 10,
            Code::AccessChallenge => 11,
            Code::StatusServer => 12,
            Code::StatusClient => 13,
            Code::NextPasscode => 29,
            Code::NewPin => 30,
            Code::Reserved(value) => value,
            Code::Unknown(value) => value,
        }
    }

    /// Semantic packet-type name; `"Unknown"` for unassigned codes.
    pub fn name(self) -> &'static str {
        match self {
            Code::AccessRequest => "Access-Request",
            Code::AccessAccept => "Access-Accept",
            Code::AccessReject => "Access-Reject",
            Code::AccountingRequest => "Accounting-Request",
            Code::AccountingResponse => "Accounting-Response",
            Code::AccountingStatus => "Accounting-Status",
            Code::PasswordRequest => "Password-Request",
            Code::PasswordAck => "Password-Ack",
            Code::PasswordReject => "Password-Reject",
            Code::AccountingMessage => "Accounting-Message",
            Code::AccessChallenge => "Access-Challenge",
            Code::StatusServer => "Status-Server",
            Code::StatusClient => "Status-Client",
            Code::NextPasscode => "Next-Passcode",
            Code::NewPin => "New-Pin",
            Code::Reserved(_) => "Reserved",
            Code::Unknown(_) => "Unknown",
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
