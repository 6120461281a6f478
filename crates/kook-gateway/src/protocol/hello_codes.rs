//! Handshake result codes
//!
//! The `code` field of a Hello frame's payload.

/// Code assumed when a Hello payload carries none
pub const MISSING_CODE_DEFAULT: i64 = HelloCode::MissingParams.as_i64();

/// Known Hello result codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelloCode {
    /// Session established
    Success = 0,
    /// Required parameters missing
    MissingParams = 40100,
    /// Token invalid
    InvalidToken = 40101,
    /// Token verification failed
    TokenVerifyFailed = 40102,
    /// Token expired
    TokenExpired = 40103,
}

impl HelloCode {
    /// Create a `HelloCode` from a raw value
    #[must_use]
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Success),
            40100 => Some(Self::MissingParams),
            40101 => Some(Self::InvalidToken),
            40102 => Some(Self::TokenVerifyFailed),
            40103 => Some(Self::TokenExpired),
            _ => None,
        }
    }

    /// Get the raw value
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self as i64
    }

    /// Whether the session and gateway URL must be discarded
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        matches!(
            self,
            Self::MissingParams | Self::InvalidToken | Self::TokenVerifyFailed | Self::TokenExpired
        )
    }

    /// Get the description for this code
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Session established",
            Self::MissingParams => "Missing parameters",
            Self::InvalidToken => "Invalid token",
            Self::TokenVerifyFailed => "Token verification failed",
            Self::TokenExpired => "Token expired",
        }
    }
}

impl std::fmt::Display for HelloCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.as_i64(), self.description())
    }
}

/// What a Hello frame means for the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelloOutcome {
    Established,
    /// Full reset and gateway re-resolution required
    Fatal(HelloCode),
    /// Unrecognized non-zero code; logged only
    Rejected(i64),
}

impl HelloOutcome {
    /// Classify a raw Hello code
    #[must_use]
    pub fn from_code(code: i64) -> Self {
        match HelloCode::from_i64(code) {
            Some(HelloCode::Success) => Self::Established,
            Some(known) if known.is_fatal() => Self::Fatal(known),
            _ => Self::Rejected(code),
        }
    }
}
