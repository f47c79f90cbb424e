//! Status enums for checkout workflows.

use serde::{Deserialize, Serialize};

/// Phase of a checkout verification activation.
///
/// ```text
/// Idle ──► Checking ──► Success
///   │           └─────► Failed
///   └─────► AddressMissing
/// ```
///
/// Every terminal phase is re-enterable: the next activation starts again
/// from `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VerificationPhase {
    #[default]
    Idle,
    /// Both addresses were present and the remote call is in flight.
    Checking,
    /// The remote call resolved and its payload was stored.
    Success,
    /// The remote call was rejected.
    Failed,
    /// An address was missing, so no call was made.
    AddressMissing,
}

impl std::fmt::Display for VerificationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Checking => write!(f, "checking"),
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
            Self::AddressMissing => write!(f, "address_missing"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_display() {
        assert_eq!(VerificationPhase::AddressMissing.to_string(), "address_missing");
        assert_eq!(VerificationPhase::default(), VerificationPhase::Idle);
    }
}
