//! Error types for per-host certificate retrieval.
//!
//! Every variant is recovered at the per-host boundary and turned into a
//! failure entry of the final report; none of them aborts the run.

use std::fmt;

use strum_macros::Display;

/// Coarse classification of a per-host failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum FailureKind {
    /// DNS resolution, refused connection, or dial timeout.
    Connect,
    /// The peer's chain, expiry, or hostname did not verify.
    Verification,
    /// The handshake broke down for a non-verification reason.
    Handshake,
    /// The run was cancelled before this host completed.
    Cancelled,
}

/// Error raised while retrieving a single host's certificate.
#[derive(Debug)]
pub enum CheckError {
    /// Transport could not be established
    ConnectionFailed {
        /// The `address:port` that was dialed
        host: String,
        /// The underlying cause, as reported by the resolver or socket
        cause: String,
    },

    /// Certificate verification rejected the peer
    VerificationFailed {
        /// Why the chain, expiry, or hostname check failed
        cause: String,
    },

    /// TLS handshake failed for a reason other than verification
    HandshakeFailed {
        /// Details reported by the TLS stack
        cause: String,
    },

    /// The handshake succeeded but the peer presented no certificate
    MissingCertificate,

    /// The presented certificate could not be decoded
    CertificateError {
        /// Description of what went wrong
        reason: String,
    },

    /// The shared cancellation signal was set before this host was dialed
    Cancelled,
}

impl CheckError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::ConnectionFailed { .. } => FailureKind::Connect,
            Self::VerificationFailed { .. } => FailureKind::Verification,
            Self::HandshakeFailed { .. }
            | Self::MissingCertificate
            | Self::CertificateError { .. } => FailureKind::Handshake,
            Self::Cancelled => FailureKind::Cancelled,
        }
    }
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionFailed { host, cause } => {
                write!(f, "failed to connect to {}: {}", host, cause)
            }
            Self::VerificationFailed { cause } => {
                write!(f, "certificate verification failed: {}", cause)
            }
            Self::HandshakeFailed { cause } => {
                write!(f, "TLS handshake failed: {}", cause)
            }
            Self::MissingCertificate => {
                write!(f, "no certificate presented by peer")
            }
            Self::CertificateError { reason } => {
                write!(f, "certificate error: {}", reason)
            }
            Self::Cancelled => {
                write!(f, "check cancelled before completion")
            }
        }
    }
}

impl std::error::Error for CheckError {}

impl From<openssl::error::ErrorStack> for CheckError {
    fn from(e: openssl::error::ErrorStack) -> Self {
        Self::HandshakeFailed {
            cause: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_failure_message() {
        let err = CheckError::ConnectionFailed {
            host: "c.invalid:443".to_string(),
            cause: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to connect to c.invalid:443: connection refused"
        );
        assert_eq!(err.kind(), FailureKind::Connect);
    }

    #[test]
    fn test_verification_failure_message() {
        let err = CheckError::VerificationFailed {
            cause: "certificate has expired".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "certificate verification failed: certificate has expired"
        );
        assert_eq!(err.kind(), FailureKind::Verification);
    }

    #[test]
    fn test_cancellation_classification() {
        assert_eq!(CheckError::Cancelled.kind(), FailureKind::Cancelled);
    }

    #[test]
    fn test_handshake_kinds() {
        assert_eq!(CheckError::MissingCertificate.kind(), FailureKind::Handshake);
        let err = CheckError::CertificateError {
            reason: "bad validity window".to_string(),
        };
        assert_eq!(err.kind(), FailureKind::Handshake);
    }

    #[test]
    fn test_kind_display_is_lowercase() {
        assert_eq!(FailureKind::Cancelled.to_string(), "cancelled");
        assert_eq!(FailureKind::Connect.to_string(), "connect");
    }
}
