//! Bulk TLS/SSL certificate inspection.
//!
//! Dials every configured host under a shared concurrency bound, performs a
//! TLS handshake, and reports the leaf certificate of each endpoint (or the
//! reason it could not be retrieved) in the original input order.
//!
//! ```no_run
//! use certsweep::{check_hosts, CancelToken, CheckOptions, HostDescriptor};
//!
//! let hosts = vec![
//!     HostDescriptor::parse("example.com")?,
//!     HostDescriptor::parse("example.org:8443")?,
//! ];
//! let report = check_hosts(&hosts, &CheckOptions::default(), &CancelToken::new());
//! for cert in &report.certificates {
//!     println!("{} expires {}", cert.host, cert.not_after);
//! }
//! # Ok::<(), certsweep::host::HostParseError>(())
//! ```

pub mod cancel;
pub mod cert;
pub mod checker;
pub mod config;
pub mod error;
pub mod host;
pub mod metrics;
pub mod output;

pub use cancel::CancelToken;
pub use cert::CertificateRecord;
pub use checker::{
    check_hosts, CheckOptions, CheckReport, FailureRecord, DEFAULT_TIMEOUT_SECS,
    MAX_CONCURRENT_CHECKS,
};
pub use error::{CheckError, FailureKind};
pub use host::HostDescriptor;
pub use output::OutputFormat;
