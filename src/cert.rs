//! Single-host certificate retrieval.
//!
//! Dials one host with a bounded timeout, performs the TLS handshake under
//! the requested verification policy, and extracts the leaf certificate the
//! peer presented. The transport connection is owned exclusively by the
//! retrieval and released on every exit path.

use std::net::{IpAddr, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use log::debug;
use openssl::asn1::{Asn1Time, Asn1TimeRef};
use openssl::nid::Nid;
use openssl::pkey::Id;
use openssl::ssl::{HandshakeError, Ssl, SslContext, SslMethod, SslVerifyMode};
use openssl::x509::{X509NameRef, X509VerifyResult, X509};
use serde::Serialize;

use crate::cancel::CancelToken;
use crate::error::CheckError;
use crate::host::HostDescriptor;

/// Leaf-certificate fields extracted from a successful handshake.
#[derive(Debug, Clone, Serialize)]
pub struct CertificateRecord {
    /// The checked `address:port`, with the default port applied.
    pub host: String,
    /// Subject common name; empty when the certificate carries none.
    pub common_name: String,
    /// DNS subject-alternative names, in certificate order.
    pub dns_names: Vec<String>,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub public_key_algorithm: String,
    /// Issuer distinguished name as a display string.
    pub issuer: String,
}

/// Dials `host`, shakes hands, and extracts the leaf certificate.
///
/// `insecure` disables chain and hostname verification; the handshake still
/// runs and the leaf certificate is still extracted. A cancellation signal
/// that is already set short-circuits before any network work.
pub fn fetch_certificate(
    host: &HostDescriptor,
    timeout: Duration,
    insecure: bool,
    cancel: &CancelToken,
) -> Result<CertificateRecord, CheckError> {
    if cancel.is_cancelled() {
        return Err(CheckError::Cancelled);
    }

    let stream = connect(host, timeout)?;
    let ssl = configure_session(host, insecure)?;

    debug!("starting TLS handshake with {}", host);
    match ssl.connect(stream) {
        Ok(tls) => {
            let cert = tls
                .ssl()
                .peer_certificate()
                .ok_or(CheckError::MissingCertificate)?;
            extract_record(host, &cert)
        }
        Err(err) => Err(classify_handshake_error(err)),
    }
    // both arms drop the stream here, closing the connection
}

fn connect(host: &HostDescriptor, timeout: Duration) -> Result<TcpStream, CheckError> {
    let authority = host.to_string();
    let addrs: Vec<SocketAddr> = authority
        .to_socket_addrs()
        .map_err(|e| CheckError::ConnectionFailed {
            host: authority.clone(),
            cause: e.to_string(),
        })?
        .collect();

    let mut last_error: Option<std::io::Error> = None;
    for addr in addrs {
        debug!("dialing {} ({})", authority, addr);
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => {
                let configured = stream
                    .set_read_timeout(Some(timeout))
                    .and_then(|_| stream.set_write_timeout(Some(timeout)));
                match configured {
                    Ok(()) => return Ok(stream),
                    Err(e) => last_error = Some(e),
                }
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(CheckError::ConnectionFailed {
        host: authority,
        cause: last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no addresses resolved".to_string()),
    })
}

fn configure_session(host: &HostDescriptor, insecure: bool) -> Result<Ssl, CheckError> {
    let mut builder = SslContext::builder(SslMethod::tls_client())?;
    if insecure {
        builder.set_verify(SslVerifyMode::NONE);
    } else {
        builder.set_verify(SslVerifyMode::PEER);
        builder.set_default_verify_paths()?;
    }
    let context = builder.build();

    let mut ssl = Ssl::new(&context)?;
    match host.address.parse::<IpAddr>() {
        // SNI is only meaningful for DNS names
        Err(_) => {
            ssl.set_hostname(&host.address)?;
            if !insecure {
                ssl.param_mut().set_host(&host.address)?;
            }
        }
        Ok(ip) => {
            if !insecure {
                ssl.param_mut().set_ip(ip)?;
            }
        }
    }
    Ok(ssl)
}

fn classify_handshake_error(err: HandshakeError<TcpStream>) -> CheckError {
    match err {
        HandshakeError::Failure(mid) => {
            let verify = mid.ssl().verify_result();
            if verify != X509VerifyResult::OK {
                CheckError::VerificationFailed {
                    cause: verify.error_string().to_string(),
                }
            } else {
                CheckError::HandshakeFailed {
                    cause: mid.error().to_string(),
                }
            }
        }
        HandshakeError::SetupFailure(stack) => CheckError::HandshakeFailed {
            cause: stack.to_string(),
        },
        HandshakeError::WouldBlock(_) => CheckError::HandshakeFailed {
            cause: "handshake did not complete".to_string(),
        },
    }
}

fn extract_record(host: &HostDescriptor, cert: &X509) -> Result<CertificateRecord, CheckError> {
    Ok(CertificateRecord {
        host: host.to_string(),
        common_name: first_common_name(cert.subject_name()),
        dns_names: subject_dns_names(cert),
        not_before: asn1_to_utc(cert.not_before())?,
        not_after: asn1_to_utc(cert.not_after())?,
        public_key_algorithm: public_key_algorithm(cert),
        issuer: format_name(cert.issuer_name()),
    })
}

fn first_common_name(name: &X509NameRef) -> String {
    name.entries_by_nid(Nid::COMMONNAME)
        .next()
        .and_then(|entry| entry.data().as_utf8().ok())
        .map(|value| value.to_string())
        .unwrap_or_default()
}

fn subject_dns_names(cert: &X509) -> Vec<String> {
    cert.subject_alt_names()
        .map(|names| {
            names
                .iter()
                .filter_map(|name| name.dnsname().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn asn1_to_utc(time: &Asn1TimeRef) -> Result<DateTime<Utc>, CheckError> {
    let epoch = Asn1Time::from_unix(0)?;
    let diff = epoch.diff(time)?;
    let seconds = i64::from(diff.days) * 86_400 + i64::from(diff.secs);
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or_else(|| CheckError::CertificateError {
            reason: "validity timestamp out of range".to_string(),
        })
}

fn public_key_algorithm(cert: &X509) -> String {
    let id = match cert.public_key() {
        Ok(key) => key.id(),
        Err(_) => return "Unknown".to_string(),
    };
    match id {
        Id::RSA => "RSA",
        Id::EC => "ECDSA",
        Id::ED25519 => "Ed25519",
        Id::ED448 => "Ed448",
        Id::DSA => "DSA",
        _ => "Unknown",
    }
    .to_string()
}

fn format_name(name: &X509NameRef) -> String {
    let mut parts = Vec::new();
    for entry in name.entries() {
        let key = entry.object().nid().short_name().unwrap_or("UNKNOWN");
        if let Ok(value) = entry.data().as_utf8() {
            parts.push(format!("{}={}", key, value));
        }
    }
    parts.join(", ")
}
