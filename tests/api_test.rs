//! Integration tests for the public API

use std::io::Write;
use std::net::{SocketAddr, TcpListener};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use openssl::asn1::Asn1Time;
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::PKey;
use openssl::rsa::Rsa;
use openssl::ssl::{SslAcceptor, SslMethod};
use openssl::x509::extension::SubjectAlternativeName;
use openssl::x509::{X509Name, X509};

use certsweep::config::AppConfig;
use certsweep::{
    check_hosts, CancelToken, CheckError, CheckOptions, FailureKind, HostDescriptor, OutputFormat,
};

/// Serves a freshly generated self-signed certificate on loopback for
/// `accepts` handshakes.
fn spawn_tls_server(accepts: usize) -> (SocketAddr, JoinHandle<()>) {
    let rsa = Rsa::generate(2048).unwrap();
    let key = PKey::from_rsa(rsa).unwrap();

    let mut name = X509Name::builder().unwrap();
    name.append_entry_by_nid(Nid::COMMONNAME, "localhost").unwrap();
    let name = name.build();

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_issuer_name(&name).unwrap();
    builder.set_pubkey(&key).unwrap();
    let not_before = Asn1Time::days_from_now(0).unwrap();
    let not_after = Asn1Time::days_from_now(365).unwrap();
    builder.set_not_before(&not_before).unwrap();
    builder.set_not_after(&not_after).unwrap();
    let san = SubjectAlternativeName::new()
        .dns("localhost")
        .ip("127.0.0.1")
        .build(&builder.x509v3_context(None, None))
        .unwrap();
    builder.append_extension(san).unwrap();
    builder.sign(&key, MessageDigest::sha256()).unwrap();
    let cert = builder.build();

    let mut acceptor = SslAcceptor::mozilla_intermediate(SslMethod::tls()).unwrap();
    acceptor.set_private_key(&key).unwrap();
    acceptor.set_certificate(&cert).unwrap();
    let acceptor = acceptor.build();

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        for _ in 0..accepts {
            match listener.accept() {
                // a client that rejects the certificate aborts mid-handshake
                Ok((stream, _)) => drop(acceptor.accept(stream)),
                Err(_) => break,
            }
        }
    });
    (addr, handle)
}

#[test]
fn test_verification_toggle_against_untrusted_peer() {
    let (addr, server) = spawn_tls_server(2);
    let host = HostDescriptor::parse(&format!("127.0.0.1:{}", addr.port())).unwrap();

    let verifying = CheckOptions {
        timeout: Duration::from_secs(5),
        insecure: false,
    };
    let report = check_hosts(std::slice::from_ref(&host), &verifying, &CancelToken::new());
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].kind, FailureKind::Verification);
    assert!(report.errors[0]
        .error
        .starts_with("certificate verification failed"));

    let trusting = CheckOptions {
        timeout: Duration::from_secs(5),
        insecure: true,
    };
    let report = check_hosts(std::slice::from_ref(&host), &trusting, &CancelToken::new());
    assert_eq!(report.certificates.len(), 1);
    let cert = &report.certificates[0];
    assert_eq!(cert.host, host.to_string());
    assert_eq!(cert.common_name, "localhost");
    assert_eq!(cert.dns_names, vec!["localhost"]);
    assert_eq!(cert.public_key_algorithm, "RSA");
    assert!(cert.not_after > cert.not_before);

    server.join().unwrap();
}

#[test]
fn test_cancelled_run_reports_every_host_without_dialing() {
    let hosts = vec![
        HostDescriptor::parse("a.example").unwrap(),
        HostDescriptor::parse("b.example:8443").unwrap(),
        HostDescriptor::parse("[2001:db8::1]").unwrap(),
    ];
    let cancel = CancelToken::new();
    cancel.cancel();

    let start = Instant::now();
    let report = check_hosts(&hosts, &CheckOptions::default(), &cancel);

    // no network attempt happens for a pre-cancelled run
    assert!(start.elapsed() < Duration::from_secs(1));
    assert_eq!(report.total(), 3);
    assert!(report.certificates.is_empty());

    let hosts_in_order: Vec<&str> = report.errors.iter().map(|e| e.host.as_str()).collect();
    assert_eq!(
        hosts_in_order,
        vec!["a.example:443", "b.example:8443", "[2001:db8::1]:443"]
    );
    for failure in &report.errors {
        assert_eq!(failure.kind, FailureKind::Cancelled);
        assert_eq!(failure.error, "check cancelled before completion");
    }
}

#[test]
fn test_connection_refusal_is_reported_per_host() {
    // port 1 on loopback is not listening; the dial fails immediately
    let hosts = vec![HostDescriptor::parse("127.0.0.1:1").unwrap()];
    let options = CheckOptions {
        timeout: Duration::from_secs(1),
        insecure: false,
    };
    let report = check_hosts(&hosts, &options, &CancelToken::new());

    assert_eq!(report.certificates.len(), 0);
    assert_eq!(report.errors.len(), 1);
    let failure = &report.errors[0];
    assert_eq!(failure.kind, FailureKind::Connect);
    assert!(
        failure.error.starts_with("failed to connect to 127.0.0.1:1:"),
        "unexpected message: {}",
        failure.error
    );
}

#[test]
fn test_error_types_are_matchable() {
    fn describe(err: CheckError) -> String {
        match err {
            CheckError::ConnectionFailed { host, .. } => format!("connect: {host}"),
            CheckError::VerificationFailed { cause } => format!("verify: {cause}"),
            CheckError::HandshakeFailed { cause } => format!("handshake: {cause}"),
            CheckError::MissingCertificate => "no certificate".to_string(),
            CheckError::CertificateError { reason } => format!("certificate: {reason}"),
            CheckError::Cancelled => "cancelled".to_string(),
        }
    }

    let message = describe(CheckError::ConnectionFailed {
        host: "a.example:443".to_string(),
        cause: "refused".to_string(),
    });
    assert_eq!(message, "connect: a.example:443");
}

#[test]
fn test_config_to_report_pipeline() {
    let mut config_file = tempfile::NamedTempFile::new().unwrap();
    config_file
        .write_all(b"hosts:\n  - 127.0.0.1:1\n  - 127.0.0.1:2\n")
        .unwrap();

    let config = AppConfig {
        config_file: Some(config_file.path().to_path_buf()),
        timeout_secs: 1,
        ..AppConfig::default()
    };
    config.validate().unwrap();

    let hosts = config.hosts().unwrap();
    assert_eq!(hosts.len(), 2);

    let report = check_hosts(&hosts, &config.check_options(), &CancelToken::new());
    assert_eq!(report.total(), 2);
    assert!(report.has_failures());

    // the report serializes with the documented wire shape
    let rendered = certsweep::output::render(&report, OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(value["errors"][0]["host"], "127.0.0.1:1");
    assert_eq!(value["errors"][1]["host"], "127.0.0.1:2");
}

#[test]
fn test_empty_host_source_is_a_startup_error() {
    let config = AppConfig::default();
    assert!(config.validate().is_err());
    assert!(config.hosts().is_err());
}
