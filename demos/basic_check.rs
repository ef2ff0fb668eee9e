//! Basic certificate checking example.
//!
//! Retrieves the certificate of a single host and prints its fields.
//!
//! Run with: cargo run --example basic_check

use certsweep::{check_hosts, CancelToken, CheckOptions, HostDescriptor};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Basic TLS Certificate Check ===\n");

    let host = HostDescriptor::parse("google.com")?;
    let report = check_hosts(
        std::slice::from_ref(&host),
        &CheckOptions::default(),
        &CancelToken::new(),
    );

    match report.certificates.first() {
        Some(cert) => {
            println!("Certificate for: {}", cert.host);
            println!("Common Name: {}", cert.common_name);
            println!("Issuer: {}", cert.issuer);
            println!("Not Before: {}", cert.not_before);
            println!("Not After: {}", cert.not_after);
            println!("Public Key Algorithm: {}", cert.public_key_algorithm);
            println!();

            println!("Subject Alternative Names (SANs):");
            for san in &cert.dns_names {
                println!("  - {}", san);
            }
        }
        None => {
            for failure in &report.errors {
                println!("Failed to check {}: {}", failure.host, failure.error);
            }
        }
    }

    Ok(())
}
