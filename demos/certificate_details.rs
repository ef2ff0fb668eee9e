//! Detailed certificate information example.
//!
//! Shows every field the checker extracts from a leaf certificate,
//! including the full SAN list and the validity window.
//!
//! Run with: cargo run --example certificate_details

use certsweep::{check_hosts, CancelToken, CheckOptions, HostDescriptor};
use chrono::Utc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Detailed Certificate Information ===\n");

    let host = HostDescriptor::parse("github.com")?;
    let report = check_hosts(
        std::slice::from_ref(&host),
        &CheckOptions::default(),
        &CancelToken::new(),
    );

    let cert = match report.certificates.first() {
        Some(cert) => cert,
        None => {
            eprintln!("{}", report.errors[0].error);
            std::process::exit(1);
        }
    };

    println!("┌─ Certificate Information");
    println!("│");
    println!("├─ Host: {}", cert.host);
    println!("├─ Common Name: {}", cert.common_name);
    println!("├─ Public Key Algorithm: {}", cert.public_key_algorithm);
    println!("├─ Issuer: {}", cert.issuer);
    println!("│");

    println!("├─ Validity:");
    println!("│  ├─ Not Before: {}", cert.not_before.to_rfc3339());
    println!("│  ├─ Not After: {}", cert.not_after.to_rfc3339());
    println!(
        "│  ├─ Days Remaining: {}",
        (cert.not_after - Utc::now()).num_days()
    );
    println!("│  └─ Expired: {}", cert.not_after < Utc::now());
    println!("│");

    println!("└─ Subject Alternative Names:");
    for (i, san) in cert.dns_names.iter().enumerate() {
        let prefix = if i == cert.dns_names.len() - 1 {
            "└─"
        } else {
            "├─"
        };
        println!("   {} {}", prefix, san);
    }

    Ok(())
}
