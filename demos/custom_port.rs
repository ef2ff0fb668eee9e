//! Custom port checking example.
//!
//! Demonstrates checking TLS certificates on non-standard ports, and
//! disabling verification for endpoints serving self-signed certificates.
//!
//! Run with: cargo run --example custom_port

use std::time::Duration;

use certsweep::{check_hosts, CancelToken, CheckOptions, HostDescriptor};

fn check_one(input: &str, options: &CheckOptions) -> Result<(), Box<dyn std::error::Error>> {
    let host = HostDescriptor::parse(input)?;
    println!("Checking {}...", host);

    let report = check_hosts(
        std::slice::from_ref(&host),
        options,
        &CancelToken::new(),
    );
    match report.certificates.first() {
        Some(cert) => {
            println!("  certificate for {} expires {}", cert.common_name, cert.not_after);
        }
        None => {
            println!("  {}", report.errors[0].error);
        }
    }
    println!();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Custom Port Certificate Check ===\n");

    let options = CheckOptions {
        timeout: Duration::from_secs(5),
        insecure: false,
    };

    // standard HTTPS port, spelled out
    check_one("example.com:443", &options)?;

    // default port (443) applied when none is given
    check_one("github.com", &options)?;

    // an internal service on a non-standard port often presents a
    // self-signed certificate; `insecure` still extracts its fields
    let trusting = CheckOptions {
        insecure: true,
        ..options
    };
    check_one("self-signed.badssl.com", &trusting)?;

    Ok(())
}
