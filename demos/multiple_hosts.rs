//! Bulk certificate checking example.
//!
//! Checks several hosts through the bounded worker pool and prints a
//! one-line summary per host, in input order.
//!
//! Run with: cargo run --example multiple_hosts

use certsweep::{check_hosts, CancelToken, CheckOptions, HostDescriptor, MAX_CONCURRENT_CHECKS};
use chrono::Utc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Multi-Host Certificate Check ===\n");

    let hosts = [
        "google.com",
        "github.com",
        "rust-lang.org",
        "crates.io",
        "docs.rs",
    ]
    .iter()
    .map(|host| HostDescriptor::parse(host))
    .collect::<Result<Vec<_>, _>>()?;

    println!(
        "Checking {} hosts, at most {} at a time...\n",
        hosts.len(),
        MAX_CONCURRENT_CHECKS
    );

    let report = check_hosts(&hosts, &CheckOptions::default(), &CancelToken::new());

    println!("{:<20} {:<10} {}", "Host", "Days Left", "Issuer");
    println!("{}", "=".repeat(70));

    for cert in &report.certificates {
        let days_left = (cert.not_after - Utc::now()).num_days();
        println!("{:<20} {:<10} {}", cert.host, days_left, cert.issuer);
    }
    for failure in &report.errors {
        println!("{:<20} ERROR: {}", failure.host, failure.error);
    }

    Ok(())
}
