//! Interruptible bulk check example.
//!
//! Wires Ctrl-C into the shared cancellation token. Press Ctrl-C while the
//! run is in flight: hosts that were not yet dialed are reported as
//! cancelled, while already-retrieved certificates stay in the report.
//!
//! Run with: cargo run --example graceful_shutdown

use certsweep::{check_hosts, CancelToken, CheckOptions, HostDescriptor};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Interruptible Certificate Check ===\n");

    let hosts = [
        "google.com",
        "github.com",
        "rust-lang.org",
        "crates.io",
        "docs.rs",
        "example.com",
        "example.org",
        "example.net",
    ]
    .iter()
    .map(|host| HostDescriptor::parse(host))
    .collect::<Result<Vec<_>, _>>()?;

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || {
            if cancel.cancel() {
                eprintln!("interrupt received, finishing in-flight checks");
            }
        })?;
    }

    println!("Checking {} hosts (Ctrl-C to stop)...\n", hosts.len());
    let report = check_hosts(&hosts, &CheckOptions::default(), &cancel);

    for cert in &report.certificates {
        println!("{}: expires {}", cert.host, cert.not_after);
    }
    for failure in &report.errors {
        println!("{}: {}", failure.host, failure.error);
    }
    println!(
        "\n{} retrieved, {} failed or cancelled",
        report.certificates.len(),
        report.errors.len()
    );

    Ok(())
}
