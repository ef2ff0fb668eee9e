//! Bounded-concurrency dispatch and result aggregation.
//!
//! An ordered host list fans out to a fixed number of worker threads. Each
//! worker claims the next input position, retrieves that host's certificate,
//! and sends the outcome back tagged with its position. Outcomes land in a
//! position-indexed slot array, so the final report preserves input order no
//! matter how completions interleave.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use log::{debug, info};
use serde::Serialize;

use crate::cancel::CancelToken;
use crate::cert::{self, CertificateRecord};
use crate::error::{CheckError, FailureKind};
use crate::host::HostDescriptor;

/// Upper bound on concurrently executing retrievals.
pub const MAX_CONCURRENT_CHECKS: usize = 10;

/// Default dial-and-handshake budget per host, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Retrieval parameters shared by every host of a run.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Dial-and-handshake budget applied independently to each host.
    pub timeout: Duration,
    /// Disable chain and hostname verification.
    pub insecure: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            insecure: false,
        }
    }
}

/// A host that produced no certificate, and why.
#[derive(Debug, Clone, Serialize)]
pub struct FailureRecord {
    pub host: String,
    pub error: String,
    #[serde(skip)]
    pub kind: FailureKind,
}

impl FailureRecord {
    fn from_error(host: &HostDescriptor, err: &CheckError) -> Self {
        FailureRecord {
            host: host.to_string(),
            error: err.to_string(),
            kind: err.kind(),
        }
    }
}

/// Terminal aggregate of one run: every input host appears in exactly one of
/// the two sequences, each ordered by input position.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub certificates: Vec<CertificateRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FailureRecord>,
}

impl CheckReport {
    pub fn has_failures(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Total number of hosts accounted for.
    pub fn total(&self) -> usize {
        self.certificates.len() + self.errors.len()
    }
}

enum Outcome {
    Certificate(CertificateRecord),
    Failure(FailureRecord),
}

/// Checks every host and returns the ordered report.
///
/// At most [`MAX_CONCURRENT_CHECKS`] retrievals run at any instant. Hosts
/// are admitted in input order; a set cancellation signal converts hosts
/// that were not yet admitted into cancellation failures without dialing
/// them, while already-completed certificates stay in the report.
pub fn check_hosts(
    hosts: &[HostDescriptor],
    options: &CheckOptions,
    cancel: &CancelToken,
) -> CheckReport {
    info!(
        "checking {} host(s), {} at a time",
        hosts.len(),
        MAX_CONCURRENT_CHECKS
    );
    run_pool(hosts, cancel, |host| {
        cert::fetch_certificate(host, options.timeout, options.insecure, cancel)
    })
}

fn run_pool<F>(hosts: &[HostDescriptor], cancel: &CancelToken, retrieve: F) -> CheckReport
where
    F: Fn(&HostDescriptor) -> Result<CertificateRecord, CheckError> + Sync,
{
    let total = hosts.len();
    let workers = total.min(MAX_CONCURRENT_CHECKS);
    let next = AtomicUsize::new(0);
    let (sender, receiver) = mpsc::channel::<(usize, Outcome)>();

    let mut slots: Vec<Option<Outcome>> = Vec::with_capacity(total);
    slots.resize_with(total, || None);

    thread::scope(|scope| {
        for _ in 0..workers {
            let sender = sender.clone();
            let next = &next;
            let retrieve = &retrieve;
            scope.spawn(move || loop {
                let index = next.fetch_add(1, Ordering::SeqCst);
                if index >= total {
                    break;
                }
                let host = &hosts[index];
                let outcome = if cancel.is_cancelled() {
                    Outcome::Failure(FailureRecord::from_error(host, &CheckError::Cancelled))
                } else {
                    match retrieve(host) {
                        Ok(record) => Outcome::Certificate(record),
                        Err(err) => Outcome::Failure(FailureRecord::from_error(host, &err)),
                    }
                };
                if sender.send((index, outcome)).is_err() {
                    break;
                }
            });
        }
        drop(sender);

        for (index, outcome) in &receiver {
            debug!("host at position {} completed", index);
            assert!(
                slots[index].is_none(),
                "duplicate outcome for host at position {index}"
            );
            slots[index] = Some(outcome);
        }
    });
    // the scope joins every worker before the report is finalized

    let mut certificates = Vec::new();
    let mut errors = Vec::new();
    for (index, slot) in slots.into_iter().enumerate() {
        let outcome =
            slot.unwrap_or_else(|| panic!("missing outcome for host at position {index}"));
        match outcome {
            Outcome::Certificate(record) => certificates.push(record),
            Outcome::Failure(failure) => errors.push(failure),
        }
    }
    CheckReport {
        certificates,
        errors,
    }
}
