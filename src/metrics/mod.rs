//! Metrics export for monitoring systems.
//!
//! Currently supports pushing certificate expiry metrics to a Prometheus
//! Push Gateway.

pub mod prom;
