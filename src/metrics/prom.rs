use chrono::Utc;
use lazy_static::lazy_static;
use log::warn;
use prometheus::{labels, register_gauge, Gauge};

use crate::checker::CheckReport;

lazy_static! {
    static ref CERTSWEEP_DAYS_BEFORE_EXPIRY: Gauge = register_gauge!(
        "certsweep_days_before_expiry",
        "days before certificate expiration"
    )
    .unwrap();
    static ref CERTSWEEP_NOT_AFTER_SECONDS: Gauge = register_gauge!(
        "certsweep_not_after_seconds",
        "certificate not-after instant as unix seconds"
    )
    .unwrap();
}

/// Pushes one metric set per retrieved certificate to a Prometheus Push
/// Gateway at `prometheus_address`.
pub fn push_metrics(report: &CheckReport, prometheus_address: &str) {
    for cert in &report.certificates {
        let days_left = (cert.not_after - Utc::now()).num_days();
        CERTSWEEP_DAYS_BEFORE_EXPIRY.set(days_left as f64);
        CERTSWEEP_NOT_AFTER_SECONDS.set(cert.not_after.timestamp() as f64);

        let metric_families = prometheus::gather();
        let pushed = prometheus::push_metrics(
            "certsweep",
            labels! {
                "instance".to_owned() => "certsweep".to_owned(),
                "job".to_owned() => "certsweep".to_owned(),
                "host".to_owned() => cert.host.to_owned(),
                "issuer".to_owned() => cert.issuer.to_owned(),
                "public_key_algorithm".to_owned() => cert.public_key_algorithm.to_owned(),
            },
            &format!("{}/metrics/job", prometheus_address),
            metric_families,
            None,
        );

        if let Err(e) = pushed {
            warn!("failed to push metrics to prometheus: {}", e);
        }
    }
}
