use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use log::{info, warn};

use certsweep::checker;
use certsweep::config::AppConfig;
use certsweep::metrics::prom;
use certsweep::output;
use certsweep::CancelToken;

#[derive(Debug, Parser)]
#[command(
    name = "certsweep",
    version,
    about = "Checks the TLS certificates of many hosts at once"
)]
struct Cli {
    /// YAML config file with a `hosts:` list
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Comma-separated list of hosts to check
    #[arg(short, long, value_name = "HOSTS")]
    domains: Option<String>,

    /// File with one host per line
    #[arg(long, value_name = "FILE")]
    domains_file: Option<PathBuf>,

    /// Skip the first N lines of the domains file
    #[arg(long, value_name = "N", default_value_t = 0)]
    domains_file_skip: usize,

    /// Consider at most N lines of the domains file after skipping (0 = all)
    #[arg(long, value_name = "N", default_value_t = 0)]
    domains_file_limit: usize,

    /// Dial-and-handshake timeout per host, in seconds
    #[arg(short, long, value_name = "SECONDS", default_value_t = checker::DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Skip certificate chain and hostname verification
    #[arg(short, long)]
    insecure: bool,

    /// Output format: table, json or yaml
    #[arg(short, long, value_name = "FORMAT", default_value = "table")]
    output: String,

    /// Write the report to a file instead of stdout
    #[arg(long, value_name = "FILE")]
    output_file: Option<PathBuf>,

    /// Push expiry metrics to a Prometheus Push Gateway
    #[arg(long)]
    prometheus: bool,

    /// Prometheus Push Gateway address
    #[arg(long, value_name = "URL", default_value = "http://localhost:9091")]
    prometheus_address: String,
}

impl Cli {
    fn into_config(self) -> AppConfig {
        AppConfig {
            config_file: self.config,
            domains: self.domains,
            domains_file: self.domains_file,
            domains_file_skip: self.domains_file_skip,
            domains_file_limit: self.domains_file_limit,
            timeout_secs: self.timeout,
            insecure: self.insecure,
            output_format: self.output,
            output_file: self.output_file,
            prometheus: self.prometheus,
            prometheus_address: self.prometheus_address,
        }
    }
}

fn main() {
    env_logger::init();
    let config = Cli::parse().into_config();
    exit(run(&config));
}

fn run(config: &AppConfig) -> i32 {
    if let Err(err) = config.validate() {
        eprintln!("{err}");
        return 2;
    }
    let hosts = match config.hosts() {
        Ok(hosts) => hosts,
        Err(err) => {
            eprintln!("{err}");
            return 2;
        }
    };
    let format = match config.resolved_output_format() {
        Ok(format) => format,
        Err(err) => {
            eprintln!("{err}");
            return 2;
        }
    };

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        let installed = ctrlc::set_handler(move || {
            if cancel.cancel() {
                eprintln!("interrupt received, finishing in-flight checks");
            }
        });
        if let Err(err) = installed {
            warn!("could not install interrupt handler: {}", err);
        }
    }

    let report = checker::check_hosts(&hosts, &config.check_options(), &cancel);
    info!(
        "retrieved {} certificate(s), {} failure(s)",
        report.certificates.len(),
        report.errors.len()
    );

    if config.prometheus {
        prom::push_metrics(&report, &config.prometheus_address);
    }

    if let Err(err) = output::write_report(&report, format, config.output_file.as_deref()) {
        eprintln!("{err}");
        return 2;
    }

    if report.has_failures() {
        1
    } else {
        0
    }
}
