use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

/// Site monitor CLI arguments
#[derive(Debug, Parser)]
#[command(
    name = "site-monitor",
    version,
    about = "Periodic website availability checks with consolidated email alerts"
)]
pub struct Cli {
    /// JSON file with the list of URLs to check
    #[arg(long)]
    pub targets: Option<PathBuf>,

    /// JSON file with the alert email subject/body template
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Check interval in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Serve /health and /metrics on this port
    #[arg(long)]
    pub metrics_port: Option<u16>,

    /// Run a single check cycle and exit
    #[arg(long)]
    pub once: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the environment config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(path) = &self.targets {
            config.targets_file = path.clone();
        }
        if let Some(path) = &self.template {
            config.template_file = path.clone();
        }
        if let Some(interval) = self.interval {
            config.check_interval_seconds = interval;
        }
        if let Some(port) = self.metrics_port {
            config.metrics_port = Some(port);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::from_lookup(|key| match key {
            "SMTP_HOST" => Some("smtp.example.com".into()),
            "SMTP_USERNAME" => Some("monitor@example.com".into()),
            "SMTP_PASSWORD" => Some("secret".into()),
            "ALERT_TO" => Some("oncall@example.com".into()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn flags_override_environment() {
        let cli = Cli::parse_from([
            "site-monitor",
            "--targets",
            "/etc/monitor/urls.json",
            "--interval",
            "30",
            "--metrics-port",
            "9100",
        ]);
        let mut config = config();
        cli.apply(&mut config);

        assert_eq!(config.targets_file, PathBuf::from("/etc/monitor/urls.json"));
        assert_eq!(config.template_file, PathBuf::from("email_template.json"));
        assert_eq!(config.check_interval_seconds, 30);
        assert_eq!(config.metrics_port, Some(9100));
        assert!(!cli.once);
    }

    #[test]
    fn zero_interval_flag_is_rejected() {
        let err = Cli::try_parse_from(["site-monitor", "--interval", "0"]).unwrap_err();

        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn once_keeps_environment_interval() {
        let cli = Cli::parse_from(["site-monitor", "--once"]);
        let mut config = config();
        cli.apply(&mut config);

        assert_eq!(config.check_interval_seconds, 60);
        assert!(cli.once);
    }
}
