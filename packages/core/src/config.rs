use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_TARGETS_FILE: &str = "urls.json";
pub const DEFAULT_TEMPLATE_FILE: &str = "email_template.json";
pub const DEFAULT_LOG_FILE: &str = "website_monitoring.log";
pub const DEFAULT_CHECK_INTERVAL_SECONDS: u64 = 60;
pub const DEFAULT_PROBE_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_REQUEST_ID_HEADER: &str = "x-request-id";
pub const DEFAULT_REQUEST_ID: &str = "c6411622-e92c-4903-8870-7fe8dd69c513";

#[derive(Debug, Clone)]
pub struct Config {
    pub targets_file: PathBuf,
    pub template_file: PathBuf,
    pub check_interval_seconds: u64,
    pub probe: ProbeConfig,
    pub smtp: SmtpConfig,
    pub metrics_port: Option<u16>,
    pub log_file: Option<PathBuf>,
}

/// Settings for the HTTP probe transport.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub timeout_seconds: u64,
    /// Skip TLS certificate verification when probing targets.
    pub accept_invalid_certs: bool,
    pub user_agent: String,
    pub request_id_header: String,
    pub request_id: String,
}

/// Settings for the authenticated mail submission channel.
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: String,
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_PROBE_TIMEOUT_SECONDS,
            accept_invalid_certs: true,
            user_agent: default_user_agent(),
            request_id_header: DEFAULT_REQUEST_ID_HEADER.to_string(),
            request_id: DEFAULT_REQUEST_ID.to_string(),
        }
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. `from_env` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let targets_file = lookup("TARGETS_FILE")
            .unwrap_or_else(|| DEFAULT_TARGETS_FILE.to_string())
            .into();

        let template_file = lookup("TEMPLATE_FILE")
            .unwrap_or_else(|| DEFAULT_TEMPLATE_FILE.to_string())
            .into();

        let check_interval_seconds = parse_or(
            &lookup,
            "CHECK_INTERVAL_SECONDS",
            DEFAULT_CHECK_INTERVAL_SECONDS,
        )?;
        if check_interval_seconds == 0 {
            return Err(AppError::config(
                "CHECK_INTERVAL_SECONDS must be greater than zero",
            ));
        }

        let timeout_seconds =
            parse_or(&lookup, "PROBE_TIMEOUT_SECONDS", DEFAULT_PROBE_TIMEOUT_SECONDS)?;
        if timeout_seconds == 0 {
            return Err(AppError::config(
                "PROBE_TIMEOUT_SECONDS must be greater than zero",
            ));
        }

        let probe = ProbeConfig {
            timeout_seconds,
            accept_invalid_certs: parse_bool_or(&lookup, "ACCEPT_INVALID_CERTS", true)?,
            user_agent: lookup("PROBE_USER_AGENT").unwrap_or_else(default_user_agent),
            request_id_header: lookup("PROBE_REQUEST_ID_HEADER")
                .unwrap_or_else(|| DEFAULT_REQUEST_ID_HEADER.to_string()),
            request_id: lookup("PROBE_REQUEST_ID")
                .unwrap_or_else(|| DEFAULT_REQUEST_ID.to_string()),
        };

        let username = required(&lookup, "SMTP_USERNAME")?;
        let smtp = SmtpConfig {
            host: required(&lookup, "SMTP_HOST")?,
            port: parse_or(&lookup, "SMTP_PORT", DEFAULT_SMTP_PORT)?,
            password: required(&lookup, "SMTP_PASSWORD")?,
            from: lookup("ALERT_FROM").unwrap_or_else(|| username.clone()),
            to: required(&lookup, "ALERT_TO")?,
            username,
        };

        let metrics_port = match lookup("METRICS_PORT") {
            Some(raw) => Some(
                raw.parse::<u16>()
                    .map_err(|_| AppError::config("METRICS_PORT must be a valid port"))?,
            ),
            None => None,
        };

        let log_file = match lookup("LOG_FILE") {
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => Some(raw.into()),
            None => Some(DEFAULT_LOG_FILE.into()),
        };

        Ok(Self {
            targets_file,
            template_file,
            check_interval_seconds,
            probe,
            smtp,
            metrics_port,
            log_file,
        })
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_seconds)
    }
}

fn default_user_agent() -> String {
    format!("site-monitor/{}", env!("CARGO_PKG_VERSION"))
}

fn required<F>(lookup: &F, key: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::config(format!("{} is required", key)))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AppError::config(format!("{} must be a valid number", key))),
        None => Ok(default),
    }
}

fn parse_bool_or<F>(lookup: &F, key: &str, default: bool) -> Result<bool, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).as_deref().map(str::trim) {
        None => Ok(default),
        Some("1") | Some("true") | Some("yes") => Ok(true),
        Some("0") | Some("false") | Some("no") => Ok(false),
        Some(other) => Err(AppError::config(format!(
            "{} must be a boolean, got {}",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_USERNAME", "monitor@example.com"),
            ("SMTP_PASSWORD", "hunter2"),
            ("ALERT_TO", "oncall@example.com"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<Config, AppError> {
        Config::from_lookup(|key| env.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn defaults_apply_when_only_smtp_is_set() {
        let config = load(&base_env()).unwrap();

        assert_eq!(config.targets_file, PathBuf::from("urls.json"));
        assert_eq!(config.template_file, PathBuf::from("email_template.json"));
        assert_eq!(config.check_interval(), Duration::from_secs(60));
        assert_eq!(config.probe.timeout(), Duration::from_secs(10));
        assert!(config.probe.accept_invalid_certs);
        assert_eq!(config.smtp.port, 587);
        assert_eq!(config.smtp.from, "monitor@example.com");
        assert_eq!(config.metrics_port, None);
        assert_eq!(config.log_file, Some(PathBuf::from("website_monitoring.log")));
    }

    #[test]
    fn missing_smtp_host_is_an_error() {
        let mut env = base_env();
        env.remove("SMTP_HOST");

        let err = load(&env).unwrap_err();
        assert!(err.to_string().contains("SMTP_HOST is required"));
    }

    #[test]
    fn invalid_interval_is_an_error() {
        let mut env = base_env();
        env.insert("CHECK_INTERVAL_SECONDS", "soon");
        assert!(load(&env).is_err());

        env.insert("CHECK_INTERVAL_SECONDS", "0");
        assert!(load(&env).is_err());
    }

    #[test]
    fn tls_verification_flag_is_parsed() {
        let mut env = base_env();
        env.insert("ACCEPT_INVALID_CERTS", "false");
        assert!(!load(&env).unwrap().probe.accept_invalid_certs);

        env.insert("ACCEPT_INVALID_CERTS", "maybe");
        assert!(load(&env).is_err());
    }

    #[test]
    fn empty_log_file_disables_file_logging() {
        let mut env = base_env();
        env.insert("LOG_FILE", "");
        assert_eq!(load(&env).unwrap().log_file, None);
    }

    #[test]
    fn debug_output_redacts_password() {
        let config = load(&base_env()).unwrap();
        let rendered = format!("{:?}", config);

        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
