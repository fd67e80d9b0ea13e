//! Command line surface and the typed configuration record built from it.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;

use crate::error::{MonitorError, Result};
use crate::profiles::ProfileEntry;
use crate::sort::SortKey;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8333;
pub const DEFAULT_CONNS: u32 = 1024;
pub const DEFAULT_DELAY_SECS: u64 = 1;

#[derive(Debug, Clone, Parser, Default)]
#[command(
    name = "natstop",
    about = "top-like live view of a NATS server's monitoring endpoints",
    disable_version_flag = true
)]
pub struct Cli {
    /// The server host
    #[arg(short = 's', long = "server", value_name = "HOST")]
    pub host: Option<String>,

    /// The server monitoring port
    #[arg(short = 'm', long = "monitor-port", value_name = "PORT")]
    pub port: Option<u16>,

    /// Number of connections to request
    #[arg(short = 'n', long = "conns", value_name = "N")]
    pub conns: Option<u32>,

    /// Delay between polls in seconds
    #[arg(short = 'd', long = "delay", value_name = "SECS")]
    pub delay: Option<String>,

    /// Sort connections by: cid, subs, pending, msgs_to, msgs_from, bytes_to, bytes_from
    #[arg(long = "sort", value_name = "KEY")]
    pub sort: Option<String>,

    /// UI style: simple, dashboard or graphs
    #[arg(long = "ui", value_name = "STYLE")]
    pub ui: Option<String>,

    /// Show natstop version
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    /// Write logs to this file (nothing is logged otherwise)
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Load (or create) a named connection profile
    #[arg(short = 'P', long = "profile", value_name = "NAME")]
    pub profile: Option<String>,

    /// Overwrite an existing profile with the values given on the command line
    #[arg(long = "save")]
    pub save: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Compact,
    Graphical,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Compact => ViewMode::Graphical,
            ViewMode::Graphical => ViewMode::Compact,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Compact => "simple",
            ViewMode::Graphical => "dashboard",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "simple" => Ok(ViewMode::Compact),
            "dashboard" | "graphs" => Ok(ViewMode::Graphical),
            other => Err(MonitorError::InvalidConfiguration(format!(
                "unknown ui style: {other} (expected simple, dashboard or graphs)"
            ))),
        }
    }
}

/// Everything the poller and the dashboard need, validated once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub conn_limit: u32,
    pub interval: Duration,
    pub sort: SortKey,
    pub view: ViewMode,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            conn_limit: DEFAULT_CONNS,
            interval: Duration::from_secs(DEFAULT_DELAY_SECS),
            sort: SortKey::default(),
            view: ViewMode::default(),
            log_file: None,
        }
    }
}

impl Config {
    /// Flags win over the profile, the profile wins over defaults.
    pub fn resolve(cli: &Cli, profile: Option<&ProfileEntry>) -> Result<Self> {
        let host = cli
            .host
            .clone()
            .or_else(|| profile.map(|p| p.host.clone()))
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        if host.trim().is_empty() {
            return Err(MonitorError::InvalidConfiguration(
                "please specify the server host".into(),
            ));
        }
        let port = cli
            .port
            .or(profile.map(|p| p.port))
            .unwrap_or(DEFAULT_PORT);
        let conn_limit = cli
            .conns
            .or(profile.map(|p| p.conns))
            .unwrap_or(DEFAULT_CONNS);

        let interval = match cli.delay.as_deref() {
            Some(raw) => parse_delay(raw)?,
            None => Duration::from_secs(profile.map_or(DEFAULT_DELAY_SECS, |p| p.delay_secs)),
        };
        if interval.is_zero() {
            return Err(MonitorError::InvalidConfiguration(
                "refresh interval must be at least one second".into(),
            ));
        }

        let sort = match cli.sort.as_deref().or(profile.map(|p| p.sort.as_str())) {
            Some(raw) => raw.parse::<SortKey>().map_err(|e| {
                MonitorError::InvalidConfiguration(format!(
                    "{e} (sort by options: {})",
                    SortKey::names()
                ))
            })?,
            None => SortKey::default(),
        };

        let view = match cli.ui.as_deref().or(profile.map(|p| p.ui.as_str())) {
            Some(raw) => raw.parse()?,
            None => ViewMode::default(),
        };

        Ok(Self {
            host,
            port,
            conn_limit,
            interval,
            sort,
            view,
            log_file: cli.log_file.clone(),
        })
    }

    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_delay(raw: &str) -> Result<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| {
            MonitorError::InvalidConfiguration(format!(
                "could not use {raw} as a refreshing interval"
            ))
        })
}
