//! Connection profiles: load/save a JSON mapping of profile name -> server settings.
//! Stored under XDG config dir: $XDG_CONFIG_HOME/natstop/profiles.json (fallback ~/.config/natstop/profiles.json)

use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use crate::config::{Config, DEFAULT_CONNS, DEFAULT_DELAY_SECS, DEFAULT_HOST, DEFAULT_PORT};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileEntry {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_conns")]
    pub conns: u32,
    #[serde(default = "default_delay")]
    pub delay_secs: u64,
    #[serde(default = "default_sort")]
    pub sort: String,
    #[serde(default = "default_ui")]
    pub ui: String,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_conns() -> u32 {
    DEFAULT_CONNS
}
fn default_delay() -> u64 {
    DEFAULT_DELAY_SECS
}
fn default_sort() -> String {
    "cid".into()
}
fn default_ui() -> String {
    "simple".into()
}

impl Default for ProfileEntry {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            conns: DEFAULT_CONNS,
            delay_secs: DEFAULT_DELAY_SECS,
            sort: default_sort(),
            ui: default_ui(),
        }
    }
}

impl From<&Config> for ProfileEntry {
    fn from(cfg: &Config) -> Self {
        Self {
            host: cfg.host.clone(),
            port: cfg.port,
            conns: cfg.conn_limit,
            delay_secs: cfg.interval.as_secs(),
            sort: cfg.sort.as_str().into(),
            ui: cfg.view.as_str().into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfilesFile {
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileEntry>,
    #[serde(default)]
    pub version: u32,
}

pub fn config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("natstop")
    } else {
        dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("natstop")
    }
}

pub fn profiles_path() -> PathBuf {
    config_dir().join("profiles.json")
}

// Missing or unreadable files behave like an empty profile set
pub fn load_profiles_from(path: &Path) -> ProfilesFile {
    match fs::read_to_string(path) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_default(),
        Err(_) => ProfilesFile::default(),
    }
}

pub fn save_profiles_to(path: &Path, p: &ProfilesFile) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_vec_pretty(p).map_err(io::Error::other)?;
    fs::write(path, data)
}

pub fn load_profiles() -> ProfilesFile {
    load_profiles_from(&profiles_path())
}

pub fn save_profiles(p: &ProfilesFile) -> io::Result<()> {
    save_profiles_to(&profiles_path(), p)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileUpdate {
    /// New profile, written from the effective settings.
    Created,
    /// Existing profile replaced (`--save` with different settings).
    Overwritten,
    /// Nothing to write.
    Unchanged,
}

/// Records `effective` under `name` when it is new, or when `save` is set and it differs.
pub fn remember(
    pf: &mut ProfilesFile,
    name: &str,
    effective: ProfileEntry,
    save: bool,
) -> ProfileUpdate {
    match pf.profiles.get(name) {
        None => {
            pf.profiles.insert(name.to_string(), effective);
            ProfileUpdate::Created
        }
        Some(existing) if save && *existing != effective => {
            pf.profiles.insert(name.to_string(), effective);
            ProfileUpdate::Overwritten
        }
        Some(_) => ProfileUpdate::Unchanged,
    }
}
