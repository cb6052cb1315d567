use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::module::channel::{DEFAULT_SUFFIX_CUTOFF, DEFAULT_SUFFIX_FALLBACK};
use crate::module::uls::{DEFAULT_BASE_URL, DEFAULT_SAMPLE_LINES};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Downloads, extracted archives and the SQLite cache live here
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Cache file name, relative to `data_dir`
    #[serde(default = "default_db_file")]
    pub db_file: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_archives")]
    pub default_archives: Vec<String>,

    #[serde(default = "default_sample_lines")]
    pub sample_lines: usize,

    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,

    #[serde(default)]
    pub naming: NamingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingSection {
    #[serde(default = "default_suffix_cutoff")]
    pub suffix_cutoff: usize,

    #[serde(default = "default_suffix_fallback")]
    pub suffix_fallback: String,

    #[serde(default)]
    pub excluded_words: Vec<String>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("fcc_uls_data")
}

fn default_db_file() -> String {
    "fcc_uls.db".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_archives() -> Vec<String> {
    vec!["l_LMpriv.zip".to_string()]
}

fn default_sample_lines() -> usize {
    DEFAULT_SAMPLE_LINES
}

fn default_download_timeout_secs() -> u64 {
    600
}

fn default_suffix_cutoff() -> usize {
    DEFAULT_SUFFIX_CUTOFF
}

fn default_suffix_fallback() -> String {
    DEFAULT_SUFFIX_FALLBACK.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            db_file: default_db_file(),
            base_url: default_base_url(),
            log_dir: default_log_dir(),
            log_level: default_log_level(),
            output_dir: default_output_dir(),
            default_archives: default_archives(),
            sample_lines: default_sample_lines(),
            download_timeout_secs: default_download_timeout_secs(),
            naming: NamingSection::default(),
        }
    }
}

impl Default for NamingSection {
    fn default() -> Self {
        Self {
            suffix_cutoff: default_suffix_cutoff(),
            suffix_fallback: default_suffix_fallback(),
            excluded_words: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Read `path` if it exists, otherwise fall back to defaults.
    ///
    /// Runs before logging is up, so the caller reports which one was used.
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<(Self, bool)> {
        let path = path.as_ref();
        if path.exists() {
            Ok((Self::from_file(path)?, true))
        } else {
            Ok((Self::default(), false))
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file)
    }
}
