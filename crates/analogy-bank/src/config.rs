//! Configuration and loader factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use analogy_core::assembler::DEFAULT_ROTATION_SAMPLE;
use analogy_core::model::Lang;
use analogy_core::traits::BankLoader;

use crate::file::FileBankLoader;
use crate::http::HttpBankLoader;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalogyConfig {
    /// Path or `http(s)://` URL of the item bank.
    #[serde(default = "default_bank")]
    pub bank: String,
    /// Where exports are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Starting presentation language.
    #[serde(default)]
    pub default_lang: Lang,
    /// Start with dev info visible.
    #[serde(default)]
    pub dev_mode: bool,
    /// ROTATION items spliced into a randomized form.
    #[serde(default = "default_rotation_sample_size")]
    pub rotation_sample_size: usize,
    /// Delay before auto-advance after a selection in answer-gated mode.
    /// Zero disables it.
    #[serde(default = "default_auto_advance_ms")]
    pub auto_advance_ms: u64,
    /// HTTP fetch timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_bank() -> String {
    "./data/analogies_items_private.json".to_string()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./analogy-results")
}
fn default_rotation_sample_size() -> usize {
    DEFAULT_ROTATION_SAMPLE
}
fn default_auto_advance_ms() -> u64 {
    350
}
fn default_request_timeout() -> u64 {
    30
}

impl Default for AnalogyConfig {
    fn default() -> Self {
        Self {
            bank: default_bank(),
            output_dir: default_output_dir(),
            default_lang: Lang::default(),
            dev_mode: false,
            rotation_sample_size: default_rotation_sample_size(),
            auto_advance_ms: default_auto_advance_ms(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied verbatim and never rescanned. An unclosed
/// `${` is kept as written.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + 2 + len];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + 2 + len + 1..];
    }
    result.push_str(rest);
    result
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `analogy.toml` in the current directory
/// 2. `~/.config/analogy/config.toml`
///
/// `ANALOGY_BANK` overrides the bank source.
pub fn load_config_from(path: Option<&Path>) -> Result<AnalogyConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("analogy.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<AnalogyConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "config loaded");
            config
        }
        None => AnalogyConfig::default(),
    };

    if let Ok(bank) = std::env::var("ANALOGY_BANK") {
        config.bank = bank;
    }
    config.bank = resolve_env_vars(&config.bank);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("analogy"))
}

/// Pick a loader for a bank source: HTTP for `http(s)://`, a file otherwise.
pub fn loader_for(source: &str, timeout_secs: Option<u64>) -> Result<Box<dyn BankLoader>> {
    if source.starts_with("http://") || source.starts_with("https://") {
        Ok(Box::new(HttpBankLoader::new(source, timeout_secs)?))
    } else {
        Ok(Box::new(FileBankLoader::new(source)))
    }
}
