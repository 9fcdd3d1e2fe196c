pub mod info;
pub mod init;
pub mod score;
pub mod session;
pub mod validate;

use std::path::PathBuf;

use anyhow::Result;

use analogy_bank::config::{load_config_from, loader_for, AnalogyConfig};
use analogy_core::{Bank, BankError};

/// Load the config and apply a `--bank` override.
pub(crate) fn resolve_config(bank: Option<String>, config_path: Option<PathBuf>) -> Result<AnalogyConfig> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(bank) = bank {
        config.bank = bank;
    }
    Ok(config)
}

/// Fetch the configured bank.
pub(crate) async fn load_bank(config: &AnalogyConfig) -> Result<Bank> {
    let loader = loader_for(&config.bank, Some(config.request_timeout_secs))?;
    let bank = loader
        .load()
        .await
        .map_err(|e| load_failure(&loader.describe(), e))?;
    Ok(bank)
}

/// Wrap a load error with its source, flagging failures a reload may fix.
fn load_failure(source: &str, err: BankError) -> anyhow::Error {
    let hint = if err.is_transient() {
        " (temporary failure, try again)"
    } else {
        ""
    };
    anyhow::Error::new(err).context(format!("could not load bank from {source}{hint}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_failures_suggest_retry() {
        let err = load_failure(
            "https://example.org/bank.json",
            BankError::Http {
                url: "https://example.org/bank.json".into(),
                status: 503,
            },
        );
        assert_eq!(
            format!("{err:#}"),
            "could not load bank from https://example.org/bank.json (temporary failure, try again): \
             failed to load json: 503 (https://example.org/bank.json)"
        );

        let err = load_failure("bank.json", BankError::Parse("eof".into()));
        assert_eq!(
            format!("{err:#}"),
            "could not load bank from bank.json: failed to parse bank: eof"
        );
    }
}
