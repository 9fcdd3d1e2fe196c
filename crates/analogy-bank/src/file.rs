//! Local file bank loader.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::instrument;

use analogy_core::error::BankError;
use analogy_core::model::Bank;
use analogy_core::parser::parse_bank_str;
use analogy_core::traits::BankLoader;

/// Reads the bank from a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileBankLoader {
    path: PathBuf,
}

impl FileBankLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl BankLoader for FileBankLoader {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Bank, BankError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| BankError::Io {
                path: self.path.clone(),
                source,
            })?;
        let bank = parse_bank_str(&content)?;
        tracing::info!(items = bank.len(), version = ?bank.version(), "bank loaded");
        Ok(bank)
    }
}
