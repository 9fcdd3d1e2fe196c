//! In-memory bank loader for tests.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use analogy_core::error::BankError;
use analogy_core::model::Bank;
use analogy_core::traits::BankLoader;

/// Hands out a pre-built bank, or fails with a fixed status.
pub struct StaticBankLoader {
    bank: Option<Bank>,
    fail_status: u16,
    call_count: AtomicU32,
}

impl StaticBankLoader {
    pub fn new(bank: Bank) -> Self {
        Self {
            bank: Some(bank),
            fail_status: 0,
            call_count: AtomicU32::new(0),
        }
    }

    /// A loader whose every load fails with the given HTTP status.
    pub fn failing(status: u16) -> Self {
        Self {
            bank: None,
            fail_status: status,
            call_count: AtomicU32::new(0),
        }
    }

    /// Number of loads attempted.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl BankLoader for StaticBankLoader {
    fn describe(&self) -> String {
        "static".to_string()
    }

    async fn load(&self) -> Result<Bank, BankError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.bank.clone().ok_or_else(|| BankError::Http {
            url: self.describe(),
            status: self.fail_status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analogy_core::model::BankMeta;

    #[tokio::test]
    async fn returns_bank() {
        let loader = StaticBankLoader::new(Bank::new(BankMeta::default(), vec![]));
        let bank = loader.load().await.unwrap();
        assert!(bank.is_empty());
        assert_eq!(loader.call_count(), 1);
    }

    #[tokio::test]
    async fn failing_loader() {
        let loader = StaticBankLoader::failing(500);
        let err = loader.load().await.unwrap_err();
        assert!(matches!(err, BankError::Http { status: 500, .. }));
    }
}
