//! analogy-bank — Item bank loaders and configuration.
//!
//! Implements the `BankLoader` trait for local files and HTTP, and loads the
//! `analogy.toml` configuration.

pub mod config;
pub mod file;
pub mod http;
pub mod mock;

pub use analogy_core::error::BankError;
pub use config::{load_config_from, loader_for, AnalogyConfig};
pub use file::FileBankLoader;
pub use http::HttpBankLoader;
pub use mock::StaticBankLoader;
