//! The `analogy validate` command.

use std::path::PathBuf;

use anyhow::Result;

use analogy_core::parser::validate_bank;

pub async fn execute(bank: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = super::resolve_config(bank, config_path)?;
    let bank = super::load_bank(&config).await?;

    println!("Bank: {}", bank.summary());

    let warnings = validate_bank(&bank, config.rotation_sample_size);
    for w in &warnings {
        let prefix = w
            .item_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Bank valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
