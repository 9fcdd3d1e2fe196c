//! The `analogy info` command.

use std::path::PathBuf;

use anyhow::Result;

pub async fn execute(bank: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = super::resolve_config(bank, config_path)?;
    let bank = super::load_bank(&config).await?;
    let summary = bank.summary();

    println!("{summary}");
    println!("fixed: {} • rotation: {}", summary.fixed, summary.rotation);
    Ok(())
}
