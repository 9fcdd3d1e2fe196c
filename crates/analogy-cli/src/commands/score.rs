//! The `analogy score` command.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use analogy_core::export::AttemptPayload;
use analogy_core::scoring::Score;
use analogy_core::statistics::ResponseTimeStats;
use analogy_report::write_html_review;

use crate::screen::score_table;

#[derive(Serialize)]
struct ScoreSummary<'a> {
    attempt_id: &'a str,
    bank_version: Option<&'a str>,
    items: usize,
    raw: usize,
    #[serde(flatten)]
    score: Score,
    response_times: ResponseTimeStats,
}

pub fn execute(attempt_path: PathBuf, format: String, html: Option<PathBuf>) -> Result<()> {
    let attempt = AttemptPayload::load_json(&attempt_path)?;
    let score = attempt.score();
    let rt = attempt.response_time_stats();

    match format.as_str() {
        "json" => {
            let summary = ScoreSummary {
                attempt_id: &attempt.meta.attempt_id,
                bank_version: attempt.meta.bank_version.as_deref(),
                items: attempt.responses.len(),
                raw: score.raw(),
                score,
                response_times: rt,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        _ => {
            println!(
                "Attempt {} ({} items, bank {})",
                attempt.meta.attempt_id,
                attempt.responses.len(),
                attempt.meta.bank_version.as_deref().unwrap_or("unknown")
            );
            println!("{}", score_table(&score, &rt));
        }
    }

    if let Some(path) = html {
        write_html_review(&attempt, &path)?;
        eprintln!("HTML review written to {}", path.display());
    }

    Ok(())
}
