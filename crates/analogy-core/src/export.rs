//! Export payloads with JSON persistence.
//!
//! Two shapes: the attempt payload (every form position, in form order) and
//! the localization payload (only bank items with a non-empty edit). Building
//! a payload never mutates the session.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Bank, ChoiceKey, ItemType, Lang};
use crate::recorder::{LocalizationEdits, LocalizationField};
use crate::scoring::Score;
use crate::session::Session;
use crate::statistics::ResponseTimeStats;
use crate::timestamp::{compact_stamp, iso_millis, option_iso_millis};

/// A scored or in-progress attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptPayload {
    pub meta: AttemptMeta,
    /// One row per form position, in form order.
    pub responses: Vec<AttemptRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptMeta {
    pub attempt_id: String,
    pub bank_version: Option<String>,
    #[serde(with = "iso_millis")]
    pub started_at: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub ended_at: DateTime<Utc>,
    pub assembled_counts: AssembledCounts,
}

/// Item type counts of the assembled form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembledCounts {
    pub fixed: usize,
    pub rotation: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRow {
    pub attempt_id: String,
    pub bank_version: Option<String>,
    #[serde(with = "iso_millis")]
    pub started_at: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub ended_at: DateTime<Utc>,
    /// Form position.
    pub order: usize,
    pub item_id: String,
    pub item_type: ItemType,
    pub p_plus: Option<f64>,
    pub lang_presented: Lang,
    pub chosen_key: Option<ChoiceKey>,
    /// Only written when dev mode is on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_key: Option<ChoiceKey>,
    /// Only set for answered FIXED items with a valid key.
    pub correct: Option<bool>,
    pub rt_ms: Option<u64>,
    #[serde(with = "option_iso_millis")]
    pub ts: Option<DateTime<Utc>>,
}

impl AttemptPayload {
    /// Snapshot a session at `now`.
    pub fn build(session: &Session, now: DateTime<Utc>) -> Self {
        let ended_at = session.ended_at().unwrap_or(now);
        let bank_version = session.bank().version().map(str::to_string);
        let (fixed, rotation) = session.form().type_counts();

        let responses = session
            .form()
            .items()
            .enumerate()
            .map(|(order, item)| {
                let record = session.responses().get(&item.id);
                let chosen_key = record.map(|r| r.chosen);
                AttemptRow {
                    attempt_id: session.attempt_id().to_string(),
                    bank_version: bank_version.clone(),
                    started_at: session.started_at(),
                    ended_at,
                    order,
                    item_id: item.id.clone(),
                    item_type: item.item_type.clone(),
                    p_plus: item.p_plus,
                    lang_presented: session.lang(),
                    chosen_key,
                    answer_key: item.answer_key.filter(|_| session.dev_mode()),
                    correct: chosen_key
                        .filter(|_| item.is_fixed())
                        .and_then(|c| item.answer_key.map(|k| k == c)),
                    rt_ms: record.map(|r| r.rt_ms),
                    ts: record.map(|r| r.ts),
                }
            })
            .collect();

        AttemptPayload {
            meta: AttemptMeta {
                attempt_id: session.attempt_id().to_string(),
                bank_version,
                started_at: session.started_at(),
                ended_at,
                assembled_counts: AssembledCounts { fixed, rotation },
            },
            responses,
        }
    }

    /// Snapshot a session using its own clock.
    pub fn from_session(session: &Session) -> Self {
        Self::build(session, session.now())
    }

    /// Recompute the score from the exported rows.
    pub fn score(&self) -> Score {
        self.responses.iter().fold(Score::default(), |mut score, row| {
            match row.item_type {
                ItemType::Fixed => {
                    score.fixed_total += 1;
                    if row.correct == Some(true) {
                        score.fixed_correct += 1;
                    }
                }
                ItemType::Rotation => {
                    if row.chosen_key.is_some() {
                        score.rotation_answered += 1;
                    }
                }
                ItemType::Unknown(_) => {}
            }
            score
        })
    }

    pub fn response_time_stats(&self) -> ResponseTimeStats {
        ResponseTimeStats::from_times(self.responses.iter().filter_map(|r| r.rt_ms).collect())
    }

    /// `{attempt_id}.json`
    pub fn file_name(&self) -> String {
        format!("{}.json", sanitize_file_component(&self.meta.attempt_id))
    }

    /// Save the payload as pretty JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        save_pretty(self, path)
    }

    /// Load a payload from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read attempt from {}", path.display()))?;
        serde_json::from_str(&content).context("failed to parse attempt JSON")
    }
}

/// Localization suggestions for every bank item with a non-empty edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalizationPayload {
    pub bank_version: Option<String>,
    #[serde(with = "iso_millis")]
    pub generated_at: DateTime<Utc>,
    pub count_items_with_edits: usize,
    pub edits: Vec<LocalizationRow>,
}

/// Original bank text next to each suggested replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalizationRow {
    pub item_id: String,
    #[serde(rename = "ITEM_TYPE")]
    pub item_type: ItemType,
    #[serde(rename = "P_PLUS")]
    pub p_plus: Option<f64>,
    #[serde(rename = "MAJORITY_TAG")]
    pub majority_tag: Option<String>,

    #[serde(rename = "STEM_TR_original")]
    pub stem_tr_original: String,
    #[serde(rename = "STEM_TR_suggestion")]
    pub stem_tr_suggestion: Option<String>,

    #[serde(rename = "A_TR_original")]
    pub a_tr_original: String,
    #[serde(rename = "A_TR_suggestion")]
    pub a_tr_suggestion: Option<String>,
    #[serde(rename = "B_TR_original")]
    pub b_tr_original: String,
    #[serde(rename = "B_TR_suggestion")]
    pub b_tr_suggestion: Option<String>,
    #[serde(rename = "C_TR_original")]
    pub c_tr_original: String,
    #[serde(rename = "C_TR_suggestion")]
    pub c_tr_suggestion: Option<String>,
    #[serde(rename = "D_TR_original")]
    pub d_tr_original: String,
    #[serde(rename = "D_TR_suggestion")]
    pub d_tr_suggestion: Option<String>,
    #[serde(rename = "E_TR_original")]
    pub e_tr_original: String,
    #[serde(rename = "E_TR_suggestion")]
    pub e_tr_suggestion: Option<String>,

    pub note: Option<String>,
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl LocalizationPayload {
    /// Walk the bank in bank order and keep items whose record has content.
    pub fn build(bank: &Bank, edits: &LocalizationEdits, now: DateTime<Utc>) -> Self {
        let rows: Vec<LocalizationRow> = bank
            .items
            .iter()
            .filter_map(|item| {
                let rec = edits.get(&item.id).filter(|r| r.has_content())?;
                let suggestion =
                    |key: ChoiceKey| non_empty(rec.get(LocalizationField::Choice(key)));
                Some(LocalizationRow {
                    item_id: item.id.clone(),
                    item_type: item.item_type.clone(),
                    p_plus: item.p_plus,
                    majority_tag: item.majority_tag.clone(),
                    stem_tr_original: item.stem.tr.clone(),
                    stem_tr_suggestion: non_empty(&rec.stem_tr),
                    a_tr_original: item.choice(ChoiceKey::A).tr.clone(),
                    a_tr_suggestion: suggestion(ChoiceKey::A),
                    b_tr_original: item.choice(ChoiceKey::B).tr.clone(),
                    b_tr_suggestion: suggestion(ChoiceKey::B),
                    c_tr_original: item.choice(ChoiceKey::C).tr.clone(),
                    c_tr_suggestion: suggestion(ChoiceKey::C),
                    d_tr_original: item.choice(ChoiceKey::D).tr.clone(),
                    d_tr_suggestion: suggestion(ChoiceKey::D),
                    e_tr_original: item.choice(ChoiceKey::E).tr.clone(),
                    e_tr_suggestion: suggestion(ChoiceKey::E),
                    note: non_empty(&rec.note),
                })
            })
            .collect();

        LocalizationPayload {
            bank_version: bank.version().map(str::to_string),
            generated_at: now,
            count_items_with_edits: rows.len(),
            edits: rows,
        }
    }

    /// Snapshot a session's edits using its own clock.
    pub fn from_session(session: &Session) -> Self {
        Self::build(session.bank(), session.localization(), session.now())
    }

    /// `analogies_localization_{bank_version}.json`, `unknown` without a version.
    pub fn versioned_file_name(&self) -> String {
        format!(
            "analogies_localization_{}.json",
            sanitize_file_component(self.bank_version.as_deref().unwrap_or("unknown"))
        )
    }

    /// `analogies_localization_{YYYYMMDDHHMMSS}.json` from the generation time.
    pub fn stamped_file_name(&self) -> String {
        format!("analogies_localization_{}.json", compact_stamp(&self.generated_at))
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        save_pretty(self, path)
    }
}

fn save_pretty<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize export")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)
        .with_context(|| format!("failed to write export to {}", path.display()))?;
    Ok(())
}

/// Keep file names inside the output directory.
fn sanitize_file_component(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect()
}
