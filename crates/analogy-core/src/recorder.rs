//! Response and localization-edit recorders.
//!
//! Both are keyed by `ITEM_ID` and owned by a single session.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{ChoiceKey, Item};
use crate::timestamp::iso_millis;

/// The latest answer given for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub chosen: ChoiceKey,
    /// Time from item display to selection, in whole milliseconds.
    pub rt_ms: u64,
    #[serde(with = "iso_millis")]
    pub ts: DateTime<Utc>,
}

/// Elapsed milliseconds between two monotonic readings, floored at zero and
/// rounded to the nearest millisecond.
pub fn elapsed_ms(shown_at: Duration, now: Duration) -> u64 {
    let elapsed = now.saturating_sub(shown_at);
    (elapsed.as_secs_f64() * 1000.0).round() as u64
}

/// At most one [`ResponseRecord`] per item; re-selecting replaces it.
#[derive(Debug, Clone, Default)]
pub struct Responses {
    records: HashMap<String, ResponseRecord>,
}

impl Responses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write or overwrite the record for an item.
    pub fn record(&mut self, item_id: &str, record: ResponseRecord) {
        self.records.insert(item_id.to_string(), record);
    }

    pub fn get(&self, item_id: &str) -> Option<&ResponseRecord> {
        self.records.get(item_id)
    }

    pub fn chosen(&self, item_id: &str) -> Option<ChoiceKey> {
        self.records.get(item_id).map(|r| r.chosen)
    }

    pub fn is_answered(&self, item_id: &str) -> bool {
        self.records.contains_key(item_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One editable field of a localization record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalizationField {
    Stem,
    Choice(ChoiceKey),
    Note,
}

impl LocalizationField {
    /// All seven fields.
    pub const ALL: [LocalizationField; 7] = [
        LocalizationField::Stem,
        LocalizationField::Choice(ChoiceKey::A),
        LocalizationField::Choice(ChoiceKey::B),
        LocalizationField::Choice(ChoiceKey::C),
        LocalizationField::Choice(ChoiceKey::D),
        LocalizationField::Choice(ChoiceKey::E),
        LocalizationField::Note,
    ];
}

impl fmt::Display for LocalizationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalizationField::Stem => write!(f, "stem_tr"),
            LocalizationField::Choice(key) => write!(f, "{key}_tr"),
            LocalizationField::Note => write!(f, "note"),
        }
    }
}

impl FromStr for LocalizationField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        match lowered.trim_end_matches("_tr") {
            "stem" => Ok(LocalizationField::Stem),
            "note" => Ok(LocalizationField::Note),
            other => other
                .parse::<ChoiceKey>()
                .map(LocalizationField::Choice)
                .map_err(|_| format!("unknown localization field: {}", s.trim())),
        }
    }
}

/// Reviewer-suggested Turkish wording and a free-text note for one item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizationRecord {
    pub item_id: String,
    pub stem_tr: String,
    #[serde(rename = "A_tr")]
    pub a_tr: String,
    #[serde(rename = "B_tr")]
    pub b_tr: String,
    #[serde(rename = "C_tr")]
    pub c_tr: String,
    #[serde(rename = "D_tr")]
    pub d_tr: String,
    #[serde(rename = "E_tr")]
    pub e_tr: String,
    pub note: String,
}

impl LocalizationRecord {
    pub fn new(item_id: &str) -> Self {
        Self {
            item_id: item_id.to_string(),
            ..Default::default()
        }
    }

    pub fn get(&self, field: LocalizationField) -> &str {
        match field {
            LocalizationField::Stem => &self.stem_tr,
            LocalizationField::Choice(ChoiceKey::A) => &self.a_tr,
            LocalizationField::Choice(ChoiceKey::B) => &self.b_tr,
            LocalizationField::Choice(ChoiceKey::C) => &self.c_tr,
            LocalizationField::Choice(ChoiceKey::D) => &self.d_tr,
            LocalizationField::Choice(ChoiceKey::E) => &self.e_tr,
            LocalizationField::Note => &self.note,
        }
    }

    fn field_mut(&mut self, field: LocalizationField) -> &mut String {
        match field {
            LocalizationField::Stem => &mut self.stem_tr,
            LocalizationField::Choice(ChoiceKey::A) => &mut self.a_tr,
            LocalizationField::Choice(ChoiceKey::B) => &mut self.b_tr,
            LocalizationField::Choice(ChoiceKey::C) => &mut self.c_tr,
            LocalizationField::Choice(ChoiceKey::D) => &mut self.d_tr,
            LocalizationField::Choice(ChoiceKey::E) => &mut self.e_tr,
            LocalizationField::Note => &mut self.note,
        }
    }

    /// Replace one field. No validation, no length limit.
    pub fn set(&mut self, field: LocalizationField, value: impl Into<String>) {
        *self.field_mut(field) = value.into();
    }

    /// True if any field is non-empty after trimming.
    pub fn has_content(&self) -> bool {
        LocalizationField::ALL
            .iter()
            .any(|&f| !self.get(f).trim().is_empty())
    }
}

/// Localization records, created lazily the first time an item is shown.
#[derive(Debug, Clone, Default)]
pub struct LocalizationEdits {
    records: HashMap<String, LocalizationRecord>,
}

impl LocalizationEdits {
    pub fn new() -> Self {
        Self::default()
    }

    /// The record for an item, created empty on first access.
    pub fn record_for(&mut self, item: &Item) -> &mut LocalizationRecord {
        self.records
            .entry(item.id.clone())
            .or_insert_with(|| LocalizationRecord::new(&item.id))
    }

    pub fn get(&self, item_id: &str) -> Option<&LocalizationRecord> {
        self.records.get(item_id)
    }

    /// Number of records that would be exported.
    pub fn edited_count(&self) -> usize {
        self.records.values().filter(|r| r.has_content()).count()
    }

    /// Number of records created so far, edited or not.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
