//! Text helpers for whatever renders a session.
//!
//! Pure functions over items and session state; no I/O.

use std::fmt;

use crate::model::{ChoiceKey, Item, Lang};
use crate::recorder::ResponseRecord;

pub fn stem_text(item: &Item, lang: Lang) -> &str {
    item.stem.get(lang)
}

pub fn choice_text(item: &Item, key: ChoiceKey, lang: Lang) -> &str {
    item.choice(key).get(lang)
}

/// Normalize spacing around every `:` and append the analogy prompt.
///
/// `"kuş:uçmak"` becomes `"kuş : uçmak :: ? : ?"`.
pub fn format_stem_for_display(item: &Item, lang: Lang) -> String {
    let normalized = stem_text(item, lang)
        .split(':')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" : ");
    format!("{} :: ? : ?", normalized.trim())
}

/// `item 3 / 48`
pub fn progress_text(idx: usize, len: usize) -> String {
    format!("item {} / {}", idx + 1, len)
}

/// Completed share of the form, counting the current item.
pub fn progress_fraction(idx: usize, len: usize) -> f64 {
    if len == 0 {
        1.0
    } else {
        ((idx + 1) as f64 / len as f64).min(1.0)
    }
}

/// Lowercase item type label.
pub fn type_tag(item: &Item) -> String {
    item.item_type.to_string().to_lowercase()
}

/// Analytics block shown when dev mode is on.
#[derive(Debug, Clone)]
pub struct DevInfo<'a> {
    pub item: &'a Item,
    pub response: Option<&'a ResponseRecord>,
}

impl fmt::Display for DevInfo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn or_null<T: ToString>(value: Option<T>) -> String {
            value.map_or_else(|| "null".to_string(), |v| v.to_string())
        }

        let item = self.item;
        writeln!(f, "ITEM_ID: {}", item.id)?;
        writeln!(f, "ITEM_TYPE: {}", item.item_type)?;
        writeln!(f, "P_PLUS: {}", or_null(item.p_plus))?;
        writeln!(f, "ANSWER_KEY: {}", or_null(item.answer_key))?;
        writeln!(f, "CHOSEN: {}", or_null(self.response.map(|r| r.chosen)))?;
        writeln!(f, "RT_MS: {}", or_null(self.response.map(|r| r.rt_ms)))?;
        writeln!(f, "MAJORITY_TAG: {}", item.majority_tag.as_deref().unwrap_or(""))?;
        writeln!(f, "ROTATION_REASON: {}", item.rotation_reason.as_deref().unwrap_or(""))
    }
}
