//! JSON item bank parser.
//!
//! Loads the `{ meta, items }` bank document and validates it. Parsing is
//! lenient at the field level: missing text resolves to an empty string and
//! unrecognized keys or types resolve to `None` / [`ItemType::Unknown`].

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::BankError;
use crate::model::{Bank, BankMeta, ChoiceKey, ItemType, Item, Lang, Localized};

/// Intermediate structure for the bank document.
#[derive(Debug, Deserialize)]
struct RawBankFile {
    #[serde(default)]
    meta: Option<BankMeta>,
    #[serde(default)]
    items: Option<Vec<RawItem>>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(rename = "ITEM_ID", default, deserialize_with = "lenient_string")]
    item_id: String,
    #[serde(rename = "ITEM_TYPE", default, deserialize_with = "lenient_item_type")]
    item_type: ItemType,
    #[serde(rename = "STEM_TR", default, deserialize_with = "lenient_string")]
    stem_tr: String,
    #[serde(rename = "STEM_EN", default, deserialize_with = "lenient_string")]
    stem_en: String,
    #[serde(rename = "A_TR", default, deserialize_with = "lenient_string")]
    a_tr: String,
    #[serde(rename = "A_EN", default, deserialize_with = "lenient_string")]
    a_en: String,
    #[serde(rename = "B_TR", default, deserialize_with = "lenient_string")]
    b_tr: String,
    #[serde(rename = "B_EN", default, deserialize_with = "lenient_string")]
    b_en: String,
    #[serde(rename = "C_TR", default, deserialize_with = "lenient_string")]
    c_tr: String,
    #[serde(rename = "C_EN", default, deserialize_with = "lenient_string")]
    c_en: String,
    #[serde(rename = "D_TR", default, deserialize_with = "lenient_string")]
    d_tr: String,
    #[serde(rename = "D_EN", default, deserialize_with = "lenient_string")]
    d_en: String,
    #[serde(rename = "E_TR", default, deserialize_with = "lenient_string")]
    e_tr: String,
    #[serde(rename = "E_EN", default, deserialize_with = "lenient_string")]
    e_en: String,
    #[serde(rename = "ANSWER_KEY", default, deserialize_with = "lenient_key")]
    answer_key: Option<ChoiceKey>,
    #[serde(rename = "P_PLUS", default, deserialize_with = "lenient_f64")]
    p_plus: Option<f64>,
    #[serde(rename = "MAJORITY_TAG", default, deserialize_with = "lenient_opt_string")]
    majority_tag: Option<String>,
    #[serde(rename = "ROTATION_REASON", default, deserialize_with = "lenient_opt_string")]
    rotation_reason: Option<String>,
}

impl From<RawItem> for Item {
    fn from(raw: RawItem) -> Self {
        Item {
            id: raw.item_id,
            item_type: raw.item_type,
            stem: Localized::new(raw.stem_tr, raw.stem_en),
            choices: [
                Localized::new(raw.a_tr, raw.a_en),
                Localized::new(raw.b_tr, raw.b_en),
                Localized::new(raw.c_tr, raw.c_en),
                Localized::new(raw.d_tr, raw.d_en),
                Localized::new(raw.e_tr, raw.e_en),
            ],
            answer_key: raw.answer_key,
            p_plus: raw.p_plus,
            majority_tag: raw.majority_tag,
            rotation_reason: raw.rotation_reason,
        }
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(lenient_opt_string(d)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_item_type<'de, D: Deserializer<'de>>(d: D) -> Result<ItemType, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => ItemType::from(s),
        _ => ItemType::default(),
    })
}

fn lenient_key<'de, D: Deserializer<'de>>(d: D) -> Result<Option<ChoiceKey>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    })
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Parse a bank file from disk.
pub fn parse_bank_file(path: &Path) -> Result<Bank, BankError> {
    let content = std::fs::read_to_string(path).map_err(|source| BankError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_bank_str(&content)
}

/// Parse a bank document from a JSON string.
pub fn parse_bank_str(content: &str) -> Result<Bank, BankError> {
    let parsed: RawBankFile =
        serde_json::from_str(content).map_err(|e| BankError::Parse(e.to_string()))?;

    let items: Vec<Item> = parsed
        .items
        .unwrap_or_default()
        .into_iter()
        .map(Item::from)
        .collect();

    Ok(Bank::new(parsed.meta.unwrap_or_default(), items))
}

/// A warning from bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The item ID (if applicable).
    pub item_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a bank for common authoring issues.
///
/// Warnings never block a session; they exist so a reviewer can spot broken
/// items before starting.
pub fn validate_bank(bank: &Bank, rotation_sample_size: usize) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_ids = HashSet::new();
    for item in &bank.items {
        if item.id.trim().is_empty() {
            warnings.push(ValidationWarning {
                item_id: None,
                message: "item has an empty ITEM_ID".into(),
            });
        } else if !seen_ids.insert(item.id.as_str()) {
            warnings.push(ValidationWarning {
                item_id: Some(item.id.clone()),
                message: format!("duplicate ITEM_ID: {}", item.id),
            });
        }
    }

    for item in &bank.items {
        let id = Some(item.id.clone());
        match &item.item_type {
            ItemType::Fixed if item.answer_key.is_none() => warnings.push(ValidationWarning {
                item_id: id.clone(),
                message: "FIXED item has no valid ANSWER_KEY".into(),
            }),
            ItemType::Unknown(_) => warnings.push(ValidationWarning {
                item_id: id.clone(),
                message: "ITEM_TYPE is neither FIXED nor ROTATION".into(),
            }),
            _ => {}
        }

        for lang in [Lang::Tr, Lang::En] {
            if item.stem.get(lang).trim().is_empty() {
                warnings.push(ValidationWarning {
                    item_id: id.clone(),
                    message: format!("STEM_{lang} is empty"),
                });
            }
        }
    }

    let rotation = bank.items.iter().filter(|i| i.is_rotation()).count();
    if rotation < rotation_sample_size {
        warnings.push(ValidationWarning {
            item_id: None,
            message: format!(
                "only {rotation} ROTATION item(s); randomized forms will include fewer than {rotation_sample_size}"
            ),
        });
    }

    warnings
}
