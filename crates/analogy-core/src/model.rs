//! Core data model types for the analogy item bank.
//!
//! Items are immutable once loaded; the bank is the single source of truth
//! for item content.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Presentation language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Lang {
    #[default]
    #[serde(rename = "TR")]
    Tr,
    #[serde(rename = "EN")]
    En,
}

impl Lang {
    /// The other language.
    pub fn toggled(self) -> Self {
        match self {
            Lang::Tr => Lang::En,
            Lang::En => Lang::Tr,
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lang::Tr => write!(f, "TR"),
            Lang::En => write!(f, "EN"),
        }
    }
}

impl FromStr for Lang {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tr" | "turkish" => Ok(Lang::Tr),
            "en" | "english" => Ok(Lang::En),
            other => Err(format!("unknown language: {other}")),
        }
    }
}

/// One of the five answer choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChoiceKey {
    A,
    B,
    C,
    D,
    E,
}

impl ChoiceKey {
    /// All keys in presentation order.
    pub const ALL: [ChoiceKey; 5] = [
        ChoiceKey::A,
        ChoiceKey::B,
        ChoiceKey::C,
        ChoiceKey::D,
        ChoiceKey::E,
    ];

    /// Position of this key within [`ChoiceKey::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Parse a single letter, case-insensitively.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(ChoiceKey::A),
            'B' => Some(ChoiceKey::B),
            'C' => Some(ChoiceKey::C),
            'D' => Some(ChoiceKey::D),
            'E' => Some(ChoiceKey::E),
            _ => None,
        }
    }
}

impl fmt::Display for ChoiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            ChoiceKey::A => "A",
            ChoiceKey::B => "B",
            ChoiceKey::C => "C",
            ChoiceKey::D => "D",
            ChoiceKey::E => "E",
        };
        f.write_str(letter)
    }
}

impl FromStr for ChoiceKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                ChoiceKey::from_char(c).ok_or_else(|| format!("unknown choice key: {trimmed}"))
            }
            _ => Err(format!("unknown choice key: {trimmed}")),
        }
    }
}

/// Whether an item is scored or only presented for calibration.
///
/// Serialized as the bank's `ITEM_TYPE` string; unrecognized tags keep their
/// original spelling so exports echo the bank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemType {
    /// Always scored against a known answer key.
    Fixed,
    /// Presented for exposure only; never scored.
    Rotation,
    /// Anything else found in the bank. Neither scored nor counted.
    Unknown(String),
}

impl Default for ItemType {
    fn default() -> Self {
        ItemType::Unknown(String::new())
    }
}

impl ItemType {
    /// Tag as written in the bank.
    pub fn as_str(&self) -> &str {
        match self {
            ItemType::Fixed => "FIXED",
            ItemType::Rotation => "ROTATION",
            ItemType::Unknown(raw) => raw,
        }
    }
}

impl From<String> for ItemType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "FIXED" => ItemType::Fixed,
            "ROTATION" => ItemType::Rotation,
            _ => ItemType::Unknown(raw),
        }
    }
}

impl From<ItemType> for String {
    fn from(item_type: ItemType) -> Self {
        match item_type {
            ItemType::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemType::Unknown(raw) if raw.is_empty() => f.write_str("UNKNOWN"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// A piece of text in both presentation languages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Localized {
    pub tr: String,
    pub en: String,
}

impl Localized {
    pub fn new(tr: impl Into<String>, en: impl Into<String>) -> Self {
        Self {
            tr: tr.into(),
            en: en.into(),
        }
    }

    pub fn get(&self, lang: Lang) -> &str {
        match lang {
            Lang::Tr => &self.tr,
            Lang::En => &self.en,
        }
    }
}

/// A single verbal analogy item: a stem and five choices.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Unique, numeric-aware sortable identifier.
    pub id: String,
    pub item_type: ItemType,
    pub stem: Localized,
    /// Choice texts indexed by [`ChoiceKey::index`].
    pub choices: [Localized; 5],
    /// Correct choice. Missing or unrecognized keys load as `None`.
    pub answer_key: Option<ChoiceKey>,
    /// Classical difficulty (proportion correct).
    pub p_plus: Option<f64>,
    pub majority_tag: Option<String>,
    pub rotation_reason: Option<String>,
}

impl Item {
    /// Text of one choice.
    pub fn choice(&self, key: ChoiceKey) -> &Localized {
        &self.choices[key.index()]
    }

    pub fn is_fixed(&self) -> bool {
        self.item_type == ItemType::Fixed
    }

    pub fn is_rotation(&self) -> bool {
        self.item_type == ItemType::Rotation
    }
}

/// Bank metadata. Only the version is interpreted; everything else rides along.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BankMeta {
    /// Opaque version tag, carried into every export and never validated.
    #[serde(default)]
    pub bank_version: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The loaded item bank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bank {
    pub meta: BankMeta,
    pub items: Vec<Item>,
}

impl Bank {
    pub fn new(meta: BankMeta, items: Vec<Item>) -> Self {
        Self { meta, items }
    }

    pub fn version(&self) -> Option<&str> {
        self.meta.bank_version.as_deref()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Counts shown before a session starts.
    pub fn summary(&self) -> BankSummary {
        BankSummary {
            items: self.items.len(),
            fixed: self.items.iter().filter(|i| i.is_fixed()).count(),
            rotation: self.items.iter().filter(|i| i.is_rotation()).count(),
            bank_version: self.version().map(str::to_string),
        }
    }
}

/// Item count and version of a bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankSummary {
    pub items: usize,
    pub fixed: usize,
    pub rotation: usize,
    pub bank_version: Option<String>,
}

impl fmt::Display for BankSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "items: {} • bank_version: {}",
            self.items,
            self.bank_version.as_deref().unwrap_or("unknown")
        )
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Build an item whose texts are derived from its id.
    pub fn item(id: &str, item_type: ItemType, answer: Option<ChoiceKey>) -> Item {
        Item {
            id: id.to_string(),
            item_type,
            stem: Localized::new(format!("{id} tr"), format!("{id} en")),
            choices: ChoiceKey::ALL
                .map(|k| Localized::new(format!("{id} {k} tr"), format!("{id} {k} en"))),
            answer_key: answer,
            p_plus: Some(0.5),
            majority_tag: None,
            rotation_reason: None,
        }
    }

    pub fn fixed(id: &str, answer: ChoiceKey) -> Item {
        item(id, ItemType::Fixed, Some(answer))
    }

    pub fn rotation(id: &str) -> Item {
        item(id, ItemType::Rotation, None)
    }

    pub fn bank(items: Vec<Item>) -> Bank {
        Bank::new(
            BankMeta {
                bank_version: Some("v-test".into()),
                extra: Default::default(),
            },
            items,
        )
    }

    /// `fixed` FIXED items `F1..` (key A) and `rotation` ROTATION items `R1..`.
    pub fn mixed_bank(fixed_count: usize, rotation_count: usize) -> Bank {
        let mut items: Vec<Item> = (1..=fixed_count)
            .map(|n| fixed(&format!("F{n}"), ChoiceKey::A))
            .collect();
        items.extend((1..=rotation_count).map(|n| rotation(&format!("R{n}"))));
        bank(items)
    }
}
