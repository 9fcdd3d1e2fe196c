//! Writing export payloads under their canonical file names.

use std::path::{Path, PathBuf};

use anyhow::Result;

use analogy_core::export::{AttemptPayload, LocalizationPayload};

/// Which file name a localization export gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalizationNaming {
    /// `analogies_localization_{bank_version}.json`
    Versioned,
    /// `analogies_localization_{YYYYMMDDHHMMSS}.json`
    Stamped,
}

/// Write `{attempt_id}.json` into `dir` and return its path.
pub fn write_attempt(dir: &Path, payload: &AttemptPayload) -> Result<PathBuf> {
    let path = dir.join(payload.file_name());
    payload.save_json(&path)?;
    tracing::info!(path = %path.display(), rows = payload.responses.len(), "attempt exported");
    Ok(path)
}

/// Write the localization payload into `dir` and return its path.
pub fn write_localization(
    dir: &Path,
    payload: &LocalizationPayload,
    naming: LocalizationNaming,
) -> Result<PathBuf> {
    let name = match naming {
        LocalizationNaming::Versioned => payload.versioned_file_name(),
        LocalizationNaming::Stamped => payload.stamped_file_name(),
    };
    let path = dir.join(name);
    payload.save_json(&path)?;
    tracing::info!(
        path = %path.display(),
        edited = payload.count_items_with_edits,
        "localization exported"
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use analogy_core::export::{AssembledCounts, AttemptMeta};
    use chrono::{TimeZone, Utc};

    fn attempt() -> AttemptPayload {
        let at = Utc.with_ymd_and_hms(2025, 2, 3, 4, 5, 6).unwrap();
        AttemptPayload {
            meta: AttemptMeta {
                attempt_id: "att_abc_1".into(),
                bank_version: Some("v2".into()),
                started_at: at,
                ended_at: at,
                assembled_counts: AssembledCounts { fixed: 0, rotation: 0 },
            },
            responses: vec![],
        }
    }

    #[test]
    fn attempt_lands_under_attempt_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_attempt(&dir.path().join("nested"), &attempt()).unwrap();
        assert_eq!(path.file_name().unwrap(), "att_abc_1.json");
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["meta"]["bank_version"], "v2");
    }

    #[test]
    fn localization_naming() {
        let dir = tempfile::tempdir().unwrap();
        let payload = LocalizationPayload {
            bank_version: Some("v2".into()),
            generated_at: Utc.with_ymd_and_hms(2025, 2, 3, 4, 5, 6).unwrap(),
            count_items_with_edits: 0,
            edits: vec![],
        };

        let versioned =
            write_localization(dir.path(), &payload, LocalizationNaming::Versioned).unwrap();
        assert_eq!(versioned.file_name().unwrap(), "analogies_localization_v2.json");

        let stamped = write_localization(dir.path(), &payload, LocalizationNaming::Stamped).unwrap();
        assert_eq!(
            stamped.file_name().unwrap(),
            "analogies_localization_20250203040506.json"
        );
        assert!(versioned.exists() && stamped.exists());
    }
}
