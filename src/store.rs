use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

use crate::models::{AwardRecord, Picklists};

/// Award records and pick-lists, read once at startup and never mutated.
#[derive(Debug, Clone, Default)]
pub struct DatasetStore {
    records: Vec<AwardRecord>,
    picklists: Picklists,
}

impl DatasetStore {
    pub fn new(records: Vec<AwardRecord>, picklists: Picklists) -> Self {
        Self { records, picklists }
    }

    pub fn records(&self) -> &[AwardRecord] {
        &self.records
    }

    pub fn picklists(&self) -> &Picklists {
        &self.picklists
    }
}

pub async fn load_dataset(path: &Path) -> anyhow::Result<Vec<AwardRecord>> {
    let body = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    let records: Vec<AwardRecord> = serde_json::from_slice(&body)
        .with_context(|| format!("dataset {} is not a JSON array of awards", path.display()))?;
    Ok(records)
}

pub async fn read_picklists(path: &Path) -> anyhow::Result<Picklists> {
    let body = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read pick-lists {}", path.display()))?;
    let picklists = serde_json::from_slice(&body)
        .with_context(|| format!("pick-lists {} are not valid JSON", path.display()))?;
    Ok(picklists)
}

/// Pick-lists are optional: any failure yields empty collections.
pub async fn load_picklists(path: &Path) -> Picklists {
    match read_picklists(path).await {
        Ok(picklists) => picklists,
        Err(err) => {
            warn!(path = %path.display(), "using empty pick-lists: {err:#}");
            Picklists::default()
        }
    }
}

/// Loads both resources concurrently. Only a dataset failure is fatal.
pub async fn load(dataset_path: &Path, picklists_path: &Path) -> anyhow::Result<DatasetStore> {
    let (records, picklists) =
        tokio::join!(load_dataset(dataset_path), load_picklists(picklists_path));
    let records = records?;

    info!(
        records = records.len(),
        institutions = picklists.institutions.len(),
        ics = picklists.ics.len(),
        mechanisms = picklists.mechanisms.len(),
        activity_codes = picklists.activity_codes.len(),
        "dataset loaded"
    );

    Ok(DatasetStore::new(records, picklists))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[tokio::test]
    async fn loads_both_resources() {
        let dir = tempfile::tempdir().unwrap();
        let data = write(
            &dir,
            "ytd.json",
            r#"[{"year": 2024, "week_start": "2024-01-08", "amount": 100, "type_category": "new"}]"#,
        );
        let picks = write(
            &dir,
            "picklists.json",
            r#"{"institutions": ["A"], "ics": ["NCI"], "mechanisms": ["R"], "activity_codes": ["R01"], "meta": {"cutoff_2025": "2025-03-14"}}"#,
        );

        let store = load(&data, &picks).await.unwrap();
        assert_eq!(store.records().len(), 1);
        assert_eq!(store.records()[0].year.as_deref(), Some("2024"));
        assert_eq!(store.picklists().ics, vec!["NCI".to_string()]);
    }

    #[tokio::test]
    async fn bundled_sample_loads() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("pages/data");
        let store = load(&root.join("ytd_2024_2025.json"), &root.join("picklists.json"))
            .await
            .unwrap();
        assert_eq!(store.records().len(), 6);
        assert_eq!(
            store.picklists().meta.cutoff_2025.as_deref(),
            Some("2025-01-31")
        );
    }

    #[tokio::test]
    async fn missing_picklists_fall_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let data = write(&dir, "ytd.json", "[]");
        let store = load(&data, &dir.path().join("absent.json")).await.unwrap();
        assert_eq!(store.picklists(), &Picklists::default());
    }

    #[tokio::test]
    async fn malformed_picklists_fall_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let picks = write(&dir, "picklists.json", "{not json");
        assert_eq!(load_picklists(&picks).await, Picklists::default());
    }

    #[tokio::test]
    async fn dataset_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let picks = write(&dir, "picklists.json", "{}");
        let missing = load(&dir.path().join("absent.json"), &picks).await;
        assert!(missing.is_err());

        let data = write(&dir, "ytd.json", r#"{"not": "an array"}"#);
        let err = load(&data, &picks).await.unwrap_err();
        assert!(format!("{err:#}").contains("not a JSON array"));
    }
}
