//! services/api/src/adapters/local_cache.rs
//!
//! The on-device progress cache: a single JSON file holding a
//! `visamap_progress` object keyed by email. Saves shallow-merge the incoming
//! record into whatever is already stored for that email and stamp
//! `lastUpdated`.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use visa_guide_core::domain::ProgressRecord;
use visa_guide_core::ports::{PortError, PortResult, ProgressStore};

/// Top-level key of the cache document.
pub const CACHE_NAMESPACE: &str = "visamap_progress";

pub struct LocalProgressCache {
    path: PathBuf,
    /// Serializes read-modify-write cycles on the file.
    lock: Mutex<()>,
}

impl LocalProgressCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read_document(&self) -> PortResult<Map<String, Value>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(storage(e)),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&raw).map_err(storage)? {
            Value::Object(map) => Ok(map),
            _ => Err(PortError::Storage(format!(
                "{} does not hold a JSON object",
                self.path.display()
            ))),
        }
    }

    async fn write_document(&self, document: &Map<String, Value>) -> PortResult<()> {
        let raw = serde_json::to_string_pretty(document).map_err(storage)?;
        tokio::fs::write(&self.path, raw).await.map_err(storage)
    }
}

fn storage(e: impl std::fmt::Display) -> PortError {
    PortError::Storage(e.to_string())
}

#[async_trait]
impl ProgressStore for LocalProgressCache {
    async fn save(&self, record: &ProgressRecord) -> PortResult<()> {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;

        let Value::Object(incoming) = serde_json::to_value(record).map_err(storage)? else {
            return Err(PortError::Unexpected("progress record is not an object".into()));
        };

        let mut entries = match document.remove(CACHE_NAMESPACE) {
            Some(Value::Object(entries)) => entries,
            _ => Map::new(),
        };
        let mut existing = match entries.remove(&record.email) {
            Some(Value::Object(existing)) => existing,
            _ => Map::new(),
        };
        existing.extend(incoming);
        existing.insert(
            "lastUpdated".into(),
            serde_json::to_value(Utc::now()).map_err(storage)?,
        );
        entries.insert(record.email.clone(), Value::Object(existing));
        document.insert(CACHE_NAMESPACE.into(), Value::Object(entries));

        self.write_document(&document).await
    }

    async fn load(&self, email: &str) -> PortResult<Option<ProgressRecord>> {
        let _guard = self.lock.lock().await;
        let document = self.read_document().await?;
        document
            .get(CACHE_NAMESPACE)
            .and_then(|entries| entries.get(email))
            .map(|entry| serde_json::from_value(entry.clone()).map_err(storage))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn cache() -> (tempfile::TempDir, LocalProgressCache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalProgressCache::new(dir.path().join("progress.json"));
        (dir, cache)
    }

    #[tokio::test]
    async fn missing_file_loads_nothing() {
        let (_dir, cache) = cache();
        assert_eq!(cache.load("asha@example.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn saved_record_gets_last_updated() {
        let (_dir, cache) = cache();
        let before = Utc::now();
        cache
            .save(&ProgressRecord::new("asha@example.com", "IN", "GB"))
            .await
            .unwrap();

        let loaded = cache.load("asha@example.com").await.unwrap().unwrap();
        assert_eq!(loaded.origin_country, "IN");
        assert!(loaded.last_updated.unwrap() >= before);
    }

    #[tokio::test]
    async fn saves_merge_with_the_stored_entry() {
        let (_dir, cache) = cache();
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let mut first = ProgressRecord::new("asha@example.com", "IN", "GB")
            .with_timestamp("countrySelection", at);
        first.visa_type = Some("student-visa".into());
        cache.save(&first).await.unwrap();

        let mut second = ProgressRecord::new("asha@example.com", "IN", "GB");
        second.step_completion = Some(BTreeMap::from([("atas".to_string(), true)]));
        cache.save(&second).await.unwrap();

        let loaded = cache.load("asha@example.com").await.unwrap().unwrap();
        assert_eq!(loaded.visa_type.as_deref(), Some("student-visa"));
        assert_eq!(
            loaded.step_completion.unwrap().get("atas"),
            Some(&true)
        );
    }

    #[tokio::test]
    async fn other_emails_are_left_alone() {
        let (_dir, cache) = cache();
        cache
            .save(&ProgressRecord::new("asha@example.com", "IN", "GB"))
            .await
            .unwrap();
        cache
            .save(&ProgressRecord::new("ravi@example.com", "IN", "GB"))
            .await
            .unwrap();
        assert!(cache.load("asha@example.com").await.unwrap().is_some());
        assert!(cache.load("ravi@example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn corrupt_file_is_a_storage_error() {
        let (dir, cache) = cache();
        tokio::fs::write(dir.path().join("progress.json"), "[1, 2]")
            .await
            .unwrap();
        assert!(matches!(
            cache.load("asha@example.com").await,
            Err(PortError::Storage(_))
        ));
    }
}
