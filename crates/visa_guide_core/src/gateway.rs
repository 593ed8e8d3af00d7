//! crates/visa_guide_core/src/gateway.rs
//!
//! Resilient front doors to the backend. Progress saves try the backend
//! first and fall back to the on-device cache; catalog lookups substitute the
//! built-in datasets whenever the backend cannot answer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::catalog::{
    fallback_destination_countries, fallback_origin_countries, fallback_visa_types,
    is_supported_route,
};
use crate::domain::{Country, Personalization, ProgressRecord, VisaTypeSummary};
use crate::ports::{CatalogService, PortResult, ProgressStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveSource {
    Remote,
    LocalCache,
}

/// Where a successful save landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    pub source: SaveSource,
}

//=========================================================================================
// Progress persistence
//=========================================================================================

pub struct ProgressGateway {
    remote: Arc<dyn ProgressStore>,
    cache: Arc<dyn ProgressStore>,
}

impl ProgressGateway {
    pub fn new(remote: Arc<dyn ProgressStore>, cache: Arc<dyn ProgressStore>) -> Self {
        Self { remote, cache }
    }

    /// Saves `record` remotely, or to the cache when the backend fails. Only
    /// returns an error when both stores failed.
    pub async fn save(&self, record: &ProgressRecord) -> PortResult<SaveOutcome> {
        let remote_err = match self.remote.save(record).await {
            Ok(()) => {
                info!(email = %record.email, "Progress saved to backend");
                return Ok(SaveOutcome {
                    source: SaveSource::Remote,
                });
            }
            Err(e) => e,
        };
        warn!(
            email = %record.email,
            error = %remote_err,
            "Backend progress save failed, falling back to local cache"
        );

        match self.cache.save(record).await {
            Ok(()) => Ok(SaveOutcome {
                source: SaveSource::LocalCache,
            }),
            Err(cache_err) => {
                error!(
                    email = %record.email,
                    error = %cache_err,
                    "Local progress save failed as well"
                );
                Err(cache_err)
            }
        }
    }

    /// Loads the record for `email`. A backend answer, including "nothing
    /// stored", is authoritative; the cache is consulted only when the
    /// backend fails.
    pub async fn load(&self, email: &str) -> Option<ProgressRecord> {
        match self.remote.load(email).await {
            Ok(record) => record,
            Err(e) => {
                warn!(%email, error = %e, "Backend progress load failed, reading local cache");
                match self.cache.load(email).await {
                    Ok(record) => record,
                    Err(e) => {
                        error!(%email, error = %e, "Local progress load failed");
                        None
                    }
                }
            }
        }
    }
}

//=========================================================================================
// Catalog with built-in fallbacks
//=========================================================================================

pub struct ResilientCatalog {
    inner: Arc<dyn CatalogService>,
}

impl ResilientCatalog {
    pub fn new(inner: Arc<dyn CatalogService>) -> Self {
        Self { inner }
    }

    pub async fn origin_countries(&self) -> Vec<Country> {
        match self.inner.origin_countries().await {
            Ok(countries) if !countries.is_empty() => countries,
            Ok(_) => fallback_origin_countries(),
            Err(e) => {
                warn!(error = %e, "Using built-in origin countries");
                fallback_origin_countries()
            }
        }
    }

    pub async fn destination_countries(&self) -> Vec<Country> {
        match self.inner.destination_countries().await {
            Ok(countries) if !countries.is_empty() => countries,
            Ok(_) => fallback_destination_countries(),
            Err(e) => {
                warn!(error = %e, "Using built-in destination countries");
                fallback_destination_countries()
            }
        }
    }

    pub async fn route_supported(&self, origin: &str, destination: &str) -> bool {
        match self.inner.route_supported(origin, destination).await {
            Ok(supported) => supported,
            Err(e) => {
                warn!(%origin, %destination, error = %e, "Route check failed, using built-in route");
                is_supported_route(origin, destination)
            }
        }
    }

    pub async fn visa_types(
        &self,
        origin: &str,
        destination: &str,
        category: Option<&str>,
    ) -> Vec<VisaTypeSummary> {
        match self.inner.visa_types(origin, destination, category).await {
            Ok(types) if !types.is_empty() => types,
            Ok(_) => fallback_visa_types(),
            Err(e) => {
                warn!(%origin, %destination, error = %e, "Using built-in visa types");
                fallback_visa_types()
            }
        }
    }

    pub async fn visa_type(
        &self,
        id: &str,
        personalization: Option<&Personalization>,
    ) -> Option<VisaTypeSummary> {
        match self.inner.visa_type(id, personalization).await {
            Ok(Some(visa)) => Some(visa),
            Ok(None) => None,
            Err(e) => {
                warn!(%id, error = %e, "Visa type lookup failed, using built-in catalog");
                fallback_visa_types().into_iter().find(|v| v.id == id)
            }
        }
    }

    pub async fn requirements(
        &self,
        visa_type_id: &str,
        responses: &serde_json::Value,
    ) -> Option<serde_json::Value> {
        self.inner
            .requirements(visa_type_id, responses)
            .await
            .map_err(|e| warn!(%visa_type_id, error = %e, "Requirements lookup failed"))
            .ok()
    }

    pub async fn checklist(
        &self,
        visa_type_id: &str,
        responses: &serde_json::Value,
    ) -> Option<serde_json::Value> {
        self.inner
            .checklist(visa_type_id, responses)
            .await
            .map_err(|e| warn!(%visa_type_id, error = %e, "Checklist lookup failed"))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PortError;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        records: Mutex<HashMap<String, ProgressRecord>>,
    }

    #[async_trait]
    impl ProgressStore for MemoryStore {
        async fn save(&self, record: &ProgressRecord) -> PortResult<()> {
            self.records
                .lock()
                .unwrap()
                .insert(record.email.clone(), record.clone());
            Ok(())
        }

        async fn load(&self, email: &str) -> PortResult<Option<ProgressRecord>> {
            Ok(self.records.lock().unwrap().get(email).cloned())
        }
    }

    struct DownStore;

    #[async_trait]
    impl ProgressStore for DownStore {
        async fn save(&self, _record: &ProgressRecord) -> PortResult<()> {
            Err(PortError::Unavailable("connection refused".into()))
        }

        async fn load(&self, _email: &str) -> PortResult<Option<ProgressRecord>> {
            Err(PortError::Unavailable("connection refused".into()))
        }
    }

    fn record() -> ProgressRecord {
        ProgressRecord::new("asha@example.com", "IN", "GB")
    }

    #[tokio::test]
    async fn healthy_backend_takes_the_save() {
        let remote = Arc::new(MemoryStore::default());
        let cache = Arc::new(MemoryStore::default());
        let gateway = ProgressGateway::new(remote.clone(), cache.clone());

        let outcome = gateway.save(&record()).await.unwrap();
        assert_eq!(outcome.source, SaveSource::Remote);
        assert!(cache.records.lock().unwrap().is_empty());
        assert!(remote.records.lock().unwrap().contains_key("asha@example.com"));
    }

    #[tokio::test]
    async fn failed_backend_falls_back_to_cache() {
        let cache = Arc::new(MemoryStore::default());
        let gateway = ProgressGateway::new(Arc::new(DownStore), cache.clone());

        let outcome = gateway.save(&record()).await.unwrap();
        assert_eq!(outcome.source, SaveSource::LocalCache);
        assert_eq!(gateway.load("asha@example.com").await, Some(record()));
    }

    #[tokio::test]
    async fn both_stores_failing_is_reported() {
        let gateway = ProgressGateway::new(Arc::new(DownStore), Arc::new(DownStore));
        assert_matches!(gateway.save(&record()).await, Err(PortError::Unavailable(_)));
        assert_eq!(gateway.load("asha@example.com").await, None);
    }

    #[tokio::test]
    async fn backend_answer_wins_over_cache() {
        let remote = Arc::new(MemoryStore::default());
        let cache = Arc::new(MemoryStore::default());
        cache.save(&record()).await.unwrap();
        let gateway = ProgressGateway::new(remote, cache);

        assert_eq!(gateway.load("asha@example.com").await, None);
    }

    struct DownCatalog;

    #[async_trait]
    impl CatalogService for DownCatalog {
        async fn origin_countries(&self) -> PortResult<Vec<Country>> {
            Err(PortError::Unavailable("down".into()))
        }
        async fn destination_countries(&self) -> PortResult<Vec<Country>> {
            Err(PortError::Unavailable("down".into()))
        }
        async fn route_supported(&self, _o: &str, _d: &str) -> PortResult<bool> {
            Err(PortError::Unavailable("down".into()))
        }
        async fn visa_types(
            &self,
            _o: &str,
            _d: &str,
            _c: Option<&str>,
        ) -> PortResult<Vec<VisaTypeSummary>> {
            Err(PortError::Unavailable("down".into()))
        }
        async fn visa_type(
            &self,
            _id: &str,
            _p: Option<&Personalization>,
        ) -> PortResult<Option<VisaTypeSummary>> {
            Err(PortError::Unavailable("down".into()))
        }
        async fn requirements(
            &self,
            _id: &str,
            _r: &serde_json::Value,
        ) -> PortResult<serde_json::Value> {
            Err(PortError::Unavailable("down".into()))
        }
        async fn checklist(
            &self,
            _id: &str,
            _r: &serde_json::Value,
        ) -> PortResult<serde_json::Value> {
            Err(PortError::Unavailable("down".into()))
        }
    }

    #[tokio::test]
    async fn unreachable_catalog_serves_built_in_data() {
        let catalog = ResilientCatalog::new(Arc::new(DownCatalog));

        assert_eq!(catalog.origin_countries().await, fallback_origin_countries());
        assert_eq!(
            catalog.destination_countries().await,
            fallback_destination_countries()
        );
        assert!(catalog.route_supported("IN", "GB").await);
        assert!(!catalog.route_supported("NG", "GB").await);
        assert_eq!(catalog.visa_types("IN", "GB", None).await.len(), 4);
        assert_eq!(
            catalog.visa_type("student-visa", None).await.map(|v| v.id),
            Some("student-visa".to_string())
        );
        assert_eq!(
            catalog.requirements("student-visa", &serde_json::json!({})).await,
            None
        );
    }
}
