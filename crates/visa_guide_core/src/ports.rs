//! crates/visa_guide_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core depends on. The backend
//! API and the on-device cache are external collaborators; these traits are
//! the boundary that keeps the wizard logic independent of them.

use async_trait::async_trait;

use crate::domain::{Country, Personalization, ProgressRecord, VisaTypeSummary};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// Transport failure or a non-2xx response from the backend.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    /// The on-device cache could not be read or written.
    #[error("Local storage error: {0}")]
    Storage(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// A store that can persist and retrieve progress records by email.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn save(&self, record: &ProgressRecord) -> PortResult<()>;

    /// `Ok(None)` when the store answered but holds nothing for `email`.
    async fn load(&self, email: &str) -> PortResult<Option<ProgressRecord>>;
}

/// Read-only access to the backend's country and visa catalogs.
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn origin_countries(&self) -> PortResult<Vec<Country>>;

    async fn destination_countries(&self) -> PortResult<Vec<Country>>;

    async fn route_supported(&self, origin: &str, destination: &str) -> PortResult<bool>;

    async fn visa_types(
        &self,
        origin: &str,
        destination: &str,
        category: Option<&str>,
    ) -> PortResult<Vec<VisaTypeSummary>>;

    async fn visa_type(
        &self,
        id: &str,
        personalization: Option<&Personalization>,
    ) -> PortResult<Option<VisaTypeSummary>>;

    /// Computed requirements for a visa type given the user's answers.
    async fn requirements(
        &self,
        visa_type_id: &str,
        responses: &serde_json::Value,
    ) -> PortResult<serde_json::Value>;

    /// Computed document checklist for a visa type given the user's answers.
    async fn checklist(
        &self,
        visa_type_id: &str,
        responses: &serde_json::Value,
    ) -> PortResult<serde_json::Value>;
}
