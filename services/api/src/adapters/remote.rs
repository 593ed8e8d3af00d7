//! services/api/src/adapters/remote.rs
//!
//! The backend REST adapter. Implements both the `CatalogService` and the
//! `ProgressStore` ports over HTTP. Every response is a `{ "data": ... }`
//! envelope; any transport error or non-2xx status is reported as
//! `PortError::Unavailable` so the callers can fall back.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize};
use visa_guide_core::domain::{Country, Personalization, ProgressRecord, VisaTypeSummary};
use visa_guide_core::ports::{CatalogService, PortError, PortResult, ProgressStore};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> PortResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PortError::Unexpected(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_data<T: DeserializeOwned>(&self, url: Url) -> PortResult<T> {
        let response = self.client.get(url).send().await.map_err(unavailable)?;
        read_data(response).await
    }

    async fn post_data<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &impl serde::Serialize,
    ) -> PortResult<T> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(unavailable)?;
        read_data(response).await
    }
}

//=========================================================================================
// Response Envelopes
//=========================================================================================

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct CountriesData {
    countries: Vec<Country>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteData {
    is_supported: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VisaTypesData {
    visa_types: Vec<VisaTypeSummary>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VisaTypeData {
    visa_type: Option<VisaTypeSummary>,
}

#[derive(Deserialize)]
struct ProgressData {
    progress: Option<ProgressRecord>,
}

fn unavailable(e: reqwest::Error) -> PortError {
    PortError::Unavailable(e.to_string())
}

async fn read_data<T: DeserializeOwned>(response: Response) -> PortResult<T> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(PortError::NotFound(response.url().path().to_string()));
    }
    if !status.is_success() {
        return Err(PortError::Unavailable(format!(
            "backend returned HTTP {}",
            status.as_u16()
        )));
    }
    let envelope: Envelope<T> = response.json().await.map_err(unavailable)?;
    Ok(envelope.data)
}

//=========================================================================================
// Port Implementations
//=========================================================================================

#[async_trait]
impl CatalogService for HttpBackend {
    async fn origin_countries(&self) -> PortResult<Vec<Country>> {
        let url = self.url(&["countries", "origins"])?;
        let data: CountriesData = self.get_data(url).await?;
        Ok(data.countries)
    }

    async fn destination_countries(&self) -> PortResult<Vec<Country>> {
        let url = self.url(&["countries", "destinations"])?;
        let data: CountriesData = self.get_data(url).await?;
        Ok(data.countries)
    }

    async fn route_supported(&self, origin: &str, destination: &str) -> PortResult<bool> {
        let url = self.url(&["countries", "route", origin, destination])?;
        let data: RouteData = self.get_data(url).await?;
        Ok(data.is_supported)
    }

    async fn visa_types(
        &self,
        origin: &str,
        destination: &str,
        category: Option<&str>,
    ) -> PortResult<Vec<VisaTypeSummary>> {
        let mut url = self.url(&["visa-types", "route", origin, destination])?;
        if let Some(category) = category {
            url.query_pairs_mut().append_pair("category", category);
        }
        let data: VisaTypesData = self.get_data(url).await?;
        Ok(data.visa_types)
    }

    async fn visa_type(
        &self,
        id: &str,
        personalization: Option<&Personalization>,
    ) -> PortResult<Option<VisaTypeSummary>> {
        let mut url = self.url(&["visa-types", id])?;
        if let Some(p) = personalization {
            let encoded =
                serde_json::to_string(p).map_err(|e| PortError::Unexpected(e.to_string()))?;
            url.query_pairs_mut().append_pair("personalization", &encoded);
        }
        let data: VisaTypeData = self.get_data(url).await?;
        Ok(data.visa_type)
    }

    async fn requirements(
        &self,
        visa_type_id: &str,
        responses: &serde_json::Value,
    ) -> PortResult<serde_json::Value> {
        let url = self.url(&["visa-types", visa_type_id, "requirements"])?;
        self.post_data(url, responses).await
    }

    async fn checklist(
        &self,
        visa_type_id: &str,
        responses: &serde_json::Value,
    ) -> PortResult<serde_json::Value> {
        let url = self.url(&["visa-types", visa_type_id, "checklist"])?;
        self.post_data(url, responses).await
    }
}

#[async_trait]
impl ProgressStore for HttpBackend {
    async fn save(&self, record: &ProgressRecord) -> PortResult<()> {
        let url = self.url(&["journeys", "progress"])?;
        let _: serde_json::Value = self.post_data(url, record).await?;
        Ok(())
    }

    async fn load(&self, email: &str) -> PortResult<Option<ProgressRecord>> {
        let url = self.url(&["journeys", "progress", email])?;
        let data: ProgressData = self.get_data(url).await?;
        Ok(data.progress)
    }
}
