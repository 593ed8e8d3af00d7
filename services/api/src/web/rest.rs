//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification. Every payload is wrapped in a
//! `{ "data": ... }` envelope.

use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::{IntoParams, OpenApi, ToSchema};
use visa_guide_core::catalog::{traveler_types, TravelerTypeOption, DEFAULT_TRAVELER_TYPE};
use visa_guide_core::content::{
    accuracy_note, timeline_steps, DetailTab, FeeSummary, ScenarioCategory,
    TimelineStepDefinition, CHECKLIST_ITEMS, SPECIAL_CASE_SCENARIOS, STUDENT_VISA_FEES,
};
use visa_guide_core::timeline::derive_timeline;
use visa_guide_core::validation::is_valid_email;
use visa_guide_core::{
    Country, Personalization, ProgressRecord, SaveSource, StepCompletionMap, TimelineEntry,
    VisaTypeSummary,
};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        origin_countries_handler,
        destination_countries_handler,
        route_support_handler,
        visa_types_handler,
        visa_type_handler,
        visa_type_requirements_handler,
        visa_type_checklist_handler,
        traveler_types_handler,
        timeline_steps_handler,
        guide_handler,
        derive_timeline_handler,
        save_progress_handler,
        load_progress_handler,
    ),
    components(
        schemas(
            HealthResponse,
            CountriesResponse, CountriesData,
            RouteResponse, RouteData,
            VisaTypesResponse, VisaTypesData,
            VisaTypeResponse, VisaTypeData,
            BackendDocumentResponse,
            TravelerTypesResponse, TravelerTypesData,
            StepsResponse, StepsData,
            GuideResponse, GuideData, TabView,
            TimelineRequest, TimelineResponse, TimelineData,
            ProgressSavedResponse, ProgressSavedData,
            ProgressResponse, ProgressData,
        )
    ),
    tags(
        (name = "Visa Guide API", description = "Catalog, timeline and progress endpoints for the visa guide wizard.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CountriesData {
    #[schema(value_type = Vec<Object>)]
    pub countries: Vec<Country>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CountriesResponse {
    pub data: CountriesData,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteData {
    pub is_supported: bool,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct RouteResponse {
    pub data: RouteData,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisaTypesData {
    #[schema(value_type = Vec<Object>)]
    pub visa_types: Vec<VisaTypeSummary>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct VisaTypesResponse {
    pub data: VisaTypesData,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VisaTypesQuery {
    /// Restricts the list to one category, e.g. `student`.
    pub category: Option<String>,
}

/// Personalization answers forwarded with a visa type lookup.
#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VisaTypeQuery {
    #[serde(rename = "hasCAS")]
    pub has_cas: Option<bool>,
    #[serde(rename = "casDate")]
    pub cas_date: Option<String>,
}

impl VisaTypeQuery {
    fn personalization(self) -> Option<Personalization> {
        self.has_cas.map(|has_cas| Personalization {
            has_confirmation_document: has_cas,
            confirmation_date: self.cas_date,
        })
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisaTypeData {
    #[schema(value_type = Object)]
    pub visa_type: VisaTypeSummary,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct VisaTypeResponse {
    pub data: VisaTypeData,
}

/// A requirements or checklist document as the backend computed it.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct BackendDocumentResponse {
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TravelerTypesData {
    #[schema(value_type = Vec<Object>)]
    pub traveler_types: Vec<TravelerTypeOption>,
    /// The option pre-selected on the traveler type screen.
    pub default: &'static str,
}

#[derive(Serialize, ToSchema)]
pub struct TravelerTypesResponse {
    pub data: TravelerTypesData,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StepsData {
    #[schema(value_type = Vec<Object>)]
    pub steps: &'static [TimelineStepDefinition],
    pub accuracy_note: &'static str,
}

#[derive(Serialize, ToSchema)]
pub struct StepsResponse {
    pub data: StepsData,
}

#[derive(Serialize, ToSchema)]
pub struct TabView {
    #[schema(value_type = String)]
    pub id: DetailTab,
    pub label: &'static str,
}

/// Static content of the detail screen.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuideData {
    pub tabs: Vec<TabView>,
    #[schema(value_type = Object)]
    pub fees: FeeSummary,
    #[schema(value_type = Vec<Object>)]
    pub special_cases: &'static [ScenarioCategory],
    #[schema(value_type = Vec<String>)]
    pub checklist: &'static [&'static str],
}

#[derive(Serialize, ToSchema)]
pub struct GuideResponse {
    pub data: GuideData,
}

/// The inputs of the step-status derivation.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimelineRequest {
    #[schema(value_type = Object)]
    pub personalization: Personalization,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub step_completion: StepCompletionMap,
    /// The client's local date. Defaults to the server's UTC date.
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "2025-01-02")]
    pub today: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct TimelineData {
    #[schema(value_type = Vec<Object>)]
    pub entries: Vec<TimelineEntry>,
}

#[derive(Serialize, ToSchema)]
pub struct TimelineResponse {
    pub data: TimelineData,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ProgressSavedData {
    #[schema(value_type = String, example = "remote")]
    pub source: SaveSource,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ProgressSavedResponse {
    pub data: ProgressSavedData,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ProgressData {
    #[schema(value_type = Object)]
    pub progress: ProgressRecord,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ProgressResponse {
    pub data: ProgressData,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Countries travelers can depart from.
#[utoipa::path(
    get,
    path = "/catalog/origins",
    responses((status = 200, description = "Origin countries", body = CountriesResponse))
)]
pub async fn origin_countries_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<CountriesResponse> {
    let countries = app_state.catalog.origin_countries().await;
    Json(CountriesResponse {
        data: CountriesData { countries },
    })
}

/// Countries travelers can go to.
#[utoipa::path(
    get,
    path = "/catalog/destinations",
    responses((status = 200, description = "Destination countries", body = CountriesResponse))
)]
pub async fn destination_countries_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<CountriesResponse> {
    let countries = app_state.catalog.destination_countries().await;
    Json(CountriesResponse {
        data: CountriesData { countries },
    })
}

/// Whether the route has a detailed guide.
#[utoipa::path(
    get,
    path = "/catalog/routes/{origin}/{destination}",
    params(
        ("origin" = String, Path, description = "ISO code of the origin country"),
        ("destination" = String, Path, description = "ISO code of the destination country")
    ),
    responses((status = 200, description = "Route support", body = RouteResponse))
)]
pub async fn route_support_handler(
    State(app_state): State<Arc<AppState>>,
    Path((origin, destination)): Path<(String, String)>,
) -> Json<RouteResponse> {
    let is_supported = app_state
        .catalog
        .route_supported(&origin, &destination)
        .await;
    Json(RouteResponse {
        data: RouteData { is_supported },
    })
}

/// Visa types offered for a route.
#[utoipa::path(
    get,
    path = "/catalog/visa-types/{origin}/{destination}",
    params(
        ("origin" = String, Path, description = "ISO code of the origin country"),
        ("destination" = String, Path, description = "ISO code of the destination country"),
        VisaTypesQuery
    ),
    responses((status = 200, description = "Visa types for the route", body = VisaTypesResponse))
)]
pub async fn visa_types_handler(
    State(app_state): State<Arc<AppState>>,
    Path((origin, destination)): Path<(String, String)>,
    Query(query): Query<VisaTypesQuery>,
) -> Json<VisaTypesResponse> {
    let visa_types = app_state
        .catalog
        .visa_types(&origin, &destination, query.category.as_deref())
        .await;
    Json(VisaTypesResponse {
        data: VisaTypesData { visa_types },
    })
}

/// One visa type, personalized by the confirmation answers when given.
#[utoipa::path(
    get,
    path = "/catalog/visa-type/{id}",
    params(
        ("id" = String, Path, description = "The visa type id"),
        VisaTypeQuery
    ),
    responses(
        (status = 200, description = "The visa type", body = VisaTypeResponse),
        (status = 404, description = "No such visa type")
    )
)]
pub async fn visa_type_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<VisaTypeQuery>,
) -> Result<Json<VisaTypeResponse>, (StatusCode, String)> {
    let personalization = query.personalization();
    match app_state
        .catalog
        .visa_type(&id, personalization.as_ref())
        .await
    {
        Some(visa_type) => Ok(Json(VisaTypeResponse {
            data: VisaTypeData { visa_type },
        })),
        None => Err((StatusCode::NOT_FOUND, format!("Unknown visa type {}", id))),
    }
}

/// Requirements the backend derives from the traveler's answers.
#[utoipa::path(
    post,
    path = "/catalog/visa-type/{id}/requirements",
    params(("id" = String, Path, description = "The visa type id")),
    request_body(content = Object, description = "The traveler's answers."),
    responses(
        (status = 200, description = "Personalized requirements", body = BackendDocumentResponse),
        (status = 503, description = "The backend is unavailable")
    )
)]
pub async fn visa_type_requirements_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(responses): Json<serde_json::Value>,
) -> Result<Json<BackendDocumentResponse>, (StatusCode, String)> {
    app_state
        .catalog
        .requirements(&id, &responses)
        .await
        .map(|data| Json(BackendDocumentResponse { data }))
        .ok_or_else(backend_unavailable)
}

/// The backend's document checklist for the traveler's answers.
#[utoipa::path(
    post,
    path = "/catalog/visa-type/{id}/checklist",
    params(("id" = String, Path, description = "The visa type id")),
    request_body(content = Object, description = "The traveler's answers."),
    responses(
        (status = 200, description = "Personalized checklist", body = BackendDocumentResponse),
        (status = 503, description = "The backend is unavailable")
    )
)]
pub async fn visa_type_checklist_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(responses): Json<serde_json::Value>,
) -> Result<Json<BackendDocumentResponse>, (StatusCode, String)> {
    app_state
        .catalog
        .checklist(&id, &responses)
        .await
        .map(|data| Json(BackendDocumentResponse { data }))
        .ok_or_else(backend_unavailable)
}

fn backend_unavailable() -> (StatusCode, String) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        "The visa catalog backend is unavailable".to_string(),
    )
}

#[utoipa::path(
    get,
    path = "/catalog/traveler-types",
    responses((status = 200, description = "Traveler categories", body = TravelerTypesResponse))
)]
pub async fn traveler_types_handler() -> Json<TravelerTypesResponse> {
    Json(TravelerTypesResponse {
        data: TravelerTypesData {
            traveler_types: traveler_types(),
            default: DEFAULT_TRAVELER_TYPE.id(),
        },
    })
}

/// The ordered timeline step catalog with instructions and official links.
#[utoipa::path(
    get,
    path = "/catalog/steps",
    responses((status = 200, description = "Timeline step catalog", body = StepsResponse))
)]
pub async fn timeline_steps_handler() -> Json<StepsResponse> {
    Json(StepsResponse {
        data: StepsData {
            steps: timeline_steps(),
            accuracy_note: accuracy_note(),
        },
    })
}

/// Tabs, fees, special-case scenarios and checklist items of the detail screen.
#[utoipa::path(
    get,
    path = "/catalog/guide",
    responses((status = 200, description = "Detail screen content", body = GuideResponse))
)]
pub async fn guide_handler() -> Json<GuideResponse> {
    Json(GuideResponse {
        data: GuideData {
            tabs: DetailTab::ORDER
                .into_iter()
                .map(|tab| TabView {
                    id: tab,
                    label: tab.label(),
                })
                .collect(),
            fees: STUDENT_VISA_FEES,
            special_cases: &SPECIAL_CASE_SCENARIOS,
            checklist: &CHECKLIST_ITEMS,
        },
    })
}

/// Derives the status and due-by label of every timeline step as of today.
#[utoipa::path(
    post,
    path = "/timeline",
    request_body = TimelineRequest,
    responses((status = 200, description = "Derived timeline", body = TimelineResponse))
)]
pub async fn derive_timeline_handler(Json(request): Json<TimelineRequest>) -> Json<TimelineResponse> {
    let entries = derive_timeline(
        &request.step_completion,
        &request.personalization,
        request.today.unwrap_or_else(|| Utc::now().date_naive()),
    );
    Json(TimelineResponse {
        data: TimelineData { entries },
    })
}

/// Saves a progress record, falling back to the local cache when the backend
/// is unavailable.
#[utoipa::path(
    post,
    path = "/progress",
    request_body(content = Object, description = "The progress record, keyed by email."),
    responses(
        (status = 200, description = "Progress saved", body = ProgressSavedResponse),
        (status = 400, description = "The record has no valid email"),
        (status = 503, description = "Neither the backend nor the local cache accepted the record")
    )
)]
pub async fn save_progress_handler(
    State(app_state): State<Arc<AppState>>,
    Json(record): Json<ProgressRecord>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if !is_valid_email(&record.email) {
        return Err((
            StatusCode::BAD_REQUEST,
            "A valid email is required".to_string(),
        ));
    }

    match app_state.progress.save(&record).await {
        Ok(outcome) => {
            info!(email = %record.email, source = ?outcome.source, "Progress saved");
            Ok(Json(ProgressSavedResponse {
                data: ProgressSavedData {
                    source: outcome.source,
                },
            }))
        }
        Err(e) => {
            error!("Failed to save progress: {:?}", e);
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                "Failed to save progress".to_string(),
            ))
        }
    }
}

/// Loads the progress record saved for an email.
#[utoipa::path(
    get,
    path = "/progress/{email}",
    params(("email" = String, Path, description = "The traveler's email")),
    responses(
        (status = 200, description = "Saved progress", body = ProgressResponse),
        (status = 404, description = "No progress saved for this email")
    )
)]
pub async fn load_progress_handler(
    State(app_state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<ProgressResponse>, (StatusCode, String)> {
    match app_state.progress.load(&email).await {
        Some(progress) => Ok(Json(ProgressResponse {
            data: ProgressData { progress },
        })),
        None => Err((
            StatusCode::NOT_FOUND,
            format!("No progress saved for {}", email),
        )),
    }
}
