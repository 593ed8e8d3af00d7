//! crates/visa_guide_core/src/domain.rs
//!
//! Defines the value records that flow between the wizard, the timeline
//! deriver and the persistence gateway. The serialized field names match the
//! backend's JSON documents.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::timeline::CONFIRMATION_DATE_FORMAT;

/// User-asserted completion per timeline step id.
pub type StepCompletionMap = BTreeMap<String, bool>;

/// A country as served by the backend's country catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub flag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_origin_country: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_destination_country: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialing_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingTime {
    pub min: u32,
    pub max: u32,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub amount: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisaFees {
    pub visa_fee: Money,
}

/// Which personal documents a visa type asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisaRequirementFlags {
    pub cas_required: bool,
    pub atas_required: bool,
    pub tb_test_required: bool,
}

/// The subset of a backend visa type document the wizard needs to render a
/// selection card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisaTypeSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<ProcessingTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees: Option<VisaFees>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personalization: Option<VisaRequirementFlags>,
}

/// Contact details captured on the country selection screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile: String,
    #[serde(default = "default_dialing_code")]
    pub dialing_code: String,
}

fn default_dialing_code() -> String {
    "+91".to_string()
}

impl UserContact {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

/// Whether the traveler already holds their confirmation of acceptance, and
/// the `dd/mm/yyyy` date it was issued.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Personalization {
    #[serde(rename = "hasCAS")]
    pub has_confirmation_document: bool,
    #[serde(rename = "casDate", default, skip_serializing_if = "Option::is_none")]
    pub confirmation_date: Option<String>,
}

impl Personalization {
    pub fn not_received() -> Self {
        Self::default()
    }

    pub fn received_on(date: impl Into<String>) -> Self {
        Self {
            has_confirmation_document: true,
            confirmation_date: Some(date.into()),
        }
    }

    /// True only when the document is held *and* a non-blank date was supplied.
    pub fn is_confirmed(&self) -> bool {
        self.has_confirmation_document && self.confirmation_date_given()
    }

    pub fn confirmation_date_given(&self) -> bool {
        self.confirmation_date
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty())
    }

    /// The parsed confirmation date, if present and well formed.
    pub fn confirmed_on(&self) -> Option<NaiveDate> {
        if !self.has_confirmation_document {
            return None;
        }
        self.confirmation_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), CONFIRMATION_DATE_FORMAT).ok())
    }
}

/// Accumulated wizard selections.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowState {
    pub origin_country: Option<String>,
    pub destination_country: Option<String>,
    pub traveler_type: Option<String>,
    pub visa_type: Option<String>,
}

/// The persisted progress document, keyed by email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub email: String,
    pub origin_country: String,
    pub destination_country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visa_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personalization_data: Option<Personalization>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklist: Option<BTreeMap<String, bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_completion: Option<StepCompletionMap>,
    #[serde(default)]
    pub timestamps: BTreeMap<String, DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl ProgressRecord {
    pub fn new(
        email: impl Into<String>,
        origin_country: impl Into<String>,
        destination_country: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            origin_country: origin_country.into(),
            destination_country: destination_country.into(),
            user_type: None,
            visa_type: None,
            personalization_data: None,
            checklist: None,
            step_completion: None,
            timestamps: BTreeMap::new(),
            last_updated: None,
        }
    }

    pub fn with_timestamp(mut self, milestone: &str, at: DateTime<Utc>) -> Self {
        self.timestamps.insert(milestone.to_string(), at);
        self
    }
}
