//! crates/visa_guide_core/src/catalog.rs
//!
//! Built-in catalog data: the traveler categories offered on step 2, the
//! fallback datasets substituted when the backend is unreachable, and the
//! country display names used by the placeholder screen.

use serde::Serialize;

use crate::domain::{Country, Money, ProcessingTime, VisaFees, VisaRequirementFlags, VisaTypeSummary};

/// The only route with a full detail experience.
pub const SUPPORTED_ROUTE: (&str, &str) = ("IN", "GB");

pub fn is_supported_route(origin: &str, destination: &str) -> bool {
    (origin, destination) == SUPPORTED_ROUTE
}

//=========================================================================================
// Icons
//=========================================================================================

/// Icons the client knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Icon {
    GraduationCap,
    Briefcase,
    Camera,
}

//=========================================================================================
// Traveler types
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TravelerKind {
    Student,
    Worker,
    Visitor,
}

impl TravelerKind {
    pub const ALL: [TravelerKind; 3] = [Self::Student, Self::Worker, Self::Visitor];

    pub fn id(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Worker => "worker",
            Self::Visitor => "visitor",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Worker => "Worker",
            Self::Visitor => "Visitor",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Student => "Study at universities, colleges, or educational institutions",
            Self::Worker => "Work temporarily or permanently with valid job offers",
            Self::Visitor => "Tourism, business meetings, or visiting family and friends",
        }
    }

    pub fn icon(self) -> Icon {
        match self {
            Self::Student => Icon::GraduationCap,
            Self::Worker => Icon::Briefcase,
            Self::Visitor => Icon::Camera,
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }
}

/// A traveler category as presented on the selection screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TravelerTypeOption {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: Icon,
}

impl From<TravelerKind> for TravelerTypeOption {
    fn from(kind: TravelerKind) -> Self {
        Self {
            id: kind.id(),
            name: kind.name(),
            description: kind.description(),
            icon: kind.icon(),
        }
    }
}

pub fn traveler_types() -> Vec<TravelerTypeOption> {
    TravelerKind::ALL.into_iter().map(Into::into).collect()
}

/// Pre-selected on the traveler type screen.
pub const DEFAULT_TRAVELER_TYPE: TravelerKind = TravelerKind::Student;

//=========================================================================================
// Fallback datasets
//=========================================================================================

fn country(code: &str, name: &str, flag: &str, origin: bool) -> Country {
    Country {
        code: code.to_string(),
        name: name.to_string(),
        flag: flag.to_string(),
        is_origin_country: origin.then_some(true),
        is_destination_country: (!origin).then_some(true),
        dialing_code: None,
    }
}

pub fn fallback_origin_countries() -> Vec<Country> {
    vec![
        country("IN", "India", "🇮🇳", true),
        country("NG", "Nigeria", "🇳🇬", true),
    ]
}

pub fn fallback_destination_countries() -> Vec<Country> {
    vec![
        country("GB", "United Kingdom", "🇬🇧", false),
        country("US", "United States", "🇺🇸", false),
        country("CA", "Canada", "🇨🇦", false),
        country("AU", "Australia", "🇦🇺", false),
    ]
}

struct FallbackVisa {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: &'static str,
    processing_weeks: (u32, u32),
    fee_gbp: f64,
}

const FALLBACK_STUDENT_VISAS: [FallbackVisa; 4] = [
    FallbackVisa {
        id: "student-visa",
        name: "Student visa",
        description: "For full-time study at a licensed UK student sponsor institution",
        category: "Long-term study",
        processing_weeks: (3, 6),
        fee_gbp: 524.0,
    },
    FallbackVisa {
        id: "child-student-visa",
        name: "Child Student visa",
        description: "For children aged 4-17 studying at independent schools",
        category: "Child education",
        processing_weeks: (3, 6),
        fee_gbp: 524.0,
    },
    FallbackVisa {
        id: "short-term-study",
        name: "Short-term study visa",
        description: "English language courses lasting 6-11 months",
        category: "Language study",
        processing_weeks: (3, 3),
        fee_gbp: 200.0,
    },
    FallbackVisa {
        id: "standard-visitor-study",
        name: "Standard Visitor (study)",
        description: "Short courses up to 6 months without visa requirement",
        category: "Short courses",
        processing_weeks: (3, 3),
        fee_gbp: 115.0,
    },
];

/// The student visa types shown when the backend has none or is down.
pub fn fallback_visa_types() -> Vec<VisaTypeSummary> {
    FALLBACK_STUDENT_VISAS
        .iter()
        .map(|visa| VisaTypeSummary {
            id: visa.id.to_string(),
            name: visa.name.to_string(),
            code: visa.id.to_string(),
            category: visa.category.to_string(),
            description: visa.description.to_string(),
            processing_time: Some(ProcessingTime {
                min: visa.processing_weeks.0,
                max: visa.processing_weeks.1,
                unit: "weeks".to_string(),
            }),
            fees: Some(VisaFees {
                visa_fee: Money {
                    amount: visa.fee_gbp,
                    currency: "GBP".to_string(),
                },
            }),
            personalization: Some(VisaRequirementFlags {
                cas_required: visa.id == "student-visa",
                atas_required: false,
                tb_test_required: false,
            }),
        })
        .collect()
}

//=========================================================================================
// Display names
//=========================================================================================

const COUNTRY_NAMES: [(&str, &str); 36] = [
    ("IN", "India"),
    ("GB", "United Kingdom"),
    ("US", "United States"),
    ("CA", "Canada"),
    ("AU", "Australia"),
    ("DE", "Germany"),
    ("FR", "France"),
    ("NL", "Netherlands"),
    ("SG", "Singapore"),
    ("NZ", "New Zealand"),
    ("IE", "Ireland"),
    ("IT", "Italy"),
    ("ES", "Spain"),
    ("SE", "Sweden"),
    ("NO", "Norway"),
    ("DK", "Denmark"),
    ("FI", "Finland"),
    ("CH", "Switzerland"),
    ("AT", "Austria"),
    ("BE", "Belgium"),
    ("JP", "Japan"),
    ("KR", "South Korea"),
    ("HK", "Hong Kong"),
    ("MY", "Malaysia"),
    ("BD", "Bangladesh"),
    ("PK", "Pakistan"),
    ("LK", "Sri Lanka"),
    ("NP", "Nepal"),
    ("AE", "United Arab Emirates"),
    ("SA", "Saudi Arabia"),
    ("QA", "Qatar"),
    ("NG", "Nigeria"),
    ("KE", "Kenya"),
    ("GH", "Ghana"),
    ("ZA", "South Africa"),
    ("BR", "Brazil"),
];

/// The display name for a country code; unknown codes are echoed back.
pub fn country_name(code: &str) -> String {
    COUNTRY_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| code.to_string())
}
