//! crates/visa_guide_core/src/content.rs
//!
//! Static, developer-authored content for the India → United Kingdom student
//! route: the timeline step catalog, the checklist, the detail tabs, the fee
//! summary and the special-case scenarios.
//!
//! The HTML fragments are trusted build-time content and are rendered
//! verbatim by the client. Buttons that jump to another tab carry
//! `data-switch-tab` / `data-anchor` attributes which the client turns into a
//! `switch_tab` intent.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::timeline::StepId;

//=========================================================================================
// Timeline step catalog
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OfficialLink {
    pub title: &'static str,
    pub url: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
}

/// A read-only entry of the timeline catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineStepDefinition {
    pub id: StepId,
    pub title: &'static str,
    pub action_html: &'static str,
    pub documents_html: &'static str,
    pub links: &'static [OfficialLink],
}

const ACCURACY_NOTE: &str = r#"<div class="mt-4 p-3 bg-muted/50 border border-border rounded-lg"><p class="text-xs text-muted-foreground"><strong>Note:</strong> This content has been verified against official UK Government sources, but we cannot guarantee 100% accuracy. Please always cross-check with the official UK Government website before taking action.</p></div>"#;

static TIMELINE_STEPS: [TimelineStepDefinition; 7] = [
    TimelineStepDefinition {
        id: StepId::UnconditionalOffer,
        title: "Step 1: Conditional Offer Letter → Unconditional Offer Letter",
        action_html: r#"<div>
<h4>Converting to Unconditional Offer Letter <button data-switch-tab="overview" data-anchor="conditional-offer">ⓘ</button></h4>
<h4>How to Convert to Unconditional Offer Letter:</h4>
<ul>
<li>Once you meet all the conditions outlined in the <strong>Conditional Offer Letter</strong>, the university will convert your offer into an <strong>Unconditional Offer Letter</strong>.</li>
<li>The conversion to <strong>unconditional</strong> occurs after you submit proof (e.g., passing required exams or providing additional documentation).</li>
</ul>
<h4>Where to Submit Documents:</h4>
<ul>
<li><strong>Universities</strong> will typically request these documents via email or <strong>student portal</strong>.</li>
</ul>
</div>"#,
        documents_html: r#"<div>
<h4>Documents Required for the Unconditional Offer Letter:</h4>
<ul>
<li><strong>Proof of academic qualifications</strong> (degree certificates, transcripts).</li>
<li><strong>Proof of English language proficiency</strong> (IELTS, TOEFL).</li>
<li><strong>Passport copy</strong> (for identification).</li>
<li><strong>Reference letters</strong> (if required by the university).</li>
<li><strong>Financial Documents:</strong> proof of maintenance funds (bank statements, sponsor letters, tuition payment receipts).</li>
<li><strong>Other documents</strong> (e.g., medical reports, police clearance certificates) based on the university&apos;s requirements.</li>
</ul>
</div>"#,
        links: &[],
    },
    TimelineStepDefinition {
        id: StepId::Atas,
        title: "Step 2: ATAS Certificate (if required)",
        action_html: r#"<div>
<p><strong>Note:</strong> ATAS should be obtained <strong>after receiving the unconditional offer letter</strong> from the university, before submitting the visa application.</p>
<h4>Who Needs ATAS? <button data-switch-tab="overview" data-anchor="atas">ⓘ</button></h4>
<p>Postgraduate students (Masters or PhD) in sensitive subject areas such as advanced materials, aerospace engineering, nuclear materials, electronics, certain computer science specializations, military technology and physics.</p>
<h4>How and Where to Apply</h4>
<ol>
<li>Go to the <strong>official FCDO ATAS portal</strong>.</li>
<li>Complete the online form with your course details (CAH3 code from the university).</li>
<li>Submit and wait for the certificate, typically <strong>20 working days</strong>.</li>
</ol>
</div>"#,
        documents_html: r#"<div>
<h4>Documents Required for ATAS:</h4>
<ul>
<li><strong>Passport</strong> details.</li>
<li><strong>Unconditional offer letter</strong> with the course CAH3 code.</li>
<li><strong>Research proposal</strong> (for research degrees).</li>
<li><strong>Academic history</strong> and employment history for the last 5 years.</li>
</ul>
</div>"#,
        links: &[
            OfficialLink {
                title: "ATAS Application Portal",
                url: "https://www.academic-technology-approval.service.gov.uk/",
                description: None,
            },
            OfficialLink {
                title: "Academic Technology Approval Scheme",
                url: "https://www.gov.uk/academic-technology-approval-scheme",
                description: None,
            },
        ],
    },
    TimelineStepDefinition {
        id: StepId::TbTest,
        title: "Step 3: TB Test",
        action_html: r#"<div>
<h4>Who Needs a TB Test? <button data-switch-tab="overview" data-anchor="tb-test">ⓘ</button></h4>
<p>Applicants from India coming to the UK for <strong>more than 6 months</strong> must be tested for tuberculosis at a <strong>UKVI-approved clinic</strong>.</p>
<h4>How to Get Tested</h4>
<ol>
<li>Book an appointment at an approved clinic in India.</li>
<li>Attend the chest X-ray and medical examination.</li>
<li>Collect the <strong>TB certificate</strong>, valid for <strong>6 months</strong>.</li>
</ol>
</div>"#,
        documents_html: r#"<div>
<h4>Documents to Bring:</h4>
<ul>
<li><strong>Original passport</strong>.</li>
<li><strong>Passport-size photographs</strong>.</li>
<li><strong>Test fee</strong> payment.</li>
</ul>
</div>"#,
        links: &[OfficialLink {
            title: "Official link",
            url: "https://www.gov.uk/government/publications/tuberculosis-test-for-a-uk-visa-clinics-in-india/tuberculosis-testing-in-india",
            description: None,
        }],
    },
    TimelineStepDefinition {
        id: StepId::Cas,
        title: "Step 4: CAS (Confirmation of Acceptance for Studies)",
        action_html: r#"<div>
<h4>What is a CAS? <button data-switch-tab="overview" data-anchor="cas">ⓘ</button></h4>
<p>A <strong>CAS</strong> is an electronic reference number issued by your university once you hold an <strong>unconditional offer</strong> and have met its requirements (deposit, ATAS if required).</p>
<h4>How to Request It</h4>
<ul>
<li>Request the CAS through the <strong>university portal</strong> or admissions team.</li>
<li>Check every detail on the CAS statement; errors delay your application.</li>
</ul>
</div>"#,
        documents_html: r#"<div>
<h4>Documents Typically Requested Before CAS:</h4>
<ul>
<li><strong>Tuition deposit</strong> receipt.</li>
<li><strong>Passport</strong> copy.</li>
<li><strong>ATAS certificate</strong> (if required).</li>
<li><strong>Financial evidence</strong> per the university&apos;s credibility checks.</li>
</ul>
</div>"#,
        links: &[],
    },
    TimelineStepDefinition {
        id: StepId::VisaApplication,
        title: "Step 5: Apply Online for Your UK Student Visa",
        action_html: r#"<div>
<h4>Before You Apply <button data-switch-tab="eligibility" data-anchor="Finance">ⓘ</button></h4>
<ul>
<li>Apply up to <strong>6 months before</strong> your course starts.</li>
<li>Pay the <strong>visa fee</strong> and the <strong>Immigration Health Surcharge</strong>.</li>
<li>Verify your identity with the <strong>UK Immigration: ID Check</strong> app or at a <strong>VFS</strong> centre.</li>
</ul>
<h4>Funds <button data-switch-tab="eligibility" data-anchor="edu">ⓘ</button></h4>
<p>Show maintenance funds held for <strong>28 consecutive days</strong>, ending no more than 31 days before you apply.</p>
</div>"#,
        documents_html: r#"<div>
<h4>Documents You Must Provide:</h4>
<ul>
<li><strong>Current passport</strong>.</li>
<li><strong>CAS reference number</strong>.</li>
<li><strong>Proof of funds</strong> (bank statements or loan letter).</li>
<li><strong>TB certificate</strong> and <strong>ATAS certificate</strong> (if required).</li>
<li><strong>Parental consent</strong> if you are under 18.</li>
</ul>
</div>"#,
        links: &[
            OfficialLink {
                title: "Guide to Setting Up Your UKVI Account (PDF)",
                url: "https://www.swansea.ac.uk/media/e-Visas-step-by-step-guide.pdf",
                description: Some("Download: Guide to Setting Up Your UKVI Account (PDF)"),
            },
            OfficialLink {
                title: "Official UK Gov - Documents You Must Provide",
                url: "https://www.gov.uk/student-visa/documents-you-must-provide",
                description: None,
            },
            OfficialLink {
                title: "VFS Global UK Visa Centres",
                url: "https://www.vfsglobal.com/en/individuals/index.html",
                description: None,
            },
        ],
    },
    TimelineStepDefinition {
        id: StepId::ProcessingWait,
        title: "Step 6: Processing & Wait Period",
        action_html: r#"<div>
<p><strong>Goal:</strong> Understand processing timelines and stay informed about your application status.</p>
<ul>
<li><strong>From India:</strong> Typically <strong>3-6 weeks</strong> for standard service.</li>
<li>Priority services may shorten the wait where available.</li>
<li>Use your <strong>application reference number</strong> to track status online.</li>
</ul>
</div>"#,
        documents_html: r#"<div>
<ul>
<li>Keep copies of everything you submitted.</li>
<li>Respond promptly if UKVI asks for an <strong>interview</strong> or extra documents.</li>
</ul>
</div>"#,
        links: &[],
    },
    TimelineStepDefinition {
        id: StepId::DecisionVisaIssuance,
        title: "Step 7: Decision & Visa Issuance",
        action_html: r#"<div>
<h4>After the Decision</h4>
<ul>
<li>You will receive the decision by email.</li>
<li>Set up your <strong>UKVI account</strong> to access your <strong>eVisa</strong>.</li>
<li>The eVisa shows your <strong>immigration status</strong> and right to study in the UK.</li>
<li>Book travel on or after your visa start date and no more than one month before your course starts.</li>
</ul>
</div>"#,
        documents_html: r#"<div>
<ul>
<li><strong>Decision letter</strong>.</li>
<li><strong>UKVI account</strong> credentials and eVisa share code.</li>
</ul>
</div>"#,
        links: &[OfficialLink {
            title: "Setup your UKVI account",
            url: "https://www.gov.uk/get-access-evisa",
            description: None,
        }],
    },
];

/// The seven timeline steps in display order.
pub fn timeline_steps() -> &'static [TimelineStepDefinition] {
    &TIMELINE_STEPS
}

pub fn step_definition(id: StepId) -> Option<&'static TimelineStepDefinition> {
    TIMELINE_STEPS.iter().find(|def| def.id == id)
}

/// The disclaimer appended below every documents block.
pub fn accuracy_note() -> &'static str {
    ACCURACY_NOTE
}

//=========================================================================================
// Checklist
//=========================================================================================

pub const CHECKLIST_ITEMS: [&str; 11] = [
    "Got Unconditional Offer and CAS issued",
    "ATAS obtained (if required)",
    "TB certificate obtained (if required)",
    "Financial evidence prepared (maintenance + tuition shortfall; correct format/recency)",
    "Online application submitted (Student visa, outside UK)",
    "Visa fee £524 + IHS £776/year paid",
    "Identity verified (ID Check app or VFS biometrics)",
    "All documents uploaded / VFS scanning done",
    "Interview attended (only if UKVI asks)",
    "Decision received; UKVI account set up; eVisa accessible",
    "Travel booked (on/after visa start; ≤1 month before course start)",
];

//=========================================================================================
// Detail tabs
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetailTab {
    Overview,
    Eligibility,
    Fees,
    Process,
    SpecialCases,
}

impl DetailTab {
    pub const ORDER: [DetailTab; 5] = [
        DetailTab::Overview,
        DetailTab::Eligibility,
        DetailTab::Fees,
        DetailTab::Process,
        DetailTab::SpecialCases,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Eligibility => "eligibility",
            Self::Fees => "fees",
            Self::Process => "process",
            Self::SpecialCases => "special-cases",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Overview => "Info & Guide",
            Self::Eligibility => "Eligibility",
            Self::Fees => "Fees",
            Self::Process => "Process",
            Self::SpecialCases => "Special Cases",
        }
    }

    /// Reaching the last tab unlocks the checklist export.
    pub fn is_last(self) -> bool {
        self == Self::SpecialCases
    }
}

impl fmt::Display for DetailTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetailTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DetailTab::ORDER
            .into_iter()
            .find(|tab| tab.as_str() == s)
            .ok_or_else(|| format!("unknown tab '{s}'"))
    }
}

//=========================================================================================
// Fees
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSummary {
    pub visa_fee: &'static str,
    pub ihs_fee: &'static str,
    pub maintenance_london: &'static str,
    pub maintenance_outside_london: &'static str,
    pub maintenance_max_months: u8,
}

pub const STUDENT_VISA_FEES: FeeSummary = FeeSummary {
    visa_fee: "£524",
    ihs_fee: "£776 per year",
    maintenance_london: "£1,483 / month",
    maintenance_outside_london: "£1,136 / month",
    maintenance_max_months: 9,
};

//=========================================================================================
// Special-case scenarios
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scenario {
    pub text: &'static str,
    pub documents: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScenarioCategory {
    pub category: &'static str,
    pub items: &'static [Scenario],
}

pub static SPECIAL_CASE_SCENARIOS: [ScenarioCategory; 5] = [
    ScenarioCategory {
        category: "Academic Background Verification",
        items: &[
            Scenario {
                text: "Gap in education: Letter explaining academic or employment gaps longer than 6 months",
                documents: &["Gap explanation letter", "Employment certificates for gap periods", "Affidavit explaining gap reasons"],
            },
            Scenario {
                text: "Multiple degrees: All academic transcripts and degree certificates",
                documents: &["All degree certificates", "Complete academic transcripts", "University verification letters"],
            },
            Scenario {
                text: "Institution not recognized: Additional verification from educational authorities",
                documents: &["Educational board verification", "Institution accreditation proof", "Equivalency certificates"],
            },
            Scenario {
                text: "Grade conversion: Official grade conversion scale if your institution uses a different grading system",
                documents: &["Official grade conversion scale", "University grading system documentation", "Academic equivalency certificate"],
            },
        ],
    },
    ScenarioCategory {
        category: "Financial Complexity",
        items: &[
            Scenario {
                text: "Multiple funding sources: Detailed breakdown of how funds are allocated",
                documents: &["Detailed fund allocation breakdown", "Multiple bank statements", "Source of funds declaration"],
            },
            Scenario {
                text: "Sponsorship from organization: Official sponsorship letter with contact verification",
                documents: &["Official sponsorship letter", "Organization registration documents", "Sponsor's financial proof"],
            },
            Scenario {
                text: "Education loan: Loan sanction letter with disbursement schedule",
                documents: &["Loan sanction letter", "Disbursement schedule", "Bank loan agreement", "Collateral documents"],
            },
            Scenario {
                text: "Scholarship funding: Official scholarship award letter and payment confirmation",
                documents: &["Scholarship award letter", "Scholarship payment confirmation", "Scholarship terms and conditions"],
            },
            Scenario {
                text: "Joint account holders: Relationship proof and consent letter from account holders",
                documents: &["Joint account holder consent letters", "Relationship proof documents", "Account holder ID proofs"],
            },
        ],
    },
    ScenarioCategory {
        category: "Personal Circumstances",
        items: &[
            Scenario {
                text: "Previous visa refusals: Detailed explanation letter addressing previous refusal reasons",
                documents: &["Visa refusal explanation letter", "Previous refusal documentation", "Improved circumstances proof"],
            },
            Scenario {
                text: "Name discrepancies: Legal name change documents or affidavit",
                documents: &["Name change certificate", "Gazette notification", "Legal affidavit for name discrepancy"],
            },
            Scenario {
                text: "Medical conditions: Medical clearance if condition affects studies",
                documents: &["Medical clearance certificate", "Doctor's fitness letter", "Medical treatment records"],
            },
            Scenario {
                text: "Criminal history: Police clearance certificate and court documents (if applicable)",
                documents: &["Police clearance certificate", "Court documents", "Character certificate"],
            },
            Scenario {
                text: "Military service: Military service records or exemption certificate",
                documents: &["Military service certificate", "Military exemption certificate", "Service discharge papers"],
            },
        ],
    },
    ScenarioCategory {
        category: "Course-Specific Requirements",
        items: &[
            Scenario {
                text: "Research-based programs: Detailed research proposal and supervisor confirmation",
                documents: &["Detailed research proposal", "Supervisor confirmation letter", "Research methodology documentation"],
            },
            Scenario {
                text: "Professional courses: Relevant work experience certificates",
                documents: &["Work experience certificates", "Professional qualification certificates", "Industry training certificates"],
            },
            Scenario {
                text: "Creative fields: Portfolio submission or creative work samples",
                documents: &["Creative portfolio", "Work samples documentation", "Creative project certificates"],
            },
            Scenario {
                text: "Healthcare programs: Additional health screening or immunization records",
                documents: &["Health screening reports", "Immunization records", "Medical fitness certificate"],
            },
            Scenario {
                text: "STEM subjects requiring ATAS: Complete research methodology and equipment details",
                documents: &["Research methodology details", "Equipment usage documentation", "ATAS certificate", "Research collaboration letters"],
            },
        ],
    },
    ScenarioCategory {
        category: "Travel History Considerations",
        items: &[
            Scenario {
                text: "Extensive travel history: Detailed travel timeline with purpose explanation",
                documents: &["Travel history documentation", "Travel purpose letters", "Previous visa copies"],
            },
            Scenario {
                text: "Visits to high-risk countries: Additional security screening documentation",
                documents: &["Security clearance documents", "Travel purpose justification", "Host country documentation"],
            },
            Scenario {
                text: "Long-term stays abroad: Proof of legal status during extended stays",
                documents: &["Legal status proof abroad", "Residence permits", "Employment authorization documents"],
            },
            Scenario {
                text: "Frequent visa applications: Pattern explanation and purpose justification",
                documents: &["Application pattern explanation", "Travel justification letters", "Previous successful visa documentation"],
            },
        ],
    },
];

pub fn find_scenario(text: &str) -> Option<&'static Scenario> {
    SPECIAL_CASE_SCENARIOS
        .iter()
        .flat_map(|category| category.items.iter())
        .find(|scenario| scenario.text == text)
}
