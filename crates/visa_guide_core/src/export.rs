//! crates/visa_guide_core/src/export.rs
//!
//! Assembles the personalized checklist document from the current checklist,
//! the applicant's details and the step catalog. Rendering to a paged format
//! is left to the client; `render_text` produces the plain-text form.

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::checklist::{step_for_checklist_index, ChecklistState};
use crate::content::step_definition;
use crate::domain::{Personalization, UserContact};

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

pub const EXPORT_TITLE: &str = "UK STUDENT VISA - PERSONALIZED CHECKLIST";

/// Documents contributed by a selected special-case scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdditionalDocuments {
    pub scenario: String,
    pub documents: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSection {
    pub heading: String,
    pub lines: Vec<String>,
}

impl ExportSection {
    fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            lines: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistExport {
    pub filename: String,
    pub title: String,
    pub sections: Vec<ExportSection>,
}

/// Everything the export reads.
pub struct ExportInput<'a> {
    pub contact: Option<&'a UserContact>,
    pub personalization: &'a Personalization,
    pub checklist: &'a ChecklistState,
    pub additional_documents: &'a [AdditionalDocuments],
    pub generated_on: NaiveDate,
}

pub fn export_filename(generated_on: NaiveDate) -> String {
    format!(
        "uk-student-visa-personalized-checklist-{}.txt",
        generated_on.format("%Y-%m-%d")
    )
}

/// Drops markup and decodes the handful of entities the catalog uses.
pub fn strip_html(html: &str) -> String {
    let text = TAG_RE.replace_all(html, "");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&apos;", "'")
        .replace("&amp;", "&");
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn applicant_section(input: &ExportInput<'_>) -> Option<ExportSection> {
    let contact = input.contact?;
    let mut section = ExportSection::new("Applicant Information");
    section.lines.push(format!("Name: {}", contact.full_name()));
    if !contact.email.is_empty() {
        section.lines.push(format!("Email: {}", contact.email));
    }
    if !contact.mobile.is_empty() {
        section
            .lines
            .push(format!("Mobile/WhatsApp: {} {}", contact.dialing_code, contact.mobile));
    }
    let p = input.personalization;
    section.lines.push(format!(
        "CAS/Unconditional offer received: {}",
        if p.has_confirmation_document { "Yes" } else { "No" }
    ));
    if let Some(date) = p.confirmation_date.as_deref() {
        section.lines.push(format!("Date received: {date}"));
    }
    Some(section)
}

fn remaining_section(checklist: &ChecklistState) -> ExportSection {
    let mut section = ExportSection::new("REMAINING TASKS - DETAILED INSTRUCTIONS");
    let remaining: Vec<(usize, &str)> = checklist
        .items()
        .filter(|(_, _, checked)| !checked)
        .map(|(index, text, _)| (index, text))
        .collect();

    if remaining.is_empty() {
        section
            .lines
            .push("CONGRATULATIONS! All checklist items have been completed.".to_string());
        return section;
    }

    section
        .lines
        .push(format!("You have {} remaining tasks to complete:", remaining.len()));
    for (position, (index, text)) in remaining.into_iter().enumerate() {
        section.lines.push(format!("{}. [ ] {}", position + 1, text));
        let Some(def) = step_for_checklist_index(index).and_then(step_definition) else {
            continue;
        };
        section.lines.push(format!("    Step: {}", def.title));
        for line in strip_html(def.action_html).lines() {
            section.lines.push(format!("    {line}"));
        }
        let documents = strip_html(def.documents_html);
        if !documents.is_empty() {
            section.lines.push("    Required documents:".to_string());
            for line in documents.lines() {
                section.lines.push(format!("    {line}"));
            }
        }
        if !def.links.is_empty() {
            section.lines.push("    Official links:".to_string());
            for link in def.links {
                section.lines.push(format!("    - {}: {}", link.title, link.url));
            }
        }
    }
    section
}

pub fn assemble(input: &ExportInput<'_>) -> ChecklistExport {
    let mut sections = Vec::new();
    sections.extend(applicant_section(input));
    sections.push(remaining_section(input.checklist));

    if input.checklist.checked_count() > 0 {
        let mut completed = ExportSection::new("COMPLETED TASKS");
        completed.lines.extend(
            input
                .checklist
                .items()
                .filter(|(_, _, checked)| *checked)
                .map(|(_, text, _)| format!("[x] {text}")),
        );
        sections.push(completed);
    }

    if !input.additional_documents.is_empty() {
        let mut extra = ExportSection::new("ADDITIONAL DOCUMENTS FOR YOUR SITUATION");
        for group in input.additional_documents {
            extra.lines.push(group.scenario.clone());
            extra
                .lines
                .extend(group.documents.iter().map(|doc| format!("    - {doc}")));
        }
        sections.push(extra);
    }

    let mut quick = ExportSection::new("QUICK REFERENCE CHECKLIST");
    quick.lines.extend(input.checklist.items().map(|(_, text, checked)| {
        format!("{} {}", if checked { "[x]" } else { "[ ]" }, text)
    }));
    sections.push(quick);

    let mut footer = ExportSection::new("---");
    footer
        .lines
        .push("Generated by VisaMonk - Your UK Student Visa Guide".to_string());
    footer
        .lines
        .push(format!("Date: {}", input.generated_on.format("%d/%m/%Y")));
    sections.push(footer);

    ChecklistExport {
        filename: export_filename(input.generated_on),
        title: EXPORT_TITLE.to_string(),
        sections,
    }
}

impl ChecklistExport {
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push_str("\n\n");
        for section in &self.sections {
            out.push_str(&section.heading);
            out.push('\n');
            for line in &section.lines {
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(
        checklist: &'a ChecklistState,
        personalization: &'a Personalization,
        extra: &'a [AdditionalDocuments],
    ) -> ExportInput<'a> {
        ExportInput {
            contact: None,
            personalization,
            checklist,
            additional_documents: extra,
            generated_on: NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
        }
    }

    #[test]
    fn filename_carries_the_generation_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(
            export_filename(date),
            "uk-student-visa-personalized-checklist-2025-03-09.txt"
        );
    }

    #[test]
    fn html_is_stripped_and_entities_decoded() {
        let text = strip_html("<div>\n  <p>Fish &amp; chips&nbsp;&lt;3</p>\n\n <b>ok</b></div>");
        assert_eq!(text, "Fish & chips <3\nok");
    }

    #[test]
    fn remaining_tasks_carry_step_instructions() {
        let mut checklist = ChecklistState::new();
        checklist.set(0, true).unwrap();
        let p = Personalization::not_received();
        let doc = assemble(&input(&checklist, &p, &[]));

        let remaining = &doc.sections[0];
        assert_eq!(remaining.lines[0], "You have 10 remaining tasks to complete:");
        assert!(remaining.lines.iter().any(|l| l.contains("Step 2: ATAS Certificate")));
        assert!(remaining
            .lines
            .iter()
            .any(|l| l.contains("https://www.academic-technology-approval.service.gov.uk/")));
        assert!(doc.sections.iter().any(|s| s.heading == "COMPLETED TASKS"));
    }

    #[test]
    fn fully_checked_list_congratulates() {
        let mut checklist = ChecklistState::new();
        for i in 0..11 {
            checklist.set(i, true).unwrap();
        }
        let p = Personalization::not_received();
        let doc = assemble(&input(&checklist, &p, &[]));
        assert!(doc.sections[0].lines[0].starts_with("CONGRATULATIONS"));
    }

    #[test]
    fn scenario_documents_get_their_own_section() {
        let checklist = ChecklistState::new();
        let p = Personalization::not_received();
        let extra = vec![AdditionalDocuments {
            scenario: "Education loan".into(),
            documents: vec!["Loan sanction letter".into()],
        }];
        let text = assemble(&input(&checklist, &p, &extra)).render_text();
        assert!(text.contains("ADDITIONAL DOCUMENTS FOR YOUR SITUATION"));
        assert!(text.contains("    - Loan sanction letter"));
        assert!(text.starts_with(EXPORT_TITLE));
    }
}
