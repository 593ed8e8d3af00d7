//! crates/visa_guide_core/src/validation.rs
//!
//! Form validation for the wizard screens. Each check reports inline errors
//! keyed by field so the client can show them next to the offending input.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

use crate::domain::{Personalization, UserContact};
use crate::error::ValidationErrors;
use crate::timeline::CONFIRMATION_DATE_FORMAT;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{7,15}$").expect("valid regex"));

pub const MSG_SELECT_BOTH: &str = "Please select both countries";
pub const MSG_SAME_COUNTRY: &str = "Origin and destination countries cannot be the same";
pub const MSG_NAME_REQUIRED: &str = "First name and last name are required";
pub const MSG_INVALID_EMAIL: &str = "Please enter a valid email address";
pub const MSG_INVALID_PHONE: &str = "Please enter a valid phone number";
pub const MSG_CONFIRMATION_DATE: &str = "Please enter the date you received your CAS (DD/MM/YYYY)";

pub fn is_valid_email(email: &str) -> bool {
    !email.is_empty() && EMAIL_RE.is_match(email)
}

/// Whitespace is ignored; 7 to 15 digits are accepted.
pub fn is_valid_phone(phone: &str) -> bool {
    let digits: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    PHONE_RE.is_match(&digits)
}

pub fn validate_country_selection(
    origin: Option<&str>,
    destination: Option<&str>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    match (origin.filter(|o| !o.is_empty()), destination.filter(|d| !d.is_empty())) {
        (Some(origin), Some(destination)) if origin == destination => {
            errors.push("countries", MSG_SAME_COUNTRY);
        }
        (Some(_), Some(_)) => {}
        _ => errors.push("countries", MSG_SELECT_BOTH),
    }
    errors.into_result()
}

pub fn validate_contact(contact: &UserContact) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if contact.first_name.trim().is_empty() || contact.last_name.trim().is_empty() {
        errors.push("name", MSG_NAME_REQUIRED);
    }
    if !is_valid_email(&contact.email) {
        errors.push("email", MSG_INVALID_EMAIL);
    }
    if !is_valid_phone(&contact.mobile) {
        errors.push("mobile", MSG_INVALID_PHONE);
    }
    errors.into_result()
}

/// A "yes" answer needs a well-formed `dd/mm/yyyy` date.
pub fn validate_personalization(personalization: &Personalization) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if personalization.has_confirmation_document {
        let parsed = personalization
            .confirmation_date
            .as_deref()
            .map(|d| NaiveDate::parse_from_str(d.trim(), CONFIRMATION_DATE_FORMAT));
        if !matches!(parsed, Some(Ok(_))) {
            errors.push("confirmationDate", MSG_CONFIRMATION_DATE);
        }
    }
    errors.into_result()
}

/// The detail screen's confirmation answer. "Yes" may arrive before the date
/// is typed in; only a date that is present and malformed is rejected.
pub fn validate_confirmation_update(
    personalization: &Personalization,
) -> Result<(), ValidationErrors> {
    if !personalization.confirmation_date_given() {
        return Ok(());
    }
    validate_personalization(personalization)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> UserContact {
        UserContact {
            first_name: "Asha".into(),
            last_name: "Rao".into(),
            email: "asha.rao@example.in".into(),
            mobile: "98765 43210".into(),
            dialing_code: "+91".into(),
        }
    }

    #[test]
    fn accepts_well_formed_emails() {
        for email in ["a@b.co", "first.last+tag@uni.ac.uk", "x@y.z"] {
            assert!(is_valid_email(email), "{email} should pass");
        }
    }

    #[test]
    fn rejects_emails_without_at_or_domain_dot() {
        for email in ["", "plainaddress", "user@domain", "user@@domain.com", "us er@domain.com", "@domain.com"] {
            assert!(!is_valid_email(email), "{email} should fail");
        }
    }

    #[test]
    fn phone_length_bounds_are_inclusive() {
        assert!(is_valid_phone("1234567"));
        assert!(is_valid_phone("123456789012345"));
        assert!(is_valid_phone("98 76 54 32 10"));
        assert!(!is_valid_phone("123456"));
        assert!(!is_valid_phone("1234567890123456"));
        assert!(!is_valid_phone("+919876543210"));
        assert!(!is_valid_phone("98765-43210"));
        assert!(!is_valid_phone(""));
    }

    #[test]
    fn country_selection_requires_two_distinct_countries() {
        assert!(validate_country_selection(Some("IN"), Some("GB")).is_ok());

        let missing = validate_country_selection(Some("IN"), None).unwrap_err();
        assert_eq!(missing.for_field("countries").unwrap().message, MSG_SELECT_BOTH);

        let empty = validate_country_selection(Some(""), Some("GB")).unwrap_err();
        assert_eq!(empty.for_field("countries").unwrap().message, MSG_SELECT_BOTH);

        let same = validate_country_selection(Some("GB"), Some("GB")).unwrap_err();
        assert_eq!(same.for_field("countries").unwrap().message, MSG_SAME_COUNTRY);
    }

    #[test]
    fn contact_errors_are_reported_per_field() {
        assert!(validate_contact(&contact()).is_ok());

        let mut bad = contact();
        bad.last_name = "   ".into();
        bad.email = "asha".into();
        bad.mobile = "12".into();
        let errors = validate_contact(&bad).unwrap_err();
        assert_eq!(errors.0.len(), 3);
        assert_eq!(errors.for_field("name").unwrap().message, MSG_NAME_REQUIRED);
        assert_eq!(errors.for_field("email").unwrap().message, MSG_INVALID_EMAIL);
        assert_eq!(errors.for_field("mobile").unwrap().message, MSG_INVALID_PHONE);
    }

    #[test]
    fn confirmation_date_is_required_only_when_received() {
        assert!(validate_personalization(&Personalization::not_received()).is_ok());
        assert!(validate_personalization(&Personalization::received_on("01/01/2025")).is_ok());

        let no_date = Personalization {
            has_confirmation_document: true,
            confirmation_date: None,
        };
        assert!(validate_personalization(&no_date).is_err());
        assert!(validate_personalization(&Personalization::received_on("2025-01-01")).is_err());
    }

    #[test]
    fn confirmation_update_accepts_a_pending_date() {
        let no_date = Personalization {
            has_confirmation_document: true,
            confirmation_date: None,
        };
        assert!(validate_confirmation_update(&no_date).is_ok());
        assert!(validate_confirmation_update(&Personalization::received_on("")).is_ok());
        assert!(validate_confirmation_update(&Personalization::received_on("01/01/2025")).is_ok());
        assert!(validate_confirmation_update(&Personalization::received_on("2025-01-01")).is_err());
    }
}
