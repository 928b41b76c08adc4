//! Field validation rules of the lead form.
//!
//! The site evaluates these; the suite only observes their results. They are
//! written down here so the simulated site enforces the same contract and
//! fixture data can be checked against it.

use super::field::FieldGroup;
use super::phone::{phone_digits, PHONE_DIGITS};
use super::step::ErrorKind;

/// Result of applying a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Input accepted
    Accept,
    /// Input rejected
    Reject(ErrorKind),
}

impl Validation {
    /// Whether the input was accepted
    #[must_use]
    pub const fn is_accept(self) -> bool {
        matches!(self, Self::Accept)
    }
}

/// Digits a ZIP code must have
pub const ZIP_LENGTH: usize = 5;

/// ZIP code: exactly five digits
#[must_use]
pub fn zip_rule(input: &str) -> Validation {
    let zip = input.trim();
    if zip.is_empty() {
        Validation::Reject(ErrorKind::MissingRequiredField)
    } else if !zip.chars().all(|c| c.is_ascii_digit()) {
        Validation::Reject(ErrorKind::FormatInvalid)
    } else if zip.len() != ZIP_LENGTH {
        Validation::Reject(ErrorKind::OutOfRangeLength)
    } else {
        Validation::Accept
    }
}

/// Name: letters only, at least first and last name
#[must_use]
pub fn name_rule(input: &str) -> Validation {
    let name = input.trim();
    if name.is_empty() {
        return Validation::Reject(ErrorKind::MissingRequiredField);
    }
    let allowed = |c: char| c.is_alphabetic() || c.is_whitespace() || c == '-' || c == '\'';
    if !name.chars().all(allowed) {
        return Validation::Reject(ErrorKind::FormatInvalid);
    }
    if name.split_whitespace().count() < 2 {
        return Validation::Reject(ErrorKind::MustSpecifyFullName);
    }
    Validation::Accept
}

/// Email: `local@domain.tld`
#[must_use]
pub fn email_rule(input: &str) -> Validation {
    let email = input.trim();
    if email.is_empty() {
        return Validation::Reject(ErrorKind::MissingRequiredField);
    }
    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.contains('@')
            && !email.contains(char::is_whitespace)
            && domain
                .rsplit_once('.')
                .is_some_and(|(host, tld)| !host.is_empty() && tld.len() >= 2)
    });
    if valid {
        Validation::Accept
    } else {
        Validation::Reject(ErrorKind::FormatInvalid)
    }
}

/// Phone: ten digits after masking (extra digits are dropped by the mask)
#[must_use]
pub fn phone_rule(input: &str) -> Validation {
    match phone_digits(input).len() {
        0 => Validation::Reject(ErrorKind::MissingRequiredField),
        n if n < PHONE_DIGITS => Validation::Reject(ErrorKind::OutOfRangeLength),
        _ => Validation::Accept,
    }
}

/// Option groups: at least one selected
#[must_use]
pub const fn selection_rule(selected: usize) -> Validation {
    if selected == 0 {
        Validation::Reject(ErrorKind::NoOptionSelected)
    } else {
        Validation::Accept
    }
}

/// Apply the text rule of a group; option groups take a selection count
#[must_use]
pub fn text_rule(group: FieldGroup, input: &str) -> Option<Validation> {
    match group {
        FieldGroup::Zip => Some(zip_rule(input)),
        FieldGroup::Name => Some(name_rule(input)),
        FieldGroup::Email => Some(email_rule(input)),
        FieldGroup::Phone => Some(phone_rule(input)),
        FieldGroup::Interests | FieldGroup::PropertyType => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_boundaries() {
        assert_eq!(zip_rule("48104"), Validation::Accept);
        assert_eq!(
            zip_rule("1234"),
            Validation::Reject(ErrorKind::OutOfRangeLength)
        );
        assert_eq!(
            zip_rule("123456"),
            Validation::Reject(ErrorKind::OutOfRangeLength)
        );
        assert_eq!(zip_rule("48a04"), Validation::Reject(ErrorKind::FormatInvalid));
        assert_eq!(
            zip_rule("  "),
            Validation::Reject(ErrorKind::MissingRequiredField)
        );
    }

    #[test]
    fn test_name_cases() {
        assert_eq!(
            name_rule(""),
            Validation::Reject(ErrorKind::MissingRequiredField)
        );
        assert_eq!(
            name_rule("Joe"),
            Validation::Reject(ErrorKind::MustSpecifyFullName)
        );
        assert_eq!(name_rule("Joe Doe"), Validation::Accept);
        assert_eq!(name_rule("Joe Michael Doe"), Validation::Accept);
        assert_eq!(name_rule("Joe D0e"), Validation::Reject(ErrorKind::FormatInvalid));
        assert_eq!(name_rule("Mary-Jane O'Neil"), Validation::Accept);
    }

    #[test]
    fn test_email_cases() {
        assert!(email_rule("john.doe@example.com").is_accept());
        for bad in ["invalid.email.com", "invalid-email@", "invalid-email@domain", "a@@b.com"] {
            assert_eq!(
                email_rule(bad),
                Validation::Reject(ErrorKind::FormatInvalid),
                "{bad}"
            );
        }
        assert_eq!(
            email_rule(""),
            Validation::Reject(ErrorKind::MissingRequiredField)
        );
    }

    #[test]
    fn test_phone_cases() {
        assert!(phone_rule("5551234567").is_accept());
        assert!(phone_rule("55512345678").is_accept());
        assert!(phone_rule("(555)123-4567").is_accept());
        assert_eq!(
            phone_rule("555123456"),
            Validation::Reject(ErrorKind::OutOfRangeLength)
        );
        assert_eq!(
            phone_rule(""),
            Validation::Reject(ErrorKind::MissingRequiredField)
        );
    }

    #[test]
    fn test_selection() {
        assert_eq!(
            selection_rule(0),
            Validation::Reject(ErrorKind::NoOptionSelected)
        );
        assert!(selection_rule(1).is_accept());
        assert!(text_rule(FieldGroup::Interests, "").is_none());
        assert_eq!(text_rule(FieldGroup::Zip, "48104"), Some(Validation::Accept));
    }
}
