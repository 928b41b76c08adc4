//! Equivalence-class fixture data
//!
//! [`TestData`] is an immutable value built once per run and handed to
//! scenarios explicitly. Every field has a covering set of valid, boundary
//! and format-violation inputs; each case carries its expected outcome and a
//! status saying whether the site is currently expected to honor it.

use serde::{Deserialize, Serialize};

use crate::form::{ErrorKind, FieldGroup, FieldId, FieldInput, FormStep, Interest, Outcome, PropertyOption};

/// Canonical valid values used to fast-forward through steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidData {
    /// ZIP code
    pub zip: String,
    /// Interests to tick
    pub interests: Vec<Interest>,
    /// Property type to pick
    pub property_type: PropertyOption,
    /// Full name
    pub name: String,
    /// Email
    pub email: String,
    /// Phone digits
    pub phone: String,
}

impl Default for ValidData {
    fn default() -> Self {
        Self {
            zip: "48104".to_string(),
            interests: Interest::ALL.to_vec(),
            property_type: PropertyOption::MobileHome,
            name: "John Doe".to_string(),
            email: "john.doe@example.com".to_string(),
            phone: "5551234567".to_string(),
        }
    }
}

/// Equivalence class a case belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseTag {
    /// Accepted value (including exact boundaries)
    Valid,
    /// Empty input
    Missing,
    /// One below the accepted length
    BelowBoundary,
    /// One above the accepted length
    AboveBoundary,
    /// Disallowed characters or shape
    FormatViolation,
}

/// Whether a case gates the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseStatus {
    /// The site is expected to behave as the case says
    Enforced,
    /// The site is known to get this wrong; run and report, do not gate
    KnownDefect(String),
    /// Expected behavior is in dispute; run and report, do not gate
    Disputed(String),
    /// Behavior not yet pinned down; reported as skipped
    Pending(String),
}

impl CaseStatus {
    /// Whether a failure fails the run
    #[must_use]
    pub const fn is_gating(&self) -> bool {
        matches!(self, Self::Enforced)
    }

    /// Whether the case runs at all
    #[must_use]
    pub const fn is_runnable(&self) -> bool {
        !matches!(self, Self::Pending(_))
    }

    /// Reason attached to non-enforced statuses
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Enforced => None,
            Self::KnownDefect(r) | Self::Disputed(r) | Self::Pending(r) => Some(r),
        }
    }

    /// Short label for listings
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Enforced => "enforced",
            Self::KnownDefect(_) => "known-defect",
            Self::Disputed(_) => "disputed",
            Self::Pending(_) => "pending",
        }
    }
}

/// What a case feeds into its step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseInput {
    /// Typed value
    Text(String),
    /// Options to select (may be empty)
    Selection(Vec<FieldId>),
}

impl CaseInput {
    /// Inputs to apply, as (field, input) pairs
    #[must_use]
    pub fn to_field_inputs(&self, group: FieldGroup) -> Vec<(FieldId, FieldInput)> {
        match self {
            Self::Text(value) => text_field(group)
                .map(|field| vec![(field, FieldInput::text(value.clone()))])
                .unwrap_or_default(),
            Self::Selection(options) => options.iter().map(|f| (*f, FieldInput::Select)).collect(),
        }
    }

    /// Display form
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Text(v) => format!("{v:?}"),
            Self::Selection(opts) if opts.is_empty() => "no selection".to_string(),
            Self::Selection(opts) => opts
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

const fn text_field(group: FieldGroup) -> Option<FieldId> {
    match group {
        FieldGroup::Zip => Some(FieldId::Zip),
        FieldGroup::Name => Some(FieldId::Name),
        FieldGroup::Email => Some(FieldId::Email),
        FieldGroup::Phone => Some(FieldId::Phone),
        FieldGroup::Interests | FieldGroup::PropertyType => None,
    }
}

/// One input and its expected outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Stable identifier, e.g. `zip/too-short`
    pub id: String,
    /// Field group under test
    pub field: FieldGroup,
    /// Input
    pub input: CaseInput,
    /// Human description
    pub description: String,
    /// Expected outcome of advancing
    pub expected: Outcome,
    /// Equivalence class
    pub tag: CaseTag,
    /// Gating status
    pub status: CaseStatus,
}

impl TestCase {
    /// Enforced case
    #[must_use]
    pub fn new(
        id: &str,
        field: FieldGroup,
        input: CaseInput,
        description: &str,
        expected: Outcome,
        tag: CaseTag,
    ) -> Self {
        Self {
            id: id.to_string(),
            field,
            input,
            description: description.to_string(),
            expected,
            tag,
            status: CaseStatus::Enforced,
        }
    }

    /// Enforced case with a typed value
    #[must_use]
    pub fn text(
        id: &str,
        field: FieldGroup,
        value: &str,
        description: &str,
        expected: Outcome,
        tag: CaseTag,
    ) -> Self {
        Self::new(id, field, CaseInput::Text(value.to_string()), description, expected, tag)
    }

    /// Override the status
    #[must_use]
    pub fn with_status(mut self, status: CaseStatus) -> Self {
        self.status = status;
        self
    }

    /// Step the case runs on
    #[must_use]
    pub const fn step(&self) -> FormStep {
        self.field.step()
    }
}

/// Immutable fixture set for a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestData {
    /// Canonical valid values
    pub valid: ValidData,
    cases: Vec<TestCase>,
}

impl Default for TestData {
    fn default() -> Self {
        Self::standard()
    }
}

impl TestData {
    /// Fixture set with explicit valid values and cases
    #[must_use]
    pub fn new(valid: ValidData, cases: Vec<TestCase>) -> Self {
        Self { valid, cases }
    }

    /// The covering set for the Walk-In Bath form
    #[must_use]
    pub fn standard() -> Self {
        use CaseTag::{AboveBoundary, BelowBoundary, FormatViolation, Missing, Valid};
        use ErrorKind::{
            FormatInvalid, MissingRequiredField, MustSpecifyFullName, NoOptionSelected,
            OutOfRangeLength,
        };
        use FieldGroup::{Email, Interests, Name, Phone, PropertyType, Zip};
        use Outcome::{Proceeds, StaysOnStep};

        let invalid_email = |id: &str, value: &str, description: &str| {
            TestCase::text(id, Email, value, description, StaysOnStep(FormatInvalid), FormatViolation)
                .with_status(CaseStatus::KnownDefect(
                    "site accepts malformed email addresses".to_string(),
                ))
        };

        let cases = vec![
            TestCase::text("zip/valid", Zip, "48104", "5-digit ZIP", Proceeds, Valid),
            TestCase::text("zip/too-short", Zip, "1234", "4 digits", StaysOnStep(OutOfRangeLength), BelowBoundary),
            TestCase::text("zip/too-long", Zip, "123456", "6 digits", StaysOnStep(OutOfRangeLength), AboveBoundary),
            TestCase::text("zip/empty", Zip, "", "empty ZIP", StaysOnStep(MissingRequiredField), Missing),
            TestCase::text("zip/letters", Zip, "48a04", "letter inside ZIP", StaysOnStep(FormatInvalid), FormatViolation),
            TestCase::new(
                "interests/none",
                Interests,
                CaseInput::Selection(Vec::new()),
                "no interest selected",
                StaysOnStep(NoOptionSelected),
                Missing,
            )
            .with_status(CaseStatus::Disputed(
                "unclear whether at least one interest is required".to_string(),
            )),
            TestCase::new(
                "interests/one",
                Interests,
                CaseInput::Selection(vec![FieldId::Interest(Interest::Independence)]),
                "single interest",
                Proceeds,
                Valid,
            ),
            TestCase::new(
                "interests/all",
                Interests,
                CaseInput::Selection(Interest::ALL.iter().map(|i| FieldId::Interest(*i)).collect()),
                "all interests",
                Proceeds,
                Valid,
            ),
            TestCase::new(
                "property/none",
                PropertyType,
                CaseInput::Selection(Vec::new()),
                "no property type selected",
                StaysOnStep(NoOptionSelected),
                Missing,
            ),
            TestCase::new(
                "property/owned-house",
                PropertyType,
                CaseInput::Selection(vec![FieldId::PropertyType(PropertyOption::OwnedHouse)]),
                "owned house / condo",
                Proceeds,
                Valid,
            ),
            TestCase::new(
                "property/rental",
                PropertyType,
                CaseInput::Selection(vec![FieldId::PropertyType(PropertyOption::RentalProperty)]),
                "rental property",
                Proceeds,
                Valid,
            ),
            TestCase::new(
                "property/mobile-home",
                PropertyType,
                CaseInput::Selection(vec![FieldId::PropertyType(PropertyOption::MobileHome)]),
                "mobile home",
                Proceeds,
                Valid,
            ),
            TestCase::text("name/empty", Name, "", "empty name", StaysOnStep(MissingRequiredField), Missing),
            TestCase::text("name/first-only", Name, "Joe", "first name only", StaysOnStep(MustSpecifyFullName), BelowBoundary),
            TestCase::text("name/first-last", Name, "Joe Doe", "first and last name", Proceeds, Valid),
            TestCase::text("name/three-parts", Name, "Joe Michael Doe", "first, middle and last name", Proceeds, Valid),
            TestCase::text("name/digit", Name, "Joe D0e", "digit substituted for a letter", StaysOnStep(FormatInvalid), FormatViolation),
            TestCase::text("email/valid", Email, "john.doe@example.com", "well-formed address", Proceeds, Valid),
            TestCase::text("email/empty", Email, "", "empty email", StaysOnStep(MissingRequiredField), Missing),
            invalid_email("email/missing-at", "invalid.email.com", "missing @"),
            invalid_email("email/missing-domain", "invalid-email@", "missing domain"),
            invalid_email("email/missing-tld", "invalid-email@domain", "missing top-level domain"),
            TestCase::text("phone/valid", Phone, "5551234567", "10 digits", Proceeds, Valid),
            TestCase::text("phone/too-short", Phone, "555123456", "9 digits", StaysOnStep(OutOfRangeLength), BelowBoundary),
            TestCase::text("phone/too-long", Phone, "55512345678", "11 digits are truncated to 10", Proceeds, AboveBoundary),
            TestCase::text("phone/empty", Phone, "", "empty phone", StaysOnStep(MissingRequiredField), Missing)
                .with_status(CaseStatus::Pending(
                    "empty phone submission behavior not verified against the site".to_string(),
                )),
        ];

        Self::new(ValidData::default(), cases)
    }

    /// All cases
    #[must_use]
    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    /// Cases for one field group
    pub fn cases_for(&self, group: FieldGroup) -> impl Iterator<Item = &TestCase> {
        self.cases.iter().filter(move |c| c.field == group)
    }

    /// Case by id
    #[must_use]
    pub fn case(&self, id: &str) -> Option<&TestCase> {
        self.cases.iter().find(|c| c.id == id)
    }

    /// Copy with a case added or replaced (matched by id)
    #[must_use]
    pub fn with_case(mut self, case: TestCase) -> Self {
        match self.cases.iter_mut().find(|c| c.id == case.id) {
            Some(existing) => *existing = case,
            None => self.cases.push(case),
        }
        self
    }

    /// Known-valid inputs for a step
    #[must_use]
    pub fn canonical_inputs(&self, step: FormStep) -> Vec<(FieldId, FieldInput)> {
        let v = &self.valid;
        match step {
            FormStep::ZipCode => vec![(FieldId::Zip, FieldInput::text(&v.zip))],
            FormStep::Interests => v
                .interests
                .iter()
                .map(|i| (FieldId::Interest(*i), FieldInput::Select))
                .collect(),
            FormStep::PropertyType => {
                vec![(FieldId::PropertyType(v.property_type), FieldInput::Select)]
            }
            FormStep::ContactInfo => vec![
                (FieldId::Name, FieldInput::text(&v.name)),
                (FieldId::Email, FieldInput::text(&v.email)),
            ],
            FormStep::Phone => vec![(FieldId::Phone, FieldInput::text(&v.phone))],
            FormStep::ThankYou => Vec::new(),
        }
    }
}
