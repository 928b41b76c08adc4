//! The step graph as data
//!
//! Every step of the lead form is described by one [`StepContract`]: the
//! fields it owns, the control that advances it, the fields whose visibility
//! marks it active, and which error region each (field, error kind) pair
//! surfaces in. Navigation and assertions only read this table.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::field::{FieldGroup, FieldId, Interest, PropertyOption};

/// One screen of the lead form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FormStep {
    /// ZIP code entry
    ZipCode,
    /// Interest checkboxes
    Interests,
    /// Property type radios
    PropertyType,
    /// Name and email
    ContactInfo,
    /// Phone number and submit
    Phone,
    /// Confirmation page (terminal)
    ThankYou,
}

impl FormStep {
    /// Steps in traversal order
    pub const ALL: [Self; 6] = [
        Self::ZipCode,
        Self::Interests,
        Self::PropertyType,
        Self::ContactInfo,
        Self::Phone,
        Self::ThankYou,
    ];

    /// Initial step
    pub const INITIAL: Self = Self::ZipCode;

    /// Position in [`Self::ALL`]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Next step on a valid advance
    #[must_use]
    pub const fn successor(self) -> Option<Self> {
        match self {
            Self::ZipCode => Some(Self::Interests),
            Self::Interests => Some(Self::PropertyType),
            Self::PropertyType => Some(Self::ContactInfo),
            Self::ContactInfo => Some(Self::Phone),
            Self::Phone => Some(Self::ThankYou),
            Self::ThankYou => None,
        }
    }

    /// Step that leads here
    #[must_use]
    pub const fn predecessor(self) -> Option<Self> {
        match self {
            Self::ZipCode => None,
            Self::Interests => Some(Self::ZipCode),
            Self::PropertyType => Some(Self::Interests),
            Self::ContactInfo => Some(Self::PropertyType),
            Self::Phone => Some(Self::ContactInfo),
            Self::ThankYou => Some(Self::Phone),
        }
    }

    /// Whether the flow ends here
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        self.successor().is_none()
    }

    /// Steps that must be completed before this one, in order
    #[must_use]
    pub fn prerequisites(self) -> &'static [Self] {
        &Self::ALL[..self.index()]
    }

    /// Contract for this step
    #[must_use]
    pub fn contract(self) -> &'static StepContract {
        &CONTRACTS[self.index()]
    }
}

impl FieldGroup {
    /// Step on which the group is entered
    #[must_use]
    pub const fn step(self) -> FormStep {
        match self {
            Self::Zip => FormStep::ZipCode,
            Self::Interests => FormStep::Interests,
            Self::PropertyType => FormStep::PropertyType,
            Self::Name | Self::Email => FormStep::ContactInfo,
            Self::Phone => FormStep::Phone,
        }
    }
}

impl fmt::Display for FormStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Category of validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Required value left empty
    MissingRequiredField,
    /// Value has characters or shape the field does not allow
    FormatInvalid,
    /// Only one name given
    MustSpecifyFullName,
    /// Too few or too many characters
    OutOfRangeLength,
    /// No checkbox/radio selected
    NoOptionSelected,
}

/// A user-visible error message area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorRegion {
    /// "Wrong ZIP code"
    Zip,
    /// "Please select at least one interest"
    Interest,
    /// "Choose one of the variants"
    PropertyType,
    /// "Please enter your name"
    NameMissing,
    /// "Your name should consist only of letters"
    NameFormat,
    /// "Should contain both first and last name"
    NameFullName,
    /// "Please enter a valid email"
    Email,
    /// "Wrong phone number"
    Phone,
}

impl ErrorRegion {
    /// Every region
    pub const ALL: [Self; 8] = [
        Self::Zip,
        Self::Interest,
        Self::PropertyType,
        Self::NameMissing,
        Self::NameFormat,
        Self::NameFullName,
        Self::Email,
        Self::Phone,
    ];

    /// Case-insensitive text pattern identifying the region
    #[must_use]
    pub const fn text_pattern(self) -> &'static str {
        match self {
            Self::Zip => "wrong zip code",
            Self::Interest => "please select at least one interest|select at least one option",
            Self::PropertyType => "choose one of the variants",
            Self::NameMissing => "please enter your name",
            Self::NameFormat => "your name should consist only",
            Self::NameFullName => "should contain both first and last name",
            Self::Email => "invalid email|wrong email|please enter a valid email",
            Self::Phone => "wrong phone number",
        }
    }
}

/// Control that advances a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transition {
    /// "Next"
    Next,
    /// "Go To Estimate"
    GoToEstimate,
    /// "Submit Your Request"
    Submit,
}

impl Transition {
    /// Accessible name pattern of the button
    #[must_use]
    pub const fn button_pattern(self) -> &'static str {
        match self {
            Self::Next => "next",
            Self::GoToEstimate => "go to estimate",
            Self::Submit => "submit your request",
        }
    }
}

/// Expected result of advancing a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The next step becomes active
    Proceeds,
    /// The step stays active and shows the error for this kind
    StaysOnStep(ErrorKind),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Proceeds => f.write_str("proceeds"),
            Self::StaysOnStep(kind) => write!(f, "stays on step with {kind:?}"),
        }
    }
}

/// (field group, error kind) → region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorMapping {
    /// Field group whose rule failed
    pub group: FieldGroup,
    /// Failure category
    pub kind: ErrorKind,
    /// Region showing the message
    pub region: ErrorRegion,
}

const fn map(group: FieldGroup, kind: ErrorKind, region: ErrorRegion) -> ErrorMapping {
    ErrorMapping {
        group,
        kind,
        region,
    }
}

/// Static description of one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepContract {
    /// The step described
    pub step: FormStep,
    /// Inputs owned by the step
    pub fields: &'static [FieldId],
    /// Fields whose visibility marks the step active
    pub markers: &'static [FieldId],
    /// Markers that must be hidden once the step is left
    pub vacated_on_advance: &'static [FieldId],
    /// Control that advances the step
    pub transition: Option<Transition>,
    /// Error surfaces
    pub errors: &'static [ErrorMapping],
}

const INTERESTS: [FieldId; 4] = [
    FieldId::Interest(Interest::Independence),
    FieldId::Interest(Interest::Safety),
    FieldId::Interest(Interest::Therapy),
    FieldId::Interest(Interest::Other),
];

const PROPERTY_TYPES: [FieldId; 3] = [
    FieldId::PropertyType(PropertyOption::OwnedHouse),
    FieldId::PropertyType(PropertyOption::RentalProperty),
    FieldId::PropertyType(PropertyOption::MobileHome),
];

static CONTRACTS: [StepContract; 6] = [
    StepContract {
        step: FormStep::ZipCode,
        fields: &[FieldId::Zip],
        markers: &[FieldId::Zip],
        vacated_on_advance: &[],
        transition: Some(Transition::Next),
        errors: &[
            map(FieldGroup::Zip, ErrorKind::MissingRequiredField, ErrorRegion::Zip),
            map(FieldGroup::Zip, ErrorKind::FormatInvalid, ErrorRegion::Zip),
            map(FieldGroup::Zip, ErrorKind::OutOfRangeLength, ErrorRegion::Zip),
        ],
    },
    StepContract {
        step: FormStep::Interests,
        fields: &INTERESTS,
        markers: &INTERESTS,
        vacated_on_advance: &[FieldId::Interest(Interest::Independence)],
        transition: Some(Transition::Next),
        errors: &[map(
            FieldGroup::Interests,
            ErrorKind::NoOptionSelected,
            ErrorRegion::Interest,
        )],
    },
    StepContract {
        step: FormStep::PropertyType,
        fields: &PROPERTY_TYPES,
        markers: &PROPERTY_TYPES,
        vacated_on_advance: &[FieldId::PropertyType(PropertyOption::OwnedHouse)],
        transition: Some(Transition::Next),
        errors: &[map(
            FieldGroup::PropertyType,
            ErrorKind::NoOptionSelected,
            ErrorRegion::PropertyType,
        )],
    },
    StepContract {
        step: FormStep::ContactInfo,
        fields: &[FieldId::Name, FieldId::Email],
        markers: &[FieldId::Name, FieldId::Email],
        vacated_on_advance: &[],
        transition: Some(Transition::GoToEstimate),
        errors: &[
            map(
                FieldGroup::Name,
                ErrorKind::MissingRequiredField,
                ErrorRegion::NameMissing,
            ),
            map(FieldGroup::Name, ErrorKind::FormatInvalid, ErrorRegion::NameFormat),
            map(
                FieldGroup::Name,
                ErrorKind::MustSpecifyFullName,
                ErrorRegion::NameFullName,
            ),
            map(FieldGroup::Email, ErrorKind::MissingRequiredField, ErrorRegion::Email),
            map(FieldGroup::Email, ErrorKind::FormatInvalid, ErrorRegion::Email),
        ],
    },
    StepContract {
        step: FormStep::Phone,
        fields: &[FieldId::Phone],
        markers: &[FieldId::Phone],
        vacated_on_advance: &[FieldId::Phone],
        transition: Some(Transition::Submit),
        errors: &[
            map(FieldGroup::Phone, ErrorKind::MissingRequiredField, ErrorRegion::Phone),
            map(FieldGroup::Phone, ErrorKind::OutOfRangeLength, ErrorRegion::Phone),
        ],
    },
    StepContract {
        step: FormStep::ThankYou,
        fields: &[],
        markers: &[],
        vacated_on_advance: &[],
        transition: None,
        errors: &[],
    },
];

impl StepContract {
    /// Whether the step owns a field
    #[must_use]
    pub fn owns(&self, field: FieldId) -> bool {
        self.fields.contains(&field)
    }

    /// Region for a failure, if this step can surface it
    #[must_use]
    pub fn region_for(&self, group: FieldGroup, kind: ErrorKind) -> Option<ErrorRegion> {
        self.errors
            .iter()
            .find(|m| m.group == group && m.kind == kind)
            .map(|m| m.region)
    }

    /// Region for a failure of whichever group on this step can surface `kind`
    #[must_use]
    pub fn region_for_kind(&self, kind: ErrorKind) -> Option<ErrorRegion> {
        let mut regions = self.errors.iter().filter(|m| m.kind == kind);
        let first = regions.next()?;
        regions
            .all(|m| m.region == first.region)
            .then_some(first.region)
    }

    /// Every region this step can show, without duplicates
    #[must_use]
    pub fn regions(&self) -> Vec<ErrorRegion> {
        let mut out: Vec<ErrorRegion> = Vec::new();
        for m in self.errors {
            if !out.contains(&m.region) {
                out.push(m.region);
            }
        }
        out
    }

    /// Regions belonging to one field group
    #[must_use]
    pub fn regions_of(&self, group: FieldGroup) -> Vec<ErrorRegion> {
        self.regions()
            .into_iter()
            .filter(|r| self.errors.iter().any(|m| m.group == group && m.region == *r))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod graph_tests {
        use super::*;

        #[test]
        fn test_linear_order() {
            for pair in FormStep::ALL.windows(2) {
                assert_eq!(pair[0].successor(), Some(pair[1]));
                assert_eq!(pair[1].predecessor(), Some(pair[0]));
            }
            assert_eq!(FormStep::INITIAL.predecessor(), None);
            assert!(FormStep::ThankYou.is_terminal());
            assert!(!FormStep::Phone.is_terminal());
        }

        #[test]
        fn test_prerequisites() {
            assert!(FormStep::ZipCode.prerequisites().is_empty());
            assert_eq!(
                FormStep::ContactInfo.prerequisites(),
                &[FormStep::ZipCode, FormStep::Interests, FormStep::PropertyType]
            );
        }

        #[test]
        fn test_contract_table_is_indexed_by_step() {
            for step in FormStep::ALL {
                assert_eq!(step.contract().step, step);
            }
        }

        #[test]
        fn test_only_terminal_lacks_transition() {
            for step in FormStep::ALL {
                assert_eq!(step.contract().transition.is_none(), step.is_terminal());
            }
        }

        #[test]
        fn test_group_step_owns_group_fields() {
            for step in FormStep::ALL {
                for field in step.contract().fields {
                    assert_eq!(field.group().step(), step);
                }
            }
        }

        #[test]
        fn test_markers_are_owned_fields() {
            for step in FormStep::ALL {
                let contract = step.contract();
                for marker in contract.markers {
                    assert!(contract.owns(*marker), "{step} marker {marker}");
                }
                for vacated in contract.vacated_on_advance {
                    assert!(contract.markers.contains(vacated));
                }
            }
        }
    }

    mod error_map_tests {
        use super::*;

        #[test]
        fn test_every_kind_has_a_region_somewhere() {
            let kinds = [
                ErrorKind::MissingRequiredField,
                ErrorKind::FormatInvalid,
                ErrorKind::MustSpecifyFullName,
                ErrorKind::OutOfRangeLength,
                ErrorKind::NoOptionSelected,
            ];
            for kind in kinds {
                assert!(
                    FormStep::ALL
                        .iter()
                        .any(|s| s.contract().errors.iter().any(|m| m.kind == kind)),
                    "{kind:?}"
                );
            }
        }

        #[test]
        fn test_every_region_is_reachable() {
            for region in ErrorRegion::ALL {
                assert!(FormStep::ALL
                    .iter()
                    .any(|s| s.contract().regions().contains(&region)));
            }
        }

        #[test]
        fn test_name_kinds_have_distinct_regions() {
            let contact = FormStep::ContactInfo.contract();
            assert_eq!(
                contact.region_for(FieldGroup::Name, ErrorKind::MustSpecifyFullName),
                Some(ErrorRegion::NameFullName)
            );
            assert_eq!(
                contact.region_for(FieldGroup::Name, ErrorKind::FormatInvalid),
                Some(ErrorRegion::NameFormat)
            );
            assert_eq!(
                contact.region_for(FieldGroup::Email, ErrorKind::FormatInvalid),
                Some(ErrorRegion::Email)
            );
            assert_eq!(contact.regions_of(FieldGroup::Name).len(), 3);
        }

        #[test]
        fn test_region_for_kind_requires_unambiguous_region() {
            let contact = FormStep::ContactInfo.contract();
            assert_eq!(
                contact.region_for_kind(ErrorKind::MustSpecifyFullName),
                Some(ErrorRegion::NameFullName)
            );
            assert_eq!(contact.region_for_kind(ErrorKind::FormatInvalid), None);
            assert_eq!(
                FormStep::ZipCode
                    .contract()
                    .region_for_kind(ErrorKind::OutOfRangeLength),
                Some(ErrorRegion::Zip)
            );
        }

        #[test]
        fn test_zip_regions_deduplicated() {
            assert_eq!(FormStep::ZipCode.contract().regions(), vec![ErrorRegion::Zip]);
        }
    }
}
