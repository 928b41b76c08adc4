//! Form fields and the per-kind input/read dispatch

use std::fmt;

use serde::{Deserialize, Serialize};

/// Interest checkboxes on the second step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interest {
    /// Independence
    Independence,
    /// Safety
    Safety,
    /// Therapy
    Therapy,
    /// Other
    Other,
}

impl Interest {
    /// All options in display order
    pub const ALL: [Self; 4] = [Self::Independence, Self::Safety, Self::Therapy, Self::Other];

    /// Text pattern of the option label
    #[must_use]
    pub const fn label_pattern(self) -> &'static str {
        match self {
            Self::Independence => "independence",
            Self::Safety => "safety",
            Self::Therapy => "therapy",
            Self::Other => "other",
        }
    }
}

/// Property type radio options on the third step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyOption {
    /// Owned house / condo
    OwnedHouse,
    /// Rental property
    RentalProperty,
    /// Mobile home
    MobileHome,
}

impl PropertyOption {
    /// All options in display order
    pub const ALL: [Self; 3] = [Self::OwnedHouse, Self::RentalProperty, Self::MobileHome];

    /// Text pattern of the option label
    #[must_use]
    pub const fn label_pattern(self) -> &'static str {
        match self {
            Self::OwnedHouse => r"owned house\s*/\s*condo",
            Self::RentalProperty => "rental property",
            Self::MobileHome => "mobile home",
        }
    }
}

/// How a field takes input and exposes state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Free text, filled like typing
    Text,
    /// Independent on/off option
    Checkbox,
    /// Mutually exclusive option
    Radio,
    /// Masked phone input, set by script with input/change/blur events
    PhoneMasked,
}

impl FieldKind {
    /// Whether the field is selected rather than typed into
    #[must_use]
    pub const fn is_selectable(self) -> bool {
        matches!(self, Self::Checkbox | Self::Radio)
    }
}

/// Group of fields sharing one validation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldGroup {
    /// ZIP code
    Zip,
    /// Interest checkboxes
    Interests,
    /// Property type radios
    PropertyType,
    /// Full name
    Name,
    /// Email address
    Email,
    /// Phone number
    Phone,
}

impl fmt::Display for FieldGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Zip => "zip",
            Self::Interests => "interests",
            Self::PropertyType => "property type",
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
        };
        f.write_str(name)
    }
}

/// One input on the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldId {
    /// ZIP code text box
    Zip,
    /// An interest checkbox
    Interest(Interest),
    /// A property type radio
    PropertyType(PropertyOption),
    /// Name text box
    Name,
    /// Email text box
    Email,
    /// Masked phone input
    Phone,
}

impl FieldId {
    /// Input kind
    #[must_use]
    pub const fn kind(self) -> FieldKind {
        match self {
            Self::Zip | Self::Name | Self::Email => FieldKind::Text,
            Self::Interest(_) => FieldKind::Checkbox,
            Self::PropertyType(_) => FieldKind::Radio,
            Self::Phone => FieldKind::PhoneMasked,
        }
    }

    /// Rule group
    #[must_use]
    pub const fn group(self) -> FieldGroup {
        match self {
            Self::Zip => FieldGroup::Zip,
            Self::Interest(_) => FieldGroup::Interests,
            Self::PropertyType(_) => FieldGroup::PropertyType,
            Self::Name => FieldGroup::Name,
            Self::Email => FieldGroup::Email,
            Self::Phone => FieldGroup::Phone,
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interest(i) => write!(f, "interest:{i:?}"),
            Self::PropertyType(p) => write!(f, "property:{p:?}"),
            other => write!(f, "{}", other.group()),
        }
    }
}

/// Input to simulate on a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldInput {
    /// Type a value (text and phone fields)
    Text(String),
    /// Select the option (checkbox and radio fields)
    Select,
}

impl FieldInput {
    /// Text input
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Whether this input fits a field kind
    #[must_use]
    pub const fn fits(&self, kind: FieldKind) -> bool {
        match self {
            Self::Text(_) => !kind.is_selectable(),
            Self::Select => kind.is_selectable(),
        }
    }
}

impl fmt::Display for FieldInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(v) => write!(f, "{v:?}"),
            Self::Select => f.write_str("<select>"),
        }
    }
}

/// Observed field state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldState {
    /// Current text value
    Value(String),
    /// Selection state
    Checked(bool),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(FieldId::Zip.kind(), FieldKind::Text);
        assert_eq!(FieldId::Interest(Interest::Safety).kind(), FieldKind::Checkbox);
        assert_eq!(
            FieldId::PropertyType(PropertyOption::MobileHome).kind(),
            FieldKind::Radio
        );
        assert_eq!(FieldId::Phone.kind(), FieldKind::PhoneMasked);
    }

    #[test]
    fn test_input_fits_kind() {
        assert!(FieldInput::text("48104").fits(FieldKind::Text));
        assert!(FieldInput::text("5551234567").fits(FieldKind::PhoneMasked));
        assert!(!FieldInput::text("x").fits(FieldKind::Checkbox));
        assert!(FieldInput::Select.fits(FieldKind::Radio));
        assert!(!FieldInput::Select.fits(FieldKind::Text));
    }

    #[test]
    fn test_display() {
        assert_eq!(FieldId::Email.to_string(), "email");
        assert_eq!(
            FieldId::Interest(Interest::Other).to_string(),
            "interest:Other"
        );
        assert_eq!(FieldInput::text("Joe").to_string(), "\"Joe\"");
    }
}
