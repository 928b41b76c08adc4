//! Locators for every element the form page object touches

use crate::locator::{AriaRole, Locator, TextPattern};
use crate::result::LeadformResult;

use super::field::{FieldId, Interest, PropertyOption};
use super::step::{ErrorRegion, Transition};

/// Container all form locators are scoped to
pub const FORM_CONTAINER: &str = "#form-container-1";

/// Pattern the confirmation URL matches
pub const THANK_YOU_URL_PATTERN: &str = "/thankyou";

/// Resolved locators of the lead form
#[derive(Debug, Clone)]
pub struct FormLocators {
    zip: Locator,
    interests: Vec<Locator>,
    property_types: Vec<Locator>,
    name: Locator,
    email: Locator,
    phone: Locator,
    transitions: Vec<Locator>,
    errors: Vec<Locator>,
    thank_you_heading: Locator,
    thank_you_url: TextPattern,
}

impl FormLocators {
    /// Locators scoped to [`FORM_CONTAINER`]
    pub fn new() -> LeadformResult<Self> {
        Self::scoped(FORM_CONTAINER)
    }

    /// Locators scoped to an arbitrary container
    pub fn scoped(container: &str) -> LeadformResult<Self> {
        let scoped = |l: Locator| l.within(container);
        let text = |pattern: &str| Locator::text(pattern).map(scoped);

        let interests = Interest::ALL
            .iter()
            .map(|i| text(i.label_pattern()))
            .collect::<LeadformResult<Vec<_>>>()?;
        let property_types = PropertyOption::ALL
            .iter()
            .map(|p| text(p.label_pattern()))
            .collect::<LeadformResult<Vec<_>>>()?;
        let transitions = [Transition::Next, Transition::GoToEstimate, Transition::Submit]
            .iter()
            .map(|t| Locator::role(AriaRole::Button, t.button_pattern()).map(scoped))
            .collect::<LeadformResult<Vec<_>>>()?;
        let errors = ErrorRegion::ALL
            .iter()
            .map(|r| text(r.text_pattern()))
            .collect::<LeadformResult<Vec<_>>>()?;

        Ok(Self {
            zip: scoped(Locator::role(AriaRole::Textbox, "enter zip code")?),
            interests,
            property_types,
            name: scoped(Locator::role(AriaRole::Textbox, "name")?),
            email: scoped(Locator::role(AriaRole::Textbox, "email")?),
            phone: scoped(Locator::new(r#"input[name="phone"]"#)),
            transitions,
            errors,
            thank_you_heading: Locator::new("h1").with_text("thank you")?,
            thank_you_url: TextPattern::new(THANK_YOU_URL_PATTERN)?,
        })
    }

    /// Input of a field
    #[must_use]
    pub fn field(&self, field: FieldId) -> &Locator {
        match field {
            FieldId::Zip => &self.zip,
            FieldId::Interest(i) => &self.interests[i as usize],
            FieldId::PropertyType(p) => &self.property_types[p as usize],
            FieldId::Name => &self.name,
            FieldId::Email => &self.email,
            FieldId::Phone => &self.phone,
        }
    }

    /// Button for a transition
    #[must_use]
    pub fn transition(&self, transition: Transition) -> &Locator {
        &self.transitions[transition as usize]
    }

    /// Error message area
    #[must_use]
    pub fn error(&self, region: ErrorRegion) -> &Locator {
        &self.errors[region as usize]
    }

    /// Confirmation page heading
    #[must_use]
    pub const fn thank_you_heading(&self) -> &Locator {
        &self.thank_you_heading
    }

    /// Confirmation page URL pattern
    #[must_use]
    pub const fn thank_you_url(&self) -> &TextPattern {
        &self.thank_you_url
    }
}
