//! Actions: put values into fields and advance steps

use tracing::debug;

use super::field::{FieldId, FieldInput, FieldKind, FieldState, Interest, PropertyOption};
use super::step::{FormStep, Transition};
use super::WalkInBathForm;
use crate::locator::Locator;
use crate::result::{LeadformError, LeadformResult};

impl WalkInBathForm {
    /// Enter `input` into `field` on `step`.
    ///
    /// The field must belong to the step, and must become interactable within
    /// the expect timeout. Text is typed, options are checked, and the phone
    /// mask is assigned by script with input/change/blur events.
    pub async fn enter_field(
        &self,
        step: FormStep,
        field: FieldId,
        input: &FieldInput,
    ) -> LeadformResult<()> {
        if !step.contract().owns(field) {
            return Err(LeadformError::invalid_definition(format!(
                "{field} is not a field of {step}"
            )));
        }
        let kind = field.kind();
        if !input.fits(kind) {
            return Err(LeadformError::invalid_definition(format!(
                "{input} cannot be entered into {field} ({kind:?})"
            )));
        }

        let locator = self.locators().field(field);
        self.await_interactable(locator, !kind.is_selectable()).await?;
        debug!(%step, %field, %input, "entering field");

        match (kind, input) {
            (FieldKind::Text, FieldInput::Text(value)) => self.driver().fill(locator, value).await,
            (FieldKind::PhoneMasked, FieldInput::Text(value)) => {
                self.driver().set_value_with_events(locator, value).await
            }
            (FieldKind::Checkbox | FieldKind::Radio, FieldInput::Select) => {
                self.driver().check(locator).await
            }
            _ => Err(LeadformError::invalid_definition(format!(
                "{input} cannot be entered into {field}"
            ))),
        }
    }

    /// Current state of a field
    pub async fn read_field(&self, field: FieldId) -> LeadformResult<FieldState> {
        let locator = self.locators().field(field);
        if field.kind().is_selectable() {
            Ok(FieldState::Checked(self.driver().is_checked(locator).await?))
        } else {
            Ok(FieldState::Value(self.driver().input_value(locator).await?))
        }
    }

    /// Click the control that advances `step`
    pub async fn advance(&self, step: FormStep) -> LeadformResult<()> {
        let transition = step.contract().transition.ok_or_else(|| {
            LeadformError::invalid_definition(format!("{step} has no transition"))
        })?;
        self.click_transition(transition).await
    }

    async fn click_transition(&self, transition: Transition) -> LeadformResult<()> {
        let button = self.locators().transition(transition);
        self.await_interactable(button, true).await?;
        debug!(?transition, "advancing");
        self.driver().click(button).await
    }

    /// Wait for the element to accept input. Timing out is reported as
    /// `ElementNotInteractable`.
    async fn await_interactable(&self, locator: &Locator, require_enabled: bool) -> LeadformResult<()> {
        let expect = self.expect().that(locator);
        let ready = match expect.to_be_visible().await {
            Ok(()) if !require_enabled => Ok(()),
            Ok(()) => expect.to_be_enabled().await,
            Err(e) => Err(e),
        };
        ready.map_err(|e| match e {
            LeadformError::Timeout { waited_for, .. } => LeadformError::ElementNotInteractable {
                locator: locator.to_string(),
                reason: waited_for,
            },
            other => other,
        })
    }

    // -------------------------------------------------------------------------
    // Named helpers
    // -------------------------------------------------------------------------

    /// Type a ZIP code
    pub async fn enter_zip_code(&self, zip: &str) -> LeadformResult<()> {
        self.enter_field(FormStep::ZipCode, FieldId::Zip, &FieldInput::text(zip))
            .await
    }

    /// Tick one interest
    pub async fn select_interest(&self, interest: Interest) -> LeadformResult<()> {
        self.enter_field(
            FormStep::Interests,
            FieldId::Interest(interest),
            &FieldInput::Select,
        )
        .await
    }

    /// Tick every interest
    pub async fn select_all_interests(&self) -> LeadformResult<()> {
        for interest in Interest::ALL {
            self.select_interest(interest).await?;
        }
        Ok(())
    }

    /// Pick a property type
    pub async fn select_property_type(&self, option: PropertyOption) -> LeadformResult<()> {
        self.enter_field(
            FormStep::PropertyType,
            FieldId::PropertyType(option),
            &FieldInput::Select,
        )
        .await
    }

    /// Type name and email
    pub async fn enter_contact_info(&self, name: &str, email: &str) -> LeadformResult<()> {
        self.enter_field(FormStep::ContactInfo, FieldId::Name, &FieldInput::text(name))
            .await?;
        self.enter_field(FormStep::ContactInfo, FieldId::Email, &FieldInput::text(email))
            .await
    }

    /// Set the phone number through the mask
    pub async fn enter_phone_number(&self, phone: &str) -> LeadformResult<()> {
        self.enter_field(FormStep::Phone, FieldId::Phone, &FieldInput::text(phone))
            .await
    }

    /// Click "Next"
    pub async fn click_next(&self) -> LeadformResult<()> {
        self.click_transition(Transition::Next).await
    }

    /// Click "Go To Estimate"
    pub async fn click_go_to_estimate(&self) -> LeadformResult<()> {
        self.click_transition(Transition::GoToEstimate).await
    }

    /// Click "Submit Your Request"
    pub async fn submit_form(&self) -> LeadformResult<()> {
        self.click_transition(Transition::Submit).await
    }
}
