//! Assertions: check what the page did after an advance

use tracing::{debug, info};

use super::field::{FieldGroup, FieldId, Interest, PropertyOption};
use super::phone::PHONE_MASK_PATTERN;
use super::step::{ErrorKind, ErrorRegion, FormStep, Outcome};
use super::WalkInBathForm;
use crate::locator::{Locator, TextPattern};
use crate::result::{LeadformError, LeadformResult};
use crate::wait::{hold_state, Held};

/// Turn an expectation timeout into an outcome mismatch on `step`
fn mismatch_on_timeout(step: FormStep, expected: String) -> impl FnOnce(LeadformError) -> LeadformError {
    move |e| match e {
        LeadformError::Timeout { waited_for, .. } => {
            LeadformError::mismatch(step.to_string(), expected, waited_for)
        }
        other => other,
    }
}

impl WalkInBathForm {
    /// Assert the outcome of advancing `step`.
    ///
    /// For `StaysOnStep(kind)` the step must own exactly one region for
    /// `kind`; use [`Self::assert_field_outcome`] when several field groups
    /// share a step.
    pub async fn assert_outcome(&self, step: FormStep, expected: Outcome) -> LeadformResult<()> {
        match expected {
            Outcome::Proceeds => self.expect_proceeded(step).await,
            Outcome::StaysOnStep(kind) => {
                let region = step.contract().region_for_kind(kind).ok_or_else(|| {
                    LeadformError::invalid_definition(format!(
                        "{step} has no single error region for {kind:?}"
                    ))
                })?;
                self.expect_stayed(step, region, None).await
            }
        }
    }

    /// Assert the outcome of advancing `step` for input given to `group`
    pub async fn assert_field_outcome(
        &self,
        step: FormStep,
        group: FieldGroup,
        expected: Outcome,
    ) -> LeadformResult<()> {
        match expected {
            Outcome::Proceeds => self.expect_proceeded(step).await,
            Outcome::StaysOnStep(kind) => {
                let region = step.contract().region_for(group, kind).ok_or_else(|| {
                    LeadformError::invalid_definition(format!(
                        "{step} cannot report {kind:?} for {group}"
                    ))
                })?;
                self.expect_stayed(step, region, Some(group)).await
            }
        }
    }

    /// The step stays active for the settle window and shows `region`
    async fn expect_stayed(
        &self,
        step: FormStep,
        region: ErrorRegion,
        group: Option<FieldGroup>,
    ) -> LeadformResult<()> {
        let contract = step.contract();
        let next = step
            .successor()
            .ok_or_else(|| LeadformError::invalid_definition(format!("{step} is terminal")))?;
        let locators = self.locators();

        let mut held: Vec<Held<'_>> = contract
            .markers
            .iter()
            .map(|f| Held::visible(locators.field(*f)))
            .collect();
        held.extend(
            next.contract()
                .markers
                .iter()
                .map(|f| Held::hidden(locators.field(*f))),
        );
        let report = hold_state(self.driver().as_ref(), &held, self.settle_options()).await?;
        debug!(%step, polls = report.polls, "step held");

        if next == FormStep::ThankYou {
            let url = self.driver().current_url().await?;
            if locators.thank_you_url().is_match(&url) {
                return Err(LeadformError::mismatch(
                    step.to_string(),
                    format!("stays with {region:?} error"),
                    format!("navigated to {url}"),
                ));
            }
        }

        let expected = format!("stays with {region:?} error");
        self.expect()
            .that(locators.error(region))
            .to_be_visible()
            .await
            .map_err(mismatch_on_timeout(step, expected.clone()))?;

        let siblings = match group {
            Some(g) => contract.regions_of(g),
            None => contract.regions(),
        };
        for other in siblings.into_iter().filter(|r| *r != region) {
            if self.driver().is_visible(locators.error(other)).await? {
                return Err(LeadformError::mismatch(
                    step.to_string(),
                    expected,
                    format!("{other:?} error shown instead of or alongside {region:?}"),
                ));
            }
        }
        info!(%step, ?region, "stayed on step with expected error");
        Ok(())
    }

    /// The next step is active and `step` is left behind
    pub async fn expect_proceeded(&self, step: FormStep) -> LeadformResult<()> {
        let contract = step.contract();
        let next = step
            .successor()
            .ok_or_else(|| LeadformError::invalid_definition(format!("{step} is terminal")))?;
        if next == FormStep::ThankYou {
            return self
                .expect_thank_you_page()
                .await
                .map_err(mismatch_on_timeout(step, "proceeds to ThankYou".to_string()));
        }

        let locators = self.locators();
        let expected = format!("proceeds to {next}");
        let expect = self.expect();
        for marker in next.contract().markers {
            expect
                .that(locators.field(*marker))
                .to_be_visible()
                .await
                .map_err(mismatch_on_timeout(step, expected.clone()))?;
        }
        for vacated in contract.vacated_on_advance {
            expect
                .that(locators.field(*vacated))
                .to_be_hidden()
                .await
                .map_err(mismatch_on_timeout(step, expected.clone()))?;
        }
        for region in contract.regions() {
            expect
                .that(locators.error(region))
                .to_be_hidden()
                .await
                .map_err(mismatch_on_timeout(step, expected.clone()))?;
        }
        info!(%step, %next, "proceeded");
        Ok(())
    }

    /// URL matches the confirmation page and the heading says thank you
    pub async fn expect_thank_you_page(&self) -> LeadformResult<()> {
        let locators = self.locators();
        self.expect().url_to_match(locators.thank_you_url()).await?;
        self.expect()
            .that(locators.thank_you_heading())
            .to_be_visible()
            .await
    }

    /// The phone input shows `(ddd)ddd-dddd`
    pub async fn expect_phone_formatted(&self) -> LeadformResult<()> {
        self.expect()
            .that(self.locators().field(FieldId::Phone))
            .to_have_value_matching(TextPattern::new(PHONE_MASK_PATTERN)?)
            .await
    }

    /// The phone input shows exactly `masked`
    pub async fn expect_phone_value(&self, masked: &str) -> LeadformResult<()> {
        self.expect()
            .that(self.locators().field(FieldId::Phone))
            .to_have_value(masked)
            .await
    }

    /// A text field kept the value typed into it
    pub async fn expect_field_retains(&self, field: FieldId, value: &str) -> LeadformResult<()> {
        self.expect()
            .that(self.locators().field(field))
            .to_have_value(value)
            .await
    }

    /// Exactly `selected` interests are ticked
    pub async fn expect_interests_selected(&self, selected: &[Interest]) -> LeadformResult<()> {
        for interest in Interest::ALL {
            let loc = self.locators().field(FieldId::Interest(interest));
            let expect = self.expect().that(loc);
            if selected.contains(&interest) {
                expect.to_be_checked().await?;
            } else {
                expect.not_to_be_checked().await?;
            }
        }
        Ok(())
    }

    /// `option` is the selected property type
    pub async fn expect_property_type_selected(&self, option: PropertyOption) -> LeadformResult<()> {
        for other in PropertyOption::ALL {
            let loc = self.locators().field(FieldId::PropertyType(other));
            let expect = self.expect().that(loc);
            if other == option {
                expect.to_be_checked().await?;
            } else {
                expect.not_to_be_checked().await?;
            }
        }
        Ok(())
    }

    /// Every property type option is visible and enabled
    pub async fn expect_property_types_available(&self) -> LeadformResult<()> {
        for option in PropertyOption::ALL {
            let loc = self.locators().field(FieldId::PropertyType(option));
            self.expect().that(loc).to_be_visible().await?;
            self.expect().that(loc).to_be_enabled().await?;
        }
        Ok(())
    }

    /// Error region for a (group, kind) pair on its step
    #[must_use]
    pub fn error_locator(&self, group: FieldGroup, kind: ErrorKind) -> Option<&Locator> {
        group
            .step()
            .contract()
            .region_for(group, kind)
            .map(|r| self.locators().error(r))
    }
}
