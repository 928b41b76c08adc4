//! Navigation: reach a step by replaying known-valid inputs
//!
//! Reaching step N means entering the canonical inputs of every earlier step
//! and advancing it, confirming each hop before taking the next. The sequence
//! is derived from the step table, so adding a step needs no new helper.

use tracing::{debug, instrument};

use super::field::FieldId;
use super::step::{FormStep, Outcome};
use super::WalkInBathForm;
use crate::data::{CaseInput, TestCase, TestData};
use crate::result::{LeadformError, LeadformResult};

impl WalkInBathForm {
    /// Open the form and walk to `target` using `data.valid`
    #[instrument(skip_all, fields(step = %target))]
    pub async fn navigate_to(&self, target: FormStep, data: &TestData) -> LeadformResult<()> {
        self.open().await?;
        self.expect()
            .that(self.locators().field(FieldId::Zip))
            .to_be_visible()
            .await?;
        for step in target.prerequisites() {
            self.complete_step(*step, data).await?;
        }
        debug!("arrived");
        Ok(())
    }

    /// Enter the canonical inputs of `step`, advance and confirm the hop
    pub async fn complete_step(&self, step: FormStep, data: &TestData) -> LeadformResult<()> {
        for (field, input) in data.canonical_inputs(step) {
            self.enter_field(step, field, &input).await?;
        }
        self.advance(step).await?;
        self.expect_proceeded(step).await
    }

    /// Run the complete flow from the landing page to the confirmation page
    pub async fn complete_flow(&self, data: &TestData) -> LeadformResult<()> {
        self.navigate_to(FormStep::Phone, data).await?;
        for (field, input) in data.canonical_inputs(FormStep::Phone) {
            self.enter_field(FormStep::Phone, field, &input).await?;
        }
        self.expect_phone_formatted().await?;
        self.advance(FormStep::Phone).await?;
        self.expect_proceeded(FormStep::Phone).await
    }

    /// Reach the case's step, apply its input, advance and check the outcome.
    ///
    /// On contact info the other field gets its canonical value so only the
    /// field under test can fail.
    #[instrument(skip_all, fields(case = %case.id))]
    pub async fn run_case(&self, data: &TestData, case: &TestCase) -> LeadformResult<()> {
        let step = case.step();
        if step.is_terminal() {
            return Err(LeadformError::invalid_definition(format!(
                "case {} targets terminal step {step}",
                case.id
            )));
        }
        self.navigate_to(step, data).await?;

        for (field, input) in data.canonical_inputs(step) {
            if field.group() != case.field {
                self.enter_field(step, field, &input).await?;
            }
        }
        for (field, input) in case.input.to_field_inputs(case.field) {
            self.enter_field(step, field, &input).await?;
        }

        if step == FormStep::Phone && case.expected == Outcome::Proceeds {
            self.expect_phone_formatted().await?;
        }
        self.advance(step).await?;
        self.assert_field_outcome(step, case.field, case.expected)
            .await?;

        if let (FormStep::ZipCode, Outcome::StaysOnStep(_), CaseInput::Text(value)) =
            (step, case.expected, &case.input)
        {
            self.expect_field_retains(FieldId::Zip, value).await?;
        }
        Ok(())
    }
}
