//! The scenario catalogue
//!
//! One scenario per equivalence-class case, plus the end-to-end, slider and
//! video scenarios. Case scenarios look their case up by id at run time so a
//! runner built with a customised [`TestData`] exercises the custom rows.

use futures::FutureExt;

use crate::data::{TestCase, TestData};
use crate::form::{ErrorKind, FieldId, FormStep, Interest, Outcome};
use crate::harness::{Scenario, ScenarioContext};
use crate::result::LeadformError;
use crate::slider::EXPECTED_SLIDE_COUNT;

/// Everything, in run order
#[must_use]
pub fn standard_catalogue(data: &TestData) -> Vec<Scenario> {
    let mut scenarios: Vec<Scenario> = data.cases().iter().map(case_scenario).collect();
    scenarios.extend(flow_scenarios());
    scenarios.extend(slider_scenarios());
    scenarios.push(video_scenario());
    scenarios
}

/// Scenario that runs one data case
#[must_use]
pub fn case_scenario(case: &TestCase) -> Scenario {
    let id = case.id.clone();
    let scenario = Scenario::new(
        format!("{}: {}", case.id, case.description),
        case.field.to_string(),
        move |ctx: ScenarioContext| {
            let id = id.clone();
            async move {
                let case = ctx
                    .data
                    .case(&id)
                    .ok_or_else(|| LeadformError::invalid_definition(format!("no case {id}")))?;
                ctx.form()?.run_case(&ctx.data, case).await
            }
            .boxed()
        },
    )
    .with_status(case.status.clone())
    .with_tag("form");
    if case.status.is_gating() {
        scenario
    } else {
        scenario.with_tag(case.status.label())
    }
}

fn flow_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new("complete flow reaches the thank-you page", "e2e", |ctx| {
            async move { ctx.form()?.complete_flow(&ctx.data).await }.boxed()
        })
        .with_tag("smoke"),
        Scenario::new("phone input is masked and truncated to ten digits", "e2e", |ctx| {
            async move {
                let form = ctx.form()?;
                form.navigate_to(FormStep::Phone, &ctx.data).await?;
                form.enter_phone_number("55512345678").await?;
                form.expect_phone_value("(555)123-4567").await
            }
            .boxed()
        }),
        Scenario::new("selected interests stay checked", "e2e", |ctx| {
            async move {
                let form = ctx.form()?;
                form.navigate_to(FormStep::Interests, &ctx.data).await?;
                form.select_all_interests().await?;
                form.expect_interests_selected(&Interest::ALL).await
            }
            .boxed()
        }),
        Scenario::new("property type options are offered", "e2e", |ctx| {
            async move {
                let form = ctx.form()?;
                form.navigate_to(FormStep::PropertyType, &ctx.data).await?;
                form.expect_property_types_available().await?;
                form.select_property_type(ctx.data.valid.property_type).await?;
                form.expect_property_type_selected(ctx.data.valid.property_type)
                    .await
            }
            .boxed()
        }),
        Scenario::new("contact info survives a rejected name", "e2e", |ctx| {
            async move {
                let form = ctx.form()?;
                form.navigate_to(FormStep::ContactInfo, &ctx.data).await?;
                form.enter_contact_info("Joe", &ctx.data.valid.email).await?;
                form.click_go_to_estimate().await?;
                form.assert_outcome(
                    FormStep::ContactInfo,
                    Outcome::StaysOnStep(ErrorKind::MustSpecifyFullName),
                )
                .await?;
                form.expect_field_retains(FieldId::Email, &ctx.data.valid.email)
                    .await
            }
            .boxed()
        }),
    ]
}

fn slider_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new("slider and its navigation are visible", "slider", |ctx| {
            async move {
                let slider = ctx.slider()?;
                slider.open().await?;
                slider.expect_visible().await?;
                slider.expect_navigation_visible().await
            }
            .boxed()
        })
        .with_tag("smoke"),
        Scenario::new("slider has eight slides", "slider", |ctx| {
            async move {
                let slider = ctx.slider()?;
                slider.open().await?;
                slider.expect_slide_count(EXPECTED_SLIDE_COUNT).await
            }
            .boxed()
        }),
        Scenario::new("every slide image is visible", "slider", |ctx| {
            async move {
                let slider = ctx.slider()?;
                slider.open().await?;
                slider.expect_all_images_loaded().await
            }
            .boxed()
        }),
        Scenario::new("next moves from the first to the second slide", "slider", |ctx| {
            async move {
                let slider = ctx.slider()?;
                slider.open().await?;
                slider.expect_active_index(0).await?;
                slider.click_next().await?;
                slider.expect_active_index(1).await
            }
            .boxed()
        }),
        Scenario::new("previous moves from the second back to the first slide", "slider", |ctx| {
            async move {
                let slider = ctx.slider()?;
                slider.open().await?;
                slider.click_next().await?;
                slider.click_previous().await?;
                slider.expect_active_index(0).await
            }
            .boxed()
        }),
        Scenario::new("every slide can be reached", "slider", |ctx| {
            async move {
                let slider = ctx.slider()?;
                slider.open().await?;
                slider.expect_can_visit_all_slides().await
            }
            .boxed()
        }),
        Scenario::new("slider wraps around in both directions", "slider", |ctx| {
            async move {
                let slider = ctx.slider()?;
                slider.open().await?;
                slider.expect_circular_navigation().await
            }
            .boxed()
        }),
        Scenario::new("slider jumps to a slide and back", "slider", |ctx| {
            async move {
                let slider = ctx.slider()?;
                slider.open().await?;
                slider.navigate_to_slide(3).await?;
                slider.expect_active_index(3).await?;
                slider.navigate_to_slide(0).await?;
                slider.expect_active_index(0).await
            }
            .boxed()
        }),
    ]
}

fn video_scenario() -> Scenario {
    Scenario::new("videos are present and visible", "video", |ctx| {
        async move {
            let videos = ctx.videos();
            videos.open().await?;
            videos.expect_all_visible().await
        }
        .boxed()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CaseStatus;
    use std::collections::HashSet;

    mod catalogue_tests {
        use super::*;

        #[test]
        fn test_one_scenario_per_case() {
            let data = TestData::standard();
            let catalogue = standard_catalogue(&data);
            let form = catalogue.iter().filter(|s| s.tags().iter().any(|t| t == "form")).count();
            assert_eq!(form, data.cases().len());
        }

        #[test]
        fn test_names_unique() {
            let catalogue = standard_catalogue(&TestData::standard());
            let names: HashSet<&str> = catalogue.iter().map(Scenario::name).collect();
            assert_eq!(names.len(), catalogue.len());
        }

        #[test]
        fn test_groups_cover_the_page() {
            let catalogue = standard_catalogue(&TestData::standard());
            let groups: HashSet<&str> = catalogue.iter().map(Scenario::group).collect();
            for g in ["zip", "interests", "property type", "name", "email", "phone", "e2e", "slider", "video"] {
                assert!(groups.contains(g), "missing group {g}");
            }
        }

        #[test]
        fn test_status_carried_and_tagged() {
            let catalogue = standard_catalogue(&TestData::standard());
            let email = catalogue
                .iter()
                .find(|s| s.name().starts_with("email/missing-at"))
                .unwrap();
            assert!(matches!(email.status(), CaseStatus::KnownDefect(_)));
            assert!(email.matches("@known-defect"));
            let pending = catalogue
                .iter()
                .find(|s| s.name().starts_with("phone/empty"))
                .unwrap();
            assert!(!pending.status().is_runnable());
        }

        #[test]
        fn test_slider_scenarios() {
            let catalogue = standard_catalogue(&TestData::standard());
            assert_eq!(catalogue.iter().filter(|s| s.group() == "slider").count(), 8);
        }
    }
}
