//! SimulatedLeadSite: an in-process model of the homepage
//!
//! Renders the lead form, the slider and the videos as element snapshots
//! and reacts to fills and clicks with the same field rules and phone mask
//! as the deployed site. Transitions and error messages appear after
//! configurable delays measured on `tokio::time`, so tests on paused time
//! see the same ordering a browser would.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::debug;

use super::driver::{MockDriver, VirtualPage};
use super::snapshot::{ElementSnapshot, NodeInfo};
use crate::driver::{SessionFactory, SharedDriver};
use crate::form::rules::{
    email_rule, name_rule, phone_rule, selection_rule, zip_rule, Validation,
};
use crate::form::{
    mask_phone, ErrorKind, ErrorRegion, FieldGroup, FieldId, FormStep, Interest, PropertyOption,
    Transition,
};
use crate::locator::AriaRole;
use crate::result::{LeadformError, LeadformResult};

/// How the simulated site behaves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteBehavior {
    /// Delay between a valid advance and the next step showing
    pub transition_delay: Duration,
    /// Delay between a rejected advance and the error showing
    pub error_delay: Duration,
    /// Accept emails the format rule rejects (the production defect)
    pub accept_malformed_email: bool,
    /// Reject the interests step with nothing ticked
    pub require_interest: bool,
    /// Move on this long after a rejected advance, error and all
    pub proceed_despite_errors: Option<Duration>,
    /// Number of slides
    pub slide_count: usize,
    /// Fade-in time of a newly active slide
    pub slide_fade: Duration,
    /// Number of videos
    pub video_count: usize,
    /// Fields rendered disabled
    pub disabled_fields: Vec<FieldId>,
}

impl Default for SiteBehavior {
    fn default() -> Self {
        Self {
            transition_delay: Duration::from_millis(300),
            error_delay: Duration::from_millis(100),
            accept_malformed_email: true,
            require_interest: true,
            proceed_despite_errors: None,
            slide_count: crate::slider::EXPECTED_SLIDE_COUNT,
            slide_fade: Duration::from_millis(500),
            video_count: 2,
            disabled_fields: Vec::new(),
        }
    }
}

impl SiteBehavior {
    /// A site that enforces every rule, email format included
    #[must_use]
    pub fn strict() -> Self {
        Self {
            accept_malformed_email: false,
            ..Self::default()
        }
    }

    /// Set transition and error delays
    #[must_use]
    pub const fn with_delays(mut self, transition: Duration, error: Duration) -> Self {
        self.transition_delay = transition;
        self.error_delay = error;
        self
    }

    /// Advance after rejected input
    #[must_use]
    pub const fn with_premature_transition(mut self, after: Duration) -> Self {
        self.proceed_despite_errors = Some(after);
        self
    }

    /// Accept an empty interest selection
    #[must_use]
    pub const fn with_optional_interests(mut self) -> Self {
        self.require_interest = false;
        self
    }

    /// Render a field disabled
    #[must_use]
    pub fn with_disabled(mut self, field: FieldId) -> Self {
        self.disabled_fields.push(field);
        self
    }

    /// Set the number of slides
    #[must_use]
    pub const fn with_slides(mut self, count: usize) -> Self {
        self.slide_count = count;
        self
    }

    /// Set the number of videos
    #[must_use]
    pub const fn with_videos(mut self, count: usize) -> Self {
        self.video_count = count;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Blank,
    Home,
    ThankYou,
}

/// In-process model of the homepage and its lead form
#[derive(Debug)]
pub struct SimulatedLeadSite {
    behavior: SiteBehavior,
    base_url: String,
    url: String,
    screen: Screen,
    active: FormStep,
    pending_advance: Option<(Instant, FormStep)>,
    errors: Vec<ErrorRegion>,
    errors_from: Instant,
    zip: String,
    interests: [bool; 4],
    property: Option<PropertyOption>,
    name: String,
    email: String,
    phone: String,
    submissions: u32,
    slide: usize,
    slide_settles_at: Instant,
}

impl SimulatedLeadSite {
    /// Site served at `base_url`
    #[must_use]
    pub fn new(base_url: &str, behavior: SiteBehavior) -> Self {
        let now = Instant::now();
        Self {
            behavior,
            base_url: base_url.trim_end_matches('/').to_string(),
            url: "about:blank".to_string(),
            screen: Screen::Blank,
            active: FormStep::INITIAL,
            pending_advance: None,
            errors: Vec::new(),
            errors_from: now,
            zip: String::new(),
            interests: [false; 4],
            property: None,
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            submissions: 0,
            slide: 0,
            slide_settles_at: now,
        }
    }

    /// Step currently shown (after applying due transitions)
    pub fn active_step(&mut self) -> FormStep {
        self.tick();
        self.active
    }

    /// Completed submissions
    #[must_use]
    pub const fn submissions(&self) -> u32 {
        self.submissions
    }

    /// Behavior in effect
    #[must_use]
    pub const fn behavior(&self) -> &SiteBehavior {
        &self.behavior
    }

    fn reset(&mut self) {
        let fresh = Self::new(&self.base_url, self.behavior.clone());
        *self = Self {
            url: std::mem::take(&mut self.url),
            ..fresh
        };
    }

    fn tick(&mut self) {
        let Some((at, next)) = self.pending_advance else {
            return;
        };
        if Instant::now() < at {
            return;
        }
        self.pending_advance = None;
        self.errors.clear();
        self.active = next;
        debug!(step = %next, "simulated site advanced");
        if next == FormStep::ThankYou {
            self.submissions += 1;
            self.screen = Screen::ThankYou;
            self.url = format!("{}/thankyou/", self.base_url);
        }
    }

    fn validate(&self, step: FormStep) -> Vec<ErrorRegion> {
        let contract = step.contract();
        let mut regions = Vec::new();
        let mut check = |group: FieldGroup, validation: Validation| {
            if let Validation::Reject(kind) = validation {
                if let Some(region) = contract.region_for(group, kind) {
                    regions.push(region);
                }
            }
        };
        match step {
            FormStep::ZipCode => check(FieldGroup::Zip, zip_rule(&self.zip)),
            FormStep::Interests => {
                if self.behavior.require_interest {
                    let ticked = self.interests.iter().filter(|t| **t).count();
                    check(FieldGroup::Interests, selection_rule(ticked));
                }
            }
            FormStep::PropertyType => check(
                FieldGroup::PropertyType,
                selection_rule(usize::from(self.property.is_some())),
            ),
            FormStep::ContactInfo => {
                check(FieldGroup::Name, name_rule(&self.name));
                let email = email_rule(&self.email);
                let tolerated = self.behavior.accept_malformed_email
                    && email == Validation::Reject(ErrorKind::FormatInvalid);
                if !tolerated {
                    check(FieldGroup::Email, email);
                }
            }
            FormStep::Phone => check(FieldGroup::Phone, phone_rule(&self.phone)),
            FormStep::ThankYou => {}
        }
        regions
    }

    fn submit_step(&mut self, step: FormStep) -> LeadformResult<()> {
        self.tick();
        if self.pending_advance.is_some() || step != self.active {
            return Ok(());
        }
        let Some(next) = step.successor() else {
            return Ok(());
        };
        let now = Instant::now();
        let errors = self.validate(step);
        if errors.is_empty() {
            self.errors.clear();
            self.pending_advance = Some((now + self.behavior.transition_delay, next));
        } else {
            debug!(%step, ?errors, "simulated site rejected step");
            self.errors = errors;
            self.errors_from = now + self.behavior.error_delay;
            if let Some(after) = self.behavior.proceed_despite_errors {
                self.pending_advance = Some((now + after, next));
            }
        }
        Ok(())
    }

    fn move_slide(&mut self, forward: bool) {
        let n = self.behavior.slide_count;
        if n == 0 {
            return;
        }
        self.slide = if forward {
            (self.slide + 1) % n
        } else {
            (self.slide + n - 1) % n
        };
        self.slide_settles_at = Instant::now() + self.behavior.slide_fade;
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    fn form_node() -> NodeInfo {
        NodeInfo::new("div").with_id("form-container-1")
    }

    fn slider_node() -> NodeInfo {
        NodeInfo::new("div").with_attr("data-main-slider", "")
    }

    fn on_step(&self, step: FormStep) -> bool {
        self.screen == Screen::Home && self.active == step
    }

    fn enabled(&self, field: FieldId) -> bool {
        !self.behavior.disabled_fields.contains(&field)
    }

    fn field_input(&self, key: &str, field: FieldId, label: &str, value: &str) -> ElementSnapshot {
        let mut el = ElementSnapshot::new(key, "input")
            .within(Self::form_node())
            .with_attr("name", key)
            .with_role(AriaRole::Textbox, label)
            .with_value(value)
            .shown(self.on_step(field.group().step()));
        if !self.enabled(field) {
            el = el.disabled();
        }
        el
    }

    fn option(
        &self,
        key: &str,
        field: FieldId,
        role: AriaRole,
        label: &str,
        checked: bool,
    ) -> [ElementSnapshot; 2] {
        let visible = self.on_step(field.group().step());
        let mut label_el = ElementSnapshot::new(&format!("{key}-label"), "label")
            .within(Self::form_node())
            .with_text(label)
            .labelling(key)
            .checked(checked)
            .shown(visible);
        let mut input = ElementSnapshot::new(key, "input")
            .within(Self::form_node())
            .with_attr("type", if role == AriaRole::Radio { "radio" } else { "checkbox" })
            .with_role(role, label)
            .checked(checked)
            .hidden();
        if !self.enabled(field) {
            label_el = label_el.disabled();
            input = input.disabled();
        }
        [input, label_el]
    }

    fn button(&self, step: FormStep, transition: Transition) -> ElementSnapshot {
        let name = match transition {
            Transition::Next => "Next Step",
            Transition::GoToEstimate => "Go To Estimate",
            Transition::Submit => "Submit Your Request",
        };
        ElementSnapshot::new(&format!("advance-{}", step.index()), "button")
            .within(Self::form_node())
            .with_role(AriaRole::Button, name)
            .with_text(name)
            .shown(self.on_step(step))
    }

    fn error_message(region: ErrorRegion) -> &'static str {
        match region {
            ErrorRegion::Zip => "Wrong ZIP code.",
            ErrorRegion::Interest => "Please select at least one interest.",
            ErrorRegion::PropertyType => "Choose one of the variants.",
            ErrorRegion::NameMissing => "Please enter your name.",
            ErrorRegion::NameFormat => "Your name should consist only of letters.",
            ErrorRegion::NameFullName => "Should contain both first and last name.",
            ErrorRegion::Email => "Wrong email.",
            ErrorRegion::Phone => "Wrong phone number.",
        }
    }

    fn render_form(&self, out: &mut Vec<ElementSnapshot>) {
        out.push(self.field_input("zip", FieldId::Zip, "Enter ZIP Code", &self.zip));
        out.push(self.button(FormStep::ZipCode, Transition::Next));

        for (i, interest) in Interest::ALL.iter().enumerate() {
            let label = match interest {
                Interest::Independence => "Independence",
                Interest::Safety => "Safety",
                Interest::Therapy => "Therapy",
                Interest::Other => "Other",
            };
            out.extend(self.option(
                &format!("interest-{i}"),
                FieldId::Interest(*interest),
                AriaRole::Checkbox,
                label,
                self.interests[i],
            ));
        }
        out.push(self.button(FormStep::Interests, Transition::Next));

        for (i, option) in PropertyOption::ALL.iter().enumerate() {
            let label = match option {
                PropertyOption::OwnedHouse => "Owned House / Condo",
                PropertyOption::RentalProperty => "Rental Property",
                PropertyOption::MobileHome => "Mobile Home",
            };
            out.extend(self.option(
                &format!("property-{i}"),
                FieldId::PropertyType(*option),
                AriaRole::Radio,
                label,
                self.property == Some(*option),
            ));
        }
        out.push(self.button(FormStep::PropertyType, Transition::Next));

        out.push(self.field_input("name", FieldId::Name, "Enter Your Name", &self.name));
        out.push(self.field_input("email", FieldId::Email, "Enter Your Email", &self.email));
        out.push(self.button(FormStep::ContactInfo, Transition::GoToEstimate));

        out.push(
            self.field_input("phone", FieldId::Phone, "Phone Number", &self.phone)
                .with_attr("type", "tel"),
        );
        out.push(self.button(FormStep::Phone, Transition::Submit));

        let errors_shown = Instant::now() >= self.errors_from;
        for region in ErrorRegion::ALL {
            let text = Self::error_message(region);
            out.push(
                ElementSnapshot::new(&format!("error-{}", region as usize), "div")
                    .within(Self::form_node())
                    .with_class("error-message")
                    .with_text(text)
                    .shown(errors_shown && self.errors.contains(&region)),
            );
        }
    }

    fn render_slider(&self, out: &mut Vec<ElementSnapshot>) {
        out.push(ElementSnapshot::new("slider", "div").with_attr("data-main-slider", ""));
        let settled = Instant::now() >= self.slide_settles_at;
        for i in 0..self.behavior.slide_count {
            let index = i.to_string();
            let active = i == self.slide;
            let shown = active && settled;
            let mut slide = ElementSnapshot::new(&format!("slide-{i}"), "div")
                .within(Self::slider_node())
                .with_attr("data-slick-index", &index)
                .with_attr("aria-hidden", if shown { "false" } else { "true" })
                .with_class("slick-slide")
                .with_style("opacity", if shown { "1" } else { "0" });
            if active {
                slide = slide.with_class("slick-active").with_class("slick-current");
            }
            out.push(slide);
            out.push(
                ElementSnapshot::new(&format!("slide-img-{i}"), "img")
                    .within(Self::slider_node())
                    .within(NodeInfo::new("div").with_attr("data-slick-index", &index))
                    .with_role(AriaRole::Img, &format!("Walk-in tub {}", i + 1)),
            );
        }
        out.push(
            ElementSnapshot::new("slider-prev", "button")
                .within(Self::slider_node())
                .with_role(AriaRole::Button, "Previous"),
        );
        out.push(
            ElementSnapshot::new("slider-next", "button")
                .within(Self::slider_node())
                .with_role(AriaRole::Button, "Next"),
        );
    }
}

impl VirtualPage for SimulatedLeadSite {
    fn url(&mut self) -> String {
        self.tick();
        self.url.clone()
    }

    fn navigate(&mut self, url: &str) -> LeadformResult<()> {
        if !url.starts_with(&self.base_url) {
            return Err(LeadformError::Navigation {
                url: url.to_string(),
                message: format!("simulated site only serves {}", self.base_url),
            });
        }
        self.url = url.to_string();
        self.reset();
        self.screen = if url.contains("thankyou") {
            Screen::ThankYou
        } else {
            Screen::Home
        };
        Ok(())
    }

    fn elements(&mut self) -> Vec<ElementSnapshot> {
        self.tick();
        let mut out = Vec::new();
        match self.screen {
            Screen::Blank => {}
            Screen::ThankYou => {
                out.push(ElementSnapshot::new("thank-you", "h1").with_text("Thank you!"));
            }
            Screen::Home => {
                self.render_slider(&mut out);
                self.render_form(&mut out);
                for i in 0..self.behavior.video_count {
                    out.push(ElementSnapshot::new(&format!("video-{i}"), "video"));
                }
            }
        }
        out
    }

    fn fill(&mut self, key: &str, value: &str) -> LeadformResult<()> {
        self.tick();
        match key {
            "zip" => self.zip = value.to_string(),
            "name" => self.name = value.to_string(),
            "email" => self.email = value.to_string(),
            "phone" => self.phone = mask_phone(value),
            other => {
                return Err(LeadformError::driver(format!("cannot fill element {other}")));
            }
        }
        Ok(())
    }

    fn click(&mut self, key: &str) -> LeadformResult<()> {
        self.tick();
        if let Some(rest) = key.strip_prefix("advance-") {
            let step = rest
                .parse::<usize>()
                .ok()
                .and_then(|i| FormStep::ALL.get(i).copied())
                .ok_or_else(|| LeadformError::driver(format!("unknown button {key}")))?;
            return self.submit_step(step);
        }
        if let Some(i) = key.strip_prefix("interest-").and_then(|i| i.parse::<usize>().ok()) {
            if let Some(ticked) = self.interests.get_mut(i) {
                *ticked = !*ticked;
            }
            return Ok(());
        }
        if let Some(i) = key.strip_prefix("property-").and_then(|i| i.parse::<usize>().ok()) {
            self.property = PropertyOption::ALL.get(i).copied();
            return Ok(());
        }
        match key {
            "slider-next" => self.move_slide(true),
            "slider-prev" => self.move_slide(false),
            _ => {}
        }
        Ok(())
    }

    fn set_value_with_events(&mut self, key: &str, value: &str) -> LeadformResult<()> {
        self.fill(key, value)
    }
}

/// Opens a [`MockDriver`] over a fresh [`SimulatedLeadSite`] per session
#[derive(Debug, Clone)]
pub struct SimulatedSessionFactory {
    base_url: String,
    behavior: SiteBehavior,
}

impl SimulatedSessionFactory {
    /// Sessions on a site at `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>, behavior: SiteBehavior) -> Self {
        Self {
            base_url: base_url.into(),
            behavior,
        }
    }
}

#[async_trait]
impl SessionFactory for SimulatedSessionFactory {
    async fn open(&self) -> LeadformResult<SharedDriver> {
        let site = SimulatedLeadSite::new(&self.base_url, self.behavior.clone());
        Ok(Arc::new(MockDriver::new(site)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const BASE: &str = "https://site.test";

    fn site(behavior: SiteBehavior) -> SimulatedLeadSite {
        let mut site = SimulatedLeadSite::new(BASE, behavior);
        site.navigate(&format!("{BASE}/")).unwrap();
        site
    }

    fn visible_keys(site: &mut SimulatedLeadSite) -> Vec<String> {
        site.elements()
            .into_iter()
            .filter(|e| e.visible)
            .map(|e| e.key)
            .collect()
    }

    mod form_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_valid_zip_advances_after_delay() {
            let mut site = site(SiteBehavior::default());
            site.fill("zip", "48104").unwrap();
            site.click("advance-0").unwrap();
            assert_eq!(site.active_step(), FormStep::ZipCode);
            tokio::time::advance(Duration::from_millis(300)).await;
            assert_eq!(site.active_step(), FormStep::Interests);
            assert!(visible_keys(&mut site).contains(&"interest-0-label".to_string()));
        }

        #[tokio::test(start_paused = true)]
        async fn test_short_zip_shows_error_and_stays() {
            let mut site = site(SiteBehavior::default());
            site.fill("zip", "1234").unwrap();
            site.click("advance-0").unwrap();
            tokio::time::advance(Duration::from_millis(2000)).await;
            assert_eq!(site.active_step(), FormStep::ZipCode);
            let error_key = format!("error-{}", ErrorRegion::Zip as usize);
            assert!(visible_keys(&mut site).contains(&error_key));
        }

        #[tokio::test(start_paused = true)]
        async fn test_malformed_email_accepted_unless_strict() {
            for (behavior, expected) in [
                (SiteBehavior::default(), FormStep::Phone),
                (SiteBehavior::strict(), FormStep::ContactInfo),
            ] {
                let mut site = site(behavior);
                site.active = FormStep::ContactInfo;
                site.fill("name", "John Doe").unwrap();
                site.fill("email", "invalid-email@").unwrap();
                site.click("advance-3").unwrap();
                tokio::time::advance(Duration::from_millis(400)).await;
                assert_eq!(site.active_step(), expected);
            }
        }

        #[tokio::test(start_paused = true)]
        async fn test_phone_submission_reaches_thank_you() {
            let mut site = site(SiteBehavior::default());
            site.active = FormStep::Phone;
            site.set_value_with_events("phone", "55512345678").unwrap();
            assert_eq!(site.phone, "(555)123-4567");
            site.click("advance-4").unwrap();
            tokio::time::advance(Duration::from_millis(300)).await;
            assert_eq!(site.active_step(), FormStep::ThankYou);
            assert_eq!(site.url(), format!("{BASE}/thankyou/"));
            assert_eq!(site.submissions(), 1);
            assert_eq!(visible_keys(&mut site), vec!["thank-you".to_string()]);
        }

        #[tokio::test(start_paused = true)]
        async fn test_url_reflects_submission_before_elements_queried() {
            let mut site = site(SiteBehavior::default());
            site.active = FormStep::Phone;
            site.set_value_with_events("phone", "5551234567").unwrap();
            site.click("advance-4").unwrap();
            assert_eq!(site.url(), format!("{BASE}/"));
            tokio::time::advance(Duration::from_millis(300)).await;
            assert_eq!(site.url(), format!("{BASE}/thankyou/"));
            assert_eq!(site.submissions(), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn test_premature_transition_mode() {
            let behavior = SiteBehavior::default().with_premature_transition(Duration::from_millis(600));
            let mut site = site(behavior);
            site.click("advance-0").unwrap();
            tokio::time::advance(Duration::from_millis(200)).await;
            assert_eq!(site.active_step(), FormStep::ZipCode);
            tokio::time::advance(Duration::from_millis(400)).await;
            assert_eq!(site.active_step(), FormStep::Interests);
        }

        #[tokio::test]
        async fn test_radio_selection_is_exclusive() {
            let mut site = site(SiteBehavior::default());
            site.click("property-0").unwrap();
            site.click("property-2").unwrap();
            assert_eq!(site.property, Some(PropertyOption::MobileHome));
        }

        #[tokio::test]
        async fn test_navigation_outside_site_rejected() {
            let mut site = SimulatedLeadSite::new(BASE, SiteBehavior::default());
            let err = site.navigate("https://elsewhere.test/").unwrap_err();
            assert!(matches!(err, LeadformError::Navigation { .. }));
        }
    }

    mod slider_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_slide_fades_in() {
            let mut site = site(SiteBehavior::default());
            site.click("slider-prev").unwrap();
            let slide = |site: &mut SimulatedLeadSite| {
                site.elements()
                    .into_iter()
                    .find(|e| e.key == "slide-7")
                    .unwrap()
            };
            let s = slide(&mut site);
            assert!(s.node.classes.contains(&"slick-active".to_string()));
            assert_eq!(s.styles.get("opacity").map(String::as_str), Some("0"));
            tokio::time::advance(Duration::from_millis(500)).await;
            let s = slide(&mut site);
            assert_eq!(s.styles.get("opacity").map(String::as_str), Some("1"));
            assert_eq!(s.node.attribute("aria-hidden").as_deref(), Some("false"));
        }
    }
}
