//! Locator abstraction for element selection.
//!
//! Locators are data. A driver resolves them: the CDP driver ships them to
//! the page as a JSON spec interpreted by a small JS runtime, the mock driver
//! matches them against element snapshots.
//!
//! # Matching rules
//!
//! - **Role**: ARIA role plus accessible name pattern; hidden elements never
//!   match (an inactive step's "Next" button is invisible to role queries)
//! - **Text**: deepest element whose normalized text matches the pattern
//! - **Css**: plain CSS selector
//! - Optional CSS scope, `has_text` filter and `nth` index narrow the set

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::mock::ElementSnapshot;
use crate::result::{LeadformError, LeadformResult};

/// ARIA roles the suite locates by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AriaRole {
    /// Text input
    Textbox,
    /// Button
    Button,
    /// Checkbox
    Checkbox,
    /// Radio button
    Radio,
    /// Heading
    Heading,
    /// Link
    Link,
    /// Image
    Img,
}

impl AriaRole {
    /// Role name as used in ARIA
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Textbox => "textbox",
            Self::Button => "button",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Heading => "heading",
            Self::Link => "link",
            Self::Img => "img",
        }
    }
}

impl fmt::Display for AriaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Regex used to match accessible names and text content
#[derive(Debug, Clone)]
pub struct TextPattern {
    source: String,
    case_insensitive: bool,
    regex: Regex,
}

impl TextPattern {
    /// Case-insensitive pattern (the `/.../i` form)
    pub fn new(source: impl Into<String>) -> LeadformResult<Self> {
        Self::build(source.into(), true)
    }

    /// Case-sensitive whole-string match of a literal
    pub fn exact(literal: &str) -> LeadformResult<Self> {
        Self::build(format!("^{}$", regex::escape(literal)), false)
    }

    fn build(source: String, case_insensitive: bool) -> LeadformResult<Self> {
        let regex = RegexBuilder::new(&source)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|e| LeadformError::invalid_definition(format!("bad pattern /{source}/: {e}")))?;
        Ok(Self {
            source,
            case_insensitive,
            regex,
        })
    }

    /// Pattern source
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// JS `RegExp` flags
    #[must_use]
    pub const fn flags(&self) -> &'static str {
        if self.case_insensitive {
            "i"
        } else {
            ""
        }
    }

    /// Test a string against the pattern
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    fn to_spec(&self) -> serde_json::Value {
        json!({ "source": self.source, "flags": self.flags() })
    }
}

impl PartialEq for TextPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.case_insensitive == other.case_insensitive
    }
}

impl Eq for TextPattern {}

impl fmt::Display for TextPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags())
    }
}

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// CSS selector (e.g., `input[name="phone"]`)
    Css(String),
    /// Role plus accessible name
    Role {
        /// ARIA role
        role: AriaRole,
        /// Accessible name pattern
        name: TextPattern,
    },
    /// Text content
    Text(TextPattern),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// JSON spec consumed by the in-page resolver
    #[must_use]
    pub fn to_spec(&self) -> serde_json::Value {
        match self {
            Self::Css(css) => json!({ "kind": "css", "css": css }),
            Self::Role { role, name } => {
                json!({ "kind": "role", "role": role.as_str(), "name": name.to_spec() })
            }
            Self::Text(pattern) => json!({ "kind": "text", "text": pattern.to_spec() }),
        }
    }

    fn matches(&self, el: &ElementSnapshot) -> bool {
        match self {
            Self::Css(css) => el.matches_css(css),
            Self::Role { role, name } => {
                el.visible && el.role == Some(*role) && name.is_match(&el.name)
            }
            Self::Text(pattern) => pattern.is_match(&el.text),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => write!(f, "css={css}"),
            Self::Role { role, name } => write!(f, "role={role}[name={name}]"),
            Self::Text(pattern) => write!(f, "text={pattern}"),
        }
    }
}

/// A locator: selector plus narrowing filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    selector: Selector,
    scope: Option<String>,
    has_text: Option<TextPattern>,
    nth: Option<usize>,
    strict: bool,
}

impl Locator {
    /// Create a new locator with a CSS selector
    #[must_use]
    pub fn new(css: impl Into<String>) -> Self {
        Self::from_selector(Selector::css(css))
    }

    /// Create a locator from a selector
    #[must_use]
    pub const fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            scope: None,
            has_text: None,
            nth: None,
            strict: true,
        }
    }

    /// Locate by role and case-insensitive name pattern
    pub fn role(role: AriaRole, name: &str) -> LeadformResult<Self> {
        Ok(Self::from_selector(Selector::Role {
            role,
            name: TextPattern::new(name)?,
        }))
    }

    /// Locate by role and exact (case-sensitive, whole) name
    pub fn role_exact(role: AriaRole, name: &str) -> LeadformResult<Self> {
        Ok(Self::from_selector(Selector::Role {
            role,
            name: TextPattern::exact(name)?,
        }))
    }

    /// Locate by case-insensitive text pattern
    pub fn text(pattern: &str) -> LeadformResult<Self> {
        Ok(Self::from_selector(Selector::Text(TextPattern::new(pattern)?)))
    }

    /// Only match inside elements matching `css`
    #[must_use]
    pub fn within(mut self, css: impl Into<String>) -> Self {
        self.scope = Some(css.into());
        self
    }

    /// Keep only elements whose text matches `pattern`
    pub fn with_text(mut self, pattern: &str) -> LeadformResult<Self> {
        self.has_text = Some(TextPattern::new(pattern)?);
        Ok(self)
    }

    /// Pick the n-th match (0-based)
    #[must_use]
    pub fn nth(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.nth = Some(index);
        next
    }

    /// Allow multiple matches (first wins for single-element operations)
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Whether multiple matches are an error
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.strict && self.nth.is_none()
    }

    /// JSON spec consumed by the in-page resolver
    #[must_use]
    pub fn to_spec(&self) -> serde_json::Value {
        json!({
            "selector": self.selector.to_spec(),
            "scope": self.scope,
            "hasText": self.has_text.as_ref().map(TextPattern::to_spec),
            "nth": self.nth,
        })
    }

    /// Resolve against a snapshot list (document order), returning indices
    #[must_use]
    pub fn resolve(&self, elements: &[ElementSnapshot]) -> Vec<usize> {
        let matched: Vec<usize> = elements
            .iter()
            .enumerate()
            .filter(|(_, el)| self.matches(el))
            .map(|(i, _)| i)
            .collect();
        match self.nth {
            Some(n) => matched.get(n).copied().into_iter().collect(),
            None => matched,
        }
    }

    fn matches(&self, el: &ElementSnapshot) -> bool {
        if let Some(scope) = &self.scope {
            if !el.is_within(scope) {
                return false;
            }
        }
        if let Some(pattern) = &self.has_text {
            if !pattern.is_match(&el.text) {
                return false;
            }
        }
        self.selector.matches(el)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scope) = &self.scope {
            write!(f, "{scope} >> ")?;
        }
        write!(f, "{}", self.selector)?;
        if let Some(pattern) = &self.has_text {
            write!(f, " >> has-text={pattern}")?;
        }
        if let Some(n) = self.nth {
            write!(f, " >> nth={n}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mock::NodeInfo;

    mod pattern_tests {
        use super::*;

        #[test]
        fn test_case_insensitive_by_default() {
            let p = TextPattern::new("enter zip code").unwrap();
            assert!(p.is_match("Enter ZIP Code"));
            assert_eq!(p.flags(), "i");
            assert_eq!(p.to_string(), "/enter zip code/i");
        }

        #[test]
        fn test_exact_is_whole_and_case_sensitive() {
            let p = TextPattern::exact("Next").unwrap();
            assert!(p.is_match("Next"));
            assert!(!p.is_match("next"));
            assert!(!p.is_match("Next slide"));
        }

        #[test]
        fn test_exact_escapes_metacharacters() {
            let p = TextPattern::exact("(a)").unwrap();
            assert!(p.is_match("(a)"));
        }

        #[test]
        fn test_bad_pattern_is_definition_error() {
            let err = TextPattern::new("(").unwrap_err();
            assert!(matches!(err, LeadformError::InvalidDefinition { .. }));
        }

        #[test]
        fn test_owned_house_pattern() {
            let p = TextPattern::new(r"owned house\s*/\s*condo").unwrap();
            assert!(p.is_match("Owned House / Condo"));
            assert!(p.is_match("owned house/condo"));
        }
    }

    mod spec_tests {
        use super::*;

        #[test]
        fn test_role_spec() {
            let loc = Locator::role(AriaRole::Textbox, "enter zip code")
                .unwrap()
                .within("#form-container-1");
            let spec = loc.to_spec();
            assert_eq!(spec["selector"]["kind"], "role");
            assert_eq!(spec["selector"]["role"], "textbox");
            assert_eq!(spec["selector"]["name"]["source"], "enter zip code");
            assert_eq!(spec["selector"]["name"]["flags"], "i");
            assert_eq!(spec["scope"], "#form-container-1");
            assert!(spec["nth"].is_null());
        }

        #[test]
        fn test_css_with_text_spec() {
            let loc = Locator::new("h1").with_text("thank you").unwrap();
            let spec = loc.to_spec();
            assert_eq!(spec["selector"]["css"], "h1");
            assert_eq!(spec["hasText"]["source"], "thank you");
        }

        #[test]
        fn test_display() {
            let loc = Locator::text("wrong zip code")
                .unwrap()
                .within("#form-container-1");
            assert_eq!(loc.to_string(), "#form-container-1 >> text=/wrong zip code/i");
            assert_eq!(Locator::new("video").nth(2).to_string(), "css=video >> nth=2");
        }

        #[test]
        fn test_nth_disables_strictness() {
            let loc = Locator::new("video");
            assert!(loc.is_strict());
            assert!(!loc.nth(0).is_strict());
            assert!(!loc.clone().with_strict(false).is_strict());
        }
    }

    mod resolve_tests {
        use super::*;

        fn page() -> Vec<ElementSnapshot> {
            let form = NodeInfo::new("div").with_id("form-container-1");
            vec![
                ElementSnapshot::new("zip", "input")
                    .within(form.clone())
                    .with_role(AriaRole::Textbox, "Enter ZIP code"),
                ElementSnapshot::new("next-1", "button")
                    .within(form.clone())
                    .with_role(AriaRole::Button, "Next"),
                ElementSnapshot::new("next-2", "button")
                    .within(form.clone())
                    .with_role(AriaRole::Button, "Next")
                    .hidden(),
                ElementSnapshot::new("outside", "button").with_role(AriaRole::Button, "Next"),
                ElementSnapshot::new("err", "span")
                    .within(form)
                    .with_text("Wrong ZIP code."),
            ]
        }

        #[test]
        fn test_role_skips_hidden_elements() {
            let loc = Locator::role(AriaRole::Button, "next")
                .unwrap()
                .within("#form-container-1");
            assert_eq!(loc.resolve(&page()), vec![1]);
        }

        #[test]
        fn test_unscoped_role_sees_both_visible() {
            let loc = Locator::role(AriaRole::Button, "next").unwrap();
            assert_eq!(loc.resolve(&page()), vec![1, 3]);
            assert_eq!(loc.nth(1).resolve(&page()), vec![3]);
            assert!(loc.nth(5).resolve(&page()).is_empty());
        }

        #[test]
        fn test_text_match() {
            let loc = Locator::text("wrong zip code").unwrap();
            assert_eq!(loc.resolve(&page()), vec![4]);
        }

        #[test]
        fn test_css_match() {
            let loc = Locator::new("#form-container-1 input");
            assert_eq!(loc.resolve(&page()), vec![0]);
        }
    }
}
