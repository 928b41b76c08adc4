//! Element snapshots and the CSS subset the mock driver understands
//!
//! Supported: type, `#id`, `.class`, `[attr]`, `[attr="value"]` compounds
//! joined by the descendant combinator (whitespace).

use std::collections::BTreeMap;

use crate::locator::AriaRole;

/// Static facts about a DOM node (used for both elements and ancestors)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeInfo {
    /// Lower-case tag name
    pub tag: String,
    /// `id` attribute
    pub id: Option<String>,
    /// Class list
    pub classes: Vec<String>,
    /// Other attributes
    pub attrs: BTreeMap<String, String>,
}

impl NodeInfo {
    /// Create a node with a tag
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Set the id
    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// Add a class
    #[must_use]
    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    /// Attribute lookup, including `id` and `class`
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.clone(),
            "class" if !self.classes.is_empty() => Some(self.classes.join(" ")),
            _ => self.attrs.get(name).cloned(),
        }
    }

    fn matches_compound(&self, compound: &Compound) -> bool {
        if let Some(tag) = &compound.tag {
            if *tag != self.tag {
                return false;
            }
        }
        if let Some(id) = &compound.id {
            if self.id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !compound.classes.iter().all(|c| self.classes.contains(c)) {
            return false;
        }
        compound
            .attrs
            .iter()
            .all(|(name, expected)| match (self.attribute(name), expected) {
                (Some(actual), Some(expected)) => actual == *expected,
                (Some(_), None) => true,
                (None, _) => false,
            })
    }
}

/// Everything the mock driver can observe about one element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementSnapshot {
    /// Stable key the page uses to route actions back to the element
    pub key: String,
    /// The element itself
    pub node: NodeInfo,
    /// Ancestors, outermost first
    pub ancestors: Vec<NodeInfo>,
    /// ARIA role
    pub role: Option<AriaRole>,
    /// Accessible name
    pub name: String,
    /// Normalized text content
    pub text: String,
    /// Rendered and not hidden
    pub visible: bool,
    /// Accepts input
    pub enabled: bool,
    /// Checked state (of the element or its associated control)
    pub checked: bool,
    /// Current input value
    pub value: String,
    /// Computed style subset
    pub styles: BTreeMap<String, String>,
    /// Key of the form control this element labels
    pub control: Option<String>,
}

impl ElementSnapshot {
    /// Visible, enabled element
    #[must_use]
    pub fn new(key: &str, tag: &str) -> Self {
        Self {
            key: key.to_string(),
            node: NodeInfo::new(tag),
            visible: true,
            enabled: true,
            ..Self::default()
        }
    }

    /// Nest inside another node (call outermost first)
    #[must_use]
    pub fn within(mut self, ancestor: NodeInfo) -> Self {
        self.ancestors.push(ancestor);
        self
    }

    /// Set the id
    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.node.id = Some(id.to_string());
        self
    }

    /// Add a class
    #[must_use]
    pub fn with_class(mut self, class: &str) -> Self {
        self.node.classes.push(class.to_string());
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.node.attrs.insert(name.to_string(), value.to_string());
        self
    }

    /// Set role and accessible name
    #[must_use]
    pub fn with_role(mut self, role: AriaRole, name: &str) -> Self {
        self.role = Some(role);
        self.name = name.to_string();
        self
    }

    /// Set text content
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Set input value
    #[must_use]
    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    /// Set a computed style property
    #[must_use]
    pub fn with_style(mut self, property: &str, value: &str) -> Self {
        self.styles.insert(property.to_string(), value.to_string());
        self
    }

    /// Label the control with the given key
    #[must_use]
    pub fn labelling(mut self, control_key: &str) -> Self {
        self.control = Some(control_key.to_string());
        self
    }

    /// Set visibility
    #[must_use]
    pub const fn shown(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Mark hidden
    #[must_use]
    pub const fn hidden(self) -> Self {
        self.shown(false)
    }

    /// Mark disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Set checked state
    #[must_use]
    pub const fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// Key that input actions should target
    #[must_use]
    pub fn action_target(&self) -> &str {
        self.control.as_deref().unwrap_or(&self.key)
    }

    /// Whether the element matches a CSS selector
    #[must_use]
    pub fn matches_css(&self, css: &str) -> bool {
        let Some(chain) = parse_chain(css) else {
            return false;
        };
        let Some((last, rest)) = chain.split_last() else {
            return false;
        };
        self.node.matches_compound(last) && ancestors_match(&self.ancestors, rest)
    }

    /// Whether some ancestor matches a CSS selector
    #[must_use]
    pub fn is_within(&self, css: &str) -> bool {
        let Some(chain) = parse_chain(css) else {
            return false;
        };
        let Some((last, rest)) = chain.split_last() else {
            return false;
        };
        (0..self.ancestors.len()).any(|i| {
            self.ancestors[i].matches_compound(last) && ancestors_match(&self.ancestors[..i], rest)
        })
    }
}

/// Match `chain` (outermost first) against `ancestors` (outermost first)
fn ancestors_match(ancestors: &[NodeInfo], chain: &[Compound]) -> bool {
    let mut remaining = ancestors.len();
    for compound in chain.iter().rev() {
        match ancestors[..remaining]
            .iter()
            .rposition(|node| node.matches_compound(compound))
        {
            Some(pos) => remaining = pos,
            None => return false,
        }
    }
    true
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

fn parse_chain(css: &str) -> Option<Vec<Compound>> {
    split_outside_brackets(css)
        .into_iter()
        .map(|part| parse_compound(&part))
        .collect()
}

fn split_outside_brackets(css: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for ch in css.trim().chars() {
        match (ch, quote) {
            (q, Some(open)) if q == open => {
                quote = None;
                current.push(ch);
            }
            (_, Some(_)) => current.push(ch),
            ('"' | '\'', None) => {
                quote = Some(ch);
                current.push(ch);
            }
            ('[', None) => {
                depth += 1;
                current.push(ch);
            }
            (']', None) => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            (c, None) if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

fn parse_compound(input: &str) -> Option<Compound> {
    let mut compound = Compound::default();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    let ident_end = |from: usize| {
        let mut j = from;
        while j < chars.len() && (chars[j].is_alphanumeric() || chars[j] == '-' || chars[j] == '_')
        {
            j += 1;
        }
        j
    };

    if i < chars.len() && chars[i] == '*' {
        i += 1;
    } else {
        let end = ident_end(i);
        if end > i {
            compound.tag = Some(chars[i..end].iter().collect::<String>().to_ascii_lowercase());
            i = end;
        }
    }

    while i < chars.len() {
        match chars[i] {
            '#' | '.' => {
                let end = ident_end(i + 1);
                if end == i + 1 {
                    return None;
                }
                let name: String = chars[i + 1..end].iter().collect();
                if chars[i] == '#' {
                    compound.id = Some(name);
                } else {
                    compound.classes.push(name);
                }
                i = end;
            }
            '[' => {
                let close = chars[i..].iter().position(|&c| c == ']')? + i;
                let body: String = chars[i + 1..close].iter().collect();
                let attr = match body.split_once('=') {
                    Some((name, value)) => (
                        name.trim().to_string(),
                        Some(value.trim().trim_matches(|c| c == '"' || c == '\'').to_string()),
                    ),
                    None => (body.trim().to_string(), None),
                };
                compound.attrs.push(attr);
                i = close + 1;
            }
            _ => return None,
        }
    }
    Some(compound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone() -> ElementSnapshot {
        ElementSnapshot::new("phone", "input")
            .within(NodeInfo::new("div").with_id("form-container-1"))
            .within(NodeInfo::new("div").with_class("step").with_class("step-5"))
            .with_attr("name", "phone")
            .with_class("form-input")
    }

    #[test]
    fn test_compound_with_attribute_value() {
        assert!(phone().matches_css(r#"input[name="phone"]"#));
        assert!(phone().matches_css("input[name='phone']"));
        assert!(!phone().matches_css(r#"input[name="email"]"#));
        assert!(phone().matches_css("[name]"));
    }

    #[test]
    fn test_class_and_id() {
        assert!(phone().matches_css("input.form-input"));
        assert!(!phone().matches_css("textarea.form-input"));
    }

    #[test]
    fn test_descendant_chain() {
        assert!(phone().matches_css("#form-container-1 .step input"));
        assert!(phone().matches_css("#form-container-1 input"));
        assert!(!phone().matches_css(".step #form-container-1 input"));
    }

    #[test]
    fn test_is_within() {
        assert!(phone().is_within("#form-container-1"));
        assert!(phone().is_within("div.step-5"));
        assert!(!phone().is_within("[data-main-slider]"));
    }

    #[test]
    fn test_multi_class_active_slide() {
        let slide = ElementSnapshot::new("s0", "div")
            .with_attr("data-slick-index", "0")
            .with_class("slick-slide")
            .with_class("slick-active")
            .with_class("slick-current");
        assert!(slide.matches_css("[data-slick-index].slick-active.slick-current"));
        let other = ElementSnapshot::new("s1", "div")
            .with_attr("data-slick-index", "1")
            .with_class("slick-active");
        assert!(!other.matches_css("[data-slick-index].slick-active.slick-current"));
    }

    #[test]
    fn test_garbage_selector_matches_nothing() {
        assert!(!phone().matches_css("input > span"));
        assert!(!phone().matches_css(""));
    }

    #[test]
    fn test_action_target_follows_label() {
        let label = ElementSnapshot::new("label-safety", "label").labelling("safety");
        assert_eq!(label.action_target(), "safety");
        assert_eq!(phone().action_target(), "phone");
    }
}
