//! `@page` rules and their margin boxes.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::rule::{CssRule, CssRuleType, GroupingRule, Rule, RuleLinks, WeakRule};
use super::rule_list::{CssRuleList, RuleListOwner};
use super::CssStyleSheet;
use crate::mutation::{self, Mutation};
use crate::style::{CssStyleDeclaration, PropertyDeclarationBlock};
use crate::{parser, serialize, Error, Result};

/// The sixteen page-margin box names.
pub const MARGIN_BOX_NAMES: [&str; 16] = [
    "top-left-corner",
    "top-left",
    "top-center",
    "top-right",
    "top-right-corner",
    "bottom-left-corner",
    "bottom-left",
    "bottom-center",
    "bottom-right",
    "bottom-right-corner",
    "left-top",
    "left-middle",
    "left-bottom",
    "right-top",
    "right-middle",
    "right-bottom",
];

/// Whether `name` (without `@`) names a page-margin box.
pub fn is_margin_box_name(name: &str) -> bool {
    MARGIN_BOX_NAMES.iter().any(|m| m.eq_ignore_ascii_case(name))
}

/// An `@page` rule.
///
/// Holds an optional page selector, page-level declarations, and margin rules
/// in a child list.
pub struct CssPageRule {
    pub(crate) links: RuleLinks,
    selector_text: RwLock<String>,
    style: CssStyleDeclaration,
    rules: CssRuleList,
}

impl CssPageRule {
    pub(crate) fn new(
        selector_text: String,
        block: PropertyDeclarationBlock,
        margins: Vec<CssRule>,
    ) -> Arc<Self> {
        let rule = Arc::new_cyclic(|this| {
            let owner = WeakRule::Page(this.clone());
            Self {
                links: RuleLinks::default(),
                selector_text: RwLock::new(selector_text),
                style: CssStyleDeclaration::with_block(Some(owner.clone()), block),
                rules: CssRuleList::new(RuleListOwner::Rule(owner)),
            }
        });
        rule.rules.replace_all(margins);
        rule
    }

    /// The page selector, e.g. `:first`. Empty when absent.
    pub fn selector_text(&self) -> String {
        self.selector_text.read().clone()
    }

    /// Replace the page selector. The empty string is allowed.
    pub fn set_selector_text(&self, text: &str) -> Result<()> {
        let selector = parser::parse_page_selector(text)?;
        *self.selector_text.write() = selector;
        mutation::notify(self.parent_style_sheet().as_ref(), Mutation::RuleChanged);
        Ok(())
    }

    /// The live page-level declarations.
    pub fn style(&self) -> CssStyleDeclaration {
        self.style.clone()
    }
}

impl Rule for CssPageRule {
    fn rule_type(&self) -> CssRuleType {
        CssRuleType::Page
    }

    fn css_text(&self) -> String {
        let margins: Vec<String> = self.rules.iter().map(|rule| rule.css_text()).collect();
        serialize::serialize_page_rule(&self.selector_text(), &self.style.declarations(), &margins)
    }

    fn set_css_text(&self, text: &str) -> Result<()> {
        let CssRule::Page(parsed) = parser::parse_rule(text)? else {
            return Err(Error::hierarchy("cssText must be an @page rule"));
        };
        *self.selector_text.write() = parsed.selector_text();
        self.style.replace_block(parsed.style.declarations());
        self.rules.replace_all(parsed.rules.to_vec());
        mutation::notify(self.parent_style_sheet().as_ref(), Mutation::RuleChanged);
        Ok(())
    }

    fn parent_rule(&self) -> Option<CssRule> {
        self.links.parent_rule()
    }

    fn parent_style_sheet(&self) -> Option<CssStyleSheet> {
        self.links.parent_style_sheet()
    }
}

impl GroupingRule for CssPageRule {
    fn css_rules(&self) -> CssRuleList {
        self.rules.clone()
    }
}

impl fmt::Debug for CssPageRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CssPageRule")
            .field("selector_text", &self.selector_text())
            .field("style", &self.style)
            .field("rules", &self.rules)
            .finish()
    }
}

/// A page-margin rule such as `@top-left { content: "x" }`.
pub struct CssMarginRule {
    pub(crate) links: RuleLinks,
    name: RwLock<String>,
    style: CssStyleDeclaration,
}

impl CssMarginRule {
    pub(crate) fn new(name: String, block: PropertyDeclarationBlock) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            links: RuleLinks::default(),
            name: RwLock::new(name),
            style: CssStyleDeclaration::with_block(Some(WeakRule::Margin(this.clone())), block),
        })
    }

    /// The margin box name, lowercased and without `@`.
    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    pub fn style(&self) -> CssStyleDeclaration {
        self.style.clone()
    }
}

impl Rule for CssMarginRule {
    fn rule_type(&self) -> CssRuleType {
        CssRuleType::Margin
    }

    fn css_text(&self) -> String {
        let prelude = format!("@{}", self.name());
        serialize::serialize_block_rule(&prelude, &self.style.declarations(), &[])
    }

    fn set_css_text(&self, text: &str) -> Result<()> {
        let CssRule::Margin(parsed) = parser::parse_rule(text)? else {
            return Err(Error::hierarchy("cssText must be a margin rule"));
        };
        *self.name.write() = parsed.name();
        self.style.replace_block(parsed.style.declarations());
        mutation::notify(self.parent_style_sheet().as_ref(), Mutation::RuleChanged);
        Ok(())
    }

    fn parent_rule(&self) -> Option<CssRule> {
        self.links.parent_rule()
    }

    fn parent_style_sheet(&self) -> Option<CssStyleSheet> {
        self.links.parent_style_sheet()
    }
}

impl fmt::Debug for CssMarginRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CssMarginRule")
            .field("name", &self.name())
            .field("style", &self.style)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_rule(css: &str) -> Arc<CssPageRule> {
        parser::parse_rule(css).unwrap().as_page().unwrap().clone()
    }

    #[test]
    fn page_with_margins() {
        let rule = page_rule("@page :first { margin: 1in; @top-left { content: \"x\" } }");
        assert_eq!(rule.selector_text(), ":first");
        assert_eq!(rule.style().get_property_value("margin"), "1in");
        assert_eq!(rule.css_rules().len(), 1);
        assert_eq!(
            rule.css_text(),
            "@page :first { margin: 1in; @top-left { content: \"x\"; } }"
        );
    }

    #[test]
    fn empty_page() {
        assert_eq!(page_rule("@page{}").css_text(), "@page { }");
    }

    #[test]
    fn margin_rules_only() {
        let rule = page_rule("@page { }");
        rule.insert_rule("@bottom-center { content: counter(page) }", 0).unwrap();
        assert!(rule.insert_rule("a { }", 0).unwrap_err().is_hierarchy());

        let margin = rule.css_rules().item(0).unwrap();
        assert_eq!(margin.rule_type(), CssRuleType::Margin);
        assert_eq!(margin.as_margin().unwrap().name(), "bottom-center");
        assert!(margin.parent_rule().unwrap().ptr_eq(&CssRule::Page(rule.clone())));
    }

    #[test]
    fn margin_names() {
        assert!(is_margin_box_name("top-left"));
        assert!(is_margin_box_name("Bottom-Right-Corner"));
        assert!(!is_margin_box_name("top"));
    }

    #[test]
    fn page_selector_setter() {
        let rule = page_rule("@page :left { }");
        rule.set_selector_text("").unwrap();
        assert_eq!(rule.css_text(), "@page { }");
        assert!(rule.set_selector_text("{").unwrap_err().is_syntax());
    }
}
