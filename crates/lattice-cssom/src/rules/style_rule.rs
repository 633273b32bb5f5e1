//! Style rules (`CSSStyleRule`).

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::rule::{CssRule, CssRuleType, Rule, RuleLinks, WeakRule};
use super::CssStyleSheet;
use crate::mutation::{self, Mutation};
use crate::style::{CssStyleDeclaration, PropertyDeclarationBlock};
use crate::{parser, serialize, Error, Result};

/// A selector list with a declaration block, e.g. `a > b { color: red; }`.
///
/// The selector is kept as normalized text; no selector matching is done.
pub struct CssStyleRule {
    pub(crate) links: RuleLinks,
    selector_text: RwLock<String>,
    style: CssStyleDeclaration,
}

impl CssStyleRule {
    pub(crate) fn new(selector_text: String, block: PropertyDeclarationBlock) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            links: RuleLinks::default(),
            selector_text: RwLock::new(selector_text),
            style: CssStyleDeclaration::with_block(Some(WeakRule::Style(this.clone())), block),
        })
    }

    /// The normalized selector text.
    pub fn selector_text(&self) -> String {
        self.selector_text.read().clone()
    }

    /// Replace the selector.
    ///
    /// An empty or malformed selector leaves the rule unchanged.
    pub fn set_selector_text(&self, text: &str) -> Result<()> {
        let selector = parser::parse_selector(text)?;
        *self.selector_text.write() = selector;
        mutation::notify(self.parent_style_sheet().as_ref(), Mutation::RuleChanged);
        Ok(())
    }

    /// The live declaration block.
    pub fn style(&self) -> CssStyleDeclaration {
        self.style.clone()
    }
}

impl Rule for CssStyleRule {
    fn rule_type(&self) -> CssRuleType {
        CssRuleType::Style
    }

    fn css_text(&self) -> String {
        serialize::serialize_style_rule(&self.selector_text.read(), &self.style.declarations())
    }

    fn set_css_text(&self, text: &str) -> Result<()> {
        let CssRule::Style(parsed) = parser::parse_rule(text)? else {
            return Err(Error::hierarchy("cssText must be a style rule"));
        };
        *self.selector_text.write() = parsed.selector_text();
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

impl fmt::Debug for CssStyleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CssStyleRule")
            .field("selector_text", &self.selector_text())
            .field("style", &self.style)
            .finish()
    }
}
