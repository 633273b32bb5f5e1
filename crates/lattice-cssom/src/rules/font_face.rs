//! `@font-face` rules.

use std::fmt;
use std::sync::Arc;

use super::rule::{CssRule, CssRuleType, Rule, RuleLinks, WeakRule};
use super::CssStyleSheet;
use crate::mutation::{self, Mutation};
use crate::style::{CssStyleDeclaration, PropertyDeclarationBlock};
use crate::{parser, serialize, Error, Result};

/// An `@font-face` rule: a bare declaration block.
pub struct CssFontFaceRule {
    pub(crate) links: RuleLinks,
    style: CssStyleDeclaration,
}

impl CssFontFaceRule {
    pub(crate) fn new(block: PropertyDeclarationBlock) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            links: RuleLinks::default(),
            style: CssStyleDeclaration::with_block(Some(WeakRule::FontFace(this.clone())), block),
        })
    }

    /// The font descriptors.
    pub fn style(&self) -> CssStyleDeclaration {
        self.style.clone()
    }
}

impl Rule for CssFontFaceRule {
    fn rule_type(&self) -> CssRuleType {
        CssRuleType::FontFace
    }

    fn css_text(&self) -> String {
        serialize::serialize_block_rule("@font-face", &self.style.declarations(), &[])
    }

    fn set_css_text(&self, text: &str) -> Result<()> {
        let CssRule::FontFace(parsed) = parser::parse_rule(text)? else {
            return Err(Error::hierarchy("cssText must be an @font-face rule"));
        };
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

impl fmt::Debug for CssFontFaceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CssFontFaceRule")
            .field("style", &self.style)
            .finish()
    }
}
