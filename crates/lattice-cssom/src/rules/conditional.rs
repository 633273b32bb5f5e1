//! Conditional group rules: `@media` and `@supports`.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::media::{MediaList, MediaOwner};
use super::rule::{CssRule, CssRuleType, GroupingRule, Rule, RuleLinks, WeakRule};
use super::rule_list::{CssRuleList, RuleListOwner};
use super::CssStyleSheet;
use crate::mutation::{self, Mutation};
use crate::{parser, serialize, Error, Result};

/// An `@media` rule: a media list and a nested rule list.
pub struct CssMediaRule {
    pub(crate) links: RuleLinks,
    media: MediaList,
    rules: CssRuleList,
}

impl CssMediaRule {
    pub(crate) fn new(media: Vec<String>, rules: Vec<CssRule>) -> Arc<Self> {
        let rule = Arc::new_cyclic(|this| {
            let owner = WeakRule::Media(this.clone());
            Self {
                links: RuleLinks::default(),
                media: MediaList::with_media(MediaOwner::Rule(owner.clone()), media),
                rules: CssRuleList::new(RuleListOwner::Rule(owner)),
            }
        });
        rule.rules.replace_all(rules);
        rule
    }

    /// The live media list.
    pub fn media(&self) -> MediaList {
        self.media.clone()
    }

    /// The media list text (`conditionText`).
    pub fn condition_text(&self) -> String {
        self.media.media_text()
    }
}

impl Rule for CssMediaRule {
    fn rule_type(&self) -> CssRuleType {
        CssRuleType::Media
    }

    fn css_text(&self) -> String {
        serialize::serialize_group_rule("@media", &self.condition_text(), &self.rules.to_vec())
    }

    fn set_css_text(&self, text: &str) -> Result<()> {
        let CssRule::Media(parsed) = parser::parse_rule(text)? else {
            return Err(Error::hierarchy("cssText must be an @media rule"));
        };
        self.media.replace(parsed.media.to_vec());
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

impl GroupingRule for CssMediaRule {
    fn css_rules(&self) -> CssRuleList {
        self.rules.clone()
    }
}

impl fmt::Debug for CssMediaRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CssMediaRule")
            .field("media", &self.media)
            .field("rules", &self.rules)
            .finish()
    }
}

/// An `@supports` rule: a feature condition and a nested rule list.
///
/// The condition is stored as normalized text and never evaluated.
pub struct CssSupportsRule {
    pub(crate) links: RuleLinks,
    condition_text: RwLock<String>,
    rules: CssRuleList,
}

impl CssSupportsRule {
    pub(crate) fn new(condition_text: String, rules: Vec<CssRule>) -> Arc<Self> {
        let rule = Arc::new_cyclic(|this| Self {
            links: RuleLinks::default(),
            condition_text: RwLock::new(condition_text),
            rules: CssRuleList::new(RuleListOwner::Rule(WeakRule::Supports(this.clone()))),
        });
        rule.rules.replace_all(rules);
        rule
    }

    /// The normalized condition.
    pub fn condition_text(&self) -> String {
        self.condition_text.read().clone()
    }
}

impl Rule for CssSupportsRule {
    fn rule_type(&self) -> CssRuleType {
        CssRuleType::Supports
    }

    fn css_text(&self) -> String {
        serialize::serialize_group_rule("@supports", &self.condition_text(), &self.rules.to_vec())
    }

    fn set_css_text(&self, text: &str) -> Result<()> {
        let CssRule::Supports(parsed) = parser::parse_rule(text)? else {
            return Err(Error::hierarchy("cssText must be an @supports rule"));
        };
        *self.condition_text.write() = parsed.condition_text();
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

impl GroupingRule for CssSupportsRule {
    fn css_rules(&self) -> CssRuleList {
        self.rules.clone()
    }
}

impl fmt::Debug for CssSupportsRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CssSupportsRule")
            .field("condition_text", &self.condition_text())
            .field("rules", &self.rules)
            .finish()
    }
}
