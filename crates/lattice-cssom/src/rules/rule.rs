//! The rule handle, rule kinds and the shared rule interface.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use super::{
    CssFontFaceRule, CssImportRule, CssMarginRule, CssMediaRule, CssNamespaceRule, CssPageRule,
    CssRuleList, CssStyleRule, CssStyleSheet, CssSupportsRule, StyleSheetInner,
};
use crate::Result;

/// Numeric rule kind, as exposed by `CSSRule.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CssRuleType {
    Style = 1,
    Import = 3,
    Media = 4,
    FontFace = 5,
    Page = 6,
    Margin = 9,
    Namespace = 10,
    Supports = 12,
}

impl CssRuleType {
    /// The numeric tag.
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Look up a kind by numeric tag.
    pub fn from_u16(value: u16) -> Option<Self> {
        Some(match value {
            1 => Self::Style,
            3 => Self::Import,
            4 => Self::Media,
            5 => Self::FontFace,
            6 => Self::Page,
            9 => Self::Margin,
            10 => Self::Namespace,
            12 => Self::Supports,
            _ => return None,
        })
    }

    /// Short name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Style => "style",
            Self::Import => "@import",
            Self::Media => "@media",
            Self::FontFace => "@font-face",
            Self::Page => "@page",
            Self::Margin => "margin",
            Self::Namespace => "@namespace",
            Self::Supports => "@supports",
        }
    }
}

impl fmt::Display for CssRuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Interface shared by every rule kind (`CSSRule`).
pub trait Rule {
    /// The rule kind.
    fn rule_type(&self) -> CssRuleType;

    /// Canonical serialization of the rule.
    fn css_text(&self) -> String;

    /// Replace this rule's contents by parsing `text` as a single rule of the
    /// same kind.
    ///
    /// Object identity is kept. On any error the rule is left unchanged.
    fn set_css_text(&self, text: &str) -> Result<()>;

    /// The enclosing rule, if nested.
    fn parent_rule(&self) -> Option<CssRule>;

    /// The stylesheet this rule is attached to, if any.
    fn parent_style_sheet(&self) -> Option<CssStyleSheet>;
}

/// Interface of rules that contain a rule list (`CSSGroupingRule`).
pub trait GroupingRule: Rule {
    /// Live list of child rules.
    fn css_rules(&self) -> CssRuleList;

    /// Parse `rule` and insert it at `index`, returning the index.
    fn insert_rule(&self, rule: &str, index: usize) -> Result<usize> {
        crate::mutation::insert_rule(&self.css_rules(), rule, index)
    }

    /// Remove the rule at `index`.
    fn delete_rule(&self, index: usize) -> Result<()> {
        crate::mutation::delete_rule(&self.css_rules(), index)
    }
}

/// A reference to a rule of any kind.
///
/// Cloning is cheap and yields the same rule; use [`CssRule::ptr_eq`] for
/// identity.
#[derive(Clone)]
pub enum CssRule {
    Style(Arc<CssStyleRule>),
    Import(Arc<CssImportRule>),
    Media(Arc<CssMediaRule>),
    Supports(Arc<CssSupportsRule>),
    FontFace(Arc<CssFontFaceRule>),
    Page(Arc<CssPageRule>),
    Margin(Arc<CssMarginRule>),
    Namespace(Arc<CssNamespaceRule>),
}

macro_rules! dispatch {
    ($rule:expr, $inner:ident => $body:expr) => {
        match $rule {
            CssRule::Style($inner) => $body,
            CssRule::Import($inner) => $body,
            CssRule::Media($inner) => $body,
            CssRule::Supports($inner) => $body,
            CssRule::FontFace($inner) => $body,
            CssRule::Page($inner) => $body,
            CssRule::Margin($inner) => $body,
            CssRule::Namespace($inner) => $body,
        }
    };
}

impl CssRule {
    /// Whether two handles refer to the same rule object.
    pub fn ptr_eq(&self, other: &CssRule) -> bool {
        match (self, other) {
            (CssRule::Style(a), CssRule::Style(b)) => Arc::ptr_eq(a, b),
            (CssRule::Import(a), CssRule::Import(b)) => Arc::ptr_eq(a, b),
            (CssRule::Media(a), CssRule::Media(b)) => Arc::ptr_eq(a, b),
            (CssRule::Supports(a), CssRule::Supports(b)) => Arc::ptr_eq(a, b),
            (CssRule::FontFace(a), CssRule::FontFace(b)) => Arc::ptr_eq(a, b),
            (CssRule::Page(a), CssRule::Page(b)) => Arc::ptr_eq(a, b),
            (CssRule::Margin(a), CssRule::Margin(b)) => Arc::ptr_eq(a, b),
            (CssRule::Namespace(a), CssRule::Namespace(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// The child rule list, for rules that have one.
    pub fn css_rules(&self) -> Option<CssRuleList> {
        self.as_grouping().map(|group| group.css_rules())
    }

    /// View this rule as a grouping rule.
    pub fn as_grouping(&self) -> Option<&dyn GroupingRule> {
        match self {
            CssRule::Media(rule) => Some(rule.as_ref()),
            CssRule::Supports(rule) => Some(rule.as_ref()),
            CssRule::Page(rule) => Some(rule.as_ref()),
            _ => None,
        }
    }

    pub fn as_style(&self) -> Option<&Arc<CssStyleRule>> {
        match self {
            CssRule::Style(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn as_import(&self) -> Option<&Arc<CssImportRule>> {
        match self {
            CssRule::Import(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn as_media(&self) -> Option<&Arc<CssMediaRule>> {
        match self {
            CssRule::Media(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn as_supports(&self) -> Option<&Arc<CssSupportsRule>> {
        match self {
            CssRule::Supports(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn as_font_face(&self) -> Option<&Arc<CssFontFaceRule>> {
        match self {
            CssRule::FontFace(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn as_page(&self) -> Option<&Arc<CssPageRule>> {
        match self {
            CssRule::Page(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn as_margin(&self) -> Option<&Arc<CssMarginRule>> {
        match self {
            CssRule::Margin(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn as_namespace(&self) -> Option<&Arc<CssNamespaceRule>> {
        match self {
            CssRule::Namespace(rule) => Some(rule),
            _ => None,
        }
    }

    pub(crate) fn links(&self) -> &RuleLinks {
        dispatch!(self, rule => &rule.links)
    }
}

impl Rule for CssRule {
    fn rule_type(&self) -> CssRuleType {
        dispatch!(self, rule => rule.rule_type())
    }

    fn css_text(&self) -> String {
        dispatch!(self, rule => rule.css_text())
    }

    fn set_css_text(&self, text: &str) -> Result<()> {
        dispatch!(self, rule => rule.set_css_text(text))
    }

    fn parent_rule(&self) -> Option<CssRule> {
        self.links().parent_rule()
    }

    fn parent_style_sheet(&self) -> Option<CssStyleSheet> {
        self.links().parent_style_sheet()
    }
}

impl fmt::Debug for CssRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CssRule")
            .field("type", &self.rule_type())
            .field("css_text", &self.css_text())
            .finish()
    }
}

impl fmt::Display for CssRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.css_text())
    }
}

/// Non-owning reference to a rule that can own children, used for parent
/// links.
#[derive(Clone)]
pub(crate) enum WeakRule {
    Style(Weak<CssStyleRule>),
    Import(Weak<CssImportRule>),
    Media(Weak<CssMediaRule>),
    Supports(Weak<CssSupportsRule>),
    FontFace(Weak<CssFontFaceRule>),
    Page(Weak<CssPageRule>),
    Margin(Weak<CssMarginRule>),
}

impl WeakRule {
    pub(crate) fn upgrade(&self) -> Option<CssRule> {
        Some(match self {
            WeakRule::Style(rule) => CssRule::Style(rule.upgrade()?),
            WeakRule::Import(rule) => CssRule::Import(rule.upgrade()?),
            WeakRule::Media(rule) => CssRule::Media(rule.upgrade()?),
            WeakRule::Supports(rule) => CssRule::Supports(rule.upgrade()?),
            WeakRule::FontFace(rule) => CssRule::FontFace(rule.upgrade()?),
            WeakRule::Page(rule) => CssRule::Page(rule.upgrade()?),
            WeakRule::Margin(rule) => CssRule::Margin(rule.upgrade()?),
        })
    }

    /// Kind of the referenced rule, available even after it is dropped.
    pub(crate) fn rule_type(&self) -> CssRuleType {
        match self {
            WeakRule::Style(_) => CssRuleType::Style,
            WeakRule::Import(_) => CssRuleType::Import,
            WeakRule::Media(_) => CssRuleType::Media,
            WeakRule::Supports(_) => CssRuleType::Supports,
            WeakRule::FontFace(_) => CssRuleType::FontFace,
            WeakRule::Page(_) => CssRuleType::Page,
            WeakRule::Margin(_) => CssRuleType::Margin,
        }
    }
}

/// Parent back-references of a rule.
///
/// Both are weak: ownership runs strictly from stylesheet to rule list to
/// rule.
#[derive(Default)]
pub(crate) struct RuleLinks {
    parent_rule: RwLock<Option<WeakRule>>,
    parent_style_sheet: RwLock<Weak<StyleSheetInner>>,
}

impl RuleLinks {
    pub(crate) fn parent_rule(&self) -> Option<CssRule> {
        self.parent_rule.read().as_ref().and_then(WeakRule::upgrade)
    }

    pub(crate) fn set_parent_rule(&self, parent: Option<WeakRule>) {
        *self.parent_rule.write() = parent;
    }

    pub(crate) fn parent_style_sheet(&self) -> Option<CssStyleSheet> {
        self.parent_style_sheet
            .read()
            .upgrade()
            .map(CssStyleSheet::from_inner)
    }

    pub(crate) fn set_parent_style_sheet(&self, sheet: Weak<StyleSheetInner>) {
        *self.parent_style_sheet.write() = sheet;
    }
}

impl fmt::Debug for RuleLinks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleLinks")
            .field("has_parent_rule", &self.parent_rule().is_some())
            .field("has_parent_style_sheet", &self.parent_style_sheet().is_some())
            .finish()
    }
}

static_assertions::assert_impl_all!(CssRule: Send, Sync, Clone);
