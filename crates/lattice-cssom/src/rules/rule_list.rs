//! Live ordered rule lists (`CSSRuleList`).

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use super::rule::{CssRule, CssRuleType, WeakRule};
use super::{CssStyleSheet, StyleSheetInner};

/// What a rule list belongs to.
#[derive(Clone)]
pub(crate) enum RuleListOwner {
    /// The top-level list of a stylesheet.
    StyleSheet(Weak<StyleSheetInner>),
    /// The child list of a grouping rule.
    Rule(WeakRule),
}

/// The kind of container a list is, which decides what it may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Container {
    TopLevel,
    Group,
    Page,
}

struct RuleListInner {
    owner: RuleListOwner,
    rules: RwLock<Vec<CssRule>>,
}

/// A live, indexable view of a rule list.
///
/// The handle stays valid while the owner mutates the list: reads always see
/// the current contents. Indices shift on insertion and deletion, so callers
/// that need a stable reference should hold the [`CssRule`] itself.
#[derive(Clone)]
pub struct CssRuleList {
    inner: Arc<RuleListInner>,
}

impl CssRuleList {
    pub(crate) fn new(owner: RuleListOwner) -> Self {
        Self {
            inner: Arc::new(RuleListInner {
                owner,
                rules: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.inner.rules.read().len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.rules.read().is_empty()
    }

    /// The rule at `index`, or `None` past the end.
    pub fn item(&self, index: usize) -> Option<CssRule> {
        self.inner.rules.read().get(index).cloned()
    }

    /// Snapshot of the current rules.
    pub fn to_vec(&self) -> Vec<CssRule> {
        self.inner.rules.read().clone()
    }

    /// Iterate over a snapshot of the current rules.
    pub fn iter(&self) -> std::vec::IntoIter<CssRule> {
        self.to_vec().into_iter()
    }

    /// Position of `rule` in this list, by identity.
    pub fn index_of(&self, rule: &CssRule) -> Option<usize> {
        self.inner.rules.read().iter().position(|r| r.ptr_eq(rule))
    }

    /// Whether two handles refer to the same list.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn container(&self) -> Container {
        match &self.inner.owner {
            RuleListOwner::StyleSheet(_) => Container::TopLevel,
            RuleListOwner::Rule(rule) if rule.rule_type() == CssRuleType::Page => Container::Page,
            RuleListOwner::Rule(_) => Container::Group,
        }
    }

    /// The stylesheet this list is ultimately attached to.
    pub(crate) fn owner_style_sheet(&self) -> Option<CssStyleSheet> {
        match &self.inner.owner {
            RuleListOwner::StyleSheet(sheet) => sheet.upgrade().map(CssStyleSheet::from_inner),
            RuleListOwner::Rule(rule) => rule.upgrade()?.links().parent_style_sheet(),
        }
    }

    fn owner_sheet_weak(&self) -> Weak<StyleSheetInner> {
        match &self.inner.owner {
            RuleListOwner::StyleSheet(sheet) => sheet.clone(),
            RuleListOwner::Rule(rule) => rule
                .upgrade()
                .and_then(|rule| rule.links().parent_style_sheet())
                .map(|sheet| sheet.downgrade())
                .unwrap_or_default(),
        }
    }

    fn owner_rule(&self) -> Option<WeakRule> {
        match &self.inner.owner {
            RuleListOwner::StyleSheet(_) => None,
            RuleListOwner::Rule(rule) => Some(rule.clone()),
        }
    }

    /// Point `rule`'s back-references at this list's owner.
    fn adopt(&self, rule: &CssRule, sheet: &Weak<StyleSheetInner>) {
        rule.links().set_parent_rule(self.owner_rule());
        set_style_sheet_recursive(rule, sheet);
    }

    pub(crate) fn read(&self) -> parking_lot::RwLockReadGuard<'_, Vec<CssRule>> {
        self.inner.rules.read()
    }

    /// Insert an already validated rule.
    pub(crate) fn insert(&self, index: usize, rule: CssRule) {
        self.adopt(&rule, &self.owner_sheet_weak());
        self.inner.rules.write().insert(index, rule);
    }

    /// Remove and detach the rule at `index`.
    pub(crate) fn remove(&self, index: usize) -> Option<CssRule> {
        let removed = {
            let mut rules = self.inner.rules.write();
            (index < rules.len()).then(|| rules.remove(index))
        };
        if let Some(rule) = &removed {
            detach(rule);
        }
        removed
    }

    /// Replace every rule, detaching the old ones.
    pub(crate) fn replace_all(&self, rules: Vec<CssRule>) {
        let sheet = self.owner_sheet_weak();
        for rule in &rules {
            self.adopt(rule, &sheet);
        }
        let old = std::mem::replace(&mut *self.inner.rules.write(), rules);
        for rule in &old {
            detach(rule);
        }
    }

    /// Re-point the stylesheet back-reference of every rule in the subtree.
    pub(crate) fn set_style_sheet(&self, sheet: &Weak<StyleSheetInner>) {
        for rule in self.to_vec() {
            set_style_sheet_recursive(&rule, sheet);
        }
    }
}

fn set_style_sheet_recursive(rule: &CssRule, sheet: &Weak<StyleSheetInner>) {
    rule.links().set_parent_style_sheet(sheet.clone());
    if let Some(children) = rule.css_rules() {
        children.set_style_sheet(sheet);
    }
}

fn detach(rule: &CssRule) {
    rule.links().set_parent_rule(None);
    set_style_sheet_recursive(rule, &Weak::new());
}

impl fmt::Debug for CssRuleList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.read().iter()).finish()
    }
}

impl IntoIterator for &CssRuleList {
    type Item = CssRule;
    type IntoIter = std::vec::IntoIter<CssRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

static_assertions::assert_impl_all!(CssRuleList: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rule;

    #[test]
    fn live_view_sees_mutations() {
        let sheet = CssStyleSheet::from_css("a { } b { }");
        let list = sheet.css_rules();
        assert_eq!(list.len(), 2);

        sheet.insert_rule("c { }", 2).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.item(2).unwrap().css_text(), "c { }");
        assert!(list.item(3).is_none());
    }

    #[test]
    fn index_of_uses_identity() {
        let sheet = CssStyleSheet::from_css("a { } a { }");
        let list = sheet.css_rules();
        let second = list.item(1).unwrap();

        assert_eq!(list.index_of(&second), Some(1));
        sheet.delete_rule(0).unwrap();
        assert_eq!(list.index_of(&second), Some(0));
    }

    #[test]
    fn removed_rules_are_detached() {
        let sheet = CssStyleSheet::from_css("@media screen { a { } }");
        let media = sheet.css_rules().item(0).unwrap();
        let child = media.css_rules().unwrap().item(0).unwrap();
        assert!(child.parent_style_sheet().is_some());

        sheet.delete_rule(0).unwrap();
        assert!(media.parent_style_sheet().is_none());
        assert!(child.parent_style_sheet().is_none());
        assert!(child.parent_rule().unwrap().ptr_eq(&media));
    }
}
