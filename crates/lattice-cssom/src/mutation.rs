//! Rule tree mutation: insertion, deletion and change notification.
//!
//! Every operation validates fully before touching the tree, so a failed call
//! leaves it exactly as it was. Notifications go out only after all locks are
//! released, so slots may freely read or mutate the sheet.

use lattice_cssom_core::logging::targets;

use crate::parser;
use crate::rules::{Container, CssRule, CssRuleList, CssRuleType, CssStyleSheet, Rule};
use crate::{Error, Result};

/// What changed in a stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    /// A rule was inserted at `index` of some rule list in the tree.
    RuleInserted { index: usize },
    /// The rule at `index` of some rule list in the tree was removed.
    RuleDeleted { index: usize },
    /// A rule's text, selector or contents were replaced in place.
    RuleChanged,
    /// A declaration block was modified.
    DeclarationsChanged,
    /// A media list was modified.
    MediaChanged,
    /// The whole top-level rule list was replaced.
    RulesReplaced,
    /// An `@import` rule received its stylesheet.
    ImportResolved,
    /// The sheet was enabled or disabled.
    DisabledChanged,
}

/// Report `mutation` to `sheet`, if the change happened inside one.
pub(crate) fn notify(sheet: Option<&CssStyleSheet>, mutation: Mutation) {
    if let Some(sheet) = sheet {
        sheet.notify(mutation);
    }
}

/// Parse and insert a single rule into `list`.
#[tracing::instrument(skip(list), target = "lattice_cssom::mutation", level = "debug")]
pub(crate) fn insert_rule(list: &CssRuleList, text: &str, index: usize) -> Result<usize> {
    let length = list.len();
    if index > length {
        return Err(Error::index(index, length));
    }
    let rule = parser::parse_rule(text)?;
    check_hierarchy(list, &rule, index)?;

    list.insert(index, rule);
    tracing::trace!(target: targets::MUTATION, index, "rule inserted");
    notify(list.owner_style_sheet().as_ref(), Mutation::RuleInserted { index });
    Ok(index)
}

/// Remove the rule at `index` from `list`.
#[tracing::instrument(skip(list), target = "lattice_cssom::mutation", level = "debug")]
pub(crate) fn delete_rule(list: &CssRuleList, index: usize) -> Result<()> {
    // Capture the sheet before removal detaches the subtree.
    let sheet = list.owner_style_sheet();
    if list.remove(index).is_none() {
        return Err(Error::index(index, list.len()));
    }
    tracing::trace!(target: targets::MUTATION, index, "rule deleted");
    notify(sheet.as_ref(), Mutation::RuleDeleted { index });
    Ok(())
}

/// Ordering rank of top-level rules: imports, then namespaces, then the rest.
fn rank(kind: CssRuleType) -> u8 {
    match kind {
        CssRuleType::Import => 0,
        CssRuleType::Namespace => 1,
        _ => 2,
    }
}

fn allowed(container: Container, kind: CssRuleType) -> bool {
    match container {
        Container::TopLevel => kind != CssRuleType::Margin,
        Container::Group => matches!(
            kind,
            CssRuleType::Style
                | CssRuleType::Media
                | CssRuleType::Supports
                | CssRuleType::FontFace
                | CssRuleType::Page
        ),
        Container::Page => kind == CssRuleType::Margin,
    }
}

/// Check that `rule` may be inserted into `list` at `index`.
pub(crate) fn check_hierarchy(list: &CssRuleList, rule: &CssRule, index: usize) -> Result<()> {
    let kind = rule.rule_type();
    let container = list.container();
    if !allowed(container, kind) {
        return Err(Error::hierarchy(format!("{} rule is not allowed here", kind)));
    }
    if container != Container::TopLevel {
        return Ok(());
    }

    let rules = list.read();
    if kind == CssRuleType::Namespace
        && rules.iter().any(|r| rank(r.rule_type()) == 2)
    {
        return Err(Error::hierarchy(
            "@namespace cannot be inserted once the sheet has other rules",
        ));
    }

    let new_rank = rank(kind);
    let before = index.checked_sub(1).and_then(|i| rules.get(i));
    if before.is_some_and(|r| rank(r.rule_type()) > new_rank) {
        return Err(Error::hierarchy(format!("{} rule cannot follow the preceding rule", kind)));
    }
    if rules.get(index).is_some_and(|r| rank(r.rule_type()) < new_rank) {
        return Err(Error::hierarchy(format!("{} rule cannot precede the following rule", kind)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_is_checked_before_syntax() {
        let sheet = CssStyleSheet::from_css("a { }");
        assert!(sheet.insert_rule("not valid {{", 5).unwrap_err().is_index());
        assert!(sheet.insert_rule("not valid {{", 1).unwrap_err().is_syntax());
    }

    #[test]
    fn import_after_style_is_hierarchy_error() {
        let sheet = CssStyleSheet::from_css("a { }");
        let err = sheet.insert_rule("@import url(x.css);", 1).unwrap_err();
        assert!(err.is_hierarchy());
        assert_eq!(sheet.css_rules().len(), 1);

        assert_eq!(sheet.insert_rule("@import url(x.css);", 0).unwrap(), 0);
    }

    #[test]
    fn namespace_ordering() {
        let sheet = CssStyleSheet::from_css("@import url(a.css); @namespace svg url(x);");
        assert!(sheet.insert_rule("@namespace url(y);", 0).unwrap_err().is_hierarchy());
        sheet.insert_rule("@namespace html url(z);", 2).unwrap();

        sheet.insert_rule("a { }", 3).unwrap();
        assert!(sheet.insert_rule("@namespace url(w);", 3).unwrap_err().is_hierarchy());
    }

    #[test]
    fn margin_rules_are_page_only() {
        let sheet = CssStyleSheet::new();
        assert!(sheet.insert_rule("@top-left { }", 0).unwrap_err().is_hierarchy());
    }

    #[test]
    fn delete_out_of_range() {
        let sheet = CssStyleSheet::from_css("a { }");
        let err = sheet.delete_rule(1).unwrap_err();
        assert!(matches!(err, Error::Index { index: 1, length: 1 }));
    }
}
