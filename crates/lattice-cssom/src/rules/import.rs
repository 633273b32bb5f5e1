//! `@import` and `@namespace` rules.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use super::media::{MediaList, MediaOwner};
use super::rule::{CssRule, CssRuleType, Rule, RuleLinks, WeakRule};
use super::CssStyleSheet;
use crate::mutation::{self, Mutation};
use crate::{parser, serialize, Error, Result};

/// An `@import` rule.
///
/// Fetching is out of scope: the imported sheet slot stays empty until the
/// embedder fills it with [`set_style_sheet`](CssImportRule::set_style_sheet).
pub struct CssImportRule {
    pub(crate) links: RuleLinks,
    this: Weak<CssImportRule>,
    href: RwLock<String>,
    media: MediaList,
    style_sheet: RwLock<Option<CssStyleSheet>>,
}

impl CssImportRule {
    pub(crate) fn new(href: String, media: Vec<String>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            links: RuleLinks::default(),
            this: this.clone(),
            href: RwLock::new(href),
            media: MediaList::with_media(MediaOwner::Rule(WeakRule::Import(this.clone())), media),
            style_sheet: RwLock::new(None),
        })
    }

    /// The URL as written, unresolved.
    pub fn href(&self) -> String {
        self.href.read().clone()
    }

    /// The live media list.
    pub fn media(&self) -> MediaList {
        self.media.clone()
    }

    /// The imported stylesheet, once provided.
    pub fn style_sheet(&self) -> Option<CssStyleSheet> {
        self.style_sheet.read().clone()
    }

    /// Attach the fetched stylesheet for this import.
    ///
    /// The sheet's owner rule becomes this rule. Fails with
    /// [`Error::Hierarchy`] if the sheet already belongs to another import, or
    /// if it is this rule's own stylesheet or one of its ancestors.
    pub fn set_style_sheet(&self, sheet: CssStyleSheet) -> Result<()> {
        if let Some(owner) = sheet.owner_rule() {
            let is_self = owner
                .as_import()
                .is_some_and(|owner| std::ptr::eq(Arc::as_ptr(owner), self));
            if !is_self {
                return Err(Error::hierarchy("stylesheet is already imported by another rule"));
            }
        }

        let mut ancestor = self.parent_style_sheet();
        while let Some(current) = ancestor {
            if current.ptr_eq(&sheet) {
                return Err(Error::hierarchy("an import cannot contain its own stylesheet"));
            }
            ancestor = current.owner_rule().and_then(|rule| rule.parent_style_sheet());
        }

        sheet.set_owner_rule(Some(self.this.clone()));
        let previous = self.style_sheet.write().replace(sheet.clone());
        if let Some(previous) = previous.filter(|previous| !previous.ptr_eq(&sheet)) {
            previous.set_owner_rule(None);
        }
        mutation::notify(self.parent_style_sheet().as_ref(), Mutation::ImportResolved);
        Ok(())
    }

    fn clear_style_sheet(&self) {
        if let Some(previous) = self.style_sheet.write().take() {
            previous.set_owner_rule(None);
        }
    }
}

impl Rule for CssImportRule {
    fn rule_type(&self) -> CssRuleType {
        CssRuleType::Import
    }

    fn css_text(&self) -> String {
        serialize::serialize_import_rule(&self.href.read(), &self.media.read())
    }

    /// Replacing the text drops any attached stylesheet, since the target
    /// may have changed.
    fn set_css_text(&self, text: &str) -> Result<()> {
        let CssRule::Import(parsed) = parser::parse_rule(text)? else {
            return Err(Error::hierarchy("cssText must be an @import rule"));
        };
        *self.href.write() = parsed.href();
        self.media.replace(parsed.media.to_vec());
        self.clear_style_sheet();
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

impl fmt::Debug for CssImportRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CssImportRule")
            .field("href", &self.href())
            .field("media", &self.media)
            .field("has_style_sheet", &self.style_sheet.read().is_some())
            .finish()
    }
}

/// An `@namespace` rule.
pub struct CssNamespaceRule {
    pub(crate) links: RuleLinks,
    prefix: RwLock<Option<String>>,
    namespace_uri: RwLock<String>,
}

impl CssNamespaceRule {
    pub(crate) fn new(prefix: Option<String>, namespace_uri: String) -> Arc<Self> {
        Arc::new(Self {
            links: RuleLinks::default(),
            prefix: RwLock::new(prefix),
            namespace_uri: RwLock::new(namespace_uri),
        })
    }

    /// The prefix, or the empty string for a default namespace.
    pub fn prefix(&self) -> String {
        self.prefix.read().clone().unwrap_or_default()
    }

    pub fn namespace_uri(&self) -> String {
        self.namespace_uri.read().clone()
    }
}

impl Rule for CssNamespaceRule {
    fn rule_type(&self) -> CssRuleType {
        CssRuleType::Namespace
    }

    fn css_text(&self) -> String {
        let prefix = self.prefix.read();
        serialize::serialize_namespace_rule(prefix.as_deref(), &self.namespace_uri.read())
    }

    fn set_css_text(&self, text: &str) -> Result<()> {
        let CssRule::Namespace(parsed) = parser::parse_rule(text)? else {
            return Err(Error::hierarchy("cssText must be an @namespace rule"));
        };
        *self.prefix.write() = parsed.prefix.read().clone();
        *self.namespace_uri.write() = parsed.namespace_uri();
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

impl fmt::Debug for CssNamespaceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CssNamespaceRule")
            .field("prefix", &self.prefix())
            .field("namespace_uri", &self.namespace_uri())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_serialization() {
        let rule = parser::parse_rule("@import 'x.css';").unwrap();
        assert_eq!(rule.css_text(), "@import url(\"x.css\");");

        let rule = parser::parse_rule("@import url(theme.css) screen ,print;").unwrap();
        assert_eq!(rule.css_text(), "@import url(\"theme.css\") screen, print;");
        assert_eq!(rule.as_import().unwrap().href(), "theme.css");
    }

    #[test]
    fn namespace_serialization() {
        let rule = parser::parse_rule("@namespace svg \"http://www.w3.org/2000/svg\";").unwrap();
        assert_eq!(
            rule.css_text(),
            "@namespace svg url(\"http://www.w3.org/2000/svg\");"
        );
        let namespace = rule.as_namespace().unwrap();
        assert_eq!(namespace.prefix(), "svg");

        let rule = parser::parse_rule("@namespace url(http://example.com/ns);").unwrap();
        assert_eq!(rule.css_text(), "@namespace url(\"http://example.com/ns\");");
    }

    #[test]
    fn attach_imported_sheet() {
        let parent = CssStyleSheet::from_css("@import url(child.css);");
        let import = parent.css_rules().item(0).unwrap();
        let child = CssStyleSheet::from_css("a { color: red }");

        import.as_import().unwrap().set_style_sheet(child.clone()).unwrap();
        assert!(child.owner_rule().unwrap().ptr_eq(&import));
        assert!(import.as_import().unwrap().style_sheet().unwrap().ptr_eq(&child));
    }

    #[test]
    fn import_cycles_are_rejected() {
        let parent = CssStyleSheet::from_css("@import url(self.css);");
        let import = parent.css_rules().item(0).unwrap();

        let err = import.as_import().unwrap().set_style_sheet(parent.clone()).unwrap_err();
        assert!(err.is_hierarchy());
        assert!(parent.owner_rule().is_none());
    }

    #[test]
    fn import_css_text_clears_sheet() {
        let parent = CssStyleSheet::from_css("@import url(a.css);");
        let import = parent.css_rules().item(0).unwrap();
        let child = CssStyleSheet::new();
        import.as_import().unwrap().set_style_sheet(child.clone()).unwrap();

        import.set_css_text("@import url(b.css) print;").unwrap();
        assert!(import.as_import().unwrap().style_sheet().is_none());
        assert!(child.owner_rule().is_none());
        assert_eq!(import.css_text(), "@import url(\"b.css\") print;");
    }
}
