//! Stylesheets (`CSSStyleSheet`) and their construction.

use std::any::Any;
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use lattice_cssom_core::logging::targets;
use lattice_cssom_core::{ConnectionId, PerfSpan, Signal};
use parking_lot::RwLock;

use super::import::CssImportRule;
use super::media::{MediaList, MediaOwner};
use super::rule::CssRule;
use super::rule_list::{CssRuleList, RuleListOwner};
use crate::mutation::{self, Mutation};
use crate::parser::{self, ParseError};
use crate::{serialize, Error, Result};

/// Any host object a stylesheet can be associated with (e.g. a `<style>`
/// element). The sheet only holds a weak reference.
pub type OwnerNode = Arc<dyn Any + Send + Sync>;

/// Where a stylesheet comes from, for cascade ordering by the embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Origin {
    /// User-agent defaults (lowest priority).
    UserAgent = 0,
    /// User preferences.
    User = 1,
    /// Document stylesheets.
    #[default]
    Author = 2,
}

/// A change reported by a stylesheet's [`changed`](CssStyleSheet::changed)
/// signal.
#[derive(Debug, Clone)]
pub struct StyleSheetChange {
    /// The top-level sheet that was modified.
    pub sheet: CssStyleSheet,
    /// What happened.
    pub mutation: Mutation,
}

pub(crate) struct StyleSheetInner {
    sheet_type: String,
    href: Option<String>,
    title: Option<String>,
    origin: Origin,
    owner_node: Option<Weak<dyn Any + Send + Sync>>,
    owner_rule: RwLock<Option<Weak<CssImportRule>>>,
    media: MediaList,
    disabled: AtomicBool,
    rules: CssRuleList,
    changed: Signal<StyleSheetChange>,
}

/// A stylesheet: metadata plus a live top-level rule list.
///
/// This is a cheap, clonable handle; clones refer to the same sheet.
///
/// # Example
///
/// ```
/// use lattice_cssom::prelude::*;
///
/// let sheet = CssStyleSheet::from_css("a { color: red }");
/// sheet.insert_rule("@import url(base.css);", 0).unwrap();
///
/// assert_eq!(sheet.css_rules().len(), 2);
/// assert_eq!(sheet.css_text(), "@import url(\"base.css\");\na { color: red; }");
/// ```
#[derive(Clone)]
pub struct CssStyleSheet {
    inner: Arc<StyleSheetInner>,
}

impl CssStyleSheet {
    /// Create an empty author stylesheet.
    pub fn new() -> Self {
        StyleSheetBuilder::new().build()
    }

    /// Parse a stylesheet from CSS text.
    ///
    /// Invalid constructs are skipped and logged; this never fails.
    pub fn from_css(css: &str) -> Self {
        StyleSheetBuilder::new().build_from_css(css)
    }

    /// Load a stylesheet from a CSS file. The path becomes the sheet's `href`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let _span = PerfSpan::new("load_stylesheet");
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        Ok(StyleSheetBuilder::new()
            .href(path.display().to_string())
            .build_from_css(&content))
    }

    /// Start building a stylesheet with custom metadata.
    pub fn builder() -> StyleSheetBuilder {
        StyleSheetBuilder::new()
    }

    pub(crate) fn from_inner(inner: Arc<StyleSheetInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<StyleSheetInner> {
        Arc::downgrade(&self.inner)
    }

    /// Whether two handles refer to the same stylesheet.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The sheet type, `"text/css"` unless configured otherwise.
    pub fn sheet_type(&self) -> &str {
        &self.inner.sheet_type
    }

    pub fn href(&self) -> Option<&str> {
        self.inner.href.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.inner.title.as_deref()
    }

    pub fn origin(&self) -> Origin {
        self.inner.origin
    }

    /// The associated host object, if it is still alive.
    pub fn owner_node(&self) -> Option<OwnerNode> {
        self.inner.owner_node.as_ref()?.upgrade()
    }

    /// The owner node downcast to a concrete type.
    pub fn owner_node_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.owner_node()?.downcast::<T>().ok()
    }

    /// The `@import` rule that imported this sheet.
    pub fn owner_rule(&self) -> Option<CssRule> {
        let owner = self.inner.owner_rule.read().clone()?;
        owner.upgrade().map(CssRule::Import)
    }

    pub(crate) fn set_owner_rule(&self, owner: Option<Weak<CssImportRule>>) {
        *self.inner.owner_rule.write() = owner;
    }

    /// The sheet's media list.
    pub fn media(&self) -> MediaList {
        self.inner.media.clone()
    }

    pub fn disabled(&self) -> bool {
        self.inner.disabled.load(Ordering::Acquire)
    }

    /// Enable or disable the sheet. Only an actual change is reported.
    pub fn set_disabled(&self, disabled: bool) {
        if self.inner.disabled.swap(disabled, Ordering::AcqRel) != disabled {
            self.notify(Mutation::DisabledChanged);
        }
    }

    /// The live top-level rule list.
    pub fn css_rules(&self) -> CssRuleList {
        self.inner.rules.clone()
    }

    /// Parse `rule` and insert it at `index`, returning the index.
    ///
    /// Errors, checked in this order: [`Error::Index`] if `index` is past the
    /// end, [`Error::Syntax`] if the text is not exactly one rule,
    /// [`Error::Hierarchy`] if the rule may not go there.
    pub fn insert_rule(&self, rule: &str, index: usize) -> Result<usize> {
        mutation::insert_rule(&self.inner.rules, rule, index)
    }

    /// Remove the rule at `index`.
    pub fn delete_rule(&self, index: usize) -> Result<()> {
        mutation::delete_rule(&self.inner.rules, index)
    }

    /// Replace every rule by parsing `css`, returning recovered diagnostics.
    ///
    /// `@import` rules are dropped: a synchronous replace cannot load them.
    pub fn replace_sync(&self, css: &str) -> Vec<ParseError> {
        let _span = PerfSpan::new("replace_sync");
        let parsed = parser::parse_stylesheet(css);
        let mut errors = parsed.errors;
        let mut rules = Vec::with_capacity(parsed.rules.len());
        for rule in parsed.rules {
            if let Some(import) = rule.as_import() {
                tracing::warn!(
                    target: targets::PARSER,
                    href = %import.href(),
                    "@import dropped by replace_sync"
                );
                errors.push(ParseError::new("@import is not allowed in replace_sync", 1, 1));
                continue;
            }
            rules.push(rule);
        }
        self.inner.rules.replace_all(rules);
        self.notify(Mutation::RulesReplaced);
        errors
    }

    /// Serialized rules joined by newlines.
    pub fn css_text(&self) -> String {
        serialize::serialize_style_sheet(self)
    }

    /// The change signal.
    ///
    /// Emitted after every successful mutation anywhere in the sheet's rule
    /// tree, once all internal locks are released.
    pub fn changed(&self) -> &Signal<StyleSheetChange> {
        &self.inner.changed
    }

    /// Connect a slot to the change signal.
    pub fn connect_changed<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&StyleSheetChange) + Send + Sync + 'static,
    {
        self.inner.changed.connect(slot)
    }

    pub(crate) fn notify(&self, mutation: Mutation) {
        tracing::trace!(
            target: targets::MUTATION,
            ?mutation,
            href = ?self.href(),
            "stylesheet changed"
        );
        self.inner.changed.emit(StyleSheetChange {
            sheet: self.clone(),
            mutation,
        });
    }
}

impl Default for CssStyleSheet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CssStyleSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CssStyleSheet")
            .field("href", &self.inner.href)
            .field("title", &self.inner.title)
            .field("origin", &self.inner.origin)
            .field("disabled", &self.disabled())
            .field("rules", &self.inner.rules.len())
            .finish()
    }
}

impl fmt::Display for CssStyleSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.css_text())
    }
}

/// Builder for stylesheets with non-default metadata.
///
/// ```
/// use lattice_cssom::prelude::*;
///
/// let sheet = CssStyleSheet::builder()
///     .title("print")
///     .media("print")
///     .origin(Origin::User)
///     .build_from_css("body { margin: 0 }");
///
/// assert_eq!(sheet.title(), Some("print"));
/// assert_eq!(sheet.media().media_text(), "print");
/// ```
#[derive(Default)]
pub struct StyleSheetBuilder {
    sheet_type: Option<String>,
    href: Option<String>,
    title: Option<String>,
    media: Option<String>,
    disabled: bool,
    origin: Origin,
    owner_node: Option<Weak<dyn Any + Send + Sync>>,
}

impl StyleSheetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sheet type (default `"text/css"`).
    pub fn sheet_type(mut self, sheet_type: impl Into<String>) -> Self {
        self.sheet_type = Some(sheet_type.into());
        self
    }

    pub fn href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the media list text, e.g. `"screen, print"`.
    pub fn media(mut self, media: impl Into<String>) -> Self {
        self.media = Some(media.into());
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// Associate a host object. Only a weak reference is kept.
    pub fn owner_node<T: Any + Send + Sync>(mut self, node: &Arc<T>) -> Self {
        let node: OwnerNode = node.clone();
        self.owner_node = Some(Arc::downgrade(&node));
        self
    }

    /// Build an empty stylesheet.
    pub fn build(self) -> CssStyleSheet {
        let media = self
            .media
            .as_deref()
            .map(parser::parse_media_list)
            .unwrap_or_default();

        let inner = Arc::new_cyclic(|this: &Weak<StyleSheetInner>| StyleSheetInner {
            sheet_type: self.sheet_type.unwrap_or_else(|| "text/css".to_owned()),
            href: self.href,
            title: self.title,
            origin: self.origin,
            owner_node: self.owner_node,
            owner_rule: RwLock::new(None),
            media: MediaList::with_media(MediaOwner::StyleSheet(this.clone()), media),
            disabled: AtomicBool::new(self.disabled),
            rules: CssRuleList::new(RuleListOwner::StyleSheet(this.clone())),
            changed: Signal::new(),
        });
        CssStyleSheet::from_inner(inner)
    }

    /// Build a stylesheet by parsing `css`.
    pub fn build_from_css(self, css: &str) -> CssStyleSheet {
        self.build_with_diagnostics(css).0
    }

    /// Build a stylesheet by parsing `css`, also returning the recovered
    /// parse errors.
    pub fn build_with_diagnostics(self, css: &str) -> (CssStyleSheet, Vec<ParseError>) {
        let sheet = self.build();
        let parsed = parser::parse_stylesheet(css);
        sheet.inner.rules.replace_all(parsed.rules);
        (sheet, parsed.errors)
    }
}

static_assertions::assert_impl_all!(CssStyleSheet: Send, Sync, Clone);
