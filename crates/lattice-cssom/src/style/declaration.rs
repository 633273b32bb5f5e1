//! Declaration blocks and the `CSSStyleDeclaration` handle.

use std::fmt;
use std::sync::Arc;

use lattice_cssom_core::logging::targets;
use parking_lot::RwLock;

use crate::mutation::{self, Mutation};
use crate::rules::{CssRule, Rule, WeakRule};
use crate::{serialize, Error, Result};

/// Priority of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    /// No `!important` flag.
    #[default]
    Normal,
    /// Declared with `!important`.
    Important,
}

impl Priority {
    /// The string returned by `getPropertyPriority`: `"important"` or `""`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Normal => "",
            Priority::Important => "important",
        }
    }

    /// Parse a `setProperty` priority argument.
    ///
    /// Accepts the empty string and an ASCII case-insensitive `important`.
    pub fn from_css(priority: &str) -> Option<Self> {
        if priority.is_empty() {
            Some(Priority::Normal)
        } else if priority.eq_ignore_ascii_case("important") {
            Some(Priority::Important)
        } else {
            None
        }
    }

    /// Whether this is [`Priority::Important`].
    pub fn is_important(&self) -> bool {
        matches!(self, Priority::Important)
    }
}

/// Normalize a property name for storage and lookup.
///
/// Custom properties (`--*`) are case-sensitive; every other name is
/// ASCII-lowercased.
pub fn normalize_property_name(name: &str) -> String {
    if name.starts_with("--") {
        name.to_owned()
    } else {
        name.to_ascii_lowercase()
    }
}

/// A single `name: value [!important]` declaration.
///
/// The value is an opaque, whitespace-normalized component value string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyDeclaration {
    /// Normalized property name.
    pub name: String,
    /// Canonical value text.
    pub value: String,
    /// Declaration priority.
    pub priority: Priority,
}

impl PropertyDeclaration {
    /// Create a declaration, normalizing the property name.
    pub fn new(name: &str, value: impl Into<String>, priority: Priority) -> Self {
        Self {
            name: normalize_property_name(name),
            value: value.into(),
            priority,
        }
    }
}

/// An ordered list of declarations with unique property names.
///
/// Names are compared after [`normalize_property_name`]. Updating an existing
/// property keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyDeclarationBlock {
    declarations: Vec<PropertyDeclaration>,
}

impl PropertyDeclarationBlock {
    /// Create an empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Check if the block has no declarations.
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Iterate over declarations in order.
    pub fn iter(&self) -> impl Iterator<Item = &PropertyDeclaration> {
        self.declarations.iter()
    }

    /// The declaration at `index`.
    pub fn item(&self, index: usize) -> Option<&PropertyDeclaration> {
        self.declarations.get(index)
    }

    /// Look up a declaration by property name.
    pub fn get(&self, name: &str) -> Option<&PropertyDeclaration> {
        let name = normalize_property_name(name);
        self.declarations.iter().find(|d| d.name == name)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.declarations.iter().position(|d| d.name == name)
    }

    /// Insert or update a declaration in place.
    ///
    /// Returns `true` if the block changed.
    pub fn set(&mut self, declaration: PropertyDeclaration) -> bool {
        match self.position(&declaration.name) {
            Some(index) => {
                let existing = &mut self.declarations[index];
                if *existing == declaration {
                    return false;
                }
                *existing = declaration;
                true
            }
            None => {
                self.declarations.push(declaration);
                true
            }
        }
    }

    /// Add a declaration read from source text.
    ///
    /// Like [`set`](Self::set), except that a normal declaration never
    /// overrides an earlier `!important` one of the same name.
    pub fn push_parsed(&mut self, declaration: PropertyDeclaration) {
        if let Some(index) = self.position(&declaration.name) {
            let existing = &self.declarations[index];
            if existing.priority.is_important() && !declaration.priority.is_important() {
                return;
            }
        }
        self.set(declaration);
    }

    /// Remove a declaration by name, returning it.
    pub fn remove(&mut self, name: &str) -> Option<PropertyDeclaration> {
        let name = normalize_property_name(name);
        self.position(&name).map(|index| self.declarations.remove(index))
    }

    /// Remove every declaration.
    pub fn clear(&mut self) {
        self.declarations.clear();
    }
}

impl fmt::Display for PropertyDeclarationBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize::serialize_declarations(self))
    }
}

struct DeclarationInner {
    /// The rule that owns this block. `None` for standalone blocks.
    parent_rule: Option<WeakRule>,
    block: RwLock<PropertyDeclarationBlock>,
}

/// A live declaration block (`CSSStyleDeclaration`).
///
/// Cloning the handle yields another reference to the same block. Every
/// successful change is reported to the owning stylesheet's change signal.
#[derive(Clone)]
pub struct CssStyleDeclaration {
    inner: Arc<DeclarationInner>,
}

impl CssStyleDeclaration {
    /// Create an empty standalone declaration block (e.g. an inline style).
    pub fn new() -> Self {
        Self::with_block(None, PropertyDeclarationBlock::new())
    }

    /// Parse a standalone declaration block.
    ///
    /// Invalid declarations are skipped.
    pub fn parse(css: &str) -> Self {
        Self::with_block(None, crate::parser::parse_declaration_block(css))
    }

    pub(crate) fn with_block(
        parent_rule: Option<WeakRule>,
        block: PropertyDeclarationBlock,
    ) -> Self {
        Self {
            inner: Arc::new(DeclarationInner {
                parent_rule,
                block: RwLock::new(block),
            }),
        }
    }

    /// The rule this block belongs to.
    pub fn parent_rule(&self) -> Option<CssRule> {
        self.inner.parent_rule.as_ref().and_then(WeakRule::upgrade)
    }

    /// Canonical text of the block, e.g. `color: red; margin: 0 !important;`.
    pub fn css_text(&self) -> String {
        serialize::serialize_declarations(&self.inner.block.read())
    }

    /// Replace every declaration with those parsed from `css`.
    ///
    /// Invalid declarations are skipped; this never fails.
    pub fn set_css_text(&self, css: &str) {
        let block = crate::parser::parse_declaration_block(css);
        *self.inner.block.write() = block;
        self.notify();
    }

    /// Number of declarations.
    pub fn length(&self) -> usize {
        self.inner.block.read().len()
    }

    /// Property name at `index`.
    pub fn item(&self, index: usize) -> Option<String> {
        self.inner.block.read().item(index).map(|d| d.name.clone())
    }

    /// Snapshot of the declarations.
    pub fn declarations(&self) -> PropertyDeclarationBlock {
        self.inner.block.read().clone()
    }

    /// Value of `name`, or the empty string if absent.
    pub fn get_property_value(&self, name: &str) -> String {
        self.inner
            .block
            .read()
            .get(name)
            .map(|d| d.value.clone())
            .unwrap_or_default()
    }

    /// `"important"` if `name` is set with `!important`, else the empty string.
    pub fn get_property_priority(&self, name: &str) -> String {
        self.inner
            .block
            .read()
            .get(name)
            .map(|d| d.priority.as_str().to_owned())
            .unwrap_or_default()
    }

    /// Set a property.
    ///
    /// An empty `value` removes the property. An invalid name, value or
    /// priority leaves the block untouched and is reported as
    /// [`Error::Syntax`].
    pub fn set_property(&self, name: &str, value: &str, priority: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::syntax("empty property name"));
        }
        if value.is_empty() {
            self.remove_property(name);
            return Ok(());
        }
        let priority = Priority::from_css(priority)
            .ok_or_else(|| Error::syntax(format!("invalid priority '{}'", priority)))?;
        let value = crate::parser::parse_property_value(value).inspect_err(|e| {
            tracing::debug!(target: targets::MUTATION, property = name, "rejected value: {}", e);
        })?;

        self.inner
            .block
            .write()
            .set(PropertyDeclaration::new(name, value, priority));
        self.notify();
        Ok(())
    }

    /// Remove a property, returning its previous value (empty if absent).
    pub fn remove_property(&self, name: &str) -> String {
        let removed = self.inner.block.write().remove(name);
        match removed {
            Some(declaration) => {
                self.notify();
                declaration.value
            }
            None => String::new(),
        }
    }

    /// Replace the block contents without notifying.
    pub(crate) fn replace_block(&self, block: PropertyDeclarationBlock) {
        *self.inner.block.write() = block;
    }

    /// Whether two handles refer to the same block.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn notify(&self) {
        let sheet = self.parent_rule().and_then(|rule| rule.parent_style_sheet());
        mutation::notify(sheet.as_ref(), Mutation::DeclarationsChanged);
    }
}

impl Default for CssStyleDeclaration {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CssStyleDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CssStyleDeclaration")
            .field("css_text", &self.css_text())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get() {
        let style = CssStyleDeclaration::new();
        style.set_property("color", "red", "").unwrap();

        assert_eq!(style.get_property_value("color"), "red");
        assert_eq!(style.get_property_value("COLOR"), "red");
        assert_eq!(style.get_property_priority("color"), "");
        assert_eq!(style.length(), 1);
    }

    #[test]
    fn update_keeps_first_position() {
        let style = CssStyleDeclaration::new();
        style.set_property("color", "red", "").unwrap();
        style.set_property("margin", "0", "").unwrap();
        style.set_property("Color", "blue", "important").unwrap();

        assert_eq!(style.length(), 2);
        assert_eq!(style.item(0).as_deref(), Some("color"));
        assert_eq!(style.get_property_priority("color"), "important");
        assert_eq!(style.css_text(), "color: blue !important; margin: 0;");
    }

    #[test]
    fn empty_value_removes() {
        let style = CssStyleDeclaration::parse("color: red; margin: 0");
        style.set_property("color", "", "").unwrap();

        assert_eq!(style.get_property_value("color"), "");
        assert_eq!(style.length(), 1);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let style = CssStyleDeclaration::parse("color: red");

        assert!(style.set_property("color", "blue !important", "").unwrap_err().is_syntax());
        assert!(style.set_property("color", "a; b: c", "").unwrap_err().is_syntax());
        assert!(style.set_property("color", ")", "").unwrap_err().is_syntax());
        assert!(style.set_property("color", "   ", "").unwrap_err().is_syntax());
        assert!(style.set_property("color", "blue", "urgent").unwrap_err().is_syntax());
        assert!(style.set_property("", "blue", "").unwrap_err().is_syntax());

        assert_eq!(style.css_text(), "color: red;");
    }

    #[test]
    fn remove_returns_previous_value() {
        let style = CssStyleDeclaration::new();
        style.set_property("margin", "1px  2px", "").unwrap();

        assert_eq!(style.remove_property("margin"), "1px 2px");
        assert_eq!(style.remove_property("margin"), "");
        assert_eq!(style.get_property_value("margin"), "");
    }

    #[test]
    fn custom_properties_are_case_sensitive() {
        let style = CssStyleDeclaration::new();
        style.set_property("--Accent", "red", "").unwrap();
        style.set_property("--accent", "blue", "").unwrap();

        assert_eq!(style.length(), 2);
        assert_eq!(style.get_property_value("--Accent"), "red");
        assert_eq!(style.get_property_value("--accent"), "blue");
    }

    #[test]
    fn parsed_normal_does_not_override_important() {
        let mut block = PropertyDeclarationBlock::new();
        block.push_parsed(PropertyDeclaration::new("color", "red", Priority::Important));
        block.push_parsed(PropertyDeclaration::new("color", "blue", Priority::Normal));
        assert_eq!(block.get("color").unwrap().value, "red");

        block.push_parsed(PropertyDeclaration::new("color", "green", Priority::Important));
        assert_eq!(block.get("color").unwrap().value, "green");
        assert_eq!(block.len(), 1);
    }

    #[test]
    fn standalone_has_no_parent() {
        let style = CssStyleDeclaration::parse("color: red");
        assert!(style.parent_rule().is_none());
        assert!(style.clone().ptr_eq(&style));
    }

    #[test]
    fn priority_parsing() {
        assert_eq!(Priority::from_css(""), Some(Priority::Normal));
        assert_eq!(Priority::from_css("IMPORTANT"), Some(Priority::Important));
        assert_eq!(Priority::from_css("!important"), None);
    }
}
