//! CSS Object Model for Lattice.
//!
//! This crate parses CSS text into a live, mutable tree of rules and
//! serializes it back out:
//!
//! - **Parsing**: forgiving whole-stylesheet parsing with recovered
//!   diagnostics, and strict single-rule parsing for `insertRule`/`cssText`
//! - **Rule tree**: stylesheets, live rule lists, style, `@import`,
//!   `@namespace`, `@media`, `@supports`, `@font-face`, `@page` and margin
//!   rules, with parent back-references
//! - **Mutation**: validated insertion and deletion, in-place `cssText`
//!   replacement, declaration and media list editing, with a change signal
//!   per stylesheet
//! - **Serialization**: one canonical text form for every construct
//! - **Escaping**: `CSS.escape` and its inverse
//!
//! Selectors, media queries and property values are kept as normalized text;
//! nothing here matches selectors, evaluates media queries or computes styles.
//!
//! # Example
//!
//! ```
//! use lattice_cssom::prelude::*;
//!
//! let sheet = CssStyleSheet::from_css("a { color: red }");
//! let rule = sheet.css_rules().item(0).unwrap();
//!
//! let style = rule.as_style().unwrap().style();
//! style.set_property("margin", "0", "important").unwrap();
//!
//! assert_eq!(sheet.css_text(), "a { color: red; margin: 0 !important; }");
//! ```

pub mod escape;
pub mod mutation;
pub mod parser;
pub mod rules;
pub mod serialize;
pub mod style;

mod error;

pub use error::{Error, Result};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::escape::{escape, unescape};
    pub use crate::mutation::Mutation;
    pub use crate::parser::ParseError;
    pub use crate::rules::{
        CssFontFaceRule, CssImportRule, CssMarginRule, CssMediaRule, CssNamespaceRule,
        CssPageRule, CssRule, CssRuleList, CssRuleType, CssStyleRule, CssStyleSheet,
        CssSupportsRule, GroupingRule, MediaList, Origin, Rule, StyleSheetBuilder,
        StyleSheetChange,
    };
    pub use crate::style::{CssStyleDeclaration, Priority, PropertyDeclaration};
    pub use crate::{Error, Result};
}
