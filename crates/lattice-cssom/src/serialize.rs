//! Canonical serialization.
//!
//! The output is stable: serializing, re-parsing and serializing again gives
//! the same text.
//!
//! | construct | form |
//! |-----------|------|
//! | declaration | `name: value;` or `name: value !important;` |
//! | declaration block | declarations joined by a single space |
//! | style rule | `selector { block }`, `selector { }` when empty |
//! | `@media` / `@supports` | `@media cond {\n  rule\n  rule\n}` |
//! | `@import` | `@import url("href") media;` |
//! | `@namespace` | `@namespace prefix url("uri");` |
//! | stylesheet | rules joined by `\n` |

use crate::escape::{escape, serialize_string};
use crate::rules::{CssRule, CssStyleSheet, Rule};
use crate::style::{PropertyDeclaration, PropertyDeclarationBlock};

/// Serialize one declaration, including the trailing `;`.
pub fn serialize_declaration(declaration: &PropertyDeclaration) -> String {
    let mut out = escape(&declaration.name);
    out.push_str(": ");
    out.push_str(&declaration.value);
    if declaration.priority.is_important() {
        out.push_str(" !important");
    }
    out.push(';');
    out
}

/// Serialize a declaration block.
pub fn serialize_declarations(block: &PropertyDeclarationBlock) -> String {
    block
        .iter()
        .map(serialize_declaration)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Serialize a media list.
pub fn serialize_media_list(media: &[String]) -> String {
    media.join(", ")
}

/// Serialize any rule.
pub fn serialize_rule(rule: &CssRule) -> String {
    rule.css_text()
}

/// Serialize a whole stylesheet.
pub fn serialize_style_sheet(sheet: &CssStyleSheet) -> String {
    sheet
        .css_rules()
        .iter()
        .map(|rule| rule.css_text())
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn serialize_style_rule(selector: &str, block: &PropertyDeclarationBlock) -> String {
    serialize_block_rule(selector, block, &[])
}

/// `prelude { declarations extra }`, or `prelude { }` when there is nothing
/// inside.
pub(crate) fn serialize_block_rule(
    prelude: &str,
    block: &PropertyDeclarationBlock,
    extra: &[String],
) -> String {
    let mut items = Vec::with_capacity(extra.len() + 1);
    if !block.is_empty() {
        items.push(serialize_declarations(block));
    }
    items.extend(extra.iter().cloned());

    if items.is_empty() {
        format!("{} {{ }}", prelude)
    } else {
        format!("{} {{ {} }}", prelude, items.join(" "))
    }
}

pub(crate) fn serialize_page_rule(
    selector: &str,
    block: &PropertyDeclarationBlock,
    margins: &[String],
) -> String {
    let prelude = if selector.is_empty() {
        "@page".to_owned()
    } else {
        format!("@page {}", selector)
    };
    serialize_block_rule(&prelude, block, margins)
}

/// Grouping rules put each child on its own line, indented by two spaces.
pub(crate) fn serialize_group_rule(keyword: &str, condition: &str, rules: &[CssRule]) -> String {
    let mut out = String::from(keyword);
    if !condition.is_empty() {
        out.push(' ');
        out.push_str(condition);
    }
    out.push_str(" {\n");
    for rule in rules {
        out.push_str("  ");
        out.push_str(&rule.css_text());
        out.push('\n');
    }
    out.push('}');
    out
}

pub(crate) fn serialize_import_rule(href: &str, media: &[String]) -> String {
    let mut out = format!("@import url({})", serialize_string(href));
    if !media.is_empty() {
        out.push(' ');
        out.push_str(&serialize_media_list(media));
    }
    out.push(';');
    out
}

pub(crate) fn serialize_namespace_rule(prefix: Option<&str>, uri: &str) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => {
            format!("@namespace {} url({});", escape(prefix), serialize_string(uri))
        }
        _ => format!("@namespace url({});", serialize_string(uri)),
    }
}
