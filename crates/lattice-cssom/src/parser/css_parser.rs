//! CSS syntax parser using the `cssparser` crate.
//!
//! Two entry points build rule trees:
//!
//! - [`parse_stylesheet`] is the forgiving bulk parser. Invalid rules and
//!   declarations are skipped, logged via `tracing::warn!` and collected as
//!   [`ParseError`] diagnostics. It never fails.
//! - [`parse_rule`] is the strict single-rule parser behind `insertRule` and
//!   `cssText`. The text must be exactly one rule with every block closed.

use std::fmt;

use cssparser::{
    AtRuleParser, BasicParseErrorKind, CowRcStr, DeclarationParser, Delimiter,
    ParseError as CssParseError, Parser, ParserInput, ParserState, QualifiedRuleParser,
    RuleBodyItemParser, RuleBodyParser, StyleSheetParser, match_ignore_ascii_case,
    parse_important,
};
use lattice_cssom_core::logging::targets;

use super::error::{ParseError, describe};
use super::tokens;
use crate::rules::{
    CssFontFaceRule, CssImportRule, CssMarginRule, CssMediaRule, CssNamespaceRule, CssPageRule,
    CssRule, CssStyleRule, CssSupportsRule, is_margin_box_name,
};
use crate::style::{Priority, PropertyDeclaration, PropertyDeclarationBlock};
use crate::{Error, Result};

/// Reasons a rule or declaration is dropped, beyond cssparser's own errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RuleParseErrorKind {
    UnknownAtRule(String),
    MisplacedAtRule(&'static str),
    UnexpectedBlock(&'static str),
    InvalidSelector,
    EmptyCondition,
    UnexpectedDeclaration(String),
    EmptyValue,
    InvalidValue,
    NestingTooDeep,
}

impl fmt::Display for RuleParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAtRule(name) => write!(f, "unknown at-rule '@{}'", name),
            Self::MisplacedAtRule(name) => write!(f, "'@{}' is not allowed here", name),
            Self::UnexpectedBlock(name) => write!(f, "'@{}' does not take a block", name),
            Self::InvalidSelector => f.write_str("invalid selector"),
            Self::EmptyCondition => f.write_str("empty condition"),
            Self::UnexpectedDeclaration(name) => write!(f, "unexpected declaration '{}'", name),
            Self::EmptyValue => f.write_str("empty value"),
            Self::InvalidValue => f.write_str("invalid value"),
            Self::NestingTooDeep => f.write_str("rules nested too deeply"),
        }
    }
}

type RuleError<'i> = CssParseError<'i, RuleParseErrorKind>;

/// Result of a bulk parse.
#[derive(Debug, Clone, Default)]
pub struct ParsedStyleSheet {
    /// Top-level rules in source order.
    pub rules: Vec<CssRule>,
    /// Recovered errors, in source order.
    pub errors: Vec<ParseError>,
}

/// Where the parser is, which decides which rules it recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleContext {
    /// Top level of a stylesheet.
    TopLevel,
    /// Inside `@media` or `@supports`.
    Group,
    /// A standalone rule for `insertRule` or `cssText`. Accepts every kind;
    /// placement is checked afterwards.
    Single,
}

/// Top-level ordering state: `@import`, then `@namespace`, then the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum State {
    Start = 1,
    Imports = 2,
    Namespaces = 3,
    Body = 4,
}

enum AtRulePrelude {
    Import { href: String, media: Vec<String> },
    Namespace { prefix: Option<String>, uri: String },
    Media(Vec<String>),
    Supports(String),
    FontFace,
    Page(String),
    Margin(String),
}

struct RuleParser {
    context: RuleContext,
    state: State,
    /// Enclosing grouping rules.
    depth: usize,
    errors: Vec<ParseError>,
}

impl RuleParser {
    fn new(context: RuleContext) -> Self {
        Self {
            context,
            state: State::Start,
            depth: 0,
            errors: Vec::new(),
        }
    }

    /// Check that an ordered at-rule may appear now, then advance the state.
    fn enter<'i>(
        &mut self,
        input: &Parser<'i, '_>,
        name: &'static str,
        state: State,
    ) -> std::result::Result<(), RuleError<'i>> {
        match self.context {
            RuleContext::Group => {
                Err(input.new_custom_error(RuleParseErrorKind::MisplacedAtRule(name)))
            }
            RuleContext::TopLevel if self.state > state => {
                Err(input.new_custom_error(RuleParseErrorKind::MisplacedAtRule(name)))
            }
            RuleContext::TopLevel => {
                self.state = state;
                Ok(())
            }
            RuleContext::Single => Ok(()),
        }
    }

    fn enter_body(&mut self) {
        if self.context == RuleContext::TopLevel {
            self.state = State::Body;
        }
    }
}

impl<'i> AtRuleParser<'i> for RuleParser {
    type Prelude = AtRulePrelude;
    type AtRule = CssRule;
    type Error = RuleParseErrorKind;

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<AtRulePrelude, RuleError<'i>> {
        let prelude = match_ignore_ascii_case! { &*name,
            "import" => {
                self.enter(input, "import", State::Imports)?;
                let href = input.expect_url_or_string()?.as_ref().to_owned();
                let media = parse_media_queries(input);
                AtRulePrelude::Import { href, media }
            },
            "namespace" => {
                self.enter(input, "namespace", State::Namespaces)?;
                let prefix = input
                    .try_parse(|input| input.expect_ident_cloned())
                    .ok()
                    .map(|prefix| prefix.as_ref().to_owned());
                let uri = input.expect_url_or_string()?.as_ref().to_owned();
                AtRulePrelude::Namespace { prefix, uri }
            },
            "media" => AtRulePrelude::Media(parse_media_queries(input)),
            "supports" => {
                let mut condition = String::new();
                if !tokens::write_component_values(input, &mut condition) {
                    return Err(input.new_custom_error(RuleParseErrorKind::InvalidValue));
                }
                if condition.is_empty() {
                    return Err(input.new_custom_error(RuleParseErrorKind::EmptyCondition));
                }
                AtRulePrelude::Supports(condition)
            },
            "font-face" => AtRulePrelude::FontFace,
            "page" => AtRulePrelude::Page(parse_page_selector_from(input)?),
            _ => {
                if self.context == RuleContext::Single && is_margin_box_name(&name) {
                    AtRulePrelude::Margin(name.to_ascii_lowercase())
                } else {
                    return Err(input.new_custom_error(RuleParseErrorKind::UnknownAtRule(
                        name.to_string(),
                    )));
                }
            }
        };
        input.expect_exhausted()?;

        if !matches!(prelude, AtRulePrelude::Import { .. } | AtRulePrelude::Namespace { .. }) {
            self.enter_body();
        }
        Ok(prelude)
    }

    fn rule_without_block(
        &mut self,
        prelude: AtRulePrelude,
        _start: &ParserState,
    ) -> std::result::Result<CssRule, ()> {
        match prelude {
            AtRulePrelude::Import { href, media } => {
                Ok(CssRule::Import(CssImportRule::new(href, media)))
            }
            AtRulePrelude::Namespace { prefix, uri } => {
                Ok(CssRule::Namespace(CssNamespaceRule::new(prefix, uri)))
            }
            // Reported by cssparser as an unexpected ';'.
            _ => Err(()),
        }
    }

    fn parse_block<'t>(
        &mut self,
        prelude: AtRulePrelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<CssRule, RuleError<'i>> {
        let rule = match prelude {
            AtRulePrelude::Import { .. } => {
                return Err(input.new_custom_error(RuleParseErrorKind::UnexpectedBlock("import")));
            }
            AtRulePrelude::Namespace { .. } => {
                return Err(
                    input.new_custom_error(RuleParseErrorKind::UnexpectedBlock("namespace"))
                );
            }
            AtRulePrelude::Media(_) | AtRulePrelude::Supports(_)
                if self.depth + 1 >= tokens::MAX_NESTING_DEPTH =>
            {
                return Err(input.new_custom_error(RuleParseErrorKind::NestingTooDeep));
            }
            AtRulePrelude::Media(media) => {
                CssRule::Media(CssMediaRule::new(media, self.parse_group_body(input)))
            }
            AtRulePrelude::Supports(condition) => {
                CssRule::Supports(CssSupportsRule::new(condition, self.parse_group_body(input)))
            }
            AtRulePrelude::FontFace => {
                let block = parse_declaration_list(input, &mut self.errors);
                CssRule::FontFace(CssFontFaceRule::new(block))
            }
            AtRulePrelude::Page(selector) => {
                let (block, margins) = parse_page_body(input, &mut self.errors);
                CssRule::Page(CssPageRule::new(selector, block, margins))
            }
            AtRulePrelude::Margin(name) => {
                let block = parse_declaration_list(input, &mut self.errors);
                CssRule::Margin(CssMarginRule::new(name, block))
            }
        };
        Ok(rule)
    }
}

impl RuleParser {
    fn parse_group_body(&mut self, input: &mut Parser<'_, '_>) -> Vec<CssRule> {
        let mut nested = RuleParser::new(RuleContext::Group);
        nested.depth = self.depth + 1;
        let mut rules = Vec::new();
        for result in RuleBodyParser::new(input, &mut nested) {
            match result {
                Ok(rule) => rules.push(rule),
                Err((error, slice)) => record(&mut self.errors, &error, slice),
            }
        }
        self.errors.append(&mut nested.errors);
        rules
    }
}

impl<'i> QualifiedRuleParser<'i> for RuleParser {
    type Prelude = String;
    type QualifiedRule = CssRule;
    type Error = RuleParseErrorKind;

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<String, RuleError<'i>> {
        let selector = parse_selector_from(input)?;
        self.enter_body();
        Ok(selector)
    }

    fn parse_block<'t>(
        &mut self,
        selector: String,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<CssRule, RuleError<'i>> {
        let block = parse_declaration_list(input, &mut self.errors);
        Ok(CssRule::Style(CssStyleRule::new(selector, block)))
    }
}

impl<'i> DeclarationParser<'i> for RuleParser {
    type Declaration = CssRule;
    type Error = RuleParseErrorKind;

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<CssRule, RuleError<'i>> {
        Err(input.new_custom_error(RuleParseErrorKind::UnexpectedDeclaration(name.to_string())))
    }
}

impl<'i> RuleBodyItemParser<'i, CssRule, RuleParseErrorKind> for RuleParser {
    fn parse_declarations(&self) -> bool {
        false
    }

    fn parse_qualified(&self) -> bool {
        true
    }
}

/// Parses `name: value` lists inside style, font-face and margin rules.
struct DeclarationListParser;

impl<'i> DeclarationParser<'i> for DeclarationListParser {
    type Declaration = PropertyDeclaration;
    type Error = RuleParseErrorKind;

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<PropertyDeclaration, RuleError<'i>> {
        let (value, priority) = parse_value_and_priority(input)?;
        Ok(PropertyDeclaration::new(&name, value, priority))
    }
}

impl<'i> AtRuleParser<'i> for DeclarationListParser {
    type Prelude = ();
    type AtRule = PropertyDeclaration;
    type Error = RuleParseErrorKind;

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<(), RuleError<'i>> {
        Err(input.new_custom_error(RuleParseErrorKind::UnknownAtRule(name.to_string())))
    }

    fn rule_without_block(
        &mut self,
        _prelude: (),
        _start: &ParserState,
    ) -> std::result::Result<PropertyDeclaration, ()> {
        Err(())
    }

    fn parse_block<'t>(
        &mut self,
        _prelude: (),
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<PropertyDeclaration, RuleError<'i>> {
        Err(input.new_error(BasicParseErrorKind::AtRuleBodyInvalid))
    }
}

impl<'i> QualifiedRuleParser<'i> for DeclarationListParser {
    type Prelude = ();
    type QualifiedRule = PropertyDeclaration;
    type Error = RuleParseErrorKind;

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<(), RuleError<'i>> {
        Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid))
    }

    fn parse_block<'t>(
        &mut self,
        _prelude: (),
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<PropertyDeclaration, RuleError<'i>> {
        Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid))
    }
}

impl<'i> RuleBodyItemParser<'i, PropertyDeclaration, RuleParseErrorKind> for DeclarationListParser {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        false
    }
}

enum PageItem {
    Declaration(PropertyDeclaration),
    Margin(CssRule),
}

/// Parses the body of `@page`: declarations mixed with margin rules.
struct PageBodyParser {
    errors: Vec<ParseError>,
}

impl<'i> DeclarationParser<'i> for PageBodyParser {
    type Declaration = PageItem;
    type Error = RuleParseErrorKind;

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<PageItem, RuleError<'i>> {
        let (value, priority) = parse_value_and_priority(input)?;
        Ok(PageItem::Declaration(PropertyDeclaration::new(&name, value, priority)))
    }
}

impl<'i> AtRuleParser<'i> for PageBodyParser {
    type Prelude = String;
    type AtRule = PageItem;
    type Error = RuleParseErrorKind;

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<String, RuleError<'i>> {
        if !is_margin_box_name(&name) {
            return Err(input.new_custom_error(RuleParseErrorKind::UnknownAtRule(name.to_string())));
        }
        input.expect_exhausted()?;
        Ok(name.to_ascii_lowercase())
    }

    fn rule_without_block(
        &mut self,
        _prelude: String,
        _start: &ParserState,
    ) -> std::result::Result<PageItem, ()> {
        Err(())
    }

    fn parse_block<'t>(
        &mut self,
        name: String,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<PageItem, RuleError<'i>> {
        let block = parse_declaration_list(input, &mut self.errors);
        Ok(PageItem::Margin(CssRule::Margin(CssMarginRule::new(name, block))))
    }
}

impl<'i> QualifiedRuleParser<'i> for PageBodyParser {
    type Prelude = ();
    type QualifiedRule = PageItem;
    type Error = RuleParseErrorKind;

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<(), RuleError<'i>> {
        Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid))
    }

    fn parse_block<'t>(
        &mut self,
        _prelude: (),
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<PageItem, RuleError<'i>> {
        Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid))
    }
}

impl<'i> RuleBodyItemParser<'i, PageItem, RuleParseErrorKind> for PageBodyParser {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        false
    }
}

fn record(errors: &mut Vec<ParseError>, error: &RuleError<'_>, slice: &str) {
    let error = ParseError::from_css(error, slice);
    tracing::warn!(
        target: targets::PARSER,
        line = error.line,
        column = error.column,
        "{}",
        error.message
    );
    errors.push(error);
}

fn parse_declaration_list(
    input: &mut Parser<'_, '_>,
    errors: &mut Vec<ParseError>,
) -> PropertyDeclarationBlock {
    let mut block = PropertyDeclarationBlock::new();
    let mut parser = DeclarationListParser;
    for result in RuleBodyParser::new(input, &mut parser) {
        match result {
            Ok(declaration) => block.push_parsed(declaration),
            Err((error, slice)) => record(errors, &error, slice),
        }
    }
    block
}

fn parse_page_body(
    input: &mut Parser<'_, '_>,
    errors: &mut Vec<ParseError>,
) -> (PropertyDeclarationBlock, Vec<CssRule>) {
    let mut block = PropertyDeclarationBlock::new();
    let mut margins = Vec::new();
    let mut parser = PageBodyParser { errors: Vec::new() };
    for result in RuleBodyParser::new(input, &mut parser) {
        match result {
            Ok(PageItem::Declaration(declaration)) => block.push_parsed(declaration),
            Ok(PageItem::Margin(rule)) => margins.push(rule),
            Err((error, slice)) => record(errors, &error, slice),
        }
    }
    errors.append(&mut parser.errors);
    (block, margins)
}

/// Parse `value [!important]` up to the end of `input`.
fn parse_value_and_priority<'i>(
    input: &mut Parser<'i, '_>,
) -> std::result::Result<(String, Priority), RuleError<'i>> {
    let mut value = String::new();
    let mut valid = true;
    input.parse_until_before(Delimiter::Bang, |input| {
        valid = tokens::write_component_values(input, &mut value);
        Ok::<_, RuleError<'i>>(())
    })?;
    let priority = match input.try_parse(parse_important) {
        Ok(()) => Priority::Important,
        Err(_) => Priority::Normal,
    };
    input.expect_exhausted()?;

    if !valid {
        return Err(input.new_custom_error(RuleParseErrorKind::InvalidValue));
    }
    if value.is_empty() {
        return Err(input.new_custom_error(RuleParseErrorKind::EmptyValue));
    }
    Ok((value, priority))
}

fn parse_selector_from<'i>(
    input: &mut Parser<'i, '_>,
) -> std::result::Result<String, RuleError<'i>> {
    let mut selector = String::new();
    if !tokens::write_selector(input, &mut selector) || selector.is_empty() {
        return Err(input.new_custom_error(RuleParseErrorKind::InvalidSelector));
    }
    Ok(selector)
}

fn parse_page_selector_from<'i>(
    input: &mut Parser<'i, '_>,
) -> std::result::Result<String, RuleError<'i>> {
    let mut selector = String::new();
    if !tokens::write_selector(input, &mut selector) {
        return Err(input.new_custom_error(RuleParseErrorKind::InvalidSelector));
    }
    Ok(selector)
}

/// Split on top-level commas, dropping empty entries.
fn parse_media_queries(input: &mut Parser<'_, '_>) -> Vec<String> {
    let mut media = Vec::new();
    loop {
        let mut medium = String::new();
        let _ = input.parse_until_before(Delimiter::Comma, |input| {
            tokens::write_component_values(input, &mut medium);
            Ok::<_, CssParseError<'_, ()>>(())
        });
        if !medium.is_empty() {
            media.push(medium);
        }
        if input.next().is_err() {
            break;
        }
    }
    media
}

/// Parse a stylesheet, recovering from errors.
///
/// Rules that fail to parse are skipped with a warning logged, and returned
/// as diagnostics alongside the rules that did parse.
///
/// # Example
///
/// ```
/// use lattice_cssom::parser::parse_stylesheet;
///
/// let parsed = parse_stylesheet("a { color: red } @bogus; b { }");
/// assert_eq!(parsed.rules.len(), 2);
/// assert_eq!(parsed.errors.len(), 1);
/// ```
#[tracing::instrument(
    skip_all,
    target = "lattice_cssom::parser",
    level = "debug",
    fields(len = css.len())
)]
pub fn parse_stylesheet(css: &str) -> ParsedStyleSheet {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut rule_parser = RuleParser::new(RuleContext::TopLevel);
    let mut rules = Vec::new();
    let mut errors = Vec::new();

    for result in StyleSheetParser::new(&mut parser, &mut rule_parser) {
        match result {
            Ok(rule) => rules.push(rule),
            Err((error, slice)) => record(&mut errors, &error, slice),
        }
    }
    errors.append(&mut rule_parser.errors);
    errors.sort_by_key(|e| (e.line, e.column));

    tracing::debug!(
        target: targets::PARSER,
        rules = rules.len(),
        errors = errors.len(),
        "parsed stylesheet"
    );
    ParsedStyleSheet { rules, errors }
}

/// Parse exactly one rule.
///
/// Fails with [`Error::Syntax`] for empty input, trailing content, any
/// unclosed block, or a rule that does not parse. Placement is not checked.
pub fn parse_rule(css: &str) -> Result<CssRule> {
    tokens::check_blocks(css).map_err(|e| Error::syntax(e.message()))?;
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut rule_parser = RuleParser::new(RuleContext::Single);
    cssparser::parse_one_rule(&mut parser, &mut rule_parser)
        .map_err(|e| Error::syntax(describe(&e)))
}

/// Parse the contents of a declaration block, e.g. a `style` attribute.
pub fn parse_declaration_block(css: &str) -> PropertyDeclarationBlock {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    parse_declaration_list(&mut parser, &mut Vec::new())
}

/// Parse and normalize a property value for `setProperty`.
///
/// `!important` is not accepted here; priority is passed separately.
pub fn parse_property_value(value: &str) -> Result<String> {
    let mut input = ParserInput::new(value);
    let mut parser = Parser::new(&mut input);
    match parser.parse_entirely(parse_value_and_priority) {
        Ok((value, Priority::Normal)) => Ok(value),
        Ok((_, Priority::Important)) => Err(Error::syntax("'!important' is not part of a value")),
        Err(e) => Err(Error::syntax(describe(&e))),
    }
}

/// Parse a comma-separated media query list into normalized entries.
pub fn parse_media_list(text: &str) -> Vec<String> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    parse_media_queries(&mut parser)
}

/// Parse and normalize a selector list. Empty or malformed text is an error.
pub fn parse_selector(text: &str) -> Result<String> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    parse_selector_from(&mut parser).map_err(|e| Error::syntax(describe(&e)))
}

/// Parse and normalize a page selector. The empty string is allowed.
pub fn parse_page_selector(text: &str) -> Result<String> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    parse_page_selector_from(&mut parser).map_err(|e| Error::syntax(describe(&e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{CssRuleType, Rule};

    fn types(parsed: &ParsedStyleSheet) -> Vec<CssRuleType> {
        parsed.rules.iter().map(|r| r.rule_type()).collect()
    }

    #[test]
    fn parse_simple_rules() {
        let parsed = parse_stylesheet("a { color: red } b { margin: 0 }");
        assert_eq!(parsed.rules.len(), 2);
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn recovers_from_invalid_rules() {
        let parsed = parse_stylesheet("a { color: red } @unknown x; ) { } b { }");
        assert_eq!(types(&parsed), vec![CssRuleType::Style, CssRuleType::Style]);
        assert_eq!(parsed.errors.len(), 2);
    }

    #[test]
    fn skips_invalid_declarations() {
        let parsed = parse_stylesheet("a { color: ; margin: 0; : x; padding: 1px }");
        assert_eq!(parsed.rules[0].css_text(), "a { margin: 0; padding: 1px; }");
        assert_eq!(parsed.errors.len(), 2);
    }

    #[test]
    fn error_locations() {
        let parsed = parse_stylesheet("a { }\n@bogus;");
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].line, 2);
        assert!(parsed.errors[0].message.contains("@bogus"));
    }

    #[test]
    fn import_after_body_is_dropped() {
        let parsed = parse_stylesheet(
            "@import url(a.css); a { } @import url(b.css); @namespace x url(y);",
        );
        assert_eq!(types(&parsed), vec![CssRuleType::Import, CssRuleType::Style]);
        assert_eq!(parsed.errors.len(), 2);
    }

    #[test]
    fn import_inside_media_is_dropped() {
        let parsed = parse_stylesheet("@media print { @import url(a.css); a { } }");
        let media = parsed.rules[0].css_rules().unwrap();
        assert_eq!(media.len(), 1);
        assert_eq!(parsed.errors.len(), 1);
    }

    #[test]
    fn at_rule_names_are_case_insensitive() {
        let parsed = parse_stylesheet("@MEDIA print { } @Font-Face { src: x }");
        assert_eq!(types(&parsed), vec![CssRuleType::Media, CssRuleType::FontFace]);
    }

    #[test]
    fn margin_rules_only_inside_page() {
        let parsed = parse_stylesheet("@top-left { } @page { @top-left { } @bogus { } }");
        assert_eq!(types(&parsed), vec![CssRuleType::Page]);
        assert_eq!(parsed.rules[0].css_rules().unwrap().len(), 1);
        assert_eq!(parsed.errors.len(), 2);
    }

    #[test]
    fn media_without_block_is_dropped() {
        let parsed = parse_stylesheet("@media print; a { }");
        assert_eq!(types(&parsed), vec![CssRuleType::Style]);
        assert_eq!(parsed.errors.len(), 1);
    }

    #[test]
    fn strict_single_rule() {
        assert!(parse_rule("a { }").is_ok());
        assert!(parse_rule("@import url(x.css);").is_ok());
        assert!(parse_rule("@top-left { }").is_ok());
        assert!(parse_rule("").unwrap_err().is_syntax());
        assert!(parse_rule("a { } b { }").unwrap_err().is_syntax());
        assert!(parse_rule("not valid {{").unwrap_err().is_syntax());
        assert!(parse_rule("a { color: red").unwrap_err().is_syntax());
        assert!(parse_rule("@bogus { }").unwrap_err().is_syntax());
        assert!(parse_rule("@media print;").unwrap_err().is_syntax());
    }

    #[test]
    fn important_priority() {
        let block = parse_declaration_block("color: red ! IMPORTANT; margin: 0");
        assert!(block.get("color").unwrap().priority.is_important());
        assert!(!block.get("margin").unwrap().priority.is_important());
    }

    #[test]
    fn property_values() {
        assert_eq!(parse_property_value("  1px   solid  red ").unwrap(), "1px solid red");
        assert!(parse_property_value("red !important").unwrap_err().is_syntax());
        assert!(parse_property_value("").unwrap_err().is_syntax());
        assert!(parse_property_value("a ! b").unwrap_err().is_syntax());
    }

    #[test]
    fn media_lists() {
        assert_eq!(parse_media_list("screen, , print"), vec!["screen", "print"]);
        assert!(parse_media_list("   ").is_empty());
        assert_eq!(
            parse_media_list("screen and (max-width: 10px), print"),
            vec!["screen and (max-width: 10px)", "print"]
        );
    }

    #[test]
    fn selectors() {
        assert_eq!(parse_selector(" a ,b ").unwrap(), "a ,b");
        assert!(parse_selector("").is_err());
        assert!(parse_selector("a;").is_err());
        assert_eq!(parse_page_selector("").unwrap(), "");
    }

    #[test]
    fn group_nesting_is_capped() {
        let depth = tokens::MAX_NESTING_DEPTH + 10;
        let css = format!("{}a {{ }}{}", "@supports (x) {".repeat(depth), "}".repeat(depth));
        let parsed = parse_stylesheet(&css);
        assert_eq!(parsed.errors.len(), 1);
        assert!(parsed.errors[0].message.contains("nested too deeply"));

        let mut rule = parsed.rules[0].clone();
        let mut levels = 1;
        while let Some(child) = rule.css_rules().and_then(|rules| rules.item(0)) {
            rule = child;
            levels += 1;
        }
        assert_eq!(levels, tokens::MAX_NESTING_DEPTH - 1);
        assert_eq!(rule.rule_type(), CssRuleType::Supports);
    }
}
