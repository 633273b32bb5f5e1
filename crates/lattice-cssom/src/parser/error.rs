//! CSS parsing diagnostics.

use cssparser::{BasicParseErrorKind, ParseErrorKind, Token};

use super::css_parser::RuleParseErrorKind;

/// A recovered parse error with location information.
///
/// Bulk stylesheet parsing never fails; each dropped construct produces one
/// of these instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The error message describing what went wrong.
    pub message: String,
    /// Line number where the error occurred (1-indexed).
    pub line: u32,
    /// Column number where the error occurred (1-indexed).
    pub column: u32,
}

impl ParseError {
    /// Create a new parse error with the given message and location.
    pub fn new(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }

    /// Build a diagnostic from a `cssparser` error and the source slice it covers.
    pub(crate) fn from_css(
        error: &cssparser::ParseError<'_, RuleParseErrorKind>,
        slice: &str,
    ) -> Self {
        let message = match slice.trim() {
            "" => describe(error),
            skipped => format!("{} in '{}'", describe(error), excerpt(skipped)),
        };
        // cssparser lines are 0-based, columns 1-based.
        Self::new(message, error.location.line + 1, error.location.column)
    }
}

/// Longest stretch of skipped source quoted in a message, in characters.
const MAX_EXCERPT: usize = 80;

fn excerpt(text: &str) -> String {
    match text.char_indices().nth(MAX_EXCERPT) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_owned(),
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CSS parse error at {}:{}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Human readable description of a `cssparser` error.
pub(crate) fn describe(error: &cssparser::ParseError<'_, RuleParseErrorKind>) -> String {
    match &error.kind {
        ParseErrorKind::Basic(kind) => describe_basic(kind),
        ParseErrorKind::Custom(kind) => kind.to_string(),
    }
}

fn describe_basic(kind: &BasicParseErrorKind<'_>) -> String {
    match kind {
        BasicParseErrorKind::UnexpectedToken(token) => {
            format!("unexpected {}", describe_token(token))
        }
        BasicParseErrorKind::EndOfInput => "unexpected end of input".to_owned(),
        BasicParseErrorKind::AtRuleInvalid(name) => format!("unknown at-rule '@{}'", name),
        BasicParseErrorKind::AtRuleBodyInvalid => "invalid at-rule body".to_owned(),
        BasicParseErrorKind::QualifiedRuleInvalid => "invalid qualified rule".to_owned(),
    }
}

fn describe_token(token: &Token<'_>) -> String {
    match token {
        Token::Ident(name) => format!("identifier '{}'", name),
        Token::AtKeyword(name) => format!("'@{}'", name),
        Token::Function(name) => format!("function '{}('", name),
        Token::QuotedString(_) => "string".to_owned(),
        Token::Delim(c) => format!("'{}'", c),
        Token::Semicolon => "';'".to_owned(),
        Token::Colon => "':'".to_owned(),
        Token::CurlyBracketBlock => "'{'".to_owned(),
        Token::CloseCurlyBracket => "'}'".to_owned(),
        Token::CloseParenthesis => "')'".to_owned(),
        Token::CloseSquareBracket => "']'".to_owned(),
        Token::BadString(_) => "unterminated string".to_owned(),
        Token::BadUrl(_) => "malformed url".to_owned(),
        other => format!("token {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_location() {
        let error = ParseError::new("unexpected ';'", 3, 7);
        assert_eq!(error.to_string(), "CSS parse error at 3:7: unexpected ';'");
    }
}
