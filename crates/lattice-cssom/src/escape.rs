//! Identifier and string escaping (`CSS.escape` and its inverse).
//!
//! [`escape`] turns any string into text that tokenizes as exactly one CSS
//! identifier whose value is the input (with NUL replaced by U+FFFD), or the
//! empty string for empty input. [`unescape`] goes the other way.

use cssparser::{Parser, ParserInput, Token};

use crate::{Error, Result};

/// Escape `ident` so it can be used as a CSS identifier.
///
/// - a leading digit, or a digit following a single leading `-`, is written as
///   a code point escape (`"1a"` becomes `\31 a`)
/// - the string `"-"` becomes `\-`
/// - NUL becomes U+FFFD
/// - U+0001..U+001F and U+007F are written as code point escapes
/// - ASCII other than `[a-zA-Z0-9_-]` gets a backslash
/// - non-ASCII is kept as-is
///
/// ```
/// use lattice_cssom::escape::escape;
///
/// assert_eq!(escape("1a"), "\\31 a");
/// assert_eq!(escape("-"), "\\-");
/// assert_eq!(escape(""), "");
/// ```
pub fn escape(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    // Writing into a String cannot fail.
    let _ = cssparser::serialize_identifier(ident, &mut out);
    out
}

/// Decode a serialized identifier back into its value.
///
/// Leading and trailing whitespace is ignored. The empty string decodes to the
/// empty string; anything that is not exactly one identifier is a
/// [`Error::Syntax`].
///
/// ```
/// use lattice_cssom::escape::{escape, unescape};
///
/// assert_eq!(unescape("\\31 a").unwrap(), "1a");
/// assert_eq!(unescape(&escape("a b.c")).unwrap(), "a b.c");
/// ```
pub fn unescape(text: &str) -> Result<String> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);

    if parser.is_exhausted() {
        return Ok(String::new());
    }

    let value = match parser.next() {
        Ok(Token::Ident(value)) => value.to_string(),
        Ok(token) => {
            return Err(Error::syntax(format!(
                "expected an identifier, found {:?}",
                token
            )));
        }
        Err(e) => return Err(Error::syntax(format!("{:?}", e))),
    };

    if !parser.is_exhausted() {
        return Err(Error::syntax(format!(
            "unexpected content after identifier in '{}'",
            text
        )));
    }

    Ok(value)
}

/// Serialize `value` as a double-quoted CSS string.
///
/// ```
/// use lattice_cssom::escape::serialize_string;
///
/// assert_eq!(serialize_string("a\"b"), "\"a\\\"b\"");
/// ```
pub fn serialize_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    let _ = cssparser::serialize_string(value, &mut out);
    out
}
