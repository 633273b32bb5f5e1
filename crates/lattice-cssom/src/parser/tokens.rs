//! Component value normalization.
//!
//! Selectors, media queries, supports conditions and property values are kept
//! as opaque text. Everything that stores such text goes through
//! [`write_component_values`] so that serialization is canonical: comments
//! are dropped, whitespace runs collapse to a single space, and leading and
//! trailing whitespace is trimmed. Tokens themselves are copied from the
//! source unchanged, so numbers keep their exact spelling.

use cssparser::{ParseError, Parser, ParserInput, Token, TokenSerializationType};

/// Deepest block nesting accepted inside a value, selector or prelude.
pub(crate) const MAX_NESTING_DEPTH: usize = 64;

/// Serialize the rest of `input` into `dest` in canonical form.
///
/// Returns `false` if the input contained a token that can never be valid in
/// a component value list: a bad string or url, an unmatched closing bracket,
/// a top-level `;`, or blocks nested deeper than [`MAX_NESTING_DEPTH`].
pub(crate) fn write_component_values(input: &mut Parser<'_, '_>, dest: &mut String) -> bool {
    let mut valid = true;
    write_values(input, dest, Grammar::Value, 0, &mut valid);
    valid
}

/// Like [`write_component_values`], but also rejects `{}` blocks and
/// at-keywords, which cannot appear in a selector list.
pub(crate) fn write_selector(input: &mut Parser<'_, '_>, dest: &mut String) -> bool {
    let mut valid = true;
    write_values(input, dest, Grammar::Selector, 0, &mut valid);
    valid
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Grammar {
    Value,
    Selector,
}

/// What separated the previous token from the next one in the source.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Gap {
    None,
    Comment,
    Space,
}

fn write_values<'i>(
    input: &mut Parser<'i, '_>,
    dest: &mut String,
    grammar: Grammar,
    depth: usize,
    valid: &mut bool,
) {
    let mut previous: Option<TokenSerializationType> = None;
    let mut gap = Gap::None;

    loop {
        let start = input.position();
        let token = match input.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        match token {
            Token::WhiteSpace(_) => {
                gap = Gap::Space;
                continue;
            }
            Token::Comment(_) => {
                if gap == Gap::None {
                    gap = Gap::Comment;
                }
                continue;
            }
            Token::BadUrl(_)
            | Token::BadString(_)
            | Token::CloseParenthesis
            | Token::CloseSquareBracket
            | Token::CloseCurlyBracket => *valid = false,
            Token::Semicolon if depth == 0 => *valid = false,
            Token::CurlyBracketBlock | Token::AtKeyword(_) if grammar == Grammar::Selector => {
                *valid = false
            }
            _ => {}
        }

        let kind = token.serialization_type();
        if let Some(previous) = previous {
            match gap {
                Gap::Space => dest.push(' '),
                // Removing the comment must not merge the two tokens.
                Gap::Comment if previous.needs_separator_when_before(kind) => dest.push_str("/**/"),
                _ => {}
            }
        }
        gap = Gap::None;
        dest.push_str(input.slice_from(start));
        previous = Some(kind);

        let closing = match token {
            Token::Function(_) | Token::ParenthesisBlock => ")",
            Token::SquareBracketBlock => "]",
            Token::CurlyBracketBlock => "}",
            _ => continue,
        };
        if depth + 1 >= MAX_NESTING_DEPTH {
            // The parser skips the unread block on the next call.
            *valid = false;
        } else {
            let _ = input.parse_nested_block(|nested| {
                write_values(nested, dest, grammar, depth + 1, valid);
                Ok::<_, ParseError<'i, ()>>(())
            });
        }
        dest.push_str(closing);
        previous = Some(TokenSerializationType::Nothing);
    }
}

/// Why a strict rule text failed the block check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockError {
    Unterminated,
    TooDeep,
}

impl BlockError {
    pub(crate) fn message(self) -> &'static str {
        match self {
            Self::Unterminated => "unterminated block",
            Self::TooDeep => "blocks nested too deeply",
        }
    }
}

/// Check that every block opened in `css` is explicitly closed and that
/// nesting stays within [`MAX_NESTING_DEPTH`].
///
/// The tokenizer silently closes blocks at end of input; strict single-rule
/// parsing treats that as a syntax error.
pub(crate) fn check_blocks(css: &str) -> Result<(), BlockError> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    check_closed(&mut parser, 0)
}

fn check_closed<'i>(input: &mut Parser<'i, '_>, depth: usize) -> Result<(), BlockError> {
    loop {
        match input.next_including_whitespace_and_comments() {
            Err(_) => return Ok(()),
            Ok(Token::Function(_))
            | Ok(Token::ParenthesisBlock)
            | Ok(Token::SquareBracketBlock)
            | Ok(Token::CurlyBracketBlock) => {}
            Ok(_) => continue,
        }
        if depth + 1 >= MAX_NESTING_DEPTH {
            return Err(BlockError::TooDeep);
        }

        let mut inner_end = None;
        let inner = input.parse_nested_block(|nested| {
            let inner = check_closed(nested, depth + 1);
            inner_end = Some(nested.position());
            Ok::<_, ParseError<'i, ()>>(inner)
        });
        match inner {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(BlockError::Unterminated),
        }
        // Anything consumed after the block contents is the closing token.
        match inner_end {
            Some(end) if !input.slice_from(end).is_empty() => {}
            _ => return Err(BlockError::Unterminated),
        }
    }
}
