//! CSS parsing module.

mod css_parser;
mod error;
mod tokens;

pub use css_parser::{
    ParsedStyleSheet, parse_declaration_block, parse_media_list, parse_page_selector,
    parse_property_value, parse_rule, parse_selector, parse_stylesheet,
};
pub use error::ParseError;
