//! The rule tree: stylesheets, rule lists and every rule kind.

mod conditional;
mod font_face;
mod import;
mod media;
mod page;
mod rule;
mod rule_list;
mod style_rule;
mod stylesheet;

pub use conditional::{CssMediaRule, CssSupportsRule};
pub use font_face::CssFontFaceRule;
pub use import::{CssImportRule, CssNamespaceRule};
pub use media::MediaList;
pub use page::{CssMarginRule, CssPageRule, MARGIN_BOX_NAMES, is_margin_box_name};
pub use rule::{CssRule, CssRuleType, GroupingRule, Rule};
pub use rule_list::CssRuleList;
pub use style_rule::CssStyleRule;
pub use stylesheet::{CssStyleSheet, Origin, OwnerNode, StyleSheetBuilder, StyleSheetChange};

pub(crate) use rule::WeakRule;
pub(crate) use rule_list::Container;
pub(crate) use stylesheet::StyleSheetInner;
