//! Declaration blocks.

mod declaration;

pub use declaration::{
    CssStyleDeclaration, Priority, PropertyDeclaration, PropertyDeclarationBlock,
    normalize_property_name,
};
