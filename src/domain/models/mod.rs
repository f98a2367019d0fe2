mod binding;
mod classpath;
mod decl_name;
mod fact;
mod name_hierarchy;
mod range;
mod source_text;
mod symbol_kind;
mod syntax;
mod type_name;

pub use binding::*;
pub use classpath::*;
pub use decl_name::*;
pub use fact::*;
pub use name_hierarchy::*;
pub use range::*;
pub use source_text::*;
pub use symbol_kind::*;
pub use syntax::*;
pub use type_name::*;
