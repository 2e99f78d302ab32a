//! Data types shared by the compiler and the renderers.
//!
//! - **Template layer** ([`template`]): a compiled pattern is an ordered
//!   list of [`Element`]s, each either verbatim text or a positional
//!   argument reference.
//! - **Expression layer** ([`expr`]): immutable expression trees built from
//!   constants, paths, operations and template expressions, walked by a
//!   [`Visitor`].

pub mod expr;
pub mod span;
pub mod template;
pub mod value;

pub use expr::*;
pub use span::{Span, Spanned};
pub use template::*;
pub use value::{Any, ExprType, TypeKind, Value};
