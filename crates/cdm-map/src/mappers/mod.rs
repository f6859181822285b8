//! The built-in mapper primitives.

mod basic;
mod compose;
mod lookup;
mod text;

pub use basic::{ConstantMapper, FunctionMapper, IdentityMapper, PassThroughFunctionMapper};
pub use compose::{CascadeMapper, CaseMapper, ChainMapper, FilterFirstMapper};
pub use lookup::{LookupMapper, ReplacementMapper, TranslateMapper};
pub use text::{ConcatMapper, FloatMapper, TruncateMapper};
