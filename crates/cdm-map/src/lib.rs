//! Field-level mapping engine: mapper primitives, rule compiler, and
//! mapping plan execution.
//!
//! Rules are declared as [`RuleSpec`] values, compiled once into a
//! [`MappingPlan`], and applied record by record. Each rule projects its
//! declared source fields out of the input record, hands them to a
//! [`FieldMapper`], and translates the mapper's output keys to the target
//! field names. Later rules overwrite earlier rules on output-field
//! collision.

pub mod error;
pub mod mapper;
pub mod mappers;
pub mod rules;
pub mod translate;

pub use error::{MapError, Result};
pub use mapper::FieldMapper;
pub use mappers::{
    CascadeMapper, CaseMapper, ChainMapper, ConcatMapper, ConstantMapper, FilterFirstMapper,
    FloatMapper, FunctionMapper, IdentityMapper, LookupMapper, PassThroughFunctionMapper,
    ReplacementMapper, TranslateMapper, TruncateMapper,
};
pub use rules::{CompiledRule, MappingPlan, RuleSpec, TargetSpec, compile_rules};
pub use translate::KeyTranslator;
