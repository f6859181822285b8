//! Identity, constant, and function-backed mappers.

use cdm_model::Record;

use crate::error::Result;
use crate::mapper::FieldMapper;

/// Returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMapper;

impl FieldMapper for IdentityMapper {
    fn map(&self, fields: &Record) -> Result<Record> {
        Ok(fields.clone())
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}

/// Ignores its input and always returns a fixed record.
///
/// Used for constant concept ids and type codes in CDM rules.
#[derive(Debug, Clone)]
pub struct ConstantMapper {
    output: Record,
}

impl ConstantMapper {
    pub fn new(output: Record) -> Self {
        Self { output }
    }

    /// Single-key convenience constructor.
    pub fn single(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut output = Record::new();
        output.insert(key.into(), value.into());
        Self { output }
    }
}

impl FieldMapper for ConstantMapper {
    fn map(&self, _fields: &Record) -> Result<Record> {
        Ok(self.output.clone())
    }

    fn name(&self) -> &'static str {
        "constant"
    }
}

/// Computes one named output key from the projected input record.
///
/// The closure must be a pure function of its input; lookup structures
/// captured at construction time are fine, mutation is not.
pub struct FunctionMapper {
    key: String,
    func: Box<dyn Fn(&Record) -> String + Send + Sync>,
}

impl FunctionMapper {
    pub fn new<F>(key: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Record) -> String + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            func: Box::new(func),
        }
    }
}

impl FieldMapper for FunctionMapper {
    fn map(&self, fields: &Record) -> Result<Record> {
        let mut out = Record::new();
        out.insert(self.key.clone(), (self.func)(fields));
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "function"
    }
}

/// Produces the full output record directly from a closure.
///
/// The ad hoc escape hatch for business rules that set several fields at
/// once (exclusion flags being the common case).
pub struct PassThroughFunctionMapper {
    func: Box<dyn Fn(&Record) -> Record + Send + Sync>,
}

impl PassThroughFunctionMapper {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&Record) -> Record + Send + Sync + 'static,
    {
        Self {
            func: Box::new(func),
        }
    }
}

impl FieldMapper for PassThroughFunctionMapper {
    fn map(&self, fields: &Record) -> Result<Record> {
        Ok((self.func)(fields))
    }

    fn name(&self) -> &'static str {
        "pass_through_function"
    }
}
