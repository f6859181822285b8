//! Composition mappers: chaining, cascading fallback, filtering, and
//! case dispatch.

use cdm_model::Record;

use crate::error::{MapError, Result};
use crate::mapper::FieldMapper;

/// Strict sequential composition: each mapper's full output feeds the
/// next.
///
/// A downstream mapper that needs a key its predecessor did not produce
/// yields nothing; the chain does not reach back to the original input.
pub struct ChainMapper {
    mappers: Vec<Box<dyn FieldMapper>>,
}

impl ChainMapper {
    pub fn new(mappers: Vec<Box<dyn FieldMapper>>) -> Self {
        Self { mappers }
    }
}

impl FieldMapper for ChainMapper {
    fn map(&self, fields: &Record) -> Result<Record> {
        let mut current = fields.clone();
        for mapper in &self.mappers {
            current = mapper.map(&current)?;
        }
        Ok(current)
    }

    fn name(&self) -> &'static str {
        "chain"
    }

    fn tolerates_missing(&self) -> bool {
        self.mappers.first().is_some_and(|m| m.tolerates_missing())
    }
}

/// Best-available-match fallback: the first mapper whose result is
/// non-empty wins and short-circuits the rest.
///
/// The "try LOINC, then SNOMED, then give up" pattern.
pub struct CascadeMapper {
    mappers: Vec<Box<dyn FieldMapper>>,
}

impl CascadeMapper {
    pub fn new(mappers: Vec<Box<dyn FieldMapper>>) -> Self {
        Self { mappers }
    }
}

impl FieldMapper for CascadeMapper {
    fn map(&self, fields: &Record) -> Result<Record> {
        for mapper in &self.mappers {
            let result = mapper.map(fields)?;
            if !result.is_empty() {
                return Ok(result);
            }
        }
        Ok(Record::new())
    }

    fn name(&self) -> &'static str {
        "cascade"
    }

    fn tolerates_missing(&self) -> bool {
        self.mappers.iter().all(|m| m.tolerates_missing())
    }
}

/// Returns the first `(key, value)` pair from an ordered key list whose
/// value is non-empty.
///
/// Used to short-circuit chains and cascades when an input value is
/// simply not there. Absent keys are tolerated, so rules built on this
/// mapper do not hard-fail on fields missing from the record.
#[derive(Debug, Clone)]
pub struct FilterFirstMapper {
    keys: Vec<String>,
}

impl FilterFirstMapper {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl FieldMapper for FilterFirstMapper {
    fn map(&self, fields: &Record) -> Result<Record> {
        let mut out = Record::new();
        for key in &self.keys {
            if let Some(value) = fields.get(key)
                && !value.is_empty()
            {
                out.insert(key.clone(), value.clone());
                return Ok(out);
            }
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "filter_first"
    }

    fn tolerates_missing(&self) -> bool {
        true
    }
}

/// Multi-way dispatch: a discriminator selects which child mapper handles
/// the record.
///
/// The classic use is coding-system dispatch (ICD-9 vs ICD-10 vs CPT). An
/// index outside the registered arms is a bug in the discriminator and
/// aborts the run.
pub struct CaseMapper {
    discriminator: Box<dyn Fn(&Record) -> usize + Send + Sync>,
    arms: Vec<Box<dyn FieldMapper>>,
}

impl CaseMapper {
    pub fn new<F>(discriminator: F, arms: Vec<Box<dyn FieldMapper>>) -> Self
    where
        F: Fn(&Record) -> usize + Send + Sync + 'static,
    {
        Self {
            discriminator: Box::new(discriminator),
            arms,
        }
    }
}

impl FieldMapper for CaseMapper {
    fn map(&self, fields: &Record) -> Result<Record> {
        let index = (self.discriminator)(fields);
        let arm = self
            .arms
            .get(index)
            .ok_or_else(|| MapError::CaseArmOutOfRange {
                index,
                arms: self.arms.len(),
            })?;
        arm.map(fields)
    }

    fn name(&self) -> &'static str {
        "case"
    }
}
