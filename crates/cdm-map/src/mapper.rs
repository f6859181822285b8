//! The field mapper contract.

use cdm_model::Record;

use crate::error::Result;

/// A single field-level transformation unit.
///
/// A mapper receives the sub-record containing only the rule's declared
/// source fields and returns its contribution to the output record. It
/// must not assume access to fields outside that projection; this
/// containment is what makes each mapper independently testable.
///
/// # Error policy
///
/// A mapper that cannot produce a result for the current values (lookup
/// miss, failed numeric coercion, empty filter match) returns `Ok` with an
/// empty record, never an error. `Err` is reserved for genuine bugs such
/// as a case discriminator selecting an unregistered arm, and aborts the
/// run.
pub trait FieldMapper: Send + Sync {
    /// Transforms the projected source fields into output fields.
    fn map(&self, fields: &Record) -> Result<Record>;

    /// Human-readable name for error messages and trace logging.
    fn name(&self) -> &'static str;

    /// Whether plan execution should backfill absent declared fields with
    /// empty strings instead of raising a hard missing-field error.
    ///
    /// Defaults to false; the filter mapper overrides this, since its job
    /// is precisely to tolerate values that are not there.
    fn tolerates_missing(&self) -> bool {
        false
    }
}

impl<M: FieldMapper + ?Sized> FieldMapper for Box<M> {
    fn map(&self, fields: &Record) -> Result<Record> {
        (**self).map(fields)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn tolerates_missing(&self) -> bool {
        (**self).tolerates_missing()
    }
}
