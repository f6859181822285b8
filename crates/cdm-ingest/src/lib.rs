//! Record source and sink contracts with CSV realizations.
//!
//! The mapping engine depends only on the [`RecordSource`] and
//! [`RecordSink`] traits; CSV files are the reference realization and the
//! in-memory Vec variants back tests and embedded callers. A database
//! table would be an equally valid realization of the same contracts.

pub mod sink;
pub mod source;

pub use sink::{CsvSink, HeaderPolicy, RecordSink, VecSink};
pub use source::{CsvSource, RecordSource, VecSource};
