//! Shared data model for the source-to-CDM mapping engine.
//!
//! The engine moves [`Record`]s (string-to-string maps) from input sources
//! through compiled mapping plans into tagged output sinks. This crate
//! holds the leaf types every other crate agrees on: the record shape, the
//! schema contract (declared fields, `:row_id`, the `i_exclude` exclusion
//! convention), and the output tag used for routing.

pub mod error;
pub mod record;
pub mod schema;
pub mod tag;

pub use error::{ModelError, Result};
pub use record::{Record, has_value, is_flag_set, record_from_pairs};
pub use schema::{EXCLUDE_FIELD, ROW_ID_FIELD, Schema};
pub use tag::OutputTag;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_serializes() {
        let schema = Schema::new("prepared_obs", ["s_code", "s_value"])
            .with_parent_fields([EXCLUDE_FIELD]);
        let json = serde_json::to_string(&schema).expect("serialize schema");
        let round: Schema = serde_json::from_str(&json).expect("deserialize schema");
        assert_eq!(round, schema);
    }
}
