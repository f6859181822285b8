//! Output key translation.

use std::collections::BTreeMap;

use cdm_model::Record;
use tracing::warn;

/// Renames a mapper's output keys to the target field names a rule
/// declares.
///
/// In strict mode an output key with no translation is flagged with a
/// warning and dropped, surfacing bugs in rule authoring; the identity
/// translator passes every key through untouched.
#[derive(Debug, Clone, Default)]
pub struct KeyTranslator {
    mapping: BTreeMap<String, String>,
    strict: bool,
    identity: bool,
}

impl KeyTranslator {
    /// Passes all keys through unchanged.
    pub fn identity() -> Self {
        Self {
            mapping: BTreeMap::new(),
            strict: false,
            identity: true,
        }
    }

    pub fn new<I, K, V>(mapping: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            mapping: mapping
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            strict: false,
            identity: false,
        }
    }

    /// Flag (and drop) output keys that have no declared target.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn translate(&self, record: Record) -> Record {
        if self.identity {
            return record;
        }
        let mut out = Record::new();
        for (key, value) in record {
            match self.mapping.get(&key) {
                Some(target) => {
                    out.insert(target.clone(), value);
                }
                None if self.strict => {
                    warn!(key = %key, "mapper produced a key with no declared target");
                }
                None => {}
            }
        }
        out
    }
}
