//! Declarative rule specs, the rule compiler, and mapping plan execution.

use std::collections::BTreeMap;

use cdm_model::Record;

use crate::error::{MapError, Result};
use crate::mapper::FieldMapper;
use crate::mappers::IdentityMapper;
use crate::translate::KeyTranslator;

/// One declarative field-mapping rule.
///
/// The four shapes mirror how mapping scripts declare rules: a bare field
/// (copy through), a rename, a field with a custom mapper, and the fully
/// specified form with a multi-field projection and an explicit target.
pub enum RuleSpec {
    /// Copy `field` through unchanged.
    Identity(String),
    /// Copy `field`, renaming it to the target.
    Rename(String, String),
    /// Apply a mapper to `field`; the mapper's output keys are used
    /// verbatim.
    Mapped(String, Box<dyn FieldMapper>),
    /// Fully specified: a projection of source fields, a mapper, and a
    /// target spec.
    Full {
        fields: Vec<String>,
        mapper: Box<dyn FieldMapper>,
        target: TargetSpec,
    },
}

impl RuleSpec {
    pub fn identity(field: impl Into<String>) -> Self {
        Self::Identity(field.into())
    }

    pub fn rename(field: impl Into<String>, target: impl Into<String>) -> Self {
        Self::Rename(field.into(), target.into())
    }

    pub fn mapped(field: impl Into<String>, mapper: impl FieldMapper + 'static) -> Self {
        Self::Mapped(field.into(), Box::new(mapper))
    }

    pub fn full<I, S>(
        fields: I,
        mapper: impl FieldMapper + 'static,
        target: impl Into<TargetSpec>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Full {
            fields: fields.into_iter().map(Into::into).collect(),
            mapper: Box::new(mapper),
            target: target.into(),
        }
    }

    /// Single source field, custom mapper, single target name — the most
    /// common fully-specified rule.
    pub fn single(
        field: impl Into<String>,
        mapper: impl FieldMapper + 'static,
        target: impl Into<String>,
    ) -> Self {
        Self::Full {
            fields: vec![field.into()],
            mapper: Box::new(mapper),
            target: TargetSpec::Rename(target.into()),
        }
    }
}

/// Where a rule's mapper output goes.
pub enum TargetSpec {
    /// Rename the mapper's sole output key to this field name.
    Rename(String),
    /// Map each mapper output key to an output field name.
    Map(BTreeMap<String, String>),
    /// Use a pre-built translator.
    Translator(KeyTranslator),
}

impl From<&str> for TargetSpec {
    fn from(target: &str) -> Self {
        Self::Rename(target.to_string())
    }
}

impl From<String> for TargetSpec {
    fn from(target: String) -> Self {
        Self::Rename(target)
    }
}

impl From<BTreeMap<String, String>> for TargetSpec {
    fn from(mapping: BTreeMap<String, String>) -> Self {
        Self::Map(mapping)
    }
}

impl From<KeyTranslator> for TargetSpec {
    fn from(translator: KeyTranslator) -> Self {
        Self::Translator(translator)
    }
}

enum RuleTranslator {
    Identity,
    RenameSole(String),
    Keyed(KeyTranslator),
}

impl RuleTranslator {
    fn translate(&self, record: Record) -> Record {
        match self {
            Self::Identity => record,
            Self::RenameSole(target) => {
                let mut out = Record::new();
                for value in record.into_values() {
                    out.insert(target.clone(), value);
                }
                out
            }
            Self::Keyed(translator) => translator.translate(record),
        }
    }
}

/// A compiled rule: projection, mapper, translation.
pub struct CompiledRule {
    source_fields: Vec<String>,
    mapper: Box<dyn FieldMapper>,
    translator: RuleTranslator,
}

impl CompiledRule {
    pub fn source_fields(&self) -> &[String] {
        &self.source_fields
    }

    pub fn mapper_name(&self) -> &'static str {
        self.mapper.name()
    }
}

/// An ordered, executable list of compiled rules.
///
/// Execution order matters only on output-field collision: later rules'
/// writes overwrite earlier ones.
pub struct MappingPlan {
    rules: Vec<CompiledRule>,
}

impl MappingPlan {
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Applies every rule to `record`, merging translated results into the
    /// accumulating output.
    ///
    /// # Errors
    ///
    /// A declared source field absent from the record is a hard error: it
    /// indicates a schema/rule mismatch, not bad data. Mappers that
    /// tolerate absence (filters) get the missing fields backfilled with
    /// empty strings instead.
    pub fn apply(&self, record: &Record) -> Result<Record> {
        let mut output = Record::new();
        for rule in &self.rules {
            let mut projection = Record::new();
            for field in &rule.source_fields {
                match record.get(field) {
                    Some(value) => {
                        projection.insert(field.clone(), value.clone());
                    }
                    None if rule.mapper.tolerates_missing() => {
                        projection.insert(field.clone(), String::new());
                    }
                    None => {
                        return Err(MapError::MissingField {
                            field: field.clone(),
                        });
                    }
                }
            }
            let mapped = rule.mapper.map(&projection)?;
            let translated = rule.translator.translate(mapped);
            output.extend(translated);
        }
        Ok(output)
    }
}

/// Compiles an ordered rule list into a mapping plan.
///
/// Compilation is pure and deterministic; degenerate specs (empty field
/// names, an empty projection, an empty target) fail fast here rather
/// than mid-run.
pub fn compile_rules(specs: Vec<RuleSpec>) -> Result<MappingPlan> {
    let mut rules = Vec::with_capacity(specs.len());
    for spec in specs {
        rules.push(compile_rule(spec)?);
    }
    Ok(MappingPlan { rules })
}

fn compile_rule(spec: RuleSpec) -> Result<CompiledRule> {
    match spec {
        RuleSpec::Identity(field) => {
            check_field(&field)?;
            Ok(CompiledRule {
                source_fields: vec![field],
                mapper: Box::new(IdentityMapper),
                translator: RuleTranslator::Identity,
            })
        }
        RuleSpec::Rename(field, target) => {
            check_field(&field)?;
            check_target(&target)?;
            Ok(CompiledRule {
                source_fields: vec![field],
                mapper: Box::new(IdentityMapper),
                translator: RuleTranslator::RenameSole(target),
            })
        }
        RuleSpec::Mapped(field, mapper) => {
            check_field(&field)?;
            Ok(CompiledRule {
                source_fields: vec![field],
                mapper,
                translator: RuleTranslator::Identity,
            })
        }
        RuleSpec::Full {
            fields,
            mapper,
            target,
        } => {
            if fields.is_empty() {
                return Err(MapError::MalformedRule(
                    "rule declares no source fields".to_string(),
                ));
            }
            for field in &fields {
                check_field(field)?;
            }
            let translator = match target {
                TargetSpec::Rename(target) => {
                    check_target(&target)?;
                    RuleTranslator::RenameSole(target)
                }
                TargetSpec::Map(mapping) => {
                    if mapping.is_empty() {
                        return Err(MapError::MalformedRule(
                            "target mapping is empty".to_string(),
                        ));
                    }
                    RuleTranslator::Keyed(KeyTranslator::new(mapping).strict())
                }
                TargetSpec::Translator(translator) => RuleTranslator::Keyed(translator),
            };
            Ok(CompiledRule {
                source_fields: fields,
                mapper,
                translator,
            })
        }
    }
}

fn check_field(field: &str) -> Result<()> {
    if field.trim().is_empty() {
        return Err(MapError::MalformedRule(
            "empty source field name".to_string(),
        ));
    }
    Ok(())
}

fn check_target(target: &str) -> Result<()> {
    if target.trim().is_empty() {
        return Err(MapError::MalformedRule(
            "empty target field name".to_string(),
        ));
    }
    Ok(())
}
