//! Declarative mapping definition files.
//!
//! A definition is the data-driven subset of the rule surface: everything
//! that can be said without closures. Scripted callers with function
//! mappers or case dispatch use the library crates directly; the CLI
//! covers the common dictionary-and-rename mappings.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use cdm_core::{FnRouter, RouteDecision};
use cdm_map::{
    ConcatMapper, ConstantMapper, FilterFirstMapper, FloatMapper, KeyTranslator, LookupMapper,
    MappingPlan, ReplacementMapper, RuleSpec, TargetSpec, TranslateMapper, TruncateMapper,
    compile_rules,
};
use cdm_model::{OutputTag, Schema};

/// A complete mapping definition: outputs, per-output rules, and an
/// optional routing table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingDefinition {
    /// Optional explicit input schema; the CSV header is used when
    /// absent.
    #[serde(default)]
    pub input: Option<InputDef>,
    pub outputs: Vec<OutputDef>,
    /// Rules per output tag.
    pub rules: BTreeMap<String, Vec<RuleDef>>,
    #[serde(default)]
    pub route: Option<RouteDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputDef {
    pub name: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputDef {
    pub tag: String,
    pub fields: Vec<String>,
}

/// Value-dispatch routing: look the discriminator field's value up in a
/// table of tags. Records with no table entry fall back to the default
/// tag, or to no output at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDef {
    pub field: String,
    #[serde(default)]
    pub table: BTreeMap<String, String>,
    #[serde(default)]
    pub default: Option<String>,
}

/// One declarative rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleDef {
    /// Copy a field through unchanged.
    Identity { field: String },
    /// Copy a field under a new name.
    Rename { field: String, target: String },
    /// Dictionary translation; a miss produces no value.
    Translate {
        field: String,
        table: BTreeMap<String, String>,
        target: Option<String>,
    },
    /// JSON-file-backed lookup; the file's output keys are used verbatim.
    Lookup { field: String, file: PathBuf },
    /// Always emit a fixed value.
    Constant { target: String, value: String },
    /// Join several fields with a delimiter.
    Concat {
        fields: Vec<String>,
        delimiter: String,
        target: String,
    },
    /// First non-empty field from an ordered list.
    Filter {
        fields: Vec<String>,
        target: Option<String>,
    },
    /// Total value substitution; unmatched values pass through.
    Replace {
        field: String,
        table: BTreeMap<String, String>,
        target: Option<String>,
    },
    /// Numeric normalization.
    Float { field: String, target: Option<String> },
    /// Clip to a maximum length.
    Truncate {
        field: String,
        max_len: usize,
        target: Option<String>,
    },
}

impl MappingDefinition {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read definition: {}", path.display()))?;
        let definition: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parse definition: {}", path.display()))?;
        definition.validate()?;
        Ok(definition)
    }

    fn validate(&self) -> Result<()> {
        if self.outputs.is_empty() {
            bail!("definition declares no outputs");
        }
        for output in &self.outputs {
            if !self.rules.contains_key(&output.tag) {
                bail!("output {:?} has no rules", output.tag);
            }
        }
        for tag in self.rules.keys() {
            if !self.outputs.iter().any(|o| &o.tag == tag) {
                bail!("rules declared for unknown output {tag:?}");
            }
        }
        if self.route.is_none() && self.outputs.len() > 1 {
            bail!("multiple outputs declared but no route");
        }
        Ok(())
    }

    /// Optional explicit input schema.
    pub fn input_schema(&self) -> Option<Schema> {
        self.input
            .as_ref()
            .map(|input| Schema::new(input.name.clone(), input.fields.clone()))
    }

    /// Output schemas in declaration order.
    pub fn output_schemas(&self) -> Result<Vec<(OutputTag, Schema)>> {
        self.outputs
            .iter()
            .map(|output| {
                let tag = OutputTag::new(output.tag.clone())?;
                let schema = Schema::new(output.tag.clone(), output.fields.clone());
                Ok((tag, schema))
            })
            .collect()
    }

    /// Compiles one mapping plan per output tag. Lookup files resolve
    /// relative to `base_dir` (normally the definition file's directory).
    pub fn build_plans(&self, base_dir: &Path) -> Result<Vec<(OutputTag, MappingPlan)>> {
        let mut plans = Vec::new();
        for output in &self.outputs {
            let tag = OutputTag::new(output.tag.clone())?;
            let rule_defs = self
                .rules
                .get(&output.tag)
                .with_context(|| format!("output {:?} has no rules", output.tag))?;
            let mut specs = Vec::with_capacity(rule_defs.len());
            for rule in rule_defs {
                specs.push(build_rule(rule, base_dir)?);
            }
            let plan = compile_rules(specs)
                .with_context(|| format!("compile rules for output {:?}", output.tag))?;
            plans.push((tag, plan));
        }
        Ok(plans)
    }

    /// Builds the router: the declared value-dispatch table, or a
    /// constant route to the sole output.
    pub fn build_router(&self) -> Result<FnRouter> {
        match &self.route {
            Some(route) => {
                let field = route.field.clone();
                let mut table = BTreeMap::new();
                for (value, tag) in &route.table {
                    table.insert(value.clone(), OutputTag::new(tag.clone())?);
                }
                let default = route
                    .default
                    .as_ref()
                    .map(|tag| OutputTag::new(tag.clone()))
                    .transpose()?;
                Ok(FnRouter::new(move |record| {
                    let value = record.get(&field).map(String::as_str).unwrap_or("");
                    match table.get(value).or(default.as_ref()) {
                        Some(tag) => RouteDecision::To(tag.clone()),
                        None => RouteDecision::NoOutput,
                    }
                }))
            }
            None => {
                let tag = OutputTag::new(self.outputs[0].tag.clone())?;
                Ok(FnRouter::constant(tag))
            }
        }
    }
}

fn build_rule(rule: &RuleDef, base_dir: &Path) -> Result<RuleSpec> {
    let spec = match rule {
        RuleDef::Identity { field } => RuleSpec::identity(field.clone()),
        RuleDef::Rename { field, target } => RuleSpec::rename(field.clone(), target.clone()),
        RuleDef::Translate {
            field,
            table,
            target,
        } => {
            let mapper = TranslateMapper::new(table.clone());
            match target {
                Some(target) => RuleSpec::single(field.clone(), mapper, target.clone()),
                None => RuleSpec::mapped(field.clone(), mapper),
            }
        }
        RuleDef::Lookup { field, file } => {
            let path = if file.is_absolute() {
                file.clone()
            } else {
                base_dir.join(file)
            };
            let mapper = LookupMapper::from_json_file(&path)
                .with_context(|| format!("load lookup table {}", path.display()))?;
            RuleSpec::mapped(field.clone(), mapper)
        }
        RuleDef::Constant { target, value } => RuleSpec::full(
            [cdm_model::ROW_ID_FIELD],
            ConstantMapper::single(target.clone(), value.clone()),
            KeyTranslator::identity(),
        ),
        RuleDef::Concat {
            fields,
            delimiter,
            target,
        } => RuleSpec::full(
            fields.clone(),
            ConcatMapper::new(fields.clone(), delimiter.clone(), target.clone()),
            KeyTranslator::identity(),
        ),
        RuleDef::Filter { fields, target } => {
            let mapper = FilterFirstMapper::new(fields.clone());
            match target {
                Some(target) => {
                    RuleSpec::full(fields.clone(), mapper, TargetSpec::Rename(target.clone()))
                }
                None => RuleSpec::full(fields.clone(), mapper, KeyTranslator::identity()),
            }
        }
        RuleDef::Replace {
            field,
            table,
            target,
        } => RuleSpec::full(
            [field.clone()],
            ReplacementMapper::new(table.clone()),
            target_or_field(target, field),
        ),
        RuleDef::Float { field, target } => RuleSpec::full(
            [field.clone()],
            FloatMapper,
            target_or_field(target, field),
        ),
        RuleDef::Truncate {
            field,
            max_len,
            target,
        } => RuleSpec::full(
            [field.clone()],
            TruncateMapper::new(*max_len),
            target_or_field(target, field),
        ),
    };
    Ok(spec)
}

fn target_or_field(target: &Option<String>, field: &str) -> TargetSpec {
    TargetSpec::Rename(target.clone().unwrap_or_else(|| field.to_string()))
}
