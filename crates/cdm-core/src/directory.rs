//! Dispatch registries for plans and sinks.
//!
//! Built once before a run and read-only during it. Registration is
//! idempotent-overwrite: registering the same key twice replaces the
//! prior entry without error. Lookup of an unregistered key during
//! dispatch is a fatal configuration error, handled by the runner.

use std::collections::BTreeMap;

use cdm_ingest::RecordSink;
use cdm_map::MappingPlan;
use cdm_model::OutputTag;

/// Maps `(input schema name, output tag)` to a compiled mapping plan.
#[derive(Default)]
pub struct MappingDirectory {
    plans: BTreeMap<(String, OutputTag), MappingPlan>,
}

impl MappingDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, input: impl Into<String>, tag: OutputTag, plan: MappingPlan) {
        self.plans.insert((input.into(), tag), plan);
    }

    pub fn get(&self, input: &str, tag: &OutputTag) -> Option<&MappingPlan> {
        self.plans.get(&(input.to_string(), tag.clone()))
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

/// Maps an output tag to its sink realization.
#[derive(Default)]
pub struct OutputDirectory {
    sinks: BTreeMap<OutputTag, Box<dyn RecordSink>>,
}

impl OutputDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tag: OutputTag, sink: Box<dyn RecordSink>) {
        self.sinks.insert(tag, sink);
    }

    pub fn get_mut(&mut self, tag: &OutputTag) -> Option<&mut Box<dyn RecordSink>> {
        self.sinks.get_mut(tag)
    }

    pub fn contains(&self, tag: &OutputTag) -> bool {
        self.sinks.contains_key(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &OutputTag> {
        self.sinks.keys()
    }

    /// Closes every registered sink. Returns the first failure with its
    /// tag; remaining sinks are still closed.
    pub fn close_all(&mut self) -> Option<(OutputTag, anyhow::Error)> {
        let mut first_failure = None;
        for (tag, sink) in &mut self.sinks {
            if let Err(error) = sink.close()
                && first_failure.is_none()
            {
                first_failure = Some((tag.clone(), error));
            }
        }
        first_failure
    }
}
