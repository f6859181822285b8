//! Routing: deciding which output schema (if any) a record maps to.

use cdm_model::{EXCLUDE_FIELD, OutputTag, Record, is_flag_set};

/// The outcome of routing one input record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Map into one output schema.
    To(OutputTag),
    /// Fan out into several output schemas.
    Fanout(Vec<OutputTag>),
    /// Deliberate exclusion: consumed, counted, nothing written.
    NoOutput,
}

/// Decides the output schema per record, with optional record
/// transformation hooks around the mapping.
///
/// `route` must be pure with respect to the record; consulting lookup
/// structures built earlier in the run is fine.
pub trait Router {
    fn route(&self, record: &Record) -> RouteDecision;

    /// Runs before routing (date cleanup and similar).
    fn pre_map(&self, record: Record) -> Record {
        record
    }

    /// Runs after the mapping plan, uniformly for every output schema
    /// (post-hoc field clipping and similar).
    fn post_map(&self, record: Record) -> Record {
        record
    }
}

/// Closure-backed router with optional pre/post hooks.
pub struct FnRouter {
    route_fn: Box<dyn Fn(&Record) -> RouteDecision + Send + Sync>,
    pre_fn: Option<Box<dyn Fn(Record) -> Record + Send + Sync>>,
    post_fn: Option<Box<dyn Fn(Record) -> Record + Send + Sync>>,
}

impl FnRouter {
    pub fn new<F>(route_fn: F) -> Self
    where
        F: Fn(&Record) -> RouteDecision + Send + Sync + 'static,
    {
        Self {
            route_fn: Box::new(route_fn),
            pre_fn: None,
            post_fn: None,
        }
    }

    /// Routes every record to a single fixed output.
    pub fn constant(tag: OutputTag) -> Self {
        Self::new(move |_| RouteDecision::To(tag.clone()))
    }

    #[must_use]
    pub fn with_pre_map<F>(mut self, pre_fn: F) -> Self
    where
        F: Fn(Record) -> Record + Send + Sync + 'static,
    {
        self.pre_fn = Some(Box::new(pre_fn));
        self
    }

    #[must_use]
    pub fn with_post_map<F>(mut self, post_fn: F) -> Self
    where
        F: Fn(Record) -> Record + Send + Sync + 'static,
    {
        self.post_fn = Some(Box::new(post_fn));
        self
    }
}

impl Router for FnRouter {
    fn route(&self, record: &Record) -> RouteDecision {
        (self.route_fn)(record)
    }

    fn pre_map(&self, record: Record) -> Record {
        match &self.pre_fn {
            Some(f) => f(record),
            None => record,
        }
    }

    fn post_map(&self, record: Record) -> Record {
        match &self.post_fn {
            Some(f) => f(record),
            None => record,
        }
    }
}

/// Wraps a router with the `i_exclude` convention: a record whose
/// exclusion flag is set answers `NoOutput` before the inner router is
/// consulted.
pub struct ExcludeRouter<R> {
    inner: R,
}

impl<R: Router> ExcludeRouter<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Router> Router for ExcludeRouter<R> {
    fn route(&self, record: &Record) -> RouteDecision {
        if record
            .get(EXCLUDE_FIELD)
            .is_some_and(|value| is_flag_set(value))
        {
            return RouteDecision::NoOutput;
        }
        self.inner.route(record)
    }

    fn pre_map(&self, record: Record) -> Record {
        self.inner.pre_map(record)
    }

    fn post_map(&self, record: Record) -> Record {
        self.inner.post_map(record)
    }
}
