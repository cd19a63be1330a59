use std::collections::HashMap;
use std::sync::Arc;

use itertools::Itertools;
use serde_json::Value;
use tracing::debug;

use crate::context::EvalContext;
use crate::directive::Directive;
use crate::errors::{DirectiveError, Result};
use crate::report::ErrorKind;

/// Outcome of evaluating one directive predicate against one actual value.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Pass { message: String },
    Fail { kind: ErrorKind, message: String },
}

impl MatchOutcome {
    pub fn pass(message: impl Into<String>) -> Self {
        MatchOutcome::Pass {
            message: message.into(),
        }
    }

    pub fn fail(kind: ErrorKind, message: impl Into<String>) -> Self {
        MatchOutcome::Fail {
            kind,
            message: message.into(),
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self, MatchOutcome::Pass { .. })
    }
}

/// Reusable match predicate over one concrete actual value.
pub type Predicate = Box<dyn Fn(&Value) -> MatchOutcome + Send + Sync>;

/// A named, stateless directive implementation: compiles parsed arguments
/// plus ambient context into a predicate. Construction must fail fast on
/// malformed arguments so the error lands at the directive's path.
pub trait DirectiveHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn build(&self, directive: &Directive, ctx: &EvalContext) -> Result<Predicate>;
}

impl std::fmt::Debug for dyn DirectiveHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectiveHandler")
            .field("name", &self.name())
            .finish()
    }
}

/// Pluggable binary matcher over an (expected, actual) pair. A registry
/// category reserved for extensions; the core walk does not consult it.
pub trait Matcher: Send + Sync {
    fn name(&self) -> &'static str;
    fn matches(&self, expected: &Value, actual: &Value) -> bool;
}

/// Pluggable value transform, addressed by the `|name:param` pipeline
/// suffix of the directive grammar.
pub trait Transform: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, value: &Value, params: &[String]) -> Result<Value>;
}

/// One name-keyed category with insertion-stable name listing.
struct NamedStore<T: ?Sized> {
    category: &'static str,
    map: HashMap<String, Arc<T>>,
    order: Vec<String>,
}

impl<T: ?Sized> NamedStore<T> {
    fn new(category: &'static str) -> Self {
        Self {
            category,
            map: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn insert(&mut self, name: &str, value: Arc<T>) -> Result<()> {
        if self.map.contains_key(name) {
            return Err(DirectiveError::Duplicate {
                category: self.category,
                name: name.to_string(),
            });
        }
        self.map.insert(name.to_string(), value);
        self.order.push(name.to_string());
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Arc<T>> {
        self.map
            .get(name)
            .cloned()
            .ok_or_else(|| DirectiveError::Unknown {
                category: self.category,
                name: name.to_string(),
                known: self.order.iter().join(", "),
            })
    }

    fn has(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }
}

/// Name-keyed store of directives, matchers, and value transforms.
/// Populated up front, then shared read-only across comparisons.
pub struct Registry {
    directives: NamedStore<dyn DirectiveHandler>,
    matchers: NamedStore<dyn Matcher>,
    transforms: NamedStore<dyn Transform>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            directives: NamedStore::new("directive"),
            matchers: NamedStore::new("matcher"),
            transforms: NamedStore::new("transform"),
        }
    }

    /// Registry pre-populated with the built-in directive set and the
    /// reference transforms.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::directives::install(&mut registry)
            .expect("built-in names are unique");
        registry
    }

    pub fn register_directive<D: DirectiveHandler + 'static>(&mut self, handler: D) -> Result<()> {
        debug!(name = handler.name(), "registering directive");
        self.directives.insert(handler.name(), Arc::new(handler))
    }

    pub fn get_directive(&self, name: &str) -> Result<Arc<dyn DirectiveHandler>> {
        self.directives.get(name)
    }

    pub fn has_directive(&self, name: &str) -> bool {
        self.directives.has(name)
    }

    pub fn directive_names(&self) -> Vec<&str> {
        self.directives.names()
    }

    pub fn register_matcher<M: Matcher + 'static>(&mut self, matcher: M) -> Result<()> {
        debug!(name = matcher.name(), "registering matcher");
        self.matchers.insert(matcher.name(), Arc::new(matcher))
    }

    pub fn get_matcher(&self, name: &str) -> Result<Arc<dyn Matcher>> {
        self.matchers.get(name)
    }

    pub fn has_matcher(&self, name: &str) -> bool {
        self.matchers.has(name)
    }

    pub fn matcher_names(&self) -> Vec<&str> {
        self.matchers.names()
    }

    pub fn register_transform<T: Transform + 'static>(&mut self, transform: T) -> Result<()> {
        debug!(name = transform.name(), "registering transform");
        self.transforms.insert(transform.name(), Arc::new(transform))
    }

    pub fn get_transform(&self, name: &str) -> Result<Arc<dyn Transform>> {
        self.transforms.get(name)
    }

    pub fn has_transform(&self, name: &str) -> bool {
        self.transforms.has(name)
    }

    pub fn transform_names(&self) -> Vec<&str> {
        self.transforms.names()
    }

    /// Empty all three categories. Supports test isolation.
    pub fn clear(&mut self) {
        self.directives.clear();
        self.matchers.clear();
        self.transforms.clear();
    }
}
