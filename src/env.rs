//! Execution environment and symbolic substitution.
//!
//! The environment is only populated while executing a sequence; generation
//! never binds anything because its results are hypothetical placeholders.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::symbolic::{Call, SymVar};
use crate::value::Value;

/// Mapping from symbolic variable to the concrete value observed for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    bindings: BTreeMap<SymVar, Value>,
}

impl Environment {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new environment with `var` bound to `value`.
    #[must_use]
    pub fn bind(mut self, var: SymVar, value: Value) -> Self {
        self.bindings.insert(var, value);
        self
    }

    /// Looks up a variable.
    #[must_use]
    pub fn get(&self, var: SymVar) -> Option<&Value> {
        self.bindings.get(&var)
    }

    /// Returns true if `var` is bound.
    #[must_use]
    pub fn contains(&self, var: SymVar) -> bool {
        self.bindings.contains_key(&var)
    }

    /// Number of bound variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterates bindings in variable order.
    pub fn iter(&self) -> impl Iterator<Item = (SymVar, &Value)> {
        self.bindings.iter().map(|(k, v)| (*k, v))
    }

    /// Replaces every symbolic variable inside `value` with its binding.
    ///
    /// An unbound variable means it was referenced before being produced.
    /// It is logged and left in place so the partial history stays usable.
    #[must_use]
    pub fn resolve(&self, value: &Value) -> Value {
        match value {
            Value::Var(var) => match self.bindings.get(var) {
                Some(bound) => bound.clone(),
                None => {
                    warn!(%var, bound = self.bindings.len(), "unbound symbolic variable left unresolved");
                    value.clone()
                }
            },
            Value::List(items) => Value::List(items.iter().map(|item| self.resolve(item)).collect()),
            other => other.clone(),
        }
    }

    /// Substitutes within a call's arguments.
    #[must_use]
    pub fn resolve_call(&self, call: &Call) -> Call {
        Call {
            command: call.command.clone(),
            args: call.args.iter().map(|arg| self.resolve(arg)).collect(),
        }
    }
}
