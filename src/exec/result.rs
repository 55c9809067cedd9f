//! Run results and history.

use serde::{Deserialize, Serialize};

use super::outcome::Outcome;
use crate::env::Environment;
use crate::symbolic::{Call, SymVar};
use crate::value::Value;

/// One executed command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEvent<S> {
    /// Model state after this call (unchanged if the call failed).
    pub state: S,
    /// The call as actually made, with variables substituted.
    pub call: Call,
    /// Variable the call's result was bound to.
    pub var: SymVar,
    /// Value bound to `var`: the SUT's result, or the failure placeholder.
    pub result: Value,
    /// Outcome of this call.
    pub outcome: Outcome<S>,
}

/// Accumulated record of a run.
///
/// `history` is kept in execution order. A run result is replaced, never
/// mutated in place, once per executed command, and stops changing after the
/// first non-Ok outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult<S> {
    /// Executed commands, oldest first.
    pub history: Vec<HistoryEvent<S>>,
    /// Current (or final) model state.
    pub state: S,
    /// Terminal outcome.
    pub result: Outcome<S>,
    /// Results observed so far.
    pub env: Environment,
}

impl<S: Clone> RunResult<S> {
    /// A fresh run starting in `initial`.
    #[must_use]
    pub fn new(initial: S) -> Self {
        Self {
            history: Vec::new(),
            state: initial,
            result: Outcome::Ok,
            env: Environment::new(),
        }
    }

    /// Returns true if the SUT matched the model for every executed command.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// 1-based position of the command that broke the run.
    #[must_use]
    pub fn failed_at(&self) -> Option<usize> {
        if self.is_ok() {
            None
        } else {
            Some(self.history.len())
        }
    }

    /// The most recent history event.
    #[must_use]
    pub fn last_event(&self) -> Option<&HistoryEvent<S>> {
        self.history.last()
    }

    /// The event that broke the run, if any.
    #[must_use]
    pub fn failing_event(&self) -> Option<&HistoryEvent<S>> {
        if self.is_ok() {
            None
        } else {
            self.history.last()
        }
    }

    /// Number of commands executed (including a failing one).
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.history.len()
    }

    pub(crate) fn record_ok(mut self, var: SymVar, call: Call, value: Value, next: S) -> Self {
        self.history.push(HistoryEvent {
            state: next.clone(),
            call,
            var,
            result: value.clone(),
            outcome: Outcome::Ok,
        });
        self.env = self.env.bind(var, value);
        self.state = next;
        self
    }

    pub(crate) fn record_failure(mut self, var: SymVar, call: Call, outcome: Outcome<S>) -> Self {
        let placeholder = outcome.placeholder();
        self.history.push(HistoryEvent {
            state: self.state.clone(),
            call,
            var,
            result: placeholder.clone(),
            outcome: outcome.clone(),
        });
        self.env = self.env.bind(var, placeholder);
        self.result = outcome;
        self
    }
}
