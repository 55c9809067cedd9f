//! Symbolic command sequences.
//!
//! A sequence is an ordered list of [`Command`] entries. Entry `N` binds the
//! result of its call to symbolic variable `N`, so a well-formed sequence of
//! length `N` uses exactly the variables `1..=N` in ascending order.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Placeholder for the result of the call at the same (1-based) position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymVar(u32);

impl SymVar {
    /// Creates a variable with the given index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The variable bound by the first command of a sequence.
    #[must_use]
    pub const fn first() -> Self {
        Self(1)
    }

    /// The variable bound by the command at `position` (0-based).
    #[must_use]
    pub fn at_position(position: usize) -> Self {
        Self(u32::try_from(position).map_or(u32::MAX, |p| p.saturating_add(1)))
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Returns the variable following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for SymVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// A reference to a command together with its (possibly symbolic) arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    /// Name of the catalog command to invoke.
    pub command: String,
    /// Argument list. Arity is fixed once generated.
    pub args: Vec<Value>,
}

impl Call {
    /// Creates a call.
    pub fn new(command: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    /// Number of arguments.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// Every symbolic variable referenced by the arguments.
    #[must_use]
    pub fn vars(&self) -> Vec<SymVar> {
        self.args.iter().flat_map(Value::vars).collect()
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.command)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

/// One sequence entry: "bind the result of `call` to `var`".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Variable receiving the call's result.
    pub var: SymVar,
    /// The call to make.
    pub call: Call,
}

impl Command {
    /// Creates a sequence entry.
    #[must_use]
    pub const fn new(var: SymVar, call: Call) -> Self {
        Self { var, call }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.var, self.call)
    }
}

/// Builds a sequence from calls, numbering variables by position.
#[must_use]
pub fn sequence_of(calls: Vec<Call>) -> Vec<Command> {
    calls
        .into_iter()
        .enumerate()
        .map(|(i, call)| Command::new(SymVar::at_position(i), call))
        .collect()
}

/// Projects a sequence onto `(command, arity)` pairs.
#[must_use]
pub fn command_names(sequence: &[Command]) -> Vec<(String, usize)> {
    sequence
        .iter()
        .map(|cmd| (cmd.call.command.clone(), cmd.call.arity()))
        .collect()
}

/// Counts `(command, arity)` occurrences across many sequences.
#[must_use]
pub fn command_frequencies<'a, I>(sequences: I) -> BTreeMap<(String, usize), usize>
where
    I: IntoIterator<Item = &'a [Command]>,
{
    let mut counts = BTreeMap::new();
    for sequence in sequences {
        for key in command_names(sequence) {
            *counts.entry(key).or_insert(0) += 1;
        }
    }
    counts
}

/// Rewrites every variable inside `value` through `mapping`.
///
/// Returns the first variable that has no mapping.
pub(crate) fn remap_vars(value: &Value, mapping: &BTreeMap<SymVar, SymVar>) -> Result<Value, SymVar> {
    match value {
        Value::Var(v) => mapping.get(v).copied().map(Value::Var).ok_or(*v),
        Value::List(items) => items
            .iter()
            .map(|item| remap_vars(item, mapping))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        other => Ok(other.clone()),
    }
}
