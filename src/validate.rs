//! Shrink validation.
//!
//! A shrinker proposes smaller sequences by deleting commands or simplifying
//! arguments. Because preconditions depend on state, a deletion can make a
//! later command illegal. The validator replays a candidate from the model's
//! initial state, symbolically, and rejects it at the first command that could
//! not have been generated there.

use std::collections::BTreeSet;

use crate::catalog::Catalog;
use crate::error::InvalidSequence;
use crate::symbolic::Command;
use crate::value::Value;

/// Replays `sequence` from `initial` and reports the first illegal command.
///
/// Checks, per command in order: the command is declared, every variable its
/// arguments reference is bound by an earlier command, its own variable is
/// fresh, and its precondition holds in the replayed state. The state then
/// advances with the command's own variable standing in for its result.
pub fn validate<S: Clone>(
    catalog: &Catalog<S>,
    initial: &S,
    sequence: &[Command],
) -> Result<(), InvalidSequence> {
    let mut state = initial.clone();
    let mut bound = BTreeSet::new();

    for (index, entry) in sequence.iter().enumerate() {
        let call = &entry.call;
        let Some(cmd) = catalog.command(&call.command) else {
            return Err(InvalidSequence::UnknownCommand {
                index,
                command: call.command.clone(),
            });
        };
        if let Some(var) = call.vars().into_iter().find(|v| !bound.contains(v)) {
            return Err(InvalidSequence::UnboundVariable { index, var });
        }
        if !bound.insert(entry.var) {
            return Err(InvalidSequence::DuplicateVariable {
                index,
                var: entry.var,
            });
        }
        if !cmd.pre(&state, &call.args) {
            return Err(InvalidSequence::PreconditionFailed {
                index,
                command: call.command.clone(),
            });
        }
        state = cmd.next(&state, &call.args, &Value::Var(entry.var));
    }

    Ok(())
}

/// Returns true if `sequence` is a legal replay from `initial`.
///
/// Pass a freshly built `catalog.initial_state()` rather than a state saved
/// at generation time, so a non-reproducible initial state is caught here.
#[must_use]
pub fn is_valid<S: Clone>(catalog: &Catalog<S>, initial: &S, sequence: &[Command]) -> bool {
    validate(catalog, initial, sequence).is_ok()
}
