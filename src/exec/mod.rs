//! Sequence execution against a live system under test.
//!
//! Execution is a left-to-right fold. Each step substitutes earlier results
//! into the call, re-checks the precondition against the real model state,
//! invokes the SUT with panics captured, checks the postcondition, and only
//! then advances the model with the real result. The first non-Ok outcome
//! freezes the run.

mod outcome;
mod result;

pub use outcome::{Failure, Outcome};
pub use result::{HistoryEvent, RunResult};

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::debug;

use crate::catalog::Catalog;
use crate::symbolic::Command;
use crate::value::Value;

/// The system under test.
///
/// A single synchronous entry point. Returning `Err` or panicking are both
/// recorded as [`Outcome::RuntimeFailure`]; neither escapes the executor.
pub trait Sut {
    /// Invoke `command` with concrete arguments.
    fn invoke(&mut self, command: &str, args: &[Value]) -> Result<Value, Failure>;
}

impl<F> Sut for F
where
    F: FnMut(&str, &[Value]) -> Result<Value, Failure>,
{
    fn invoke(&mut self, command: &str, args: &[Value]) -> Result<Value, Failure> {
        self(command, args)
    }
}

/// Execute `sequence` against `sut`, starting from model state `initial`.
pub fn run<S, U>(catalog: &Catalog<S>, sut: &mut U, initial: S, sequence: &[Command]) -> RunResult<S>
where
    S: Clone,
    U: Sut + ?Sized,
{
    sequence
        .iter()
        .fold(RunResult::new(initial), |acc, entry| step(catalog, sut, acc, entry))
}

/// Execute `sequence` from a freshly built initial state.
pub fn replay<S, U>(catalog: &Catalog<S>, sut: &mut U, sequence: &[Command]) -> RunResult<S>
where
    S: Clone,
    U: Sut + ?Sized,
{
    run(catalog, sut, catalog.initial_state(), sequence)
}

fn step<S, U>(catalog: &Catalog<S>, sut: &mut U, acc: RunResult<S>, entry: &Command) -> RunResult<S>
where
    S: Clone,
    U: Sut + ?Sized,
{
    if !acc.is_ok() {
        return acc;
    }

    let call = acc.env.resolve_call(&entry.call);
    let Some(cmd) = catalog.command(&call.command) else {
        let failure = Failure::UnknownCommand {
            name: call.command.clone(),
        };
        return stopped(acc.record_failure(entry.var, call, Outcome::RuntimeFailure(failure)));
    };

    if !cmd.pre(&acc.state, &call.args) {
        let outcome = Outcome::PreconditionViolation(acc.state.clone());
        return stopped(acc.record_failure(entry.var, call, outcome));
    }

    let invoked = catch_unwind(AssertUnwindSafe(|| sut.invoke(&call.command, &call.args)));
    match invoked {
        Ok(Ok(value)) => {
            if cmd.post(&acc.state, &call.args, &value) {
                let next = cmd.next(&acc.state, &call.args, &value);
                acc.record_ok(entry.var, call, value, next)
            } else {
                stopped(acc.record_failure(entry.var, call, Outcome::PostconditionViolation(value)))
            }
        }
        Ok(Err(failure)) => stopped(acc.record_failure(entry.var, call, Outcome::RuntimeFailure(failure))),
        Err(payload) => {
            let failure = Failure::from_panic(payload.as_ref());
            stopped(acc.record_failure(entry.var, call, Outcome::RuntimeFailure(failure)))
        }
    }
}

fn stopped<S: Clone>(run: RunResult<S>) -> RunResult<S> {
    if let Some(event) = run.last_event() {
        debug!(
            position = run.call_count(),
            var = %event.var,
            command = %event.call.command,
            outcome = run.result.kind(),
            "run stopped"
        );
    }
    run
}
