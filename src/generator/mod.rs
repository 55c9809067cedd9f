//! State-biased command sequence generation.
//!
//! A sequence is drawn left to right. At each position the generator asks the
//! catalog which commands are eligible in the current model state, picks one
//! by weight, draws its arguments, and redraws until the precondition holds.
//! The model then advances hypothetically: `next` receives the entry's own
//! symbolic variable in place of the (not yet known) result.

mod config;
mod strategy;

pub use config::GenConfig;
pub use strategy::{sequences, SequenceStrategy, SequenceTree};

use proptest::strategy::{Strategy, ValueTree};
use proptest::test_runner::TestRunner;
use tracing::debug;

use crate::catalog::{Catalog, Command as CatalogCommand};
use crate::error::GenerationError;
use crate::symbolic::{Call, Command, SymVar};
use crate::value::Value;

pub(crate) type ArgTree = Box<dyn ValueTree<Value = Value>>;

/// One argument position of a drawn command.
pub(crate) enum ArgSlot {
    /// Still shrinkable.
    Tree(ArgTree),
    /// Pinned to the last value the validator accepted.
    Fixed(Value),
}

impl ArgSlot {
    pub(crate) fn current(&self) -> Value {
        match self {
            Self::Tree(tree) => tree.current(),
            Self::Fixed(value) => value.clone(),
        }
    }
}

/// A drawn command before variable numbering is applied.
pub(crate) struct Slot {
    pub(crate) command: String,
    pub(crate) args: Vec<ArgSlot>,
}

/// Generate a sequence of exactly `size` commands.
///
/// Every entry's precondition holds in the state reached by replaying the
/// entries before it.
pub fn generate<S: Clone>(
    catalog: &Catalog<S>,
    config: &GenConfig,
    runner: &mut TestRunner,
    size: usize,
) -> Result<Vec<Command>, GenerationError> {
    let slots = draw_slots(catalog, config, runner, size)?;
    Ok(slots
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            let args = slot.args.iter().map(ArgSlot::current).collect();
            Command::new(SymVar::at_position(i), Call::new(slot.command.clone(), args))
        })
        .collect())
}

pub(crate) fn draw_slots<S: Clone>(
    catalog: &Catalog<S>,
    config: &GenConfig,
    runner: &mut TestRunner,
    size: usize,
) -> Result<Vec<Slot>, GenerationError> {
    let mut state = catalog.initial_state();
    let mut slots = Vec::with_capacity(size);
    for position in 0..size {
        let (slot, next) = draw_one(catalog, config, runner, &state, position)?;
        slots.push(slot);
        state = next;
    }
    Ok(slots)
}

fn draw_one<S: Clone>(
    catalog: &Catalog<S>,
    config: &GenConfig,
    runner: &mut TestRunner,
    state: &S,
    position: usize,
) -> Result<(Slot, S), GenerationError> {
    let eligible = catalog.eligible(state)?;
    let total: u64 = eligible.iter().map(|(_, w)| u64::from(*w)).sum();
    if total == 0 {
        return Err(GenerationError::NoEligibleCommands { position });
    }

    let var = SymVar::at_position(position);
    for _ in 0..config.max_precondition_retries {
        let cmd = pick_weighted(&eligible, draw_below(runner, total));
        let trees = cmd
            .args(state)
            .iter()
            .map(|arg| {
                arg.new_tree(runner).map_err(|reason| GenerationError::Strategy {
                    command: cmd.name().to_string(),
                    reason: reason.message().to_string(),
                })
            })
            .collect::<Result<Vec<ArgTree>, _>>()?;
        let args: Vec<Value> = trees.iter().map(|t| t.current()).collect();

        if cmd.pre(state, &args) {
            let next = cmd.next(state, &args, &Value::Var(var));
            let slot = Slot {
                command: cmd.name().to_string(),
                args: trees.into_iter().map(ArgSlot::Tree).collect(),
            };
            return Ok((slot, next));
        }
    }

    debug!(
        position,
        attempts = config.max_precondition_retries,
        "generation: precondition retry budget exhausted"
    );
    Err(GenerationError::PreconditionRetriesExhausted {
        position,
        attempts: config.max_precondition_retries,
    })
}

/// Uniform draw from `0..bound`, taken through proptest's range strategy.
///
/// `bound` must be non-zero.
pub(crate) fn draw_below(runner: &mut TestRunner, bound: u64) -> u64 {
    (0..bound).new_tree(runner).map_or(0, |tree| tree.current())
}

fn pick_weighted<'a, S: Clone>(
    eligible: &[(&'a dyn CatalogCommand<S>, u32)],
    mut ticket: u64,
) -> &'a dyn CatalogCommand<S> {
    for (cmd, weight) in eligible {
        let weight = u64::from(*weight);
        if ticket < weight {
            return *cmd;
        }
        ticket -= weight;
    }
    // ticket < total, so the loop always returns; keep the last entry as a floor.
    eligible[eligible.len() - 1].0
}
