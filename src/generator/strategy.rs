//! Proptest integration: a sequence strategy with validity-checked shrinking.
//!
//! Shrinking works in two phases. First whole commands are dropped (the later
//! half, the earlier half, then single commands from the back); surviving
//! commands are renumbered so variables stay `1..=N`, and a candidate that
//! still references a dropped command's variable is discarded. Then each
//! argument value is simplified through its own shrink tree. Every candidate
//! is replayed through the shrink validator before it is offered, so a shrunk
//! sequence never violates a precondition.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use proptest::strategy::{NewTree, Strategy, ValueTree};
use proptest::test_runner::{Reason, TestRunner};
use tracing::debug;

use super::{draw_below, draw_slots, ArgSlot, GenConfig, Slot};
use crate::catalog::Catalog;
use crate::error::ConfigError;
use crate::symbolic::{remap_vars, Call, Command, SymVar};
use crate::validate::is_valid;

/// Strategy producing precondition-respecting command sequences.
pub struct SequenceStrategy<S: Clone> {
    catalog: Arc<Catalog<S>>,
    config: GenConfig,
}

impl<S: Clone> fmt::Debug for SequenceStrategy<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceStrategy")
            .field("catalog", &self.catalog)
            .field("config", &self.config)
            .finish()
    }
}

/// Create a sequence strategy over `catalog`.
pub fn sequences<S: Clone>(
    catalog: Arc<Catalog<S>>,
    config: GenConfig,
) -> Result<SequenceStrategy<S>, ConfigError> {
    config.validate()?;
    Ok(SequenceStrategy { catalog, config })
}

impl<S: Clone> SequenceStrategy<S> {
    /// The catalog sequences are drawn from.
    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog<S>> {
        &self.catalog
    }
}

impl<S: Clone> Strategy for SequenceStrategy<S> {
    type Tree = SequenceTree<S>;
    type Value = Vec<Command>;

    fn new_tree(&self, runner: &mut TestRunner) -> NewTree<Self> {
        let bound = self.config.max_size as u64 + 1;
        let size = usize::try_from(draw_below(runner, bound)).unwrap_or(self.config.max_size);
        let slots = draw_slots(&self.catalog, &self.config, runner, size)
            .map_err(|e| Reason::from(e.to_string()))?;
        Ok(SequenceTree::new(Arc::clone(&self.catalog), slots))
    }
}

enum Phase {
    Drop { candidates: Vec<Vec<bool>>, next: usize },
    Args { slot: usize, arg: usize },
    Done,
}

impl Phase {
    fn drops(included: &[bool]) -> Self {
        let live: Vec<usize> = (0..included.len()).filter(|&i| included[i]).collect();
        let without = |dropped: &[usize]| {
            let mut mask = included.to_vec();
            for &i in dropped {
                mask[i] = false;
            }
            mask
        };

        let mut candidates = Vec::new();
        if live.len() > 1 {
            let half = live.len() / 2;
            candidates.push(without(&live[half..]));
            candidates.push(without(&live[..half]));
        }
        for &i in live.iter().rev() {
            candidates.push(without(&[i]));
        }
        Self::Drop { candidates, next: 0 }
    }
}

enum LastShrink {
    None,
    Drop { previous: Vec<bool> },
    Arg { slot: usize, arg: usize, fallback: crate::value::Value },
}

/// Shrink tree for one generated sequence.
pub struct SequenceTree<S: Clone> {
    catalog: Arc<Catalog<S>>,
    slots: Vec<Slot>,
    included: Vec<bool>,
    phase: Phase,
    last: LastShrink,
}

impl<S: Clone> fmt::Debug for SequenceTree<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceTree")
            .field("drawn", &self.slots.len())
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}

impl<S: Clone> SequenceTree<S> {
    fn new(catalog: Arc<Catalog<S>>, slots: Vec<Slot>) -> Self {
        let included = vec![true; slots.len()];
        let phase = Phase::drops(&included);
        Self {
            catalog,
            slots,
            included,
            phase,
            last: LastShrink::None,
        }
    }

    /// Builds the sequence selected by `mask`, renumbering variables.
    ///
    /// Returns `None` if a kept command references a dropped command's result.
    fn assemble(&self, mask: &[bool]) -> Option<Vec<Command>> {
        let mut mapping = BTreeMap::new();
        let mut out = Vec::new();
        for (i, slot) in self.slots.iter().enumerate().filter(|(i, _)| mask[*i]) {
            let args = slot
                .args
                .iter()
                .map(|arg| remap_vars(&arg.current(), &mapping))
                .collect::<Result<Vec<_>, _>>()
                .ok()?;
            let var = SymVar::at_position(out.len());
            mapping.insert(SymVar::at_position(i), var);
            out.push(Command::new(var, Call::new(slot.command.clone(), args)));
        }
        Some(out)
    }

    fn acceptable(&self, mask: &[bool]) -> bool {
        self.assemble(mask)
            .is_some_and(|seq| is_valid(&self.catalog, &self.catalog.initial_state(), &seq))
    }

    fn current_acceptable(&self) -> bool {
        self.acceptable(&self.included)
    }

    fn next_drop_candidate(&mut self) -> Option<Vec<bool>> {
        let Phase::Drop { candidates, next } = &mut self.phase else {
            return None;
        };
        let candidate = candidates.get(*next).cloned();
        *next += 1;
        candidate
    }

    fn arg_mut(&mut self, slot: usize, arg: usize) -> &mut ArgSlot {
        &mut self.slots[slot].args[arg]
    }

    /// Simplifies one argument, walking back toward the previous value if
    /// the result is rejected. Returns the previous value on success.
    fn simplify_arg(&mut self, slot: usize, arg: usize) -> Option<crate::value::Value> {
        let before = match self.arg_mut(slot, arg) {
            ArgSlot::Tree(tree) => {
                let before = tree.current();
                if !tree.simplify() {
                    return None;
                }
                before
            }
            ArgSlot::Fixed(_) => return None,
        };

        loop {
            if self.current_acceptable() {
                return Some(before);
            }
            let moved = match self.arg_mut(slot, arg) {
                ArgSlot::Tree(tree) => tree.complicate(),
                ArgSlot::Fixed(_) => false,
            };
            if !moved {
                *self.arg_mut(slot, arg) = ArgSlot::Fixed(before);
                return None;
            }
        }
    }
}

impl<S: Clone> ValueTree for SequenceTree<S> {
    type Value = Vec<Command>;

    fn current(&self) -> Vec<Command> {
        self.assemble(&self.included).unwrap_or_default()
    }

    fn simplify(&mut self) -> bool {
        if matches!(self.last, LastShrink::Drop { .. } | LastShrink::Arg { .. }) {
            // The previous step was kept. A smaller argument can free a
            // command for dropping, so look for drops again from here.
            self.phase = Phase::drops(&self.included);
        }
        self.last = LastShrink::None;

        loop {
            match &self.phase {
                Phase::Drop { .. } => match self.next_drop_candidate() {
                    Some(candidate) => {
                        if self.acceptable(&candidate) {
                            let previous = std::mem::replace(&mut self.included, candidate);
                            self.last = LastShrink::Drop { previous };
                            debug!(
                                kept = self.included.iter().filter(|k| **k).count(),
                                "shrink: dropped commands"
                            );
                            return true;
                        }
                    }
                    None => self.phase = Phase::Args { slot: 0, arg: 0 },
                },
                Phase::Args { slot, arg } => {
                    let (slot, arg) = (*slot, *arg);
                    if slot >= self.slots.len() {
                        self.phase = Phase::Done;
                    } else if !self.included[slot] || arg >= self.slots[slot].args.len() {
                        self.phase = Phase::Args { slot: slot + 1, arg: 0 };
                    } else if let Some(fallback) = self.simplify_arg(slot, arg) {
                        self.last = LastShrink::Arg { slot, arg, fallback };
                        return true;
                    } else {
                        self.phase = Phase::Args { slot, arg: arg + 1 };
                    }
                }
                Phase::Done => return false,
            }
        }
    }

    fn complicate(&mut self) -> bool {
        match std::mem::replace(&mut self.last, LastShrink::None) {
            LastShrink::None => false,
            LastShrink::Drop { previous } => {
                self.included = previous;
                true
            }
            LastShrink::Arg { slot, arg, fallback } => loop {
                let moved = match self.arg_mut(slot, arg) {
                    ArgSlot::Tree(tree) => tree.complicate(),
                    ArgSlot::Fixed(_) => false,
                };
                if !moved {
                    *self.arg_mut(slot, arg) = ArgSlot::Fixed(fallback);
                    return true;
                }
                if self.current_acceptable() {
                    self.last = LastShrink::Arg { slot, arg, fallback };
                    return true;
                }
            },
        }
    }
}
