//! Property runner.
//!
//! Draws many sequences from a catalog, executes each against a fresh SUT,
//! and on the first failure shrinks the sequence to a minimal counterexample
//! whose every step is still a legal replay of the model.

use std::fmt;
use std::sync::Arc;

use proptest::test_runner::{Config, RngAlgorithm, TestCaseError, TestError, TestRng, TestRunner};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::Catalog;
use crate::error::{CatalogError, ConfigError, StatemError, StatemResult};
use crate::exec::{replay, RunResult, Sut};
use crate::generator::{sequences, GenConfig};
use crate::symbolic::Command;

/// Settings for [`check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Number of sequences to try.
    pub cases: u32,
    /// Seed for the random source; equal seeds draw equal sequences.
    pub seed: u64,
    /// Upper bound on shrink steps after a failure.
    pub max_shrink_iters: u32,
    /// Sequence generation limits.
    pub generation: GenConfig,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            cases: 100,
            seed: 0,
            max_shrink_iters: 1024,
            generation: GenConfig::default(),
        }
    }
}

impl CheckConfig {
    /// Validate the config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cases == 0 {
            return Err(ConfigError::InvalidCheckConfig {
                reason: "cases must be > 0".to_string(),
            });
        }
        self.generation.validate()
    }

    fn runner_config(&self) -> Config {
        Config {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            failure_persistence: None,
            ..Config::default()
        }
    }
}

/// A minimal failing sequence and its run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counterexample<S> {
    /// The shrunk sequence.
    pub sequence: Vec<Command>,
    /// The run of `sequence` against a fresh SUT.
    pub run: RunResult<S>,
    /// Description of the failure.
    pub reason: String,
}

/// Summary of a [`check`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckReport<S> {
    /// Seed the run was drawn from.
    pub seed: u64,
    /// Configured number of cases.
    pub cases: u32,
    /// Present if any sequence failed.
    pub counterexample: Option<Counterexample<S>>,
}

impl<S> CheckReport<S> {
    /// Returns true if no sequence failed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.counterexample.is_none()
    }
}

/// Derives the runner's RNG from a `u64` seed.
#[must_use]
pub fn seeded_rng(seed: u64) -> TestRng {
    let hash = blake3::hash(&seed.to_le_bytes());
    TestRng::from_seed(RngAlgorithm::ChaCha, hash.as_bytes())
}

/// Check that the SUT built by `new_sut` agrees with the model in `catalog`.
///
/// Each case runs against a freshly built SUT. Model or configuration
/// problems are returned as errors; a disagreement between model and SUT is
/// reported through [`CheckReport::counterexample`].
pub fn check<S, U, F>(catalog: Arc<Catalog<S>>, config: &CheckConfig, new_sut: F) -> StatemResult<CheckReport<S>>
where
    S: Clone + PartialEq + fmt::Debug,
    U: Sut,
    F: Fn() -> U,
{
    config.validate()?;
    let initial = catalog.initial_state();
    if initial != catalog.initial_state() {
        return Err(CatalogError::NondeterministicInitialState.into());
    }
    catalog.eligible(&initial)?;

    let strategy = sequences(Arc::clone(&catalog), config.generation)?;
    let mut runner = TestRunner::new_with_rng(config.runner_config(), seeded_rng(config.seed));

    let result = runner.run(&strategy, |sequence| {
        let mut sut = new_sut();
        let run = replay(&catalog, &mut sut, &sequence);
        if run.is_ok() {
            Ok(())
        } else {
            Err(TestCaseError::fail(describe(&run)))
        }
    });

    let counterexample = match result {
        Ok(()) => None,
        Err(TestError::Fail(reason, sequence)) => {
            let mut sut = new_sut();
            let run = replay(&catalog, &mut sut, &sequence);
            info!(
                seed = config.seed,
                len = sequence.len(),
                outcome = run.result.kind(),
                "check: minimal counterexample found"
            );
            Some(Counterexample {
                sequence,
                run,
                reason: reason.message().to_string(),
            })
        }
        Err(TestError::Abort(reason)) => {
            return Err(StatemError::Aborted {
                reason: reason.message().to_string(),
            });
        }
    };

    Ok(CheckReport {
        seed: config.seed,
        cases: config.cases,
        counterexample,
    })
}

fn describe<S: Clone + fmt::Debug>(run: &RunResult<S>) -> String {
    match run.failing_event() {
        Some(event) => format!(
            "{} at command {} ({} = {}): {:?}",
            run.result.kind(),
            run.call_count(),
            event.var,
            event.call,
            run.result
        ),
        None => run.result.kind().to_string(),
    }
}
