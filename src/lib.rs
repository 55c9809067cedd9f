//! # statem - Model-based stateful property testing
//!
//! statem checks a stateful system against an abstract model. A model is a
//! catalog of commands, each with a precondition, a state transition, and a
//! postcondition. Random command sequences are generated against the model,
//! executed against the real system, and on failure shrunk to a minimal
//! counterexample that is still a legal replay of the model.
//!
//! ## Core Concepts
//!
//! - **Catalog**: The model: an initial state, the commands, optional weights
//! - **Symbolic variable**: `$N`, a placeholder for the result of command N
//! - **Sequence**: Ordered commands, each binding its result to a fresh variable
//! - **Run**: Execution of a sequence against the SUT, yielding a history and an outcome
//! - **Validator**: Replays a shrink candidate symbolically and rejects illegal ones
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use statem::{args, check, Catalog, CheckConfig, CommandBuilder, Failure, Value};
//!
//! let catalog = Catalog::builder(|| 0i64)
//!     .command(
//!         CommandBuilder::<i64>::new("incr")
//!             .next(|n, _, _| n + 1)
//!             .post(|n, _, r| r.as_int() == Some(n + 1))
//!             .build()?,
//!     )
//!     .build()?;
//!
//! let report = check(Arc::new(catalog), &CheckConfig::default(), || {
//!     let mut n = 0i64;
//!     move |_: &str, _: &[Value]| -> Result<Value, Failure> {
//!         n += 1;
//!         Ok(Value::Int(n))
//!     }
//! })?;
//! assert!(report.passed());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod env;
pub mod error;
pub mod symbolic;
pub mod value;

// Model, generation, execution
pub mod args;
pub mod catalog;
pub mod check;
pub mod exec;
pub mod generator;
pub mod serialization;
pub mod validate;

// Re-export primary types at crate root for convenience
pub use catalog::{Catalog, CatalogBuilder, CommandBuilder, FnCommand};
pub use env::Environment;
pub use error::{CatalogError, ConfigError, GenerationError, InvalidSequence, StatemError, StatemResult};
pub use symbolic::{command_frequencies, command_names, sequence_of, Call, Command, SymVar};
pub use value::Value;

pub use args::ArgGen;
pub use check::{check, CheckConfig, CheckReport, Counterexample};
pub use exec::{replay, run, Failure, HistoryEvent, Outcome, RunResult, Sut};
pub use generator::{generate, sequences, GenConfig, SequenceStrategy, SequenceTree};
pub use serialization::{from_json, run_result_to_json, to_json_pretty};
pub use validate::{is_valid, validate};
