//! Error types for statem.
//!
//! Configuration, catalog and generation problems are strongly typed using
//! thiserror. They describe a broken model or harness, never a failing SUT:
//! test failures are data (see [`crate::exec::Outcome`]).

use thiserror::Error;

use crate::symbolic::SymVar;

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid generation config: {reason}")]
    InvalidGenConfig {
        reason: String,
    },

    #[error("Invalid check config: {reason}")]
    InvalidCheckConfig {
        reason: String,
    },
}

/// Errors in the shape of a command catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Catalog must declare at least one command")]
    EmptyCatalog,

    #[error("Command name cannot be empty")]
    EmptyCommandName,

    #[error("Command '{name}' is declared more than once")]
    DuplicateCommand {
        name: String,
    },

    #[error("Weight function references undeclared command '{name}'")]
    UnknownCommand {
        name: String,
    },

    #[error("Command '{name}' has weight {weight}, weights must be > 0")]
    InvalidWeight {
        name: String,
        weight: u32,
    },

    #[error("Initial state is not reproducible: two calls returned different states")]
    NondeterministicInitialState,
}

/// Errors raised while generating a command sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("No command satisfied its precondition at position {position} after {attempts} attempts")]
    PreconditionRetriesExhausted {
        position: usize,
        attempts: u32,
    },

    #[error("No command is eligible at position {position}")]
    NoEligibleCommands {
        position: usize,
    },

    #[error("Argument generator for '{command}' failed: {reason}")]
    Strategy {
        command: String,
        reason: String,
    },
}

/// Why a candidate sequence is not a legal replay of the model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidSequence {
    #[error("Command at index {index} ('{command}') is not declared in the catalog")]
    UnknownCommand {
        index: usize,
        command: String,
    },

    #[error("Command at index {index} references {var} before it is bound")]
    UnboundVariable {
        index: usize,
        var: SymVar,
    },

    #[error("Command at index {index} binds {var}, which is already bound")]
    DuplicateVariable {
        index: usize,
        var: SymVar,
    },

    #[error("Precondition of '{command}' does not hold at index {index}")]
    PreconditionFailed {
        index: usize,
        command: String,
    },
}

impl InvalidSequence {
    /// Index of the offending command.
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::UnknownCommand { index, .. }
            | Self::UnboundVariable { index, .. }
            | Self::DuplicateVariable { index, .. }
            | Self::PreconditionFailed { index, .. } => *index,
        }
    }
}

/// Top-level error type for statem.
#[derive(Debug, Error)]
pub enum StatemError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Check aborted: {reason}")]
    Aborted {
        reason: String,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
    },
}

impl StatemError {
    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if this is a catalog error, directly or through generation.
    #[must_use]
    pub const fn is_catalog(&self) -> bool {
        matches!(
            self,
            Self::Catalog(_) | Self::Generation(GenerationError::Catalog(_))
        )
    }

    /// Returns true if this is a generation error.
    #[must_use]
    pub const fn is_generation(&self) -> bool {
        matches!(self, Self::Generation(_))
    }

    /// Returns true if this is a serialization error.
    #[must_use]
    pub const fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

/// Result type alias for statem operations.
pub type StatemResult<T> = Result<T, StatemError>;
