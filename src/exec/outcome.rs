//! Run outcomes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::Value;

/// Detail of a runtime failure captured while invoking the SUT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Failure {
    /// The SUT returned an error.
    #[error("command failed: {message}")]
    Error { message: String },

    /// The SUT panicked.
    #[error("command panicked: {message}")]
    Panic { message: String },

    /// The sequence named a command the catalog does not declare.
    #[error("unknown command '{name}'")]
    UnknownCommand { name: String },
}

impl Failure {
    /// Creates an error failure.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::Panic { message }
    }
}

/// Terminal outcome of a run.
///
/// Exactly one outcome terminates a run. Anything but [`Outcome::Ok`] is
/// sticky: the executor stops at the first non-Ok outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Outcome<S> {
    /// Every command so far matched the model.
    Ok,
    /// A precondition did not hold at execution time; carries the model state.
    PreconditionViolation(S),
    /// A postcondition rejected the SUT's result; carries that result.
    PostconditionViolation(Value),
    /// The SUT failed abnormally.
    RuntimeFailure(Failure),
}

impl<S> Outcome<S> {
    /// Returns true for [`Outcome::Ok`].
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Short name of the outcome kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::PreconditionViolation(_) => "precondition_violation",
            Self::PostconditionViolation(_) => "postcondition_violation",
            Self::RuntimeFailure(_) => "runtime_failure",
        }
    }

    /// Value bound to a failing command's variable.
    ///
    /// Later substitutions see this deterministic stand-in instead of an
    /// unbound variable. A runtime failure binds its serialized [`Failure`];
    /// a precondition violation binds `Null` since model states carry no
    /// serialization bound.
    #[must_use]
    pub fn placeholder(&self) -> Value {
        match self {
            Self::Ok | Self::PreconditionViolation(_) => Value::Null,
            Self::PostconditionViolation(result) => result.clone(),
            Self::RuntimeFailure(failure) => serde_json::to_value(failure)
                .map_or_else(|_| Value::String(failure.to_string()), Value::Structured),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_and_ok() {
        assert!(Outcome::<u8>::Ok.is_ok());
        assert_eq!(Outcome::<u8>::PreconditionViolation(3).kind(), "precondition_violation");
        assert!(!Outcome::<u8>::RuntimeFailure(Failure::error("x")).is_ok());
    }

    #[test]
    fn placeholders_are_deterministic() {
        assert_eq!(Outcome::<u8>::PreconditionViolation(1).placeholder(), Value::Null);
        assert_eq!(
            Outcome::<u8>::PostconditionViolation(Value::Int(4)).placeholder(),
            Value::Int(4)
        );
        assert_eq!(
            Outcome::<u8>::RuntimeFailure(Failure::error("boom")).placeholder(),
            Value::Structured(serde_json::json!({"kind": "error", "message": "boom"}))
        );
        assert_eq!(
            Outcome::<u8>::RuntimeFailure(Failure::UnknownCommand { name: "ghost".to_string() })
                .placeholder(),
            Value::Structured(serde_json::json!({"kind": "unknown_command", "name": "ghost"}))
        );
    }

    #[test]
    fn panic_payloads_are_described() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("bad input");
        assert_eq!(
            Failure::from_panic(payload.as_ref()),
            Failure::Panic {
                message: "bad input".to_string()
            }
        );

        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert!(matches!(Failure::from_panic(payload.as_ref()), Failure::Panic { message } if message == "owned"));

        let payload: Box<dyn std::any::Any + Send> = Box::new(17u8);
        assert!(matches!(Failure::from_panic(payload.as_ref()), Failure::Panic { .. }));
    }

    #[test]
    fn outcome_serializes_with_kind_tag() {
        let outcome: Outcome<u8> = Outcome::RuntimeFailure(Failure::error("io"));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["kind"], "runtime_failure");
        let back: Outcome<u8> = serde_json::from_value(json).unwrap();
        assert_eq!(back, outcome);
    }
}
