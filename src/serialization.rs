//! JSON helpers for sequences and run results.
//!
//! Serde already provides the encoding. These helpers keep formatting stable
//! so a counterexample can be saved and replayed later.

use serde::Serialize;

use crate::error::{StatemError, StatemResult};
use crate::exec::RunResult;
use crate::symbolic::Command;

/// Serialize a sequence to pretty JSON.
pub fn to_json_pretty(sequence: &[Command]) -> StatemResult<String> {
    serde_json::to_string_pretty(sequence).map_err(|e| StatemError::serialization(format!("serialize sequence: {e}")))
}

/// Deserialize a sequence from JSON.
///
/// Callers should run [`crate::validate`] against the catalog before
/// replaying it.
pub fn from_json(s: &str) -> StatemResult<Vec<Command>> {
    serde_json::from_str::<Vec<Command>>(s).map_err(|e| StatemError::serialization(format!("deserialize sequence: {e}")))
}

/// Serialize a run result to pretty JSON.
pub fn run_result_to_json<S: Serialize>(run: &RunResult<S>) -> StatemResult<String> {
    serde_json::to_string_pretty(run).map_err(|e| StatemError::serialization(format!("serialize run: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use crate::exec::{Failure, HistoryEvent, Outcome};
    use crate::symbolic::{sequence_of, Call, SymVar};
    use crate::value::Value;

    #[test]
    fn saved_sequence_reloads_with_variables_intact() {
        let seq = sequence_of(vec![
            Call::new("put", vec![Value::Int(1), Value::from("a")]),
            Call::new("get", vec![Value::Var(SymVar::new(1))]),
        ]);
        let json = to_json_pretty(&seq).unwrap();
        assert!(json.contains("\"put\""));
        assert_eq!(from_json(&json).unwrap(), seq);
    }

    #[test]
    fn malformed_input_is_a_serialization_error() {
        let err = from_json("{\"not\": \"a sequence\"}").unwrap_err();
        assert!(err.is_serialization());
    }

    #[test]
    fn run_result_includes_outcome_kind() {
        let run = RunResult {
            history: vec![HistoryEvent {
                state: 0u8,
                call: Call::new("boom", vec![]),
                var: SymVar::new(1),
                result: Value::Null,
                outcome: Outcome::RuntimeFailure(Failure::error("io")),
            }],
            state: 0u8,
            result: Outcome::RuntimeFailure(Failure::error("io")),
            env: Environment::new(),
        };
        let json = run_result_to_json(&run).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["result"]["kind"], "runtime_failure");
        assert_eq!(parsed["history"].as_array().map(Vec::len), Some(1));
    }
}
