use std::sync::Arc;

use proptest::prelude::*;

use statem::{
    args, replay, run, sequences, validate, Catalog, Command, CommandBuilder, Failure, GenConfig,
    SequenceStrategy, Sut, SymVar, Value,
};

/// Bank ledger: accounts are opened, funded and closed. `deposit` and `close`
/// take an earlier `open` result, so generated sequences carry variables.
#[derive(Debug, Clone, Default, PartialEq)]
struct Ledger {
    accounts: Vec<(Handle, i64)>,
}

/// Account handle in the model: symbolic during generation, concrete during
/// execution.
#[derive(Debug, Clone, PartialEq)]
enum Handle {
    Var(SymVar),
    Id(i64),
}

impl Handle {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Var(var) => Some(Self::Var(*var)),
            Value::Int(id) => Some(Self::Id(*id)),
            _ => None,
        }
    }
}

impl Ledger {
    fn handles(&self) -> Vec<Value> {
        self.accounts
            .iter()
            .map(|(handle, _)| match handle {
                Handle::Var(var) => Value::Var(*var),
                Handle::Id(id) => Value::Int(*id),
            })
            .collect()
    }

    fn position(&self, value: Option<&Value>) -> Option<usize> {
        let handle = Handle::from_value(value?)?;
        self.accounts.iter().position(|(h, _)| *h == handle)
    }
}

fn ledger_catalog() -> Catalog<Ledger> {
    Catalog::builder(Ledger::default)
        .command(
            CommandBuilder::<Ledger>::new("open")
                .pre(|ledger, _| ledger.accounts.len() < 4)
                .next(|ledger, _, result| {
                    let mut next = ledger.clone();
                    if let Some(handle) = Handle::from_value(result) {
                        next.accounts.push((handle, 0));
                    }
                    next
                })
                .post(|_, _, result| result.is_int())
                .build()
                .unwrap(),
        )
        .command(
            CommandBuilder::<Ledger>::new("deposit")
                .args(|ledger| vec![args::one_of(ledger.handles()), args::int(1..=100)])
                .pre(|ledger, args| ledger.position(args.first()).is_some())
                .next(|ledger, args, _| {
                    let mut next = ledger.clone();
                    if let Some(i) = next.position(args.first()) {
                        next.accounts[i].1 += args.get(1).and_then(Value::as_int).unwrap_or_default();
                    }
                    next
                })
                .post(|ledger, args, result| {
                    let before = ledger.position(args.first()).map(|i| ledger.accounts[i].1);
                    let amount = args.get(1).and_then(Value::as_int);
                    before.zip(amount).map(|(b, a)| Value::Int(b + a)).as_ref() == Some(result)
                })
                .build()
                .unwrap(),
        )
        .command(
            CommandBuilder::<Ledger>::new("close")
                .args(|ledger| vec![args::one_of(ledger.handles())])
                .pre(|ledger, args| ledger.position(args.first()).is_some())
                .next(|ledger, args, _| {
                    let mut next = ledger.clone();
                    if let Some(i) = next.position(args.first()) {
                        next.accounts.remove(i);
                    }
                    next
                })
                .build()
                .unwrap(),
        )
        .build()
        .unwrap()
}

#[derive(Default)]
struct Bank {
    next_id: i64,
    balances: Vec<(i64, i64)>,
    calls: usize,
    fail_on_call: Option<usize>,
}

impl Sut for Bank {
    fn invoke(&mut self, command: &str, args: &[Value]) -> Result<Value, Failure> {
        self.calls += 1;
        if self.fail_on_call == Some(self.calls) {
            return Err(Failure::error("connection reset"));
        }
        let id = args.first().and_then(Value::as_int);
        match command {
            "open" => {
                self.next_id += 1;
                self.balances.push((self.next_id, 0));
                Ok(Value::Int(self.next_id))
            }
            "deposit" => {
                let amount = args.get(1).and_then(Value::as_int).unwrap_or_default();
                let entry = self
                    .balances
                    .iter_mut()
                    .find(|(i, _)| Some(*i) == id)
                    .ok_or_else(|| Failure::error("no such account"))?;
                entry.1 += amount;
                Ok(Value::Int(entry.1))
            }
            "close" => {
                self.balances.retain(|(i, _)| Some(*i) != id);
                Ok(Value::Null)
            }
            other => Err(Failure::error(format!("unsupported command {other}"))),
        }
    }
}

fn ledger_sequences() -> SequenceStrategy<Ledger> {
    sequences(
        Arc::new(ledger_catalog()),
        GenConfig {
            max_size: 12,
            ..GenConfig::default()
        },
    )
    .unwrap()
}

fn replay_states(catalog: &Catalog<Ledger>, seq: &[Command]) -> Vec<Ledger> {
    let mut states = vec![catalog.initial_state()];
    for entry in seq {
        let cmd = catalog.command(&entry.call.command).unwrap();
        let state = states.last().unwrap();
        states.push(cmd.next(state, &entry.call.args, &Value::Var(entry.var)));
    }
    states
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn generated_sequences_are_self_valid(seq in ledger_sequences()) {
        let catalog = ledger_catalog();
        prop_assert_eq!(validate(&catalog, &catalog.initial_state(), &seq), Ok(()));
    }

    #[test]
    fn preconditions_hold_along_generated_sequences(seq in ledger_sequences()) {
        let catalog = ledger_catalog();
        let states = replay_states(&catalog, &seq);
        for (entry, state) in seq.iter().zip(&states) {
            let cmd = catalog.command(&entry.call.command).unwrap();
            prop_assert!(cmd.pre(state, &entry.call.args), "pre failed for {}", entry);
        }
    }

    #[test]
    fn variables_are_numbered_by_position(seq in ledger_sequences()) {
        for (i, entry) in seq.iter().enumerate() {
            prop_assert_eq!(entry.var, SymVar::at_position(i));
            for var in entry.call.vars() {
                prop_assert!(var < entry.var);
            }
        }

        let catalog = ledger_catalog();
        let ran = replay(&catalog, &mut Bank::default(), &seq);
        let bound: Vec<SymVar> = ran.history.iter().map(|e| e.var).collect();
        let expected: Vec<SymVar> = (0..seq.len()).map(SymVar::at_position).collect();
        prop_assert_eq!(bound, expected);
    }

    #[test]
    fn execution_stops_at_first_failure(seq in ledger_sequences(), fail_on in 1usize..8) {
        let catalog = ledger_catalog();
        let mut bank = Bank { fail_on_call: Some(fail_on), ..Bank::default() };
        let ran = run(&catalog, &mut bank, catalog.initial_state(), &seq);

        if seq.len() < fail_on {
            prop_assert!(ran.is_ok());
            prop_assert_eq!(bank.calls, seq.len());
        } else {
            prop_assert_eq!(ran.failed_at(), Some(fail_on));
            prop_assert_eq!(ran.history.len(), fail_on);
            prop_assert_eq!(bank.calls, fail_on);
        }
    }

    #[test]
    fn replay_is_idempotent(seq in ledger_sequences()) {
        let catalog = ledger_catalog();
        let first = replay(&catalog, &mut Bank::default(), &seq);
        let second = replay(&catalog, &mut Bank::default(), &seq);
        prop_assert!(first.is_ok(), "correct bank diverged: {:?}", first.result);
        prop_assert_eq!(first, second);
    }
}
