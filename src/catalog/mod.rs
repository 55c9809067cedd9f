//! Command catalog.
//!
//! The catalog is the explicit, immutable set of commands a model declares,
//! together with the model's initial state and an optional per-state weight
//! function. It is built once and passed to the generator, the shrink
//! validator and the executor.

mod command;

pub use command::{Command, CommandBuilder, FnCommand};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::CatalogError;

type InitialFn<S> = Box<dyn Fn() -> S + Send + Sync>;
type WeightFn<S> = Box<dyn Fn(&S) -> Vec<(String, u32)> + Send + Sync>;

/// Immutable set of commands plus the model's initial state.
pub struct Catalog<S: Clone> {
    initial: InitialFn<S>,
    commands: Vec<Arc<dyn Command<S>>>,
    index: HashMap<String, usize>,
    weight: Option<WeightFn<S>>,
}

impl<S: Clone> fmt::Debug for Catalog<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("commands", &self.names().collect::<Vec<_>>())
            .field("weighted", &self.weight.is_some())
            .finish_non_exhaustive()
    }
}

impl<S: Clone> Catalog<S> {
    /// Start building a catalog whose model starts in `initial()`.
    pub fn builder(initial: impl Fn() -> S + Send + Sync + 'static) -> CatalogBuilder<S> {
        CatalogBuilder::new(initial)
    }

    /// A fresh copy of the model's initial state.
    #[must_use]
    pub fn initial_state(&self) -> S {
        (self.initial)()
    }

    /// Look up a command by name.
    #[must_use]
    pub fn command(&self, name: &str) -> Option<&dyn Command<S>> {
        self.index.get(name).map(|&i| self.commands[i].as_ref())
    }

    /// Returns true if a command with this name is declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Command names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|c| c.name())
    }

    /// Number of declared commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Always false for a built catalog.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands eligible in `state` with their weights.
    ///
    /// Without a weight function every command is eligible with weight 1.
    /// With one, only the commands it names are eligible. Naming an
    /// undeclared command or giving a zero weight is a catalog error.
    pub fn eligible(&self, state: &S) -> Result<Vec<(&dyn Command<S>, u32)>, CatalogError> {
        let Some(weight) = &self.weight else {
            return Ok(self.commands.iter().map(|c| (c.as_ref(), 1)).collect());
        };

        weight(state)
            .into_iter()
            .map(|(name, w)| {
                let cmd = self
                    .command(&name)
                    .ok_or_else(|| CatalogError::UnknownCommand { name: name.clone() })?;
                if w == 0 {
                    return Err(CatalogError::InvalidWeight { name, weight: w });
                }
                Ok((cmd, w))
            })
            .collect()
    }
}

/// Builder for [`Catalog`].
pub struct CatalogBuilder<S: Clone> {
    initial: InitialFn<S>,
    commands: Vec<Arc<dyn Command<S>>>,
    weight: Option<WeightFn<S>>,
}

impl<S: Clone> CatalogBuilder<S> {
    /// Create a new builder.
    pub fn new(initial: impl Fn() -> S + Send + Sync + 'static) -> Self {
        Self {
            initial: Box::new(initial),
            commands: Vec::new(),
            weight: None,
        }
    }

    /// Declare a command.
    #[must_use]
    pub fn command(mut self, command: impl Command<S> + 'static) -> Self {
        self.commands.push(Arc::new(command));
        self
    }

    /// Declare an already shared command.
    #[must_use]
    pub fn shared_command(mut self, command: Arc<dyn Command<S>>) -> Self {
        self.commands.push(command);
        self
    }

    /// Restrict and bias command choice per state.
    ///
    /// Commands missing from the returned list are not eligible in that state.
    #[must_use]
    pub fn weight(mut self, f: impl Fn(&S) -> Vec<(String, u32)> + Send + Sync + 'static) -> Self {
        self.weight = Some(Box::new(f));
        self
    }

    /// Build the catalog.
    pub fn build(self) -> Result<Catalog<S>, CatalogError> {
        if self.commands.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }

        let mut index = HashMap::with_capacity(self.commands.len());
        for (i, cmd) in self.commands.iter().enumerate() {
            let name = cmd.name();
            if name.trim().is_empty() {
                return Err(CatalogError::EmptyCommandName);
            }
            if index.insert(name.to_string(), i).is_some() {
                return Err(CatalogError::DuplicateCommand {
                    name: name.to_string(),
                });
            }
        }

        Ok(Catalog {
            initial: self.initial,
            commands: self.commands,
            index,
            weight: self.weight,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> FnCommand<u32> {
        CommandBuilder::new(name).build().unwrap()
    }

    #[test]
    fn build_indexes_commands() {
        let catalog = Catalog::builder(|| 0u32)
            .command(named("a"))
            .command(named("b"))
            .build()
            .unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("b"));
        assert_eq!(catalog.command("a").map(|c| c.name()), Some("a"));
        assert!(catalog.command("c").is_none());
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(catalog.initial_state(), 0);
    }

    #[test]
    fn build_rejects_empty_and_duplicates() {
        let err = CatalogBuilder::new(|| 0u32).build().unwrap_err();
        assert_eq!(err, CatalogError::EmptyCatalog);

        let err = Catalog::builder(|| 0u32)
            .command(named("a"))
            .command(named("a"))
            .build()
            .unwrap_err();
        assert_eq!(err, CatalogError::DuplicateCommand { name: "a".to_string() });
    }

    #[test]
    fn unweighted_catalog_makes_everything_eligible() {
        let catalog = Catalog::builder(|| 0u32)
            .command(named("a"))
            .command(named("b"))
            .build()
            .unwrap();
        let eligible = catalog.eligible(&0).unwrap();
        let names: Vec<_> = eligible.iter().map(|(c, w)| (c.name(), *w)).collect();
        assert_eq!(names, vec![("a", 1), ("b", 1)]);
    }

    #[test]
    fn weight_restricts_by_state() {
        let catalog = Catalog::builder(|| 0u32)
            .command(named("push"))
            .command(named("pop"))
            .weight(|depth| {
                if *depth == 0 {
                    vec![("push".to_string(), 1)]
                } else {
                    vec![("push".to_string(), 1), ("pop".to_string(), 3)]
                }
            })
            .build()
            .unwrap();

        let empty: Vec<_> = catalog.eligible(&0).unwrap().iter().map(|(c, _)| c.name().to_string()).collect();
        assert_eq!(empty, vec!["push"]);

        let full: Vec<_> = catalog.eligible(&2).unwrap().iter().map(|(c, w)| (c.name().to_string(), *w)).collect();
        assert_eq!(full, vec![("push".to_string(), 1), ("pop".to_string(), 3)]);
    }

    #[test]
    fn weight_naming_unknown_command_fails_fast() {
        let catalog = Catalog::builder(|| 0u32)
            .command(named("a"))
            .weight(|_| vec![("ghost".to_string(), 1)])
            .build()
            .unwrap();
        assert!(matches!(
            catalog.eligible(&0),
            Err(CatalogError::UnknownCommand { ref name }) if name == "ghost"
        ));
    }

    #[test]
    fn zero_weight_is_rejected() {
        let catalog = Catalog::builder(|| 0u32)
            .command(named("a"))
            .weight(|_| vec![("a".to_string(), 0)])
            .build()
            .unwrap();
        assert!(matches!(
            catalog.eligible(&0),
            Err(CatalogError::InvalidWeight { weight: 0, .. })
        ));
    }
}
