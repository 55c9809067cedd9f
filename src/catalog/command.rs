//! Per-command callbacks.

use std::fmt;

use crate::error::CatalogError;
use crate::args::ArgGen;
use crate::value::Value;

/// A command the model knows how to generate, check and advance.
///
/// Every callback except [`Command::name`] has a default: no arguments, an
/// always-true precondition, identity transition and an always-true
/// postcondition. The engine tolerates any subset being left at the default.
///
/// `next` is called twice per command in a test's life: during generation
/// with `result` set to the call's own [`Value::Var`], and during execution
/// with the value actually returned by the SUT.
pub trait Command<S: Clone>: Send + Sync {
    /// Catalog-unique command name.
    fn name(&self) -> &str;

    /// Argument generators for this command in `state`, in call order.
    fn args(&self, _state: &S) -> Vec<ArgGen> {
        Vec::new()
    }

    /// Whether the command may run in `state` with `args`.
    fn pre(&self, _state: &S, _args: &[Value]) -> bool {
        true
    }

    /// The model state after the call returned `result`.
    fn next(&self, state: &S, _args: &[Value], _result: &Value) -> S {
        state.clone()
    }

    /// Whether `result` agrees with the model in `state`.
    fn post(&self, _state: &S, _args: &[Value], _result: &Value) -> bool {
        true
    }
}

type ArgsFn<S> = Box<dyn Fn(&S) -> Vec<ArgGen> + Send + Sync>;
type PreFn<S> = Box<dyn Fn(&S, &[Value]) -> bool + Send + Sync>;
type NextFn<S> = Box<dyn Fn(&S, &[Value], &Value) -> S + Send + Sync>;
type PostFn<S> = Box<dyn Fn(&S, &[Value], &Value) -> bool + Send + Sync>;

/// A [`Command`] assembled from closures by [`CommandBuilder`].
pub struct FnCommand<S> {
    name: String,
    args: Option<ArgsFn<S>>,
    pre: Option<PreFn<S>>,
    next: Option<NextFn<S>>,
    post: Option<PostFn<S>>,
}

impl<S> fmt::Debug for FnCommand<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCommand")
            .field("name", &self.name)
            .field("args", &self.args.is_some())
            .field("pre", &self.pre.is_some())
            .field("next", &self.next.is_some())
            .field("post", &self.post.is_some())
            .finish()
    }
}

impl<S: Clone> Command<S> for FnCommand<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn args(&self, state: &S) -> Vec<ArgGen> {
        self.args.as_ref().map_or_else(Vec::new, |f| f(state))
    }

    fn pre(&self, state: &S, args: &[Value]) -> bool {
        self.pre.as_ref().map_or(true, |f| f(state, args))
    }

    fn next(&self, state: &S, args: &[Value], result: &Value) -> S {
        match &self.next {
            Some(f) => f(state, args, result),
            None => state.clone(),
        }
    }

    fn post(&self, state: &S, args: &[Value], result: &Value) -> bool {
        self.post.as_ref().map_or(true, |f| f(state, args, result))
    }
}

/// Builder for closure-backed commands.
///
/// ```
/// use statem::{args, CommandBuilder};
///
/// let push = CommandBuilder::<Vec<i64>>::new("push")
///     .args(|_| vec![args::int(0..=9)])
///     .next(|stack, args, _| {
///         let mut stack = stack.clone();
///         stack.push(args[0].as_int().unwrap_or_default());
///         stack
///     })
///     .build()
///     .unwrap();
/// # let _ = push;
/// ```
pub struct CommandBuilder<S> {
    name: String,
    args: Option<ArgsFn<S>>,
    pre: Option<PreFn<S>>,
    next: Option<NextFn<S>>,
    post: Option<PostFn<S>>,
}

impl<S: Clone> CommandBuilder<S> {
    /// Starts a command with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: None,
            pre: None,
            next: None,
            post: None,
        }
    }

    /// Set the argument generators.
    #[must_use]
    pub fn args(mut self, f: impl Fn(&S) -> Vec<ArgGen> + Send + Sync + 'static) -> Self {
        self.args = Some(Box::new(f));
        self
    }

    /// Set the precondition.
    #[must_use]
    pub fn pre(mut self, f: impl Fn(&S, &[Value]) -> bool + Send + Sync + 'static) -> Self {
        self.pre = Some(Box::new(f));
        self
    }

    /// Set the state transition.
    #[must_use]
    pub fn next(mut self, f: impl Fn(&S, &[Value], &Value) -> S + Send + Sync + 'static) -> Self {
        self.next = Some(Box::new(f));
        self
    }

    /// Set the postcondition.
    #[must_use]
    pub fn post(mut self, f: impl Fn(&S, &[Value], &Value) -> bool + Send + Sync + 'static) -> Self {
        self.post = Some(Box::new(f));
        self
    }

    /// Build the command.
    pub fn build(self) -> Result<FnCommand<S>, CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::EmptyCommandName);
        }
        Ok(FnCommand {
            name: self.name,
            args: self.args,
            pre: self.pre,
            next: self.next,
            post: self.post,
        })
    }
}
