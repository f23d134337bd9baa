//! Evaluation for scrip
//!
//! A sealed tree is evaluated against a [`Context`]: a cheaply derived
//! bundle of host reference, optional user arguments (unevaluated
//! expressions positionally supplied to an alias call), and branch-scoped
//! string locals. Every evaluation returns an [`Outcome`]; the evaluate
//! boundary never raises. A [`Fault`] escaping a command or the machinery
//! is converted right there into a failing outcome with [`STATUS_FAULT`]
//! and the fault's description as output. That conversion is the single
//! point where non-syntax errors become ordinary status/output data.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::ast::Expr;
use crate::host::Host;

/// Success; also the truth value `true`.
pub const STATUS_OK: i32 = 0;
/// Reserved for faults absorbed at the evaluate boundary.
pub const STATUS_FAULT: i32 = -1;
/// Command name not present in the host's table.
pub const STATUS_NOT_FOUND: i32 = 127;
/// A sealed conditional evaluated without an action to run.
pub const STATUS_INCOMPLETE: i32 = 2;

/// Nesting budget guarding the host call stack; see
/// [`Context::with_depth_limit`].
pub const DEFAULT_DEPTH_LIMIT: u32 = 64;

/// A fault escaping a command implementation or the evaluation machinery.
#[derive(Error, Debug)]
pub enum Fault {
    #[error("recursion depth limit {0} exceeded")]
    DepthExceeded(u32),
    #[error("{0}")]
    Command(String),
}

impl Fault {
    pub fn msg(description: impl Into<String>) -> Self {
        Fault::Command(description.into())
    }
}

/// Heterogeneous side-channel entry on an [`Outcome`].
pub type Data = Arc<dyn Any + Send + Sync>;

/// Per-evaluation state. Created per top-level call and per branch, never
/// retained after evaluation returns.
///
/// Derivation is a shallow copy: a branch sees everything visible to its
/// parent at branch time, and additions a branch makes are invisible to
/// its siblings and to the parent.
#[derive(Clone)]
pub struct Context {
    host: Arc<dyn Host>,
    user_args: Option<Arc<Vec<Arc<Expr>>>>,
    locals: Arc<HashMap<String, String>>,
    depth: u32,
    depth_limit: u32,
}

impl Context {
    pub fn new(host: Arc<dyn Host>) -> Self {
        Context {
            host,
            user_args: None,
            locals: Arc::new(HashMap::new()),
            depth: 0,
            depth_limit: DEFAULT_DEPTH_LIMIT,
        }
    }

    /// Replace the nesting budget (default [`DEFAULT_DEPTH_LIMIT`]).
    pub fn with_depth_limit(mut self, limit: u32) -> Self {
        self.depth_limit = limit;
        self
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    pub fn local(&self, name: &str) -> Option<&str> {
        self.locals.get(name).map(String::as_str)
    }

    pub fn user_args(&self) -> Option<&[Arc<Expr>]> {
        self.user_args.as_deref().map(Vec::as_slice)
    }

    /// Derive a context with one additional local binding.
    pub fn with_local(&self, name: impl Into<String>, value: impl Into<String>) -> Context {
        let mut locals = (*self.locals).clone();
        locals.insert(name.into(), value.into());
        Context {
            locals: Arc::new(locals),
            ..self.clone()
        }
    }

    /// Derive a context carrying a fresh list of unevaluated user
    /// arguments (for alias calls).
    pub fn with_user_args(&self, args: Vec<Arc<Expr>>) -> Context {
        Context {
            user_args: Some(Arc::new(args)),
            ..self.clone()
        }
    }

    fn deeper(&self) -> Result<Context, Fault> {
        if self.depth >= self.depth_limit {
            return Err(Fault::DepthExceeded(self.depth_limit));
        }
        Ok(Context {
            depth: self.depth + 1,
            ..self.clone()
        })
    }
}

/// Uniform outcome of evaluating any expression. Immutable once built.
#[derive(Clone)]
pub struct Outcome {
    status: i32,
    output: String,
    data: Vec<Data>,
    source: Option<Arc<Expr>>,
}

impl Outcome {
    pub fn ok(output: impl Into<String>) -> Self {
        Outcome::with_status(STATUS_OK, output)
    }

    pub fn with_status(status: i32, output: impl Into<String>) -> Self {
        Outcome {
            status,
            output: output.into(),
            data: Vec::new(),
            source: None,
        }
    }

    pub fn fault(description: impl Into<String>) -> Self {
        Outcome::with_status(STATUS_FAULT, description)
    }

    /// Append one typed side-channel entry.
    pub fn with_data(mut self, data: impl Any + Send + Sync) -> Self {
        self.data.push(Arc::new(data));
        self
    }

    pub fn status(&self) -> i32 {
        self.status
    }

    /// Truth value derived from the status: zero means true.
    pub fn truth_value(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Check against an expected truth value, the pervasive test in
    /// command implementations validating argument results.
    pub fn is(&self, expected: bool) -> bool {
        self.truth_value() == expected
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn into_output(self) -> String {
        self.output
    }

    pub fn data(&self) -> &[Data] {
        &self.data
    }

    /// First side-channel entry of type `T`, if any.
    pub fn first_data<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.data
            .iter()
            .find_map(|entry| Arc::clone(entry).downcast::<T>().ok())
    }

    /// The side-channel entry of type `T`, if exactly one exists.
    pub fn unique_data<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let mut matches = self
            .data
            .iter()
            .filter_map(|entry| Arc::clone(entry).downcast::<T>().ok());
        let first = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        Some(first)
    }

    /// The expression this outcome came from.
    pub fn source(&self) -> Option<&Arc<Expr>> {
        self.source.as_ref()
    }

    fn stamped(mut self, source: Arc<Expr>) -> Self {
        self.source = Some(source);
        self
    }
}

impl Expr {
    /// Evaluate a sealed expression. Never panics past this boundary and
    /// never returns an error: faults become a [`STATUS_FAULT`] outcome.
    pub fn evaluate(self: &Arc<Self>, context: &Context) -> Outcome {
        let outcome = match self.step(context) {
            Ok(outcome) => outcome,
            Err(fault) => Outcome::fault(fault.to_string()),
        };
        outcome.stamped(Arc::clone(self))
    }

    fn step(self: &Arc<Self>, context: &Context) -> Result<Outcome, Fault> {
        let context = context.deeper()?;
        match &**self {
            Expr::Constant(value) => Ok(Outcome::ok(value.clone())),
            Expr::Invocation { toggle, name, args } => {
                let Some(command) = context.host().lookup(name) else {
                    return Ok(Outcome::with_status(
                        STATUS_NOT_FOUND,
                        format!("command not found: {name}"),
                    ));
                };
                if let Some(short) =
                    context
                        .host()
                        .before_invoke(name, *toggle, &context, args)
                {
                    return Ok(short);
                }
                tracing::trace!(command = %name, args = args.len(), "dispatch");
                command.invoke(*toggle, &context, args)
            }
            Expr::Conditional {
                expected,
                condition,
                primary,
                secondary,
            } => {
                let tested = condition.evaluate(&context);
                if tested.is(*expected) {
                    Ok(match primary {
                        Some(primary) => primary.evaluate(&context),
                        None => Outcome::with_status(
                            STATUS_INCOMPLETE,
                            "conditional without an action",
                        ),
                    })
                } else if let Some(secondary) = secondary {
                    Ok(secondary.evaluate(&context))
                } else {
                    // Unmatched and no else branch: the condition's own
                    // outcome passes through unchanged.
                    Ok(tested)
                }
            }
            Expr::Series(members) => {
                let mut output = String::new();
                let mut status = STATUS_OK;
                let mut data = Vec::new();
                for member in members {
                    // Every member runs; a failing sibling aborts nothing.
                    let outcome = member.evaluate(&context);
                    output.push_str(outcome.output());
                    status = outcome.status();
                    data.extend(outcome.data().iter().cloned());
                }
                Ok(Outcome {
                    status,
                    output,
                    data,
                    source: None,
                })
            }
        }
    }
}
