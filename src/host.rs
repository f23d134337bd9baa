//! The seam between the language core and its host application.
//!
//! The core reaches everything outside itself through these two traits: a
//! [`Host`] resolves command names at evaluation time (late binding) and
//! may veto an invocation before it runs; a [`Command`] receives the
//! toggle, the caller's context, and its arguments *unevaluated*. A
//! command decides which arguments to evaluate, how many times, and in
//! what order, which is what lets loops, scoping, and user-defined
//! aliases exist as ordinary commands with no core support.

use std::sync::Arc;

use crate::ast::{Expr, Toggle};
use crate::eval::{Context, Fault, Outcome};

pub trait Command: Send + Sync {
    fn invoke(
        &self,
        toggle: Toggle,
        context: &Context,
        args: &[Arc<Expr>],
    ) -> Result<Outcome, Fault>;
}

/// Plain functions and closures are commands.
impl<F> Command for F
where
    F: Fn(Toggle, &Context, &[Arc<Expr>]) -> Result<Outcome, Fault> + Send + Sync,
{
    fn invoke(
        &self,
        toggle: Toggle,
        context: &Context,
        args: &[Arc<Expr>],
    ) -> Result<Outcome, Fault> {
        self(toggle, context, args)
    }
}

pub trait Host: Send + Sync {
    /// Resolve a command name. Called once per invocation, every time the
    /// expression is evaluated.
    fn lookup(&self, name: &str) -> Option<Arc<dyn Command>>;

    /// Pre-invocation gate. Returning `Some` short-circuits the
    /// invocation with the supplied outcome; the default proceeds.
    fn before_invoke(
        &self,
        _name: &str,
        _toggle: Toggle,
        _context: &Context,
        _args: &[Arc<Expr>],
    ) -> Option<Outcome> {
        None
    }
}
