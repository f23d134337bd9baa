//! scrip, an embeddable single-line command-scripting language
//!
//! # Overview
//!
//! Host applications register named commands and variables on a
//! [`Registry`], then execute one-line scripts against them. The grammar
//! is shell-shaped: a command name, whitespace-separated arguments,
//! `+`/`-` toggles directly before a name, `;` sequencing, `?`/`!`
//! conditionals with an optional `:` else branch, and `[` `]` compound
//! arguments that are full sub-invocations.
//!
//! ```text
//! get debug ? echo on : echo off
//! repeat 3 [echo [get i]] ; echo done
//! alias greet [echo hello [arg 0]] ; greet world
//! ```
//!
//! # Pipeline
//!
//! Text flows through [`Tokenizer`] and [`parse`] into one sealed
//! [`Expr`] tree, built once and evaluated any number of times. Each
//! evaluation takes a [`Context`] (host reference, branch-scoped locals,
//! optional user arguments) and yields an [`Outcome`] (status, truth
//! value, output text, typed side-channel data). Commands receive their
//! arguments *unevaluated*, which is why loops and scoping ship as
//! ordinary commands rather than syntax.
//!
//! Malformed text is a [`SyntaxError`] from [`parse`]; nothing that
//! happens during evaluation is. Faults are absorbed at the evaluate
//! boundary and reported as a failing [`Outcome`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use scrip::{parse, register_builtins, Context, Registry};
//!
//! let registry = Arc::new(Registry::new());
//! register_builtins(&registry);
//!
//! let expr = parse("echo hello [echo world]").unwrap();
//! let outcome = expr.evaluate(&Context::new(registry));
//! assert_eq!(outcome.output(), "hello world");
//! assert!(outcome.truth_value());
//! ```

pub mod ast;
pub mod builtins;
pub mod error;
pub mod eval;
pub mod host;
pub mod lexer;
pub mod parser;
pub mod registry;

// Re-export commonly used items
pub use ast::{Expr, Toggle};
pub use builtins::register_builtins;
pub use error::SyntaxError;
pub use eval::{
    Context, Data, Fault, Outcome, DEFAULT_DEPTH_LIMIT, STATUS_FAULT, STATUS_INCOMPLETE,
    STATUS_NOT_FOUND, STATUS_OK,
};
pub use host::{Command, Host};
pub use lexer::{lex, Token, TokenKind, Tokenizer};
pub use parser::parse;
pub use registry::Registry;

/// Convenience: parse and evaluate one script against a context.
pub fn run(input: &str, context: &Context) -> Result<Outcome, SyntaxError> {
    let expr = parse(input)?;
    Ok(expr.evaluate(context))
}
