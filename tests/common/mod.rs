//! Common test utilities for scrip integration tests

use std::sync::Arc;

pub use scrip::{parse, register_builtins, Context, Outcome, Registry};

/// A context over a fresh registry with the bundled commands.
pub fn context() -> Context {
    let registry = Arc::new(Registry::new());
    register_builtins(&registry);
    Context::new(registry)
}

/// Parse and evaluate one script against a fresh context.
pub fn eval(input: &str) -> Outcome {
    parse(input).expect("parse failed").evaluate(&context())
}

#[allow(dead_code)]
pub fn output(input: &str) -> String {
    eval(input).output().to_string()
}

#[allow(dead_code)]
pub fn status(input: &str) -> i32 {
    eval(input).status()
}
