//! Expression tree for scrip
//!
//! `Expr` is the sealed form of a parsed script: a sum type with exactly
//! four variants, built once by the parser and never mutated afterwards.
//! The only mutable stage lives inside the parser's private builders;
//! sealing is the conversion into `Arc<Expr>`. A sealed tree may be
//! evaluated any number of times, from any thread, each time with its own
//! context.
//!
//! `Display` prints a tree back to a parseable, semantically equivalent
//! script, quoting any content that collides with grammar characters.

use std::fmt;
use std::sync::Arc;

/// Tri-state flag carried by a command invocation via a leading `+`/`-`.
///
/// The core only transports the toggle; its meaning belongs to the
/// invoked command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Toggle {
    On,
    Off,
    #[default]
    Unset,
}

impl Toggle {
    /// Grammar prefix for printing (`+`, `-`, or nothing).
    pub fn prefix(self) -> &'static str {
        match self {
            Toggle::On => "+",
            Toggle::Off => "-",
            Toggle::Unset => "",
        }
    }
}

/// A sealed expression.
#[derive(Debug, PartialEq)]
pub enum Expr {
    /// Literal text; evaluates to status 0 with the text as output.
    Constant(String),
    /// A command invocation. The name is resolved against the host at
    /// evaluation time, not at parse time, and the arguments are handed
    /// to the command unevaluated.
    Invocation {
        toggle: Toggle,
        name: String,
        args: Vec<Arc<Expr>>,
    },
    /// `condition ? primary : secondary` (or `!` testing for failure).
    /// The primary action can be absent in a sealed tree; evaluation then
    /// reports an error status rather than panicking.
    Conditional {
        expected: bool,
        condition: Arc<Expr>,
        primary: Option<Arc<Expr>>,
        secondary: Option<Arc<Expr>>,
    },
    /// `a ; b ; c`: evaluated in order, outputs concatenated, status of
    /// the last member.
    Series(Vec<Arc<Expr>>),
}

impl Expr {
    pub fn constant(value: impl Into<String>) -> Arc<Expr> {
        Arc::new(Expr::Constant(value.into()))
    }
}

/// Quote `word` if it contains anything the tokenizer would treat as
/// structure. Inside quotes only `"` and `\` need escaping.
fn quote(word: &str) -> String {
    let needs_quoting = word.is_empty()
        || word
            .chars()
            .any(|c| c.is_whitespace() || "\"\\;:?![]+-".contains(c));
    if !needs_quoting {
        return word.to_string();
    }
    let mut out = String::with_capacity(word.len() + 2);
    out.push('"');
    for c in word.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant(value) => write!(f, "{}", quote(value)),
            Expr::Invocation { toggle, name, args } => {
                write!(f, "{}{}", toggle.prefix(), quote(name))?;
                for arg in args {
                    match &**arg {
                        Expr::Constant(value) => write!(f, " {}", quote(value))?,
                        compound => write!(f, " [{compound}]")?,
                    }
                }
                Ok(())
            }
            Expr::Conditional {
                expected,
                condition,
                primary,
                secondary,
            } => {
                write!(f, "{condition} {}", if *expected { '?' } else { '!' })?;
                if let Some(primary) = primary {
                    write!(f, " {primary}")?;
                }
                if let Some(secondary) = secondary {
                    write!(f, " : {secondary}")?;
                }
                Ok(())
            }
            Expr::Series(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ; ")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
        }
    }
}
