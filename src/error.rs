//! Error types shared by the tokenizer and the parser.
//!
//! Every rejection of malformed script text is a [`SyntaxError`], reported
//! synchronously to the caller of `parse` (or `lex`); no partial tree is
//! ever produced. Failures during evaluation are never syntax errors: they
//! surface as status codes on an `Outcome`, or as a `Fault` absorbed at the
//! evaluation boundary (see `eval`).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("empty input")]
    EmptyInput,
    #[error("empty command before {0:?}")]
    EmptyCommand(char),
    #[error("trailing backslash")]
    TrailingBackslash,
    #[error("unterminated quoted string")]
    UnterminatedString,
    #[error("toggle '{0}' is only allowed before a command name")]
    MisplacedToggle(char),
    #[error("toggle with no command name")]
    DanglingToggle,
    #[error("unmatched ']'")]
    UnmatchedCompoundEnd,
    #[error("unclosed '[' (depth {0})")]
    UnclosedCompound(u32),
    #[error("argument with no command to receive it")]
    ArgumentWithoutCommand,
    #[error("':' with no conditional")]
    OtherwiseWithoutConditional,
    #[error("':' before any action")]
    OtherwiseWithoutAction,
    #[error("duplicate ':' in conditional")]
    DuplicateOtherwise,
    #[error("conditional introducer with nothing to test")]
    ConditionMissing,
    #[error("malformed token stream: {0}")]
    Malformed(&'static str),
}
