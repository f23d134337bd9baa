//! Tokenization for scrip
//!
//! A single left-to-right pass turns script text into a lazy, forward-only
//! sequence of tokens. The tokenizer is a small state machine: whether a
//! command name is still expected, whether we are inside a quoted string,
//! and how deep we are in `[` `]` compound arguments all change what a
//! character means. Tokens are immutable and produced only here.
//!
//! The stream is non-restartable: the parser pulls it in lock-step, so a
//! tokenization error surfaces exactly when the offending token would have
//! been produced, not after buffering the whole input.

use std::collections::VecDeque;
use std::str::Chars;

use crate::error::SyntaxError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `+` or `-` directly before a command name
    Toggler,
    /// First word of a command
    CommandName,
    /// Any later word of a command
    Argument,
    /// `;`
    Separator,
    /// `?`, conditional introducer testing for success
    Include,
    /// `!`, conditional introducer testing for failure
    Exclude,
    /// `:`, the else branch of a conditional
    Otherwise,
    /// `[` after whitespace where an argument is expected
    CompoundStart,
    /// `]`
    CompoundEnd,
}

/// Immutable lexical unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub content: String,
}

impl Token {
    fn new(kind: TokenKind, content: impl Into<String>) -> Self {
        Token {
            kind,
            content: content.into(),
        }
    }
}

/// Lazy tokenizer over a single line of script text.
///
/// Implements `Iterator<Item = Result<Token, SyntaxError>>`. After the
/// first error the iterator is fused; there is no recovery.
pub struct Tokenizer<'a> {
    chars: Chars<'a>,
    queue: VecDeque<Token>,
    buffer: String,
    word_started: bool,
    in_string: bool,
    expect_name: bool,
    toggle_pending: bool,
    after_whitespace: bool,
    depth: u32,
    emitted_any: bool,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Tokenizer {
            chars: input.chars(),
            queue: VecDeque::new(),
            buffer: String::new(),
            word_started: false,
            in_string: false,
            expect_name: true,
            toggle_pending: false,
            after_whitespace: true,
            depth: 0,
            emitted_any: false,
            done: false,
        }
    }

    fn push(&mut self, kind: TokenKind, content: impl Into<String>) {
        self.emitted_any = true;
        self.queue.push_back(Token::new(kind, content));
    }

    /// Emit the buffered word, if one has started. The first word of each
    /// command becomes its name; every later word is an argument.
    fn flush_word(&mut self) {
        if !self.word_started {
            return;
        }
        let content = std::mem::take(&mut self.buffer);
        self.word_started = false;
        if self.expect_name {
            self.expect_name = false;
            self.toggle_pending = false;
            self.push(TokenKind::CommandName, content);
        } else {
            self.push(TokenKind::Argument, content);
        }
    }

    /// Consume one input character, possibly queueing tokens.
    fn step(&mut self) -> Result<(), SyntaxError> {
        let Some(c) = self.chars.next() else {
            return self.finish();
        };
        match c {
            // Backslash marks the next character literal, bypassing
            // quoting, toggles, separators and brackets alike.
            '\\' => {
                let Some(escaped) = self.chars.next() else {
                    return Err(SyntaxError::TrailingBackslash);
                };
                self.buffer.push(escaped);
                self.word_started = true;
                self.after_whitespace = false;
            }
            '"' => {
                self.in_string = !self.in_string;
                self.word_started = true;
                self.after_whitespace = false;
            }
            // Verbatim mode: everything except backslash and the closing
            // quote is ordinary content.
            _ if self.in_string => {
                self.buffer.push(c);
            }
            c if c.is_whitespace() => {
                self.flush_word();
                self.after_whitespace = true;
            }
            '+' | '-' => {
                if self.expect_name && !self.word_started {
                    self.push(TokenKind::Toggler, c);
                    self.toggle_pending = true;
                    self.after_whitespace = false;
                } else {
                    return Err(SyntaxError::MisplacedToggle(c));
                }
            }
            ';' | ':' | '?' | '!' => {
                if self.expect_name && !self.word_started {
                    return Err(SyntaxError::EmptyCommand(c));
                }
                self.flush_word();
                let kind = match c {
                    ';' => TokenKind::Separator,
                    ':' => TokenKind::Otherwise,
                    '?' => TokenKind::Include,
                    _ => TokenKind::Exclude,
                };
                self.push(kind, c);
                self.expect_name = true;
                self.after_whitespace = false;
            }
            // An opening bracket is structural only where an argument is
            // expected and directly after whitespace; otherwise it is
            // ordinary content.
            '[' => {
                if self.after_whitespace && !self.expect_name && !self.word_started {
                    self.push(TokenKind::CompoundStart, '[');
                    self.depth += 1;
                    self.expect_name = true;
                } else {
                    self.buffer.push('[');
                    self.word_started = true;
                }
                self.after_whitespace = false;
            }
            ']' => {
                if self.expect_name && !self.word_started {
                    return Err(SyntaxError::EmptyCommand(']'));
                }
                self.flush_word();
                if self.depth == 0 {
                    return Err(SyntaxError::UnmatchedCompoundEnd);
                }
                self.depth -= 1;
                self.push(TokenKind::CompoundEnd, ']');
                self.expect_name = false;
                self.after_whitespace = false;
            }
            _ => {
                self.buffer.push(c);
                self.word_started = true;
                self.after_whitespace = false;
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SyntaxError> {
        self.done = true;
        if self.in_string {
            return Err(SyntaxError::UnterminatedString);
        }
        self.flush_word();
        if self.toggle_pending {
            return Err(SyntaxError::DanglingToggle);
        }
        if self.depth > 0 {
            return Err(SyntaxError::UnclosedCompound(self.depth));
        }
        if !self.emitted_any {
            return Err(SyntaxError::EmptyInput);
        }
        Ok(())
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.queue.pop_front() {
                return Some(Ok(token));
            }
            if self.done {
                return None;
            }
            if let Err(e) = self.step() {
                self.done = true;
                return Some(Err(e));
            }
        }
    }
}

/// Tokenize a complete input string eagerly.
pub fn lex(input: &str) -> Result<Vec<Token>, SyntaxError> {
    Tokenizer::new(input).collect()
}
