//! Parser for scrip
//!
//! A single forward pass over the lazy token stream, with no lookahead.
//! Each nesting level keeps an explicit frame of open builders: the
//! committed series members, an in-flight conditional, and the invocation
//! currently receiving tokens. Operator precedence is procedural: the
//! grammar has exactly three constructs with fixed precedence (a
//! conditional binds tighter than sequencing, brackets are unambiguous by
//! construction), so no grammar engine is warranted.
//!
//! Builders are the only mutable stage; sealing converts them into
//! `Arc<Expr>` and nothing can mutate a tree afterwards. The parser pulls
//! the tokenizer in lock-step, so a tokenization error aborts the parse
//! exactly where the offending token would have appeared. A compound
//! argument recurses once per nesting level, sharing the same token
//! source, and returns at the matching `]`.

use std::sync::Arc;

use crate::ast::{Expr, Toggle};
use crate::error::SyntaxError;
use crate::lexer::{Token, TokenKind, Tokenizer};

/// Parse one line of script text into a sealed expression tree.
pub fn parse(input: &str) -> Result<Arc<Expr>, SyntaxError> {
    let mut tokens = Tokenizer::new(input);
    Frame::default().run(&mut tokens, false)
}

struct InvocationBuilder {
    toggle: Toggle,
    name: Option<String>,
    args: Vec<Arc<Expr>>,
}

impl InvocationBuilder {
    fn open(toggle: Toggle, name: Option<String>) -> Self {
        InvocationBuilder {
            toggle,
            name,
            args: Vec::new(),
        }
    }

    fn seal(self) -> Result<Arc<Expr>, SyntaxError> {
        let Some(name) = self.name else {
            // The tokenizer rejects a toggle with no following name, so a
            // nameless builder means the stream itself is inconsistent.
            return Err(SyntaxError::Malformed("invocation without a name"));
        };
        Ok(Arc::new(Expr::Invocation {
            toggle: self.toggle,
            name,
            args: self.args,
        }))
    }
}

struct ConditionalBuilder {
    expected: bool,
    condition: Arc<Expr>,
    primary: Option<Arc<Expr>>,
    secondary: Option<Arc<Expr>>,
    in_secondary: bool,
}

impl ConditionalBuilder {
    fn attach(&mut self, action: Arc<Expr>) -> Result<(), SyntaxError> {
        let slot = if self.in_secondary {
            &mut self.secondary
        } else {
            &mut self.primary
        };
        if slot.is_some() {
            return Err(SyntaxError::Malformed("conditional action already set"));
        }
        *slot = Some(action);
        Ok(())
    }

    fn seal(self) -> Arc<Expr> {
        Arc::new(Expr::Conditional {
            expected: self.expected,
            condition: self.condition,
            primary: self.primary,
            secondary: self.secondary,
        })
    }
}

/// Open expressions of one nesting level.
#[derive(Default)]
struct Frame {
    series: Vec<Arc<Expr>>,
    conditional: Option<ConditionalBuilder>,
    invocation: Option<InvocationBuilder>,
}

impl Frame {
    fn run(
        mut self,
        tokens: &mut Tokenizer<'_>,
        nested: bool,
    ) -> Result<Arc<Expr>, SyntaxError> {
        while let Some(token) = tokens.next() {
            let token = token?;
            match token.kind {
                TokenKind::CompoundEnd => {
                    if !nested {
                        return Err(SyntaxError::UnmatchedCompoundEnd);
                    }
                    return self.finish();
                }
                _ => self.consume(token, tokens)?,
            }
        }
        if nested {
            return Err(SyntaxError::UnclosedCompound(1));
        }
        self.finish()
    }

    fn consume(
        &mut self,
        token: Token,
        tokens: &mut Tokenizer<'_>,
    ) -> Result<(), SyntaxError> {
        match token.kind {
            TokenKind::Toggler => {
                if self.invocation.is_some() {
                    return Err(SyntaxError::Malformed("toggle inside a command"));
                }
                let toggle = if token.content == "+" {
                    Toggle::On
                } else {
                    Toggle::Off
                };
                self.invocation = Some(InvocationBuilder::open(toggle, None));
            }
            TokenKind::CommandName => match &mut self.invocation {
                Some(builder) if builder.name.is_none() => {
                    builder.name = Some(token.content);
                }
                Some(_) => return Err(SyntaxError::Malformed("unexpected command name")),
                None => {
                    self.invocation =
                        Some(InvocationBuilder::open(Toggle::Unset, Some(token.content)));
                }
            },
            TokenKind::Argument => match &mut self.invocation {
                Some(builder) => builder.args.push(Expr::constant(token.content)),
                None => return Err(SyntaxError::ArgumentWithoutCommand),
            },
            TokenKind::CompoundStart => {
                let compound = Frame::default().run(tokens, true)?;
                match &mut self.invocation {
                    Some(builder) => builder.args.push(compound),
                    None => return Err(SyntaxError::ArgumentWithoutCommand),
                }
            }
            TokenKind::Separator => match self.take_open()? {
                Some(expr) => self.series.push(expr),
                None => return Err(SyntaxError::EmptyCommand(';')),
            },
            TokenKind::Include | TokenKind::Exclude => {
                // Whatever is open becomes the condition; a prior
                // conditional becomes the new condition, so chains grow
                // to the left while printing flat.
                let condition = self.take_open()?.ok_or(SyntaxError::ConditionMissing)?;
                self.conditional = Some(ConditionalBuilder {
                    expected: token.kind == TokenKind::Include,
                    condition,
                    primary: None,
                    secondary: None,
                    in_secondary: false,
                });
            }
            TokenKind::Otherwise => {
                if let Some(builder) = self.invocation.take() {
                    let action = builder.seal()?;
                    match &mut self.conditional {
                        Some(conditional) => conditional.attach(action)?,
                        None => return Err(SyntaxError::OtherwiseWithoutConditional),
                    }
                }
                let Some(conditional) = self.conditional.as_mut() else {
                    return Err(SyntaxError::OtherwiseWithoutConditional);
                };
                if conditional.in_secondary {
                    return Err(SyntaxError::DuplicateOtherwise);
                }
                if conditional.primary.is_none() {
                    return Err(SyntaxError::OtherwiseWithoutAction);
                }
                conditional.in_secondary = true;
            }
            TokenKind::CompoundEnd => unreachable!("handled by run"),
        }
        Ok(())
    }

    /// Seal the open invocation and fold it into the open conditional, if
    /// any; returns the completed expression of the current segment.
    fn take_open(&mut self) -> Result<Option<Arc<Expr>>, SyntaxError> {
        let invocation = self
            .invocation
            .take()
            .map(InvocationBuilder::seal)
            .transpose()?;
        match self.conditional.take() {
            Some(mut conditional) => {
                if let Some(action) = invocation {
                    conditional.attach(action)?;
                }
                Ok(Some(conditional.seal()))
            }
            None => Ok(invocation),
        }
    }

    /// End of input (or of a compound argument): seal everything still
    /// open; the last expression, or the accumulated series, is the root.
    /// A series left with a single member (trailing `;`) collapses back
    /// to that member, so printing and re-parsing agree.
    fn finish(mut self) -> Result<Arc<Expr>, SyntaxError> {
        let open = self.take_open()?;
        if let Some(expr) = open {
            self.series.push(expr);
        }
        match self.series.len() {
            0 => Err(SyntaxError::EmptyInput),
            1 => Ok(self.series.remove(0)),
            _ => Ok(Arc::new(Expr::Series(self.series))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(name: &str, args: &[&str]) -> Arc<Expr> {
        Arc::new(Expr::Invocation {
            toggle: Toggle::Unset,
            name: name.into(),
            args: args.iter().map(|a| Expr::constant(*a)).collect(),
        })
    }

    #[test]
    fn parse_simple_invocation() {
        assert_eq!(parse("a b c").unwrap(), invocation("a", &["b", "c"]));
    }

    #[test]
    fn parse_toggled_invocation() {
        let expr = parse("+blah x").unwrap();
        assert_eq!(
            *expr,
            Expr::Invocation {
                toggle: Toggle::On,
                name: "blah".into(),
                args: vec![Expr::constant("x")],
            }
        );
    }

    #[test]
    fn parse_series() {
        assert_eq!(
            parse("a ; b ; c").unwrap(),
            Arc::new(Expr::Series(vec![
                invocation("a", &[]),
                invocation("b", &[]),
                invocation("c", &[]),
            ]))
        );
    }

    #[test]
    fn trailing_separator_collapses_a_single_member_series() {
        assert_eq!(parse("a ;").unwrap(), invocation("a", &[]));
        assert_eq!(
            parse("a ; b ;").unwrap(),
            Arc::new(Expr::Series(vec![
                invocation("a", &[]),
                invocation("b", &[]),
            ]))
        );
    }

    #[test]
    fn parse_conditional_with_both_branches() {
        let expr = parse("a ? b : c").unwrap();
        assert_eq!(
            *expr,
            Expr::Conditional {
                expected: true,
                condition: invocation("a", &[]),
                primary: Some(invocation("b", &[])),
                secondary: Some(invocation("c", &[])),
            }
        );
    }

    #[test]
    fn parse_exclude_conditional() {
        let expr = parse("a ! b").unwrap();
        assert_eq!(
            *expr,
            Expr::Conditional {
                expected: false,
                condition: invocation("a", &[]),
                primary: Some(invocation("b", &[])),
                secondary: None,
            }
        );
    }

    #[test]
    fn conditional_chain_grows_left() {
        let expr = parse("a ? b ? c").unwrap();
        let Expr::Conditional {
            condition, primary, ..
        } = &*expr
        else {
            panic!("expected conditional, got {expr}");
        };
        assert_eq!(
            **condition,
            Expr::Conditional {
                expected: true,
                condition: invocation("a", &[]),
                primary: Some(invocation("b", &[])),
                secondary: None,
            }
        );
        assert_eq!(primary.as_deref().unwrap(), &*invocation("c", &[]));
    }

    #[test]
    fn conditional_without_action_parses() {
        let expr = parse("a ?").unwrap();
        assert_eq!(
            *expr,
            Expr::Conditional {
                expected: true,
                condition: invocation("a", &[]),
                primary: None,
                secondary: None,
            }
        );
    }

    #[test]
    fn parse_compound_argument() {
        let expr = parse("a [b c] d").unwrap();
        assert_eq!(
            *expr,
            Expr::Invocation {
                toggle: Toggle::Unset,
                name: "a".into(),
                args: vec![invocation("b", &["c"]), Expr::constant("d")],
            }
        );
    }

    #[test]
    fn parse_nested_compound() {
        let expr = parse("a [b [c]]").unwrap();
        let inner = Arc::new(Expr::Invocation {
            toggle: Toggle::Unset,
            name: "b".into(),
            args: vec![invocation("c", &[])],
        });
        assert_eq!(
            *expr,
            Expr::Invocation {
                toggle: Toggle::Unset,
                name: "a".into(),
                args: vec![inner],
            }
        );
    }

    #[test]
    fn series_inside_compound() {
        let expr = parse("a [b ; c]").unwrap();
        let Expr::Invocation { args, .. } = &*expr else {
            panic!("expected invocation");
        };
        assert!(matches!(&*args[0], Expr::Series(members) if members.len() == 2));
    }

    #[test]
    fn doubled_otherwise_rejected() {
        assert_eq!(parse("a ? b : c : d"), Err(SyntaxError::DuplicateOtherwise));
    }

    #[test]
    fn otherwise_without_conditional_rejected() {
        assert_eq!(
            parse("a : b"),
            Err(SyntaxError::OtherwiseWithoutConditional)
        );
    }

    #[test]
    fn error_set_from_tokenizer_propagates() {
        assert_eq!(parse("a; b;;c"), Err(SyntaxError::EmptyCommand(';')));
        assert_eq!(parse("a ]"), Err(SyntaxError::UnmatchedCompoundEnd));
        assert_eq!(parse("a b]"), Err(SyntaxError::UnmatchedCompoundEnd));
        assert_eq!(parse("a [b] ]"), Err(SyntaxError::UnmatchedCompoundEnd));
        assert!(matches!(
            parse("a ["),
            Err(SyntaxError::UnclosedCompound(_))
        ));
        assert!(matches!(
            parse("a [b"),
            Err(SyntaxError::UnclosedCompound(_))
        ));
        assert_eq!(parse("a [ ]"), Err(SyntaxError::EmptyCommand(']')));
        assert_eq!(parse("a [b [] ]"), Err(SyntaxError::EmptyCommand(']')));
    }

    #[test]
    fn quoted_words_parse_as_single_tokens() {
        assert_eq!(
            parse("a \"b c\" d").unwrap(),
            invocation("a", &["b c", "d"])
        );
    }
}
