//! Bundled commands.
//!
//! Everything here is an ordinary [`Command`] on top of the public
//! invocation contract, including the loop and the scoping commands,
//! which need no core support because arguments arrive unevaluated and
//! contexts derive cheaply. Hosts embedding the library can register any
//! subset of these, replace them, or ignore them entirely.

use std::sync::{Arc, Weak};

use crate::ast::{Expr, Toggle};
use crate::eval::{Context, Fault, Outcome};
use crate::host::{Command, Host};
use crate::registry::Registry;

/// Usage errors from the bundled commands.
const STATUS_USAGE: i32 = 2;

/// One-line manual: name, usage, summary.
const MANUAL: &[(&str, &str, &str)] = &[
    (
        "alias",
        "alias NAME [BODY] | -alias NAME",
        "store BODY as a named command; -alias removes it",
    ),
    (
        "arg",
        "arg N | +arg",
        "evaluate the Nth user argument of the innermost alias call; +arg gives the count",
    ),
    (
        "calc",
        "calc add|sub|mul|div A B...",
        "integer arithmetic over the evaluated operands",
    ),
    (
        "echo",
        "echo ARG... | +echo ARG...",
        "evaluate arguments and join their output with spaces; +echo appends a newline",
    ),
    (
        "get",
        "get NAME | -get NAME",
        "read a local or stored variable; -get only tests presence",
    ),
    (
        "help",
        "help [NAME]",
        "list known commands, or show one command's usage",
    ),
    (
        "local",
        "local NAME VALUE [BODY]",
        "evaluate BODY with NAME bound in the branch context",
    ),
    (
        "repeat",
        "repeat N [BODY]",
        "evaluate BODY N times with the local i set to the iteration",
    ),
    (
        "set",
        "set NAME VALUE | -set NAME",
        "store a variable on the host; -set removes it",
    ),
    (
        "status",
        "status N",
        "return status N with no output",
    ),
];

/// Register the whole bundled set onto `registry`.
///
/// Commands that write back to the registry (`set`, `alias`) hold a weak
/// reference; the registry owns its commands, so a strong one would leak.
pub fn register_builtins(registry: &Arc<Registry>) {
    registry.register("echo", Arc::new(echo) as Arc<dyn Command>);
    registry.register("status", Arc::new(status) as Arc<dyn Command>);
    registry.register("calc", Arc::new(calc) as Arc<dyn Command>);
    registry.register("repeat", Arc::new(repeat) as Arc<dyn Command>);
    registry.register("local", Arc::new(local) as Arc<dyn Command>);
    registry.register("arg", Arc::new(arg) as Arc<dyn Command>);

    let weak = Arc::downgrade(registry);
    registry.register("set", Arc::new(Set { registry: weak.clone() }) as Arc<dyn Command>);
    registry.register("get", Arc::new(Get { registry: weak.clone() }) as Arc<dyn Command>);
    registry.register(
        "alias",
        Arc::new(DefineAlias { registry: weak.clone() }) as Arc<dyn Command>,
    );
    registry.register("help", Arc::new(Help { registry: weak }) as Arc<dyn Command>);
}

/// Evaluate the argument at `index`; a missing argument or a failing
/// evaluation short-circuits with a ready-made outcome.
fn required_arg(
    context: &Context,
    args: &[Arc<Expr>],
    index: usize,
    what: &str,
) -> Result<String, Outcome> {
    let Some(arg) = args.get(index) else {
        return Err(Outcome::with_status(STATUS_USAGE, format!("missing {what}")));
    };
    let outcome = arg.evaluate(context);
    if !outcome.truth_value() {
        return Err(outcome);
    }
    Ok(outcome.into_output())
}

fn int_arg(
    context: &Context,
    args: &[Arc<Expr>],
    index: usize,
    what: &str,
) -> Result<i64, Outcome> {
    let text = required_arg(context, args, index, what)?;
    text.trim().parse().map_err(|_| {
        Outcome::with_status(STATUS_USAGE, format!("{what} is not an integer: {text}"))
    })
}

fn echo(toggle: Toggle, context: &Context, args: &[Arc<Expr>]) -> Result<Outcome, Fault> {
    let mut output = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            output.push(' ');
        }
        output.push_str(arg.evaluate(context).output());
    }
    if toggle == Toggle::On {
        output.push('\n');
    }
    Ok(Outcome::ok(output))
}

fn status(_toggle: Toggle, context: &Context, args: &[Arc<Expr>]) -> Result<Outcome, Fault> {
    let code = match int_arg(context, args, 0, "status code") {
        Ok(code) => code,
        Err(outcome) => return Ok(outcome),
    };
    Ok(Outcome::with_status(code as i32, ""))
}

fn calc(_toggle: Toggle, context: &Context, args: &[Arc<Expr>]) -> Result<Outcome, Fault> {
    let op = match required_arg(context, args, 0, "operator") {
        Ok(op) => op,
        Err(outcome) => return Ok(outcome),
    };
    if !matches!(op.as_str(), "add" | "sub" | "mul" | "div") {
        return Ok(Outcome::with_status(
            STATUS_USAGE,
            format!("calc: unknown operator: {op}"),
        ));
    }
    let mut total = match int_arg(context, args, 1, "operand") {
        Ok(operand) => operand,
        Err(outcome) => return Ok(outcome),
    };
    for index in 2..args.len() {
        let operand = match int_arg(context, args, index, "operand") {
            Ok(operand) => operand,
            Err(outcome) => return Ok(outcome),
        };
        let step = match op.as_str() {
            "add" => total.checked_add(operand),
            "sub" => total.checked_sub(operand),
            "mul" => total.checked_mul(operand),
            "div" => {
                if operand == 0 {
                    return Ok(Outcome::with_status(1, "calc: division by zero"));
                }
                total.checked_div(operand)
            }
            _ => unreachable!("operator validated above"),
        };
        total = match step {
            Some(value) => value,
            None => return Ok(Outcome::with_status(1, "calc: overflow")),
        };
    }
    Ok(Outcome::ok(total.to_string()))
}

fn repeat(_toggle: Toggle, context: &Context, args: &[Arc<Expr>]) -> Result<Outcome, Fault> {
    let count = match int_arg(context, args, 0, "repeat count") {
        Ok(count) if count >= 0 => count,
        Ok(_) => return Ok(Outcome::with_status(STATUS_USAGE, "repeat count is negative")),
        Err(outcome) => return Ok(outcome),
    };
    let Some(body) = args.get(1) else {
        return Ok(Outcome::with_status(STATUS_USAGE, "missing repeat body"));
    };
    let mut output = String::new();
    let mut last = 0;
    for i in 0..count {
        // Each iteration gets its own branch context; bindings never leak
        // into siblings or back into the caller.
        let branch = context.with_local("i", i.to_string());
        let outcome = body.evaluate(&branch);
        output.push_str(outcome.output());
        last = outcome.status();
    }
    Ok(Outcome::with_status(last, output))
}

fn local(_toggle: Toggle, context: &Context, args: &[Arc<Expr>]) -> Result<Outcome, Fault> {
    let name = match required_arg(context, args, 0, "local name") {
        Ok(name) => name,
        Err(outcome) => return Ok(outcome),
    };
    let value = match required_arg(context, args, 1, "local value") {
        Ok(value) => value,
        Err(outcome) => return Ok(outcome),
    };
    let Some(body) = args.get(2) else {
        return Ok(Outcome::with_status(STATUS_USAGE, "missing local body"));
    };
    Ok(body.evaluate(&context.with_local(name, value)))
}

fn arg(toggle: Toggle, context: &Context, args: &[Arc<Expr>]) -> Result<Outcome, Fault> {
    let Some(user_args) = context.user_args() else {
        return Ok(Outcome::with_status(1, "arg: no user arguments here"));
    };
    if toggle == Toggle::On {
        return Ok(Outcome::ok(user_args.len().to_string()));
    }
    let index = match int_arg(context, args, 0, "argument index") {
        Ok(index) if index >= 0 => index as usize,
        Ok(_) => return Ok(Outcome::with_status(STATUS_USAGE, "argument index is negative")),
        Err(outcome) => return Ok(outcome),
    };
    let Some(user_arg) = user_args.get(index) else {
        return Ok(Outcome::with_status(1, format!("arg: no argument {index}")));
    };
    Ok(user_arg.evaluate(context))
}

struct Set {
    registry: Weak<Registry>,
}

impl Command for Set {
    fn invoke(
        &self,
        toggle: Toggle,
        context: &Context,
        args: &[Arc<Expr>],
    ) -> Result<Outcome, Fault> {
        let Some(registry) = self.registry.upgrade() else {
            return Err(Fault::msg("set: registry is gone"));
        };
        let name = match required_arg(context, args, 0, "variable name") {
            Ok(name) => name,
            Err(outcome) => return Ok(outcome),
        };
        if toggle == Toggle::Off {
            return Ok(if registry.unset_var(&name) {
                Outcome::ok("")
            } else {
                Outcome::with_status(1, "")
            });
        }
        let value = match required_arg(context, args, 1, "variable value") {
            Ok(value) => value,
            Err(outcome) => return Ok(outcome),
        };
        registry.set_var(&name, value);
        Ok(Outcome::ok(""))
    }
}

struct Get {
    registry: Weak<Registry>,
}

impl Command for Get {
    fn invoke(
        &self,
        toggle: Toggle,
        context: &Context,
        args: &[Arc<Expr>],
    ) -> Result<Outcome, Fault> {
        let Some(registry) = self.registry.upgrade() else {
            return Err(Fault::msg("get: registry is gone"));
        };
        let name = match required_arg(context, args, 0, "variable name") {
            Ok(name) => name,
            Err(outcome) => return Ok(outcome),
        };
        // Branch locals shadow stored variables.
        let value = context
            .local(&name)
            .map(str::to_string)
            .or_else(|| registry.var(&name));
        Ok(match (toggle, value) {
            (Toggle::Off, Some(_)) => Outcome::ok(""),
            (Toggle::Off, None) => Outcome::with_status(1, ""),
            (_, Some(value)) => Outcome::ok(value),
            (_, None) => Outcome::with_status(1, ""),
        })
    }
}

/// A stored alias body; invoking it evaluates the sealed tree with the
/// call's unevaluated arguments attached to the context.
struct Alias {
    body: Arc<Expr>,
}

impl Command for Alias {
    fn invoke(
        &self,
        _toggle: Toggle,
        context: &Context,
        args: &[Arc<Expr>],
    ) -> Result<Outcome, Fault> {
        let call = context.with_user_args(args.to_vec());
        Ok(self.body.evaluate(&call))
    }
}

struct DefineAlias {
    registry: Weak<Registry>,
}

impl Command for DefineAlias {
    fn invoke(
        &self,
        toggle: Toggle,
        context: &Context,
        args: &[Arc<Expr>],
    ) -> Result<Outcome, Fault> {
        let Some(registry) = self.registry.upgrade() else {
            return Err(Fault::msg("alias: registry is gone"));
        };
        let name = match required_arg(context, args, 0, "alias name") {
            Ok(name) => name,
            Err(outcome) => return Ok(outcome),
        };
        if toggle == Toggle::Off {
            return Ok(if registry.unregister(&name) {
                Outcome::ok("")
            } else {
                Outcome::with_status(1, format!("alias: no such alias: {name}"))
            });
        }
        let Some(body) = args.get(1) else {
            return Ok(Outcome::with_status(STATUS_USAGE, "missing alias body"));
        };
        tracing::debug!(alias = %name, body = %body, "defined alias");
        registry.register(&name, Arc::new(Alias { body: Arc::clone(body) }));
        Ok(Outcome::ok(""))
    }
}

struct Help {
    registry: Weak<Registry>,
}

impl Command for Help {
    fn invoke(
        &self,
        _toggle: Toggle,
        context: &Context,
        args: &[Arc<Expr>],
    ) -> Result<Outcome, Fault> {
        let Some(registry) = self.registry.upgrade() else {
            return Err(Fault::msg("help: registry is gone"));
        };
        if args.is_empty() {
            let mut lines: Vec<String> = MANUAL
                .iter()
                .map(|(name, _, summary)| format!("{name:<8} {summary}"))
                .collect();
            let undocumented: Vec<String> = registry
                .command_names()
                .into_iter()
                .filter(|name| MANUAL.iter().all(|(known, _, _)| known != name))
                .collect();
            if !undocumented.is_empty() {
                lines.push(format!("also registered: {}", undocumented.join(" ")));
            }
            return Ok(Outcome::ok(lines.join("\n")));
        }
        let name = match required_arg(context, args, 0, "command name") {
            Ok(name) => name,
            Err(outcome) => return Ok(outcome),
        };
        if let Some((_, usage, summary)) = MANUAL.iter().find(|(known, _, _)| *known == name) {
            return Ok(Outcome::ok(format!("usage: {usage}\n{summary}")));
        }
        if registry.lookup(&name).is_some() {
            return Ok(Outcome::ok(format!("{name}: registered, no manual entry")));
        }
        Ok(Outcome::with_status(1, format!("help: unknown command: {name}")))
    }
}
