//! scrip - embeddable command-scripting language, standalone runner
//!
//! Usage:
//!   scrip               Start interactive REPL
//!   scrip -c "script"   Execute a single script line
//!   scrip file.scrip    Execute a script file (one script per line)

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use scrip::{register_builtins, run, Context, Registry};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_help() {
    println!(
        r#"scrip {VERSION} - embeddable command-scripting language

USAGE:
    scrip                   Start interactive REPL
    scrip -c <script>       Execute a single script line
    scrip <file.scrip>      Execute a script file (one script per line)
    scrip --help            Show this help message
    scrip --version         Show version

STARTUP:
    ~/.scriprc              Executed line by line on REPL startup (if present)
    RUST_LOG=debug          Enable diagnostic logging (stderr)

GRAMMAR:
    name arg arg            Invoke a command; first word is the name
    +name / -name           Toggle prefix, passed through to the command
    a ; b                   Series: run both, concatenate output, last status
    a ? b : c               If a succeeds run b, otherwise c (':' optional)
    a ! b                   As above but testing for failure
    name [sub arg]          Compound argument: a full nested invocation
    "quoted text"           Verbatim content; \ escapes anywhere

COMMANDS:
    help                    List the bundled commands
    help <name>             Show one command's usage

REPL:
    exit, quit              Leave the REPL (Ctrl-D works too)
"#
    );
}

fn main() -> ExitCode {
    // Diagnostics go to stderr so script output stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    match args.get(1).map(String::as_str) {
        None => repl(),
        Some("--help" | "-h") => {
            print_help();
            ExitCode::SUCCESS
        }
        Some("--version" | "-V") => {
            println!("scrip {VERSION}");
            ExitCode::SUCCESS
        }
        Some("-c") => match args.get(2) {
            Some(script) => {
                let context = fresh_context();
                exit_code(execute_line(script, &context))
            }
            None => {
                eprintln!("scrip: -c requires a script argument");
                ExitCode::from(2)
            }
        },
        Some(path) => run_file(path),
    }
}

fn fresh_context() -> Context {
    let registry = Arc::new(Registry::new());
    register_builtins(&registry);
    Context::new(registry)
}

/// Execute one script line against `context`, printing its output.
/// Returns the outcome status (2 for a syntax error).
fn execute_line(line: &str, context: &Context) -> i32 {
    match run(line, context) {
        Ok(outcome) => {
            let output = outcome.output();
            if !output.is_empty() {
                if output.ends_with('\n') {
                    print!("{output}");
                } else {
                    println!("{output}");
                }
            }
            if !outcome.truth_value() {
                eprintln!("(status {})", outcome.status());
            }
            outcome.status()
        }
        Err(e) => {
            eprintln!("scrip: syntax error: {e}");
            2
        }
    }
}

fn repl() -> ExitCode {
    let context = fresh_context();
    load_rcfile(&context);

    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("scrip: cannot start line editor: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut last_status = 0;
    loop {
        match editor.readline("scrip> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" || line == "quit" {
                    break;
                }
                let _ = editor.add_history_entry(line);
                last_status = execute_line(line, &context);
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("scrip: {e}");
                return ExitCode::FAILURE;
            }
        }
    }
    exit_code(last_status)
}

/// Execute a script file: one script per line, `#` lines and blank lines
/// skipped. Stops at the first syntax error; evaluation failures carry on
/// and the last status wins.
fn run_file(path: &str) -> ExitCode {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("scrip: {path}: {e}");
            return ExitCode::FAILURE;
        }
    };
    let context = fresh_context();
    let mut last_status = 0;
    for (line_number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match run(line, &context) {
            Ok(outcome) => {
                let output = outcome.output();
                if !output.is_empty() {
                    if output.ends_with('\n') {
                        print!("{output}");
                    } else {
                        println!("{output}");
                    }
                }
                last_status = outcome.status();
            }
            Err(e) => {
                eprintln!("scrip: {path}:{}: syntax error: {e}", line_number + 1);
                return ExitCode::from(2);
            }
        }
    }
    exit_code(last_status)
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME").map(PathBuf::from)
}

/// Load and execute ~/.scriprc if it exists.
fn load_rcfile(context: &Context) {
    let rc_path = match home_dir() {
        Some(home) => home.join(".scriprc"),
        None => return,
    };
    let content = match fs::read_to_string(&rc_path) {
        Ok(content) => content,
        Err(_) => return,
    };
    for (line_number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match run(line, context) {
            Ok(outcome) => {
                if !outcome.truth_value() {
                    eprintln!(
                        "scrip: ~/.scriprc:{}: status {}",
                        line_number + 1,
                        outcome.status()
                    );
                }
            }
            Err(e) => {
                eprintln!("scrip: ~/.scriprc:{}: syntax error: {e}", line_number + 1);
            }
        }
    }
}

fn exit_code(status: i32) -> ExitCode {
    match u8::try_from(status) {
        Ok(code) => ExitCode::from(code),
        Err(_) => ExitCode::FAILURE,
    }
}
