//! Simple REPL (Read-Eval-Print Loop) for readlisp
//!
//! Usage: cargo run --example repl [-- config.json]
//!
//! A form may span several lines; input is buffered until it reads completely,
//! then every complete form is evaluated once.

use std::io::{self, Write};

use anyhow::Context;
use readlisp::{pr_str, Error, Evaluator, Expr, InterpreterConfig, ReadTable};

/// What the buffered input amounted to
#[derive(Debug)]
enum Outcome {
    /// The input ends inside a form; keep reading lines
    Incomplete,
    /// The input does not read; nothing was evaluated
    ReadError(Error),
    /// One result per evaluated form, stopping after the first failure
    Evaluated(Vec<Result<Expr, Error>>),
}

/// Reads all of `source`, then evaluates the forms in order
fn submit(evaluator: &mut Evaluator, source: &str) -> Outcome {
    let mut reader = ReadTable::with_config(source, evaluator.config().reader.clone());
    let forms = match reader.read_all() {
        Ok(forms) => forms,
        Err(err) if err.is_incomplete_input() => return Outcome::Incomplete,
        Err(err) => return Outcome::ReadError(err),
    };

    let mut results = Vec::with_capacity(forms.len());
    for form in forms {
        let result = evaluator.eval(&form);
        let failed = result.is_err();
        results.push(result);
        if failed {
            break;
        }
    }
    Outcome::Evaluated(results)
}

fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {}", path))?;
            InterpreterConfig::from_json(&text).context("parsing config")?
        }
        None => InterpreterConfig::default(),
    };

    println!("readlisp {} - type (exit) or press Ctrl+D to quit", readlisp::VERSION);
    println!();

    let mut evaluator = Evaluator::with_config(config.clone());
    let mut line_num = 1;
    let mut buffer = String::new();

    loop {
        if buffer.is_empty() {
            print!("user[{}]> ", line_num);
        } else {
            print!("      ...  ");
        }
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break; // EOF
        }

        if buffer.is_empty() {
            match input.trim() {
                "" => continue,
                "(exit)" => break,
                "(reset)" => {
                    evaluator = Evaluator::with_config(config.clone());
                    println!("Environment cleared");
                    continue;
                }
                _ => {}
            }
        }

        buffer.push_str(&input);
        match submit(&mut evaluator, &buffer) {
            Outcome::Incomplete => continue,
            Outcome::ReadError(err) => eprintln!("Error: {}", err),
            Outcome::Evaluated(results) => {
                for result in results {
                    match result {
                        Ok(value) => println!("=> {}", pr_str(&value, true)),
                        Err(err) => eprintln!("Error: {}", err),
                    }
                }
            }
        }
        buffer.clear();
        line_num += 1;
    }

    println!("Goodbye!");
    Ok(())
}
