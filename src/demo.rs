//! Commands of the `foo` demo CLI.

use std::io::Write;

use anyhow::{Context, Result, bail};
use mcp_tree::{CommandNode, FlagDef, FlagKind};

pub fn command() -> CommandNode {
    CommandNode::new("foo")
        .about("Foo Demo CLI")
        .subcommand(greet())
        .subcommand(echo())
        .subcommand(math())
}

fn greet() -> CommandNode {
    CommandNode::new("greet")
        .about("Greet someone")
        .flag(FlagDef::string("name", "Foo", "Name to greet"))
        .run(|inv| {
            let name = inv.string("name").unwrap_or_default().to_string();
            writeln!(inv, "Hello, {name}!")?;
            Ok(())
        })
}

fn echo() -> CommandNode {
    CommandNode::new("echo")
        .about("Print the positional arguments")
        .flag(FlagDef::bool("upper", false, "Uppercase the output"))
        .flag(FlagDef::int("repeat", 1, "Number of times to print the line"))
        .run(|inv| {
            let mut line = inv.args().join(" ");
            if inv.bool("upper").unwrap_or(false) {
                line = line.to_uppercase();
            }
            let repeat = inv.int("repeat").unwrap_or(1);
            if repeat < 0 {
                bail!("--repeat must not be negative (got {repeat})");
            }
            for _ in 0..repeat {
                writeln!(inv, "{line}")?;
            }
            Ok(())
        })
}

fn math() -> CommandNode {
    CommandNode::new("math")
        .about("Arithmetic helpers")
        .flag(FlagDef::int("precision", 2, "Digits after the decimal point"))
        .subcommand(
            CommandNode::new("add")
                .about("Add the positional numbers")
                .run(|inv| {
                    let total = parse_numbers(&inv.args())?.into_iter().sum::<f64>();
                    let precision = precision(inv.int("precision"));
                    writeln!(inv, "{total:.precision$}")?;
                    Ok(())
                }),
        )
        .subcommand(
            CommandNode::new("div")
                .about("Divide a dividend by a divisor")
                .flag(FlagDef::float("dividend", 0.0, "Number to divide"))
                .flag(FlagDef::new("divisor", FlagKind::Float64, "", "Number to divide by"))
                .run(|inv| {
                    let dividend = inv.float("dividend").unwrap_or(0.0);
                    let divisor = inv.float("divisor").context("--divisor is required")?;
                    if divisor == 0.0 {
                        bail!("division by zero");
                    }
                    let precision = precision(inv.int("precision"));
                    writeln!(inv, "{:.precision$}", dividend / divisor)?;
                    Ok(())
                }),
        )
}

fn precision(value: Option<i64>) -> usize {
    value.unwrap_or(2).clamp(0, 12) as usize
}

fn parse_numbers(tokens: &[&str]) -> Result<Vec<f64>> {
    tokens
        .iter()
        .map(|t| {
            t.parse::<f64>()
                .with_context(|| format!("not a number: {t}"))
        })
        .collect()
}
