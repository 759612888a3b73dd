//! Input line grammar.
//!
//! One script line is one clock tick. A line is either a `//` comment
//! (ignored, no tick), the `exit` sentinel, or a semicolon-separated
//! batch of commands that share the tick:
//!
//! ```text
//! begin(T1); begin(T2)
//! W(T1, x2, 50)
//! R(T2, x2)
//! dump()
//! querystate()
//! ```
//!
//! `dump` takes no argument for the full cluster, `x`-prefixed for one
//! variable, or a bare site index. A blank line parses to an empty
//! batch, which still ticks.

use avail_core::{SiteId, TransactionId, Value, VariableId};
use avail_executor::Command;
use std::str::FromStr;

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Commands sharing one clock tick; empty for a blank line.
    Commands(Vec<Command>),
    /// `//` line; does not tick.
    Comment,
    /// `exit`: stop reading input.
    Exit,
}

/// Why a line was rejected. The whole line is dropped and the clock
/// does not tick.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Not `name(args)` shaped.
    #[error("malformed command: {input:?}")]
    Malformed {
        /// The offending text.
        input: String,
    },

    /// `name(...)` with an unrecognized name.
    #[error("unknown command: {name:?}")]
    UnknownCommand {
        /// The unrecognized name.
        name: String,
    },

    /// Wrong number of arguments.
    #[error("{command} takes {expected} argument(s), got {got}")]
    WrongArity {
        /// The command name.
        command: &'static str,
        /// How many arguments it takes.
        expected: usize,
        /// How many were supplied.
        got: usize,
    },

    /// Bad transaction or variable token.
    #[error(transparent)]
    Id(#[from] avail_core::Error),

    /// Site index or write value that is not an integer.
    #[error("invalid number: {token:?}")]
    InvalidNumber {
        /// The offending token.
        token: String,
    },
}

/// Parse one input line.
pub fn parse_line(input: &str) -> Result<Line, ParseError> {
    let line = input.trim();
    if line.starts_with("//") {
        return Ok(Line::Comment);
    }
    if line == "exit" {
        return Ok(Line::Exit);
    }
    let mut commands = Vec::new();
    for piece in line.split(';') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        commands.push(parse_command(piece)?);
    }
    Ok(Line::Commands(commands))
}

fn parse_command(input: &str) -> Result<Command, ParseError> {
    let malformed = || ParseError::Malformed {
        input: input.to_string(),
    };
    let open = input.find('(').ok_or_else(malformed)?;
    let close = input.rfind(')').ok_or_else(malformed)?;
    if close < open || !input[close + 1..].trim().is_empty() {
        return Err(malformed());
    }

    let name = input[..open].trim();
    let inside = input[open + 1..close].trim();
    let args: Vec<&str> = if inside.is_empty() {
        Vec::new()
    } else {
        inside.split(',').map(str::trim).collect()
    };

    match name {
        "begin" => {
            arity("begin", &args, 1)?;
            Ok(Command::Begin {
                transaction: transaction(args[0])?,
            })
        }
        "beginRO" => {
            arity("beginRO", &args, 1)?;
            Ok(Command::BeginReadOnly {
                transaction: transaction(args[0])?,
            })
        }
        "end" => {
            arity("end", &args, 1)?;
            Ok(Command::End {
                transaction: transaction(args[0])?,
            })
        }
        "R" => {
            arity("R", &args, 2)?;
            Ok(Command::Read {
                transaction: transaction(args[0])?,
                variable: variable(args[1])?,
            })
        }
        "W" => {
            arity("W", &args, 3)?;
            Ok(Command::Write {
                transaction: transaction(args[0])?,
                variable: variable(args[1])?,
                value: number(args[2])?,
            })
        }
        "fail" => {
            arity("fail", &args, 1)?;
            Ok(Command::Fail {
                site: site(args[0])?,
            })
        }
        "recover" => {
            arity("recover", &args, 1)?;
            Ok(Command::Recover {
                site: site(args[0])?,
            })
        }
        "dump" => match args.as_slice() {
            [] => Ok(Command::Dump),
            [arg] if arg.starts_with('x') || arg.starts_with('X') => Ok(Command::DumpVariable {
                variable: variable(arg)?,
            }),
            [arg] => Ok(Command::DumpSite { site: site(arg)? }),
            _ => Err(ParseError::WrongArity {
                command: "dump",
                expected: 1,
                got: args.len(),
            }),
        },
        "querystate" => {
            arity("querystate", &args, 0)?;
            Ok(Command::QueryState)
        }
        "restart" => {
            arity("restart", &args, 0)?;
            Ok(Command::Restart)
        }
        _ => Err(ParseError::UnknownCommand {
            name: name.to_string(),
        }),
    }
}

fn arity(command: &'static str, args: &[&str], expected: usize) -> Result<(), ParseError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ParseError::WrongArity {
            command,
            expected,
            got: args.len(),
        })
    }
}

fn transaction(token: &str) -> Result<TransactionId, ParseError> {
    Ok(TransactionId::from_str(token)?)
}

fn variable(token: &str) -> Result<VariableId, ParseError> {
    Ok(VariableId::from_str(token)?)
}

fn site(token: &str) -> Result<SiteId, ParseError> {
    token
        .parse::<u32>()
        .map(SiteId::new)
        .map_err(|_| ParseError::InvalidNumber {
            token: token.to_string(),
        })
}

fn number(token: &str) -> Result<Value, ParseError> {
    token.parse().map_err(|_| ParseError::InvalidNumber {
        token: token.to_string(),
    })
}
