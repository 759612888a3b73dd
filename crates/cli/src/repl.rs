//! Script and interactive drivers.
//!
//! Both run the same line pipeline: parse, execute the semicolon
//! batch, print any non-empty output, advance past the line. Parse
//! errors report to stderr and drop the whole line without consuming
//! a clock tick.

use std::io::BufRead;

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config, Context, Editor, Helper};

use avail_executor::Executor;

use crate::format::{self, OutputMode};
use crate::parse::{self, Line};

/// Run one input line through the executor. Returns `false` when the
/// driver should stop reading.
fn process(executor: &mut Executor, input: &str, mode: OutputMode, status: &mut i32) -> bool {
    match parse::parse_line(input) {
        Ok(Line::Exit) => false,
        Ok(Line::Comment) => true,
        Ok(Line::Commands(commands)) => {
            for result in executor.execute_batch(&commands) {
                match result {
                    Ok(output) => {
                        let formatted = format::format_output(&output, mode);
                        if !formatted.is_empty() {
                            println!("{formatted}");
                        }
                    }
                    Err(error) => {
                        eprintln!("{}", format::format_error(&error, mode));
                        *status = 1;
                    }
                }
            }
            true
        }
        Err(error) => {
            eprintln!("(error) {error}");
            *status = 1;
            true
        }
    }
}

/// Feed every line of `reader` to the executor. Used for both script
/// files and piped stdin. Returns the process exit status.
pub fn run_reader(executor: &mut Executor, reader: impl BufRead, mode: OutputMode) -> i32 {
    let mut status = 0;
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                eprintln!("(error) read failed: {error}");
                return 1;
            }
        };
        if !process(executor, &line, mode, &mut status) {
            break;
        }
    }
    status
}

/// Run the interactive REPL. The prompt shows the logical clock so
/// waits and wait-die outcomes are easy to predict.
pub fn run_repl(executor: &mut Executor, mode: OutputMode) -> i32 {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .build();

    let mut rl: Editor<AvailHelper, _> = match Editor::with_config(config) {
        Ok(editor) => editor,
        Err(error) => {
            eprintln!("(error) terminal setup failed: {error}");
            return 1;
        }
    };
    rl.set_helper(Some(AvailHelper));

    let history_path = history_file();
    if let Some(ref path) = history_path {
        let _ = rl.load_history(path);
    }

    let mut status = 0;
    loop {
        let prompt = format!("availdb[{}]> ", executor.clock());
        match rl.readline(&prompt) {
            Ok(input) => {
                // Blank lines at the prompt are a convenience and do
                // not advance the clock; in scripts they do.
                if input.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(input.trim());
                if !process(executor, &input, mode, &mut status) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C: new prompt
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D: exit
                break;
            }
            Err(error) => {
                eprintln!("(error) {error}");
                status = 1;
                break;
            }
        }
    }

    if let Some(ref path) = history_path {
        let _ = rl.save_history(path);
    }
    status
}

fn history_file() -> Option<String> {
    std::env::var("HOME")
        .ok()
        .map(|home| format!("{}/.availdb_history", home))
}

// =========================================================================
// TAB Completion
// =========================================================================

/// Command names for TAB completion.
const COMMAND_NAMES: &[&str] = &[
    "begin",
    "beginRO",
    "end",
    "R",
    "W",
    "fail",
    "recover",
    "dump",
    "querystate",
    "restart",
    "exit",
];

struct AvailHelper;

impl Helper for AvailHelper {}
impl Validator for AvailHelper {}
impl Highlighter for AvailHelper {}
impl Hinter for AvailHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Completer for AvailHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line_to_pos = &line[..pos];

        // Only complete the command name, up to the opening paren.
        let start = line_to_pos.rfind(';').map_or(0, |i| i + 1);
        let word = line_to_pos[start..].trim_start();
        if word.contains('(') {
            return Ok((pos, vec![]));
        }

        let word_start = pos - word.len();
        let candidates: Vec<Pair> = COMMAND_NAMES
            .iter()
            .filter(|name| name.starts_with(word))
            .map(|name| Pair {
                display: name.to_string(),
                replacement: name.to_string(),
            })
            .collect();
        Ok((word_start, candidates))
    }
}
