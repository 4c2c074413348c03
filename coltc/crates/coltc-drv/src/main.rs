//! The `coltc` command line front-end.
//!
//! The compiler's multi-character flags are historically spelled with a
//! single dash (`-nocolor`, `-nowait`, `-space N`, `-max-error N`,
//! `-max-warn N`, `-max-msg N`), which clap does not produce on its own.
//! [`normalize_args`] rewrites those spellings to clap's long form before
//! parsing, so both `-max-error 5` and `--max-error 5` are accepted.

use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use coltc_drv::{
    build_reporter, CapRequest, Options, Session, DEFAULT_MAX_ERRORS, DEFAULT_MAX_MESSAGES,
    DEFAULT_MAX_WARNINGS, LANG_VERSION,
};

/// The multi-character options spelled with a single dash.
const SINGLE_DASH_LONGS: [&str; 6] = [
    "nocolor",
    "nowait",
    "space",
    "max-error",
    "max-warn",
    "max-msg",
];

/// Rewrite `-flag` and `-flag=value` to `--flag`/`--flag=value` for the
/// known single-dash options, leaving everything else (short flags,
/// values, the input path) untouched.
fn normalize_args(args: impl IntoIterator<Item = String>) -> Vec<String> {
    args.into_iter()
        .enumerate()
        .map(|(position, arg)| {
            if position == 0 {
                return arg;
            }
            let Some(stem) = arg.strip_prefix('-') else {
                return arg;
            };
            if stem.starts_with('-') {
                return arg;
            }
            let name = stem.split('=').next().unwrap_or(stem);
            if SINGLE_DASH_LONGS.contains(&name) {
                format!("--{stem}")
            } else {
                arg
            }
        })
        .collect()
}

#[derive(Parser, Debug)]
#[command(name = "coltc", about = "The Colt compiler", disable_version_flag = true)]
struct Cli {
    /// Turn off colored output (`-nocolor`).
    #[arg(long = "nocolor", short = 'C')]
    nocolor: bool,

    /// Do not wait for user input before exiting (`-nowait`).
    #[arg(long = "nowait")]
    nowait: bool,

    /// Print the version of the compiler and exit.
    #[arg(short = 'v')]
    version: bool,

    /// Number of spaces used when transpiling (`-space N`).
    #[arg(long = "space", value_name = "0-255", default_value_t = 2)]
    space: u8,

    /// Maximum number of errors reported (`-max-error N`; None for
    /// unlimited).
    #[arg(long = "max-error", value_name = "None|1-65535", default_value = "32",
          value_parser = CapRequest::parse)]
    max_error: CapRequest,

    /// Maximum number of warnings reported (`-max-warn N`; None for
    /// unlimited).
    #[arg(long = "max-warn", value_name = "None|1-65535", default_value = "64",
          value_parser = CapRequest::parse)]
    max_warn: CapRequest,

    /// Maximum number of messages reported (`-max-msg N`; None for
    /// unlimited).
    #[arg(long = "max-msg", value_name = "None|1-65535", default_value = "128",
          value_parser = CapRequest::parse)]
    max_msg: CapRequest,

    /// Output file name.
    #[arg(short = 'o', value_name = "PATH")]
    output: Option<PathBuf>,

    /// The input file.
    input: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse_from(normalize_args(std::env::args()));

    if cli.version {
        println!("COLT v{} on {}.", LANG_VERSION, std::env::consts::OS);
        return ExitCode::SUCCESS;
    }

    let options = Options {
        nocolor: cli.nocolor,
        nowait: cli.nowait,
        space: cli.space,
        max_errors: cli.max_error.sanitize("-max-error", DEFAULT_MAX_ERRORS),
        max_warnings: cli.max_warn.sanitize("-max-warn", DEFAULT_MAX_WARNINGS),
        max_messages: cli.max_msg.sanitize("-max-msg", DEFAULT_MAX_MESSAGES),
        output: cli.output,
        ..Options::default()
    };

    let Some(input) = cli.input else {
        eprintln!("error: no input file");
        return ExitCode::from(2);
    };

    let reporter = build_reporter(&options);
    let wait = !options.nowait;
    let mut session = Session::new(options, reporter);

    let outcome = run(&mut session, &input);

    if wait {
        eprintln!("Press Enter to exit.");
        let _ = std::io::stdin().lock().read_line(&mut String::new());
    }
    outcome
}

fn run(session: &mut Session<coltc_drv::DriverReporter>, input: &PathBuf) -> ExitCode {
    let tokens = match session.lex_file(input) {
        Ok(tokens) => tokens,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::from(2);
        }
    };

    if tokens.error_count() > 0 {
        eprintln!(
            "compilation failed with {} lexical error(s)",
            tokens.error_count()
        );
        return ExitCode::FAILURE;
    }

    if let Some(output) = session.options.output.clone() {
        if let Err(err) = session.write_executable(&tokens, &output) {
            eprintln!("error: {err:#}");
            return ExitCode::from(2);
        }
    }
    ExitCode::SUCCESS
}
