//! colti - container inspector and disassembler.
//!
//! Loads a colti executable image, prints its header and section table,
//! and disassembles the requested code section word by word.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use coltc_exe::{ColtiExecutable, Disassembler};
use coltc_util::ByteSize;

#[derive(Parser, Debug)]
#[command(name = "colti", about = "Inspect colti executable containers")]
struct Cli {
    /// The container image to inspect.
    input: PathBuf,

    /// Disassemble this section (defaults to "code" when present).
    #[arg(long = "disasm", value_name = "SECTION")]
    disasm: Option<String>,

    /// Only print the header line.
    #[arg(long = "header-only")]
    header_only: bool,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let bytes = std::fs::read(&cli.input)
        .with_context(|| format!("cannot read '{}'", cli.input.display()))?;
    let exe = ColtiExecutable::load(&bytes)
        .with_context(|| format!("'{}' is not a colti executable", cli.input.display()))?;

    match exe.compilation_time() {
        Some(ts) => println!(
            "colti executable, language v{}, compiled {}",
            exe.version(),
            ts
        ),
        None => println!("colti executable, language v{}, no date", exe.version()),
    }
    if cli.header_only {
        return Ok(());
    }

    println!("{} section(s):", exe.section_count());
    for (index, section) in exe.sections().enumerate() {
        println!(
            "  [{index}] {:<24} {}",
            section.name,
            ByteSize::new(section.data.len() as u64)
        );
    }

    let target = cli
        .disasm
        .clone()
        .or_else(|| exe.find_section("code").map(|_| "code".to_owned()));
    if let Some(name) = target {
        let section = exe
            .find_section(&name)
            .with_context(|| format!("no section named '{name}'"))?;
        if !section.data.is_empty() {
            println!("disassembly of '{name}':");
            for line in Disassembler::new(section.data) {
                println!("  {line}");
            }
        }
    }
    Ok(())
}
