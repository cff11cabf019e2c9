//! Hack Assembler - Main Entry Point
//!
//! A two-pass assembler for the Hack assembly language (`Nand2Tetris` Project 6).
//!
//! # Architecture
//! - **Pass 1**: Builds the symbol table by recording label positions
//! - **Pass 2**: Generates machine code, resolving all symbols
//!
//! # Usage
//! ```bash
//! cargo run <input.asm> [output.hack]
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use std::env;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::process;

use anyhow::Context;
use colored::Colorize;

/// Reads assembly file into memory
fn read_lines(path: &str) -> anyhow::Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("opening {path}"))?;
    let reader = BufReader::new(file);
    reader
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("reading {path}"))
}

/// Determines the output file path
fn output_path(input: &str, explicit_output: Option<&str>) -> String {
    explicit_output.map_or_else(
        || input.replace(".asm", ".hack"),
        std::string::ToString::to_string,
    )
}

fn run() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if !(2..=3).contains(&args.len()) {
        eprintln!("Usage: {} <input.asm> [output.hack]", args[0]);
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  {} Add.asm", args[0]);
        eprintln!("  {} Add.asm Add.hack", args[0]);
        process::exit(1);
    }

    let input_path = &args[1];

    log::info!("reading {input_path}");
    let lines = read_lines(input_path)?;

    log::info!("assembling {} lines", lines.len());
    let binary = hack_assembler::assemble(&lines)
        .with_context(|| format!("assembling {input_path}"))?;

    let output = output_path(input_path, args.get(2).map(String::as_str));
    let output_file = File::create(&output).with_context(|| format!("creating {output}"))?;
    let mut writer = BufWriter::new(output_file);
    for line in &binary {
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;

    println!("Assembly completed. Output written to {output}");
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{} {err:#}", "error:".red().bold());
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_generation() {
        assert_eq!(output_path("test.asm", None), "test.hack");
        assert_eq!(output_path("test.asm", Some("custom.hack")), "custom.hack");
        assert_eq!(output_path("dir/file.asm", None), "dir/file.hack");
        assert_eq!(output_path("path/to/file.asm", None), "path/to/file.hack");
    }

    #[test]
    fn test_output_path_explicit() {
        assert_eq!(output_path("any.asm", Some("out.hack")), "out.hack");
        assert_eq!(
            output_path("any.asm", Some("path/to/out.hack")),
            "path/to/out.hack"
        );
    }
}
